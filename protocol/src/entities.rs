//! The five persistent record types shared by the data store, lobby and
//! developer services. Rust fields are `snake_case`; `rename_all =
//! "camelCase"` gives the wire and snapshot JSON the camelCase vocabulary
//! the rest of this protocol uses.

use serde::{Deserialize, Serialize};

pub type Id = u32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub name: String,
    pub password_hash: String,
    pub created_at: String,
    pub last_login_at: Option<String>,
    pub online: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Developer {
    pub id: Id,
    pub name: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Gui,
    Cli,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_id: Id,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Id,
    pub name: String,
    pub developer_id: Id,
    pub description: String,
    pub game_type: GameType,
    pub max_players: u32,
    pub current_version: String,
    pub main_file: String,
    pub server_file: String,
    pub uploaded_at: String,
    pub updated_at: String,
    pub status: GameStatus,
    pub ratings: Vec<u8>,
    pub reviews: Vec<Review>,
}

impl Game {
    /// `None` if no ratings have been submitted yet, matching the source's
    /// `round(sum(ratings)/len(ratings), 2)` / `None` behavior.
    pub fn average_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        let sum: u32 = self.ratings.iter().map(|&r| r as u32).sum();
        let avg = sum as f64 / self.ratings.len() as f64;
        Some((avg * 100.0).round() / 100.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Idle,
    Playing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Id,
    pub name: String,
    pub host_user_id: Id,
    pub visibility: Visibility,
    pub invite_list: Vec<Id>,
    pub game_name: String,
    pub game_id: Id,
    pub status: RoomStatus,
    pub created_at: String,
    pub game_server_port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub user_id: Id,
    pub winner: WinnerState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WinnerState {
    Won(bool),
    Draw(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameLog {
    pub id: Id,
    pub match_id: String,
    pub room_id: Id,
    pub game_id: Id,
    pub game_name: String,
    pub game_version: String,
    pub users: Vec<String>,
    pub start_at: String,
    pub end_at: String,
    pub results: Vec<MatchResult>,
}

#[cfg(test)]
mod test {
    use super::*;

    /// `average_rating` is `None` with no ratings and rounds to two
    /// decimal places otherwise, matching the source's rounding rule.
    #[test]
    fn test_average_rating() {
        let mut game = sample_game();
        assert_eq!(game.average_rating(), None);
        game.ratings = vec![5, 4, 4];
        assert_eq!(game.average_rating(), Some(4.33));
    }

    fn sample_game() -> Game {
        Game {
            id: 1,
            name: "Test".into(),
            developer_id: 1,
            description: "".into(),
            game_type: GameType::Cli,
            max_players: 4,
            current_version: "1.0.0".into(),
            main_file: "main.py".into(),
            server_file: "server.py".into(),
            uploaded_at: "now".into(),
            updated_at: "now".into(),
            status: GameStatus::Active,
            ratings: vec![],
            reviews: vec![],
        }
    }
}
