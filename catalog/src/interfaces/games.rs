//! CRUD for the `Game` collection, plus the `add_rating` action and the
//! catalog-browsing query semantics.

use gamecore_protocol::entities::{Game, GameStatus, GameType, Review};
use serde_json::{json, Value};

use super::{require_id, require_str};
use crate::error::CatalogError;
use crate::store::Store;

impl Store {
    pub fn create_game(&self, data: Value) -> Result<Value, CatalogError> {
        let name = require_str(&data, "name")?.to_string();
        let developer_id = data
            .get("developerId")
            .and_then(Value::as_u64)
            .ok_or_else(|| CatalogError::Validation("missing required field `developerId`".into()))?
            as u32;
        let description = require_str(&data, "description")?.to_string();
        let game_type = match require_str(&data, "gameType")?.to_ascii_lowercase().as_str() {
            "gui" => GameType::Gui,
            "cli" => GameType::Cli,
            other => {
                return Err(CatalogError::Validation(format!(
                    "invalid gameType '{other}'"
                )))
            }
        };
        let max_players = data
            .get("maxPlayers")
            .and_then(Value::as_u64)
            .ok_or_else(|| CatalogError::Validation("missing required field `maxPlayers`".into()))?
            as u32;
        if max_players < 2 {
            return Err(CatalogError::Validation(
                "maxPlayers must be at least 2".into(),
            ));
        }
        let current_version = require_str(&data, "version")?.to_string();
        let main_file = require_str(&data, "mainFile")?.to_string();
        let server_file = require_str(&data, "serverFile")?.to_string();

        self.write(|snapshot| {
            let id = snapshot.counters.game;
            snapshot.counters.game += 1;
            let now = gamecore_common::time::now_iso8601();

            let game = Game {
                id,
                name,
                developer_id,
                description,
                game_type,
                max_players,
                current_version,
                main_file,
                server_file,
                uploaded_at: now.clone(),
                updated_at: now,
                status: GameStatus::Active,
                ratings: Vec::new(),
                reviews: Vec::new(),
            };
            snapshot.games.insert(id, game.clone());
            Ok(serde_json::to_value(game)?)
        })
    }

    pub fn read_game(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.read(|snapshot| {
            snapshot
                .games
                .get(&id)
                .map(|g| serde_json::to_value(g).expect("Game always serializes"))
                .ok_or(CatalogError::NotFound("Game", id))
        })
    }

    pub fn update_game(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.write(|snapshot| {
            let game = snapshot
                .games
                .get_mut(&id)
                .ok_or(CatalogError::NotFound("Game", id))?;

            if let Some(version) = data.get("currentVersion").and_then(Value::as_str) {
                game.current_version = version.to_string();
            }
            if let Some(main_file) = data.get("mainFile").and_then(Value::as_str) {
                game.main_file = main_file.to_string();
            }
            if let Some(server_file) = data.get("serverFile").and_then(Value::as_str) {
                game.server_file = server_file.to_string();
            }
            if let Some(status) = data.get("status").and_then(Value::as_str) {
                game.status = match status {
                    "active" => GameStatus::Active,
                    "inactive" => GameStatus::Inactive,
                    other => {
                        return Err(CatalogError::Validation(format!(
                            "invalid status '{other}'"
                        )))
                    }
                };
            }
            game.updated_at = gamecore_common::time::now_iso8601();

            Ok(serde_json::to_value(game.clone())?)
        })
    }

    pub fn delete_game(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.write(|snapshot| {
            snapshot
                .games
                .remove(&id)
                .ok_or(CatalogError::NotFound("Game", id))?;
            Ok(json!({ "id": id }))
        })
    }

    /// Appends a rating (and, if `review` text is present, a review entry)
    /// to the game.
    pub fn add_rating(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        let rating = data
            .get("rating")
            .and_then(Value::as_u64)
            .ok_or_else(|| CatalogError::Validation("missing required field `rating`".into()))?;
        if rating > 5 {
            return Err(CatalogError::Validation(
                "rating must be between 0 and 5".into(),
            ));
        }

        self.write(|snapshot| {
            let game = snapshot
                .games
                .get_mut(&id)
                .ok_or(CatalogError::NotFound("Game", id))?;
            game.ratings.push(rating as u8);

            if let Some(text) = data.get("review").and_then(Value::as_str) {
                if !text.is_empty() {
                    let user_id = data
                        .get("userId")
                        .and_then(Value::as_u64)
                        .ok_or_else(|| {
                            CatalogError::Validation("missing required field `userId`".into())
                        })? as u32;
                    game.reviews.push(Review {
                        user_id,
                        text: text.to_string(),
                        timestamp: gamecore_common::time::now_iso8601(),
                    });
                }
            }

            Ok(serde_json::to_value(game.clone())?)
        })
    }

    /// Conjunctive query with catalog-browsing semantics: an explicit
    /// `status` filter matches exactly; absent that, a `browsing` flag
    /// restricts results to `status == active`; every other key in
    /// `filter` is matched by plain equality against the game's fields.
    pub fn query_games(&self, filter: Value) -> Result<Value, CatalogError> {
        self.read(|snapshot| {
            let filter_obj = filter.as_object().cloned().unwrap_or_default();
            let explicit_status = filter_obj.get("status").and_then(Value::as_str);
            let browsing = filter_obj.contains_key("browsing");

            let results: Vec<Value> = snapshot
                .games
                .values()
                .filter(|game| {
                    if let Some(status) = explicit_status {
                        let matches = match status {
                            "active" => game.status == GameStatus::Active,
                            "inactive" => game.status == GameStatus::Inactive,
                            _ => false,
                        };
                        if !matches {
                            return false;
                        }
                    } else if browsing && game.status != GameStatus::Active {
                        return false;
                    }
                    true
                })
                .map(|g| serde_json::to_value(g).expect("Game always serializes"))
                .filter(|row| {
                    filter_obj
                        .iter()
                        .filter(|(key, _)| key.as_str() != "status" && key.as_str() != "browsing")
                        .all(|(key, expected)| row.get(key) == Some(expected))
                })
                .collect();
            Ok(json!(results))
        })
    }
}
