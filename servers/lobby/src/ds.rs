//! Typed helpers over the pooled data-store connection, so the command
//! handlers deal in `User`/`Game`/`Room` values instead of raw JSON.

use gamecore_protocol::ds::{Collection, DsRequest};
use gamecore_protocol::ds_client::DsPool;
use gamecore_protocol::entities::{Game, GameLog, Id, Room, User};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::LobbyError;

#[derive(Clone)]
pub struct DsClient {
    pool: Arc<DsPool>,
}

impl DsClient {
    pub fn new(pool: Arc<DsPool>) -> Self {
        Self { pool }
    }

    async fn call(&self, collection: Collection, action: &str, data: Value) -> Result<Value, LobbyError> {
        let response = self.pool.request(DsRequest::new(collection, action, data)).await?;
        if !response.is_success() {
            return Err(LobbyError::DataStore(
                response.message().unwrap_or("unknown data store error").to_string(),
            ));
        }
        Ok(response.body)
    }

    pub async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, LobbyError> {
        let body = self.call(Collection::User, "query", json!({ "name": name })).await?;
        let users: Vec<User> = serde_json::from_value(body).unwrap_or_default();
        Ok(users.into_iter().next())
    }

    pub async fn get_user(&self, id: Id) -> Result<User, LobbyError> {
        let body = self.call(Collection::User, "read", json!({ "id": id })).await?;
        Ok(serde_json::from_value(body).map_err(|e| LobbyError::DataStore(e.to_string()))?)
    }

    pub async fn create_user(&self, name: &str, password_hash: &str) -> Result<User, LobbyError> {
        let body = self
            .call(
                Collection::User,
                "create",
                json!({ "name": name, "passwordHash": password_hash }),
            )
            .await?;
        Ok(serde_json::from_value(body).map_err(|e| LobbyError::DataStore(e.to_string()))?)
    }

    pub async fn set_user_online(&self, id: Id, online: u8, last_login_at: Option<&str>) -> Result<(), LobbyError> {
        let mut data = json!({ "id": id, "online": online });
        if let Some(ts) = last_login_at {
            data["lastLoginAt"] = json!(ts);
        }
        self.call(Collection::User, "update", data).await?;
        Ok(())
    }

    pub async fn find_active_game_by_name(&self, name: &str) -> Result<Option<Game>, LobbyError> {
        let body = self
            .call(Collection::Game, "query", json!({ "name": name, "status": "active" }))
            .await?;
        let games: Vec<Game> = serde_json::from_value(body).unwrap_or_default();
        Ok(games.into_iter().next())
    }

    pub async fn browse_store(&self) -> Result<Vec<Game>, LobbyError> {
        let body = self
            .call(Collection::Game, "query", json!({ "browsing": true }))
            .await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    pub async fn get_game(&self, id: Id) -> Result<Option<Game>, LobbyError> {
        let body = self.call(Collection::Game, "read", json!({ "id": id })).await;
        match body {
            Ok(body) => Ok(Some(
                serde_json::from_value(body).map_err(|e| LobbyError::DataStore(e.to_string()))?,
            )),
            Err(_) => Ok(None),
        }
    }

    pub async fn add_rating(&self, game_id: Id, user_id: Id, rating: u8, review: Option<&str>) -> Result<(), LobbyError> {
        let mut data = json!({ "id": game_id, "rating": rating, "userId": user_id });
        if let Some(text) = review {
            data["review"] = json!(text);
        }
        self.call(Collection::Game, "add_rating", data).await?;
        Ok(())
    }

    pub async fn create_room(&self, name: &str, host_user_id: Id, private: bool, game_name: &str, game_id: Id) -> Result<Room, LobbyError> {
        let body = self
            .call(
                Collection::Room,
                "create",
                json!({
                    "name": name,
                    "hostUserId": host_user_id,
                    "visibility": if private { "private" } else { "public" },
                    "gameName": game_name,
                    "gameId": game_id,
                }),
            )
            .await?;
        Ok(serde_json::from_value(body).map_err(|e| LobbyError::DataStore(e.to_string()))?)
    }

    pub async fn get_room(&self, id: Id) -> Result<Room, LobbyError> {
        let body = self.call(Collection::Room, "read", json!({ "id": id })).await?;
        Ok(serde_json::from_value(body).map_err(|e| LobbyError::DataStore(e.to_string()))?)
    }

    pub async fn list_rooms(&self) -> Result<Vec<Room>, LobbyError> {
        let body = self.call(Collection::Room, "query", json!({})).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    pub async fn update_room_invite_list(&self, id: Id, invite_list: &[Id]) -> Result<(), LobbyError> {
        self.call(Collection::Room, "update", json!({ "id": id, "inviteList": invite_list })).await?;
        Ok(())
    }

    pub async fn set_room_playing(&self, id: Id, port: u16) -> Result<(), LobbyError> {
        self.call(
            Collection::Room,
            "update",
            json!({ "id": id, "status": "playing", "gameServerPort": port }),
        )
        .await?;
        Ok(())
    }

    pub async fn set_room_idle(&self, id: Id) -> Result<(), LobbyError> {
        self.call(
            Collection::Room,
            "update",
            json!({ "id": id, "status": "idle", "gameServerPort": Value::Null }),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_all_rooms(&self) -> Result<(), LobbyError> {
        let rooms = self.list_rooms().await?;
        for room in rooms {
            self.call(Collection::Room, "delete", json!({ "id": room.id })).await?;
        }
        Ok(())
    }

    /// Records a completed match. `data` carries whatever subset of
    /// `{matchId, roomId, gameId, gameName, gameVersion, users, startAt,
    /// endAt}` the caller already has on hand (the `game_ended` callback
    /// supplies all of it directly); anything left out falls back to the
    /// catalog's own defaults.
    pub async fn create_gamelog(&self, data: Value) -> Result<GameLog, LobbyError> {
        let body = self.call(Collection::GameLog, "create", data).await?;
        Ok(serde_json::from_value(body).map_err(|e| LobbyError::DataStore(e.to_string()))?)
    }

    pub async fn query_gamelogs(&self) -> Result<Vec<GameLog>, LobbyError> {
        let body = self.call(Collection::GameLog, "query", json!({})).await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }

    pub async fn finish_gamelog(&self, id: Id, results: Value) -> Result<(), LobbyError> {
        let now = gamecore_common::time::now_iso8601();
        self.call(
            Collection::GameLog,
            "update",
            json!({ "id": id, "endAt": now, "results": results }),
        )
        .await?;
        Ok(())
    }

    /// Seeds an active game directly against the data store, bypassing
    /// the developer service. Test-only: command handlers never create
    /// games themselves.
    #[cfg(test)]
    pub async fn create_game_for_test(&self, name: &str, max_players: u32) -> Result<Game, LobbyError> {
        let body = self
            .call(
                Collection::Game,
                "create",
                json!({
                    "name": name,
                    "developerId": 1,
                    "description": "test game",
                    "gameType": "cli",
                    "maxPlayers": max_players,
                    "version": "1.0.0",
                    "mainFile": "main.py",
                    "serverFile": "server.py",
                }),
            )
            .await?;
        Ok(serde_json::from_value(body).map_err(|e| LobbyError::DataStore(e.to_string()))?)
    }

    #[cfg(test)]
    pub async fn set_game_inactive_for_test(&self, id: Id) -> Result<(), LobbyError> {
        self.call(Collection::Game, "update", json!({ "id": id, "status": "inactive" })).await?;
        Ok(())
    }
}
