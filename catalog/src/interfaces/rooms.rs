//! CRUD for the `Room` collection.

use gamecore_protocol::entities::{Room, RoomStatus, Visibility};
use serde_json::{json, Value};

use super::{matches_filter, require_id, require_str};
use crate::error::CatalogError;
use crate::store::Store;

impl Store {
    pub fn create_room(&self, data: Value) -> Result<Value, CatalogError> {
        let name = require_str(&data, "name")?.to_string();
        let host_user_id = data
            .get("hostUserId")
            .and_then(Value::as_u64)
            .ok_or_else(|| CatalogError::Validation("missing required field `hostUserId`".into()))?
            as u32;
        let visibility = match data.get("visibility").and_then(Value::as_str) {
            Some("private") => Visibility::Private,
            _ => Visibility::Public,
        };
        let game_name = require_str(&data, "gameName")?.to_string();
        let game_id = data
            .get("gameId")
            .and_then(Value::as_u64)
            .ok_or_else(|| CatalogError::Validation("missing required field `gameId`".into()))?
            as u32;

        self.write(|snapshot| {
            let id = snapshot.counters.room;
            snapshot.counters.room += 1;

            let room = Room {
                id,
                name,
                host_user_id,
                visibility,
                invite_list: Vec::new(),
                game_name,
                game_id,
                status: RoomStatus::Idle,
                created_at: gamecore_common::time::now_iso8601(),
                game_server_port: None,
            };
            snapshot.rooms.insert(id, room.clone());
            Ok(serde_json::to_value(room)?)
        })
    }

    pub fn read_room(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.read(|snapshot| {
            snapshot
                .rooms
                .get(&id)
                .map(|r| serde_json::to_value(r).expect("Room always serializes"))
                .ok_or(CatalogError::NotFound("Room", id))
        })
    }

    pub fn update_room(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.write(|snapshot| {
            let room = snapshot
                .rooms
                .get_mut(&id)
                .ok_or(CatalogError::NotFound("Room", id))?;

            if let Some(status) = data.get("status").and_then(Value::as_str) {
                room.status = match status {
                    "idle" => RoomStatus::Idle,
                    "playing" => RoomStatus::Playing,
                    other => {
                        return Err(CatalogError::Validation(format!(
                            "invalid status '{other}'"
                        )))
                    }
                };
            }
            if data.get("gameServerPort").is_some() {
                room.game_server_port = data
                    .get("gameServerPort")
                    .and_then(Value::as_u64)
                    .map(|p| p as u16);
            }
            if let Some(invite_list) = data.get("inviteList").and_then(Value::as_array) {
                room.invite_list = invite_list
                    .iter()
                    .filter_map(Value::as_u64)
                    .map(|id| id as u32)
                    .collect();
            }

            Ok(serde_json::to_value(room.clone())?)
        })
    }

    pub fn delete_room(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.write(|snapshot| {
            snapshot
                .rooms
                .remove(&id)
                .ok_or(CatalogError::NotFound("Room", id))?;
            Ok(json!({ "id": id }))
        })
    }

    pub fn query_rooms(&self, filter: Value) -> Result<Value, CatalogError> {
        self.read(|snapshot| {
            let results: Vec<Value> = snapshot
                .rooms
                .values()
                .map(|r| serde_json::to_value(r).expect("Room always serializes"))
                .filter(|row| matches_filter(row, &filter))
                .collect();
            Ok(json!(results))
        })
    }

    /// Deletes every room, matching the lobby's startup cleanup which
    /// purges all rooms unconditionally (see design notes Open Question).
    pub fn delete_all_rooms(&self) -> Result<usize, CatalogError> {
        self.write(|snapshot| {
            let count = snapshot.rooms.len();
            snapshot.rooms.clear();
            Ok(count)
        })
    }
}
