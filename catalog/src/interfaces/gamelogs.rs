//! CRUD for the append-only `GameLog` collection.

use gamecore_protocol::entities::{GameLog, MatchResult};
use serde_json::{json, Value};

use super::{matches_filter, require_id, require_str};
use crate::error::CatalogError;
use crate::store::Store;

impl Store {
    pub fn create_gamelog(&self, data: Value) -> Result<Value, CatalogError> {
        let match_id = require_str(&data, "matchId")?.to_string();
        let room_id = data
            .get("roomId")
            .and_then(Value::as_u64)
            .ok_or_else(|| CatalogError::Validation("missing required field `roomId`".into()))?
            as u32;
        let game_id = data
            .get("gameId")
            .and_then(Value::as_u64)
            .ok_or_else(|| CatalogError::Validation("missing required field `gameId`".into()))?
            as u32;
        let game_name = require_str(&data, "gameName")?.to_string();
        let game_version = require_str(&data, "gameVersion")?.to_string();
        let users: Vec<String> = data
            .get("users")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let start_at = data
            .get("startAt")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(gamecore_common::time::now_iso8601);
        let end_at = data
            .get("endAt")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(gamecore_common::time::now_iso8601);

        self.write(|snapshot| {
            let id = snapshot.counters.game_log;
            snapshot.counters.game_log += 1;

            let log = GameLog {
                id,
                match_id,
                room_id,
                game_id,
                game_name,
                game_version,
                users,
                start_at,
                end_at,
                results: Vec::new(),
            };
            snapshot.game_logs.insert(id, log.clone());
            Ok(serde_json::to_value(log)?)
        })
    }

    pub fn read_gamelog(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.read(|snapshot| {
            snapshot
                .game_logs
                .get(&id)
                .map(|l| serde_json::to_value(l).expect("GameLog always serializes"))
                .ok_or(CatalogError::NotFound("GameLog", id))
        })
    }

    pub fn update_gamelog(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.write(|snapshot| {
            let log = snapshot
                .game_logs
                .get_mut(&id)
                .ok_or(CatalogError::NotFound("GameLog", id))?;

            if let Some(end_at) = data.get("endAt").and_then(Value::as_str) {
                log.end_at = end_at.to_string();
            }
            if let Some(results) = data.get("results") {
                log.results = serde_json::from_value::<Vec<MatchResult>>(results.clone())?;
            }

            Ok(serde_json::to_value(log.clone())?)
        })
    }

    pub fn query_gamelogs(&self, filter: Value) -> Result<Value, CatalogError> {
        self.read(|snapshot| {
            let results: Vec<Value> = snapshot
                .game_logs
                .values()
                .map(|l| serde_json::to_value(l).expect("GameLog always serializes"))
                .filter(|row| matches_filter(row, &filter))
                .collect();
            Ok(json!(results))
        })
    }
}
