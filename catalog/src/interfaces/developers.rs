//! CRUD for the `Developer` collection.

use gamecore_protocol::entities::Developer;
use serde_json::{json, Value};

use super::{matches_filter, require_id, require_str};
use crate::error::CatalogError;
use crate::store::Store;

impl Store {
    pub fn create_developer(&self, data: Value) -> Result<Value, CatalogError> {
        let name = require_str(&data, "name")?.to_string();
        let password_hash = require_str(&data, "passwordHash")?.to_string();

        self.write(|snapshot| {
            if snapshot.developers.values().any(|d| d.name == name) {
                return Err(CatalogError::Conflict(format!(
                    "developer name '{name}' is already taken"
                )));
            }

            let id = snapshot.counters.developer;
            snapshot.counters.developer += 1;

            let developer = Developer {
                id,
                name,
                password_hash,
                created_at: gamecore_common::time::now_iso8601(),
            };
            snapshot.developers.insert(id, developer.clone());
            Ok(serde_json::to_value(developer)?)
        })
    }

    pub fn read_developer(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.read(|snapshot| {
            snapshot
                .developers
                .get(&id)
                .map(|d| serde_json::to_value(d).expect("Developer always serializes"))
                .ok_or(CatalogError::NotFound("Developer", id))
        })
    }

    pub fn update_developer(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.write(|snapshot| {
            let developer = snapshot
                .developers
                .get_mut(&id)
                .ok_or(CatalogError::NotFound("Developer", id))?;

            if let Some(name) = data.get("name").and_then(Value::as_str) {
                developer.name = name.to_string();
            }
            if let Some(hash) = data.get("passwordHash").and_then(Value::as_str) {
                developer.password_hash = hash.to_string();
            }

            Ok(serde_json::to_value(developer.clone())?)
        })
    }

    pub fn query_developers(&self, filter: Value) -> Result<Value, CatalogError> {
        self.read(|snapshot| {
            let results: Vec<Value> = snapshot
                .developers
                .values()
                .map(|d| serde_json::to_value(d).expect("Developer always serializes"))
                .filter(|row| matches_filter(row, &filter))
                .collect();
            Ok(json!(results))
        })
    }
}
