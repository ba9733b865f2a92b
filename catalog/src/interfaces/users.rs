//! CRUD for the `User` collection.

use gamecore_protocol::entities::User;
use serde_json::{json, Value};

use super::{matches_filter, require_id, require_str};
use crate::error::CatalogError;
use crate::store::Store;

impl Store {
    /// Creates a user, rejecting a name already in use by another account.
    pub fn create_user(&self, data: Value) -> Result<Value, CatalogError> {
        let name = require_str(&data, "name")?.to_string();
        let password_hash = require_str(&data, "passwordHash")?.to_string();

        self.write(|snapshot| {
            if snapshot.users.values().any(|u| u.name == name) {
                return Err(CatalogError::Conflict(format!(
                    "user name '{name}' is already taken"
                )));
            }

            let id = snapshot.counters.user;
            snapshot.counters.user += 1;

            let user = User {
                id,
                name,
                password_hash,
                created_at: gamecore_common::time::now_iso8601(),
                last_login_at: None,
                online: 0,
            };
            snapshot.users.insert(id, user.clone());
            serde_json::to_value(user).map_err(CatalogError::from)
        })
    }

    pub fn read_user(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.read(|snapshot| {
            snapshot
                .users
                .get(&id)
                .map(|u| serde_json::to_value(u).expect("User always serializes"))
                .ok_or(CatalogError::NotFound("User", id))
        })
    }

    pub fn update_user(&self, data: Value) -> Result<Value, CatalogError> {
        let id = require_id(&data)?;
        self.write(|snapshot| {
            let user = snapshot
                .users
                .get_mut(&id)
                .ok_or(CatalogError::NotFound("User", id))?;

            if let Some(name) = data.get("name").and_then(Value::as_str) {
                user.name = name.to_string();
            }
            if let Some(hash) = data.get("passwordHash").and_then(Value::as_str) {
                user.password_hash = hash.to_string();
            }
            if let Some(online) = data.get("online").and_then(Value::as_u64) {
                user.online = online as u8;
            }
            if let Some(last_login) = data.get("lastLoginAt").and_then(Value::as_str) {
                user.last_login_at = Some(last_login.to_string());
            }

            Ok(serde_json::to_value(user.clone())?)
        })
    }

    pub fn query_users(&self, filter: Value) -> Result<Value, CatalogError> {
        self.read(|snapshot| {
            let results: Vec<Value> = snapshot
                .users
                .values()
                .map(|u| serde_json::to_value(u).expect("User always serializes"))
                .filter(|row| matches_filter(row, &filter))
                .collect();
            Ok(json!(results))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    fn store() -> Store {
        let dir = tempdir().unwrap();
        Store::open(dir.path().join("database.json")).unwrap()
    }

    /// Creating a second user with the same name is rejected.
    #[test]
    fn test_duplicate_name_rejected() {
        let store = store();
        store
            .create_user(json!({"name": "alice", "passwordHash": "x"}))
            .unwrap();
        let err = store
            .create_user(json!({"name": "alice", "passwordHash": "y"}))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Conflict(_)));
    }

    /// A created user round-trips through read with its assigned id.
    #[test]
    fn test_create_then_read() {
        let store = store();
        let created = store
            .create_user(json!({"name": "bob", "passwordHash": "x"}))
            .unwrap();
        let id = created["id"].as_u64().unwrap();
        let fetched = store.read_user(json!({"id": id})).unwrap();
        assert_eq!(fetched["name"], "bob");
    }
}
