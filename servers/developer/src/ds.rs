//! Typed helpers over the pooled data-store connection, mirroring the
//! lobby service's `ds.rs` but scoped to what the developer service needs.

use gamecore_protocol::ds::{Collection, DsRequest};
use gamecore_protocol::ds_client::DsPool;
use gamecore_protocol::entities::{Developer, Game, Id};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::DeveloperError;

#[derive(Clone)]
pub struct DsClient {
    pool: Arc<DsPool>,
}

impl DsClient {
    pub fn new(pool: Arc<DsPool>) -> Self {
        Self { pool }
    }

    async fn call(&self, collection: Collection, action: &str, data: Value) -> Result<Value, DeveloperError> {
        let response = self.pool.request(DsRequest::new(collection, action, data)).await?;
        if !response.is_success() {
            return Err(DeveloperError::DataStore(
                response.message().unwrap_or("unknown data store error").to_string(),
            ));
        }
        Ok(response.body)
    }

    pub async fn find_developer_by_name(&self, name: &str) -> Result<Option<Developer>, DeveloperError> {
        let body = self
            .call(Collection::Developer, "query", json!({ "name": name }))
            .await?;
        let developers: Vec<Developer> = serde_json::from_value(body).unwrap_or_default();
        Ok(developers.into_iter().next())
    }

    pub async fn create_developer(&self, name: &str, password_hash: &str) -> Result<Developer, DeveloperError> {
        let body = self
            .call(
                Collection::Developer,
                "create",
                json!({ "name": name, "passwordHash": password_hash }),
            )
            .await?;
        Ok(serde_json::from_value(body).map_err(|e| DeveloperError::DataStore(e.to_string()))?)
    }

    pub async fn find_game(&self, developer_id: Id, name: &str, version: &str) -> Result<Option<Game>, DeveloperError> {
        let body = self
            .call(
                Collection::Game,
                "query",
                json!({ "developerId": developer_id, "name": name }),
            )
            .await?;
        let games: Vec<Game> = serde_json::from_value(body).unwrap_or_default();
        Ok(games.into_iter().find(|g| g.current_version == version))
    }

    pub async fn get_game(&self, id: Id) -> Result<Option<Game>, DeveloperError> {
        let body = self.call(Collection::Game, "read", json!({ "id": id })).await;
        match body {
            Ok(body) => Ok(Some(
                serde_json::from_value(body).map_err(|e| DeveloperError::DataStore(e.to_string()))?,
            )),
            Err(_) => Ok(None),
        }
    }

    pub async fn create_game(&self, game_info: &Value, developer_id: Id) -> Result<Game, DeveloperError> {
        let mut data = game_info.clone();
        data["developerId"] = json!(developer_id);
        let body = self.call(Collection::Game, "create", data).await?;
        Ok(serde_json::from_value(body).map_err(|e| DeveloperError::DataStore(e.to_string()))?)
    }

    pub async fn update_game_version(
        &self,
        game_id: Id,
        version: &str,
        main_file: &str,
        server_file: &str,
    ) -> Result<Game, DeveloperError> {
        let body = self
            .call(
                Collection::Game,
                "update",
                json!({
                    "id": game_id,
                    "currentVersion": version,
                    "mainFile": main_file,
                    "serverFile": server_file,
                }),
            )
            .await?;
        Ok(serde_json::from_value(body).map_err(|e| DeveloperError::DataStore(e.to_string()))?)
    }

    pub async fn set_game_inactive(&self, game_id: Id) -> Result<(), DeveloperError> {
        self.call(Collection::Game, "update", json!({ "id": game_id, "status": "inactive" }))
            .await?;
        Ok(())
    }

    pub async fn list_games_for_developer(&self, developer_id: Id) -> Result<Vec<Game>, DeveloperError> {
        let body = self
            .call(Collection::Game, "query", json!({ "developerId": developer_id }))
            .await?;
        Ok(serde_json::from_value(body).unwrap_or_default())
    }
}
