//! The data store's request/response envelope. Shared between the lobby
//! and developer services as DS clients, and used by the data store
//! service itself to dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "PascalCase")]
pub enum Collection {
    User,
    Developer,
    Game,
    Room,
    GameLog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsRequest {
    pub collection: Collection,
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

impl DsRequest {
    pub fn new(collection: Collection, action: impl Into<String>, data: Value) -> Self {
        Self {
            collection,
            action: action.into(),
            data,
        }
    }
}

/// Response envelope. `status` is always present; every other field is
/// action-specific, so it's carried as a flattened JSON object rather than
/// a fixed struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DsResponse {
    pub status: Status,
    #[serde(flatten)]
    pub body: Value,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl DsResponse {
    pub fn success(body: Value) -> Self {
        Self {
            status: Status::Success,
            body,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            body: serde_json::json!({ "message": message.into() }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}
