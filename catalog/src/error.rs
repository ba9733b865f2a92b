use gamecore_protocol::entities::Id;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} {1} not found")]
    NotFound(&'static str, Id),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("failed to persist snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
