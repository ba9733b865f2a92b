use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeveloperError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("game not found")]
    GameNotFound,
    #[error("only the owning developer can do that")]
    NotOwner,
    #[error("this game version already exists")]
    VersionExists,
    #[error("version must match the format x.y.z")]
    InvalidVersion,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error(transparent)]
    DsClient(#[from] gamecore_protocol::ds_client::DsClientError),
    #[error(transparent)]
    FileTransfer(#[from] gamecore_protocol::file_transfer::FileTransferError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("data store error: {0}")]
    DataStore(String),
}

impl DeveloperError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
