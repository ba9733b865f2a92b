use thiserror::Error;

#[derive(Debug, Error)]
pub enum LobbyError {
    #[error("user is already logged in")]
    AlreadyLoggedIn,
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("room not found")]
    RoomNotFound,
    #[error("room is full")]
    RoomFull,
    #[error("room is private")]
    RoomPrivate,
    #[error("room is already playing")]
    RoomPlaying,
    #[error("only the host can do that")]
    NotHost,
    #[error("user is not online")]
    UserOffline,
    #[error("an invitation already exists for this user and room")]
    DuplicateInvitation,
    #[error("no pending invitation for this room")]
    NoInvitation,
    #[error("game '{0}' has been removed by its developer")]
    GameRemoved(String),
    #[error("game '{0}' was not found")]
    GameNotFound(String),
    #[error("room does not have the exact number of players required to start")]
    WrongPlayerCount,
    #[error("no free game server port available")]
    NoFreePort,
    #[error("you must play this game before reviewing it")]
    MustPlayFirst,
    #[error("rating must be between 0 and 5")]
    InvalidRating,
    #[error(transparent)]
    DsClient(#[from] gamecore_protocol::ds_client::DsClientError),
    #[error("data store error: {0}")]
    DataStore(String),
}

impl LobbyError {
    pub fn message(&self) -> String {
        self.to_string()
    }
}
