pub mod auth;
pub mod catalog;
pub mod invitations;
pub mod matches;
pub mod rooms;

use gamecore_protocol::frame::FrameCodec;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::error::LobbyError;
use crate::session::{ConnState, LobbyContext};

pub fn ok(body: Value) -> Value {
    let mut map = body.as_object().cloned().unwrap_or_default();
    map.insert("status".to_string(), json!("success"));
    Value::Object(map)
}

pub fn err(error: LobbyError) -> Value {
    json!({ "status": "error", "message": error.message() })
}

/// Routes one decoded request to its command handler. `download_game` is
/// the only command that needs to drop into raw file streaming, so it
/// alone takes the `framed` connection directly; every other command only
/// needs the single JSON response value.
pub async fn dispatch(
    ctx: &LobbyContext,
    conn: &mut ConnState,
    framed: &mut Framed<TcpStream, FrameCodec>,
    request: Value,
) -> Value {
    let command = request.get("command").and_then(Value::as_str).unwrap_or("");

    let result = match command {
        "register" => auth::register(ctx, &request).await,
        "login" => auth::login(ctx, conn, &request).await,
        "logout" => auth::logout(ctx, conn).await,
        "list_users" => rooms::list_online_users(ctx, conn).await,
        "list_rooms" => rooms::list_rooms(ctx, conn).await,
        "create_room" => rooms::create_room(ctx, conn, &request).await,
        "join_room" => rooms::join_room(ctx, conn, &request, false).await,
        "leave_room" => rooms::leave_room(ctx, conn, &request).await,
        "check_room_status" => rooms::check_room_status(ctx, conn, &request).await,
        "invite_user" => invitations::invite_user(ctx, conn, &request).await,
        "list_invitations" => invitations::list_invitations(ctx, conn).await,
        "accept_invitation" => invitations::accept_invitation(ctx, conn, &request).await,
        "start_game" => matches::start_game(ctx, conn, &request).await,
        "game_ended" => matches::game_ended(ctx, &request).await,
        "browse_store" => catalog::browse_store(ctx, conn).await,
        "get_game_by_name" => catalog::get_game_by_name(ctx, conn, &request).await,
        "download_game" => catalog::download_game(ctx, conn, &request, framed).await,
        "submit_review" => catalog::submit_review(ctx, conn, &request).await,
        "check_play_history" => catalog::check_play_history(ctx, conn, &request).await,
        other => Err(LobbyError::DataStore(format!("unknown command '{other}'"))),
    };

    match result {
        Ok(body) => ok(body),
        Err(error) => err(error),
    }
}

pub(crate) fn require_authenticated(conn: &ConnState) -> Result<gamecore_protocol::entities::Id, LobbyError> {
    conn.user_id.ok_or(LobbyError::NotAuthenticated)
}

pub(crate) fn require_str<'a>(data: &'a Value, field: &str) -> Result<&'a str, LobbyError> {
    data.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| LobbyError::DataStore(format!("missing required field `{field}`")))
}

pub(crate) fn require_id(data: &Value, field: &str) -> Result<gamecore_protocol::entities::Id, LobbyError> {
    data.get(field)
        .and_then(Value::as_u64)
        .map(|v| v as gamecore_protocol::entities::Id)
        .ok_or_else(|| LobbyError::DataStore(format!("missing required field `{field}`")))
}
