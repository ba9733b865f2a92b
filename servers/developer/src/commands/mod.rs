pub mod auth;
pub mod games;

use gamecore_protocol::entities::Id;
use gamecore_protocol::frame::FrameCodec;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::error::DeveloperError;
use crate::session::DevContext;

pub fn ok(body: Value) -> Value {
    let mut map = body.as_object().cloned().unwrap_or_default();
    map.insert("status".to_string(), json!("success"));
    Value::Object(map)
}

pub fn err(error: DeveloperError) -> Value {
    json!({ "status": "error", "message": error.message() })
}

/// Routes one decoded request to its command handler. `upload_game` and
/// `update_game` are the only commands that drop into raw file receiving,
/// so they alone take the `framed` connection directly.
pub async fn dispatch(ctx: &DevContext, framed: &mut Framed<TcpStream, FrameCodec>, request: Value) -> Value {
    let command = request.get("command").and_then(Value::as_str).unwrap_or("");

    let result = match command {
        "dev_register" => auth::dev_register(ctx, &request).await,
        "dev_login" => auth::dev_login(ctx, &request).await,
        "upload_game" => games::upload_game(ctx, &request, framed).await,
        "update_game" => games::update_game(ctx, &request, framed).await,
        "remove_game" => games::remove_game(ctx, &request).await,
        "list_my_games" => games::list_my_games(ctx, &request).await,
        other => Err(DeveloperError::DataStore(format!("unknown command '{other}'"))),
    };

    match result {
        Ok(body) => ok(body),
        Err(error) => err(error),
    }
}

pub(crate) fn require_str<'a>(data: &'a Value, field: &'static str) -> Result<&'a str, DeveloperError> {
    data.get(field)
        .and_then(Value::as_str)
        .ok_or(DeveloperError::MissingField(field))
}

pub(crate) fn require_id(data: &Value, field: &'static str) -> Result<Id, DeveloperError> {
    data.get(field)
        .and_then(Value::as_u64)
        .map(|v| v as Id)
        .ok_or(DeveloperError::MissingField(field))
}

pub(crate) fn require_u32(data: &Value, field: &'static str) -> Result<u32, DeveloperError> {
    data.get(field)
        .and_then(Value::as_u64)
        .map(|v| v as u32)
        .ok_or(DeveloperError::MissingField(field))
}
