use gamecore_protocol::entities::{RoomStatus, Visibility};
use serde_json::{json, Value};

use super::{require_authenticated, require_id, require_str};
use crate::error::LobbyError;
use crate::session::{ConnState, LobbyContext};
use crate::state::{JoinRoom, LeaveRoom};

pub async fn list_online_users(ctx: &LobbyContext, conn: &mut ConnState) -> Result<Value, LobbyError> {
    require_authenticated(conn)?;
    let ids = ctx.actor.send(crate::state::ListOnlineUsers {}).await.unwrap_or_default();

    let mut names = Vec::with_capacity(ids.len());
    for id in ids {
        if let Ok(user) = ctx.ds.get_user(id).await {
            names.push(json!({ "id": user.id, "username": user.name }));
        }
    }
    Ok(json!({ "users": names }))
}

pub async fn list_rooms(ctx: &LobbyContext, conn: &mut ConnState) -> Result<Value, LobbyError> {
    require_authenticated(conn)?;
    let rooms = ctx.ds.list_rooms().await?;

    let mut out = Vec::with_capacity(rooms.len());
    for room in rooms {
        let host = ctx.ds.get_user(room.host_user_id).await.ok();
        let game = ctx.ds.get_game(room.game_id).await.ok().flatten();
        out.push(json!({
            "id": room.id,
            "name": room.name,
            "hostUsername": host.map(|h| h.name),
            "gameName": room.game_name,
            "maxPlayers": game.map(|g| g.max_players),
            "status": serde_json::to_value(room.status).expect("RoomStatus always serializes"),
            "visibility": serde_json::to_value(room.visibility).expect("Visibility always serializes"),
        }));
    }
    Ok(json!({ "rooms": out }))
}

pub async fn create_room(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    let user_id = require_authenticated(conn)?;
    let name = require_str(request, "room_name")?;
    let game_name = require_str(request, "game_name")?;
    let private = request.get("visibility").and_then(Value::as_str) == Some("private");

    let game = ctx
        .ds
        .find_active_game_by_name(game_name)
        .await?
        .ok_or_else(|| LobbyError::GameNotFound(game_name.to_string()))?;

    let room = ctx.ds.create_room(name, user_id, private, game_name, game.id).await?;

    ctx.actor
        .send(JoinRoom {
            room_id: room.id,
            user_id,
            max_players: game.max_players,
        })
        .await
        .map_err(|_| LobbyError::DataStore("lobby actor unavailable".to_string()))??;

    Ok(json!({ "roomId": room.id, "name": room.name }))
}

pub async fn join_room(
    ctx: &LobbyContext,
    conn: &mut ConnState,
    request: &Value,
    from_invitation: bool,
) -> Result<Value, LobbyError> {
    let user_id = require_authenticated(conn)?;
    let room_id = require_id(request, "roomId")?;

    let room = ctx.ds.get_room(room_id).await.map_err(|_| LobbyError::RoomNotFound)?;

    if room.status == RoomStatus::Playing {
        return Err(LobbyError::RoomPlaying);
    }

    if room.visibility == Visibility::Private && room.host_user_id != user_id && !from_invitation {
        let invited = room.invite_list.contains(&user_id);
        if !invited {
            return Err(LobbyError::RoomPrivate);
        }
    }

    let game = ctx
        .ds
        .get_game(room.game_id)
        .await?
        .ok_or_else(|| LobbyError::GameNotFound(room.game_name.clone()))?;

    let member_count = ctx
        .actor
        .send(JoinRoom {
            room_id,
            user_id,
            max_players: game.max_players,
        })
        .await
        .map_err(|_| LobbyError::DataStore("lobby actor unavailable".to_string()))??;

    Ok(json!({ "roomId": room_id, "memberCount": member_count }))
}

pub async fn leave_room(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    let user_id = require_authenticated(conn)?;
    let room_id = require_id(request, "roomId")?;

    ctx.actor
        .send(LeaveRoom { room_id, user_id })
        .await
        .map_err(|_| LobbyError::DataStore("lobby actor unavailable".to_string()))?;

    Ok(json!({}))
}

pub async fn check_room_status(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    require_authenticated(conn)?;
    let room_id = require_id(request, "roomId")?;

    let room = ctx.ds.get_room(room_id).await.map_err(|_| LobbyError::RoomNotFound)?;

    if room.status != RoomStatus::Playing {
        return Ok(json!({ "gameStarted": false }));
    }

    let port = ctx
        .actor
        .send(crate::state::GameServerPort { room_id })
        .await
        .unwrap_or(None);
    let game = ctx.ds.get_game(room.game_id).await?;

    Ok(json!({
        "gameStarted": true,
        "gameServerPort": port,
        "gameName": room.game_name,
        "gameVersion": game.map(|g| g.current_version),
    }))
}
