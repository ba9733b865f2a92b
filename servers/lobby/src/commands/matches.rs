use gamecore_common::bundle;
use serde_json::{json, Value};

use super::{require_authenticated, require_id};
use crate::error::LobbyError;
use crate::gameserver::{self, SpawnRequest};
use crate::session::{ConnState, LobbyContext};
use crate::state::{AllocateGameServer, ReleaseGameServer, RoomMembers};

/// Starts a match for a room: checks the game is still active, allocates
/// a port, spawns the game server subprocess and gives it a moment to
/// settle, flipping the room to `playing`. A dead subprocess is reported
/// as an error but its port/room state is *not* rolled back, matching the
/// source's behavior.
pub async fn start_game(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    let user_id = require_authenticated(conn)?;
    let room_id = require_id(request, "roomId")?;

    let room = ctx.ds.get_room(room_id).await.map_err(|_| LobbyError::RoomNotFound)?;
    if room.host_user_id != user_id {
        return Err(LobbyError::NotHost);
    }

    let game = ctx
        .ds
        .get_game(room.game_id)
        .await?
        .ok_or_else(|| LobbyError::GameNotFound(room.game_name.clone()))?;

    let members = ctx
        .actor
        .send(RoomMembers { room_id })
        .await
        .unwrap_or_default();
    if members.len() as u32 != game.max_players {
        return Err(LobbyError::WrongPlayerCount);
    }

    if game.status != gamecore_protocol::entities::GameStatus::Active {
        ctx.ds.set_room_idle(room_id).await?;
        return Err(LobbyError::GameRemoved(room.game_name));
    }

    let mut usernames = Vec::with_capacity(members.len());
    for member_id in &members {
        let user = ctx.ds.get_user(*member_id).await?;
        usernames.push(user.name);
    }

    let port = ctx
        .actor
        .send(AllocateGameServer { room_id })
        .await
        .map_err(|_| LobbyError::DataStore("lobby actor unavailable".to_string()))??;

    ctx.ds.set_room_playing(room_id, port).await?;

    let bundle_dir = bundle::version_dir(&ctx.bundle_root, &game.name, &game.current_version);
    let mut child = gameserver::spawn(SpawnRequest {
        bundle_dir: &bundle_dir,
        server_file: &game.server_file,
        port,
        room_id,
        game_id: game.id,
        game_name: &game.name,
        game_version: &game.current_version,
        usernames: &usernames,
    })
    .map_err(|err| LobbyError::DataStore(format!("failed to launch game server: {err}")))?;

    let alive = gameserver::settle_and_check_alive(&mut child)
        .await
        .map_err(|err| LobbyError::DataStore(format!("failed to poll game server: {err}")))?;
    if !alive {
        return Err(LobbyError::DataStore(
            "game server process exited immediately after launch".to_string(),
        ));
    }

    Ok(json!({
        "roomId": room_id,
        "gameServerPort": port,
        "gameName": game.name,
        "gameVersion": game.current_version,
        "players": usernames,
    }))
}

/// Callback from a game-server subprocess reporting a finished match.
/// Unauthenticated, per the wire contract (see the design notes on that
/// tradeoff). Transitions the room back to `idle`, releases its port, and
/// records a `GameLog` from the fields the subprocess supplied directly.
pub async fn game_ended(ctx: &LobbyContext, request: &Value) -> Result<Value, LobbyError> {
    let room_id = require_id(request, "roomId")?;

    ctx.ds.get_room(room_id).await.map_err(|_| LobbyError::RoomNotFound)?;
    ctx.ds.set_room_idle(room_id).await?;
    ctx.actor.send(ReleaseGameServer { room_id }).await.ok();

    let match_id = request
        .get("matchId")
        .and_then(Value::as_str)
        .ok_or_else(|| LobbyError::DataStore("missing required field `matchId`".to_string()))?;
    let game_id = require_id(request, "game_id")?;
    let game_name = request
        .get("game_name")
        .and_then(Value::as_str)
        .ok_or_else(|| LobbyError::DataStore("missing required field `game_name`".to_string()))?;
    let game_version = request
        .get("game_version")
        .and_then(Value::as_str)
        .ok_or_else(|| LobbyError::DataStore("missing required field `game_version`".to_string()))?;
    let users = request.get("users").cloned().unwrap_or_else(|| json!([]));

    let log = ctx
        .ds
        .create_gamelog(json!({
            "matchId": match_id,
            "roomId": room_id,
            "gameId": game_id,
            "gameName": game_name,
            "gameVersion": game_version,
            "users": users,
            "startAt": request.get("startAt"),
            "endAt": request.get("endAt"),
        }))
        .await?;

    if let Some(results) = request.get("results") {
        ctx.ds.finish_gamelog(log.id, results.clone()).await?;
    }

    Ok(json!({ "roomId": room_id, "matchId": log.match_id }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support;

    async fn setup_room(max_players: u32) -> (LobbyContext, gamecore_protocol::entities::Id, tempfile::TempDir) {
        let (ds, dir) = test_support::spawn_ds().await;
        ds.create_game_for_test("Coin", max_players).await.unwrap();
        let ctx = test_support::context(ds);

        let mut host = test_support::authed_conn(1, "alice");
        let created = crate::commands::rooms::create_room(
            &ctx,
            &mut host,
            &json!({"room_name": "r1", "game_name": "Coin", "visibility": "public"}),
        )
        .await
        .unwrap();
        let room_id = created["roomId"].as_u64().unwrap() as gamecore_protocol::entities::Id;
        (ctx, room_id, dir)
    }

    #[tokio::test]
    async fn test_start_game_non_host_rejected() {
        let (ctx, room_id, _dir) = setup_room(1).await;
        let mut not_host = test_support::authed_conn(2, "bob");
        let err = start_game(&ctx, &mut not_host, &json!({"roomId": room_id})).await;
        assert!(matches!(err, Err(LobbyError::NotHost)));
    }

    #[tokio::test]
    async fn test_start_game_wrong_player_count_rejected() {
        let (ctx, room_id, _dir) = setup_room(2).await;
        let mut host = test_support::authed_conn(1, "alice");
        let err = start_game(&ctx, &mut host, &json!({"roomId": room_id})).await;
        assert!(matches!(err, Err(LobbyError::WrongPlayerCount)));
    }

    #[tokio::test]
    async fn test_start_game_inactive_game_reverts_to_idle() {
        let (ctx, room_id, _dir) = setup_room(1).await;
        let room = ctx.ds.get_room(room_id).await.unwrap();
        ctx.ds.set_game_inactive_for_test(room.game_id).await.unwrap();

        let mut host = test_support::authed_conn(1, "alice");
        let err = start_game(&ctx, &mut host, &json!({"roomId": room_id})).await;
        assert!(matches!(err, Err(LobbyError::GameRemoved(_))));

        let room = ctx.ds.get_room(room_id).await.unwrap();
        assert_eq!(room.status, gamecore_protocol::entities::RoomStatus::Idle);
    }

    #[tokio::test]
    async fn test_game_ended_unknown_room_rejected() {
        let (ctx, _room_id, _dir) = setup_room(1).await;
        let err = game_ended(&ctx, &json!({"roomId": 999_999})).await;
        assert!(matches!(err, Err(LobbyError::RoomNotFound)));
    }

    #[tokio::test]
    async fn test_game_ended_records_gamelog() {
        let (ctx, room_id, _dir) = setup_room(1).await;

        let result = game_ended(
            &ctx,
            &json!({
                "roomId": room_id,
                "matchId": "match-1",
                "game_id": 1,
                "game_name": "Coin",
                "game_version": "1.0.0",
                "users": ["alice"],
                "results": [{"userId": 1, "winner": true}],
            }),
        )
        .await
        .unwrap();
        assert_eq!(result["matchId"], "match-1");

        let room = ctx.ds.get_room(room_id).await.unwrap();
        assert_eq!(room.status, gamecore_protocol::entities::RoomStatus::Idle);

        let logs = ctx.ds.query_gamelogs().await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].match_id, "match-1");
    }
}
