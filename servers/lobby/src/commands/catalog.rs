use gamecore_common::bundle;
use gamecore_protocol::entities::GameStatus;
use gamecore_protocol::file_transfer;
use gamecore_protocol::frame::{Frame, FrameCodec};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use super::{require_authenticated, require_id, require_str};
use crate::error::LobbyError;
use crate::session::{ConnState, LobbyContext};

pub async fn browse_store(ctx: &LobbyContext, conn: &mut ConnState) -> Result<Value, LobbyError> {
    require_authenticated(conn)?;
    let games = ctx.ds.browse_store().await?;
    Ok(json!({ "games": games }))
}

pub async fn get_game_by_name(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    require_authenticated(conn)?;
    let name = require_str(request, "gameName")?;
    let game = ctx
        .ds
        .find_active_game_by_name(name)
        .await?
        .ok_or_else(|| LobbyError::GameNotFound(name.to_string()))?;
    Ok(json!({ "game": game }))
}

/// Streams every file under the game's version directory: a framed
/// `{status:"ready", fileCount}` record, then per file a framed
/// `{name: relPath}` record followed by the FILE_METADATA + raw bytes
/// transfer.
pub async fn download_game(
    ctx: &LobbyContext,
    conn: &mut ConnState,
    request: &Value,
    framed: &mut Framed<TcpStream, FrameCodec>,
) -> Result<Value, LobbyError> {
    require_authenticated(conn)?;
    let game_id = require_id(request, "gameId")?;
    let version = require_str(request, "version")?;

    let game = ctx
        .ds
        .get_game(game_id)
        .await?
        .ok_or_else(|| LobbyError::GameNotFound(game_id.to_string()))?;
    if game.status != GameStatus::Active {
        return Err(LobbyError::DataStore("game is not available".to_string()));
    }

    let dir = bundle::version_dir(&ctx.bundle_root, &game.name, version);
    let files = collect_files(&dir)
        .await
        .map_err(|_| LobbyError::DataStore("bundle directory is not available".to_string()))?;

    send_ready(framed, files.len())
        .await
        .map_err(|err| LobbyError::DataStore(err.to_string()))?;

    for rel_path in &files {
        let rel_str = rel_path.to_string_lossy().replace('\\', "/");
        send_name(framed, &rel_str)
            .await
            .map_err(|err| LobbyError::DataStore(err.to_string()))?;

        let full_path = dir.join(rel_path);
        let data = tokio::fs::read(&full_path)
            .await
            .map_err(|err| LobbyError::DataStore(err.to_string()))?;
        file_transfer::send_file(framed, &rel_str, &data)
            .await
            .map_err(|err| LobbyError::DataStore(err.to_string()))?;
    }

    // The caller's own dispatch loop sends the final JSON response frame;
    // this one is purely informational since the files already went out.
    Ok(json!({ "fileCount": files.len() }))
}

async fn send_ready(framed: &mut Framed<TcpStream, FrameCodec>, file_count: usize) -> Result<(), gamecore_protocol::frame::FrameError> {
    use futures_util::SinkExt;
    let frame = Frame::from_value(&json!({ "status": "ready", "fileCount": file_count }))?;
    framed.send(frame).await
}

async fn send_name(framed: &mut Framed<TcpStream, FrameCodec>, name: &str) -> Result<(), gamecore_protocol::frame::FrameError> {
    use futures_util::SinkExt;
    let frame = Frame::from_value(&json!({ "name": name }))?;
    framed.send(frame).await
}

fn collect_files<'a>(
    dir: &'a Path,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = std::io::Result<Vec<PathBuf>>> + Send + 'a>> {
    Box::pin(async move {
        let mut out = Vec::new();
        let mut stack = vec![PathBuf::new()];
        while let Some(rel) = stack.pop() {
            let abs = dir.join(&rel);
            let mut entries = tokio::fs::read_dir(&abs).await?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                let entry_rel = rel.join(entry.file_name());
                if file_type.is_dir() {
                    stack.push(entry_rel);
                } else {
                    out.push(entry_rel);
                }
            }
        }
        Ok(out)
    })
}

/// A user may only review a game they have actually played: some
/// `GameLog` must name this game and list their username among its
/// participants.
async fn has_played(ctx: &LobbyContext, username: &str, game_id: gamecore_protocol::entities::Id) -> Result<bool, LobbyError> {
    let logs = ctx.ds.query_gamelogs().await?;
    Ok(logs
        .iter()
        .any(|log| log.game_id == game_id && log.users.iter().any(|u| u == username)))
}

pub async fn submit_review(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    let user_id = require_authenticated(conn)?;
    let game_id = require_id(request, "gameId")?;
    let rating = request
        .get("rating")
        .and_then(Value::as_u64)
        .ok_or_else(|| LobbyError::DataStore("missing required field `rating`".to_string()))? as u8;
    let review = request.get("review").and_then(Value::as_str);

    if rating > 5 {
        return Err(LobbyError::InvalidRating);
    }

    let username = conn.username.clone().ok_or(LobbyError::NotAuthenticated)?;
    if !has_played(ctx, &username, game_id).await? {
        return Err(LobbyError::MustPlayFirst);
    }

    ctx.ds.add_rating(game_id, user_id, rating, review).await?;
    Ok(json!({ "gameId": game_id, "rating": rating }))
}

pub async fn check_play_history(ctx: &LobbyContext, conn: &mut ConnState, request: &Value) -> Result<Value, LobbyError> {
    require_authenticated(conn)?;
    let game_id = require_id(request, "gameId")?;
    let username = conn.username.clone().ok_or(LobbyError::NotAuthenticated)?;
    let played = has_played(ctx, &username, game_id).await?;
    Ok(json!({ "gameId": game_id, "played": played }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn test_get_game_by_name_not_found() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds);
        let mut conn = test_support::authed_conn(1, "alice");

        let err = get_game_by_name(&ctx, &mut conn, &json!({"gameName": "Nope"})).await;
        assert!(matches!(err, Err(LobbyError::GameNotFound(_))));
    }

    #[tokio::test]
    async fn test_browse_store_lists_active_game() {
        let (ds, _dir) = test_support::spawn_ds().await;
        ds.create_game_for_test("Coin", 2).await.unwrap();
        let ctx = test_support::context(ds);
        let mut conn = test_support::authed_conn(1, "alice");

        let body = browse_store(&ctx, &mut conn).await.unwrap();
        let games = body["games"].as_array().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0]["name"], "Coin");
    }

    #[tokio::test]
    async fn test_submit_review_requires_play_history() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let game = ds.create_game_for_test("Coin", 2).await.unwrap();
        let ctx = test_support::context(ds);
        let mut conn = test_support::authed_conn(1, "alice");

        let err = submit_review(&ctx, &mut conn, &json!({"gameId": game.id, "rating": 4})).await;
        assert!(matches!(err, Err(LobbyError::MustPlayFirst)));

        ctx.ds
            .create_gamelog(json!({
                "matchId": "m1",
                "roomId": 1,
                "gameId": game.id,
                "gameName": "Coin",
                "gameVersion": "1.0.0",
                "users": ["alice"],
            }))
            .await
            .unwrap();

        let played = check_play_history(&ctx, &mut conn, &json!({"gameId": game.id}))
            .await
            .unwrap();
        assert_eq!(played["played"], true);

        let submitted = submit_review(&ctx, &mut conn, &json!({"gameId": game.id, "rating": 4}))
            .await
            .unwrap();
        assert_eq!(submitted["rating"], 4);
    }

    #[tokio::test]
    async fn test_submit_review_invalid_rating_rejected() {
        let (ds, _dir) = test_support::spawn_ds().await;
        let game = ds.create_game_for_test("Coin", 2).await.unwrap();
        let ctx = test_support::context(ds);
        let mut conn = test_support::authed_conn(1, "alice");

        let err = submit_review(&ctx, &mut conn, &json!({"gameId": game.id, "rating": 9})).await;
        assert!(matches!(err, Err(LobbyError::InvalidRating)));
    }
}
