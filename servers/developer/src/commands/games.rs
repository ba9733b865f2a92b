use futures_util::SinkExt;
use gamecore_common::bundle;
use gamecore_protocol::entities::Id;
use gamecore_protocol::file_transfer;
use gamecore_protocol::frame::{Frame, FrameCodec};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use super::{require_id, require_str, require_u32};
use crate::error::DeveloperError;
use crate::session::DevContext;

/// Creates the Game row, prepares the version directory, tells the client
/// it's ready, then receives `fileCount` files in the same
/// `FILE_METADATA` + raw-bytes format the lobby service serves on
/// download.
pub async fn upload_game(
    ctx: &DevContext,
    request: &Value,
    framed: &mut Framed<TcpStream, FrameCodec>,
) -> Result<Value, DeveloperError> {
    let dev_id = require_id(request, "devId")?;
    let game_info = request
        .get("gameInfo")
        .cloned()
        .ok_or(DeveloperError::MissingField("gameInfo"))?;
    let file_count = require_u32(request, "fileCount")?;

    let name = require_str(&game_info, "name")?.to_string();
    let version = require_str(&game_info, "version")?.to_string();
    if !bundle::is_valid_version(&version) {
        return Err(DeveloperError::InvalidVersion);
    }

    if ctx.ds.find_game(dev_id, &name, &version).await?.is_some() {
        return Err(DeveloperError::VersionExists);
    }

    let game = ctx.ds.create_game(&game_info, dev_id).await?;

    let version_dir = bundle::version_dir(&ctx.bundle_root, &name, &version);
    tokio::fs::create_dir_all(&version_dir).await?;

    send_ready(framed).await?;
    receive_files(framed, &version_dir, file_count).await?;

    Ok(json!({ "gameId": game.id, "version": version }))
}

/// Ownership-checked version bump: the previous version's directory is
/// deleted before the new one is created, so only the latest version is
/// ever retained on disk.
pub async fn update_game(
    ctx: &DevContext,
    request: &Value,
    framed: &mut Framed<TcpStream, FrameCodec>,
) -> Result<Value, DeveloperError> {
    let dev_id = require_id(request, "devId")?;
    let game_id = require_id(request, "gameId")?;
    let game_info = request
        .get("gameInfo")
        .cloned()
        .ok_or(DeveloperError::MissingField("gameInfo"))?;
    let file_count = require_u32(request, "fileCount")?;

    let game = ctx.ds.get_game(game_id).await?.ok_or(DeveloperError::GameNotFound)?;
    if game.developer_id != dev_id {
        return Err(DeveloperError::NotOwner);
    }

    let version = require_str(&game_info, "version")?.to_string();
    if !bundle::is_valid_version(&version) {
        return Err(DeveloperError::InvalidVersion);
    }
    let main_file = require_str(&game_info, "mainFile")?.to_string();
    let server_file = require_str(&game_info, "serverFile")?.to_string();

    let new_dir = bundle::version_dir(&ctx.bundle_root, &game.name, &version);
    if tokio::fs::metadata(&new_dir).await.is_ok() {
        return Err(DeveloperError::VersionExists);
    }

    let old_dir = bundle::version_dir(&ctx.bundle_root, &game.name, &game.current_version);
    if tokio::fs::metadata(&old_dir).await.is_ok() {
        tokio::fs::remove_dir_all(&old_dir).await?;
    }
    tokio::fs::create_dir_all(&new_dir).await?;

    let updated = ctx
        .ds
        .update_game_version(game_id, &version, &main_file, &server_file)
        .await?;

    send_ready(framed).await?;
    receive_files(framed, &new_dir, file_count).await?;

    Ok(json!({ "gameId": updated.id, "version": version }))
}

/// Delists the game: row is retained with `status=inactive`, and the
/// whole bundle directory tree for the game (every version) is removed.
pub async fn remove_game(ctx: &DevContext, request: &Value) -> Result<Value, DeveloperError> {
    let dev_id = require_id(request, "devId")?;
    let game_id = require_id(request, "gameId")?;

    let game = ctx.ds.get_game(game_id).await?.ok_or(DeveloperError::GameNotFound)?;
    if game.developer_id != dev_id {
        return Err(DeveloperError::NotOwner);
    }

    ctx.ds.set_game_inactive(game_id).await?;

    let dir = bundle::game_dir(&ctx.bundle_root, &game.name);
    if tokio::fs::metadata(&dir).await.is_ok() {
        tokio::fs::remove_dir_all(&dir).await?;
    }

    Ok(json!({ "gameId": game_id }))
}

pub async fn list_my_games(ctx: &DevContext, request: &Value) -> Result<Value, DeveloperError> {
    let dev_id: Id = require_id(request, "devId")?;
    let games = ctx.ds.list_games_for_developer(dev_id).await?;

    let games: Vec<Value> = games
        .into_iter()
        .map(|game| {
            let average_rating = game.average_rating();
            let mut value = serde_json::to_value(&game).expect("Game always serializes");
            value["averageRating"] = json!(average_rating);
            value
        })
        .collect();

    Ok(json!({ "games": games }))
}

async fn send_ready(framed: &mut Framed<TcpStream, FrameCodec>) -> Result<(), DeveloperError> {
    let frame = Frame::from_value(&json!({ "status": "ready" }))
        .map_err(|err| DeveloperError::DataStore(err.to_string()))?;
    framed
        .send(frame)
        .await
        .map_err(|err| DeveloperError::DataStore(err.to_string()))
}

async fn receive_files(
    framed: &mut Framed<TcpStream, FrameCodec>,
    dir: &std::path::Path,
    file_count: u32,
) -> Result<(), DeveloperError> {
    for _ in 0..file_count {
        let (metadata, data) = file_transfer::recv_file(framed).await?;
        let dest = dir.join(&metadata.name);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&dest, &data).await?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support;
    use futures_util::StreamExt;
    use tokio::net::{TcpListener, TcpStream as TokioTcpStream};

    async fn tcp_pair() -> (Framed<TokioTcpStream, FrameCodec>, Framed<TokioTcpStream, FrameCodec>) {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TokioTcpStream::connect(addr).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        (Framed::new(server, FrameCodec), Framed::new(client, FrameCodec))
    }

    fn game_info(name: &str, version: &str) -> Value {
        json!({
            "name": name,
            "description": "a test game",
            "gameType": "cli",
            "maxPlayers": 2,
            "version": version,
            "mainFile": "main.py",
            "serverFile": "server.py",
        })
    }

    /// Drives the client side of the upload/update wire contract: read the
    /// `{status:"ready"}` frame, then send each of `files` in turn.
    async fn drive_client_upload(client: &mut Framed<TokioTcpStream, FrameCodec>, files: &[(&str, &[u8])]) {
        let ready = client.next().await.unwrap().unwrap();
        let ready: Value = ready.decode().unwrap();
        assert_eq!(ready["status"], "ready");

        for (name, data) in files {
            file_transfer::send_file(client, name, data).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_upload_game_writes_files_and_rejects_duplicate_version() {
        let (ds, dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds, dir.path().to_path_buf());
        let (mut server, mut client) = tcp_pair().await;

        let request = json!({"devId": 1, "gameInfo": game_info("Coin", "1.0.0"), "fileCount": 1});
        let request_ctx = ctx.clone();
        let server_task = tokio::spawn(async move { upload_game(&request_ctx, &request, &mut server).await });

        drive_client_upload(&mut client, &[("main.py", b"print('hi')")]).await;
        let result = server_task.await.unwrap().unwrap();
        assert_eq!(result["version"], "1.0.0");

        let written = tokio::fs::read(dir.path().join("Coin/1.0.0/main.py")).await.unwrap();
        assert_eq!(written, b"print('hi')");

        // Duplicate (devId, name, version) is rejected before any frame is
        // exchanged, so a second connection that's never driven is fine.
        let (mut server2, _client2) = tcp_pair().await;
        let dup_request = json!({"devId": 1, "gameInfo": game_info("Coin", "1.0.0"), "fileCount": 0});
        let err = upload_game(&ctx, &dup_request, &mut server2).await;
        assert!(matches!(err, Err(DeveloperError::VersionExists)));
    }

    #[tokio::test]
    async fn test_update_game_ownership_checked() {
        let (ds, dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds, dir.path().to_path_buf());
        let (mut server, mut client) = tcp_pair().await;

        let upload_request = json!({"devId": 1, "gameInfo": game_info("Coin", "1.0.0"), "fileCount": 1});
        let request_ctx = ctx.clone();
        let server_task = tokio::spawn(async move { upload_game(&request_ctx, &upload_request, &mut server).await });
        drive_client_upload(&mut client, &[("main.py", b"v1")]).await;
        let uploaded = server_task.await.unwrap().unwrap();
        let game_id = uploaded["gameId"].clone();

        let (mut server2, _client2) = tcp_pair().await;
        let update_request = json!({
            "devId": 2,
            "gameId": game_id,
            "gameInfo": game_info("Coin", "2.0.0"),
            "fileCount": 0,
        });
        let err = update_game(&ctx, &update_request, &mut server2).await;
        assert!(matches!(err, Err(DeveloperError::NotOwner)));
    }

    #[tokio::test]
    async fn test_remove_game_deletes_bundle_directory() {
        let (ds, dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds, dir.path().to_path_buf());
        let (mut server, mut client) = tcp_pair().await;

        let upload_request = json!({"devId": 1, "gameInfo": game_info("Coin", "1.0.0"), "fileCount": 1});
        let request_ctx = ctx.clone();
        let server_task = tokio::spawn(async move { upload_game(&request_ctx, &upload_request, &mut server).await });
        drive_client_upload(&mut client, &[("main.py", b"v1")]).await;
        let uploaded = server_task.await.unwrap().unwrap();
        let game_id = uploaded["gameId"].as_u64().unwrap() as Id;

        assert!(tokio::fs::metadata(dir.path().join("Coin/1.0.0")).await.is_ok());

        remove_game(&ctx, &json!({"devId": 1, "gameId": game_id})).await.unwrap();
        assert!(tokio::fs::metadata(dir.path().join("Coin")).await.is_err());

        let game = ctx.ds.get_game(game_id).await.unwrap().unwrap();
        assert_eq!(game.status, gamecore_protocol::entities::GameStatus::Inactive);
    }

    #[tokio::test]
    async fn test_upload_game_rejects_malformed_version() {
        let (ds, dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds, dir.path().to_path_buf());
        let (mut server, _client) = tcp_pair().await;

        let request = json!({"devId": 1, "gameInfo": game_info("Coin", "v1.0"), "fileCount": 0});
        let err = upload_game(&ctx, &request, &mut server).await;
        assert!(matches!(err, Err(DeveloperError::InvalidVersion)));
    }

    #[tokio::test]
    async fn test_update_game_rejects_malformed_version() {
        let (ds, dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds, dir.path().to_path_buf());
        let (mut server, mut client) = tcp_pair().await;

        let upload_request = json!({"devId": 1, "gameInfo": game_info("Coin", "1.0.0"), "fileCount": 0});
        let request_ctx = ctx.clone();
        let server_task = tokio::spawn(async move { upload_game(&request_ctx, &upload_request, &mut server).await });
        drive_client_upload(&mut client, &[]).await;
        let uploaded = server_task.await.unwrap().unwrap();
        let game_id = uploaded["gameId"].as_u64().unwrap() as Id;

        let (mut server2, _client2) = tcp_pair().await;
        let update_request = json!({
            "devId": 1,
            "gameId": game_id,
            "gameInfo": game_info("Coin", "2.0"),
            "fileCount": 0,
        });
        let err = update_game(&ctx, &update_request, &mut server2).await;
        assert!(matches!(err, Err(DeveloperError::InvalidVersion)));
    }

    #[tokio::test]
    async fn test_list_my_games_includes_average_rating() {
        let (ds, dir) = test_support::spawn_ds().await;
        let ctx = test_support::context(ds, dir.path().to_path_buf());
        let (mut server, mut client) = tcp_pair().await;

        let upload_request = json!({"devId": 7, "gameInfo": game_info("Coin", "1.0.0"), "fileCount": 0});
        let request_ctx = ctx.clone();
        let server_task = tokio::spawn(async move { upload_game(&request_ctx, &upload_request, &mut server).await });
        drive_client_upload(&mut client, &[]).await;
        server_task.await.unwrap().unwrap();

        let body = list_my_games(&ctx, &json!({"devId": 7})).await.unwrap();
        let games = body["games"].as_array().unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0]["averageRating"], Value::Null);
    }
}
