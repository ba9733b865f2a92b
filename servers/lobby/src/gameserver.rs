//! Spawns the per-match game server subprocess and gives it a short
//! settling window to fail fast, mirroring the source's
//! `time.sleep(2.5)` + liveness poll without rolling back the port/room
//! state if the process is found dead (baseline retained; see the room
//! cleanup design notes).

use gamecore_protocol::entities::Id;
use std::path::Path;
use std::time::Duration;
use tokio::process::{Child, Command};

pub struct SpawnRequest<'a> {
    pub bundle_dir: &'a Path,
    pub server_file: &'a str,
    pub port: u16,
    pub room_id: Id,
    pub game_id: Id,
    pub game_name: &'a str,
    pub game_version: &'a str,
    pub usernames: &'a [String],
}

/// Builds an explicit argv for the game server subprocess: no shell string
/// concatenation, matching the source's `cmd = [...]` + `subprocess.Popen`
/// call in spirit but via `tokio::process::Command`.
pub fn spawn(req: SpawnRequest<'_>) -> std::io::Result<Child> {
    let server_path = req.bundle_dir.join(req.server_file);

    let mut command = Command::new(&server_path);
    command
        .arg(req.port.to_string())
        .arg(req.room_id.to_string())
        .arg(req.game_id.to_string())
        .arg(req.game_name)
        .arg(req.game_version)
        .args(req.usernames)
        .current_dir(req.bundle_dir)
        .env("GAME_PORT", req.port.to_string())
        .env("GAME_ROOM", req.room_id.to_string())
        .kill_on_drop(false);

    command.spawn()
}

/// Gives the freshly spawned process a moment to crash immediately,
/// returning whether it's still alive.
pub async fn settle_and_check_alive(child: &mut Child) -> std::io::Result<bool> {
    tokio::time::sleep(Duration::from_millis(2500)).await;
    match child.try_wait()? {
        Some(_) => Ok(false),
        None => Ok(true),
    }
}
