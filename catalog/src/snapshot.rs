//! On-disk persistence for the data store's five collections. Every
//! mutation rewrites the whole snapshot; the write goes to a sibling
//! temporary file and is then renamed into place so readers (or a crashed
//! and restarted process) never observe a half-written file, unlike the
//! in-place `json.dump` this was ported from.

use gamecore_protocol::entities::{Developer, Game, GameLog, Id, Room, User};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::CatalogError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counters {
    #[serde(rename = "User")]
    pub user: Id,
    #[serde(rename = "Developer")]
    pub developer: Id,
    #[serde(rename = "Game")]
    pub game: Id,
    #[serde(rename = "Room")]
    pub room: Id,
    #[serde(rename = "GameLog")]
    pub game_log: Id,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            user: 1,
            developer: 1,
            game: 1,
            room: 1,
            game_log: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Snapshot {
    #[serde(rename = "User", default)]
    pub users: HashMap<Id, User>,
    #[serde(rename = "Developer", default)]
    pub developers: HashMap<Id, Developer>,
    #[serde(rename = "Game", default)]
    pub games: HashMap<Id, Game>,
    #[serde(rename = "Room", default)]
    pub rooms: HashMap<Id, Room>,
    #[serde(rename = "GameLog", default)]
    pub game_logs: HashMap<Id, GameLog>,
    #[serde(default)]
    pub counters: Counters,
}

/// Loads the snapshot at `path`, creating a fresh default one on disk if
/// nothing exists there yet.
pub fn load(path: &Path) -> Result<Snapshot, CatalogError> {
    if !path.exists() {
        let snapshot = Snapshot::default();
        save(path, &snapshot)?;
        return Ok(snapshot);
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Writes `snapshot` to `path` atomically: serialize to a `.tmp` sibling,
/// then rename over the destination.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), CatalogError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(snapshot)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    /// Loading a missing path creates a default snapshot on disk, and
    /// loading it again round-trips the same (empty) state.
    #[test]
    fn test_load_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        assert!(!path.exists());

        let snapshot = load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(snapshot.counters.user, 1);

        let reloaded = load(&path).unwrap();
        assert_eq!(reloaded.counters.user, 1);
    }

    /// Saving never leaves a stray `.json.tmp` file behind.
    #[test]
    fn test_save_cleans_up_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        save(&path, &Snapshot::default()).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
