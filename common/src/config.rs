//! Generic config loading shared by the data-store, lobby and developer
//! binaries. Each binary defines its own `Config` struct with
//! `#[serde(default)]` and a matching `Default` impl, then calls
//! [`load_config`] with its own environment variable key and on-disk file
//! name.

use serde::de::DeserializeOwned;
use std::{env, fs::read_to_string, path::Path};

/// Attempts to load a JSON-encoded config of type `T`, first from the named
/// environment variable, then from a file on disk, falling back to
/// `T::default()` if neither is present or either fails to parse.
pub fn load_config<T>(env_key: &str, file_name: &str) -> T
where
    T: DeserializeOwned + Default,
{
    if let Ok(raw) = env::var(env_key) {
        return match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("failed to parse {env_key} (using defaults): {err}");
                T::default()
            }
        };
    }

    let file = Path::new(file_name);
    if !file.exists() {
        return T::default();
    }

    let data = match read_to_string(file) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("failed to read {file_name} (using defaults): {err}");
            return T::default();
        }
    };

    match serde_json::from_str(&data) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("failed to parse {file_name} (using defaults): {err}");
            T::default()
        }
    }
}
