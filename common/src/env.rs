//! Environment variable override helpers shared by the three services.

use std::str::FromStr;

pub type Port = u16;

pub const DS_HOST: (&str, &str) = ("GC_DS_HOST", "127.0.0.1");
pub const DS_PORT: (&str, Port) = ("GC_DS_PORT", 9000);
pub const LS_PORT: (&str, Port) = ("GC_LS_PORT", 9100);
pub const DVS_PORT: (&str, Port) = ("GC_DVS_PORT", 9200);

pub const DATABASE_FILE: (&str, &str) = ("GC_DATABASE_FILE", "data/database.json");
pub const BUNDLE_ROOT: (&str, &str) = ("GC_BUNDLE_ROOT", "data/uploaded_games");

pub const LOGGING_DIR: (&str, &str) = ("GC_LOGGING_DIR", "data/logs");

/// Reads an environment variable, falling back to the provided default when
/// unset or when it fails to parse as `F`.
pub fn from_env<F: FromStr>(pair: (&str, F)) -> F {
    if let Ok(value) = std::env::var(pair.0) {
        if let Ok(value) = F::from_str(&value) {
            return value;
        }
    }
    pair.1
}

pub fn env_str(pair: (&str, &str)) -> String {
    std::env::var(pair.0).unwrap_or_else(|_| pair.1.to_string())
}
