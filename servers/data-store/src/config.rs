use gamecore_common::env;
use log::LevelFilter;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub database_file: String,
    pub logging: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::from_env(env::DS_PORT),
            database_file: env::env_str(env::DATABASE_FILE),
            logging: LevelFilter::Info,
        }
    }
}
