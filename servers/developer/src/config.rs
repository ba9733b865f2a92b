use gamecore_common::env;
use log::LevelFilter;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub ds_host: String,
    pub ds_port: u16,
    pub ds_pool_capacity: usize,
    pub bundle_root: String,
    pub logging: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::from_env(env::DVS_PORT),
            ds_host: env::env_str(env::DS_HOST),
            ds_port: env::from_env(env::DS_PORT),
            ds_pool_capacity: 8,
            bundle_root: env::env_str(env::BUNDLE_ROOT),
            logging: LevelFilter::Info,
        }
    }
}
