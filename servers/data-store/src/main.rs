mod config;
mod server;

use gamecore_catalog::Store;
use log::info;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config: config::Config = gamecore_common::config::load_config("GC_DS_CONFIG_JSON", "config.json");

    gamecore_common::logging::setup(
        "gamecore_data_store",
        "data/logs/data-store.log",
        config.logging,
    );

    info!("starting data store, database file: {}", config.database_file);

    let store = Arc::new(
        Store::open(&config.database_file).expect("failed to open data store snapshot"),
    );

    server::start_server(store, config.port).await;
}
