mod commands;
mod config;
mod ds;
mod error;
mod session;
#[cfg(test)]
mod test_support;

use gamecore_protocol::ds_client::DsPool;
use log::{error, info};
use session::DevContext;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let config: config::Config = gamecore_common::config::load_config("GC_DVS_CONFIG_JSON", "config.json");

    gamecore_common::logging::setup("gamecore_developer", "data/logs/developer.log", config.logging);

    info!(
        "starting developer service, data store at {}:{}",
        config.ds_host, config.ds_port
    );

    let pool = Arc::new(DsPool::new(config.ds_host.clone(), config.ds_port, config.ds_pool_capacity));
    let context = Arc::new(DevContext {
        ds: ds::DsClient::new(pool),
        bundle_root: PathBuf::from(config.bundle_root),
    });

    let listener = match TcpListener::bind(("0.0.0.0", config.port)).await {
        Ok(listener) => {
            info!("developer service listening on port {}", config.port);
            listener
        }
        Err(err) => {
            error!("failed to bind developer service on port {}: {err}", config.port);
            panic!("unable to start developer service");
        }
    };

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let context = context.clone();
                tokio::spawn(async move {
                    session::handle_connection(context, stream).await;
                    log::debug!("connection from {addr} closed");
                });
            }
            Err(err) => error!("error accepting connection: {err}"),
        }
    }
}
