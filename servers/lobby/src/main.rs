mod commands;
mod config;
mod ds;
mod error;
mod gameserver;
mod session;
mod state;
#[cfg(test)]
mod test_support;

use gamecore_common::actor::Actor;
use gamecore_protocol::ds_client::DsPool;
use log::{error, info, warn};
use session::LobbyContext;
use state::{LobbyActor, PurgeAllRooms};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let config: config::Config = gamecore_common::config::load_config("GC_LS_CONFIG_JSON", "config.json");

    gamecore_common::logging::setup("gamecore_lobby", "data/logs/lobby.log", config.logging);

    info!(
        "starting lobby service, data store at {}:{}",
        config.ds_host, config.ds_port
    );

    let pool = Arc::new(DsPool::new(config.ds_host.clone(), config.ds_port, config.ds_pool_capacity));
    let ds = ds::DsClient::new(pool);
    let actor = LobbyActor::default().start();

    // Every room is transient state owned by the actor; at startup there
    // can be no live members or game servers, so the data store's room
    // table (left over from a previous run) is purged to match.
    if let Err(err) = ds.delete_all_rooms().await {
        warn!("failed to purge rooms at startup: {err}");
    }
    actor.send(PurgeAllRooms {}).await.ok();

    let context = Arc::new(LobbyContext {
        ds,
        actor,
        bundle_root: PathBuf::from(config.bundle_root),
    });

    let listener = match TcpListener::bind(("0.0.0.0", config.port)).await {
        Ok(listener) => {
            info!("lobby service listening on port {}", config.port);
            listener
        }
        Err(err) => {
            error!("failed to bind lobby service on port {}: {err}", config.port);
            panic!("unable to start lobby service");
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
