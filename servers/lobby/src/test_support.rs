//! Shared scaffolding for command-handler tests: a throwaway data store
//! bound to an ephemeral port, plus constructors for `ConnState` and
//! `LobbyContext` wired to it.

#![cfg(test)]

use futures_util::{SinkExt, StreamExt};
use gamecore_catalog::{dispatch, Store};
use gamecore_common::actor::Actor;
use gamecore_protocol::ds_client::DsPool;
use gamecore_protocol::entities::Id;
use gamecore_protocol::frame::{Frame, FrameCodec};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

use crate::ds::DsClient;
use crate::session::{ConnState, LobbyContext};
use crate::state::LobbyActor;

static NEXT_TEST_CONN_ID: AtomicU64 = AtomicU64::new(1_000_000);

/// Spins up an in-process data store on an ephemeral loopback port and
/// returns a pooled `DsClient` pointed at it. The `TempDir` must outlive
/// the test; nothing reopens the snapshot file once dropped.
pub async fn spawn_ds() -> (DsClient, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Store::open(dir.path().join("database.json")).unwrap());

    let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => break,
            };
            let store = store.clone();
            tokio::spawn(async move {
                let mut framed = Framed::new(stream, FrameCodec);
                while let Some(Ok(frame)) = framed.next().await {
                    let request = match frame.decode() {
                        Ok(req) => req,
                        Err(_) => break,
                    };
                    let response = dispatch::handle(&store, request);
                    let response_frame = match Frame::from_value(&response) {
                        Ok(frame) => frame,
                        Err(_) => break,
                    };
                    if framed.send(response_frame).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    let pool = Arc::new(DsPool::new("127.0.0.1", port, 4));
    (DsClient::new(pool), dir)
}

pub fn context(ds: DsClient) -> LobbyContext {
    LobbyContext {
        ds,
        actor: LobbyActor::default().start(),
        bundle_root: PathBuf::from(std::env::temp_dir()),
    }
}

pub fn conn() -> ConnState {
    ConnState {
        conn_id: NEXT_TEST_CONN_ID.fetch_add(1, Ordering::Relaxed),
        user_id: None,
        username: None,
    }
}

pub fn authed_conn(user_id: Id, username: &str) -> ConnState {
    let mut c = conn();
    c.user_id = Some(user_id);
    c.username = Some(username.to_string());
    c
}
