//! Shared scaffolding for command-handler tests: a throwaway data store
//! bound to an ephemeral port, plus a `DevContext` wired to it.

#![cfg(test)]

use futures_util::{SinkExt, StreamExt};
use gamecore_catalog::{dispatch, Store};
use gamecore_protocol::ds_client::DsPool;
use gamecore_protocol::frame::{Frame, FrameCodec};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::codec::Framed;

use crate::ds::DsClient;
use crate::session::DevContext;

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

pub fn context(ds: DsClient, bundle_root: PathBuf) -> DevContext {
    DevContext { ds, bundle_root }
}
