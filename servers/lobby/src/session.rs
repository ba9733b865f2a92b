//! Per-connection state and the read/dispatch/write loop.

use futures_util::{SinkExt, StreamExt};
use gamecore_common::actor::Addr;
use gamecore_protocol::entities::Id;
use gamecore_protocol::frame::{Frame, FrameCodec};
use log::warn;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::commands;
use crate::ds::DsClient;
use crate::state::LobbyActor;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub struct LobbyContext {
    pub ds: DsClient,
    pub actor: Addr<LobbyActor>,
    pub bundle_root: PathBuf,
}

pub struct ConnState {
    pub conn_id: u64,
    pub user_id: Option<Id>,
    pub username: Option<String>,
}

impl ConnState {
    fn new() -> Self {
        Self {
            conn_id: NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed),
            user_id: None,
            username: None,
        }
    }
}

pub async fn handle_connection(ctx: Arc<LobbyContext>, stream: TcpStream) {
    let mut framed = Framed::new(stream, FrameCodec);
    let mut conn = ConnState::new();

    loop {
        let frame = match framed.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(err)) => {
                warn!("protocol error on connection {}: {err}", conn.conn_id);
                break;
            }
            None => break,
        };

        let request: serde_json::Value = match frame.decode() {
            Ok(value) => value,
            Err(err) => {
                warn!("malformed request on connection {}: {err}", conn.conn_id);
                break;
            }
        };

        let response = commands::dispatch(&ctx, &mut conn, &mut framed, request).await;

        let response_frame = match Frame::from_value(&response) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("failed to encode response: {err}");
                break;
            }
        };
        if framed.send(response_frame).await.is_err() {
            break;
        }
    }

    if let Some(user_id) = conn.user_id {
        let _ = ctx
            .actor
            .send(crate::state::MarkOffline { conn_id: conn.conn_id })
            .await;
        let _ = ctx.ds.set_user_online(user_id, 0, None).await;
    }
}
