//! Per-connection read/dispatch/write loop. Developers are stateless
//! per-request (every command carries its own `devId`), so there is no
//! actor-owned session table here the way the lobby service has one.

use futures_util::{SinkExt, StreamExt};
use gamecore_protocol::frame::{Frame, FrameCodec};
use log::warn;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::commands;
use crate::ds::DsClient;

#[derive(Clone)]
pub struct DevContext {
    pub ds: DsClient,
    pub bundle_root: PathBuf,
}

pub async fn handle_connection(ctx: Arc<DevContext>, stream: TcpStream) {
    let mut framed = Framed::new(stream, FrameCodec);

    loop {
        let frame = match framed.next().await {
            Some(Ok(frame)) => frame,
            Some(Err(err)) => {
                warn!("protocol error on developer connection: {err}");
                break;
            }
            None => break,
        };

        let request: serde_json::Value = match frame.decode() {
            Ok(value) => value,
            Err(err) => {
                warn!("malformed request on developer connection: {err}");
                break;
            }
        };

        let response = commands::dispatch(&ctx, &mut framed, request).await;

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
}
