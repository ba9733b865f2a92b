use futures_util::{SinkExt, StreamExt};
use gamecore_catalog::{dispatch, Store};
use gamecore_protocol::frame::FrameCodec;
use log::{error, info, warn};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::Framed;

/// Accepts connections on `port`, handing each to an independently
/// spawned task. Every operation on `store` is synchronous and already
/// serialized by its internal lock, so connections can be handled
/// concurrently without any extra coordination here.
pub async fn start_server(store: Arc<Store>, port: u16) {
    let listener = match TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => {
            info!("data store listening on port {port}");
            listener
        }
        Err(err) => {
            error!("failed to bind data store on port {port}: {err}");
            panic!("unable to start data store server");
        }
    };

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let store = store.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(store, stream).await {
                        warn!("connection from {addr} ended with error: {err}");
                    }
                });
            }
            Err(err) => error!("error accepting connection: {err}"),
        }
    }
}

async fn handle_connection(store: Arc<Store>, stream: TcpStream) -> std::io::Result<()> {
    let mut framed = Framed::new(stream, FrameCodec);

    while let Some(frame) = framed.next().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                warn!("protocol error, closing connection: {err}");
                break;
            }
        };

        let request = match frame.decode() {
            Ok(request) => request,
            Err(err) => {
                warn!("malformed request, closing connection: {err}");
                break;
            }
        };

        let response = dispatch::handle(&store, request);

        let response_frame = match gamecore_protocol::frame::Frame::from_value(&response) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("failed to encode response, closing connection: {err}");
                break;
            }
        };

        if framed.send(response_frame).await.is_err() {
            break;
        }
    }

    Ok(())
}
