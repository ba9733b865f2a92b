//! A small bounded pool of persistent connections to the data store,
//! replacing a fresh `TcpStream::connect` per request. Each connection is
//! single-flighted: checked out exclusively for one request/response round
//! trip and returned to the idle pool afterwards, so per-connection
//! ordering is never at risk.

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::codec::Framed;

use crate::ds::{DsRequest, DsResponse};
use crate::frame::{Frame, FrameCodec, FrameError};

#[derive(Debug, Error)]
pub enum DsClientError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("data store closed the connection without responding")]
    ConnectionClosed,
    #[error("data store connection pool is shut down")]
    PoolClosed,
}

type Connection = Framed<TcpStream, FrameCodec>;

pub struct DsPool {
    host: String,
    port: u16,
    semaphore: Arc<Semaphore>,
    idle: Mutex<Vec<Connection>>,
}

impl DsPool {
    pub fn new(host: impl Into<String>, port: u16, capacity: usize) -> Self {
        Self {
            host: host.into(),
            port,
            semaphore: Arc::new(Semaphore::new(capacity)),
            idle: Mutex::new(Vec::with_capacity(capacity)),
        }
    }

    /// Sends one request and awaits the response, using an idle pooled
    /// connection when one is available or opening a new one otherwise.
    /// A connection that errors mid-request is dropped instead of being
    /// returned to the pool.
    pub async fn request(&self, request: DsRequest) -> Result<DsResponse, DsClientError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| DsClientError::PoolClosed)?;

        let mut conn = self.checkout().await?;
        match self.roundtrip(&mut conn, request).await {
            Ok(response) => {
                self.checkin(conn).await;
                Ok(response)
            }
            Err(err) => Err(err),
        }
    }

    async fn checkout(&self) -> Result<Connection, DsClientError> {
        if let Some(conn) = self.idle.lock().await.pop() {
            return Ok(conn);
        }
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        Ok(Framed::new(stream, FrameCodec))
    }

    async fn checkin(&self, conn: Connection) {
        self.idle.lock().await.push(conn);
    }

    async fn roundtrip(
        &self,
        conn: &mut Connection,
        request: DsRequest,
    ) -> Result<DsResponse, DsClientError> {
        conn.send(Frame::from_value(&request)?).await?;
        let frame = conn.next().await.ok_or(DsClientError::ConnectionClosed)??;
        Ok(frame.decode()?)
    }
}
