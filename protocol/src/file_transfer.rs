//! Chunked file streaming: a framed `FILE_METADATA` record describing the
//! file, followed by exactly `size` raw bytes written directly to the
//! socket (no further framing). Used by the developer service to receive
//! bundle files and by the lobby service to serve them back out on
//! download.

use bytes::Buf;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::frame::{Frame, FrameCodec, FrameError};

/// Chunk size used when writing file bytes to the socket, matching the
/// sender-side chunking the rest of this protocol uses.
pub const CHUNK_SIZE: usize = 8192;

#[derive(Debug, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub size: u64,
    pub name: String,
}

impl FileMetadata {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            msg_type: "FILE_METADATA".to_string(),
            size,
            name: name.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FileTransferError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("connection closed while waiting for file metadata")]
    ConnectionClosed,
}

/// Sends `data` as a file named `name`: one `FILE_METADATA` frame then the
/// raw bytes, in chunks of [`CHUNK_SIZE`].
pub async fn send_file(
    framed: &mut Framed<TcpStream, FrameCodec>,
    name: &str,
    data: &[u8],
) -> Result<(), FileTransferError> {
    let metadata = FileMetadata::new(name, data.len() as u64);
    framed.send(Frame::from_value(&metadata)?).await?;

    let stream = framed.get_mut();
    for chunk in data.chunks(CHUNK_SIZE) {
        stream.write_all(chunk).await?;
    }
    Ok(())
}

/// Reads one file: the `FILE_METADATA` frame followed by its raw bytes.
/// Any bytes the frame decoder already read ahead into its buffer are
/// drained first so no data is lost at the framed/raw boundary.
pub async fn recv_file(
    framed: &mut Framed<TcpStream, FrameCodec>,
) -> Result<(FileMetadata, Vec<u8>), FileTransferError> {
    let frame = framed
        .next()
        .await
        .ok_or(FileTransferError::ConnectionClosed)??;
    let metadata: FileMetadata = frame.decode()?;

    let mut buf = vec![0u8; metadata.size as usize];
    let mut filled = 0usize;

    let buffered = framed.read_buffer_mut();
    let take = buffered.len().min(buf.len());
    if take > 0 {
        buf[..take].copy_from_slice(&buffered[..take]);
        buffered.advance(take);
        filled += take;
    }

    if filled < buf.len() {
        framed.get_mut().read_exact(&mut buf[filled..]).await?;
    }

    Ok((metadata, buf))
}
