//! Length-prefixed JSON framing shared by every connection in the system:
//! a 4-byte big-endian length header followed by that many bytes of UTF-8
//! JSON. Adapted from the packet codec this codebase otherwise uses for a
//! binary header format, generalized here to a JSON body and a length
//! ceiling instead of a typed component/command header.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::{de::DeserializeOwned, Serialize};
use std::io;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Maximum body length in bytes, matching the 64 KiB ceiling used by every
/// component of this protocol.
pub const MAX_FRAME_LEN: usize = 65536;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame body exceeds the {MAX_FRAME_LEN} byte limit ({0} bytes)")]
    TooLarge(usize),
    #[error("frame body was empty")]
    Empty,
    #[error("malformed JSON frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A single framed message: raw JSON bytes, not yet decoded into a typed
/// request or response. Kept as `Bytes` so a connection handler can peek at
/// a `type`/`collection`/`action` discriminant before committing to a
/// concrete struct.
#[derive(Debug, Clone)]
pub struct Frame(pub Bytes);

impl Frame {
    pub fn from_value<T: Serialize>(value: &T) -> Result<Self, FrameError> {
        let bytes = serde_json::to_vec(value)?;
        if bytes.is_empty() {
            return Err(FrameError::Empty);
        }
        if bytes.len() > MAX_FRAME_LEN {
            return Err(FrameError::TooLarge(bytes.len()));
        }
        Ok(Frame(Bytes::from(bytes)))
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, FrameError> {
        Ok(serde_json::from_slice(&self.0)?)
    }
}

/// Tokio codec implementing the length-prefixed framing for [`Frame`].
#[derive(Default)]
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < 4 {
            return Ok(None);
        }

        let length = u32::from_be_bytes(src[..4].try_into().expect("checked length above")) as usize;

        if length == 0 {
            return Err(FrameError::Empty);
        }
        if length > MAX_FRAME_LEN {
            return Err(FrameError::TooLarge(length));
        }

        if src.len() < 4 + length {
            src.reserve(4 + length - src.len());
            return Ok(None);
        }

        src.advance(4);
        let body = src.split_to(length);
        Ok(Some(Frame(body.freeze())))
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let length = item.0.len();
        if length > MAX_FRAME_LEN {
            return Err(FrameError::TooLarge(length));
        }
        dst.reserve(4 + length);
        dst.put_u32(length as u32);
        dst.extend_from_slice(&item.0);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use bytes::BytesMut;

    #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
    struct Ping {
        n: u32,
    }

    /// A frame encoded then decoded yields the same JSON payload back.
    #[test]
    fn test_roundtrip() {
        let frame = Frame::from_value(&Ping { n: 7 }).unwrap();
        let mut buf = BytesMut::new();
        let mut codec = FrameCodec;
        codec.encode(frame, &mut buf).unwrap();

        let decoded = codec.decode(&mut buf).unwrap().expect("complete frame");
        let value: Ping = decoded.decode().unwrap();
        assert_eq!(value, Ping { n: 7 });
    }

    /// A partial frame (length header present, body incomplete) yields
    /// `Ok(None)` rather than an error, so the codec composes with
    /// `Framed` across multiple reads.
    #[test]
    fn test_partial_frame_returns_none() {
        let mut buf = BytesMut::new();
        buf.put_u32(10);
        buf.extend_from_slice(b"short");
        let mut codec = FrameCodec;
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    /// A declared length over the ceiling is rejected rather than causing
    /// an unbounded read buffer allocation.
    #[test]
    fn test_oversize_frame_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u32((MAX_FRAME_LEN + 1) as u32);
        let mut codec = FrameCodec;
        assert!(matches!(
            codec.decode(&mut buf),
            Err(FrameError::TooLarge(_))
        ));
    }
}
