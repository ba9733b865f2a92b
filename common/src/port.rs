//! Game-server port allocation. Probes the OS by binding and immediately
//! releasing a candidate port, the same technique the lobby's source used
//! (`socket.bind` then `close`) rather than trusting an in-memory free list
//! alone, since the OS is the real source of truth for what is bindable.

use std::net::TcpListener as StdTcpListener;
use thiserror::Error;

pub const GAME_SERVER_PORT_RANGE: std::ops::Range<u16> = 10100..11000;

#[derive(Debug, Error)]
pub enum PortAllocError {
    #[error("no free port available in range {0:?}")]
    Exhausted(std::ops::Range<u16>),
}

/// Finds the first port in `GAME_SERVER_PORT_RANGE` that is not in `used`
/// and is currently bindable, without holding the bind open.
pub fn allocate_port(used: &std::collections::HashSet<u16>) -> Result<u16, PortAllocError> {
    for candidate in GAME_SERVER_PORT_RANGE {
        if used.contains(&candidate) {
            continue;
        }
        if StdTcpListener::bind(("0.0.0.0", candidate)).is_ok() {
            return Ok(candidate);
        }
    }
    Err(PortAllocError::Exhausted(GAME_SERVER_PORT_RANGE))
}
