use std::{io, net::SocketAddr};

use thiserror::Error;

use crate::connection::error::HeaderError;

/// Errors that can occur while moving bytes between nodes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("I/O error talking to {peer}: {kind:?}: {message}")]
    Io {
        peer: String,
        kind: io::ErrorKind,
        message: String,
    },

    #[error("Connection to {peer} is closed")]
    Closed { peer: String },

    #[error("Failed to bind {address}: {message}")]
    Bind { address: SocketAddr, message: String },

    #[error("Gave up connecting to {address} after {attempts} attempts")]
    ConnectFailed { address: SocketAddr, attempts: u32 },

    #[error("Handshake with {peer} failed: {reason}")]
    Handshake { peer: String, reason: String },

    #[error("Corrupt stream: {0}")]
    Header(#[from] HeaderError),
}

impl TransportError {
    pub fn io(peer: &str, error: &io::Error) -> Self {
        Self::Io {
            peer: peer.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
