use std::time::Duration;

use concord_serde::SerdeErr;
use thiserror::Error;

use super::{frame_number::FrameNumberError, phase::SyncPhase, swap_group::SwapGroupError};
use crate::{connection::error::ConnectionError, transport::error::TransportError};

/// Errors raised while driving a frame through the cluster
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// The frame's bytes ran out before every field was read
    #[error("Frame {frame} from {peer} could not be decoded: {source}")]
    Desync {
        frame: i32,
        peer: String,
        source: SerdeErr,
    },

    /// Decoding finished with bytes left over, so the field lists disagree
    #[error("Frame {frame} from {peer} left {count} bytes unread after decoding")]
    TrailingBytes {
        frame: i32,
        peer: String,
        count: usize,
    },

    /// A frame without state arrived before any full snapshot
    #[error("Frame {frame} carried no state but no snapshot has been received yet")]
    MissingSnapshot { frame: i32 },

    #[error("Lost connection to {peer} at frame {frame}")]
    PeerLost { peer: String, frame: i32 },

    #[error("Timed out after {waited:?} waiting for {waiting_for} at frame {frame}")]
    Timeout {
        frame: i32,
        waited: Duration,
        waiting_for: &'static str,
    },

    #[error("Illegal sync phase transition from {from:?} to {to:?}")]
    InvalidTransition { from: SyncPhase, to: SyncPhase },

    #[error("Master sent frame {received} while frame {expected} was expected")]
    UnexpectedFrame { expected: i32, received: i32 },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Swap group error: {0}")]
    SwapGroup(#[from] SwapGroupError),

    #[error("Frame number error: {0}")]
    FrameNumber(#[from] FrameNumberError),

    #[error("Not connected to the master")]
    NotConnected,

    #[error("Shutdown requested")]
    Shutdown,
}

impl SyncError {
    /// Whether this error means the node's state no longer matches the master's
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            SyncError::Desync { .. } | SyncError::TrailingBytes { .. } | SyncError::MissingSnapshot { .. }
        )
    }
}
