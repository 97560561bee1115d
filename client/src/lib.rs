//! # Concord Client
//! A client node of a concord cluster. It receives the master's per-frame
//! state, applies it in lockstep with every other node and acknowledges each
//! frame so the master can release the swap.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use concord_shared::{
        ClusterConfig, CompressionMode, ConnectionConfig, FrameCodec, FrameStamp, LatencyMonitor,
        LocalChannel, Serde, SerdeErr, SharedData, SharedValue, SharedVec, SyncError,
    };
}

mod client;
mod connection;

pub use client::{Client, ClientConfig};
