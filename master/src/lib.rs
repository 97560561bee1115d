//! # Concord Master
//! The master node of a concord cluster. It owns the authoritative per-frame
//! state, broadcasts it to every client over TCP or any other [`Link`], and
//! holds the frame lock that keeps every node on the same frame.
//!
//! [`Link`]: concord_shared::Link

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use concord_shared::{
        ClusterConfig, CompressionMode, ConnectionConfig, FaultTolerance, FrameCodec, FrameStamp,
        LocalChannel, Serde, SerdeErr, SharedData, SharedValue, SharedVec, SyncError,
    };
}

mod events;
mod master;
mod peer;

pub use events::{ConnectEvent, DisconnectEvent, ErrorEvent, MasterEvent, MasterEvents};
pub use master::{Master, MasterConfig};
pub use peer::{Peer, PeerKey};
