use std::{
    default::Default,
    net::{IpAddr, Ipv4Addr, SocketAddr},
};

use crate::connection::compression_config::CompressionMode;

/// What the master does when a client connection fails mid-session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaultTolerance {
    /// Drop the failed node and keep the session running
    #[default]
    DropNode,
    /// End the session on every node
    TearDown,
}

/// Contains Config properties describing the whole cluster, identical on every node
#[derive(Clone, Debug)]
pub struct ClusterConfig {
    /// Address the master listens on and clients connect to
    pub master_address: SocketAddr,
    /// Number of clients the master waits for before the first frame
    pub expected_clients: usize,
    /// When set, the master waits for every client to finish a frame before
    /// swapping; otherwise it only collects acknowledgements already received
    pub firm_frame_lock: bool,
    pub fault_tolerance: FaultTolerance,
    /// Join the swap barrier at startup
    pub use_swap_barrier: bool,
    pub compression: CompressionMode,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            master_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 20401),
            expected_clients: 0,
            firm_frame_lock: true,
            fault_tolerance: FaultTolerance::default(),
            use_swap_barrier: false,
            compression: CompressionMode::default(),
        }
    }
}
