use std::default::Default;

use concord_shared::{ClusterConfig, ConnectionConfig};

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Cluster-wide settings, identical on every node
    pub cluster: ClusterConfig,
    /// Used to configure the connection to the Master
    pub connection: ConnectionConfig,
    /// Announced to the master in the handshake. A client that reconnects
    /// with the same id replaces its previous connection.
    pub node_id: u32,
    /// Number of frames the latency average is taken over
    pub latency_window: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            connection: ConnectionConfig::default(),
            node_id: 1,
            latency_window: 64,
        }
    }
}
