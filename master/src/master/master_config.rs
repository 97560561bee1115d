use std::{default::Default, time::Duration};

use concord_shared::{ClusterConfig, ConnectionConfig};

/// Contains Config properties which will be used by the Master
#[derive(Clone, Debug)]
pub struct MasterConfig {
    /// Cluster-wide settings, identical on every node
    pub cluster: ClusterConfig,
    /// Used to configure the connections with Clients
    pub connection: ConnectionConfig,
    /// How long [`Master::wait_for_clients`](crate::Master::wait_for_clients)
    /// waits for the expected clients before giving up. `None` waits until shutdown.
    pub startup_timeout: Option<Duration>,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterConfig::default(),
            connection: ConnectionConfig::default(),
            startup_timeout: Some(Duration::from_secs(60)),
        }
    }
}
