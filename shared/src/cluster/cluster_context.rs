use crate::{backends::SessionClock, sync::shutdown::ShutdownSignal};

use super::cluster_config::ClusterConfig;

/// The role this process plays in the cluster
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeRole {
    Master,
    Client { node_id: u32 },
}

/// Session-wide state, created once at startup and passed to every component
/// that needs it
#[derive(Clone)]
pub struct ClusterContext {
    config: ClusterConfig,
    role: NodeRole,
    clock: SessionClock,
    shutdown: ShutdownSignal,
}

impl ClusterContext {
    pub fn new(config: ClusterConfig, role: NodeRole) -> Self {
        Self {
            config,
            role,
            clock: SessionClock::start(),
            shutdown: ShutdownSignal::new(),
        }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    pub fn is_master(&self) -> bool {
        self.role == NodeRole::Master
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }
}
