use std::{mem, vec::IntoIter};

use concord_shared::SyncError;

use crate::peer::PeerKey;

/// Everything that happened to the master's peers since the last call to
/// [`Master::receive`](crate::Master::receive)
pub struct MasterEvents {
    connections: Vec<(PeerKey, u32)>,
    disconnections: Vec<(PeerKey, Option<u32>)>,
    errors: Vec<SyncError>,

    empty: bool,
}

impl MasterEvents {
    pub(crate) fn new() -> Self {
        Self {
            connections: Vec::new(),
            disconnections: Vec::new(),
            errors: Vec::new(),

            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: MasterEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: MasterEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, peer_key: &PeerKey, node_id: u32) {
        self.connections.push((*peer_key, node_id));
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, peer_key: &PeerKey, node_id: Option<u32>) {
        self.disconnections.push((*peer_key, node_id));
        self.empty = false;
    }

    pub(crate) fn push_error(&mut self, error: SyncError) {
        self.errors.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait MasterEvent {
    type Iter;

    fn iter(events: &mut MasterEvents) -> Self::Iter;

    fn has(events: &MasterEvents) -> bool;
}

// ConnectEvent
/// A client completed its handshake. Carries the client's node id.
pub struct ConnectEvent;
impl MasterEvent for ConnectEvent {
    type Iter = IntoIter<(PeerKey, u32)>;

    fn iter(events: &mut MasterEvents) -> Self::Iter {
        let list = mem::take(&mut events.connections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &MasterEvents) -> bool {
        !events.connections.is_empty()
    }
}

// DisconnectEvent
/// A peer left or was dropped. The node id is `None` if it never finished its handshake.
pub struct DisconnectEvent;
impl MasterEvent for DisconnectEvent {
    type Iter = IntoIter<(PeerKey, Option<u32>)>;

    fn iter(events: &mut MasterEvents) -> Self::Iter {
        let list = mem::take(&mut events.disconnections);
        IntoIterator::into_iter(list)
    }

    fn has(events: &MasterEvents) -> bool {
        !events.disconnections.is_empty()
    }
}

// ErrorEvent
/// Non-fatal errors: ack timeouts and peers dropped under
/// [`FaultTolerance::DropNode`](concord_shared::FaultTolerance)
pub struct ErrorEvent;
impl MasterEvent for ErrorEvent {
    type Iter = IntoIter<SyncError>;

    fn iter(events: &mut MasterEvents) -> Self::Iter {
        let list = mem::take(&mut events.errors);
        IntoIterator::into_iter(list)
    }

    fn has(events: &MasterEvents) -> bool {
        !events.errors.is_empty()
    }
}
