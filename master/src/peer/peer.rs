use std::time::Duration;

use concord_shared::{PeerConnection, RoundTripTracker, SyncHeader, TransportError};

// PeerKey
/// Identifies one connection on the master. A client that reconnects gets a new key.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct PeerKey(u64);

impl PeerKey {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

/// A connected client as seen by the master
pub struct Peer {
    connection: PeerConnection,
    node_id: Option<u32>,
    awaiting_ack: Option<i32>,
    round_trips: RoundTripTracker,
}

impl Peer {
    pub(crate) fn new(connection: PeerConnection) -> Self {
        Self {
            connection,
            node_id: None,
            awaiting_ack: None,
            round_trips: RoundTripTracker::new(),
        }
    }

    pub fn address(&self) -> &str {
        self.connection.peer()
    }

    /// The node id announced in the client's handshake
    pub fn node_id(&self) -> Option<u32> {
        self.node_id
    }

    /// Whether the client has announced itself and receives frames
    pub fn is_handshaken(&self) -> bool {
        self.node_id.is_some()
    }

    /// Whether the client still owes an acknowledgement for a frame it was sent
    pub fn is_awaiting_ack(&self) -> bool {
        self.awaiting_ack.is_some()
    }

    /// Round trip of the most recently acknowledged frame
    pub fn round_trip(&self) -> Option<Duration> {
        self.round_trips.last()
    }

    pub(crate) fn set_node_id(&mut self, node_id: u32) {
        self.node_id = Some(node_id);
    }

    pub(crate) fn send_frame(
        &mut self,
        header: &SyncHeader,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        self.connection.send_packet(header, payload)?;
        self.awaiting_ack = Some(header.frame);
        self.round_trips.record_send(header.frame);
        Ok(())
    }

    /// Returns whether `frame` was the acknowledgement this peer owed
    pub(crate) fn receive_ack(&mut self, frame: i32) -> bool {
        if self.awaiting_ack != Some(frame) {
            return false;
        }
        self.awaiting_ack = None;
        self.round_trips.record_ack(frame);
        true
    }

    pub(crate) fn disconnect(&mut self) {
        self.connection.disconnect();
    }

    pub(crate) fn close(&mut self) {
        self.connection.close();
    }
}
