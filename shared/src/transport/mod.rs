//! Byte-stream transports between the master and its clients.
//!
//! A transport delivers bytes in order but may split them at any point; the
//! [`PeerConnection`](peer_connection::PeerConnection) reader thread rebuilds
//! whole packets before anything reaches the render thread.

pub mod channel;
pub mod error;
pub mod peer_connection;
pub mod tcp;

use error::TransportError;

/// Sends bytes to a single peer
pub trait PacketSender: Send {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError>;

    /// Close the outgoing side. Further sends fail.
    fn close(&mut self);
}

/// Receives bytes from a single peer
pub trait PacketReceiver: Send {
    /// Returns the next chunk of the stream, or `None` if nothing arrived
    /// within the transport's poll interval
    fn receive(&mut self) -> Result<Option<&[u8]>, TransportError>;
}

/// Both directions of a connection to one peer
pub struct Link {
    pub peer: String,
    pub sender: Box<dyn PacketSender>,
    pub receiver: Box<dyn PacketReceiver>,
}
