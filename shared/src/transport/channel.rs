use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    time::Duration,
};

use super::{error::TransportError, Link, PacketReceiver, PacketSender};

/// In-process transport, used to run several nodes inside one process
pub struct LocalChannel;

impl LocalChannel {
    /// Create two connected links. Bytes sent on one arrive on the other.
    pub fn pair(name_a: &str, name_b: &str, poll_interval: Duration) -> (Link, Link) {
        let (a_to_b, b_from_a) = mpsc::channel();
        let (b_to_a, a_from_b) = mpsc::channel();

        let link_a = Link {
            peer: name_b.to_string(),
            sender: Box::new(ChannelSender::new(a_to_b, name_b)),
            receiver: Box::new(ChannelReceiver::new(a_from_b, name_b, poll_interval)),
        };
        let link_b = Link {
            peer: name_a.to_string(),
            sender: Box::new(ChannelSender::new(b_to_a, name_a)),
            receiver: Box::new(ChannelReceiver::new(b_from_a, name_a, poll_interval)),
        };
        (link_a, link_b)
    }
}

struct ChannelSender {
    sender: Option<Sender<Box<[u8]>>>,
    peer: String,
}

impl ChannelSender {
    fn new(sender: Sender<Box<[u8]>>, peer: &str) -> Self {
        Self {
            sender: Some(sender),
            peer: peer.to_string(),
        }
    }
}

impl PacketSender for ChannelSender {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        let closed = || TransportError::Closed {
            peer: self.peer.clone(),
        };
        let sender = self.sender.as_ref().ok_or_else(closed)?;
        sender.send(payload.into()).map_err(|_| closed())
    }

    fn close(&mut self) {
        self.sender = None;
    }
}

struct ChannelReceiver {
    receiver: Receiver<Box<[u8]>>,
    peer: String,
    poll_interval: Duration,
    current_payload: Option<Box<[u8]>>,
}

impl ChannelReceiver {
    fn new(receiver: Receiver<Box<[u8]>>, peer: &str, poll_interval: Duration) -> Self {
        Self {
            receiver,
            peer: peer.to_string(),
            poll_interval,
            current_payload: None,
        }
    }
}

impl PacketReceiver for ChannelReceiver {
    fn receive(&mut self) -> Result<Option<&[u8]>, TransportError> {
        match self.receiver.recv_timeout(self.poll_interval) {
            Ok(payload) => {
                self.current_payload = Some(payload);
                Ok(self.current_payload.as_deref())
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Closed {
                peer: self.peer.clone(),
            }),
        }
    }
}
