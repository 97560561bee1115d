/// In-memory links for end-to-end tests
/// Routes bytes between the master and one client without network I/O,
/// optionally cutting every send into random pieces the way a stream socket may

use std::time::Duration;

use concord_shared::{Link, LocalChannel, PacketSender, TransportError};

const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Both ends of one master / client connection
pub struct LocalLinkPair {
    pub master_end: Link,
    pub client_end: Link,
}

impl LocalLinkPair {
    pub fn new(node_id: u32) -> Self {
        let (master_end, client_end) =
            LocalChannel::pair("master", &format!("node-{}", node_id), POLL_INTERVAL);
        Self {
            master_end,
            client_end,
        }
    }

    /// Every send in either direction arrives as chunks of at most
    /// `max_chunk` bytes
    pub fn fragmented(node_id: u32, max_chunk: usize, seed: u64) -> Self {
        let mut pair = Self::new(node_id);
        pair.master_end = FragmentingSender::wrap(pair.master_end, max_chunk, seed);
        pair.client_end = FragmentingSender::wrap(pair.client_end, max_chunk, seed.wrapping_add(1));
        pair
    }
}

/// Splits each payload into randomly sized chunks before handing them to the
/// wrapped sender
pub struct FragmentingSender {
    inner: Box<dyn PacketSender>,
    max_chunk: usize,
    rng: fastrand::Rng,
}

impl FragmentingSender {
    pub fn new(inner: Box<dyn PacketSender>, max_chunk: usize, seed: u64) -> Self {
        Self {
            inner,
            max_chunk: max_chunk.max(1),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn wrap(link: Link, max_chunk: usize, seed: u64) -> Link {
        Link {
            peer: link.peer,
            sender: Box::new(Self::new(link.sender, max_chunk, seed)),
            receiver: link.receiver,
        }
    }
}

impl PacketSender for FragmentingSender {
    fn send(&mut self, payload: &[u8]) -> Result<(), TransportError> {
        let mut rest = payload;
        while !rest.is_empty() {
            let size = self.rng.usize(1..=self.max_chunk.min(rest.len()));
            let (chunk, tail) = rest.split_at(size);
            self.inner.send(chunk)?;
            rest = tail;
        }
        Ok(())
    }

    fn close(&mut self) {
        self.inner.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_arrive_in_order() {
        let mut pair = LocalLinkPair::fragmented(1, 3, 7);
        let payload: Vec<u8> = (0..40).collect();
        pair.master_end.sender.send(&payload).unwrap();

        let mut received = Vec::new();
        let mut chunks = 0;
        while received.len() < payload.len() {
            if let Some(chunk) = pair.client_end.receiver.receive().unwrap() {
                assert!(chunk.len() <= 3);
                received.extend_from_slice(chunk);
                chunks += 1;
            }
        }
        assert_eq!(received, payload);
        assert!(chunks >= 14);
    }
}
