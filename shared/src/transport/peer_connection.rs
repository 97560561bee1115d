use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
        Arc,
    },
    thread::{self, JoinHandle},
};

use log::{debug, warn};

use super::{error::TransportError, Link, PacketReceiver, PacketSender};
use crate::{
    connection::{
        connection_config::ConnectionConfig,
        frame_assembler::{FrameAssembler, IncomingPacket},
        packet_type::PacketType,
        sync_header::{SyncHeader, HEADER_SIZE},
    },
    sync::shutdown::ShutdownSignal,
};

/// What a reader thread hands to the render thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// A complete packet
    Packet(IncomingPacket),
    /// The stream ended. `None` after an orderly disconnect packet.
    Closed(Option<TransportError>),
}

/// One connection to a peer. Incoming bytes are read on a dedicated thread and
/// only complete packets are forwarded, tagged with `key`, over `events`.
pub struct PeerConnection {
    peer: String,
    sender: Box<dyn PacketSender>,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    outgoing: Vec<u8>,
}

impl PeerConnection {
    pub fn spawn<K: Copy + Send + 'static>(
        key: K,
        link: Link,
        config: &ConnectionConfig,
        shutdown: ShutdownSignal,
        events: Sender<(K, PeerEvent)>,
    ) -> Result<Self, TransportError> {
        let Link {
            peer,
            sender,
            receiver,
        } = link;
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let thread_peer = peer.clone();
        let max_payload_size = config.max_payload_size;

        let reader = thread::Builder::new()
            .name(format!("concord-reader-{}", peer))
            .spawn(move || {
                read_loop(
                    key,
                    receiver,
                    FrameAssembler::new(max_payload_size),
                    &thread_peer,
                    &shutdown,
                    &thread_stop,
                    &events,
                )
            })
            .map_err(|error| TransportError::io(&peer, &error))?;

        Ok(Self {
            peer,
            sender,
            stop,
            reader: Some(reader),
            outgoing: Vec::new(),
        })
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Send a header and its payload as one write
    pub fn send_packet(&mut self, header: &SyncHeader, payload: &[u8]) -> Result<(), TransportError> {
        self.outgoing.clear();
        self.outgoing.reserve(HEADER_SIZE + payload.len());
        self.outgoing.extend_from_slice(&header.to_bytes());
        self.outgoing.extend_from_slice(payload);
        self.sender.send(&self.outgoing)
    }

    /// Tell the peer we are leaving, then close both directions
    pub fn disconnect(&mut self) {
        if let Err(error) = self.send_packet(&SyncHeader::disconnect(), &[]) {
            debug!("Could not send disconnect to {}: {}", self.peer, error);
        }
        self.close();
    }

    pub fn close(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        self.sender.close();
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                warn!("Reader thread for {} panicked", self.peer);
            }
        }
    }
}

impl Drop for PeerConnection {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_loop<K: Copy>(
    key: K,
    mut receiver: Box<dyn PacketReceiver>,
    mut assembler: FrameAssembler,
    peer: &str,
    shutdown: &ShutdownSignal,
    stop: &AtomicBool,
    events: &Sender<(K, PeerEvent)>,
) {
    loop {
        if shutdown.is_triggered() || stop.load(Ordering::SeqCst) {
            return;
        }

        let bytes = match receiver.receive() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => continue,
            Err(error) => {
                debug!("Stream from {} ended: {}", peer, error);
                let _ = events.send((key, PeerEvent::Closed(Some(error))));
                return;
            }
        };
        assembler.push(bytes);

        loop {
            match assembler.next_packet() {
                Ok(Some(packet)) => {
                    let disconnect = packet.header.packet_type == PacketType::Disconnect;
                    if events.send((key, PeerEvent::Packet(packet))).is_err() {
                        // Nobody is listening anymore
                        return;
                    }
                    if disconnect {
                        let _ = events.send((key, PeerEvent::Closed(None)));
                        return;
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    warn!("Corrupt stream from {}: {}", peer, error);
                    let _ = events.send((key, PeerEvent::Closed(Some(error.into()))));
                    return;
                }
            }
        }
    }
}
