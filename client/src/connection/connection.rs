use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    time::Duration,
};

use log::{debug, info, warn};

use concord_shared::{
    decode_frame, frame_greater_than, CompressionMode, ConnectionConfig, ConnectionError, Decoder,
    FrameCodec, FrameNumber, FrameStamp, IncomingPacket, Link, PacketType, PeerConnection,
    PeerEvent, SharedData, ShutdownSignal, SyncError, SyncHeader, Timer, TransportError,
};

/// A client's connection to the master: the reader thread's output, the
/// payload decoder and whether a full snapshot has arrived over it yet
pub struct Connection {
    peer: PeerConnection,
    events: Receiver<((), PeerEvent)>,
    decoder: Decoder,
    snapshot_received: bool,
    last_frame: Option<FrameNumber>,
}

impl Connection {
    pub fn new(
        link: Link,
        connection_config: &ConnectionConfig,
        compression: &CompressionMode,
        shutdown: ShutdownSignal,
    ) -> Result<Self, SyncError> {
        let decoder = Decoder::try_new(compression).map_err(ConnectionError::from)?;
        let (sender, events) = mpsc::channel();
        let peer = PeerConnection::spawn((), link, connection_config, shutdown, sender)?;

        Ok(Self {
            peer,
            events,
            decoder,
            snapshot_received: false,
            last_frame: None,
        })
    }

    pub fn master(&self) -> &str {
        self.peer.peer()
    }

    pub fn snapshot_received(&self) -> bool {
        self.snapshot_received
    }

    pub fn last_frame(&self) -> Option<FrameNumber> {
        self.last_frame
    }

    pub fn send_handshake(&mut self, node_id: u32) -> Result<(), TransportError> {
        let node_id = i32::try_from(node_id).map_err(|_| TransportError::Handshake {
            peer: self.master().to_string(),
            reason: format!("node id {} does not fit the header", node_id),
        })?;
        self.peer.send_packet(&SyncHeader::connected(node_id), &[])
    }

    pub fn send_ack(&mut self, frame: FrameNumber) -> Result<(), TransportError> {
        self.peer.send_packet(&SyncHeader::ack(frame.get()), &[])
    }

    /// Wait for the next data packet from the master.
    ///
    /// Returns [`SyncError::Shutdown`] if shutdown was requested or the
    /// master ended the session, and [`SyncError::PeerLost`] if the
    /// connection failed.
    pub fn receive_frame(
        &mut self,
        timeout: Duration,
        poll_interval: Duration,
        shutdown: &ShutdownSignal,
    ) -> Result<IncomingPacket, SyncError> {
        let timer = Timer::new(timeout);
        loop {
            if shutdown.is_triggered() {
                return Err(SyncError::Shutdown);
            }
            if timer.ringing() {
                return Err(SyncError::Timeout {
                    frame: self.expected_frame(),
                    waited: timer.elapsed(),
                    waiting_for: "frame data",
                });
            }

            match self.events.recv_timeout(timer.remaining().min(poll_interval)) {
                Ok((_, PeerEvent::Packet(packet))) => match packet.header.packet_type {
                    PacketType::Data => return Ok(packet),
                    PacketType::Disconnect => {
                        debug!("Master {} sent a disconnect", self.master());
                    }
                    PacketType::Ack | PacketType::Connected => {
                        warn!(
                            "Ignoring {:?} packet from master {}",
                            packet.header.packet_type,
                            self.master()
                        );
                    }
                },
                Ok((_, PeerEvent::Closed(None))) => {
                    info!("Master {} ended the session", self.master());
                    return Err(SyncError::Shutdown);
                }
                Ok((_, PeerEvent::Closed(Some(error)))) => {
                    warn!("Lost connection to master {}: {}", self.master(), error);
                    return Err(self.lost());
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(self.lost()),
            }
        }
    }

    /// Decompress and apply one data packet. `on_stamp` sees the frame's
    /// stamp before the application state is decoded.
    pub fn decode_frame(
        &mut self,
        packet: &IncomingPacket,
        shared_data: &mut SharedData,
        codec: &mut dyn FrameCodec,
        on_stamp: impl FnOnce(&FrameStamp),
    ) -> Result<FrameStamp, SyncError> {
        let frame = FrameNumber::new(packet.header.frame)?;
        if let Some(last) = self.last_frame {
            if !frame_greater_than(frame.get(), last.get()) {
                return Err(SyncError::UnexpectedFrame {
                    expected: last.next().get(),
                    received: frame.get(),
                });
            }
        }

        let bytes = self
            .decoder
            .try_decode(&packet.payload, packet.header.uncompressed_size as usize)
            .map_err(ConnectionError::from)?;
        let stamp = decode_frame(
            shared_data,
            bytes,
            codec,
            frame.get(),
            self.peer.peer(),
            self.snapshot_received,
            on_stamp,
        )?;

        self.snapshot_received |= stamp.has_state;
        self.last_frame = Some(frame);
        Ok(stamp)
    }

    /// Tell the master we are leaving, then close the connection
    pub fn disconnect(&mut self) {
        self.peer.disconnect();
    }

    /// Close the connection without the disconnect packet, so the master
    /// treats this node as failed rather than departed
    pub fn abort(&mut self) {
        self.peer.close();
    }

    fn expected_frame(&self) -> i32 {
        self.last_frame.map_or(0, |frame| frame.next().get())
    }

    fn lost(&self) -> SyncError {
        SyncError::PeerLost {
            peer: self.master().to_string(),
            frame: self.expected_frame(),
        }
    }
}
