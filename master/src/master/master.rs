use std::{
    collections::HashMap,
    fmt, mem,
    net::SocketAddr,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    time::Duration,
};

use log::{debug, error, info, warn};

use concord_shared::{
    encode_frame, ClusterContext, ConnectionError, Encoder, FaultTolerance, FrameCodec,
    FrameNumber, FrameStamp, HeaderError, Link, NodeRole, PacketType, PeerConnection, PeerEvent,
    SharedData, ShutdownSignal, SwapBarrier, SyncError, SyncHeader, SyncPhase, SyncStateMachine,
    TcpAcceptor, Timer, TransportError,
};

use crate::{
    events::MasterEvents,
    peer::{Peer, PeerKey},
    MasterConfig,
};

/// The master node. Owns the authoritative state, sends it to every client
/// once per frame and, under firm frame lock, holds the swap until every
/// client has acknowledged the frame.
pub struct Master {
    config: MasterConfig,
    context: ClusterContext,
    acceptor: Option<TcpAcceptor>,
    // Peers
    peers: HashMap<PeerKey, Peer>,
    next_peer_key: u64,
    peer_events_sender: Sender<(PeerKey, PeerEvent)>,
    peer_events: Receiver<(PeerKey, PeerEvent)>,
    // Frame
    state: SyncStateMachine,
    frame: FrameNumber,
    shared_data: SharedData,
    encoder: Encoder,
    barrier: SwapBarrier,
    force_snapshot: bool,
    // Events
    incoming_events: MasterEvents,
}

impl Master {
    /// Create a new Master using the software swap barrier
    pub fn new(config: MasterConfig) -> Result<Self, SyncError> {
        Self::with_barrier(config, SwapBarrier::software())
    }

    /// Create a new Master that locks its buffer swaps through `barrier`
    pub fn with_barrier(config: MasterConfig, mut barrier: SwapBarrier) -> Result<Self, SyncError> {
        let encoder =
            Encoder::try_new(&config.cluster.compression).map_err(ConnectionError::from)?;
        if config.cluster.use_swap_barrier {
            barrier.enable()?;
        }

        let context = ClusterContext::new(config.cluster.clone(), NodeRole::Master);
        let (peer_events_sender, peer_events) = mpsc::channel();

        Ok(Self {
            config,
            context,
            acceptor: None,
            // Peers
            peers: HashMap::new(),
            next_peer_key: 0,
            peer_events_sender,
            peer_events,
            // Frame
            state: SyncStateMachine::new(),
            frame: FrameNumber::ZERO,
            shared_data: SharedData::new(),
            encoder,
            barrier,
            // The first frame always carries the full state
            force_snapshot: true,
            // Events
            incoming_events: MasterEvents::new(),
        })
    }

    /// Listen for clients on the cluster's master address. Returns the bound
    /// address, which differs from the configured one when binding port 0.
    pub fn listen(&mut self) -> Result<SocketAddr, SyncError> {
        let acceptor = TcpAcceptor::bind(self.config.cluster.master_address)?;
        let address = acceptor.local_addr();
        self.acceptor = Some(acceptor);
        Ok(address)
    }

    /// Returns whether or not the Master is listening for Clients
    pub fn is_listening(&self) -> bool {
        self.acceptor.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.acceptor.as_ref().map(TcpAcceptor::local_addr)
    }

    /// Add a connection that was established outside the listener, e.g. one
    /// end of an in-process channel. The peer receives frames once it has
    /// sent its handshake.
    pub fn add_link(&mut self, link: Link) -> Result<PeerKey, SyncError> {
        let peer_key = PeerKey::new(self.next_peer_key);
        self.next_peer_key += 1;

        let connection = PeerConnection::spawn(
            peer_key,
            link,
            &self.config.connection,
            self.context.shutdown().clone(),
            self.peer_events_sender.clone(),
        )?;
        debug!(
            "Peer {} connected from {}, waiting for its handshake",
            peer_key.to_u64(),
            connection.peer()
        );
        self.peers.insert(peer_key, Peer::new(connection));
        Ok(peer_key)
    }

    /// Block until the configured number of clients has completed the
    /// handshake, the startup timeout passes, or shutdown is requested
    pub fn wait_for_clients(&mut self) -> Result<(), SyncError> {
        let expected = self.config.cluster.expected_clients;
        let timer = self.config.startup_timeout.map(Timer::new);
        info!("Waiting for {} clients", expected);

        while self.client_count() < expected {
            if self.context.shutdown().is_triggered() {
                return Err(SyncError::Shutdown);
            }
            if let Some(timer) = &timer {
                if timer.ringing() {
                    return Err(SyncError::Timeout {
                        frame: self.frame.get(),
                        waited: timer.elapsed(),
                        waiting_for: "clients to connect",
                    });
                }
            }
            self.accept_connections();
            self.wait_peer_event(self.config.connection.read_poll_interval)?;
        }

        info!("{} of {} clients connected", self.client_count(), expected);
        Ok(())
    }

    /// Accept new clients and handle whatever peers sent since the last
    /// call, without blocking
    pub fn poll(&mut self) -> Result<(), SyncError> {
        self.accept_connections();
        self.drain_peer_events()
    }

    /// Returns everything that happened to peers since the last call
    pub fn receive(&mut self) -> MasterEvents {
        mem::replace(&mut self.incoming_events, MasterEvents::new())
    }

    // Frames

    /// Runs the master's side of a frame up to rendering: accepts clients,
    /// encodes `codec` and sends the frame to every client. Returns the
    /// stamp that was sent.
    pub fn sync_frame(&mut self, codec: &mut dyn FrameCodec) -> Result<FrameStamp, SyncError> {
        let result = self.try_sync_frame(codec);
        if result.is_err() {
            self.state.reset();
        }
        result
    }

    /// Finishes a frame after rendering. Under firm frame lock this waits
    /// until every client acknowledged the frame. Clients still silent after
    /// the ack timeout are dropped or end the session, per fault tolerance.
    pub fn end_frame(&mut self) -> Result<(), SyncError> {
        let result = self.try_end_frame();
        if result.is_err() {
            self.state.reset();
        }
        result
    }

    /// Ends the session: sends a disconnect to every client, closes every
    /// connection and raises the session's shutdown signal
    pub fn shutdown(&mut self) {
        info!("Master shutting down, disconnecting {} peers", self.peers.len());
        for (_, mut peer) in self.peers.drain() {
            peer.disconnect();
        }
        self.acceptor = None;
        self.context.shutdown().trigger();
    }

    // Accessors

    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    pub fn context(&self) -> &ClusterContext {
        &self.context
    }

    /// A handle that stops every blocking wait of this master when triggered
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.context.shutdown().clone()
    }

    /// The frame that the next `sync_frame` sends
    pub fn frame(&self) -> FrameNumber {
        self.frame
    }

    pub fn phase(&self) -> SyncPhase {
        self.state.phase()
    }

    pub fn barrier(&self) -> &SwapBarrier {
        &self.barrier
    }

    /// Number of clients that completed the handshake
    pub fn client_count(&self) -> usize {
        self.peers.values().filter(|peer| peer.is_handshaken()).count()
    }

    pub fn peer(&self, peer_key: &PeerKey) -> Option<&Peer> {
        self.peers.get(peer_key)
    }

    /// Keys of every client that completed the handshake, in connection order
    pub fn client_keys(&self) -> Vec<PeerKey> {
        let mut output: Vec<PeerKey> = self
            .peers
            .iter()
            .filter(|(_, peer)| peer.is_handshaken())
            .map(|(peer_key, _)| *peer_key)
            .collect();
        output.sort();
        output
    }

    // Private

    fn try_sync_frame(&mut self, codec: &mut dyn FrameCodec) -> Result<FrameStamp, SyncError> {
        if self.context.shutdown().is_triggered() {
            return Err(SyncError::Shutdown);
        }

        self.state.advance(SyncPhase::PreSync)?;
        self.accept_connections();
        self.drain_peer_events()?;

        self.state.advance(SyncPhase::Encode)?;
        let master_time = self.context.clock().now();
        let stamp = encode_frame(&mut self.shared_data, master_time, codec, self.force_snapshot);
        self.force_snapshot = false;

        self.state.advance(SyncPhase::Transmit)?;
        self.transmit()?;

        // The master holds the authoritative state, so it has nothing to decode
        self.state.advance(SyncPhase::Decode)?;
        self.state.advance(SyncPhase::Render)?;
        Ok(stamp)
    }

    fn try_end_frame(&mut self) -> Result<(), SyncError> {
        self.state.advance(SyncPhase::SwapReady)?;
        self.state.advance(SyncPhase::SwapBarrierWait)?;
        self.wait_for_acks()?;
        self.state.advance(SyncPhase::Idle)?;

        self.barrier.frame_swapped();
        self.frame = self.frame.next();
        Ok(())
    }

    fn transmit(&mut self) -> Result<(), SyncError> {
        let uncompressed = self.shared_data.encoded();
        let payload = self
            .encoder
            .try_encode(uncompressed)
            .map_err(ConnectionError::from)?;
        let max = self.config.connection.max_payload_size;
        if payload.len() > max {
            return Err(ConnectionError::from(HeaderError::PayloadTooLarge {
                size: payload.len(),
                max,
            })
            .into());
        }
        let header = SyncHeader::data(
            self.frame.get(),
            payload.len() as u32,
            uncompressed.len() as u32,
        );

        let mut failed = Vec::new();
        for (peer_key, peer) in self.peers.iter_mut() {
            if !peer.is_handshaken() {
                continue;
            }
            if let Err(error) = peer.send_frame(&header, payload) {
                failed.push((*peer_key, error));
            }
        }

        for (peer_key, error) in failed {
            self.peer_failed(peer_key, error)?;
        }
        Ok(())
    }

    fn wait_for_acks(&mut self) -> Result<(), SyncError> {
        self.drain_peer_events()?;
        if !self.config.cluster.firm_frame_lock {
            return Ok(());
        }

        let timer = Timer::new(self.config.connection.ack_timeout);
        while self.peers.values().any(Peer::is_awaiting_ack) {
            if self.context.shutdown().is_triggered() {
                return Err(SyncError::Shutdown);
            }
            if timer.ringing() {
                let waited = timer.elapsed();
                let late: Vec<PeerKey> = self
                    .peers
                    .iter()
                    .filter(|(_, peer)| peer.is_awaiting_ack())
                    .map(|(peer_key, _)| *peer_key)
                    .collect();
                warn!(
                    "Frame {}: no acknowledgement from {} peers after {:?}",
                    self.frame,
                    late.len(),
                    waited
                );
                self.incoming_events.push_error(SyncError::Timeout {
                    frame: self.frame.get(),
                    waited,
                    waiting_for: "frame acknowledgements",
                });
                let reason = format!("no acknowledgement of frame {} after {:?}", self.frame, waited);
                for peer_key in late {
                    self.apply_fault_tolerance(peer_key, &reason)?;
                }
                return Ok(());
            }

            let wait = timer
                .remaining()
                .min(self.config.connection.read_poll_interval);
            self.wait_peer_event(wait)?;
        }
        Ok(())
    }

    fn accept_connections(&mut self) {
        loop {
            let Some(acceptor) = &self.acceptor else {
                return;
            };
            match acceptor.accept(&self.config.connection) {
                Ok(Some(link)) => {
                    if let Err(error) = self.add_link(link) {
                        warn!("Failed to set up a client connection: {}", error);
                        self.incoming_events.push_error(error);
                    }
                }
                Ok(None) => return,
                Err(error) => {
                    warn!("Failed to accept a client: {}", error);
                    self.incoming_events.push_error(error.into());
                    return;
                }
            }
        }
    }

    fn wait_peer_event(&mut self, timeout: Duration) -> Result<(), SyncError> {
        match self.peer_events.recv_timeout(timeout) {
            Ok((peer_key, event)) => self.handle_peer_event(peer_key, event),
            // The master keeps a sender, so the channel never disconnects
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Ok(()),
        }
    }

    fn drain_peer_events(&mut self) -> Result<(), SyncError> {
        while let Ok((peer_key, event)) = self.peer_events.try_recv() {
            self.handle_peer_event(peer_key, event)?;
        }
        Ok(())
    }

    fn handle_peer_event(&mut self, peer_key: PeerKey, event: PeerEvent) -> Result<(), SyncError> {
        if !self.peers.contains_key(&peer_key) {
            // Left over from a connection that was already removed
            return Ok(());
        }

        match event {
            PeerEvent::Packet(packet) => match packet.header.packet_type {
                PacketType::Connected => self.handshake(peer_key, packet.header.frame),
                PacketType::Ack => self.receive_ack(peer_key, packet.header.frame),
                PacketType::Disconnect => {
                    debug!("Peer {} sent a disconnect", peer_key.to_u64());
                }
                PacketType::Data => {
                    warn!(
                        "Ignoring a data packet from peer {}, clients do not send state",
                        peer_key.to_u64()
                    );
                }
            },
            PeerEvent::Closed(None) => {
                if let Some(peer) = self.peers.get(&peer_key) {
                    info!("{} left the session", describe(peer));
                }
                self.remove_peer(peer_key);
            }
            PeerEvent::Closed(Some(error)) => {
                return self.peer_failed(peer_key, error);
            }
        }
        Ok(())
    }

    fn handshake(&mut self, peer_key: PeerKey, node_id: i32) {
        // Connected headers with a negative id are rejected by the reader
        let node_id = node_id.unsigned_abs();

        let replaced = self
            .peers
            .iter()
            .find(|(key, peer)| **key != peer_key && peer.node_id() == Some(node_id))
            .map(|(key, _)| *key);
        if let Some(old_key) = replaced {
            info!("Node {} reconnected, replacing its previous connection", node_id);
            self.remove_peer(old_key);
        }

        let Some(peer) = self.peers.get_mut(&peer_key) else {
            return;
        };
        if let Some(existing) = peer.node_id() {
            warn!(
                "Node {} sent a second handshake as node {}, ignoring it",
                existing, node_id
            );
            return;
        }
        peer.set_node_id(node_id);
        info!("Node {} connected from {}", node_id, peer.address());

        // A joining client needs the full state, whether or not it changed
        self.force_snapshot = true;
        self.incoming_events.push_connection(&peer_key, node_id);
    }

    fn receive_ack(&mut self, peer_key: PeerKey, frame: i32) {
        let Some(peer) = self.peers.get_mut(&peer_key) else {
            return;
        };
        if !peer.receive_ack(frame) {
            debug!("Ignoring stale acknowledgement of frame {} from {}", frame, describe(peer));
        }
    }

    fn peer_failed(&mut self, peer_key: PeerKey, error: TransportError) -> Result<(), SyncError> {
        let Some(peer) = self.peers.get(&peer_key) else {
            return Ok(());
        };
        if !peer.is_handshaken() {
            debug!("{} failed before its handshake: {}", describe(peer), error);
            self.remove_peer(peer_key);
            return Ok(());
        }
        self.apply_fault_tolerance(peer_key, &error)
    }

    /// Drop a handshaken peer that failed or fell behind, or end the session,
    /// as the cluster's fault tolerance says
    fn apply_fault_tolerance(
        &mut self,
        peer_key: PeerKey,
        reason: &dyn fmt::Display,
    ) -> Result<(), SyncError> {
        let Some(peer) = self.peers.get(&peer_key) else {
            return Ok(());
        };
        let description = describe(peer);
        let lost = SyncError::PeerLost {
            peer: peer.address().to_string(),
            frame: self.frame.get(),
        };

        match self.config.cluster.fault_tolerance {
            FaultTolerance::DropNode => {
                warn!("Dropping {}: {}", description, reason);
                self.remove_peer(peer_key);
                self.incoming_events.push_error(lost);
                Ok(())
            }
            FaultTolerance::TearDown => {
                error!("Lost {} ({}), tearing down the session", description, reason);
                // A late node may still be listening, so it gets the disconnect too
                if let Some(mut peer) = self.peers.remove(&peer_key) {
                    peer.disconnect();
                    self.incoming_events
                        .push_disconnection(&peer_key, peer.node_id());
                }
                self.shutdown();
                Err(lost)
            }
        }
    }

    fn remove_peer(&mut self, peer_key: PeerKey) {
        if let Some(mut peer) = self.peers.remove(&peer_key) {
            peer.close();
            self.incoming_events
                .push_disconnection(&peer_key, peer.node_id());
        }
    }
}

fn describe(peer: &Peer) -> String {
    match peer.node_id() {
        Some(node_id) => format!("node {} ({})", node_id, peer.address()),
        None => format!("unidentified peer {}", peer.address()),
    }
}
