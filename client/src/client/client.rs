use log::{error, info, warn};

use concord_shared::{
    ClusterContext, FrameCodec, FrameNumber, FrameStamp, LatencyMonitor, Link, NodeRole,
    SharedData, ShutdownSignal, SwapBarrier, SyncError, SyncPhase, SyncStateMachine, TcpLink,
};

use crate::{connection::connection::Connection, ClientConfig};

/// A client node. Receives the master's state every frame, applies it
/// through a [`FrameCodec`] and acknowledges the frame once it is rendered.
pub struct Client {
    config: ClientConfig,
    context: ClusterContext,
    connection: Option<Connection>,
    // Frame
    state: SyncStateMachine,
    frame: Option<FrameNumber>,
    shared_data: SharedData,
    barrier: SwapBarrier,
    latency: LatencyMonitor,
}

impl Client {
    /// Create a new Client using the software swap barrier
    pub fn new(config: ClientConfig) -> Result<Self, SyncError> {
        Self::with_barrier(config, SwapBarrier::software())
    }

    /// Create a new Client that locks its buffer swaps through `barrier`
    pub fn with_barrier(config: ClientConfig, mut barrier: SwapBarrier) -> Result<Self, SyncError> {
        if config.cluster.use_swap_barrier {
            barrier.enable()?;
        }
        let context = ClusterContext::new(
            config.cluster.clone(),
            NodeRole::Client {
                node_id: config.node_id,
            },
        );
        let latency = LatencyMonitor::new(config.latency_window);

        Ok(Self {
            config,
            context,
            connection: None,
            state: SyncStateMachine::new(),
            frame: None,
            shared_data: SharedData::new(),
            barrier,
            latency,
        })
    }

    /// Connect to the master over TCP, retrying as configured
    pub fn connect(&mut self) -> Result<(), SyncError> {
        let address = self.config.cluster.master_address;
        info!("Node {} connecting to master at {}", self.config.node_id, address);
        let link = TcpLink::connect(address, &self.config.connection, self.context.shutdown())?;
        self.attach(link)
    }

    /// Use an established link to the master, e.g. one end of an in-process
    /// channel, and send the handshake over it. Any previous connection is
    /// closed and the next frame must carry a full snapshot.
    pub fn attach(&mut self, link: Link) -> Result<(), SyncError> {
        self.disconnect();

        let mut connection = Connection::new(
            link,
            &self.config.connection,
            &self.config.cluster.compression,
            self.context.shutdown().clone(),
        )?;
        connection.send_handshake(self.config.node_id)?;
        info!(
            "Node {} connected to master {}",
            self.config.node_id,
            connection.master()
        );

        self.latency.reset();
        self.state.reset();
        self.connection = Some(connection);
        Ok(())
    }

    /// Drop the current connection and connect again
    pub fn reconnect(&mut self) -> Result<(), SyncError> {
        self.disconnect();
        self.connect()
    }

    /// Tell the master this node is leaving and close the connection
    pub fn disconnect(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            info!(
                "Node {} disconnecting from master {}",
                self.config.node_id,
                connection.master()
            );
            connection.disconnect();
        }
    }

    /// Disconnect and raise the session's shutdown signal
    pub fn shutdown(&mut self) {
        self.disconnect();
        self.context.shutdown().trigger();
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    // Frames

    /// Wait for the master's next frame and apply it through `codec`.
    ///
    /// A frame that cannot be decoded drops the connection without a
    /// disconnect packet and returns the error. The master sees a failed
    /// node and applies its fault tolerance.
    pub fn sync_frame(&mut self, codec: &mut dyn FrameCodec) -> Result<FrameStamp, SyncError> {
        let result = self.try_sync_frame(codec);
        if result.is_err() {
            self.state.reset();
        }
        result
    }

    /// Acknowledge the current frame after rendering it
    pub fn end_frame(&mut self) -> Result<(), SyncError> {
        let result = self.try_end_frame();
        if result.is_err() {
            self.state.reset();
        }
        result
    }

    // Accessors

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn context(&self) -> &ClusterContext {
        &self.context
    }

    pub fn node_id(&self) -> u32 {
        self.config.node_id
    }

    /// A handle that stops every blocking wait of this client when triggered
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.context.shutdown().clone()
    }

    /// The most recently applied frame
    pub fn frame(&self) -> Option<FrameNumber> {
        self.frame
    }

    pub fn phase(&self) -> SyncPhase {
        self.state.phase()
    }

    pub fn barrier(&self) -> &SwapBarrier {
        &self.barrier
    }

    /// One-way latency estimates from the master's frame stamps
    pub fn latency(&self) -> &LatencyMonitor {
        &self.latency
    }

    /// Whether the current connection has delivered a full snapshot
    pub fn snapshot_received(&self) -> bool {
        self.connection
            .as_ref()
            .map_or(false, Connection::snapshot_received)
    }

    // Private

    fn try_sync_frame(&mut self, codec: &mut dyn FrameCodec) -> Result<FrameStamp, SyncError> {
        if self.context.shutdown().is_triggered() {
            return Err(SyncError::Shutdown);
        }
        if self.connection.is_none() {
            return Err(SyncError::NotConnected);
        }

        self.state.advance(SyncPhase::PreSync)?;
        // Only the master encodes state
        self.state.advance(SyncPhase::Encode)?;

        self.state.advance(SyncPhase::Transmit)?;
        let frame_timeout = self.config.connection.frame_timeout;
        let poll_interval = self.config.connection.read_poll_interval;
        let received = match self.connection.as_mut() {
            Some(connection) => {
                connection.receive_frame(frame_timeout, poll_interval, self.context.shutdown())
            }
            None => Err(SyncError::NotConnected),
        };
        let packet = match received {
            Ok(packet) => packet,
            Err(error) => return Err(self.receive_failed(error)),
        };

        self.state.advance(SyncPhase::Decode)?;
        let clock = *self.context.clock();
        let latency = &mut self.latency;
        let decoded = match self.connection.as_mut() {
            Some(connection) => {
                connection.decode_frame(&packet, &mut self.shared_data, codec, |stamp| {
                    latency.record(stamp.master_time, clock.now());
                })
            }
            None => Err(SyncError::NotConnected),
        };
        let stamp = match decoded {
            Ok(stamp) => stamp,
            Err(error) => {
                error!(
                    "Node {} could not apply frame {}, dropping the connection: {}",
                    self.config.node_id, packet.header.frame, error
                );
                if let Some(mut connection) = self.connection.take() {
                    connection.abort();
                }
                return Err(error);
            }
        };
        self.frame = self.connection.as_ref().and_then(Connection::last_frame);

        self.state.advance(SyncPhase::Render)?;
        Ok(stamp)
    }

    fn try_end_frame(&mut self) -> Result<(), SyncError> {
        self.state.advance(SyncPhase::SwapReady)?;
        let (Some(connection), Some(frame)) = (self.connection.as_mut(), self.frame) else {
            return Err(SyncError::NotConnected);
        };
        if let Err(error) = connection.send_ack(frame) {
            warn!("Node {} could not acknowledge frame {}: {}", self.config.node_id, frame, error);
            let lost = SyncError::PeerLost {
                peer: connection.master().to_string(),
                frame: frame.get(),
            };
            self.connection = None;
            return Err(lost);
        }

        // The master's wait for every acknowledgement is the barrier, the
        // next frame only arrives once all nodes are done with this one
        self.state.advance(SyncPhase::SwapBarrierWait)?;
        self.state.advance(SyncPhase::Idle)?;
        self.barrier.frame_swapped();
        Ok(())
    }

    fn receive_failed(&mut self, error: SyncError) -> SyncError {
        match &error {
            SyncError::Shutdown => {
                // Either side ended the session
                self.shutdown();
            }
            SyncError::PeerLost { .. } => {
                self.connection = None;
            }
            _ => {}
        }
        error
    }
}
