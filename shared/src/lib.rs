//! # Concord Shared
//! Common functionality shared between concord-master & concord-client
//! crates: frame headers, per-frame shared state, the sync phase machine,
//! swap barriers and transports.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod backends;
mod cluster;
mod connection;
mod shared_data;
mod sync;
mod transport;

pub use concord_serde::{
    ByteCounter, ByteWrite, ConstByteLength, Serde, SerdeErr, StreamReader, StreamWriter,
};

pub use backends::{SessionClock, TimeError, Timer};
pub use cluster::{
    cluster_config::{ClusterConfig, FaultTolerance},
    cluster_context::{ClusterContext, NodeRole},
};
pub use connection::{
    compression_config::CompressionMode,
    connection_config::ConnectionConfig,
    decoder::Decoder,
    encoder::Encoder,
    error::{ConnectionError, DecoderError, EncoderError, HeaderError, PacketTypeError},
    frame_assembler::{FrameAssembler, IncomingPacket},
    latency_monitor::{LatencyMonitor, RoundTripTracker},
    packet_type::PacketType,
    sync_header::{SyncHeader, DISCONNECT_MARKER, HEADER_SIZE},
};
pub use shared_data::{
    frame_codec::FrameCodec,
    shared_data::SharedData,
    shared_value::{SharedValue, SharedVec},
};
pub use sync::{
    error::SyncError,
    frame_number::{
        frame_greater_than, try_frame_diff, FrameNumber, FrameNumberError, MAX_FRAME_NUMBER,
    },
    payload::{decode_frame, decode_frame_stamp, encode_frame, FrameStamp},
    phase::{SyncPhase, SyncStateMachine},
    shutdown::ShutdownSignal,
    swap_group::{SoftwareSwapGroup, SwapBarrier, SwapGroup, SwapGroupError, SwapGroupLimits},
};
pub use transport::{
    channel::LocalChannel,
    error::TransportError,
    peer_connection::{PeerConnection, PeerEvent},
    tcp::{TcpAcceptor, TcpLink},
    Link, PacketReceiver, PacketSender,
};
