use concord_serde::SerdeErr;
use thiserror::Error;

use super::packet_type::PacketType;

/// Errors that can occur while compressing outgoing frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderError {
    /// Failed to create compressor with the specified configuration
    #[error("Failed to create compressor with compression level {level}")]
    CompressorCreationFailed { level: i32 },

    /// Failed to create compressor with dictionary
    #[error("Failed to create compressor with dictionary (compression level {level})")]
    CompressorWithDictionaryFailed { level: i32 },

    /// Compression operation failed
    #[error("Failed to compress payload of {payload_size} bytes")]
    CompressionFailed { payload_size: usize },
}

/// Errors that can occur while decompressing incoming frames
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
    /// Failed to create decompressor
    #[error("Failed to create decompressor")]
    DecompressorCreationFailed,

    /// Failed to create decompressor with dictionary
    #[error("Failed to create decompressor with dictionary")]
    DecompressorWithDictionaryFailed,

    /// Decompression operation failed (SECURITY: potentially malicious payload)
    #[error("Failed to decompress payload of {payload_size} bytes into {expected_size} bytes")]
    DecompressionFailed {
        payload_size: usize,
        expected_size: usize,
    },

    /// The payload did not expand to the size announced by its header
    #[error("Decompressed payload is {actual} bytes but the header announced {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Errors that can occur when reading a packet id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketTypeError {
    /// Invalid packet type index received (SECURITY: potentially malicious packet)
    #[error("Invalid packet type id {index} received (valid ids: 6, 17, 24, 64). This may indicate a corrupt stream")]
    InvalidPacketTypeIndex { index: u8 },
}

/// Errors that can occur when parsing a frame header
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Header truncated: {0}")]
    Truncated(#[from] SerdeErr),

    #[error("Packet type error: {0}")]
    PacketType(#[from] PacketTypeError),

    #[error("Frame number {frame} is outside the valid range")]
    FrameOutOfRange { frame: i32 },

    #[error("Node id {node_id} in connection header is negative")]
    InvalidNodeId { node_id: i32 },

    #[error("Disconnect header at offset {offset} has a corrupt marker")]
    InvalidDisconnectMarker { offset: usize },

    #[error("{packet_type:?} header announced a {data_size} byte payload")]
    UnexpectedPayload {
        packet_type: PacketType,
        data_size: u32,
    },

    #[error("Payload of {size} bytes exceeds the limit of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },
}

/// General connection-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Encoder error
    #[error("Encoder error: {0}")]
    Encoder(#[from] EncoderError),

    /// Decoder error
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),

    /// Header error
    #[error("Header error: {0}")]
    Header(#[from] HeaderError),
}
