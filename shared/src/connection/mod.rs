pub mod compression_config;
pub mod connection_config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame_assembler;
pub mod latency_monitor;
pub mod packet_type;
pub mod sync_header;
