use std::{default::Default, time::Duration};

/// Contains Config properties which will be used by a master or client
/// connection
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// How long the master waits for clients to acknowledge a frame before it
    /// logs a warning and swaps without them
    pub ack_timeout: Duration,
    /// How long a client waits for the next frame from the master
    pub frame_timeout: Duration,
    /// Delay between attempts to reach the master
    pub connect_retry_interval: Duration,
    /// Give up connecting after this many attempts, `None` retries until shutdown
    pub max_connect_attempts: Option<u32>,
    /// Granularity at which blocking reads check the shutdown signal
    pub read_poll_interval: Duration,
    /// Size of the buffer each reader thread reads into
    pub read_buffer_size: usize,
    /// Largest payload a header may announce
    pub max_payload_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            ack_timeout: Duration::from_secs(2),
            frame_timeout: Duration::from_secs(10),
            connect_retry_interval: Duration::from_millis(500),
            max_connect_attempts: Some(120),
            read_poll_interval: Duration::from_millis(10),
            read_buffer_size: 1408,
            max_payload_size: 64 * 1024 * 1024,
        }
    }
}
