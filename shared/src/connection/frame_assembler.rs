use concord_serde::StreamReader;

use super::{
    error::HeaderError,
    sync_header::{SyncHeader, HEADER_SIZE},
};

/// A header together with its complete payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingPacket {
    pub header: SyncHeader,
    pub payload: Vec<u8>,
}

/// Rebuilds packets from a byte stream that may be split at arbitrary points.
/// Bytes are pushed as they arrive; complete packets are pulled out in order.
pub struct FrameAssembler {
    buffer: Vec<u8>,
    pending_header: Option<SyncHeader>,
    max_payload_size: usize,
}

impl FrameAssembler {
    pub fn new(max_payload_size: usize) -> Self {
        Self {
            buffer: Vec::new(),
            pending_header: None,
            max_payload_size,
        }
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes received that do not yet form a complete packet
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Pull the next complete packet, if one has fully arrived.
    /// A header error leaves the stream unusable, the connection should be closed.
    pub fn next_packet(&mut self) -> Result<Option<IncomingPacket>, HeaderError> {
        if self.pending_header.is_none() {
            if self.buffer.len() < HEADER_SIZE {
                return Ok(None);
            }
            let header = {
                let mut reader = StreamReader::new(&self.buffer[..HEADER_SIZE]);
                SyncHeader::read(&mut reader)?
            };
            let size = header.data_size as usize;
            if size > self.max_payload_size {
                return Err(HeaderError::PayloadTooLarge {
                    size,
                    max: self.max_payload_size,
                });
            }
            self.buffer.drain(..HEADER_SIZE);
            self.pending_header = Some(header);
        }

        let Some(header) = self.pending_header else {
            return Ok(None);
        };
        let size = header.data_size as usize;
        if self.buffer.len() < size {
            return Ok(None);
        }

        let payload: Vec<u8> = self.buffer.drain(..size).collect();
        self.pending_header = None;
        Ok(Some(IncomingPacket { header, payload }))
    }
}
