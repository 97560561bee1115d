/// Sink for serialized bytes
pub trait ByteWrite {
    fn write_byte(&mut self, byte: u8);

    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }

    /// Returns true when the writer only measures output
    fn is_counter(&self) -> bool;
}

/// A growable outgoing buffer. One is filled per frame and cleared afterwards,
/// so the allocation is reused across frames.
pub struct StreamWriter {
    buffer: Vec<u8>,
}

impl StreamWriter {
    pub fn new() -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Drops the written bytes but keeps the allocation
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn to_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for StreamWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteWrite for StreamWriter {
    fn write_byte(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn is_counter(&self) -> bool {
        false
    }
}

/// Writer that discards its input and only counts it
pub struct ByteCounter {
    bytes_written: usize,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self { bytes_written: 0 }
    }

    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }
}

impl Default for ByteCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteWrite for ByteCounter {
    fn write_byte(&mut self, _: u8) {
        self.bytes_written += 1;
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes_written += bytes.len();
    }

    fn is_counter(&self) -> bool {
        true
    }
}
