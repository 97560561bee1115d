use concord_serde::{Serde, SerdeErr, StreamReader, StreamWriter};

use super::shared_value::{SharedValue, SharedVec};

/// The per-frame state buffer. It is owned by the sync engine, filled only
/// during the encode phase and consumed only during the decode phase.
pub struct SharedData {
    writer: StreamWriter,
    incoming: Vec<u8>,
    cursor: usize,
}

impl SharedData {
    pub fn new() -> Self {
        Self {
            writer: StreamWriter::new(),
            incoming: Vec::new(),
            cursor: 0,
        }
    }

    // Encoding

    /// Start a new outgoing frame
    pub fn begin_encode(&mut self) {
        self.writer.clear();
    }

    pub fn write<T: Serde>(&mut self, value: &T) {
        value.ser(&mut self.writer);
    }

    /// Append an opaque, length-prefixed byte block. Nothing is written when
    /// the block is too long for its prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SerdeErr> {
        length_prefix(bytes.len())?.ser(&mut self.writer);
        concord_serde::ByteWrite::write_bytes(&mut self.writer, bytes);
        Ok(())
    }

    pub fn write_shared<T: Serde>(&mut self, value: &SharedValue<T>) {
        value.with(|inner| inner.ser(&mut self.writer));
    }

    pub fn write_shared_vec<T: Serde>(&mut self, values: &SharedVec<T>) -> Result<(), SerdeErr> {
        values.with(|inner| {
            length_prefix(inner.len())?.ser(&mut self.writer);
            for value in inner {
                value.ser(&mut self.writer);
            }
            Ok(())
        })
    }

    /// Bytes written since [`SharedData::begin_encode`]
    pub fn encoded(&self) -> &[u8] {
        self.writer.as_slice()
    }

    // Decoding

    /// Start reading an incoming frame
    pub fn begin_decode(&mut self, bytes: &[u8]) {
        self.incoming.clear();
        self.incoming.extend_from_slice(bytes);
        self.cursor = 0;
    }

    pub fn read<T: Serde>(&mut self) -> Result<T, SerdeErr> {
        let mut reader = StreamReader::with_position(&self.incoming, self.cursor);
        let value = T::de(&mut reader)?;
        self.cursor = reader.position();
        Ok(value)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, SerdeErr> {
        self.read::<Vec<u8>>()
    }

    pub fn read_shared<T: Serde>(&mut self, value: &SharedValue<T>) -> Result<(), SerdeErr> {
        let decoded = self.read::<T>()?;
        value.set(decoded);
        Ok(())
    }

    pub fn read_shared_vec<T: Serde>(&mut self, values: &SharedVec<T>) -> Result<(), SerdeErr> {
        let decoded = self.read::<Vec<T>>()?;
        values.set_vec(decoded);
        Ok(())
    }

    /// Bytes of the incoming frame not yet read
    pub fn unread(&self) -> usize {
        self.incoming.len() - self.cursor
    }
}

fn length_prefix(length: usize) -> Result<u32, SerdeErr> {
    u32::try_from(length).map_err(|_| SerdeErr::LengthOverflow { length })
}

impl Default for SharedData {
    fn default() -> Self {
        Self::new()
    }
}
