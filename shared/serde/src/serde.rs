use crate::{
    error::SerdeErr,
    stream_reader::StreamReader,
    stream_writer::{ByteCounter, ByteWrite},
};

/// A value that can be written to and read from a frame byte stream
pub trait Serde: Sized + Clone + PartialEq {
    /// Append the value's bytes to the writer
    fn ser(&self, writer: &mut dyn ByteWrite);

    /// Consume the value's bytes at the reader's cursor
    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr>;

    /// Number of bytes `ser` would append
    fn byte_length(&self) -> usize {
        let mut counter = ByteCounter::new();
        self.ser(&mut counter);
        counter.bytes_written()
    }
}

/// Implemented by values whose encoded width never changes
pub trait ConstByteLength {
    fn const_byte_length() -> usize;
}
