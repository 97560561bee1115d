use crate::error::SerdeErr;

/// Cursor over an incoming frame buffer. Reads never go past the end of the
/// buffer; a short buffer produces [`SerdeErr::Underrun`].
pub struct StreamReader<'b> {
    buffer: &'b [u8],
    cursor: usize,
}

impl<'b> StreamReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    /// Resume reading a buffer at a previously saved position
    pub fn with_position(buffer: &'b [u8], position: usize) -> Self {
        Self {
            buffer,
            cursor: position.min(buffer.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], SerdeErr> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(SerdeErr::Underrun {
                offset: self.cursor,
                needed: count,
                remaining,
            });
        }
        let start = self.cursor;
        self.cursor += count;
        Ok(&self.buffer[start..self.cursor])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SerdeErr> {
        let mut output = [0u8; N];
        output.copy_from_slice(self.read_bytes(N)?);
        Ok(output)
    }

    /// Unread portion of the buffer, without advancing
    pub fn peek_remaining(&self) -> &'b [u8] {
        &self.buffer[self.cursor..]
    }
}
