use concord_serde::{ConstByteLength, Serde, SerdeErr, StreamReader};

use crate::error::{MeshSection, ParseError};

/// Little-endian reader that tags every failure with the mesh section being read
pub(crate) struct MeshReader<'b> {
    reader: StreamReader<'b>,
}

impl<'b> MeshReader<'b> {
    pub fn new(bytes: &'b [u8]) -> Self {
        Self {
            reader: StreamReader::new(bytes),
        }
    }

    pub fn position(&self) -> usize {
        self.reader.position()
    }

    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    pub fn read<T: Serde>(&mut self, section: MeshSection) -> Result<T, ParseError> {
        let available = self.reader.remaining();
        T::de(&mut self.reader).map_err(|error| section_error(section, error, available))
    }

    pub fn read_bytes(&mut self, section: MeshSection, count: usize) -> Result<&'b [u8], ParseError> {
        let available = self.reader.remaining();
        self.reader
            .read_bytes(count)
            .map_err(|error| section_error(section, error, available))
    }

    /// Reads `count` fixed-width values. The length is checked before anything
    /// is allocated.
    pub fn read_vec<T: Serde + ConstByteLength>(
        &mut self,
        section: MeshSection,
        count: usize,
    ) -> Result<Vec<T>, ParseError> {
        let available = self.reader.remaining();
        let needed = count.saturating_mul(T::const_byte_length());
        if needed > available {
            return Err(ParseError::Truncated {
                section,
                needed,
                available,
            });
        }

        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read(section)?);
        }
        Ok(output)
    }
}

fn section_error(section: MeshSection, error: SerdeErr, available: usize) -> ParseError {
    match error {
        SerdeErr::Underrun { needed, .. } => ParseError::Truncated {
            section,
            needed,
            available,
        },
        source => ParseError::Malformed { section, source },
    }
}
