use concord_serde::{ByteWrite, Serde, StreamReader};

use super::{error::HeaderError, packet_type::PacketType};
use crate::sync::frame_number::MAX_FRAME_NUMBER;

/// Size of every header on the wire, regardless of packet type
pub const HEADER_SIZE: usize = 13;

/// Bytes following the packet id of a disconnect header
pub const DISCONNECT_MARKER: [u8; 7] = [24, b'\r', b'\n', 27, b'\r', b'\n', 0];

/// Fixed-size header preceding every payload:
/// `u8 id`, `i32 frame`, `u32 data size`, `u32 uncompressed size`, little-endian.
/// A disconnect header replaces the numeric fields with [`DISCONNECT_MARKER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncHeader {
    pub packet_type: PacketType,
    pub frame: i32,
    pub data_size: u32,
    pub uncompressed_size: u32,
}

impl SyncHeader {
    pub fn data(frame: i32, data_size: u32, uncompressed_size: u32) -> Self {
        Self {
            packet_type: PacketType::Data,
            frame,
            data_size,
            uncompressed_size,
        }
    }

    pub fn ack(frame: i32) -> Self {
        Self {
            packet_type: PacketType::Ack,
            frame,
            data_size: 0,
            uncompressed_size: 0,
        }
    }

    pub fn connected(node_id: i32) -> Self {
        Self {
            packet_type: PacketType::Connected,
            frame: node_id,
            data_size: 0,
            uncompressed_size: 0,
        }
    }

    pub fn disconnect() -> Self {
        Self {
            packet_type: PacketType::Disconnect,
            frame: 0,
            data_size: 0,
            uncompressed_size: 0,
        }
    }

    pub fn write(&self, writer: &mut dyn ByteWrite) {
        self.packet_type.ser(writer);
        if self.packet_type == PacketType::Disconnect {
            writer.write_bytes(&DISCONNECT_MARKER);
            writer.write_bytes(&[0; HEADER_SIZE - 1 - DISCONNECT_MARKER.len()]);
            return;
        }
        self.frame.ser(writer);
        self.data_size.ser(writer);
        self.uncompressed_size.ser(writer);
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut writer = concord_serde::StreamWriter::with_capacity(HEADER_SIZE);
        self.write(&mut writer);
        let mut output = [0u8; HEADER_SIZE];
        output.copy_from_slice(writer.as_slice());
        output
    }

    /// Parse and validate a header. Consumes exactly [`HEADER_SIZE`] bytes.
    pub fn read(reader: &mut StreamReader) -> Result<Self, HeaderError> {
        let offset = reader.position();
        let id = u8::de(reader)?;
        let packet_type = PacketType::from_id(id)?;

        if packet_type == PacketType::Disconnect {
            let marker = reader.read_array::<7>()?;
            reader.read_bytes(HEADER_SIZE - 1 - DISCONNECT_MARKER.len())?;
            if marker != DISCONNECT_MARKER {
                return Err(HeaderError::InvalidDisconnectMarker { offset });
            }
            return Ok(Self::disconnect());
        }

        let frame = i32::de(reader)?;
        let data_size = u32::de(reader)?;
        let uncompressed_size = u32::de(reader)?;

        match packet_type {
            PacketType::Data | PacketType::Ack => {
                if !(0..=MAX_FRAME_NUMBER).contains(&frame) {
                    return Err(HeaderError::FrameOutOfRange { frame });
                }
            }
            PacketType::Connected => {
                if frame < 0 {
                    return Err(HeaderError::InvalidNodeId { node_id: frame });
                }
            }
            PacketType::Disconnect => {}
        }
        if packet_type != PacketType::Data && data_size != 0 {
            return Err(HeaderError::UnexpectedPayload {
                packet_type,
                data_size,
            });
        }

        Ok(Self {
            packet_type,
            frame,
            data_size,
            uncompressed_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_header_layout() {
        let bytes = SyncHeader::data(258, 5, 9).to_bytes();
        assert_eq!(
            bytes,
            [17, 2, 1, 0, 0, 5, 0, 0, 0, 9, 0, 0, 0]
        );
    }

    #[test]
    fn disconnect_header_layout() {
        let bytes = SyncHeader::disconnect().to_bytes();
        assert_eq!(&bytes[..8], &[24, 24, b'\r', b'\n', 27, b'\r', b'\n', 0]);
        assert!(bytes[8..].iter().all(|b| *b == 0));

        let mut reader = StreamReader::new(&bytes);
        assert_eq!(SyncHeader::read(&mut reader), Ok(SyncHeader::disconnect()));
        assert_eq!(reader.position(), HEADER_SIZE);
    }

    #[test]
    fn negative_frame_is_rejected() {
        let bytes = SyncHeader::ack(-1).to_bytes();
        let mut reader = StreamReader::new(&bytes);
        assert_eq!(
            SyncHeader::read(&mut reader),
            Err(HeaderError::FrameOutOfRange { frame: -1 })
        );
    }

    #[test]
    fn corrupt_disconnect_marker_is_rejected() {
        let mut bytes = SyncHeader::disconnect().to_bytes();
        bytes[3] = b'x';
        let mut reader = StreamReader::new(&bytes);
        assert_eq!(
            SyncHeader::read(&mut reader),
            Err(HeaderError::InvalidDisconnectMarker { offset: 0 })
        );
    }
}
