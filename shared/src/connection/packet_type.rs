// The kinds of packets exchanged between the master and its clients. The
// discriminants are the first byte of every header on the wire.

use concord_serde::{ByteWrite, ConstByteLength, Serde, SerdeErr, StreamReader};

use super::error::PacketTypeError;

#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub enum PacketType {
    // Per-frame shared state, master to client
    Data,
    // A client finished the frame named in the header
    Ack,
    // Sent once by a client after connecting, the header's frame field carries its node id
    Connected,
    // Orderly shutdown of one side of the connection
    Disconnect,
}

impl PacketType {
    pub const fn id(&self) -> u8 {
        match self {
            PacketType::Data => 17,
            PacketType::Ack => 6,
            PacketType::Connected => 64,
            PacketType::Disconnect => 24,
        }
    }

    pub fn from_id(id: u8) -> Result<Self, PacketTypeError> {
        match id {
            17 => Ok(PacketType::Data),
            6 => Ok(PacketType::Ack),
            64 => Ok(PacketType::Connected),
            24 => Ok(PacketType::Disconnect),
            // SECURITY: anything else on the stream means it is corrupt or not ours
            index => Err(PacketTypeError::InvalidPacketTypeIndex { index }),
        }
    }
}

impl Serde for PacketType {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(self.id());
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        let id = u8::de(reader)?;
        PacketType::from_id(id).map_err(|_| SerdeErr::InvalidDiscriminant {
            type_name: "PacketType",
            value: u32::from(id),
        })
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl ConstByteLength for PacketType {
    fn const_byte_length() -> usize {
        1
    }
}
