/// Integration tests for header and packet type error handling
///
/// SECURITY: The header is the first thing read from an untrusted stream.

use concord_shared::{
    ConnectionError, FrameAssembler, HeaderError, PacketType, PacketTypeError, Serde, SerdeErr,
    StreamReader, StreamWriter, SyncHeader, HEADER_SIZE,
};

#[test]
fn test_invalid_packet_type_index_error() {
    let error = PacketTypeError::InvalidPacketTypeIndex { index: 5 };
    let msg = format!("{}", error);
    assert!(msg.contains("Invalid packet type id"));
    assert!(msg.contains("5"));
}

#[test]
fn test_packet_type_serde_rejects_unknown_id() {
    let bytes = [99u8];
    let mut reader = StreamReader::new(&bytes);
    assert_eq!(
        PacketType::de(&mut reader),
        Err(SerdeErr::InvalidDiscriminant {
            type_name: "PacketType",
            value: 99
        })
    );
}

#[test]
fn test_packet_type_serde_round_trip() {
    let mut writer = StreamWriter::new();
    PacketType::Connected.ser(&mut writer);
    assert_eq!(writer.as_slice(), &[64]);
}

#[test]
fn test_header_is_fixed_size_for_every_type() {
    for header in [
        SyncHeader::data(10, 100, 200),
        SyncHeader::ack(10),
        SyncHeader::connected(3),
        SyncHeader::disconnect(),
    ] {
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        let mut reader = StreamReader::new(&bytes);
        assert_eq!(SyncHeader::read(&mut reader), Ok(header));
        assert!(reader.is_empty());
    }
}

#[test]
fn test_short_header_is_truncated() {
    let bytes = SyncHeader::ack(1).to_bytes();
    let mut reader = StreamReader::new(&bytes[..6]);
    assert!(matches!(
        SyncHeader::read(&mut reader),
        Err(HeaderError::Truncated(SerdeErr::Underrun { .. }))
    ));
}

#[test]
fn test_ack_with_payload_is_rejected() {
    let mut bytes = SyncHeader::ack(1).to_bytes();
    bytes[5] = 1;
    let mut reader = StreamReader::new(&bytes);
    assert_eq!(
        SyncHeader::read(&mut reader),
        Err(HeaderError::UnexpectedPayload {
            packet_type: PacketType::Ack,
            data_size: 1
        })
    );
}

#[test]
fn test_frame_above_maximum_is_rejected() {
    let bytes = SyncHeader::data(10001, 0, 0).to_bytes();
    let mut reader = StreamReader::new(&bytes);
    assert_eq!(
        SyncHeader::read(&mut reader),
        Err(HeaderError::FrameOutOfRange { frame: 10001 })
    );
}

#[test]
fn test_garbage_stream_is_reported_by_assembler() {
    let mut assembler = FrameAssembler::new(1024);
    assembler.push(&[0xFF; HEADER_SIZE]);
    let error = assembler.next_packet().unwrap_err();
    assert_eq!(
        error,
        HeaderError::PacketType(PacketTypeError::InvalidPacketTypeIndex { index: 0xFF })
    );

    let connection_error: ConnectionError = error.into();
    assert!(format!("{}", connection_error).contains("Header error"));
}
