use crate::{
    error::SerdeErr,
    serde::{ConstByteLength, Serde},
    stream_reader::StreamReader,
    stream_writer::ByteWrite,
};

// Floats are written as their raw bit pattern so NaN payloads and signed
// zeros survive the trip unchanged.

impl Serde for f32 {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.to_bits().ser(writer);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        Ok(f32::from_bits(u32::de(reader)?))
    }

    fn byte_length(&self) -> usize {
        4
    }
}

impl ConstByteLength for f32 {
    fn const_byte_length() -> usize {
        4
    }
}

impl Serde for f64 {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.to_bits().ser(writer);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        Ok(f64::from_bits(u64::de(reader)?))
    }

    fn byte_length(&self) -> usize {
        8
    }
}

impl ConstByteLength for f64 {
    fn const_byte_length() -> usize {
        8
    }
}

#[cfg(test)]
mod tests {
    use crate::{Serde, StreamReader, StreamWriter};

    #[test]
    fn float_bit_patterns_survive() {
        let nan = f32::from_bits(0x7FC0_1234);
        let mut writer = StreamWriter::new();
        nan.ser(&mut writer);
        (-0.0f64).ser(&mut writer);
        let bytes = writer.to_bytes();

        let mut reader = StreamReader::new(&bytes);
        assert_eq!(f32::de(&mut reader).unwrap().to_bits(), 0x7FC0_1234);
        assert_eq!(f64::de(&mut reader).unwrap().to_bits(), (-0.0f64).to_bits());
    }
}
