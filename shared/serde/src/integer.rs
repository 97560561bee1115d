use crate::{
    error::SerdeErr,
    serde::{ConstByteLength, Serde},
    stream_reader::StreamReader,
    stream_writer::ByteWrite,
};

macro_rules! impl_serde_integer {
    ($($type:ty),*) => {$(
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn ByteWrite) {
                writer.write_bytes(&self.to_le_bytes());
            }

            fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
                let bytes = reader.read_array::<{ std::mem::size_of::<$type>() }>()?;
                Ok(<$type>::from_le_bytes(bytes))
            }

            fn byte_length(&self) -> usize {
                std::mem::size_of::<$type>()
            }
        }

        impl ConstByteLength for $type {
            fn const_byte_length() -> usize {
                std::mem::size_of::<$type>()
            }
        }
    )*};
}

impl_serde_integer!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

// usize travels as u64 so 32 and 64 bit nodes agree on the width
impl Serde for usize {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        (*self as u64).ser(writer);
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        let offset = reader.position();
        narrow(u64::de(reader)?, offset, "usize")
    }

    fn byte_length(&self) -> usize {
        8
    }
}

impl ConstByteLength for usize {
    fn const_byte_length() -> usize {
        8
    }
}

fn narrow<T: TryFrom<u64>>(value: u64, offset: usize, type_name: &'static str) -> Result<T, SerdeErr> {
    T::try_from(value).map_err(|_| SerdeErr::Overflow {
        offset,
        value,
        type_name,
    })
}

#[cfg(test)]
mod tests {
    use crate::{Serde, SerdeErr, StreamReader, StreamWriter};

    #[test]
    fn integers_are_little_endian() {
        let mut writer = StreamWriter::new();
        0x0102_0304u32.ser(&mut writer);
        (-2i16).ser(&mut writer);

        assert_eq!(writer.as_slice(), &[0x04, 0x03, 0x02, 0x01, 0xFE, 0xFF]);
    }

    #[test]
    fn integer_extremes_round_trip() {
        let mut writer = StreamWriter::new();
        u64::MAX.ser(&mut writer);
        i64::MIN.ser(&mut writer);
        i8::MIN.ser(&mut writer);
        let bytes = writer.to_bytes();

        let mut reader = StreamReader::new(&bytes);
        assert_eq!(u64::de(&mut reader), Ok(u64::MAX));
        assert_eq!(i64::de(&mut reader), Ok(i64::MIN));
        assert_eq!(i8::de(&mut reader), Ok(i8::MIN));
        assert!(reader.is_empty());
    }

    #[test]
    fn usize_reads_back_as_written() {
        let mut writer = StreamWriter::new();
        4096usize.ser(&mut writer);
        let bytes = writer.to_bytes();

        assert_eq!(bytes.len(), 8);
        assert_eq!(usize::de(&mut StreamReader::new(&bytes)), Ok(4096));
    }

    #[test]
    fn wide_value_is_an_overflow_not_an_underrun() {
        assert_eq!(super::narrow::<u32>(u32::MAX as u64, 4, "u32"), Ok(u32::MAX));
        assert_eq!(
            super::narrow::<u32>(u32::MAX as u64 + 1, 4, "u32"),
            Err(SerdeErr::Overflow {
                offset: 4,
                value: u32::MAX as u64 + 1,
                type_name: "u32",
            })
        );
    }
}
