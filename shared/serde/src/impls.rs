use crate::{
    error::SerdeErr,
    serde::{ConstByteLength, Serde},
    stream_reader::StreamReader,
    stream_writer::ByteWrite,
};

// Bool

impl Serde for bool {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        writer.write_byte(u8::from(*self));
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        let offset = reader.position();
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(SerdeErr::InvalidBool { offset, value }),
        }
    }

    fn byte_length(&self) -> usize {
        1
    }
}

impl ConstByteLength for bool {
    fn const_byte_length() -> usize {
        1
    }
}

// Unit

impl Serde for () {
    fn ser(&self, _: &mut dyn ByteWrite) {}

    fn de(_: &mut StreamReader) -> Result<Self, SerdeErr> {
        Ok(())
    }

    fn byte_length(&self) -> usize {
        0
    }
}

// Length prefix

fn ser_length(length: usize, writer: &mut dyn ByteWrite) {
    debug_assert!(length <= u32::MAX as usize);
    (length as u32).ser(writer);
}

fn de_length(reader: &mut StreamReader) -> Result<usize, SerdeErr> {
    Ok(u32::de(reader)? as usize)
}

// String

impl Serde for String {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        ser_length(self.len(), writer);
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        let length = de_length(reader)?;
        let offset = reader.position();
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| SerdeErr::InvalidUtf8 { offset, length })
    }

    fn byte_length(&self) -> usize {
        4 + self.len()
    }
}

// Vec, including opaque byte blocks as Vec<u8>

impl<T: Serde> Serde for Vec<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        ser_length(self.len(), writer);
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        let length = de_length(reader)?;
        // Every element takes at least one byte, except zero-sized ones
        let mut output = Vec::with_capacity(length.min(reader.remaining()));
        for _ in 0..length {
            output.push(T::de(reader)?);
        }
        Ok(output)
    }
}

// Option

impl<T: Serde> Serde for Option<T> {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        match self {
            Some(value) => {
                true.ser(writer);
                value.ser(writer);
            }
            None => false.ser(writer),
        }
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            Ok(Some(T::de(reader)?))
        } else {
            Ok(None)
        }
    }
}

// Fixed arrays

impl<T: Serde + Copy + Default, const N: usize> Serde for [T; N] {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        for item in self {
            item.ser(writer);
        }
    }

    fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
        let mut output = [T::default(); N];
        for slot in output.iter_mut() {
            *slot = T::de(reader)?;
        }
        Ok(output)
    }
}
