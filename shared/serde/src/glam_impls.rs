use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::{
    error::SerdeErr,
    serde::{ConstByteLength, Serde},
    stream_reader::StreamReader,
    stream_writer::ByteWrite,
};

macro_rules! impl_serde_float_array {
    ($type:ty, $len:expr, $to:ident, $from:path) => {
        impl Serde for $type {
            fn ser(&self, writer: &mut dyn ByteWrite) {
                for component in self.$to() {
                    component.ser(writer);
                }
            }

            fn de(reader: &mut StreamReader) -> Result<Self, SerdeErr> {
                let components = <[f32; $len]>::de(reader)?;
                Ok($from(&components))
            }

            fn byte_length(&self) -> usize {
                $len * 4
            }
        }

        impl ConstByteLength for $type {
            fn const_byte_length() -> usize {
                $len * 4
            }
        }
    };
}

impl_serde_float_array!(Vec2, 2, to_array, Vec2::from_slice);
impl_serde_float_array!(Vec3, 3, to_array, Vec3::from_slice);
impl_serde_float_array!(Vec4, 4, to_array, Vec4::from_slice);
// x, y, z, w
impl_serde_float_array!(Quat, 4, to_array, Quat::from_slice);
// column major
impl_serde_float_array!(Mat4, 16, to_cols_array, Mat4::from_cols_slice);
