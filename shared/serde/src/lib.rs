//! # Concord Serde
//! Byte-exact, order-preserving serialization for the state that cluster
//! nodes exchange once per frame. Values are written in call order and must be
//! read back in the same order; every multi-byte value is little-endian.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod error;
mod impls;
mod integer;
mod number;
mod serde;
mod stream_reader;
mod stream_writer;

#[cfg(feature = "glam")]
mod glam_impls;

pub use error::SerdeErr;
pub use serde::{ConstByteLength, Serde};
pub use stream_reader::StreamReader;
pub use stream_writer::{ByteCounter, ByteWrite, StreamWriter};
