use thiserror::Error;

/// Errors that can occur while reading values back out of a byte stream, or
/// while writing a length that the wire format cannot carry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The stream ended before the value could be read completely
    #[error("Buffer underrun at offset {offset}: needed {needed} bytes but only {remaining} remain")]
    Underrun {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A boolean was encoded with a byte other than 0 or 1
    #[error("Invalid boolean byte {value:#04x} at offset {offset}")]
    InvalidBool { offset: usize, value: u8 },

    /// A length-prefixed string did not contain valid UTF-8
    #[error("String of {length} bytes at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize, length: usize },

    /// An enum tag did not match any known variant
    #[error("Invalid discriminant {value} for {type_name}")]
    InvalidDiscriminant {
        type_name: &'static str,
        value: u32,
    },

    /// A decoded integer does not fit the local type
    #[error("Value {value} at offset {offset} does not fit in {type_name}")]
    Overflow {
        offset: usize,
        value: u64,
        type_name: &'static str,
    },

    /// A collection is longer than its u32 length prefix can express
    #[error("Length {length} exceeds the u32 length prefix")]
    LengthOverflow { length: usize },
}
