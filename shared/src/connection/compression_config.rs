/// How frame payloads are compressed before they go on the wire. Only takes
/// effect when the `zstd_support` feature is enabled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CompressionMode {
    /// Payloads are sent as-is
    #[default]
    None,
    /// zstd with the given compression level
    Default(i32),
    /// zstd with the given compression level and a pre-trained dictionary
    Dictionary(i32, Vec<u8>),
}

impl CompressionMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CompressionMode::None)
    }
}
