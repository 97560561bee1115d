cfg_if! {
    if #[cfg(feature = "zstd_support")]
    {
        use zstd::bulk::Compressor;

        use super::compression_config::CompressionMode;
        use super::error::EncoderError;

        pub struct Encoder {
            result: Vec<u8>,
            compressor: Option<Compressor<'static>>,
        }

        impl Encoder {
            /// Try to create a new Encoder with the specified compression mode
            pub fn try_new(compression_mode: &CompressionMode) -> Result<Self, EncoderError> {
                let compressor = match compression_mode {
                    CompressionMode::None => None,
                    CompressionMode::Default(level) => Some(
                        Compressor::new(*level)
                            .map_err(|_| EncoderError::CompressorCreationFailed { level: *level })?,
                    ),
                    CompressionMode::Dictionary(level, dictionary) => Some(
                        Compressor::with_dictionary(*level, dictionary)
                            .map_err(|_| EncoderError::CompressorWithDictionaryFailed { level: *level })?,
                    ),
                };

                Ok(Self {
                    result: Vec::new(),
                    compressor,
                })
            }

            /// Try to encode a payload, returning error on compression failure
            pub fn try_encode(&mut self, payload: &[u8]) -> Result<&[u8], EncoderError> {
                match &mut self.compressor {
                    Some(compressor) => {
                        self.result = compressor
                            .compress(payload)
                            .map_err(|_| EncoderError::CompressionFailed {
                                payload_size: payload.len(),
                            })?;
                    }
                    None => {
                        self.result.clear();
                        self.result.extend_from_slice(payload);
                    }
                }
                Ok(&self.result)
            }
        }
    }
    else
    {
        use super::compression_config::CompressionMode;
        use super::error::EncoderError;

        pub struct Encoder {
            result: Vec<u8>,
        }

        impl Encoder {
            pub fn try_new(_: &CompressionMode) -> Result<Self, EncoderError> {
                Ok(Self { result: Vec::new() })
            }

            pub fn try_encode(&mut self, payload: &[u8]) -> Result<&[u8], EncoderError> {
                self.result.clear();
                self.result.extend_from_slice(payload);
                Ok(&self.result)
            }
        }
    }
}
