cfg_if! {
    if #[cfg(feature = "zstd_support")]
    {
        use zstd::bulk::Decompressor;

        use super::compression_config::CompressionMode;
        use super::error::DecoderError;

        pub struct Decoder {
            result: Vec<u8>,
            decompressor: Option<Decompressor<'static>>,
        }

        impl Decoder {
            /// Try to create a new Decoder with the specified compression mode
            pub fn try_new(compression_mode: &CompressionMode) -> Result<Self, DecoderError> {
                let decompressor = match compression_mode {
                    CompressionMode::None => None,
                    CompressionMode::Default(_) => Some(
                        Decompressor::new().map_err(|_| DecoderError::DecompressorCreationFailed)?,
                    ),
                    CompressionMode::Dictionary(_, dictionary) => Some(
                        Decompressor::with_dictionary(dictionary)
                            .map_err(|_| DecoderError::DecompressorWithDictionaryFailed)?,
                    ),
                };

                Ok(Self {
                    result: Vec::new(),
                    decompressor,
                })
            }

            /// Try to decode a payload whose header announced `uncompressed_size`
            ///
            /// SECURITY: This method processes untrusted network data. Any malformed
            /// payload will return an error instead of panicking.
            pub fn try_decode(&mut self, payload: &[u8], uncompressed_size: usize) -> Result<&[u8], DecoderError> {
                match &mut self.decompressor {
                    Some(decompressor) => {
                        self.result = decompressor
                            .decompress(payload, uncompressed_size)
                            .map_err(|_| DecoderError::DecompressionFailed {
                                payload_size: payload.len(),
                                expected_size: uncompressed_size,
                            })?;
                    }
                    None => {
                        self.result.clear();
                        self.result.extend_from_slice(payload);
                    }
                }
                if self.result.len() != uncompressed_size {
                    return Err(DecoderError::SizeMismatch {
                        expected: uncompressed_size,
                        actual: self.result.len(),
                    });
                }
                Ok(&self.result)
            }
        }
    }
    else
    {
        use super::compression_config::CompressionMode;
        use super::error::DecoderError;

        pub struct Decoder {
            result: Vec<u8>,
        }

        impl Decoder {
            pub fn try_new(_: &CompressionMode) -> Result<Self, DecoderError> {
                Ok(Self { result: Vec::new() })
            }

            pub fn try_decode(&mut self, payload: &[u8], uncompressed_size: usize) -> Result<&[u8], DecoderError> {
                if payload.len() != uncompressed_size {
                    return Err(DecoderError::SizeMismatch {
                        expected: uncompressed_size,
                        actual: payload.len(),
                    });
                }
                self.result.clear();
                self.result.extend_from_slice(payload);
                Ok(&self.result)
            }
        }
    }
}
