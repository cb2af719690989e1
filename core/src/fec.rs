use crate::error::Result;
use crate::{RS_DATA_BYTES, RS_ECC_BYTES, RS_TOTAL_BYTES};
use reed_solomon::{Decoder as RsDecoder, Encoder as RsEncoder};

/// Result of a best-effort Reed-Solomon repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FecOutcome {
    /// Systematic data with parity stripped
    pub data: Vec<u8>,
    /// Codeword positions (offsets into the encoded buffer) that were changed
    pub corrected_positions: Vec<usize>,
}

pub struct FecEncoder {
    rs: RsEncoder,
}

pub struct FecDecoder {
    rs: RsDecoder,
    reencoder: RsEncoder,
}

impl FecEncoder {
    pub fn new() -> Self {
        Self {
            rs: RsEncoder::new(RS_ECC_BYTES),
        }
    }

    /// Append RS_ECC_BYTES parity symbols to every RS_DATA_BYTES block.
    ///
    /// A buffer that fits one block (the common case) becomes
    /// `data ++ parity`; longer buffers are encoded block by block.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let blocks = data.len().div_ceil(RS_DATA_BYTES);
        let mut encoded = Vec::with_capacity(data.len() + blocks * RS_ECC_BYTES);

        for chunk in data.chunks(RS_DATA_BYTES) {
            let codeword = self.rs.encode(chunk);
            encoded.extend_from_slice(&codeword);
        }

        encoded
    }
}

impl FecDecoder {
    pub fn new() -> Self {
        Self {
            rs: RsDecoder::new(RS_ECC_BYTES),
            reencoder: RsEncoder::new(RS_ECC_BYTES),
        }
    }

    /// Correct up to RS_ECC_BYTES / 2 unknown symbol errors per block.
    ///
    /// Blocks that cannot be repaired are passed through with parity
    /// stripped; the frame checksum decides whether the result is usable.
    pub fn decode(&self, encoded: &[u8]) -> Result<FecOutcome> {
        self.decode_with_erasures(encoded, &[])
    }

    /// Like [`decode`](Self::decode), with known-bad positions marked as
    /// erasures. Each erasure costs one parity symbol instead of two.
    pub fn decode_with_erasures(&self, encoded: &[u8], erasures: &[usize]) -> Result<FecOutcome> {
        let mut data = Vec::with_capacity(encoded.len());
        let mut corrected_positions = Vec::new();

        for (index, block) in encoded.chunks(RS_TOTAL_BYTES).enumerate() {
            if block.len() <= RS_ECC_BYTES {
                log::warn!(
                    "Reed-Solomon block {} has only {} bytes, no data symbols to recover",
                    index,
                    block.len()
                );
                continue;
            }

            let offset = index * RS_TOTAL_BYTES;
            let block_erasures: Vec<u8> = erasures
                .iter()
                .filter(|&&pos| pos >= offset && pos < offset + block.len())
                .map(|&pos| (pos - offset) as u8)
                .collect();
            let erase_pos = if block_erasures.is_empty() {
                None
            } else {
                Some(&block_erasures[..])
            };

            let mut codeword = block.to_vec();
            match self.rs.correct(&mut codeword[..], erase_pos) {
                Ok(repaired) => {
                    let repaired_data = repaired.data();
                    let reencoded = self.reencoder.encode(repaired_data);
                    corrected_positions.extend(
                        block
                            .iter()
                            .zip(reencoded.iter())
                            .enumerate()
                            .filter(|(_, (received, fixed))| received != fixed)
                            .map(|(pos, _)| offset + pos),
                    );
                    data.extend_from_slice(repaired_data);
                }
                Err(_) => {
                    log::warn!(
                        "Reed-Solomon block {} has too many errors, passing through uncorrected",
                        index
                    );
                    data.extend_from_slice(&block[..block.len() - RS_ECC_BYTES]);
                }
            }
        }

        Ok(FecOutcome {
            data,
            corrected_positions,
        })
    }
}

impl Default for FecEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for FecDecoder {
    fn default() -> Self {
        Self::new()
    }
}
