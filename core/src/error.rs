use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("Payload length must be 2, 4, or 8 bytes, but was {len}")]
    UnsupportedWidth { len: usize },

    #[error("Payload of {len} bytes exceeds the {max}-byte frame limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("String must only contain '0' and '1', found {character:?} at {position}")]
    InvalidBitCharacter { character: char, position: usize },

    #[error("Detected bits array must be aligned to 8 bits, length={len}")]
    UnalignedBits { len: usize },

    #[error("Payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("Invalid input size")]
    InvalidInputSize,

    #[error("CRC-8 checksum mismatch: {stored} <-> {computed}")]
    ChecksumMismatch { stored: u8, computed: u8 },

    #[error("Frame declares {declared} payload bytes but only {available} are present")]
    FrameTruncated { declared: usize, available: usize },
}

impl CodecError {
    /// True for failures meaning the received frame is corrupted
    /// (or was produced with different parameters).
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            CodecError::ChecksumMismatch { .. } | CodecError::FrameTruncated { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;
