use crate::error::{CodecError, Result};
use crate::fec::{FecDecoder, FecEncoder};
use crate::{FRAME_HEADER_SIZE, MAX_PAYLOAD_SIZE};

/// Polynomial used for frame checksums: x^8 + x^5 + x^4 + 1
pub const CRC8_POLYNOMIAL: u8 = 0x31;

/// CRC-8 over `data` with the frame polynomial and a zero initial value.
pub fn crc8(data: &[u8]) -> u8 {
    crc8_with(data, CRC8_POLYNOMIAL, 0x00)
}

/// MSB-first CRC-8 with an arbitrary polynomial and initial value.
pub fn crc8_with(data: &[u8], polynomial: u8, init: u8) -> u8 {
    let mut crc = init;

    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if (crc & 0x80) != 0 {
                crc = (crc << 1) ^ polynomial;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Payload protected for transmission.
///
/// Encoded layout is `[checksum][length][payload...]`, optionally wrapped in
/// Reed-Solomon parity. The checksum covers the payload only. Length and
/// checksum are computed once at construction, so a message is never
/// partially initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedMessage {
    payload: Vec<u8>,
    checksum: u8,
    use_error_correction: bool,
}

impl FramedMessage {
    /// Build a message from raw bytes. Payloads longer than 255 bytes do not
    /// fit the one-byte length field and are rejected.
    pub fn from_bytes(payload: impl Into<Vec<u8>>) -> Result<Self> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(CodecError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        Ok(Self::new_unchecked(payload))
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Self::from_bytes(text.as_bytes())
    }

    pub fn from_u16(value: u16) -> Self {
        Self::new_unchecked(value.to_be_bytes().to_vec())
    }

    pub fn from_u32(value: u32) -> Self {
        Self::new_unchecked(value.to_be_bytes().to_vec())
    }

    pub fn from_u64(value: u64) -> Self {
        Self::new_unchecked(value.to_be_bytes().to_vec())
    }

    fn new_unchecked(payload: Vec<u8>) -> Self {
        let checksum = crc8(&payload);
        Self {
            payload,
            checksum,
            use_error_correction: true,
        }
    }

    /// Enable or disable the Reed-Solomon wrapper (enabled by default).
    pub fn with_error_correction(mut self, enabled: bool) -> Self {
        self.use_error_correction = enabled;
        self
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn length(&self) -> u8 {
        self.payload.len() as u8
    }

    pub fn checksum(&self) -> u8 {
        self.checksum
    }

    pub fn use_error_correction(&self) -> bool {
        self.use_error_correction
    }

    pub fn as_text(&self) -> Result<&str> {
        std::str::from_utf8(&self.payload).map_err(|_| CodecError::InvalidUtf8)
    }

    pub fn as_u16(&self) -> Result<u16> {
        let bytes: [u8; 2] = self.fixed_width()?;
        Ok(u16::from_be_bytes(bytes))
    }

    pub fn as_u32(&self) -> Result<u32> {
        let bytes: [u8; 4] = self.fixed_width()?;
        Ok(u32::from_be_bytes(bytes))
    }

    pub fn as_u64(&self) -> Result<u64> {
        let bytes: [u8; 8] = self.fixed_width()?;
        Ok(u64::from_be_bytes(bytes))
    }

    /// Read the payload as an unsigned integer whose width (2, 4 or 8 bytes)
    /// is taken from the payload length.
    pub fn as_uint(&self) -> Result<u64> {
        match self.payload.len() {
            2 => self.as_u16().map(u64::from),
            4 => self.as_u32().map(u64::from),
            8 => self.as_u64(),
            len => Err(CodecError::UnsupportedWidth { len }),
        }
    }

    fn fixed_width<const N: usize>(&self) -> Result<[u8; N]> {
        self.payload
            .as_slice()
            .try_into()
            .map_err(|_| CodecError::UnsupportedWidth {
                len: self.payload.len(),
            })
    }

    /// Serialize to `[checksum][length][payload]`, FEC-wrapped when enabled.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + self.payload.len());
        frame.push(self.checksum);
        frame.push(self.length());
        frame.extend_from_slice(&self.payload);

        log::debug!("size info");
        log::debug!("  - data      : {} bytes, {:02x?}", self.payload.len(), self.payload);
        log::debug!("  - message   : {} bytes, {:02x?}", frame.len(), frame);

        if !self.use_error_correction {
            return frame;
        }

        let encoded = FecEncoder::new().encode(&frame);
        log::debug!("  - ecc       : {} bytes, {:02x?}", encoded.len(), encoded);
        encoded
    }

    /// Parse an encoded frame and verify its checksum.
    ///
    /// With error correction the buffer is repaired first; the checksum is
    /// the final gate either way.
    pub fn decode(data: &[u8], use_error_correction: bool) -> Result<Self> {
        let frame = if use_error_correction {
            let outcome = FecDecoder::new().decode(data)?;
            if !outcome.corrected_positions.is_empty() {
                log::debug!("FEC corrected positions: {:?}", outcome.corrected_positions);
            }
            outcome.data
        } else {
            data.to_vec()
        };

        if frame.len() < FRAME_HEADER_SIZE {
            return Err(CodecError::FrameTruncated {
                declared: FRAME_HEADER_SIZE,
                available: frame.len(),
            });
        }

        let stored = frame[0];
        let length = frame[1] as usize;
        let body = &frame[FRAME_HEADER_SIZE..];
        if length > body.len() {
            return Err(CodecError::FrameTruncated {
                declared: length,
                available: body.len(),
            });
        }

        let payload = body[..length].to_vec();
        let computed = crc8(&payload);
        if stored != computed {
            return Err(CodecError::ChecksumMismatch { stored, computed });
        }

        Ok(Self {
            payload,
            checksum: stored,
            use_error_correction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc8_check_value() {
        assert_eq!(crc8(b"123456789"), 0xA2);
        assert_eq!(crc8(b""), 0x00);
        assert_eq!(crc8(&[0x01, 0x02]), 0x96);
    }

    #[test]
    fn test_crc8_custom_parameters() {
        assert_eq!(crc8_with(b"Hello", 0x07, 0xFF), 0xCF);
        assert_eq!(crc8_with(b"Hello", CRC8_POLYNOMIAL, 0x00), 0x7E);
    }

    #[test]
    fn test_crc8_detects_single_bit_flips() {
        let data = b"audio code payload".to_vec();
        let reference = crc8(&data);
        for byte in 0..data.len() {
            for bit in 0..8 {
                let mut flipped = data.clone();
                flipped[byte] ^= 1 << bit;
                assert_ne!(crc8(&flipped), reference, "byte {} bit {}", byte, bit);
            }
        }
    }

    #[test]
    fn test_frame_layout_without_fec() {
        let message = FramedMessage::from_u16(1234).with_error_correction(false);
        assert_eq!(message.length(), 2);
        assert_eq!(message.checksum(), 0xE5);
        assert_eq!(message.encode(), vec![0xE5, 0x02, 0x04, 0xD2]);
    }

    #[test]
    fn test_frame_encode_decode() {
        let message = FramedMessage::from_text("Hello").unwrap();
        let encoded = message.encode();
        assert_eq!(encoded.len(), FRAME_HEADER_SIZE + 5 + crate::RS_ECC_BYTES);

        let decoded = FramedMessage::decode(&encoded, true).unwrap();
        assert_eq!(decoded, message);
        assert_eq!(decoded.as_text().unwrap(), "Hello");
    }

    #[test]
    fn test_uint_accessors() {
        assert_eq!(FramedMessage::from_u16(0xBEEF).as_u16().unwrap(), 0xBEEF);
        assert_eq!(FramedMessage::from_u32(0xDEADBEEF).as_uint().unwrap(), 0xDEADBEEF);
        assert_eq!(
            FramedMessage::from_u64(u64::MAX - 1).as_u64().unwrap(),
            u64::MAX - 1
        );
    }

    #[test]
    fn test_uint_accessors_reject_wrong_width() {
        let message = FramedMessage::from_bytes(vec![1, 2, 3]).unwrap();
        assert!(matches!(
            message.as_uint(),
            Err(CodecError::UnsupportedWidth { len: 3 })
        ));
        assert!(matches!(
            FramedMessage::from_u32(7).as_u16(),
            Err(CodecError::UnsupportedWidth { len: 4 })
        ));
    }

    #[test]
    fn test_payload_limit() {
        assert!(FramedMessage::from_bytes(vec![0u8; MAX_PAYLOAD_SIZE]).is_ok());
        assert!(matches!(
            FramedMessage::from_bytes(vec![0u8; MAX_PAYLOAD_SIZE + 1]),
            Err(CodecError::PayloadTooLarge { len: 256, max: 255 })
        ));
    }

    #[test]
    fn test_roundtrip_all_sizes() {
        for len in [0usize, 1, 2, 100, 249, 250, 255] {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7 + 3) as u8).collect();
            for fec in [false, true] {
                let message = FramedMessage::from_bytes(payload.clone())
                    .unwrap()
                    .with_error_correction(fec);
                let decoded = FramedMessage::decode(&message.encode(), fec).unwrap();
                assert_eq!(decoded.payload(), payload.as_slice(), "len {} fec {}", len, fec);
            }
        }
    }

    #[test]
    fn test_payload_crc_validation() {
        let message = FramedMessage::from_text("Hello").unwrap().with_error_correction(false);
        let mut encoded = message.encode();
        encoded[FRAME_HEADER_SIZE] = b'G';

        match FramedMessage::decode(&encoded, false) {
            Err(CodecError::ChecksumMismatch { stored, computed }) => {
                assert_eq!(stored, message.checksum());
                assert_ne!(computed, stored);
            }
            other => panic!("Expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_frame() {
        assert!(matches!(
            FramedMessage::decode(&[0x00], false),
            Err(CodecError::FrameTruncated { .. })
        ));
        // Length byte claims more payload than present
        let err = FramedMessage::decode(&[0x00, 0x05, 0x01], false).unwrap_err();
        assert!(err.is_integrity());
    }
}
