use crate::error::{CodecError, Result};
use crate::framing::FramedMessage;

/// Input kinds accepted by the bit framer.
#[derive(Debug, Clone, Copy)]
pub enum BitSource<'a> {
    /// Text made of `'0'` and `'1'` characters, one bit each.
    Binary(&'a str),
    /// Raw bytes, expanded MSB first.
    Bytes(&'a [u8]),
    /// A framed message, expanded from its encoded form.
    Message(&'a FramedMessage),
}

impl<'a> From<&'a [u8]> for BitSource<'a> {
    fn from(data: &'a [u8]) -> Self {
        BitSource::Bytes(data)
    }
}

impl<'a> From<&'a FramedMessage> for BitSource<'a> {
    fn from(message: &'a FramedMessage) -> Self {
        BitSource::Message(message)
    }
}

#[derive(Debug, Clone)]
enum Repr {
    Binary(Vec<bool>),
    Bytes(Vec<u8>),
}

/// Ordered, finite sequence of bits derived from a [`BitSource`].
///
/// Byte-backed sequences keep the bytes and extract each bit on iteration.
#[derive(Debug, Clone)]
pub struct BitSequence {
    repr: Repr,
}

impl BitSequence {
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Binary(bits) => bits.len(),
            Repr::Bytes(bytes) => bytes.len() * 8,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> BitIter<'_> {
        BitIter { seq: self, pos: 0 }
    }

    fn bit(&self, index: usize) -> bool {
        match &self.repr {
            Repr::Binary(bits) => bits[index],
            Repr::Bytes(bytes) => (bytes[index / 8] >> (7 - index % 8)) & 1 == 1,
        }
    }
}

pub struct BitIter<'a> {
    seq: &'a BitSequence,
    pos: usize,
}

impl Iterator for BitIter<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.pos >= self.seq.len() {
            return None;
        }
        let bit = self.seq.bit(self.pos);
        self.pos += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.seq.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitIter<'_> {}

impl<'a> IntoIterator for &'a BitSequence {
    type Item = bool;
    type IntoIter = BitIter<'a>;

    fn into_iter(self) -> BitIter<'a> {
        self.iter()
    }
}

/// Derive a bit sequence from any supported input kind.
///
/// Fails with `InvalidBitCharacter` when a binary string contains anything
/// other than `'0'`/`'1'`.
pub fn bits_from_data<'a>(data: impl Into<BitSource<'a>>) -> Result<BitSequence> {
    let repr = match data.into() {
        BitSource::Binary(text) => {
            let bits = text
                .chars()
                .enumerate()
                .map(|(position, character)| match character {
                    '0' => Ok(false),
                    '1' => Ok(true),
                    _ => Err(CodecError::InvalidBitCharacter { character, position }),
                })
                .collect::<Result<Vec<bool>>>()?;
            Repr::Binary(bits)
        }
        BitSource::Bytes(bytes) => Repr::Bytes(bytes.to_vec()),
        BitSource::Message(message) => Repr::Bytes(message.encode()),
    };
    Ok(BitSequence { repr })
}

/// Pack bits into bytes, 8 per byte, MSB first.
pub fn bytes_from_bits(bits: &[bool]) -> Result<Vec<u8>> {
    if bits.len() % 8 != 0 {
        return Err(CodecError::UnalignedBits { len: bits.len() });
    }

    let bytes = bits
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |byte, &bit| (byte << 1) | bit as u8))
        .collect();
    Ok(bytes)
}

/// Render bits as a `'0'`/`'1'` string, for logs and the `bits` command.
pub fn bits_to_string(bits: impl IntoIterator<Item = bool>) -> String {
    bits.into_iter().map(|bit| if bit { '1' } else { '0' }).collect()
}
