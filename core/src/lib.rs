//! Audio code library for embedding short data payloads in sound
//!
//! Payloads are framed with a CRC-8 and length byte, optionally protected by
//! Reed-Solomon FEC, and rendered either as a binary FSK tone train or as a
//! single NFE tone whose frequency encodes a number.

pub mod error;
pub mod bits;
pub mod framing;
pub mod fec;
pub mod config;
pub mod info;
pub mod tone;
pub mod fsk;
pub mod nfe;
pub mod encoder;
pub mod decoder;
pub mod pcm;

pub use bits::{bits_from_data, bits_to_string, bytes_from_bits, BitSequence, BitSource};
pub use config::{FskParams, ModulationConfig, NfeParams, Scheme, SignalConfig};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{CodecError, Result};
pub use framing::{crc8, FramedMessage};
pub use info::{Codec, SignalInfo};

// Signal defaults
pub const DEFAULT_F0: f64 = 1000.0; // Hz
pub const DEFAULT_F1: f64 = 5000.0; // Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_VOLUME: f64 = 0.8;
pub const DEFAULT_PRE_DELAY: f64 = 0.1; // seconds
pub const DEFAULT_POST_DELAY: f64 = 0.1; // seconds

// FSK configuration
pub const DEFAULT_BIT_DURATION: f64 = 0.007; // seconds, 308 samples at 44.1 kHz
pub const FREQUENCY_TOLERANCE_HZ: f64 = 50.0;

// NFE configuration
pub const DEFAULT_FREQUENCY_STEP: f64 = 100.0; // Hz
pub const DEFAULT_TONE_DURATION: f64 = 0.5; // seconds

// FEC configuration
pub const RS_ECC_BYTES: usize = 4;
pub const RS_TOTAL_BYTES: usize = 255;
pub const RS_DATA_BYTES: usize = RS_TOTAL_BYTES - RS_ECC_BYTES; // 251

// Frame configuration
pub const FRAME_HEADER_SIZE: usize = 2; // CRC-8 (1) + payload length (1)
pub const MAX_PAYLOAD_SIZE: usize = 255;
