use crate::bits::bytes_from_bits;
use crate::config::{FskParams, ModulationConfig, Scheme, SignalConfig};
use crate::error::{CodecError, Result};
use crate::framing::FramedMessage;
use crate::fsk::FskDemodulator;
use crate::tone::guard_lengths;

/// Recovers framed messages from FSK audio.
pub struct Decoder {
    signal: SignalConfig,
    demodulator: FskDemodulator,
    use_error_correction: bool,
}

impl Decoder {
    /// Only FSK can be decoded; an NFE configuration is rejected.
    pub fn new(config: ModulationConfig) -> Result<Self> {
        config.validate()?;

        let params: FskParams = match config.scheme {
            Scheme::Fsk(params) => params,
            Scheme::Nfe(_) => {
                return Err(CodecError::UnsupportedCodec(
                    "NFE signals cannot be parsed, only FSK".to_string(),
                ))
            }
        };

        Ok(Self {
            signal: config.signal,
            demodulator: FskDemodulator::new(config.signal, params),
            use_error_correction: true,
        })
    }

    /// Must match the sender's setting.
    pub fn with_error_correction(mut self, enabled: bool) -> Self {
        self.use_error_correction = enabled;
        self
    }

    /// Detect bits in a full capture laid out as the encoder writes it.
    ///
    /// The configured guard intervals are cut from both ends before the
    /// data window is chunked, so chunk boundaries line up with the bits.
    pub fn detect_bits(&self, samples: &[f32]) -> Vec<bool> {
        let (pre_len, post_len) = guard_lengths(&self.signal);
        if samples.len() <= pre_len + post_len {
            log::warn!(
                "capture of {} samples is not longer than its guard intervals ({} + {})",
                samples.len(),
                pre_len,
                post_len
            );
            return Vec::new();
        }

        let window = &samples[pre_len..samples.len() - post_len];
        log::debug!(
            "data window: {} samples, {} bit chunks",
            window.len(),
            window.len() / self.demodulator.samples_per_bit()
        );
        self.demodulator.demodulate(window)
    }

    /// Detected bits packed into bytes, still FEC-wrapped when enabled.
    pub fn parse_bytes(&self, samples: &[f32]) -> Result<Vec<u8>> {
        let bits = self.detect_bits(samples);
        bytes_from_bits(&bits)
    }

    /// Decode audio samples back into a verified message.
    pub fn parse(&self, samples: &[f32]) -> Result<FramedMessage> {
        let bytes = self.parse_bytes(samples)?;
        log::debug!("detected bytes: {} bytes, {:02x?}", bytes.len(), bytes);
        FramedMessage::decode(&bytes, self.use_error_correction)
    }
}
