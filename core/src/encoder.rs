use crate::config::{ModulationConfig, Scheme};
use crate::error::Result;
use crate::framing::FramedMessage;
use crate::fsk::FskModulator;
use crate::info::{Codec, SignalInfo};
use crate::nfe::NfeModulator;

enum Strategy {
    Fsk(FskModulator),
    Nfe(NfeModulator),
}

/// Renders framed messages to audio with the configured codec.
pub struct Encoder {
    config: ModulationConfig,
    strategy: Strategy,
}

impl Encoder {
    pub fn new(config: ModulationConfig) -> Result<Self> {
        config.validate()?;

        let strategy = match config.scheme {
            Scheme::Fsk(params) => Strategy::Fsk(FskModulator::new(config.signal, params)),
            Scheme::Nfe(params) => Strategy::Nfe(NfeModulator::new(config.signal, params)),
        };

        Ok(Self { config, strategy })
    }

    pub fn config(&self) -> &ModulationConfig {
        &self.config
    }

    pub fn codec(&self) -> Codec {
        match self.strategy {
            Strategy::Fsk(_) => Codec::Fsk,
            Strategy::Nfe(_) => Codec::Nfe,
        }
    }

    /// Encode a framed message into audio samples
    /// Returns: pre guard + data tones + post guard, and a description of it
    pub fn generate(&self, message: &FramedMessage) -> Result<(Vec<f32>, SignalInfo)> {
        log::debug!(
            "message: length={}, checksum={:#04x}, ecc={}",
            message.length(),
            message.checksum(),
            message.use_error_correction()
        );

        match &self.strategy {
            Strategy::Fsk(modulator) => modulator.generate(message),
            Strategy::Nfe(modulator) => modulator.generate(message),
        }
    }

    /// Encode a bare number. NFE maps it straight to a tone; FSK sends it
    /// as an 8-byte framed message.
    pub fn generate_value(&self, value: u64) -> Result<(Vec<f32>, SignalInfo)> {
        match &self.strategy {
            Strategy::Fsk(modulator) => modulator.generate(&FramedMessage::from_u64(value)),
            Strategy::Nfe(modulator) => Ok(modulator.generate_value(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn test_encoder_rejects_invalid_config() {
        let result = Encoder::new(ModulationConfig::fsk().with_volume(1.5));
        assert!(matches!(result, Err(CodecError::InvalidConfig(_))));
    }

    #[test]
    fn test_encoder_dispatches_by_codec() {
        let fsk = Encoder::new(ModulationConfig::fsk()).unwrap();
        let nfe = Encoder::new(ModulationConfig::nfe()).unwrap();
        assert_eq!(fsk.codec(), Codec::Fsk);
        assert_eq!(nfe.codec(), Codec::Nfe);

        let message = FramedMessage::from_u16(1234);
        let (_, fsk_info) = fsk.generate(&message).unwrap();
        let (_, nfe_info) = nfe.generate(&message).unwrap();
        assert_eq!(fsk_info.codec(), Codec::Fsk);
        assert_eq!(nfe_info.codec(), Codec::Nfe);
        assert_eq!(nfe_info.nfe_frequency(), Some(1400.0));
    }

    #[test]
    fn test_generate_value() {
        let nfe = Encoder::new(ModulationConfig::nfe()).unwrap();
        let (_, info) = nfe.generate_value(7).unwrap();
        assert_eq!(info.nfe_frequency(), Some(1700.0));

        let fsk = Encoder::new(ModulationConfig::fsk()).unwrap();
        let (_, info) = fsk.generate_value(7).unwrap();
        // 2 header + 8 payload + 4 parity bytes
        assert_eq!(info.bit_count(), Some(14 * 8));
    }
}
