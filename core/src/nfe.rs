use crate::config::{NfeParams, SignalConfig};
use crate::error::Result;
use crate::framing::FramedMessage;
use crate::info::SignalInfo;
use crate::tone::{frame_with_guards, sine_tone};

/// Number of distinct code frequencies between f0 and f1 (inclusive).
///
/// Never zero. Steps too small for the range saturate at `u64::MAX`;
/// `ModulationConfig::validate` rejects such configurations up front.
pub fn nfe_modulus(f0: f64, f1: f64, frequency_step: f64) -> u64 {
    let steps = ((f1 - f0) / frequency_step).floor();
    (steps as u64).saturating_add(1)
}

/// Code frequency for `value`. Values congruent modulo the modulus share a
/// frequency, so callers must pick a range that fits their values.
pub fn nfe_frequency(value: u64, f0: f64, f1: f64, frequency_step: f64) -> f64 {
    let modulus = nfe_modulus(f0, f1, frequency_step);
    f0 + (value % modulus) as f64 * frequency_step
}

/// NFE modulator - renders a bounded integer as a single sustained tone
pub struct NfeModulator {
    signal: SignalConfig,
    params: NfeParams,
}

impl NfeModulator {
    pub fn new(signal: SignalConfig, params: NfeParams) -> Self {
        Self { signal, params }
    }

    pub fn frequency_for(&self, value: u64) -> f64 {
        nfe_frequency(value, self.signal.f0, self.signal.f1, self.params.frequency_step)
    }

    /// Encode the message payload read as a 2, 4 or 8 byte unsigned integer.
    pub fn generate(&self, message: &FramedMessage) -> Result<(Vec<f32>, SignalInfo)> {
        let value = message.as_uint()?;
        Ok(self.generate_value(value))
    }

    pub fn generate_value(&self, value: u64) -> (Vec<f32>, SignalInfo) {
        let frequency = self.frequency_for(value);
        log::debug!(
            " n={}, c={}, freq={}",
            value,
            nfe_modulus(self.signal.f0, self.signal.f1, self.params.frequency_step),
            frequency
        );

        let tone = sine_tone(
            frequency,
            self.params.tone_duration,
            self.signal.sample_rate,
            self.signal.volume,
        );
        let samples = frame_with_guards(&self.signal, tone);

        let info = SignalInfo::nfe(&self.signal, &self.params, frequency);
        log::debug!("audio duration: {:.6} seconds", info.duration());
        (samples, info)
    }
}
