use crate::error::{CodecError, Result};
use crate::tone::sample_count;
use crate::{
    DEFAULT_BIT_DURATION, DEFAULT_F0, DEFAULT_F1, DEFAULT_FREQUENCY_STEP, DEFAULT_POST_DELAY,
    DEFAULT_PRE_DELAY, DEFAULT_SAMPLE_RATE, DEFAULT_TONE_DURATION, DEFAULT_VOLUME,
};
use serde::{Deserialize, Serialize};

/// Signal parameters shared by every codec variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Frequency for logic `0` (FSK) or the lowest code frequency (NFE), Hz
    pub f0: f64,
    /// Frequency for logic `1` (FSK) or the highest code frequency (NFE), Hz
    pub f1: f64,
    pub sample_rate: u32,
    /// Amplitude on 0..1; exactly 1.0 peak-normalizes the waveform
    pub volume: f64,
    /// Guard interval before the data tones, seconds
    pub pre_delay: f64,
    /// Guard tone frequency (0 is silence)
    pub pre_frequency: f64,
    /// Guard interval after the data tones, seconds
    pub post_delay: f64,
    pub post_frequency: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            f0: DEFAULT_F0,
            f1: DEFAULT_F1,
            sample_rate: DEFAULT_SAMPLE_RATE,
            volume: DEFAULT_VOLUME,
            pre_delay: DEFAULT_PRE_DELAY,
            pre_frequency: 0.0,
            post_delay: DEFAULT_POST_DELAY,
            post_frequency: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FskParams {
    /// Seconds per bit
    pub bit_duration: f64,
}

impl Default for FskParams {
    fn default() -> Self {
        Self {
            bit_duration: DEFAULT_BIT_DURATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfeParams {
    /// Spacing between adjacent code frequencies, Hz
    pub frequency_step: f64,
    /// Seconds the code tone is held
    pub tone_duration: f64,
}

impl Default for NfeParams {
    fn default() -> Self {
        Self {
            frequency_step: DEFAULT_FREQUENCY_STEP,
            tone_duration: DEFAULT_TONE_DURATION,
        }
    }
}

/// Codec variant with its own parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "codec", rename_all = "UPPERCASE")]
pub enum Scheme {
    Fsk(FskParams),
    Nfe(NfeParams),
}

/// Complete, immutable description of how a code is rendered to audio.
///
/// Sender and receiver must agree on every field; nothing is embedded in
/// the signal itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModulationConfig {
    #[serde(default)]
    pub signal: SignalConfig,
    pub scheme: Scheme,
}

impl Default for ModulationConfig {
    fn default() -> Self {
        Self::fsk()
    }
}

impl ModulationConfig {
    /// FSK with the default bit duration and signal parameters.
    pub fn fsk() -> Self {
        Self {
            signal: SignalConfig::default(),
            scheme: Scheme::Fsk(FskParams::default()),
        }
    }

    /// NFE with the default frequency step and tone duration.
    pub fn nfe() -> Self {
        Self {
            signal: SignalConfig::default(),
            scheme: Scheme::Nfe(NfeParams::default()),
        }
    }

    pub fn with_frequencies(mut self, f0: f64, f1: f64) -> Self {
        self.signal.f0 = f0;
        self.signal.f1 = f1;
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.signal.sample_rate = sample_rate;
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.signal.volume = volume;
        self
    }

    pub fn with_pre_guard(mut self, delay: f64, frequency: f64) -> Self {
        self.signal.pre_delay = delay;
        self.signal.pre_frequency = frequency;
        self
    }

    pub fn with_post_guard(mut self, delay: f64, frequency: f64) -> Self {
        self.signal.post_delay = delay;
        self.signal.post_frequency = frequency;
        self
    }

    /// Reject parameter combinations that cannot produce a usable signal.
    pub fn validate(&self) -> Result<()> {
        let s = &self.signal;

        if !(0.0..=1.0).contains(&s.volume) {
            return Err(CodecError::InvalidConfig(
                "Volume must be between 0.0 and 1.0.".to_string(),
            ));
        }
        if s.sample_rate == 0 {
            return Err(CodecError::InvalidConfig("sample rate must be positive".to_string()));
        }
        for (name, value) in [
            ("f0", s.f0),
            ("f1", s.f1),
            ("pre_frequency", s.pre_frequency),
            ("post_frequency", s.post_frequency),
            ("pre_delay", s.pre_delay),
            ("post_delay", s.post_delay),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CodecError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        match self.scheme {
            Scheme::Fsk(fsk) => {
                if sample_count(s.sample_rate, fsk.bit_duration) == 0 {
                    return Err(CodecError::InvalidConfig(format!(
                        "bit duration {} s yields no samples at {} Hz",
                        fsk.bit_duration, s.sample_rate
                    )));
                }
            }
            Scheme::Nfe(nfe) => {
                if !nfe.frequency_step.is_finite() || nfe.frequency_step <= 0.0 {
                    return Err(CodecError::InvalidConfig(
                        "NFE frequency step must be positive".to_string(),
                    ));
                }
                if s.f1 < s.f0 {
                    return Err(CodecError::InvalidConfig(format!(
                        "NFE requires f1 >= f0, got f0={} f1={}",
                        s.f0, s.f1
                    )));
                }
                let steps = (s.f1 - s.f0) / nfe.frequency_step;
                if !steps.is_finite() || steps >= u64::MAX as f64 {
                    return Err(CodecError::InvalidConfig(format!(
                        "NFE frequency step {} Hz is too small for {}..{} Hz",
                        nfe.frequency_step, s.f0, s.f1
                    )));
                }
                if sample_count(s.sample_rate, nfe.tone_duration) == 0 {
                    return Err(CodecError::InvalidConfig(format!(
                        "tone duration {} s yields no samples at {} Hz",
                        nfe.tone_duration, s.sample_rate
                    )));
                }
            }
        }

        Ok(())
    }
}
