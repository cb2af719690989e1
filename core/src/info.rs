use crate::config::{FskParams, NfeParams, SignalConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Codec {
    /// Frequency Shift Keying: each bit is one of two tones
    Fsk,
    /// Numerical Frequency Encoding: one tone whose frequency encodes a number
    Nfe,
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Fsk => write!(f, "FSK"),
            Codec::Nfe => write!(f, "NFE"),
        }
    }
}

/// Codec-specific part of [`SignalInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "codec", rename_all = "UPPERCASE")]
pub enum SignalDetail {
    Fsk {
        bit_duration: f64,
        bit_count: usize,
    },
    Nfe {
        frequency_step: f64,
        tone_duration: f64,
        /// Resolved code tone frequency, Hz
        frequency: f64,
    },
}

/// Description of a generated waveform, produced once per generate call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalInfo {
    f0: f64,
    f1: f64,
    sample_rate: u32,
    volume: f64,
    pre_delay: f64,
    post_delay: f64,
    duration: f64,
    #[serde(flatten)]
    detail: SignalDetail,
}

impl SignalInfo {
    pub fn fsk(signal: &SignalConfig, params: &FskParams, bit_count: usize) -> Self {
        let data_duration = bit_count as f64 * params.bit_duration;
        Self::build(
            signal,
            data_duration,
            SignalDetail::Fsk {
                bit_duration: params.bit_duration,
                bit_count,
            },
        )
    }

    pub fn nfe(signal: &SignalConfig, params: &NfeParams, frequency: f64) -> Self {
        Self::build(
            signal,
            params.tone_duration,
            SignalDetail::Nfe {
                frequency_step: params.frequency_step,
                tone_duration: params.tone_duration,
                frequency,
            },
        )
    }

    fn build(signal: &SignalConfig, data_duration: f64, detail: SignalDetail) -> Self {
        Self {
            f0: signal.f0,
            f1: signal.f1,
            sample_rate: signal.sample_rate,
            volume: signal.volume,
            pre_delay: signal.pre_delay,
            post_delay: signal.post_delay,
            duration: data_duration + signal.pre_delay + signal.post_delay,
            detail,
        }
    }

    pub fn codec(&self) -> Codec {
        match self.detail {
            SignalDetail::Fsk { .. } => Codec::Fsk,
            SignalDetail::Nfe { .. } => Codec::Nfe,
        }
    }

    pub fn f0(&self) -> f64 {
        self.f0
    }

    pub fn f1(&self) -> f64 {
        self.f1
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn pre_delay(&self) -> f64 {
        self.pre_delay
    }

    pub fn post_delay(&self) -> f64 {
        self.post_delay
    }

    /// Total nominal duration in seconds, guards included.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn detail(&self) -> &SignalDetail {
        &self.detail
    }

    /// Number of FSK bits, `None` for NFE.
    pub fn bit_count(&self) -> Option<usize> {
        match self.detail {
            SignalDetail::Fsk { bit_count, .. } => Some(bit_count),
            SignalDetail::Nfe { .. } => None,
        }
    }

    /// Resolved NFE tone frequency, `None` for FSK.
    pub fn nfe_frequency(&self) -> Option<f64> {
        match self.detail {
            SignalDetail::Nfe { frequency, .. } => Some(frequency),
            SignalDetail::Fsk { .. } => None,
        }
    }
}

impl fmt::Display for SignalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignalInfo(codec={}, f1={}, f0={}, ", self.codec(), self.f1, self.f0)?;
        match self.detail {
            SignalDetail::Fsk {
                bit_duration,
                bit_count,
            } => write!(f, "bit_duration={}, bit_count={}, ", bit_duration, bit_count)?,
            SignalDetail::Nfe {
                frequency_step,
                tone_duration,
                frequency,
            } => write!(
                f,
                "nfe_df={}, nfe_duration={}, nfe_freq={}, ",
                frequency_step, tone_duration, frequency
            )?,
        }
        write!(
            f,
            "rate={}, volume={}, duration={:.6}, pre_delay={}, post_delay={})",
            self.sample_rate, self.volume, self.duration, self.pre_delay, self.post_delay
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fsk_duration_is_derived() {
        let signal = SignalConfig::default();
        let info = SignalInfo::fsk(&signal, &FskParams::default(), 64);
        assert_eq!(info.codec(), Codec::Fsk);
        assert_eq!(info.bit_count(), Some(64));
        assert_eq!(info.nfe_frequency(), None);
        assert!((info.duration() - (64.0 * 0.007 + 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_nfe_info() {
        let signal = SignalConfig::default();
        let info = SignalInfo::nfe(&signal, &NfeParams::default(), 2300.0);
        assert_eq!(info.codec(), Codec::Nfe);
        assert_eq!(info.nfe_frequency(), Some(2300.0));
        assert!((info.duration() - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_display_format() {
        let info = SignalInfo::fsk(&SignalConfig::default(), &FskParams::default(), 8);
        let text = info.to_string();
        assert!(text.starts_with("SignalInfo(codec=FSK, f1=5000, f0=1000, "));
        assert!(text.contains("bit_count=8"));
        assert!(text.contains("rate=44100"));
    }
}
