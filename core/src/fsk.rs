use crate::bits::{bits_from_data, bits_to_string, BitSequence};
use crate::config::{FskParams, SignalConfig};
use crate::error::Result;
use crate::framing::FramedMessage;
use crate::info::SignalInfo;
use crate::tone::{frame_with_guards, sample_count, sine_tone};
use crate::FREQUENCY_TOLERANCE_HZ;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

// Binary FSK
//
// Each bit is a burst of `bit_duration` seconds of a pure tone: f1 for a
// one, f0 for a zero. Every burst restarts at phase zero. Guard tones are
// added around the whole bit train, never between bits.
//
// Demodulation cuts the data window into bursts of exactly one bit and
// classifies each by the strongest positive-frequency FFT bin.

/// FSK modulator - renders framed messages as a train of two tones
pub struct FskModulator {
    signal: SignalConfig,
    params: FskParams,
    zero_tone: Vec<f32>,
    one_tone: Vec<f32>,
}

impl FskModulator {
    pub fn new(signal: SignalConfig, params: FskParams) -> Self {
        let zero_tone = sine_tone(signal.f0, params.bit_duration, signal.sample_rate, signal.volume);
        let one_tone = sine_tone(signal.f1, params.bit_duration, signal.sample_rate, signal.volume);
        Self {
            signal,
            params,
            zero_tone,
            one_tone,
        }
    }

    pub fn samples_per_bit(&self) -> usize {
        self.zero_tone.len()
    }

    /// Data tones only, one burst per bit, no guards or normalisation.
    pub fn modulate(&self, bits: &BitSequence) -> Vec<f32> {
        let mut samples = Vec::with_capacity(bits.len() * self.samples_per_bit());
        for bit in bits {
            let tone = if bit { &self.one_tone } else { &self.zero_tone };
            samples.extend_from_slice(tone);
        }
        samples
    }

    /// Full waveform for a framed message: guards, bit tones, normalisation.
    pub fn generate(&self, message: &FramedMessage) -> Result<(Vec<f32>, SignalInfo)> {
        log::debug!(
            "audio config  : f1={} Hz, f0={} Hz, rate={} Hz, bit duration={} sec, volume={}",
            self.signal.f1,
            self.signal.f0,
            self.signal.sample_rate,
            self.params.bit_duration,
            self.signal.volume
        );

        let bits = bits_from_data(message)?;
        let data = self.modulate(&bits);
        let samples = frame_with_guards(&self.signal, data);

        let info = SignalInfo::fsk(&self.signal, &self.params, bits.len());
        log::debug!("audio raw bits: count={}, {}", bits.len(), bits_to_string(&bits));
        log::debug!("audio duration: {:.6} seconds", info.duration());
        Ok((samples, info))
    }
}

/// FSK demodulator - classifies one-bit chunks by their spectral peak
pub struct FskDemodulator {
    signal: SignalConfig,
    samples_per_bit: usize,
    fft: Arc<dyn Fft<f32>>,
}

impl FskDemodulator {
    pub fn new(signal: SignalConfig, params: FskParams) -> Self {
        let samples_per_bit = sample_count(signal.sample_rate, params.bit_duration);
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(samples_per_bit.max(1));
        Self {
            signal,
            samples_per_bit,
            fft,
        }
    }

    pub fn samples_per_bit(&self) -> usize {
        self.samples_per_bit
    }

    /// Frequency (Hz) of the strongest bin in the non-negative half of the
    /// chunk's spectrum. Ties resolve to the lowest bin.
    pub fn peak_frequency(&self, chunk: &[f32]) -> f64 {
        let n = chunk.len();
        if n < 2 {
            return 0.0;
        }
        let mut buffer: Vec<Complex<f32>> = chunk.iter().map(|&s| Complex::new(s, 0.0)).collect();
        if n == self.samples_per_bit {
            self.fft.process(&mut buffer);
        } else {
            FftPlanner::<f32>::new().plan_fft_forward(n).process(&mut buffer);
        }

        let mut peak_bin = 0usize;
        let mut peak_magnitude = f32::NEG_INFINITY;
        for (bin, value) in buffer[..n / 2].iter().enumerate() {
            let magnitude = value.norm();
            if magnitude > peak_magnitude {
                peak_magnitude = magnitude;
                peak_bin = bin;
            }
        }

        peak_bin as f64 * self.signal.sample_rate as f64 / n as f64
    }

    /// Map a peak frequency to a bit: within tolerance of f1 is a one,
    /// of f0 a zero, anything else carries no bit.
    pub fn classify(&self, peak_frequency: f64) -> Option<bool> {
        if (peak_frequency - self.signal.f1).abs() < FREQUENCY_TOLERANCE_HZ {
            Some(true)
        } else if (peak_frequency - self.signal.f0).abs() < FREQUENCY_TOLERANCE_HZ {
            Some(false)
        } else {
            None
        }
    }

    /// Detect bits in a data window. Trailing samples short of a full chunk
    /// are ignored, and chunks matching neither tone are dropped.
    pub fn demodulate(&self, samples: &[f32]) -> Vec<bool> {
        if self.samples_per_bit == 0 {
            return Vec::new();
        }

        let bits: Vec<bool> = samples
            .chunks_exact(self.samples_per_bit)
            .filter_map(|chunk| self.classify(self.peak_frequency(chunk)))
            .collect();

        log::debug!(
            "detected bits : count={}, {}",
            bits.len(),
            bits_to_string(bits.iter().copied())
        );
        bits
    }
}
