use crate::config::SignalConfig;
use std::f64::consts::PI;

/// Number of whole samples covering `duration` seconds (truncating).
pub fn sample_count(sample_rate: u32, duration: f64) -> usize {
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    (sample_rate as f64 * duration) as usize
}

/// Pure sine tone scaled by `volume`.
///
/// The time base spans `[0, duration)` in `sample_count` equal steps, so
/// every tone of a given duration starts at phase zero and has the same
/// length regardless of where it lands in the waveform.
pub fn sine_tone(frequency: f64, duration: f64, sample_rate: u32, volume: f64) -> Vec<f32> {
    let n = sample_count(sample_rate, duration);
    if n == 0 {
        return Vec::new();
    }
    let step = duration / n as f64;
    let angular = 2.0 * PI * frequency;

    (0..n)
        .map(|i| (volume * (angular * i as f64 * step).sin()) as f32)
        .collect()
}

/// Sample lengths of the leading and trailing guard intervals.
pub fn guard_lengths(signal: &SignalConfig) -> (usize, usize) {
    (
        sample_count(signal.sample_rate, signal.pre_delay),
        sample_count(signal.sample_rate, signal.post_delay),
    )
}

/// Surround data tones with the configured guard tones, then apply the
/// full-volume peak normalisation.
pub fn frame_with_guards(signal: &SignalConfig, data: Vec<f32>) -> Vec<f32> {
    let (pre_len, post_len) = guard_lengths(signal);
    if pre_len == 0 && post_len == 0 {
        let mut samples = data;
        normalize_if_full_volume(signal, &mut samples);
        return samples;
    }

    let mut samples = Vec::with_capacity(pre_len + data.len() + post_len);
    if signal.pre_delay > 0.0 {
        samples.extend(sine_tone(
            signal.pre_frequency,
            signal.pre_delay,
            signal.sample_rate,
            signal.volume,
        ));
    }
    samples.extend_from_slice(&data);
    if signal.post_delay > 0.0 {
        samples.extend(sine_tone(
            signal.post_frequency,
            signal.post_delay,
            signal.sample_rate,
            signal.volume,
        ));
    }

    normalize_if_full_volume(signal, &mut samples);
    samples
}

fn normalize_if_full_volume(signal: &SignalConfig, samples: &mut [f32]) {
    // Below full volume the amplitude is already bounded by construction.
    if signal.volume == 1.0 {
        normalize_peak(samples);
    }
}

/// Rescale so the largest magnitude is exactly 1.0. Silence is left as is.
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    if peak > 0.0 {
        for sample in samples.iter_mut() {
            *sample /= peak;
        }
    }
}
