//! Amplitude statistics: peak, RMS, crest factor, dynamic range, DC offset.

use crate::buffer::SignalBuffer;
use crate::level::{db_to_linear, linear_to_db};

/// Window length used for the dynamic range measurement.
const DYNAMIC_RANGE_WINDOW_SECS: f64 = 0.1;

/// Amplitude statistics for one buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeStats {
    /// Peak absolute sample, linear.
    pub peak_linear: f32,
    /// Peak level in dBFS.
    pub peak_db: f32,
    /// RMS level, linear.
    pub rms_linear: f32,
    /// RMS level in dBFS.
    pub rms_db: f32,
    /// Peak-to-RMS ratio in dB.
    pub crest_factor_db: f32,
    /// Loud-to-quiet spread of windowed RMS in dB (P90/P10).
    pub dynamic_range_db: f32,
    /// Arithmetic mean of the raw signed samples.
    pub dc_offset: f32,
}

impl AmplitudeStats {
    #[cfg(test)]
    pub(crate) fn zeroed() -> Self {
        Self {
            peak_linear: 0.0,
            peak_db: 0.0,
            rms_linear: 0.0,
            rms_db: 0.0,
            crest_factor_db: 0.0,
            dynamic_range_db: 0.0,
            dc_offset: 0.0,
        }
    }
}

/// RMS (root mean square) of a slice, linear scale.
pub fn rms(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = signal.iter().map(|&x| x * x).sum();
    (sum_sq / signal.len() as f32).sqrt()
}

/// Peak absolute value of a slice.
pub fn peak(signal: &[f32]) -> f32 {
    signal.iter().map(|x| x.abs()).fold(0.0f32, f32::max)
}

/// Compute amplitude statistics for a buffer.
///
/// `silence_threshold_db` governs which 100 ms windows count toward the
/// dynamic range measurement; windows quieter than the threshold are
/// excluded so leading/trailing silence does not inflate the range.
pub fn analyze_amplitude(buffer: &SignalBuffer, silence_threshold_db: f32) -> AmplitudeStats {
    let samples = buffer.samples();

    let peak_linear = peak(samples);
    let peak_db = linear_to_db(peak_linear);

    let rms_linear = rms(samples);
    let rms_db = linear_to_db(rms_linear);

    let crest_factor_db = peak_db - rms_db;

    let dc_offset = if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f32>() / samples.len() as f32
    };

    let dynamic_range_db = dynamic_range(buffer, silence_threshold_db);

    AmplitudeStats {
        peak_linear,
        peak_db,
        rms_linear,
        rms_db,
        crest_factor_db,
        dynamic_range_db,
        dc_offset,
    }
}

/// Dynamic range as the P90/P10 ratio of non-silent windowed RMS, in dB.
///
/// Percentiles rather than min/max keep a single quiet or loud window from
/// dominating. Yields 0 when fewer than two windows pass the silence gate,
/// which also covers buffers shorter than one window.
fn dynamic_range(buffer: &SignalBuffer, silence_threshold_db: f32) -> f32 {
    let samples = buffer.samples();
    let window_size = (DYNAMIC_RANGE_WINDOW_SECS * buffer.sample_rate() as f64) as usize;
    if window_size == 0 || samples.len() < window_size {
        return 0.0;
    }

    let silence_linear = db_to_linear(silence_threshold_db);
    let window_rms: Vec<f32> = samples
        .chunks_exact(window_size)
        .map(rms)
        .filter(|&r| r > silence_linear)
        .collect();

    if window_rms.len() < 2 {
        return 0.0;
    }

    let loud = percentile(&window_rms, 90.0);
    let quiet = percentile(&window_rms, 10.0);
    linear_to_db(loud) - linear_to_db(quiet)
}

/// Linearly interpolated percentile of an unsorted slice.
fn percentile(values: &[f32], q: f32) -> f32 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = q / 100.0 * (sorted.len() - 1) as f32;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
