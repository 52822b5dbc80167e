//! Spectral feature extraction: centroid, bandwidth, rolloff, flatness,
//! dominant peaks.

use crate::buffer::SignalBuffer;
use crate::fft::{Window, magnitude_spectrum};
use crate::level::EPSILON;

/// Dominant frequency list is truncated to this many entries.
pub const MAX_DOMINANT_PEAKS: usize = 5;

/// Longest segment analyzed, in seconds. A centered slice of at most this
/// length keeps onset transients from dominating the spectrum.
const ANALYSIS_SEGMENT_SECS: usize = 2;

/// Fraction of total power below the rolloff frequency.
const ROLLOFF_FRACTION: f32 = 0.85;

/// Dominant peaks must reach this fraction of the strongest bin.
const PEAK_HEIGHT_FRACTION: f32 = 0.1;

/// Spectral characteristics of one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralStats {
    /// Power-weighted mean frequency ("brightness"), Hz.
    pub centroid_hz: f32,
    /// Power-weighted standard deviation around the centroid, Hz.
    pub bandwidth_hz: f32,
    /// Frequency below which 85% of spectral power lies, Hz.
    pub rolloff_hz: f32,
    /// Geometric-to-arithmetic mean ratio: ~0 tonal, ~1 noise-like.
    pub flatness: f32,
    /// Strongest local spectral maxima, magnitude-descending, at most
    /// [`MAX_DOMINANT_PEAKS`] entries.
    pub dominant_freqs: Vec<f32>,
}

impl SpectralStats {
    pub(crate) fn zeroed() -> Self {
        Self {
            centroid_hz: 0.0,
            bandwidth_hz: 0.0,
            rolloff_hz: 0.0,
            flatness: 0.0,
            dominant_freqs: Vec::new(),
        }
    }
}

/// Compute spectral statistics for a buffer.
///
/// Analyzes a Hann-windowed centered segment of up to 2 seconds. When the
/// total spectral power is below the numeric floor (silence, empty buffer)
/// every statistic is zero — no division runs against a vanishing
/// denominator.
pub fn analyze_spectrum(buffer: &SignalBuffer) -> SpectralStats {
    let samples = buffer.samples();
    let sample_rate = buffer.sample_rate() as f32;

    if samples.is_empty() {
        return SpectralStats::zeroed();
    }

    let segment_len = samples
        .len()
        .min(ANALYSIS_SEGMENT_SECS * buffer.sample_rate() as usize);
    let start = (samples.len() - segment_len) / 2;
    let segment = &samples[start..start + segment_len];

    let mut magnitudes = magnitude_spectrum(segment, Window::Hann);
    if magnitudes.len() <= 1 {
        return SpectralStats::zeroed();
    }
    // Drop the DC bin; bin i now sits at (i + 1) * bin_width Hz
    magnitudes.remove(0);
    let bin_width = sample_rate / segment_len as f32;
    let freq_at = |i: usize| (i + 1) as f32 * bin_width;

    let power: Vec<f32> = magnitudes.iter().map(|&m| m * m).collect();
    let total_power: f32 = power.iter().sum();

    if total_power < EPSILON {
        tracing::debug!("spectral power below floor, returning zeroed stats");
        return SpectralStats::zeroed();
    }

    let centroid_hz = power
        .iter()
        .enumerate()
        .map(|(i, &p)| freq_at(i) * p)
        .sum::<f32>()
        / total_power;

    let bandwidth_hz = (power
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let d = freq_at(i) - centroid_hz;
            d * d * p
        })
        .sum::<f32>()
        / total_power)
        .sqrt();

    let rolloff_hz = {
        let threshold = ROLLOFF_FRACTION * total_power;
        let mut cumulative = 0.0f32;
        let mut rolloff = freq_at(power.len() - 1);
        for (i, &p) in power.iter().enumerate() {
            cumulative += p;
            if cumulative >= threshold {
                rolloff = freq_at(i);
                break;
            }
        }
        rolloff
    };

    let flatness = {
        let n = magnitudes.len() as f32;
        let log_mean = magnitudes.iter().map(|&m| (m + EPSILON).ln()).sum::<f32>() / n;
        let geometric = log_mean.exp();
        let arithmetic = magnitudes.iter().sum::<f32>() / n;
        geometric / (arithmetic + EPSILON)
    };

    let dominant_freqs = dominant_peaks(&magnitudes, freq_at);

    SpectralStats {
        centroid_hz,
        bandwidth_hz,
        rolloff_hz,
        flatness,
        dominant_freqs,
    }
}

/// Local maxima at least 10% of the global max, sorted by magnitude
/// descending, truncated to [`MAX_DOMINANT_PEAKS`].
///
/// A flat run of equal bins counts as one maximum at its midpoint, the
/// same plateau rule the onset peak picker uses.
fn dominant_peaks(magnitudes: &[f32], freq_at: impl Fn(usize) -> f32) -> Vec<f32> {
    let global_max = magnitudes.iter().copied().fold(0.0f32, f32::max);
    let height = global_max * PEAK_HEIGHT_FRACTION;

    let n = magnitudes.len();
    let mut peaks: Vec<(f32, f32)> = Vec::new();
    let mut i = 1;
    while i + 1 < n {
        if magnitudes[i] > magnitudes[i - 1] {
            let start = i;
            let mut end = i;
            while end + 1 < n && magnitudes[end + 1] == magnitudes[end] {
                end += 1;
            }
            if end + 1 < n && magnitudes[end + 1] < magnitudes[end] && magnitudes[start] >= height
            {
                let mid = (start + end) / 2;
                peaks.push((freq_at(mid), magnitudes[mid]));
            }
            i = end + 1;
        } else {
            i += 1;
        }
    }

    peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    peaks.truncate(MAX_DOMINANT_PEAKS);
    peaks.into_iter().map(|(f, _)| f).collect()
}
