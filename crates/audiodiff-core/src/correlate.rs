//! Pearson correlation over waveforms, envelopes, and spectra.

use crate::fft::{Window, magnitude_spectrum};

/// Longest segment used for the spectral correlation, in seconds.
const SPECTRAL_SEGMENT_SECS: usize = 1;

/// Variance-to-energy ratio below which a sequence counts as constant.
const DEGENERATE_VARIANCE: f64 = 1e-24;

/// Pearson correlation coefficient of two sequences.
///
/// Mismatched lengths are truncated to the shorter sequence. Accumulation
/// runs in f64 so near-constant sequences (smoothed envelopes) keep their
/// tiny real variation. Returns 0 for empty input and for sequences whose
/// variance vanishes relative to their own energy (constant input), rather
/// than dividing toward NaN.
pub fn pearson(a: &[f32], b: &[f32]) -> f32 {
    let len = a.len().min(b.len());
    if len == 0 {
        return 0.0;
    }
    let a = &a[..len];
    let b = &b[..len];

    let mean_a = a.iter().map(|&x| f64::from(x)).sum::<f64>() / len as f64;
    let mean_b = b.iter().map(|&x| f64::from(x)).sum::<f64>() / len as f64;

    let mut cov = 0.0f64;
    let mut var_a = 0.0f64;
    let mut var_b = 0.0f64;
    let mut energy_a = 0.0f64;
    let mut energy_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
        energy_a += x * x;
        energy_b += y * y;
    }

    // The constant-sequence guard is relative to the sequence's own
    // energy: an absolute floor would also swallow the float-level
    // ripple of a smoothed envelope and zero its self-correlation
    let denom = (var_a * var_b).sqrt();
    if denom <= DEGENERATE_VARIANCE * (energy_a * energy_b).sqrt() {
        return 0.0;
    }
    (cov / denom) as f32
}

/// Correlation between the magnitude spectra of two aligned signals.
///
/// Both signals contribute a shared leading segment of up to 1 second
/// (unwindowed), limiting FFT memory to the segment length regardless of
/// file duration.
pub fn spectral_correlation(a: &[f32], b: &[f32], sample_rate: u32) -> f32 {
    let len = a
        .len()
        .min(b.len())
        .min(SPECTRAL_SEGMENT_SECS * sample_rate as usize);
    if len == 0 {
        return 0.0;
    }

    let spec_a = magnitude_spectrum(&a[..len], Window::Rectangular);
    let spec_b = magnitude_spectrum(&b[..len], Window::Rectangular);
    pearson(&spec_a, &spec_b)
}
