//! Temporal alignment of two recordings of the same event.
//!
//! Two interchangeable offset estimators sit behind one configuration
//! switch: transient matching (the default — robust when two different
//! engines render the same material with slightly different timbre) and
//! FFT cross-correlation (better when onsets are soft but the waveforms
//! are close).

use crate::amplitude::peak;
use crate::buffer::SignalBuffer;
use crate::fft::Fft;
use crate::level::{EPSILON, db_to_linear};
use crate::transient::first_sound_index;
use rustfft::num_complex::Complex;

/// Longest segment cross-correlated, in seconds.
const XCORR_SEGMENT_SECS: usize = 2;

/// Transient confidence saturates at this threshold-to-peak ratio.
const CONFIDENCE_CAP: f32 = 10.0;

/// Offset estimation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignStrategy {
    /// Match the first samples crossing the detection threshold.
    #[default]
    TransientMatch,
    /// Peak of the windowed FFT cross-correlation.
    CrossCorrelation,
}

/// Alignment configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignConfig {
    /// Which estimator runs.
    pub strategy: AlignStrategy,
    /// Transient detection threshold in dBFS. Independent of the
    /// pipeline-wide silence threshold.
    pub threshold_db: f32,
    /// Cross-correlation search window half-width in ms.
    pub max_offset_ms: f32,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            strategy: AlignStrategy::default(),
            threshold_db: -40.0,
            max_offset_ms: 500.0,
        }
    }
}

/// Result of offset estimation.
///
/// A positive offset means the target's sound starts later than the
/// reference's: trimming `offset_samples` from the target's head aligns
/// the pair. Negative offsets trim the reference instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetEstimate {
    /// Offset in samples (target relative to reference).
    pub offset_samples: i64,
    /// Estimator confidence: [0, 1] for transient matching, a normalized
    /// correlation coefficient in roughly [-1, 1] for cross-correlation.
    pub confidence: f32,
}

/// Estimate the offset between two equal-rate buffers.
pub fn estimate_offset(
    reference: &SignalBuffer,
    target: &SignalBuffer,
    config: &AlignConfig,
) -> OffsetEstimate {
    debug_assert_eq!(reference.sample_rate(), target.sample_rate());
    match config.strategy {
        AlignStrategy::TransientMatch => by_transient(reference, target, config.threshold_db),
        AlignStrategy::CrossCorrelation => {
            by_cross_correlation(reference, target, config.max_offset_ms)
        }
    }
}

/// Trim the later-starting buffer's head by the estimated offset, then
/// both buffers to their common length.
pub fn apply_offset(
    reference: &SignalBuffer,
    target: &SignalBuffer,
    offset_samples: i64,
) -> (SignalBuffer, SignalBuffer) {
    let (reference, target) = if offset_samples > 0 {
        (reference.clone(), target.skip(offset_samples as usize))
    } else if offset_samples < 0 {
        (reference.skip(offset_samples.unsigned_abs() as usize), target.clone())
    } else {
        (reference.clone(), target.clone())
    };

    let min_len = reference.len().min(target.len());
    (reference.truncate(min_len), target.truncate(min_len))
}

/// Offset from the difference of first-above-threshold sample indices.
///
/// A buffer that never crosses the threshold contributes index 0.
/// Confidence grows with how far each buffer's early peak (first second,
/// or the whole buffer if shorter) clears the threshold, saturating at
/// [`CONFIDENCE_CAP`] times the threshold.
fn by_transient(reference: &SignalBuffer, target: &SignalBuffer, threshold_db: f32) -> OffsetEstimate {
    let first_ref = first_sound_index(reference.samples(), threshold_db).unwrap_or(0);
    let first_target = first_sound_index(target.samples(), threshold_db).unwrap_or(0);

    let offset_samples = first_target as i64 - first_ref as i64;

    let threshold = db_to_linear(threshold_db);
    let early_peak = |buf: &SignalBuffer| {
        let window = (buf.sample_rate() as usize).min(buf.len());
        peak(&buf.samples()[..window])
    };
    let confidence = (early_peak(reference) / threshold)
        .min(early_peak(target) / threshold)
        .min(CONFIDENCE_CAP)
        / CONFIDENCE_CAP;

    tracing::debug!(
        offset_samples,
        confidence,
        "transient alignment: first_ref={first_ref}, first_target={first_target}"
    );

    OffsetEstimate {
        offset_samples,
        confidence,
    }
}

/// Offset at the maximum-|R| lag of the cross-correlation
/// `R(tau) = sum ref[n] * target[n + tau]`, searched within
/// `max_offset_ms`. Positive lag means the target starts later,
/// matching the transient strategy's sign convention.
fn by_cross_correlation(
    reference: &SignalBuffer,
    target: &SignalBuffer,
    max_offset_ms: f32,
) -> OffsetEstimate {
    let sample_rate = reference.sample_rate() as usize;
    let seg_len = reference
        .len()
        .min(target.len())
        .min(XCORR_SEGMENT_SECS * sample_rate);
    if seg_len == 0 {
        return OffsetEstimate {
            offset_samples: 0,
            confidence: 0.0,
        };
    }

    let ref_seg = &reference.samples()[..seg_len];
    let target_seg = &target.samples()[..seg_len];

    let max_offset = ((max_offset_ms as f64 / 1000.0 * sample_rate as f64) as usize)
        .min(seg_len.saturating_sub(1));

    // Zero-pad to avoid circular wrap-around: R = IFFT(conj(REF) . TGT)
    let fft_size = (2 * seg_len).next_power_of_two();
    let fft = Fft::new(fft_size);

    let mut buf_ref: Vec<Complex<f32>> =
        ref_seg.iter().map(|&v| Complex::new(v, 0.0)).collect();
    buf_ref.resize(fft_size, Complex::new(0.0, 0.0));
    let mut buf_target: Vec<Complex<f32>> =
        target_seg.iter().map(|&v| Complex::new(v, 0.0)).collect();
    buf_target.resize(fft_size, Complex::new(0.0, 0.0));

    fft.forward_complex(&mut buf_ref);
    fft.forward_complex(&mut buf_target);

    for (r, t) in buf_ref.iter_mut().zip(buf_target.iter()) {
        *r = r.conj() * t;
    }
    fft.inverse_complex(&mut buf_ref);

    // Positive lags live at the front of the circular result, negative
    // lags wrap around from the back
    let value_at = |lag: i64| -> f32 {
        let idx = if lag >= 0 {
            lag as usize
        } else {
            fft_size - lag.unsigned_abs() as usize
        };
        buf_ref[idx].re
    };

    let mut best_lag = 0i64;
    let mut best_val = 0.0f32;
    for lag in -(max_offset as i64)..=(max_offset as i64) {
        let v = value_at(lag);
        if v.abs() > best_val.abs() {
            best_val = v;
            best_lag = lag;
        }
    }

    let energy_ref: f32 = ref_seg.iter().map(|&v| v * v).sum();
    let energy_target: f32 = target_seg.iter().map(|&v| v * v).sum();
    let norm = (energy_ref * energy_target).sqrt();
    let confidence = if norm > EPSILON { best_val / norm } else { 0.0 };

    tracing::debug!(
        offset_samples = best_lag,
        confidence,
        "cross-correlation alignment over {seg_len} samples"
    );

    OffsetEstimate {
        offset_samples: best_lag,
        confidence,
    }
}
