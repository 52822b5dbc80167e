//! End-to-end comparison pipeline.
//!
//! Per-file absolute statistics always come from the unaligned (and
//! unnormalized) buffers; alignment, trimming, and normalization shape
//! only the views the cross-file correlations run on.

use crate::align::{self, AlignConfig, OffsetEstimate};
use crate::amplitude::{AmplitudeStats, analyze_amplitude};
use crate::buffer::SignalBuffer;
use crate::correlate::{pearson, spectral_correlation};
use crate::envelope::{EnvelopeStats, envelope, envelope_stats};
use crate::score::{detect_issues, similarity_score};
use crate::spectral::{SpectralStats, analyze_spectrum};
use crate::transient::{TimingStats, detect_transients};

/// Envelope window used for the cross-file envelope correlation, ms.
const ENVELOPE_CORRELATION_WINDOW_MS: f32 = 20.0;

/// Pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareOptions {
    /// Estimate and apply a temporal offset before correlating.
    pub align: bool,
    /// Clamp the aligned views to the first buffer's original duration.
    pub trim: bool,
    /// Peak-normalize the aligned views before correlating.
    pub normalize: bool,
    /// Silence threshold for dynamic range, timing, and envelope stats,
    /// dBFS.
    pub silence_threshold_db: f32,
    /// Offset estimator configuration.
    pub alignment: AlignConfig,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            align: true,
            trim: false,
            normalize: false,
            silence_threshold_db: -60.0,
            alignment: AlignConfig::default(),
        }
    }
}

/// Everything the pipeline measures about a pair of buffers.
///
/// Difference fields are second-minus-first throughout.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Common sample rate after resampling, Hz.
    pub sample_rate: u32,
    /// First buffer's duration at the common rate, seconds.
    pub duration1_secs: f32,
    /// Second buffer's duration at the common rate, seconds.
    pub duration2_secs: f32,
    /// Whether alignment ran.
    pub aligned: bool,
    /// Estimated offset of the second buffer relative to the first, ms.
    pub alignment_offset_ms: f32,
    /// Offset estimator confidence.
    pub alignment_correlation: f32,
    /// First buffer's amplitude statistics.
    pub amplitude1: AmplitudeStats,
    /// Second buffer's amplitude statistics.
    pub amplitude2: AmplitudeStats,
    /// First buffer's spectral statistics.
    pub spectral1: SpectralStats,
    /// Second buffer's spectral statistics.
    pub spectral2: SpectralStats,
    /// First buffer's envelope timings.
    pub envelope1: EnvelopeStats,
    /// Second buffer's envelope timings.
    pub envelope2: EnvelopeStats,
    /// First buffer's transient timings.
    pub timing1: TimingStats,
    /// Second buffer's transient timings.
    pub timing2: TimingStats,
    /// Pearson correlation of the aligned waveforms.
    pub waveform_correlation: f32,
    /// Pearson correlation of the aligned views' 20 ms envelopes.
    pub envelope_correlation: f32,
    /// Correlation of the aligned views' magnitude spectra.
    pub spectral_correlation: f32,
    /// Peak level difference, dB.
    pub peak_diff_db: f32,
    /// RMS level difference, dB.
    pub rms_diff_db: f32,
    /// Spectral centroid difference, Hz.
    pub spectral_centroid_diff_hz: f32,
    /// Weighted overall similarity, 0–100.
    pub similarity_score: f32,
    /// Human-readable discrepancy flags, in rule order.
    pub issues: Vec<String>,
}

impl ComparisonResult {
    /// A neutral record for exercising the scorer in isolation.
    #[cfg(test)]
    pub(crate) fn unscored(sample_rate: u32, duration1: f32, duration2: f32) -> Self {
        Self {
            sample_rate,
            duration1_secs: duration1,
            duration2_secs: duration2,
            aligned: false,
            alignment_offset_ms: 0.0,
            alignment_correlation: 0.0,
            amplitude1: AmplitudeStats::zeroed(),
            amplitude2: AmplitudeStats::zeroed(),
            spectral1: SpectralStats::zeroed(),
            spectral2: SpectralStats::zeroed(),
            envelope1: EnvelopeStats::zeroed(),
            envelope2: EnvelopeStats::zeroed(),
            timing1: TimingStats::zeroed(),
            timing2: TimingStats::zeroed(),
            waveform_correlation: 0.0,
            envelope_correlation: 0.0,
            spectral_correlation: 0.0,
            peak_diff_db: 0.0,
            rms_diff_db: 0.0,
            spectral_centroid_diff_hz: 0.0,
            similarity_score: 0.0,
            issues: Vec::new(),
        }
    }
}

/// Compare two mono buffers.
///
/// Rates are equalized up to the higher of the two before anything else
/// runs, so every time- and frequency-domain measure shares one clock.
pub fn compare(
    file1: &SignalBuffer,
    file2: &SignalBuffer,
    options: &CompareOptions,
) -> ComparisonResult {
    let target_rate = file1.sample_rate().max(file2.sample_rate());
    let original1 = file1.resampled(target_rate);
    let original2 = file2.resampled(target_rate);
    tracing::debug!(
        target_rate,
        len1 = original1.len(),
        len2 = original2.len(),
        "buffers at common rate"
    );

    let (estimate, view1, view2) = if options.align {
        let estimate = align::estimate_offset(&original1, &original2, &options.alignment);
        let (mut view1, mut view2) =
            align::apply_offset(&original1, &original2, estimate.offset_samples);
        if options.trim {
            let target_len = original1.len();
            view1 = view1.truncate(target_len);
            view2 = view2.truncate(target_len);
        }
        (estimate, view1, view2)
    } else {
        let min_len = original1.len().min(original2.len());
        let estimate = OffsetEstimate {
            offset_samples: 0,
            confidence: 0.0,
        };
        (estimate, original1.truncate(min_len), original2.truncate(min_len))
    };
    let alignment_offset_ms =
        estimate.offset_samples as f32 / target_rate as f32 * 1000.0;
    tracing::debug!(
        offset_ms = alignment_offset_ms,
        confidence = estimate.confidence,
        view_len = view1.len(),
        "aligned views ready"
    );

    let (view1, view2) = if options.normalize {
        (view1.normalized(), view2.normalized())
    } else {
        (view1, view2)
    };

    let threshold = options.silence_threshold_db;
    let amplitude1 = analyze_amplitude(&original1, threshold);
    let amplitude2 = analyze_amplitude(&original2, threshold);
    let spectral1 = analyze_spectrum(&original1);
    let spectral2 = analyze_spectrum(&original2);
    let envelope1 = envelope_stats(&original1, threshold);
    let envelope2 = envelope_stats(&original2, threshold);
    let timing1 = detect_transients(&original1, threshold);
    let timing2 = detect_transients(&original2, threshold);

    let waveform_correlation = pearson(view1.samples(), view2.samples());
    let envelope_correlation = pearson(
        &envelope(&view1, ENVELOPE_CORRELATION_WINDOW_MS),
        &envelope(&view2, ENVELOPE_CORRELATION_WINDOW_MS),
    );
    let spectral_corr =
        spectral_correlation(view1.samples(), view2.samples(), target_rate);

    let mut result = ComparisonResult {
        sample_rate: target_rate,
        duration1_secs: original1.duration_secs() as f32,
        duration2_secs: original2.duration_secs() as f32,
        aligned: options.align,
        alignment_offset_ms,
        alignment_correlation: estimate.confidence,
        peak_diff_db: amplitude2.peak_db - amplitude1.peak_db,
        rms_diff_db: amplitude2.rms_db - amplitude1.rms_db,
        spectral_centroid_diff_hz: spectral2.centroid_hz - spectral1.centroid_hz,
        amplitude1,
        amplitude2,
        spectral1,
        spectral2,
        envelope1,
        envelope2,
        timing1,
        timing2,
        waveform_correlation,
        envelope_correlation,
        spectral_correlation: spectral_corr,
        similarity_score: 0.0,
        issues: Vec::new(),
    };

    result.similarity_score = similarity_score(&result);
    result.issues = detect_issues(&result);
    tracing::debug!(
        score = result.similarity_score,
        issues = result.issues.len(),
        "comparison complete"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sr: u32, secs: f32, gain: f32) -> SignalBuffer {
        let n = (secs * sr as f32) as usize;
        let samples = (0..n)
            .map(|i| gain * (2.0 * PI * freq * i as f32 / sr as f32).sin())
            .collect();
        SignalBuffer::new(samples, sr)
    }

    #[test]
    fn test_identical_buffers_near_perfect() {
        let a = sine(440.0, 48000, 1.0, 1.0);
        let options = CompareOptions {
            align: false,
            ..CompareOptions::default()
        };
        let result = compare(&a, &a.clone(), &options);
        assert!((result.waveform_correlation - 1.0).abs() < 1e-5);
        assert_eq!(result.peak_diff_db, 0.0);
        assert_eq!(result.rms_diff_db, 0.0);
        assert!(result.similarity_score >= 99.0, "score {}", result.similarity_score);
        assert!(result.issues.is_empty(), "issues {:?}", result.issues);
    }

    #[test]
    fn test_mixed_rates_resampled_up() {
        let a = sine(440.0, 44100, 0.5, 1.0);
        let b = sine(440.0, 48000, 0.5, 1.0);
        let result = compare(&a, &b, &CompareOptions::default());
        assert_eq!(result.sample_rate, 48000);
        assert!((result.duration1_secs - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_gain_difference_reported() {
        let a = sine(440.0, 48000, 1.0, 0.5);
        let b = sine(440.0, 48000, 1.0, 1.0);
        let result = compare(&a, &b, &CompareOptions::default());
        assert!(
            (result.peak_diff_db - 6.02).abs() < 0.1,
            "peak diff {}",
            result.peak_diff_db
        );
        assert!(
            (result.rms_diff_db - 6.02).abs() < 0.1,
            "rms diff {}",
            result.rms_diff_db
        );
        assert_eq!(result.issues.len(), 2, "issues {:?}", result.issues);
    }

    #[test]
    fn test_normalize_hides_gain_from_correlation_not_stats() {
        let a = sine(440.0, 48000, 1.0, 0.25);
        let b = sine(440.0, 48000, 1.0, 1.0);
        let options = CompareOptions {
            normalize: true,
            ..CompareOptions::default()
        };
        let result = compare(&a, &b, &options);
        // Correlation sees identical shapes; absolute stats still differ
        assert!((result.waveform_correlation - 1.0).abs() < 1e-4);
        assert!(result.peak_diff_db > 10.0);
    }

    #[test]
    fn test_silence_vs_silence_total() {
        let silent = SignalBuffer::new(vec![0.0; 48000], 48000);
        let result = compare(&silent, &silent.clone(), &CompareOptions::default());
        assert!(result.similarity_score.is_finite());
        assert!(!result.waveform_correlation.is_nan());
    }

    #[test]
    fn test_unaligned_has_no_offset() {
        let a = sine(440.0, 48000, 1.0, 1.0);
        let options = CompareOptions {
            align: false,
            ..CompareOptions::default()
        };
        let result = compare(&a, &a.clone(), &options);
        assert!(!result.aligned);
        assert_eq!(result.alignment_offset_ms, 0.0);
        assert_eq!(result.alignment_correlation, 0.0);
    }

    #[test]
    fn test_trim_clamps_views_only() {
        // Second buffer delayed and longer: per-file durations keep their
        // original values whether or not trim runs
        let sr = 48000;
        let a = sine(440.0, sr, 1.0, 1.0);
        let mut delayed = vec![0.0f32; 4800];
        delayed.extend_from_slice(a.samples());
        delayed.extend(std::iter::repeat_n(0.0, 24000));
        let b = SignalBuffer::new(delayed, sr);

        let plain = compare(&a, &b, &CompareOptions::default());
        let trimmed = compare(
            &a,
            &b,
            &CompareOptions {
                trim: true,
                ..CompareOptions::default()
            },
        );
        assert_eq!(plain.duration2_secs, trimmed.duration2_secs);
        assert_eq!(plain.amplitude2, trimmed.amplitude2);
    }
}
