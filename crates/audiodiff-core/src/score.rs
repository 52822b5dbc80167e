//! Weighted similarity scoring and threshold-based issue detection.

use crate::compare::ComparisonResult;

/// Differences larger than this in peak or RMS level get flagged, dB.
const LEVEL_DIFF_DB: f32 = 3.0;

/// Alignment offsets larger than this get flagged, ms.
const OFFSET_MS: f32 = 10.0;

/// First-transient timing differences larger than this get flagged, ms.
const TIMING_DIFF_MS: f32 = 20.0;

/// Spectral centroid differences larger than this get flagged, Hz.
const CENTROID_DIFF_HZ: f32 = 200.0;

/// Waveform correlations below this get flagged.
const MIN_WAVEFORM_CORRELATION: f32 = 0.8;

/// Spectral correlations below this get flagged.
const MIN_SPECTRAL_CORRELATION: f32 = 0.9;

/// DC offsets larger than this get flagged.
const MAX_DC_OFFSET: f32 = 0.01;

/// Overall similarity as a weighted average of component scores, 0–100.
///
/// Correlations contribute clamped to ≥ 0 and scaled to 0–100; level and
/// centroid differences map linearly down to 0 at 12 dB and 1000 Hz
/// respectively. The alignment-confidence component only participates when
/// alignment ran, so its weight drops out of the average otherwise.
pub fn similarity_score(result: &ComparisonResult) -> f32 {
    let mut weighted_sum = 0.0f32;
    let mut total_weight = 0.0f32;
    let mut add = |score: f32, weight: f32| {
        weighted_sum += score.max(0.0) * weight;
        total_weight += weight;
    };

    add(result.waveform_correlation * 100.0, 3.0);
    add(result.envelope_correlation * 100.0, 2.0);
    add(result.spectral_correlation * 100.0, 2.0);
    add(100.0 - result.rms_diff_db.abs() * (100.0 / 12.0), 1.5);
    add(100.0 - result.peak_diff_db.abs() * (100.0 / 12.0), 1.0);
    add(
        100.0 - result.spectral_centroid_diff_hz.abs() * (100.0 / 1000.0),
        1.0,
    );
    if result.aligned {
        add(result.alignment_correlation * 100.0, 0.5);
    }

    weighted_sum / total_weight
}

type IssueRule = fn(&ComparisonResult) -> Option<String>;

/// Evaluated in order; emission order is part of the output contract.
const ISSUE_RULES: &[IssueRule] = &[
    peak_diff,
    rms_diff,
    alignment_offset,
    first_transient_diff,
    centroid_diff,
    low_waveform_correlation,
    low_spectral_correlation,
    dc_offset_file1,
    dc_offset_file2,
];

/// Run every issue rule against a finished comparison.
pub fn detect_issues(result: &ComparisonResult) -> Vec<String> {
    ISSUE_RULES.iter().filter_map(|rule| rule(result)).collect()
}

fn peak_diff(r: &ComparisonResult) -> Option<String> {
    (r.peak_diff_db.abs() > LEVEL_DIFF_DB)
        .then(|| format!("Peak level differs by {:.1} dB", r.peak_diff_db))
}

fn rms_diff(r: &ComparisonResult) -> Option<String> {
    (r.rms_diff_db.abs() > LEVEL_DIFF_DB)
        .then(|| format!("RMS level differs by {:.1} dB", r.rms_diff_db))
}

fn alignment_offset(r: &ComparisonResult) -> Option<String> {
    (r.aligned && r.alignment_offset_ms.abs() > OFFSET_MS)
        .then(|| format!("Timing offset of {:.1} ms detected", r.alignment_offset_ms))
}

fn first_transient_diff(r: &ComparisonResult) -> Option<String> {
    let diff = (r.timing1.first_transient_ms - r.timing2.first_transient_ms).abs();
    (diff > TIMING_DIFF_MS)
        .then(|| format!("First transient timing differs by {diff:.1} ms"))
}

fn centroid_diff(r: &ComparisonResult) -> Option<String> {
    (r.spectral_centroid_diff_hz.abs() > CENTROID_DIFF_HZ).then(|| {
        format!(
            "Spectral centroid differs by {:.0} Hz (timbre difference)",
            r.spectral_centroid_diff_hz
        )
    })
}

fn low_waveform_correlation(r: &ComparisonResult) -> Option<String> {
    (r.waveform_correlation < MIN_WAVEFORM_CORRELATION).then(|| {
        format!(
            "Low waveform correlation ({:.2}) - different audio content",
            r.waveform_correlation
        )
    })
}

fn low_spectral_correlation(r: &ComparisonResult) -> Option<String> {
    (r.spectral_correlation < MIN_SPECTRAL_CORRELATION).then(|| {
        format!(
            "Low spectral correlation ({:.2}) - frequency content differs",
            r.spectral_correlation
        )
    })
}

fn dc_offset_file1(r: &ComparisonResult) -> Option<String> {
    (r.amplitude1.dc_offset.abs() > MAX_DC_OFFSET)
        .then(|| format!("File 1 has DC offset: {:.4}", r.amplitude1.dc_offset))
}

fn dc_offset_file2(r: &ComparisonResult) -> Option<String> {
    (r.amplitude2.dc_offset.abs() > MAX_DC_OFFSET)
        .then(|| format!("File 2 has DC offset: {:.4}", r.amplitude2.dc_offset))
}
