//! Onset-strength transient detection and first-sound timing.

use crate::buffer::SignalBuffer;
use crate::level::db_to_linear;

/// Reported transient times are truncated to this many entries.
pub const MAX_TRANSIENT_TIMES: usize = 20;

/// Analysis frame length in seconds.
const FRAME_SECS: f64 = 0.025;

/// Hop between frames in seconds.
const HOP_SECS: f64 = 0.010;

/// Minimum onset strength (relative to the strongest onset) for a peak.
const ONSET_HEIGHT: f32 = 0.1;

/// Minimum separation between detected transients, in seconds.
const MIN_SEPARATION_SECS: f64 = 0.05;

/// Transient timing statistics for one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingStats {
    /// Time of the first raw sample above the detection threshold, ms.
    /// Zero when no sample crosses it.
    pub first_transient_ms: f32,
    /// Total number of detected onsets (not capped).
    pub num_transients: usize,
    /// Onset times in ms, at most [`MAX_TRANSIENT_TIMES`] entries.
    pub transient_times_ms: Vec<f32>,
}

impl TimingStats {
    pub(crate) fn zeroed() -> Self {
        Self {
            first_transient_ms: 0.0,
            num_transients: 0,
            transient_times_ms: Vec::new(),
        }
    }
}

/// Index of the first sample whose absolute value exceeds the linear
/// equivalent of `threshold_db`, or `None` if the signal never crosses it.
pub fn first_sound_index(samples: &[f32], threshold_db: f32) -> Option<usize> {
    let threshold = db_to_linear(threshold_db);
    samples.iter().position(|x| x.abs() > threshold)
}

/// Detect transients via frame-energy onset strength.
///
/// Frames the buffer into 25 ms windows at a 10 ms hop, takes the positive
/// half-wave rectified first difference of the frame energies, normalizes
/// by its own maximum, and picks peaks at least [`ONSET_HEIGHT`] tall with
/// 50 ms minimum separation. The first-transient time is an independent
/// raw-sample measurement against `threshold_db`.
pub fn detect_transients(buffer: &SignalBuffer, threshold_db: f32) -> TimingStats {
    let samples = buffer.samples();
    let sample_rate = buffer.sample_rate() as f64;

    let frame_len = (FRAME_SECS * sample_rate) as usize;
    let hop_len = (HOP_SECS * sample_rate) as usize;

    let first_transient_ms = first_sound_index(samples, threshold_db)
        .map_or(0.0, |i| (i as f64 / sample_rate * 1000.0) as f32);

    if frame_len == 0 || hop_len == 0 || samples.len() < frame_len {
        return TimingStats {
            first_transient_ms,
            ..TimingStats::zeroed()
        };
    }

    let num_frames = (samples.len() - frame_len) / hop_len + 1;
    let energies: Vec<f32> = (0..num_frames)
        .map(|i| {
            let start = i * hop_len;
            samples[start..start + frame_len]
                .iter()
                .map(|&x| x * x)
                .sum()
        })
        .collect();

    // Positive half-wave rectified first difference
    let mut onset: Vec<f32> = energies
        .windows(2)
        .map(|w| (w[1] - w[0]).max(0.0))
        .collect();

    let max_onset = onset.iter().copied().fold(0.0f32, f32::max);
    if max_onset > 0.0 {
        for v in onset.iter_mut() {
            *v /= max_onset;
        }
    }

    let min_separation = ((MIN_SEPARATION_SECS / HOP_SECS) as usize).max(1);
    let peaks = pick_peaks(&onset, ONSET_HEIGHT, min_separation);

    let hop_ms = (hop_len as f64 / sample_rate * 1000.0) as f32;
    let transient_times_ms: Vec<f32> = peaks
        .iter()
        .take(MAX_TRANSIENT_TIMES)
        .map(|&p| p as f32 * hop_ms)
        .collect();

    TimingStats {
        first_transient_ms,
        num_transients: peaks.len(),
        transient_times_ms,
    }
}

/// Local maxima above `height`, thinned to `min_distance` apart.
///
/// A flat plateau bounded by lower values on both sides counts as one
/// maximum at its midpoint. Candidates are ranked by height and kept
/// greedily, dropping any candidate within `min_distance` of an
/// already-kept peak. The survivors are returned in index order.
fn pick_peaks(signal: &[f32], height: f32, min_distance: usize) -> Vec<usize> {
    let n = signal.len();
    let mut candidates: Vec<usize> = Vec::new();
    let mut i = 1;
    while n >= 2 && i < n - 1 {
        if signal[i] > signal[i - 1] {
            let start = i;
            let mut end = i;
            while end + 1 < n && signal[end + 1] == signal[end] {
                end += 1;
            }
            if end + 1 < n && signal[end + 1] < signal[end] && signal[start] >= height {
                candidates.push((start + end) / 2);
            }
            i = end + 1;
        } else {
            i += 1;
        }
    }

    candidates.sort_by(|&a, &b| {
        signal[b]
            .partial_cmp(&signal[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<usize> = Vec::new();
    for &idx in &candidates {
        if kept.iter().all(|&k| idx.abs_diff(k) >= min_distance) {
            kept.push(idx);
        }
    }

    kept.sort_unstable();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// Silence with short full-scale bursts at the given onsets (seconds).
    fn click_track(sr: u32, total_secs: f32, onsets: &[f32]) -> SignalBuffer {
        let n = (total_secs * sr as f32) as usize;
        let mut samples = vec![0.0f32; n];
        for &onset in onsets {
            let start = (onset * sr as f32) as usize;
            let end = (start + sr as usize / 100).min(n); // 10 ms bursts
            for (i, s) in samples[start..end].iter_mut().enumerate() {
                *s = (2.0 * PI * 1000.0 * i as f32 / sr as f32).sin();
            }
        }
        SignalBuffer::new(samples, sr)
    }

    #[test]
    fn test_detects_each_burst() {
        let buf = click_track(48000, 1.0, &[0.103, 0.403, 0.703]);
        let stats = detect_transients(&buf, -40.0);
        assert_eq!(stats.num_transients, 3, "times {:?}", stats.transient_times_ms);

        // Reported time is the hop index of the energy rise, which lands
        // up to one frame before the waveform onset
        for (t, expected) in stats.transient_times_ms.iter().zip([103.0, 403.0, 703.0]) {
            assert!(
                (t - expected).abs() < 40.0,
                "onset at {} should be near {}",
                t,
                expected
            );
        }
    }

    #[test]
    fn test_first_transient_time() {
        let buf = click_track(48000, 1.0, &[0.25]);
        let stats = detect_transients(&buf, -40.0);
        assert!(
            (stats.first_transient_ms - 250.0).abs() < 5.0,
            "first transient {}",
            stats.first_transient_ms
        );
    }

    #[test]
    fn test_first_sound_none_for_silence() {
        assert_eq!(first_sound_index(&[0.0; 1000], -40.0), None);
    }

    #[test]
    fn test_silence_no_transients() {
        let stats = detect_transients(&SignalBuffer::new(vec![0.0; 48000], 48000), -40.0);
        assert_eq!(stats.num_transients, 0);
        assert_eq!(stats.first_transient_ms, 0.0);
        assert!(stats.transient_times_ms.is_empty());
    }

    #[test]
    fn test_short_buffer_no_crash() {
        let stats = detect_transients(&SignalBuffer::new(vec![0.5; 10], 48000), -40.0);
        assert_eq!(stats.num_transients, 0);
        assert!(stats.first_transient_ms >= 0.0);
    }

    #[test]
    fn test_times_capped_count_not() {
        // 30 bursts, 100 ms apart: count reports all, list is capped.
        let onsets: Vec<f32> = (0..30).map(|i| 0.053 + i as f32 * 0.1).collect();
        let buf = click_track(48000, 3.1, &onsets);
        let stats = detect_transients(&buf, -40.0);
        assert!(stats.num_transients >= 25, "count {}", stats.num_transients);
        assert!(stats.transient_times_ms.len() <= MAX_TRANSIENT_TIMES);
    }

    #[test]
    fn test_pick_peaks_plateau() {
        // A flat top bounded by lower values is one peak at its midpoint
        let signal = [0.0, 0.5, 0.5, 0.5, 0.0, 0.0, 0.9, 0.0];
        let peaks = pick_peaks(&signal, 0.1, 1);
        assert_eq!(peaks, vec![2, 6]);
    }

    #[test]
    fn test_pick_peaks_distance_keeps_tallest() {
        let signal = [0.0, 0.4, 0.0, 0.8, 0.0];
        let peaks = pick_peaks(&signal, 0.1, 4);
        assert_eq!(peaks, vec![3]);
    }

    #[test]
    fn test_min_separation_enforced() {
        let buf = click_track(48000, 1.0, &[0.2, 0.21, 0.22]);
        let stats = detect_transients(&buf, -40.0);
        // Bursts 10 ms apart merge into one detection region; peaks
        // closer than 50 ms are thinned
        for pair in stats.transient_times_ms.windows(2) {
            assert!(pair[1] - pair[0] >= 50.0 - 1e-3);
        }
    }
}
