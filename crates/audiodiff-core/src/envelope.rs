//! Amplitude envelope extraction and attack/decay/sustain/release timing.

use crate::buffer::SignalBuffer;
use crate::level::{EPSILON, db_to_linear};
use std::collections::VecDeque;

/// Envelope window used for ADSR timing extraction, in milliseconds.
const STATS_WINDOW_MS: f32 = 5.0;

/// Attack is measured from the last crossing below this fraction of peak.
const ATTACK_THRESHOLD: f32 = 0.9;

/// Envelope timing characteristics of one buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeStats {
    /// Time to reach 90% of the envelope peak, ms.
    pub attack_time_ms: f32,
    /// Time from peak down to within 0.1 of the sustain level, ms.
    pub decay_time_ms: f32,
    /// Mean of the normalized envelope's middle 50% (by index), 0–1.
    pub sustain_level: f32,
    /// Time from peak to the start of the trailing silence, ms.
    pub release_time_ms: f32,
}

impl EnvelopeStats {
    pub(crate) fn zeroed() -> Self {
        Self {
            attack_time_ms: 0.0,
            decay_time_ms: 0.0,
            sustain_level: 0.0,
            release_time_ms: 0.0,
        }
    }
}

/// Extract a smoothed amplitude envelope.
///
/// Rectifies the signal, runs a centered sliding-maximum then a centered
/// sliding-mean of `window_ms` width, and decimates so the output carries
/// one sample per `window_ms`.
pub fn envelope(buffer: &SignalBuffer, window_ms: f32) -> Vec<f32> {
    let samples = buffer.samples();
    if samples.is_empty() {
        return Vec::new();
    }

    let window = ((window_ms * buffer.sample_rate() as f32 / 1000.0) as usize).max(1);

    let rectified: Vec<f32> = samples.iter().map(|x| x.abs()).collect();
    let peaks = sliding_max(&rectified, window);
    let smoothed = sliding_mean(&peaks, window);

    smoothed.into_iter().step_by(window).collect()
}

/// Centered sliding-window maximum using a monotonic deque.
///
/// Window edges are clamped to the signal bounds, so output length equals
/// input length.
fn sliding_max(signal: &[f32], window: usize) -> Vec<f32> {
    let n = signal.len();
    let left = window / 2;
    let right = window - left - 1;

    let mut deque: VecDeque<usize> = VecDeque::new();
    let mut output = Vec::with_capacity(n);
    let mut next = 0usize; // next index not yet admitted to the deque

    for i in 0..n {
        let hi = (i + right).min(n - 1);
        while next <= hi {
            while let Some(&back) = deque.back() {
                if signal[back] <= signal[next] {
                    deque.pop_back();
                } else {
                    break;
                }
            }
            deque.push_back(next);
            next += 1;
        }
        let lo = i.saturating_sub(left);
        while let Some(&front) = deque.front() {
            if front < lo {
                deque.pop_front();
            } else {
                break;
            }
        }
        output.push(signal[*deque.front().expect("window is never empty")]);
    }

    output
}

/// Centered sliding-window mean via prefix sums, edges clamped.
fn sliding_mean(signal: &[f32], window: usize) -> Vec<f32> {
    let n = signal.len();
    let left = window / 2;
    let right = window - left - 1;

    // Prefix sums in f64 to keep long-buffer accumulation stable
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    for &x in signal {
        prefix.push(prefix.last().unwrap() + x as f64);
    }

    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(left);
            let hi = (i + right).min(n - 1);
            let sum = prefix[hi + 1] - prefix[lo];
            (sum / (hi - lo + 1) as f64) as f32
        })
        .collect()
}

/// Derive attack/decay/sustain/release timings from a 5 ms envelope.
///
/// Returns all-zero stats when the envelope peaks below the numeric floor.
pub fn envelope_stats(buffer: &SignalBuffer, silence_threshold_db: f32) -> EnvelopeStats {
    let env = envelope(buffer, STATS_WINDOW_MS);

    let peak = env.iter().copied().fold(0.0f32, f32::max);
    if env.is_empty() || peak < EPSILON {
        return EnvelopeStats::zeroed();
    }

    let norm: Vec<f32> = env.iter().map(|&x| x / peak).collect();
    // First occurrence of the maximum; ties on flat envelopes must
    // resolve to the earliest index or attack/release collapse
    let mut peak_idx = 0;
    for (i, &v) in norm.iter().enumerate() {
        if v > norm[peak_idx] {
            peak_idx = i;
        }
    }

    // Attack: from the last sub-90% sample before the peak up to the peak
    let attack_time_ms = match norm[..peak_idx]
        .iter()
        .rposition(|&x| x < ATTACK_THRESHOLD)
    {
        Some(start) => (peak_idx - start) as f32 * STATS_WINDOW_MS,
        None => peak_idx as f32 * STATS_WINDOW_MS,
    };

    // Sustain: mean of the middle 50% by index
    let sustain_level = if norm.len() > 4 {
        let quarter = norm.len() / 4;
        let region = &norm[quarter..3 * quarter];
        region.iter().sum::<f32>() / region.len() as f32
    } else {
        norm.iter().sum::<f32>() / norm.len() as f32
    };

    // Release: from the peak to the start of the last contiguous
    // sub-threshold run
    let release_threshold = (db_to_linear(silence_threshold_db) / peak).max(0.01);
    let below: Vec<usize> = norm
        .iter()
        .enumerate()
        .filter(|&(_, &x)| x < release_threshold)
        .map(|(i, _)| i)
        .collect();

    let release_time_ms = if below.is_empty() {
        (norm.len() - peak_idx) as f32 * STATS_WINDOW_MS
    } else {
        let mut sound_end = below[0];
        for pair in below.windows(2) {
            if pair[1] - pair[0] > 1 {
                sound_end = pair[1];
            }
        }
        if sound_end > peak_idx {
            (sound_end - peak_idx) as f32 * STATS_WINDOW_MS
        } else {
            0.0
        }
    };

    // Decay: only meaningful when the sound does not sustain near its peak
    let decay_time_ms = if sustain_level < 0.9 {
        norm[peak_idx..]
            .iter()
            .position(|&x| x < sustain_level + 0.1)
            .map_or(0.0, |i| i as f32 * STATS_WINDOW_MS)
    } else {
        0.0
    };

    EnvelopeStats {
        attack_time_ms,
        decay_time_ms,
        sustain_level,
        release_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    /// Half a second of full-scale 440 Hz, then half a second of silence.
    fn tone_burst(sr: u32) -> SignalBuffer {
        let half = sr as usize / 2;
        let mut samples: Vec<f32> = (0..half)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / sr as f32).sin())
            .collect();
        samples.extend(std::iter::repeat_n(0.0, half));
        SignalBuffer::new(samples, sr)
    }

    #[test]
    fn test_envelope_length_and_rate() {
        let buf = tone_burst(48000);
        let env = envelope(&buf, 5.0);
        // One envelope sample per 5 ms: 1 s of audio -> ~200 samples
        let expected = buf.len().div_ceil((0.005 * 48000.0) as usize);
        assert_eq!(env.len(), expected);
    }

    #[test]
    fn test_envelope_tracks_amplitude() {
        let env = envelope(&tone_burst(48000), 5.0);
        let mid_loud = env[env.len() / 4];
        let mid_quiet = env[3 * env.len() / 4];
        assert!(mid_loud > 0.9, "loud half {}", mid_loud);
        assert!(mid_quiet < 0.05, "quiet half {}", mid_quiet);
    }

    #[test]
    fn test_sliding_max_simple() {
        let out = sliding_max(&[0.0, 1.0, 0.0, 0.0, 2.0, 0.0], 3);
        assert_eq!(out, vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_sliding_mean_constant() {
        let out = sliding_mean(&[3.0; 10], 4);
        for v in out {
            assert!((v - 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_burst_release_near_boundary() {
        let stats = envelope_stats(&tone_burst(48000), -60.0);
        // Sound stops at 500 ms; the peak sits near the start
        assert!(
            stats.release_time_ms > 400.0 && stats.release_time_ms < 600.0,
            "release {}",
            stats.release_time_ms
        );
    }

    #[test]
    fn test_burst_sustain_about_half() {
        // Middle 50% of the envelope covers equal parts tone and silence
        let stats = envelope_stats(&tone_burst(48000), -60.0);
        assert!(
            stats.sustain_level > 0.3 && stats.sustain_level < 0.7,
            "sustain {}",
            stats.sustain_level
        );
    }

    #[test]
    fn test_steady_tone_no_decay() {
        let sr = 48000u32;
        let samples: Vec<f32> = (0..sr)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / sr as f32).sin())
            .collect();
        let stats = envelope_stats(&SignalBuffer::new(samples, sr), -60.0);
        // Sustain near peak: decay is defined as zero
        assert!(stats.sustain_level > 0.9, "sustain {}", stats.sustain_level);
        assert_eq!(stats.decay_time_ms, 0.0);
    }

    #[test]
    fn test_steady_tone_release_spans_tail() {
        let sr = 48000u32;
        let samples: Vec<f32> = (0..sr)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / sr as f32).sin())
            .collect();
        let stats = envelope_stats(&SignalBuffer::new(samples, sr), -60.0);
        // No sub-threshold region: release runs from peak to buffer end
        assert!(
            stats.release_time_ms > 800.0,
            "release {}",
            stats.release_time_ms
        );
    }

    #[test]
    fn test_silence_all_zero() {
        let stats = envelope_stats(&SignalBuffer::new(vec![0.0; 48000], 48000), -60.0);
        assert_eq!(stats, EnvelopeStats::zeroed());
    }

    #[test]
    fn test_empty_buffer_all_zero() {
        let stats = envelope_stats(&SignalBuffer::new(vec![], 48000), -60.0);
        assert_eq!(stats, EnvelopeStats::zeroed());
    }

    #[test]
    fn test_flat_envelope_peak_at_start() {
        // A constant full-scale signal plateaus at the maximum from the
        // first sample: the peak index must be the first tie, giving an
        // instant attack and a release spanning the whole buffer
        let stats = envelope_stats(&SignalBuffer::new(vec![1.0; 48000], 48000), -60.0);
        assert_eq!(stats.attack_time_ms, 0.0);
        assert!(
            stats.release_time_ms > 900.0,
            "release {}",
            stats.release_time_ms
        );
    }

    #[test]
    fn test_ramp_attack_measured_to_peak() {
        // 100 ms linear ramp to full scale, then hold: the 90%-to-peak
        // span is the last 10% of the ramp, about 10 ms.
        let sr = 48000u32;
        let ramp_len = (sr as usize) / 10;
        let mut samples: Vec<f32> = (0..ramp_len)
            .map(|i| i as f32 / ramp_len as f32)
            .collect();
        samples.extend(std::iter::repeat_n(1.0, sr as usize / 2));
        let stats = envelope_stats(&SignalBuffer::new(samples, sr), -60.0);
        assert!(
            stats.attack_time_ms > 0.0 && stats.attack_time_ms < 30.0,
            "attack {}",
            stats.attack_time_ms
        );
    }
}
