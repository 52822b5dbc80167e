//! Immutable mono sample buffer.

use crate::level::EPSILON;
use crate::resample::resample_rate;

/// A mono audio signal: sample data plus the rate it was captured at.
///
/// Buffers are value types. Every transform (`skip`, `truncate`,
/// `normalized`, `resampled`) returns a new buffer and leaves the
/// original untouched. Empty buffers are legal; all analyzers in this
/// crate handle them by returning zero/neutral statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SignalBuffer {
    /// Create a buffer from raw samples.
    ///
    /// # Panics
    ///
    /// Panics if `sample_rate` is zero.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        assert!(sample_rate > 0, "sample rate must be positive");
        Self {
            samples,
            sample_rate,
        }
    }

    /// The sample data.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// New buffer with the first `n` samples removed (clamped to length).
    pub fn skip(&self, n: usize) -> Self {
        let n = n.min(self.samples.len());
        Self {
            samples: self.samples[n..].to_vec(),
            sample_rate: self.sample_rate,
        }
    }

    /// New buffer truncated to at most `n` samples.
    pub fn truncate(&self, n: usize) -> Self {
        let n = n.min(self.samples.len());
        Self {
            samples: self.samples[..n].to_vec(),
            sample_rate: self.sample_rate,
        }
    }

    /// New buffer scaled so the peak absolute sample is 1.0.
    ///
    /// Near-silent buffers (peak below the numeric floor) are returned
    /// unchanged rather than blown up by a huge gain.
    pub fn normalized(&self) -> Self {
        let peak = self
            .samples
            .iter()
            .map(|x| x.abs())
            .fold(0.0f32, f32::max);
        if peak < EPSILON {
            return self.clone();
        }
        Self {
            samples: self.samples.iter().map(|x| x / peak).collect(),
            sample_rate: self.sample_rate,
        }
    }

    /// New buffer converted to `target_rate` via band-limited resampling.
    ///
    /// When the rates already match this is a cheap clone of the input —
    /// no filtering is applied.
    pub fn resampled(&self, target_rate: u32) -> Self {
        assert!(target_rate > 0, "target rate must be positive");
        if target_rate == self.sample_rate {
            return self.clone();
        }
        Self {
            samples: resample_rate(&self.samples, self.sample_rate, target_rate),
            sample_rate: target_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_truncate() {
        let buf = SignalBuffer::new(vec![1.0, 2.0, 3.0, 4.0], 48000);
        assert_eq!(buf.skip(1).samples(), &[2.0, 3.0, 4.0]);
        assert_eq!(buf.truncate(2).samples(), &[1.0, 2.0]);
        // Original untouched
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn test_skip_past_end_is_empty() {
        let buf = SignalBuffer::new(vec![1.0, 2.0], 48000);
        assert!(buf.skip(10).is_empty());
    }

    #[test]
    fn test_normalized_peak_is_unity() {
        let buf = SignalBuffer::new(vec![0.0, -0.5, 0.25], 44100);
        let norm = buf.normalized();
        let peak = norm.samples().iter().map(|x| x.abs()).fold(0.0f32, f32::max);
        assert!((peak - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalized_silence_unchanged() {
        let buf = SignalBuffer::new(vec![0.0; 100], 44100);
        assert_eq!(buf.normalized().samples(), buf.samples());
    }

    #[test]
    fn test_resampled_noop_same_rate() {
        let buf = SignalBuffer::new(vec![0.1, 0.2, 0.3], 48000);
        let same = buf.resampled(48000);
        assert_eq!(same.samples(), buf.samples());
    }

    #[test]
    fn test_duration() {
        let buf = SignalBuffer::new(vec![0.0; 24000], 48000);
        assert!((buf.duration_secs() - 0.5).abs() < 1e-9);
    }

    #[test]
    #[should_panic(expected = "sample rate must be positive")]
    fn test_zero_rate_rejected() {
        let _ = SignalBuffer::new(vec![], 0);
    }
}
