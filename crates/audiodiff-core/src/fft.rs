//! FFT wrapper with windowing.

use rustfft::{FftPlanner, num_complex::Complex};
use std::f32::consts::PI;
use std::sync::Arc;

/// Window function applied before a spectral transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hann window (raised cosine)
    Hann,
}

impl Window {
    /// Apply the window to a buffer in place.
    pub fn apply(&self, buffer: &mut [f32]) {
        let n = buffer.len();
        match self {
            Window::Rectangular => {}
            Window::Hann => {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    let w = 0.5 * (1.0 - (2.0 * PI * i as f32 / n as f32).cos());
                    *sample *= w;
                }
            }
        }
    }
}

/// FFT processor with cached plans for one transform size.
pub struct Fft {
    fft: Arc<dyn rustfft::Fft<f32>>,
    ifft: Arc<dyn rustfft::Fft<f32>>,
    size: usize,
}

impl Fft {
    /// Create an FFT processor for the given size.
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);
        Self { fft, ifft, size }
    }

    /// Transform size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward FFT of a real signal.
    ///
    /// Input is zero-padded (or truncated) to the transform size. Returns
    /// the positive-frequency half spectrum: `size / 2 + 1` bins from DC
    /// to Nyquist.
    pub fn forward(&self, input: &[f32]) -> Vec<Complex<f32>> {
        let mut buffer: Vec<Complex<f32>> =
            input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(self.size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer.truncate(self.size / 2 + 1);
        buffer
    }

    /// Forward FFT of a complex buffer, in place.
    pub fn forward_complex(&self, buffer: &mut [Complex<f32>]) {
        self.fft.process(buffer);
    }

    /// Inverse FFT of a complex buffer, in place, normalized by 1/size.
    pub fn inverse_complex(&self, buffer: &mut [Complex<f32>]) {
        self.ifft.process(buffer);
        let scale = 1.0 / self.size as f32;
        for c in buffer.iter_mut() {
            *c *= scale;
        }
    }
}

/// Magnitude spectrum of a windowed real signal.
///
/// Convenience wrapper: applies `window`, runs a forward FFT sized to the
/// signal, and returns per-bin magnitudes (DC bin included).
pub fn magnitude_spectrum(signal: &[f32], window: Window) -> Vec<f32> {
    if signal.is_empty() {
        return Vec::new();
    }
    let mut windowed = signal.to_vec();
    window.apply(&mut windowed);

    let fft = Fft::new(windowed.len());
    fft.forward(&windowed).iter().map(|c| c.norm()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_shape() {
        let mut buffer = vec![1.0; 100];
        Window::Hann.apply(&mut buffer);
        assert!(buffer[0] < 0.01);
        assert!(buffer[99] < 0.01);
        assert!((buffer[50] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_peak_bin_matches_frequency() {
        let sample_rate = 48000.0;
        let size = 4096;
        let freq = 1000.0;
        let signal: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate).sin())
            .collect();

        let mags = magnitude_spectrum(&signal, Window::Hann);
        let peak_bin = mags
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        let expected = (freq * size as f32 / sample_rate).round() as usize;
        assert!(
            peak_bin.abs_diff(expected) <= 1,
            "peak bin {} should be near {}",
            peak_bin,
            expected
        );
    }

    #[test]
    fn test_forward_inverse_roundtrip() {
        let size = 256;
        let fft = Fft::new(size);
        let input: Vec<f32> = (0..size)
            .map(|i| (2.0 * PI * 10.0 * i as f32 / size as f32).sin())
            .collect();

        let mut buffer: Vec<Complex<f32>> =
            input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        fft.forward_complex(&mut buffer);
        fft.inverse_complex(&mut buffer);

        for (a, b) in input.iter().zip(buffer.iter()) {
            assert!((a - b.re).abs() < 0.01, "{} vs {}", a, b.re);
        }
    }

    #[test]
    fn test_empty_signal_empty_spectrum() {
        assert!(magnitude_spectrum(&[], Window::Hann).is_empty());
    }
}
