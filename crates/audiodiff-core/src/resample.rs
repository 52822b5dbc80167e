//! Band-limited rational resampling.
//!
//! Polyphase FIR resampling with a windowed-sinc (Blackman) prototype
//! lowpass. The comparison pipeline only ever converts up to the higher of
//! the two input rates, so the anti-aliasing filter exists to suppress
//! interpolation images, never to discard content.

use std::f32::consts::PI;

/// Windowed-sinc lowpass FIR design, Blackman window, unity DC gain.
///
/// `cutoff` is normalized to Nyquist: 1.0 = fs/2.
pub fn design_lowpass(num_taps: usize, cutoff: f32) -> Vec<f32> {
    if num_taps == 0 {
        return Vec::new();
    }

    let m = num_taps - 1;
    let mut coeffs = Vec::with_capacity(num_taps);

    for n in 0..num_taps {
        let x = n as f32 - m as f32 / 2.0;

        let sinc = if x.abs() < 1e-7 {
            cutoff
        } else {
            (PI * cutoff * x).sin() / (PI * x)
        };

        let window = if m == 0 {
            1.0
        } else {
            let phase = 2.0 * PI * n as f32 / m as f32;
            0.42 - 0.5 * phase.cos() + 0.08 * (2.0 * phase).cos()
        };

        coeffs.push(sinc * window);
    }

    // Normalize to unity DC gain
    let sum: f32 = coeffs.iter().sum();
    if sum.abs() > 1e-10 {
        for c in coeffs.iter_mut() {
            *c /= sum;
        }
    }

    coeffs
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Rational resampling by the factor P/Q using polyphase decomposition.
///
/// Equivalent to upsampling by P, lowpass filtering at `min(1/P, 1/Q)`
/// normalized, and downsampling by Q, but only the surviving output
/// samples are computed. Output length is `ceil(len * P / Q)`.
///
/// `filter_order` of 0 selects the default of `4 * max(P, Q) * 10 + 1`
/// taps.
pub fn resample(signal: &[f32], p: usize, q: usize, filter_order: usize) -> Vec<f32> {
    assert!(p >= 1, "upsample factor P must be >= 1");
    assert!(q >= 1, "downsample factor Q must be >= 1");

    let g = gcd(p, q);
    let p = p / g;
    let q = q / g;

    if p == 1 && q == 1 {
        return signal.to_vec();
    }

    let num_taps = if filter_order == 0 {
        4 * p.max(q) * 10 + 1
    } else {
        filter_order
    };

    // Prototype cutoff just below the tighter of the two Nyquists
    let cutoff = 0.9 / p.max(q) as f32;
    let prototype = design_lowpass(num_taps, cutoff);

    let out_len = (signal.len() * p).div_ceil(q);
    let taps_per_phase = num_taps.div_ceil(p);

    // Sub-filter k holds prototype taps k, k+P, k+2P, ...
    let mut polyphase = vec![vec![0.0f32; taps_per_phase]; p];
    for (tap_idx, &coeff) in prototype.iter().enumerate() {
        polyphase[tap_idx % p][tap_idx / p] = coeff;
    }

    let mut output = Vec::with_capacity(out_len);

    for m in 0..out_len {
        let full_idx = m * q; // position in the P-upsampled sequence
        let n = full_idx / p;
        let k = full_idx % p;

        let mut acc = 0.0f32;
        for (i, &coeff) in polyphase[k].iter().enumerate() {
            if n >= i && (n - i) < signal.len() {
                acc += coeff * signal[n - i];
            }
        }

        // Scale by P to restore unity passband gain
        output.push(acc * p as f32);
    }

    output
}

/// Convert a signal from `from_hz` to `to_hz`.
///
/// Reduces the rate ratio to lowest terms before resampling, so common
/// conversions like 44100 → 48000 Hz run as P=160, Q=147.
pub fn resample_rate(signal: &[f32], from_hz: u32, to_hz: u32) -> Vec<f32> {
    assert!(from_hz > 0 && to_hz > 0, "sample rates must be positive");
    if from_hz == to_hz {
        return signal.to_vec();
    }
    resample(signal, to_hz as usize, from_hz as usize, 0)
}
