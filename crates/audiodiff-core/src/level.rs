//! Linear/dB conversions with a shared numeric floor.
//!
//! Every dB conversion in this crate floors its argument at [`EPSILON`]
//! before taking the logarithm, so silent or degenerate signals produce
//! a large-but-finite dB value instead of `-inf` or NaN.

/// Floor applied before every `log10` and division in the pipeline.
pub const EPSILON: f32 = 1e-10;

/// Convert a linear amplitude to dB, floored at [`EPSILON`].
///
/// `linear_to_db(0.0)` is `20 * log10(1e-10) = -200 dB`, never `-inf`.
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.max(EPSILON).log10()
}

/// Convert a dB value to linear amplitude.
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}
