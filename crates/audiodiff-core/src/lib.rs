//! Audiodiff Core - Mono audio comparison pipeline
//!
//! Compares two recordings of the same musical event and quantifies how
//! alike they are:
//!
//! - [`buffer`] - Immutable mono sample buffer
//! - [`resample`] - Polyphase windowed-sinc sample rate conversion
//! - [`fft`] - FFT wrapper with windowing functions
//! - [`amplitude`] - Peak, RMS, crest factor, dynamic range, DC offset
//! - [`spectral`] - Centroid, bandwidth, rolloff, flatness, dominant peaks
//! - [`envelope`] - Envelope extraction and attack/decay/sustain/release
//! - [`transient`] - Onset detection and first-sound timing
//! - [`align`] - Offset estimation (transient match or cross-correlation)
//! - [`correlate`] - Pearson correlation over waveforms and spectra
//! - [`score`] - Weighted similarity score and issue detection
//! - [`compare`] - The end-to-end pipeline
//!
//! ## Example
//!
//! ```rust,ignore
//! use audiodiff_core::{CompareOptions, SignalBuffer, compare};
//!
//! let reference = SignalBuffer::new(samples1, 48000);
//! let candidate = SignalBuffer::new(samples2, 48000);
//!
//! let result = compare(&reference, &candidate, &CompareOptions::default());
//! println!("similarity: {:.1}/100", result.similarity_score);
//! for issue in &result.issues {
//!     println!("  - {issue}");
//! }
//! ```

pub mod align;
pub mod amplitude;
pub mod buffer;
pub mod compare;
pub mod correlate;
pub mod envelope;
pub mod fft;
pub mod level;
pub mod resample;
pub mod score;
pub mod spectral;
pub mod transient;

// Re-export main types
pub use align::{AlignConfig, AlignStrategy, OffsetEstimate, apply_offset, estimate_offset};
pub use amplitude::{AmplitudeStats, analyze_amplitude, peak, rms};
pub use buffer::SignalBuffer;
pub use compare::{CompareOptions, ComparisonResult, compare};
pub use correlate::{pearson, spectral_correlation};
pub use envelope::{EnvelopeStats, envelope, envelope_stats};
pub use fft::{Fft, Window, magnitude_spectrum};
pub use level::{EPSILON, db_to_linear, linear_to_db};
pub use resample::{resample, resample_rate};
pub use score::{detect_issues, similarity_score};
pub use spectral::{SpectralStats, analyze_spectrum};
pub use transient::{TimingStats, detect_transients, first_sound_index};
