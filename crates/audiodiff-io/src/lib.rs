//! WAV loading layer for the audiodiff comparison pipeline.
//!
//! This crate provides:
//!
//! - **WAV file I/O**: [`read_wav`] and [`write_wav`] for loading/saving audio files
//! - **Buffer loading**: [`load_audio`] for getting a mono [`SignalBuffer`]
//!   straight from disk, downmixing multi-channel files by averaging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use audiodiff_core::{CompareOptions, compare};
//! use audiodiff_io::load_audio;
//!
//! let reference = load_audio("take1.wav")?;
//! let candidate = load_audio("take2.wav")?;
//! let result = compare(&reference, &candidate, &CompareOptions::default());
//! ```

mod wav;

pub use audiodiff_core::SignalBuffer;
pub use wav::{WavFormat, WavInfo, WavSpec, load_audio, read_wav, read_wav_info, write_wav};

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// A file decoded to zero channels, so no mono downmix exists.
    #[error("File has no audio channels: {0}")]
    NoChannels(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
