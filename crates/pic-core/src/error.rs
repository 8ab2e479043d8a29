//! Validation errors for core pixel types.

use thiserror::Error;

/// Errors produced when a [`crate::PictureInfo`] is internally inconsistent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Width or height is zero.
    #[error("picture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension {
        /// Picture width in pixels.
        width: u16,
        /// Picture height in pixels.
        height: u16,
    },

    /// The format tag is `TextureFormat::None`.
    #[error("picture has no pixel format")]
    NoFormat,

    /// The pixel storage variant does not match the format's bit depth.
    #[error("pixel storage does not match format {format}")]
    StorageMismatch {
        /// The declared texture format.
        format: String,
    },

    /// The pixel buffer length does not match width * height * channels.
    #[error("expected {expected} samples, buffer holds {actual}")]
    LengthMismatch {
        /// Samples implied by dimensions and channel count.
        expected: usize,
        /// Samples actually present in the buffer.
        actual: usize,
    },
}
