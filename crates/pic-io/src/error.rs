//! Error types for texture I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for texture I/O operations.
pub type PicResult<T> = Result<T, PicError>;

/// Errors produced while reading or writing textures.
#[derive(Error, Debug)]
pub enum PicError {
    /// The path's extension maps to no supported container.
    #[error("unsupported file extension: {0}")]
    UnsupportedExtension(PathBuf),

    /// The file could not be opened, or its contents did not parse as the
    /// container its extension promised.
    #[error("corrupt or unreadable file: {0}")]
    CorruptOrUnreadable(String),

    /// The file parsed, but its channel layout has no canonical mapping
    /// (for example an EXR with only a Z channel and no luminance).
    #[error("unsupported channel layout: {0}")]
    UnsupportedChannelLayout(String),

    /// The picture cannot be expressed in the target container
    /// (for example two-channel data in Radiance HDR).
    #[error("cannot write {format} to {container}")]
    UnsupportedWriteCombination {
        /// The picture's format tag.
        format: String,
        /// The target container name.
        container: &'static str,
    },

    /// The picture handed to a writer is internally inconsistent.
    #[error("invalid picture: {0}")]
    InvalidPictureInfo(#[from] pic_core::CoreError),
}

impl From<std::io::Error> for PicError {
    fn from(err: std::io::Error) -> Self {
        PicError::CorruptOrUnreadable(err.to_string())
    }
}

impl From<png::DecodingError> for PicError {
    fn from(err: png::DecodingError) -> Self {
        PicError::CorruptOrUnreadable(err.to_string())
    }
}

impl From<png::EncodingError> for PicError {
    fn from(err: png::EncodingError) -> Self {
        PicError::CorruptOrUnreadable(err.to_string())
    }
}

impl From<tiff::TiffError> for PicError {
    fn from(err: tiff::TiffError) -> Self {
        PicError::CorruptOrUnreadable(err.to_string())
    }
}

impl From<jpeg_decoder::Error> for PicError {
    fn from(err: jpeg_decoder::Error) -> Self {
        PicError::CorruptOrUnreadable(err.to_string())
    }
}

impl From<jpeg_encoder::EncodingError> for PicError {
    fn from(err: jpeg_encoder::EncodingError) -> Self {
        PicError::CorruptOrUnreadable(err.to_string())
    }
}

impl From<exr::error::Error> for PicError {
    fn from(err: exr::error::Error) -> Self {
        PicError::CorruptOrUnreadable(err.to_string())
    }
}
