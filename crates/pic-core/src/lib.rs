//! Core pixel types shared across the pic-rs workspace.
//!
//! # Features
//!
//! - [`TextureFormat`] - channel-count x bit-depth format tags
//! - [`PixelData`] - typed pixel storage (8/16-bit integer, half/single float)
//! - [`PictureInfo`] - a decoded picture: dimensions, format, pixels
//! - [`TextureRole`] - semantic role of a texture in a material
//!
//! # Example
//!
//! ```
//! use pic_core::{BitDepth, PictureInfo, PixelData, TextureFormat};
//!
//! let pic = PictureInfo::new(2, 2, TextureFormat::Rgb8, PixelData::U8(vec![0; 12]));
//! assert!(pic.validate().is_ok());
//! assert_eq!(pic.format.bit_depth(), BitDepth::U8);
//! ```

#![warn(missing_docs)]

mod error;
mod format;
mod picture;

pub use error::CoreError;
pub use format::{BitDepth, TextureFormat};
pub use picture::{PictureInfo, PixelData, TextureRole};
