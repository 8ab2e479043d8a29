//! Bulk sample transforms used by the codec layer.
//!
//! # Features
//!
//! - sRGB transfer functions, scalar and 8-wide SIMD slice variants
//! - 16-bit byte swapping for codecs with fixed wire endianness
//! - Vertical flip and grayscale-to-RGB row reshaping
//!
//! All slice operations process `chunks_exact(8)` through [`wide`] vectors
//! and finish the remainder with the scalar path, so the two paths must stay
//! bit-compatible.

#![warn(missing_docs)]

mod endian;
mod flip;
mod gray;
mod srgb;

pub use endian::swap_bytes_u16;
pub use flip::flip_rows;
pub use gray::triplicate_rows;
pub use srgb::{linear_to_srgb, linear_to_srgb_slice, srgb_to_linear, srgb_to_linear_slice};
