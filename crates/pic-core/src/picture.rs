//! Decoded picture container and texture roles.

use half::f16;

use crate::error::CoreError;
use crate::format::{BitDepth, TextureFormat};

/// Typed pixel storage.
///
/// The variant carries the sample interpretation: two-byte samples are either
/// unsigned shorts ([`PixelData::U16`]) or half floats ([`PixelData::F16`]),
/// which share the same [`TextureFormat`] group.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// 8-bit unsigned samples.
    U8(Vec<u8>),
    /// 16-bit unsigned samples.
    U16(Vec<u16>),
    /// 16-bit half float samples.
    F16(Vec<f16>),
    /// 32-bit float samples.
    F32(Vec<f32>),
}

impl PixelData {
    /// Number of samples held, regardless of variant.
    pub fn len(&self) -> usize {
        match self {
            PixelData::U8(v) => v.len(),
            PixelData::U16(v) => v.len(),
            PixelData::F16(v) => v.len(),
            PixelData::F32(v) => v.len(),
        }
    }

    /// True when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bit depth the variant stores at.
    pub fn bit_depth(&self) -> BitDepth {
        match self {
            PixelData::U8(_) => BitDepth::U8,
            PixelData::U16(_) | PixelData::F16(_) => BitDepth::U16,
            PixelData::F32(_) => BitDepth::U32,
        }
    }
}

/// A decoded picture: dimensions, format tag, and pixel samples.
///
/// Samples are interleaved row-major, top row first unless a reader was asked
/// to flip.
#[derive(Debug, Clone, PartialEq)]
pub struct PictureInfo {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Channel layout and bit depth.
    pub format: TextureFormat,
    /// Interleaved samples.
    pub pixels: PixelData,
}

impl PictureInfo {
    /// Bundles the fields into a picture. No validation is performed;
    /// call [`PictureInfo::validate`] when the source is untrusted.
    pub fn new(width: u16, height: u16, format: TextureFormat, pixels: PixelData) -> Self {
        Self {
            width,
            height,
            format,
            pixels,
        }
    }

    /// Channels per pixel (1-4), or 0 when no format is set.
    pub fn channel_count(&self) -> u8 {
        self.format.channel_count()
    }

    /// Samples implied by dimensions and channel count.
    pub fn expected_samples(&self) -> usize {
        self.width as usize * self.height as usize * self.channel_count() as usize
    }

    /// True when the two-byte samples are half floats rather than
    /// unsigned shorts.
    pub fn is_half_float(&self) -> bool {
        matches!(self.pixels, PixelData::F16(_))
    }

    /// Checks internal consistency: non-zero dimensions, a format tag,
    /// storage variant matching the format's bit depth, and a sample count
    /// matching the dimensions.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.format == TextureFormat::None {
            return Err(CoreError::NoFormat);
        }
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.pixels.bit_depth() != self.format.bit_depth() {
            return Err(CoreError::StorageMismatch {
                format: self.format.to_string(),
            });
        }
        let expected = self.expected_samples();
        if self.pixels.len() != expected {
            return Err(CoreError::LengthMismatch {
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }
}

/// Semantic role a texture plays in a material.
///
/// Color-bearing roles decode grayscale sources to RGB so downstream
/// shading always sees three channels; data roles keep them single-channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRole {
    /// Base color.
    Albedo,
    /// Tangent-space normals.
    Normal,
    /// Microfacet roughness.
    Roughness,
    /// Metalness mask.
    Metallic,
    /// Ambient occlusion.
    AmbientOcclusion,
    /// Emitted light color.
    Emission,
    /// Displacement height.
    Height,
    /// Cutout / transparency mask.
    Opacity,
}

impl TextureRole {
    /// True for roles that carry color and therefore want grayscale
    /// sources expanded to RGB.
    pub fn wants_rgb(self) -> bool {
        matches!(self, TextureRole::Albedo | TextureRole::Emission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_2x2_u8() -> PictureInfo {
        PictureInfo::new(2, 2, TextureFormat::R8, PixelData::U8(vec![0, 64, 128, 255]))
    }

    #[test]
    fn validate_accepts_consistent_picture() {
        assert!(gray_2x2_u8().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        let mut pic = gray_2x2_u8();
        pic.width = 0;
        assert!(matches!(
            pic.validate(),
            Err(CoreError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn validate_rejects_missing_format() {
        let mut pic = gray_2x2_u8();
        pic.format = TextureFormat::None;
        assert_eq!(pic.validate(), Err(CoreError::NoFormat));
    }

    #[test]
    fn validate_rejects_storage_mismatch() {
        let pic = PictureInfo::new(1, 1, TextureFormat::R16, PixelData::U8(vec![0]));
        assert!(matches!(
            pic.validate(),
            Err(CoreError::StorageMismatch { .. })
        ));
    }

    #[test]
    fn validate_rejects_short_buffer() {
        let pic = PictureInfo::new(2, 2, TextureFormat::Rgb8, PixelData::U8(vec![0; 11]));
        assert_eq!(
            pic.validate(),
            Err(CoreError::LengthMismatch {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn half_float_flag_tracks_storage() {
        let shorts = PictureInfo::new(1, 1, TextureFormat::R16, PixelData::U16(vec![1]));
        let halves = PictureInfo::new(
            1,
            1,
            TextureFormat::R16,
            PixelData::F16(vec![f16::from_f32(1.0)]),
        );
        assert!(!shorts.is_half_float());
        assert!(halves.is_half_float());
        assert!(halves.validate().is_ok());
    }

    #[test]
    fn color_roles_want_rgb() {
        assert!(TextureRole::Albedo.wants_rgb());
        assert!(TextureRole::Emission.wants_rgb());
        assert!(!TextureRole::Roughness.wants_rgb());
        assert!(!TextureRole::Normal.wants_rgb());
        assert!(!TextureRole::Height.wants_rgb());
    }
}
