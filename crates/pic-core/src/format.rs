//! Texture format tags.
//!
//! A [`TextureFormat`] names a channel count (1-4) paired with a storage
//! bit depth ([`BitDepth`]). The 16- and 32-bit groups carry no integer vs
//! float distinction here; that lives in the pixel storage itself
//! (see [`crate::PixelData`]).

use std::fmt;

/// Bytes-per-channel storage class of a texture format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    /// One byte per channel.
    U8,
    /// Two bytes per channel (unsigned short or half float).
    U16,
    /// Four bytes per channel (unsigned int or single float).
    U32,
}

impl BitDepth {
    /// Storage size of one channel sample in bytes.
    pub const fn bytes_per_channel(self) -> usize {
        match self {
            BitDepth::U8 => 1,
            BitDepth::U16 => 2,
            BitDepth::U32 => 4,
        }
    }
}

/// Channel layout and bit depth of a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TextureFormat {
    /// No format assigned.
    #[default]
    None = 0,
    /// 1 channel, 8 bits.
    R8 = 1,
    /// 2 channels, 8 bits.
    Rg8 = 2,
    /// 3 channels, 8 bits.
    Rgb8 = 3,
    /// 4 channels, 8 bits.
    Rgba8 = 4,
    /// 1 channel, 16 bits.
    R16 = 5,
    /// 2 channels, 16 bits.
    Rg16 = 6,
    /// 3 channels, 16 bits.
    Rgb16 = 7,
    /// 4 channels, 16 bits.
    Rgba16 = 8,
    /// 1 channel, 32 bits.
    R32 = 9,
    /// 2 channels, 32 bits.
    Rg32 = 10,
    /// 3 channels, 32 bits.
    Rgb32 = 11,
    /// 4 channels, 32 bits.
    Rgba32 = 12,
}

impl TextureFormat {
    /// Builds a format from a channel count (1-4) and a bit depth.
    ///
    /// Returns `None` for channel counts outside 1-4.
    pub const fn from_parts(channels: u8, depth: BitDepth) -> Option<Self> {
        Some(match (depth, channels) {
            (BitDepth::U8, 1) => TextureFormat::R8,
            (BitDepth::U8, 2) => TextureFormat::Rg8,
            (BitDepth::U8, 3) => TextureFormat::Rgb8,
            (BitDepth::U8, 4) => TextureFormat::Rgba8,
            (BitDepth::U16, 1) => TextureFormat::R16,
            (BitDepth::U16, 2) => TextureFormat::Rg16,
            (BitDepth::U16, 3) => TextureFormat::Rgb16,
            (BitDepth::U16, 4) => TextureFormat::Rgba16,
            (BitDepth::U32, 1) => TextureFormat::R32,
            (BitDepth::U32, 2) => TextureFormat::Rg32,
            (BitDepth::U32, 3) => TextureFormat::Rgb32,
            (BitDepth::U32, 4) => TextureFormat::Rgba32,
            _ => return None,
        })
    }

    /// Number of channels (1-4), or 0 for [`TextureFormat::None`].
    pub const fn channel_count(self) -> u8 {
        match self {
            TextureFormat::None => 0,
            TextureFormat::R8 | TextureFormat::R16 | TextureFormat::R32 => 1,
            TextureFormat::Rg8 | TextureFormat::Rg16 | TextureFormat::Rg32 => 2,
            TextureFormat::Rgb8 | TextureFormat::Rgb16 | TextureFormat::Rgb32 => 3,
            TextureFormat::Rgba8 | TextureFormat::Rgba16 | TextureFormat::Rgba32 => 4,
        }
    }

    /// Bit depth of the storage group ([`TextureFormat::None`] maps to 8-bit).
    pub const fn bit_depth(self) -> BitDepth {
        match self {
            TextureFormat::None
            | TextureFormat::R8
            | TextureFormat::Rg8
            | TextureFormat::Rgb8
            | TextureFormat::Rgba8 => BitDepth::U8,
            TextureFormat::R16
            | TextureFormat::Rg16
            | TextureFormat::Rgb16
            | TextureFormat::Rgba16 => BitDepth::U16,
            TextureFormat::R32
            | TextureFormat::Rg32
            | TextureFormat::Rgb32
            | TextureFormat::Rgba32 => BitDepth::U32,
        }
    }

    /// The single-channel format of the same bit depth.
    pub const fn channel_format(self) -> Self {
        match self.bit_depth() {
            BitDepth::U8 => TextureFormat::R8,
            BitDepth::U16 => TextureFormat::R16,
            BitDepth::U32 => TextureFormat::R32,
        }
    }

    /// Same bit depth with a different channel count.
    ///
    /// Returns `None` for channel counts outside 1-4.
    pub const fn with_channels(self, channels: u8) -> Option<Self> {
        Self::from_parts(channels, self.bit_depth())
    }

    /// Storage size of one pixel in bytes.
    pub const fn bytes_per_pixel(self) -> usize {
        self.channel_count() as usize * self.bit_depth().bytes_per_channel()
    }
}

impl fmt::Display for TextureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TextureFormat::None => "none",
            TextureFormat::R8 => "r8",
            TextureFormat::Rg8 => "rg8",
            TextureFormat::Rgb8 => "rgb8",
            TextureFormat::Rgba8 => "rgba8",
            TextureFormat::R16 => "r16",
            TextureFormat::Rg16 => "rg16",
            TextureFormat::Rgb16 => "rgb16",
            TextureFormat::Rgba16 => "rgba16",
            TextureFormat::R32 => "r32",
            TextureFormat::Rg32 => "rg32",
            TextureFormat::Rgb32 => "rgb32",
            TextureFormat::Rgba32 => "rgba32",
        };
        f.write_str(name)
    }
}
