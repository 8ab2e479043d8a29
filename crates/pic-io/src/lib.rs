//! Texture reading and writing against one canonical pixel representation.
//!
//! Six containers are supported: PNG, TIFF, JPEG, Radiance HDR, OpenEXR,
//! and KTX2 (write only). Every read produces a [`PictureInfo`] the caller
//! owns; every write borrows one and leaves it untouched, taking private
//! copies for flips and conversions.
//!
//! # Features
//!
//! - Extension-driven dispatch, no content sniffing except the EXR magic
//! - Grayscale-to-RGB expansion and vertical flip on read
//! - Linear/sRGB conversion for the HDR-capable containers
//! - Role-driven reads for batch texture loading
//!
//! # Example
//!
//! ```rust,ignore
//! use pic_io::{ReadOptions, WriteOptions, read_picture, write_picture};
//!
//! let pic = read_picture("albedo.png", &ReadOptions::default())?;
//! write_picture("albedo.ktx2", &pic, &WriteOptions::default())?;
//! ```
//!
//! Reads of different files are safe to issue concurrently; every call
//! opens its own handle and allocates its own buffers.

#![warn(missing_docs)]

mod detect;
mod error;
mod exr;
mod hdr;
mod jpeg;
mod ktx;
mod png;
mod tiff;

use std::path::Path;

pub use detect::Format;
pub use error::{PicError, PicResult};
pub use pic_core::{BitDepth, PictureInfo, PixelData, TextureFormat, TextureRole};

/// Knobs applied while decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Reverse row order so the first row comes out last.
    pub flip_vertically: bool,
    /// Expand single-channel sources to RGB.
    pub gray_to_rgb: bool,
    /// Convert linear-light samples to sRGB while decoding. Only the
    /// HDR-capable containers (EXR, Radiance HDR) honor this.
    pub hdr_to_srgb: bool,
}

/// Knobs applied while encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Reverse row order in the encoded file.
    pub flip_vertically: bool,
    /// Convert sRGB-encoded samples back to linear light before encoding.
    /// Only the HDR-capable containers honor this.
    pub hdr_to_linear: bool,
}

/// Reads the picture at `path`, dispatching on the file extension.
///
/// The returned buffer is owned by the caller. An extension outside the
/// supported set fails with [`PicError::UnsupportedExtension`] before any
/// disk access. KTX2 is write-only; reading one fails with
/// [`PicError::CorruptOrUnreadable`].
pub fn read_picture<P: AsRef<Path>>(path: P, opts: &ReadOptions) -> PicResult<PictureInfo> {
    let path = path.as_ref();
    let format = Format::from_path(path)
        .ok_or_else(|| PicError::UnsupportedExtension(path.to_path_buf()))?;
    tracing::debug!(?format, path = %path.display(), "reading picture");

    match format {
        Format::Png => png::read(path, opts),
        Format::Tiff => tiff::read(path, opts),
        Format::Jpeg => jpeg::read(path, opts),
        Format::Hdr => hdr::read(path, opts),
        Format::Exr => exr::read_file(path, opts),
        Format::Ktx2 => Err(PicError::CorruptOrUnreadable(
            "ktx2 reading is not implemented".into(),
        )),
    }
}

/// Writes `pic` to `path`, dispatching on the file extension.
///
/// The picture is only borrowed; flips and colorspace conversions happen on
/// private copies.
pub fn write_picture<P: AsRef<Path>>(
    path: P,
    pic: &PictureInfo,
    opts: &WriteOptions,
) -> PicResult<()> {
    let path = path.as_ref();
    let format = Format::from_path(path)
        .ok_or_else(|| PicError::UnsupportedExtension(path.to_path_buf()))?;
    tracing::debug!(?format, path = %path.display(), "writing picture");

    match format {
        Format::Png => png::write(path, pic, opts),
        Format::Tiff => tiff::write(path, pic, opts),
        Format::Jpeg => jpeg::write(path, pic, opts),
        Format::Hdr => hdr::write(path, pic, opts),
        Format::Exr => exr::write(path, pic, opts),
        Format::Ktx2 => ktx::write(path, pic, opts),
    }
}

/// Reads a texture for a given material role.
///
/// Color-bearing roles (albedo, emission) request grayscale-to-RGB
/// expansion; data roles do not. No sRGB conversion is applied. Intended
/// for batch loaders that issue one call per file across worker threads.
pub fn read_picture_for_role<P: AsRef<Path>>(
    path: P,
    flip_vertically: bool,
    role: TextureRole,
) -> PicResult<PictureInfo> {
    let opts = ReadOptions {
        flip_vertically,
        gray_to_rgb: role.wants_rgb(),
        hdr_to_srgb: false,
    };
    read_picture(path, &opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_fails_without_touching_disk() {
        let err = read_picture("no_such_file.bmp", &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, PicError::UnsupportedExtension(_)));

        let pic = PictureInfo::new(1, 1, TextureFormat::R8, PixelData::U8(vec![0]));
        let err = write_picture("out.xyz", &pic, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, PicError::UnsupportedExtension(_)));
    }

    #[test]
    fn ktx2_has_no_read_path() {
        // The extension is known, so the error must say the read path is
        // missing rather than blame the extension.
        let err = read_picture("texture.ktx2", &ReadOptions::default()).unwrap_err();
        match err {
            PicError::CorruptOrUnreadable(msg) => assert!(msg.contains("not implemented")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn role_drives_gray_expansion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let pic = PictureInfo::new(2, 2, TextureFormat::R8, PixelData::U8(vec![9; 4]));
        write_picture(&path, &pic, &WriteOptions::default()).unwrap();

        let albedo = read_picture_for_role(&path, false, TextureRole::Albedo).unwrap();
        assert_eq!(albedo.format, TextureFormat::Rgb8);

        let rough = read_picture_for_role(&path, false, TextureRole::Roughness).unwrap();
        assert_eq!(rough.format, TextureFormat::R8);
    }

    #[test]
    fn cross_container_roundtrip() {
        // PNG to TIFF to PNG keeps 8-bit RGB content bit-for-bit.
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..48).collect();
        let pic = PictureInfo::new(4, 4, TextureFormat::Rgb8, PixelData::U8(data));

        let png_path = dir.path().join("a.png");
        write_picture(&png_path, &pic, &WriteOptions::default()).unwrap();
        let from_png = read_picture(&png_path, &ReadOptions::default()).unwrap();

        let tif_path = dir.path().join("a.tif");
        write_picture(&tif_path, &from_png, &WriteOptions::default()).unwrap();
        let from_tif = read_picture(&tif_path, &ReadOptions::default()).unwrap();

        assert_eq!(from_tif, pic);
    }
}
