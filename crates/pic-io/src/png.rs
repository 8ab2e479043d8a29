//! PNG reading and writing.
//!
//! Palette and sub-8-bit images are expanded to 8-bit on decode. 16-bit
//! samples are big-endian on the wire; they are byte-swapped through the
//! shared transfer utility after decode and again before encode.
//! Compression is disabled on write for deterministic round-trips.
//!
//! # Example
//!
//! ```rust,ignore
//! use pic_io::{ReadOptions, read_picture};
//!
//! let pic = read_picture("albedo.png", &ReadOptions::default())?;
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use pic_core::{BitDepth, PictureInfo, PixelData, TextureFormat};
use pic_transfer::{flip_rows, swap_bytes_u16, triplicate_rows};

use crate::error::{PicError, PicResult};
use crate::{ReadOptions, WriteOptions};

pub(crate) fn read(path: &Path, opts: &ReadOptions) -> PicResult<PictureInfo> {
    let file = File::open(path)?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND);
    let mut reader = decoder.read_info()?;

    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| PicError::CorruptOrUnreadable("cannot size png output buffer".into()))?;
    let mut buf = vec![0u8; buf_size];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let width = checked_dim(info.width)?;
    let height = checked_dim(info.height)?;
    let (w, h) = (width as usize, height as usize);

    // EXPAND leaves 8- or 16-bit gray, gray+alpha, RGB, or RGBA.
    let channels: usize = match info.color_type {
        png::ColorType::Grayscale => 1,
        png::ColorType::GrayscaleAlpha => 2,
        png::ColorType::Rgb => 3,
        png::ColorType::Rgba => 4,
        other => {
            return Err(PicError::UnsupportedChannelLayout(format!(
                "png color type {other:?}"
            )));
        }
    };

    match info.bit_depth {
        png::BitDepth::Eight => {
            let (pixels, out_channels) = reshape(buf, w, h, channels, opts);
            let format = format_for(out_channels, BitDepth::U8)?;
            Ok(PictureInfo::new(width, height, format, PixelData::U8(pixels)))
        }
        png::BitDepth::Sixteen => {
            let mut samples = bytes_to_u16(&buf);
            swap_bytes_u16(&mut samples);
            let (pixels, out_channels) = reshape(samples, w, h, channels, opts);
            let format = format_for(out_channels, BitDepth::U16)?;
            Ok(PictureInfo::new(
                width,
                height,
                format,
                PixelData::U16(pixels),
            ))
        }
        other => Err(PicError::UnsupportedChannelLayout(format!(
            "png bit depth {other:?}"
        ))),
    }
}

/// Applies the gray/alpha/flip layout rules shared by both bit depths:
/// gray+alpha drops alpha, gray expands to RGB when requested, and the
/// expansion is fused with the flip. Returns the samples and the output
/// channel count.
fn reshape<T: Copy>(
    samples: Vec<T>,
    w: usize,
    h: usize,
    channels: usize,
    opts: &ReadOptions,
) -> (Vec<T>, usize) {
    let (mut samples, channels) = match channels {
        2 => (
            samples.iter().step_by(2).copied().collect::<Vec<T>>(),
            1,
        ),
        n => (samples, n),
    };
    if channels == 1 && opts.gray_to_rgb {
        return (
            triplicate_rows(&samples, w, h, opts.flip_vertically),
            3,
        );
    }
    if opts.flip_vertically {
        flip_rows(&mut samples, w * channels);
    }
    (samples, channels)
}

pub(crate) fn write(path: &Path, pic: &PictureInfo, opts: &WriteOptions) -> PicResult<()> {
    pic.validate()?;

    let depth = pic.format.bit_depth();
    if depth == BitDepth::U32 {
        return Err(unsupported(pic));
    }
    let color_type = match pic.channel_count() {
        1 => png::ColorType::Grayscale,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        _ => return Err(unsupported(pic)),
    };

    let row = pic.width as usize * pic.channel_count() as usize;
    let bytes = match &pic.pixels {
        PixelData::U8(data) => {
            let mut data = data.clone();
            if opts.flip_vertically {
                flip_rows(&mut data, row);
            }
            data
        }
        PixelData::U16(data) => u16_rows_to_bytes(data.clone(), row, opts),
        PixelData::F16(data) => {
            // Raw half bits; the container has no float sample type.
            let bits: Vec<u16> = data.iter().map(|v| v.to_bits()).collect();
            u16_rows_to_bytes(bits, row, opts)
        }
        PixelData::F32(_) => return Err(unsupported(pic)),
    };

    let file = File::create(path)?;
    let mut encoder = png::Encoder::new(BufWriter::new(file), pic.width as u32, pic.height as u32);
    encoder.set_color(color_type);
    encoder.set_depth(match depth {
        BitDepth::U8 => png::BitDepth::Eight,
        _ => png::BitDepth::Sixteen,
    });
    encoder.set_compression(png::Compression::NoCompression);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&bytes)?;
    Ok(())
}

fn u16_rows_to_bytes(mut samples: Vec<u16>, row: usize, opts: &WriteOptions) -> Vec<u8> {
    if opts.flip_vertically {
        flip_rows(&mut samples, row);
    }
    swap_bytes_u16(&mut samples);
    samples.iter().flat_map(|s| s.to_ne_bytes()).collect()
}

fn unsupported(pic: &PictureInfo) -> PicError {
    PicError::UnsupportedWriteCombination {
        format: pic.format.to_string(),
        container: "png",
    }
}

fn format_for(channels: usize, depth: BitDepth) -> PicResult<TextureFormat> {
    TextureFormat::from_parts(channels as u8, depth).ok_or_else(|| {
        PicError::UnsupportedChannelLayout(format!("png with {channels} channels"))
    })
}

fn checked_dim(dim: u32) -> PicResult<u16> {
    u16::try_from(dim)
        .map_err(|_| PicError::CorruptOrUnreadable(format!("dimension {dim} exceeds 65535")))
}

fn bytes_to_u16(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_rgb(width: u16, height: u16) -> PictureInfo {
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                data.push((x * 8) as u8);
                data.push((y * 8) as u8);
                data.push(128);
            }
        }
        PictureInfo::new(width, height, TextureFormat::Rgb8, PixelData::U8(data))
    }

    #[test]
    fn roundtrip_rgb8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        let pic = gradient_rgb(32, 32);

        write(&path, &pic, &WriteOptions::default()).unwrap();
        let loaded = read(&path, &ReadOptions::default()).unwrap();

        assert_eq!(loaded, pic);
    }

    #[test]
    fn roundtrip_gray16() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let data: Vec<u16> = (0..64u16).map(|i| i * 1000).collect();
        let pic = PictureInfo::new(8, 8, TextureFormat::R16, PixelData::U16(data));

        write(&path, &pic, &WriteOptions::default()).unwrap();
        let loaded = read(&path, &ReadOptions::default()).unwrap();

        assert_eq!(loaded, pic);
    }

    #[test]
    fn gray_expands_to_rgb_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray_rgb.png");
        let pic = PictureInfo::new(2, 2, TextureFormat::R8, PixelData::U8(vec![10, 20, 30, 40]));

        write(&path, &pic, &WriteOptions::default()).unwrap();
        let opts = ReadOptions {
            gray_to_rgb: true,
            ..Default::default()
        };
        let loaded = read(&path, &opts).unwrap();

        assert_eq!(loaded.format, TextureFormat::Rgb8);
        assert_eq!(
            loaded.pixels,
            PixelData::U8(vec![10, 10, 10, 20, 20, 20, 30, 30, 30, 40, 40, 40])
        );
    }

    #[test]
    fn flip_on_read_reverses_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flip.png");
        let pic = PictureInfo::new(1, 4, TextureFormat::R8, PixelData::U8(vec![1, 2, 3, 4]));

        write(&path, &pic, &WriteOptions::default()).unwrap();
        let opts = ReadOptions {
            flip_vertically: true,
            ..Default::default()
        };
        let loaded = read(&path, &opts).unwrap();

        assert_eq!(loaded.pixels, PixelData::U8(vec![4, 3, 2, 1]));
    }

    #[test]
    fn write_rejects_two_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rg.png");
        let pic = PictureInfo::new(1, 1, TextureFormat::Rg8, PixelData::U8(vec![0, 0]));

        let err = write(&path, &pic, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, PicError::UnsupportedWriteCombination { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn write_rejects_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f32.png");
        let pic = PictureInfo::new(1, 1, TextureFormat::Rgb32, PixelData::F32(vec![0.0; 3]));

        let err = write(&path, &pic, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, PicError::UnsupportedWriteCombination { .. }));
    }

    #[test]
    fn write_rejects_invalid_picture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        let pic = PictureInfo::new(0, 4, TextureFormat::R8, PixelData::U8(vec![]));

        let err = write(&path, &pic, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, PicError::InvalidPictureInfo(_)));
    }
}
