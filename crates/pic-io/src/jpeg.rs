//! JPEG reading and writing.
//!
//! 8-bit only on both sides. Reads luminance, RGB, and CMYK sources;
//! 16-bit luminance is reduced to its high byte. Writes at maximum quality,
//! capping the channel count at three (alpha is discarded).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use jpeg_decoder::PixelFormat;
use jpeg_encoder::{ColorType, Encoder};
use pic_core::{BitDepth, PictureInfo, PixelData, TextureFormat};
use pic_transfer::{flip_rows, triplicate_rows};

use crate::error::{PicError, PicResult};
use crate::{ReadOptions, WriteOptions};

const QUALITY: u8 = 100;

pub(crate) fn read(path: &Path, opts: &ReadOptions) -> PicResult<PictureInfo> {
    let file = File::open(path)?;
    let mut decoder = jpeg_decoder::Decoder::new(BufReader::new(file));
    let data = decoder.decode()?;
    let info = decoder
        .info()
        .ok_or_else(|| PicError::CorruptOrUnreadable("jpeg carries no image info".into()))?;

    let (width, height) = (info.width, info.height);
    let (w, h) = (width as usize, height as usize);

    let (gray, rgb): (Option<Vec<u8>>, Option<Vec<u8>>) = match info.pixel_format {
        PixelFormat::L8 => (Some(data), None),
        PixelFormat::L16 => {
            // Big-endian pairs; keep the high byte.
            (Some(data.chunks_exact(2).map(|c| c[0]).collect()), None)
        }
        PixelFormat::RGB24 => (None, Some(data)),
        PixelFormat::CMYK32 => (None, Some(cmyk_to_rgb(&data))),
    };

    if let Some(gray) = gray {
        if opts.gray_to_rgb {
            let pixels = triplicate_rows(&gray, w, h, opts.flip_vertically);
            return Ok(PictureInfo::new(
                width,
                height,
                TextureFormat::Rgb8,
                PixelData::U8(pixels),
            ));
        }
        let mut pixels = gray;
        if opts.flip_vertically {
            flip_rows(&mut pixels, w);
        }
        return Ok(PictureInfo::new(
            width,
            height,
            TextureFormat::R8,
            PixelData::U8(pixels),
        ));
    }

    let mut pixels = rgb.unwrap_or_default();
    if opts.flip_vertically {
        flip_rows(&mut pixels, w * 3);
    }
    Ok(PictureInfo::new(
        width,
        height,
        TextureFormat::Rgb8,
        PixelData::U8(pixels),
    ))
}

fn cmyk_to_rgb(data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(data.len() / 4 * 3);
    for px in data.chunks_exact(4) {
        let c = px[0] as f32 / 255.0;
        let m = px[1] as f32 / 255.0;
        let y = px[2] as f32 / 255.0;
        let k = px[3] as f32 / 255.0;
        rgb.push(((1.0 - c) * (1.0 - k) * 255.0) as u8);
        rgb.push(((1.0 - m) * (1.0 - k) * 255.0) as u8);
        rgb.push(((1.0 - y) * (1.0 - k) * 255.0) as u8);
    }
    rgb
}

pub(crate) fn write(path: &Path, pic: &PictureInfo, opts: &WriteOptions) -> PicResult<()> {
    pic.validate()?;

    if pic.format.bit_depth() == BitDepth::U32 {
        return Err(unsupported(pic));
    }
    let channels = pic.channel_count() as usize;
    if channels == 2 {
        return Err(unsupported(pic));
    }
    // Lossy output has no alpha semantic.
    let out_channels = channels.min(3);

    let mut data = match &pic.pixels {
        PixelData::U8(data) => drop_alpha(data, channels, out_channels),
        PixelData::U16(data) => down_convert(data, channels, out_channels),
        PixelData::F16(data) => {
            let bits: Vec<u16> = data.iter().map(|v| v.to_bits()).collect();
            down_convert(&bits, channels, out_channels)
        }
        PixelData::F32(_) => return Err(unsupported(pic)),
    };

    if opts.flip_vertically {
        flip_rows(&mut data, pic.width as usize * out_channels);
    }

    let color_type = if out_channels == 1 {
        ColorType::Luma
    } else {
        ColorType::Rgb
    };
    let encoder = Encoder::new_file(path, QUALITY)?;
    encoder.encode(&data, pic.width, pic.height, color_type)?;
    Ok(())
}

fn drop_alpha(data: &[u8], channels: usize, out_channels: usize) -> Vec<u8> {
    if channels == out_channels {
        return data.to_vec();
    }
    data.chunks_exact(channels)
        .flat_map(|px| px[..out_channels].iter().copied())
        .collect()
}

/// 16-bit samples shrink by a plain division by 255. That keeps only a
/// 256th of the source range; callers storing full-range 16-bit data will
/// see mostly-white output. Kept as-is for parity with existing assets.
fn down_convert(data: &[u16], channels: usize, out_channels: usize) -> Vec<u8> {
    tracing::debug!("writing 16-bit samples to jpeg via divide-by-255 reduction");
    data.chunks_exact(channels)
        .flat_map(|px| {
            px[..out_channels]
                .iter()
                .map(|&v| (v / 255).min(255) as u8)
        })
        .collect()
}

fn unsupported(pic: &PictureInfo) -> PicError {
    PicError::UnsupportedWriteCombination {
        format: pic.format.to_string(),
        container: "jpeg",
    }
}
