//! TIFF reading and writing.
//!
//! Reads 8/16/32-bit unsigned and 32-bit float data with one to four
//! channels. Writes uncompressed, one row per strip, with the sample-format
//! tag chosen by the pixel storage (integer vs float).
//!
//! Grayscale expansion and vertical flip are fused into a single pass when
//! both are requested; a flip alone is a row-granularity swap.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use pic_core::{BitDepth, PictureInfo, PixelData, TextureFormat};
use pic_transfer::{flip_rows, triplicate_rows};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, TiffValue, colortype};

use crate::error::{PicError, PicResult};
use crate::{ReadOptions, WriteOptions};

pub(crate) fn read(path: &Path, opts: &ReadOptions) -> PicResult<PictureInfo> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let (width, height) = decoder.dimensions()?;
    if width == 0 || height == 0 {
        return Err(PicError::CorruptOrUnreadable(format!(
            "tiff has zero dimension: {width}x{height}"
        )));
    }
    let width = checked_dim(width)?;
    let height = checked_dim(height)?;
    let (w, h) = (width as usize, height as usize);

    let channels = match decoder.colortype()? {
        tiff::ColorType::Gray(_) => 1usize,
        tiff::ColorType::GrayA(_) => 2,
        tiff::ColorType::RGB(_) => 3,
        tiff::ColorType::RGBA(_) => 4,
        other => {
            return Err(PicError::UnsupportedChannelLayout(format!(
                "tiff color type {other:?}"
            )));
        }
    };

    match decoder.read_image()? {
        DecodingResult::U8(data) => {
            let (pixels, out_channels) = reshape(data, w, h, channels, opts);
            let format = format_for(out_channels, BitDepth::U8)?;
            Ok(PictureInfo::new(width, height, format, PixelData::U8(pixels)))
        }
        DecodingResult::U16(data) => {
            let (pixels, out_channels) = reshape(data, w, h, channels, opts);
            let format = format_for(out_channels, BitDepth::U16)?;
            Ok(PictureInfo::new(
                width,
                height,
                format,
                PixelData::U16(pixels),
            ))
        }
        DecodingResult::U32(data) => {
            // 32-bit unsigned lands in the float buffer bit-for-bit; the
            // canonical representation has no 32-bit integer storage.
            let data: Vec<f32> = data.into_iter().map(f32::from_bits).collect();
            let (pixels, out_channels) = reshape(data, w, h, channels, opts);
            let format = format_for(out_channels, BitDepth::U32)?;
            Ok(PictureInfo::new(
                width,
                height,
                format,
                PixelData::F32(pixels),
            ))
        }
        DecodingResult::F32(data) => {
            let (pixels, out_channels) = reshape(data, w, h, channels, opts);
            let format = format_for(out_channels, BitDepth::U32)?;
            Ok(PictureInfo::new(
                width,
                height,
                format,
                PixelData::F32(pixels),
            ))
        }
        _ => Err(PicError::UnsupportedChannelLayout(
            "unsupported tiff sample type".into(),
        )),
    }
}

/// Gray expansion fused with flip when both are requested; flip alone is a
/// row swap.
fn reshape<T: Copy>(
    mut samples: Vec<T>,
    w: usize,
    h: usize,
    channels: usize,
    opts: &ReadOptions,
) -> (Vec<T>, usize) {
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

    let channels = pic.channel_count();
    // No luminance-alpha colortype exists on the encode side.
    if channels == 2 {
        return Err(unsupported(pic));
    }

    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;

    match &pic.pixels {
        PixelData::U8(data) => match channels {
            1 => write_strips::<colortype::Gray8>(&mut encoder, pic, data, opts),
            3 => write_strips::<colortype::RGB8>(&mut encoder, pic, data, opts),
            4 => write_strips::<colortype::RGBA8>(&mut encoder, pic, data, opts),
            _ => Err(unsupported(pic)),
        },
        PixelData::U16(data) => match channels {
            1 => write_strips::<colortype::Gray16>(&mut encoder, pic, data, opts),
            3 => write_strips::<colortype::RGB16>(&mut encoder, pic, data, opts),
            4 => write_strips::<colortype::RGBA16>(&mut encoder, pic, data, opts),
            _ => Err(unsupported(pic)),
        },
        PixelData::F16(data) => {
            // Raw half bits under an integer sample tag; TIFF half-float
            // output is not supported by the encoder.
            let bits: Vec<u16> = data.iter().map(|v| v.to_bits()).collect();
            match channels {
                1 => write_strips::<colortype::Gray16>(&mut encoder, pic, &bits, opts),
                3 => write_strips::<colortype::RGB16>(&mut encoder, pic, &bits, opts),
                4 => write_strips::<colortype::RGBA16>(&mut encoder, pic, &bits, opts),
                _ => Err(unsupported(pic)),
            }
        }
        PixelData::F32(data) => match channels {
            1 => write_strips::<colortype::Gray32Float>(&mut encoder, pic, data, opts),
            3 => write_strips::<colortype::RGB32Float>(&mut encoder, pic, data, opts),
            4 => write_strips::<colortype::RGBA32Float>(&mut encoder, pic, data, opts),
            _ => Err(unsupported(pic)),
        },
    }
}

/// One row per strip; a flipped write walks the source backward while the
/// strips go out in forward order.
fn write_strips<C>(
    encoder: &mut TiffEncoder<BufWriter<File>>,
    pic: &PictureInfo,
    data: &[C::Inner],
    opts: &WriteOptions,
) -> PicResult<()>
where
    C: colortype::ColorType,
    [C::Inner]: TiffValue,
{
    let row = pic.width as usize * pic.channel_count() as usize;
    let height = pic.height as usize;

    let mut image = encoder.new_image::<C>(pic.width as u32, pic.height as u32)?;
    image.rows_per_strip(1)?;
    for y in 0..height {
        let src_y = if opts.flip_vertically { height - 1 - y } else { y };
        image.write_strip(&data[src_y * row..(src_y + 1) * row])?;
    }
    image.finish()?;
    Ok(())
}

fn unsupported(pic: &PictureInfo) -> PicError {
    PicError::UnsupportedWriteCombination {
        format: pic.format.to_string(),
        container: "tiff",
    }
}

fn format_for(channels: usize, depth: BitDepth) -> PicResult<TextureFormat> {
    TextureFormat::from_parts(channels as u8, depth).ok_or_else(|| {
        PicError::UnsupportedChannelLayout(format!("tiff with {channels} channels"))
    })
}

fn checked_dim(dim: u32) -> PicResult<u16> {
    u16::try_from(dim)
        .map_err(|_| PicError::CorruptOrUnreadable(format!("dimension {dim} exceeds 65535")))
}
