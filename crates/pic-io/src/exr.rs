//! OpenEXR reading and writing.
//!
//! Channel detection follows a strict precedence chain: an "R" channel makes
//! the file color (G, B, A each only considered if the previous link exists);
//! without "R" a luminance channel named "Y" then "Z" is used as grayscale.
//! Color channels must share one sample type; alpha is exempt and converted
//! to the buffer's type during the copy. Unsigned-integer channels are
//! rejected outright.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use ::exr::prelude::{
    AnyChannel, AnyChannels, FlatSamples, Image, ReadChannels, ReadLayers, WritableImage, read,
};
use half::f16;
use pic_core::{BitDepth, PictureInfo, PixelData, TextureFormat};
use pic_transfer::{linear_to_srgb, srgb_to_linear};
use smallvec::SmallVec;

use crate::error::{PicError, PicResult};
use crate::{ReadOptions, WriteOptions};

const EXR_MAGIC: [u8; 4] = [0x76, 0x2f, 0x31, 0x01];

/// Sample type shared by the color channels.
#[derive(Clone, Copy, PartialEq, Eq)]
enum SampleKind {
    Half,
    Float,
}

pub(crate) fn read_file(path: &Path, opts: &ReadOptions) -> PicResult<PictureInfo> {
    check_magic(path)?;

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .all_channels()
        .first_valid_layer()
        .all_attributes()
        .from_file(path)?;
    let layer = &image.layer_data;

    let width = checked_dim(layer.size.0)?;
    let height = checked_dim(layer.size.1)?;
    let (w, h) = (layer.size.0, layer.size.1);

    let find = |name: &str| {
        layer
            .channel_data
            .list
            .iter()
            .find(|c| c.name.to_string() == name)
    };

    // R gates G gates B gates A; without R fall back to Y then Z grayscale.
    let mut chain: Vec<&FlatSamples> = Vec::with_capacity(4);
    if let Some(r) = find("R") {
        chain.push(&r.sample_data);
        if let Some(g) = find("G") {
            chain.push(&g.sample_data);
            if let Some(b) = find("B") {
                chain.push(&b.sample_data);
                if let Some(a) = find("A") {
                    chain.push(&a.sample_data);
                }
            }
        }
    } else if let Some(luma) = find("Y").or_else(|| find("Z")) {
        let samples = &luma.sample_data;
        if opts.gray_to_rgb {
            chain.extend([samples, samples, samples]);
        } else {
            chain.push(samples);
        }
    } else {
        return Err(PicError::UnsupportedChannelLayout(
            "exr has neither R nor Y/Z channel".into(),
        ));
    }

    // Color channels must agree on one sample type; alpha may differ and is
    // converted while copying.
    let color_count = chain.len().min(3);
    let mut kind = None;
    for samples in &chain[..color_count] {
        let this = sample_kind(samples)?;
        match kind {
            None => kind = Some(this),
            Some(k) if k == this => {}
            Some(_) => {
                return Err(PicError::UnsupportedChannelLayout(
                    "exr color channels have inconsistent bit depth".into(),
                ));
            }
        }
    }
    if let Some(alpha) = chain.get(3) {
        sample_kind(alpha)?;
    }
    let kind = kind.unwrap_or(SampleKind::Float);

    let channels = chain.len();
    let mut out = Vec::with_capacity(w * h * channels);
    for y in 0..h {
        let src_y = if opts.flip_vertically { h - 1 - y } else { y };
        for x in 0..w {
            let i = src_y * w + x;
            for samples in &chain {
                let mut v = sample_f32(samples, i);
                if opts.hdr_to_srgb {
                    v = linear_to_srgb(v);
                }
                out.push(v);
            }
        }
    }

    let (format, pixels) = match kind {
        SampleKind::Half => (
            format_for(channels, BitDepth::U16)?,
            PixelData::F16(out.into_iter().map(f16::from_f32).collect()),
        ),
        SampleKind::Float => (format_for(channels, BitDepth::U32)?, PixelData::F32(out)),
    };
    Ok(PictureInfo::new(width, height, format, pixels))
}

fn sample_kind(samples: &FlatSamples) -> PicResult<SampleKind> {
    match samples {
        FlatSamples::F16(_) => Ok(SampleKind::Half),
        FlatSamples::F32(_) => Ok(SampleKind::Float),
        FlatSamples::U32(_) => Err(PicError::UnsupportedChannelLayout(
            "exr unsigned integer channels are not supported".into(),
        )),
    }
}

fn sample_f32(samples: &FlatSamples, i: usize) -> f32 {
    match samples {
        FlatSamples::F16(v) => v[i].to_f32(),
        FlatSamples::F32(v) => v[i],
        FlatSamples::U32(v) => v[i] as f32,
    }
}

pub(crate) fn write(path: &Path, pic: &PictureInfo, opts: &WriteOptions) -> PicResult<()> {
    pic.validate()?;

    let (w, h) = (pic.width as usize, pic.height as usize);
    let channels = pic.channel_count() as usize;
    let names = ["R", "G", "B", "A"];

    let mut list: SmallVec<[AnyChannel<FlatSamples>; 4]> = SmallVec::new();
    for (c, name) in names.iter().enumerate().take(channels) {
        let plane = extract_plane(pic, c, opts);
        list.push(AnyChannel::new(*name, plane));
    }

    let image = Image::from_channels((w, h), AnyChannels::sort(list));
    image.write().to_file(path)?;
    Ok(())
}

/// Pulls one channel out of the interleaved buffer, flipping rows and
/// applying the sRGB-to-linear conversion as requested. 8-bit sources are
/// promoted to half (the container has no 8-bit sample type); 16-bit
/// integer sources are reinterpreted as half bits.
fn extract_plane(pic: &PictureInfo, c: usize, opts: &WriteOptions) -> FlatSamples {
    let (w, h) = (pic.width as usize, pic.height as usize);
    let channels = pic.channel_count() as usize;
    let index = |x: usize, y: usize| {
        let src_y = if opts.flip_vertically { h - 1 - y } else { y };
        (src_y * w + x) * channels + c
    };

    let to_linear = |v: f32| {
        if opts.hdr_to_linear {
            srgb_to_linear(v)
        } else {
            v
        }
    };

    match &pic.pixels {
        PixelData::U8(data) => {
            // Raw byte value promoted to half without normalization.
            let mut plane = Vec::with_capacity(w * h);
            for y in 0..h {
                for x in 0..w {
                    plane.push(f16::from_f32(to_linear(data[index(x, y)] as f32)));
                }
            }
            FlatSamples::F16(plane)
        }
        PixelData::U16(data) => {
            let mut plane = Vec::with_capacity(w * h);
            for y in 0..h {
                for x in 0..w {
                    let v = f16::from_bits(data[index(x, y)]);
                    plane.push(if opts.hdr_to_linear {
                        f16::from_f32(srgb_to_linear(v.to_f32()))
                    } else {
                        v
                    });
                }
            }
            FlatSamples::F16(plane)
        }
        PixelData::F16(data) => {
            let mut plane = Vec::with_capacity(w * h);
            for y in 0..h {
                for x in 0..w {
                    let v = data[index(x, y)];
                    plane.push(if opts.hdr_to_linear {
                        f16::from_f32(srgb_to_linear(v.to_f32()))
                    } else {
                        v
                    });
                }
            }
            FlatSamples::F16(plane)
        }
        PixelData::F32(data) => {
            let mut plane = Vec::with_capacity(w * h);
            for y in 0..h {
                for x in 0..w {
                    plane.push(to_linear(data[index(x, y)]));
                }
            }
            FlatSamples::F32(plane)
        }
    }
}

fn check_magic(path: &Path) -> PicResult<()> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if magic != EXR_MAGIC {
        return Err(PicError::CorruptOrUnreadable(
            "exr magic bytes not found".into(),
        ));
    }
    Ok(())
}

fn format_for(channels: usize, depth: BitDepth) -> PicResult<TextureFormat> {
    TextureFormat::from_parts(channels as u8, depth).ok_or_else(|| {
        PicError::UnsupportedChannelLayout(format!("exr with {channels} channels"))
    })
}

fn checked_dim(dim: usize) -> PicResult<u16> {
    u16::try_from(dim)
        .map_err(|_| PicError::CorruptOrUnreadable(format!("dimension {dim} exceeds 65535")))
}
