//! KTX2 (Khronos Texture 2.0) writing.
//!
//! Produces a single-level, non-supercompressed 2D texture: 80-byte header,
//! one 24-byte level index entry, a basic data format descriptor, then the
//! tightly packed pixel payload. No mip chain is ever generated. There is no
//! read path.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use pic_core::{BitDepth, PictureInfo, PixelData};
use pic_transfer::flip_rows;

use crate::WriteOptions;
use crate::error::PicResult;

const KTX2_IDENTIFIER: [u8; 12] = [
    0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
];

const HEADER_SIZE: usize = 80;
const LEVEL_ENTRY_SIZE: usize = 24;

// KHR_DF sample flags and channel ids.
const DF_SAMPLE_FLOAT: u8 = 0x80;
const DF_SAMPLE_SIGNED: u8 = 0x40;
const DF_CHANNEL_ALPHA: u8 = 15;

pub(crate) fn write(path: &Path, pic: &PictureInfo, opts: &WriteOptions) -> PicResult<()> {
    pic.validate()?;

    let vk_format = vk_format(pic);
    let channels = pic.channel_count() as usize;
    let type_size = pic.format.bit_depth().bytes_per_channel();
    let texel_size = pic.format.bytes_per_pixel();
    let (w, h) = (pic.width as usize, pic.height as usize);

    let dfd = build_dfd(pic);
    let dfd_offset = HEADER_SIZE + LEVEL_ENTRY_SIZE;
    // Non-supercompressed level data is aligned to lcm(texel size, 4).
    let align = lcm(texel_size, 4);
    let level_offset = (dfd_offset + dfd.len()).div_ceil(align) * align;
    let level_length = w * h * texel_size;

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    out.write_all(&KTX2_IDENTIFIER)?;
    out.write_u32::<LittleEndian>(vk_format)?;
    out.write_u32::<LittleEndian>(type_size as u32)?;
    out.write_u32::<LittleEndian>(pic.width as u32)?;
    out.write_u32::<LittleEndian>(pic.height as u32)?;
    out.write_u32::<LittleEndian>(0)?; // pixelDepth
    out.write_u32::<LittleEndian>(0)?; // layerCount
    out.write_u32::<LittleEndian>(1)?; // faceCount
    out.write_u32::<LittleEndian>(1)?; // levelCount
    out.write_u32::<LittleEndian>(0)?; // supercompressionScheme
    out.write_u32::<LittleEndian>(dfd_offset as u32)?;
    out.write_u32::<LittleEndian>(dfd.len() as u32)?;
    out.write_u32::<LittleEndian>(0)?; // kvdByteOffset
    out.write_u32::<LittleEndian>(0)?; // kvdByteLength
    out.write_u64::<LittleEndian>(0)?; // sgdByteOffset
    out.write_u64::<LittleEndian>(0)?; // sgdByteLength

    out.write_u64::<LittleEndian>(level_offset as u64)?;
    out.write_u64::<LittleEndian>(level_length as u64)?;
    out.write_u64::<LittleEndian>(level_length as u64)?;

    out.write_all(&dfd)?;
    let padding = level_offset - dfd_offset - dfd.len();
    out.write_all(&vec![0u8; padding])?;

    write_payload(&mut out, pic, w, channels, opts)?;
    out.flush()?;
    Ok(())
}

/// VkFormat for the picture's channel count, depth, and half-float flag.
fn vk_format(pic: &PictureInfo) -> u32 {
    let step = u32::from(pic.channel_count().saturating_sub(1));
    match (pic.format.bit_depth(), pic.is_half_float()) {
        // The 8-bit UNORM family is irregular (BGR variants sit between
        // RGB and RGBA), so it gets an explicit table.
        (BitDepth::U8, _) => match pic.channel_count() {
            1 => 9,  // VK_FORMAT_R8_UNORM
            2 => 16, // VK_FORMAT_R8G8_UNORM
            3 => 23, // VK_FORMAT_R8G8B8_UNORM
            _ => 37, // VK_FORMAT_R8G8B8A8_UNORM
        },
        (BitDepth::U16, false) => 70 + step * 7, // VK_FORMAT_R16_UNORM family
        (BitDepth::U16, true) => 76 + step * 7,  // VK_FORMAT_R16_SFLOAT family
        (BitDepth::U32, _) => 100 + step * 3,    // VK_FORMAT_R32_SFLOAT family
    }
}

/// Basic data format descriptor: one block, one sample per channel.
fn build_dfd(pic: &PictureInfo) -> Vec<u8> {
    let channels = pic.channel_count() as usize;
    let bits = (pic.format.bit_depth().bytes_per_channel() * 8) as u8;
    let is_float = matches!(pic.pixels, PixelData::F16(_) | PixelData::F32(_));
    let block_size = 24 + 16 * channels;

    let mut dfd = Vec::with_capacity(4 + block_size);
    dfd.extend_from_slice(&((4 + block_size) as u32).to_le_bytes());
    dfd.extend_from_slice(&0u32.to_le_bytes()); // vendor 0, descriptor type 0
    dfd.extend_from_slice(&(2u32 | ((block_size as u32) << 16)).to_le_bytes());
    dfd.push(1); // colorModel: RGBSDA
    dfd.push(1); // colorPrimaries: BT709
    dfd.push(1); // transferFunction: linear
    dfd.push(0); // flags: alpha straight
    dfd.extend_from_slice(&[0; 4]); // texelBlockDimension, 1x1x1x1
    dfd.push(pic.format.bytes_per_pixel() as u8); // bytesPlane0
    dfd.extend_from_slice(&[0; 7]); // bytesPlane1-7

    for c in 0..channels {
        let channel_id = if channels == 4 && c == 3 {
            DF_CHANNEL_ALPHA
        } else {
            c as u8
        };
        let qualifiers = if is_float {
            DF_SAMPLE_FLOAT | DF_SAMPLE_SIGNED
        } else {
            0
        };
        dfd.extend_from_slice(&((c * bits as usize) as u16).to_le_bytes());
        dfd.push(bits - 1);
        dfd.push(channel_id | qualifiers);
        dfd.extend_from_slice(&[0; 4]); // samplePosition
        let (lower, upper) = if is_float {
            ((-1f32).to_bits(), 1f32.to_bits())
        } else {
            (0, (1u64 << bits) as u32 - 1)
        };
        dfd.extend_from_slice(&lower.to_le_bytes());
        dfd.extend_from_slice(&upper.to_le_bytes());
    }
    dfd
}

fn write_payload<W: Write>(
    out: &mut W,
    pic: &PictureInfo,
    w: usize,
    channels: usize,
    opts: &WriteOptions,
) -> PicResult<()> {
    let row = w * channels;
    match &pic.pixels {
        PixelData::U8(data) => {
            let mut data = data.clone();
            if opts.flip_vertically {
                flip_rows(&mut data, row);
            }
            out.write_all(&data)?;
        }
        PixelData::U16(data) => {
            let mut data = data.clone();
            if opts.flip_vertically {
                flip_rows(&mut data, row);
            }
            for v in data {
                out.write_u16::<LittleEndian>(v)?;
            }
        }
        PixelData::F16(data) => {
            let mut data = data.clone();
            if opts.flip_vertically {
                flip_rows(&mut data, row);
            }
            for v in data {
                out.write_u16::<LittleEndian>(v.to_bits())?;
            }
        }
        PixelData::F32(data) => {
            let mut data = data.clone();
            if opts.flip_vertically {
                flip_rows(&mut data, row);
            }
            for v in data {
                out.write_f32::<LittleEndian>(v)?;
            }
        }
    }
    Ok(())
}

fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 { a } else { gcd(b, a % b) }
}
