//! Radiance HDR (RGBE) reading and writing.
//!
//! Only 32-bit float RGB crosses this boundary: reads always produce three
//! float channels, and writes reject anything narrower than 32 bits or with
//! a two-channel layout. Scanlines use RLE when the width allows it.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use pic_core::{BitDepth, PictureInfo, PixelData, TextureFormat};
use pic_transfer::{flip_rows, linear_to_srgb_slice, srgb_to_linear_slice, triplicate_rows};

use crate::error::{PicError, PicResult};
use crate::{ReadOptions, WriteOptions};

const HDR_MAGIC: &str = "#?";

pub(crate) fn read(path: &Path, opts: &ReadOptions) -> PicResult<PictureInfo> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let (width, height) = read_header(&mut reader)?;
    let mut data = read_pixels(&mut reader, width as usize, height as usize)?;

    if opts.hdr_to_srgb {
        linear_to_srgb_slice(&mut data);
    }
    if opts.flip_vertically {
        flip_rows(&mut data, width as usize * 3);
    }

    Ok(PictureInfo::new(
        width,
        height,
        TextureFormat::Rgb32,
        PixelData::F32(data),
    ))
}

pub(crate) fn write(path: &Path, pic: &PictureInfo, opts: &WriteOptions) -> PicResult<()> {
    pic.validate()?;

    if pic.format.bit_depth() != BitDepth::U32 || pic.channel_count() == 2 {
        return Err(PicError::UnsupportedWriteCombination {
            format: pic.format.to_string(),
            container: "hdr",
        });
    }
    let PixelData::F32(data) = &pic.pixels else {
        // validate() pins the F32 variant to the 32-bit group.
        return Err(PicError::InvalidPictureInfo(pic_core::CoreError::StorageMismatch {
            format: pic.format.to_string(),
        }));
    };

    let (w, h) = (pic.width as usize, pic.height as usize);
    // Private RGB copy: gray triplicated, alpha dropped; the caller's buffer
    // is never touched.
    let mut rgb: Vec<f32> = match pic.channel_count() {
        1 => triplicate_rows(data, w, h, false),
        3 => data.clone(),
        _ => data
            .chunks_exact(4)
            .flat_map(|px| px[..3].iter().copied())
            .collect(),
    };

    if opts.hdr_to_linear {
        srgb_to_linear_slice(&mut rgb);
    }
    if opts.flip_vertically {
        flip_rows(&mut rgb, w * 3);
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{HDR_MAGIC}RADIANCE")?;
    writeln!(writer, "FORMAT=32-bit_rle_rgbe")?;
    writeln!(writer)?;
    writeln!(writer, "-Y {} +X {}", pic.height, pic.width)?;
    write_pixels(&mut writer, &rgb, w, h)?;
    Ok(())
}

fn read_header<R: BufRead>(reader: &mut R) -> PicResult<(u16, u16)> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if !trim_line(&line).starts_with(HDR_MAGIC) {
        return Err(PicError::CorruptOrUnreadable("hdr magic not found".into()));
    }

    loop {
        line.clear();
        let bytes = reader.read_line(&mut line)?;
        if bytes == 0 {
            return Err(PicError::CorruptOrUnreadable(
                "hdr resolution line missing".into(),
            ));
        }
        let line = trim_line(&line);
        if line.is_empty() || line.starts_with('#') || line.contains('=') {
            continue;
        }
        if line.starts_with('+') || line.starts_with('-') {
            return parse_resolution(line)
                .ok_or_else(|| PicError::CorruptOrUnreadable("invalid hdr resolution".into()));
        }
    }
}

fn parse_resolution(line: &str) -> Option<(u16, u16)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 {
        return None;
    }

    let mut width = 0u16;
    let mut height = 0u16;
    for i in (0..4).step_by(2) {
        let axis = parts[i];
        let value: u16 = parts.get(i + 1)?.parse().ok()?;
        if axis.ends_with('X') {
            width = value;
        } else if axis.ends_with('Y') {
            height = value;
        }
    }

    (width > 0 && height > 0).then_some((width, height))
}

fn read_pixels<R: Read>(reader: &mut R, width: usize, height: usize) -> PicResult<Vec<f32>> {
    let mut first = [0u8; 4];
    reader.read_exact(&mut first)?;

    let use_rle = (8..=0x7fff).contains(&width)
        && first[0] == 2
        && first[1] == 2
        && ((first[2] as usize) << 8 | first[3] as usize) == width;

    let mut rgbe = vec![0u8; width * height * 4];

    if use_rle {
        let mut scanline = vec![0u8; width * 4];
        decode_rle_scanline(reader, width, &mut scanline, first)?;
        rgbe[0..width * 4].copy_from_slice(&scanline);

        for y in 1..height {
            let mut header = [0u8; 4];
            reader.read_exact(&mut header)?;
            decode_rle_scanline(reader, width, &mut scanline, header)?;
            let offset = y * width * 4;
            rgbe[offset..offset + width * 4].copy_from_slice(&scanline);
        }
    } else {
        rgbe[0..4].copy_from_slice(&first);
        reader.read_exact(&mut rgbe[4..])?;
    }

    let mut data = Vec::with_capacity(width * height * 3);
    for chunk in rgbe.chunks_exact(4) {
        let (r, g, b) = rgbe_to_f32(chunk[0], chunk[1], chunk[2], chunk[3]);
        data.push(r);
        data.push(g);
        data.push(b);
    }
    Ok(data)
}

fn decode_rle_scanline<R: Read>(
    reader: &mut R,
    width: usize,
    out: &mut [u8],
    header: [u8; 4],
) -> PicResult<()> {
    if header[0] != 2 || header[1] != 2 {
        return Err(PicError::CorruptOrUnreadable("hdr rle header invalid".into()));
    }
    let encoded_width = ((header[2] as usize) << 8) | (header[3] as usize);
    if encoded_width != width {
        return Err(PicError::CorruptOrUnreadable(
            "hdr rle width mismatch".into(),
        ));
    }

    let mut channel = vec![0u8; width];
    for c in 0..4 {
        let mut idx = 0usize;
        while idx < width {
            let mut count = [0u8; 1];
            reader.read_exact(&mut count)?;
            let count = count[0] as usize;
            if count > 128 {
                let run = count - 128;
                if idx + run > width {
                    return Err(PicError::CorruptOrUnreadable("hdr rle overrun".into()));
                }
                let mut value = [0u8; 1];
                reader.read_exact(&mut value)?;
                channel[idx..idx + run].fill(value[0]);
                idx += run;
            } else {
                if idx + count > width {
                    return Err(PicError::CorruptOrUnreadable("hdr rle overrun".into()));
                }
                reader.read_exact(&mut channel[idx..idx + count])?;
                idx += count;
            }
        }
        for x in 0..width {
            out[x * 4 + c] = channel[x];
        }
    }
    Ok(())
}

fn write_pixels<W: Write>(writer: &mut W, rgb: &[f32], width: usize, height: usize) -> PicResult<()> {
    let use_rle = (8..=0x7fff).contains(&width);
    let mut scanline = vec![0u8; width * 4];

    for y in 0..height {
        for x in 0..width {
            let base = (y * width + x) * 3;
            let rgbe = f32_to_rgbe(rgb[base], rgb[base + 1], rgb[base + 2]);
            scanline[x * 4..x * 4 + 4].copy_from_slice(&rgbe);
        }
        if use_rle {
            let header = [2u8, 2u8, (width >> 8) as u8, (width & 0xFF) as u8];
            writer.write_all(&header)?;
            encode_rle_scanline(writer, width, &scanline)?;
        } else {
            writer.write_all(&scanline)?;
        }
    }
    Ok(())
}

fn encode_rle_scanline<W: Write>(writer: &mut W, width: usize, scanline: &[u8]) -> PicResult<()> {
    let mut channel = vec![0u8; width];
    for c in 0..4 {
        for x in 0..width {
            channel[x] = scanline[x * 4 + c];
        }
        let encoded = encode_rle_channel(&channel);
        writer.write_all(&encoded)?;
    }
    Ok(())
}

fn encode_rle_channel(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0usize;
    while i < data.len() {
        let mut run = 1usize;
        while i + run < data.len() && run < 127 && data[i] == data[i + run] {
            run += 1;
        }

        if run >= 4 {
            out.push((128 + run) as u8);
            out.push(data[i]);
            i += run;
            continue;
        }

        let start = i;
        let mut literal = 0usize;
        while i < data.len() {
            run = 1;
            while i + run < data.len() && run < 127 && data[i] == data[i + run] {
                run += 1;
            }
            if run >= 4 {
                break;
            }
            i += 1;
            literal += 1;
            if literal == 128 {
                break;
            }
        }
        out.push(literal as u8);
        out.extend_from_slice(&data[start..start + literal]);
    }
    out
}

fn f32_to_rgbe(r: f32, g: f32, b: f32) -> [u8; 4] {
    let r = r.max(0.0);
    let g = g.max(0.0);
    let b = b.max(0.0);
    let max = r.max(g).max(b);
    if max < 1.0e-32 {
        return [0, 0, 0, 0];
    }

    let (m, e) = frexp(max);
    let scale = m * 256.0 / max;

    [
        (r * scale).clamp(0.0, 255.0) as u8,
        (g * scale).clamp(0.0, 255.0) as u8,
        (b * scale).clamp(0.0, 255.0) as u8,
        (e + 128) as u8,
    ]
}

fn rgbe_to_f32(r: u8, g: u8, b: u8, e: u8) -> (f32, f32, f32) {
    if e == 0 {
        return (0.0, 0.0, 0.0);
    }
    let exp = (e as i32) - 136;
    let f = 2.0_f32.powi(exp);
    (r as f32 * f, g as f32 * f, b as f32 * f)
}

fn frexp(x: f32) -> (f32, i32) {
    if x == 0.0 {
        return (0.0, 0);
    }
    let e = x.abs().log2().floor() as i32 + 1;
    let m = x / 2.0_f32.powi(e);
    (m, e)
}

fn trim_line(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp_rgb(width: u16, height: u16) -> PictureInfo {
        let data: Vec<f32> = (0..width as usize * height as usize * 3)
            .map(|i| i as f32 / 10.0)
            .collect();
        PictureInfo::new(width, height, TextureFormat::Rgb32, PixelData::F32(data))
    }

    #[test]
    fn parse_resolution_line() {
        assert_eq!(parse_resolution("-Y 2 +X 3"), Some((3, 2)));
        assert_eq!(parse_resolution("+X 4 -Y 5"), Some((4, 5)));
        assert_eq!(parse_resolution("-Y 2"), None);
    }

    #[test]
    fn roundtrip_small() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.hdr");
        let pic = ramp_rgb(4, 2);

        write(&path, &pic, &WriteOptions::default()).unwrap();
        let loaded = read(&path, &ReadOptions::default()).unwrap();

        assert_eq!(loaded.width, 4);
        assert_eq!(loaded.height, 2);
        assert_eq!(loaded.format, TextureFormat::Rgb32);
        let (PixelData::F32(out), PixelData::F32(src)) = (&loaded.pixels, &pic.pixels) else {
            panic!("expected float pixels");
        };
        for (a, b) in out.iter().zip(src) {
            assert_relative_eq!(a, b, epsilon = 1e-2, max_relative = 1e-2);
        }
    }

    #[test]
    fn roundtrip_rle_width() {
        // Width 16 takes the RLE scanline path.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rle.hdr");
        let pic = ramp_rgb(16, 4);

        write(&path, &pic, &WriteOptions::default()).unwrap();
        let loaded = read(&path, &ReadOptions::default()).unwrap();

        assert_eq!(loaded.pixels.len(), 16 * 4 * 3);
    }

    #[test]
    fn write_rejects_two_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rg.hdr");
        let pic = PictureInfo::new(1, 1, TextureFormat::Rg32, PixelData::F32(vec![0.0; 2]));

        let err = write(&path, &pic, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, PicError::UnsupportedWriteCombination { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn write_rejects_narrow_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("narrow.hdr");
        let pic = PictureInfo::new(1, 1, TextureFormat::Rgb8, PixelData::U8(vec![0; 3]));

        let err = write(&path, &pic, &WriteOptions::default()).unwrap_err();
        assert!(matches!(err, PicError::UnsupportedWriteCombination { .. }));
    }

    #[test]
    fn alpha_dropped_and_gray_triplicated() {
        let dir = tempfile::tempdir().unwrap();

        let rgba = PictureInfo::new(
            1,
            1,
            TextureFormat::Rgba32,
            PixelData::F32(vec![0.25, 0.5, 0.75, 1.0]),
        );
        let path = dir.path().join("rgba.hdr");
        write(&path, &rgba, &WriteOptions::default()).unwrap();
        let loaded = read(&path, &ReadOptions::default()).unwrap();
        assert_eq!(loaded.format, TextureFormat::Rgb32);

        let gray = PictureInfo::new(2, 1, TextureFormat::R32, PixelData::F32(vec![0.5, 1.0]));
        let path = dir.path().join("gray.hdr");
        write(&path, &gray, &WriteOptions::default()).unwrap();
        let loaded = read(&path, &ReadOptions::default()).unwrap();
        let PixelData::F32(out) = &loaded.pixels else {
            panic!("expected float pixels");
        };
        assert_relative_eq!(out[0], out[1], epsilon = 1e-6);
        assert_relative_eq!(out[1], out[2], epsilon = 1e-6);
    }

    #[test]
    fn srgb_conversion_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("linear.hdr");
        let pic = PictureInfo::new(1, 1, TextureFormat::Rgb32, PixelData::F32(vec![0.5; 3]));

        let wopts = WriteOptions {
            hdr_to_linear: true,
            ..Default::default()
        };
        write(&path, &pic, &wopts).unwrap();
        let loaded = read(&path, &ReadOptions::default()).unwrap();

        let PixelData::F32(out) = &loaded.pixels else {
            panic!("expected float pixels");
        };
        // 0.5 encoded through sRGB-to-linear lands near 0.214.
        assert_relative_eq!(out[0], 0.214, epsilon = 5e-3);
    }
}
