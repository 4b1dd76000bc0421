//! Physical image codec adapter: PNG via the `image` crate, plus a small
//! hand-rolled QOI encoder/decoder since `image` does not carry QOI support.
//! Kept as a thin boundary so `reconstruct`/`builder` only ever deal with
//! `AtlasImage`, never a specific container format.

use std::io::Cursor;

use image::{ColorType, ImageEncoder};

use crate::atlas::AtlasImage;
use crate::error::ImageCodecError;

const QOI_MAGIC: &[u8; 4] = b"qoif";
const QOI_END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Qoi,
}

pub fn encode_png(image: &AtlasImage) -> Result<Vec<u8>, ImageCodecError> {
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(image.pixels(), image.width, image.height, ColorType::Rgba8.into())
        .map_err(|e| ImageCodecError::Png(e.to_string()))?;
    Ok(buf)
}

fn decode_png(bytes: &[u8]) -> Result<AtlasImage, ImageCodecError> {
    let decoded = image::load(Cursor::new(bytes), image::ImageFormat::Png)
        .map_err(|e| ImageCodecError::Png(e.to_string()))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(AtlasImage::new(width, height, decoded.into_raw()))
}

/// Encodes `image` as QOI (channels=4, sRGB-with-linear-alpha colorspace).
pub fn encode_qoi(image: &AtlasImage) -> Vec<u8> {
    let pixels = image.pixels();
    let mut out = Vec::with_capacity(pixels.len());

    out.extend_from_slice(QOI_MAGIC);
    out.extend_from_slice(&image.width.to_be_bytes());
    out.extend_from_slice(&image.height.to_be_bytes());
    out.push(4); // channels
    out.push(0); // colorspace

    let mut index = [[0u8; 4]; 64];
    let mut prev = [0u8, 0, 0, 255];
    let mut run = 0u32;
    let pixel_count = pixels.len() / 4;

    for i in 0..pixel_count {
        let px = [pixels[i * 4], pixels[i * 4 + 1], pixels[i * 4 + 2], pixels[i * 4 + 3]];

        if px == prev {
            run += 1;
            if run == 62 || i == pixel_count - 1 {
                out.push(0xC0 | (run - 1) as u8);
                run = 0;
            }
            prev = px;
            continue;
        }
        if run > 0 {
            out.push(0xC0 | (run - 1) as u8);
            run = 0;
        }

        let hash = qoi_hash(px);
        if index[hash] == px {
            out.push(0x00 | hash as u8);
        } else {
            index[hash] = px;

            if px[3] == prev[3] {
                let dr = px[0].wrapping_sub(prev[0]) as i8;
                let dg = px[1].wrapping_sub(prev[1]) as i8;
                let db = px[2].wrapping_sub(prev[2]) as i8;

                if (-2..=1).contains(&dr) && (-2..=1).contains(&dg) && (-2..=1).contains(&db) {
                    out.push(0x40 | ((dr + 2) as u8) << 4 | ((dg + 2) as u8) << 2 | (db + 2) as u8);
                } else {
                    let dr_dg = dr.wrapping_sub(dg);
                    let db_dg = db.wrapping_sub(dg);
                    if (-8..=7).contains(&dg) && (-32..=31).contains(&dr_dg) && (-32..=31).contains(&db_dg) {
                        out.push(0x80 | (dg + 32) as u8);
                        out.push(((dr_dg + 8) as u8) << 4 | (db_dg + 8) as u8);
                    } else {
                        out.push(0xFE);
                        out.push(px[0]);
                        out.push(px[1]);
                        out.push(px[2]);
                    }
                }
            } else {
                out.push(0xFF);
                out.push(px[0]);
                out.push(px[1]);
                out.push(px[2]);
                out.push(px[3]);
            }
        }

        prev = px;
    }

    out.extend_from_slice(&QOI_END_MARKER);
    out
}

fn qoi_hash(px: [u8; 4]) -> usize {
    let [r, g, b, a] = px;
    ((r as u32 * 3 + g as u32 * 5 + b as u32 * 7 + a as u32 * 11) % 64) as usize
}

fn decode_qoi(bytes: &[u8]) -> Result<AtlasImage, ImageCodecError> {
    if bytes.len() < 14 || &bytes[0..4] != QOI_MAGIC {
        return Err(ImageCodecError::QoiMalformed);
    }
    let width = u32::from_be_bytes(bytes[4..8].try_into().map_err(|_| ImageCodecError::QoiMalformed)?);
    let height = u32::from_be_bytes(bytes[8..12].try_into().map_err(|_| ImageCodecError::QoiMalformed)?);
    let pixel_count = width as usize * height as usize;

    let mut pixels = Vec::with_capacity(pixel_count * 4);
    let mut index = [[0u8; 4]; 64];
    let mut prev = [0u8, 0, 0, 255];
    let mut pos = 14usize;

    while pixels.len() < pixel_count * 4 {
        let tag = *bytes.get(pos).ok_or(ImageCodecError::QoiMalformed)?;
        pos += 1;

        let px = if tag == 0xFF {
            let chunk = bytes.get(pos..pos + 4).ok_or(ImageCodecError::QoiMalformed)?;
            pos += 4;
            [chunk[0], chunk[1], chunk[2], chunk[3]]
        } else if tag == 0xFE {
            let chunk = bytes.get(pos..pos + 3).ok_or(ImageCodecError::QoiMalformed)?;
            pos += 3;
            [chunk[0], chunk[1], chunk[2], prev[3]]
        } else if tag >> 6 == 0b00 {
            index[tag as usize]
        } else if tag >> 6 == 0b01 {
            let dr = ((tag >> 4) & 0x03) as i16 - 2;
            let dg = ((tag >> 2) & 0x03) as i16 - 2;
            let db = (tag & 0x03) as i16 - 2;
            [
                (prev[0] as i16 + dr) as u8,
                (prev[1] as i16 + dg) as u8,
                (prev[2] as i16 + db) as u8,
                prev[3],
            ]
        } else if tag >> 6 == 0b10 {
            let dg = (tag & 0x3F) as i16 - 32;
            let byte2 = *bytes.get(pos).ok_or(ImageCodecError::QoiMalformed)?;
            pos += 1;
            let dr_dg = ((byte2 >> 4) & 0x0F) as i16 - 8;
            let db_dg = (byte2 & 0x0F) as i16 - 8;
            [
                (prev[0] as i16 + dg + dr_dg) as u8,
                (prev[1] as i16 + dg) as u8,
                (prev[2] as i16 + dg + db_dg) as u8,
                prev[3],
            ]
        } else {
            // tag >> 6 == 0b11, QOI_OP_RUN (0xC0 excluded above for FE/FF).
            let run = (tag & 0x3F) as usize + 1;
            for _ in 0..run {
                pixels.extend_from_slice(&prev);
            }
            index[qoi_hash(prev)] = prev;
            continue;
        };

        index[qoi_hash(px)] = px;
        pixels.extend_from_slice(&px);
        prev = px;
    }

    Ok(AtlasImage::new(width, height, pixels))
}

/// Decodes `bytes` by sniffing the PNG signature or the QOI `"qoif"` magic.
pub fn decode_image(bytes: &[u8]) -> Result<AtlasImage, ImageCodecError> {
    if bytes.len() >= 8 && bytes[0..8] == PNG_SIGNATURE {
        decode_png(bytes)
    } else if bytes.len() >= 4 && &bytes[0..4] == QOI_MAGIC {
        decode_qoi(bytes)
    } else {
        Err(ImageCodecError::UnknownFormat)
    }
}
