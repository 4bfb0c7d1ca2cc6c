//! Embedded pictures and image format sniffing.

use crate::error::{Error, Result};

/// EMU (English Metric Units) per inch.
pub const EMU_PER_INCH: u64 = 914_400;

/// EMU per pixel at 96 DPI.
pub const EMU_PER_PIXEL: u64 = 9_525;

/// Raster formats accepted for exam images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// PNG
    Png,
    /// JPEG
    Jpeg,
    /// GIF
    Gif,
    /// WebP
    Webp,
    /// Windows bitmap
    Bmp,
}

impl ImageFormat {
    /// Get the MIME type.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Get the file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
            ImageFormat::Webp => "webp",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// Look up a format by MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/gif" => Some(ImageFormat::Gif),
            "image/webp" => Some(ImageFormat::Webp),
            "image/bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Detect the format from magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // GIF: GIF87a or GIF89a
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }

        // WEBP: RIFF....WEBP
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::Webp);
        }

        // BMP: BM
        if data.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }

        None
    }

    /// Read the pixel dimensions from the image header.
    pub fn dimensions(self, data: &[u8]) -> Option<(u32, u32)> {
        let dims = match self {
            ImageFormat::Png => {
                // IHDR is always the first chunk
                if data.get(12..16)? != b"IHDR" {
                    return None;
                }
                (be_u32(data, 16)?, be_u32(data, 20)?)
            }
            ImageFormat::Gif => (u32::from(le_u16(data, 6)?), u32::from(le_u16(data, 8)?)),
            ImageFormat::Bmp => {
                let w = le_u32(data, 18)? as i32;
                let h = le_u32(data, 22)? as i32;
                (w.unsigned_abs(), h.unsigned_abs())
            }
            ImageFormat::Jpeg => jpeg_dimensions(data)?,
            ImageFormat::Webp => webp_dimensions(data)?,
        };
        if dims.0 == 0 || dims.1 == 0 {
            None
        } else {
            Some(dims)
        }
    }
}

fn be_u16(data: &[u8], at: usize) -> Option<u16> {
    let b = data.get(at..at + 2)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

fn le_u16(data: &[u8], at: usize) -> Option<u16> {
    let b = data.get(at..at + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn le_u32(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn le_u24(data: &[u8], at: usize) -> Option<u32> {
    let b = data.get(at..at + 3)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], 0]))
}

/// Walk JPEG segments until a start-of-frame marker.
fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    let mut pos = 2;
    loop {
        // Skip fill bytes before the marker
        while *data.get(pos)? == 0xFF && *data.get(pos + 1)? == 0xFF {
            pos += 1;
        }
        if *data.get(pos)? != 0xFF {
            return None;
        }
        let marker = *data.get(pos + 1)?;
        pos += 2;

        // Standalone markers carry no length
        if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            continue;
        }

        let len = usize::from(be_u16(data, pos)?);
        let is_sof = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let height = be_u16(data, pos + 3)?;
            let width = be_u16(data, pos + 5)?;
            return Some((u32::from(width), u32::from(height)));
        }
        if len < 2 {
            return None;
        }
        pos += len;
    }
}

fn webp_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    match data.get(12..16)? {
        b"VP8 " => {
            let w = le_u16(data, 26)? & 0x3FFF;
            let h = le_u16(data, 28)? & 0x3FFF;
            Some((u32::from(w), u32::from(h)))
        }
        b"VP8L" => {
            let b = data.get(21..25)?;
            let (b0, b1, b2, b3) = (u32::from(b[0]), u32::from(b[1]), u32::from(b[2]), u32::from(b[3]));
            let w = 1 + (((b1 & 0x3F) << 8) | b0);
            let h = 1 + (((b3 & 0x0F) << 10) | (b2 << 2) | ((b1 & 0xC0) >> 6));
            Some((w, h))
        }
        b"VP8X" => Some((le_u24(data, 24)? + 1, le_u24(data, 27)? + 1)),
        _ => None,
    }
}

/// A picture embedded in the document package.
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    /// Asset name the picture was resolved from
    pub name: String,

    /// Raw image bytes
    pub data: Vec<u8>,

    /// Detected format
    pub format: ImageFormat,

    /// Width in pixels
    pub width_px: u32,

    /// Height in pixels
    pub height_px: u32,
}

impl Media {
    /// Inspect asset bytes and build a media entry.
    pub fn from_bytes(name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let format = ImageFormat::detect(&data).ok_or_else(|| Error::InvalidAsset {
            name: name.clone(),
            reason: "not a PNG, JPEG, GIF, WebP, or BMP image".to_string(),
        })?;
        let (width_px, height_px) = format.dimensions(&data).ok_or_else(|| Error::InvalidAsset {
            name: name.clone(),
            reason: format!("unreadable {} header", format.extension()),
        })?;
        Ok(Self {
            name,
            data,
            format,
            width_px,
            height_px,
        })
    }

    /// Display size in EMU: natural size at 96 DPI, shrunk (never enlarged)
    /// to fit within `max_width` x `max_height` inches.
    pub fn display_size(&self, max_width: f64, max_height: f64) -> (u64, u64) {
        let natural_w = (u64::from(self.width_px) * EMU_PER_PIXEL) as f64;
        let natural_h = (u64::from(self.height_px) * EMU_PER_PIXEL) as f64;
        let box_w = max_width * EMU_PER_INCH as f64;
        let box_h = max_height * EMU_PER_INCH as f64;

        let scale = (box_w / natural_w).min(box_h / natural_h).min(1.0);
        let w = (natural_w * scale).round().max(1.0) as u64;
        let h = (natural_h * scale).round().max(1.0) as u64;
        (w, h)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal PNG header (signature + IHDR) with the given size.
    pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0, 0, 0, 0, 0]);
        data
    }

    #[test]
    fn test_detect_formats() {
        assert_eq!(ImageFormat::detect(&png_header(1, 1)), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect(b"GIF89a\x10\x00\x20\x00"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::detect(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_png_dimensions() {
        let data = png_header(640, 480);
        assert_eq!(ImageFormat::Png.dimensions(&data), Some((640, 480)));
    }

    #[test]
    fn test_gif_dimensions() {
        assert_eq!(
            ImageFormat::Gif.dimensions(b"GIF89a\x10\x00\x20\x00"),
            Some((16, 32))
        );
    }

    #[test]
    fn test_jpeg_dimensions() {
        let mut data = vec![0xFF, 0xD8];
        // APP0 segment, length 4 (2 length bytes + 2 payload)
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        // SOF0: length, precision, height 200, width 300
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0xC8, 0x01, 0x2C]);
        assert_eq!(ImageFormat::Jpeg.dimensions(&data), Some((300, 200)));
    }

    #[test]
    fn test_mime_lookup() {
        assert_eq!(ImageFormat::from_mime("IMAGE/PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime("image/svg+xml"), None);
        assert_eq!(ImageFormat::Jpeg.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_media_rejects_garbage() {
        let err = Media::from_bytes("notes.txt", b"hello world".to_vec()).unwrap_err();
        assert!(matches!(err, Error::InvalidAsset { .. }));
    }

    #[test]
    fn test_display_size_never_upscales() {
        let media = Media::from_bytes("small.png", png_header(96, 48)).unwrap();
        // 96 px = 1 inch at 96 DPI
        assert_eq!(media.display_size(4.0, 4.0), (EMU_PER_INCH, EMU_PER_INCH / 2));
    }

    #[test]
    fn test_display_size_fits_box() {
        let media = Media::from_bytes("wide.png", png_header(1920, 480)).unwrap();
        let (w, h) = media.display_size(4.0, 4.0);
        assert_eq!(w, 4 * EMU_PER_INCH);
        assert_eq!(h, EMU_PER_INCH);
    }
}
