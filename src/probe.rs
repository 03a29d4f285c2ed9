//! Header-only image probing.
//!
//! Extracts dimensions, bit depth, channel count, alpha and (for JPEG) EXIF
//! orientation from a leading slice of an image file. Budget checks run on
//! these values, so an oversized image is rejected without touching its
//! pixel data.
//!
//! All parsers are pure byte parsing and never panic on truncated input;
//! fields the slice is too short for are left as `None`.

use crate::ImageFormat;
use crate::info::ImageInfo;

/// Result of probing a (possibly partial) image header.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ProbeResult {
    /// Detected image format.
    pub format: ImageFormat,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Color channels excluding alpha.
    pub channels: Option<u8>,
    pub has_alpha: Option<bool>,
    /// Bits per sample.
    pub bit_depth: Option<u8>,
    /// EXIF orientation (1-8).
    pub orientation: Option<u8>,
    /// Number of bytes examined from the input.
    pub bytes_examined: usize,
}

impl ProbeResult {
    fn empty(format: ImageFormat) -> Self {
        Self {
            format,
            width: None,
            height: None,
            channels: None,
            has_alpha: None,
            bit_depth: None,
            orientation: None,
            bytes_examined: 0,
        }
    }

    /// Convert to `ImageInfo` when width and height are both present.
    pub fn into_image_info(self) -> Option<ImageInfo> {
        Some(ImageInfo {
            format: self.format,
            width: self.width?,
            height: self.height?,
            bit_depth: self.bit_depth,
            channels: self.channels,
            has_alpha: self.has_alpha.unwrap_or(false),
            orientation: self.orientation,
        })
    }

    /// Probe data for a specific format. Does not verify magic bytes.
    pub fn for_format(data: &[u8], format: ImageFormat) -> Self {
        match format {
            ImageFormat::Png => probe_png(data),
            ImageFormat::Gif => probe_gif(data),
            ImageFormat::WebP => probe_webp(data),
            ImageFormat::Jpeg => probe_jpeg(data),
            ImageFormat::Bmp => probe_bmp(data),
            ImageFormat::Pnm => probe_pnm(data),
        }
    }

    /// Detect the format and probe. Returns None for unrecognized data.
    pub fn detect(data: &[u8]) -> Option<Self> {
        ImageFormat::detect(data).map(|format| Self::for_format(data, format))
    }
}

// ---------------------------------------------------------------------------
// PNG: signature (8) + IHDR chunk header (8) + IHDR body (13).
// ---------------------------------------------------------------------------

fn probe_png(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::empty(ImageFormat::Png);
    result.bytes_examined = data.len().min(29);

    if data.len() < 29 || &data[12..16] != b"IHDR" {
        return result;
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    let color_type = data[25];

    result.width = Some(width);
    result.height = Some(height);
    result.bit_depth = Some(data[24]);
    // 0 gray, 2 RGB, 3 palette, 4 gray+alpha, 6 RGBA
    result.channels = Some(if matches!(color_type, 0 | 4) { 1 } else { 3 });
    result.has_alpha = Some(matches!(color_type, 4 | 6));
    result
}

// ---------------------------------------------------------------------------
// GIF: header (6) + logical screen descriptor (7).
// ---------------------------------------------------------------------------

fn probe_gif(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::empty(ImageFormat::Gif);
    result.bytes_examined = data.len().min(13);

    if data.len() < 13 {
        return result;
    }

    result.width = Some(u16::from_le_bytes([data[6], data[7]]) as u32);
    result.height = Some(u16::from_le_bytes([data[8], data[9]]) as u32);
    result.channels = Some(3);
    // Transparency lives in per-frame extensions; decoders always emit RGBA.
    result.has_alpha = Some(true);
    result.bit_depth = Some(8);
    result
}

// ---------------------------------------------------------------------------
// WebP: RIFF header (12), then the first chunk at offset 12.
//
// - VP8X: flags at 20, canvas size minus one as 24-bit LE at 24 and 27
// - VP8:  keyframe start code 9D 01 2A at 23, 14-bit sizes at 26 and 28
// - VP8L: signature 0x2F at 20, then 14+14 bits of size minus one and an
//         alpha hint bit
// ---------------------------------------------------------------------------

fn probe_webp(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::empty(ImageFormat::WebP);
    result.bytes_examined = data.len().min(30);

    if data.len() < 16 {
        return result;
    }

    let read_u24 = |at: usize| {
        u32::from(data[at]) | (u32::from(data[at + 1]) << 8) | (u32::from(data[at + 2]) << 16)
    };

    match &data[12..16] {
        b"VP8X" if data.len() >= 30 => {
            result.width = Some(read_u24(24) + 1);
            result.height = Some(read_u24(27) + 1);
            result.has_alpha = Some(data[20] & 0x10 != 0);
        }
        b"VP8 " if data.len() >= 30 && data[23..26] == [0x9D, 0x01, 0x2A] => {
            result.width = Some((u16::from_le_bytes([data[26], data[27]]) & 0x3FFF) as u32);
            result.height = Some((u16::from_le_bytes([data[28], data[29]]) & 0x3FFF) as u32);
            result.has_alpha = Some(false);
        }
        b"VP8L" if data.len() >= 25 && data[20] == 0x2F => {
            let bits = u32::from_le_bytes([data[21], data[22], data[23], data[24]]);
            result.width = Some((bits & 0x3FFF) + 1);
            result.height = Some(((bits >> 14) & 0x3FFF) + 1);
            result.has_alpha = Some((bits >> 28) & 1 != 0);
        }
        _ => return result,
    }

    result.channels = Some(3);
    result.bit_depth = Some(8);
    result
}

// ---------------------------------------------------------------------------
// JPEG: walk marker segments from SOI until a SOF marker.
//
// APP1 "Exif" segments met on the way are scanned for the orientation tag.
// The walk stops at SOS or EOI, since nothing after them is a header.
// ---------------------------------------------------------------------------

fn probe_jpeg(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::empty(ImageFormat::Jpeg);
    result.has_alpha = Some(false);

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            break;
        }
        // fill bytes
        while pos + 1 < data.len() && data[pos + 1] == 0xFF {
            pos += 1;
        }
        if pos + 1 >= data.len() {
            break;
        }

        let marker = data[pos + 1];
        pos += 2;

        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            continue;
        }
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        if pos + 2 > data.len() {
            break;
        }

        let seg_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        if seg_len < 2 {
            break;
        }

        if is_sof(marker) {
            // length (2) + precision (1) + height (2) + width (2) + components (1)
            if pos + 8 > data.len() {
                break;
            }
            let components = data[pos + 7];
            result.bit_depth = Some(data[pos + 2]);
            result.height = Some(u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32);
            result.width = Some(u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32);
            result.channels = Some(if components == 1 { 1 } else { 3 });
            result.bytes_examined = pos + 8;
            return result;
        }

        if marker == 0xE1 && result.orientation.is_none() {
            let end = (pos + seg_len).min(data.len());
            let payload = &data[pos + 2..end.max(pos + 2)];
            if let Some(tiff) = payload.strip_prefix(b"Exif\0\0") {
                result.orientation = exif_orientation(tiff);
            }
        }

        pos += seg_len;
    }

    result.bytes_examined = pos.min(data.len());
    result
}

fn is_sof(marker: u8) -> bool {
    matches!(
        marker,
        0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF
    )
}

/// Find the orientation tag (0x0112) in IFD0 of a TIFF-structured EXIF block.
fn exif_orientation(tiff: &[u8]) -> Option<u8> {
    let big_endian = match tiff.get(..2)? {
        b"MM" => true,
        b"II" => false,
        _ => return None,
    };
    let u16_at = |at: usize| -> Option<u16> {
        let b = tiff.get(at..at + 2)?;
        Some(if big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        })
    };
    let u32_at = |at: usize| -> Option<u32> {
        let b = tiff.get(at..at + 4)?;
        Some(if big_endian {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })
    };

    if u16_at(2)? != 42 {
        return None;
    }
    let ifd = u32_at(4)? as usize;
    let entries = u16_at(ifd)? as usize;

    for i in 0..entries {
        let entry = ifd + 2 + i * 12;
        if u16_at(entry)? == 0x0112 {
            // SHORT, count 1: value sits left-justified in the offset field
            let value = u16_at(entry + 8)?;
            return (1..=8).contains(&value).then_some(value as u8);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// BMP: file header (14) + DIB header.
//
// BITMAPCOREHEADER (size 12) stores u16 dimensions; every later header
// stores i32 dimensions, with a negative height for top-down bitmaps.
// ---------------------------------------------------------------------------

fn probe_bmp(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::empty(ImageFormat::Bmp);

    if data.len() < 18 {
        result.bytes_examined = data.len();
        return result;
    }

    let dib_size = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);
    let (width, height, bpp) = if dib_size == 12 {
        if data.len() < 26 {
            result.bytes_examined = data.len();
            return result;
        }
        result.bytes_examined = 26;
        let w = u16::from_le_bytes([data[18], data[19]]) as u32;
        let h = u16::from_le_bytes([data[20], data[21]]) as u32;
        (w, h, u16::from_le_bytes([data[24], data[25]]))
    } else if dib_size >= 40 {
        if data.len() < 30 {
            result.bytes_examined = data.len();
            return result;
        }
        result.bytes_examined = 30;
        let w = i32::from_le_bytes([data[18], data[19], data[20], data[21]]);
        let h = i32::from_le_bytes([data[22], data[23], data[24], data[25]]);
        if w < 0 {
            return result;
        }
        (w as u32, h.unsigned_abs(), u16::from_le_bytes([data[28], data[29]]))
    } else {
        result.bytes_examined = 18;
        return result;
    };

    result.width = Some(width);
    result.height = Some(height);
    result.channels = Some(3);
    result.has_alpha = Some(bpp == 32);
    result.bit_depth = Some(8);
    result
}

// ---------------------------------------------------------------------------
// PNM: "P<n>" then whitespace-separated ASCII fields, with '#' comments.
//
// P1/P4 bitmap: width height
// P2/P5 graymap, P3/P6 pixmap: width height maxval
// P7 arbitrary map: KEY value lines up to ENDHDR
// ---------------------------------------------------------------------------

fn probe_pnm(data: &[u8]) -> ProbeResult {
    let mut result = ProbeResult::empty(ImageFormat::Pnm);

    let Some(&kind) = data.get(1) else {
        result.bytes_examined = data.len();
        return result;
    };
    let mut tokens = PnmTokens { data, pos: 2 };

    if kind == b'7' {
        probe_pam(&mut tokens, &mut result);
        result.bytes_examined = tokens.pos;
        return result;
    }

    let width = tokens.next_number();
    let height = tokens.next_number();
    let (Some(width), Some(height)) = (width, height) else {
        result.bytes_examined = tokens.pos;
        return result;
    };

    let (channels, bit_depth) = match kind {
        b'1' | b'4' => (1, Some(1)),
        b'2' | b'5' | b'3' | b'6' => {
            let channels = if matches!(kind, b'3' | b'6') { 3 } else { 1 };
            (channels, tokens.next_number().map(maxval_depth))
        }
        _ => {
            result.bytes_examined = tokens.pos;
            return result;
        }
    };

    result.width = Some(width);
    result.height = Some(height);
    result.channels = Some(channels);
    result.has_alpha = Some(false);
    result.bit_depth = bit_depth;
    result.bytes_examined = tokens.pos;
    result
}

fn probe_pam(tokens: &mut PnmTokens<'_>, result: &mut ProbeResult) {
    let mut width = None;
    let mut height = None;
    let mut depth = None;
    let mut maxval = None;

    while let Some(key) = tokens.next_token() {
        match key {
            b"ENDHDR" => break,
            b"WIDTH" => width = tokens.next_number(),
            b"HEIGHT" => height = tokens.next_number(),
            b"DEPTH" => depth = tokens.next_number(),
            b"MAXVAL" => maxval = tokens.next_number(),
            // TUPLTYPE value is free text; skip one token
            b"TUPLTYPE" => {
                tokens.next_token();
            }
            _ => return,
        }
    }

    let (Some(width), Some(height)) = (width, height) else {
        return;
    };
    result.width = Some(width);
    result.height = Some(height);
    if let Some(depth) = depth {
        result.channels = Some(if depth <= 2 { 1 } else { 3 });
        result.has_alpha = Some(depth == 2 || depth == 4);
    }
    result.bit_depth = maxval.map(maxval_depth);
}

fn maxval_depth(maxval: u32) -> u8 {
    if maxval > 255 { 16 } else { 8 }
}

struct PnmTokens<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PnmTokens<'a> {
    /// Next whitespace-delimited token. A token running into the end of the
    /// data is treated as incomplete, since more digits may follow.
    fn next_token(&mut self) -> Option<&'a [u8]> {
        loop {
            let &b = self.data.get(self.pos)?;
            if b == b'#' {
                while *self.data.get(self.pos)? != b'\n' {
                    self.pos += 1;
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }

        let start = self.pos;
        loop {
            let &b = self.data.get(self.pos)?;
            if b.is_ascii_whitespace() || b == b'#' {
                break;
            }
            self.pos += 1;
        }
        Some(&self.data[start..self.pos])
    }

    fn next_number(&mut self) -> Option<u32> {
        let token = self.next_token()?;
        core::str::from_utf8(token).ok()?.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_header(width: u32, height: u32, depth: u8, color_type: u8) -> Vec<u8> {
        let mut data = vec![0u8; 33];
        data[..8].copy_from_slice(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        data[8..12].copy_from_slice(&13u32.to_be_bytes());
        data[12..16].copy_from_slice(b"IHDR");
        data[16..20].copy_from_slice(&width.to_be_bytes());
        data[20..24].copy_from_slice(&height.to_be_bytes());
        data[24] = depth;
        data[25] = color_type;
        data
    }

    // ---- PNG ----

    #[test]
    fn probe_png_rgba() {
        let result = probe_png(&png_header(100, 50, 8, 6));
        assert_eq!(result.width, Some(100));
        assert_eq!(result.height, Some(50));
        assert_eq!(result.has_alpha, Some(true));
        assert_eq!(result.channels, Some(3));
        assert_eq!(result.bit_depth, Some(8));
    }

    #[test]
    fn probe_png_gray16() {
        let result = probe_png(&png_header(1920, 1080, 16, 0));
        assert_eq!(result.bit_depth, Some(16));
        assert_eq!(result.channels, Some(1));
        assert_eq!(result.has_alpha, Some(false));
    }

    #[test]
    fn probe_png_too_short() {
        let result = probe_png(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(result.width, None);
        assert_eq!(result.format, ImageFormat::Png);
        assert!(result.into_image_info().is_none());
    }

    // ---- GIF ----

    #[test]
    fn probe_gif_screen_descriptor() {
        let mut data = vec![0u8; 13];
        data[..6].copy_from_slice(b"GIF89a");
        data[6..8].copy_from_slice(&320u16.to_le_bytes());
        data[8..10].copy_from_slice(&240u16.to_le_bytes());

        let result = probe_gif(&data);
        assert_eq!(result.width, Some(320));
        assert_eq!(result.height, Some(240));
        assert!(probe_gif(b"GIF89a").width.is_none());
    }

    // ---- WebP ----

    #[test]
    fn probe_webp_vp8x() {
        let mut data = vec![0u8; 30];
        data[..4].copy_from_slice(b"RIFF");
        data[8..12].copy_from_slice(b"WEBP");
        data[12..16].copy_from_slice(b"VP8X");
        data[20] = 0x10;
        data[24..27].copy_from_slice(&[0x7F, 0x02, 0x00]); // 639
        data[27..30].copy_from_slice(&[0xDF, 0x01, 0x00]); // 479

        let result = probe_webp(&data);
        assert_eq!(result.width, Some(640));
        assert_eq!(result.height, Some(480));
        assert_eq!(result.has_alpha, Some(true));
    }

    #[test]
    fn probe_webp_vp8_lossy() {
        let mut data = vec![0u8; 30];
        data[..4].copy_from_slice(b"RIFF");
        data[8..12].copy_from_slice(b"WEBP");
        data[12..16].copy_from_slice(b"VP8 ");
        data[23..26].copy_from_slice(&[0x9D, 0x01, 0x2A]);
        data[26..28].copy_from_slice(&800u16.to_le_bytes());
        data[28..30].copy_from_slice(&600u16.to_le_bytes());

        let result = probe_webp(&data);
        assert_eq!(result.width, Some(800));
        assert_eq!(result.height, Some(600));
        assert_eq!(result.has_alpha, Some(false));
    }

    #[test]
    fn probe_webp_vp8l() {
        let mut data = vec![0u8; 25];
        data[..4].copy_from_slice(b"RIFF");
        data[8..12].copy_from_slice(b"WEBP");
        data[12..16].copy_from_slice(b"VP8L");
        data[20] = 0x2F;
        // width-1 = 99, height-1 = 49, alpha bit set
        let bits: u32 = 99 | (49 << 14) | (1 << 28);
        data[21..25].copy_from_slice(&bits.to_le_bytes());

        let result = probe_webp(&data);
        assert_eq!(result.width, Some(100));
        assert_eq!(result.height, Some(50));
        assert_eq!(result.has_alpha, Some(true));
    }

    #[test]
    fn probe_webp_bad_start_code() {
        let mut data = vec![0u8; 30];
        data[12..16].copy_from_slice(b"VP8 ");
        assert_eq!(probe_webp(&data).width, None);
    }

    // ---- JPEG ----

    fn jpeg_with_sof(app_segments: &[Vec<u8>]) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        for seg in app_segments {
            data.extend_from_slice(seg);
        }
        // SOF0: len 17, precision 8, height 480, width 640, 3 components
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x01, 0xE0, 0x02, 0x80, 0x03]);
        data.extend_from_slice(&[0u8; 9]);
        data.extend_from_slice(&[0xFF, 0xDA]);
        data
    }

    fn exif_segment(orientation: u16, big_endian: bool) -> Vec<u8> {
        let mut tiff = Vec::new();
        if big_endian {
            tiff.extend_from_slice(b"MM");
            tiff.extend_from_slice(&42u16.to_be_bytes());
            tiff.extend_from_slice(&8u32.to_be_bytes());
            tiff.extend_from_slice(&1u16.to_be_bytes());
            tiff.extend_from_slice(&0x0112u16.to_be_bytes());
            tiff.extend_from_slice(&3u16.to_be_bytes());
            tiff.extend_from_slice(&1u32.to_be_bytes());
            tiff.extend_from_slice(&orientation.to_be_bytes());
            tiff.extend_from_slice(&[0, 0]);
        } else {
            tiff.extend_from_slice(b"II");
            tiff.extend_from_slice(&42u16.to_le_bytes());
            tiff.extend_from_slice(&8u32.to_le_bytes());
            tiff.extend_from_slice(&1u16.to_le_bytes());
            tiff.extend_from_slice(&0x0112u16.to_le_bytes());
            tiff.extend_from_slice(&3u16.to_le_bytes());
            tiff.extend_from_slice(&1u32.to_le_bytes());
            tiff.extend_from_slice(&orientation.to_le_bytes());
            tiff.extend_from_slice(&[0, 0]);
        }
        tiff.extend_from_slice(&0u32.to_le_bytes());

        let mut seg = vec![0xFF, 0xE1];
        let len = (2 + 6 + tiff.len()) as u16;
        seg.extend_from_slice(&len.to_be_bytes());
        seg.extend_from_slice(b"Exif\0\0");
        seg.extend_from_slice(&tiff);
        seg
    }

    #[test]
    fn probe_jpeg_sof() {
        let data = jpeg_with_sof(&[]);
        let result = probe_jpeg(&data);
        assert_eq!(result.width, Some(640));
        assert_eq!(result.height, Some(480));
        assert_eq!(result.bit_depth, Some(8));
        assert_eq!(result.channels, Some(3));
        assert_eq!(result.orientation, None);
    }

    #[test]
    fn probe_jpeg_exif_orientation_both_byte_orders() {
        let data = jpeg_with_sof(&[exif_segment(6, false)]);
        assert_eq!(probe_jpeg(&data).orientation, Some(6));

        let data = jpeg_with_sof(&[exif_segment(3, true)]);
        let result = probe_jpeg(&data);
        assert_eq!(result.orientation, Some(3));
        assert_eq!(result.width, Some(640));
    }

    #[test]
    fn probe_jpeg_ignores_out_of_range_orientation() {
        let data = jpeg_with_sof(&[exif_segment(9, false)]);
        assert_eq!(probe_jpeg(&data).orientation, None);
    }

    #[test]
    fn probe_jpeg_truncated_before_sof() {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        data.extend_from_slice(&[0u8; 14]);
        let result = probe_jpeg(&data);
        assert_eq!(result.width, None);
        assert!(result.bytes_examined <= data.len());
    }

    #[test]
    fn probe_jpeg_large_app_segment_before_sof() {
        let mut app = vec![0xFF, 0xE2, 0xFF, 0xFF];
        app.extend(std::iter::repeat_n(0u8, 0xFFFF - 2));
        let data = jpeg_with_sof(&[app]);
        assert_eq!(probe_jpeg(&data[..4096]).width, None);
        assert_eq!(probe_jpeg(&data).width, Some(640));
    }

    // ---- BMP ----

    #[test]
    fn probe_bmp_info_header_top_down() {
        let mut data = vec![0u8; 54];
        data[..2].copy_from_slice(b"BM");
        data[14..18].copy_from_slice(&40u32.to_le_bytes());
        data[18..22].copy_from_slice(&300i32.to_le_bytes());
        data[22..26].copy_from_slice(&(-200i32).to_le_bytes());
        data[28..30].copy_from_slice(&32u16.to_le_bytes());

        let result = probe_bmp(&data);
        assert_eq!(result.width, Some(300));
        assert_eq!(result.height, Some(200));
        assert_eq!(result.has_alpha, Some(true));
    }

    #[test]
    fn probe_bmp_core_header() {
        let mut data = vec![0u8; 26];
        data[..2].copy_from_slice(b"BM");
        data[14..18].copy_from_slice(&12u32.to_le_bytes());
        data[18..20].copy_from_slice(&64u16.to_le_bytes());
        data[20..22].copy_from_slice(&32u16.to_le_bytes());
        data[24..26].copy_from_slice(&24u16.to_le_bytes());

        let result = probe_bmp(&data);
        assert_eq!(result.width, Some(64));
        assert_eq!(result.height, Some(32));
        assert_eq!(result.has_alpha, Some(false));
    }

    // ---- PNM ----

    #[test]
    fn probe_pnm_with_comments() {
        let data = b"P6\n# made by hand\n640 # width\n480\n255\n";
        let result = probe_pnm(data);
        assert_eq!(result.width, Some(640));
        assert_eq!(result.height, Some(480));
        assert_eq!(result.channels, Some(3));
        assert_eq!(result.bit_depth, Some(8));
    }

    #[test]
    fn probe_pgm_sixteen_bit() {
        let result = probe_pnm(b"P5 12 7 65535\n");
        assert_eq!(result.channels, Some(1));
        assert_eq!(result.bit_depth, Some(16));
    }

    #[test]
    fn probe_pbm() {
        let result = probe_pnm(b"P4\n8 2\n\xff\x00");
        assert_eq!(result.width, Some(8));
        assert_eq!(result.height, Some(2));
        assert_eq!(result.bit_depth, Some(1));
    }

    #[test]
    fn probe_pnm_truncated_number_is_incomplete() {
        // "51" could still become "512"
        assert_eq!(probe_pnm(b"P6\n51").width, None);
        assert_eq!(probe_pnm(b"P6\n512 51").height, None);
    }

    #[test]
    fn probe_pam() {
        let data = b"P7\nWIDTH 4\nHEIGHT 2\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n";
        let result = probe_pnm(data);
        assert_eq!(result.width, Some(4));
        assert_eq!(result.height, Some(2));
        assert_eq!(result.channels, Some(3));
        assert_eq!(result.has_alpha, Some(true));
    }

    // ---- Dispatch and real encoded images ----

    #[test]
    fn detect_dispatches() {
        let data = png_header(8, 9, 8, 2);
        let result = ProbeResult::detect(&data).unwrap();
        assert_eq!(result.format, ImageFormat::Png);
        assert_eq!(result.width, Some(8));
        assert!(ProbeResult::detect(b"not an image").is_none());
    }

    fn encode(format: image::ImageFormat, w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([(x * 4) as u8, (y * 5) as u8, ((x + y) * 2) as u8])
        });
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), format)
            .unwrap();
        out
    }

    /// Probe must agree with the encoder and never panic on truncation.
    fn verify_real(encoded: &[u8], format: ImageFormat, w: u32, h: u32) {
        let result = ProbeResult::detect(encoded).unwrap();
        assert_eq!(result.format, format);
        assert_eq!(result.width, Some(w), "width mismatch for {format:?}");
        assert_eq!(result.height, Some(h), "height mismatch for {format:?}");

        let min = format.min_probe_bytes().min(encoded.len());
        if format != ImageFormat::Jpeg {
            let partial = ProbeResult::for_format(&encoded[..min], format);
            assert_eq!(partial.width, Some(w), "min_probe_bytes too small for {format:?}");
        }

        for len in (0..encoded.len()).step_by(7) {
            let _ = ProbeResult::for_format(&encoded[..len], format);
        }
    }

    #[test]
    fn probe_real_png() {
        let encoded = encode(image::ImageFormat::Png, 64, 48);
        verify_real(&encoded, ImageFormat::Png, 64, 48);
    }

    #[test]
    fn probe_real_png_from_png_crate() {
        let mut encoded = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut encoded, 17, 5);
            encoder.set_color(png::ColorType::GrayscaleAlpha);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0u8; 17 * 5 * 2]).unwrap();
        }
        let result = ProbeResult::detect(&encoded).unwrap();
        assert_eq!((result.width, result.height), (Some(17), Some(5)));
        assert_eq!(result.channels, Some(1));
        assert_eq!(result.has_alpha, Some(true));
    }

    #[test]
    fn probe_real_jpeg() {
        let encoded = encode(image::ImageFormat::Jpeg, 64, 48);
        verify_real(&encoded, ImageFormat::Jpeg, 64, 48);
    }

    #[test]
    fn probe_real_gif() {
        let encoded = encode(image::ImageFormat::Gif, 33, 21);
        verify_real(&encoded, ImageFormat::Gif, 33, 21);
    }

    #[test]
    fn probe_real_bmp() {
        let encoded = encode(image::ImageFormat::Bmp, 31, 7);
        verify_real(&encoded, ImageFormat::Bmp, 31, 7);
    }

    #[test]
    fn bmp_info_header_needs_min_probe_bytes() {
        let encoded = encode(image::ImageFormat::Bmp, 9, 4);
        let min = ImageFormat::Bmp.min_probe_bytes();
        let at_min = ProbeResult::for_format(&encoded[..min], ImageFormat::Bmp);
        assert_eq!((at_min.width, at_min.height), (Some(9), Some(4)));
        let short = ProbeResult::for_format(&encoded[..min - 1], ImageFormat::Bmp);
        assert_eq!(short.width, None);
    }

    #[test]
    fn probe_real_pnm() {
        let encoded = encode(image::ImageFormat::Pnm, 10, 12);
        verify_real(&encoded, ImageFormat::Pnm, 10, 12);
    }
}
