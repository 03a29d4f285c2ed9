//! Image format detection from magic bytes and file extensions.

/// Image formats understood by the bounded reader.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    /// Netpbm family (PBM, PGM, PPM, PAM).
    Pnm,
}

impl ImageFormat {
    /// Every format, in detection order.
    pub const ALL: [ImageFormat; 6] = [
        ImageFormat::Jpeg,
        ImageFormat::Png,
        ImageFormat::Gif,
        ImageFormat::WebP,
        ImageFormat::Bmp,
        ImageFormat::Pnm,
    ];

    /// Longest signature any format needs for [`detect`](Self::detect).
    pub const MAX_SIGNATURE_LEN: usize = 12;

    /// Detect format from magic bytes. Returns None if unrecognized.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        if data.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }

        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(ImageFormat::Gif);
        }

        if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        // "BM" alone is too weak; require room for the file header.
        if data.len() >= 14 && data.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }

        // P1..P7 followed by whitespace
        if data.len() >= 3
            && data[0] == b'P'
            && (b'1'..=b'7').contains(&data[1])
            && data[2].is_ascii_whitespace()
        {
            return Some(ImageFormat::Pnm);
        }

        None
    }

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "bmp" | "dib" => Some(ImageFormat::Bmp),
            "pbm" | "pgm" | "ppm" | "pnm" | "pam" => Some(ImageFormat::Pnm),
            _ => None,
        }
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Pnm => "image/x-portable-anymap",
        }
    }

    /// Common file extensions.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            ImageFormat::Png => &["png"],
            ImageFormat::Gif => &["gif"],
            ImageFormat::WebP => &["webp"],
            ImageFormat::Bmp => &["bmp", "dib"],
            ImageFormat::Pnm => &["pbm", "pgm", "ppm", "pnm", "pam"],
        }
    }

    /// Bytes from the start of the file that normally contain the dimensions.
    ///
    /// JPEG has no fixed bound: the SOF marker can follow arbitrarily large
    /// APPn segments, so this is only a first guess there.
    pub fn min_probe_bytes(self) -> usize {
        match self {
            ImageFormat::Jpeg => 2048,
            ImageFormat::Png => 33,
            ImageFormat::Gif => 13,
            ImageFormat::WebP => 30,
            ImageFormat::Bmp => 30,
            ImageFormat::Pnm => 512,
        }
    }
}

impl core::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Gif => "GIF",
            ImageFormat::WebP => "WebP",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Pnm => "PNM",
        };
        f.write_str(name)
    }
}
