//! Header metadata reported without decoding pixels.

use crate::{ImageFormat, Size};

/// Metadata read from the image header.
///
/// Dimensions are as stored in the file, before any flag-driven reduction or
/// EXIF orientation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Bits per sample, when the header states it.
    pub bit_depth: Option<u8>,
    /// Color channels excluding alpha (1 for gray, 3 for color), when known.
    pub channels: Option<u8>,
    pub has_alpha: bool,
    /// EXIF orientation tag (1-8), when found in the probed bytes.
    pub orientation: Option<u8>,
}

impl ImageInfo {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Dimensions after EXIF orientation: swapped for the transposing values 5-8.
    pub fn display_size(&self) -> Size {
        match self.orientation {
            Some(5..=8) => Size::new(self.height, self.width),
            _ => self.size(),
        }
    }
}
