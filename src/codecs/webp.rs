//! WebP codec adapter using `image::codecs::webp`.

use std::io::Cursor;

use image::codecs::webp::WebPDecoder;

use super::{CodecOutput, run};
use crate::{DecodeError, ImageFormat};

/// Decode lossy or lossless WebP; animations yield the first frame.
pub(crate) fn decode(data: &[u8], limits: image::Limits) -> Result<CodecOutput, DecodeError> {
    run(ImageFormat::WebP, WebPDecoder::new(Cursor::new(data)), limits)
}
