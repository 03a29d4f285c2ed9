//! JPEG codec adapter using `image::codecs::jpeg`.
//!
//! EXIF orientation is reported by the decoder and applied later by the
//! decode pipeline, so flags can opt out of it.

use std::io::Cursor;

use image::codecs::jpeg::JpegDecoder;

use super::{CodecOutput, run};
use crate::{DecodeError, ImageFormat};

/// Decode a baseline or progressive JPEG.
pub(crate) fn decode(data: &[u8], limits: image::Limits) -> Result<CodecOutput, DecodeError> {
    run(ImageFormat::Jpeg, JpegDecoder::new(Cursor::new(data)), limits)
}
