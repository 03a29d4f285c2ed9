//! GIF codec adapter using `image::codecs::gif`.

use std::io::Cursor;

use image::codecs::gif::GifDecoder;

use super::{CodecOutput, run};
use crate::{DecodeError, ImageFormat};

/// Decode a GIF. For animated GIFs, this returns only the first frame.
pub(crate) fn decode(data: &[u8], limits: image::Limits) -> Result<CodecOutput, DecodeError> {
    run(ImageFormat::Gif, GifDecoder::new(Cursor::new(data)), limits)
}
