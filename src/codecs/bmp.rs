//! BMP codec adapter using `image::codecs::bmp`.

use std::io::Cursor;

use image::codecs::bmp::BmpDecoder;

use super::{CodecOutput, run};
use crate::{DecodeError, ImageFormat};

pub(crate) fn decode(data: &[u8], limits: image::Limits) -> Result<CodecOutput, DecodeError> {
    run(ImageFormat::Bmp, BmpDecoder::new(Cursor::new(data)), limits)
}
