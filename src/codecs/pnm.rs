//! PNM (PBM/PGM/PPM/PAM) codec adapter using `image::codecs::pnm`.

use std::io::Cursor;

use image::codecs::pnm::PnmDecoder;

use super::{CodecOutput, run};
use crate::{DecodeError, ImageFormat};

pub(crate) fn decode(data: &[u8], limits: image::Limits) -> Result<CodecOutput, DecodeError> {
    run(ImageFormat::Pnm, PnmDecoder::new(Cursor::new(data)), limits)
}
