//! PNG codec adapter using `image::codecs::png`.

use std::io::Cursor;

use image::codecs::png::PngDecoder;

use super::{CodecOutput, run};
use crate::{DecodeError, ImageFormat};

/// Decode a PNG. Animated PNGs yield their default image.
pub(crate) fn decode(data: &[u8], limits: image::Limits) -> Result<CodecOutput, DecodeError> {
    run(ImageFormat::Png, PngDecoder::new(Cursor::new(data)), limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::test_support::encode_gradient;
    use image::GenericImageView;

    #[test]
    fn decodes_rgb() {
        let data = encode_gradient(image::ImageFormat::Png, 16, 9);
        let out = decode(&data, image::Limits::no_limits()).unwrap();
        assert_eq!(out.image.dimensions(), (16, 9));
        assert_eq!(out.image.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn decodes_sixteen_bit_gray_from_png_crate() {
        let mut data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut data, 3, 2);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Sixteen);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0xAB; 3 * 2 * 2]).unwrap();
        }
        let out = decode(&data, image::Limits::no_limits()).unwrap();
        assert_eq!(out.image.color(), image::ColorType::L16);
    }

    #[test]
    fn limits_are_enforced_by_codec() {
        let data = encode_gradient(image::ImageFormat::Png, 16, 9);
        let mut limits = image::Limits::no_limits();
        limits.max_image_width = Some(8);
        let err = decode(&data, limits).err().unwrap();
        assert!(matches!(err, DecodeError::LimitExceeded(_)), "{err}");
    }

    #[test]
    fn corrupt_stream_is_invalid_data() {
        let mut data = encode_gradient(image::ImageFormat::Png, 16, 9);
        let len = data.len();
        // clobber IDAT payload and CRC
        for b in &mut data[len - 30..len - 12] {
            *b ^= 0x5A;
        }
        let err = decode(&data, image::Limits::no_limits()).err().unwrap();
        assert!(matches!(err, DecodeError::InvalidData { .. }), "{err}");
    }
}
