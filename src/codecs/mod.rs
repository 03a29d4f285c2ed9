//! Codec adapters for format-specific implementations.
//!
//! Each module is a thin adapter between zenbound's decode pipeline and the
//! matching decoder in the `image` crate. Adapters only run after the header
//! has been probed and the budget checked.

use image::metadata::Orientation;
use image::DynamicImage;

use crate::{DecodeError, ImageFormat};

#[cfg(feature = "jpeg")]
pub(crate) mod jpeg;

#[cfg(feature = "webp")]
pub(crate) mod webp;

#[cfg(feature = "gif")]
pub(crate) mod gif;

#[cfg(feature = "png")]
pub(crate) mod png;

#[cfg(feature = "bmp")]
pub(crate) mod bmp;

#[cfg(feature = "pnm")]
pub(crate) mod pnm;

/// Pixels from a codec, before layout conversion.
pub(crate) struct CodecOutput {
    pub image: DynamicImage,
    /// Orientation the codec found in the file's own metadata.
    pub orientation: Orientation,
}

/// Dispatch to the format-specific decoder.
pub(crate) fn decode(
    format: ImageFormat,
    data: &[u8],
    limits: image::Limits,
) -> Result<CodecOutput, DecodeError> {
    match format {
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => jpeg::decode(data, limits),
        #[cfg(feature = "webp")]
        ImageFormat::WebP => webp::decode(data, limits),
        #[cfg(feature = "gif")]
        ImageFormat::Gif => gif::decode(data, limits),
        #[cfg(feature = "png")]
        ImageFormat::Png => png::decode(data, limits),
        #[cfg(feature = "bmp")]
        ImageFormat::Bmp => bmp::decode(data, limits),
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => pnm::decode(data, limits),
        #[allow(unreachable_patterns)]
        _ => Err(DecodeError::UnsupportedFormat(format)),
    }
}

/// Shared driver: apply limits, capture orientation, read all pixels.
#[cfg(any(
    feature = "jpeg",
    feature = "webp",
    feature = "gif",
    feature = "png",
    feature = "bmp",
    feature = "pnm"
))]
fn run(
    format: ImageFormat,
    decoder: Result<impl image::ImageDecoder, image::ImageError>,
    limits: image::Limits,
) -> Result<CodecOutput, DecodeError> {
    use image::ImageDecoder;

    let mut decoder = decoder.map_err(|e| DecodeError::from_codec(format, e))?;
    decoder
        .set_limits(limits)
        .map_err(|e| DecodeError::from_codec(format, e))?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let (width, height) = decoder.dimensions();
    tracing::trace!("{format} decoder ready: {width}x{height}, {:?}", decoder.color_type());

    let image = DynamicImage::from_decoder(decoder).map_err(|e| DecodeError::from_codec(format, e))?;
    Ok(CodecOutput { image, orientation })
}
