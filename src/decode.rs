//! Image decoding.
//!
//! [`DecodeRequest`] runs the whole pipeline over an in-memory buffer:
//! format detection, header probe, safety and budget checks, codec decode,
//! reduction, orientation and layout conversion. Nothing is decoded until
//! every check on the probed header has passed.

use std::path::Path;

use image::DynamicImage;
use image::imageops::FilterType;
use image::metadata::Orientation;

use crate::codecs::{self, CodecOutput};
use crate::flags::TargetLayout;
use crate::probe::ProbeResult;
use crate::read::StagedFile;
use crate::{
    Budget, CodecRegistry, DecodeError, ImageFormat, ImageInfo, PixelData, ReadFlags,
    SafetyLimits, Size,
};

/// Decoded image output.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    /// Pixels in the layout selected by the read flags.
    pub pixels: PixelData,
    /// Header metadata (stored dimensions, before reduction or orientation).
    pub info: ImageInfo,
}

impl Decoded {
    /// Output width in pixels (convenience accessor).
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Output height in pixels (convenience accessor).
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Image decode request builder.
///
/// # Example
///
/// ```no_run
/// use zenbound::{Budget, DecodeRequest, ReadFlags, Size};
///
/// let data: &[u8] = &[]; // your image bytes
/// let budget = Budget {
///     max_size: Some(Size::new(4096, 4096)),
///     max_pixels: None,
/// };
/// let output = DecodeRequest::new(data)
///     .with_flags(ReadFlags::GRAYSCALE)
///     .with_budget(budget)
///     .decode()?;
/// println!("{}x{}", output.width(), output.height());
/// # Ok::<(), zenbound::DecodeError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    format: Option<ImageFormat>,
    flags: ReadFlags,
    budget: Budget,
    safety: Option<SafetyLimits>,
    registry: Option<&'a CodecRegistry>,
}

impl<'a> DecodeRequest<'a> {
    /// Create a new decode request.
    ///
    /// Format will be auto-detected from magic bytes. Flags default to
    /// [`ReadFlags::COLOR`]; the budget defaults to unbounded and the safety
    /// limits to [`SafetyLimits::global`].
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            format: None,
            flags: ReadFlags::default(),
            budget: Budget::none(),
            safety: None,
            registry: None,
        }
    }

    /// Override format auto-detection.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Select color mode, reduction and orientation handling.
    pub fn with_flags(mut self, flags: ReadFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the per-read dimension budget.
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    /// Replace the process-wide safety limits for this request.
    pub fn with_safety_limits(mut self, limits: SafetyLimits) -> Self {
        self.safety = Some(limits);
        self
    }

    /// Set a codec registry to control which formats are enabled.
    pub fn with_registry(mut self, registry: &'a CodecRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    fn safety(&self) -> SafetyLimits {
        self.safety.unwrap_or_else(SafetyLimits::global)
    }

    /// Safety limits for the codec, narrowed to the budget's `max_size`.
    fn codec_limits(&self) -> image::Limits {
        let mut limits = self.safety().to_codec_limits();
        if let Some(max) = self.budget.max_size.filter(|m| !m.is_empty()) {
            limits.max_image_width = limits.max_image_width.map(|w| w.min(max.width));
            limits.max_image_height = limits.max_image_height.map(|h| h.min(max.height));
        }
        limits
    }

    /// Resolve the format and parse whatever header fields the buffer holds.
    pub(crate) fn header(&self) -> Result<ProbeResult, DecodeError> {
        let format = match self.format {
            Some(f) => f,
            None => ImageFormat::detect(self.data).ok_or(DecodeError::UnrecognizedFormat)?,
        };

        let enabled = match self.registry {
            Some(registry) => registry.is_enabled(format),
            None => true,
        };
        if !enabled {
            return Err(DecodeError::DisabledFormat(format));
        }
        if !crate::registry::is_compiled(format) {
            return Err(DecodeError::UnsupportedFormat(format));
        }

        Ok(ProbeResult::for_format(self.data, format))
    }

    /// Read header metadata without decoding pixels.
    ///
    /// Fails with [`DecodeError::InvalidHeader`] when the buffer is too short
    /// for the dimensions or they are zero.
    pub fn probe(&self) -> Result<ImageInfo, DecodeError> {
        let header = self.header()?;
        let format = header.format;
        let info = header.into_image_info().ok_or_else(|| {
            DecodeError::InvalidHeader(format!("{format} header is truncated or malformed"))
        })?;
        if info.size().is_empty() {
            return Err(DecodeError::InvalidHeader(format!(
                "{format} header reports empty dimensions {}",
                info.size()
            )));
        }
        Ok(info)
    }

    /// Probe the header and check it against the safety limits, then the
    /// budget.
    pub fn validate(&self) -> Result<ImageInfo, DecodeError> {
        let info = self.probe()?;
        let size = info.size();

        if let Err(err) = self.safety().validate(size) {
            tracing::debug!("{} {size} rejected by safety limits: {err}", info.format);
            return Err(err);
        }
        if let Err(err) = self.budget.check(size) {
            tracing::debug!("{} {size} rejected by budget: {err}", info.format);
            return Err(err);
        }
        Ok(info)
    }

    /// Decode the image to pixels.
    pub fn decode(self) -> Result<Decoded, DecodeError> {
        let info = self.validate()?;
        self.decode_validated(info)
    }

    /// Decode pixels for a header that already passed [`validate`](Self::validate).
    pub(crate) fn decode_validated(self, mut info: ImageInfo) -> Result<Decoded, DecodeError> {
        tracing::debug!(
            "decoding {} {}x{} with flags {}",
            info.format,
            info.width,
            info.height,
            self.flags.bits()
        );

        let CodecOutput { image, orientation } =
            codecs::decode(info.format, self.data, self.codec_limits())?;
        check_decoded_size(&info, &image)?;

        // The codec sees metadata the header probe does not parse.
        let orientation = match (orientation, info.orientation) {
            (Orientation::NoTransforms, Some(exif)) => {
                Orientation::from_exif(exif).unwrap_or(Orientation::NoTransforms)
            }
            (found, _) => found,
        };
        if info.orientation.is_none() && orientation != Orientation::NoTransforms {
            info.orientation = Some(orientation.to_exif());
        }

        let pixels = self.finish(image, orientation);
        Ok(Decoded { pixels, info })
    }

    /// Layout conversion, reduction, then orientation.
    fn finish(&self, image: DynamicImage, orientation: Orientation) -> PixelData {
        let color = image.color();
        let channels = if color.has_color() { 3 } else { 1 };
        let sixteen_bit = color.bytes_per_pixel() / color.channel_count() >= 2;
        let layout = self.flags.target_layout(channels, color.has_alpha(), sixteen_bit);

        let mut image = to_layout(image, layout);

        let d = self.flags.scale_denominator();
        if d > 1 {
            let width = (image.width() / d).max(1);
            let height = (image.height() / d).max(1);
            image = image.resize_exact(width, height, FilterType::Triangle);
        }

        if self.flags.applies_orientation() {
            image.apply_orientation(orientation);
        }

        PixelData::from_dynamic(image, layout)
    }
}

/// The codec must produce exactly the dimensions the header was checked at.
fn check_decoded_size(info: &ImageInfo, image: &DynamicImage) -> Result<(), DecodeError> {
    let decoded = Size::new(image.width(), image.height());
    if decoded != info.size() {
        return Err(DecodeError::InvalidHeader(format!(
            "{} header declares {} but the codec produced {decoded}",
            info.format,
            info.size()
        )));
    }
    Ok(())
}

/// Convert to the target layout ahead of resampling.
fn to_layout(image: DynamicImage, layout: TargetLayout) -> DynamicImage {
    match (layout.color, layout.alpha, layout.sixteen_bit) {
        (false, false, false) => DynamicImage::ImageLuma8(image.into_luma8()),
        (false, false, true) => DynamicImage::ImageLuma16(image.into_luma16()),
        (true, false, false) => DynamicImage::ImageRgb8(image.into_rgb8()),
        (true, false, true) => DynamicImage::ImageRgb16(image.into_rgb16()),
        (_, true, false) => DynamicImage::ImageRgba8(image.into_rgba8()),
        (_, true, true) => DynamicImage::ImageRgba16(image.into_rgba16()),
    }
}

/// Read a whole file, mapping IO failures to [`DecodeError::FileNotFound`].
pub(crate) fn read_file(path: &Path) -> Result<Vec<u8>, DecodeError> {
    std::fs::read(path).map_err(|source| DecodeError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a file with the given flags and budget.
///
/// Unlike [`crate::read_bounded`], this reads the whole file before
/// probing and reports a typed error.
pub fn decode_file(
    path: impl AsRef<Path>,
    flags: ReadFlags,
    budget: Budget,
) -> Result<Decoded, DecodeError> {
    let data = read_file(path.as_ref())?;
    DecodeRequest::new(&data)
        .with_flags(flags)
        .with_budget(budget)
        .decode()
}

/// Read header metadata from a file without decoding pixels.
///
/// Only the first [`PREFIX_LEN`](crate::PREFIX_LEN) bytes are read unless the
/// dimensions lie beyond them.
pub fn probe_file(path: impl AsRef<Path>) -> Result<ImageInfo, DecodeError> {
    let mut staged = StagedFile::open(path.as_ref())?;
    staged.ensure_header(|data| DecodeRequest::new(data).header())?;
    DecodeRequest::new(staged.data()).probe()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codecs::test_support::{encode_gradient, with_exif_orientation};

    fn png(w: u32, h: u32) -> Vec<u8> {
        encode_gradient(image::ImageFormat::Png, w, h)
    }

    #[test]
    fn builder_pattern() {
        let data = b"test";
        let request = DecodeRequest::new(data)
            .with_format(ImageFormat::Jpeg)
            .with_flags(ReadFlags::GRAYSCALE);
        assert_eq!(request.format, Some(ImageFormat::Jpeg));
        assert_eq!(request.flags, ReadFlags::GRAYSCALE);
    }

    #[test]
    fn disabled_format_error() {
        let data = png(4, 4);
        let registry = CodecRegistry::none();

        let result = DecodeRequest::new(&data).with_registry(&registry).decode();
        assert!(matches!(result, Err(DecodeError::DisabledFormat(ImageFormat::Png))));
    }

    #[test]
    fn unrecognized_bytes() {
        let result = DecodeRequest::new(b"definitely not an image").decode();
        assert!(matches!(result, Err(DecodeError::UnrecognizedFormat)));
    }

    #[test]
    fn truncated_header_is_invalid() {
        let data = png(4, 4);
        let result = DecodeRequest::new(&data[..20]).probe();
        assert!(matches!(result, Err(DecodeError::InvalidHeader(_))));
    }

    #[test]
    fn zero_width_header_is_invalid() {
        let mut data = png(4, 4);
        data[16..20].copy_from_slice(&0u32.to_be_bytes());
        let result = DecodeRequest::new(&data).decode();
        assert!(matches!(result, Err(DecodeError::InvalidHeader(_))));
    }

    #[test]
    fn probe_reports_stored_dimensions() {
        let data = png(37, 11);
        let info = DecodeRequest::new(&data).probe().unwrap();
        assert_eq!(info.format, ImageFormat::Png);
        assert_eq!(info.size(), Size::new(37, 11));
        assert!(!info.has_alpha);
    }

    #[test]
    fn budget_rejects_before_decode() {
        // Valid header followed by garbage: only a decode would notice.
        let mut data = png(64, 64);
        data.truncate(40);
        let budget = Budget {
            max_pixels: Some(100),
            ..Default::default()
        };
        let result = DecodeRequest::new(&data).with_budget(budget).decode();
        assert!(matches!(result, Err(DecodeError::LimitExceeded(_))));
    }

    #[test]
    fn safety_limits_apply() {
        let data = png(64, 64);
        let limits = SafetyLimits {
            max_width: 32,
            ..SafetyLimits::default()
        };
        let result = DecodeRequest::new(&data).with_safety_limits(limits).decode();
        assert!(matches!(result, Err(DecodeError::LimitExceeded(_))));
    }

    #[test]
    fn default_flags_give_rgb8() {
        let data = png(8, 6);
        let decoded = DecodeRequest::new(&data).decode().unwrap();
        assert!(matches!(decoded.pixels, PixelData::Rgb8(_)));
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn grayscale_flag_gives_gray8() {
        let data = png(8, 6);
        let decoded = DecodeRequest::new(&data)
            .with_flags(ReadFlags::GRAYSCALE)
            .decode()
            .unwrap();
        assert!(matches!(decoded.pixels, PixelData::Gray8(_)));
        assert_eq!(decoded.pixels.as_bytes().len(), 8 * 6);
    }

    #[test]
    fn reduced_flags_divide_dimensions() {
        let data = png(64, 30);
        for (flags, w, h) in [
            (ReadFlags::REDUCED_COLOR_2, 32, 15),
            (ReadFlags::REDUCED_GRAYSCALE_4, 16, 7),
            (ReadFlags::REDUCED_COLOR_8, 8, 3),
        ] {
            let decoded = DecodeRequest::new(&data).with_flags(flags).decode().unwrap();
            assert_eq!((decoded.width(), decoded.height()), (w, h), "{flags:?}");
            assert_eq!(decoded.info.size(), Size::new(64, 30));
        }
    }

    #[test]
    fn reduction_never_reaches_zero() {
        let data = png(3, 5);
        let decoded = DecodeRequest::new(&data)
            .with_flags(ReadFlags::REDUCED_COLOR_8)
            .decode()
            .unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1, 1));
    }

    #[test]
    fn unchanged_keeps_alpha_and_sixteen_bit() {
        let mut data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut data, 2, 2);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Sixteen);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0x80; 2 * 2 * 8]).unwrap();
        }

        let decoded = DecodeRequest::new(&data)
            .with_flags(ReadFlags::UNCHANGED)
            .decode()
            .unwrap();
        assert!(matches!(decoded.pixels, PixelData::Rgba16(_)));

        let decoded = DecodeRequest::new(&data).decode().unwrap();
        assert!(matches!(decoded.pixels, PixelData::Rgb8(_)));

        let decoded = DecodeRequest::new(&data)
            .with_flags(ReadFlags::ANYDEPTH | ReadFlags::ANYCOLOR)
            .decode()
            .unwrap();
        assert!(matches!(decoded.pixels, PixelData::Rgb16(_)));
    }

    #[test]
    fn exif_orientation_is_applied_unless_disabled() {
        let jpeg = encode_gradient(image::ImageFormat::Jpeg, 40, 24);
        let data = with_exif_orientation(&jpeg, 6);

        let rotated = DecodeRequest::new(&data).decode().unwrap();
        assert_eq!((rotated.width(), rotated.height()), (24, 40));
        assert_eq!(rotated.info.orientation, Some(6));
        assert_eq!(rotated.info.size(), Size::new(40, 24));

        let ignored = DecodeRequest::new(&data)
            .with_flags(ReadFlags::COLOR | ReadFlags::IGNORE_ORIENTATION)
            .decode()
            .unwrap();
        assert_eq!((ignored.width(), ignored.height()), (40, 24));

        let unchanged = DecodeRequest::new(&data)
            .with_flags(ReadFlags::UNCHANGED)
            .decode()
            .unwrap();
        assert_eq!((unchanged.width(), unchanged.height()), (40, 24));
    }

    #[test]
    fn corrupt_pixels_are_invalid_data() {
        let mut data = png(32, 32);
        let len = data.len();
        for b in &mut data[len - 30..len - 12] {
            *b = 0;
        }
        let result = DecodeRequest::new(&data).decode();
        assert!(matches!(result, Err(DecodeError::InvalidData { .. })));
    }

    #[test]
    fn file_helpers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        std::fs::write(&path, png(12, 10)).unwrap();

        assert_eq!(probe_file(&path).unwrap().size(), Size::new(12, 10));
        let decoded = decode_file(&path, ReadFlags::COLOR, Budget::none()).unwrap();
        assert_eq!(decoded.width(), 12);

        let missing = probe_file(dir.path().join("nofile.png"));
        assert!(matches!(missing, Err(DecodeError::FileNotFound { .. })));
    }

    #[test]
    fn codec_limits_follow_the_budget() {
        let safety = SafetyLimits {
            max_width: 1000,
            max_height: 1000,
            max_pixels: 1_000_000,
        };
        let request = DecodeRequest::new(b"")
            .with_safety_limits(safety)
            .with_budget(Budget {
                max_size: Some(Size::new(640, 4000)),
                max_pixels: None,
            });
        let limits = request.codec_limits();
        assert_eq!(limits.max_image_width, Some(640));
        assert_eq!(limits.max_image_height, Some(1000));

        let unbounded = DecodeRequest::new(b"").with_safety_limits(safety).codec_limits();
        assert_eq!(unbounded.max_image_width, Some(1000));
    }

    #[test]
    fn codec_size_must_match_header() {
        let info = DecodeRequest::new(&png(8, 6)).probe().unwrap();
        let same = DynamicImage::new_rgb8(8, 6);
        assert!(check_decoded_size(&info, &same).is_ok());

        let larger = DynamicImage::new_rgb8(8, 600);
        let err = check_decoded_size(&info, &larger).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidHeader(_)));
        assert_eq!(err.status(), crate::ReadStatus::InvalidHeader);
    }

    #[test]
    fn probe_file_stops_at_the_prefix() {
        // Header in the prefix, garbage after it: the garbage is never read.
        let mut data = png(300, 200);
        data.resize(crate::PREFIX_LEN * 3, 0xA5);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.png");
        std::fs::write(&path, &data).unwrap();

        let mut staged = StagedFile::open(&path).unwrap();
        staged.ensure_header(|data| DecodeRequest::new(data).header()).unwrap();
        assert_eq!(staged.data().len(), crate::PREFIX_LEN);

        assert_eq!(probe_file(&path).unwrap().size(), Size::new(300, 200));
    }

    #[test]
    fn probe_file_reads_on_when_header_is_late() {
        let jpeg = encode_gradient(image::ImageFormat::Jpeg, 20, 10);
        let mut data = jpeg[..2].to_vec();
        for _ in 0..2 {
            data.extend_from_slice(&[0xFF, 0xE2, 0xFF, 0xFF]);
            data.extend_from_slice(&vec![0u8; 0xFFFF - 2]);
        }
        data.extend_from_slice(&jpeg[2..]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.jpg");
        std::fs::write(&path, &data).unwrap();

        let mut staged = StagedFile::open(&path).unwrap();
        staged.ensure_header(|data| DecodeRequest::new(data).header()).unwrap();
        assert_eq!(staged.data().len(), data.len());

        assert_eq!(probe_file(&path).unwrap().size(), Size::new(20, 10));
    }
}
