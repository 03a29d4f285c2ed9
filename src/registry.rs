//! Runtime codec registry for enabling/disabling formats.

use crate::ImageFormat;

/// Set of image formats represented as bitflags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FormatSet(u8);

impl FormatSet {
    const EMPTY: Self = FormatSet(0);

    const fn bit(format: ImageFormat) -> u8 {
        match format {
            ImageFormat::Jpeg => 1 << 0,
            ImageFormat::WebP => 1 << 1,
            ImageFormat::Gif => 1 << 2,
            ImageFormat::Png => 1 << 3,
            ImageFormat::Bmp => 1 << 4,
            ImageFormat::Pnm => 1 << 5,
        }
    }

    fn all_compiled() -> Self {
        let bits = ImageFormat::ALL
            .into_iter()
            .filter(|&f| is_compiled(f))
            .fold(0, |acc, f| acc | Self::bit(f));
        FormatSet(bits)
    }

    fn contains(self, format: ImageFormat) -> bool {
        (self.0 & Self::bit(format)) != 0
    }

    fn insert(&mut self, format: ImageFormat) {
        self.0 |= Self::bit(format);
    }

    fn remove(&mut self, format: ImageFormat) {
        self.0 &= !Self::bit(format);
    }

    fn iter(self) -> impl Iterator<Item = ImageFormat> {
        ImageFormat::ALL.into_iter().filter(move |&f| self.contains(f))
    }
}

/// Whether the codec for `format` was compiled in.
pub fn is_compiled(format: ImageFormat) -> bool {
    match format {
        ImageFormat::Jpeg => cfg!(feature = "jpeg"),
        ImageFormat::WebP => cfg!(feature = "webp"),
        ImageFormat::Gif => cfg!(feature = "gif"),
        ImageFormat::Png => cfg!(feature = "png"),
        ImageFormat::Bmp => cfg!(feature = "bmp"),
        ImageFormat::Pnm => cfg!(feature = "pnm"),
    }
}

/// Runtime codec registry.
///
/// Compile-time features determine which codecs are *available*, while the
/// registry controls which are *enabled* for a given read. A service can use
/// this to accept only, say, JPEG and PNG uploads without rebuilding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecRegistry {
    decode_enabled: FormatSet,
}

impl CodecRegistry {
    /// All compiled-in codecs enabled.
    pub fn all() -> Self {
        Self {
            decode_enabled: FormatSet::all_compiled(),
        }
    }

    /// Nothing enabled; caller must opt in.
    pub fn none() -> Self {
        Self {
            decode_enabled: FormatSet::EMPTY,
        }
    }

    /// Enable or disable decoding for a format.
    pub fn with_decode(mut self, format: ImageFormat, enabled: bool) -> Self {
        if enabled {
            self.decode_enabled.insert(format);
        } else {
            self.decode_enabled.remove(format);
        }
        self
    }

    /// Is this format enabled for decoding? Says nothing about whether the
    /// codec was compiled in; see [`is_compiled`].
    pub fn is_enabled(&self, format: ImageFormat) -> bool {
        self.decode_enabled.contains(format)
    }

    /// Is this format available (compiled in) AND enabled for decoding?
    pub fn can_decode(&self, format: ImageFormat) -> bool {
        self.is_enabled(format) && is_compiled(format)
    }

    /// Formats that are both compiled in and enabled for decoding.
    pub fn decodable_formats(&self) -> impl Iterator<Item = ImageFormat> + '_ {
        self.decode_enabled.iter().filter(|&f| self.can_decode(f))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::all()
    }
}
