//! Read flags: color mode, depth, decode-time reduction, orientation.
//!
//! Flags are a plain `i32` so callers that already speak the integer
//! convention (`-1` unchanged, `0` grayscale, `1` color, ...) can pass their
//! values through untouched. Unknown bits are carried along and ignored.

/// Color-mode and reduction selector for a read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReadFlags(i32);

impl ReadFlags {
    /// Native channels (alpha included) and native bit depth; no orientation.
    pub const UNCHANGED: Self = ReadFlags(-1);
    /// Single channel, 8-bit.
    pub const GRAYSCALE: Self = ReadFlags(0);
    /// Three channels, 8-bit.
    pub const COLOR: Self = ReadFlags(1);
    /// Keep 16-bit depth when the source has it.
    pub const ANYDEPTH: Self = ReadFlags(2);
    /// Keep color when the source has more than one channel.
    pub const ANYCOLOR: Self = ReadFlags(4);
    /// Reserved for an external geospatial loader; accepted and ignored.
    pub const LOAD_GDAL: Self = ReadFlags(8);
    pub const REDUCED_GRAYSCALE_2: Self = ReadFlags(16);
    pub const REDUCED_COLOR_2: Self = ReadFlags(17);
    pub const REDUCED_GRAYSCALE_4: Self = ReadFlags(32);
    pub const REDUCED_COLOR_4: Self = ReadFlags(33);
    pub const REDUCED_GRAYSCALE_8: Self = ReadFlags(64);
    pub const REDUCED_COLOR_8: Self = ReadFlags(65);
    /// Skip EXIF orientation.
    pub const IGNORE_ORIENTATION: Self = ReadFlags(128);

    const REDUCE_2_BIT: i32 = 16;
    const REDUCE_4_BIT: i32 = 32;
    const REDUCE_8_BIT: i32 = 64;

    /// Wrap a raw integer.
    pub const fn from_bits(bits: i32) -> Self {
        ReadFlags(bits)
    }

    /// The raw integer.
    pub const fn bits(self) -> i32 {
        self.0
    }

    /// Whether every bit of `other` is set. Never true for [`UNCHANGED`](Self::UNCHANGED).
    pub const fn contains(self, other: ReadFlags) -> bool {
        !self.is_unchanged() && (self.0 & other.0) == other.0
    }

    pub const fn is_unchanged(self) -> bool {
        self.0 == Self::UNCHANGED.0
    }

    /// Downscale denominator: 1, 2, 4 or 8.
    ///
    /// Reduction bits only count once the value is past the loader bit,
    /// so small flag combinations never trigger a reduction.
    pub const fn scale_denominator(self) -> u32 {
        if self.0 <= Self::LOAD_GDAL.0 {
            return 1;
        }
        if self.0 & Self::REDUCE_2_BIT != 0 {
            2
        } else if self.0 & Self::REDUCE_4_BIT != 0 {
            4
        } else if self.0 & Self::REDUCE_8_BIT != 0 {
            8
        } else {
            1
        }
    }

    /// Whether EXIF orientation should be applied after decode.
    pub const fn applies_orientation(self) -> bool {
        !self.is_unchanged() && (self.0 & Self::IGNORE_ORIENTATION.0) == 0
    }

    /// Resolve the output layout for a source with `channels` color channels
    /// (alpha excluded) and `sixteen_bit` samples.
    pub fn target_layout(self, channels: u8, has_alpha: bool, sixteen_bit: bool) -> TargetLayout {
        if self.is_unchanged() {
            return TargetLayout {
                color: channels > 1,
                alpha: has_alpha,
                sixteen_bit,
            };
        }

        let color = self.contains(Self::COLOR) || (self.contains(Self::ANYCOLOR) && channels > 1);
        TargetLayout {
            color,
            alpha: false,
            sixteen_bit: sixteen_bit && self.contains(Self::ANYDEPTH),
        }
    }
}

impl Default for ReadFlags {
    fn default() -> Self {
        Self::COLOR
    }
}

impl From<i32> for ReadFlags {
    fn from(bits: i32) -> Self {
        ReadFlags(bits)
    }
}

impl From<ReadFlags> for i32 {
    fn from(flags: ReadFlags) -> Self {
        flags.0
    }
}

impl core::ops::BitOr for ReadFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        ReadFlags(self.0 | rhs.0)
    }
}

/// Output pixel layout chosen by [`ReadFlags::target_layout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetLayout {
    /// Three color channels instead of one.
    pub color: bool,
    /// Keep the alpha channel.
    pub alpha: bool,
    /// 16-bit samples instead of 8-bit.
    pub sixteen_bit: bool,
}
