//! Dimension budgets and process-wide safety limits.

use crate::DecodeError;

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total pixel count, computed without overflow.
    pub const fn pixels(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when either side is zero.
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl core::fmt::Display for Size {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Per-read budget supplied by the caller.
///
/// Both bounds are inclusive: an image exactly at the budget passes.
/// An empty `max_size` or a zero `max_pixels` means "no constraint".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Budget {
    /// Largest accepted width and height.
    pub max_size: Option<Size>,
    /// Largest accepted `width * height`.
    pub max_pixels: Option<u64>,
}

impl Budget {
    /// No restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check dimensions against the budget.
    ///
    /// `max_size` is evaluated first; a size violation is reported even when
    /// the pixel budget would also fail.
    pub fn check(&self, size: Size) -> Result<(), DecodeError> {
        if let Some(max) = self.max_size.filter(|m| !m.is_empty()) {
            if size.width > max.width || size.height > max.height {
                return Err(DecodeError::LimitExceeded(format!(
                    "{size} exceeds max size {max}"
                )));
            }
        }

        if let Some(max_pixels) = self.max_pixels.filter(|&p| p != 0) {
            if size.pixels() > max_pixels {
                return Err(DecodeError::LimitExceeded(format!(
                    "{size} ({} pixels) exceeds max pixels {max_pixels}",
                    size.pixels()
                )));
            }
        }

        Ok(())
    }
}

/// Process-wide ceiling applied to every read, independent of the caller's
/// [`Budget`].
///
/// Defaults match a million pixels per side and a gigapixel in total.
/// See [`crate::config`] for environment overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SafetyLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub max_pixels: u64,
}

impl SafetyLimits {
    pub const DEFAULT_MAX_WIDTH: u32 = 1 << 20;
    pub const DEFAULT_MAX_HEIGHT: u32 = 1 << 20;
    pub const DEFAULT_MAX_PIXELS: u64 = 1 << 30;

    /// Effectively unlimited; zero-sized images are still rejected.
    pub const fn unlimited() -> Self {
        Self {
            max_width: u32::MAX,
            max_height: u32::MAX,
            max_pixels: u64::MAX,
        }
    }

    /// Validate header dimensions.
    ///
    /// Zero-sized images are reported as an invalid header rather than a
    /// limit violation.
    pub fn validate(&self, size: Size) -> Result<(), DecodeError> {
        if size.is_empty() {
            return Err(DecodeError::InvalidHeader(format!(
                "image has empty dimensions {size}"
            )));
        }
        if size.width > self.max_width {
            return Err(DecodeError::LimitExceeded(format!(
                "width {} exceeds safety limit {}",
                size.width, self.max_width
            )));
        }
        if size.height > self.max_height {
            return Err(DecodeError::LimitExceeded(format!(
                "height {} exceeds safety limit {}",
                size.height, self.max_height
            )));
        }
        if size.pixels() > self.max_pixels {
            return Err(DecodeError::LimitExceeded(format!(
                "{} pixels exceeds safety limit {}",
                size.pixels(),
                self.max_pixels
            )));
        }
        Ok(())
    }

    /// Limits handed to the codec so it cannot allocate past what was probed.
    pub(crate) fn to_codec_limits(self) -> image::Limits {
        let mut limits = image::Limits::no_limits();
        limits.max_image_width = Some(self.max_width);
        limits.max_image_height = Some(self.max_height);
        limits
    }
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            max_width: Self::DEFAULT_MAX_WIDTH,
            max_height: Self::DEFAULT_MAX_HEIGHT,
            max_pixels: Self::DEFAULT_MAX_PIXELS,
        }
    }
}
