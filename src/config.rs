//! Environment-backed configuration.
//!
//! The process-wide [`SafetyLimits`] are read once from the environment on
//! first use:
//!
//! | Variable | Default |
//! |---|---|
//! | `ZENBOUND_MAX_IMAGE_WIDTH` | `1048576` |
//! | `ZENBOUND_MAX_IMAGE_HEIGHT` | `1048576` |
//! | `ZENBOUND_MAX_IMAGE_PIXELS` | `1073741824` |
//!
//! Unparsable or zero values are ignored with a warning.

use std::sync::OnceLock;

use crate::SafetyLimits;

pub const MAX_WIDTH_VAR: &str = "ZENBOUND_MAX_IMAGE_WIDTH";
pub const MAX_HEIGHT_VAR: &str = "ZENBOUND_MAX_IMAGE_HEIGHT";
pub const MAX_PIXELS_VAR: &str = "ZENBOUND_MAX_IMAGE_PIXELS";

static GLOBAL: OnceLock<SafetyLimits> = OnceLock::new();

impl SafetyLimits {
    /// The process-wide limits, initialized from the environment on first call.
    pub fn global() -> SafetyLimits {
        *GLOBAL.get_or_init(|| SafetyLimits::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Build limits from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> SafetyLimits
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = SafetyLimits::default();
        SafetyLimits {
            max_width: parse_var(&lookup, MAX_WIDTH_VAR, defaults.max_width),
            max_height: parse_var(&lookup, MAX_HEIGHT_VAR, defaults.max_height),
            max_pixels: parse_var(&lookup, MAX_PIXELS_VAR, defaults.max_pixels),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: core::str::FromStr + PartialEq + Default + Copy + core::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => value,
        Ok(_) => {
            tracing::warn!("{key}=0 is not a usable limit, keeping {default}");
            default
        }
        Err(_) => {
            tracing::warn!("{key}={raw:?} is not a valid number, keeping {default}");
            default
        }
    }
}
