//! # zenbound
//!
//! Bounded image reads: dimensions are probed from the file header, checked
//! against a caller budget and process-wide safety limits, and only then is
//! the image decoded. Outcomes are stable integer status codes.
//!
//! Each codec is feature-gated. Enable only what you need:
//!
//! ```toml
//! [dependencies]
//! zenbound = { version = "0.1", default-features = false, features = ["jpeg", "png"] }
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use zenbound::{ReadFlags, ReadParams, ReadStatus, Size, read_bounded};
//!
//! let params = ReadParams::new()
//!     .with_flags(ReadFlags::COLOR)
//!     .with_max_size(Size::new(4096, 4096))
//!     .with_max_pixels(12_000_000);
//!
//! let outcome = read_bounded("upload.jpg", &params);
//! if outcome.status() == ReadStatus::SizeLimitExceeded {
//!     eprintln!("rejected without decoding");
//! }
//! if let Some(image) = outcome.image() {
//!     println!("{}x{}", image.width(), image.height());
//! }
//! ```
//!
//! [`DecodeRequest`] offers the same pipeline over an in-memory buffer with
//! typed errors.

#![forbid(unsafe_code)]

pub mod config;
pub mod detect;
mod codecs;
mod decode;
mod error;
mod flags;
mod format;
mod info;
mod limits;
pub mod pixel;
mod probe;
mod read;
mod registry;

pub use decode::{DecodeRequest, Decoded, decode_file, probe_file};
pub use error::DecodeError;
pub use flags::{ReadFlags, TargetLayout};
pub use format::ImageFormat;
pub use info::ImageInfo;
pub use limits::{Budget, SafetyLimits, Size};
pub use pixel::PixelData;
pub use probe::ProbeResult;
pub use read::{PREFIX_LEN, ReadOutcome, ReadParams, ReadStatus, decode_bounded, read_bounded};
pub use registry::{CodecRegistry, is_compiled};
