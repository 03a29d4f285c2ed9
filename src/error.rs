//! Error taxonomy for decode operations and its mapping to status codes.

use std::path::PathBuf;

use crate::format::ImageFormat;
use crate::read::ReadStatus;

/// Unified error type for probe and decode operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The file could not be opened or read.
    #[error("can't open/read file {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Format not recognized from magic bytes.
    #[error("unrecognized image format")]
    UnrecognizedFormat,
    /// Codec not enabled in the provided registry.
    #[error("format {0} is disabled in the codec registry")]
    DisabledFormat(ImageFormat),
    /// Format recognized but its codec feature is not compiled in.
    #[error("format {0} not supported (codec not compiled in)")]
    UnsupportedFormat(ImageFormat),
    /// Header is truncated, malformed, or reports empty dimensions.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
    /// A budget or safety limit was exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),
    /// The codec failed while decoding pixel data.
    #[error("can't read {format} data: {source}")]
    InvalidData {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },
}

impl DecodeError {
    /// Wrap a codec error raised while decoding pixels.
    ///
    /// Allocation refusals from the codec are limit violations, not bad data.
    pub(crate) fn from_codec(format: ImageFormat, source: image::ImageError) -> Self {
        match source {
            image::ImageError::Limits(err) => {
                DecodeError::LimitExceeded(format!("{format} decoder: {err}"))
            }
            source => DecodeError::InvalidData { format, source },
        }
    }

    /// The status code a caller of the bounded reader sees for this error.
    pub fn status(&self) -> ReadStatus {
        match self {
            DecodeError::FileNotFound { .. } => ReadStatus::FileNotFound,
            DecodeError::UnrecognizedFormat
            | DecodeError::DisabledFormat(_)
            | DecodeError::UnsupportedFormat(_) => ReadStatus::UnrecognizedFormat,
            DecodeError::InvalidHeader(_) => ReadStatus::InvalidHeader,
            DecodeError::LimitExceeded(_) => ReadStatus::SizeLimitExceeded,
            DecodeError::InvalidData { .. } => ReadStatus::InvalidData,
        }
    }
}
