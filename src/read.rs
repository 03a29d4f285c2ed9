//! Bounded reads from a path with integer status codes.
//!
//! [`read_bounded`] never fails with an error value: every outcome is a
//! [`ReadStatus`] plus an image that is present exactly when the status is
//! [`ReadStatus::Ok`]. Dimensions are taken from the file header before any
//! pixel data is decoded, so an image over budget costs one small read.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::probe::ProbeResult;
use crate::{Budget, DecodeError, DecodeRequest, Decoded, ReadFlags, Size};

/// Bytes read up front for format detection and the header probe.
pub const PREFIX_LEN: usize = 64 * 1024;

/// Outcome code of a bounded read.
///
/// The integer values are stable and part of the public contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ReadStatus {
    /// Decoded successfully.
    Ok = 0,
    /// The file could not be opened or read.
    FileNotFound = 1,
    /// Allocated for compatibility; never produced.
    Reserved = 2,
    /// Dimensions exceed the requested budget or the safety limits.
    SizeLimitExceeded = 3,
    /// Unknown magic bytes, or the format's codec is unavailable.
    UnrecognizedFormat = 4,
    /// Header truncated, malformed or reporting empty dimensions.
    InvalidHeader = 5,
    /// The codec rejected the pixel data.
    InvalidData = 6,
}

impl ReadStatus {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, ReadStatus::Ok)
    }
}

impl TryFrom<i32> for ReadStatus {
    type Error = i32;

    fn try_from(code: i32) -> Result<Self, i32> {
        Ok(match code {
            0 => ReadStatus::Ok,
            1 => ReadStatus::FileNotFound,
            2 => ReadStatus::Reserved,
            3 => ReadStatus::SizeLimitExceeded,
            4 => ReadStatus::UnrecognizedFormat,
            5 => ReadStatus::InvalidHeader,
            6 => ReadStatus::InvalidData,
            other => return Err(other),
        })
    }
}

impl From<ReadStatus> for i32 {
    fn from(status: ReadStatus) -> Self {
        status.code()
    }
}

impl core::fmt::Display for ReadStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ReadStatus::Ok => "ok",
            ReadStatus::FileNotFound => "file not found",
            ReadStatus::Reserved => "reserved",
            ReadStatus::SizeLimitExceeded => "size limit exceeded",
            ReadStatus::UnrecognizedFormat => "unrecognized format",
            ReadStatus::InvalidHeader => "invalid header",
            ReadStatus::InvalidData => "invalid data",
        };
        write!(f, "{} ({name})", self.code())
    }
}

/// Parameters of a bounded read.
///
/// Constraints are independent; either, both or neither may be set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadParams {
    pub flags: ReadFlags,
    /// Largest accepted width and height, inclusive.
    pub max_size: Option<Size>,
    /// Largest accepted pixel count, inclusive.
    pub max_pixels: Option<u64>,
}

impl ReadParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(mut self, flags: impl Into<ReadFlags>) -> Self {
        self.flags = flags.into();
        self
    }

    pub fn with_max_size(mut self, max_size: impl Into<Size>) -> Self {
        self.max_size = Some(max_size.into());
        self
    }

    pub fn with_max_pixels(mut self, max_pixels: u64) -> Self {
        self.max_pixels = Some(max_pixels);
        self
    }

    pub fn budget(&self) -> Budget {
        Budget {
            max_size: self.max_size,
            max_pixels: self.max_pixels,
        }
    }
}

/// Status plus image. The image is present iff the status is
/// [`ReadStatus::Ok`].
#[derive(Clone, Debug, PartialEq)]
pub struct ReadOutcome {
    status: ReadStatus,
    image: Option<Decoded>,
}

impl ReadOutcome {
    /// A successful read. Empty images are reported as an invalid header.
    pub fn success(image: Decoded) -> Self {
        if image.pixels.is_empty() {
            return Self::failure(ReadStatus::InvalidHeader);
        }
        Self {
            status: ReadStatus::Ok,
            image: Some(image),
        }
    }

    /// A failed read. A status of `Ok` here is a caller bug and is reported
    /// as invalid data instead.
    pub fn failure(status: ReadStatus) -> Self {
        let status = if status.is_ok() {
            ReadStatus::InvalidData
        } else {
            status
        };
        Self { status, image: None }
    }

    pub fn status(&self) -> ReadStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn image(&self) -> Option<&Decoded> {
        self.image.as_ref()
    }

    pub fn into_image(self) -> Option<Decoded> {
        self.image
    }

    pub fn into_parts(self) -> (ReadStatus, Option<Decoded>) {
        (self.status, self.image)
    }
}

impl From<Result<Decoded, DecodeError>> for ReadOutcome {
    fn from(result: Result<Decoded, DecodeError>) -> Self {
        match result {
            Ok(image) => ReadOutcome::success(image),
            Err(err) => ReadOutcome::failure(err.status()),
        }
    }
}

/// Read and decode `path` within the budget in `params`.
///
/// # Example
///
/// ```no_run
/// use zenbound::{ReadParams, ReadStatus, read_bounded};
///
/// let outcome = read_bounded("photo.jpg", &ReadParams::new().with_max_pixels(1 << 24));
/// match outcome.status() {
///     ReadStatus::Ok => println!("{:?}", outcome.image().map(|img| img.info.size())),
///     ReadStatus::SizeLimitExceeded => println!("too large"),
///     other => println!("failed: {other}"),
/// }
/// ```
pub fn read_bounded(path: impl AsRef<Path>, params: &ReadParams) -> ReadOutcome {
    let path = path.as_ref();
    match read_checked(path, params) {
        Ok(image) => ReadOutcome::success(image),
        Err(err) => {
            match &err {
                DecodeError::FileNotFound { .. } => tracing::warn!("{err}"),
                _ => tracing::debug!("{}: {err}", path.display()),
            }
            ReadOutcome::failure(err.status())
        }
    }
}

/// Positional form of [`read_bounded`].
///
/// `flags` defaults to [`ReadFlags::COLOR`] when `None`.
pub fn decode_bounded(
    path: impl AsRef<Path>,
    flags: Option<ReadFlags>,
    max_size: Option<Size>,
    max_pixels: Option<u64>,
) -> ReadOutcome {
    let params = ReadParams {
        flags: flags.unwrap_or_default(),
        max_size,
        max_pixels,
    };
    read_bounded(path, &params)
}

fn request<'a>(data: &'a [u8], params: &ReadParams) -> DecodeRequest<'a> {
    DecodeRequest::new(data)
        .with_flags(params.flags)
        .with_budget(params.budget())
}

/// An open file with its first [`PREFIX_LEN`] bytes buffered.
pub(crate) struct StagedFile<'a> {
    path: &'a Path,
    file: File,
    data: Vec<u8>,
    complete: bool,
}

impl<'a> StagedFile<'a> {
    pub(crate) fn open(path: &'a Path) -> Result<Self, DecodeError> {
        let mut file = File::open(path).map_err(|source| not_found(path, source))?;
        let mut data = Vec::with_capacity(PREFIX_LEN);
        (&mut file)
            .take(PREFIX_LEN as u64)
            .read_to_end(&mut data)
            .map_err(|source| not_found(path, source))?;
        let complete = data.len() < PREFIX_LEN;
        Ok(Self {
            path,
            file,
            data,
            complete,
        })
    }

    pub(crate) fn data(&self) -> &[u8] {
        &self.data
    }

    /// Buffer the remainder of the file; a no-op once complete.
    pub(crate) fn read_rest(&mut self) -> Result<(), DecodeError> {
        if !self.complete {
            self.file
                .read_to_end(&mut self.data)
                .map_err(|source| not_found(self.path, source))?;
            self.complete = true;
        }
        Ok(())
    }

    /// Probe the buffered prefix, reading the rest of the file only when the
    /// dimensions are not within it.
    pub(crate) fn ensure_header<F>(&mut self, probe: F) -> Result<(), DecodeError>
    where
        F: Fn(&[u8]) -> Result<ProbeResult, DecodeError>,
    {
        let header = probe(&self.data)?;
        if !self.complete && (header.width.is_none() || header.height.is_none()) {
            tracing::trace!(
                "{} header not within the first {PREFIX_LEN} bytes of {}",
                header.format,
                self.path.display()
            );
            self.read_rest()?;
        }
        Ok(())
    }
}

fn not_found(path: &Path, source: std::io::Error) -> DecodeError {
    DecodeError::FileNotFound {
        path: path.to_path_buf(),
        source,
    }
}

/// Staged read: prefix, probe, checks, then the rest of the file.
fn read_checked(path: &Path, params: &ReadParams) -> Result<Decoded, DecodeError> {
    let mut staged = StagedFile::open(path)?;
    staged.ensure_header(|data| request(data, params).header())?;

    let info = request(staged.data(), params).validate()?;

    staged.read_rest()?;
    request(staged.data(), params).decode_validated(info)
}
