//! I/O error types
//!
//! Provides a unified error type for all image I/O operations.
//! Each format-specific module maps its underlying library errors
//! into `IoError` variants so that callers only need to handle
//! one error type.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for image I/O operations.
///
/// Wraps format-specific decoding/encoding errors as well as
/// standard I/O and core-library errors. A missing file is reported
/// separately from other I/O failures so callers can say which path was
/// wrong.
#[derive(Error, Debug)]
pub enum IoError {
    /// The file does not exist
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Standard I/O error (permission denied, short read, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported or not enabled via features
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The image data is structurally invalid
    #[error("invalid image data: {0}")]
    InvalidData(String),

    /// A format-specific decoder returned an error
    #[error("decode error: {0}")]
    DecodeError(String),

    /// A format-specific encoder returned an error
    #[error("encode error: {0}")]
    EncodeError(String),

    /// An error from the core library (e.g. allocation failure)
    #[error("core error: {0}")]
    Core(#[from] tilescale_core::Error),
}

impl IoError {
    /// Map an `std::io::Error` raised while opening `path`.
    pub(crate) fn from_open(err: std::io::Error, path: &Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound(path.to_path_buf())
        } else {
            IoError::Io(err)
        }
    }
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
