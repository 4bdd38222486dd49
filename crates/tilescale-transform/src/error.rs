//! Error types for tilescale-transform

use thiserror::Error;

/// Errors that can occur during resampling and tiled scaling
#[derive(Debug, Error)]
pub enum TransformError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tilescale_core::Error),

    /// Error reading a source region
    #[error("I/O error: {0}")]
    Io(#[from] tilescale_io::IoError),

    /// Invalid scale factor or target size
    #[error("invalid scale factor: {0}")]
    InvalidScaleFactor(String),

    /// Invalid transformation parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Tiles did not cover the destination exactly once
    #[error("tiling mismatch: {0}")]
    TilingMismatch(String),
}

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;
