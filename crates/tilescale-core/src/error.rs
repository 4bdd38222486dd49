//! Error types for tilescale-core
//!
//! Provides a unified error type for pixel buffer and geometry operations.
//! Out-of-range pixel reads and writes are deliberately *not* errors: they
//! read as zero or are ignored (see [`crate::PixelBuffer::get`]).

use thiserror::Error;

/// tilescale-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Unsupported number of samples per pixel
    #[error("invalid component count: {0} (expected 1..=4)")]
    InvalidComponents(u32),

    /// Memory allocation failed, or the requested size does not fit in memory
    #[error("memory allocation failed: {bytes} bytes requested")]
    AllocationFailed { bytes: u64 },

    /// Raw sample data does not match `width * height * components`
    #[error("sample data length mismatch: expected {expected}, got {actual}")]
    DataLength { expected: usize, actual: usize },

    /// A rectangle does not fit inside the target image
    #[error(
        "region {w}x{h} at ({x}, {y}) does not fit in {width}x{height} image"
    )]
    RegionOutOfBounds {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        width: u32,
        height: u32,
    },

    /// Component counts of two buffers differ
    #[error("incompatible component counts: {0} vs {1}")]
    IncompatibleComponents(u32, u32),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for tilescale-core operations
pub type Result<T> = std::result::Result<T, Error>;
