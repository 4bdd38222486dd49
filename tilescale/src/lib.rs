//! tilescale - Bicubic image resizing in bounded memory
//!
//! Resizes raster images with bicubic resampling while holding only one
//! tile of the source in memory at a time.
//!
//! # Overview
//!
//! - [`PixelBuffer`] and [`Rect`] from `tilescale-core`
//! - [`io`]: header and region reads, encoding (JPEG, PNG, PNM)
//! - [`transform`]: the bicubic resampler and [`TileScheduler`]
//!
//! # Example
//!
//! ```
//! use tilescale::{PixelBuffer, TileOptions, resize_buffer};
//!
//! let pix = PixelBuffer::new(800, 600, 3).unwrap();
//! let out = resize_buffer(pix, 400, &TileOptions::default()).unwrap();
//! assert_eq!((out.width(), out.height()), (400, 300));
//! ```

use std::path::Path;
use thiserror::Error;
use tracing::info;

// Re-export core types (primary data structures used everywhere)
pub use tilescale_core::{ImageFormat, PixelBuffer, Rect};

// Re-export member crates as modules to avoid name conflicts
pub use tilescale_io as io;
pub use tilescale_transform as transform;

pub use tilescale_io::{FileSource, ImageSource, MemorySource};
pub use tilescale_transform::{TileOptions, TileOrder, TileReport, TileScheduler, fit_long_side};

/// Errors from any stage of a resize
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel buffer error
    #[error(transparent)]
    Core(#[from] tilescale_core::Error),

    /// Decode or encode error
    #[error(transparent)]
    Io(#[from] tilescale_io::IoError),

    /// Resampling or tiling error
    #[error(transparent)]
    Transform(#[from] tilescale_transform::TransformError),
}

/// Result type for resize operations
pub type Result<T> = std::result::Result<T, Error>;

/// A source file opened for resizing, with its target size fixed.
#[derive(Debug)]
pub struct ResizeJob {
    source: FileSource,
    dst_width: u32,
    dst_height: u32,
}

impl ResizeJob {
    /// Open `path` and fit its longer side to `long_side`.
    pub fn open<P: AsRef<Path>>(path: P, long_side: u32) -> Result<Self> {
        let source = FileSource::open(path)?;
        let header = source.header();
        let (dst_width, dst_height) = fit_long_side(header.width, header.height, long_side)?;
        Ok(Self {
            source,
            dst_width,
            dst_height,
        })
    }

    /// Source dimensions.
    pub fn src_size(&self) -> (u32, u32) {
        let header = self.source.header();
        (header.width, header.height)
    }

    /// Target dimensions.
    pub fn dst_size(&self) -> (u32, u32) {
        (self.dst_width, self.dst_height)
    }

    /// Scale the source and write it to `dst_path`.
    ///
    /// The output format follows the extension of `dst_path` (JPEG when
    /// unrecognized) and is always 3-channel RGB.
    pub fn run<P: AsRef<Path>>(
        mut self,
        dst_path: P,
        quality: u8,
        options: &TileOptions,
    ) -> Result<TileReport> {
        let dst_path = dst_path.as_ref();
        let scheduler = TileScheduler::new(*options);
        let (scaled, report) =
            scheduler.run_with_report(&mut self.source, self.dst_width, self.dst_height)?;
        tilescale_io::write_image(&scaled, dst_path, quality)?;
        info!(
            source = %self.source.path().display(),
            destination = %dst_path.display(),
            width = self.dst_width,
            height = self.dst_height,
            "resize complete"
        );
        Ok(report)
    }
}

/// Resize the image at `src_path` so its longer side is `long_side` and
/// write it to `dst_path`.
pub fn resize_file<P: AsRef<Path>, Q: AsRef<Path>>(
    src_path: P,
    dst_path: Q,
    long_side: u32,
    quality: u8,
    options: &TileOptions,
) -> Result<TileReport> {
    ResizeJob::open(src_path, long_side)?.run(dst_path, quality, options)
}

/// Resize an in-memory image so its longer side is `long_side`.
///
/// The buffer keeps its component count.
pub fn resize_buffer(pix: PixelBuffer, long_side: u32, options: &TileOptions) -> Result<PixelBuffer> {
    let (dst_w, dst_h) = fit_long_side(pix.width(), pix.height(), long_side)?;
    let mut source = MemorySource::new(pix);
    Ok(TileScheduler::new(*options).run(&mut source, dst_w, dst_h)?)
}
