//! tilescale-core - Basic data structures for image resizing
//!
//! This crate provides the fundamental data structures used throughout
//! the tilescale workspace:
//!
//! - [`PixelBuffer`] - 8-bit, channel-interleaved raster image
//! - [`Rect`] - Half-open rectangle regions
//! - [`ImageFormat`] - File formats understood by the codec layer

pub mod error;
pub mod pix;
pub mod rect;

pub use error::{Error, Result};
pub use pix::{ImageFormat, MAX_COMPONENTS, PixelBuffer};
pub use rect::Rect;
