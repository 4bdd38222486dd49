//! tilescale-transform - Bicubic resampling and tiled scaling
//!
//! - [`bicubic`]: whole-image and windowed bicubic resampling
//! - [`tile`]: tile planning and the bounded-memory [`TileScheduler`]
//!
//! Both work in global coordinates, so a tiled run with a halo of at least
//! two pixels produces exactly the whole-image result.

pub mod bicubic;
mod error;
pub mod tile;

pub use bicubic::{ScaleFactors, resample_window, scale_bicubic, scale_bicubic_to_size};
pub use error::{TransformError, TransformResult};
pub use tile::{
    Span, TileDescriptor, TileOptions, TileOrder, TilePlan, TileReport, TileScheduler,
    fit_long_side,
};
