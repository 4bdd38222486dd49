//! Bounded-memory tiled scaling
//!
//! A [`TilePlan`] splits the source into column spans and row spans and
//! assigns every destination column and row to exactly one of them. The
//! [`TileScheduler`] then walks the tiles, reads each tile's source
//! rectangle (plus a halo) from an [`ImageSource`], resamples the tile's
//! destination window with the global [`ScaleFactors`], and pastes the
//! result into a single output buffer.
//!
//! Peak memory is the output buffer, one decoded tile (or row band) and one
//! scaled tile.
//!
//! # Examples
//!
//! ```
//! use tilescale_core::PixelBuffer;
//! use tilescale_io::MemorySource;
//! use tilescale_transform::{TileOptions, TileScheduler};
//!
//! let pix = PixelBuffer::new(300, 200, 3).unwrap();
//! let mut source = MemorySource::new(pix);
//! let scheduler = TileScheduler::new(TileOptions::default().max_tile_size(128));
//! let out = scheduler.run(&mut source, 150, 100).unwrap();
//! assert_eq!((out.width(), out.height()), (150, 100));
//! ```

use crate::bicubic::{ScaleFactors, resample_window};
use crate::{TransformError, TransformResult};
use tilescale_core::{PixelBuffer, Rect};
use tilescale_io::ImageSource;
use tracing::{debug, info, trace};

/// Order in which tiles are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileOrder {
    /// One region read per tile, left to right by column, top to bottom
    /// inside a column
    #[default]
    ColumnMajor,
    /// One full-width region read per row band; column tiles are cropped
    /// from the band in memory
    RowBand,
}

/// Options for tiled scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileOptions {
    /// Largest tile side in source pixels
    pub max_tile_size: u32,
    /// Fewest tiles per axis (reduced for images smaller than this)
    pub min_tiles_per_axis: u32,
    /// Extra source pixels decoded around each tile
    pub halo: u32,
    /// Decode order
    pub order: TileOrder,
}

impl Default for TileOptions {
    fn default() -> Self {
        Self {
            max_tile_size: 1000,
            min_tiles_per_axis: 2,
            halo: 2,
            order: TileOrder::ColumnMajor,
        }
    }
}

impl TileOptions {
    /// Create options with a specific decode order
    pub fn with_order(order: TileOrder) -> Self {
        Self {
            order,
            ..Default::default()
        }
    }

    /// Set the largest tile side
    pub fn max_tile_size(mut self, max_tile_size: u32) -> Self {
        self.max_tile_size = max_tile_size;
        self
    }

    /// Set the fewest tiles per axis
    pub fn min_tiles_per_axis(mut self, min_tiles_per_axis: u32) -> Self {
        self.min_tiles_per_axis = min_tiles_per_axis;
        self
    }

    /// Set the halo width
    pub fn halo(mut self, halo: u32) -> Self {
        self.halo = halo;
        self
    }

    /// Set the decode order
    pub fn order(mut self, order: TileOrder) -> Self {
        self.order = order;
        self
    }

    fn validate(&self) -> TransformResult<()> {
        if self.max_tile_size == 0 {
            return Err(TransformError::InvalidParameters(
                "max_tile_size must be at least 1".to_string(),
            ));
        }
        if self.min_tiles_per_axis == 0 {
            return Err(TransformError::InvalidParameters(
                "min_tiles_per_axis must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A source range along one axis and the destination range it produces.
///
/// Both ranges are half-open. The destination range may be empty when
/// downscaling hard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub src_start: u32,
    pub src_end: u32,
    pub dst_start: u32,
    pub dst_end: u32,
}

impl Span {
    #[inline]
    pub fn src_len(&self) -> u32 {
        self.src_end - self.src_start
    }

    #[inline]
    pub fn dst_len(&self) -> u32 {
        self.dst_end - self.dst_start
    }
}

/// Number of tiles along an axis of `len` pixels.
fn tile_count(len: u32, options: &TileOptions) -> u32 {
    len.div_ceil(options.max_tile_size)
        .max(options.min_tiles_per_axis)
        .min(len)
        .max(1)
}

/// Smallest destination index whose source index is at least `s`.
fn first_dst_at(s: u32, map: impl Fn(u32) -> i64, t: f64, dst_len: u32) -> u32 {
    let guess = (f64::from(s) / t).ceil();
    let s = i64::from(s);
    let mut j = if guess >= f64::from(dst_len) {
        dst_len
    } else {
        guess.max(0.0) as u32
    };
    while j > 0 && map(j - 1) >= s {
        j -= 1;
    }
    while j < dst_len && map(j) < s {
        j += 1;
    }
    j
}

fn axis_spans(
    src_len: u32,
    dst_len: u32,
    t: f64,
    map: impl Fn(u32) -> i64,
    options: &TileOptions,
) -> Vec<Span> {
    let n = tile_count(src_len, options);
    let mut spans = Vec::with_capacity(n as usize);
    let mut dst_start = 0;
    for k in 0..n {
        let src_start = (u64::from(k) * u64::from(src_len) / u64::from(n)) as u32;
        let src_end = (u64::from(k + 1) * u64::from(src_len) / u64::from(n)) as u32;
        let dst_end = if k + 1 == n {
            dst_len
        } else {
            first_dst_at(src_end, &map, t, dst_len).max(dst_start)
        };
        spans.push(Span {
            src_start,
            src_end,
            dst_start,
            dst_end,
        });
        dst_start = dst_end;
    }
    spans
}

/// One tile of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDescriptor {
    /// Column index in the plan
    pub column: usize,
    /// Row index in the plan
    pub row: usize,
    /// Source rectangle, without halo
    pub source: Rect,
    /// Destination rectangle; its origin is the paste offset
    pub destination: Rect,
}

impl TileDescriptor {
    /// 1-based inclusive source bounds `(x0, x1, y0, y1)`.
    pub fn inclusive_bounds(&self) -> (u32, u32, u32, u32) {
        self.source.inclusive_bounds()
    }

    /// Paste offset of the scaled tile.
    pub fn offset(&self) -> (u32, u32) {
        (self.destination.x, self.destination.y)
    }

    /// Whether the tile contributes no destination pixels.
    pub fn is_empty(&self) -> bool {
        self.destination.is_empty()
    }
}

/// Column and row spans for one source size, destination size and options.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePlan {
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
    factors: ScaleFactors,
    columns: Vec<Span>,
    rows: Vec<Span>,
}

impl TilePlan {
    /// Plan the tiling of `src_w x src_h` scaled to `dst_w x dst_h`.
    ///
    /// # Errors
    ///
    /// - [`TransformError::InvalidScaleFactor`] if any size is 0
    /// - [`TransformError::InvalidParameters`] if the options are invalid
    pub fn new(
        src_w: u32,
        src_h: u32,
        dst_w: u32,
        dst_h: u32,
        options: &TileOptions,
    ) -> TransformResult<Self> {
        options.validate()?;
        let factors = ScaleFactors::from_sizes(src_w, src_h, dst_w, dst_h)?;
        let columns = axis_spans(src_w, dst_w, factors.x, |j| factors.map_x(j).0, options);
        let rows = axis_spans(src_h, dst_h, factors.y, |i| factors.map_y(i).0, options);
        Ok(Self {
            src_width: src_w,
            src_height: src_h,
            dst_width: dst_w,
            dst_height: dst_h,
            factors,
            columns,
            rows,
        })
    }

    pub fn src_size(&self) -> (u32, u32) {
        (self.src_width, self.src_height)
    }

    pub fn dst_size(&self) -> (u32, u32) {
        (self.dst_width, self.dst_height)
    }

    /// Scale factors shared by every tile.
    pub fn factors(&self) -> &ScaleFactors {
        &self.factors
    }

    pub fn columns(&self) -> &[Span] {
        &self.columns
    }

    pub fn rows(&self) -> &[Span] {
        &self.rows
    }

    /// Total number of tiles, including empty ones.
    pub fn tile_count(&self) -> usize {
        self.columns.len() * self.rows.len()
    }

    /// Descriptor of the tile at `(column, row)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn tile(&self, column: usize, row: usize) -> TileDescriptor {
        let c = self.columns[column];
        let r = self.rows[row];
        TileDescriptor {
            column,
            row,
            source: Rect::from_ranges(c.src_start..c.src_end, r.src_start..r.src_end),
            destination: Rect::from_ranges(c.dst_start..c.dst_end, r.dst_start..r.dst_end),
        }
    }

    /// All tiles, column-major: left to right, top to bottom inside a column.
    pub fn tiles(&self) -> impl Iterator<Item = TileDescriptor> + '_ {
        (0..self.columns.len())
            .flat_map(move |c| (0..self.rows.len()).map(move |r| self.tile(c, r)))
    }

    /// Check that the spans tile source and destination exactly once and
    /// that every destination index maps into its own source span.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::TilingMismatch`] describing the first
    /// violation.
    pub fn verify_partition(&self) -> TransformResult<()> {
        check_axis(
            "column",
            &self.columns,
            self.src_width,
            self.dst_width,
            |j| self.factors.map_x(j).0,
        )?;
        check_axis(
            "row",
            &self.rows,
            self.src_height,
            self.dst_height,
            |i| self.factors.map_y(i).0,
        )
    }
}

fn check_axis(
    axis: &str,
    spans: &[Span],
    src_len: u32,
    dst_len: u32,
    map: impl Fn(u32) -> i64,
) -> TransformResult<()> {
    let (mut src_pos, mut dst_pos) = (0, 0);
    for (k, span) in spans.iter().enumerate() {
        if span.src_start != src_pos || span.src_end <= span.src_start {
            return Err(TransformError::TilingMismatch(format!(
                "{} {} source range {}..{} does not continue at {}",
                axis, k, span.src_start, span.src_end, src_pos
            )));
        }
        if span.dst_start != dst_pos || span.dst_end < span.dst_start {
            return Err(TransformError::TilingMismatch(format!(
                "{} {} destination range {}..{} does not continue at {}",
                axis, k, span.dst_start, span.dst_end, dst_pos
            )));
        }
        for j in span.dst_start..span.dst_end {
            let s = map(j);
            if s < i64::from(span.src_start) || s >= i64::from(span.src_end) {
                return Err(TransformError::TilingMismatch(format!(
                    "{} {}: destination {} maps to source {} outside {}..{}",
                    axis, k, j, s, span.src_start, span.src_end
                )));
            }
        }
        src_pos = span.src_end;
        dst_pos = span.dst_end;
    }
    if src_pos != src_len || dst_pos != dst_len {
        return Err(TransformError::TilingMismatch(format!(
            "{} spans end at {}/{}, expected {}/{}",
            axis, src_pos, dst_pos, src_len, dst_len
        )));
    }
    Ok(())
}

/// Counters from one scheduler run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileReport {
    /// Tiles resampled and pasted
    pub tiles_processed: usize,
    /// Tiles with an empty destination window, never decoded
    pub tiles_skipped: usize,
    /// Scanlines the source decoded during the run
    pub scanlines_decoded: u64,
}

/// Drives tiled scaling from an [`ImageSource`] into one output buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TileScheduler {
    options: TileOptions,
}

impl TileScheduler {
    pub fn new(options: TileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TileOptions {
        &self.options
    }

    /// Plan the tiling of `source` scaled to `dst_w x dst_h`.
    pub fn plan<S: ImageSource + ?Sized>(
        &self,
        source: &S,
        dst_w: u32,
        dst_h: u32,
    ) -> TransformResult<TilePlan> {
        let header = source.header();
        TilePlan::new(header.width, header.height, dst_w, dst_h, &self.options)
    }

    /// Scale `source` to `dst_w x dst_h`.
    pub fn run<S: ImageSource + ?Sized>(
        &self,
        source: &mut S,
        dst_w: u32,
        dst_h: u32,
    ) -> TransformResult<PixelBuffer> {
        self.run_with_report(source, dst_w, dst_h).map(|(pix, _)| pix)
    }

    /// Scale `source` to `dst_w x dst_h` and report tile and decode counts.
    ///
    /// # Errors
    ///
    /// - Planning errors from [`TilePlan::new`]
    /// - [`TransformError::Io`] if a region read fails
    /// - [`TransformError::TilingMismatch`] if a scaled tile does not land
    ///   at its planned offset
    pub fn run_with_report<S: ImageSource + ?Sized>(
        &self,
        source: &mut S,
        dst_w: u32,
        dst_h: u32,
    ) -> TransformResult<(PixelBuffer, TileReport)> {
        let plan = self.plan(source, dst_w, dst_h)?;
        plan.verify_partition()?;

        let components = source.header().components;
        let (src_w, src_h) = plan.src_size();
        info!(
            src_width = src_w,
            src_height = src_h,
            dst_width = dst_w,
            dst_height = dst_h,
            columns = plan.columns().len(),
            rows = plan.rows().len(),
            order = ?self.options.order,
            "planned tiled scale"
        );

        let mut out = PixelBuffer::new(dst_w, dst_h, components)?;
        let start_lines = source.scanlines_decoded();
        let mut report = match self.options.order {
            TileOrder::ColumnMajor => self.run_column_major(source, &plan, &mut out)?,
            TileOrder::RowBand => self.run_row_band(source, &plan, &mut out)?,
        };
        report.scanlines_decoded = source.scanlines_decoded() - start_lines;

        info!(
            tiles = report.tiles_processed,
            skipped = report.tiles_skipped,
            scanlines = report.scanlines_decoded,
            "tiled scale complete"
        );
        Ok((out, report))
    }

    fn run_column_major<S: ImageSource + ?Sized>(
        &self,
        source: &mut S,
        plan: &TilePlan,
        out: &mut PixelBuffer,
    ) -> TransformResult<TileReport> {
        let (src_w, src_h) = plan.src_size();
        let mut report = TileReport::default();
        let mut offset_x = 0;

        for column in 0..plan.columns().len() {
            let mut offset_y = 0;
            let mut last_width = 0;
            for row in 0..plan.rows().len() {
                let tile = plan.tile(column, row);
                if tile.is_empty() {
                    trace!(column, row, "skipping tile with empty destination");
                    report.tiles_skipped += 1;
                    continue;
                }
                check_offset(&tile, offset_x, offset_y)?;

                let window = tile.source.expand_clipped(self.options.halo, src_w, src_h);
                let src = source.read_region(window)?;
                let scaled = scale_tile(&src, window, plan, &tile)?;
                out.paste(&scaled, offset_x, offset_y)?;

                offset_y += scaled.height();
                last_width = scaled.width();
                report.tiles_processed += 1;
            }
            offset_x += last_width;
        }

        check_end(plan, offset_x, None)?;
        Ok(report)
    }

    fn run_row_band<S: ImageSource + ?Sized>(
        &self,
        source: &mut S,
        plan: &TilePlan,
        out: &mut PixelBuffer,
    ) -> TransformResult<TileReport> {
        let (src_w, src_h) = plan.src_size();
        let mut report = TileReport::default();
        let mut offset_y = 0;

        for (row, span) in plan.rows().iter().enumerate() {
            if span.dst_len() == 0 {
                trace!(row, "skipping row band with empty destination");
                report.tiles_skipped += plan.columns().len();
                continue;
            }
            let band = Rect::new(0, span.src_start, src_w, span.src_len())
                .expand_clipped(self.options.halo, src_w, src_h);
            let band_pix = source.read_region(band)?;

            let mut offset_x = 0;
            let mut last_height = 0;
            for column in 0..plan.columns().len() {
                let tile = plan.tile(column, row);
                if tile.is_empty() {
                    trace!(column, row, "skipping tile with empty destination");
                    report.tiles_skipped += 1;
                    continue;
                }
                check_offset(&tile, offset_x, offset_y)?;

                let window = tile.source.expand_clipped(self.options.halo, src_w, src_h);
                let local = window.relative_to(0, band.y).ok_or_else(|| {
                    TransformError::TilingMismatch(format!(
                        "tile window row {} lies above band row {}",
                        window.y, band.y
                    ))
                })?;
                let src = band_pix.clip_rectangle(local)?;
                let scaled = scale_tile(&src, window, plan, &tile)?;
                out.paste(&scaled, offset_x, offset_y)?;

                offset_x += scaled.width();
                last_height = scaled.height();
                report.tiles_processed += 1;
            }
            offset_y += last_height;
        }

        check_end(plan, plan.dst_size().0, Some(offset_y))?;
        Ok(report)
    }
}

fn scale_tile(
    src: &PixelBuffer,
    window: Rect,
    plan: &TilePlan,
    tile: &TileDescriptor,
) -> TransformResult<PixelBuffer> {
    let (x0, x1, y0, y1) = tile.inclusive_bounds();
    debug!(
        column = tile.column,
        row = tile.row,
        x0,
        x1,
        y0,
        y1,
        offset_x = tile.destination.x,
        offset_y = tile.destination.y,
        "scaling tile"
    );
    resample_window(src, (window.x, window.y), plan.factors(), tile.destination)
}

fn check_offset(tile: &TileDescriptor, offset_x: u32, offset_y: u32) -> TransformResult<()> {
    if tile.offset() == (offset_x, offset_y) {
        return Ok(());
    }
    Err(TransformError::TilingMismatch(format!(
        "tile ({}, {}) planned at {:?} but accumulated offset is ({}, {})",
        tile.column,
        tile.row,
        tile.offset(),
        offset_x,
        offset_y
    )))
}

fn check_end(plan: &TilePlan, offset_x: u32, offset_y: Option<u32>) -> TransformResult<()> {
    let (dst_w, dst_h) = plan.dst_size();
    if offset_x != dst_w || offset_y.is_some_and(|y| y != dst_h) {
        return Err(TransformError::TilingMismatch(format!(
            "tiles ended at ({}, {:?}), expected {}x{}",
            offset_x, offset_y, dst_w, dst_h
        )));
    }
    Ok(())
}

/// Target size whose longer side is `long_side`, keeping the aspect ratio.
///
/// The shorter side is scaled with integer truncation. Square sources use
/// the height branch.
///
/// # Errors
///
/// Returns [`TransformError::InvalidScaleFactor`] if any input is 0 or the
/// shorter side truncates to 0.
pub fn fit_long_side(src_w: u32, src_h: u32, long_side: u32) -> TransformResult<(u32, u32)> {
    if src_w == 0 || src_h == 0 || long_side == 0 {
        return Err(TransformError::InvalidScaleFactor(format!(
            "cannot fit {}x{} to long side {}",
            src_w, src_h, long_side
        )));
    }
    let l = u64::from(long_side);
    let (w, h) = if src_w > src_h {
        (l, u64::from(src_h) * l / u64::from(src_w))
    } else {
        (u64::from(src_w) * l / u64::from(src_h), l)
    };
    if w == 0 || h == 0 {
        return Err(TransformError::InvalidScaleFactor(format!(
            "fitting {}x{} to long side {} gives {}x{}",
            src_w, src_h, long_side, w, h
        )));
    }
    // The shorter side never exceeds long_side, so both fit in u32
    Ok((w as u32, h as u32))
}
