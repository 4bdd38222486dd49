//! Rect - Rectangle regions
//!
//! Half-open rectangles in pixel coordinates. A `Rect` covers
//! `[x, x + w) × [y, y + h)`.

use crate::error::{Error, Result};

/// A rectangle region
///
/// Small `Copy` type; all coordinates are unsigned because every rectangle in
/// this crate lives inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: u32,
    /// Top y coordinate
    pub y: u32,
    /// Width
    pub w: u32,
    /// Height
    pub h: u32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Create a rectangle covering a whole `width x height` image
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Create a rectangle from half-open column and row ranges
    pub fn from_ranges(cols: std::ops::Range<u32>, rows: std::ops::Range<u32>) -> Self {
        Self {
            x: cols.start,
            y: rows.start,
            w: cols.end.saturating_sub(cols.start),
            h: rows.end.saturating_sub(rows.start),
        }
    }

    /// Create a rectangle from 1-based inclusive bounds `(x0, x1, y0, y1)`.
    ///
    /// This is the convention used for progress output, where the first pixel
    /// of an image is column 1, row 1 and both ends are included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if a lower bound is 0 or a bound
    /// pair is reversed.
    pub fn from_inclusive_bounds(x0: u32, x1: u32, y0: u32, y1: u32) -> Result<Self> {
        if x0 == 0 || y0 == 0 || x1 < x0 || y1 < y0 {
            return Err(Error::InvalidParameter(format!(
                "invalid inclusive bounds: x {}..={}, y {}..={}",
                x0, x1, y0, y1
            )));
        }
        Ok(Self {
            x: x0 - 1,
            y: y0 - 1,
            w: x1 - x0 + 1,
            h: y1 - y0 + 1,
        })
    }

    /// 1-based inclusive bounds `(x0, x1, y0, y1)` of a non-empty rectangle.
    pub fn inclusive_bounds(&self) -> (u32, u32, u32, u32) {
        (self.x + 1, self.right(), self.y + 1, self.bottom())
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    /// Check if the rectangle has zero width or height
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Check if this rectangle contains another
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Grow the rectangle by `border` pixels on every side, clipped to a
    /// `width x height` image.
    ///
    /// Returns the grown rectangle; it always contains `self` when `self`
    /// lies inside the image.
    pub fn expand_clipped(&self, border: u32, width: u32, height: u32) -> Rect {
        let x = self.x.saturating_sub(border);
        let y = self.y.saturating_sub(border);
        let right = self.right().saturating_add(border).min(width);
        let bottom = self.bottom().saturating_add(border).min(height);
        Rect {
            x,
            y,
            w: right.saturating_sub(x),
            h: bottom.saturating_sub(y),
        }
    }

    /// Translate the rectangle by `(-dx, -dy)`, expressing it relative to an
    /// origin at `(dx, dy)`.
    ///
    /// Returns `None` if the rectangle starts before the new origin.
    pub fn relative_to(&self, dx: u32, dy: u32) -> Option<Rect> {
        Some(Rect {
            x: self.x.checked_sub(dx)?,
            y: self.y.checked_sub(dy)?,
            w: self.w,
            h: self.h,
        })
    }
}
