//! Bicubic resampling
//!
//! Every destination pixel `(i, j)` maps to the source point
//! `(tx * j, ty * i)`, where `tx`/`ty` are the source/destination ratios of
//! [`ScaleFactors`]. The four source columns around that point are combined
//! with a cubic in the fractional offset, separately for each of the four
//! surrounding rows, and the four row results are combined with the same
//! cubic vertically.
//!
//! Taps outside the source read 0, so outermost destination pixels are
//! pulled toward black when they sit between an edge pixel and the border.
//!
//! Coordinates are always global. [`resample_window`] produces any
//! rectangle of the destination from any source buffer that covers its
//! taps, which is what makes tiled output identical to whole-image output.

use crate::{TransformError, TransformResult};
use tilescale_core::{PixelBuffer, Rect};

/// Horizontal and vertical ratios of source size to destination size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    /// Source columns per destination column
    pub x: f64,
    /// Source rows per destination row
    pub y: f64,
}

impl ScaleFactors {
    /// Compute the ratios for resampling `src_w x src_h` to `dst_w x dst_h`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidScaleFactor`] if any size is 0.
    pub fn from_sizes(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> TransformResult<Self> {
        if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
            return Err(TransformError::InvalidScaleFactor(format!(
                "cannot scale {}x{} to {}x{}",
                src_w, src_h, dst_w, dst_h
            )));
        }
        Ok(Self {
            x: f64::from(src_w) / f64::from(dst_w),
            y: f64::from(src_h) / f64::from(dst_h),
        })
    }

    /// Source column and fractional offset for destination column `j`.
    #[inline]
    pub fn map_x(&self, j: u32) -> (i64, f32) {
        map(self.x, j)
    }

    /// Source row and fractional offset for destination row `i`.
    #[inline]
    pub fn map_y(&self, i: u32) -> (i64, f32) {
        map(self.y, i)
    }
}

#[inline]
fn map(t: f64, j: u32) -> (i64, f32) {
    let f = t * f64::from(j);
    let base = f.floor();
    (base as i64, (f - base) as f32)
}

/// Evaluate the cubic through taps `p[0..4]` at offset `t` past `p[1]`.
///
/// Passes through `p[1]` at `t = 0` and `p[2]` at `t = 1`, and reproduces
/// linear ramps exactly.
#[inline]
pub(crate) fn cubic(p: [f32; 4], t: f32) -> f32 {
    let a0 = p[1];
    let d0 = p[0] - a0;
    let d2 = p[2] - a0;
    let d3 = p[3] - a0;
    let a1 = -d0 / 3.0 + d2 - d3 / 6.0;
    let a2 = 0.5 * d0 + 0.5 * d2;
    let a3 = -d0 / 6.0 - 0.5 * d2 + d3 / 6.0;
    a0 + a1 * t + a2 * t * t + a3 * t * t * t
}

/// Clamp to `0..=255`, truncating toward zero inside the range.
#[inline]
pub(crate) fn saturate(v: f32) -> u8 {
    if v > 255.0 {
        255
    } else if v < 0.0 {
        0
    } else {
        v as u8
    }
}

/// Resample the destination rectangle `window` from `src`.
///
/// `window` is in global destination coordinates and `origin` is the global
/// source coordinate of `src`'s top-left pixel. Taps that fall outside `src`
/// read 0, so `src` must cover every tap of `window` (the source span plus
/// two pixels on each side, clipped to the image) for the result to match a
/// whole-image resample.
///
/// # Errors
///
/// Returns [`TransformError::InvalidParameters`] if `window` is empty.
pub fn resample_window(
    src: &PixelBuffer,
    origin: (u32, u32),
    factors: &ScaleFactors,
    window: Rect,
) -> TransformResult<PixelBuffer> {
    if window.is_empty() {
        return Err(TransformError::InvalidParameters(format!(
            "empty destination window {}x{}",
            window.w, window.h
        )));
    }

    let comps = src.components();
    let mut out = PixelBuffer::new(window.w, window.h, comps)?;
    let (ox, oy) = (i64::from(origin.0), i64::from(origin.1));

    // Column taps are shared by every row
    let columns: Vec<(i64, f32)> = (window.x..window.right())
        .map(|j| {
            let (ix, dx) = factors.map_x(j);
            (ix - ox, dx)
        })
        .collect();

    let mut rows = [0.0f32; 4];
    for (row, i) in (window.y..window.bottom()).enumerate() {
        let (iy, dy) = factors.map_y(i);
        let iy = iy - oy;
        let line = out.row_mut(row as u32);

        for (col, &(ix, dx)) in columns.iter().enumerate() {
            for c in 0..comps {
                for (jj, r) in rows.iter_mut().enumerate() {
                    let y = iy + jj as i64 - 1;
                    let taps = [
                        src.tap(ix - 1, y, c),
                        src.tap(ix, y, c),
                        src.tap(ix + 1, y, c),
                        src.tap(ix + 2, y, c),
                    ];
                    *r = cubic(taps, dx);
                }
                line[col * comps as usize + c as usize] = saturate(cubic(rows, dy));
            }
        }
    }
    Ok(out)
}

/// Resample a whole buffer to `dst_w x dst_h`.
pub fn scale_bicubic_to_size(pix: &PixelBuffer, dst_w: u32, dst_h: u32) -> TransformResult<PixelBuffer> {
    let factors = ScaleFactors::from_sizes(pix.width(), pix.height(), dst_w, dst_h)?;
    resample_window(pix, (0, 0), &factors, Rect::full(dst_w, dst_h))
}

/// Resample a whole buffer by destination/source rates.
///
/// The destination size is `floor(rate * size)` on each axis.
///
/// # Errors
///
/// Returns [`TransformError::InvalidScaleFactor`] if a rate is not a
/// positive finite number or yields a zero or oversized dimension.
pub fn scale_bicubic(pix: &PixelBuffer, rate_x: f64, rate_y: f64) -> TransformResult<PixelBuffer> {
    let dst_w = scaled_len(pix.width(), rate_x)?;
    let dst_h = scaled_len(pix.height(), rate_y)?;
    scale_bicubic_to_size(pix, dst_w, dst_h)
}

fn scaled_len(len: u32, rate: f64) -> TransformResult<u32> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(TransformError::InvalidScaleFactor(format!("rate {}", rate)));
    }
    let scaled = (f64::from(len) * rate).floor();
    if scaled < 1.0 || scaled > f64::from(u32::MAX) {
        return Err(TransformError::InvalidScaleFactor(format!(
            "rate {} maps {} pixels to {}",
            rate, len, scaled
        )));
    }
    Ok(scaled as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textured(width: u32, height: u32, components: u32) -> PixelBuffer {
        let mut pix = PixelBuffer::new(width, height, components).unwrap();
        for (k, b) in pix.data_mut().iter_mut().enumerate() {
            *b = ((k * 7919 + (k / 3) * 104_729) % 256) as u8;
        }
        pix
    }

    #[test]
    fn test_cubic_endpoints_and_ramps() {
        let p = [3.0, 10.0, 50.0, 7.0];
        assert_eq!(cubic(p, 0.0), 10.0);
        assert!((cubic(p, 1.0) - 50.0).abs() < 1e-4);
        let ramp = [10.0, 20.0, 30.0, 40.0];
        for t in [0.0, 0.25, 0.5, 0.75] {
            assert!((cubic(ramp, t) - (20.0 + 10.0 * t)).abs() < 1e-4);
        }
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate(286.875), 255);
        assert_eq!(saturate(-31.875), 0);
        assert_eq!(saturate(127.9), 127);
        assert_eq!(saturate(0.0), 0);
        assert_eq!(saturate(255.0), 255);
    }

    #[test]
    fn test_scale_factors() {
        let f = ScaleFactors::from_sizes(800, 600, 400, 300).unwrap();
        assert_eq!((f.x, f.y), (2.0, 2.0));
        assert_eq!(f.map_x(3), (6, 0.0));
        let up = ScaleFactors::from_sizes(100, 100, 200, 200).unwrap();
        assert_eq!(up.map_y(3), (1, 0.5));
        assert!(ScaleFactors::from_sizes(10, 10, 0, 5).is_err());
        assert!(ScaleFactors::from_sizes(0, 10, 5, 5).is_err());
    }

    #[test]
    fn test_identity_is_exact() {
        for comps in 1..=4 {
            let pix = textured(23, 17, comps);
            let out = scale_bicubic_to_size(&pix, 23, 17).unwrap();
            assert_eq!(out, pix);
        }
    }

    #[test]
    fn test_overshoot_saturates_high() {
        // Columns 0 255 255 0 repeated; halfway between the two 255s the
        // cubic overshoots to about 287
        let mut pix = PixelBuffer::new(16, 4, 1).unwrap();
        for y in 0..4 {
            for x in 0..16 {
                let v = if matches!(x % 4, 1 | 2) { 255 } else { 0 };
                pix.set(x, y, 0, v);
            }
        }
        let out = scale_bicubic_to_size(&pix, 32, 4).unwrap();
        // Destination column 11 maps to source 5.5, between columns 5 and 6
        assert_eq!(out.get(11, 1, 0), 255);
        assert_eq!(out.get(11, 2, 0), 255);
    }

    #[test]
    fn test_undershoot_saturates_low() {
        let mut pix = PixelBuffer::new(16, 4, 1).unwrap();
        for y in 0..4 {
            for x in 0..16 {
                let v = if matches!(x % 4, 1 | 2) { 0 } else { 255 };
                pix.set(x, y, 0, v);
            }
        }
        let out = scale_bicubic_to_size(&pix, 32, 4).unwrap();
        assert_eq!(out.get(11, 1, 0), 0);
        assert_eq!(out.get(11, 2, 0), 0);
    }

    #[test]
    fn test_upscale_reproduces_ramp() {
        let mut pix = PixelBuffer::new(100, 100, 1).unwrap();
        for y in 0..100 {
            for x in 0..100 {
                pix.set(x, y, 0, (2 * x) as u8);
            }
        }
        let out = scale_bicubic_to_size(&pix, 200, 200).unwrap();
        for i in 2..196 {
            for j in 2..196 {
                let v = i32::from(out.get(j, i, 0));
                assert!((v - j as i32).abs() <= 1, "({j}, {i}) = {v}");
            }
        }
    }

    #[test]
    fn test_window_matches_full_resample() {
        let pix = textured(40, 30, 3);
        let factors = ScaleFactors::from_sizes(40, 30, 57, 21).unwrap();
        let full = resample_window(&pix, (0, 0), &factors, Rect::full(57, 21)).unwrap();

        let window = Rect::new(20, 5, 15, 9);
        // Source covering every tap of the window
        let (x0, _) = factors.map_x(window.x);
        let (x1, _) = factors.map_x(window.right() - 1);
        let (y0, _) = factors.map_y(window.y);
        let (y1, _) = factors.map_y(window.bottom() - 1);
        let cover = Rect::from_ranges(
            (x0 as u32 - 1)..(x1 as u32 + 3).min(40),
            (y0 as u32 - 1)..(y1 as u32 + 3).min(30),
        );
        let sub = pix.clip_rectangle(cover).unwrap();
        let part = resample_window(&sub, (cover.x, cover.y), &factors, window).unwrap();
        assert_eq!(part, full.clip_rectangle(window).unwrap());
    }

    #[test]
    fn test_scale_by_rate() {
        let pix = textured(101, 40, 1);
        let out = scale_bicubic(&pix, 0.5, 1.5).unwrap();
        assert_eq!((out.width(), out.height()), (50, 60));
        assert!(scale_bicubic(&pix, 0.0, 1.0).is_err());
        assert!(scale_bicubic(&pix, 0.001, 1.0).is_err());
        assert!(scale_bicubic(&pix, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_empty_window_rejected() {
        let pix = textured(4, 4, 1);
        let factors = ScaleFactors::from_sizes(4, 4, 8, 8).unwrap();
        assert!(matches!(
            resample_window(&pix, (0, 0), &factors, Rect::new(0, 0, 0, 3)),
            Err(TransformError::InvalidParameters(_))
        ));
    }
}
