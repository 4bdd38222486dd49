//! Rectangle extraction and compositing
//!
//! - [`PixelBuffer::clip_rectangle`] copies a sub-rectangle into a new buffer
//! - [`PixelBuffer::paste`] composites a whole buffer into another at an offset
//!
//! Both work on whole rows with slice copies. Neither clips silently: a
//! rectangle that does not fit is an error, so tiling mistakes surface
//! instead of producing gaps.

use super::PixelBuffer;
use crate::Rect;
use crate::error::{Error, Result};

impl PixelBuffer {
    /// Extract the rectangle `region` into a new buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParameter`] if `region` is empty
    /// - [`Error::RegionOutOfBounds`] if `region` extends past the image
    pub fn clip_rectangle(&self, region: Rect) -> Result<PixelBuffer> {
        if region.is_empty() {
            return Err(Error::InvalidParameter(format!(
                "clip rectangle has zero dimension: {}x{}",
                region.w, region.h
            )));
        }
        self.check_fits(region)?;

        let mut pixd = PixelBuffer::new(region.w, region.h, self.components)?;
        let comps = self.components as usize;
        let start = region.x as usize * comps;
        let end = region.right() as usize * comps;
        for dy in 0..region.h {
            pixd.row_mut(dy).copy_from_slice(&self.row(region.y + dy)[start..end]);
        }
        Ok(pixd)
    }

    /// Copy every sample of `src` into `self` with its top-left at `(x, y)`.
    ///
    /// # Errors
    ///
    /// - [`Error::IncompatibleComponents`] if the component counts differ
    /// - [`Error::RegionOutOfBounds`] if `src` does not fit at `(x, y)`
    pub fn paste(&mut self, src: &PixelBuffer, x: u32, y: u32) -> Result<()> {
        if src.components != self.components {
            return Err(Error::IncompatibleComponents(self.components, src.components));
        }
        let region = Rect::new(x, y, src.width, src.height);
        self.check_fits(region)?;

        let comps = self.components as usize;
        let start = x as usize * comps;
        let end = start + src.row_stride();
        for sy in 0..src.height {
            self.row_mut(y + sy)[start..end].copy_from_slice(src.row(sy));
        }
        Ok(())
    }

    fn check_fits(&self, region: Rect) -> Result<()> {
        let fits = u64::from(region.x) + u64::from(region.w) <= u64::from(self.width)
            && u64::from(region.y) + u64::from(region.h) <= u64::from(self.height);
        if fits {
            Ok(())
        } else {
            Err(Error::RegionOutOfBounds {
                x: region.x,
                y: region.y,
                w: region.w,
                h: region.h,
                width: self.width,
                height: self.height,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32, components: u32) -> PixelBuffer {
        let len = (width * height * components) as usize;
        let data = (0..len).map(|i| (i % 251) as u8).collect();
        PixelBuffer::from_raw(width, height, components, data).unwrap()
    }

    #[test]
    fn test_clip_rectangle() {
        let pix = numbered(10, 8, 3);
        let sub = pix.clip_rectangle(Rect::new(2, 3, 4, 2)).unwrap();
        assert_eq!((sub.width(), sub.height(), sub.components()), (4, 2, 3));
        for y in 0..2 {
            for x in 0..4 {
                for c in 0..3 {
                    assert_eq!(sub.get(x, y, c), pix.get(x + 2, y + 3, c));
                }
            }
        }
    }

    #[test]
    fn test_clip_rectangle_out_of_bounds() {
        let pix = numbered(10, 8, 1);
        assert!(pix.clip_rectangle(Rect::new(8, 0, 3, 1)).is_err());
        assert!(pix.clip_rectangle(Rect::new(0, 0, 0, 1)).is_err());
        assert!(pix.clip_rectangle(Rect::new(0, 0, 10, 8)).is_ok());
    }

    #[test]
    fn test_paste() {
        let mut dst = PixelBuffer::new(6, 5, 2).unwrap();
        let src = numbered(3, 2, 2);
        dst.paste(&src, 3, 3).unwrap();
        for y in 0..5 {
            for x in 0..6 {
                for c in 0..2 {
                    let expected = if x >= 3 && y >= 3 {
                        src.get(x - 3, y - 3, c)
                    } else {
                        0
                    };
                    assert_eq!(dst.get(x, y, c), expected, "({x}, {y}, {c})");
                }
            }
        }
    }

    #[test]
    fn test_paste_rejects_overflow_and_mismatch() {
        let mut dst = PixelBuffer::new(6, 5, 2).unwrap();
        let src = numbered(3, 2, 2);
        assert!(matches!(
            dst.paste(&src, 4, 0),
            Err(Error::RegionOutOfBounds { .. })
        ));
        assert!(matches!(
            dst.paste(&src, 0, 4),
            Err(Error::RegionOutOfBounds { .. })
        ));
        let rgb = numbered(1, 1, 3);
        assert!(matches!(
            dst.paste(&rgb, 0, 0),
            Err(Error::IncompatibleComponents(2, 3))
        ));
        assert!(dst.data().iter().all(|&b| b == 0));
    }
}
