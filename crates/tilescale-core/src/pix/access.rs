//! Pixel access functions
//!
//! Bounds-checked getters and setters for individual samples.
//!
//! # Out-of-range policy
//!
//! Reads outside the image return 0 and writes outside the image are ignored.
//! This is a saturating contract, not an error path: the bicubic resampler
//! reads up to two pixels past every border and relies on those taps being
//! zero.

use super::PixelBuffer;

impl PixelBuffer {
    #[inline]
    fn index(&self, x: u32, y: u32, c: u32) -> Option<usize> {
        if x >= self.width || y >= self.height || c >= self.components {
            return None;
        }
        let pixel = y as usize * self.width as usize + x as usize;
        Some(pixel * self.components as usize + c as usize)
    }

    /// Get sample `c` of pixel `(x, y)`.
    ///
    /// Returns 0 if `x >= width`, `y >= height` or `c >= components`.
    #[inline]
    pub fn get(&self, x: u32, y: u32, c: u32) -> u8 {
        match self.index(x, y, c) {
            Some(i) => self.data[i],
            None => 0,
        }
    }

    /// Set sample `c` of pixel `(x, y)`.
    ///
    /// Out-of-range coordinates are a silent no-op.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, c: u32, value: u8) {
        if let Some(i) = self.index(x, y, c) {
            self.data[i] = value;
        }
    }

    /// Read a resampler tap at signed coordinates.
    ///
    /// Negative or out-of-range coordinates read as `0.0`.
    #[inline]
    pub fn tap(&self, x: i64, y: i64, c: u32) -> f32 {
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(x), Ok(y)) => f32::from(self.get(x, y, c)),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip() {
        let mut pix = PixelBuffer::new(7, 5, 3).unwrap();
        for y in 0..5 {
            for x in 0..7 {
                for c in 0..3 {
                    let v = ((x * 31 + y * 17 + c * 5) % 256) as u8;
                    pix.set(x, y, c, v);
                    assert_eq!(pix.get(x, y, c), v);
                }
            }
        }
        // Earlier writes survive later ones
        assert_eq!(pix.get(0, 0, 0), 0);
        assert_eq!(pix.get(6, 4, 2), ((6 * 31 + 4 * 17 + 2 * 5) % 256) as u8);
    }

    #[test]
    fn test_out_of_range_get_is_zero() {
        let mut pix = PixelBuffer::new(4, 3, 1).unwrap();
        pix.data_mut().fill(200);
        assert_eq!(pix.get(4, 0, 0), 0);
        assert_eq!(pix.get(0, 3, 0), 0);
        assert_eq!(pix.get(u32::MAX, u32::MAX, 0), 0);
        assert_eq!(pix.get(0, 0, 1), 0);
        assert_eq!(pix.get(3, 2, 0), 200);
    }

    #[test]
    fn test_out_of_range_set_is_noop() {
        let mut pix = PixelBuffer::new(4, 3, 2).unwrap();
        let before = pix.clone();
        pix.set(4, 0, 0, 99);
        pix.set(0, 3, 0, 99);
        pix.set(0, 0, 2, 99);
        assert_eq!(pix, before);
    }

    #[test]
    fn test_tap_signed_coordinates() {
        let mut pix = PixelBuffer::new(2, 2, 1).unwrap();
        pix.data_mut().fill(50);
        assert_eq!(pix.tap(0, 0, 0), 50.0);
        assert_eq!(pix.tap(-1, 0, 0), 0.0);
        assert_eq!(pix.tap(0, -1, 0), 0.0);
        assert_eq!(pix.tap(2, 1, 0), 0.0);
        assert_eq!(pix.tap(i64::MAX, 0, 0), 0.0);
    }
}
