//! Component-count conversion
//!
//! Encoders write 3-channel colour regardless of the source layout, so every
//! buffer can be brought to RGB here.

use super::PixelBuffer;
use crate::error::Result;

impl PixelBuffer {
    /// Convert to a 3-channel RGB buffer.
    ///
    /// - 1 channel: gray replicated into R, G and B
    /// - 2 channels: gray (first channel) replicated, second channel dropped
    /// - 3 channels: copied unchanged
    /// - 4 channels: treated as RGBA, alpha dropped
    pub fn to_rgb(&self) -> Result<PixelBuffer> {
        if self.components == 3 {
            return Ok(self.clone());
        }

        let comps = self.components as usize;
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for px in self.data.chunks_exact(comps) {
            match comps {
                1 | 2 => data.extend_from_slice(&[px[0], px[0], px[0]]),
                _ => data.extend_from_slice(&px[..3]),
            }
        }
        PixelBuffer::from_raw(self.width, self.height, 3, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_to_rgb() {
        let pix = PixelBuffer::from_raw(2, 1, 1, vec![10, 20]).unwrap();
        let rgb = pix.to_rgb().unwrap();
        assert_eq!(rgb.components(), 3);
        assert_eq!(rgb.data(), &[10, 10, 10, 20, 20, 20]);
    }

    #[test]
    fn test_gray_alpha_to_rgb() {
        let pix = PixelBuffer::from_raw(1, 1, 2, vec![77, 255]).unwrap();
        assert_eq!(pix.to_rgb().unwrap().data(), &[77, 77, 77]);
    }

    #[test]
    fn test_rgba_to_rgb() {
        let pix = PixelBuffer::from_raw(1, 2, 4, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let rgb = pix.to_rgb().unwrap();
        assert_eq!((rgb.width(), rgb.height()), (1, 2));
        assert_eq!(rgb.data(), &[1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_rgb_is_copied() {
        let pix = PixelBuffer::from_raw(1, 1, 3, vec![9, 8, 7]).unwrap();
        assert_eq!(pix.to_rgb().unwrap(), pix);
    }
}
