//! PixelBuffer - The main image container
//!
//! A `PixelBuffer` owns a flat byte array of 8-bit samples.
//!
//! # Pixel layout
//!
//! - Samples are stored row-major, channel-interleaved
//! - There is no row padding: row `y` starts at byte `y * width * components`
//! - Sample `(x, y, c)` lives at `(y * width + x) * components + c`
//!
//! # Ownership model
//!
//! The buffer has exactly one allocation path ([`PixelBuffer::allocate`],
//! also used by [`PixelBuffer::new`]) and is released when the value is
//! dropped. Scaling produces a new buffer rather than mutating the source.

mod access;
mod clip;
mod convert;

use crate::error::{Error, Result};

/// Largest supported number of samples per pixel
pub const MAX_COMPONENTS: u32 = 4;

/// Image file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Unknown format
    #[default]
    Unknown,
    /// JFIF JPEG format
    Jpeg,
    /// PNG format
    Png,
    /// Binary PNM format (P5 / P6)
    Pnm,
}

impl ImageFormat {
    /// Get the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Unknown => "dat",
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Pnm => "pnm",
        }
    }

    /// Guess the format from a file extension (case-insensitive).
    ///
    /// Returns `None` for unrecognized extensions.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "pnm" | "ppm" | "pgm" => Some(Self::Pnm),
            _ => None,
        }
    }

    /// Guess the format from the extension of a path.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// In-memory raster image with 8-bit samples.
///
/// # Examples
///
/// ```
/// use tilescale_core::PixelBuffer;
///
/// let mut pix = PixelBuffer::new(640, 480, 3).unwrap();
/// pix.set(10, 20, 1, 200);
/// assert_eq!(pix.get(10, 20, 1), 200);
/// // Out-of-range reads are zero, not errors
/// assert_eq!(pix.get(640, 0, 0), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Samples per pixel (1 for grayscale, 3 for RGB, 4 for RGBA)
    components: u32,
    /// Sample data, `width * height * components` bytes
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new zero-filled buffer.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimension`] if width or height is 0
    /// - [`Error::InvalidComponents`] if `components` is not in `1..=4`
    /// - [`Error::AllocationFailed`] if the storage cannot be obtained
    pub fn new(width: u32, height: u32, components: u32) -> Result<Self> {
        let mut pix = Self {
            width: 0,
            height: 0,
            components: 0,
            data: Vec::new(),
        };
        pix.allocate(width, height, components)?;
        Ok(pix)
    }

    /// (Re)allocate storage for `width x height x components` samples.
    ///
    /// Previous contents are discarded and the new storage is zero-filled.
    /// On error the buffer is left unchanged.
    pub fn allocate(&mut self, width: u32, height: u32, components: u32) -> Result<()> {
        let len = Self::checked_len(width, height, components)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailed { bytes: len as u64 })?;
        data.resize(len, 0);

        self.width = width;
        self.height = height;
        self.components = components;
        self.data = data;
        Ok(())
    }

    /// Wrap existing sample data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLength`] if `data.len()` is not
    /// `width * height * components`, plus the validation errors of
    /// [`PixelBuffer::new`].
    pub fn from_raw(width: u32, height: u32, components: u32, data: Vec<u8>) -> Result<Self> {
        let expected = Self::checked_len(width, height, components)?;
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            components,
            data,
        })
    }

    /// Validate dimensions and compute the sample count.
    fn checked_len(width: u32, height: u32, components: u32) -> Result<usize> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        if components == 0 || components > MAX_COMPONENTS {
            return Err(Error::InvalidComponents(components));
        }
        let bytes = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|n| n.checked_mul(u64::from(components)))
            .ok_or(Error::AllocationFailed { bytes: u64::MAX })?;
        usize::try_from(bytes).map_err(|_| Error::AllocationFailed { bytes })
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of samples per pixel.
    #[inline]
    pub fn components(&self) -> u32 {
        self.components
    }

    /// Number of bytes in one row.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.width as usize * self.components as usize
    }

    /// Get raw access to the sample data.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable raw access to the sample data.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its sample data.
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Get the samples of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.row_stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Get the samples of row `y` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.row_stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// Check if two buffers have the same width, height and component count.
    pub fn sizes_equal(&self, other: &PixelBuffer) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.components == other.components
    }
}
