//! Region-readable image sources
//!
//! An [`ImageSource`] hands out rectangles of an image on demand, which is
//! what lets the tile scheduler keep only one tile of source pixels in
//! memory at a time.
//!
//! Every source counts the scanlines it had to decode to satisfy its reads.
//! File reads decode rows from the top through a single row buffer and stop
//! at the last requested row, so a read of `region` costs `region.bottom()`
//! scanlines. Interlaced PNGs are the exception and cost the full height.

use crate::header::read_header_for_format;
use crate::{ImageHeader, IoError, IoResult, detect_format};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tilescale_core::{ImageFormat, PixelBuffer, Rect};
use tracing::debug;

/// A decoded image that can be read one rectangle at a time.
pub trait ImageSource {
    /// Dimensions and layout of the full image.
    fn header(&self) -> &ImageHeader;

    /// Decode the pixels of `region`.
    ///
    /// The returned buffer is exactly `region.w x region.h` with
    /// `header().components` samples per pixel.
    fn read_region(&mut self, region: Rect) -> IoResult<PixelBuffer>;

    /// Total scanlines decoded by all reads so far.
    fn scanlines_decoded(&self) -> u64;
}

/// Check that `region` is non-empty and lies inside the image.
pub(crate) fn check_region(header: &ImageHeader, region: Rect) -> IoResult<()> {
    if !region.is_empty() && Rect::full(header.width, header.height).contains_rect(&region) {
        return Ok(());
    }
    Err(IoError::Core(tilescale_core::Error::RegionOutOfBounds {
        x: region.x,
        y: region.y,
        w: region.w,
        h: region.h,
        width: header.width,
        height: header.height,
    }))
}

/// An image file read region by region.
///
/// The file is reopened for every read; nothing decoded is kept between
/// reads.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    header: ImageHeader,
    scanlines: u64,
}

impl FileSource {
    /// Open `path` and read its header.
    ///
    /// # Errors
    ///
    /// - [`IoError::FileNotFound`] if the file does not exist
    /// - [`IoError::UnsupportedFormat`] if the format is unknown or disabled
    pub fn open<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let path = path.as_ref();
        let format = detect_format(path)?;
        let file = File::open(path).map_err(|e| IoError::from_open(e, path))?;
        let header = read_header_for_format(BufReader::new(file), format)?;
        Ok(Self {
            path: path.to_path_buf(),
            header,
            scanlines: 0,
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn reader(&self) -> IoResult<BufReader<File>> {
        let file = File::open(&self.path).map_err(|e| IoError::from_open(e, &self.path))?;
        Ok(BufReader::new(file))
    }
}

impl ImageSource for FileSource {
    fn header(&self) -> &ImageHeader {
        &self.header
    }

    fn read_region(&mut self, region: Rect) -> IoResult<PixelBuffer> {
        check_region(&self.header, region)?;
        debug!(
            path = %self.path.display(),
            x = region.x,
            y = region.y,
            w = region.w,
            h = region.h,
            "reading source region"
        );

        let (pix, lines) = match self.header.format {
            #[cfg(feature = "pnm")]
            ImageFormat::Pnm => crate::pnm::read_pnm_region(self.reader()?, region)?,

            #[cfg(feature = "png-format")]
            ImageFormat::Png => crate::png::read_png_region(self.reader()?, region)?,

            #[cfg(feature = "jpeg")]
            ImageFormat::Jpeg => crate::jpeg::read_jpeg_region(self.reader()?, region)?,

            unsupported => {
                return Err(IoError::UnsupportedFormat(format!("{:?}", unsupported)));
            }
        };
        self.scanlines += lines;
        if pix.components() != self.header.components {
            return Err(IoError::InvalidData(format!(
                "{} changed since it was opened",
                self.path.display()
            )));
        }
        Ok(pix)
    }

    fn scanlines_decoded(&self) -> u64 {
        self.scanlines
    }
}

/// An already-decoded buffer served as a source.
///
/// A read of `region` is charged `region.bottom()` scanlines, the cost a
/// sequential decoder would pay to reach it.
#[derive(Debug, Clone)]
pub struct MemorySource {
    pix: PixelBuffer,
    header: ImageHeader,
    scanlines: u64,
    reads: usize,
}

impl MemorySource {
    /// Wrap a buffer.
    pub fn new(pix: PixelBuffer) -> Self {
        let header = ImageHeader {
            width: pix.width(),
            height: pix.height(),
            components: pix.components(),
            format: ImageFormat::Unknown,
        };
        Self {
            pix,
            header,
            scanlines: 0,
            reads: 0,
        }
    }

    /// Number of `read_region` calls served.
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Get the wrapped buffer.
    pub fn pix(&self) -> &PixelBuffer {
        &self.pix
    }
}

impl ImageSource for MemorySource {
    fn header(&self) -> &ImageHeader {
        &self.header
    }

    fn read_region(&mut self, region: Rect) -> IoResult<PixelBuffer> {
        check_region(&self.header, region)?;
        self.reads += 1;
        self.scanlines += u64::from(region.bottom());
        Ok(self.pix.clip_rectangle(region)?)
    }

    fn scanlines_decoded(&self) -> u64 {
        self.scanlines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32) -> PixelBuffer {
        let data = (0..width * height).map(|i| (i % 256) as u8).collect();
        PixelBuffer::from_raw(width, height, 1, data).unwrap()
    }

    #[test]
    fn test_memory_source_reads_and_counts() {
        let pix = numbered(10, 10);
        let mut source = MemorySource::new(pix.clone());
        assert_eq!(source.header().width, 10);
        assert_eq!(source.header().format, ImageFormat::Unknown);

        let region = Rect::new(5, 2, 5, 3);
        let sub = source.read_region(region).unwrap();
        assert_eq!(sub, pix.clip_rectangle(region).unwrap());
        assert_eq!(source.scanlines_decoded(), 5);

        source.read_region(Rect::full(10, 10)).unwrap();
        assert_eq!(source.scanlines_decoded(), 15);
        assert_eq!(source.reads(), 2);
    }

    #[test]
    fn test_memory_source_rejects_bad_regions() {
        let mut source = MemorySource::new(numbered(4, 4));
        assert!(source.read_region(Rect::new(0, 0, 0, 4)).is_err());
        assert!(source.read_region(Rect::new(3, 0, 2, 1)).is_err());
        assert_eq!(source.scanlines_decoded(), 0);
        assert_eq!(source.reads(), 0);
    }

    #[test]
    #[cfg(feature = "png-format")]
    fn test_png_file_read_stops_at_region_bottom() {
        let pix = numbered(64, 400);
        let path = std::env::temp_dir().join(format!("tilescale-tall-{}.png", std::process::id()));
        let file = File::create(&path).unwrap();
        crate::png::write_png(&pix, std::io::BufWriter::new(file)).unwrap();

        let mut source = FileSource::open(&path).unwrap();
        assert_eq!(source.header().height, 400);
        let top = source.read_region(Rect::new(0, 0, 64, 2)).unwrap();
        assert_eq!(source.scanlines_decoded(), 2);
        assert_eq!((top.width(), top.height()), (64, 2));
        assert_eq!(top.get(10, 1, 0), pix.get(10, 1, 0));

        source.read_region(Rect::new(32, 100, 8, 10)).unwrap();
        assert_eq!(source.scanlines_decoded(), 112);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_file_source_missing() {
        assert!(matches!(
            FileSource::open("/nonexistent/tilescale/source.pnm"),
            Err(IoError::FileNotFound(_))
        ));
    }
}
