//! Image header reading
//!
//! Provides metadata extraction from image files without decoding pixel data.
//! File headers are read through a buffered reader, so only the leading
//! bytes of a file are touched.

use crate::{IoError, IoResult, detect_format_from_bytes};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;
use tilescale_core::ImageFormat;

/// Image metadata read without decoding pixel data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel of the decoded image (1 gray, 2 gray+alpha, 3 RGB, 4 RGBA)
    pub components: u32,
    /// Detected image format
    pub format: ImageFormat,
}

/// Read image metadata from a file path without decoding pixel data
pub fn read_image_header<P: AsRef<Path>>(path: P) -> IoResult<ImageHeader> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::from_open(e, path))?;
    let mut reader = BufReader::new(file);
    let format = detect_format_from_bytes(reader.fill_buf()?)?;
    read_header_for_format(reader, format)
}

/// Read image metadata from bytes without decoding pixel data
pub fn read_image_header_mem(data: &[u8]) -> IoResult<ImageHeader> {
    let format = detect_format_from_bytes(data)?;
    read_header_for_format(Cursor::new(data), format)
}

/// Read header for a specific format
pub(crate) fn read_header_for_format<R: BufRead + Seek>(
    reader: R,
    format: ImageFormat,
) -> IoResult<ImageHeader> {
    match (format, reader) {
        #[cfg(feature = "pnm")]
        (ImageFormat::Pnm, reader) => crate::pnm::read_header_pnm(reader),

        #[cfg(feature = "png-format")]
        (ImageFormat::Png, reader) => crate::png::read_header_png(reader),

        #[cfg(feature = "jpeg")]
        (ImageFormat::Jpeg, reader) => crate::jpeg::read_header_jpeg(reader),

        (unsupported, _reader) => Err(IoError::UnsupportedFormat(format!("{:?}", unsupported))),
    }
}
