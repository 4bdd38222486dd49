//! tilescale-io - Image decoding, region reads and encoding
//!
//! # Supported formats
//!
//! | Format | Read | Write | Region reads                     | Feature      |
//! |--------|------|-------|----------------------------------|--------------|
//! | JPEG   | yes  | yes   | scanline by scanline, stops early | `jpeg`       |
//! | PNG    | yes  | yes   | row by row, stops early          | `png-format` |
//! | PNM    | yes  | yes   | row by row, stops early          | `pnm`        |
//!
//! Interlaced PNGs are the one case where a region read decodes the whole
//! frame.
//!
//! Writers always produce 3-component RGB (PNM keeps 1-component gray as
//! P5).
//!
//! # Examples
//!
//! ```no_run
//! use tilescale_io::{ImageSource, FileSource};
//! use tilescale_core::Rect;
//!
//! let mut source = FileSource::open("photo.jpg").unwrap();
//! let header = *source.header();
//! let top = source.read_region(Rect::new(0, 0, header.width, 16)).unwrap();
//! assert_eq!(top.height(), 16);
//! ```

pub mod error;
pub mod format;
pub mod header;
pub mod source;

#[cfg(feature = "jpeg")]
pub mod jpeg;
#[cfg(feature = "png-format")]
pub mod png;
#[cfg(feature = "pnm")]
pub mod pnm;

pub use error::{IoError, IoResult};
pub use format::{detect_format, detect_format_from_bytes};
pub use header::{ImageHeader, read_image_header, read_image_header_mem};
pub use source::{FileSource, ImageSource, MemorySource};
pub use tilescale_core::ImageFormat;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Cursor, Seek, Write};
use std::path::Path;
use tilescale_core::PixelBuffer;
use tracing::debug;

/// Read an image from a file path, detecting the format from its content.
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let path = path.as_ref();
    let format = detect_format(path)?;
    let file = File::open(path).map_err(|e| IoError::from_open(e, path))?;
    let pix = read_image_format(BufReader::new(file), format)?;
    debug!(
        path = %path.display(),
        width = pix.width(),
        height = pix.height(),
        components = pix.components(),
        "decoded image"
    );
    Ok(pix)
}

/// Read an image from encoded bytes.
pub fn read_image_mem(data: &[u8]) -> IoResult<PixelBuffer> {
    let format = detect_format_from_bytes(data)?;
    read_image_format(Cursor::new(data), format)
}

/// Read an image of a known format from a reader.
pub fn read_image_format<R: BufRead + Seek>(reader: R, format: ImageFormat) -> IoResult<PixelBuffer> {
    match (format, reader) {
        #[cfg(feature = "jpeg")]
        (ImageFormat::Jpeg, reader) => jpeg::read_jpeg(reader),

        #[cfg(feature = "png-format")]
        (ImageFormat::Png, reader) => png::read_png(reader),

        #[cfg(feature = "pnm")]
        (ImageFormat::Pnm, reader) => pnm::read_pnm(reader),

        (unsupported, _reader) => Err(IoError::UnsupportedFormat(format!("{:?}", unsupported))),
    }
}

/// Write an image to a file, choosing the format from the path's extension.
///
/// Unrecognized or missing extensions are written as JPEG. `quality` only
/// affects JPEG output.
pub fn write_image<P: AsRef<Path>>(pix: &PixelBuffer, path: P, quality: u8) -> IoResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Jpeg);
    write_image_format(pix, path, format, quality)
}

/// Write an image to a file in the given format.
///
/// The image is encoded in memory first, so an encode error leaves no file
/// behind.
pub fn write_image_format<P: AsRef<Path>>(
    pix: &PixelBuffer,
    path: P,
    format: ImageFormat,
    quality: u8,
) -> IoResult<()> {
    let path = path.as_ref();
    let encoded = write_image_mem(pix, format, quality)?;
    let file = File::create(path).map_err(|e| IoError::from_open(e, path))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&encoded)?;
    writer.flush()?;
    debug!(
        path = %path.display(),
        format = ?format,
        width = pix.width(),
        height = pix.height(),
        bytes = encoded.len(),
        "wrote image"
    );
    Ok(())
}

/// Encode an image into memory.
pub fn write_image_mem(pix: &PixelBuffer, format: ImageFormat, quality: u8) -> IoResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_image_to(pix, &mut buf, format, quality)?;
    Ok(buf)
}

fn write_image_to<W: Write>(
    pix: &PixelBuffer,
    writer: W,
    format: ImageFormat,
    quality: u8,
) -> IoResult<()> {
    match (format, writer, quality) {
        #[cfg(feature = "jpeg")]
        (ImageFormat::Jpeg, writer, quality) => jpeg::write_jpeg(pix, writer, quality),

        #[cfg(feature = "png-format")]
        (ImageFormat::Png, writer, _) => png::write_png(pix, writer),

        #[cfg(feature = "pnm")]
        (ImageFormat::Pnm, writer, _) => pnm::write_pnm(&pix.to_rgb()?, writer),

        (unsupported, _writer, _quality) => {
            Err(IoError::UnsupportedFormat(format!("{:?}", unsupported)))
        }
    }
}
