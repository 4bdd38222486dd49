//! JPEG image format support
//!
//! Decoding goes through libjpeg (the `mozjpeg` crate) one scanline at a
//! time. A region read keeps a single full-width row besides the returned
//! buffer and stops after the region's last row. Encoding uses
//! `jpeg-encoder` and always writes 3-component RGB.
//!
//! Grayscale JPEGs decode to 1 component, everything else to RGB. CMYK and
//! YCCK images are rejected.

use crate::{ImageHeader, IoError, IoResult};
use jpeg_encoder::{ColorType, Encoder};
use mozjpeg::decompress::DecompressStarted;
use mozjpeg::{ColorSpace, Decompress};
use std::io::{BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use tilescale_core::{ImageFormat, PixelBuffer, Rect};

/// Quality used when the caller passes 0.
pub const DEFAULT_QUALITY: u8 = 75;

/// Run a decode step, turning a libjpeg error unwind into a decode error.
fn guarded<T>(f: impl FnOnce() -> IoResult<T>) -> IoResult<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| payload.downcast_ref::<&str>().copied())
            .unwrap_or("libjpeg error");
        Err(IoError::DecodeError(format!("JPEG decode error: {}", msg)))
    })
}

fn decode_error(context: &str, err: std::io::Error) -> IoError {
    IoError::DecodeError(format!("JPEG {}: {}", context, err))
}

fn components_for(color_space: ColorSpace) -> IoResult<u32> {
    match color_space {
        ColorSpace::JCS_GRAYSCALE => Ok(1),
        ColorSpace::JCS_CMYK | ColorSpace::JCS_YCCK => Err(IoError::UnsupportedFormat(
            "CMYK JPEG".to_string(),
        )),
        _ => Ok(3),
    }
}

fn open<R: BufRead>(reader: R) -> IoResult<(Decompress<R>, ImageHeader)> {
    let decompress = Decompress::new_reader(reader).map_err(|e| decode_error("header error", e))?;
    let dimension = |v: usize| {
        u32::try_from(v).map_err(|_| IoError::InvalidData(format!("JPEG dimension {}", v)))
    };
    let header = ImageHeader {
        width: dimension(decompress.width())?,
        height: dimension(decompress.height())?,
        components: components_for(decompress.color_space())?,
        format: ImageFormat::Jpeg,
    };
    Ok((decompress, header))
}

fn start<R: BufRead>(
    decompress: Decompress<R>,
    header: &ImageHeader,
) -> IoResult<DecompressStarted<R>> {
    let started = if header.components == 1 {
        decompress.grayscale()
    } else {
        decompress.rgb()
    };
    started.map_err(|e| decode_error("start error", e))
}

/// Read the header of a JPEG image without decoding scan data.
pub fn read_header_jpeg<R: BufRead>(reader: R) -> IoResult<ImageHeader> {
    guarded(move || open(reader).map(|(_, header)| header))
}

/// Read a JPEG image from a reader.
///
/// # Arguments
/// * `reader` - A reader positioned at the JPEG SOI marker (`FF D8`)
pub fn read_jpeg<R: BufRead>(reader: R) -> IoResult<PixelBuffer> {
    guarded(move || {
        let (decompress, header) = open(reader)?;
        let mut pix = PixelBuffer::new(header.width, header.height, header.components)?;
        let mut image = start(decompress, &header)?;
        image
            .read_scanlines_into(pix.data_mut())
            .map_err(|e| decode_error("scanline error", e))?;
        image.finish().map_err(|e| decode_error("finish error", e))?;
        Ok(pix)
    })
}

/// Read the rectangle `region` of a JPEG image.
///
/// Scanlines are decoded from the top through one row buffer; decoding
/// stops after row `region.bottom() - 1`. Returns the cropped buffer and
/// the number of scanlines decoded.
///
/// # Errors
///
/// Returns [`IoError::Core`] with a region error if `region` is empty or
/// does not lie inside the image.
pub fn read_jpeg_region<R: BufRead>(reader: R, region: Rect) -> IoResult<(PixelBuffer, u64)> {
    guarded(move || {
        let (decompress, header) = open(reader)?;
        crate::source::check_region(&header, region)?;

        let comps = header.components as usize;
        let mut row = vec![0u8; header.width as usize * comps];
        let mut pix = PixelBuffer::new(region.w, region.h, header.components)?;
        let (first, last) = (region.x as usize * comps, region.right() as usize * comps);

        let mut image = start(decompress, &header)?;
        for y in 0..region.bottom() {
            image
                .read_scanlines_into(&mut row)
                .map_err(|e| decode_error(&format!("scanline {} error", y), e))?;
            if y >= region.y {
                pix.row_mut(y - region.y).copy_from_slice(&row[first..last]);
            }
        }
        if region.bottom() == header.height {
            image.finish().map_err(|e| decode_error("finish error", e))?;
        }
        Ok((pix, u64::from(region.bottom())))
    })
}

/// Write a buffer as a baseline JPEG.
///
/// The buffer is converted to RGB first. `quality` is clamped to `1..=100`;
/// 0 selects [`DEFAULT_QUALITY`].
///
/// # Errors
///
/// Returns [`IoError::EncodeError`] before anything is written if either
/// dimension exceeds 65535.
pub fn write_jpeg<W: Write>(pix: &PixelBuffer, mut writer: W, quality: u8) -> IoResult<()> {
    let (w16, h16) = check_encodable(pix)?;
    let quality = if quality == 0 {
        DEFAULT_QUALITY
    } else {
        quality.min(100)
    };

    let rgb = pix.to_rgb()?;
    let mut jpeg_buf = Vec::new();
    let encoder = Encoder::new(&mut jpeg_buf, quality);
    encoder
        .encode(rgb.data(), w16, h16, ColorType::Rgb)
        .map_err(|e| IoError::EncodeError(format!("JPEG encode error: {}", e)))?;
    writer.write_all(&jpeg_buf)?;
    Ok(())
}

/// Dimensions as JPEG frame sizes, or an error if they do not fit.
fn check_encodable(pix: &PixelBuffer) -> IoResult<(u16, u16)> {
    match (u16::try_from(pix.width()), u16::try_from(pix.height())) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(IoError::EncodeError(format!(
            "image {}x{} exceeds the JPEG size limit of 65535",
            pix.width(),
            pix.height()
        ))),
    }
}
