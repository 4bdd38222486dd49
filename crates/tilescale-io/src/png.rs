//! PNG image format support
//!
//! Decoding expands palettes and low bit depths and strips 16-bit samples,
//! so every PNG arrives as 8-bit gray, gray+alpha, RGB or RGBA.
//!
//! [`read_png_region`] pulls rows one at a time and stops after the last
//! requested row. Interlaced images cannot be cut short that way and are
//! decoded as a whole frame before cropping.

use crate::{ImageHeader, IoError, IoResult};
use png::{BitDepth, ColorType, Decoder, Encoder, Reader, Transformations};
use std::io::{BufRead, Seek, Write};
use tilescale_core::{ImageFormat, PixelBuffer, Rect};

fn components_for(color_type: ColorType) -> IoResult<u32> {
    match color_type {
        ColorType::Grayscale => Ok(1),
        ColorType::GrayscaleAlpha => Ok(2),
        ColorType::Rgb => Ok(3),
        ColorType::Rgba => Ok(4),
        ColorType::Indexed => Err(IoError::UnsupportedFormat(
            "unexpanded indexed PNG".to_string(),
        )),
    }
}

/// Start decoding and describe the transformed output.
fn open<R: BufRead + Seek>(reader: R) -> IoResult<(Reader<R>, ImageHeader)> {
    let mut decoder = Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let reader = decoder
        .read_info()
        .map_err(|e| IoError::DecodeError(format!("PNG header error: {}", e)))?;

    let (color_type, bit_depth) = reader.output_color_type();
    if bit_depth != BitDepth::Eight {
        return Err(IoError::UnsupportedFormat(format!(
            "PNG output bit depth {:?}",
            bit_depth
        )));
    }
    let header = ImageHeader {
        width: reader.info().width,
        height: reader.info().height,
        components: components_for(color_type)?,
        format: ImageFormat::Png,
    };
    Ok((reader, header))
}

fn check_row_len(len: usize, header: &ImageHeader) -> IoResult<()> {
    // Rows are tightly packed at 8 bits per sample
    let row_bytes = header.width as usize * header.components as usize;
    if len == row_bytes {
        return Ok(());
    }
    Err(IoError::InvalidData(format!(
        "PNG line size {} does not match {} bytes per row",
        len, row_bytes
    )))
}

fn decode_frame<R: BufRead + Seek>(
    reader: &mut Reader<R>,
    header: &ImageHeader,
) -> IoResult<PixelBuffer> {
    let buf_size = reader
        .output_buffer_size()
        .ok_or_else(|| IoError::DecodeError("failed to get output buffer size".to_string()))?;
    let mut buf = vec![0; buf_size];
    let output_info = reader
        .next_frame(&mut buf)
        .map_err(|e| IoError::DecodeError(format!("PNG frame error: {}", e)))?;
    check_row_len(output_info.line_size, header)?;
    buf.truncate(output_info.line_size * header.height as usize);

    Ok(PixelBuffer::from_raw(
        header.width,
        header.height,
        header.components,
        buf,
    )?)
}

/// Read the header of a PNG image.
///
/// The component count reflects the decoded layout, so an indexed PNG
/// reports 3 (or 4 with transparency).
pub fn read_header_png<R: BufRead + Seek>(reader: R) -> IoResult<ImageHeader> {
    open(reader).map(|(_, header)| header)
}

/// Read a PNG image
pub fn read_png<R: BufRead + Seek>(reader: R) -> IoResult<PixelBuffer> {
    let (mut reader, header) = open(reader)?;
    decode_frame(&mut reader, &header)
}

/// Read the rectangle `region` of a PNG image.
///
/// Returns the cropped buffer and the number of scanlines decoded, which is
/// `region.bottom()` for progressive images and the full height for
/// interlaced ones.
///
/// # Errors
///
/// Returns [`IoError::Core`] with a region error if `region` is empty or
/// does not lie inside the image.
pub fn read_png_region<R: BufRead + Seek>(
    reader: R,
    region: Rect,
) -> IoResult<(PixelBuffer, u64)> {
    let (mut reader, header) = open(reader)?;
    crate::source::check_region(&header, region)?;

    if reader.info().interlaced {
        let pix = decode_frame(&mut reader, &header)?;
        return Ok((pix.clip_rectangle(region)?, u64::from(header.height)));
    }

    let comps = header.components as usize;
    let mut pix = PixelBuffer::new(region.w, region.h, header.components)?;
    let (first, last) = (region.x as usize * comps, region.right() as usize * comps);
    for y in 0..region.bottom() {
        let row = reader
            .next_row()
            .map_err(|e| IoError::DecodeError(format!("PNG row {} error: {}", y, e)))?
            .ok_or_else(|| IoError::DecodeError(format!("PNG image data ends before row {}", y)))?;
        let data = row.data();
        check_row_len(data.len(), &header)?;
        if y >= region.y {
            pix.row_mut(y - region.y).copy_from_slice(&data[first..last]);
        }
    }
    Ok((pix, u64::from(region.bottom())))
}

/// Write a buffer as an 8-bit RGB PNG.
pub fn write_png<W: Write>(pix: &PixelBuffer, writer: W) -> IoResult<()> {
    let rgb = pix.to_rgb()?;

    let mut encoder = Encoder::new(writer, rgb.width(), rgb.height());
    encoder.set_color(ColorType::Rgb);
    encoder.set_depth(BitDepth::Eight);

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| IoError::EncodeError(format!("PNG header error: {}", e)))?;
    png_writer
        .write_image_data(rgb.data())
        .map_err(|e| IoError::EncodeError(format!("PNG write error: {}", e)))?;
    png_writer
        .finish()
        .map_err(|e| IoError::EncodeError(format!("PNG finish error: {}", e)))?;
    Ok(())
}
