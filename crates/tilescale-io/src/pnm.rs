//! PNM (Portable Any Map) format support
//!
//! Reads and writes PGM (P5 binary) and PPM (P6 binary) with a maxval of
//! 255. ASCII variants (P2/P3) and 16-bit samples are not supported.
//!
//! PNM stores raw rows top to bottom, so [`read_pnm_region`] reads only as
//! far as the last requested row and never holds more than one full row
//! outside the returned buffer.

use crate::{ImageHeader, IoError, IoResult};
use std::io::{BufRead, Write};
use tilescale_core::{ImageFormat, PixelBuffer, Rect};

fn read_byte<R: BufRead>(reader: &mut R) -> IoResult<Option<u8>> {
    let mut byte = [0u8; 1];
    match reader.read(&mut byte)? {
        0 => Ok(None),
        _ => Ok(Some(byte[0])),
    }
}

/// Read one whitespace-delimited header token, skipping `#` comments.
///
/// Consumes exactly one whitespace byte after the token, which for the
/// maxval field is the separator before the raster.
fn read_token<R: BufRead>(reader: &mut R) -> IoResult<String> {
    let mut token = String::new();
    loop {
        match read_byte(reader)? {
            None if token.is_empty() => {
                return Err(IoError::InvalidData(
                    "unexpected end of PNM header".to_string(),
                ));
            }
            None => return Ok(token),
            Some(b'#') if token.is_empty() => {
                let mut comment = Vec::new();
                reader.read_until(b'\n', &mut comment)?;
            }
            Some(b) if b.is_ascii_whitespace() => {
                if !token.is_empty() {
                    return Ok(token);
                }
            }
            Some(b) => {
                if token.len() >= 16 {
                    return Err(IoError::InvalidData("PNM header token too long".to_string()));
                }
                token.push(b as char);
            }
        }
    }
}

fn parse_field<R: BufRead>(reader: &mut R, name: &str) -> IoResult<u32> {
    let token = read_token(reader)?;
    token
        .parse::<u32>()
        .map_err(|_| IoError::InvalidData(format!("invalid PNM {}: {:?}", name, token)))
}

/// Read the PNM header, leaving `reader` at the first raster byte.
pub fn read_header_pnm<R: BufRead>(mut reader: R) -> IoResult<ImageHeader> {
    read_header_from(&mut reader)
}

fn read_header_from<R: BufRead>(reader: &mut R) -> IoResult<ImageHeader> {
    let components = match read_token(reader)?.as_str() {
        "P5" => 1,
        "P6" => 3,
        other => {
            return Err(IoError::UnsupportedFormat(format!(
                "PNM variant {:?}",
                other
            )));
        }
    };
    let width = parse_field(reader, "width")?;
    let height = parse_field(reader, "height")?;
    let maxval = parse_field(reader, "maxval")?;
    if width == 0 || height == 0 {
        return Err(IoError::InvalidData(format!(
            "PNM dimensions {}x{}",
            width, height
        )));
    }
    if maxval != 255 {
        return Err(IoError::UnsupportedFormat(format!("PNM maxval {}", maxval)));
    }

    Ok(ImageHeader {
        width,
        height,
        components,
        format: ImageFormat::Pnm,
    })
}

/// Read a whole P5/P6 image from a reader.
pub fn read_pnm<R: BufRead>(mut reader: R) -> IoResult<PixelBuffer> {
    let header = read_header_from(&mut reader)?;
    let mut pix = PixelBuffer::new(header.width, header.height, header.components)?;
    reader.read_exact(pix.data_mut()).map_err(|e| {
        IoError::DecodeError(format!("PNM raster truncated: {}", e))
    })?;
    Ok(pix)
}

/// Read the rectangle `region` of a P5/P6 image.
///
/// Rows are decoded sequentially from the top; reading stops after row
/// `region.bottom() - 1`. Returns the cropped buffer and the number of
/// scanlines decoded.
///
/// # Errors
///
/// Returns [`IoError::Core`] with a region error if `region` is empty or
/// does not lie inside the image.
pub fn read_pnm_region<R: BufRead>(mut reader: R, region: Rect) -> IoResult<(PixelBuffer, u64)> {
    let header = read_header_from(&mut reader)?;
    crate::source::check_region(&header, region)?;

    let comps = header.components as usize;
    let mut row = vec![0u8; header.width as usize * comps];
    let mut pix = PixelBuffer::new(region.w, region.h, header.components)?;
    let start = region.x as usize * comps;
    let end = region.right() as usize * comps;

    for y in 0..region.bottom() {
        reader.read_exact(&mut row).map_err(|e| {
            IoError::DecodeError(format!("PNM raster truncated at row {}: {}", y, e))
        })?;
        if y >= region.y {
            pix.row_mut(y - region.y).copy_from_slice(&row[start..end]);
        }
    }
    Ok((pix, u64::from(region.bottom())))
}

/// Write a buffer as binary PNM.
///
/// One-component buffers are written as P5; anything else is converted to
/// RGB and written as P6.
pub fn write_pnm<W: Write>(pix: &PixelBuffer, mut writer: W) -> IoResult<()> {
    if pix.components() == 1 {
        write!(writer, "P5\n{} {}\n255\n", pix.width(), pix.height())?;
        writer.write_all(pix.data())?;
    } else {
        let rgb = pix.to_rgb()?;
        write!(writer, "P6\n{} {}\n255\n", rgb.width(), rgb.height())?;
        writer.write_all(rgb.data())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: u32, height: u32, components: u32) -> PixelBuffer {
        let len = (width * height * components) as usize;
        let data = (0..len).map(|i| (i % 253) as u8).collect();
        PixelBuffer::from_raw(width, height, components, data).unwrap()
    }

    #[test]
    fn test_pnm_roundtrip() {
        for comps in [1, 3] {
            let pix = numbered(9, 7, comps);
            let mut buf = Vec::new();
            write_pnm(&pix, &mut buf).unwrap();
            assert_eq!(read_pnm(buf.as_slice()).unwrap(), pix);
        }
    }

    #[test]
    fn test_header_with_comments() {
        let data = b"P6\n# created by hand\n3 2 # trailing\n255\n";
        let header = read_header_pnm(&data[..]).unwrap();
        assert_eq!((header.width, header.height, header.components), (3, 2, 3));
        assert_eq!(header.format, ImageFormat::Pnm);
    }

    #[test]
    fn test_raster_may_start_with_whitespace_byte() {
        // First sample is 0x0A, which must not be eaten as header whitespace
        let mut data = b"P5 2 1 255\n".to_vec();
        data.extend_from_slice(&[b'\n', 7]);
        let pix = read_pnm(data.as_slice()).unwrap();
        assert_eq!(pix.data(), &[b'\n', 7]);
    }

    #[test]
    fn test_region_read_stops_at_last_row() {
        let pix = numbered(6, 10, 3);
        let mut buf = Vec::new();
        write_pnm(&pix, &mut buf).unwrap();
        // Drop everything after row 5; a region ending at row 5 still reads
        let header_len = buf.len() - pix.data().len();
        buf.truncate(header_len + 5 * pix.row_stride());

        let region = Rect::new(2, 3, 3, 2);
        let (sub, lines) = read_pnm_region(buf.as_slice(), region).unwrap();
        assert_eq!(lines, 5);
        assert_eq!(sub, pix.clip_rectangle(region).unwrap());

        assert!(read_pnm_region(buf.as_slice(), Rect::new(0, 4, 6, 2)).is_err());
    }

    #[test]
    fn test_region_outside_image() {
        let pix = numbered(4, 4, 1);
        let mut buf = Vec::new();
        write_pnm(&pix, &mut buf).unwrap();
        assert!(matches!(
            read_pnm_region(buf.as_slice(), Rect::new(2, 0, 3, 1)),
            Err(IoError::Core(_))
        ));
    }

    #[test]
    fn test_unsupported_variants() {
        assert!(matches!(
            read_header_pnm(&b"P3\n1 1\n255\n"[..]),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            read_header_pnm(&b"P5\n1 1\n65535\n"[..]),
            Err(IoError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            read_header_pnm(&b"P5\n1"[..]),
            Err(IoError::InvalidData(_))
        ));
    }
}
