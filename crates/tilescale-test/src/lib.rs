//! tilescale-test - Regression test framework for tilescale
//!
//! Provides [`RegParams`] for accumulating checks over a test run, and
//! deterministic synthetic images so tests do not depend on data files.
//!
//! # Usage
//!
//! ```ignore
//! use tilescale_test::{RegParams, gradient};
//!
//! let mut rp = RegParams::new("bicubic");
//! let pix = gradient(64, 48, 3).unwrap();
//! rp.compare_values(64.0, pix.width() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "compare" (default) or "display"

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use std::path::PathBuf;
use tilescale_core::{ImageFormat, PixelBuffer};

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // tilescale-test is at crates/tilescale-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}

/// Smooth diagonal gradient: rising in channel 0, falling in channel 1 and
/// half-contrast in the rest.
pub fn gradient(width: u32, height: u32, components: u32) -> TestResult<PixelBuffer> {
    let mut pix = PixelBuffer::new(width, height, components)?;
    let span = (width + height).saturating_sub(2).max(1);
    for y in 0..height {
        for x in 0..width {
            let base = (x + y) * 255 / span;
            for c in 0..components {
                let v = match c {
                    0 => base,
                    1 => 255 - base,
                    _ => (base + 128) / 2,
                };
                pix.set(x, y, c, v as u8);
            }
        }
    }
    Ok(pix)
}

/// Black and white squares of side `cell`.
pub fn checkerboard(width: u32, height: u32, cell: u32, components: u32) -> TestResult<PixelBuffer> {
    let mut pix = PixelBuffer::new(width, height, components)?;
    let cell = cell.max(1);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / cell + y / cell) % 2 == 0 { 255 } else { 0 };
            for c in 0..components {
                pix.set(x, y, c, v);
            }
        }
    }
    Ok(pix)
}

/// High-frequency pseudo-random texture, reproducible from `seed`.
pub fn texture(width: u32, height: u32, components: u32, seed: u64) -> TestResult<PixelBuffer> {
    let mut pix = PixelBuffer::new(width, height, components)?;
    let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
    for b in pix.data_mut() {
        // xorshift64*
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        *b = (state.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 56) as u8;
    }
    Ok(pix)
}

/// Write `pix` to `<regout>/<name>` in `format` and return the path.
pub fn write_test_image(pix: &PixelBuffer, name: &str, format: ImageFormat) -> TestResult<PathBuf> {
    std::fs::create_dir_all(regout_dir())?;
    let path = PathBuf::from(format!("{}/{}", regout_dir(), name));
    let result = match format {
        // Gray stays gray so sources can exercise every component count
        ImageFormat::Pnm => std::fs::File::create(&path)
            .map_err(tilescale_io::IoError::from)
            .and_then(|f| tilescale_io::pnm::write_pnm(pix, std::io::BufWriter::new(f))),
        _ => tilescale_io::write_image_format(pix, &path, format, 95),
    };
    result.map_err(|e| TestError::ImageWrite {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    Ok(path)
}
