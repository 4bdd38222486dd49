//! Regression test parameters and operations

use crate::error::{TestError, TestResult};
use crate::regout_dir;
use std::fs;
use std::path::PathBuf;
use tilescale_core::{ImageFormat, PixelBuffer};

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Run comparisons only (default)
    #[default]
    Compare,
    /// Also write intermediate images to the regout directory
    Display,
}

impl RegTestMode {
    /// Parse mode from the `REGTEST_MODE` environment variable
    pub fn from_env() -> Self {
        match std::env::var("REGTEST_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test parameters
///
/// This structure tracks the state of a regression test, including
/// the test name, current index, mode, and success status.
pub struct RegParams {
    /// Name of the test (e.g., "tile")
    pub test_name: String,
    /// Current test index (incremented before each test)
    index: usize,
    /// Test mode
    pub mode: RegTestMode,
    /// Overall success status
    success: bool,
    /// Recorded failures
    failures: Vec<String>,
}

impl RegParams {
    /// Create new regression test parameters
    ///
    /// The mode is taken from the `REGTEST_MODE` environment variable.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();

        let _ = fs::create_dir_all(regout_dir());

        eprintln!();
        eprintln!("////////////////////////////////////////////////");
        eprintln!("////////////////   {}_reg   ///////////////", test_name);
        eprintln!("////////////////////////////////////////////////");
        eprintln!("Mode: {:?}", mode);

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            success: true,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, msg: String) -> bool {
        eprintln!("{}", msg);
        self.failures.push(msg);
        self.success = false;
        false
    }

    /// Compare two floating-point values
    ///
    /// Returns `true` if `|expected - actual| <= delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();

        if diff > delta {
            let msg = format!(
                "Failure in {}_reg: value comparison for index {}\n\
                 difference = {} but allowed delta = {}\n\
                 expected = {}, actual = {}",
                self.test_name, self.index, diff, delta, expected, actual
            );
            self.fail(msg)
        } else {
            true
        }
    }

    /// Compare two buffers for exact equality
    pub fn compare_pix(&mut self, pix1: &PixelBuffer, pix2: &PixelBuffer) -> bool {
        self.compare_pix_within(pix1, pix2, 0)
    }

    /// Compare two buffers, allowing each sample to differ by `max_diff`
    ///
    /// Reports the first sample outside the tolerance.
    pub fn compare_pix_within(
        &mut self,
        pix1: &PixelBuffer,
        pix2: &PixelBuffer,
        max_diff: u8,
    ) -> bool {
        self.index += 1;

        if !pix1.sizes_equal(pix2) {
            let msg = format!(
                "Failure in {}_reg: pix comparison for index {} - size mismatch: \
                 {}x{}x{} vs {}x{}x{}",
                self.test_name,
                self.index,
                pix1.width(),
                pix1.height(),
                pix1.components(),
                pix2.width(),
                pix2.height(),
                pix2.components()
            );
            return self.fail(msg);
        }

        let comps = pix1.components();
        for y in 0..pix1.height() {
            for x in 0..pix1.width() {
                for c in 0..comps {
                    let (a, b) = (pix1.get(x, y, c), pix2.get(x, y, c));
                    if a.abs_diff(b) > max_diff {
                        let msg = format!(
                            "Failure in {}_reg: pix comparison for index {} - \
                             sample mismatch at ({}, {}, {}): {} vs {}",
                            self.test_name, self.index, x, y, c, a, b
                        );
                        return self.fail(msg);
                    }
                }
            }
        }

        true
    }

    /// Write a buffer to the regout directory when in display mode
    ///
    /// Returns the written path, or `None` in compare mode.
    pub fn write_pix(
        &mut self,
        pix: &PixelBuffer,
        format: ImageFormat,
    ) -> TestResult<Option<PathBuf>> {
        if !self.display() {
            return Ok(None);
        }
        let path = PathBuf::from(format!(
            "{}/{}.{:02}.{}",
            regout_dir(),
            self.test_name,
            self.index,
            format.extension()
        ));
        tilescale_io::write_image_format(pix, &path, format, 95).map_err(|e| {
            TestError::ImageWrite {
                path: path.display().to_string(),
                message: e.to_string(),
            }
        })?;
        eprintln!("Wrote: {}", path.display());
        Ok(Some(path))
    }

    /// Clean up and report results
    ///
    /// Returns `true` if all checks passed.
    pub fn cleanup(self) -> bool {
        if self.success {
            eprintln!("SUCCESS: {}_reg", self.test_name);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {}", failure);
            }
        }
        eprintln!();

        self.success
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}
