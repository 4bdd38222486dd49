//! Codec regression test
//!
//! Round-trips synthetic images through every enabled format and checks
//! header reads and region reads against full decodes.
//!
//! Run with:
//! ```
//! cargo test -p tilescale-io --test codec_reg --features all-formats
//! ```

use tilescale_core::{ImageFormat, PixelBuffer, Rect};
use tilescale_io::{
    FileSource, ImageSource, IoError, read_image, read_image_header, write_image,
};
use tilescale_test::{RegParams, gradient, regout_dir, texture, write_test_image};

/// Largest and mean absolute sample difference.
fn diff_stats(a: &PixelBuffer, b: &PixelBuffer) -> (u8, f64) {
    let diffs: Vec<u8> = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(x, y)| x.abs_diff(*y))
        .collect();
    let max = diffs.iter().copied().max().unwrap_or(0);
    let sum: u64 = diffs.iter().map(|&d| u64::from(d)).sum();
    (max, sum as f64 / diffs.len().max(1) as f64)
}

#[test]
fn codec_reg() {
    let mut rp = RegParams::new("codec");
    let pix = texture(61, 43, 3, 5).expect("texture");

    // --- Test 1: PNG is lossless ---
    let png_path = format!("{}/codec.png", regout_dir());
    write_image(&pix, &png_path, 0).expect("write png");
    let header = read_image_header(&png_path).expect("png header");
    rp.compare_values(61.0, header.width as f64, 0.0);
    rp.compare_values(43.0, header.height as f64, 0.0);
    rp.compare_values(1.0, if header.format == ImageFormat::Png { 1.0 } else { 0.0 }, 0.0);
    rp.compare_pix(&pix, &read_image(&png_path).expect("read png"));

    // --- Test 2: PNM is lossless ---
    let pnm_path = format!("{}/codec.ppm", regout_dir());
    write_image(&pix, &pnm_path, 0).expect("write ppm");
    rp.compare_pix(&pix, &read_image(&pnm_path).expect("read ppm"));

    // --- Test 3: JPEG decodes with the right size ---
    let smooth = gradient(64, 48, 3).expect("gradient");
    let jpg_path = format!("{}/codec.jpg", regout_dir());
    write_image(&smooth, &jpg_path, 85).expect("write jpg");
    let jpg = read_image(&jpg_path).expect("read jpg");
    rp.compare_values(64.0, jpg.width() as f64, 0.0);
    rp.compare_values(48.0, jpg.height() as f64, 0.0);
    rp.compare_values(3.0, jpg.components() as f64, 0.0);
    let (max_diff, mean_diff) = diff_stats(&smooth, &jpg);
    eprintln!("  jpeg q85 diff: max {}, mean {:.2}", max_diff, mean_diff);
    rp.compare_values(0.0, max_diff as f64, 48.0);
    rp.compare_values(0.0, mean_diff, 4.0);

    // --- Test 4: Unknown extension falls back to JPEG ---
    let odd_path = format!("{}/codec.out", regout_dir());
    write_image(&smooth, &odd_path, 85).expect("write .out");
    let header = read_image_header(&odd_path).expect("header .out");
    rp.compare_values(1.0, if header.format == ImageFormat::Jpeg { 1.0 } else { 0.0 }, 0.0);

    // --- Test 5: Region reads match crops of the full decode ---
    let region = Rect::new(7, 11, 20, 15);
    for path in [&png_path, &pnm_path, &jpg_path] {
        let full = read_image(path).expect("full decode");
        let mut source = FileSource::open(path).expect("open source");
        let sub = source.read_region(region).expect("region read");
        rp.compare_pix(&full.clip_rectangle(region).expect("crop"), &sub);
    }

    // --- Test 6: PNM region reads stop at the last requested row ---
    let gray = gradient(30, 40, 1).expect("gray");
    let pgm_path = write_test_image(&gray, "codec_gray.pgm", ImageFormat::Pnm).expect("pgm");
    let mut source = FileSource::open(&pgm_path).expect("open pgm");
    rp.compare_values(1.0, source.header().components as f64, 0.0);
    source.read_region(Rect::new(0, 0, 30, 10)).expect("top rows");
    rp.compare_values(10.0, source.scanlines_decoded() as f64, 0.0);
    source.read_region(Rect::new(5, 30, 5, 10)).expect("bottom rows");
    rp.compare_values(50.0, source.scanlines_decoded() as f64, 0.0);

    // --- Test 7: PNG and JPEG region reads also stop at the last row ---
    let mut source = FileSource::open(&png_path).expect("open png");
    source.read_region(Rect::new(0, 0, 5, 5)).expect("png region");
    rp.compare_values(5.0, source.scanlines_decoded() as f64, 0.0);
    source.read_region(Rect::new(10, 20, 30, 2)).expect("png band");
    rp.compare_values(27.0, source.scanlines_decoded() as f64, 0.0);

    let mut source = FileSource::open(&jpg_path).expect("open jpg");
    source.read_region(Rect::new(0, 0, 64, 2)).expect("jpg top rows");
    rp.compare_values(2.0, source.scanlines_decoded() as f64, 0.0);
    source.read_region(Rect::new(16, 40, 8, 8)).expect("jpg bottom rows");
    rp.compare_values(50.0, source.scanlines_decoded() as f64, 0.0);

    // --- Test 8: Errors ---
    let missing = read_image(format!("{}/does-not-exist.png", regout_dir()));
    rp.compare_values(
        1.0,
        if matches!(missing, Err(IoError::FileNotFound(_))) { 1.0 } else { 0.0 },
        0.0,
    );
    let mut source = FileSource::open(&png_path).expect("open png");
    let outside = source.read_region(Rect::new(50, 0, 20, 5));
    rp.compare_values(1.0, if outside.is_err() { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "codec regression test failed");
}
