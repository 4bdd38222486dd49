//! Bicubic regression test
//!
//! Dimensions, identity, smooth upscaling and saturation of the bicubic
//! resampler on synthetic images.

use tilescale_core::{ImageFormat, PixelBuffer};
use tilescale_test::{RegParams, checkerboard, gradient, texture};
use tilescale_transform::{scale_bicubic, scale_bicubic_to_size};

#[test]
fn bicubic_reg() {
    let mut rp = RegParams::new("bicubic");

    let pixs = gradient(120, 90, 3).expect("gradient");
    let (w, h) = (pixs.width(), pixs.height());

    // --- Test 1: Scale up 2x ---
    let up2 = scale_bicubic(&pixs, 2.0, 2.0).expect("scale 2x");
    rp.compare_values((w * 2) as f64, up2.width() as f64, 0.0);
    rp.compare_values((h * 2) as f64, up2.height() as f64, 0.0);
    rp.write_pix(&up2, ImageFormat::Png).expect("write up2");

    // --- Test 2: Scale down 0.5x ---
    let down2 = scale_bicubic(&pixs, 0.5, 0.5).expect("scale 0.5x");
    rp.compare_values((w / 2) as f64, down2.width() as f64, 0.0);
    rp.compare_values((h / 2) as f64, down2.height() as f64, 0.0);

    // --- Test 3: Scale to specific size ---
    let sized = scale_bicubic_to_size(&pixs, 200, 150).expect("scale_to_size");
    rp.compare_values(200.0, sized.width() as f64, 0.0);
    rp.compare_values(150.0, sized.height() as f64, 0.0);
    rp.compare_values(3.0, sized.components() as f64, 0.0);

    // --- Test 4: Anisotropic scaling ---
    let aniso = scale_bicubic(&pixs, 2.0, 0.5).expect("aniso scale");
    rp.compare_values((w * 2) as f64, aniso.width() as f64, 0.0);
    rp.compare_values((h / 2) as f64, aniso.height() as f64, 0.0);

    // --- Test 5: Identity reproduces the source exactly ---
    let tex = texture(77, 51, 4, 7).expect("texture");
    let same = scale_bicubic_to_size(&tex, 77, 51).expect("identity");
    rp.compare_pix(&tex, &same);

    // --- Test 6: 100x100 -> 200x200 has no 2x2 blocking ---
    let mut ramp = PixelBuffer::new(100, 100, 1).expect("ramp");
    for y in 0..100 {
        for x in 0..100 {
            ramp.set(x, y, 0, (2 * x) as u8);
        }
    }
    let up = scale_bicubic_to_size(&ramp, 200, 200).expect("upscale");
    let mut blocky = 0;
    let mut distinct = std::collections::BTreeSet::new();
    for x in 4..196 {
        distinct.insert(up.get(x, 100, 0));
        if x % 2 == 0 && up.get(x, 100, 0) == up.get(x + 1, 100, 0) {
            blocky += 1;
        }
    }
    eprintln!("  upscale: {} distinct values, {} repeated pairs", distinct.len(), blocky);
    rp.compare_values(1.0, if distinct.len() > 150 { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(1.0, if blocky < 20 { 1.0 } else { 0.0 }, 0.0);

    // --- Test 7: Hard edges saturate instead of wrapping ---
    let board = checkerboard(32, 32, 4, 1).expect("checkerboard");
    let sharp = scale_bicubic(&board, 3.0, 3.0).expect("upscale board");
    let mut near_black_in_white = 0;
    for y in 12..84 {
        for x in 12..84 {
            // Centre of a white source cell
            let (sx, sy) = (x / 3, y / 3);
            let cell_center = sx % 4 == 1 || sx % 4 == 2;
            let row_center = sy % 4 == 1 || sy % 4 == 2;
            let white = board.get(sx, sy, 0) == 255;
            if cell_center && row_center && white && sharp.get(x, y, 0) < 128 {
                near_black_in_white += 1;
            }
        }
    }
    rp.compare_values(0.0, near_black_in_white as f64, 0.0);

    assert!(rp.cleanup(), "bicubic regression test failed");
}
