//! Floyd-Steinberg properties: hand-computed diffusion, output
//! boundedness, brightness preservation, palette-index reduction.

use pixstage::dither::*;
use pixstage::{Palette, Unstoppable};

// ── hand-computed diffusion ──────────────────────────────────────────

#[test]
fn two_by_two_gray_192_diffuses_one_black() {
    // Left-to-right scan, two-level threshold at 128, errors in
    // sixteenths:
    //   (0,0): 192 -> 255, err -63; 7/16 right, 5/16 down, 1/16 down-right
    //   (1,0): 192 - 27 = 165 -> 255, err -90; 3/16 and 5/16 into row 1
    //   (0,1): 192 - 36 = 156 -> 255, err -99; 7/16 right
    //   (1,1): 192 - 75 = 117 -> 0
    let src = vec![192u8; 4];
    let out = dither_channel(&src, 2, 2, two_level, &Unstoppable).unwrap();
    assert_eq!(out, vec![255, 255, 255, 0]);
}

#[test]
fn exact_levels_pass_through_unchanged() {
    let src = vec![0, 255, 255, 0, 0, 255];
    let out = dither_channel(&src, 3, 2, two_level, &Unstoppable).unwrap();
    assert_eq!(out, src);
}

// ── boundedness ──────────────────────────────────────────────────────

#[test]
fn two_level_output_stays_in_representable_set() {
    let src: Vec<u8> = (0..64 * 64).map(|i| (i * 7 % 256) as u8).collect();
    let out = dither_channel(&src, 64, 64, two_level, &Unstoppable).unwrap();
    assert_eq!(out.len(), src.len());
    assert!(out.iter().all(|&v| v == 0 || v == 255));
}

#[test]
fn ramp_quantizer_output_stays_in_set() {
    let levels = [0u8, 85, 170, 255];
    let src: Vec<u8> = (0..32 * 32).map(|i| (i % 256) as u8).collect();
    let out = dither_channel(&src, 32, 32, nearest_of(&levels), &Unstoppable).unwrap();
    assert!(out.iter().all(|&v| levels.contains(&v)));
}

// ── error conservation ───────────────────────────────────────────────

// The kernel weights 7+3+5+1 are sixteenths summing to the whole error,
// so over a field of constant gray the mean brightness of the two-level
// output tracks the input (edges drop a little error).

#[test]
fn mid_gray_field_halves_black_and_white() {
    let src = vec![128u8; 16 * 16];
    let out = dither_channel(&src, 16, 16, two_level, &Unstoppable).unwrap();
    let white = out.iter().filter(|&&v| v == 255).count() as f32;
    let ratio = white / (16.0 * 16.0);
    assert!(
        (ratio - 128.0 / 255.0).abs() < 0.1,
        "white ratio {ratio} too far from input brightness"
    );
}

#[test]
fn dark_field_brightness_is_preserved() {
    let src = vec![64u8; 32 * 32];
    let out = dither_channel(&src, 32, 32, two_level, &Unstoppable).unwrap();
    let white = out.iter().filter(|&&v| v == 255).count() as f32;
    let ratio = white / (32.0 * 32.0);
    assert!(
        (ratio - 64.0 / 255.0).abs() < 0.05,
        "white ratio {ratio} too far from input brightness"
    );
}

#[test]
fn gradient_mean_is_preserved() {
    let w = 64usize;
    let h = 64usize;
    let src: Vec<u8> = (0..w * h).map(|i| ((i % w) * 255 / (w - 1)) as u8).collect();
    let out = dither_channel(&src, w as u32, h as u32, two_level, &Unstoppable).unwrap();
    let in_mean: f64 = src.iter().map(|&v| f64::from(v)).sum::<f64>() / (w * h) as f64;
    let out_mean: f64 = out.iter().map(|&v| f64::from(v)).sum::<f64>() / (w * h) as f64;
    assert!(
        (in_mean - out_mean).abs() < 8.0,
        "mean drifted: in {in_mean}, out {out_mean}"
    );
}

// ── extremes ─────────────────────────────────────────────────────────

#[test]
fn pure_black_stays_black() {
    let src = vec![0u8; 8 * 8];
    let out = dither_channel(&src, 8, 8, two_level, &Unstoppable).unwrap();
    assert!(out.iter().all(|&v| v == 0));
}

#[test]
fn pure_white_stays_white() {
    let src = vec![255u8; 8 * 8];
    let out = dither_channel(&src, 8, 8, two_level, &Unstoppable).unwrap();
    assert!(out.iter().all(|&v| v == 255));
}

#[test]
fn single_row_and_single_column_work() {
    let src = vec![128u8; 9];
    let row = dither_channel(&src, 9, 1, two_level, &Unstoppable).unwrap();
    assert_eq!(row.len(), 9);
    let col = dither_channel(&src, 1, 9, two_level, &Unstoppable).unwrap();
    assert_eq!(col.len(), 9);
}

// ── quantizers ───────────────────────────────────────────────────────

#[test]
fn two_level_thresholds_at_midpoint() {
    assert_eq!(two_level(127), 0);
    assert_eq!(two_level(128), 255);
    // Error-corrected values can leave 0..=255.
    assert_eq!(two_level(-40), 0);
    assert_eq!(two_level(300), 255);
}

#[test]
fn nearest_of_picks_closest_level() {
    let q = nearest_of(&[0, 128, 255]);
    assert_eq!(q(10), 0);
    assert_eq!(q(100), 128);
    assert_eq!(q(200), 255);
    assert_eq!(q(-5), 0);
    assert_eq!(q(400), 255);
}

// ── palette-index reduction ──────────────────────────────────────────

#[test]
fn indexed_bw_outputs_only_extreme_indices() {
    // Palette: white at 0, mid gray at 1, black at 2.
    let palette = Palette::new(&[(255, 255, 255), (128, 128, 128), (0, 0, 0)]);
    let indices = vec![1u8; 12 * 12];
    let out = dither_indexed_bw(&indices, &palette, 12, 12, &Unstoppable).unwrap();
    assert!(out.iter().all(|&i| i == 0 || i == 2));
    // Mid gray should come out as a mix, not all one level.
    assert!(out.iter().any(|&i| i == 0));
    assert!(out.iter().any(|&i| i == 2));
}

#[test]
fn palette_helpers_luma_nearest_extremes() {
    let palette = Palette::new(&[(255, 0, 0), (0, 255, 0), (0, 0, 255), (255, 255, 255)]);
    assert_eq!(palette.count(), 4);
    assert_eq!(palette.luma(3), 255);
    assert_eq!(palette.nearest(250, 5, 5), 0);
    assert_eq!(palette.nearest(10, 240, 10), 1);
    // Green carries the most luma weight; the extremes reflect it.
    assert_eq!(palette.extremes(), (2, 3));

    let ramp = Palette::gray(4);
    assert_eq!(ramp.rgb(0), (0, 0, 0));
    assert_eq!(ramp.rgb(3), (255, 255, 255));
    assert_eq!(ramp.extremes(), (0, 3));
}

#[test]
fn indexed_bw_preserves_exact_extremes() {
    let palette = Palette::new(&[(255, 255, 255), (0, 0, 0)]);
    // Checkerboard of the two extremes dithers to itself.
    let indices: Vec<u8> = (0..8 * 8).map(|i| ((i % 8 + i / 8) % 2) as u8).collect();
    let out = dither_indexed_bw(&indices, &palette, 8, 8, &Unstoppable).unwrap();
    assert_eq!(out, indices);
}
