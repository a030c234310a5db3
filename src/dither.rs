//! Floyd-Steinberg error diffusion.
//!
//! Reduces a continuous-tone single-channel buffer to a small fixed set
//! of output levels, diffusing each pixel's quantization error to its
//! unprocessed neighbors with the classic kernel:
//!
//! ```text
//!        X   7
//!    3   5   1     (sixteenths)
//! ```
//!
//! Rows are processed top to bottom and every row strictly left to
//! right. The historical code this replaces mixed linear and serpentine
//! scans between its 1-bit and 8-bit paths; one order is kept here
//! because the scan pattern is visible in the output.
//!
//! All arithmetic is integer fixed point scaled by 16 (the error rows
//! hold sixteenths), so the four kernel weights account for the full
//! error exactly and results are reproducible across platforms. Error
//! shares that would land outside the buffer are dropped, not wrapped or
//! clamped. Auxiliary storage is two `O(width)` rows, never `O(w*h)`.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use crate::error::StageError;
use crate::image::Palette;

/// Two-level quantizer: midpoint threshold at 128, output 0 or 255.
pub fn two_level(value: i32) -> u8 {
    if value >= 128 { 255 } else { 0 }
}

/// Quantizer mapping a value to the nearest member of a small ordered
/// set of output levels. `levels` must be non-empty and ascending.
pub fn nearest_of(levels: &[u8]) -> impl Fn(i32) -> u8 + '_ {
    move |value| {
        let mut best = levels[0];
        let mut best_dist = i32::MAX;
        for &l in levels {
            let dist = (value - i32::from(l)).abs();
            if dist < best_dist {
                best_dist = dist;
                best = l;
            }
        }
        best
    }
}

/// Dither one channel of `w x h` samples down to the levels produced by
/// `quantize`.
///
/// `quantize` receives the error-corrected sample (which may fall
/// outside 0..=255) and returns the chosen representable level; the
/// difference is diffused forward. Output has one byte per input sample.
pub fn dither_channel<Q>(
    src: &[u8],
    w: u32,
    h: u32,
    quantize: Q,
    stop: &dyn Stop,
) -> Result<Vec<u8>, StageError>
where
    Q: Fn(i32) -> u8,
{
    let (w, h) = (w as usize, h as usize);
    if src.len() < w * h {
        return Err(StageError::BufferTooSmall {
            needed: w * h,
            actual: src.len(),
        });
    }

    let mut out = Vec::with_capacity(w * h);
    // Carried error in sixteenths for the current and next row.
    let mut cur: Vec<i32> = vec![0; w];
    let mut next: Vec<i32> = vec![0; w];

    for y in 0..h {
        if y % 16 == 0 {
            stop.check()?;
        }
        for x in 0..w {
            let corrected = i32::from(src[y * w + x]) + cur[x] / 16;
            let quantized = quantize(corrected);
            out.push(quantized);

            let err = corrected - i32::from(quantized);
            if x + 1 < w {
                cur[x + 1] += err * 7;
                next[x + 1] += err;
            }
            if x > 0 {
                next[x - 1] += err * 3;
            }
            next[x] += err * 5;
        }
        core::mem::swap(&mut cur, &mut next);
        next.fill(0);
    }

    Ok(out)
}

/// Dither an indexed image down to the two extreme entries of its
/// palette.
///
/// Each index is replaced by its palette luma, two-level dithered, and
/// mapped back to the palette's darkest (for 0) or lightest (for 255)
/// entry, so the output remains a valid index buffer for the same
/// palette.
pub fn dither_indexed_bw(
    indices: &[u8],
    palette: &Palette,
    w: u32,
    h: u32,
    stop: &dyn Stop,
) -> Result<Vec<u8>, StageError> {
    let (dark, light) = palette.extremes();
    let need = w as usize * h as usize;
    if indices.len() < need {
        return Err(StageError::BufferTooSmall {
            needed: need,
            actual: indices.len(),
        });
    }

    let luma: Vec<u8> = indices[..need].iter().map(|&i| palette.luma(i)).collect();
    let bits = dither_channel(&luma, w, h, two_level, stop)?;
    Ok(bits
        .into_iter()
        .map(|v| if v == 0 { dark } else { light })
        .collect())
}
