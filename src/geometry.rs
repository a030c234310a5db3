//! Pure geometry operators over rectangular byte buffers.
//!
//! Every function here works on a flat `width * height * bpp` buffer with
//! no knowledge of palettes or device formats; `bpp` is 1 for indexed
//! images and 3 for RGB. Callers validate bounds (the cache's public
//! `crop` clamps), so these are total functions over valid positive
//! dimensions.

use alloc::vec;
use alloc::vec::Vec;

/// The sub-region of an image currently being viewed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewRect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl ViewRect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// The full-image rect for a `width x height` image.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            w: width,
            h: height,
        }
    }

    /// Whether this rect covers the whole `width x height` image.
    pub fn covers(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.w == width && self.h == height
    }

    /// Clamp into the bounds of a `width x height` image.
    ///
    /// Out-of-range offsets are moved inside, oversized extents are
    /// shrunk, and zero extents grow to 1, so the result is always a
    /// valid rect of at least 1x1. `width`/`height` must be >= 1.
    pub fn clamped_to(&self, width: u32, height: u32) -> Self {
        let w = self.w.clamp(1, width);
        let h = self.h.clamp(1, height);
        let x = self.x.clamp(0, (width - w) as i32);
        let y = self.y.clamp(0, (height - h) as i32);
        Self { x, y, w, h }
    }

    /// Transform this rect for a 90-degree rotation of its
    /// `width x height` parent image.
    ///
    /// Rotation moves a rect by its complement offset: the new offset
    /// along the rotated axis is `dimension - (offset + extent)`, not the
    /// raw offset. Extents swap.
    pub fn rotated90(&self, width: u32, height: u32, counter_clockwise: bool) -> Self {
        if counter_clockwise {
            Self {
                x: self.y,
                y: width as i32 - (self.x + self.w as i32),
                w: self.h,
                h: self.w,
            }
        } else {
            Self {
                x: height as i32 - (self.y + self.h as i32),
                y: self.x,
                w: self.h,
                h: self.w,
            }
        }
    }
}

/// Copy the `rw x rh` sub-rectangle at `(rx, ry)` out of a `w x h` buffer.
pub fn crop_subregion(
    buf: &[u8],
    w: u32,
    h: u32,
    bpp: usize,
    rx: u32,
    ry: u32,
    rw: u32,
    rh: u32,
) -> Vec<u8> {
    debug_assert!(rx + rw <= w && ry + rh <= h);
    let src_stride = w as usize * bpp;
    let row_bytes = rw as usize * bpp;
    let mut out = Vec::with_capacity(rh as usize * row_bytes);
    for row in 0..rh as usize {
        let start = (ry as usize + row) * src_stride + rx as usize * bpp;
        out.extend_from_slice(&buf[start..start + row_bytes]);
    }
    out
}

/// Rotate a `w x h` buffer 90 degrees. The result is `h x w`; the caller
/// swaps its stored dimensions.
///
/// Clockwise maps source pixel `(x, y)` to `(h - 1 - y, x)`;
/// counter-clockwise maps it to `(y, w - 1 - x)`.
pub fn rotate90(buf: &[u8], w: u32, h: u32, bpp: usize, counter_clockwise: bool) -> Vec<u8> {
    let (w, h) = (w as usize, h as usize);
    let mut out = vec![0u8; buf.len()];
    let new_w = h;
    for y in 0..h {
        for x in 0..w {
            let (nx, ny) = if counter_clockwise {
                (y, w - 1 - x)
            } else {
                (h - 1 - y, x)
            };
            let src = (y * w + x) * bpp;
            let dst = (ny * new_w + nx) * bpp;
            out[dst..dst + bpp].copy_from_slice(&buf[src..src + bpp]);
        }
    }
    out
}

/// Mirror a `w x h` buffer left-to-right in place.
pub fn flip_horizontal(buf: &mut [u8], w: u32, h: u32, bpp: usize) {
    let row_bytes = w as usize * bpp;
    for row in buf.chunks_exact_mut(row_bytes).take(h as usize) {
        let mut left = 0usize;
        let mut right = w as usize - 1;
        while left < right {
            for k in 0..bpp {
                row.swap(left * bpp + k, right * bpp + k);
            }
            left += 1;
            right -= 1;
        }
    }
}

/// Mirror a `w x h` buffer top-to-bottom in place.
pub fn flip_vertical(buf: &mut [u8], w: u32, h: u32, bpp: usize) {
    let row_bytes = w as usize * bpp;
    let h = h as usize;
    let mut top = 0usize;
    let mut bottom = h - 1;
    while top < bottom {
        let (upper, lower) = buf.split_at_mut(bottom * row_bytes);
        upper[top * row_bytes..(top + 1) * row_bytes].swap_with_slice(&mut lower[..row_bytes]);
        top += 1;
        bottom -= 1;
    }
}

/// Nearest-neighbor resize of a `w x h` buffer to `new_w x new_h`.
///
/// Destination pixel `(ex, ey)` samples source `(w*ex/new_w, h*ey/new_h)`
/// with truncating integer division. The per-column source offset table
/// is computed once and reused for every row; recomputing it per pixel
/// would put `new_w * new_h` divisions on the hot path for large images.
pub fn nearest_resize(buf: &[u8], w: u32, h: u32, bpp: usize, new_w: u32, new_h: u32) -> Vec<u8> {
    let (w, h) = (w as usize, h as usize);
    let (new_w, new_h) = (new_w as usize, new_h as usize);
    let src_stride = w * bpp;

    let col_offsets: Vec<usize> = (0..new_w).map(|ex| (w * ex / new_w) * bpp).collect();

    let mut out = Vec::with_capacity(new_w * new_h * bpp);
    for ey in 0..new_h {
        let src_row = &buf[(h * ey / new_h) * src_stride..];
        for &off in &col_offsets {
            out.extend_from_slice(&src_row[off..off + bpp]);
        }
    }
    out
}
