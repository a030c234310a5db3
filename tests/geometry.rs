//! Geometry operator properties: rotation round-trips, flip involution,
//! resize determinism, rect clamping and rotation.

use pixstage::geometry::*;

fn noise_pattern(w: usize, h: usize, bpp: usize) -> Vec<u8> {
    let mut pixels = vec![0u8; w * h * bpp];
    let mut state: u32 = 0xDEAD_BEEF;
    for p in pixels.iter_mut() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        *p = state as u8;
    }
    pixels
}

// ── crop ─────────────────────────────────────────────────────────────

#[test]
fn crop_center_region() {
    // 4x4 single-byte pixels numbered row-major.
    let buf: Vec<u8> = (0..16).collect();
    let out = crop_subregion(&buf, 4, 4, 1, 1, 1, 2, 2);
    assert_eq!(out, vec![5, 6, 9, 10]);
}

#[test]
fn crop_full_is_identity() {
    let buf = noise_pattern(5, 3, 3);
    let out = crop_subregion(&buf, 5, 3, 3, 0, 0, 5, 3);
    assert_eq!(out, buf);
}

#[test]
fn crop_rgb_carries_whole_pixels() {
    let buf: Vec<u8> = (0..2 * 2 * 3).collect();
    let out = crop_subregion(&buf, 2, 2, 3, 1, 0, 1, 2);
    assert_eq!(out, vec![3, 4, 5, 9, 10, 11]);
}

// ── rotate ───────────────────────────────────────────────────────────

#[test]
fn rotate90_cw_maps_corners() {
    // 2x3 image:
    //   a b
    //   c d
    //   e f
    let buf = vec![b'a', b'b', b'c', b'd', b'e', b'f'];
    let out = rotate90(&buf, 2, 3, 1, false);
    // Clockwise result is 3x2:
    //   e c a
    //   f d b
    assert_eq!(out, vec![b'e', b'c', b'a', b'f', b'd', b'b']);
}

#[test]
fn rotate90_ccw_maps_corners() {
    let buf = vec![b'a', b'b', b'c', b'd', b'e', b'f'];
    let out = rotate90(&buf, 2, 3, 1, true);
    //   b d f
    //   a c e
    assert_eq!(out, vec![b'b', b'd', b'f', b'a', b'c', b'e']);
}

#[test]
fn rotate_round_trip_restores_bytes() {
    let buf = noise_pattern(7, 4, 3);
    let cw = rotate90(&buf, 7, 4, 3, false);
    let back = rotate90(&cw, 4, 7, 3, true);
    assert_eq!(back, buf);
}

#[test]
fn four_clockwise_rotations_are_identity() {
    let mut buf = noise_pattern(5, 9, 1);
    let original = buf.clone();
    let (mut w, mut h) = (5u32, 9u32);
    for _ in 0..4 {
        buf = rotate90(&buf, w, h, 1, false);
        core::mem::swap(&mut w, &mut h);
    }
    assert_eq!(buf, original);
}

// ── flip ─────────────────────────────────────────────────────────────

#[test]
fn flip_horizontal_mirrors_rows() {
    let mut buf: Vec<u8> = (0..6).collect(); // 3x2
    flip_horizontal(&mut buf, 3, 2, 1);
    assert_eq!(buf, vec![2, 1, 0, 5, 4, 3]);
}

#[test]
fn flip_vertical_mirrors_columns() {
    let mut buf: Vec<u8> = (0..6).collect(); // 3x2
    flip_vertical(&mut buf, 3, 2, 1);
    assert_eq!(buf, vec![3, 4, 5, 0, 1, 2]);
}

#[test]
fn flip_involution_all_small_sizes() {
    for w in 1..=4u32 {
        for h in 1..=4u32 {
            for bpp in [1usize, 3] {
                let mut buf = noise_pattern(w as usize, h as usize, bpp);
                let original = buf.clone();
                flip_horizontal(&mut buf, w, h, bpp);
                flip_horizontal(&mut buf, w, h, bpp);
                assert_eq!(buf, original, "horizontal {w}x{h} bpp {bpp}");
                flip_vertical(&mut buf, w, h, bpp);
                flip_vertical(&mut buf, w, h, bpp);
                assert_eq!(buf, original, "vertical {w}x{h} bpp {bpp}");
            }
        }
    }
}

// ── resize ───────────────────────────────────────────────────────────

#[test]
fn resize_to_same_size_is_byte_identical() {
    let buf = noise_pattern(6, 5, 3);
    let out = nearest_resize(&buf, 6, 5, 3, 6, 5);
    assert_eq!(out, buf);
}

#[test]
fn resize_doubles_by_pixel_replication() {
    // 2x1 -> 4x2: src column is ex/2, src row is ey/2.
    let buf = vec![10, 20];
    let out = nearest_resize(&buf, 2, 1, 1, 4, 2);
    assert_eq!(out, vec![10, 10, 20, 20, 10, 10, 20, 20]);
}

#[test]
fn resize_shrink_truncates() {
    // 4x1 -> 2x1: src column is 4*ex/2 = 2*ex.
    let buf = vec![1, 2, 3, 4];
    let out = nearest_resize(&buf, 4, 1, 1, 2, 1);
    assert_eq!(out, vec![1, 3]);
}

#[test]
fn resize_to_single_pixel_takes_top_left() {
    let buf = noise_pattern(9, 7, 3);
    let out = nearest_resize(&buf, 9, 7, 3, 1, 1);
    assert_eq!(out, buf[..3].to_vec());
}

// ── view rect ────────────────────────────────────────────────────────

#[test]
fn clamp_moves_rect_inside_bounds() {
    let r = ViewRect::new(-5, 90, 10, 30).clamped_to(100, 100);
    assert_eq!(r, ViewRect::new(0, 70, 10, 30));
}

#[test]
fn clamp_grows_degenerate_extents() {
    let r = ViewRect::new(3, 3, 0, 0).clamped_to(8, 8);
    assert_eq!(r, ViewRect::new(3, 3, 1, 1));
}

#[test]
fn clamp_shrinks_oversized_extents() {
    let r = ViewRect::new(0, 0, 500, 500).clamped_to(64, 48);
    assert_eq!(r, ViewRect::new(0, 0, 64, 48));
}

#[test]
fn rect_rotates_by_complement_offset() {
    // 100x60 image, rect at (10, 20) sized 30x15.
    let r = ViewRect::new(10, 20, 30, 15);
    // Clockwise: new x = height - (y + h) = 60 - 35 = 25, new y = old x.
    assert_eq!(r.rotated90(100, 60, false), ViewRect::new(25, 10, 15, 30));
    // Counter-clockwise: new y = width - (x + w) = 100 - 40 = 60.
    assert_eq!(r.rotated90(100, 60, true), ViewRect::new(20, 60, 15, 30));
}

#[test]
fn rect_rotation_round_trips() {
    let r = ViewRect::new(7, 11, 13, 5);
    let cw = r.rotated90(40, 30, false);
    // The rotated image is 30x40.
    assert_eq!(cw.rotated90(30, 40, true), r);
}
