//! Device pixel encoding: logical image -> byte-exact device buffer.
//!
//! One parameterized algorithm handles every depth. Dispatch is purely a
//! function of the descriptor's bit depth and channel layout; the
//! per-depth behavior differs only in how a resolved pixel word is
//! packed into output bytes.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

use crate::dither::{dither_channel, two_level};
use crate::error::StageError;
use crate::image::{ImageFormat, LogicalImage, Palette, luma};
use crate::limits::Limits;

use super::{ByteOrder, Channels, ColorTable, PixelFormat};

/// Builder for encoding a logical image into a device pixel buffer.
///
/// ```no_run
/// use pixstage::{EncodeRequest, LogicalImage, ImageFormat, PixelFormat, Unstoppable};
///
/// let img = LogicalImage::filled(4, 4, ImageFormat::Rgb24, &[255, 0, 0])?;
/// let device = EncodeRequest::new(&PixelFormat::rgb565()).encode(&img, None, Unstoppable)?;
/// # Ok::<(), pixstage::StageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct EncodeRequest<'a> {
    fmt: &'a PixelFormat,
    table: Option<&'a ColorTable>,
    limits: Option<&'a Limits>,
}

impl<'a> EncodeRequest<'a> {
    pub fn new(fmt: &'a PixelFormat) -> Self {
        Self {
            fmt,
            table: None,
            limits: None,
        }
    }

    /// Resolved color table for indexed targets at 2+ bpp.
    pub fn color_table(mut self, table: &'a ColorTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Resource limits checked before the output allocation.
    pub fn limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Encode `img` (with its palette, if indexed) for the target format.
    pub fn encode(
        &self,
        img: &LogicalImage,
        palette: Option<&Palette>,
        stop: impl Stop,
    ) -> Result<Vec<u8>, StageError> {
        encode_device(
            img.bytes(),
            img.width(),
            img.height(),
            img.format(),
            palette,
            self.table,
            self.fmt,
            self.limits,
            &stop,
        )
    }
}

/// Core encoder over raw buffer parts (shared with the layered cache).
#[allow(clippy::too_many_arguments)]
pub(crate) fn encode_device(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: ImageFormat,
    palette: Option<&Palette>,
    table: Option<&ColorTable>,
    fmt: &PixelFormat,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<Vec<u8>, StageError> {
    fmt.validate()?;

    let w = width as usize;
    let h = height as usize;
    let expected = w
        .checked_mul(h)
        .and_then(|wh| wh.checked_mul(format.bytes_per_pixel()))
        .ok_or(StageError::DimensionsTooLarge { width, height })?;
    if bytes.len() < expected {
        return Err(StageError::BufferTooSmall {
            needed: expected,
            actual: bytes.len(),
        });
    }

    let stride = fmt.scanline_stride(width);
    let out_size = stride
        .checked_mul(h)
        .ok_or(StageError::DimensionsTooLarge { width, height })?;
    if let Some(limits) = limits {
        limits.check(width, height)?;
        limits.check_memory(out_size)?;
    }

    stop.check()?;

    match fmt.channels {
        Channels::Indexed => match fmt.bits_per_pixel {
            1 => encode_mono(bytes, width, height, format, palette, fmt, stride, stop),
            _ => {
                let table = table.ok_or(StageError::MissingColorTable)?;
                encode_indexed(bytes, width, height, format, table, fmt, stride, stop)
            }
        },
        Channels::Rgb {
            r_mask,
            g_mask,
            b_mask,
        } => encode_direct(
            bytes,
            width,
            height,
            format,
            palette,
            fmt,
            stride,
            [r_mask, g_mask, b_mask],
            stop,
        ),
    }
}

/// 1 bpp: two-level dither on luma, then 8 pixels per byte.
///
/// Bit 1 means the light level (dithered 255), bit 0 the dark level.
fn encode_mono(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: ImageFormat,
    palette: Option<&Palette>,
    fmt: &PixelFormat,
    stride: usize,
    stop: &dyn Stop,
) -> Result<Vec<u8>, StageError> {
    let w = width as usize;
    let h = height as usize;

    let gray: Vec<u8> = match format {
        ImageFormat::Rgb24 => bytes
            .chunks_exact(3)
            .take(w * h)
            .map(|p| luma(p[0], p[1], p[2]))
            .collect(),
        ImageFormat::Indexed8 => {
            let palette = palette.ok_or(StageError::MissingPalette)?;
            bytes[..w * h].iter().map(|&i| palette.luma(i)).collect()
        }
    };

    let bits = dither_channel(&gray, width, height, two_level, stop)?;

    let mut out = vec![0u8; stride * h];
    for (y, (src_row, dst_row)) in bits.chunks_exact(w).zip(out.chunks_exact_mut(stride)).enumerate()
    {
        if y % 16 == 0 {
            stop.check()?;
        }
        for (x, &v) in src_row.iter().enumerate() {
            if v != 0 {
                let bit = match fmt.byte_order {
                    ByteOrder::LsbFirst => x % 8,
                    ByteOrder::MsbFirst => 7 - x % 8,
                };
                dst_row[x / 8] |= 1 << bit;
            }
        }
    }
    Ok(out)
}

/// 2/4/6/8 bpp indexed: source index -> device index, sub-byte packed.
fn encode_indexed(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: ImageFormat,
    table: &ColorTable,
    fmt: &PixelFormat,
    stride: usize,
    stop: &dyn Stop,
) -> Result<Vec<u8>, StageError> {
    if format != ImageFormat::Indexed8 {
        return Err(StageError::UnsupportedFormat(alloc::format!(
            "indexed {} bpp target requires an Indexed8 source (quantize first)",
            fmt.bits_per_pixel
        )));
    }

    let w = width as usize;
    let h = height as usize;
    let depth = u32::from(fmt.bits_per_pixel);
    let value_mask = ((1u16 << depth) - 1) as u8;

    let mut out = vec![0u8; stride * h];
    for (y, (src_row, dst_row)) in bytes
        .chunks_exact(w)
        .take(h)
        .zip(out.chunks_exact_mut(stride))
        .enumerate()
    {
        if y % 16 == 0 {
            stop.check()?;
        }
        for (x, &src) in src_row.iter().enumerate() {
            let dev = table.device_index(src) & value_mask;
            match fmt.bits_per_pixel {
                2 | 4 => {
                    let per_byte = 8 / depth as usize;
                    let slot = (x % per_byte) as u32;
                    let shift = match fmt.byte_order {
                        ByteOrder::LsbFirst => slot * depth,
                        ByteOrder::MsbFirst => 8 - depth - slot * depth,
                    };
                    dst_row[x / per_byte] |= dev << shift;
                }
                // One pixel per byte: right-justified for LSB-first
                // surfaces, left-justified for MSB-first.
                6 => {
                    dst_row[x] = match fmt.byte_order {
                        ByteOrder::LsbFirst => dev,
                        ByteOrder::MsbFirst => dev << 2,
                    };
                }
                _ => dst_row[x] = dev,
            }
        }
    }
    Ok(out)
}

/// Requantize an 8-bit channel value to `width` significant bits.
///
/// Narrow channels truncate (shift, not mask, so the result never
/// exceeds the channel range); hypothetical wide channels extend by
/// shifting left.
fn requantize(v: u8, width: u32) -> u32 {
    if width <= 8 {
        u32::from(v) >> (8 - width)
    } else {
        u32::from(v) << (width - 8)
    }
}

/// 12/15/16/24/32 bpp direct color: shift each channel into its mask
/// position and emit the word in byte-order.
#[allow(clippy::too_many_arguments)]
fn encode_direct(
    bytes: &[u8],
    width: u32,
    height: u32,
    format: ImageFormat,
    palette: Option<&Palette>,
    fmt: &PixelFormat,
    stride: usize,
    masks: [u32; 3],
    stop: &dyn Stop,
) -> Result<Vec<u8>, StageError> {
    let w = width as usize;
    let h = height as usize;
    let src_bpp = format.bytes_per_pixel();
    let nbytes = fmt.bytes_per_word();

    if format == ImageFormat::Indexed8 && palette.is_none() {
        return Err(StageError::MissingPalette);
    }

    let shifts = masks.map(|m| m.trailing_zeros());
    let widths = masks.map(|m| m.count_ones());

    let mut out = vec![0u8; stride * h];
    for (y, (src_row, dst_row)) in bytes
        .chunks_exact(w * src_bpp)
        .take(h)
        .zip(out.chunks_exact_mut(stride))
        .enumerate()
    {
        if y % 16 == 0 {
            stop.check()?;
        }
        for x in 0..w {
            let (r, g, b) = match format {
                ImageFormat::Rgb24 => {
                    let off = x * 3;
                    (src_row[off], src_row[off + 1], src_row[off + 2])
                }
                ImageFormat::Indexed8 => {
                    // Presence checked above.
                    match palette {
                        Some(p) => p.rgb(src_row[x]),
                        None => return Err(StageError::MissingPalette),
                    }
                }
            };

            let word = (requantize(r, widths[0]) << shifts[0])
                | (requantize(g, widths[1]) << shifts[1])
                | (requantize(b, widths[2]) << shifts[2]);

            let dst = &mut dst_row[x * nbytes..(x + 1) * nbytes];
            match fmt.byte_order {
                ByteOrder::LsbFirst => dst.copy_from_slice(&word.to_le_bytes()[..nbytes]),
                ByteOrder::MsbFirst => dst.copy_from_slice(&word.to_be_bytes()[4 - nbytes..]),
            }
        }
    }
    Ok(out)
}
