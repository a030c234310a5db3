//! Target device pixel formats.
//!
//! A [`PixelFormat`] describes the exact bit layout a display surface
//! expects: bits per pixel, byte order, per-channel bit masks (or indexed
//! mode), and the scanline padding rule. It is queried once from the
//! display service and never mutated here.
//!
//! Supported layouts: indexed 1/2/4/6/8 bpp and direct-color
//! 12/15/16/24/32 bpp with arbitrary contiguous channel masks. Anything
//! else fails [`PixelFormat::validate`] — there is no silent degradation
//! for unrecognized device formats.

mod encode;

pub use encode::EncodeRequest;
pub(crate) use encode::encode_device;

use alloc::format;

use crate::error::StageError;

/// Byte order of multi-byte device pixels, and bit order within packed
/// bytes for sub-byte depths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// Least significant byte first; bit 0 of a packed byte is the
    /// leftmost pixel.
    LsbFirst,
    /// Most significant byte first; bit 7 of a packed byte is the
    /// leftmost pixel.
    MsbFirst,
}

/// Channel layout of a device pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    /// Pixels are indices into a device color map.
    Indexed,
    /// Direct color: each channel occupies a contiguous mask of bits
    /// within the pixel word.
    Rgb {
        r_mask: u32,
        g_mask: u32,
        b_mask: u32,
    },
}

/// Description of a target device pixel encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelFormat {
    pub bits_per_pixel: u8,
    pub byte_order: ByteOrder,
    pub channels: Channels,
    /// Scanlines are zero-padded to a multiple of this many bytes
    /// (1 = no padding; X-style surfaces typically use 4).
    pub scanline_pad: u32,
}

impl PixelFormat {
    /// 1-bit black/white bitmap, rows padded to 4 bytes.
    pub fn mono1(byte_order: ByteOrder) -> Self {
        Self {
            bits_per_pixel: 1,
            byte_order,
            channels: Channels::Indexed,
            scanline_pad: 4,
        }
    }

    /// Indexed target at 2/4/6/8 bpp, unpadded.
    pub fn indexed(bits_per_pixel: u8, byte_order: ByteOrder) -> Self {
        Self {
            bits_per_pixel,
            byte_order,
            channels: Channels::Indexed,
            scanline_pad: 1,
        }
    }

    /// 8-bit indexed, the most common palettized surface.
    pub fn indexed8() -> Self {
        Self::indexed(8, ByteOrder::LsbFirst)
    }

    /// 16-bit 5-6-5 direct color, little endian.
    pub fn rgb565() -> Self {
        Self {
            bits_per_pixel: 16,
            byte_order: ByteOrder::LsbFirst,
            channels: Channels::Rgb {
                r_mask: 0xF800,
                g_mask: 0x07E0,
                b_mask: 0x001F,
            },
            scanline_pad: 1,
        }
    }

    /// 15-bit 5-5-5 direct color in 16-bit words, little endian.
    pub fn rgb555() -> Self {
        Self {
            bits_per_pixel: 15,
            byte_order: ByteOrder::LsbFirst,
            channels: Channels::Rgb {
                r_mask: 0x7C00,
                g_mask: 0x03E0,
                b_mask: 0x001F,
            },
            scanline_pad: 1,
        }
    }

    /// 24-bit 8-8-8 direct color, three bytes per pixel.
    pub fn rgb888(byte_order: ByteOrder) -> Self {
        Self {
            bits_per_pixel: 24,
            byte_order,
            channels: Channels::Rgb {
                r_mask: 0xFF0000,
                g_mask: 0x00FF00,
                b_mask: 0x0000FF,
            },
            scanline_pad: 1,
        }
    }

    /// 32-bit xRGB direct color (high byte unused), little endian.
    pub fn xrgb8888() -> Self {
        Self {
            bits_per_pixel: 32,
            byte_order: ByteOrder::LsbFirst,
            channels: Channels::Rgb {
                r_mask: 0x00FF0000,
                g_mask: 0x0000FF00,
                b_mask: 0x000000FF,
            },
            scanline_pad: 4,
        }
    }

    /// Override the scanline padding rule.
    pub fn with_scanline_pad(mut self, pad: u32) -> Self {
        self.scanline_pad = pad;
        self
    }

    /// Reject every depth/channel combination the encoder does not cover.
    pub fn validate(&self) -> Result<(), StageError> {
        if !matches!(self.scanline_pad, 1 | 2 | 4) {
            return Err(self.unsupported("scanline pad must be 1, 2, or 4"));
        }
        match self.channels {
            Channels::Indexed => {
                if !matches!(self.bits_per_pixel, 1 | 2 | 4 | 6 | 8) {
                    return Err(self.unsupported("indexed depth must be 1, 2, 4, 6, or 8"));
                }
            }
            Channels::Rgb {
                r_mask,
                g_mask,
                b_mask,
            } => {
                if !matches!(self.bits_per_pixel, 12 | 15 | 16 | 24 | 32) {
                    return Err(
                        self.unsupported("direct-color depth must be 12, 15, 16, 24, or 32")
                    );
                }
                let word_mask = if self.bits_per_pixel == 32 {
                    u32::MAX
                } else {
                    (1u32 << self.bits_per_pixel) - 1
                };
                for (name, mask) in [("red", r_mask), ("green", g_mask), ("blue", b_mask)] {
                    if mask == 0 {
                        return Err(self.unsupported(&format!("{name} mask is zero")));
                    }
                    if mask & !word_mask != 0 {
                        return Err(
                            self.unsupported(&format!("{name} mask exceeds the pixel width"))
                        );
                    }
                    let run = mask >> mask.trailing_zeros();
                    if run & (run + 1) != 0 {
                        return Err(self.unsupported(&format!("{name} mask is not contiguous")));
                    }
                }
                if r_mask & g_mask != 0 || g_mask & b_mask != 0 || r_mask & b_mask != 0 {
                    return Err(self.unsupported("channel masks overlap"));
                }
            }
        }
        Ok(())
    }

    /// Bytes occupied by one device pixel word (direct color), or by the
    /// storage unit of an indexed pixel (1 for 6/8 bpp).
    pub fn bytes_per_word(&self) -> usize {
        usize::from(self.bits_per_pixel.div_ceil(8))
    }

    /// Bytes per output scanline for `width` pixels, padding included.
    pub fn scanline_stride(&self, width: u32) -> usize {
        let width = width as usize;
        let raw = match self.channels {
            Channels::Indexed => match self.bits_per_pixel {
                // 6 bpp stores one pixel per byte, value justified.
                1 | 2 | 4 => (width * usize::from(self.bits_per_pixel)).div_ceil(8),
                _ => width,
            },
            Channels::Rgb { .. } => width * self.bytes_per_word(),
        };
        let pad = self.scanline_pad as usize;
        raw.div_ceil(pad) * pad
    }

    fn unsupported(&self, why: &str) -> StageError {
        StageError::UnsupportedFormat(format!(
            "{} bpp {:?}: {why}",
            self.bits_per_pixel, self.channels
        ))
    }
}

/// Source palette index to device-native index mapping.
///
/// Resolved by the display service after it allocates device colors for
/// the current palette; consumed read-only by the encoder.
#[derive(Clone)]
pub struct ColorTable {
    device_index: [u8; 256],
}

impl ColorTable {
    /// Table mapping every index to itself.
    pub fn identity() -> Self {
        let mut device_index = [0u8; 256];
        for (i, d) in device_index.iter_mut().enumerate() {
            *d = i as u8;
        }
        Self { device_index }
    }

    /// Build from resolved device indices; missing entries map to 0.
    pub fn from_slice(indices: &[u8]) -> Self {
        let mut device_index = [0u8; 256];
        let n = indices.len().min(256);
        device_index[..n].copy_from_slice(&indices[..n]);
        Self { device_index }
    }

    /// Device index for a source palette index.
    pub fn device_index(&self, source: u8) -> u8 {
        self.device_index[usize::from(source)]
    }
}

impl core::fmt::Debug for ColorTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ColorTable")
            .field("device_index", &"[256 entries]")
            .finish()
    }
}
