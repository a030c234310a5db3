//! Logical image buffers and palettes.
//!
//! A [`LogicalImage`] is the in-memory form produced by an external format
//! decoder: either one palette index per pixel ([`ImageFormat::Indexed8`])
//! or three bytes R,G,B per pixel ([`ImageFormat::Rgb24`]). Palettes are
//! produced by an external quantizer; this crate only consumes them.

use alloc::vec::Vec;

use crate::error::StageError;

/// Pixel storage format of a [`LogicalImage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// One byte per pixel, value is an index into a <=256-entry palette.
    Indexed8,
    /// Three bytes per pixel (R, G, B), no palette.
    Rgb24,
}

impl ImageFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Indexed8 => 1,
            Self::Rgb24 => 3,
        }
    }
}

/// An owned rectangular pixel buffer plus its dimensions and format.
///
/// Invariant: `bytes.len() == width * height * format.bytes_per_pixel()`,
/// enforced by [`LogicalImage::new`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogicalImage {
    width: u32,
    height: u32,
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl LogicalImage {
    /// Wrap a decoded pixel buffer.
    ///
    /// Returns [`StageError::BufferTooSmall`] if `bytes` does not hold
    /// exactly `width * height` pixels, or
    /// [`StageError::DimensionsTooLarge`] if the size computation
    /// overflows or a dimension is zero.
    pub fn new(
        width: u32,
        height: u32,
        format: ImageFormat,
        bytes: Vec<u8>,
    ) -> Result<Self, StageError> {
        if width == 0 || height == 0 {
            return Err(StageError::DimensionsTooLarge { width, height });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|wh| wh.checked_mul(format.bytes_per_pixel()))
            .ok_or(StageError::DimensionsTooLarge { width, height })?;
        if bytes.len() != expected {
            return Err(StageError::BufferTooSmall {
                needed: expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            bytes,
        })
    }

    /// A `width x height` image filled with one pixel value.
    pub fn filled(
        width: u32,
        height: u32,
        format: ImageFormat,
        pixel: &[u8],
    ) -> Result<Self, StageError> {
        let bpp = format.bytes_per_pixel();
        if pixel.len() != bpp {
            return Err(StageError::BufferTooSmall {
                needed: bpp,
                actual: pixel.len(),
            });
        }
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(StageError::DimensionsTooLarge { width, height })?;
        let mut bytes = Vec::with_capacity(count.saturating_mul(bpp));
        for _ in 0..count {
            bytes.extend_from_slice(pixel);
        }
        Self::new(width, height, format, bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub(crate) fn replace_geometry(&mut self, width: u32, height: u32, bytes: Vec<u8>) {
        debug_assert_eq!(
            bytes.len(),
            width as usize * height as usize * self.format.bytes_per_pixel()
        );
        self.width = width;
        self.height = height;
        self.bytes = bytes;
    }

    /// Reinterpret an RGB24 buffer as typed `rgb::RGB8` pixels.
    #[cfg(feature = "rgb")]
    pub fn as_rgb_pixels(&self) -> Result<&[rgb::RGB8], StageError> {
        use rgb::AsPixels as _;
        if self.format != ImageFormat::Rgb24 {
            return Err(StageError::UnsupportedFormat(alloc::format!(
                "cannot view {:?} as RGB8 pixels",
                self.format
            )));
        }
        Ok(self.bytes.as_pixels())
    }
}

/// Integer Rec.601 luma, rounded.
pub(crate) fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114 + 500) / 1000) as u8
}

/// An RGB color table for [`ImageFormat::Indexed8`] images.
///
/// At most 256 entries are meaningful; entries at or beyond `count` are
/// black. Built by an external quantizer and swapped in via
/// [`crate::LayeredImageCache::set_palette`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    entries: [(u8, u8, u8); 256],
    count: u16,
}

impl Palette {
    /// Build a palette from up to 256 RGB triples.
    pub fn new(colors: &[(u8, u8, u8)]) -> Self {
        let mut entries = [(0u8, 0u8, 0u8); 256];
        let count = colors.len().min(256);
        entries[..count].copy_from_slice(&colors[..count]);
        Self {
            entries,
            count: count as u16,
        }
    }

    /// An evenly spaced gray ramp with `levels` entries (2..=256).
    pub fn gray(levels: u16) -> Self {
        let levels = levels.clamp(2, 256);
        let mut entries = [(0u8, 0u8, 0u8); 256];
        for (i, e) in entries[..levels as usize].iter_mut().enumerate() {
            let v = (i * 255 / (levels as usize - 1)) as u8;
            *e = (v, v, v);
        }
        Self {
            entries,
            count: levels,
        }
    }

    /// Number of meaningful entries.
    pub fn count(&self) -> u16 {
        self.count
    }

    /// RGB triple for a palette index. Indices at or beyond `count` read
    /// as black rather than panicking; decoders routinely emit them.
    pub fn rgb(&self, index: u8) -> (u8, u8, u8) {
        self.entries[usize::from(index)]
    }

    /// Rec.601 luma of the entry at `index`.
    pub fn luma(&self, index: u8) -> u8 {
        let (r, g, b) = self.rgb(index);
        luma(r, g, b)
    }

    /// Index of the entry nearest to `(r, g, b)` by squared distance.
    pub fn nearest(&self, r: u8, g: u8, b: u8) -> u8 {
        let mut best = 0usize;
        let mut best_dist = u32::MAX;
        for (i, &(er, eg, eb)) in self.entries[..usize::from(self.count.max(1))]
            .iter()
            .enumerate()
        {
            let dr = i32::from(er) - i32::from(r);
            let dg = i32::from(eg) - i32::from(g);
            let db = i32::from(eb) - i32::from(b);
            let dist = (dr * dr + dg * dg + db * db) as u32;
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best as u8
    }

    /// Indices of the darkest and lightest entries by luma.
    ///
    /// Ties keep the lowest index; the two can coincide for a
    /// single-luma palette.
    pub fn extremes(&self) -> (u8, u8) {
        let mut darkest = 0u8;
        let mut lightest = 0u8;
        let mut min = u8::MAX;
        let mut max = 0u8;
        for i in 0..self.count.max(1) {
            let l = self.luma(i as u8);
            if l < min {
                min = l;
                darkest = i as u8;
            }
            if l > max {
                max = l;
                lightest = i as u8;
            }
        }
        (darkest, lightest)
    }

    /// Typed view of the meaningful entries.
    #[cfg(feature = "rgb")]
    pub fn as_rgb_entries(&self) -> Vec<rgb::RGB8> {
        self.entries[..usize::from(self.count)]
            .iter()
            .map(|&(r, g, b)| rgb::RGB8 { r, g, b })
            .collect()
    }
}
