//! The layered image cache: original, cropped, and display stages.
//!
//! One [`LayeredImageCache`] owns the image triad and keeps it
//! consistent: `displayed` is regenerated from `cropped`, and `cropped`
//! from `original`, before any public mutator returns. A stage that
//! matches its source exactly aliases it and owns no memory; readers
//! must never assume the stages are distinct buffers.
//!
//! The cache is single-threaded and synchronous. Allocation exhaustion
//! aborts (there is no recovery path by design), so every mutator here
//! is infallible; fallible configuration errors exist only at the
//! [`LayeredImageCache::encode_for_display`] boundary.

use alloc::boxed::Box;
use alloc::vec::Vec;

use enough::{Stop, Unstoppable};

use crate::device::{ColorTable, PixelFormat, encode_device};
use crate::dither::dither_indexed_bw;
use crate::error::StageError;
use crate::geometry::{self, ViewRect};
use crate::image::{ImageFormat, LogicalImage, Palette};
use crate::limits::Limits;

/// How the display stage is derived from the crop stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// Nearest-neighbor scaling, no color processing.
    #[default]
    Raw,
    /// Error-diffusion reduction to the palette's extreme entries
    /// (indexed images only; degrades to `Raw` otherwise).
    Dithered,
    /// Interpolating resample via the installed [`Resampler`];
    /// degrades to `Raw` when unavailable or failing.
    Smooth,
}

/// Target size and mode of the display stage.
///
/// After a mutator runs, `mode` is the *effective* mode: a requested
/// `Smooth` or `Dithered` that could not be honored reads back as `Raw`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplaySpec {
    pub target_w: u32,
    pub target_h: u32,
    pub mode: DisplayMode,
}

/// External smooth-resampling collaborator.
///
/// `None` signals failure; the cache falls back to nearest-neighbor and
/// corrects the effective mode to [`DisplayMode::Raw`].
pub trait Resampler {
    fn resize(
        &self,
        buf: &[u8],
        w: u32,
        h: u32,
        bpp: usize,
        new_w: u32,
        new_h: u32,
    ) -> Option<Vec<u8>>;
}

/// One derived stage of the triad: either an alias of the previous
/// stage (no owned memory) or an independently owned buffer.
#[derive(Clone, Debug)]
enum Stage {
    Alias,
    Owned(StageBuf),
}

#[derive(Clone, Debug)]
struct StageBuf {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
}

impl Stage {
    fn is_alias(&self) -> bool {
        matches!(self, Stage::Alias)
    }
}

/// Owner of the image triad and the transform pipeline over it.
pub struct LayeredImageCache {
    original: LogicalImage,
    palette: Option<Palette>,
    view: ViewRect,
    cropped: Stage,
    displayed: Stage,
    spec: DisplaySpec,
    resampler: Option<Box<dyn Resampler>>,
}

impl LayeredImageCache {
    /// Take ownership of a freshly decoded image.
    ///
    /// The view rect covers the whole image and both derived stages
    /// alias it; the display spec is the image size in `Raw` mode.
    pub fn new(image: LogicalImage, palette: Option<Palette>) -> Self {
        let spec = DisplaySpec {
            target_w: image.width(),
            target_h: image.height(),
            mode: DisplayMode::Raw,
        };
        let view = ViewRect::full(image.width(), image.height());
        Self {
            original: image,
            palette,
            view,
            cropped: Stage::Alias,
            displayed: Stage::Alias,
            spec,
            resampler: None,
        }
    }

    /// Replace the loaded image, resetting crop and display state.
    pub fn load(&mut self, image: LogicalImage, palette: Option<Palette>) {
        self.view = ViewRect::full(image.width(), image.height());
        self.spec = DisplaySpec {
            target_w: image.width(),
            target_h: image.height(),
            mode: DisplayMode::Raw,
        };
        self.original = image;
        self.palette = palette;
        self.cropped = Stage::Alias;
        self.displayed = Stage::Alias;
    }

    /// Install the smooth-resampling collaborator.
    pub fn set_resampler(&mut self, resampler: Box<dyn Resampler>) {
        self.resampler = Some(resampler);
    }

    /// Replace the palette (external quantizer output) and regenerate
    /// the display stage, whose dithered form depends on it.
    pub fn set_palette(&mut self, palette: Option<Palette>) {
        self.palette = palette;
        self.apply_display();
    }

    /// Crop the view to `rect`, clamped inside the original image and to
    /// at least 1x1.
    ///
    /// A rect covering the whole image makes the crop stage an alias (no
    /// allocation) — including when it already was one. The display
    /// stage is regenerated at the new crop size, preserving the current
    /// mode.
    pub fn crop(&mut self, rect: ViewRect) {
        let rect = rect.clamped_to(self.original.width(), self.original.height());
        self.view = rect;
        if rect.covers(self.original.width(), self.original.height()) {
            self.cropped = Stage::Alias;
        } else {
            let bytes = geometry::crop_subregion(
                self.original.bytes(),
                self.original.width(),
                self.original.height(),
                self.original.format().bytes_per_pixel(),
                rect.x as u32,
                rect.y as u32,
                rect.w,
                rect.h,
            );
            self.cropped = Stage::Owned(StageBuf {
                width: rect.w,
                height: rect.h,
                bytes,
            });
        }
        self.spec.target_w = rect.w;
        self.spec.target_h = rect.h;
        self.apply_display();
    }

    /// Recompute the display stage at `target_w x target_h` in `mode`.
    ///
    /// Zero targets clamp to 1. Same-size `Raw` aliases the crop stage.
    pub fn resize(&mut self, target_w: u32, target_h: u32, mode: DisplayMode) {
        self.spec = DisplaySpec {
            target_w: target_w.max(1),
            target_h: target_h.max(1),
            mode,
        };
        self.apply_display();
    }

    /// Rotate the whole triad 90 degrees.
    ///
    /// Width and height swap everywhere; the crop rect rotates by its
    /// complement offset along the rotated axis.
    pub fn rotate90(&mut self, counter_clockwise: bool) {
        let bpp = self.original.format().bytes_per_pixel();
        let (ow, oh) = (self.original.width(), self.original.height());

        let rotated = geometry::rotate90(self.original.bytes(), ow, oh, bpp, counter_clockwise);
        self.original.replace_geometry(oh, ow, rotated);
        self.view = self.view.rotated90(ow, oh, counter_clockwise);

        for stage in [&mut self.cropped, &mut self.displayed] {
            if let Stage::Owned(buf) = stage {
                let rotated = geometry::rotate90(
                    &buf.bytes,
                    buf.width,
                    buf.height,
                    bpp,
                    counter_clockwise,
                );
                let (w, h) = (buf.width, buf.height);
                buf.width = h;
                buf.height = w;
                buf.bytes = rotated;
            }
        }
        core::mem::swap(&mut self.spec.target_w, &mut self.spec.target_h);
    }

    /// Mirror the whole triad along one axis.
    ///
    /// Flip changes pixel order only; the crop rect is never
    /// transformed. Callers wanting a region-local flip crop first.
    pub fn flip(&mut self, vertical: bool) {
        let bpp = self.original.format().bytes_per_pixel();
        let (w, h) = (self.original.width(), self.original.height());
        flip_buf(self.original.bytes_mut(), w, h, bpp, vertical);

        for stage in [&mut self.cropped, &mut self.displayed] {
            if let Stage::Owned(buf) = stage {
                flip_buf(&mut buf.bytes, buf.width, buf.height, bpp, vertical);
            }
        }
    }

    /// The current display buffer, resolved through any aliases.
    ///
    /// Always up to date: every mutator restores the triad invariant
    /// before returning. The slice borrows cache-owned memory and is
    /// replaced by the next mutation; callers needing stability across
    /// mutations must copy it.
    pub fn current_buffer(&self) -> &[u8] {
        match &self.displayed {
            Stage::Owned(buf) => &buf.bytes,
            Stage::Alias => self.crop_buffer(),
        }
    }

    /// Width and height of the display stage.
    pub fn display_size(&self) -> (u32, u32) {
        match &self.displayed {
            Stage::Owned(buf) => (buf.width, buf.height),
            Stage::Alias => self.crop_size(),
        }
    }

    /// Effective display spec (mode corrected for any degradation).
    pub fn display_spec(&self) -> DisplaySpec {
        self.spec
    }

    pub fn format(&self) -> ImageFormat {
        self.original.format()
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn view_rect(&self) -> ViewRect {
        self.view
    }

    pub fn original(&self) -> &LogicalImage {
        &self.original
    }

    /// Whether the crop stage borrows the original (no owned memory).
    pub fn cropped_is_alias(&self) -> bool {
        self.cropped.is_alias()
    }

    /// Whether the display stage borrows the crop stage.
    pub fn displayed_is_alias(&self) -> bool {
        self.displayed.is_alias()
    }

    /// Encode the current display buffer for a target device format.
    ///
    /// This is the hand-off point to the display collaborator: the
    /// returned buffer is byte-exact for `fmt` and owned by the caller.
    pub fn encode_for_display(
        &self,
        fmt: &PixelFormat,
        table: Option<&ColorTable>,
        limits: Option<&Limits>,
        stop: &dyn Stop,
    ) -> Result<Vec<u8>, StageError> {
        let (w, h) = self.display_size();
        encode_device(
            self.current_buffer(),
            w,
            h,
            self.original.format(),
            self.palette.as_ref(),
            table,
            fmt,
            limits,
            stop,
        )
    }

    /// Typed 2D view of the display buffer (RGB24 images only).
    #[cfg(feature = "imgref")]
    pub fn display_imgref(&self) -> Result<imgref::ImgRef<'_, rgb::RGB8>, StageError> {
        use rgb::AsPixels as _;
        if self.original.format() != ImageFormat::Rgb24 {
            return Err(StageError::UnsupportedFormat(alloc::format!(
                "cannot view {:?} as RGB8 pixels",
                self.original.format()
            )));
        }
        let (w, h) = self.display_size();
        Ok(imgref::ImgRef::new(
            self.current_buffer().as_pixels(),
            w as usize,
            h as usize,
        ))
    }

    fn crop_buffer(&self) -> &[u8] {
        match &self.cropped {
            Stage::Owned(buf) => &buf.bytes,
            Stage::Alias => self.original.bytes(),
        }
    }

    fn crop_size(&self) -> (u32, u32) {
        match &self.cropped {
            Stage::Owned(buf) => (buf.width, buf.height),
            Stage::Alias => (self.original.width(), self.original.height()),
        }
    }

    /// Rebuild the display stage from the crop stage per `self.spec`,
    /// downgrading the stored mode wherever a request cannot be honored.
    fn apply_display(&mut self) {
        let (cw, ch) = self.crop_size();
        let bpp = self.original.format().bytes_per_pixel();
        let (tw, th) = (self.spec.target_w.max(1), self.spec.target_h.max(1));
        let mut mode = self.spec.mode;

        if mode == DisplayMode::Dithered
            && (self.original.format() != ImageFormat::Indexed8 || self.palette.is_none())
        {
            mode = DisplayMode::Raw;
        }

        let mut smooth: Option<Vec<u8>> = None;
        if mode == DisplayMode::Smooth {
            let expect = tw as usize * th as usize * bpp;
            match self
                .resampler
                .as_ref()
                .and_then(|r| r.resize(self.crop_buffer(), cw, ch, bpp, tw, th))
            {
                Some(buf) if buf.len() == expect => smooth = Some(buf),
                _ => mode = DisplayMode::Raw,
            }
        }

        let mut bytes = match smooth {
            Some(buf) => buf,
            None if tw == cw && th == ch => {
                if mode == DisplayMode::Raw {
                    self.displayed = Stage::Alias;
                    self.spec = DisplaySpec {
                        target_w: tw,
                        target_h: th,
                        mode,
                    };
                    return;
                }
                // Same size but dithered output still needs its own buffer.
                self.crop_buffer().to_vec()
            }
            None => geometry::nearest_resize(self.crop_buffer(), cw, ch, bpp, tw, th),
        };

        if mode == DisplayMode::Dithered {
            // Palette presence established above.
            if let Some(palette) = self.palette.as_ref() {
                match dither_indexed_bw(&bytes, palette, tw, th, &Unstoppable) {
                    Ok(dithered) => bytes = dithered,
                    Err(_) => mode = DisplayMode::Raw,
                }
            }
        }

        self.displayed = Stage::Owned(StageBuf {
            width: tw,
            height: th,
            bytes,
        });
        self.spec = DisplaySpec {
            target_w: tw,
            target_h: th,
            mode,
        };
    }
}

fn flip_buf(buf: &mut [u8], w: u32, h: u32, bpp: usize, vertical: bool) {
    if vertical {
        geometry::flip_vertical(buf, w, h, bpp);
    } else {
        geometry::flip_horizontal(buf, w, h, bpp);
    }
}
