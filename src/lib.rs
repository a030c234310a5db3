//! # pixstage
//!
//! Image representation and display-adaptation pipeline: a layered image
//! cache (original / cropped / display stages kept consistent under
//! crop, scale, rotate, and flip), a Floyd-Steinberg error-diffusion
//! ditherer, and a device pixel encoder producing byte-exact buffers for
//! arbitrary target formats (1/2/4/6/8/12/15/16/24/32 bpp, arbitrary
//! contiguous channel masks, either byte order, optional scanline
//! padding).
//!
//! ## Collaborators
//!
//! File-format codecs, palette quantization, smooth resampling, and the
//! display surface itself are external: decoders hand a [`LogicalImage`]
//! (plus optional [`Palette`]) to [`LayeredImageCache::load`], a
//! [`Resampler`] implementation provides `Smooth` scaling, and the
//! display service supplies the [`PixelFormat`] and consumes the encoded
//! buffer.
//!
//! ## Aliasing
//!
//! Stages that match their source exactly borrow it instead of copying;
//! [`LayeredImageCache::current_buffer`] returns a borrow that the next
//! mutation replaces. Callers needing stability across mutations copy it
//! themselves.
//!
//! ## Non-Goals
//!
//! - File formats, persistence, network I/O
//! - Palette construction (consumed as quantizer output only)
//! - Interpolating resampler quality (behind the [`Resampler`] seam)
//!
//! ## Usage
//!
//! ```no_run
//! use pixstage::{
//!     DisplayMode, ImageFormat, LayeredImageCache, LogicalImage, Palette, PixelFormat,
//!     Unstoppable, ViewRect,
//! };
//!
//! // A decoder produced a 64x64 indexed image with a 16-level palette.
//! let image = LogicalImage::filled(64, 64, ImageFormat::Indexed8, &[0])?;
//! let mut cache = LayeredImageCache::new(image, Some(Palette::gray(16)));
//!
//! cache.crop(ViewRect::new(8, 8, 48, 48));
//! cache.resize(96, 96, DisplayMode::Dithered);
//!
//! // Hand the finished device buffer to the display service.
//! let device = cache.encode_for_display(&PixelFormat::rgb565(), None, None, &Unstoppable)?;
//! # Ok::<(), pixstage::StageError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod cache;
mod error;
mod image;
mod limits;

pub mod device;
pub mod dither;
pub mod geometry;

// Re-exports
pub use cache::{DisplayMode, DisplaySpec, LayeredImageCache, Resampler};
pub use device::{ByteOrder, Channels, ColorTable, EncodeRequest, PixelFormat};
pub use enough::{Stop, Unstoppable};
pub use error::StageError;
pub use geometry::ViewRect;
pub use image::{ImageFormat, LogicalImage, Palette};
pub use limits::Limits;
