//! # simdpix-rs
//!
//! Per-pixel image primitives that run on the widest SIMD instruction set the
//! CPU supports, with a portable scalar fallback.
//!
//! - **Tiered kernels** - AVX2 (32 bytes), SSE2 / NEON (16 bytes), scalar
//! - **Runtime dispatch** - capabilities are detected once; each call picks the
//!   widest tier whose vector width fits the row
//! - **Bit-exact** - every tier produces the same bytes as the scalar kernel
//! - **Any geometry** - unaligned buffers, padded strides, widths that are not a
//!   multiple of the vector width
//!
//! ## Quick Start
//!
//! ```
//! use simdpix_rs::{binarize, CompareType, Threshold};
//!
//! let (width, height) = (640, 480);
//! let gray = vec![100u8; width * height];
//! let mut mask = vec![0u8; width * height];
//!
//! // 255 where gray > 90, 0 elsewhere
//! binarize(
//!     &gray, width, width, height,
//!     Threshold::new(90, 255, 0),
//!     &mut mask, width,
//!     CompareType::GreaterThan,
//! );
//! assert!(mask.iter().all(|&p| p == 255));
//! ```
//!
//! ## Builder and Tier Control
//!
//! ```
//! use simdpix_rs::{Binarization, CompareType, Tier};
//!
//! # fn main() -> Result<(), simdpix_rs::Error> {
//! let src = vec![0u8; 100 * 10];
//! let mut dst = vec![0u8; 128 * 10];
//! Binarization::new(CompareType::LessThan)
//!     .value(1)
//!     .positive(1)
//!     .negative(0)
//!     .max_tier(Tier::Scalar)? // force the reference kernel
//!     .apply(&src, 100, 100, 10, &mut dst, 128)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Saving Images
//!
//! Encoding is pluggable through [`ImageSaver`]; no codec is bundled.
//!
//! ```no_run
//! use simdpix_rs::{image_save_to_file, ImageFileType, ImageView, PixelFormat};
//!
//! fn raw_dump(image: &ImageView<'_>, _: ImageFileType, _: i32) -> Option<Vec<u8>> {
//!     Some((0..image.height()).flat_map(|y| image.row(y).to_vec()).collect())
//! }
//!
//! # fn main() -> Result<(), simdpix_rs::Error> {
//! let pixels = vec![0u8; 64 * 64];
//! let image = ImageView::new(&pixels, 64, 64, 64, PixelFormat::Gray8)?;
//! image_save_to_file(&raw_dump, &image, ImageFileType::PgmBin, 100, "out.raw")?;
//! # Ok(())
//! # }
//! ```

// Unsafe code is confined to the SIMD kernels and the dispatcher that calls them.
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Compile-time comparison operators.
pub mod compare;

/// SIMD kernels and tier dispatch.
pub mod simd;

mod binarization;
mod error;
mod image_save;
mod types;

pub use binarization::{binarize, Binarization};
pub use error::{Error, Result};
pub use image_save::{
    image_save_to_file, image_save_to_memory, image_save_to_writer, ImageSaveToMemoryFn,
    ImageSaver, ImageView,
};
pub use simd::{Capabilities, SimdOps, Tier};
pub use types::{CompareType, ImageFileType, PixelFormat, Threshold};
