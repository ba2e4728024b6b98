//! Saving images through a pluggable encoder.
//!
//! Encoding is delegated to an [`ImageSaver`], which turns an [`ImageView`]
//! into an owned byte buffer (or declines with `None`). The generic writers
//! here persist that buffer. The buffer is owned by the writer for the
//! duration of the write and dropped exactly once on every exit path.
//!
//! No codec backend is bundled: [`image_save_to_memory`] always declines.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::simd::required_len;
use crate::types::{ImageFileType, PixelFormat};

/// Borrowed pixel data handed to an encoder.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [u8],
    stride: usize,
    width: usize,
    height: usize,
    format: PixelFormat,
}

impl<'a> ImageView<'a> {
    /// Describe `height` rows of `width` pixels in `format`, `stride` bytes apart.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] for zero or overflowing dimensions, or
    ///   [`PixelFormat::None`]
    /// - [`Error::InvalidStride`] if a row does not fit in `stride`
    /// - [`Error::BufferSizeMismatch`] if `data` is too short
    pub fn new(
        data: &'a [u8],
        stride: usize,
        width: usize,
        height: usize,
        format: PixelFormat,
    ) -> Result<Self> {
        let bpp = format.bytes_per_pixel();
        if width == 0 || height == 0 || bpp == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let row_bytes = width
            .checked_mul(bpp)
            .ok_or(Error::InvalidDimensions { width, height })?;
        if stride < row_bytes {
            return Err(Error::InvalidStride { stride, row_bytes });
        }
        let expected = required_len(stride, row_bytes, height)
            .ok_or(Error::InvalidDimensions { width, height })?;
        if data.len() < expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            stride,
            width,
            height,
            format,
        })
    }

    /// Raw pixel bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Row stride in bytes.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel format.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Pixel bytes of row `y`, without stride padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: usize) -> &'a [u8] {
        assert!(y < self.height, "row {} out of {}", y, self.height);
        let row_bytes = self.width * self.format.bytes_per_pixel();
        &self.data[y * self.stride..][..row_bytes]
    }
}

/// Function pointer form of an encoder.
///
/// Returns `None` when the encoder cannot produce the requested file type.
pub type ImageSaveToMemoryFn = fn(&ImageView<'_>, ImageFileType, i32) -> Option<Vec<u8>>;

/// An encoder turning pixels into an encoded in-memory file.
pub trait ImageSaver {
    /// Encoded output. Dropping it releases the encoder's allocation.
    type Buffer: AsRef<[u8]>;

    /// Encode `image` as `file` at `quality`, or return `None` if the encoder
    /// declines (e.g. unsupported format).
    fn save_to_memory(
        &self,
        image: &ImageView<'_>,
        file: ImageFileType,
        quality: i32,
    ) -> Option<Self::Buffer>;
}

impl<F> ImageSaver for F
where
    F: Fn(&ImageView<'_>, ImageFileType, i32) -> Option<Vec<u8>>,
{
    type Buffer = Vec<u8>;

    fn save_to_memory(
        &self,
        image: &ImageView<'_>,
        file: ImageFileType,
        quality: i32,
    ) -> Option<Vec<u8>> {
        self(image, file, quality)
    }
}

/// Built-in encoder.
///
/// No codec backend is bundled, so this always returns `None`. Plug a real
/// encoder in through [`ImageSaver`].
pub fn image_save_to_memory(
    image: &ImageView<'_>,
    file: ImageFileType,
    quality: i32,
) -> Option<Vec<u8>> {
    log::debug!(
        "no built-in encoder for {:?} ({}x{} {:?}, quality {})",
        file,
        image.width(),
        image.height(),
        image.format(),
        quality
    );
    None
}

/// Encode `image` with `saver` and write the result to `output`.
///
/// # Errors
///
/// - [`Error::EncodingFailed`] if the saver returns `None`; `output` is not
///   touched
/// - [`Error::IoError`] if the write fails or is short
pub fn image_save_to_writer<S, W>(
    saver: &S,
    image: &ImageView<'_>,
    file: ImageFileType,
    quality: i32,
    mut output: W,
) -> Result<()>
where
    S: ImageSaver + ?Sized,
    W: Write,
{
    let buffer = saver
        .save_to_memory(image, file, quality)
        .ok_or(Error::EncodingFailed(file))?;
    output.write_all(buffer.as_ref())?;
    output.flush()?;
    Ok(())
}

/// Encode `image` with `saver` and write the result to `path`.
///
/// The file is opened only after encoding succeeds. Nothing is retried, and a
/// partially written file is left in place.
///
/// # Errors
///
/// - [`Error::EncodingFailed`] if the saver returns `None`; `path` is not
///   created
/// - [`Error::IoError`] if `path` cannot be created or the write is short
pub fn image_save_to_file<S, P>(
    saver: &S,
    image: &ImageView<'_>,
    file: ImageFileType,
    quality: i32,
    path: P,
) -> Result<()>
where
    S: ImageSaver + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let Some(buffer) = saver.save_to_memory(image, file, quality) else {
        log::warn!("encoder produced no {:?} output for {}", file, path.display());
        return Err(Error::EncodingFailed(file));
    };

    let result = File::create(path).and_then(|mut f| f.write_all(buffer.as_ref()));
    if let Err(ref e) = result {
        log::warn!(
            "failed to write {} bytes to {}: {}",
            buffer.as_ref().len(),
            path.display(),
            e
        );
    }
    result.map_err(Error::from)
}
