//! Core type definitions shared by the kernels and the image save layer.

// =============================================================================
// Comparison Modes
// =============================================================================

/// Per-pixel comparison applied between a source pixel and the threshold value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CompareType {
    /// `src > value`
    #[default]
    GreaterThan = 0,
    /// `src < value`
    LessThan = 1,
    /// `src == value`
    EqualTo = 2,
}

impl CompareType {
    /// All comparison modes.
    pub const ALL: [CompareType; 3] = [
        CompareType::GreaterThan,
        CompareType::LessThan,
        CompareType::EqualTo,
    ];

    /// Evaluate the comparison on two scalar bytes.
    #[inline]
    pub const fn evaluate(self, a: u8, b: u8) -> bool {
        match self {
            CompareType::GreaterThan => a > b,
            CompareType::LessThan => a < b,
            CompareType::EqualTo => a == b,
        }
    }
}

// =============================================================================
// Threshold
// =============================================================================

/// Threshold value and the two output levels of a binarization.
///
/// Each output pixel is `positive` when the comparison against `value`
/// holds, `negative` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Threshold {
    /// Value every source pixel is compared against
    pub value: u8,
    /// Output when the comparison holds
    pub positive: u8,
    /// Output when the comparison does not hold
    pub negative: u8,
}

impl Threshold {
    /// Create a threshold triple.
    pub const fn new(value: u8, positive: u8, negative: u8) -> Self {
        Self {
            value,
            positive,
            negative,
        }
    }

    /// Output level for one source pixel.
    #[inline]
    pub const fn select(self, holds: bool) -> u8 {
        if holds {
            self.positive
        } else {
            self.negative
        }
    }
}

impl Default for Threshold {
    /// Mid-gray threshold producing a 0/255 mask.
    fn default() -> Self {
        Self::new(128, 255, 0)
    }
}

// =============================================================================
// Pixel Formats
// =============================================================================

/// Pixel layout of an image handed to an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PixelFormat {
    /// Unknown/unspecified format
    #[default]
    None = 0,
    /// 8-bit gray
    Gray8 = 1,
    /// Interleaved U and V planes (2 bytes per pixel)
    Uv16 = 2,
    /// Blue, green, red
    Bgr24 = 3,
    /// Blue, green, red, alpha
    Bgra32 = 4,
    /// Red, green, blue
    Rgb24 = 5,
    /// Red, green, blue, alpha
    Rgba32 = 6,
}

impl PixelFormat {
    /// Bytes per pixel for this format (0 for [`PixelFormat::None`]).
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::None => 0,
            PixelFormat::Gray8 => 1,
            PixelFormat::Uv16 => 2,
            PixelFormat::Bgr24 | PixelFormat::Rgb24 => 3,
            PixelFormat::Bgra32 | PixelFormat::Rgba32 => 4,
        }
    }
}

// =============================================================================
// File Types
// =============================================================================

/// Target file format for image saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ImageFileType {
    /// Unknown/unspecified file type
    #[default]
    Undefined = 0,
    /// Portable graymap, ASCII
    PgmTxt = 1,
    /// Portable graymap, binary
    PgmBin = 2,
    /// Portable pixmap, ASCII
    PpmTxt = 3,
    /// Portable pixmap, binary
    PpmBin = 4,
    /// PNG
    Png = 5,
    /// JPEG
    Jpeg = 6,
}

impl ImageFileType {
    /// Conventional file extension, without the dot.
    pub const fn extension(self) -> Option<&'static str> {
        match self {
            ImageFileType::Undefined => None,
            ImageFileType::PgmTxt | ImageFileType::PgmBin => Some("pgm"),
            ImageFileType::PpmTxt | ImageFileType::PpmBin => Some("ppm"),
            ImageFileType::Png => Some("png"),
            ImageFileType::Jpeg => Some("jpg"),
        }
    }
}
