//! Public binarization entry points.
//!
//! [`binarize`] is the dispatching entry point: it validates the buffers once,
//! picks the widest usable SIMD tier and runs it. [`Binarization`] is the
//! builder form, which reports invalid input as [`Error`] instead of
//! panicking and can cap the tier used.

use crate::error::{Error, Result};
use crate::simd::{check_plane, SimdOps, Tier};
use crate::types::{CompareType, Threshold};

/// Binarize a `width` x `height` plane of 8-bit pixels.
///
/// Every destination pixel becomes `threshold.positive` when
/// `compare(src, threshold.value)` holds and `threshold.negative` otherwise.
/// Bytes between `width` and the stride are not written. The result is the
/// same on every CPU.
///
/// # Panics
///
/// Panics if a stride is smaller than `width` or a buffer is shorter than
/// `(height - 1) * stride + width`.
///
/// # Example
///
/// ```
/// use simdpix_rs::{binarize, CompareType, Threshold};
///
/// let src = [10u8, 20, 30, 40];
/// let mut dst = [0u8; 4];
/// binarize(&src, 4, 4, 1, Threshold::new(20, 255, 0), &mut dst, 4, CompareType::GreaterThan);
/// assert_eq!(dst, [0, 0, 255, 255]);
/// ```
#[allow(clippy::too_many_arguments)]
pub fn binarize(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    threshold: Threshold,
    dst: &mut [u8],
    dst_stride: usize,
    compare: CompareType,
) {
    SimdOps::detect().binarize(
        src, src_stride, width, height, threshold, dst, dst_stride, compare,
    );
}

/// Binarization builder.
///
/// # Example
///
/// ```
/// use simdpix_rs::{Binarization, CompareType};
///
/// # fn main() -> Result<(), simdpix_rs::Error> {
/// let src = vec![7u8; 64 * 48];
/// let mut dst = vec![0u8; 64 * 48];
/// Binarization::new(CompareType::EqualTo)
///     .value(7)
///     .positive(1)
///     .negative(0)
///     .apply(&src, 64, 64, 48, &mut dst, 64)?;
/// assert!(dst.iter().all(|&p| p == 1));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Binarization {
    compare: CompareType,
    threshold: Threshold,
    simd: SimdOps,
}

impl Binarization {
    /// Create a binarization with the default threshold (128 -> 255/0).
    pub fn new(compare: CompareType) -> Self {
        Self {
            compare,
            threshold: Threshold::default(),
            simd: SimdOps::detect(),
        }
    }

    /// Set the value pixels are compared against.
    pub fn value(mut self, value: u8) -> Self {
        self.threshold.value = value;
        self
    }

    /// Set the output for pixels where the comparison holds.
    pub fn positive(mut self, positive: u8) -> Self {
        self.threshold.positive = positive;
        self
    }

    /// Set the output for pixels where the comparison does not hold.
    pub fn negative(mut self, negative: u8) -> Self {
        self.threshold.negative = negative;
        self
    }

    /// Set value and both outputs at once.
    pub fn threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    /// Cap the SIMD tier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TierUnavailable`] if `tier` is not usable on this CPU.
    pub fn max_tier(mut self, tier: Tier) -> Result<Self> {
        self.simd = SimdOps::with_max_tier(tier)?;
        Ok(self)
    }

    /// Use an existing dispatcher.
    pub fn simd(mut self, simd: SimdOps) -> Self {
        self.simd = simd;
        self
    }

    /// The configured comparison.
    pub fn compare_type(&self) -> CompareType {
        self.compare
    }

    /// The configured threshold triple.
    pub fn threshold_triple(&self) -> Threshold {
        self.threshold
    }

    /// Tier that [`apply`](Self::apply) will run on for rows of `width` pixels.
    pub fn tier_for(&self, width: usize) -> Tier {
        self.simd.select(width)
    }

    /// Binarize `src` into `dst`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStride`] if a stride is smaller than `width`
    /// - [`Error::InvalidDimensions`] if the plane size overflows
    /// - [`Error::BufferSizeMismatch`] if a buffer is too short
    pub fn apply(
        &self,
        src: &[u8],
        src_stride: usize,
        width: usize,
        height: usize,
        dst: &mut [u8],
        dst_stride: usize,
    ) -> Result<()> {
        check_plane(src.len(), src_stride, width, height)?;
        check_plane(dst.len(), dst_stride, width, height)?;
        self.simd.binarize_validated(
            src,
            src_stride,
            width,
            height,
            self.threshold,
            dst,
            dst_stride,
            self.compare,
        );
        Ok(())
    }

    /// Binarize a tightly packed image into a new buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if `width * height` overflows, or
    /// [`Error::BufferSizeMismatch`] if `src` is not exactly `width * height`
    /// bytes.
    pub fn apply_to_vec(&self, src: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
        let expected = width
            .checked_mul(height)
            .ok_or(Error::InvalidDimensions { width, height })?;
        if src.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: src.len(),
            });
        }
        let mut dst = vec![0u8; expected];
        self.apply(src, width, width, height, &mut dst, width)?;
        Ok(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_threshold() {
        let b = Binarization::new(CompareType::LessThan)
            .value(3)
            .positive(4)
            .negative(5);
        assert_eq!(b.compare_type(), CompareType::LessThan);
        assert_eq!(b.threshold_triple(), Threshold::new(3, 4, 5));

        let b = b.threshold(Threshold::new(9, 8, 7));
        assert_eq!(b.threshold_triple(), Threshold::new(9, 8, 7));
    }

    #[test]
    fn test_apply_reports_short_buffer() {
        let src = [0u8; 10];
        let mut dst = [0u8; 16];
        let err = Binarization::new(CompareType::EqualTo)
            .apply(&src, 4, 4, 4, &mut dst, 4)
            .unwrap_err();
        assert_eq!(
            err,
            Error::BufferSizeMismatch {
                expected: 16,
                actual: 10
            }
        );
    }

    #[test]
    fn test_apply_reports_bad_stride() {
        let src = [0u8; 16];
        let mut dst = [0u8; 16];
        let err = Binarization::new(CompareType::EqualTo)
            .apply(&src, 4, 4, 4, &mut dst, 3)
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidStride {
                stride: 3,
                row_bytes: 4
            }
        );
    }

    #[test]
    fn test_apply_to_vec() {
        let src: Vec<u8> = (0..=255u8).collect();
        let out = Binarization::new(CompareType::GreaterThan)
            .value(127)
            .apply_to_vec(&src, 64, 4)
            .unwrap();
        for (i, &p) in out.iter().enumerate() {
            assert_eq!(p, if i > 127 { 255 } else { 0 });
        }

        assert!(matches!(
            Binarization::new(CompareType::GreaterThan).apply_to_vec(&src, 64, 3),
            Err(Error::BufferSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_scalar_ceiling() {
        let b = Binarization::new(CompareType::EqualTo)
            .max_tier(Tier::Scalar)
            .unwrap();
        assert_eq!(b.tier_for(1024), Tier::Scalar);
    }

    #[test]
    fn test_simd_override() {
        let b = Binarization::new(CompareType::GreaterThan)
            .value(127)
            .simd(SimdOps::scalar());
        assert_eq!(b.tier_for(4096), Tier::Scalar);

        let src: Vec<u8> = (0..=255u8).collect();
        let scalar_out = b.apply_to_vec(&src, 256, 1).unwrap();
        let detected_out = b.simd(SimdOps::detect()).apply_to_vec(&src, 256, 1).unwrap();
        assert_eq!(scalar_out, detected_out);
    }

    #[test]
    fn test_apply_accepts_unpadded_last_row() {
        // Exactly (height - 1) * stride + width bytes
        let src = vec![200u8; 3 * 40 + 33];
        let mut dst = vec![0xEEu8; 3 * 40 + 33];
        Binarization::new(CompareType::GreaterThan)
            .apply(&src, 40, 33, 4, &mut dst, 40)
            .unwrap();
        for y in 0..4 {
            assert!(dst[y * 40..][..33].iter().all(|&p| p == 255), "row {}", y);
        }
        assert!(dst[33..40].iter().all(|&p| p == 0xEE));
    }

    #[test]
    fn test_apply_reports_error_instead_of_panicking() {
        let src = [0u8; 64];
        let mut dst = [0u8; 63];
        let err = Binarization::new(CompareType::GreaterThan)
            .apply(&src, 32, 32, 2, &mut dst, 32)
            .unwrap_err();
        assert_eq!(
            err,
            Error::BufferSizeMismatch {
                expected: 64,
                actual: 63
            }
        );
    }

    #[test]
    fn test_binarize_free_function() {
        let src = [10u8, 20, 30, 40];
        let mut dst = [0u8; 4];
        binarize(
            &src,
            4,
            4,
            1,
            Threshold::new(20, 255, 0),
            &mut dst,
            4,
            CompareType::LessThan,
        );
        assert_eq!(dst, [255, 0, 0, 0]);
    }
}
