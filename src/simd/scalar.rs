//! Scalar (non-SIMD) reference implementation.
//!
//! This kernel is:
//! - **Portable**: works on any platform and has no width floor
//! - **Testable**: every vector tier must produce bit-exact output against it
//!
//! It is compiled through `multiversion`, so the row loop may be
//! autovectorized on capable CPUs. That only changes speed, never output.

use multiversion::multiversion;

use crate::compare::{with_compare, CompareOp};
use crate::types::{CompareType, Threshold};

/// Binarize one row of `src` into `dst`.
#[inline(always)]
pub fn binarize_row<C: CompareOp>(src: &[u8], threshold: Threshold, dst: &mut [u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = threshold.select(C::compare(s, threshold.value));
    }
}

#[inline(always)]
fn binarize_plane<C: CompareOp>(
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    threshold: Threshold,
    dst: &mut [u8],
    dst_stride: usize,
) {
    for row in 0..height {
        let s = &src[row * src_stride..][..width];
        let d = &mut dst[row * dst_stride..][..width];
        binarize_row::<C>(s, threshold, d);
    }
}

/// Scalar binarization of a `width` x `height` plane.
///
/// `dst[col] = compare(src[col], value) ? positive : negative` for every
/// pixel, rows advancing by their own strides. Bytes between `width` and the
/// stride are left untouched.
///
/// # Panics
///
/// Panics if either buffer is shorter than `(height - 1) * stride + width`.
#[multiversion(targets(
    "x86_64+avx2",
    "x86_64+sse4.1",
    "x86+avx2",
    "x86+sse4.1",
    "aarch64+neon",
))]
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
    if width == 0 {
        return;
    }
    with_compare!(compare, C => binarize_plane::<C>(
        src, src_stride, width, height, threshold, dst, dst_stride
    ))
}
