//! NEON kernels (16 bytes per vector).
//!
//! NEON has native unsigned byte comparisons (`vcgtq_u8`, `vcltq_u8`,
//! `vceqq_u8`) and a bitwise select (`vbslq_u8`), so no min/max identities
//! are needed. Its loads and stores have no alignment requirement, so there
//! is a single path; the overlapping tail block is the same as on x86.

#![allow(unsafe_code)]

use core::arch::aarch64::*;

use crate::compare::{with_compare, CompareOp};
use crate::simd::{align_lo, assert_plane, Tier};
use crate::types::{CompareType, Threshold};

/// Bytes per vector.
pub const A: usize = 16;

#[inline(always)]
unsafe fn compare<C: CompareOp>(a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
    match C::TYPE {
        CompareType::GreaterThan => vcgtq_u8(a, b),
        CompareType::LessThan => vcltq_u8(a, b),
        CompareType::EqualTo => vceqq_u8(a, b),
    }
}

#[inline(always)]
#[allow(clippy::too_many_arguments)]
unsafe fn binarize_plane<C: CompareOp>(
    src: *const u8,
    src_stride: usize,
    width: usize,
    height: usize,
    threshold: Threshold,
    dst: *mut u8,
    dst_stride: usize,
) {
    debug_assert!(width >= A);

    let aligned_width = align_lo(width, A);
    let value = vdupq_n_u8(threshold.value);
    let positive = vdupq_n_u8(threshold.positive);
    let negative = vdupq_n_u8(threshold.negative);

    for row in 0..height {
        let s = src.add(row * src_stride);
        let d = dst.add(row * dst_stride);

        let mut col = 0;
        while col < aligned_width {
            let mask = compare::<C>(vld1q_u8(s.add(col)), value);
            vst1q_u8(d.add(col), vbslq_u8(mask, positive, negative));
            col += A;
        }

        if aligned_width != width {
            let mask = compare::<C>(vld1q_u8(s.add(width - A)), value);
            vst1q_u8(d.add(width - A), vbslq_u8(mask, positive, negative));
        }
    }
}

/// NEON binarization over raw plane pointers.
///
/// # Safety
///
/// - the CPU must support NEON
/// - `width >= A`
/// - `src` must be readable and `dst` writable for
///   `(height - 1) * stride + width` bytes, with `stride >= width`
/// - the two planes must not overlap
#[target_feature(enable = "neon")]
#[allow(clippy::too_many_arguments)]
pub unsafe fn binarize_unchecked(
    src: *const u8,
    src_stride: usize,
    width: usize,
    height: usize,
    threshold: Threshold,
    dst: *mut u8,
    dst_stride: usize,
    compare: CompareType,
) {
    with_compare!(compare, C => binarize_plane::<C>(
        src, src_stride, width, height, threshold, dst, dst_stride
    ))
}

/// NEON binarization of a plane.
///
/// # Panics
///
/// Panics if NEON is unavailable, `width < A`, or either plane is invalid.
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
    assert!(Tier::Neon.is_enabled(), "NEON is not available");
    assert!(width >= A, "NEON kernel needs width >= {}, got {}", A, width);
    assert_plane("source", src.len(), src_stride, width, height);
    assert_plane("destination", dst.len(), dst_stride, width, height);
    // SAFETY: NEON support checked; planes validated above.
    unsafe {
        binarize_unchecked(
            src.as_ptr(),
            src_stride,
            width,
            height,
            threshold,
            dst.as_mut_ptr(),
            dst_stride,
            compare,
        )
    }
}
