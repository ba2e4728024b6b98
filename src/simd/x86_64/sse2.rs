//! SSE2 kernels (16 bytes per vector).
//!
//! SSE2 has no unsigned byte greater-than, so comparisons are derived from
//! `min`/`max`/`cmpeq` (see [`crate::compare`]). Rows narrower than a vector
//! are never routed here.

#![allow(unsafe_code)]

use core::arch::x86_64::*;

use crate::compare::{with_compare, CompareOp};
use crate::simd::{align_lo, aligned, assert_plane, Tier};
use crate::types::{CompareType, Threshold};

/// Bytes per vector.
pub const A: usize = 16;

/// Boundary required by the aligned loads and stores.
const ALIGNMENT: usize = Tier::Sse2.alignment();

#[inline(always)]
unsafe fn compare<C: CompareOp>(a: __m128i, b: __m128i) -> __m128i {
    match C::TYPE {
        CompareType::GreaterThan => {
            _mm_andnot_si128(_mm_cmpeq_epi8(_mm_min_epu8(a, b), a), _mm_set1_epi8(-1))
        }
        CompareType::LessThan => {
            _mm_andnot_si128(_mm_cmpeq_epi8(_mm_max_epu8(a, b), a), _mm_set1_epi8(-1))
        }
        CompareType::EqualTo => _mm_cmpeq_epi8(a, b),
    }
}

/// `(mask & positive) | (!mask & negative)`
#[inline(always)]
unsafe fn combine(mask: __m128i, positive: __m128i, negative: __m128i) -> __m128i {
    _mm_or_si128(_mm_and_si128(mask, positive), _mm_andnot_si128(mask, negative))
}

#[inline(always)]
unsafe fn load<const ALIGN: bool>(ptr: *const u8) -> __m128i {
    if ALIGN {
        _mm_load_si128(ptr as *const __m128i)
    } else {
        _mm_loadu_si128(ptr as *const __m128i)
    }
}

#[inline(always)]
unsafe fn store<const ALIGN: bool>(ptr: *mut u8, v: __m128i) {
    if ALIGN {
        _mm_store_si128(ptr as *mut __m128i, v)
    } else {
        _mm_storeu_si128(ptr as *mut __m128i, v)
    }
}

#[inline(always)]
#[allow(clippy::too_many_arguments)]
unsafe fn binarize_plane<C: CompareOp, const ALIGN: bool>(
    src: *const u8,
    src_stride: usize,
    width: usize,
    height: usize,
    threshold: Threshold,
    dst: *mut u8,
    dst_stride: usize,
) {
    debug_assert!(width >= A);
    if ALIGN {
        debug_assert!(
            aligned(src as usize, ALIGNMENT)
                && aligned(src_stride, ALIGNMENT)
                && aligned(dst as usize, ALIGNMENT)
                && aligned(dst_stride, ALIGNMENT)
        );
    }

    let aligned_width = align_lo(width, A);
    let value = _mm_set1_epi8(threshold.value as i8);
    let positive = _mm_set1_epi8(threshold.positive as i8);
    let negative = _mm_set1_epi8(threshold.negative as i8);

    for row in 0..height {
        let s = src.add(row * src_stride);
        let d = dst.add(row * dst_stride);

        let mut col = 0;
        while col < aligned_width {
            let mask = compare::<C>(load::<ALIGN>(s.add(col)), value);
            store::<ALIGN>(d.add(col), combine(mask, positive, negative));
            col += A;
        }

        // Remainder: one full vector ending at `width`, overlapping columns
        // already written. `width - A` is not aligned in general.
        if aligned_width != width {
            let mask = compare::<C>(load::<false>(s.add(width - A)), value);
            store::<false>(d.add(width - A), combine(mask, positive, negative));
        }
    }
}

#[inline(always)]
#[allow(clippy::too_many_arguments)]
unsafe fn binarize_mode<C: CompareOp>(
    src: *const u8,
    src_stride: usize,
    width: usize,
    height: usize,
    threshold: Threshold,
    dst: *mut u8,
    dst_stride: usize,
) {
    if aligned(src as usize, ALIGNMENT)
        && aligned(src_stride, ALIGNMENT)
        && aligned(dst as usize, ALIGNMENT)
        && aligned(dst_stride, ALIGNMENT)
    {
        binarize_plane::<C, true>(src, src_stride, width, height, threshold, dst, dst_stride)
    } else {
        binarize_plane::<C, false>(src, src_stride, width, height, threshold, dst, dst_stride)
    }
}

/// SSE2 binarization over raw plane pointers.
///
/// # Safety
///
/// - `width >= A`
/// - `src` must be readable and `dst` writable for
///   `(height - 1) * stride + width` bytes, with `stride >= width`
/// - the two planes must not overlap
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
    with_compare!(compare, C => binarize_mode::<C>(
        src, src_stride, width, height, threshold, dst, dst_stride
    ))
}

/// SSE2 binarization of a plane.
///
/// # Panics
///
/// Panics if `width < A` or either plane is invalid.
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
    assert!(width >= A, "SSE2 kernel needs width >= {}, got {}", A, width);
    assert_plane("source", src.len(), src_stride, width, height);
    assert_plane("destination", dst.len(), dst_stride, width, height);
    // SAFETY: SSE2 is baseline on x86_64; planes validated above, and `&`/`&mut`
    // cannot overlap.
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
