//! AVX2 kernels (32 bytes per vector).
//!
//! Same algorithm as the SSE2 tier at twice the width. The kernel entry point
//! carries `#[target_feature(enable = "avx2")]`; the safe wrapper requires an
//! `archmage` [`X64V3Token`] (x86-64-v3, which includes AVX2), which can only
//! be obtained when the CPU supports it.

#![allow(unsafe_code)]

use archmage::{SimdToken, X64V3Token};
use core::arch::x86_64::*;

use crate::compare::{with_compare, CompareOp};
use crate::simd::{align_lo, aligned, assert_plane, Tier};
use crate::types::{CompareType, Threshold};

/// Bytes per vector.
pub const A: usize = 32;

/// Boundary required by the aligned loads and stores.
const ALIGNMENT: usize = Tier::Avx2.alignment();

/// Proof of AVX2 support, if the running CPU has it.
pub fn token() -> Option<X64V3Token> {
    X64V3Token::try_new()
}

#[inline(always)]
unsafe fn compare<C: CompareOp>(a: __m256i, b: __m256i) -> __m256i {
    match C::TYPE {
        CompareType::GreaterThan => _mm256_andnot_si256(
            _mm256_cmpeq_epi8(_mm256_min_epu8(a, b), a),
            _mm256_set1_epi8(-1),
        ),
        CompareType::LessThan => _mm256_andnot_si256(
            _mm256_cmpeq_epi8(_mm256_max_epu8(a, b), a),
            _mm256_set1_epi8(-1),
        ),
        CompareType::EqualTo => _mm256_cmpeq_epi8(a, b),
    }
}

#[inline(always)]
unsafe fn combine(mask: __m256i, positive: __m256i, negative: __m256i) -> __m256i {
    _mm256_or_si256(
        _mm256_and_si256(mask, positive),
        _mm256_andnot_si256(mask, negative),
    )
}

#[inline(always)]
unsafe fn load<const ALIGN: bool>(ptr: *const u8) -> __m256i {
    if ALIGN {
        _mm256_load_si256(ptr as *const __m256i)
    } else {
        _mm256_loadu_si256(ptr as *const __m256i)
    }
}

#[inline(always)]
unsafe fn store<const ALIGN: bool>(ptr: *mut u8, v: __m256i) {
    if ALIGN {
        _mm256_store_si256(ptr as *mut __m256i, v)
    } else {
        _mm256_storeu_si256(ptr as *mut __m256i, v)
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
    let value = _mm256_set1_epi8(threshold.value as i8);
    let positive = _mm256_set1_epi8(threshold.positive as i8);
    let negative = _mm256_set1_epi8(threshold.negative as i8);

    for row in 0..height {
        let s = src.add(row * src_stride);
        let d = dst.add(row * dst_stride);

        let mut col = 0;
        while col < aligned_width {
            let mask = compare::<C>(load::<ALIGN>(s.add(col)), value);
            store::<ALIGN>(d.add(col), combine(mask, positive, negative));
            col += A;
        }

        // Overlapping tail block, always unaligned.
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

/// AVX2 binarization over raw plane pointers.
///
/// # Safety
///
/// - the CPU must support AVX2
/// - `width >= A`
/// - `src` must be readable and `dst` writable for
///   `(height - 1) * stride + width` bytes, with `stride >= width`
/// - the two planes must not overlap
#[target_feature(enable = "avx2")]
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

/// AVX2 binarization of a plane.
///
/// The token proves AVX2 is available.
///
/// # Panics
///
/// Panics if `width < A` or either plane is invalid.
#[allow(clippy::too_many_arguments)]
pub fn binarize(
    _token: X64V3Token,
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    threshold: Threshold,
    dst: &mut [u8],
    dst_stride: usize,
    compare: CompareType,
) {
    assert!(width >= A, "AVX2 kernel needs width >= {}, got {}", A, width);
    assert_plane("source", src.len(), src_stride, width, height);
    assert_plane("destination", dst.len(), dst_stride, width, height);
    // SAFETY: the token proves AVX2 support; planes validated above.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::scalar;
    use crate::simd::test_util::{pattern, OffsetBuf};

    fn check(token: X64V3Token, width: usize, height: usize, stride: usize, offset: usize) {
        let len = stride * height;
        let data = pattern(len, width * 3 + offset);
        let mut src = OffsetBuf::new(len, offset, 0);
        src.as_mut_slice().copy_from_slice(&data);

        for compare in CompareType::ALL {
            for value in [0u8, 99, 100, 255] {
                let threshold = Threshold::new(value, 255, 0);
                let mut expected = OffsetBuf::new(len, offset, 0x33);
                let mut actual = OffsetBuf::new(len, offset, 0x33);

                scalar::binarize(
                    src.as_slice(),
                    stride,
                    width,
                    height,
                    threshold,
                    expected.as_mut_slice(),
                    stride,
                    compare,
                );
                binarize(
                    token,
                    src.as_slice(),
                    stride,
                    width,
                    height,
                    threshold,
                    actual.as_mut_slice(),
                    stride,
                    compare,
                );

                assert_eq!(
                    expected.as_slice(),
                    actual.as_slice(),
                    "AVX2 mismatch: {}x{} stride {} offset {} {:?} value {}",
                    width,
                    height,
                    stride,
                    offset,
                    compare,
                    value
                );
            }
        }
    }

    #[test]
    fn test_avx2_matches_scalar_aligned() {
        let Some(token) = token() else {
            eprintln!("AVX2 not available, skipping test");
            return;
        };
        for width in [32, 64, 320] {
            check(token, width, 3, width, 0);
        }
        for width in [33, 47, 63, 65, 100] {
            check(token, width, 3, 128, 0);
        }
    }

    #[test]
    fn test_avx2_matches_scalar_unaligned() {
        let Some(token) = token() else {
            eprintln!("AVX2 not available, skipping test");
            return;
        };
        for width in 32..=100 {
            check(token, width, 2, width, 1);
            check(token, width, 2, width + 7, 3);
        }
    }

    #[test]
    fn test_avx2_tail_overlap() {
        let Some(token) = token() else {
            eprintln!("AVX2 not available, skipping test");
            return;
        };
        // 47 = one full vector + 15 columns covered by the overlapping tail
        let src: Vec<u8> = (0..47).map(|i| (i * 5) as u8).collect();
        let mut dst = [0u8; 47];
        binarize(
            token,
            &src,
            47,
            47,
            1,
            Threshold::new(100, 9, 3),
            &mut dst,
            47,
            CompareType::LessThan,
        );
        let expected: Vec<u8> = (0..47).map(|i| if i * 5 < 100 { 9 } else { 3 }).collect();
        assert_eq!(&dst[..], &expected[..]);
    }
}
