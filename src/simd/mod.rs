//! SIMD-optimized kernels with runtime tier dispatch.
//!
//! This module selects between scalar and SIMD implementations based on
//! detected CPU capabilities. The design follows these principles:
//!
//! 1. **Scalar reference**: every operator has a scalar implementation used as
//!    fallback and as the correctness oracle for all vector tiers.
//!
//! 2. **Platform-specific tiers**: x86_64 (SSE2 128-bit, AVX2 256-bit) and
//!    aarch64 (NEON 128-bit) kernels live in separate submodules.
//!
//! 3. **Detect once**: CPU capabilities are resolved once per process and are
//!    read-only afterwards. Each call picks its tier once, outside the pixel
//!    loops.
//!
//! 4. **Widest tier wins**: tiers are tried widest first; a tier qualifies when
//!    it is enabled and the row width is at least its vector width. The scalar
//!    kernel has no width floor, so dispatch is total.
//!
//! # Architecture
//!
//! ```text
//! simd/
//! ├── mod.rs         # This file - tiers, capabilities, dispatch
//! ├── scalar.rs      # Reference implementation
//! ├── x86_64/
//! │   ├── mod.rs
//! │   ├── sse2.rs    # 16-byte kernels
//! │   └── avx2.rs    # 32-byte kernels
//! └── aarch64/
//!     ├── mod.rs
//!     └── neon.rs    # 16-byte kernels
//! ```

pub mod scalar;

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

#[cfg(target_arch = "aarch64")]
pub mod aarch64;

use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::types::{CompareType, Threshold};

// =============================================================================
// Tiers
// =============================================================================

/// Hardware capability level a kernel is written for.
///
/// Ordered by vector width. `Sse2` and `Neon` are both 128-bit and never
/// coexist on one machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Tier {
    /// Portable scalar code, always available
    Scalar = 0,
    /// ARM NEON, 16 bytes per vector
    Neon = 1,
    /// x86 SSE2, 16 bytes per vector
    Sse2 = 2,
    /// x86 AVX2, 32 bytes per vector
    Avx2 = 3,
}

impl Tier {
    /// Tiers in the order the dispatcher tries them (widest first).
    pub const DISPATCH_ORDER: [Tier; 4] = [Tier::Avx2, Tier::Sse2, Tier::Neon, Tier::Scalar];

    /// Bytes processed per vector, which is also the minimum row width the
    /// tier accepts.
    pub const fn width(self) -> usize {
        match self {
            Tier::Scalar => 1,
            Tier::Neon | Tier::Sse2 => 16,
            Tier::Avx2 => 32,
        }
    }

    /// Boundary the aligned fast path requires of pointers and strides.
    pub const fn alignment(self) -> usize {
        self.width()
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Tier::Scalar => "Scalar",
            Tier::Neon => "NEON",
            Tier::Sse2 => "SSE2",
            Tier::Avx2 => "AVX2",
        }
    }

    /// Whether this tier is usable on the running CPU.
    pub fn is_enabled(self) -> bool {
        Capabilities::get().supports(self)
    }
}

// =============================================================================
// CPU Capabilities
// =============================================================================

/// Cached capability flags, initialized on first use.
static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

/// Per-tier "usable on this machine" flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// SSE2 instructions are available
    pub sse2: bool,
    /// AVX2 instructions are available (x86-64-v3 level)
    pub avx2: bool,
    /// NEON instructions are available
    pub neon: bool,
}

impl Capabilities {
    /// Process-wide capabilities, detected once.
    pub fn get() -> Capabilities {
        *CAPABILITIES.get_or_init(|| {
            let caps = Self::detect();
            log::debug!(
                "SIMD capabilities: sse2={} avx2={} neon={} (best tier: {})",
                caps.sse2,
                caps.avx2,
                caps.neon,
                caps.best_tier().name()
            );
            caps
        })
    }

    /// Probe the running CPU. Prefer [`Capabilities::get`], which caches.
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Self {
        Self {
            sse2: is_x86_feature_detected!("sse2"),
            avx2: x86_64::avx2::token().is_some(),
            neon: false,
        }
    }

    /// Probe the running CPU. Prefer [`Capabilities::get`], which caches.
    #[cfg(target_arch = "aarch64")]
    pub fn detect() -> Self {
        Self {
            sse2: false,
            avx2: false,
            neon: std::arch::is_aarch64_feature_detected!("neon"),
        }
    }

    /// Probe the running CPU. Prefer [`Capabilities::get`], which caches.
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    pub fn detect() -> Self {
        Self::none()
    }

    /// No vector unit at all.
    pub const fn none() -> Self {
        Self {
            sse2: false,
            avx2: false,
            neon: false,
        }
    }

    /// Whether `tier` is usable with these capabilities.
    pub const fn supports(self, tier: Tier) -> bool {
        match tier {
            Tier::Scalar => true,
            Tier::Neon => self.neon,
            Tier::Sse2 => self.sse2,
            Tier::Avx2 => self.avx2,
        }
    }

    /// Widest supported tier.
    pub fn best_tier(self) -> Tier {
        Tier::DISPATCH_ORDER
            .into_iter()
            .find(|&tier| self.supports(tier))
            .unwrap_or(Tier::Scalar)
    }
}

// =============================================================================
// Plane validation
// =============================================================================

/// Minimum buffer length holding `height` rows of `width` bytes at `stride`.
///
/// The last row does not need padding. Returns `None` on overflow.
pub(crate) fn required_len(stride: usize, width: usize, height: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }
    (height - 1).checked_mul(stride)?.checked_add(width)
}

/// Check that a buffer of `len` bytes describes a valid plane.
pub(crate) fn check_plane(len: usize, stride: usize, width: usize, height: usize) -> Result<()> {
    if stride < width {
        return Err(Error::InvalidStride {
            stride,
            row_bytes: width,
        });
    }
    let expected = required_len(stride, width, height)
        .ok_or(Error::InvalidDimensions { width, height })?;
    if len < expected {
        return Err(Error::BufferSizeMismatch {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Panic unless the plane is valid. Buffer contract violations are caller bugs.
#[track_caller]
pub(crate) fn assert_plane(name: &str, len: usize, stride: usize, width: usize, height: usize) {
    if let Err(e) = check_plane(len, stride, width, height) {
        panic!("{} plane: {}", name, e);
    }
}

#[inline(always)]
pub(crate) fn aligned(value: usize, alignment: usize) -> bool {
    value % alignment == 0
}

/// Largest multiple of `alignment` not above `value`.
#[inline(always)]
pub(crate) fn align_lo(value: usize, alignment: usize) -> usize {
    value - value % alignment
}

// =============================================================================
// Dispatch
// =============================================================================

/// SIMD kernel dispatcher.
///
/// Holds the detected capabilities and an optional tier ceiling. Create once
/// and reuse; it is `Copy`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SimdOps {
    capabilities: Capabilities,
    max_tier: Tier,
}

impl SimdOps {
    /// Use the widest tier the current CPU supports.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            capabilities: Capabilities::get(),
            max_tier: Tier::Avx2,
        }
    }

    /// Always use the scalar kernel.
    #[must_use]
    pub fn scalar() -> Self {
        Self {
            capabilities: Capabilities::get(),
            max_tier: Tier::Scalar,
        }
    }

    /// Use at most SSE2. Returns `None` if SSE2 is not available.
    #[must_use]
    pub fn sse2() -> Option<Self> {
        Self::with_max_tier(Tier::Sse2).ok()
    }

    /// Use at most AVX2. Returns `None` if AVX2 is not available.
    #[must_use]
    pub fn avx2() -> Option<Self> {
        Self::with_max_tier(Tier::Avx2).ok()
    }

    /// Use at most NEON. Returns `None` if NEON is not available.
    #[must_use]
    pub fn neon() -> Option<Self> {
        Self::with_max_tier(Tier::Neon).ok()
    }

    /// Cap dispatch at `tier`, which must be usable on this CPU.
    pub fn with_max_tier(tier: Tier) -> Result<Self> {
        let capabilities = Capabilities::get();
        if !capabilities.supports(tier) {
            return Err(Error::TierUnavailable(tier));
        }
        Ok(Self {
            capabilities,
            max_tier: tier,
        })
    }

    /// The tier ceiling.
    pub fn max_tier(&self) -> Tier {
        self.max_tier
    }

    /// Tier that a call with rows of `width` pixels runs on.
    pub fn select(&self, width: usize) -> Tier {
        Tier::DISPATCH_ORDER
            .into_iter()
            .find(|&tier| {
                tier <= self.max_tier
                    && self.capabilities.supports(tier)
                    && width >= tier.width()
            })
            .unwrap_or(Tier::Scalar)
    }

    /// Binarize a plane on the widest qualifying tier.
    ///
    /// Output is byte-identical whichever tier runs.
    ///
    /// # Panics
    ///
    /// Panics if a stride is smaller than `width` or a buffer is shorter than
    /// `(height - 1) * stride + width`.
    #[allow(clippy::too_many_arguments)]
    pub fn binarize(
        &self,
        src: &[u8],
        src_stride: usize,
        width: usize,
        height: usize,
        threshold: Threshold,
        dst: &mut [u8],
        dst_stride: usize,
        compare: CompareType,
    ) {
        assert_plane("source", src.len(), src_stride, width, height);
        assert_plane("destination", dst.len(), dst_stride, width, height);
        self.binarize_validated(
            src, src_stride, width, height, threshold, dst, dst_stride, compare,
        );
    }

    /// Dispatch on planes that already passed [`check_plane`].
    #[allow(unsafe_code)]
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn binarize_validated(
        &self,
        src: &[u8],
        src_stride: usize,
        width: usize,
        height: usize,
        threshold: Threshold,
        dst: &mut [u8],
        dst_stride: usize,
        compare: CompareType,
    ) {
        debug_assert!(check_plane(src.len(), src_stride, width, height).is_ok());
        debug_assert!(check_plane(dst.len(), dst_stride, width, height).is_ok());
        if width == 0 || height == 0 {
            return;
        }

        let tier = self.select(width);
        log::trace!("binarize {}x{} {:?} on {}", width, height, compare, tier.name());

        // SAFETY: callers validate both planes, and `select` only returns
        // enabled tiers whose width floor `width` meets.
        unsafe {
            run_tier(
                tier,
                src,
                src_stride,
                width,
                height,
                threshold,
                dst,
                dst_stride,
                compare,
            )
        }
    }
}

/// Run one tier's kernel.
///
/// # Safety
///
/// Both planes must be valid for `width`/`height`, `tier` must be enabled and
/// `width >= tier.width()`.
#[allow(unsafe_code)]
#[allow(clippy::too_many_arguments)]
unsafe fn run_tier(
    tier: Tier,
    src: &[u8],
    src_stride: usize,
    width: usize,
    height: usize,
    threshold: Threshold,
    dst: &mut [u8],
    dst_stride: usize,
    compare: CompareType,
) {
    match tier {
        #[cfg(target_arch = "x86_64")]
        Tier::Avx2 => x86_64::avx2::binarize_unchecked(
            src.as_ptr(),
            src_stride,
            width,
            height,
            threshold,
            dst.as_mut_ptr(),
            dst_stride,
            compare,
        ),
        #[cfg(target_arch = "x86_64")]
        Tier::Sse2 => x86_64::sse2::binarize_unchecked(
            src.as_ptr(),
            src_stride,
            width,
            height,
            threshold,
            dst.as_mut_ptr(),
            dst_stride,
            compare,
        ),
        #[cfg(target_arch = "aarch64")]
        Tier::Neon => aarch64::neon::binarize_unchecked(
            src.as_ptr(),
            src_stride,
            width,
            height,
            threshold,
            dst.as_mut_ptr(),
            dst_stride,
            compare,
        ),
        _ => scalar::binarize(
            src, src_stride, width, height, threshold, dst, dst_stride, compare,
        ),
    }
}

impl Default for SimdOps {
    fn default() -> Self {
        Self::detect()
    }
}

impl std::fmt::Debug for SimdOps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimdOps")
            .field("max_tier", &self.max_tier.name())
            .field("best_available", &self.capabilities.best_tier().name())
            .finish()
    }
}

/// Buffers with controlled alignment for kernel tests.
#[cfg(test)]
pub(crate) mod test_util {
    /// A byte buffer whose view starts exactly `offset` bytes past a
    /// 64-byte boundary.
    pub struct OffsetBuf {
        storage: Vec<u8>,
        start: usize,
        len: usize,
    }

    impl OffsetBuf {
        pub fn new(len: usize, offset: usize, fill: u8) -> Self {
            let storage = vec![fill; len + offset + 64];
            let start = storage.as_ptr().align_offset(64) + offset;
            Self {
                storage,
                start,
                len,
            }
        }

        pub fn as_slice(&self) -> &[u8] {
            &self.storage[self.start..self.start + self.len]
        }

        pub fn as_mut_slice(&mut self) -> &mut [u8] {
            &mut self.storage[self.start..self.start + self.len]
        }
    }

    /// Deterministic pseudo-random pixels, salted so values near the
    /// threshold occur often.
    pub fn pattern(len: usize, seed: usize) -> Vec<u8> {
        (0..len)
            .map(|i| match (i * 7 + seed) % 5 {
                0 => 100,
                1 => 99,
                2 => 101,
                _ => ((i * 131 + seed * 17 + (i >> 3) * 29) % 256) as u8,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_always_supported() {
        assert!(Capabilities::none().supports(Tier::Scalar));
        assert_eq!(Capabilities::none().best_tier(), Tier::Scalar);
        assert!(Tier::Scalar.is_enabled());
    }

    #[test]
    fn test_best_tier_prefers_widest() {
        let caps = Capabilities {
            sse2: true,
            avx2: true,
            neon: false,
        };
        assert_eq!(caps.best_tier(), Tier::Avx2);

        let caps = Capabilities {
            sse2: true,
            avx2: false,
            neon: false,
        };
        assert_eq!(caps.best_tier(), Tier::Sse2);
    }

    #[test]
    fn test_select_respects_width_floor() {
        let ops = SimdOps {
            capabilities: Capabilities {
                sse2: true,
                avx2: true,
                neon: false,
            },
            max_tier: Tier::Avx2,
        };
        assert_eq!(ops.select(0), Tier::Scalar);
        assert_eq!(ops.select(15), Tier::Scalar);
        assert_eq!(ops.select(16), Tier::Sse2);
        assert_eq!(ops.select(31), Tier::Sse2);
        assert_eq!(ops.select(32), Tier::Avx2);
        assert_eq!(ops.select(4096), Tier::Avx2);
    }

    #[test]
    fn test_select_respects_ceiling() {
        let ops = SimdOps {
            capabilities: Capabilities {
                sse2: true,
                avx2: true,
                neon: false,
            },
            max_tier: Tier::Sse2,
        };
        assert_eq!(ops.select(64), Tier::Sse2);

        let ops = SimdOps {
            max_tier: Tier::Scalar,
            ..ops
        };
        assert_eq!(ops.select(64), Tier::Scalar);
    }

    #[test]
    fn test_select_skips_disabled_tiers() {
        let ops = SimdOps {
            capabilities: Capabilities::none(),
            max_tier: Tier::Avx2,
        };
        assert_eq!(ops.select(1024), Tier::Scalar);
    }

    #[test]
    fn test_capabilities_cached() {
        assert_eq!(Capabilities::get(), Capabilities::get());
        assert_eq!(Capabilities::get(), Capabilities::detect());
    }

    #[test]
    fn test_with_max_tier() {
        assert_eq!(SimdOps::with_max_tier(Tier::Scalar).unwrap().max_tier(), Tier::Scalar);
        for tier in Tier::DISPATCH_ORDER {
            let result = SimdOps::with_max_tier(tier);
            if tier.is_enabled() {
                assert_eq!(result.unwrap().max_tier(), tier);
            } else {
                assert_eq!(result, Err(Error::TierUnavailable(tier)));
            }
        }
    }

    #[test]
    fn test_required_len() {
        assert_eq!(required_len(8, 5, 3), Some(21));
        assert_eq!(required_len(8, 0, 3), Some(0));
        assert_eq!(required_len(8, 5, 0), Some(0));
        assert_eq!(required_len(usize::MAX, 5, 3), None);
    }

    #[test]
    fn test_check_plane() {
        assert!(check_plane(21, 8, 5, 3).is_ok());
        assert_eq!(
            check_plane(20, 8, 5, 3),
            Err(Error::BufferSizeMismatch {
                expected: 21,
                actual: 20
            })
        );
        assert_eq!(
            check_plane(100, 4, 5, 3),
            Err(Error::InvalidStride {
                stride: 4,
                row_bytes: 5
            })
        );
    }

    #[test]
    fn test_tier_alignment_matches_width() {
        for tier in Tier::DISPATCH_ORDER {
            assert_eq!(tier.alignment(), tier.width());
        }
        assert!(aligned(64, Tier::Avx2.alignment()));
        assert!(!aligned(48, Tier::Avx2.alignment()));
        assert!(aligned(48, Tier::Sse2.alignment()));
    }

    #[test]
    fn test_align_helpers() {
        assert_eq!(align_lo(19, 16), 16);
        assert_eq!(align_lo(32, 16), 32);
        assert_eq!(align_lo(15, 16), 0);
        assert!(aligned(64, 32));
        assert!(!aligned(48, 32));
    }

    #[test]
    fn test_detect_matches_scalar() {
        let ops = SimdOps::detect();
        let scalar = SimdOps::scalar();
        let (width, height, stride) = (67, 5, 80);
        let src = test_util::pattern(stride * height, 3);

        for compare in CompareType::ALL {
            let threshold = Threshold::new(100, 255, 0);
            let mut expected = vec![0u8; stride * height];
            let mut actual = vec![0u8; stride * height];
            scalar.binarize(&src, stride, width, height, threshold, &mut expected, stride, compare);
            ops.binarize(&src, stride, width, height, threshold, &mut actual, stride, compare);
            assert_eq!(expected, actual, "{:?} on {:?}", compare, ops);
        }
    }

    #[test]
    #[should_panic(expected = "destination plane")]
    fn test_short_destination_panics() {
        let src = [0u8; 64];
        let mut dst = [0u8; 63];
        SimdOps::detect().binarize(
            &src,
            32,
            32,
            2,
            Threshold::default(),
            &mut dst,
            32,
            CompareType::GreaterThan,
        );
    }

    #[test]
    fn test_debug_shows_tiers() {
        let s = format!("{:?}", SimdOps::scalar());
        assert!(s.contains("Scalar"));
    }
}
