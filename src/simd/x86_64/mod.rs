//! x86_64-specific SIMD implementations.
//!
//! SSE2 is part of the x86_64 baseline, so its kernels are always callable.
//! The AVX2 kernels use `#[target_feature(enable = "avx2")]` and are only
//! reached after runtime detection (an `archmage` token) confirms support.
//! Runtime tier selection is handled by the parent `simd` module.

pub mod avx2;
pub mod sse2;
