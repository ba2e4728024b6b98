//! aarch64-specific SIMD implementations.
//!
//! NEON is mandatory on aarch64 targets, but the parent `simd` module still
//! checks the detected capability before routing rows here.

pub mod neon;
