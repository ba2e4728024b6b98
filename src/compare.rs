//! Compile-time comparison operators.
//!
//! Each [`CompareType`] has a zero-sized marker type implementing [`CompareOp`].
//! Kernels are generic over the marker, so the comparison is resolved at
//! monomorphization and the runtime mode `match` happens once per call,
//! never inside a pixel loop.
//!
//! Vector tiers express the same operators with their lane primitives. x86
//! has no unsigned byte greater-than, so both x86 tiers use:
//!
//! ```text
//! a >  b  <=>  !(min(a, b) == a)
//! a <  b  <=>  !(max(a, b) == a)
//! a == b  <=>  cmpeq(a, b)
//! ```

use crate::types::CompareType;

/// A comparison mode known at compile time.
pub trait CompareOp: Copy + Default + Send + Sync + 'static {
    /// Runtime tag of this mode.
    const TYPE: CompareType;

    /// Compare one source byte against the threshold value.
    fn compare(a: u8, b: u8) -> bool;
}

/// `a > b`
#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterThan;

/// `a < b`
#[derive(Debug, Clone, Copy, Default)]
pub struct LessThan;

/// `a == b`
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualTo;

impl CompareOp for GreaterThan {
    const TYPE: CompareType = CompareType::GreaterThan;

    #[inline(always)]
    fn compare(a: u8, b: u8) -> bool {
        a > b
    }
}

impl CompareOp for LessThan {
    const TYPE: CompareType = CompareType::LessThan;

    #[inline(always)]
    fn compare(a: u8, b: u8) -> bool {
        a < b
    }
}

impl CompareOp for EqualTo {
    const TYPE: CompareType = CompareType::EqualTo;

    #[inline(always)]
    fn compare(a: u8, b: u8) -> bool {
        a == b
    }
}

/// Expand a runtime [`CompareType`] into a call generic over its marker type.
///
/// ```ignore
/// with_compare!(compare, C => kernel::<C>(src, dst))
/// ```
macro_rules! with_compare {
    ($compare:expr, $op:ident => $body:expr) => {
        match $compare {
            $crate::types::CompareType::GreaterThan => {
                type $op = $crate::compare::GreaterThan;
                $body
            }
            $crate::types::CompareType::LessThan => {
                type $op = $crate::compare::LessThan;
                $body
            }
            $crate::types::CompareType::EqualTo => {
                type $op = $crate::compare::EqualTo;
                $body
            }
        }
    };
}

pub(crate) use with_compare;

#[cfg(test)]
mod tests {
    use super::*;

    fn check<C: CompareOp>() {
        for a in 0..=255u8 {
            for b in [0u8, 1, 20, 127, 128, 254, 255] {
                assert_eq!(C::compare(a, b), C::TYPE.evaluate(a, b), "{:?} {} {}", C::TYPE, a, b);
            }
        }
    }

    #[test]
    fn test_markers_match_runtime_modes() {
        check::<GreaterThan>();
        check::<LessThan>();
        check::<EqualTo>();
    }

    #[test]
    fn test_with_compare_selects_marker() {
        for compare in CompareType::ALL {
            let tag = with_compare!(compare, C => C::TYPE);
            assert_eq!(tag, compare);
        }
    }
}
