//! Floating-point abstraction trait for generic numeric operations.

use core::cmp::PartialOrd;
use core::ops::{Add, Div, Mul, Neg, Sub};

/// Trait abstracting floating-point operations needed by the physics engine.
///
/// Implemented for `f32` and `f64` on top of `libm`, so the crate builds
/// without `std`.
pub trait Float:
    Copy
    + Clone
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Default
    + core::fmt::Debug
    + core::fmt::Display
{
    /// The additive identity (0.0).
    fn zero() -> Self;
    /// The multiplicative identity (1.0).
    fn one() -> Self;
    /// Half (0.5).
    fn half() -> Self;
    /// Two (2.0).
    fn two() -> Self;
    /// Largest finite value.
    fn max_value() -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// Sine.
    fn sin(self) -> Self;
    /// Cosine.
    fn cos(self) -> Self;
    /// Absolute value.
    fn abs(self) -> Self;
    /// Minimum of two values.
    fn min(self, other: Self) -> Self;
    /// Maximum of two values.
    fn max(self, other: Self) -> Self;
    /// Convert from f32 (for constants and configuration).
    fn from_f32(v: f32) -> Self;
    /// Convert from f64 (for random samples).
    fn from_f64(v: f64) -> Self;
    /// Convert from a count.
    fn from_usize(v: usize) -> Self;
    /// Arctangent of y/x, with correct quadrant.
    fn atan2(y: Self, x: Self) -> Self;
    /// Floor.
    fn floor(self) -> Self;
    /// Round half away from zero.
    fn round(self) -> Self;
    /// True unless NaN or infinite.
    fn is_finite(self) -> bool;
    /// Truncating, saturating conversion to an integer.
    fn to_i64(self) -> i64;

    /// Clamp self to [min, max].
    fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    /// Check if approximately zero within epsilon.
    fn is_near_zero(self, epsilon: Self) -> bool {
        self.abs() < epsilon
    }
}

macro_rules! impl_float {
    ($t:ty, $sqrt:ident, $sin:ident, $cos:ident, $fabs:ident, $atan2:ident, $floor:ident, $round:ident) => {
        impl Float for $t {
            fn zero() -> Self { 0.0 }
            fn one() -> Self { 1.0 }
            fn half() -> Self { 0.5 }
            fn two() -> Self { 2.0 }
            fn max_value() -> Self { <$t>::MAX }
            fn sqrt(self) -> Self { libm::$sqrt(self) }
            fn sin(self) -> Self { libm::$sin(self) }
            fn cos(self) -> Self { libm::$cos(self) }
            fn abs(self) -> Self { libm::$fabs(self) }
            fn min(self, other: Self) -> Self { if self < other { self } else { other } }
            fn max(self, other: Self) -> Self { if self > other { self } else { other } }
            #[allow(clippy::cast_lossless)]
            fn from_f32(v: f32) -> Self { v as $t }
            #[allow(clippy::cast_possible_truncation)]
            fn from_f64(v: f64) -> Self { v as $t }
            #[allow(clippy::cast_precision_loss)]
            fn from_usize(v: usize) -> Self { v as $t }
            fn atan2(y: Self, x: Self) -> Self { libm::$atan2(y, x) }
            fn floor(self) -> Self { libm::$floor(self) }
            fn round(self) -> Self { libm::$round(self) }
            fn is_finite(self) -> bool { <$t>::is_finite(self) }
            #[allow(clippy::cast_possible_truncation)]
            fn to_i64(self) -> i64 { self as i64 }
        }
    };
}

impl_float!(f32, sqrtf, sinf, cosf, fabsf, atan2f, floorf, roundf);
impl_float!(f64, sqrt, sin, cos, fabs, atan2, floor, round);
