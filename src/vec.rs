//! Vector types and traits for physics calculations.

use crate::float::Float;
use core::ops::{Add, Neg, Sub};

/// Trait for vector types used in physics calculations.
///
/// Abstracts over dimensionality (1D, 2D, 3D) so the world, springs,
/// behaviors and most constraints are generic over the vector type.
/// Per-axis access (`component` / `with_component`) lets axis and box
/// constraints work in any dimension without per-type dispatch.
pub trait Vec:
    Copy
    + Clone
    + Add<Output = Self>
    + Sub<Output = Self>
    + Neg<Output = Self>
    + PartialEq
    + Default
    + core::fmt::Debug
{
    /// The scalar (float) type for this vector.
    type Scalar: Float;

    /// Number of components.
    const DIM: usize;

    /// Zero vector.
    fn zero() -> Self;

    /// Component `axis` (0 = x). Panics if `axis >= DIM`.
    fn component(self, axis: usize) -> Self::Scalar;

    /// Copy of `self` with component `axis` replaced. Panics if `axis >= DIM`.
    fn with_component(self, axis: usize, value: Self::Scalar) -> Self;

    /// Dot product.
    fn dot(self, other: Self) -> Self::Scalar;

    /// Scale all components by a scalar.
    fn scale(self, s: Self::Scalar) -> Self;

    /// Squared length (avoids sqrt).
    fn length_sq(self) -> Self::Scalar {
        self.dot(self)
    }

    /// Length (magnitude).
    fn length(self) -> Self::Scalar {
        self.length_sq().sqrt()
    }

    /// Normalize to unit length. Returns zero vector if length is near zero.
    fn normalize(self) -> Self {
        self.normalize_to(Self::Scalar::one())
    }

    /// Rescale to the given length. Returns zero vector if length is near zero.
    fn normalize_to(self, length: Self::Scalar) -> Self {
        let len = self.length();
        if len.is_near_zero(Self::Scalar::from_f32(1e-10)) {
            Self::zero()
        } else {
            self.scale(length / len)
        }
    }

    /// Clamp the length to at most `max_length`.
    fn limit(self, max_length: Self::Scalar) -> Self {
        if self.length_sq() > max_length * max_length {
            self.normalize_to(max_length)
        } else {
            self
        }
    }

    /// Distance between two points.
    fn distance(self, other: Self) -> Self::Scalar {
        (self - other).length()
    }

    /// Squared distance between two points.
    fn distance_sq(self, other: Self) -> Self::Scalar {
        (self - other).length_sq()
    }

    /// Linear interpolation between self and other.
    fn lerp(self, other: Self, t: Self::Scalar) -> Self {
        self + (other - self).scale(t)
    }

    /// True when every component is finite.
    fn is_finite(self) -> bool {
        (0..Self::DIM).all(|axis| self.component(axis).is_finite())
    }
}

/// Implements the operators and [`Vec`] for a struct whose fields are the
/// components, listed with their axis index.
macro_rules! impl_vec {
    ($name:ident, $dim:expr, $($field:tt => $axis:literal),+) => {
        impl<F: Float> Add for $name<F> {
            type Output = Self;
            fn add(self, rhs: Self) -> Self { $name { $($field: self.$field + rhs.$field),+ } }
        }

        impl<F: Float> Sub for $name<F> {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self { $name { $($field: self.$field - rhs.$field),+ } }
        }

        impl<F: Float> Neg for $name<F> {
            type Output = Self;
            fn neg(self) -> Self { $name { $($field: -self.$field),+ } }
        }

        impl<F: Float> Vec for $name<F> {
            type Scalar = F;
            const DIM: usize = $dim;

            fn zero() -> Self { $name { $($field: F::zero()),+ } }

            fn component(self, axis: usize) -> F {
                match axis {
                    $($axis => self.$field,)+
                    _ => panic!("axis {axis} out of range for {}D vector", $dim),
                }
            }

            fn with_component(mut self, axis: usize, value: F) -> Self {
                match axis {
                    $($axis => self.$field = value,)+
                    _ => panic!("axis {axis} out of range for {}D vector", $dim),
                }
                self
            }

            fn dot(self, other: Self) -> F { F::zero() $(+ self.$field * other.$field)+ }

            fn scale(self, s: F) -> Self { $name { $($field: self.$field * s),+ } }
        }
    };
}

/// A bead on a wire: one component, usable wherever a [`Vec`] is.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Scalar<F: Float>(pub F);

impl_vec!(Scalar, 1, 0 => 0);

/// Planar vector. Polygon and angular constraints are 2D only.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec2<F: Float> {
    pub x: F,
    pub y: F,
}

impl<F: Float> Vec2<F> {
    pub fn new(x: F, y: F) -> Self { Vec2 { x, y } }

    /// Unit vector at `theta` radians, counter-clockwise from +x.
    pub fn from_angle(theta: F) -> Self {
        Vec2 { x: theta.cos(), y: theta.sin() }
    }

    /// Angle in radians, in (-pi, pi].
    pub fn heading(self) -> F {
        F::atan2(self.y, self.x)
    }
}

impl_vec!(Vec2, 2, x => 0, y => 1);

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec3<F: Float> {
    pub x: F,
    pub y: F,
    pub z: F,
}

impl<F: Float> Vec3<F> {
    pub fn new(x: F, y: F, z: F) -> Self { Vec3 { x, y, z } }
}

impl_vec!(Vec3, 3, x => 0, y => 1, z => 2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec2_length() {
        let v = Vec2::new(3.0f32, 4.0);
        assert!((v.length() - 5.0).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn component_past_dim_panics() {
        let _ = Vec2::new(1.0f32, 2.0).component(2);
    }

    #[test]
    fn scalar_behaves_as_one_dimensional() {
        let a = Scalar(3.0f64);
        assert_eq!(Scalar::<f64>::DIM, 1);
        assert_eq!((a - Scalar(1.0)).length(), 2.0);
        assert_eq!((-a).dot(a), -9.0);
    }

    #[test]
    fn normalize_zero_vector() {
        let v = Vec2::<f32>::zero();
        assert_eq!(v.normalize(), Vec2::zero());
        assert_eq!(v.normalize_to(3.0), Vec2::zero());
    }

    #[test]
    fn normalize_to_length() {
        let v = Vec3::new(0.0f64, 3.0, 4.0).normalize_to(10.0);
        assert!((v.length() - 10.0).abs() < 1e-12);
        assert!((v.y - 6.0).abs() < 1e-12);
    }

    #[test]
    fn limit_only_shortens() {
        let long = Vec2::new(6.0f64, 8.0).limit(5.0);
        assert!((long.length() - 5.0).abs() < 1e-12);
        let short = Vec2::new(0.3f64, 0.4).limit(5.0);
        assert_eq!(short, Vec2::new(0.3, 0.4));
    }

    #[test]
    fn component_access_roundtrips_axes() {
        let v = Vec3::new(1.0f32, 2.0, 3.0).with_component(1, 9.0);
        assert_eq!(v.component(0), 1.0);
        assert_eq!(v.component(1), 9.0);
        assert_eq!(v.component(2), 3.0);
        assert_eq!(Scalar(4.0f32).with_component(0, 2.0), Scalar(2.0));
    }

    #[test]
    fn heading_of_unit_vectors() {
        let up = Vec2::new(0.0f64, 1.0);
        assert!((up.heading() - core::f64::consts::FRAC_PI_2).abs() < 1e-12);
        let v = Vec2::<f64>::from_angle(up.heading());
        assert!((v.x).abs() < 1e-12 && (v.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn non_finite_component_detected() {
        assert!(Vec2::new(1.0f32, 2.0).is_finite());
        assert!(!Vec2::new(f32::NAN, 2.0).is_finite());
        assert!(!Vec3::new(0.0f64, 0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn distance_calculation() {
        let a = Vec2::new(0.0f32, 0.0);
        let b = Vec2::new(3.0f32, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
    }
}
