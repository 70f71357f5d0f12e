//! Bounding volumes used for world confinement and shape constraints.

use crate::error::PhysicsError;
use crate::float::Float;
use crate::vec::Vec;

/// Capability set the world and shape constraints need from a volume.
pub trait BoundingVolume<V: Vec> {
    /// True if `p` is inside or on the surface.
    fn contains_point(&self, p: V) -> bool;

    /// Closest point to `p` that lies inside or on the surface.
    fn clamp(&self, p: V) -> V;

    /// First point where the ray `origin + t * direction` (t >= 0) meets the
    /// surface, or `None` if it misses. A ray starting inside reports its
    /// exit point.
    fn intersect_ray(&self, origin: V, direction: V) -> Option<V>;
}

/// Axis-aligned box in any dimension.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb<V: Vec> {
    pub min: V,
    pub max: V,
}

impl<V: Vec> Aabb<V> {
    /// Build from any two opposite corners; components are sorted per axis.
    pub fn new(a: V, b: V) -> Self {
        let mut min = a;
        let mut max = b;
        for axis in 0..V::DIM {
            let (lo, hi) = (a.component(axis), b.component(axis));
            min = min.with_component(axis, lo.min(hi));
            max = max.with_component(axis, lo.max(hi));
        }
        Aabb { min, max }
    }

    pub fn from_center(center: V, half_extent: V) -> Self {
        Self::new(center - half_extent, center + half_extent)
    }

    pub fn center(&self) -> V {
        (self.min + self.max).scale(V::Scalar::half())
    }

    /// True if `p` is inside and not on any face.
    pub fn strictly_contains(&self, p: V) -> bool {
        (0..V::DIM).all(|axis| {
            let c = p.component(axis);
            c > self.min.component(axis) && c < self.max.component(axis)
        })
    }

    /// Parametric range `[t_near, t_far]` where the ray overlaps the box.
    fn slab_range(&self, origin: V, direction: V) -> Option<(V::Scalar, V::Scalar)> {
        let zero = V::Scalar::zero();
        let mut t_near = -V::Scalar::max_value();
        let mut t_far = V::Scalar::max_value();
        for axis in 0..V::DIM {
            let o = origin.component(axis);
            let d = direction.component(axis);
            let (lo, hi) = (self.min.component(axis), self.max.component(axis));
            if d.is_near_zero(V::Scalar::from_f32(1e-12)) {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            t_near = t_near.max(t1.min(t2));
            t_far = t_far.min(t1.max(t2));
            if t_near > t_far {
                return None;
            }
        }
        if t_far < zero {
            return None;
        }
        Some((t_near, t_far))
    }
}

impl<V: Vec> BoundingVolume<V> for Aabb<V> {
    fn contains_point(&self, p: V) -> bool {
        (0..V::DIM).all(|axis| {
            let c = p.component(axis);
            c >= self.min.component(axis) && c <= self.max.component(axis)
        })
    }

    fn clamp(&self, p: V) -> V {
        let mut out = p;
        for axis in 0..V::DIM {
            let c = p.component(axis).clamp(self.min.component(axis), self.max.component(axis));
            out = out.with_component(axis, c);
        }
        out
    }

    fn intersect_ray(&self, origin: V, direction: V) -> Option<V> {
        let (t_near, t_far) = self.slab_range(origin, direction)?;
        let t = if t_near >= V::Scalar::zero() { t_near } else { t_far };
        Some(self.clamp(origin + direction.scale(t)))
    }
}

/// Sphere (circle in 2D, interval in 1D).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere<V: Vec> {
    pub center: V,
    radius: V::Scalar,
}

impl<V: Vec> Sphere<V> {
    pub fn new(center: V, radius: V::Scalar) -> Result<Self, PhysicsError> {
        if radius <= V::Scalar::zero() || !radius.is_finite() {
            return Err(PhysicsError::invalid("radius", "must be positive and finite"));
        }
        Ok(Sphere { center, radius })
    }

    pub fn radius(&self) -> V::Scalar {
        self.radius
    }

    /// Project `p` onto the surface. A point at the center is projected along
    /// `fallback`, or along +x if that is zero as well.
    pub fn project_to_surface(&self, p: V, fallback: V) -> V {
        let mut dir = p - self.center;
        if dir.length_sq().is_near_zero(V::Scalar::from_f32(1e-20)) {
            dir = fallback;
        }
        if dir.length_sq().is_near_zero(V::Scalar::from_f32(1e-20)) {
            dir = V::zero().with_component(0, V::Scalar::one());
        }
        self.center + dir.normalize_to(self.radius)
    }
}

impl<V: Vec> BoundingVolume<V> for Sphere<V> {
    fn contains_point(&self, p: V) -> bool {
        p.distance_sq(self.center) <= self.radius * self.radius
    }

    /// Rounding can leave the projected point a hair outside the surface, so
    /// the radius is pulled in by a few ulps until the result is contained.
    fn clamp(&self, p: V) -> V {
        if self.contains_point(p) {
            return p;
        }
        let offset = p - self.center;
        let surface = self.center + offset.normalize_to(self.radius);
        if !surface.is_finite() {
            return surface;
        }
        let mut shrink = V::Scalar::from_f32(f32::EPSILON);
        let mut q = surface;
        for _ in 0..8 {
            if self.contains_point(q) {
                return q;
            }
            q = self.center + offset.normalize_to(self.radius * (V::Scalar::one() - shrink));
            shrink = shrink * V::Scalar::two();
        }
        if self.contains_point(q) { q } else { self.center }
    }

    fn intersect_ray(&self, origin: V, direction: V) -> Option<V> {
        let zero = V::Scalar::zero();
        let a = direction.length_sq();
        if a.is_near_zero(V::Scalar::from_f32(1e-20)) {
            return None;
        }
        let oc = origin - self.center;
        let b = oc.dot(direction);
        let c = oc.length_sq() - self.radius * self.radius;
        let disc = b * b - a * c;
        if disc < zero {
            return None;
        }
        let root = disc.sqrt();
        let t_near = (-b - root) / a;
        let t_far = (-b + root) / a;
        let t = if t_near >= zero {
            t_near
        } else if t_far >= zero {
            t_far
        } else {
            return None;
        };
        Some(origin + direction.scale(t))
    }
}
