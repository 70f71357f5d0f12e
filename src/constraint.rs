//! Per-particle positional correctors applied after spring relaxation.
//!
//! Every constraint is idempotent: applying it to a particle that already
//! satisfies it leaves the particle unchanged. The world never hands a locked
//! particle to a constraint.

use alloc::vec::Vec as AllocVec;

use crate::bounds::{Aabb, BoundingVolume, Sphere};
use crate::error::PhysicsError;
use crate::float::Float;
use crate::particle::Particle;
use crate::vec::{Vec, Vec2};

/// A pluggable single-particle constraint.
pub trait ParticleConstraint<V: Vec> {
    fn apply(&self, particle: &mut Particle<V>);
}

/// Which side of a shape particles are kept on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Containment {
    /// Keep particles inside (a container).
    #[default]
    Inside,
    /// Keep particles outside (an obstacle).
    Outside,
}

fn check_axis<V: Vec>(axis: usize) -> Result<(), PhysicsError> {
    if axis >= V::DIM {
        return Err(PhysicsError::invalid("axis", "exceeds vector dimension"));
    }
    Ok(())
}

/// Pins one or more axes to fixed values.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisLock<V: Vec> {
    pins: AllocVec<(usize, V::Scalar)>,
}

impl<V: Vec> AxisLock<V> {
    pub fn new(axis: usize, value: V::Scalar) -> Result<Self, PhysicsError> {
        AxisLock { pins: AllocVec::new() }.and(axis, value)
    }

    /// Pin another axis.
    pub fn and(mut self, axis: usize, value: V::Scalar) -> Result<Self, PhysicsError> {
        check_axis::<V>(axis)?;
        if !value.is_finite() {
            return Err(PhysicsError::invalid("axis value", "must be finite"));
        }
        self.pins.retain(|(a, _)| *a != axis);
        self.pins.push((axis, value));
        Ok(self)
    }
}

impl<V: Vec> ParticleConstraint<V> for AxisLock<V> {
    fn apply(&self, particle: &mut Particle<V>) {
        for &(axis, value) in &self.pins {
            particle.pos = particle.pos.with_component(axis, value);
        }
    }
}

/// Side of an [`AxisBound`] threshold a particle must stay on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoundSide {
    /// Component must be at least the threshold (a floor).
    AtLeast,
    /// Component must be at most the threshold (a ceiling).
    AtMost,
}

/// Keeps one component on one side of a threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisBound<V: Vec> {
    axis: usize,
    threshold: V::Scalar,
    side: BoundSide,
}

impl<V: Vec> AxisBound<V> {
    pub fn new(axis: usize, threshold: V::Scalar, side: BoundSide) -> Result<Self, PhysicsError> {
        check_axis::<V>(axis)?;
        if !threshold.is_finite() {
            return Err(PhysicsError::invalid("threshold", "must be finite"));
        }
        Ok(AxisBound { axis, threshold, side })
    }
}

impl<V: Vec> ParticleConstraint<V> for AxisBound<V> {
    fn apply(&self, particle: &mut Particle<V>) {
        let c = particle.pos.component(self.axis);
        let violated = match self.side {
            BoundSide::AtLeast => c < self.threshold,
            BoundSide::AtMost => c > self.threshold,
        };
        if violated {
            particle.pos = particle.pos.with_component(self.axis, self.threshold);
        }
    }
}

/// Axis-aligned box container or obstacle.
///
/// Restitution controls the bounce on the axis that was corrected:
/// 0 stops motion along it, 1 reflects it fully.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxConstraint<V: Vec> {
    pub bounds: Aabb<V>,
    pub containment: Containment,
    restitution: V::Scalar,
}

impl<V: Vec> BoxConstraint<V> {
    pub fn new(bounds: Aabb<V>, containment: Containment) -> Self {
        BoxConstraint { bounds, containment, restitution: V::Scalar::zero() }
    }

    pub fn with_restitution(mut self, restitution: V::Scalar) -> Result<Self, PhysicsError> {
        if restitution < V::Scalar::zero() || restitution > V::Scalar::one() {
            return Err(PhysicsError::invalid("restitution", "must be in [0, 1]"));
        }
        self.restitution = restitution;
        Ok(self)
    }

    fn bounce(&self, p: &mut Particle<V>, axis: usize) {
        let vel = p.pos.component(axis) - p.prev_pos.component(axis);
        let prev = p.pos.component(axis) + vel * self.restitution;
        p.prev_pos = p.prev_pos.with_component(axis, prev);
    }

    fn keep_inside(&self, p: &mut Particle<V>) {
        for axis in 0..V::DIM {
            let c = p.pos.component(axis);
            let lo = self.bounds.min.component(axis);
            let hi = self.bounds.max.component(axis);
            if c < lo {
                p.pos = p.pos.with_component(axis, lo);
                self.bounce(p, axis);
            } else if c > hi {
                p.pos = p.pos.with_component(axis, hi);
                self.bounce(p, axis);
            }
        }
    }

    /// Face `(axis, value)` the ray leaves the box through first.
    fn exit_face(&self, origin: V, direction: V) -> Option<(usize, V::Scalar)> {
        let mut best: Option<(V::Scalar, usize, V::Scalar)> = None;
        for axis in 0..V::DIM {
            let d = direction.component(axis);
            if d.is_near_zero(V::Scalar::from_f32(1e-12)) {
                continue;
            }
            let face = if d > V::Scalar::zero() {
                self.bounds.max.component(axis)
            } else {
                self.bounds.min.component(axis)
            };
            let t = (face - origin.component(axis)) / d;
            match best {
                Some((best_t, _, _)) if best_t <= t => {}
                _ => best = Some((t, axis, face)),
            }
        }
        best.map(|(_, axis, face)| (axis, face))
    }

    fn nearest_face(&self, p: V) -> (usize, V::Scalar) {
        let mut best = (V::Scalar::max_value(), 0, self.bounds.min.component(0));
        for axis in 0..V::DIM {
            let c = p.component(axis);
            let lo = self.bounds.min.component(axis);
            let hi = self.bounds.max.component(axis);
            if c - lo < best.0 {
                best = (c - lo, axis, lo);
            }
            if hi - c < best.0 {
                best = (hi - c, axis, hi);
            }
        }
        (best.1, best.2)
    }

    fn keep_outside(&self, p: &mut Particle<V>) {
        if !self.bounds.strictly_contains(p.pos) {
            return;
        }
        // Leave through the face the particle came in by.
        let back = p.prev_pos - p.pos;
        let (axis, face) = self
            .exit_face(p.pos, back)
            .unwrap_or_else(|| self.nearest_face(p.pos));
        p.pos = p.pos.with_component(axis, face);
        self.bounce(p, axis);
    }
}

impl<V: Vec> ParticleConstraint<V> for BoxConstraint<V> {
    fn apply(&self, particle: &mut Particle<V>) {
        match self.containment {
            Containment::Inside => self.keep_inside(particle),
            Containment::Outside => self.keep_outside(particle),
        }
    }
}

/// Sphere container or obstacle; violating particles are projected onto the surface.
#[derive(Clone, Debug, PartialEq)]
pub struct SphereConstraint<V: Vec> {
    pub sphere: Sphere<V>,
    pub containment: Containment,
}

impl<V: Vec> SphereConstraint<V> {
    pub fn new(sphere: Sphere<V>, containment: Containment) -> Self {
        SphereConstraint { sphere, containment }
    }
}

impl<V: Vec> ParticleConstraint<V> for SphereConstraint<V> {
    fn apply(&self, particle: &mut Particle<V>) {
        let r = self.sphere.radius();
        let tolerance = r * V::Scalar::from_f32(1e-6);
        let dist = particle.pos.distance(self.sphere.center);
        let violated = match self.containment {
            Containment::Inside => dist > r + tolerance,
            Containment::Outside => dist < r - tolerance,
        };
        if violated {
            let fallback = particle.prev_pos - self.sphere.center;
            particle.pos = self.sphere.project_to_surface(particle.pos, fallback);
        }
    }
}

/// 2D polygon container or obstacle.
#[derive(Clone, Debug, PartialEq)]
pub struct PolygonConstraint<F: Float> {
    vertices: AllocVec<Vec2<F>>,
    pub containment: Containment,
}

impl<F: Float> PolygonConstraint<F> {
    /// Vertices in order (either winding); at least three.
    pub fn new(vertices: AllocVec<Vec2<F>>, containment: Containment) -> Result<Self, PhysicsError> {
        if vertices.len() < 3 {
            return Err(PhysicsError::invalid("polygon", "needs at least 3 vertices"));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::invalid("polygon", "vertices must be finite"));
        }
        Ok(PolygonConstraint { vertices, containment })
    }

    pub fn vertices(&self) -> &[Vec2<F>] {
        &self.vertices
    }

    /// Even-odd ray casting.
    pub fn contains(&self, point: Vec2<F>) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.vertices[i];
            let pj = self.vertices[j];
            let dy = pj.y - pi.y;
            if !dy.is_near_zero(F::from_f32(1e-12))
                && ((pi.y > point.y) != (pj.y > point.y))
                && (point.x < (pj.x - pi.x) * (point.y - pi.y) / dy + pi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Closest point on the polygon outline.
    pub fn closest_boundary_point(&self, point: Vec2<F>) -> Vec2<F> {
        let n = self.vertices.len();
        let mut best = self.vertices[0];
        let mut best_dist = F::max_value();
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            let edge = b - a;
            let len_sq = edge.length_sq();
            let t = if len_sq.is_near_zero(F::from_f32(1e-20)) {
                F::zero()
            } else {
                ((point - a).dot(edge) / len_sq).clamp(F::zero(), F::one())
            };
            let candidate = a + edge.scale(t);
            let d = candidate.distance_sq(point);
            if d < best_dist {
                best_dist = d;
                best = candidate;
            }
        }
        best
    }
}

impl<F: Float> ParticleConstraint<Vec2<F>> for PolygonConstraint<F> {
    fn apply(&self, particle: &mut Particle<Vec2<F>>) {
        let inside = self.contains(particle.pos);
        let violated = match self.containment {
            Containment::Inside => !inside,
            Containment::Outside => inside,
        };
        if violated {
            particle.pos = self.closest_boundary_point(particle.pos);
        }
    }
}

/// Snaps the direction from a root point to the nearest multiple of `theta`,
/// keeping the distance.
#[derive(Clone, Debug, PartialEq)]
pub struct AngularConstraint<F: Float> {
    pub root: Vec2<F>,
    theta: F,
}

impl<F: Float> AngularConstraint<F> {
    /// `theta` in radians, positive.
    pub fn new(root: Vec2<F>, theta: F) -> Result<Self, PhysicsError> {
        if theta <= F::zero() || !theta.is_finite() {
            return Err(PhysicsError::invalid("theta", "must be positive and finite"));
        }
        Ok(AngularConstraint { root, theta })
    }

    pub fn theta(&self) -> F {
        self.theta
    }
}

impl<F: Float> ParticleConstraint<Vec2<F>> for AngularConstraint<F> {
    fn apply(&self, particle: &mut Particle<Vec2<F>>) {
        let delta = particle.pos - self.root;
        let len = delta.length();
        if len.is_near_zero(F::from_f32(1e-12)) {
            return;
        }
        let heading = (delta.heading() / self.theta).round() * self.theta;
        particle.pos = self.root + Vec2::from_angle(heading).scale(len);
    }
}

/// Clamps into any bounding volume. Used for world bounds.
pub(crate) fn confine<V: Vec, B: BoundingVolume<V> + ?Sized>(particle: &mut Particle<V>, volume: &B) {
    if !volume.contains_point(particle.pos) {
        particle.constrain_to(volume);
    }
}
