//! Verlet particles with position-based dynamics.

use crate::bounds::BoundingVolume;
use crate::error::PhysicsError;
use crate::float::Float;
use crate::vec::Vec;

/// A Verlet particle — position-based dynamics with implicit velocity.
///
/// Velocity is never stored; it is the difference between `pos` and
/// `prev_pos`. Behaviors push the particle through
/// [`add_displacement`](Self::add_displacement), which is folded into the
/// position on the next [`integrate`](Self::integrate).
#[derive(Clone, Debug, PartialEq)]
pub struct Particle<V: Vec> {
    pub pos: V,
    pub prev_pos: V,
    displacement: V,
    weight: V::Scalar,
    inv_weight: V::Scalar,
    locked: bool,
}

impl<V: Vec> Particle<V> {
    /// A free particle at rest with weight 1.
    pub fn new(pos: V) -> Self {
        Particle {
            pos,
            prev_pos: pos,
            displacement: V::zero(),
            weight: V::Scalar::one(),
            inv_weight: V::Scalar::one(),
            locked: false,
        }
    }

    /// A free particle at rest with the given weight.
    pub fn with_weight(pos: V, weight: V::Scalar) -> Result<Self, PhysicsError> {
        let mut p = Self::new(pos);
        p.set_weight(weight)?;
        Ok(p)
    }

    /// A particle that starts locked in place.
    pub fn locked(pos: V) -> Self {
        let mut p = Self::new(pos);
        p.locked = true;
        p
    }

    pub fn weight(&self) -> V::Scalar {
        self.weight
    }

    pub fn inv_weight(&self) -> V::Scalar {
        self.inv_weight
    }

    /// Weight must be positive and finite.
    pub fn set_weight(&mut self, weight: V::Scalar) -> Result<(), PhysicsError> {
        if weight <= V::Scalar::zero() || !weight.is_finite() {
            return Err(PhysicsError::invalid("weight", "must be positive and finite"));
        }
        self.weight = weight;
        self.inv_weight = V::Scalar::one() / weight;
        Ok(())
    }

    /// Queue a displacement for the next integration step. Scaled by weight
    /// when applied; ignored while locked.
    pub fn add_displacement(&mut self, delta: V) {
        if !self.locked {
            self.displacement = self.displacement + delta;
        }
    }

    /// Displacement queued since the last integration.
    pub fn pending_displacement(&self) -> V {
        self.displacement
    }

    pub fn integrate(&mut self, damping: V::Scalar) {
        if self.locked {
            self.prev_pos = self.pos;
            self.displacement = V::zero();
            return;
        }
        let snapshot = self.pos;
        let velocity = (self.pos - self.prev_pos).scale(damping);
        self.pos = self.pos + velocity + self.displacement.scale(self.weight);
        self.prev_pos = snapshot;
        self.displacement = V::zero();
    }

    /// Per-step velocity (`pos - prev_pos`).
    pub fn velocity(&self) -> V {
        self.pos - self.prev_pos
    }

    pub fn clear_velocity(&mut self) {
        self.prev_pos = self.pos;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
        self.prev_pos = self.pos;
        self.displacement = V::zero();
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        self.clear_velocity();
    }

    /// Teleport without injecting velocity. Works on locked particles, which
    /// is how anchors are dragged around.
    pub fn move_to(&mut self, pos: V) {
        self.pos = pos;
        self.prev_pos = pos;
    }

    /// Clamp the position into `volume`.
    pub fn constrain_to<B: BoundingVolume<V> + ?Sized>(&mut self, volume: &B) {
        self.pos = volume.clamp(self.pos);
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.prev_pos.is_finite()
    }
}
