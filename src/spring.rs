//! Distance springs between two particles, relaxed iteratively.

use crate::arena::{Arena, ParticleHandle, kind};
use crate::error::PhysicsError;
use crate::float::Float;
use crate::particle::Particle;
use crate::vec::Vec;

/// Added to the measured length so coincident endpoints never divide by zero.
pub const SPRING_EPSILON: f32 = 1e-5;

/// When a spring applies its correction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SpringMode {
    /// Always pull toward the rest length.
    #[default]
    Standard,
    /// Only push endpoints apart while they are closer than the rest length.
    MinDistance,
    /// Only pull endpoints together while they are farther than the rest
    /// length (a slack rope segment).
    MaxDistance,
}

/// A distance constraint between two particles.
///
/// Endpoints are arena handles; the spring never owns its particles. Each
/// free end moves by the full correction, scaled by its share of the pair's
/// inverse weight (exactly `±correction` for equal weights), so heavier
/// particles move less. A strength of `0.5` closes the whole gap in one pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Spring<V: Vec> {
    a: ParticleHandle,
    b: ParticleHandle,
    rest_length: V::Scalar,
    strength: V::Scalar,
    max_correction: Option<V::Scalar>,
    pub lock_a: bool,
    pub lock_b: bool,
    pub mode: SpringMode,
}

impl<V: Vec> Spring<V> {
    pub fn new(
        a: ParticleHandle,
        b: ParticleHandle,
        rest_length: V::Scalar,
        strength: V::Scalar,
    ) -> Result<Self, PhysicsError> {
        if a == b {
            return Err(PhysicsError::invalid("spring", "endpoints must be distinct particles"));
        }
        let mut spring = Spring {
            a,
            b,
            rest_length: V::Scalar::zero(),
            strength: V::Scalar::zero(),
            max_correction: None,
            lock_a: false,
            lock_b: false,
            mode: SpringMode::Standard,
        };
        spring.set_rest_length(rest_length)?;
        spring.set_strength(strength)?;
        Ok(spring)
    }

    /// Cap the magnitude of a single correction.
    pub fn with_max_correction(mut self, max: V::Scalar) -> Result<Self, PhysicsError> {
        self.set_max_correction(Some(max))?;
        Ok(self)
    }

    pub fn with_mode(mut self, mode: SpringMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn a(&self) -> ParticleHandle {
        self.a
    }

    pub fn b(&self) -> ParticleHandle {
        self.b
    }

    pub fn rest_length(&self) -> V::Scalar {
        self.rest_length
    }

    pub fn strength(&self) -> V::Scalar {
        self.strength
    }

    pub fn max_correction(&self) -> Option<V::Scalar> {
        self.max_correction
    }

    pub fn set_rest_length(&mut self, rest_length: V::Scalar) -> Result<(), PhysicsError> {
        if rest_length < V::Scalar::zero() || !rest_length.is_finite() {
            return Err(PhysicsError::invalid("rest_length", "must be non-negative and finite"));
        }
        self.rest_length = rest_length;
        Ok(())
    }

    pub fn set_strength(&mut self, strength: V::Scalar) -> Result<(), PhysicsError> {
        if !strength.is_finite() {
            return Err(PhysicsError::invalid("strength", "must be finite"));
        }
        self.strength = strength;
        Ok(())
    }

    pub fn set_max_correction(&mut self, max: Option<V::Scalar>) -> Result<(), PhysicsError> {
        if let Some(m) = max {
            if m <= V::Scalar::zero() || !m.is_finite() {
                return Err(PhysicsError::invalid("max_correction", "must be positive and finite"));
            }
        }
        self.max_correction = max;
        Ok(())
    }

    /// Whether the spring references `handle` at either end.
    pub fn touches(&self, handle: ParticleHandle) -> bool {
        self.a == handle || self.b == handle
    }

    /// Run one relaxation pass on a pair of particles.
    pub fn relax(&self, a: &mut Particle<V>, b: &mut Particle<V>) {
        let a_fixed = self.lock_a || a.is_locked();
        let b_fixed = self.lock_b || b.is_locked();
        if a_fixed && b_fixed {
            return;
        }

        let delta = b.pos - a.pos;
        let dist = delta.length() + V::Scalar::from_f32(SPRING_EPSILON);
        match self.mode {
            SpringMode::Standard => {}
            SpringMode::MinDistance if dist >= self.rest_length => return,
            SpringMode::MaxDistance if dist <= self.rest_length => return,
            _ => {}
        }

        let factor = (dist - self.rest_length) / dist * self.strength;
        let mut correction = delta.scale(factor);
        if let Some(max) = self.max_correction {
            correction = correction.limit(max);
        }

        let inv_a = a.inv_weight();
        let inv_b = b.inv_weight();
        let share = inv_a + inv_b;
        if !a_fixed {
            a.pos = a.pos + correction.scale(V::Scalar::two() * inv_a / share);
        }
        if !b_fixed {
            b.pos = b.pos - correction.scale(V::Scalar::two() * inv_b / share);
        }
    }

    /// Relax against particles stored in an arena.
    pub(crate) fn relax_in(
        &self,
        particles: &mut Arena<Particle<V>, kind::Particle>,
    ) -> Result<(), PhysicsError> {
        let Some((a, b)) = particles.get2_mut(self.a, self.b) else {
            let missing = if particles.contains(self.a) { self.b } else { self.a };
            return Err(PhysicsError::dangling(missing));
        };
        self.relax(a, b);
        Ok(())
    }
}
