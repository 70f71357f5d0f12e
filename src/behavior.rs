//! Per-step displacement generators: constant force, gravity, radial attraction.
//!
//! The world calls [`Behavior::configure`] once at the top of every step and
//! then [`Behavior::apply`] once per particle. Behaviors only queue
//! displacements; they never add or remove particles.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::PhysicsError;
use crate::float::Float;
use crate::particle::Particle;
use crate::vec::Vec;

/// A pluggable force generator.
pub trait Behavior<V: Vec> {
    /// Prepare time-step dependent scaling. Fails on a non-positive step.
    fn configure(&mut self, time_step: V::Scalar) -> Result<(), PhysicsError>;

    /// Queue this step's displacement on one particle.
    fn apply(&mut self, particle: &mut Particle<V>);

    /// `(center, radius)` outside of which the behavior has no effect. When
    /// the world has a spatial index, only particles found there are visited.
    fn neighborhood(&self) -> Option<(V, V::Scalar)> {
        None
    }
}

pub(crate) fn check_time_step<F: Float>(time_step: F) -> Result<(), PhysicsError> {
    if time_step <= F::zero() || !time_step.is_finite() {
        return Err(PhysicsError::invalid("time_step", "must be positive and finite"));
    }
    Ok(())
}

/// Applies the same displacement to every particle, scaled by the time step.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantForce<V: Vec> {
    force: V,
    scaled: V,
}

impl<V: Vec> ConstantForce<V> {
    pub fn new(force: V) -> Self {
        ConstantForce { force, scaled: V::zero() }
    }

    pub fn force(&self) -> V {
        self.force
    }

    /// Takes effect at the next `configure`.
    pub fn set_force(&mut self, force: V) {
        self.force = force;
    }
}

impl<V: Vec> Behavior<V> for ConstantForce<V> {
    fn configure(&mut self, time_step: V::Scalar) -> Result<(), PhysicsError> {
        check_time_step(time_step)?;
        self.scaled = self.force.scale(time_step);
        Ok(())
    }

    fn apply(&mut self, particle: &mut Particle<V>) {
        particle.add_displacement(self.scaled);
    }
}

/// Constant acceleration. Scaled by `dt²`, which is what a constant
/// acceleration contributes per step under implicit-velocity integration.
#[derive(Clone, Debug, PartialEq)]
pub struct Gravity<V: Vec> {
    acceleration: V,
    scaled: V,
}

impl<V: Vec> Gravity<V> {
    pub fn new(acceleration: V) -> Self {
        Gravity { acceleration, scaled: V::zero() }
    }

    pub fn acceleration(&self) -> V {
        self.acceleration
    }

    pub fn set_acceleration(&mut self, acceleration: V) {
        self.acceleration = acceleration;
    }
}

impl<V: Vec> Behavior<V> for Gravity<V> {
    fn configure(&mut self, time_step: V::Scalar) -> Result<(), PhysicsError> {
        check_time_step(time_step)?;
        self.scaled = self.acceleration.scale(time_step * time_step);
        Ok(())
    }

    fn apply(&mut self, particle: &mut Particle<V>) {
        particle.add_displacement(self.scaled);
    }
}

/// Pulls particles within `radius` toward an attractor point.
///
/// The pull falls off as `1 - d²/r²` and is zero at and beyond the radius.
/// A negative strength repels. Optional jitter adds a uniform random offset
/// in `[-jitter, jitter]` per axis, drawn from a seeded generator so runs
/// stay reproducible.
#[derive(Clone, Debug)]
pub struct RadialAttraction<V: Vec> {
    attractor: V,
    radius: V::Scalar,
    radius_sq: V::Scalar,
    strength: V::Scalar,
    scaled_strength: V::Scalar,
    jitter: V::Scalar,
    rng: SmallRng,
}

impl<V: Vec> RadialAttraction<V> {
    pub fn new(attractor: V, radius: V::Scalar, strength: V::Scalar) -> Result<Self, PhysicsError> {
        let mut behavior = RadialAttraction {
            attractor,
            radius: V::Scalar::one(),
            radius_sq: V::Scalar::one(),
            strength: V::Scalar::zero(),
            scaled_strength: V::Scalar::zero(),
            jitter: V::Scalar::zero(),
            rng: SmallRng::seed_from_u64(0),
        };
        behavior.set_radius(radius)?;
        behavior.set_strength(strength)?;
        Ok(behavior)
    }

    /// Enable jitter with a seed for the random source.
    pub fn with_jitter(mut self, jitter: V::Scalar, seed: u64) -> Result<Self, PhysicsError> {
        if jitter < V::Scalar::zero() || !jitter.is_finite() {
            return Err(PhysicsError::invalid("jitter", "must be non-negative and finite"));
        }
        self.jitter = jitter;
        self.rng = SmallRng::seed_from_u64(seed);
        Ok(self)
    }

    pub fn attractor(&self) -> V {
        self.attractor
    }

    pub fn set_attractor(&mut self, attractor: V) {
        self.attractor = attractor;
    }

    pub fn radius(&self) -> V::Scalar {
        self.radius
    }

    pub fn set_radius(&mut self, radius: V::Scalar) -> Result<(), PhysicsError> {
        if radius <= V::Scalar::zero() || !radius.is_finite() {
            return Err(PhysicsError::invalid("radius", "must be positive and finite"));
        }
        self.radius = radius;
        self.radius_sq = radius * radius;
        Ok(())
    }

    pub fn strength(&self) -> V::Scalar {
        self.strength
    }

    /// Takes effect at the next `configure`.
    pub fn set_strength(&mut self, strength: V::Scalar) -> Result<(), PhysicsError> {
        if !strength.is_finite() {
            return Err(PhysicsError::invalid("strength", "must be finite"));
        }
        self.strength = strength;
        Ok(())
    }

    pub fn jitter(&self) -> V::Scalar {
        self.jitter
    }

    fn jitter_offset(&mut self) -> V {
        let mut offset = V::zero();
        for axis in 0..V::DIM {
            let unit = V::Scalar::from_f64(self.rng.random::<f64>());
            let value = (unit * V::Scalar::two() - V::Scalar::one()) * self.jitter;
            offset = offset.with_component(axis, value);
        }
        offset
    }
}

impl<V: Vec> Behavior<V> for RadialAttraction<V> {
    fn configure(&mut self, time_step: V::Scalar) -> Result<(), PhysicsError> {
        check_time_step(time_step)?;
        self.scaled_strength = self.strength * time_step;
        Ok(())
    }

    fn apply(&mut self, particle: &mut Particle<V>) {
        let delta = self.attractor - particle.pos;
        let dist_sq = delta.length_sq();
        if dist_sq >= self.radius_sq {
            return;
        }
        let falloff = V::Scalar::one() - dist_sq / self.radius_sq;
        let mut pull = delta.normalize_to(falloff);
        if pull == V::zero() {
            // At the attractor there is no direction to pull in.
            return;
        }
        if self.jitter > V::Scalar::zero() {
            pull = pull + self.jitter_offset();
        }
        particle.add_displacement(pull.scale(self.scaled_strength));
    }

    fn neighborhood(&self) -> Option<(V, V::Scalar)> {
        Some((self.attractor, self.radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::Vec2;

    #[test]
    fn configure_rejects_bad_time_step() {
        let mut g = Gravity::new(Vec2::new(0.0f32, -9.8));
        assert!(g.configure(0.0).is_err());
        assert!(g.configure(-1.0).is_err());
        assert!(g.configure(f32::NAN).is_err());
        assert!(g.configure(0.5).is_ok());
    }

    #[test]
    fn gravity_scales_by_dt_squared() {
        let mut g = Gravity::new(Vec2::new(0.0f64, -10.0));
        g.configure(0.5).unwrap();
        let mut p = Particle::new(Vec2::zero());
        g.apply(&mut p);
        assert_eq!(p.pending_displacement(), Vec2::new(0.0, -2.5));
    }

    #[test]
    fn constant_force_scales_by_dt() {
        let mut f = ConstantForce::new(Vec2::new(4.0f64, 0.0));
        f.configure(0.5).unwrap();
        let mut p = Particle::new(Vec2::zero());
        f.apply(&mut p);
        assert_eq!(p.pending_displacement(), Vec2::new(2.0, 0.0));
    }

    #[test]
    fn attraction_requires_positive_radius() {
        assert!(RadialAttraction::new(Vec2::new(0.0f32, 0.0), 0.0, 1.0).is_err());
        assert!(RadialAttraction::new(Vec2::new(0.0f32, 0.0), -2.0, 1.0).is_err());
    }

    #[test]
    fn attraction_falls_off_with_squared_distance() {
        let mut a = RadialAttraction::new(Vec2::new(0.0f64, 0.0), 10.0, 1.0).unwrap();
        a.configure(1.0).unwrap();
        let mut p = Particle::new(Vec2::new(5.0, 0.0));
        a.apply(&mut p);
        // 1 - 25/100 toward the attractor.
        assert!((p.pending_displacement().x + 0.75).abs() < 1e-12);
    }

    #[test]
    fn attraction_ignores_particles_outside_radius() {
        let mut a = RadialAttraction::new(Vec2::new(0.0f64, 0.0), 2.0, 1.0).unwrap();
        a.configure(1.0).unwrap();
        let mut p = Particle::new(Vec2::new(2.0, 0.0));
        a.apply(&mut p);
        assert_eq!(p.pending_displacement(), Vec2::zero());
    }

    #[test]
    fn negative_strength_repels() {
        let mut a = RadialAttraction::new(Vec2::new(0.0f64, 0.0), 10.0, -1.0).unwrap();
        a.configure(1.0).unwrap();
        let mut p = Particle::new(Vec2::new(5.0, 0.0));
        a.apply(&mut p);
        assert!(p.pending_displacement().x > 0.0);
    }

    #[test]
    fn particle_at_attractor_gets_nothing() {
        let mut a = RadialAttraction::new(Vec2::new(1.0f32, 1.0), 5.0, 3.0)
            .unwrap()
            .with_jitter(0.5, 7)
            .unwrap();
        a.configure(1.0).unwrap();
        let mut p = Particle::new(Vec2::new(1.0, 1.0));
        a.apply(&mut p);
        assert_eq!(p.pending_displacement(), Vec2::zero());
        assert!(p.pending_displacement().is_finite());
    }

    #[test]
    fn jitter_is_bounded_and_seeded() {
        let make = || {
            let mut a = RadialAttraction::new(Vec2::new(0.0f64, 0.0), 10.0, 1.0)
                .unwrap()
                .with_jitter(0.1, 42)
                .unwrap();
            a.configure(1.0).unwrap();
            let mut p = Particle::new(Vec2::new(5.0, 0.0));
            a.apply(&mut p);
            p.pending_displacement()
        };
        let first = make();
        assert_eq!(first, make());
        assert!((first.x + 0.75).abs() <= 0.1 + 1e-12);
        assert!(first.y.abs() <= 0.1 + 1e-12);
    }
}
