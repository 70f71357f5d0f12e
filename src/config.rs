//! Configuration types for the physics world.

use crate::behavior::check_time_step;
use crate::error::PhysicsError;
use crate::float::Float;
use crate::vec::Vec;

/// Solver parameters for a [`World`](crate::world::World).
///
/// # Builder Pattern
/// ```
/// use verlet_world::config::WorldConfig;
/// use verlet_world::vec::Vec2;
///
/// let config: WorldConfig<Vec2<f32>> = WorldConfig::new()
///     .with_iterations(8)
///     .with_gravity(Vec2::new(0.0, -9.81))
///     .with_friction(0.05)
///     .with_time_step(1.0 / 60.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig<V: Vec> {
    /// Spring relaxation passes per step. More passes = stiffer springs,
    /// linear cost. Default: 50.
    pub iterations: usize,
    /// Gravity acceleration. Default: zero (no gravity).
    pub gravity: V,
    /// Friction in [0, 1). Velocity is scaled by `1 - friction * dt²` each
    /// step. Default: 0.
    pub friction: V::Scalar,
    /// Time step per `step()` call. Default: 1.
    pub time_step: V::Scalar,
}

impl<V: Vec> WorldConfig<V> {
    /// Create a new config with default values.
    pub fn new() -> Self {
        WorldConfig {
            iterations: 50,
            gravity: V::zero(),
            friction: V::Scalar::zero(),
            time_step: V::Scalar::one(),
        }
    }

    /// Set the number of spring relaxation passes.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the gravity vector.
    pub fn with_gravity(mut self, gravity: V) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the friction coefficient.
    pub fn with_friction(mut self, friction: V::Scalar) -> Self {
        self.friction = friction;
        self
    }

    /// Set the time step.
    pub fn with_time_step(mut self, time_step: V::Scalar) -> Self {
        self.time_step = time_step;
        self
    }

    /// Damping factor applied to the implicit velocity during integration.
    pub fn damping(&self) -> V::Scalar {
        V::Scalar::one() - self.friction * self.time_step * self.time_step
    }

    /// Reject out-of-range parameters.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        check_time_step(self.time_step)?;
        check_iterations(self.iterations)?;
        check_friction(self.friction)?;
        if !self.gravity.is_finite() {
            return Err(PhysicsError::invalid("gravity", "must be finite"));
        }
        Ok(())
    }
}

impl<V: Vec> Default for WorldConfig<V> {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn check_iterations(iterations: usize) -> Result<(), PhysicsError> {
    if iterations == 0 {
        return Err(PhysicsError::invalid("iterations", "must be at least 1"));
    }
    Ok(())
}

pub(crate) fn check_friction<F: Float>(friction: F) -> Result<(), PhysicsError> {
    if friction < F::zero() || friction >= F::one() || !friction.is_finite() {
        return Err(PhysicsError::invalid("friction", "must be in [0, 1)"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec::Vec2;

    #[test]
    fn defaults_are_valid() {
        let config = WorldConfig::<Vec2<f32>>::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.iterations, 50);
        assert_eq!(config.damping(), 1.0);
    }

    #[test]
    fn rejects_each_bad_parameter() {
        let base = WorldConfig::<Vec2<f64>>::new();
        assert!(base.clone().with_time_step(0.0).validate().is_err());
        assert!(base.clone().with_time_step(-0.1).validate().is_err());
        assert!(base.clone().with_iterations(0).validate().is_err());
        assert!(base.clone().with_friction(1.0).validate().is_err());
        assert!(base.clone().with_friction(-0.1).validate().is_err());
        assert!(base.with_gravity(Vec2::new(f64::NAN, 0.0)).validate().is_err());
    }

    #[test]
    fn damping_uses_squared_time_step() {
        let config = WorldConfig::<Vec2<f64>>::new().with_friction(0.5).with_time_step(0.2);
        assert!((config.damping() - 0.98).abs() < 1e-12);
    }
}
