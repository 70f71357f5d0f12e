//! Rope/string built from world particles joined by springs.

use alloc::vec::Vec as AllocVec;

use tracing::debug;

use crate::arena::{ParticleHandle, SpringHandle};
use crate::error::PhysicsError;
use crate::float::Float;
use crate::particle::Particle;
use crate::spring::Spring;
use crate::vec::Vec;
use crate::world::World;

/// Configuration for creating a string. Defaults to strength `0.5`, which
/// restores each segment fully in one pass, and weight `1`.
#[derive(Clone, Debug, PartialEq)]
pub struct StringConfig<F: Float> {
    pub strength: F,
    pub weight: F,
}

impl<F: Float> Default for StringConfig<F> {
    fn default() -> Self {
        StringConfig {
            strength: F::half(),
            weight: F::one(),
        }
    }
}

/// A chain of particles in a [`World`], each joined to the next by a spring.
///
/// The string only holds handles; the world owns the particles and springs.
#[derive(Clone, Debug)]
pub struct ParticleString {
    particles: AllocVec<ParticleHandle>,
    springs: AllocVec<SpringHandle>,
}

impl ParticleString {
    /// Lay `segments` springs along the straight line from `start` to `end`.
    pub fn new<V: Vec>(
        world: &mut World<V>,
        start: V,
        end: V,
        segments: usize,
        config: StringConfig<V::Scalar>,
    ) -> Result<Self, PhysicsError> {
        if segments == 0 {
            return Err(PhysicsError::invalid("segments", "must be at least 1"));
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(PhysicsError::invalid("string endpoints", "must be finite"));
        }
        let segment_length = start.distance(end) / V::Scalar::from_usize(segments);

        // The first with_weight fails before anything is inserted.
        let mut particles = AllocVec::with_capacity(segments + 1);
        for i in 0..=segments {
            let t = V::Scalar::from_usize(i) / V::Scalar::from_usize(segments);
            let particle = Particle::with_weight(start.lerp(end, t), config.weight)?;
            particles.push(world.add_particle(particle));
        }

        let mut springs = AllocVec::with_capacity(segments);
        for pair in particles.windows(2) {
            let spring = Spring::new(pair[0], pair[1], segment_length, config.strength);
            match spring.and_then(|s| world.add_spring(s)) {
                Ok(handle) => springs.push(handle),
                Err(err) => {
                    for &handle in &particles {
                        let _ = world.remove_particle_and_springs(handle);
                    }
                    return Err(err);
                }
            }
        }

        debug!(segments, "built particle string");
        Ok(ParticleString { particles, springs })
    }

    pub fn head(&self) -> ParticleHandle {
        self.particles[0]
    }

    pub fn tail(&self) -> ParticleHandle {
        self.particles[self.particles.len() - 1]
    }

    /// Lock the particle at `index`.
    pub fn pin<V: Vec>(&self, world: &mut World<V>, index: usize) -> Result<(), PhysicsError> {
        world.lock_particle(self.handle(index)?)
    }

    pub fn unpin<V: Vec>(&self, world: &mut World<V>, index: usize) -> Result<(), PhysicsError> {
        world.unlock_particle(self.handle(index)?)
    }

    /// Move a particle (normally a pinned one) without giving it velocity.
    pub fn move_pin<V: Vec>(&self, world: &mut World<V>, index: usize, pos: V) -> Result<(), PhysicsError> {
        world.move_particle(self.handle(index)?, pos)
    }

    /// Current positions from head to tail. Fails if a particle was removed.
    pub fn positions<V: Vec>(&self, world: &World<V>) -> Result<AllocVec<V>, PhysicsError> {
        self.particles
            .iter()
            .map(|&h| world.position(h).ok_or(PhysicsError::dangling(h)))
            .collect()
    }

    /// Sum of segment lengths in the current configuration.
    pub fn length<V: Vec>(&self, world: &World<V>) -> Result<V::Scalar, PhysicsError> {
        let positions = self.positions(world)?;
        Ok(positions
            .windows(2)
            .fold(V::Scalar::zero(), |acc, w| acc + w[0].distance(w[1])))
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.springs.len()
    }

    pub fn particles(&self) -> &[ParticleHandle] {
        &self.particles
    }

    pub fn springs(&self) -> &[SpringHandle] {
        &self.springs
    }

    fn handle(&self, index: usize) -> Result<ParticleHandle, PhysicsError> {
        self.particles
            .get(index)
            .copied()
            .ok_or(PhysicsError::invalid("index", "past the end of the string"))
    }
}
