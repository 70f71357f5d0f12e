//! The physics world: owns particles and springs and runs the step loop.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec as AllocVec;

use tracing::{debug, trace, warn};

use crate::arena::{
    kind, Arena, BehaviorHandle, ConstraintHandle, ParticleHandle, SpringHandle,
};
use crate::behavior::{check_time_step, Behavior, Gravity};
use crate::bounds::BoundingVolume;
use crate::config::{check_friction, check_iterations, WorldConfig};
use crate::constraint::{confine, ParticleConstraint};
use crate::error::PhysicsError;
use crate::observer::{NoOpStepObserver, StepObserver};
use crate::particle::Particle;
use crate::spatial::SpatialIndex;
use crate::spring::Spring;
use crate::vec::Vec;

/// Which particles a registered constraint applies to.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintScope {
    /// Every particle in the world.
    All,
    /// Only the listed particles.
    Particles(AllocVec<ParticleHandle>),
}

struct RegisteredConstraint<V: Vec> {
    constraint: Box<dyn ParticleConstraint<V>>,
    scope: ConstraintScope,
}

/// Saved particle state, restorable with [`World::restore`].
#[derive(Clone, Debug)]
pub struct Snapshot<V: Vec> {
    particles: Arena<Particle<V>, kind::Particle>,
    steps: u64,
}

impl<V: Vec> Snapshot<V> {
    /// Step count when the snapshot was taken.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// A Verlet particle world.
///
/// Each [`step`](Self::step) runs, in order: behaviors (gravity first) →
/// integration → `iterations` spring relaxation passes → constraints →
/// world bounds. A step is all-or-nothing from the caller's side: it either
/// returns after every phase ran, or fails validation before touching any
/// particle. The one exception is numerical degeneracy, which can only be
/// observed after the fact and is reported once the step has completed; use
/// [`snapshot`](Self::snapshot) to roll back.
pub struct World<V: Vec> {
    particles: Arena<Particle<V>, kind::Particle>,
    springs: Arena<Spring<V>, kind::Spring>,
    behaviors: Arena<Box<dyn Behavior<V>>, kind::Behavior>,
    constraints: Arena<RegisteredConstraint<V>, kind::Constraint>,
    gravity: Gravity<V>,
    config: WorldConfig<V>,
    bounds: Option<Box<dyn BoundingVolume<V>>>,
    index: Option<Box<dyn SpatialIndex<V>>>,
    steps: u64,
    neighbors: AllocVec<ParticleHandle>,
    /// Position each particle was last filed under in `index`.
    indexed: BTreeMap<ParticleHandle, V>,
}

impl<V: Vec> World<V> {
    pub fn new(config: WorldConfig<V>) -> Result<Self, PhysicsError> {
        config.validate()?;
        debug!(
            iterations = config.iterations,
            time_step = ?config.time_step,
            friction = ?config.friction,
            "created world"
        );
        Ok(World {
            particles: Arena::new(),
            springs: Arena::new(),
            behaviors: Arena::new(),
            constraints: Arena::new(),
            gravity: Gravity::new(config.gravity),
            config,
            bounds: None,
            index: None,
            steps: 0,
            neighbors: AllocVec::new(),
            indexed: BTreeMap::new(),
        })
    }

    // ---- parameters -------------------------------------------------------

    pub fn config(&self) -> &WorldConfig<V> {
        &self.config
    }

    pub fn time_step(&self) -> V::Scalar {
        self.config.time_step
    }

    pub fn set_time_step(&mut self, time_step: V::Scalar) -> Result<(), PhysicsError> {
        check_time_step(time_step)?;
        self.config.time_step = time_step;
        Ok(())
    }

    pub fn iterations(&self) -> usize {
        self.config.iterations
    }

    pub fn set_iterations(&mut self, iterations: usize) -> Result<(), PhysicsError> {
        check_iterations(iterations)?;
        self.config.iterations = iterations;
        Ok(())
    }

    pub fn friction(&self) -> V::Scalar {
        self.config.friction
    }

    pub fn set_friction(&mut self, friction: V::Scalar) -> Result<(), PhysicsError> {
        check_friction(friction)?;
        self.config.friction = friction;
        Ok(())
    }

    pub fn gravity(&self) -> V {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: V) -> Result<(), PhysicsError> {
        if !gravity.is_finite() {
            return Err(PhysicsError::invalid("gravity", "must be finite"));
        }
        self.config.gravity = gravity;
        self.gravity.set_acceleration(gravity);
        Ok(())
    }

    /// Number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    // ---- particles --------------------------------------------------------

    pub fn add_particle(&mut self, particle: Particle<V>) -> ParticleHandle {
        let pos = particle.pos;
        let handle = self.particles.insert(particle);
        if let Some(index) = self.index.as_deref_mut() {
            index.insert(handle, pos);
            self.indexed.insert(handle, pos);
        }
        debug!(particle = ?handle, "added particle");
        handle
    }

    /// Remove a particle. Springs and scoped constraints that still reference
    /// it make the next step fail with `DanglingReference`; use
    /// [`remove_particle_and_springs`](Self::remove_particle_and_springs) to
    /// detach it cleanly.
    pub fn remove_particle(&mut self, handle: ParticleHandle) -> Result<Particle<V>, PhysicsError> {
        let particle = self.particles.remove(handle).ok_or(PhysicsError::dangling(handle))?;
        if let Some(index) = self.index.as_deref_mut() {
            let filed = self.indexed.remove(&handle).unwrap_or(particle.pos);
            index.remove(handle, filed);
        }
        debug!(particle = ?handle, "removed particle");
        Ok(particle)
    }

    /// Remove a particle together with every spring attached to it. The
    /// particle is also dropped from scoped constraints, and a scoped
    /// constraint left with no particles is unregistered.
    pub fn remove_particle_and_springs(
        &mut self,
        handle: ParticleHandle,
    ) -> Result<Particle<V>, PhysicsError> {
        if !self.particles.contains(handle) {
            return Err(PhysicsError::dangling(handle));
        }
        let attached: AllocVec<SpringHandle> = self
            .springs
            .iter()
            .filter(|(_, s)| s.touches(handle))
            .map(|(h, _)| h)
            .collect();
        for spring in attached {
            self.springs.remove(spring);
            debug!(?spring, particle = ?handle, "removed attached spring");
        }
        self.unscope_particle(handle);
        self.remove_particle(handle)
    }

    fn unscope_particle(&mut self, handle: ParticleHandle) {
        let mut emptied = AllocVec::new();
        for (constraint, registered) in self.constraints.iter_mut() {
            if let ConstraintScope::Particles(scope) = &mut registered.scope {
                scope.retain(|h| *h != handle);
                if scope.is_empty() {
                    emptied.push(constraint);
                }
            }
        }
        for constraint in emptied {
            self.constraints.remove(constraint);
            debug!(?constraint, "removed scoped constraint with no particles left");
        }
    }

    pub fn contains_particle(&self, handle: ParticleHandle) -> bool {
        self.particles.contains(handle)
    }

    pub fn particle(&self, handle: ParticleHandle) -> Option<&Particle<V>> {
        self.particles.get(handle)
    }

    /// Direct mutable access. Position edits made here reach the spatial index
    /// when the next step starts; [`move_particle`](Self::move_particle)
    /// updates it immediately.
    pub fn particle_mut(&mut self, handle: ParticleHandle) -> Option<&mut Particle<V>> {
        self.particles.get_mut(handle)
    }

    pub fn position(&self, handle: ParticleHandle) -> Option<V> {
        self.particles.get(handle).map(|p| p.pos)
    }

    /// Teleport a particle without giving it velocity.
    pub fn move_particle(&mut self, handle: ParticleHandle, pos: V) -> Result<(), PhysicsError> {
        let particle = self.particles.get_mut(handle).ok_or(PhysicsError::dangling(handle))?;
        let old = particle.pos;
        particle.move_to(pos);
        if let Some(index) = self.index.as_deref_mut() {
            let filed = self.indexed.insert(handle, pos).unwrap_or(old);
            index.reindex(handle, filed, pos);
        }
        Ok(())
    }

    pub fn lock_particle(&mut self, handle: ParticleHandle) -> Result<(), PhysicsError> {
        self.particles.get_mut(handle).ok_or(PhysicsError::dangling(handle))?.lock();
        Ok(())
    }

    pub fn unlock_particle(&mut self, handle: ParticleHandle) -> Result<(), PhysicsError> {
        self.particles.get_mut(handle).ok_or(PhysicsError::dangling(handle))?.unlock();
        Ok(())
    }

    pub fn particles(&self) -> impl Iterator<Item = (ParticleHandle, &Particle<V>)> {
        self.particles.iter()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    // ---- springs ----------------------------------------------------------

    pub fn add_spring(&mut self, spring: Spring<V>) -> Result<SpringHandle, PhysicsError> {
        for end in [spring.a(), spring.b()] {
            if !self.particles.contains(end) {
                return Err(PhysicsError::dangling(end));
            }
        }
        let (a, b) = (spring.a(), spring.b());
        let handle = self.springs.insert(spring);
        debug!(spring = ?handle, ?a, ?b, "added spring");
        Ok(handle)
    }

    /// Spring whose rest length is the particles' current distance.
    pub fn connect(
        &mut self,
        a: ParticleHandle,
        b: ParticleHandle,
        strength: V::Scalar,
    ) -> Result<SpringHandle, PhysicsError> {
        let pa = self.position(a).ok_or(PhysicsError::dangling(a))?;
        let pb = self.position(b).ok_or(PhysicsError::dangling(b))?;
        self.add_spring(Spring::new(a, b, pa.distance(pb), strength)?)
    }

    pub fn remove_spring(&mut self, handle: SpringHandle) -> Option<Spring<V>> {
        let spring = self.springs.remove(handle);
        if spring.is_some() {
            debug!(spring = ?handle, "removed spring");
        }
        spring
    }

    /// Remove a spring and both of its particles, along with any other
    /// springs attached to them.
    pub fn remove_spring_with_particles(&mut self, handle: SpringHandle) -> Option<Spring<V>> {
        let spring = self.remove_spring(handle)?;
        for end in [spring.a(), spring.b()] {
            // An endpoint may already be gone; the spring is still removed.
            let _ = self.remove_particle_and_springs(end);
        }
        Some(spring)
    }

    pub fn spring(&self, handle: SpringHandle) -> Option<&Spring<V>> {
        self.springs.get(handle)
    }

    pub fn spring_mut(&mut self, handle: SpringHandle) -> Option<&mut Spring<V>> {
        self.springs.get_mut(handle)
    }

    pub fn springs(&self) -> impl Iterator<Item = (SpringHandle, &Spring<V>)> {
        self.springs.iter()
    }

    pub fn spring_count(&self) -> usize {
        self.springs.len()
    }

    // ---- behaviors and constraints ----------------------------------------

    pub fn add_behavior<B: Behavior<V> + 'static>(&mut self, behavior: B) -> BehaviorHandle {
        let handle = self.behaviors.insert(Box::new(behavior));
        debug!(behavior = ?handle, "registered behavior");
        handle
    }

    pub fn remove_behavior(&mut self, handle: BehaviorHandle) -> Option<Box<dyn Behavior<V>>> {
        let behavior = self.behaviors.remove(handle);
        if behavior.is_some() {
            debug!(behavior = ?handle, "removed behavior");
        }
        behavior
    }

    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    /// Constraint applied to every particle.
    pub fn add_constraint<C: ParticleConstraint<V> + 'static>(&mut self, constraint: C) -> ConstraintHandle {
        let handle = self.constraints.insert(RegisteredConstraint {
            constraint: Box::new(constraint),
            scope: ConstraintScope::All,
        });
        debug!(constraint = ?handle, "registered constraint");
        handle
    }

    /// Constraint applied only to `particles`, which must all be live.
    pub fn add_constraint_for<C: ParticleConstraint<V> + 'static>(
        &mut self,
        constraint: C,
        particles: &[ParticleHandle],
    ) -> Result<ConstraintHandle, PhysicsError> {
        if let Some(&missing) = particles.iter().find(|h| !self.particles.contains(**h)) {
            return Err(PhysicsError::dangling(missing));
        }
        let handle = self.constraints.insert(RegisteredConstraint {
            constraint: Box::new(constraint),
            scope: ConstraintScope::Particles(particles.to_vec()),
        });
        debug!(constraint = ?handle, count = particles.len(), "registered scoped constraint");
        Ok(handle)
    }

    pub fn remove_constraint(&mut self, handle: ConstraintHandle) -> Option<Box<dyn ParticleConstraint<V>>> {
        let registered = self.constraints.remove(handle)?;
        debug!(constraint = ?handle, "removed constraint");
        Some(registered.constraint)
    }

    pub fn constraint_scope(&self, handle: ConstraintHandle) -> Option<&ConstraintScope> {
        self.constraints.get(handle).map(|c| &c.scope)
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    // ---- bounds and spatial index -----------------------------------------

    pub fn set_bounds<B: BoundingVolume<V> + 'static>(&mut self, bounds: B) {
        self.bounds = Some(Box::new(bounds));
    }

    pub fn clear_bounds(&mut self) {
        self.bounds = None;
    }

    pub fn bounds(&self) -> Option<&dyn BoundingVolume<V>> {
        self.bounds.as_deref()
    }

    /// Install a spatial index; all current particles are inserted into it.
    pub fn set_spatial_index<I: SpatialIndex<V> + 'static>(&mut self, index: I) {
        self.index = Some(Box::new(index));
        self.rebuild_index();
        debug!(particles = self.indexed.len(), "installed spatial index");
    }

    pub fn clear_spatial_index(&mut self) -> Option<Box<dyn SpatialIndex<V>>> {
        self.indexed.clear();
        self.index.take()
    }

    fn rebuild_index(&mut self) {
        self.indexed.clear();
        let Some(index) = self.index.as_deref_mut() else {
            return;
        };
        index.clear();
        for (handle, particle) in self.particles.iter() {
            index.insert(handle, particle.pos);
            self.indexed.insert(handle, particle.pos);
        }
    }

    /// File every particle whose position changed since it was last indexed.
    fn sync_index(&mut self) {
        let Some(index) = self.index.as_deref_mut() else {
            return;
        };
        for (handle, particle) in self.particles.iter() {
            match self.indexed.get_mut(&handle) {
                Some(filed) if *filed == particle.pos => {}
                Some(filed) => {
                    index.reindex(handle, *filed, particle.pos);
                    *filed = particle.pos;
                }
                None => {
                    index.insert(handle, particle.pos);
                    self.indexed.insert(handle, particle.pos);
                }
            }
        }
    }

    pub fn spatial_index(&self) -> Option<&dyn SpatialIndex<V>> {
        self.index.as_deref()
    }

    // ---- snapshots --------------------------------------------------------

    pub fn snapshot(&self) -> Snapshot<V> {
        Snapshot { particles: self.particles.clone(), steps: self.steps }
    }

    /// Restore particle state. Springs and constraints are left as they are;
    /// if they reference particles absent from the snapshot, the next step
    /// reports `DanglingReference`.
    pub fn restore(&mut self, snapshot: &Snapshot<V>) {
        self.particles = snapshot.particles.clone();
        self.steps = snapshot.steps;
        self.rebuild_index();
        debug!(steps = self.steps, "restored snapshot");
    }

    // ---- stepping ---------------------------------------------------------

    pub fn step(&mut self) -> Result<(), PhysicsError> {
        self.step_observed(&mut NoOpStepObserver)
    }

    pub fn step_observed<O: StepObserver>(&mut self, observer: &mut O) -> Result<(), PhysicsError> {
        self.validate_references()?;
        self.configure_behaviors()?;
        self.sync_index();

        self.apply_behaviors()?;
        trace!(step = self.steps, "behaviors applied");
        observer.on_behaviors();

        let damping = self.config.damping();
        for particle in self.particles.values_mut() {
            particle.integrate(damping);
        }
        observer.on_integrate();

        for i in 0..self.config.iterations {
            for spring in self.springs.values() {
                spring.relax_in(&mut self.particles)?;
            }
            observer.on_spring_iteration(i);
        }
        trace!(step = self.steps, iterations = self.config.iterations, "springs relaxed");

        self.apply_constraints();
        observer.on_constraints();

        self.sync_index();
        self.steps += 1;
        self.check_finite()?;
        observer.on_step_complete(self.steps);
        Ok(())
    }

    fn validate_references(&self) -> Result<(), PhysicsError> {
        for (handle, spring) in self.springs.iter() {
            for end in [spring.a(), spring.b()] {
                if !self.particles.contains(end) {
                    warn!(spring = ?handle, particle = ?end, "spring references a removed particle");
                    return Err(PhysicsError::dangling(end));
                }
            }
        }
        for (handle, registered) in self.constraints.iter() {
            if let ConstraintScope::Particles(scope) = &registered.scope {
                if let Some(&missing) = scope.iter().find(|h| !self.particles.contains(**h)) {
                    warn!(constraint = ?handle, particle = ?missing, "constraint references a removed particle");
                    return Err(PhysicsError::dangling(missing));
                }
            }
        }
        Ok(())
    }

    fn configure_behaviors(&mut self) -> Result<(), PhysicsError> {
        let dt = self.config.time_step;
        self.gravity.configure(dt)?;
        for behavior in self.behaviors.values_mut() {
            behavior.configure(dt)?;
        }
        Ok(())
    }

    fn apply_behaviors(&mut self) -> Result<(), PhysicsError> {
        if self.config.gravity != V::zero() {
            for particle in self.particles.values_mut() {
                self.gravity.apply(particle);
            }
        }

        for behavior in self.behaviors.values_mut() {
            match (behavior.neighborhood(), self.index.as_deref()) {
                (Some((center, radius)), Some(index)) => {
                    self.neighbors.clear();
                    index.items_within_radius(center, radius, &mut self.neighbors);
                    // Slot order, as in the full scan.
                    self.neighbors.sort_unstable();
                    for &handle in &self.neighbors {
                        let particle = self
                            .particles
                            .get_mut(handle)
                            .ok_or(PhysicsError::dangling(handle))?;
                        behavior.apply(particle);
                    }
                }
                _ => {
                    for particle in self.particles.values_mut() {
                        behavior.apply(particle);
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_constraints(&mut self) {
        for registered in self.constraints.values() {
            match &registered.scope {
                ConstraintScope::All => {
                    for particle in self.particles.values_mut() {
                        if !particle.is_locked() {
                            registered.constraint.apply(particle);
                        }
                    }
                }
                ConstraintScope::Particles(scope) => {
                    for &handle in scope {
                        if let Some(particle) = self.particles.get_mut(handle) {
                            if !particle.is_locked() {
                                registered.constraint.apply(particle);
                            }
                        }
                    }
                }
            }
        }

        if let Some(bounds) = self.bounds.as_deref() {
            for particle in self.particles.values_mut() {
                if !particle.is_locked() {
                    confine(particle, bounds);
                }
            }
        }
    }

    fn check_finite(&self) -> Result<(), PhysicsError> {
        if let Some((handle, _)) = self.particles.iter().find(|(_, p)| !p.is_finite()) {
            warn!(particle = ?handle, step = self.steps, "non-finite particle position");
            return Err(PhysicsError::degenerate(handle));
        }
        Ok(())
    }
}

impl<V: Vec> Default for World<V> {
    fn default() -> Self {
        World {
            particles: Arena::new(),
            springs: Arena::new(),
            behaviors: Arena::new(),
            constraints: Arena::new(),
            gravity: Gravity::new(V::zero()),
            config: WorldConfig::new(),
            bounds: None,
            index: None,
            steps: 0,
            neighbors: AllocVec::new(),
            indexed: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Aabb;
    use crate::constraint::AxisLock;
    use crate::vec::Vec2;

    fn world() -> World<Vec2<f64>> {
        World::new(WorldConfig::new().with_iterations(4)).unwrap()
    }

    #[test]
    fn new_rejects_invalid_config() {
        assert!(World::<Vec2<f32>>::new(WorldConfig::new().with_iterations(0)).is_err());
        assert!(World::<Vec2<f32>>::new(WorldConfig::new().with_time_step(0.0)).is_err());
    }

    #[test]
    fn setters_validate_and_keep_old_value() {
        let mut w = world();
        assert!(w.set_time_step(-1.0).is_err());
        assert_eq!(w.time_step(), 1.0);
        assert!(w.set_iterations(0).is_err());
        assert_eq!(w.iterations(), 4);
        assert!(w.set_friction(1.5).is_err());
        assert!(w.set_gravity(Vec2::new(0.0, f64::INFINITY)).is_err());
        assert_eq!(w.gravity(), Vec2::zero());
    }

    #[test]
    fn spring_to_removed_particle_is_rejected() {
        let mut w = world();
        let a = w.add_particle(Particle::new(Vec2::new(0.0, 0.0)));
        let b = w.add_particle(Particle::new(Vec2::new(1.0, 0.0)));
        w.remove_particle(b).unwrap();
        let spring = Spring::new(a, b, 1.0, 0.5).unwrap();
        assert_eq!(w.add_spring(spring), Err(PhysicsError::dangling(b)));
    }

    #[test]
    fn dangling_spring_fails_step_without_mutation() {
        let mut w = world();
        let a = w.add_particle(Particle::new(Vec2::new(0.0, 0.0)));
        let b = w.add_particle(Particle::new(Vec2::new(5.0, 0.0)));
        w.add_spring(Spring::new(a, b, 1.0, 0.5).unwrap()).unwrap();
        w.set_gravity(Vec2::new(0.0, -1.0)).unwrap();
        w.remove_particle(b).unwrap();
        assert_eq!(w.step(), Err(PhysicsError::dangling(b)));
        assert_eq!(w.position(a), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(w.steps(), 0);
    }

    #[test]
    fn remove_particle_and_springs_detaches_cleanly() {
        let mut w = world();
        let a = w.add_particle(Particle::new(Vec2::new(0.0, 0.0)));
        let b = w.add_particle(Particle::new(Vec2::new(5.0, 0.0)));
        let c = w.add_particle(Particle::new(Vec2::new(10.0, 0.0)));
        w.connect(a, b, 0.5).unwrap();
        w.connect(b, c, 0.5).unwrap();
        w.remove_particle_and_springs(b).unwrap();
        assert_eq!(w.spring_count(), 0);
        assert!(w.step().is_ok());
    }

    #[test]
    fn remove_spring_with_particles_takes_both_ends() {
        let mut w = world();
        let a = w.add_particle(Particle::new(Vec2::new(0.0, 0.0)));
        let b = w.add_particle(Particle::new(Vec2::new(5.0, 0.0)));
        let s = w.connect(a, b, 0.5).unwrap();
        assert!(w.remove_spring_with_particles(s).is_some());
        assert_eq!(w.particle_count(), 0);
        assert!(w.remove_spring_with_particles(s).is_none());
    }

    #[test]
    fn scoped_constraint_only_touches_listed_particles() {
        let mut w = world();
        let a = w.add_particle(Particle::new(Vec2::new(1.0, 1.0)));
        let b = w.add_particle(Particle::new(Vec2::new(2.0, 2.0)));
        w.add_constraint_for(AxisLock::new(1, 0.0).unwrap(), &[a]).unwrap();
        w.step().unwrap();
        assert_eq!(w.position(a).unwrap().y, 0.0);
        assert_eq!(w.position(b).unwrap().y, 2.0);
    }

    #[test]
    fn scoped_constraint_with_removed_particle_fails_step() {
        let mut w = world();
        let a = w.add_particle(Particle::new(Vec2::new(1.0, 1.0)));
        w.add_constraint_for(AxisLock::new(0, 0.0).unwrap(), &[a]).unwrap();
        w.remove_particle(a).unwrap();
        assert_eq!(w.step(), Err(PhysicsError::dangling(a)));
    }

    #[test]
    fn world_bounds_clamp_particles() {
        let mut w = world();
        w.set_bounds(Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0)));
        let p = w.add_particle(Particle::new(Vec2::new(5.0, 5.0)));
        w.particle_mut(p).unwrap().prev_pos = Vec2::new(-5.0, 5.0);
        for _ in 0..5 {
            w.step().unwrap();
            let pos = w.position(p).unwrap();
            assert!(pos.x <= 10.0 && pos.x >= 0.0);
        }
    }

    #[test]
    fn non_finite_position_is_reported() {
        let mut w = world();
        let p = w.add_particle(Particle::new(Vec2::new(0.0, 0.0)));
        w.particle_mut(p).unwrap().prev_pos = Vec2::new(f64::NAN, 0.0);
        assert_eq!(w.step(), Err(PhysicsError::degenerate(p)));
    }

    #[test]
    fn snapshot_restores_particles() {
        let mut w = world();
        w.set_gravity(Vec2::new(0.0, -1.0)).unwrap();
        let p = w.add_particle(Particle::new(Vec2::new(0.0, 0.0)));
        let snap = w.snapshot();
        w.step().unwrap();
        assert_ne!(w.position(p), Some(Vec2::new(0.0, 0.0)));
        w.restore(&snap);
        assert_eq!(w.position(p), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(w.steps(), 0);
    }

    #[derive(Default)]
    struct Counter {
        iterations: usize,
        completed: u64,
    }

    impl StepObserver for Counter {
        fn on_spring_iteration(&mut self, _iteration: usize) {
            self.iterations += 1;
        }
        fn on_step_complete(&mut self, step: u64) {
            self.completed = step;
        }
    }

    #[test]
    fn observer_sees_each_relaxation_pass() {
        let mut w = world();
        let mut counter = Counter::default();
        w.step_observed(&mut counter).unwrap();
        w.step_observed(&mut counter).unwrap();
        assert_eq!(counter.iterations, 8);
        assert_eq!(counter.completed, 2);
    }
}
