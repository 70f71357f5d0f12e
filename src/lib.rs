//! Verlet particle physics: springs, behaviors, constraints and bounded worlds.
//!
//! `verlet_world` simulates point masses with implicit velocity, joined by
//! distance springs that are relaxed iteratively each step. Designed for
//! generative visuals and games: ropes, meshes, attractors, particles kept
//! inside boxes or away from obstacles.
//!
//! # Features
//!
//! - **Verlet integration**: Position-based dynamics with implicit velocity
//! - **Springs**: Inverse-weight relaxation with min/max distance modes
//! - **Behaviors**: Gravity, constant force, radial attraction/repulsion
//! - **Constraints**: Axis locks and bounds, box/sphere/polygon containment, angular snapping
//! - **Generational handles**: Removed particles are detected, never aliased
//! - **Spatial index**: Neighborhood-limited behaviors via `SpatialHash`
//! - **Observable**: Monitor world steps via the `StepObserver` trait
//! - **`no_std` compatible**: Works in embedded and WASM environments
//!
//! # Example
//!
//! ```
//! use verlet_world::{Particle, Spring, Vec, Vec2, World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig::new().with_iterations(1)).unwrap();
//! let a = world.add_particle(Particle::new(Vec2::new(0.0f64, 0.0)));
//! let b = world.add_particle(Particle::new(Vec2::new(10.0, 0.0)));
//! world.add_spring(Spring::new(a, b, 5.0, 0.5).unwrap()).unwrap();
//! for _ in 0..50 {
//!     world.step().unwrap();
//! }
//! let d = world.position(a).unwrap().distance(world.position(b).unwrap());
//! assert!((d - 5.0).abs() < 0.01);
//! ```

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod arena;
pub mod error;
pub mod particle;
pub mod bounds;
pub mod spring;
pub mod behavior;
pub mod constraint;
pub mod spatial;
pub mod config;
pub mod observer;
pub mod world;
pub mod string;

// Re-export primary API
pub use float::Float;
pub use vec::{Vec, Scalar, Vec2, Vec3};
pub use arena::{Handle, ParticleHandle, SpringHandle, BehaviorHandle, ConstraintHandle};
pub use error::PhysicsError;
pub use particle::Particle;
pub use bounds::{BoundingVolume, Aabb, Sphere};
pub use spring::{Spring, SpringMode};
pub use behavior::{Behavior, ConstantForce, Gravity, RadialAttraction};
pub use constraint::{
    ParticleConstraint, Containment, AxisLock, AxisBound, BoundSide, BoxConstraint,
    SphereConstraint, PolygonConstraint, AngularConstraint,
};
pub use spatial::{SpatialIndex, SpatialHash};
pub use config::WorldConfig;
pub use observer::{StepObserver, NoOpStepObserver};
pub use world::{World, ConstraintScope, Snapshot};
pub use string::{ParticleString, StringConfig};
