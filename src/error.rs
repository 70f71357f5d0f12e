//! Error types for physics operations.

use thiserror::Error;

use crate::arena::ParticleHandle;

/// Errors that can occur during physics operations.
///
/// Configuration errors are raised by the call that introduced them and leave
/// no partial state behind. Any error returned from a world step should be
/// treated as fatal to the run: restore a snapshot or rebuild the world.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhysicsError {
    /// A parameter was outside its valid range.
    #[error("invalid {parameter}: {reason}")]
    InvalidConfig {
        parameter: &'static str,
        reason: &'static str,
    },
    /// A spring, constraint or call referenced a particle that is not in the world.
    #[error("particle {index}v{generation} is not in the world")]
    DanglingReference { index: u32, generation: u32 },
    /// A step produced a NaN or infinite particle position.
    #[error("particle {index}v{generation} has a non-finite position")]
    NumericalDegeneracy { index: u32, generation: u32 },
}

impl PhysicsError {
    pub(crate) fn invalid(parameter: &'static str, reason: &'static str) -> Self {
        PhysicsError::InvalidConfig { parameter, reason }
    }

    pub(crate) fn dangling(handle: ParticleHandle) -> Self {
        PhysicsError::DanglingReference { index: handle.index(), generation: handle.generation() }
    }

    pub(crate) fn degenerate(handle: ParticleHandle) -> Self {
        PhysicsError::NumericalDegeneracy { index: handle.index(), generation: handle.generation() }
    }
}
