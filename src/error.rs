//! Simulation-specific error types.
//!
//! The simulation distinguishes two failure classes: internal-consistency
//! violations (a pair of live bodies with no cache entry) which are fatal
//! and reported loudly, and construction-time parameter errors which fail
//! fast before a broken body ever enters the live set.

use bevy::prelude::Entity;
use std::fmt;

/// Top-level error enum for the gravwell simulation core.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// Two live bodies reached pairwise resolution without a seeded cache
    /// entry.  Indicates a body was added to the live set without the
    /// orchestrator seeding its pairwise constants — a bug, not a
    /// recoverable condition.
    MissingPairEntry {
        /// First body of the (ordered) pair.
        a: Entity,
        /// Second body of the (ordered) pair.
        b: Entity,
    },

    /// A body was constructed with parameters the simulation cannot
    /// represent (non-positive radius, non-finite position).
    InvalidBodyParams {
        /// Human-readable description of the rejected parameter.
        reason: &'static str,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::MissingPairEntry { a, b } => {
                write!(
                    f,
                    "no pairwise cache entry for live bodies {a:?} / {b:?} \
                     (body added without cache seeding?)"
                )
            }
            SimError::InvalidBodyParams { reason } => {
                write!(f, "invalid body parameters: {reason}")
            }
        }
    }
}

impl std::error::Error for SimError {}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::prelude::World;

    #[test]
    fn missing_pair_entry_mentions_both_entities() {
        let mut world = World::new();
        let a = world.spawn_empty().id();
        let b = world.spawn_empty().id();
        let msg = SimError::MissingPairEntry { a, b }.to_string();
        assert!(msg.contains("cache"), "message should mention the cache");
    }

    #[test]
    fn invalid_params_reports_reason() {
        let msg = SimError::InvalidBodyParams {
            reason: "radius must be > 0",
        }
        .to_string();
        assert!(msg.contains("radius must be > 0"));
    }
}
