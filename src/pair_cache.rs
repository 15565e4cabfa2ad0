//! Per-pair constants and memoized gravity, computed once at spawn time.
//!
//! Sums, products, and deltas of mass and radius never change over a
//! body's life, so the inner pair loop looks them up instead of
//! recomputing them every tick.  Entries are keyed on the ordered entity
//! pair and must be seeded when a body spawns and purged when it dies;
//! a missing entry during resolution is a lifecycle bug, surfaced as
//! [`SimError::MissingPairEntry`].

use crate::error::SimError;
use bevy::prelude::*;
use std::collections::HashMap;

/// Immutable facts about a pair, plus the gravity memo slot.
#[derive(Debug, Clone)]
pub struct PairConstants {
    /// Sum of the two radii; contact when center distance falls below it.
    pub combined_radius: f32,
    /// `combined_radius²`, for comparisons against squared distance.
    pub combined_radius_squared: f32,
    /// Sum of the two masses.
    pub combined_mass: f32,
    /// `mass(a) − mass(b)` in key order (a is the lower entity id).
    pub mass_delta: f32,
    /// Separation `a − b` at the last full gravity evaluation.  Starts at
    /// infinity so the first evaluation never short-circuits.
    pub last_sep: Vec2,
    /// Memoized acceleration deltas `(on a, on b)` from that evaluation.
    pub last_pull: (Vec2, Vec2),
}

/// Registry of [`PairConstants`] for every live body pair.
#[derive(Resource, Default)]
pub struct PairCache {
    entries: HashMap<(Entity, Entity), PairConstants>,
}

fn key(a: Entity, b: Entity) -> (Entity, Entity) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl PairCache {
    /// Add entries pairing a newly spawned body against every existing one.
    pub fn seed<I>(&mut self, entity: Entity, mass: f32, radius: f32, others: I)
    where
        I: IntoIterator<Item = (Entity, f32, f32)>,
    {
        for (other, other_mass, other_radius) in others {
            if other == entity {
                continue;
            }
            let combined_radius = radius + other_radius;
            let k = key(entity, other);
            // mass_delta follows key order, not spawn order
            let mass_delta = if k.0 == entity {
                mass - other_mass
            } else {
                other_mass - mass
            };
            self.entries.insert(
                k,
                PairConstants {
                    combined_radius,
                    combined_radius_squared: combined_radius * combined_radius,
                    combined_mass: mass + other_mass,
                    mass_delta,
                    last_sep: Vec2::INFINITY,
                    last_pull: (Vec2::ZERO, Vec2::ZERO),
                },
            );
        }
    }

    /// Drop every entry involving a removed body.
    pub fn purge(&mut self, entity: Entity) {
        self.entries.retain(|&(a, b), _| a != entity && b != entity);
    }

    /// Mutable access to a pair's entry, in either argument order.
    pub fn pair_mut(&mut self, a: Entity, b: Entity) -> Result<&mut PairConstants, SimError> {
        self.entries
            .get_mut(&key(a, b))
            .ok_or(SimError::MissingPairEntry { a, b })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PairConstants {
    /// `mass(me) − mass(other)` for a caller-supplied orientation: `true`
    /// when `me` is the lower-id side of the key.
    pub fn mass_delta_for(&self, me_is_first: bool) -> f32 {
        if me_is_first {
            self.mass_delta
        } else {
            -self.mass_delta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn seed_creates_entries_both_ways() {
        let e = test_entities(3);
        let mut cache = PairCache::default();
        cache.seed(e[0], 10.0, 5.0, vec![]);
        cache.seed(e[1], 4.0, 3.0, vec![(e[0], 10.0, 5.0)]);
        cache.seed(e[2], 1.0, 1.0, vec![(e[0], 10.0, 5.0), (e[1], 4.0, 3.0)]);
        assert_eq!(cache.len(), 3);

        let pair = cache.pair_mut(e[1], e[0]).unwrap();
        assert_eq!(pair.combined_radius, 8.0);
        assert_eq!(pair.combined_radius_squared, 64.0);
        assert_eq!(pair.combined_mass, 14.0);
    }

    #[test]
    fn mass_delta_respects_key_order() {
        let e = test_entities(2);
        let mut cache = PairCache::default();
        cache.seed(e[1], 4.0, 3.0, vec![(e[0], 10.0, 5.0)]);
        let pair = cache.pair_mut(e[0], e[1]).unwrap();
        // the key side is decided by Entity's Ord, which does not have to
        // match spawn order; the invariant is that each caller recovers
        // its own mass-minus-other under its own orientation
        let expected = if e[0] <= e[1] { 6.0 } else { -6.0 };
        assert_eq!(pair.mass_delta, expected);
        assert_eq!(pair.mass_delta_for(e[0] <= e[1]), 6.0, "seen from the 10.0 body");
        assert_eq!(pair.mass_delta_for(e[1] <= e[0]), -6.0, "seen from the 4.0 body");
    }

    #[test]
    fn first_gravity_memo_never_matches() {
        let e = test_entities(2);
        let mut cache = PairCache::default();
        cache.seed(e[1], 1.0, 1.0, vec![(e[0], 1.0, 1.0)]);
        let pair = cache.pair_mut(e[0], e[1]).unwrap();
        assert!(!pair.last_sep.is_finite());
    }

    #[test]
    fn purge_removes_every_entry_for_a_body() {
        let e = test_entities(3);
        let mut cache = PairCache::default();
        cache.seed(e[1], 1.0, 1.0, vec![(e[0], 1.0, 1.0)]);
        cache.seed(e[2], 1.0, 1.0, vec![(e[0], 1.0, 1.0), (e[1], 1.0, 1.0)]);
        cache.purge(e[0]);
        assert_eq!(cache.len(), 1);
        assert!(cache.pair_mut(e[0], e[1]).is_err());
        assert!(cache.pair_mut(e[1], e[2]).is_ok());
    }

    #[test]
    fn missing_entry_is_an_error() {
        let e = test_entities(2);
        let mut cache = PairCache::default();
        let err = cache.pair_mut(e[0], e[1]).unwrap_err();
        assert!(matches!(err, SimError::MissingPairEntry { .. }));
    }

    #[test]
    fn seed_skips_self_pairing() {
        let e = test_entities(1);
        let mut cache = PairCache::default();
        cache.seed(e[0], 1.0, 1.0, vec![(e[0], 1.0, 1.0)]);
        assert!(cache.is_empty());
    }
}
