//! Per-pair dispatch: decides each tick whether a pair is far apart
//! (gravity, maybe detach), overlapping with history (push-apart,
//! attachment correction), or freshly touching (collision).

use crate::category::SideMut;
use crate::collision::{fresh_contact, push_apart};
use crate::config::PhysicsConfig;
use crate::error::SimError;
use crate::pair_cache::PairCache;
use bevy::prelude::*;

/// Resolve one ordered pair for this tick.
///
/// Every side effect is a deferred velocity update or a relation change;
/// positions are never touched here.  Fails only if the pair has no cache
/// entry, which means a spawn was not seeded or a despawn not purged.
pub fn resolve_pair(
    a: &mut SideMut,
    b: &mut SideMut,
    cache: &mut PairCache,
    config: &PhysicsConfig,
) -> Result<(), SimError> {
    let consts = cache.pair_mut(a.entity, b.entity)?;

    let sep = a.body.pos - b.body.pos;
    let dist_sq = sep.length_squared();

    if dist_sq > consts.combined_radius_squared {
        // moving apart ends a contact; the next touch is fresh again
        a.body.clear_colliding(b.entity);
        b.body.clear_colliding(a.entity);

        if a.body.is_attached_to(b.entity) {
            let gap = dist_sq.sqrt() - consts.combined_radius;
            if gap > config.detach_threshold {
                a.body.detach(b.entity);
                b.body.detach(a.entity);
            }
            // attached pairs do not pull on each other
            return Ok(());
        }

        // memoized gravity: reuse the last pull while the separation has
        // barely changed
        let (pull_a, pull_b) = if (sep - consts.last_sep).length_squared()
            <= config.gravity_cache_epsilon * config.gravity_cache_epsilon
        {
            consts.last_pull
        } else {
            let pulls = (
                gravity_pull(a.body.stationary, a.body.mass, b.body.mass, sep, dist_sq, config),
                gravity_pull(b.body.stationary, b.body.mass, a.body.mass, -sep, dist_sq, config),
            );
            consts.last_sep = sep;
            consts.last_pull = pulls;
            pulls
        };

        if pull_a != Vec2::ZERO {
            a.body.defer_velocity_delta(pull_a);
        }
        if pull_b != Vec2::ZERO {
            b.body.defer_velocity_delta(pull_b);
        }
        return Ok(());
    }

    // overlapping
    let overlap = consts.combined_radius - dist_sq.sqrt();
    if a.body.is_colliding_with(b.entity) {
        // already-resolved contact still overlapping: nudge apart
        push_apart(a.body, b.body, overlap, config.push_apart_factor);
    } else if a.body.is_attached_to(b.entity) {
        // attached bodies tolerate a little overlap; correct a deep one
        if overlap > config.overlap_noise {
            push_apart(a.body, b.body, overlap, config.attach_push_factor);
        }
    } else {
        fresh_contact(a, b, consts, config);
    }
    Ok(())
}

/// Acceleration on one body from the other's gravity, capped and with a
/// negligibility cutoff.  Anchored and massless bodies feel nothing.
fn gravity_pull(
    stationary: bool,
    own_mass: f32,
    other_mass: f32,
    sep: Vec2,
    dist_sq: f32,
    config: &PhysicsConfig,
) -> Vec2 {
    if stationary || own_mass == 0.0 || dist_sq == 0.0 {
        return Vec2::ZERO;
    }
    let mag = (config.gravity_const * other_mass / dist_sq).min(config.max_accel);
    if mag < config.negligible_accel {
        return Vec2::ZERO;
    }
    let angle = sep.x.atan2(sep.y);
    Vec2::new(-angle.sin() * mag, -angle.cos() * mag)
}
