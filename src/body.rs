//! The [`Body`] component: a circular rigid body with deferred velocity
//! updates, health, and symmetric attach/colliding relations.
//!
//! A body owns its own integration step ([`Body::integrate`]) but never
//! adds or removes other bodies — lifecycle changes flow through the
//! orchestrator's queues so the pair loop never sees a mutating live set.
//!
//! ## Deferred updates
//!
//! During pairwise resolution every interaction records its velocity
//! change on the *target* body without applying it, so all pairs in a tick
//! observe the same pre-tick snapshot.  Two kinds of deferral exist:
//! additive deltas (gravity, push-apart) and absolute sets (collision
//! outcomes).  At integration time sets win, deltas are added on top, and
//! — deliberately — multiple sets within one tick are *summed*, not
//! last-write-wins.  That quirk is load-bearing: see `DESIGN.md`.

use crate::constants::*;
use crate::error::SimError;
use bevy::prelude::*;
use std::collections::HashSet;
use std::f32::consts::TAU;

/// Why a body left the live set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Health reached zero from damage.  Asteroids fragment on this one.
    Destroyed,
    /// Crossed a non-wrapping play-field edge past the kill margin.
    OutOfBounds,
    /// Lifetime ran out (weapon TTL, fade-out, explosion linger).
    Expired,
}

/// Construction record for a [`Body`] (the §6 boundary contract).
///
/// Only the position is mandatory; use [`BodyParams::at`] and struct-update
/// syntax for everything else:
///
/// ```
/// use gravwell::body::BodyParams;
/// let params = BodyParams { mass: 10.0, radius: 5.0, ..BodyParams::at(100.0, 100.0) };
/// ```
#[derive(Debug, Clone)]
pub struct BodyParams {
    pub x: f32,
    pub y: f32,
    pub mass: f32,
    pub radius: f32,
    pub v_x: f32,
    pub v_y: f32,
    pub facing: f32,
    pub spin: f32,
    pub health: f32,
    pub damage: f32,
    pub stationary: bool,
    pub max_v: f32,
    pub max_thrust: f32,
    pub max_spin: f32,
    /// Number of child asteroids spawned if this body dies of damage.
    pub spawn_count: u32,
}

impl Default for BodyParams {
    /// Defaults leave the position non-finite so a body built without an
    /// explicit position fails fast in [`Body::new`].
    fn default() -> Self {
        Self {
            x: f32::NAN,
            y: f32::NAN,
            mass: DEFAULT_MASS,
            radius: DEFAULT_RADIUS,
            v_x: 0.0,
            v_y: 0.0,
            facing: 0.0,
            spin: 0.0,
            health: DEFAULT_HEALTH,
            damage: 0.0,
            stationary: false,
            max_v: DEFAULT_MAX_V,
            max_thrust: DEFAULT_MAX_THRUST,
            max_spin: DEFAULT_MAX_SPIN,
            spawn_count: 0,
        }
    }
}

impl BodyParams {
    /// Minimal valid params at a position.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Ship hull preset.
    pub fn ship(x: f32, y: f32) -> Self {
        Self {
            mass: SHIP_MASS,
            radius: SHIP_RADIUS,
            damage: SHIP_DAMAGE,
            max_spin: SHIP_MAX_SPIN,
            ..Self::at(x, y)
        }
    }

    /// Planet preset — stationary unless the caller says otherwise.
    pub fn planet(x: f32, y: f32, mass: f32, radius: f32) -> Self {
        Self {
            mass,
            radius,
            stationary: true,
            ..Self::at(x, y)
        }
    }

    /// Asteroid preset.
    pub fn asteroid(x: f32, y: f32, mass: f32, radius: f32, v_x: f32, v_y: f32) -> Self {
        Self {
            mass,
            radius,
            v_x,
            v_y,
            ..Self::at(x, y)
        }
    }

    /// Bullet preset; velocity is the firing ship's velocity plus muzzle
    /// speed along `facing`.
    pub fn bullet(x: f32, y: f32, facing: f32, v_x: f32, v_y: f32) -> Self {
        Self {
            mass: BULLET_MASS,
            radius: BULLET_RADIUS,
            damage: BULLET_DAMAGE,
            facing,
            v_x,
            v_y,
            ..Self::at(x, y)
        }
    }

    /// Check the fail-fast construction invariants.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return Err(SimError::InvalidBodyParams {
                reason: "position must be finite (did you forget BodyParams::at?)",
            });
        }
        if self.radius <= 0.0 {
            return Err(SimError::InvalidBodyParams {
                reason: "radius must be > 0",
            });
        }
        if self.mass < 0.0 {
            return Err(SimError::InvalidBodyParams {
                reason: "mass must be >= 0",
            });
        }
        Ok(())
    }
}

/// A simulated circular body.  The only entity kind in the simulation;
/// ships, planets, asteroids and projectiles differ by their
/// [`crate::category::Category`] component, not by type.
#[derive(Component, Debug, Clone)]
pub struct Body {
    /// World position of the center.
    pub pos: Vec2,
    /// Velocity in units per tick.
    pub vel: Vec2,
    /// Facing angle in radians, kept in `[0, 2π)`.
    pub facing: f32,
    /// Spin rate in radians per tick, clamped to ±`max_spin`.
    pub spin: f32,
    pub max_spin: f32,
    /// Mass ≥ 0.  Mass 0 bodies neither exert nor receive gravity.
    pub mass: f32,
    pub radius: f32,
    /// Cached `radius²`.
    pub radius_squared: f32,
    /// Speed cap enforced by [`Body::apply_velocity`].
    pub max_v: f32,
    max_v_squared: f32,
    /// Health percentage-ish; death pins it at the −1 sentinel.
    pub health: f32,
    /// Starting health, used to subdivide health across fragments.
    pub max_health: f32,
    /// Damage dealt on contact (see category responses for scaling).
    pub damage: f32,
    /// Current self-propulsion along `facing`, ramped by intents.
    pub thrust: f32,
    pub max_thrust: f32,
    /// Anchored: skips velocity/position integration entirely.
    pub stationary: bool,
    /// False once dead — excluded from all simulation.
    pub update: bool,
    /// Terminal marker plus the reason, set at most once.
    pub died: Option<DeathCause>,
    /// Children spawned if this body dies of damage (asteroids).
    pub spawn_count: u32,
    attached: HashSet<Entity>,
    colliding: HashSet<Entity>,
    deferred_delta: Vec2,
    deferred_set: Option<Vec2>,
}

impl Body {
    /// Build a body from a construction record.
    ///
    /// # Panics
    ///
    /// Panics on invalid parameters (non-finite position, radius ≤ 0,
    /// negative mass) — constructing such a body is a programming error,
    /// not a recoverable condition.
    pub fn new(params: &BodyParams) -> Self {
        if let Err(e) = params.validate() {
            panic!("{e}");
        }
        Self {
            pos: Vec2::new(params.x, params.y),
            vel: Vec2::new(params.v_x, params.v_y),
            facing: params.facing.rem_euclid(TAU),
            spin: params.spin.clamp(-params.max_spin, params.max_spin),
            max_spin: params.max_spin,
            mass: params.mass,
            radius: params.radius,
            radius_squared: params.radius * params.radius,
            max_v: params.max_v,
            max_v_squared: params.max_v * params.max_v,
            health: params.health,
            max_health: params.health,
            damage: params.damage,
            thrust: 0.0,
            max_thrust: params.max_thrust,
            stationary: params.stationary,
            update: true,
            died: None,
            spawn_count: params.spawn_count,
            attached: HashSet::new(),
            colliding: HashSet::new(),
            deferred_delta: Vec2::ZERO,
            deferred_set: None,
        }
    }

    // ── Deferred updates ─────────────────────────────────────────────────────

    /// Accumulate an additive velocity change for the next [`integrate`].
    /// Multiple calls in the same tick sum.
    ///
    /// [`integrate`]: Body::integrate
    pub fn defer_velocity_delta(&mut self, delta: Vec2) {
        self.deferred_delta += delta;
    }

    /// Record an absolute velocity for the next [`integrate`], taking
    /// priority over the additive deltas.
    ///
    /// Multiple sets within one tick are summed together (two collisions
    /// assigning a velocity to the same body in the same tick add their
    /// assigned vectors), and deltas are still added on top.  Preserved
    /// quirk — see the module docs.
    ///
    /// [`integrate`]: Body::integrate
    pub fn defer_velocity_set(&mut self, vel: Vec2) {
        self.deferred_set = Some(self.deferred_set.unwrap_or(Vec2::ZERO) + vel);
    }

    /// Commit deferred updates, advance facing by spin (wrapped into
    /// `[0, 2π)`), then advance position by velocity.
    ///
    /// Stationary bodies still spin but discard deferred velocity and skip
    /// the position advance.  Dead bodies do nothing.  Returns whether
    /// position or facing visibly changed (dirty-draw hint; the core never
    /// relies on it).
    pub fn integrate(&mut self) -> bool {
        if !self.update {
            return false;
        }

        let delta = std::mem::replace(&mut self.deferred_delta, Vec2::ZERO);
        let set = self.deferred_set.take();
        if self.stationary {
            // anchored: deferred velocity is discarded, not banked
        } else if let Some(vel) = set {
            // absolute outcome wins; deltas ride on top unclamped, since
            // the collision math already respects the elasticity bounds
            self.set_velocity(vel + delta);
        } else if delta != Vec2::ZERO {
            self.apply_velocity(delta);
        }

        let old_facing = self.facing;
        self.facing = (self.facing + self.spin).rem_euclid(TAU);

        let mut moved = self.facing != old_facing;
        if !self.stationary && self.vel != Vec2::ZERO {
            self.pos += self.vel;
            moved = true;
        }
        moved
    }

    // ── Velocity primitives ──────────────────────────────────────────────────

    /// Add to velocity, clamping the resulting speed to `max_v` by scaling
    /// the new velocity back along its own heading.
    pub fn apply_velocity(&mut self, delta: Vec2) {
        let mut next = self.vel + delta;
        if next.length_squared() > self.max_v_squared {
            let angle = next.x.atan2(next.y);
            next = Vec2::new(angle.sin() * self.max_v, angle.cos() * self.max_v);
        }
        self.vel = next;
    }

    /// Overwrite velocity without clamping.  Collision outputs are expected
    /// to already respect the elasticity bounds — an accepted tradeoff, not
    /// an oversight.
    pub fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }

    /// Accelerate along `angle` with the given thrust, clamped by `max_v`.
    pub fn accelerate_along(&mut self, angle: f32, thrust: f32) {
        self.apply_velocity(Vec2::new(angle.cos() * thrust, angle.sin() * thrust));
    }

    /// Adjust spin, clamped to ±`max_spin`.
    pub fn inc_spin(&mut self, delta: f32) {
        if delta != 0.0 {
            self.spin = (self.spin + delta).clamp(-self.max_spin, self.max_spin);
        }
    }

    // ── Health ───────────────────────────────────────────────────────────────

    /// Reduce health.  On reaching zero the health is pinned at the −1
    /// sentinel and the body is marked dead exactly once; returns `true`
    /// only on that transition.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.died.is_some() {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = -1.0;
            self.die(DeathCause::Destroyed);
            return true;
        }
        false
    }

    /// Mark the body dead.  Idempotent: the first cause sticks.
    pub fn die(&mut self, cause: DeathCause) {
        if self.died.is_none() {
            self.died = Some(cause);
            self.update = false;
        }
    }

    // ── Relations ────────────────────────────────────────────────────────────
    //
    // Both relations are symmetric; the resolver is responsible for calling
    // both sides.  Insertions are idempotent.

    pub fn attach(&mut self, other: Entity) {
        self.attached.insert(other);
    }

    pub fn detach(&mut self, other: Entity) {
        self.attached.remove(&other);
    }

    pub fn is_attached_to(&self, other: Entity) -> bool {
        self.attached.contains(&other)
    }

    pub fn mark_colliding(&mut self, other: Entity) {
        self.colliding.insert(other);
    }

    pub fn clear_colliding(&mut self, other: Entity) {
        self.colliding.remove(&other);
    }

    pub fn is_colliding_with(&self, other: Entity) -> bool {
        self.colliding.contains(&other)
    }

    /// Ids this body is rigidly linked to (read-only view for presentation).
    pub fn attached_ids(&self) -> impl Iterator<Item = Entity> + '_ {
        self.attached.iter().copied()
    }

    /// Drop every relation involving a removed body.
    pub fn purge_relations(&mut self, removed: Entity) {
        self.attached.remove(&removed);
        self.colliding.remove(&removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    fn simple_body() -> Body {
        Body::new(&BodyParams {
            mass: 10.0,
            radius: 5.0,
            ..BodyParams::at(0.0, 0.0)
        })
    }

    // ── Construction ─────────────────────────────────────────────────────────

    #[test]
    #[should_panic(expected = "radius")]
    fn zero_radius_panics() {
        Body::new(&BodyParams {
            radius: 0.0,
            ..BodyParams::at(0.0, 0.0)
        });
    }

    #[test]
    #[should_panic(expected = "position")]
    fn missing_position_panics() {
        Body::new(&BodyParams::default());
    }

    #[test]
    fn defaults_follow_the_construction_contract() {
        let body = Body::new(&BodyParams::at(3.0, 4.0));
        assert_eq!(body.mass, 0.0);
        assert_eq!(body.radius, 1.0);
        assert_eq!(body.health, 100.0);
        assert_eq!(body.max_v, 2.0);
        assert!(body.update);
    }

    // ── Deferred updates ─────────────────────────────────────────────────────

    #[test]
    fn deltas_in_one_tick_sum() {
        let mut body = simple_body();
        body.defer_velocity_delta(Vec2::new(0.1, 0.0));
        body.defer_velocity_delta(Vec2::new(0.2, 0.3));
        body.integrate();
        assert!((body.vel - Vec2::new(0.3, 0.3)).length() < 1e-6);
    }

    #[test]
    fn set_takes_priority_and_deltas_ride_on_top() {
        let mut body = simple_body();
        body.vel = Vec2::new(1.0, 1.0);
        body.defer_velocity_set(Vec2::new(-1.0, 0.0));
        body.defer_velocity_delta(Vec2::new(0.1, 0.0));
        body.integrate();
        // prior velocity is discarded: (-1, 0) + (0.1, 0)
        assert!((body.vel - Vec2::new(-0.9, 0.0)).length() < 1e-6);
    }

    #[test]
    fn multiple_sets_in_one_tick_sum_not_overwrite() {
        let mut body = simple_body();
        body.defer_velocity_set(Vec2::new(1.0, 0.0));
        body.defer_velocity_set(Vec2::new(0.0, 1.0));
        body.integrate();
        assert!((body.vel - Vec2::new(1.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn deferred_buffer_drains_after_integrate() {
        let mut body = simple_body();
        body.defer_velocity_delta(Vec2::new(0.5, 0.0));
        body.integrate();
        let vel_after_first = body.vel;
        body.integrate();
        assert_eq!(body.vel, vel_after_first, "buffer must not re-apply");
    }

    #[test]
    fn stationary_discards_deferred_but_still_spins() {
        let mut body = Body::new(&BodyParams {
            stationary: true,
            spin: 0.05,
            mass: 5.0,
            radius: 10.0,
            ..BodyParams::at(50.0, 50.0)
        });
        body.defer_velocity_delta(Vec2::new(1.0, 0.0));
        body.integrate();
        assert_eq!(body.vel, Vec2::ZERO, "anchored body must not pick up velocity");
        assert_eq!(body.pos, Vec2::new(50.0, 50.0));
        assert!(body.facing > 0.0, "anchored body still rotates");
    }

    #[test]
    fn dead_body_does_not_integrate() {
        let mut body = simple_body();
        body.vel = Vec2::new(1.0, 0.0);
        body.die(DeathCause::Expired);
        assert!(!body.integrate());
        assert_eq!(body.pos, Vec2::ZERO);
    }

    // ── Velocity primitives ──────────────────────────────────────────────────

    #[test]
    fn apply_velocity_clamps_speed_preserving_heading() {
        let mut body = simple_body();
        body.apply_velocity(Vec2::new(30.0, 40.0));
        let speed = body.vel.length();
        assert!((speed - body.max_v).abs() < 1e-4, "speed {speed} != max_v");
        // heading preserved: still pointing into the (+,+) quadrant at 3:4
        assert!((body.vel.y / body.vel.x - 40.0 / 30.0).abs() < 1e-4);
    }

    #[test]
    fn set_velocity_does_not_clamp() {
        let mut body = simple_body();
        body.set_velocity(Vec2::new(100.0, 0.0));
        assert_eq!(body.vel.x, 100.0);
    }

    #[test]
    fn facing_wraps_into_one_turn() {
        let mut body = simple_body();
        body.facing = TAU - 0.05;
        body.spin = 0.1;
        body.integrate();
        assert!(body.facing >= 0.0 && body.facing < TAU);
        assert!((body.facing - 0.05).abs() < 1e-5);
    }

    #[test]
    fn inc_spin_clamps_at_max() {
        let mut body = simple_body();
        for _ in 0..1000 {
            body.inc_spin(0.01);
        }
        assert!((body.spin - body.max_spin).abs() < 1e-6);
    }

    // ── Health ───────────────────────────────────────────────────────────────

    #[test]
    fn lethal_damage_dies_exactly_once_with_sentinel_health() {
        let mut body = simple_body();
        body.health = 10.0;
        assert!(body.take_damage(15.0), "first lethal hit reports death");
        assert_eq!(body.health, -1.0);
        assert_eq!(body.died, Some(DeathCause::Destroyed));
        assert!(!body.update);
        assert!(!body.take_damage(5.0), "subsequent damage is a no-op");
        assert_eq!(body.health, -1.0);
    }

    #[test]
    fn nonlethal_damage_just_reduces_health() {
        let mut body = simple_body();
        assert!(!body.take_damage(30.0));
        assert_eq!(body.health, 70.0);
        assert!(body.died.is_none());
    }

    // ── Relations ────────────────────────────────────────────────────────────

    #[test]
    fn attach_is_idempotent() {
        let entities = test_entities(1);
        let mut body = simple_body();
        body.attach(entities[0]);
        body.attach(entities[0]);
        assert!(body.is_attached_to(entities[0]));
        body.detach(entities[0]);
        assert!(!body.is_attached_to(entities[0]));
    }

    #[test]
    fn purge_relations_clears_both_sets() {
        let entities = test_entities(2);
        let mut body = simple_body();
        body.attach(entities[0]);
        body.mark_colliding(entities[0]);
        body.mark_colliding(entities[1]);
        body.purge_relations(entities[0]);
        assert!(!body.is_attached_to(entities[0]));
        assert!(!body.is_colliding_with(entities[0]));
        assert!(body.is_colliding_with(entities[1]), "other relations survive");
    }
}
