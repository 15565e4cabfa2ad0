//! Centralised physics and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! Every constant is mirrored by a field on [`crate::config::PhysicsConfig`],
//! which can override it at startup from `assets/physics.toml`.

use std::f32::consts::PI;

/// Logical duration of one simulation tick in milliseconds.
///
/// The simulation itself is clocked in ticks, not wall time; this is only
/// the pace at which the demo binary steps the app.
pub const TICK_MILLIS: u64 = 10;

// ── Physics: Gravity ──────────────────────────────────────────────────────────

/// Inverse-square gravity strength constant.
///
/// Acceleration exerted on a body by a partner of mass `m` at distance `d`
/// is `G·m/d²`.  Higher values pull the field together faster; values above
/// ~5.0 cause runaway acceleration between touching-scale bodies.
pub const GRAVITY_CONST: f32 = 1.0;

/// Upper bound on the gravitational acceleration applied per body per tick.
///
/// Without the cap, close passes between heavy bodies produce kicks large
/// enough to tunnel straight through the contact test.
pub const MAX_ACCEL: f32 = 1.0;

/// Gravitational accelerations below this magnitude are skipped entirely.
///
/// Saves the deferred-buffer traffic for far-apart pairs whose pull would
/// vanish in float rounding anyway.
pub const NEGLIGIBLE_ACCEL: f32 = 1e-6;

/// Maximum separation-vector drift (world units) under which the cached
/// per-pair gravity vector is reused instead of recomputed.
///
/// Pairs that barely move between ticks (orbiting clusters, parked ships)
/// skip the divide + atan2 work.  Set to 0.0 to disable the shortcut.
pub const GRAVITY_CACHE_EPSILON: f32 = 0.01;

// ── Physics: Collision & Attachment ───────────────────────────────────────────

/// Restitution coefficient applied to the normal-axis outputs of the
/// elastic-collision formula.
///
/// 1.0 conserves plane kinetic energy; lower values make every bounce lossy.
pub const ELASTICITY: f32 = 0.7;

/// Relative closing speed (units/tick) below which a fresh contact attaches
/// the two bodies instead of bouncing them.
///
/// This is a *speed*: attachment forms from gentle contact (ship landings,
/// asteroids clumping).
pub const ATTACH_THRESHOLD: f32 = 0.01;

/// Gap distance (world units) beyond which an attached pair detaches.
///
/// Deliberately a *distance*, not a speed: attachment is broken by physical
/// separation, however slowly it happens.
pub const DETACH_THRESHOLD: f32 = 0.02;

/// Overlap depth below which attached bodies receive no corrective push.
///
/// Keeps the attachment from fighting its own contact jitter.
pub const OVERLAP_NOISE: f32 = 0.1;

/// Strength of the push-apart acceleration applied to an ongoing
/// (already-collided) overlap, scaled by depth and inverse mass.
pub const PUSH_APART_FACTOR: f32 = 0.5;

/// Strength of the gentler corrective push used for attached bodies that
/// have interpenetrated past [`OVERLAP_NOISE`].
pub const ATTACH_PUSH_FACTOR: f32 = 0.1;

// ── Body defaults ─────────────────────────────────────────────────────────────

/// Default body mass.  Mass 0 means the body neither exerts nor receives
/// gravity (it can still collide and take damage).
pub const DEFAULT_MASS: f32 = 0.0;

/// Default body radius (world units).  Radii must be strictly positive.
pub const DEFAULT_RADIUS: f32 = 1.0;

/// Default starting health.
pub const DEFAULT_HEALTH: f32 = 100.0;

/// Default speed cap (units/tick) enforced by additive velocity changes.
pub const DEFAULT_MAX_V: f32 = 2.0;

/// Default thrust ceiling for self-propelled bodies.
pub const DEFAULT_MAX_THRUST: f32 = 0.5;

/// Default spin-rate clamp (radians/tick), ±10° per tick.
pub const DEFAULT_MAX_SPIN: f32 = 10.0 * PI / 180.0;

// ── Ships ─────────────────────────────────────────────────────────────────────

/// Ship hull mass.
pub const SHIP_MASS: f32 = 10.0;

/// Ship collision radius.
pub const SHIP_RADIUS: f32 = 7.0;

/// Contact damage a ship deals, scaled by impact speed on collision.
pub const SHIP_DAMAGE: f32 = 2.0;

/// Ship spin-rate clamp (radians/tick), tighter than the generic default.
pub const SHIP_MAX_SPIN: f32 = 6.0 * PI / 180.0;

/// Thrust gained per tick while the thrust intent is held.
pub const THRUST_INCREMENT: f32 = 0.01;

/// Spin added per tick while a spin intent is held (radians/tick).
pub const SPIN_INCREMENT: f32 = 0.1 * PI / 180.0;

/// Spin shed per tick once both spin intents are released (radians/tick).
pub const SPIN_DECAY: f32 = 0.2 * PI / 180.0;

/// Velocity shed per tick per axis while coasting (no thrust intent).
/// Also the cutoff below which drag snaps the component to zero.
pub const DRAG_PER_TICK: f32 = 0.001;

/// Shield capacity.  The shield absorbs damage before the hull does.
pub const SHIELD_MAX: f32 = 100.0;

/// Ticks between shield regeneration steps.
pub const SHIELD_REGEN_INTERVAL: u32 = 50;

/// Shield points restored per regeneration step.
pub const SHIELD_REGEN_AMOUNT: f32 = 1.0;

/// Impact speed below which a planet contact counts as a landing attempt.
pub const LANDING_SPEED_THRESHOLD: f32 = 0.3;

/// Maximum angle (radians) between the ship's facing and the outward
/// contact normal for a landing to be undamaged (tail-down touchdown).
pub const LANDING_ANGLE_TOLERANCE: f32 = 30.0 * PI / 180.0;

// ── Weapons ───────────────────────────────────────────────────────────────────

/// Bullet mass.  Heavy enough to exchange momentum, light enough that a
/// volley cannot shove a planetoid around.
pub const BULLET_MASS: f32 = 0.01;

/// Bullet collision radius.
pub const BULLET_RADIUS: f32 = 1.0;

/// Fixed damage a bullet deals on impact (not scaled by impact speed).
pub const BULLET_DAMAGE: f32 = 5.0;

/// Muzzle speed added along the ship's facing on top of the ship velocity.
pub const BULLET_SPEED: f32 = 1.5;

/// Bullet lifetime in ticks before it starts fading out.
pub const BULLET_TTL_TICKS: u32 = 250;

/// Duration of the fade-out in ticks.  A fading bullet still flies and
/// still hits.
pub const BULLET_FADE_TICKS: u32 = 100;

/// Ticks a detonated bullet lingers (frozen, non-interacting) before
/// removal — presentation breathing room for the explosion.
pub const BULLET_EXPLODE_TICKS: u32 = 25;

/// Minimum ticks between shots while the fire intent is held.
pub const FIRE_COOLDOWN_TICKS: u32 = 15;

/// Angular offsets (radians) of the spray weapon's projectiles.
/// One volley consumes a single unit of ammo regardless of count.
pub const SPRAY_OFFSETS: [f32; 3] = [-10.0 * PI / 180.0, 0.0, 10.0 * PI / 180.0];

/// Spray-weapon ammo a ship starts with.
pub const SPRAY_AMMO: u32 = 50;

// ── World bounds ──────────────────────────────────────────────────────────────

/// Default play-field width (world units).
pub const LEVEL_MAX_X: f32 = 1000.0;

/// Default play-field height (world units).
pub const LEVEL_MAX_Y: f32 = 700.0;

/// Distance past a non-wrapping edge at which expendable bodies
/// (asteroids, weapons) are killed rather than pushed back.
pub const OOB_KILL_MARGIN: f32 = 50.0;
