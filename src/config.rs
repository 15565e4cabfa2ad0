//! Runtime physics configuration loaded from `assets/physics.toml`.
//!
//! [`PhysicsConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_physics_config`] reads
//! `assets/physics.toml` and overwrites the defaults with any values present
//! in the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the constants you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<PhysicsConfig>` to any system parameter list and read
//! values with `config.gravity_const`, `config.elasticity`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the authoritative default
//! source used by `PhysicsConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable physics and gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset by setting the value in
/// `assets/physics.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    // ── Gravity ──────────────────────────────────────────────────────────────
    pub gravity_const: f32,
    pub max_accel: f32,
    pub negligible_accel: f32,
    pub gravity_cache_epsilon: f32,

    // ── Collision & Attachment ───────────────────────────────────────────────
    pub elasticity: f32,
    pub attach_threshold: f32,
    pub detach_threshold: f32,
    pub overlap_noise: f32,
    pub push_apart_factor: f32,
    pub attach_push_factor: f32,

    // ── Ships ────────────────────────────────────────────────────────────────
    pub thrust_increment: f32,
    pub spin_increment: f32,
    pub spin_decay: f32,
    pub drag_per_tick: f32,
    pub shield_max: f32,
    pub shield_regen_interval: u32,
    pub shield_regen_amount: f32,
    pub landing_speed_threshold: f32,
    pub landing_angle_tolerance: f32,

    // ── Weapons ──────────────────────────────────────────────────────────────
    pub bullet_speed: f32,
    pub bullet_ttl_ticks: u32,
    pub bullet_fade_ticks: u32,
    pub bullet_explode_ticks: u32,
    pub fire_cooldown_ticks: u32,
    pub spray_ammo: u32,

    // ── World bounds ─────────────────────────────────────────────────────────
    pub oob_kill_margin: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            // Gravity
            gravity_const: GRAVITY_CONST,
            max_accel: MAX_ACCEL,
            negligible_accel: NEGLIGIBLE_ACCEL,
            gravity_cache_epsilon: GRAVITY_CACHE_EPSILON,
            // Collision & Attachment
            elasticity: ELASTICITY,
            attach_threshold: ATTACH_THRESHOLD,
            detach_threshold: DETACH_THRESHOLD,
            overlap_noise: OVERLAP_NOISE,
            push_apart_factor: PUSH_APART_FACTOR,
            attach_push_factor: ATTACH_PUSH_FACTOR,
            // Ships
            thrust_increment: THRUST_INCREMENT,
            spin_increment: SPIN_INCREMENT,
            spin_decay: SPIN_DECAY,
            drag_per_tick: DRAG_PER_TICK,
            shield_max: SHIELD_MAX,
            shield_regen_interval: SHIELD_REGEN_INTERVAL,
            shield_regen_amount: SHIELD_REGEN_AMOUNT,
            landing_speed_threshold: LANDING_SPEED_THRESHOLD,
            landing_angle_tolerance: LANDING_ANGLE_TOLERANCE,
            // Weapons
            bullet_speed: BULLET_SPEED,
            bullet_ttl_ticks: BULLET_TTL_TICKS,
            bullet_fade_ticks: BULLET_FADE_TICKS,
            bullet_explode_ticks: BULLET_EXPLODE_TICKS,
            fire_cooldown_ticks: FIRE_COOLDOWN_TICKS,
            spray_ammo: SPRAY_AMMO,
            // World bounds
            oob_kill_margin: OOB_KILL_MARGIN,
        }
    }
}

/// Startup system: attempt to load `assets/physics.toml` and overwrite the
/// `PhysicsConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are
/// printed to stderr but do not abort the simulation.  A missing file is
/// silently ignored (defaults are already in place from `init_resource`).
pub fn load_physics_config(mut config: ResMut<PhysicsConfig>) {
    let path = "assets/physics.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<PhysicsConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded physics config from {path}");
            }
            Err(e) => {
                eprintln!("⚠ Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            println!("ℹ No {path} found; using compiled defaults");
        }
    }
}
