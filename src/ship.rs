//! Ship control and weaponry: intent-driven thrust/spin ramps, drag,
//! shield regeneration, firing, and projectile lifetime.

use crate::body::{Body, DeathCause};
use crate::config::PhysicsConfig;
use crate::constants::SPRAY_OFFSETS;
use crate::simulation::{GameState, SpawnQueue, SpawnRequest};
use bevy::prelude::*;
use std::f32::consts::PI;

/// Control inputs held down this tick.  The outer surface (input layer,
/// network, AI) writes these; the control system reads them.
#[derive(Component, Debug, Clone, Default)]
pub struct ActiveIntents {
    pub thrusting: bool,
    pub braking: bool,
    pub spin_cw: bool,
    pub spin_ccw: bool,
    pub firing: bool,
}

/// Which firing pattern the ship's weapon uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponKind {
    /// One bullet straight along the facing.
    Single,
    /// A three-bullet fan, limited by ammo; reverts to [`Single`] when
    /// the ammo runs out.
    ///
    /// [`Single`]: WeaponKind::Single
    Spray,
}

/// Per-ship combat state, alongside the ship's [`Body`].
#[derive(Component, Debug, Clone)]
pub struct ShipState {
    pub shield: f32,
    /// A depleted shield stops absorbing until regeneration brings it
    /// back above zero.
    pub shield_active: bool,
    pub fire_cooldown: u32,
    pub weapon: WeaponKind,
    pub spray_ammo: u32,
    regen_tick: u32,
}

impl ShipState {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            shield: config.shield_max,
            shield_active: true,
            fire_cooldown: 0,
            weapon: WeaponKind::Single,
            spray_ammo: config.spray_ammo,
            regen_tick: 0,
        }
    }

    /// Advance shield regeneration by one tick.
    pub fn tick_regen(&mut self, config: &PhysicsConfig) {
        self.regen_tick += 1;
        if self.regen_tick < config.shield_regen_interval {
            return;
        }
        self.regen_tick = 0;
        if self.shield < config.shield_max {
            self.shield = (self.shield + config.shield_regen_amount).min(config.shield_max);
        }
        if self.shield > 0.0 {
            self.shield_active = true;
        }
    }
}

/// Marks the player's ship; its death ends the run.
#[derive(Component, Debug, Default)]
pub struct Player;

/// Projectile bookkeeping, alongside the projectile's [`Body`].
#[derive(Component, Debug, Clone)]
pub struct Weapon {
    /// The firing ship; the pair loop never collides a projectile with
    /// its owner.
    pub owner: Option<Entity>,
    /// Full-strength flight time remaining, in ticks.
    pub ttl: u32,
    /// Fade-out countdown once the TTL is spent.
    pub fading: Option<u32>,
    /// Explosion linger countdown after a detonation.
    pub exploding: Option<u32>,
}

impl Weapon {
    pub fn new(owner: Option<Entity>, config: &PhysicsConfig) -> Self {
        Self {
            owner,
            ttl: config.bullet_ttl_ticks,
            fading: None,
            exploding: None,
        }
    }

    /// Advance the lifetime state machine one tick: flight, then fade,
    /// then expiry; an explosion preempts both.
    pub fn tick(&mut self, body: &mut Body, config: &PhysicsConfig) {
        if let Some(remaining) = self.exploding {
            if remaining <= 1 {
                body.die(DeathCause::Expired);
            } else {
                self.exploding = Some(remaining - 1);
            }
        } else if let Some(remaining) = self.fading {
            if remaining <= 1 {
                body.die(DeathCause::Expired);
            } else {
                self.fading = Some(remaining - 1);
            }
        } else if self.ttl > 1 {
            self.ttl -= 1;
        } else {
            self.ttl = 0;
            self.fading = Some(config.bullet_fade_ticks);
        }
    }
}

/// Apply held intents to each ship: thrust and brake ramps, drag when
/// coasting, spin ramp and decay, and shield regeneration.
pub fn ship_control_system(
    state: Res<GameState>,
    config: Res<PhysicsConfig>,
    mut ships: Query<(&ActiveIntents, &mut Body, &mut ShipState)>,
) {
    if state.game_over {
        return;
    }
    for (intents, mut body, mut ship) in ships.iter_mut() {
        if !body.update {
            continue;
        }

        if intents.thrusting {
            body.thrust = (body.thrust + config.thrust_increment).min(body.max_thrust);
            let (facing, thrust) = (body.facing, body.thrust);
            body.accelerate_along(facing, thrust);
        } else if intents.braking && body.vel != Vec2::ZERO {
            // brake by thrusting against the current heading, snapping to
            // a dead stop instead of overshooting into reverse
            body.thrust = (body.thrust + config.thrust_increment).min(body.max_thrust);
            let speed = body.vel.length();
            if body.thrust >= speed {
                body.set_velocity(Vec2::ZERO);
                body.thrust = 0.0;
            } else {
                let retro = body.vel.y.atan2(body.vel.x) + PI;
                let thrust = body.thrust;
                body.accelerate_along(retro, thrust);
            }
        } else {
            body.thrust = 0.0;
            body.vel = drag_toward_zero(body.vel, config.drag_per_tick);
        }

        if intents.spin_ccw && !intents.spin_cw {
            body.inc_spin(config.spin_increment);
        } else if intents.spin_cw && !intents.spin_ccw {
            body.inc_spin(-config.spin_increment);
        } else if body.spin != 0.0 {
            body.spin = decay_toward_zero(body.spin, config.spin_decay);
        }

        ship.tick_regen(&config);
    }
}

/// Spawn projectiles for ships holding the fire intent, respecting the
/// per-ship cooldown.
pub fn weapon_fire_system(
    state: Res<GameState>,
    config: Res<PhysicsConfig>,
    mut queue: ResMut<SpawnQueue>,
    mut ships: Query<(Entity, &ActiveIntents, &Body, &mut ShipState)>,
) {
    if state.game_over {
        return;
    }
    for (entity, intents, body, mut ship) in ships.iter_mut() {
        ship.fire_cooldown = ship.fire_cooldown.saturating_sub(1);
        if !intents.firing || ship.fire_cooldown > 0 || !body.update {
            continue;
        }
        ship.fire_cooldown = config.fire_cooldown_ticks;

        match ship.weapon {
            WeaponKind::Single => {
                queue.push(bullet_request(entity, body, body.facing, &config));
            }
            WeaponKind::Spray => {
                for offset in SPRAY_OFFSETS {
                    queue.push(bullet_request(entity, body, body.facing + offset, &config));
                }
                ship.spray_ammo = ship.spray_ammo.saturating_sub(1);
                if ship.spray_ammo == 0 {
                    ship.weapon = WeaponKind::Single;
                }
            }
        }
    }
}

fn bullet_request(owner: Entity, body: &Body, facing: f32, config: &PhysicsConfig) -> SpawnRequest {
    let dir = Vec2::new(facing.cos(), facing.sin());
    // muzzle sits past the hull so the round starts clear of the ship and,
    // for a spray fan, clear of the neighbouring rounds
    let muzzle = body.pos + dir * (body.radius + 5.0);
    SpawnRequest::weapon(
        crate::body::BodyParams::bullet(
            muzzle.x,
            muzzle.y,
            facing,
            body.vel.x + dir.x * config.bullet_speed,
            body.vel.y + dir.y * config.bullet_speed,
        ),
        Some(owner),
    )
}

/// Advance every projectile's lifetime.
pub fn weapon_ttl_system(
    state: Res<GameState>,
    config: Res<PhysicsConfig>,
    mut weapons: Query<(&mut Body, &mut Weapon)>,
) {
    if state.game_over {
        return;
    }
    for (mut body, mut weapon) in weapons.iter_mut() {
        if body.died.is_some() {
            continue;
        }
        weapon.tick(&mut body, &config);
    }
}

fn drag_toward_zero(vel: Vec2, drag: f32) -> Vec2 {
    Vec2::new(axis_drag(vel.x, drag), axis_drag(vel.y, drag))
}

fn axis_drag(v: f32, drag: f32) -> f32 {
    if v.abs() <= drag {
        0.0
    } else {
        v - drag * v.signum()
    }
}

fn decay_toward_zero(spin: f32, decay: f32) -> f32 {
    if spin.abs() <= decay {
        0.0
    } else {
        spin - decay * spin.signum()
    }
}
