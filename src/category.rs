//! Body categories and their collision responses.
//!
//! Every body carries exactly one [`Category`]; category-specific behavior
//! (attachability, damage scaling, shields, projectile detonation) lives
//! behind the [`CollisionResponse`] trait so the pair resolver stays
//! category-agnostic.

use crate::body::Body;
use crate::config::PhysicsConfig;
use crate::ship::{ShipState, Weapon};
use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

/// What kind of thing a body is.  Same physics for all of them; the
/// differences live in [`CollisionResponse`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Ship,
    Planet,
    Asteroid,
    Weapon,
}

/// Contact facts handed to one side of a collision.
#[derive(Debug, Clone, Copy)]
pub struct CollisionDetails {
    /// Closing speed along the collision axis, measured before any
    /// elasticity damping.
    pub impact_speed: f32,
    /// Outward normal at the contact, pointing from the *other* body
    /// toward this one.  Ships compare it to their facing when deciding
    /// whether a planet contact counts as a landing.
    pub normal_angle: f32,
    /// This side's own velocity rotated into the collision frame:
    /// `x` along the collision axis, `y` tangential to it.  Available to
    /// category responses that care about approach geometry beyond the
    /// closing speed.
    pub plane_vel: Vec2,
}

/// Everything the responses may touch on one side of a contact.  The
/// optional components are present only for the categories that carry
/// them (ships, weapons).
pub struct SideMut<'a> {
    pub entity: Entity,
    pub body: &'a mut Body,
    pub category: Category,
    pub ship: Option<&'a mut ShipState>,
    pub weapon: Option<&'a mut Weapon>,
}

/// Category-specific collision behavior.  Implementations are stateless
/// unit structs; per-body state lives on the components inside [`SideMut`].
pub trait CollisionResponse: Send + Sync {
    /// Whether this category will stick to `other` on a gentle contact.
    /// Projectiles never attach, and nothing attaches to them.
    fn can_attach_to(&self, other: Category) -> bool {
        other != Category::Weapon
    }

    /// Damage this body deals to the other side.  The default scales the
    /// body's damage rating by impact speed, rounded up so even the
    /// gentlest real hit chips at least one point.
    fn damage_dealt(&self, me: &Body, _other: Category, details: &CollisionDetails) -> f32 {
        (me.damage * details.impact_speed).ceil()
    }

    /// Filter incoming damage; returns the amount that actually reaches
    /// the hull.  The default passes everything through.
    fn absorb_damage(
        &self,
        _ctx: &mut SideMut,
        _from: Category,
        amount: f32,
        _details: &CollisionDetails,
        _config: &PhysicsConfig,
    ) -> f32 {
        amount
    }

    /// Post-contact hook, fired after damage exchange on every fresh
    /// contact (including gentle contacts that attached).
    fn on_collided(
        &self,
        _ctx: &mut SideMut,
        _other: Category,
        _details: &CollisionDetails,
        _config: &PhysicsConfig,
    ) {
    }
}

/// Absolute angular distance between two angles, wrapped into `[0, π]`.
pub fn angle_distance(a: f32, b: f32) -> f32 {
    ((a - b + PI).rem_euclid(TAU) - PI).abs()
}

struct ShipResponse;
struct PlanetResponse;
struct AsteroidResponse;
struct WeaponResponse;

impl CollisionResponse for ShipResponse {
    /// Ships soak damage with their shield first.  A slow planet contact
    /// with the nose pointed along the surface normal is a landing and
    /// deals no damage at all.
    fn absorb_damage(
        &self,
        ctx: &mut SideMut,
        from: Category,
        amount: f32,
        details: &CollisionDetails,
        config: &PhysicsConfig,
    ) -> f32 {
        if from == Category::Planet
            && details.impact_speed < config.landing_speed_threshold
            && angle_distance(ctx.body.facing, details.normal_angle)
                <= config.landing_angle_tolerance
        {
            return 0.0;
        }
        let Some(ship) = ctx.ship.as_deref_mut() else {
            return amount;
        };
        if !ship.shield_active {
            return amount;
        }
        if ship.shield >= amount {
            ship.shield -= amount;
            0.0
        } else {
            let excess = amount - ship.shield;
            ship.shield = 0.0;
            ship.shield_active = false;
            excess
        }
    }
}

impl CollisionResponse for PlanetResponse {
    /// Planets are scenery-grade: they shrug off everything.
    fn absorb_damage(
        &self,
        _ctx: &mut SideMut,
        _from: Category,
        _amount: f32,
        _details: &CollisionDetails,
        _config: &PhysicsConfig,
    ) -> f32 {
        0.0
    }
}

impl CollisionResponse for AsteroidResponse {
    /// Asteroid-on-asteroid contacts trade momentum but not damage, so a
    /// dense field does not grind itself to dust.
    fn damage_dealt(&self, me: &Body, other: Category, details: &CollisionDetails) -> f32 {
        if other == Category::Asteroid {
            0.0
        } else {
            (me.damage * details.impact_speed).ceil()
        }
    }
}

impl CollisionResponse for WeaponResponse {
    fn can_attach_to(&self, _other: Category) -> bool {
        false
    }

    /// Projectiles deal their flat damage regardless of closing speed.
    fn damage_dealt(&self, me: &Body, _other: Category, _details: &CollisionDetails) -> f32 {
        me.damage
    }

    /// Projectiles never take collision damage; they detonate instead.
    fn absorb_damage(
        &self,
        _ctx: &mut SideMut,
        _from: Category,
        _amount: f32,
        _details: &CollisionDetails,
        _config: &PhysicsConfig,
    ) -> f32 {
        0.0
    }

    /// Detonate on first contact: leave the physics set immediately and
    /// linger visually for the explosion window before expiring.
    fn on_collided(
        &self,
        ctx: &mut SideMut,
        _other: Category,
        _details: &CollisionDetails,
        config: &PhysicsConfig,
    ) {
        ctx.body.update = false;
        if let Some(weapon) = ctx.weapon.as_deref_mut() {
            if weapon.exploding.is_none() {
                weapon.exploding = Some(config.bullet_explode_ticks);
            }
        }
    }
}

static SHIP_RESPONSE: ShipResponse = ShipResponse;
static PLANET_RESPONSE: PlanetResponse = PlanetResponse;
static ASTEROID_RESPONSE: AsteroidResponse = AsteroidResponse;
static WEAPON_RESPONSE: WeaponResponse = WeaponResponse;

/// Look up the response for a category.
pub fn response(category: Category) -> &'static dyn CollisionResponse {
    match category {
        Category::Ship => &SHIP_RESPONSE,
        Category::Planet => &PLANET_RESPONSE,
        Category::Asteroid => &ASTEROID_RESPONSE,
        Category::Weapon => &WEAPON_RESPONSE,
    }
}
