//! First-touch contact resolution: rotated-frame elastic bounce,
//! gentle-contact attachment, and the two-way damage exchange.
//!
//! The resolver calls [`fresh_contact`] exactly once per new overlap; the
//! colliding marks it leaves behind stop the same overlap from resolving
//! again on subsequent ticks while the bodies are still separating.

use crate::body::Body;
use crate::category::{response, CollisionDetails, SideMut};
use crate::config::PhysicsConfig;
use crate::pair_cache::PairConstants;
use bevy::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// A body's velocity rotated into the collision frame: `along` on the
/// collision axis, `tangent` perpendicular to it.
#[derive(Debug, Clone, Copy)]
struct FrameVel {
    along: f32,
    tangent: f32,
}

fn into_frame(vel: Vec2, collision_angle: f32) -> FrameVel {
    let mag = vel.length();
    let dir = vel.y.atan2(vel.x);
    FrameVel {
        along: mag * (dir - collision_angle).cos(),
        tangent: mag * (dir - collision_angle).sin(),
    }
}

fn out_of_frame(frame: FrameVel, collision_angle: f32) -> Vec2 {
    let tangent_angle = collision_angle + FRAC_PI_2;
    Vec2::new(
        collision_angle.cos() * frame.along + tangent_angle.cos() * frame.tangent,
        collision_angle.sin() * frame.along + tangent_angle.sin() * frame.tangent,
    )
}

/// Resolve a contact between two bodies seen touching for the first time
/// this tick.
///
/// Momentum is exchanged along the collision axis only (1D elastic
/// collision in the rotated frame) with elasticity damping applied to the
/// along-axis outputs; tangential motion passes through untouched.  A
/// closing speed below the attach threshold between mutually attachable
/// categories skips the bounce and rigidly links the pair instead.
/// Damage flows both ways in every branch, measured on the undamped
/// closing speed.
pub fn fresh_contact(
    a: &mut SideMut,
    b: &mut SideMut,
    consts: &PairConstants,
    config: &PhysicsConfig,
) {
    // attached pairs ride together; their continued overlap is not a hit
    if a.body.is_attached_to(b.entity) {
        return;
    }

    let sep = a.body.pos - b.body.pos;
    // coincident centers get an arbitrary but deterministic axis
    let collision_angle = if sep == Vec2::ZERO {
        0.0
    } else {
        sep.y.atan2(sep.x)
    };

    let fa = into_frame(a.body.vel, collision_angle);
    let fb = into_frame(b.body.vel, collision_angle);
    let impact_speed = (fa.along - fb.along).abs();

    let massless = a.body.mass == 0.0 || b.body.mass == 0.0;
    let attachable = impact_speed < config.attach_threshold
        && response(a.category).can_attach_to(b.category)
        && response(b.category).can_attach_to(a.category);

    if massless {
        // no momentum to trade; mark the overlap so it resolves once
        a.body.mark_colliding(b.entity);
        b.body.mark_colliding(a.entity);
    } else if attachable {
        a.body.attach(b.entity);
        b.body.attach(a.entity);
    } else {
        let mass_delta = consts.mass_delta_for(a.entity <= b.entity);
        let mass_a = (consts.combined_mass + mass_delta) / 2.0;
        let mass_b = (consts.combined_mass - mass_delta) / 2.0;

        let final_a = (mass_delta * fa.along + 2.0 * mass_b * fb.along) / consts.combined_mass
            * config.elasticity;
        let final_b = (-mass_delta * fb.along + 2.0 * mass_a * fa.along) / consts.combined_mass
            * config.elasticity;

        if !a.body.stationary {
            a.body.defer_velocity_set(out_of_frame(
                FrameVel {
                    along: final_a,
                    tangent: fa.tangent,
                },
                collision_angle,
            ));
        }
        if !b.body.stationary {
            b.body.defer_velocity_set(out_of_frame(
                FrameVel {
                    along: final_b,
                    tangent: fb.tangent,
                },
                collision_angle,
            ));
        }
        a.body.mark_colliding(b.entity);
        b.body.mark_colliding(a.entity);
    }

    // sep points from b toward a, so it is a's outward normal
    let details_a = CollisionDetails {
        impact_speed,
        normal_angle: collision_angle.rem_euclid(TAU),
        plane_vel: Vec2::new(fa.along, fa.tangent),
    };
    let details_b = CollisionDetails {
        impact_speed,
        normal_angle: (collision_angle + PI).rem_euclid(TAU),
        plane_vel: Vec2::new(fb.along, fb.tangent),
    };

    exchange_damage(a, b, &details_b, config);
    exchange_damage(b, a, &details_a, config);

    response(a.category).on_collided(a, b.category, &details_a, config);
    response(b.category).on_collided(b, a.category, &details_b, config);
}

/// One direction of the damage exchange: `from` deals, `to` filters and
/// takes the remainder.
fn exchange_damage(
    from: &mut SideMut,
    to: &mut SideMut,
    details_to: &CollisionDetails,
    config: &PhysicsConfig,
) {
    let dealt = response(from.category).damage_dealt(from.body, to.category, details_to);
    if dealt <= 0.0 {
        return;
    }
    let net = response(to.category).absorb_damage(to, from.category, dealt, details_to, config);
    if net > 0.0 {
        to.body.take_damage(net);
    }
}

/// Post-bounce separation nudge for bodies still overlapping after a
/// resolved collision.  Pushes each movable, massive body away from the
/// other, scaled by overlap depth and inversely by mass.
pub fn push_apart(a: &mut Body, b: &mut Body, overlap: f32, factor: f32) {
    let sep = a.pos - b.pos;
    let away = if sep == Vec2::ZERO {
        Vec2::X
    } else {
        sep / sep.length()
    };
    if !a.stationary && a.mass > 0.0 {
        a.defer_velocity_delta(away * (factor * overlap / a.mass));
    }
    if !b.stationary && b.mass > 0.0 {
        b.defer_velocity_delta(-away * (factor * overlap / b.mass));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::BodyParams;
    use crate::category::Category;
    use crate::pair_cache::PairCache;

    struct Fixture {
        entities: Vec<Entity>,
        cache: PairCache,
    }

    fn fixture(specs: &[(f32, f32)]) -> Fixture {
        let mut world = World::new();
        let entities: Vec<Entity> = specs.iter().map(|_| world.spawn_empty().id()).collect();
        let mut cache = PairCache::default();
        for (i, &(mass, radius)) in specs.iter().enumerate() {
            let others: Vec<_> = specs[..i]
                .iter()
                .enumerate()
                .map(|(j, &(m, r))| (entities[j], m, r))
                .collect();
            cache.seed(entities[i], mass, radius, others);
        }
        Fixture { entities, cache }
    }

    fn plain_side<'a>(entity: Entity, body: &'a mut Body, category: Category) -> SideMut<'a> {
        SideMut {
            entity,
            body,
            category,
            ship: None,
            weapon: None,
        }
    }

    #[test]
    fn frame_decomposition_round_trips() {
        // velocity (1, 0.4) against a contact axis pointing along -x
        let frame = into_frame(Vec2::new(1.0, 0.4), PI);
        assert!((frame.along - -1.0).abs() < 1e-5, "axis component flips");
        assert!((frame.tangent - -0.4).abs() < 1e-5);
        let back = out_of_frame(frame, PI);
        assert!((back - Vec2::new(1.0, 0.4)).length() < 1e-5);
    }

    #[test]
    fn equal_mass_head_on_swaps_axis_velocities() {
        let mut config = PhysicsConfig::default();
        config.elasticity = 1.0;
        let mut fx = fixture(&[(10.0, 5.0), (10.0, 5.0)]);
        let mut body_a = Body::new(&BodyParams::asteroid(100.0, 100.0, 10.0, 5.0, 1.0, 0.0));
        let mut body_b = Body::new(&BodyParams::asteroid(109.0, 100.0, 10.0, 5.0, -1.0, 0.0));
        let consts = fx.cache.pair_mut(fx.entities[0], fx.entities[1]).unwrap();

        {
            let mut a = plain_side(fx.entities[0], &mut body_a, Category::Asteroid);
            let mut b = plain_side(fx.entities[1], &mut body_b, Category::Asteroid);
            fresh_contact(&mut a, &mut b, consts, &config);
        }
        body_a.integrate();
        body_b.integrate();

        assert!((body_a.vel - Vec2::new(-1.0, 0.0)).length() < 1e-4);
        assert!((body_b.vel - Vec2::new(1.0, 0.0)).length() < 1e-4);
        assert!(body_a.is_colliding_with(fx.entities[1]));
        assert!(body_b.is_colliding_with(fx.entities[0]));
    }

    #[test]
    fn momentum_is_conserved_for_unequal_masses_in_either_orientation() {
        let mut config = PhysicsConfig::default();
        config.elasticity = 1.0;

        // the side order handed to the resolver must not matter
        for swap_sides in [false, true] {
            let mut fx = fixture(&[(30.0, 5.0), (3.0, 5.0)]);
            let mut heavy = Body::new(&BodyParams::asteroid(100.0, 100.0, 30.0, 5.0, 1.0, 0.0));
            let mut light = Body::new(&BodyParams::asteroid(109.0, 100.0, 3.0, 5.0, -1.0, 0.0));
            let consts = fx.cache.pair_mut(fx.entities[0], fx.entities[1]).unwrap();

            {
                let mut side_h = plain_side(fx.entities[0], &mut heavy, Category::Asteroid);
                let mut side_l = plain_side(fx.entities[1], &mut light, Category::Asteroid);
                if swap_sides {
                    fresh_contact(&mut side_l, &mut side_h, consts, &config);
                } else {
                    fresh_contact(&mut side_h, &mut side_l, consts, &config);
                }
            }
            heavy.integrate();
            light.integrate();

            let momentum = 30.0 * heavy.vel.x + 3.0 * light.vel.x;
            assert!(
                (momentum - 27.0).abs() < 1e-3,
                "momentum {momentum} (swapped: {swap_sides})"
            );
            assert!(light.vel.x > 1.0, "light body is flung off");
        }
    }

    #[test]
    fn elasticity_damps_axis_speed_but_not_tangent() {
        let mut config = PhysicsConfig::default();
        config.elasticity = 0.5;
        let mut fx = fixture(&[(10.0, 5.0), (10.0, 5.0)]);
        // approach along x with a tangential y component on one side
        let mut body_a = Body::new(&BodyParams::asteroid(100.0, 100.0, 10.0, 5.0, 1.0, 0.4));
        let mut body_b = Body::new(&BodyParams::asteroid(109.0, 100.0, 10.0, 5.0, -1.0, 0.0));
        let consts = fx.cache.pair_mut(fx.entities[0], fx.entities[1]).unwrap();

        {
            let mut a = plain_side(fx.entities[0], &mut body_a, Category::Asteroid);
            let mut b = plain_side(fx.entities[1], &mut body_b, Category::Asteroid);
            fresh_contact(&mut a, &mut b, consts, &config);
        }
        body_a.integrate();
        body_b.integrate();

        assert!((body_a.vel.x - -0.5).abs() < 1e-4, "axis output damped");
        assert!((body_a.vel.y - 0.4).abs() < 1e-4, "tangent untouched");
        assert!((body_b.vel.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn gentle_contact_attaches_without_changing_velocity() {
        let config = PhysicsConfig::default();
        let mut fx = fixture(&[(10.0, 5.0), (10.0, 5.0)]);
        let closing = config.attach_threshold * 0.25;
        let mut body_a =
            Body::new(&BodyParams::asteroid(100.0, 100.0, 10.0, 5.0, closing, 0.0));
        let mut body_b = Body::new(&BodyParams::asteroid(109.0, 100.0, 10.0, 5.0, 0.0, 0.0));
        let consts = fx.cache.pair_mut(fx.entities[0], fx.entities[1]).unwrap();

        {
            let mut a = plain_side(fx.entities[0], &mut body_a, Category::Asteroid);
            let mut b = plain_side(fx.entities[1], &mut body_b, Category::Asteroid);
            fresh_contact(&mut a, &mut b, consts, &config);
        }
        let vel_a = body_a.vel;
        body_a.integrate();
        body_b.integrate();

        assert!(body_a.is_attached_to(fx.entities[1]));
        assert!(body_b.is_attached_to(fx.entities[0]));
        assert_eq!(body_a.vel, vel_a, "attach skips the bounce entirely");
        assert!(!body_a.is_colliding_with(fx.entities[1]));
    }

    #[test]
    fn attached_pair_ignores_repeat_contact() {
        let config = PhysicsConfig::default();
        let mut fx = fixture(&[(10.0, 5.0), (10.0, 5.0)]);
        let mut body_a = Body::new(&BodyParams::asteroid(100.0, 100.0, 10.0, 5.0, 1.0, 0.0));
        let mut body_b = Body::new(&BodyParams::asteroid(109.0, 100.0, 10.0, 5.0, -1.0, 0.0));
        body_a.attach(fx.entities[1]);
        body_b.attach(fx.entities[0]);
        let health_before = body_a.health;
        let consts = fx.cache.pair_mut(fx.entities[0], fx.entities[1]).unwrap();

        {
            let mut a = plain_side(fx.entities[0], &mut body_a, Category::Asteroid);
            let mut b = plain_side(fx.entities[1], &mut body_b, Category::Asteroid);
            fresh_contact(&mut a, &mut b, consts, &config);
        }
        body_a.integrate();

        assert_eq!(body_a.vel, Vec2::new(1.0, 0.0));
        assert_eq!(body_a.health, health_before);
    }

    #[test]
    fn massless_contact_skips_momentum_but_still_damages() {
        let config = PhysicsConfig::default();
        let mut fx = fixture(&[(0.0, 5.0), (10.0, 5.0)]);
        let mut body_a = Body::new(&BodyParams {
            damage: 4.0,
            ..BodyParams::asteroid(100.0, 100.0, 0.0, 5.0, 1.0, 0.0)
        });
        let mut body_b = Body::new(&BodyParams::asteroid(109.0, 100.0, 10.0, 5.0, -1.0, 0.0));
        let consts = fx.cache.pair_mut(fx.entities[0], fx.entities[1]).unwrap();

        {
            let mut a = plain_side(fx.entities[0], &mut body_a, Category::Ship);
            let mut b = plain_side(fx.entities[1], &mut body_b, Category::Asteroid);
            fresh_contact(&mut a, &mut b, consts, &config);
        }
        body_a.integrate();
        body_b.integrate();

        assert_eq!(body_a.vel, Vec2::new(1.0, 0.0), "no bounce on massless pair");
        assert_eq!(body_b.vel, Vec2::new(-1.0, 0.0));
        assert!(body_a.is_colliding_with(fx.entities[1]));
        // closing speed 2, ship deals ceil(4*2) = 8
        assert_eq!(body_b.health, 92.0);
    }

    #[test]
    fn coincident_centers_use_a_zero_axis() {
        let mut config = PhysicsConfig::default();
        config.elasticity = 1.0;
        let mut fx = fixture(&[(10.0, 5.0), (10.0, 5.0)]);
        let mut body_a = Body::new(&BodyParams::asteroid(100.0, 100.0, 10.0, 5.0, 1.0, 0.0));
        let mut body_b = Body::new(&BodyParams::asteroid(100.0, 100.0, 10.0, 5.0, -1.0, 0.0));
        let consts = fx.cache.pair_mut(fx.entities[0], fx.entities[1]).unwrap();

        {
            let mut a = plain_side(fx.entities[0], &mut body_a, Category::Asteroid);
            let mut b = plain_side(fx.entities[1], &mut body_b, Category::Asteroid);
            fresh_contact(&mut a, &mut b, consts, &config);
        }
        body_a.integrate();
        body_b.integrate();

        // axis defaults to +x, so the head-on pair still swaps
        assert!((body_a.vel - Vec2::new(-1.0, 0.0)).length() < 1e-4);
        assert!((body_b.vel - Vec2::new(1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn stationary_body_takes_no_bounce_velocity() {
        let config = PhysicsConfig::default();
        let mut fx = fixture(&[(10.0, 5.0), (100.0, 20.0)]);
        let mut body_a = Body::new(&BodyParams::asteroid(100.0, 100.0, 10.0, 5.0, 1.0, 0.0));
        let mut body_b = Body::new(&BodyParams::planet(124.0, 100.0, 100.0, 20.0));
        let consts = fx.cache.pair_mut(fx.entities[0], fx.entities[1]).unwrap();

        {
            let mut a = plain_side(fx.entities[0], &mut body_a, Category::Asteroid);
            let mut b = plain_side(fx.entities[1], &mut body_b, Category::Planet);
            fresh_contact(&mut a, &mut b, consts, &config);
        }
        body_a.integrate();
        body_b.integrate();

        assert!(body_a.vel.x < 0.0, "light body rebounds");
        assert_eq!(body_b.vel, Vec2::ZERO);
        assert_eq!(body_b.pos, Vec2::new(124.0, 100.0));
    }

    #[test]
    fn push_apart_scales_inversely_with_mass() {
        let mut heavy = Body::new(&BodyParams::asteroid(100.0, 100.0, 20.0, 5.0, 0.0, 0.0));
        let mut light = Body::new(&BodyParams::asteroid(104.0, 100.0, 2.0, 5.0, 0.0, 0.0));
        push_apart(&mut heavy, &mut light, 6.0, 0.5);
        heavy.integrate();
        light.integrate();
        assert!(heavy.vel.x < 0.0 && light.vel.x > 0.0, "pushed apart");
        assert!(light.vel.length() > heavy.vel.length(), "light body moves more");
    }
}
