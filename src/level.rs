//! Play-field geometry and the built-in level setups.
//!
//! Levels are just startup systems that shape the [`LevelConfig`] and
//! push spawn requests; the simulation core does not care which one ran.

use crate::body::BodyParams;
use crate::category::Category;
use crate::constants::{LEVEL_MAX_X, LEVEL_MAX_Y};
use crate::simulation::{SpawnQueue, SpawnRequest};
use bevy::prelude::*;
use rand::Rng;

/// Play-field extent and per-axis edge behavior.
#[derive(Resource, Debug, Clone)]
pub struct LevelConfig {
    pub max_x: f32,
    pub max_y: f32,
    /// Wrapping axis: positions fold around toroidally.  Non-wrapping:
    /// ships and planets clamp at the edge, everything else is culled
    /// past the kill margin.
    pub wrap_x: bool,
    pub wrap_y: bool,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            max_x: LEVEL_MAX_X,
            max_y: LEVEL_MAX_Y,
            wrap_x: true,
            wrap_y: true,
        }
    }
}

/// A single heavy anchor planet with a ring of slow asteroids falling in.
/// Good for watching capture, attachment, and landings.
pub fn setup_training_level(mut level: ResMut<LevelConfig>, mut queue: ResMut<SpawnQueue>) {
    level.wrap_x = true;
    level.wrap_y = true;
    let (cx, cy) = (level.max_x / 2.0, level.max_y / 2.0);

    queue.push(SpawnRequest::body(
        BodyParams::planet(cx, cy, 2000.0, 60.0),
        Category::Planet,
    ));
    queue.push(SpawnRequest::player_ship(BodyParams::ship(cx, cy - 200.0)));

    // four asteroids on loose infall trajectories
    let drops = [
        (cx - 300.0, cy, 0.0, -0.3),
        (cx + 300.0, cy, 0.0, 0.3),
        (cx, cy - 280.0, 0.35, 0.0),
        (cx, cy + 280.0, -0.35, 0.0),
    ];
    for (x, y, vx, vy) in drops {
        queue.push(SpawnRequest::body(
            BodyParams {
                spawn_count: 2,
                ..BodyParams::asteroid(x, y, 12.0, 6.0, vx, vy)
            },
            Category::Asteroid,
        ));
    }
}

/// A bounded field of five fixed planets.  Edges clamp instead of wrap,
/// so stray shots die at the margin.
pub fn setup_planets_level(mut level: ResMut<LevelConfig>, mut queue: ResMut<SpawnQueue>) {
    level.wrap_x = false;
    level.wrap_y = false;

    let planets = [
        (200.0, 180.0, 900.0, 35.0),
        (800.0, 180.0, 900.0, 35.0),
        (500.0, 350.0, 1600.0, 50.0),
        (200.0, 520.0, 900.0, 35.0),
        (800.0, 520.0, 900.0, 35.0),
    ];
    for (x, y, mass, radius) in planets {
        queue.push(SpawnRequest::body(
            BodyParams::planet(x, y, mass, radius),
            Category::Planet,
        ));
    }
    queue.push(SpawnRequest::player_ship(BodyParams::ship(500.0, 80.0)));
}

/// A wrapped field of randomly placed drifting asteroids.
pub fn setup_asteroid_field(mut level: ResMut<LevelConfig>, mut queue: ResMut<SpawnQueue>) {
    level.wrap_x = true;
    level.wrap_y = true;
    let mut rng = rand::thread_rng();

    queue.push(SpawnRequest::player_ship(BodyParams::ship(
        level.max_x / 2.0,
        level.max_y / 2.0,
    )));

    for _ in 0..24 {
        let radius = rng.gen_range(3.0..10.0);
        // mass tracks area so big rocks hit harder and drift slower
        let mass = radius * radius * 0.4;
        queue.push(SpawnRequest::body(
            BodyParams {
                spawn_count: if radius > 5.0 { 3 } else { 0 },
                ..BodyParams::asteroid(
                    rng.gen_range(0.0..level.max_x),
                    rng.gen_range(0.0..level.max_y),
                    mass,
                    radius,
                    rng.gen_range(-0.4..0.4),
                    rng.gen_range(-0.4..0.4),
                )
            },
            Category::Asteroid,
        ));
    }
}
