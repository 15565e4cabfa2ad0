//! Headless runner: drives the simulation core at its fixed tick rate
//! and prints a body census every few seconds.
//!
//! `GRAVWELL_LEVEL` picks the level (`training`, `planets`, `field`);
//! `GRAVWELL_TICKS` caps the run length (0 or unset means unlimited).

use bevy::prelude::*;
use gravwell::body::Body;
use gravwell::config::load_physics_config;
use gravwell::constants::TICK_MILLIS;
use gravwell::level::{setup_asteroid_field, setup_planets_level, setup_training_level};
use gravwell::simulation::{GameState, SimulationPlugin};
use std::time::Duration;

const CENSUS_INTERVAL_TICKS: u64 = 500;

fn main() {
    let level = std::env::var("GRAVWELL_LEVEL").unwrap_or_else(|_| "training".to_string());
    let max_ticks: u64 = std::env::var("GRAVWELL_TICKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    let mut app = App::new();
    app.add_plugins(SimulationPlugin);
    app.add_systems(Startup, load_physics_config);
    match level.as_str() {
        "planets" => app.add_systems(Startup, setup_planets_level.after(load_physics_config)),
        "field" => app.add_systems(Startup, setup_asteroid_field.after(load_physics_config)),
        _ => app.add_systems(Startup, setup_training_level.after(load_physics_config)),
    };
    println!("ℹ gravwell starting level '{level}'");

    loop {
        app.update();

        let (tick, game_over) = {
            let state = app.world().resource::<GameState>();
            (state.tick, state.game_over)
        };
        if game_over {
            println!("ℹ run ended at tick {tick}");
            break;
        }
        if max_ticks > 0 && tick >= max_ticks {
            println!("✓ tick limit reached ({tick})");
            break;
        }
        if tick % CENSUS_INTERVAL_TICKS == 0 {
            let world = app.world_mut();
            let mut bodies = world.query::<&Body>();
            let live = bodies.iter(world).filter(|b| b.update).count();
            println!("ℹ tick {tick}: {live} live bodies");
        }

        std::thread::sleep(Duration::from_millis(TICK_MILLIS));
    }
}
