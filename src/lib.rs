//! Gravwell: a deterministic 2D orbital combat simulation core.
//!
//! Circular bodies under mutual inverse-square gravity, elastic
//! collisions with damage exchange, gentle-contact attachment, ships with
//! shields and weapons, all driven one logical tick per `App::update`.
//! The crate deliberately has no rendering or input surface; embed
//! [`simulation::SimulationPlugin`] and drive it from outside.

pub mod body;
pub mod category;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod level;
pub mod pair_cache;
pub mod resolver;
pub mod ship;
pub mod simulation;

pub use body::{Body, BodyParams, DeathCause};
pub use category::Category;
pub use config::PhysicsConfig;
pub use error::SimError;
pub use level::LevelConfig;
pub use simulation::{GameState, SimulationPlugin, SpawnQueue, SpawnRequest};
