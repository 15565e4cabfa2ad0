//! Tick orchestration: spawn intake, the all-pairs physics loop, edge
//! handling, death cleanup, and the plugin wiring it all in order.
//!
//! One `App::update` is one logical tick.  The live set never changes
//! mid-tick: additions queue through [`SpawnQueue`] and enter at the top
//! of the next tick, removals are deferred to the death pass at the end.

use crate::body::{Body, BodyParams, DeathCause};
use crate::category::{Category, SideMut};
use crate::config::PhysicsConfig;
use crate::pair_cache::PairCache;
use crate::resolver::resolve_pair;
use crate::ship::{
    ship_control_system, weapon_fire_system, weapon_ttl_system, ActiveIntents, Player, ShipState,
    Weapon,
};
use crate::level::LevelConfig;
use bevy::prelude::*;
use rand::Rng;

/// Global run state.
#[derive(Resource, Debug, Default)]
pub struct GameState {
    /// Set when the player's ship dies; most systems stand down.
    pub game_over: bool,
    /// Ticks elapsed since startup.
    pub tick: u64,
}

/// A body waiting to enter the simulation at the next spawn pass.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub params: BodyParams,
    pub category: Category,
    /// Firing ship for projectiles; exempts the pair from collision.
    pub owner: Option<Entity>,
    pub player: bool,
}

impl SpawnRequest {
    pub fn body(params: BodyParams, category: Category) -> Self {
        Self {
            params,
            category,
            owner: None,
            player: false,
        }
    }

    pub fn player_ship(params: BodyParams) -> Self {
        Self {
            params,
            category: Category::Ship,
            owner: None,
            player: true,
        }
    }

    pub fn weapon(params: BodyParams, owner: Option<Entity>) -> Self {
        Self {
            params,
            category: Category::Weapon,
            owner,
            player: false,
        }
    }
}

/// Pending spawns, drained once per tick before physics runs.
#[derive(Resource, Default)]
pub struct SpawnQueue {
    requests: Vec<SpawnRequest>,
}

impl SpawnQueue {
    pub fn push(&mut self, request: SpawnRequest) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn take(&mut self) -> Vec<SpawnRequest> {
        std::mem::take(&mut self.requests)
    }
}

/// Drain the spawn queue into live entities, seeding the pair cache
/// against every existing body and every earlier request in the batch.
pub fn spawn_system(
    mut commands: Commands,
    mut queue: ResMut<SpawnQueue>,
    mut cache: ResMut<PairCache>,
    config: Res<PhysicsConfig>,
    existing: Query<(Entity, &Body)>,
) {
    if queue.is_empty() {
        return;
    }
    let mut live: Vec<(Entity, f32, f32)> = existing
        .iter()
        .map(|(entity, body)| (entity, body.mass, body.radius))
        .collect();

    for request in queue.take() {
        let body = Body::new(&request.params);
        let (mass, radius) = (body.mass, body.radius);

        let mut spawned = commands.spawn((body, request.category));
        let entity = spawned.id();
        match request.category {
            Category::Ship => {
                spawned.insert((ShipState::new(&config), ActiveIntents::default()));
                if request.player {
                    spawned.insert(Player);
                }
            }
            Category::Weapon => {
                spawned.insert(Weapon::new(request.owner, &config));
            }
            Category::Planet | Category::Asteroid => {}
        }

        cache.seed(entity, mass, radius, live.iter().copied());
        live.push((entity, mass, radius));
    }
}

/// The all-pairs pass.  Each live body resolves against every later body
/// in a stable snapshot order, then integrates its own deferred state.
///
/// A projectile and its owner never interact; everything else does.
pub fn physics_tick_system(
    state: Res<GameState>,
    config: Res<PhysicsConfig>,
    mut cache: ResMut<PairCache>,
    mut bodies: Query<(
        Entity,
        &mut Body,
        &Category,
        Option<&mut ShipState>,
        Option<&mut Weapon>,
    )>,
) {
    if state.game_over {
        return;
    }
    let order: Vec<Entity> = bodies.iter().map(|(entity, ..)| entity).collect();

    for i in 0..order.len() {
        for j in (i + 1)..order.len() {
            let Ok(
                [(_, body_a, category_a, ship_a, weapon_a), (_, body_b, category_b, ship_b, weapon_b)],
            ) = bodies.get_many_mut([order[i], order[j]])
            else {
                continue;
            };
            if !body_a.update || !body_b.update {
                continue;
            }
            if weapon_a.as_ref().is_some_and(|w| w.owner == Some(order[j]))
                || weapon_b.as_ref().is_some_and(|w| w.owner == Some(order[i]))
            {
                continue;
            }

            let mut side_a = SideMut {
                entity: order[i],
                body: body_a.into_inner(),
                category: *category_a,
                ship: ship_a.map(Mut::into_inner),
                weapon: weapon_a.map(Mut::into_inner),
            };
            let mut side_b = SideMut {
                entity: order[j],
                body: body_b.into_inner(),
                category: *category_b,
                ship: ship_b.map(Mut::into_inner),
                weapon: weapon_b.map(Mut::into_inner),
            };
            if let Err(e) = resolve_pair(&mut side_a, &mut side_b, &mut cache, &config) {
                panic!("pair loop out of sync with lifecycle: {e}");
            }
        }

        // this body has now seen every partner this tick
        if let Ok((_, mut body, ..)) = bodies.get_mut(order[i]) {
            body.integrate();
        }
    }
}

/// Enforce the play-field edges after integration.
pub fn bounds_system(
    level: Res<LevelConfig>,
    config: Res<PhysicsConfig>,
    mut bodies: Query<(&mut Body, &Category)>,
) {
    for (mut body, category) in bodies.iter_mut() {
        if !body.update {
            continue;
        }
        let (x, y) = (body.pos.x, body.pos.y);
        if let Some(new_x) = resolve_axis(x, level.max_x, level.wrap_x, *category, &config) {
            match new_x {
                AxisOutcome::Move(v) => body.pos.x = v,
                AxisOutcome::Clamp(v) => {
                    body.pos.x = v;
                    body.vel.x = 0.0;
                }
                AxisOutcome::Cull => {
                    body.die(DeathCause::OutOfBounds);
                    continue;
                }
            }
        }
        if let Some(new_y) = resolve_axis(y, level.max_y, level.wrap_y, *category, &config) {
            match new_y {
                AxisOutcome::Move(v) => body.pos.y = v,
                AxisOutcome::Clamp(v) => {
                    body.pos.y = v;
                    body.vel.y = 0.0;
                }
                AxisOutcome::Cull => body.die(DeathCause::OutOfBounds),
            }
        }
    }
}

enum AxisOutcome {
    Move(f32),
    Clamp(f32),
    Cull,
}

/// Edge policy for one axis; `None` means in bounds, nothing to do.
fn resolve_axis(
    pos: f32,
    max: f32,
    wrap: bool,
    category: Category,
    config: &PhysicsConfig,
) -> Option<AxisOutcome> {
    if (0.0..=max).contains(&pos) {
        return None;
    }
    if wrap {
        return Some(AxisOutcome::Move(pos.rem_euclid(max)));
    }
    match category {
        // the important things stop at the wall
        Category::Ship | Category::Planet => Some(AxisOutcome::Clamp(pos.clamp(0.0, max))),
        // debris and shots die quietly once clearly outside
        Category::Asteroid | Category::Weapon => {
            if pos < -config.oob_kill_margin || pos > max + config.oob_kill_margin {
                Some(AxisOutcome::Cull)
            } else {
                None
            }
        }
    }
}

/// Remove dead bodies, fragment destroyed asteroids, purge stale cache
/// entries and relations, and end the run when the player dies.
pub fn death_system(
    mut commands: Commands,
    mut state: ResMut<GameState>,
    mut cache: ResMut<PairCache>,
    mut queue: ResMut<SpawnQueue>,
    mut bodies: ParamSet<(
        Query<(Entity, &Body, &Category, Option<&Player>)>,
        Query<&mut Body>,
    )>,
) {
    if state.game_over {
        return;
    }

    let mut removed: Vec<Entity> = Vec::new();
    for (entity, body, category, player) in bodies.p0().iter() {
        let Some(cause) = body.died else { continue };

        if player.is_some() {
            state.game_over = true;
            println!("⚠ player ship destroyed at tick {} — game over", state.tick);
            // the wreck stays in the world for the outer surface to show
            continue;
        }

        if *category == Category::Asteroid
            && cause == DeathCause::Destroyed
            && body.spawn_count > 0
        {
            queue_fragments(&mut queue, body);
        }
        removed.push(entity);
    }

    for &entity in &removed {
        commands.entity(entity).despawn();
        cache.purge(entity);
    }
    if !removed.is_empty() {
        for mut body in bodies.p1().iter_mut() {
            for &entity in &removed {
                body.purge_relations(entity);
            }
        }
    }
}

/// Split a destroyed asteroid into `spawn_count` smaller children around
/// the impact point, dividing mass and health between them.
fn queue_fragments(queue: &mut SpawnQueue, parent: &Body) {
    let n = parent.spawn_count;
    let share = n as f32;
    let mut rng = rand::thread_rng();
    for _ in 0..n {
        let offset = Vec2::new(
            rng.gen_range(-parent.radius..parent.radius),
            rng.gen_range(-parent.radius..parent.radius),
        );
        queue.push(SpawnRequest::body(
            BodyParams {
                health: (parent.max_health / share).max(1.0),
                ..BodyParams::asteroid(
                    parent.pos.x + offset.x,
                    parent.pos.y + offset.y,
                    parent.mass / share,
                    (parent.radius / share.sqrt()).max(1.0),
                    parent.vel.x + rng.gen_range(-0.25..0.25),
                    parent.vel.y + rng.gen_range(-0.25..0.25),
                )
            },
            Category::Asteroid,
        ));
    }
}

pub fn tick_counter_system(mut state: ResMut<GameState>) {
    state.tick += 1;
}

/// The whole simulation core as one plugin.  System order within a tick
/// is fixed: spawns enter, intents apply, weapons fire (for next tick),
/// physics resolves and integrates, edges apply, lifetimes advance,
/// deaths clean up, and the tick counter advances last.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameState>()
            .init_resource::<SpawnQueue>()
            .init_resource::<PairCache>()
            .init_resource::<PhysicsConfig>()
            .init_resource::<LevelConfig>()
            .add_systems(
                Update,
                (
                    spawn_system,
                    ship_control_system,
                    weapon_fire_system,
                    physics_tick_system,
                    bounds_system,
                    weapon_ttl_system,
                    death_system,
                    tick_counter_system,
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_running_at_tick_zero() {
        let state = GameState::default();
        assert!(!state.game_over);
        assert_eq!(state.tick, 0);
    }

    #[test]
    fn queue_drains_completely() {
        let mut queue = SpawnQueue::default();
        queue.push(SpawnRequest::body(
            BodyParams::at(1.0, 1.0),
            Category::Asteroid,
        ));
        queue.push(SpawnRequest::player_ship(BodyParams::ship(2.0, 2.0)));
        assert_eq!(queue.len(), 2);
        let taken = queue.take();
        assert_eq!(taken.len(), 2);
        assert!(queue.is_empty());
        assert!(taken[1].player);
    }

    #[test]
    fn wrap_folds_positions_toroidally() {
        let config = PhysicsConfig::default();
        match resolve_axis(-3.0, 100.0, true, Category::Asteroid, &config) {
            Some(AxisOutcome::Move(v)) => assert!((v - 97.0).abs() < 1e-5),
            _ => panic!("expected a wrapped move"),
        }
        assert!(resolve_axis(50.0, 100.0, true, Category::Asteroid, &config).is_none());
    }

    #[test]
    fn bounded_edges_clamp_ships_and_cull_debris() {
        let config = PhysicsConfig::default();
        match resolve_axis(120.0, 100.0, false, Category::Ship, &config) {
            Some(AxisOutcome::Clamp(v)) => assert_eq!(v, 100.0),
            _ => panic!("expected a clamp"),
        }
        // inside the kill margin debris flies on
        assert!(resolve_axis(120.0, 100.0, false, Category::Weapon, &config).is_none());
        assert!(matches!(
            resolve_axis(100.0 + config.oob_kill_margin + 1.0, 100.0, false, Category::Weapon, &config),
            Some(AxisOutcome::Cull)
        ));
    }

    #[test]
    fn fragments_split_mass_health_and_radius() {
        let mut queue = SpawnQueue::default();
        let mut parent = Body::new(&BodyParams {
            spawn_count: 2,
            ..BodyParams::asteroid(100.0, 100.0, 12.0, 6.0, 0.5, 0.0)
        });
        parent.take_damage(1000.0);
        queue_fragments(&mut queue, &parent);
        assert_eq!(queue.len(), 2);
        for request in &queue.requests {
            assert_eq!(request.params.mass, 6.0);
            assert_eq!(request.params.health, 50.0);
            assert!((request.params.radius - 6.0 / 2.0_f32.sqrt()).abs() < 1e-5);
            assert_eq!(request.params.spawn_count, 0);
        }
    }
}
