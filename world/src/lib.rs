#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Slime Defence.
//!
//! The world owns the session, every enemy, every tower, and the configured
//! paths. It also plays the part of the host engine: it samples paths, and it
//! reports enemies entering and leaving tower detection regions.

mod enemies;
mod path;
mod session;
mod towers;

use std::collections::BTreeMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use slime_defence_core::{
    Command, EnemyArchetype, EnemyId, Event, SpawnError, TowerId, TowerKind,
    MAX_ENEMY_SPEED, MAX_TOWER_RANGE, MIN_ENEMY_SPEED, MIN_HEALTH, MIN_TOWER_RANGE,
    WELCOME_BANNER,
};
use tracing::{debug, info, warn};

pub use session::{Session, SessionRules};

use enemies::{DamageOutcome, Enemy, EnemyRegistry, Progress};
use path::Path;
use towers::TowerRegistry;

const DEFAULT_RNG_SEED: u64 = 0x5a1e_de7e_4ce5_0001;

/// Construction parameters for a [`World`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldSettings {
    /// Starting values for every session.
    pub session: SessionRules,
    /// Seed of the generator that picks paths for enemies spawned without one.
    pub rng_seed: u64,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            session: SessionRules::default(),
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

/// Represents the authoritative Slime Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    session: Session,
    archetypes: BTreeMap<String, EnemyArchetype>,
    paths: BTreeMap<String, Path>,
    enemies: EnemyRegistry,
    towers: TowerRegistry,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Creates a world with default settings and the built-in archetypes.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(WorldSettings::default())
    }

    /// Creates a world with the provided settings and the built-in archetypes.
    #[must_use]
    pub fn with_settings(settings: WorldSettings) -> Self {
        let mut archetypes = BTreeMap::new();
        for archetype in [EnemyArchetype::slime(), EnemyArchetype::orc()] {
            let _ = archetypes.insert(archetype.name.clone(), archetype);
        }

        Self {
            banner: WELCOME_BANNER,
            session: Session::new(settings.session),
            archetypes,
            paths: BTreeMap::new(),
            enemies: EnemyRegistry::new(),
            towers: TowerRegistry::new(),
            rng: ChaCha8Rng::seed_from_u64(settings.rng_seed),
            tick_index: 0,
        }
    }

    fn register_archetype(&mut self, mut archetype: EnemyArchetype) {
        if archetype.name.trim().is_empty() {
            warn!("ignoring enemy archetype without a name");
            return;
        }

        if archetype.max_health < MIN_HEALTH {
            warn!(
                archetype = %archetype.name,
                max_health = archetype.max_health,
                "raising archetype health to the minimum"
            );
            archetype.max_health = MIN_HEALTH;
        }

        if !archetype.move_speed.is_finite()
            || !(MIN_ENEMY_SPEED..=MAX_ENEMY_SPEED).contains(&archetype.move_speed)
        {
            let clamped = if archetype.move_speed.is_finite() {
                archetype.move_speed.clamp(MIN_ENEMY_SPEED, MAX_ENEMY_SPEED)
            } else {
                MIN_ENEMY_SPEED
            };
            warn!(
                archetype = %archetype.name,
                move_speed = archetype.move_speed,
                clamped,
                "clamping archetype speed into the supported range"
            );
            archetype.move_speed = clamped;
        }

        debug!(archetype = %archetype.name, "archetype registered");
        let _ = self.archetypes.insert(archetype.name.clone(), archetype);
    }

    fn configure_path(&mut self, name: String, waypoints: Vec<Vec2>) {
        match Path::new(waypoints) {
            Some(path) => {
                debug!(path = %name, length = path.length(), "path configured");
                let _ = self.paths.insert(name, path);
            }
            None => warn!(
                path = %name,
                "ignoring path without two distinct, finite waypoints"
            ),
        }
    }

    fn resolve_path(&mut self, requested: Option<String>) -> Option<String> {
        match requested {
            Some(name) => self.paths.contains_key(&name).then_some(name),
            None => {
                if self.paths.is_empty() {
                    return None;
                }
                let index = self.rng.gen_range(0..self.paths.len());
                self.paths.keys().nth(index).cloned()
            }
        }
    }

    fn spawn_enemy(&mut self, archetype: String, path: Option<String>, out_events: &mut Vec<Event>) {
        let Some(descriptor) = self.archetypes.get(&archetype).cloned() else {
            warn!(archetype = %archetype, "cannot spawn unknown archetype");
            out_events.push(Event::SpawnRejected {
                archetype,
                reason: SpawnError::UnknownArchetype,
            });
            return;
        };

        let requested = path.clone();
        let Some(path_name) = self.resolve_path(path) else {
            warn!(
                archetype = %archetype,
                path = ?requested,
                "no path available, enemy cannot move"
            );
            out_events.push(Event::SpawnRejected {
                archetype,
                reason: SpawnError::MissingPath,
            });
            return;
        };

        let Some(path) = self.paths.get(&path_name) else {
            return;
        };

        let id = self.enemies.allocate_id();
        let enemy = Enemy::spawn(id, &descriptor, &path_name, path);
        debug!(enemy = id.get(), archetype = %archetype, path = %path_name, "enemy spawned");
        self.enemies.insert(enemy);
        out_events.push(Event::EnemySpawned {
            enemy: id,
            archetype,
            path: path_name,
        });
        self.refresh_containment(id, out_events);
    }

    fn advance_enemy(&mut self, id: EnemyId, distance: f32, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.get_mut(id) else {
            debug!(enemy = id.get(), "ignoring advance for missing enemy");
            return;
        };

        let Some(path) = self.paths.get(&enemy.path) else {
            warn!(enemy = id.get(), path = %enemy.path, "enemy path vanished, freezing enemy");
            enemy.freeze();
            return;
        };

        match enemy.advance(distance, path) {
            Progress::Stalled => {}
            Progress::Moved => {
                self.refresh_containment(id, out_events);
                self.reaim_towers_tracking(id);
            }
            Progress::ReachedEnd => {
                let despawn = enemy.despawn_on_finish;
                out_events.push(Event::EnemyReachedEnd { enemy: id });
                if despawn {
                    self.remove_enemy(id, out_events);
                    out_events.push(Event::EnemyDespawned { enemy: id });
                } else {
                    if let Some(enemy) = self.enemies.get_mut(id) {
                        enemy.freeze();
                    }
                    self.refresh_containment(id, out_events);
                    self.reaim_towers_tracking(id);
                }
            }
        }
    }

    fn damage_enemy(&mut self, id: EnemyId, amount: i32, out_events: &mut Vec<Event>) {
        if amount <= 0 {
            debug!(enemy = id.get(), amount, "ignoring non-positive damage");
            return;
        }

        let Some(enemy) = self.enemies.get_mut(id) else {
            debug!(enemy = id.get(), "ignoring damage for missing enemy");
            return;
        };

        match enemy.apply_damage(amount) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Wounded => {
                out_events.push(Event::EnemyDamageTaken { enemy: id, amount });
            }
            DamageOutcome::Killed => {
                debug!(enemy = id.get(), archetype = %enemy.archetype, "enemy died");
                out_events.push(Event::EnemyDamageTaken { enemy: id, amount });
                out_events.push(Event::EnemyDied { enemy: id });
                self.remove_enemy(id, out_events);
            }
        }
    }

    /// Drops an enemy and reports it leaving every region that contained it.
    fn remove_enemy(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        if self.enemies.remove(id).is_none() {
            return;
        }

        for tower in self.towers.iter_mut() {
            if tower.contained.remove(&id) {
                out_events.push(Event::EnemyExitedRange {
                    tower: tower.id,
                    enemy: id,
                });
                if tower.target == Some(id) {
                    tower.target = None;
                    out_events.push(Event::TowerTargetChanged {
                        tower: tower.id,
                        target: None,
                    });
                }
            }
        }
    }

    fn clear_enemies(&mut self, out_events: &mut Vec<Event>) {
        for id in self.enemies.ids() {
            self.remove_enemy(id, out_events);
            out_events.push(Event::EnemyDespawned { enemy: id });
        }
    }

    /// Re-evaluates which detection regions contain the enemy.
    fn refresh_containment(&mut self, id: EnemyId, out_events: &mut Vec<Event>) {
        let Some(position) = self.enemies.get(id).map(|enemy| enemy.position) else {
            return;
        };

        for tower in self.towers.iter_mut() {
            let inside = tower.covers(position);
            let was_inside = tower.contained.contains(&id);
            if inside && !was_inside {
                let _ = tower.contained.insert(id);
                out_events.push(Event::EnemyEnteredRange {
                    tower: tower.id,
                    enemy: id,
                });
            } else if !inside && was_inside {
                let _ = tower.contained.remove(&id);
                out_events.push(Event::EnemyExitedRange {
                    tower: tower.id,
                    enemy: id,
                });
                if tower.target == Some(id) {
                    tower.target = None;
                    out_events.push(Event::TowerTargetChanged {
                        tower: tower.id,
                        target: None,
                    });
                }
            }
        }
    }

    fn reaim_towers_tracking(&mut self, id: EnemyId) {
        let Some(position) = self.enemies.get(id).map(|enemy| enemy.position) else {
            return;
        };

        for tower in self.towers.iter_mut() {
            if tower.target == Some(id) {
                tower.aim_at(position);
            }
        }
    }

    fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        range: Option<f32>,
        out_events: &mut Vec<Event>,
    ) {
        if !position.is_finite() {
            warn!(?position, "ignoring tower placement at a non-finite position");
            return;
        }

        let requested = range
            .filter(|radius| *radius > 0.0 && radius.is_finite())
            .unwrap_or_else(|| kind.default_range());
        let radius = requested.clamp(MIN_TOWER_RANGE, MAX_TOWER_RANGE);
        if radius != requested {
            warn!(
                requested,
                radius, "clamping tower range into the supported range"
            );
        }

        let tower = self.towers.insert(kind, position, radius);
        info!(tower = tower.get(), ?kind, x = position.x, y = position.y, "tower placed");
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            position,
            range: radius,
        });

        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        for enemy in self.enemies.iter() {
            if state.covers(enemy.position) {
                let _ = state.contained.insert(enemy.id);
                out_events.push(Event::EnemyEnteredRange {
                    tower,
                    enemy: enemy.id,
                });
            }
        }
    }

    fn remove_tower(&mut self, tower: TowerId, out_events: &mut Vec<Event>) {
        if self.towers.remove(tower).is_none() {
            warn!(tower = tower.get(), "cannot remove missing tower");
            return;
        }

        info!(tower = tower.get(), "tower removed");
        out_events.push(Event::TowerRemoved { tower });
    }

    fn assign_tower_target(
        &mut self,
        tower: TowerId,
        target: Option<EnemyId>,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.towers.get_mut(tower) else {
            debug!(tower = tower.get(), "ignoring target for missing tower");
            return;
        };

        if state.target == target {
            return;
        }

        match target {
            Some(enemy) => {
                let position = match self.enemies.get(enemy) {
                    Some(entry) if state.contained.contains(&enemy) => entry.position,
                    _ => {
                        warn!(
                            tower = tower.get(),
                            enemy = enemy.get(),
                            "rejecting target outside the tower's range"
                        );
                        return;
                    }
                };
                state.target = Some(enemy);
                state.aim_at(position);
            }
            None => state.target = None,
        }

        out_events.push(Event::TowerTargetChanged { tower, target });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::RegisterArchetype { archetype } => world.register_archetype(archetype),
        Command::ConfigurePath { name, waypoints } => world.configure_path(name, waypoints),
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            if !world.session.is_playing() {
                return;
            }

            let scaled = world.session.scaled(dt);
            if scaled.is_zero() {
                return;
            }
            out_events.push(Event::TimeAdvanced { dt: scaled });
        }
        Command::StartGame => {
            if world.session.can_start() {
                world.clear_enemies(out_events);
            }
            let _ = world.session.start(out_events);
        }
        Command::PauseGame => {
            let _ = world.session.pause(out_events);
        }
        Command::ResumeGame => {
            let _ = world.session.resume(out_events);
        }
        Command::TogglePause => {
            let _ = world.session.toggle_pause(out_events);
        }
        Command::EndGame { outcome } => {
            let _ = world.session.end(outcome, out_events);
        }
        Command::SetTimeScale { scale } => world.session.set_time_scale(scale),
        Command::AddMoney { amount } => {
            let _ = world.session.add_money(amount, out_events);
        }
        Command::SpendMoney { amount } => {
            let _ = world.session.try_spend_money(amount, out_events);
        }
        Command::AddScore { points } => {
            let _ = world.session.add_score(points, out_events);
        }
        Command::DamagePlayer { amount } => {
            let _ = world.session.take_damage(amount, out_events);
        }
        Command::SetCurrentWave { wave } => world.session.set_current_wave(wave, out_events),
        Command::SpawnEnemy { archetype, path } => world.spawn_enemy(archetype, path, out_events),
        Command::AdvanceEnemy { enemy, distance } => {
            world.advance_enemy(enemy, distance, out_events)
        }
        Command::DamageEnemy { enemy, amount } => world.damage_enemy(enemy, amount, out_events),
        Command::PlaceTower {
            kind,
            position,
            range,
        } => world.place_tower(kind, position, range, out_events),
        Command::RemoveTower { tower } => world.remove_tower(tower, out_events),
        Command::AssignTowerTarget { tower, target } => {
            world.assign_tower_target(tower, target, out_events)
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use slime_defence_core::{
        EnemyArchetype, EnemyId, EnemySnapshot, EnemyView, TowerId, TowerView,
    };

    use super::{Session, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the session context.
    #[must_use]
    pub fn session(world: &World) -> &Session {
        &world.session
    }

    /// Number of ticks submitted to the world, including ignored ones.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of the enemies in the world.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Captures the state of a single enemy.
    #[must_use]
    pub fn enemy(world: &World, enemy: EnemyId) -> Option<EnemySnapshot> {
        world.enemies.get(enemy).map(|enemy| enemy.snapshot())
    }

    /// Captures a read-only view of the towers in the world.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Enemy currently tracked by a tower.
    #[must_use]
    pub fn tower_target(world: &World, tower: TowerId) -> Option<EnemyId> {
        world.towers.get(tower).and_then(|state| state.target)
    }

    /// Enemies inside a tower's detection radius, in identifier order.
    #[must_use]
    pub fn enemies_in_range(world: &World, tower: TowerId) -> Vec<EnemyId> {
        world
            .towers
            .get(tower)
            .map(|state| state.contained.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Looks up a registered archetype by name.
    #[must_use]
    pub fn archetype<'world>(world: &'world World, name: &str) -> Option<&'world EnemyArchetype> {
        world.archetypes.get(name)
    }

    /// Names of the configured paths in lexicographic order.
    #[must_use]
    pub fn path_names(world: &World) -> Vec<&str> {
        world.paths.keys().map(String::as_str).collect()
    }

    /// Total length of a configured path.
    #[must_use]
    pub fn path_length(world: &World, name: &str) -> Option<f32> {
        world.paths.get(name).map(|path| path.length())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn playing_world() -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigurePath {
                name: "main".to_owned(),
                waypoints: vec![Vec2::new(0.0, 0.0), Vec2::new(1000.0, 0.0)],
            },
            &mut events,
        );
        apply(&mut world, Command::StartGame, &mut events);
        world
    }

    fn spawn(world: &mut World, archetype: &str) -> EnemyId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                archetype: archetype.to_owned(),
                path: None,
            },
            &mut events,
        );
        events
            .iter()
            .find_map(|event| match event {
                Event::EnemySpawned { enemy, .. } => Some(*enemy),
                _ => None,
            })
            .expect("spawn should succeed")
    }

    #[test]
    fn ticks_only_advance_while_playing() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert!(events.is_empty(), "main menu ignores ticks");

        apply(&mut world, Command::StartGame, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );

        apply(&mut world, Command::PauseGame, &mut events);
        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert!(events.is_empty(), "paused sessions ignore ticks");
        assert_eq!(query::tick_index(&world), 3);
    }

    #[test]
    fn spawn_without_paths_is_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                archetype: "slime".to_owned(),
                path: None,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::SpawnRejected {
                archetype: "slime".to_owned(),
                reason: SpawnError::MissingPath,
            }]
        );
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn spawn_of_unknown_archetype_is_rejected() {
        let mut world = playing_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                archetype: "dragon".to_owned(),
                path: Some("main".to_owned()),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::SpawnRejected {
                archetype: "dragon".to_owned(),
                reason: SpawnError::UnknownArchetype,
            }]
        );
    }

    #[test]
    fn registered_archetypes_are_clamped() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RegisterArchetype {
                archetype: EnemyArchetype::new("glass", 0, 1000.0),
            },
            &mut events,
        );

        let glass = query::archetype(&world, "glass").expect("archetype registered");
        assert_eq!(glass.max_health, MIN_HEALTH);
        assert_eq!(glass.move_speed, MAX_ENEMY_SPEED);
    }

    #[test]
    fn damage_kills_exactly_once() {
        let mut world = playing_world();
        let enemy = spawn(&mut world, "slime");

        let mut events = Vec::new();
        apply(&mut world, Command::DamageEnemy { enemy, amount: 25 }, &mut events);
        apply(&mut world, Command::DamageEnemy { enemy, amount: 25 }, &mut events);

        let deaths = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyDied { .. }))
            .count();
        assert_eq!(deaths, 1);
        assert!(query::enemy(&world, enemy).is_none());
    }

    #[test]
    fn non_positive_damage_is_ignored() {
        let mut world = playing_world();
        let enemy = spawn(&mut world, "orc");

        let mut events = Vec::new();
        apply(&mut world, Command::DamageEnemy { enemy, amount: 0 }, &mut events);
        apply(&mut world, Command::DamageEnemy { enemy, amount: -7 }, &mut events);

        assert!(events.is_empty());
        let snapshot = query::enemy(&world, enemy).expect("enemy alive");
        assert_eq!(snapshot.health, snapshot.max_health);
    }

    #[test]
    fn reaching_the_end_despawns_by_default() {
        let mut world = playing_world();
        let enemy = spawn(&mut world, "slime");

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::AdvanceEnemy {
                enemy,
                distance: 1500.0,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::EnemyReachedEnd { enemy },
                Event::EnemyDespawned { enemy },
            ]
        );
        assert!(query::enemy(&world, enemy).is_none());
    }

    #[test]
    fn enemies_that_do_not_despawn_freeze_at_the_end() {
        let mut world = playing_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RegisterArchetype {
                archetype: EnemyArchetype::new("statue", 5, 100.0).with_despawn_on_finish(false),
            },
            &mut events,
        );
        let enemy = spawn(&mut world, "statue");

        apply(
            &mut world,
            Command::AdvanceEnemy {
                enemy,
                distance: 2000.0,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::AdvanceEnemy {
                enemy,
                distance: 10.0,
            },
            &mut events,
        );

        let snapshot = query::enemy(&world, enemy).expect("frozen enemy stays");
        assert!(snapshot.frozen);
        assert_eq!(snapshot.position, Vec2::new(1000.0, 0.0));
        let arrivals = events
            .iter()
            .filter(|event| matches!(event, Event::EnemyReachedEnd { .. }))
            .count();
        assert_eq!(arrivals, 1);
    }

    #[test]
    fn movement_reports_range_transitions() {
        let mut world = playing_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                position: Vec2::new(500.0, 0.0),
                range: Some(100.0),
            },
            &mut events,
        );
        let tower = TowerId::new(0);
        let enemy = spawn(&mut world, "slime");

        events.clear();
        apply(&mut world, Command::AdvanceEnemy { enemy, distance: 450.0 }, &mut events);
        assert_eq!(events, vec![Event::EnemyEnteredRange { tower, enemy }]);

        events.clear();
        apply(&mut world, Command::AdvanceEnemy { enemy, distance: 200.0 }, &mut events);
        assert_eq!(events, vec![Event::EnemyExitedRange { tower, enemy }]);
    }

    #[test]
    fn target_assignment_requires_membership_and_aims() {
        let mut world = playing_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                position: Vec2::new(0.0, 100.0),
                range: None,
            },
            &mut events,
        );
        let tower = TowerId::new(0);
        let enemy = spawn(&mut world, "slime");
        assert_eq!(query::enemies_in_range(&world, tower), vec![enemy]);

        events.clear();
        apply(
            &mut world,
            Command::AssignTowerTarget {
                tower,
                target: Some(enemy),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::TowerTargetChanged {
                tower,
                target: Some(enemy)
            }]
        );
        assert_eq!(query::tower_target(&world, tower), Some(enemy));
        let aim = query::tower_view(&world)
            .get(tower)
            .map(|snapshot| snapshot.aim)
            .expect("tower exists");
        assert!(aim.abs() < 1e-5, "target straight below the tower, got {aim}");

        apply(&mut world, Command::AdvanceEnemy { enemy, distance: 600.0 }, &mut events);
        assert_eq!(query::tower_target(&world, tower), None);
        assert!(events.contains(&Event::TowerTargetChanged {
            tower,
            target: None
        }));

        events.clear();
        apply(
            &mut world,
            Command::AssignTowerTarget {
                tower,
                target: Some(enemy),
            },
            &mut events,
        );
        assert!(events.is_empty(), "enemy outside the range cannot be targeted");
    }

    #[test]
    fn killing_a_target_clears_it() {
        let mut world = playing_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                position: Vec2::new(0.0, 0.0),
                range: None,
            },
            &mut events,
        );
        let tower = TowerId::new(0);
        let enemy = spawn(&mut world, "slime");
        apply(
            &mut world,
            Command::AssignTowerTarget {
                tower,
                target: Some(enemy),
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::DamageEnemy { enemy, amount: 10 }, &mut events);
        assert_eq!(
            events,
            vec![
                Event::EnemyDamageTaken { enemy, amount: 10 },
                Event::EnemyDied { enemy },
                Event::EnemyExitedRange { tower, enemy },
                Event::TowerTargetChanged {
                    tower,
                    target: None
                },
            ]
        );
    }

    #[test]
    fn tower_range_is_clamped() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                position: Vec2::ZERO,
                range: Some(5000.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Basic,
                position: Vec2::ZERO,
                range: Some(-1.0),
            },
            &mut events,
        );

        let ranges: Vec<f32> = query::tower_view(&world)
            .iter()
            .map(|snapshot| snapshot.range)
            .collect();
        assert_eq!(ranges, vec![MAX_TOWER_RANGE, TowerKind::Basic.default_range()]);
    }

    #[test]
    fn restarting_clears_leftover_enemies() {
        let mut world = playing_world();
        let enemy = spawn(&mut world, "slime");
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::EndGame {
                outcome: slime_defence_core::Outcome::Defeat,
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::StartGame, &mut events);
        assert_eq!(
            events,
            vec![Event::EnemyDespawned { enemy }, Event::GameStarted]
        );
        assert!(query::enemy_view(&world).is_empty());
    }

    #[test]
    fn random_path_selection_is_deterministic() {
        let picks = |seed: u64| {
            let mut world = World::with_settings(WorldSettings {
                rng_seed: seed,
                ..WorldSettings::default()
            });
            let mut events = Vec::new();
            for name in ["up", "down"] {
                apply(
                    &mut world,
                    Command::ConfigurePath {
                        name: name.to_owned(),
                        waypoints: vec![Vec2::ZERO, Vec2::new(0.0, 10.0)],
                    },
                    &mut events,
                );
            }
            for _ in 0..16 {
                apply(
                    &mut world,
                    Command::SpawnEnemy {
                        archetype: "slime".to_owned(),
                        path: None,
                    },
                    &mut events,
                );
            }
            events
                .into_iter()
                .filter_map(|event| match event {
                    Event::EnemySpawned { path, .. } => Some(path),
                    _ => None,
                })
                .collect::<Vec<_>>()
        };

        let first = picks(7);
        assert_eq!(first.len(), 16);
        assert_eq!(first, picks(7));
        assert!(first.iter().all(|path| path == "up" || path == "down"));
    }
}
