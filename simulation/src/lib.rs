#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless Slime Defence simulation.
//!
//! [`Simulation`] owns the world, the gameplay systems, and the event bus. Every
//! command is applied to the world, the resulting events are published and fed
//! to the systems, and any commands the systems emit are applied in turn until
//! nothing is left to do.

mod config;

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use slime_defence_core::{
    Command, EnemyId, Event, EventBus, Outcome, SubscriptionId, Topic, TowerId, TowerKind,
};
use slime_defence_system_economy::Economy;
use slime_defence_system_movement::Movement;
use slime_defence_system_tower_targeting::TowerTargeting;
use slime_defence_system_wave_scheduler::WaveScheduler;
use slime_defence_world::{self as world, query, World};
use tracing::{debug, warn};

pub use config::{ConfigError, GameConfig, PathConfig, SessionConfig, TowerConfig};

/// Upper bound on commands processed for a single submission.
const MAX_COMMANDS_PER_SUBMISSION: usize = 1 << 16;

/// Composition root driving the world and every gameplay system.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    wave_scheduler: WaveScheduler,
    tower_targeting: TowerTargeting,
    movement: Movement,
    economy: Economy,
    bus: EventBus,
}

impl Simulation {
    /// Builds a simulation from the configuration. The game starts in the main menu.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        let mut simulation = Self {
            world: World::with_settings(config.world_settings()),
            wave_scheduler: WaveScheduler::new(config.waves.clone()),
            tower_targeting: TowerTargeting::new(),
            movement: Movement::new(),
            economy: Economy::new(config.rewards),
            bus: EventBus::new(),
        };

        let mut setup = Vec::new();
        setup.extend(
            config
                .archetypes
                .iter()
                .cloned()
                .map(|archetype| Command::RegisterArchetype { archetype }),
        );
        setup.extend(config.paths.iter().map(|path| Command::ConfigurePath {
            name: path.name.clone(),
            waypoints: path.waypoints.clone(),
        }));
        setup.extend(config.towers.iter().map(|tower| Command::PlaceTower {
            kind: tower.kind,
            position: tower.position,
            range: tower.range,
        }));
        let _ = simulation.process(setup);
        simulation
    }

    /// Applies a command and everything it triggers, returning the events in publication order.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        self.process(vec![command])
    }

    /// Advances the simulation by one host tick.
    pub fn step(&mut self, dt: Duration) -> Vec<Event> {
        self.submit(Command::Tick { dt })
    }

    /// Starts a new game from the main menu or after a game over.
    pub fn start_game(&mut self) -> bool {
        contains(&self.submit(Command::StartGame), Topic::GameStarted)
    }

    /// Pauses a running game.
    pub fn pause(&mut self) -> bool {
        contains(&self.submit(Command::PauseGame), Topic::GamePaused)
    }

    /// Resumes a paused game.
    pub fn resume(&mut self) -> bool {
        contains(&self.submit(Command::ResumeGame), Topic::GameResumed)
    }

    /// Pauses a running game or resumes a paused one.
    pub fn toggle_pause(&mut self) -> bool {
        let events = self.submit(Command::TogglePause);
        contains(&events, Topic::GamePaused) || contains(&events, Topic::GameResumed)
    }

    /// Ends the game with the provided outcome.
    pub fn end_game(&mut self, outcome: Outcome) -> bool {
        contains(&self.submit(Command::EndGame { outcome }), Topic::GameEnded)
    }

    /// Sets the multiplier applied to tick deltas.
    pub fn set_time_scale(&mut self, scale: f32) {
        let _ = self.submit(Command::SetTimeScale { scale });
    }

    /// Credits money to the player.
    pub fn add_money(&mut self, amount: i32) -> bool {
        contains(&self.submit(Command::AddMoney { amount }), Topic::MoneyChanged)
    }

    /// Debits money when the balance covers it.
    pub fn try_spend_money(&mut self, amount: i32) -> bool {
        contains(&self.submit(Command::SpendMoney { amount }), Topic::MoneySpent)
    }

    /// Credits score to the player.
    pub fn add_score(&mut self, points: i32) -> bool {
        contains(&self.submit(Command::AddScore { points }), Topic::ScoreChanged)
    }

    /// Removes player health.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        contains(&self.submit(Command::DamagePlayer { amount }), Topic::PlayerDamaged)
    }

    /// Applies damage to an enemy.
    pub fn damage_enemy(&mut self, enemy: EnemyId, amount: i32) -> Vec<Event> {
        self.submit(Command::DamageEnemy { enemy, amount })
    }

    /// Requests an enemy outside the wave schedule.
    pub fn spawn_enemy(&mut self, archetype: &str, path: Option<&str>) -> Option<EnemyId> {
        self.submit(Command::SpawnEnemy {
            archetype: archetype.to_owned(),
            path: path.map(str::to_owned),
        })
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
    }

    /// Places a tower, returning its identifier.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        position: Vec2,
        range: Option<f32>,
    ) -> Option<TowerId> {
        self.submit(Command::PlaceTower {
            kind,
            position,
            range,
        })
        .iter()
        .find_map(|event| match event {
            Event::TowerPlaced { tower, .. } => Some(*tower),
            _ => None,
        })
    }

    /// Removes a tower.
    pub fn remove_tower(&mut self, tower: TowerId) -> bool {
        contains(&self.submit(Command::RemoveTower { tower }), Topic::TowerRemoved)
    }

    /// Target currently tracked by a tower.
    #[must_use]
    pub fn tower_target(&self, tower: TowerId) -> Option<EnemyId> {
        query::tower_target(&self.world, tower)
    }

    /// Restarts wave progression from the first wave.
    pub fn start_waves(&mut self) -> Vec<Event> {
        let mut commands = Vec::new();
        self.wave_scheduler.start(&mut commands);
        self.process(commands)
    }

    /// Stops wave progression.
    pub fn stop_waves(&mut self) {
        self.wave_scheduler.stop();
    }

    /// Abandons the enemies of the current wave so the next tick advances.
    pub fn skip_wave(&mut self) {
        self.wave_scheduler.skip();
    }

    /// Human-readable wave progress.
    #[must_use]
    pub fn wave_status(&self) -> String {
        self.wave_scheduler.status()
    }

    /// Wave scheduler driving the game.
    #[must_use]
    pub fn wave_scheduler(&self) -> &WaveScheduler {
        &self.wave_scheduler
    }

    /// Registers a handler for one topic.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.bus.subscribe(topic, handler)
    }

    /// Registers a handler for every event.
    pub fn subscribe_all<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.bus.subscribe_all(handler)
    }

    /// Cancels a subscription.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.bus.unsubscribe(subscription)
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    fn process(&mut self, initial: Vec<Command>) -> Vec<Event> {
        let mut queue: VecDeque<Command> = initial.into();
        let mut published = Vec::new();
        let mut processed = 0usize;

        while let Some(command) = queue.pop_front() {
            processed += 1;
            if processed > MAX_COMMANDS_PER_SUBMISSION {
                warn!(
                    dropped = queue.len() + 1,
                    "command cascade exceeded its limit, dropping the remainder"
                );
                break;
            }

            let mut events = Vec::new();
            world::apply(&mut self.world, command, &mut events);
            if events.is_empty() {
                continue;
            }

            for event in &events {
                self.bus.publish(event);
            }

            let mut emitted = Vec::new();
            self.dispatch(&events, &mut emitted);
            if !emitted.is_empty() {
                debug!(commands = emitted.len(), "systems emitted commands");
            }
            queue.extend(emitted);
            published.extend(events);
        }

        published
    }

    fn dispatch(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let time_advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));
        if time_advanced {
            let enemies = query::enemy_view(&self.world);
            self.movement.handle(events, &enemies, out);
        }

        self.tower_targeting.handle(events, out);
        self.economy.handle(events, out);
        self.wave_scheduler.handle(events, out);
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

fn contains(events: &[Event], topic: Topic) -> bool {
    events.iter().any(|event| event.topic() == topic)
}
