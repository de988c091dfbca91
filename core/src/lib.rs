#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Slime Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! [`EventBus`] subscribers to react to synchronously. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

mod bus;

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use bus::{EventBus, SubscriptionId};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Slime Defence.";

/// Lowest maximum health any enemy archetype may declare.
pub const MIN_HEALTH: u32 = 1;

/// Slowest movement speed accepted for an enemy archetype, in world units per second.
pub const MIN_ENEMY_SPEED: f32 = 50.0;

/// Fastest movement speed accepted for an enemy archetype, in world units per second.
pub const MAX_ENEMY_SPEED: f32 = 300.0;

/// Smallest detection radius accepted for a tower, in world units.
pub const MIN_TOWER_RANGE: f32 = 50.0;

/// Largest detection radius accepted for a tower, in world units.
pub const MAX_TOWER_RANGE: f32 = 500.0;

/// Coarse state of the game session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// No game is running yet.
    #[default]
    MainMenu,
    /// The simulation advances on every tick.
    Playing,
    /// Ticks are ignored until the session resumes.
    Paused,
    /// The session finished with an [`Outcome`].
    GameOver,
}

/// Result of a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every wave of a finite schedule was cleared.
    Victory,
    /// The player's health reached zero.
    Defeat,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Registers or replaces the enemy archetype stored under its name.
    RegisterArchetype {
        /// Descriptor of the archetype to register.
        archetype: EnemyArchetype,
    },
    /// Registers or replaces a named path that enemies can follow.
    ConfigurePath {
        /// Name used to select the path when spawning.
        name: String,
        /// Ordered waypoints of the path polyline.
        waypoints: Vec<Vec2>,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of host time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Starts a new session from the main menu or after a game over.
    StartGame,
    /// Pauses a running session.
    PauseGame,
    /// Resumes a paused session.
    ResumeGame,
    /// Pauses a running session or resumes a paused one.
    TogglePause,
    /// Finishes the session with the provided outcome.
    EndGame {
        /// Outcome recorded for the session.
        outcome: Outcome,
    },
    /// Sets the multiplier applied to every tick delta.
    SetTimeScale {
        /// Requested multiplier; negative values clamp to zero.
        scale: f32,
    },
    /// Credits money to the player.
    AddMoney {
        /// Amount of money to credit.
        amount: i32,
    },
    /// Attempts to debit money from the player.
    SpendMoney {
        /// Amount of money to debit.
        amount: i32,
    },
    /// Credits score to the player.
    AddScore {
        /// Number of points to credit.
        points: i32,
    },
    /// Inflicts damage on the player.
    DamagePlayer {
        /// Amount of health to remove.
        amount: i32,
    },
    /// Records the wave that is currently in progress.
    SetCurrentWave {
        /// One-based wave number.
        wave: u32,
    },
    /// Requests that a new enemy enters a path.
    SpawnEnemy {
        /// Name of the archetype describing the enemy.
        archetype: String,
        /// Path to follow; `None` picks one of the configured paths at random.
        path: Option<String>,
    },
    /// Moves an enemy further along its path.
    AdvanceEnemy {
        /// Identifier of the enemy to move.
        enemy: EnemyId,
        /// Distance to add to the enemy's progress, in world units.
        distance: f32,
    },
    /// Applies damage to an enemy.
    DamageEnemy {
        /// Identifier of the enemy receiving damage.
        enemy: EnemyId,
        /// Amount of damage; values at or below zero are ignored.
        amount: i32,
    },
    /// Places a tower at the provided position.
    PlaceTower {
        /// Kind of tower to construct.
        kind: TowerKind,
        /// Centre of the tower in world units.
        position: Vec2,
        /// Detection radius override; `None` or a non-positive value uses the kind's default.
        range: Option<f32>,
    },
    /// Removes a tower from the world.
    RemoveTower {
        /// Identifier of the tower to remove.
        tower: TowerId,
    },
    /// Assigns or clears the current target of a tower.
    AssignTowerTarget {
        /// Tower whose target changes.
        tower: TowerId,
        /// New target, or `None` to clear it.
        target: Option<EnemyId>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced while the session was playing.
    TimeAdvanced {
        /// Scaled duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a session started.
    GameStarted,
    /// Announces that the running session paused.
    GamePaused,
    /// Announces that the paused session resumed.
    GameResumed,
    /// Announces that the session finished.
    GameEnded {
        /// Outcome recorded for the session.
        outcome: Outcome,
    },
    /// Announces that a new wave became current.
    WaveStarted {
        /// One-based wave number.
        wave: u32,
    },
    /// Reports that money was credited to the player.
    MoneyChanged {
        /// Amount credited.
        amount: i32,
        /// Balance after the credit.
        balance: i32,
    },
    /// Confirms that a spend request succeeded.
    MoneySpent {
        /// Amount debited.
        amount: i32,
        /// Balance after the debit.
        balance: i32,
    },
    /// Reports that a spend request was rejected.
    SpendRejected {
        /// Amount that was requested.
        amount: i32,
        /// Balance that remained untouched.
        balance: i32,
    },
    /// Reports that score was credited to the player.
    ScoreChanged {
        /// Points credited.
        points: i32,
        /// Score after the credit.
        total: i32,
    },
    /// Reports that the player took damage.
    PlayerDamaged {
        /// Damage inflicted.
        amount: i32,
        /// Health remaining after the damage.
        health: i32,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype the enemy was created from.
        archetype: String,
        /// Path the enemy follows.
        path: String,
    },
    /// Reports that a spawn request was rejected.
    SpawnRejected {
        /// Archetype named in the request.
        archetype: String,
        /// Reason the spawn failed.
        reason: SpawnError,
    },
    /// Reports that an enemy lost health.
    EnemyDamageTaken {
        /// Enemy that took damage.
        enemy: EnemyId,
        /// Damage requested by the caller.
        amount: i32,
    },
    /// Reports that an enemy's health reached zero. Published once per enemy.
    EnemyDied {
        /// Enemy that died.
        enemy: EnemyId,
    },
    /// Reports that an enemy reached the end of its path.
    EnemyReachedEnd {
        /// Enemy that finished its path.
        enemy: EnemyId,
    },
    /// Confirms that an enemy was removed from the world without dying.
    EnemyDespawned {
        /// Enemy that was removed.
        enemy: EnemyId,
    },
    /// Reports that an enemy entered a tower's detection radius.
    EnemyEnteredRange {
        /// Tower whose detection region changed.
        tower: TowerId,
        /// Enemy that entered.
        enemy: EnemyId,
    },
    /// Reports that an enemy left a tower's detection radius or the world.
    EnemyExitedRange {
        /// Tower whose detection region changed.
        tower: TowerId,
        /// Enemy that left.
        enemy: EnemyId,
    },
    /// Confirms that a tower was placed.
    TowerPlaced {
        /// Identifier assigned to the tower.
        tower: TowerId,
        /// Kind of tower placed.
        kind: TowerKind,
        /// Centre of the tower in world units.
        position: Vec2,
        /// Effective detection radius.
        range: f32,
    },
    /// Confirms that a tower was removed.
    TowerRemoved {
        /// Identifier of the removed tower.
        tower: TowerId,
    },
    /// Reports that a tower acquired, switched, or lost its target.
    TowerTargetChanged {
        /// Tower whose target changed.
        tower: TowerId,
        /// New target, or `None` when the tower has no target.
        target: Option<EnemyId>,
    },
}

impl Event {
    /// Topic under which the event is published on an [`EventBus`].
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::TimeAdvanced { .. } => Topic::TimeAdvanced,
            Self::GameStarted => Topic::GameStarted,
            Self::GamePaused => Topic::GamePaused,
            Self::GameResumed => Topic::GameResumed,
            Self::GameEnded { .. } => Topic::GameEnded,
            Self::WaveStarted { .. } => Topic::WaveStarted,
            Self::MoneyChanged { .. } => Topic::MoneyChanged,
            Self::MoneySpent { .. } => Topic::MoneySpent,
            Self::SpendRejected { .. } => Topic::SpendRejected,
            Self::ScoreChanged { .. } => Topic::ScoreChanged,
            Self::PlayerDamaged { .. } => Topic::PlayerDamaged,
            Self::EnemySpawned { .. } => Topic::EnemySpawned,
            Self::SpawnRejected { .. } => Topic::SpawnRejected,
            Self::EnemyDamageTaken { .. } => Topic::EnemyDamageTaken,
            Self::EnemyDied { .. } => Topic::EnemyDied,
            Self::EnemyReachedEnd { .. } => Topic::EnemyReachedEnd,
            Self::EnemyDespawned { .. } => Topic::EnemyDespawned,
            Self::EnemyEnteredRange { .. } => Topic::EnemyEnteredRange,
            Self::EnemyExitedRange { .. } => Topic::EnemyExitedRange,
            Self::TowerPlaced { .. } => Topic::TowerPlaced,
            Self::TowerRemoved { .. } => Topic::TowerRemoved,
            Self::TowerTargetChanged { .. } => Topic::TowerTargetChanged,
        }
    }
}

/// Payload-free discriminant of an [`Event`], used to filter subscriptions.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    TimeAdvanced,
    GameStarted,
    GamePaused,
    GameResumed,
    GameEnded,
    WaveStarted,
    MoneyChanged,
    MoneySpent,
    SpendRejected,
    ScoreChanged,
    PlayerDamaged,
    EnemySpawned,
    SpawnRejected,
    EnemyDamageTaken,
    EnemyDied,
    EnemyReachedEnd,
    EnemyDespawned,
    EnemyEnteredRange,
    EnemyExitedRange,
    TowerPlaced,
    TowerRemoved,
    TowerTargetChanged,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// No archetype is registered under the requested name.
    UnknownArchetype,
    /// The requested path, or any path at all, is not configured.
    MissingPath,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Remaining hit points of an enemy. Never negative by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Health(u32);

impl Health {
    /// Creates a health value from raw hit points.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw hit points.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Subtracts damage, clamping at zero.
    #[must_use]
    pub const fn saturating_sub(self, damage: u32) -> Self {
        Self(self.0.saturating_sub(damage))
    }
}

/// Data-driven description of an enemy type, selected by name when spawning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    /// Unique name of the archetype, for example `"slime"`.
    pub name: String,
    /// Health every enemy of this archetype spawns with.
    pub max_health: u32,
    /// Movement speed along the path in world units per second.
    pub move_speed: f32,
    /// Whether enemies are removed when they reach the end of their path.
    /// When `false` they freeze at the end instead.
    #[serde(default = "default_despawn_on_finish")]
    pub despawn_on_finish: bool,
}

fn default_despawn_on_finish() -> bool {
    true
}

impl EnemyArchetype {
    /// Creates an archetype that despawns at the end of its path.
    #[must_use]
    pub fn new(name: impl Into<String>, max_health: u32, move_speed: f32) -> Self {
        Self {
            name: name.into(),
            max_health,
            move_speed,
            despawn_on_finish: true,
        }
    }

    /// Returns the archetype with the provided end-of-path behaviour.
    #[must_use]
    pub fn with_despawn_on_finish(mut self, despawn_on_finish: bool) -> Self {
        self.despawn_on_finish = despawn_on_finish;
        self
    }

    /// Slow, fragile enemy used by the default wave schedule.
    #[must_use]
    pub fn slime() -> Self {
        Self::new("slime", 10, 160.0)
    }

    /// Sturdier enemy that trades speed for health.
    #[must_use]
    pub fn orc() -> Self {
        Self::new("orc", 20, 120.0)
    }
}

/// Types of towers that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TowerKind {
    /// Basic tower with default detection parameters.
    Basic,
}

impl TowerKind {
    /// Detection radius used when no override is provided, in world units.
    #[must_use]
    pub const fn default_range(self) -> f32 {
        match self {
            Self::Basic => 250.0,
        }
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype the enemy was spawned from.
    pub archetype: String,
    /// Remaining health.
    pub health: Health,
    /// Health the enemy spawned with.
    pub max_health: Health,
    /// Movement speed in world units per second.
    pub move_speed: f32,
    /// Distance travelled along the path.
    pub distance: f32,
    /// Current position sampled from the path.
    pub position: Vec2,
    /// Whether the enemy stopped at the end of its path.
    pub frozen: bool,
}

/// Read-only snapshot describing all enemies in the world.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single enemy.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&enemy, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Centre of the tower in world units.
    pub position: Vec2,
    /// Effective detection radius.
    pub range: f32,
    /// Enemy the tower currently tracks.
    pub target: Option<EnemyId>,
    /// Facing angle of the tower's cannon in radians.
    pub aim: f32,
}

/// Read-only snapshot describing all towers in the world.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single tower.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}
