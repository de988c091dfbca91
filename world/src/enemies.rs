//! Authoritative enemy state management utilities.

use std::collections::BTreeMap;

use glam::Vec2;
use slime_defence_core::{EnemyArchetype, EnemyId, EnemySnapshot, Health};

use crate::path::Path;

/// Result of applying damage to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DamageOutcome {
    /// The damage was non-positive or the enemy was already dead.
    Ignored,
    /// Health dropped but the enemy survives.
    Wounded,
    /// Health reached zero with this hit.
    Killed,
}

/// Result of moving an enemy along its path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Progress {
    /// The enemy did not move.
    Stalled,
    /// The enemy moved and is still on the path.
    Moved,
    /// The enemy reached or passed the end of the path.
    ReachedEnd,
}

/// State of a single enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) archetype: String,
    pub(crate) path: String,
    pub(crate) max_health: Health,
    pub(crate) health: Health,
    pub(crate) move_speed: f32,
    pub(crate) despawn_on_finish: bool,
    pub(crate) distance: f32,
    pub(crate) position: Vec2,
    pub(crate) frozen: bool,
    dead: bool,
}

impl Enemy {
    pub(crate) fn spawn(id: EnemyId, archetype: &EnemyArchetype, path_name: &str, path: &Path) -> Self {
        let max_health = Health::new(archetype.max_health);
        Self {
            id,
            archetype: archetype.name.clone(),
            path: path_name.to_owned(),
            max_health,
            health: max_health,
            move_speed: archetype.move_speed,
            despawn_on_finish: archetype.despawn_on_finish,
            distance: 0.0,
            position: path.sample(0.0),
            frozen: false,
            dead: false,
        }
    }

    /// Applies damage with a clamp at zero. Death is reported exactly once.
    pub(crate) fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if amount <= 0 || self.dead {
            return DamageOutcome::Ignored;
        }

        self.health = self.health.saturating_sub(amount.unsigned_abs());
        if self.health.is_zero() {
            self.dead = true;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Adds `distance` to the travelled distance and resamples the position.
    pub(crate) fn advance(&mut self, distance: f32, path: &Path) -> Progress {
        if self.frozen || self.dead || !(distance > 0.0) || !distance.is_finite() {
            return Progress::Stalled;
        }

        self.distance += distance;
        if self.distance >= path.length() {
            self.distance = path.length();
            self.position = path.sample(self.distance);
            return Progress::ReachedEnd;
        }

        self.position = path.sample(self.distance);
        Progress::Moved
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            archetype: self.archetype.clone(),
            health: self.health,
            max_health: self.max_health,
            move_speed: self.move_speed,
            distance: self.distance,
            position: self.position,
            frozen: self.frozen,
        }
    }
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    /// Creates an empty enemy registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn allocate_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        id
    }

    pub(crate) fn insert(&mut self, enemy: Enemy) {
        let _ = self.entries.insert(enemy.id, enemy);
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn ids(&self) -> Vec<EnemyId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }
}
