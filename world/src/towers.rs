//! Authoritative tower state management utilities.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use slime_defence_core::{EnemyId, TowerId, TowerKind, TowerSnapshot};

/// Rotation added to the cannon heading so sprites drawn facing up point at the target.
pub(crate) const CANNON_ROTATION_OFFSET_DEGREES: f32 = 90.0;

/// Direction vectors shorter than this squared length leave the aim unchanged.
const MIN_AIM_LENGTH_SQUARED: f32 = 1e-4;

/// Snapshot of a tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Centre of the tower.
    pub(crate) position: Vec2,
    /// Effective detection radius.
    pub(crate) range: f32,
    /// Enemies currently inside the detection radius.
    pub(crate) contained: BTreeSet<EnemyId>,
    /// Enemy the tower tracks. Always a member of `contained` when set.
    pub(crate) target: Option<EnemyId>,
    /// Cannon heading in radians.
    pub(crate) aim: f32,
}

impl TowerState {
    pub(crate) fn covers(&self, point: Vec2) -> bool {
        self.position.distance_squared(point) <= self.range * self.range
    }

    /// Points the cannon at `point`. No prediction or leading is applied.
    pub(crate) fn aim_at(&mut self, point: Vec2) {
        let direction = point - self.position;
        if direction.length_squared() < MIN_AIM_LENGTH_SQUARED {
            return;
        }

        self.aim = direction.y.atan2(direction.x) + CANNON_ROTATION_OFFSET_DEGREES.to_radians();
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            range: self.range,
            target: self.target,
            aim: self.aim,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Stores a new tower and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, position: Vec2, range: f32) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                position,
                range,
                contained: BTreeSet::new(),
                target: None,
                aim: 0.0,
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: TowerId) -> Option<TowerState> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: TowerId) -> Option<&TowerState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }
}
