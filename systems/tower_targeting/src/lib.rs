#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects tower targets from range membership messages.
//!
//! Towers target the first enemy that entered their range and keep it until it
//! leaves, dies, or despawns. The replacement is the earliest-arrived enemy
//! still inside the range.

use std::collections::BTreeMap;

use slime_defence_core::{Command, EnemyId, Event, TowerId};
use tracing::debug;

/// Tower targeting system tracking per-tower membership in arrival order.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    towers: BTreeMap<TowerId, TowerWorkspace>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with no known towers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes membership and lifecycle events and emits target assignments.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::TowerPlaced { tower, .. } => {
                    let _ = self.towers.entry(*tower).or_default();
                }
                Event::TowerRemoved { tower } => {
                    let _ = self.towers.remove(tower);
                }
                Event::EnemyEnteredRange { tower, enemy } => self.enter(*tower, *enemy, out),
                Event::EnemyExitedRange { tower, enemy } => self.leave(*tower, *enemy, out),
                Event::EnemyDied { enemy } | Event::EnemyDespawned { enemy } => {
                    let towers: Vec<TowerId> = self.towers.keys().copied().collect();
                    for tower in towers {
                        self.leave(tower, *enemy, out);
                    }
                }
                _ => {}
            }
        }
    }

    /// Target the system has requested for the tower.
    #[must_use]
    pub fn target(&self, tower: TowerId) -> Option<EnemyId> {
        self.towers.get(&tower).and_then(|workspace| workspace.target)
    }

    /// Enemies inside the tower's range in arrival order.
    #[must_use]
    pub fn in_range(&self, tower: TowerId) -> &[EnemyId] {
        self.towers
            .get(&tower)
            .map(|workspace| workspace.members.as_slice())
            .unwrap_or_default()
    }

    fn enter(&mut self, tower: TowerId, enemy: EnemyId, out: &mut Vec<Command>) {
        let workspace = self.towers.entry(tower).or_default();
        if workspace.members.contains(&enemy) {
            return;
        }

        workspace.members.push(enemy);
        if workspace.target.is_none() {
            workspace.retarget(tower, Some(enemy), out);
        }
    }

    fn leave(&mut self, tower: TowerId, enemy: EnemyId, out: &mut Vec<Command>) {
        let Some(workspace) = self.towers.get_mut(&tower) else {
            return;
        };

        let Some(index) = workspace.members.iter().position(|member| *member == enemy) else {
            return;
        };
        let _ = workspace.members.remove(index);

        if workspace.target == Some(enemy) {
            let next = workspace.members.first().copied();
            workspace.retarget(tower, next, out);
        }
    }
}

#[derive(Clone, Debug, Default)]
struct TowerWorkspace {
    members: Vec<EnemyId>,
    target: Option<EnemyId>,
}

impl TowerWorkspace {
    fn retarget(&mut self, tower: TowerId, target: Option<EnemyId>, out: &mut Vec<Command>) {
        debug!(
            tower = tower.get(),
            enemy = ?target.map(|enemy| enemy.get()),
            "tower target selected"
        );
        self.target = target;
        out.push(Command::AssignTowerTarget { tower, target });
    }
}
