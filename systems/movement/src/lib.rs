#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that turns elapsed time into path advancement requests.

use std::time::Duration;

use slime_defence_core::{Command, EnemyView, Event};

/// Pure system that reacts to time events and emits enemy advancement commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Movement;

impl Movement {
    /// Creates a new movement system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Consumes world events and the enemy view to emit movement commands.
    ///
    /// Every non-frozen enemy advances by `move_speed * dt`, where `dt` is the
    /// total time carried by the batch. Enemies are visited in identifier order.
    pub fn handle(&mut self, events: &[Event], enemies: &EnemyView, out: &mut Vec<Command>) {
        let elapsed = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);

        if elapsed.is_zero() {
            return;
        }

        let seconds = elapsed.as_secs_f32();
        for enemy in enemies.iter() {
            if enemy.frozen {
                continue;
            }

            let distance = enemy.move_speed * seconds;
            if distance > 0.0 {
                out.push(Command::AdvanceEnemy {
                    enemy: enemy.id,
                    distance,
                });
            }
        }
    }
}
