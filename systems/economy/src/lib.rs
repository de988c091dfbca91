#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Economy system that pays out for kills and charges the player for leaks.

use serde::{Deserialize, Serialize};
use slime_defence_core::{Command, Event};

/// Amounts exchanged when enemies die or reach the end of their path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    /// Money granted per enemy killed.
    pub kill_money: i32,
    /// Score granted per enemy killed.
    pub kill_score: i32,
    /// Player damage dealt per enemy reaching the end of its path.
    pub leak_damage: i32,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            kill_money: 50,
            kill_score: 100,
            leak_damage: 10,
        }
    }
}

/// Pure system translating enemy outcomes into session commands.
#[derive(Debug, Default)]
pub struct Economy {
    rewards: Rewards,
}

impl Economy {
    /// Creates an economy system that pays the provided rewards.
    #[must_use]
    pub fn new(rewards: Rewards) -> Self {
        Self { rewards }
    }

    /// Rewards the system pays.
    #[must_use]
    pub fn rewards(&self) -> Rewards {
        self.rewards
    }

    /// Consumes world events and emits money, score, and damage commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::EnemyDied { .. } => {
                    out.push(Command::AddMoney {
                        amount: self.rewards.kill_money,
                    });
                    out.push(Command::AddScore {
                        points: self.rewards.kill_score,
                    });
                }
                Event::EnemyReachedEnd { .. } => out.push(Command::DamagePlayer {
                    amount: self.rewards.leak_damage,
                }),
                _ => {}
            }
        }
    }
}
