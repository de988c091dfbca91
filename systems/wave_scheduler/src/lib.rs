#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler that sequences timed enemy spawns across ordered waves.

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};
use slime_defence_core::{Command, EnemyId, Event, Outcome};
use tracing::{debug, info, warn};

const FALLBACK_ARCHETYPE: &str = "slime";
const FALLBACK_COUNT: u32 = 5;
const FALLBACK_SPAWN_INTERVAL: f32 = 1.0;

/// A timed batch of enemies of one archetype.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveDefinition {
    /// Archetype requested for every spawn of the wave.
    pub archetype: String,
    /// Number of enemies the wave spawns.
    pub count: u32,
    /// Seconds between consecutive spawns.
    pub spawn_interval: f32,
    /// Seconds to wait before the first spawn.
    #[serde(default)]
    pub start_delay: f32,
}

impl WaveDefinition {
    /// Creates a wave definition.
    #[must_use]
    pub fn new(
        archetype: impl Into<String>,
        count: u32,
        spawn_interval: f32,
        start_delay: f32,
    ) -> Self {
        Self {
            archetype: archetype.into(),
            count,
            spawn_interval,
            start_delay,
        }
    }

    fn fallback() -> Self {
        Self::new(FALLBACK_ARCHETYPE, FALLBACK_COUNT, FALLBACK_SPAWN_INTERVAL, 0.0)
    }
}

/// Ordered list of waves plus the rules for playing past its end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveSchedule {
    /// Waves in play order.
    pub waves: Vec<WaveDefinition>,
    /// Keeps replaying the last wave with a growing count instead of ending in victory.
    pub repeat_last: bool,
    /// Count multiplier applied per wave past the end of a repeating schedule.
    pub growth: f32,
    /// Lower bound applied to every spawn interval, in seconds.
    pub min_spawn_interval: f32,
}

impl Default for WaveSchedule {
    fn default() -> Self {
        let waves = [(5, 1.0), (8, 0.8), (10, 0.7), (15, 0.6), (20, 0.5)]
            .into_iter()
            .map(|(count, interval)| WaveDefinition::new("slime", count, interval, 2.0))
            .collect();

        Self {
            waves,
            repeat_last: false,
            growth: 1.1,
            min_spawn_interval: 0.5,
        }
    }
}

impl WaveSchedule {
    /// Creates a non-repeating schedule with default growth and interval floor.
    #[must_use]
    pub fn new(waves: Vec<WaveDefinition>) -> Self {
        Self {
            waves,
            ..Self::default()
        }
    }

    /// Switches the schedule to replay its last wave indefinitely.
    #[must_use]
    pub fn repeating(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Number of waves defined explicitly.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Reports whether no wave is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Resolves the 1-based wave number to its definition and enemy count.
    ///
    /// Waves past the end of a repeating schedule reuse the last definition with
    /// the count scaled by `growth^(wave - len)`. Unknown waves fall back to a
    /// small slime wave.
    #[must_use]
    pub fn resolve(&self, wave: u32) -> (WaveDefinition, u32) {
        let index = usize::try_from(wave).unwrap_or(usize::MAX).saturating_sub(1);
        if wave > 0 {
            if let Some(definition) = self.waves.get(index) {
                return (definition.clone(), definition.count);
            }
        }

        if self.repeat_last && wave > 0 {
            if let Some(last) = self.waves.last() {
                let past_end = u32::try_from(self.waves.len())
                    .map_or(0, |len| wave.saturating_sub(len));
                return (last.clone(), scaled_count(last.count, self.growth, past_end));
            }
        }

        warn!(wave, "wave is not defined, falling back to the default wave");
        let fallback = WaveDefinition::fallback();
        let count = fallback.count;
        (fallback, count)
    }

    fn spawn_interval(&self, definition: &WaveDefinition) -> Duration {
        seconds(definition.spawn_interval.max(self.min_spawn_interval))
    }
}

/// Count of a repeated wave: `round(count * growth^waves_past_end)`.
#[must_use]
pub fn scaled_count(count: u32, growth: f32, waves_past_end: u32) -> u32 {
    let factor = f64::from(growth).powf(f64::from(waves_past_end));
    let scaled = (f64::from(count) * factor).round();
    // Float-to-int casts saturate and map NaN to zero.
    scaled as u32
}

fn seconds(value: f32) -> Duration {
    Duration::try_from_secs_f32(value.max(0.0)).unwrap_or(Duration::ZERO)
}

/// Coarse state of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// No wave is running.
    Idle,
    /// The current wave's start delay is counting down.
    WaitingToStart,
    /// Enemies of the current wave are being spawned or are still alive.
    Spawning,
    /// Every enemy of the current wave is gone; the next tick advances.
    WaveCleared,
}

/// Pure system that emits wave progression and spawn commands.
#[derive(Debug)]
pub struct WaveScheduler {
    schedule: WaveSchedule,
    phase: WavePhase,
    wave_number: u32,
    current: Option<WaveDefinition>,
    spawn_interval: Duration,
    countdown: Duration,
    remaining_to_spawn: u32,
    alive: u32,
    pending_spawns: u32,
    tracked: BTreeSet<EnemyId>,
}

impl WaveScheduler {
    /// Creates an idle scheduler for the provided schedule.
    #[must_use]
    pub fn new(schedule: WaveSchedule) -> Self {
        Self {
            schedule,
            phase: WavePhase::Idle,
            wave_number: 0,
            current: None,
            spawn_interval: Duration::ZERO,
            countdown: Duration::ZERO,
            remaining_to_spawn: 0,
            alive: 0,
            pending_spawns: 0,
            tracked: BTreeSet::new(),
        }
    }

    /// Replaces the schedule. Takes effect from the next selected wave.
    pub fn set_schedule(&mut self, schedule: WaveSchedule) {
        info!(waves = schedule.len(), "wave schedule replaced");
        self.schedule = schedule;
    }

    /// Schedule the scheduler plays.
    #[must_use]
    pub fn schedule(&self) -> &WaveSchedule {
        &self.schedule
    }

    /// Consumes world events and emits the commands they trigger.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::GameStarted => self.start(out),
                Event::GameEnded { .. } => self.stop(),
                Event::EnemySpawned { enemy, .. } => {
                    if self.pending_spawns > 0 {
                        self.pending_spawns -= 1;
                        let _ = self.tracked.insert(*enemy);
                    }
                }
                Event::SpawnRejected { archetype, reason } => {
                    if self.pending_spawns > 0 {
                        self.pending_spawns -= 1;
                        self.alive = self.alive.saturating_sub(1);
                        warn!(
                            wave = self.wave_number,
                            archetype = %archetype,
                            ?reason,
                            "wave spawn failed, enemy dropped from the wave"
                        );
                    }
                }
                Event::EnemyDied { enemy } | Event::EnemyDespawned { enemy } => {
                    if self.tracked.remove(enemy) {
                        self.alive = self.alive.saturating_sub(1);
                        debug!(wave = self.wave_number, alive = self.alive, "wave enemy gone");
                    }
                }
                Event::TimeAdvanced { dt } => self.advance(*dt, out),
                _ => {}
            }
            self.mark_cleared();
        }
    }

    /// Resets the wave number and begins the first wave.
    pub fn start(&mut self, out: &mut Vec<Command>) {
        self.reset_counters();
        self.wave_number = 0;
        info!("wave progression started");
        self.start_next_wave(out);
    }

    /// Deactivates the scheduler and zeroes every counter.
    pub fn stop(&mut self) {
        if self.phase != WavePhase::Idle {
            info!(wave = self.wave_number, "wave progression stopped");
        }
        self.reset_counters();
        self.wave_number = 0;
    }

    /// Forgets the current wave's enemies so it clears on the next evaluation.
    pub fn skip(&mut self) {
        if self.phase == WavePhase::Idle {
            return;
        }

        info!(wave = self.wave_number, "skipping to the next wave");
        self.remaining_to_spawn = 0;
        self.alive = 0;
        self.tracked.clear();
        self.mark_cleared();
    }

    /// Human-readable progress summary.
    #[must_use]
    pub fn status(&self) -> String {
        if self.wave_number == 0 {
            return "No wave started".to_owned();
        }

        format!(
            "Wave {}: {} alive, {} to spawn",
            self.wave_number, self.alive, self.remaining_to_spawn
        )
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Reports whether a wave is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.phase != WavePhase::Idle
    }

    /// 1-based number of the current wave, zero before the first.
    #[must_use]
    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    /// Enemies of the current wave that are not gone yet, spawned or not.
    #[must_use]
    pub fn alive(&self) -> u32 {
        self.alive
    }

    /// Enemies of the current wave that still have to be spawned.
    #[must_use]
    pub fn remaining_to_spawn(&self) -> u32 {
        self.remaining_to_spawn
    }

    fn reset_counters(&mut self) {
        self.phase = WavePhase::Idle;
        self.current = None;
        self.spawn_interval = Duration::ZERO;
        self.countdown = Duration::ZERO;
        self.remaining_to_spawn = 0;
        self.alive = 0;
        self.pending_spawns = 0;
        self.tracked.clear();
    }

    fn start_next_wave(&mut self, out: &mut Vec<Command>) {
        self.wave_number = self.wave_number.saturating_add(1);
        let wave = self.wave_number;
        let exhausted =
            usize::try_from(wave).map_or(true, |index| index > self.schedule.len());

        if !self.schedule.repeat_last && exhausted {
            info!(wave, "all waves completed");
            self.declare_victory(out);
            return;
        }

        out.push(Command::SetCurrentWave { wave });

        let (definition, count) = self.schedule.resolve(wave);
        self.spawn_interval = self.schedule.spawn_interval(&definition);
        self.countdown = seconds(definition.start_delay);
        self.remaining_to_spawn = count;
        self.alive = count;
        self.pending_spawns = 0;
        self.tracked.clear();
        self.phase = WavePhase::WaitingToStart;
        info!(
            wave,
            archetype = %definition.archetype,
            count,
            start_delay = definition.start_delay,
            "next wave scheduled"
        );
        self.current = Some(definition);
    }

    fn finish_current_wave(&mut self, out: &mut Vec<Command>) {
        info!(wave = self.wave_number, "wave cleared");
        let last_defined = usize::try_from(self.wave_number)
            .map_or(true, |index| index >= self.schedule.len());

        if !self.schedule.repeat_last && last_defined {
            self.declare_victory(out);
            return;
        }

        self.start_next_wave(out);
    }

    fn declare_victory(&mut self, out: &mut Vec<Command>) {
        out.push(Command::EndGame {
            outcome: Outcome::Victory,
        });
        self.reset_counters();
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        match self.phase {
            WavePhase::Idle => {}
            WavePhase::WaitingToStart => {
                self.countdown = self.countdown.saturating_sub(dt);
                if self.countdown.is_zero() {
                    self.phase = WavePhase::Spawning;
                    info!(wave = self.wave_number, "wave spawning");
                }
            }
            WavePhase::Spawning => {
                if self.remaining_to_spawn > 0 {
                    self.countdown = self.countdown.saturating_sub(dt);
                    if self.countdown.is_zero() {
                        self.spawn(out);
                        self.countdown = self.spawn_interval;
                    }
                } else if self.alive == 0 {
                    self.finish_current_wave(out);
                }
            }
            WavePhase::WaveCleared => self.finish_current_wave(out),
        }
    }

    fn spawn(&mut self, out: &mut Vec<Command>) {
        let Some(definition) = &self.current else {
            return;
        };

        self.remaining_to_spawn -= 1;
        self.pending_spawns = self.pending_spawns.saturating_add(1);
        debug!(
            wave = self.wave_number,
            remaining = self.remaining_to_spawn,
            "requesting wave spawn"
        );
        out.push(Command::SpawnEnemy {
            archetype: definition.archetype.clone(),
            path: None,
        });
    }

    fn mark_cleared(&mut self) {
        if self.phase == WavePhase::Spawning && self.remaining_to_spawn == 0 && self.alive == 0 {
            self.phase = WavePhase::WaveCleared;
        }
    }
}

impl Default for WaveScheduler {
    fn default() -> Self {
        Self::new(WaveSchedule::default())
    }
}
