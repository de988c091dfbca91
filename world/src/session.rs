//! Player session: health, money, score, and coarse game-state transitions.

use std::time::Duration;

use slime_defence_core::{Event, GameState, Outcome};
use tracing::{debug, info, warn};

/// Starting values applied whenever a session starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionRules {
    /// Player health at the start of a session.
    pub starting_health: i32,
    /// Player money at the start of a session.
    pub starting_money: i32,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            starting_health: 100,
            starting_money: 500,
        }
    }
}

/// Explicit session context owned by the world.
///
/// Every operation reports success through its return value and publishes
/// the resulting events into `out`. Rejected operations leave the session
/// untouched and log a warning.
#[derive(Clone, Debug)]
pub struct Session {
    rules: SessionRules,
    state: GameState,
    outcome: Option<Outcome>,
    health: i32,
    money: i32,
    score: i32,
    current_wave: u32,
    time_scale: f32,
}

impl Session {
    /// Creates a session waiting in the main menu.
    #[must_use]
    pub fn new(rules: SessionRules) -> Self {
        Self {
            rules,
            state: GameState::MainMenu,
            outcome: None,
            health: rules.starting_health,
            money: rules.starting_money,
            score: 0,
            current_wave: 0,
            time_scale: 1.0,
        }
    }

    /// Current coarse state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Outcome of the session once it is over.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Remaining player health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Money available to the player.
    #[must_use]
    pub const fn money(&self) -> i32 {
        self.money
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> i32 {
        self.score
    }

    /// One-based number of the wave in progress, or zero before the first wave.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Multiplier applied to host tick deltas.
    #[must_use]
    pub const fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Reports whether ticks currently advance the simulation.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == GameState::Playing
    }

    /// Reports whether [`Session::start`] would be accepted.
    #[must_use]
    pub fn can_start(&self) -> bool {
        matches!(self.state, GameState::MainMenu | GameState::GameOver)
    }

    /// Starts a fresh session from the main menu or after a game over.
    pub fn start(&mut self, out: &mut Vec<Event>) -> bool {
        if !self.can_start() {
            warn!(state = ?self.state, "cannot start a session that is already in progress");
            return false;
        }

        self.health = self.rules.starting_health;
        self.money = self.rules.starting_money;
        self.score = 0;
        self.current_wave = 0;
        self.time_scale = 1.0;
        self.outcome = None;
        self.state = GameState::Playing;

        info!("game started");
        out.push(Event::GameStarted);
        true
    }

    /// Pauses a running session.
    pub fn pause(&mut self, out: &mut Vec<Event>) -> bool {
        if self.state != GameState::Playing {
            warn!(state = ?self.state, "only a running session can be paused");
            return false;
        }

        self.state = GameState::Paused;
        info!("game paused");
        out.push(Event::GamePaused);
        true
    }

    /// Resumes a paused session.
    pub fn resume(&mut self, out: &mut Vec<Event>) -> bool {
        if self.state != GameState::Paused {
            warn!(state = ?self.state, "only a paused session can be resumed");
            return false;
        }

        self.state = GameState::Playing;
        info!("game resumed");
        out.push(Event::GameResumed);
        true
    }

    /// Pauses a running session or resumes a paused one; ignored otherwise.
    pub fn toggle_pause(&mut self, out: &mut Vec<Event>) -> bool {
        match self.state {
            GameState::Playing => self.pause(out),
            GameState::Paused => self.resume(out),
            GameState::MainMenu | GameState::GameOver => false,
        }
    }

    /// Finishes the session. Ignored once the session is already over.
    pub fn end(&mut self, outcome: Outcome, out: &mut Vec<Event>) -> bool {
        if self.state == GameState::GameOver {
            return false;
        }

        self.state = GameState::GameOver;
        self.outcome = Some(outcome);
        match outcome {
            Outcome::Victory => info!(score = self.score, "victory, every wave was cleared"),
            Outcome::Defeat => info!(score = self.score, "defeat, player health reached zero"),
        }
        out.push(Event::GameEnded { outcome });
        true
    }

    /// Credits money. Negative amounts are rejected.
    pub fn add_money(&mut self, amount: i32, out: &mut Vec<Event>) -> bool {
        if amount < 0 {
            warn!(amount, "refusing to add a negative amount of money");
            return false;
        }

        self.money = self.money.saturating_add(amount);
        debug!(amount, balance = self.money, "money added");
        out.push(Event::MoneyChanged {
            amount,
            balance: self.money,
        });
        true
    }

    /// Debits money when the balance covers it.
    ///
    /// Non-positive amounts and amounts above the balance are rejected and
    /// leave the balance unchanged.
    pub fn try_spend_money(&mut self, amount: i32, out: &mut Vec<Event>) -> bool {
        if amount <= 0 {
            warn!(amount, "refusing to spend a non-positive amount of money");
            out.push(Event::SpendRejected {
                amount,
                balance: self.money,
            });
            return false;
        }

        if self.money < amount {
            info!(amount, balance = self.money, "insufficient money");
            out.push(Event::SpendRejected {
                amount,
                balance: self.money,
            });
            return false;
        }

        self.money -= amount;
        debug!(amount, balance = self.money, "money spent");
        out.push(Event::MoneySpent {
            amount,
            balance: self.money,
        });
        true
    }

    /// Credits score. Negative amounts are rejected.
    pub fn add_score(&mut self, points: i32, out: &mut Vec<Event>) -> bool {
        if points < 0 {
            warn!(points, "refusing to add negative score");
            return false;
        }

        self.score = self.score.saturating_add(points);
        debug!(points, total = self.score, "score added");
        out.push(Event::ScoreChanged {
            points,
            total: self.score,
        });
        true
    }

    /// Removes player health, clamping at zero. Reaching zero ends the session in defeat.
    pub fn take_damage(&mut self, amount: i32, out: &mut Vec<Event>) -> bool {
        if amount <= 0 {
            warn!(amount, "refusing to apply non-positive damage");
            return false;
        }

        self.health = self.health.saturating_sub(amount).max(0);
        debug!(amount, health = self.health, "player damaged");
        out.push(Event::PlayerDamaged {
            amount,
            health: self.health,
        });

        if self.health == 0 {
            let _ = self.end(Outcome::Defeat, out);
        }
        true
    }

    /// Records the wave in progress.
    pub fn set_current_wave(&mut self, wave: u32, out: &mut Vec<Event>) {
        self.current_wave = wave;
        info!(wave, "wave started");
        out.push(Event::WaveStarted { wave });
    }

    /// Sets the tick multiplier, clamping negative or invalid values to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    /// Applies the time scale to a host tick delta.
    #[must_use]
    pub fn scaled(&self, dt: Duration) -> Duration {
        if self.time_scale == 1.0 {
            return dt;
        }
        Duration::try_from_secs_f32(dt.as_secs_f32() * self.time_scale).unwrap_or(Duration::MAX)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionRules::default())
    }
}
