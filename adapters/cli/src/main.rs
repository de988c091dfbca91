#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Slime Defence game.

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use slime_defence_core::GameState;
use slime_defence_simulation::{GameConfig, Simulation};
use slime_defence_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slime-defence")]
#[command(about = "Runs a headless Slime Defence game and prints the result")]
struct Args {
    /// TOML game configuration. Built-in defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulation ticks per second of game time.
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,

    /// Maximum game time to simulate, in seconds.
    #[arg(long, default_value_t = 600.0)]
    duration: f32,

    /// Multiplier applied to every tick.
    #[arg(long, default_value_t = 1.0)]
    time_scale: f32,
}

/// Entry point for the Slime Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    ensure!(args.tick_rate > 0, "--tick-rate must be positive");
    ensure!(
        args.duration.is_finite() && args.duration >= 0.0,
        "--duration must be a non-negative number of seconds"
    );

    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading game configuration from {}", path.display()))?,
        None => GameConfig::default(),
    };

    let mut simulation = Simulation::new(&config);
    println!("{}", query::welcome_banner(simulation.world()));

    ensure!(simulation.start_game(), "the game refused to start");
    simulation.set_time_scale(args.time_scale);

    let dt = Duration::from_secs(1) / args.tick_rate;
    let ticks = (f64::from(args.duration) * f64::from(args.tick_rate)).ceil() as u64;
    let mut elapsed = 0u64;
    while elapsed < ticks && query::session(simulation.world()).state() != GameState::GameOver {
        let _ = simulation.step(dt);
        elapsed += 1;
    }

    let session = query::session(simulation.world());
    info!(ticks = elapsed, "simulation finished");
    match session.outcome() {
        Some(outcome) => println!("Game over: {outcome:?}"),
        None => println!("Still playing after {:.1}s", args.duration),
    }
    println!("Wave reached: {}", session.current_wave());
    println!("Health: {}", session.health());
    println!("Money: {}", session.money());
    println!("Score: {}", session.score());
    println!("{}", simulation.wave_status());
    Ok(())
}
