//! Headless Ironfront runner.
//!
//! Loads a map and a config, drives the players from a script, runs the
//! simulation for a number of ticks and prints a JSON summary on stdout.
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).

mod script;
mod summary;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ironfront_core::{GameConfig, PlayerSlot, Simulation};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::script::Script;
use crate::summary::{EventTally, RunSummary};

#[derive(Parser, Debug)]
#[command(name = "ironfront", version)]
#[command(about = "Run an Ironfront tank arena headless and print a JSON summary")]
struct Cli {
    /// Map file, one row of symbols per line. Defaults to the built-in map.
    #[arg(long)]
    map: Option<PathBuf>,
    /// JSON game config. Fields it leaves out keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON array of timed player intents. Defaults to the sweep script.
    #[arg(long)]
    script: Option<PathBuf>,
    /// Master seed.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Ticks to simulate (60 per second).
    #[arg(long, default_value_t = 3600)]
    ticks: u64,
    /// Add the second player.
    #[arg(long)]
    two_player: bool,
    /// Ticks per heading of the sweep script.
    #[arg(long, default_value_t = 45)]
    sweep_period: u64,
    /// Keep simulating after the level is won or lost.
    #[arg(long)]
    keep_going: bool,
    /// Pretty-print the summary.
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GameConfig::default(),
    };
    config.two_player |= cli.two_player;
    let slots: Vec<PlayerSlot> = if config.two_player {
        PlayerSlot::ALL.to_vec()
    } else {
        vec![PlayerSlot::One]
    };

    let rows = cli.map.as_deref().and_then(read_map);
    let mut sim = match rows {
        Some(rows) => Simulation::from_grid(&rows, config, cli.seed),
        None => Simulation::with_default_map(config, cli.seed),
    }
    .context("invalid game config")?;

    let script = match &cli.script {
        Some(path) => Script::load(path)?,
        None => Script::Sweep {
            period: cli.sweep_period,
        },
    };

    info!(seed = cli.seed, ticks = cli.ticks, players = slots.len(), "starting run");
    let mut tally = EventTally::default();
    for _ in 0..cli.ticks {
        script.apply(&mut sim);
        sim.step();
        tally.add(&sim.take_events());
        if !cli.keep_going && (sim.is_game_over() || sim.is_level_complete()) {
            break;
        }
    }

    let summary = RunSummary::capture(&sim, &slots, tally);
    let json = if cli.pretty {
        serde_json::to_string_pretty(&summary)
    } else {
        serde_json::to_string(&summary)
    }
    .context("serializing summary")?;
    println!("{json}");
    Ok(())
}

fn load_config(path: &Path) -> Result<GameConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// Reads map rows. An unreadable file falls back to the built-in map.
fn read_map(path: &Path) -> Option<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text.lines().map(|line| line.trim_end().to_owned()).collect()),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read map, using the built-in layout");
            None
        }
    }
}
