//! # CSR Sorting Simulator
//!
//! Runs the conveyor headless and prints the final statistics as JSON.
//!
//! ## Usage
//!
//! ```bash
//! # Two simulated minutes with a fixed seed
//! csr-sim --seed 42 --duration-secs 120
//!
//! # Belt geometry from a file, every classification logged
//! csr-sim --config belt.toml --verbose
//! ```
//!
//! ## Configuration (belt.toml)
//!
//! ```toml
//! frame_interval_ms = 50
//! spawn_interval_ms = 1500
//! belt_step = 0.5
//! scan_start = 60.0
//! scan_end = 64.0
//! bounds = 100.0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use csr_sorting::{SimEvent, Simulation, SimulationConfig, SortingStats};

#[derive(Parser, Debug)]
#[command(name = "csr-sim")]
#[command(about = "Headless CSR conveyor sorting simulation")]
#[command(version)]
struct Args {
    /// RNG seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Simulated time to run
    #[arg(short, long, default_value = "60")]
    duration_secs: u64,

    /// Tick length fed to the scheduler
    #[arg(short, long, default_value = "50")]
    frame_ms: u64,

    /// Simulation config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log every classification
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    frames: u64,
    simulated_secs: u64,
    on_belt: usize,
    accept_rate: f64,
    reject_rate: f64,
    uncertain_rate: f64,
    stats: &'a SortingStats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.seed(seed);
    }

    let mut sim = Simulation::new(config)?;
    tracing::info!(
        duration_secs = args.duration_secs,
        seed = ?sim.config().seed,
        "Starting simulation"
    );

    let tick = Duration::from_millis(args.frame_ms.max(1));
    let total = Duration::from_secs(args.duration_secs);
    let mut elapsed = Duration::ZERO;
    let mut spawned = 0usize;

    while elapsed < total {
        let step = tick.min(total - elapsed);
        elapsed += step;
        spawned += sim
            .tick(step)
            .iter()
            .filter(|e| matches!(e, SimEvent::Spawned { .. }))
            .count();
    }

    let stats = sim.stats();
    tracing::info!(spawned, classified = stats.total(), "Simulation finished");

    let summary = Summary {
        frames: sim.frames(),
        simulated_secs: args.duration_secs,
        on_belt: sim.objects().len(),
        accept_rate: stats.accept_rate(),
        reject_rate: stats.reject_rate(),
        uncertain_rate: stats.uncertain_rate(),
        stats,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
