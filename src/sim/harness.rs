//! CLI entry point for the replay harness: deterministic config-driven runs with CSV output.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;

use slither_rs::config::{self, Config};
use slither_rs::sim::{replay, write_csv};

/// Replay Harness CLI
#[derive(Parser, Debug)]
#[command(name = "sim-harness", about = "Deterministic replay of the snake joint model with CSV output.")]
pub struct Cli {
    /// Path to a TOML config file (overrides defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output CSV file
    #[arg(short, long, default_value = "./snake_trace.csv")]
    output: PathBuf,

    /// Number of ticks to replay (defaults to control.duration * control.rate_hz)
    #[arg(long)]
    ticks: Option<usize>,

    /// Seconds between ticks (defaults to 1 / control.rate_hz)
    #[arg(long)]
    dt: Option<f64>,

    /// Parameter override (e.g. --param gait.a=0.5)
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,

    /// Log every tick
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay and write the CSV trace (default)
    Run,
    /// Load, override and validate the config without running
    Validate,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s.find('=');
    match pos {
        Some(pos) => Ok((s[..pos].to_string(), s[pos + 1..].to_string())),
        None => Err(format!("Invalid KEY=VAL: no `=` found in '{}'.", s)),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .init();

    // 1. Load config (default or from file)
    let mut config = match cli.config {
        Some(ref path) => config::load_config(&path.to_string_lossy())?,
        None => Config::default(),
    };

    // 2. Apply parameter overrides
    for (key, val) in &cli.param {
        config.set_param(key, val)?;
        tracing::info!("Override {} = {}", key, val);
    }
    config.validate()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Validate => {
            tracing::info!(
                "Config OK: {} segments, body {}, speed {}, {} scheduled commands",
                config.snake.segment_count,
                config.snake.body_length,
                config.snake.target_speed,
                config.schedule.len()
            );
        }
        Commands::Run => {
            let dt = cli.dt.unwrap_or_else(|| config.control.period());
            let ticks = match cli.ticks {
                Some(ticks) => ticks,
                None => config.control.tick_count()?,
            };
            let records = replay(&config, ticks, dt)?;
            let file = File::create(&cli.output)?;
            write_csv(&records, file)?;
            tracing::info!("Wrote {} rows to {}", records.len(), cli.output.display());
        }
    }
    Ok(())
}
