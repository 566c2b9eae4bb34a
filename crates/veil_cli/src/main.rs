//! Veil CLI
//!
//! Simulate erase gestures against a mask and inspect easing curves.

mod config;
mod ease;
mod simulate;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::VeilConfig;
use crate::simulate::SimulateOptions;

#[derive(Parser, Debug)]
#[command(name = "veil")]
#[command(about = "Erasable mask simulator")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay strokes against a mask and report the erased percentage
    Simulate {
        /// Config file or directory containing veil.toml
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// One gesture as `x,y;x,y;...` in client coordinates
        #[arg(short, long = "stroke", required = true)]
        strokes: Vec<String>,

        /// Block pixel reads on the mask surface
        #[arg(long)]
        tainted: bool,

        /// Draw uncovered checkpoints after each gesture
        #[arg(long)]
        debug_grid: bool,

        /// Write the mask after the last gesture as PNG
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Virtual frame interval for clear and drop animations
        #[arg(long, default_value_t = veil_animation::FALLBACK_FRAME_MS)]
        frame_ms: f64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print samples of an easing curve
    Ease {
        /// Curve name or `x1,y1,x2,y2` control points
        curve: String,

        #[arg(short = 'n', long, default_value_t = 10)]
        samples: usize,
    },

    /// Print the effective configuration
    Config {
        /// Config file or directory containing veil.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<VeilConfig> {
    match path {
        Some(path) => VeilConfig::load(&path),
        None => {
            let local = PathBuf::from("veil.toml");
            if local.exists() {
                VeilConfig::load(&local)
            } else {
                tracing::debug!("No veil.toml found, using defaults");
                Ok(VeilConfig::default())
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate {
            config,
            strokes,
            tainted,
            debug_grid,
            out,
            frame_ms,
            json,
        } => {
            let config = load_config(config)?;
            let strokes = strokes
                .iter()
                .map(|s| simulate::parse_stroke(s))
                .collect::<Result<Vec<_>>>()?;
            let report = simulate::run(SimulateOptions {
                config,
                strokes,
                tainted,
                debug_grid,
                out,
                frame_ms,
            })?;

            if json {
                let text =
                    serde_json::to_string_pretty(&report).context("Failed to encode report")?;
                println!("{}", text);
            } else {
                for (i, gesture) in report.gestures.iter().enumerate() {
                    println!(
                        "gesture {}: {:.1}% erased, ended at ({}, {})",
                        i + 1,
                        gesture.percent,
                        gesture.x,
                        gesture.y
                    );
                }
                println!(
                    "{}/{} checkpoints covered ({})",
                    report.covered,
                    report.checkpoints,
                    report.strategy.as_deref().unwrap_or("no surface")
                );
                if report.drops_spawned > 0 {
                    println!("{} drops spawned", report.drops_spawned);
                }
                if report.cleared {
                    println!("mask cleared after {} frames", report.frames);
                }
            }
        }
        Commands::Ease { curve, samples } => {
            let easing = ease::resolve(&curve)?;
            for (p, value) in ease::sample(&easing, samples) {
                println!("{:.3}\t{:.6}", p, value);
            }
        }
        Commands::Config { config } => {
            let config = load_config(config)?;
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
