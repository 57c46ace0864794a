//! `percept` – radar/camera fusion and braking-decision simulator.
//!
//! ```bash
//! # Write synthetic radar_data.txt / camera_data.txt
//! percept generate --seed 42
//!
//! # Fuse, decide, print and write perception_log.txt
//! percept run
//! ```
//!
//! Settings come from `percept.toml` (see [`config`]), then `PERCEPT_*`
//! environment variables, then command-line flags.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use percept_datagen::Generator;
use percept_fusion::AlignmentStrategy;
use percept_runtime::PerceptionRun;
use tracing::info;

/// Perception pipeline simulator
#[derive(Parser, Debug)]
#[command(name = "percept")]
#[command(author, version, about = "Radar/camera fusion and braking-decision simulator")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to the config file (default: ./percept.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fuse sensor files, decide braking actions and write the decision log
    Run {
        #[arg(long)]
        radar: Option<PathBuf>,
        #[arg(long)]
        camera: Option<PathBuf>,
        /// Decision log output path
        #[arg(long)]
        log: Option<PathBuf>,
        /// Maximum records read per sensor
        #[arg(long)]
        capacity: Option<usize>,
        /// Join radar and camera records by id instead of by position
        #[arg(long)]
        keyed: bool,
        /// Print the run summary as JSON after the run
        #[arg(long)]
        json: bool,
    },

    /// Write synthetic radar and camera files
    Generate {
        #[arg(long)]
        radar: Option<PathBuf>,
        #[arg(long)]
        camera: Option<PathBuf>,
        /// Number of objects per file
        #[arg(long)]
        count: Option<usize>,
        /// RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> ExitCode {
    // ── Structured logging ────────────────────────────────────────────────
    // RUST_LOG filters (default "info"); PERCEPT_LOG_FORMAT=json switches to
    // newline-delimited JSON.  Logs go to stderr so stdout stays the report.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("PERCEPT_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let cli = Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────
    let path = config::config_path(cli.config.as_deref());
    let mut cfg = match config::load_from(&path) {
        Ok(Some(cfg)) => {
            info!(path = %path.display(), "config loaded");
            cfg
        }
        Ok(None) => config::Config::default(),
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            return ExitCode::FAILURE;
        }
    };
    config::apply_env_overrides(&mut cfg);

    match cli.command {
        Commands::Run {
            radar,
            camera,
            log,
            capacity,
            keyed,
            json,
        } => {
            let mut run = cfg.run;
            if let Some(p) = radar {
                run.radar_path = p;
            }
            if let Some(p) = camera {
                run.camera_path = p;
            }
            if let Some(p) = log {
                run.log_path = p;
            }
            if let Some(c) = capacity {
                run.capacity = c;
            }
            if keyed {
                run.alignment = AlignmentStrategy::Keyed;
            }
            cmd_run(run, json);
        }
        Commands::Generate {
            radar,
            camera,
            count,
            seed,
        } => {
            let radar = radar.unwrap_or(cfg.run.radar_path);
            let camera = camera.unwrap_or(cfg.run.camera_path);
            let count = count.unwrap_or(cfg.generator.count);
            cmd_generate(radar, camera, count, seed.or(cfg.generator.seed));
        }
    }

    ExitCode::SUCCESS
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_run(config: percept_runtime::RunConfig, json: bool) {
    let mut stdout = std::io::stdout();
    let summary = PerceptionRun::new(config).execute(&mut stdout);

    for e in &summary.errors {
        eprintln!("\n{} {}", "Error:".red().bold(), e);
    }

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{}: {}", "Failed to serialize summary".red(), e),
        }
    }
}

fn cmd_generate(radar: PathBuf, camera: PathBuf, count: usize, seed: Option<u64>) {
    let mut generator = match seed {
        Some(seed) => Generator::seeded(seed, count),
        None => Generator::from_entropy(count),
    };
    match generator.write_files(&radar, &camera) {
        Ok(()) => println!(
            "  {} {} objects written to {} and {}",
            "✓".green().bold(),
            count,
            radar.display().to_string().bold(),
            camera.display().to_string().bold()
        ),
        Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "percept", "run", "--radar", "r.txt", "--capacity", "10", "--keyed",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                radar,
                capacity,
                keyed,
                json,
                ..
            } => {
                assert_eq!(radar, Some(PathBuf::from("r.txt")));
                assert_eq!(capacity, Some(10));
                assert!(keyed);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn generate_accepts_global_config_flag() {
        let cli = Cli::try_parse_from([
            "percept", "generate", "--seed", "7", "--config", "alt.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("alt.toml")));
        assert!(matches!(cli.command, Commands::Generate { seed: Some(7), .. }));
    }
}
