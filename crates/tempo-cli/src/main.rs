//! Tempo CLI - Headless host for the Tempo frame dispatcher

mod clock;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, simulate};

#[derive(Parser)]
#[command(name = "tempo")]
#[command(about = "Drive the Tempo frame dispatcher from a headless frame loop", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a deterministic frame loop with demo registrants and report per-phase stats
    Simulate {
        /// Number of frames to run
        #[arg(long, default_value = "120")]
        frames: u64,

        /// Simulated frame duration in milliseconds
        #[arg(long, default_value = "16.667")]
        frame_ms: f64,

        /// Path to config file (default: ./tempo.toml if present)
        #[arg(long)]
        config: Option<String>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Path to config file (default: ./tempo.toml if present)
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    log::debug!("tempo v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Simulate {
            frames,
            frame_ms,
            config,
        } => simulate::run(simulate::SimulateArgs {
            frames,
            frame_ms,
            config,
        }),
        Commands::Config { config } => config::run(config.as_deref()),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
