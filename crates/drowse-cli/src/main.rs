//! Drowse CLI - Drowsiness detection from facial landmark streams.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::replay::{self, ReplayArgs};
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = match cli.command {
        Some(Commands::Replay(args)) => run_replay(args),
        Some(Commands::Ids(ref args)) => match commands::ids::run(args) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
        None => {
            // Default behavior: replay with flattened args
            if cli.replay.paths.is_empty() {
                eprintln!("error: No inputs specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            run_replay(cli.replay)
        }
    };

    exit_code.into()
}

/// Layers config files under the CLI arguments and runs the replay.
fn run_replay(args: ReplayArgs) -> ExitCode {
    let args = ReplayArgs::with_config(args, &AppConfig::load());
    match replay::run(&args) {
        Ok(result) => result.exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}
