//! CLI command definitions and handlers.

pub mod ids;
pub mod replay;

use clap::{Parser, Subcommand};

/// Drowse - Drowsiness detection from facial landmark streams
#[derive(Parser)]
#[command(name = "drowse")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared replay arguments (inputs, thresholds, flags).
    #[command(flatten)]
    pub replay: replay::ReplayArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Replay landmark recordings through the detectors
    Replay(replay::ReplayArgs),
    /// List the landmark IDs the detectors read
    Ids(ids::IdsArgs),
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// No asleep alarm was raised.
    Success,
    /// At least one asleep alarm was raised.
    AlarmRaised,
    /// The command failed.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::SUCCESS,
            ExitCode::AlarmRaised => Self::from(1),
            ExitCode::Error => Self::from(2),
        }
    }
}
