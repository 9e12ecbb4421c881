//! CLI interface for Fairway.
//!
//! Replays recorded GPS traces through the hole-progression engines and
//! inspects or moves the hole saved for a round.
//!
//! - `fairway replay --course <file> --trace <file>`: run a trace offline.
//! - `fairway round new|show|next|prev`: round state in the local database.

mod format;
mod replay;
mod round;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use fairway::config::Config;
use fairway::engine::EngineKind;

/// Fairway: follow the hole being played.
#[derive(Debug, Parser)]
#[command(name = "fairway", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: replaying a recorded round
  1. fairway round new
     → prints a round ID
  2. fairway replay --course course.json --trace round.jsonl --round <id>
  3. fairway round show --round <id> --course course.json

Manual navigation:
  fairway round next --round <id> --course course.json
  fairway round prev --round <id> --course course.json";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Feed a recorded trace through an engine and print every hole change.
    ///
    /// Fixes are thinned by the same adaptive cadence used live: 1 Hz while
    /// moving or turning, 0.3 Hz otherwise.
    Replay {
        /// Course file: JSON array of holes in play order.
        #[arg(long)]
        course: PathBuf,

        /// Trace file: one JSON fix per line.
        #[arg(long)]
        trace: PathBuf,

        /// Round to persist progress under. Without it, the replay uses a
        /// fresh round and keeps nothing.
        #[arg(long)]
        round: Option<String>,

        /// Engine to use. Defaults to the configured engine.
        #[arg(long, value_enum)]
        engine: Option<EngineArg>,

        /// Track holes without advancing automatically.
        #[arg(long)]
        no_auto_advance: bool,

        /// Print transitions and the summary as JSON lines.
        #[arg(long)]
        json: bool,
    },

    /// Inspect or move the hole saved for a round.
    Round {
        #[command(subcommand)]
        command: RoundCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum RoundCommand {
    /// Create a new round ID.
    New,

    /// Show the saved hole.
    Show(RoundArgs),

    /// Move to the next hole.
    Next(RoundArgs),

    /// Move to the previous hole.
    Prev(RoundArgs),
}

#[derive(Debug, clap::Args)]
pub struct RoundArgs {
    /// Round ID.
    #[arg(long)]
    round: String,

    /// Course file: JSON array of holes in play order.
    #[arg(long)]
    course: PathBuf,
}

/// CLI-facing engine choice, mapped to the domain `EngineKind`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EngineArg {
    /// Follow state machine: advance after leaving the green.
    V1,
    /// Green dwell plus tee-box lock.
    V2,
}

impl EngineArg {
    fn to_domain(self) -> EngineKind {
        match self {
            Self::V1 => EngineKind::V1,
            Self::V2 => EngineKind::V2,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            course,
            trace,
            round,
            engine,
            no_auto_advance,
            json,
        } => replay::cmd_replay(
            config,
            &replay::ReplayArgs {
                course,
                trace,
                round,
                engine: engine.map_or(config.engine, EngineArg::to_domain),
                auto_advance: config.auto_advance && !no_auto_advance,
                json,
            },
        ),
        Command::Round { command } => match command {
            RoundCommand::New => {
                round::cmd_new();
                Ok(())
            }
            RoundCommand::Show(args) => round::cmd_show(config, &args.round, &args.course),
            RoundCommand::Next(args) => {
                round::cmd_step(config, &args.round, &args.course, round::Direction::Next)
            }
            RoundCommand::Prev(args) => {
                round::cmd_step(config, &args.round, &args.course, round::Direction::Prev)
            }
        },
    }
}
