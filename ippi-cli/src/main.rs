//! ippi: assemble, check and run IPPcode24 programs.
//!
//! Exit codes:
//! - 0-9: Program finished (0 after the last instruction, or the EXIT code)
//! - 11: Source or input file cannot be opened
//! - 32: Malformed source
//! - 52-58: Runtime error, by category
//! - 99: Internal error (output could not be written)

mod commands;

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ippi", version)]
#[command(about = "Interpreter for IPPcode24 programs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble and execute a program
    Run {
        /// Path to the IPPcode24 source
        source: PathBuf,

        /// File that READ takes its lines from (default: stdin)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Assemble a program and check its labels without running it
    Check {
        /// Path to the IPPcode24 source
        source: PathBuf,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "ippi=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run { source, input } => {
            commands::run(&source, input.as_deref()).map(i32::from)
        }
        Command::Check { source } => commands::check(&source).map(|()| 0),
    };

    // Output is flushed by the commands; nothing else is cleaned up.
    match result {
        Ok(code) | Err(code) => process::exit(code),
    }
}
