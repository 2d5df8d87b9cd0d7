//! Momenta Command-Line Interface
//!
//! Inspect, sort and decode moment-based quantum programs stored as JSON.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{inspect, resolve, sort, version};

/// Momenta - moment-based quantum program tooling
#[derive(Parser)]
#[command(name = "momenta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a summary of a persisted program
    Inspect {
        /// Input file (persisted program JSON)
        #[arg(short, long)]
        input: String,

        /// Also print every moment
        #[arg(long)]
        moments: bool,
    },

    /// Sort operations by qubit where they provably commute
    Sort {
        /// Input file (persisted program JSON)
        #[arg(short, long)]
        input: String,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,

        /// Also sort inside sub-program calls
        #[arg(long, env = "MOMENTA_DEEP")]
        deep: bool,

        /// Leave sub-program calls with this tag untouched (repeatable)
        #[arg(long = "ignore-tag")]
        ignore_tags: Vec<String>,
    },

    /// Decode a constant table and the operations that reference it
    Resolve {
        /// Input file (constants and operation records JSON)
        #[arg(short, long)]
        input: String,

        /// Output file
        #[arg(short, long)]
        output: Option<String>,

        /// Worker threads for decoding (calling thread only if omitted)
        #[arg(long, env = "MOMENTA_THREADS")]
        threads: Option<usize>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Inspect { input, moments } => inspect::execute(&input, moments),

        Commands::Sort {
            input,
            output,
            deep,
            ignore_tags,
        } => sort::execute(&input, output.as_deref(), deep, &ignore_tags),

        Commands::Resolve {
            input,
            output,
            threads,
        } => resolve::execute(&input, output.as_deref(), threads),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
