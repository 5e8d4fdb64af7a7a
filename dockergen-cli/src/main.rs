//! dockergen — render validated Dockerfiles from templates.
//!
//! # Usage
//!
//! ```text
//! dockergen run -t <dir> [-d <values.yaml>] [-o <dir>] [-s] [-f] [--validate-cumulative] <template>...
//! dockergen version
//! ```
//!
//! Values may be piped in instead of named with `-d`; output goes to
//! `<dir>/Dockerfile`, stdout, or both depending on flags and redirection.

mod commands;
mod streams;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use commands::run::RunArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "dockergen",
    version,
    about = "Generate Dockerfiles from templates",
    long_about = "dockergen generates validated Dockerfiles from templated Dockerfiles.",
)]
struct Cli {
    /// Log debug output to stderr (overridden by DOCKERGEN_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render Dockerfiles from templates with provided values.
    Run(RunArgs),

    /// Print the version of dockergen.
    Version,
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let fallback = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("DOCKERGEN_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Some(Commands::Run(args)) => args.run(),
        Some(Commands::Version) => commands::version::run(),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
