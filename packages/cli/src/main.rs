mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{format, inspect, locate, FormatArgs, InspectArgs, LocateArgs};
use tracing_subscriber::EnvFilter;

/// htmled CLI - identity-stamped HTML for visual editors
#[derive(Parser, Debug)]
#[command(name = "htmled")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log engine decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse, stamp identities, normalize and re-serialize markup
    Format(FormatArgs),

    /// Show recovered parse issues and the element index of a file
    Inspect(InspectArgs),

    /// Find the innermost element at a line and column
    Locate(LocateArgs),
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Format(args) => format(args, &cwd),
        Command::Inspect(args) => inspect(args, &cwd),
        Command::Locate(args) => locate(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
