//! Tesseract CLI - Command-line interface
//!
//! Commands:
//! - play: Hot-seat game in the terminal
//! - show: Inspect a saved game and its legal moves

mod command;
mod play_cmd;
mod show_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tesseract")]
#[command(about = "Four-dimensional chess in the terminal")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "tesseract_core=debug")
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game interactively
    Play(play_cmd::PlayArgs),
    /// Print a saved game's board or legal moves
    Show(show_cmd::ShowArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args),
        Commands::Show(args) => show_cmd::run(args),
    }
}
