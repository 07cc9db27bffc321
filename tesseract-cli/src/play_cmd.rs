//! Play command - interactive hot-seat game
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: start_game(), repl()
//! - Level 3: dispatch() - one command against the engine
//! - Level 4: printing utilities

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tesseract_core::{GameConfig, GameEngine, PlayerId, Shape};

use crate::command::{parse_command, Command, HELP};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Number of players (2-4)
    #[arg(long, default_value = "2")]
    pub players: usize,

    /// Initial board extents
    #[arg(long, num_args = 4, value_names = ["A", "B", "C", "D"], default_values_t = vec![4, 4, 4, 4])]
    pub shape: Vec<usize>,

    /// Resume from a saved game instead of a fresh setup
    #[arg(long, value_name = "FILE")]
    pub load: Option<PathBuf>,
}

/// Whether the loop should keep reading input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build or load the game
/// 2. Read commands until quit or end of input
pub fn run(args: PlayArgs) -> Result<()> {
    let mut engine = start_game(&args)?;

    tracing::info!(
        "Starting game: {} players on {}",
        engine.players().len(),
        engine.shape()
    );
    println!("Tesseract - type 'help' for commands");
    print_status(&engine);

    let stdin = io::stdin();
    repl(&mut engine, stdin.lock(), io::stdout())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn start_game(args: &PlayArgs) -> Result<GameEngine> {
    if let Some(path) = &args.load {
        return GameEngine::load(path);
    }
    let shape = Shape::from_slice(&args.shape).context("Invalid --shape")?;
    let config = GameConfig::default()
        .with_shape(shape)
        .with_players(args.players);
    config.validate().context("Invalid game configuration")?;
    Ok(GameEngine::new(config)?)
}

/// Read-eval-print loop; errors from a command are reported and the loop goes on
fn repl(engine: &mut GameEngine, input: impl BufRead, mut output: impl Write) -> Result<()> {
    prompt(engine, &mut output)?;
    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        match parse_command(&line) {
            Ok(Some(command)) => match dispatch(engine, command, &mut output) {
                Ok(Flow::Stop) => break,
                Ok(Flow::Continue) => {}
                Err(e) => writeln!(output, "Error: {:#}", e)?,
            },
            Ok(None) => {}
            Err(e) => writeln!(output, "Error: {:#}", e)?,
        }
        prompt(engine, &mut output)?;
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - COMMANDS
// ============================================================================

fn dispatch(engine: &mut GameEngine, command: Command, output: &mut impl Write) -> Result<Flow> {
    match command {
        Command::Help => writeln!(output, "{}", HELP)?,
        Command::Board => {
            writeln!(output, "Board {}", engine.shape())?;
            for entry in engine.board_snapshot() {
                writeln!(output, "  {}", entry)?;
            }
        }
        Command::Status => write_status(engine, output)?,
        Command::Winner => match engine.winner() {
            Some(winner) => writeln!(output, "Winner: {}", player_name(engine, winner))?,
            None => writeln!(output, "No winner yet.")?,
        },
        Command::Moves(position) => {
            let moves = engine.legal_moves_from(position);
            if moves.is_empty() {
                writeln!(output, "No legal moves from {}", position)?;
            }
            for mv in &moves {
                let kind = mv.move_type.to_string().to_uppercase();
                writeln!(output, "  {}: {}", kind, engine.describe_move(mv))?;
            }
        }
        Command::Move { start, end } => {
            let player = player_to_move(engine)?;
            let outcome = engine.execute(player, start, end, None)?;
            writeln!(output, "{}", outcome)?;
            report_winner(engine, output)?;
        }
        Command::Layout(op) => {
            let player = player_to_move(engine)?;
            let outcome = engine.perform_layout(player, &op)?;
            writeln!(output, "{}", outcome)?;
            report_winner(engine, output)?;
        }
        Command::Save(path) => {
            engine.save(&path)?;
            writeln!(output, "Saved to {}", path.display())?;
        }
        Command::Load(path) => {
            *engine = GameEngine::load(&path)?;
            writeln!(output, "Loaded {}", path.display())?;
            write_status(engine, output)?;
        }
        Command::Quit => return Ok(Flow::Stop),
    }
    Ok(Flow::Continue)
}

// ============================================================================
// LEVEL 4 - PRINTING
// ============================================================================

fn player_to_move(engine: &GameEngine) -> Result<PlayerId> {
    engine
        .current_player_id()
        .context("No player is left to move")
}

fn player_name(engine: &GameEngine, id: PlayerId) -> String {
    engine
        .player(id)
        .map(|p| p.name.clone())
        .unwrap_or_else(|| format!("player {}", id))
}

fn prompt(engine: &GameEngine, output: &mut impl Write) -> Result<()> {
    let name = engine
        .current_player_id()
        .map(|id| player_name(engine, id))
        .unwrap_or_else(|| "?".to_string());
    write!(output, "{}> ", name)?;
    output.flush()?;
    Ok(())
}

fn print_status(engine: &GameEngine) {
    let mut stdout = io::stdout();
    if let Err(e) = write_status(engine, &mut stdout) {
        tracing::warn!("Failed to print status: {}", e);
    }
}

fn write_status(engine: &GameEngine, output: &mut impl Write) -> Result<()> {
    writeln!(output, "Board {} with {} pieces", engine.shape(), engine.board().len())?;
    if let Some(id) = engine.current_player_id() {
        writeln!(output, "To move: {}", player_name(engine, id))?;
    }
    let active: Vec<String> = engine
        .active_players()
        .iter()
        .map(|&id| player_name(engine, id))
        .collect();
    writeln!(output, "Active players: {}", active.join(", "))?;
    if let Some(winner) = engine.winner() {
        writeln!(output, "Winner: {}", player_name(engine, winner))?;
    }
    for player in engine.players() {
        let captured = engine.captured(player.identifier);
        if !captured.is_empty() {
            writeln!(output, "{} captured: {}", player.name, captured.join(", "))?;
        }
    }
    Ok(())
}

fn report_winner(engine: &GameEngine, output: &mut impl Write) -> Result<()> {
    if let Some(winner) = engine.winner() {
        writeln!(output, "{} wins!", player_name(engine, winner))?;
    }
    Ok(())
}
