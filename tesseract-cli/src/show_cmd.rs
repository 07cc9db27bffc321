//! Show command - inspect a saved game without playing it

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use tesseract_core::{GameEngine, Move};

use crate::command::parse_coord;

#[derive(Args)]
pub struct ShowArgs {
    /// Saved game JSON file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// List legal moves of the piece at this cell (e.g. 1,1,1,1)
    #[arg(long, value_name = "COORD")]
    pub from: Option<String>,

    /// List every legal move of the player to move
    #[arg(long, conflicts_with = "from")]
    pub all_moves: bool,

    /// Output moves as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let engine = GameEngine::load(&args.file)?;

    let moves = match &args.from {
        Some(text) => Some(engine.legal_moves_from(parse_coord(text)?)),
        None if args.all_moves => Some(
            engine
                .current_player_id()
                .map(|player| engine.legal_moves_for_player(player))
                .unwrap_or_default(),
        ),
        None => None,
    };

    match moves {
        Some(moves) if args.json => println!("{}", serde_json::to_string_pretty(&moves)?),
        Some(moves) => print_moves(&engine, &moves),
        None => print_board(&engine),
    }
    Ok(())
}

fn print_board(engine: &GameEngine) {
    match engine.current_player_id() {
        Some(player) => println!("Board {} - player {} to move", engine.shape(), player),
        None => println!("Board {}", engine.shape()),
    }
    for entry in engine.board_snapshot() {
        println!("  {}", entry);
    }
    if let Some(winner) = engine.winner() {
        println!("Winner: player {}", winner);
    }
}

fn print_moves(engine: &GameEngine, moves: &[Move]) {
    println!("{} legal moves", moves.len());
    for mv in moves {
        println!("  {}: {}", mv.move_type.to_string().to_uppercase(), engine.describe_move(mv));
    }
}
