//! Error taxonomy for board, layout and engine operations
//!
//! Every variant is a recoverable validation failure. Operations that return
//! one of these leave the game untouched.

use crate::coord::{Coord, Shape};
use crate::pieces::PlayerId;

/// Errors raised by the rules engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Position {coord} is out of bounds for board {shape}")]
    OutOfBounds { coord: Coord, shape: Shape },

    #[error("Position {0} is already occupied")]
    OccupiedCell(Coord),

    #[error("No piece at starting position {0}")]
    EmptySource(Coord),

    #[error("No piece at the starting coordinate {0}")]
    NoSuchPiece(Coord),

    #[error("Piece at {coord} does not belong to player {player}")]
    NotOwner { coord: Coord, player: PlayerId },

    #[error("Illegal move from {start} to {end}")]
    IllegalMove { start: Coord, end: Coord },

    #[error("Invalid axes permutation {0:?}")]
    InvalidPermutation(Vec<usize>),

    #[error("Shape mismatch: cannot arrange {from:?} as {to:?}")]
    ShapeMismatch { from: Vec<usize>, to: Vec<usize> },

    #[error("Acting piece must be on the board")]
    PieceNotOnBoard,

    #[error("Acting position {0} must be empty after layout")]
    CellConflict(Coord),

    #[error("Player {0} does not control an Alien")]
    NoAlien(PlayerId),

    #[error("Invalid layout operation: {0}")]
    InvalidLayout(String),

    #[error("Scratch at {0} requires an opposing piece")]
    ScratchTarget(Coord),

    #[error("Number of players must be between 2 and 4, got {0}")]
    InvalidPlayerCount(usize),

    #[error("Invalid board shape {0:?}: every extent must be positive")]
    InvalidShape(Vec<usize>),

    #[error("Player {0} has been eliminated")]
    Eliminated(PlayerId),

    #[error("Unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("Corrupt game state: {0}")]
    Corrupt(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
