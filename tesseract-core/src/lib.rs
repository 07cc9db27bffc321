//! Tesseract Core - 4D chess rules engine
//!
//! This crate provides the core game logic for Tesseract:
//! - Board geometry (4-axis coordinates, offset sets)
//! - Dense tensor storage with transpose/reshape
//! - Board with piece arena and layout operations
//! - Piece types and movement generation
//! - Game engine: turns, captures, scratches, elimination
//! - JSON save/load

pub mod coord;
pub mod tensor;
pub mod error;
pub mod pieces;
pub mod rules;
pub mod board;
pub mod movegen;
pub mod config;
pub mod game;
pub mod state;

// Re-exports for convenient access
pub use coord::{within_bounds, Coord, Shape, DIMS};
pub use error::{GameError, Result};
pub use pieces::{Piece, PieceId, PieceKind, Player, PlayerId};
pub use rules::{LayoutOp, Metadata, Move, MoveType, MovementProfile, MovementRules};
pub use board::Board;
pub use movegen::{generate, layout_catalog};
pub use config::GameConfig;
pub use game::GameEngine;
pub use state::{BoardState, PieceState, SavedGame};
