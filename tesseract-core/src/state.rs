//! Persisted game state and JSON save/load

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::board::Board;
use crate::coord::{Coord, Shape};
use crate::error::{GameError, Result};
use crate::game::GameEngine;
use crate::pieces::{Piece, PieceKind, Player, PlayerId};

/// One occupied cell
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceState {
    #[serde(rename = "type")]
    pub kind: PieceKind,
    pub owner: PlayerId,
    pub position: Coord,
    #[serde(default)]
    pub scratched: bool,
    #[serde(default)]
    pub has_moved: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub shape: [usize; 4],
    pub pieces: Vec<PieceState>,
}

/// Full save file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub board: BoardState,
    pub players: Vec<Player>,
    pub turn_index: usize,
    pub active_players: Vec<PlayerId>,
    /// Captured piece names keyed by the capturing player's id as a string
    pub captured: BTreeMap<String, Vec<String>>,
}

impl Board {
    pub fn to_state(&self) -> BoardState {
        BoardState {
            shape: self.shape().extents(),
            pieces: self
                .pieces()
                .map(|(position, _, piece)| PieceState {
                    kind: piece.kind,
                    owner: piece.owner,
                    position,
                    scratched: piece.scratched,
                    has_moved: piece.has_moved,
                })
                .collect(),
        }
    }

    /// Rebuild a board; any invariant violation is reported as corrupt state
    pub fn from_state(state: &BoardState) -> Result<Self> {
        let shape = Shape::new(state.shape)
            .map_err(|e| GameError::Corrupt(e.to_string()))?;
        let mut board = Board::new(shape);
        for entry in &state.pieces {
            let piece = Piece {
                kind: entry.kind,
                owner: entry.owner,
                scratched: entry.scratched,
                has_moved: entry.has_moved,
            };
            board
                .place(piece, entry.position)
                .map_err(|e| GameError::Corrupt(e.to_string()))?;
        }
        Ok(board)
    }
}

impl GameEngine {
    pub fn to_saved(&self) -> SavedGame {
        SavedGame {
            board: self.board().to_state(),
            players: self.players().to_vec(),
            turn_index: self.turn_index(),
            active_players: self.active_players().to_vec(),
            captured: self
                .captured_log()
                .iter()
                .map(|(id, names)| (id.to_string(), names.clone()))
                .collect(),
        }
    }

    /// Restore an engine; rules and profiles are rebuilt from the saved shape and roster
    pub fn from_saved(saved: SavedGame) -> Result<Self> {
        let SavedGame {
            board,
            players,
            turn_index,
            active_players,
            captured,
        } = saved;

        let known = |id: &PlayerId| players.iter().any(|p| p.identifier == *id);
        if players.is_empty() {
            return Err(GameError::Corrupt("empty player roster".to_string()));
        }
        let mut ids: Vec<PlayerId> = players.iter().map(|p| p.identifier).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != players.len() {
            return Err(GameError::Corrupt("duplicate player identifier".to_string()));
        }
        if active_players.is_empty() {
            return Err(GameError::Corrupt("no active players".to_string()));
        }
        if let Some(stranger) = active_players.iter().find(|id| !known(id)) {
            return Err(GameError::Corrupt(format!("unknown active player {}", stranger)));
        }
        if let Some(entry) = board.pieces.iter().find(|p| !known(&p.owner)) {
            return Err(GameError::Corrupt(format!(
                "{} at {} belongs to unknown player {}",
                entry.kind, entry.position, entry.owner
            )));
        }

        let mut log = BTreeMap::new();
        for (key, names) in captured {
            let id: PlayerId = key
                .parse()
                .map_err(|_| GameError::Corrupt(format!("bad captured key {:?}", key)))?;
            log.insert(id, names);
        }

        let board = Board::from_state(&board)?;
        Ok(GameEngine::from_parts(
            board,
            players,
            turn_index,
            Some(active_players),
            log,
        ))
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_saved())?)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let saved: SavedGame = serde_json::from_str(content).context("Malformed save file")?;
        Ok(Self::from_saved(saved)?)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Saved game to {}", path.display());
        Ok(())
    }

    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let engine = Self::from_json(&content)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        tracing::info!("Loaded game from {}", path.display());
        Ok(engine)
    }
}
