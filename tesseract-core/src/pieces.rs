//! Piece definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GameError;

/// Player identifier (index into the roster)
pub type PlayerId = usize;

/// Stable handle of a piece in the board's arena
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u32);

/// Piece variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    King,
    Queen,
    Rook,
    Bishop,
    Knight,
    Pawn,
    Cat,   // Axis-swap jumps and scratches
    Alien, // King steps plus board layout operations
}

impl PieceKind {
    pub const ALL: [PieceKind; 8] = [
        PieceKind::King,
        PieceKind::Queen,
        PieceKind::Rook,
        PieceKind::Bishop,
        PieceKind::Knight,
        PieceKind::Pawn,
        PieceKind::Cat,
        PieceKind::Alien,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::King => "King",
            PieceKind::Queen => "Queen",
            PieceKind::Rook => "Rook",
            PieceKind::Bishop => "Bishop",
            PieceKind::Knight => "Knight",
            PieceKind::Pawn => "Pawn",
            PieceKind::Cat => "Cat",
            PieceKind::Alien => "Alien",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            PieceKind::King => 'K',
            PieceKind::Queen => 'Q',
            PieceKind::Rook => 'R',
            PieceKind::Bishop => 'B',
            PieceKind::Knight => 'N',
            PieceKind::Pawn => 'P',
            PieceKind::Cat => 'C',
            PieceKind::Alien => 'A',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PieceKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PieceKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| GameError::Corrupt(format!("unknown piece type {}", s)))
    }
}

/// A piece in play.
///
/// Identity is the [`PieceId`] handle it is stored under, never its attributes:
/// two white rooks are different pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub owner: PlayerId,
    /// Degrades movement to pawn-like
    pub scratched: bool,
    /// Gates the pawn double step
    pub has_moved: bool,
}

impl Piece {
    pub fn new(kind: PieceKind, owner: PlayerId) -> Self {
        Self {
            kind,
            owner,
            scratched: false,
            has_moved: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Display name, `Scratched-<Name>` once scratched
    pub fn label(&self) -> String {
        if self.scratched {
            format!("Scratched-{}", self.kind.name())
        } else {
            self.kind.name().to_string()
        }
    }

    /// Symbol shown on boards, lowercase once scratched
    pub fn symbol(&self) -> char {
        if self.scratched {
            self.kind.symbol().to_ascii_lowercase()
        } else {
            self.kind.symbol()
        }
    }

    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }

    pub fn mark_scratched(&mut self) {
        self.scratched = true;
    }

    /// True when the piece generates pawn moves, either natively or through a scratch
    pub fn moves_as_pawn(&self) -> bool {
        self.kind == PieceKind::Pawn || self.scratched
    }
}

/// A seat at the table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub identifier: PlayerId,
    pub name: String,
}

impl Player {
    pub fn new(identifier: PlayerId) -> Self {
        Self {
            identifier,
            name: format!("Player {}", identifier + 1),
        }
    }
}
