//! Game engine: setup, turn order and move execution

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

use crate::board::Board;
use crate::config::GameConfig;
use crate::coord::{Coord, Shape, DIMS};
use crate::error::{GameError, Result};
use crate::movegen::generate;
use crate::pieces::{Piece, PieceId, PieceKind, Player, PlayerId};
use crate::rules::{LayoutOp, Metadata, Move, MoveType, MovementProfile, MovementRules};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Back-rank deployment order for every player
const BACK_RANK: [PieceKind; 10] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
    PieceKind::Cat,
    PieceKind::Alien,
];

// ============================================================================
// GAME ENGINE
// ============================================================================

/// One game in progress.
///
/// All state lives here; there is no global instance. Every public mutation
/// validates before it writes, so a returned error means nothing changed.
#[derive(Clone, Debug)]
pub struct GameEngine {
    board: Board,
    players: Vec<Player>,
    turn_index: usize,
    /// Turn rotation domain; eliminated players drop out, the roster does not shrink
    active_players: Vec<PlayerId>,
    pawn_profiles: BTreeMap<PlayerId, MovementProfile>,
    rules: MovementRules,
    captured: BTreeMap<PlayerId, Vec<String>>,
    king_positions: FxHashMap<PlayerId, Coord>,
}

impl GameEngine {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// New game with every player's army deployed
    pub fn new(config: GameConfig) -> Result<Self> {
        let mut engine = Self::empty(config)?;
        engine.setup_initial_state()?;
        tracing::debug!(
            "New {}-player game on {} with {} pieces",
            engine.players.len(),
            engine.board.shape(),
            engine.board.len()
        );
        Ok(engine)
    }

    /// Roster, profiles and rules but no pieces; for custom positions
    pub fn empty(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let players: Vec<Player> = (0..config.players).map(Player::new).collect();
        Ok(Self::from_parts(Board::new(config.shape), players, 0, None, BTreeMap::new()))
    }

    /// Assemble an engine around an existing board; `active` defaults to the whole roster
    pub(crate) fn from_parts(
        board: Board,
        players: Vec<Player>,
        turn_index: usize,
        active: Option<Vec<PlayerId>>,
        mut captured: BTreeMap<PlayerId, Vec<String>>,
    ) -> Self {
        let pawn_profiles = Self::create_pawn_profiles(&players, board.shape());
        for player in &players {
            captured.entry(player.identifier).or_default();
        }
        let mut engine = Self {
            rules: MovementRules::new(board.shape(), pawn_profiles.clone()),
            active_players: active
                .unwrap_or_else(|| players.iter().map(|p| p.identifier).collect()),
            board,
            players,
            turn_index,
            pawn_profiles,
            captured,
            king_positions: FxHashMap::default(),
        };
        engine.recalculate_kings();
        engine
    }

    fn create_pawn_profiles(
        players: &[Player],
        shape: Shape,
    ) -> BTreeMap<PlayerId, MovementProfile> {
        players
            .iter()
            .map(|p| (p.identifier, MovementProfile::for_seat(p.identifier, shape)))
            .collect()
    }

    // ========================================================================
    // SETUP
    // ========================================================================

    fn setup_initial_state(&mut self) -> Result<()> {
        let shape = self.board.shape();
        let seats: Vec<(PlayerId, MovementProfile)> =
            self.pawn_profiles.iter().map(|(&id, &p)| (id, p)).collect();

        for (owner, profile) in seats {
            let extent = shape.extent(profile.axis) as i32;
            let back_value = if profile.direction > 0 { 0 } else { extent - 1 };
            let pawn_value = back_value + profile.direction;

            let back_rank = self.available_positions(profile.axis, back_value);
            for (kind, coord) in BACK_RANK.iter().zip(back_rank) {
                self.place(*kind, owner, coord)?;
            }

            if (0..extent).contains(&pawn_value) {
                let limit = shape.extent(2) * shape.extent(3) / 2;
                let pawn_rank = self.available_positions(profile.axis, pawn_value);
                for coord in pawn_rank.into_iter().take(limit) {
                    self.place(PieceKind::Pawn, owner, coord)?;
                }
            }
        }
        Ok(())
    }

    /// Free cells on the slice `coord[axis] == value`, interior coordinates first
    fn available_positions(&self, axis: usize, value: i32) -> Vec<Coord> {
        let shape = self.board.shape();
        let orders: Vec<Vec<i32>> = (0..DIMS)
            .map(|a| {
                let extent = shape.extent(a) as i32;
                let mut values: Vec<i32> = (0..extent).collect();
                values.sort_by_key(|&v| (v == 0 || v == extent - 1, v));
                values
            })
            .collect();

        let mut positions = Vec::new();
        for &a in &orders[0] {
            for &b in &orders[1] {
                for &c in &orders[2] {
                    for &d in &orders[3] {
                        let coord = Coord::new(a, b, c, d);
                        if coord[axis] == value && self.board.is_vacant(coord) {
                            positions.push(coord);
                        }
                    }
                }
            }
        }
        positions
    }

    /// Put a fresh piece on the board, keeping the king cache current
    pub fn place(&mut self, kind: PieceKind, owner: PlayerId, coord: Coord) -> Result<PieceId> {
        if !self.players.iter().any(|p| p.identifier == owner) {
            return Err(GameError::UnknownPlayer(owner));
        }
        let id = self.board.place(Piece::new(kind, owner), coord)?;
        if kind == PieceKind::King {
            self.king_positions.insert(owner, coord);
        }
        Ok(id)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn rules(&self) -> &MovementRules {
        &self.rules
    }

    pub fn shape(&self) -> Shape {
        self.board.shape()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.identifier == id)
    }

    pub fn active_players(&self) -> &[PlayerId] {
        &self.active_players
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    /// Player whose turn it is; `None` only if nobody is left in the rotation
    pub fn current_player_id(&self) -> Option<PlayerId> {
        self.turn_index
            .checked_rem(self.active_players.len())
            .and_then(|index| self.active_players.get(index))
            .copied()
    }

    /// Names of the pieces `player` has captured, in capture order
    pub fn captured(&self, player: PlayerId) -> &[String] {
        self.captured.get(&player).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn captured_log(&self) -> &BTreeMap<PlayerId, Vec<String>> {
        &self.captured
    }

    pub fn king_position(&self, player: PlayerId) -> Option<Coord> {
        self.king_positions.get(&player).copied()
    }

    /// The last player standing, once only one remains
    pub fn winner(&self) -> Option<PlayerId> {
        match self.active_players.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Display list of `Name@(a, b, c, d)` entries in row-major order
    pub fn board_snapshot(&self) -> Vec<String> {
        self.board
            .pieces()
            .map(|(coord, _, piece)| format!("{}@{}", piece.name(), coord))
            .collect()
    }

    pub fn describe_move(&self, mv: &Move) -> String {
        let name = self
            .board
            .piece(mv.piece)
            .map(Piece::label)
            .unwrap_or_else(|| "?".to_string());
        mv.describe(&name)
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    pub fn legal_moves_from(&self, position: Coord) -> Vec<Move> {
        generate(&self.board, position, &self.rules)
    }

    pub fn legal_moves_for_player(&self, player: PlayerId) -> Vec<Move> {
        self.board
            .pieces()
            .filter(|(_, _, piece)| piece.owner == player)
            .flat_map(|(coord, _, _)| generate(&self.board, coord, &self.rules))
            .collect()
    }

    // ========================================================================
    // EXECUTE
    // ========================================================================

    /// Play the generated move from `start` to `end`.
    ///
    /// When several candidates share the destination, `metadata` narrows them
    /// (exact or subset match) and the first in generation order wins. Layout
    /// moves are addressed with [`Coord::SENTINEL`] as `end`.
    pub fn execute(
        &mut self,
        player: PlayerId,
        start: Coord,
        end: Coord,
        metadata: Option<&Metadata>,
    ) -> Result<String> {
        self.ensure_active(player)?;
        let id = self.board.get(start).ok_or(GameError::NoSuchPiece(start))?;
        let piece = *self.board.piece(id).ok_or(GameError::NoSuchPiece(start))?;
        if piece.owner != player {
            return Err(GameError::NotOwner { coord: start, player });
        }

        let selected = self
            .legal_moves_from(start)
            .into_iter()
            .filter(|mv| mv.end == end)
            .find(|mv| metadata.map_or(true, |requested| mv.metadata.matches(requested)))
            .ok_or(GameError::IllegalMove { start, end })?;
        tracing::debug!("Player {} plays {}", player, self.describe_move(&selected));

        let outcome = match selected.move_type {
            MoveType::Scratch => self.apply_scratch(player, &piece, end)?,
            MoveType::Layout => {
                let op = selected
                    .layout_op()
                    .ok_or_else(|| GameError::InvalidLayout(format!("{:?}", selected.metadata)))?;
                self.apply_layout(id, &op)?;
                format!("{} executed {}", piece.name(), op.name())
            }
            MoveType::Move | MoveType::Capture => self.apply_movement(player, id, start, end)?,
        };

        self.next_turn();
        Ok(outcome)
    }

    fn apply_scratch(&mut self, player: PlayerId, piece: &Piece, target: Coord) -> Result<String> {
        let victim_id = self
            .board
            .get(target)
            .ok_or(GameError::ScratchTarget(target))?;
        let victim = self
            .board
            .piece_mut(victim_id)
            .filter(|victim| victim.owner != player)
            .ok_or(GameError::ScratchTarget(target))?;
        victim.mark_scratched();
        Ok(format!("{} scratched {} at {}", piece.name(), victim.name(), target))
    }

    fn apply_movement(
        &mut self,
        player: PlayerId,
        id: PieceId,
        start: Coord,
        end: Coord,
    ) -> Result<String> {
        let captured = self.board.move_piece(start, end)?;
        let mut is_king = false;
        let mut name = "?";
        if let Some(piece) = self.board.piece_mut(id) {
            piece.has_moved = true;
            is_king = piece.is_king();
            name = piece.name();
        }
        if is_king {
            self.king_positions.insert(player, end);
        }

        let mut outcome = format!("{} moved to {}", name, end);
        if let Some(victim) = captured {
            outcome.push_str(&format!(" capturing {}", victim.name()));
            self.captured
                .entry(player)
                .or_default()
                .push(victim.name().to_string());
            if victim.is_king() {
                self.eliminate_player(victim.owner);
            }
        }
        Ok(outcome)
    }

    fn apply_layout(&mut self, acting: PieceId, op: &LayoutOp) -> Result<()> {
        self.board.apply_layout(acting, op)?;
        // Pawn profiles keep their original axis, direction and home
        self.rules = MovementRules::new(self.board.shape(), self.pawn_profiles.clone());
        self.recalculate_kings();
        Ok(())
    }

    /// Alien layout power without naming the Alien's square.
    ///
    /// The operation kind must be one the player's Alien can currently
    /// generate; its parameters are validated by the board.
    pub fn perform_layout(&mut self, player: PlayerId, op: &LayoutOp) -> Result<String> {
        self.ensure_active(player)?;
        if op.is_identity(self.board.shape()) {
            return Err(GameError::InvalidLayout(format!("{} changes nothing", op)));
        }
        let (position, alien) = self.find_alien(player).ok_or(GameError::NoAlien(player))?;
        let offered = self
            .legal_moves_from(position)
            .iter()
            .filter_map(Move::layout_op)
            .any(|candidate| candidate.same_kind(op));
        if !offered {
            return Err(GameError::InvalidLayout(op.name().to_string()));
        }

        self.apply_layout(alien, op)?;
        tracing::debug!("Player {} performed {}", player, op);
        self.next_turn();
        Ok(format!("Alien performed {}", op.name()))
    }

    fn find_alien(&self, player: PlayerId) -> Option<(Coord, PieceId)> {
        self.board
            .pieces()
            .find(|(_, _, piece)| piece.owner == player && piece.kind == PieceKind::Alien)
            .map(|(coord, id, _)| (coord, id))
    }

    // ========================================================================
    // TURNS
    // ========================================================================

    /// Only players still in the rotation may act
    fn ensure_active(&self, player: PlayerId) -> Result<()> {
        if self.active_players.contains(&player) {
            Ok(())
        } else if self.player(player).is_some() {
            Err(GameError::Eliminated(player))
        } else {
            Err(GameError::UnknownPlayer(player))
        }
    }

    fn next_turn(&mut self) {
        if self.active_players.len() > 1 {
            self.turn_index = (self.turn_index + 1) % self.active_players.len();
        }
    }

    fn eliminate_player(&mut self, player: PlayerId) {
        if self.winner().is_some() {
            return;
        }
        if let Some(index) = self.active_players.iter().position(|&p| p == player) {
            let current = self.turn_index % self.active_players.len();
            self.active_players.remove(index);
            // Keep the mover's seat under the index so rotation continues from it
            self.turn_index = if index < current { current - 1 } else { current };
            tracing::info!("Player {} eliminated", player);
        }
        self.king_positions.remove(&player);

        if let [winner] = self.active_players.as_slice() {
            tracing::info!("Player {} wins", winner);
            self.turn_index = 0;
        }
    }

    fn recalculate_kings(&mut self) {
        self.king_positions = self
            .board
            .pieces()
            .filter(|(_, _, piece)| piece.is_king())
            .map(|(coord, _, piece)| (piece.owner, coord))
            .collect();
    }
}

// ============================================================================
// TESTS
// ============================================================================
