//! Per-piece move generation
//!
//! Generation is pure: it reads the board and rules and never looks at whose
//! turn it is. Output order is stable and is what the engine uses to break
//! ties between candidates with the same destination.

use rustc_hash::FxHashSet;

use crate::board::Board;
use crate::coord::{
    bishop_directions, king_offsets, knight_offsets, queen_directions, rook_directions, Coord,
    Shape, DIMS,
};
use crate::pieces::{Piece, PieceId, PieceKind};
use crate::rules::{LayoutOp, Metadata, Move, MovementRules};

/// All candidate moves for the piece at `position` (empty if the cell is empty)
pub fn generate(board: &Board, position: Coord, rules: &MovementRules) -> Vec<Move> {
    let Some(id) = board.get(position) else {
        return Vec::new();
    };
    let Some(&piece) = board.piece(id) else {
        return Vec::new();
    };

    let mover = Mover {
        board,
        rules,
        id,
        piece,
        from: position,
    };
    let mut moves = Vec::new();

    // A scratch overrides the piece's own movement regardless of kind
    if piece.moves_as_pawn() {
        mover.pawn_moves(&mut moves);
        return moves;
    }

    match piece.kind {
        PieceKind::King => mover.leap_moves(king_offsets(), false, &mut moves),
        PieceKind::Knight => mover.leap_moves(knight_offsets(), true, &mut moves),
        PieceKind::Rook => mover.slide_moves(rook_directions(), &mut moves),
        PieceKind::Bishop => mover.slide_moves(bishop_directions(), &mut moves),
        PieceKind::Queen => mover.slide_moves(queen_directions(), &mut moves),
        PieceKind::Pawn => mover.pawn_moves(&mut moves),
        PieceKind::Cat => mover.cat_moves(&mut moves),
        PieceKind::Alien => {
            mover.leap_moves(king_offsets(), true, &mut moves);
            moves.extend(
                layout_catalog(rules.board_shape)
                    .into_iter()
                    .map(|op| Move::layout(id, op)),
            );
        }
    }
    moves
}

/// Every layout operation an Alien may perform on a board of `shape`.
///
/// Order: non-identity transposes (lexicographic), axis swaps, axis moves,
/// then axis-pair reshapes by ascending first factor.
pub fn layout_catalog(shape: Shape) -> Vec<LayoutOp> {
    let mut ops = Vec::new();

    for axes in permutations() {
        if axes != [0, 1, 2, 3] {
            ops.push(LayoutOp::Transpose { axes });
        }
    }
    for (i, j) in axis_pairs() {
        ops.push(LayoutOp::SwapAxis { axes: [i, j] });
    }
    for source in 0..DIMS {
        for destination in 0..DIMS {
            if source != destination {
                ops.push(LayoutOp::MoveAxis { source, destination });
            }
        }
    }
    for (i, j) in axis_pairs() {
        let product = shape[i] * shape[j];
        for a in (1..=product).filter(|a| product % a == 0) {
            let b = product / a;
            if (a, b) == (shape[i], shape[j]) {
                continue;
            }
            let mut new_shape = shape.extents();
            new_shape[i] = a;
            new_shape[j] = b;
            ops.push(LayoutOp::ReshapeAxis {
                axis_pair: [i, j],
                new_shape,
            });
        }
    }
    ops
}

/// Unordered axis pairs `(i, j)` with `i < j`
fn axis_pairs() -> impl Iterator<Item = (usize, usize)> {
    (0..DIMS).flat_map(|i| ((i + 1)..DIMS).map(move |j| (i, j)))
}

/// Permutations of the axes in lexicographic order
fn permutations() -> impl Iterator<Item = [usize; DIMS]> {
    (0..DIMS.pow(DIMS as u32)).filter_map(|n| {
        let mut axes = [0; DIMS];
        let mut rest = n;
        for slot in axes.iter_mut().rev() {
            *slot = rest % DIMS;
            rest /= DIMS;
        }
        let mut seen = [false; DIMS];
        for &axis in &axes {
            if seen[axis] {
                return None;
            }
            seen[axis] = true;
        }
        Some(axes)
    })
}

/// Generation context for one piece
struct Mover<'a> {
    board: &'a Board,
    rules: &'a MovementRules,
    id: PieceId,
    piece: Piece,
    from: Coord,
}

impl Mover<'_> {
    fn in_bounds(&self, coord: Coord) -> bool {
        self.rules.board_shape.contains(coord)
    }

    fn occupant(&self, coord: Coord) -> Option<&Piece> {
        self.board.piece_at(coord)
    }

    fn is_opponent(&self, other: &Piece) -> bool {
        other.owner != self.piece.owner
    }

    /// Walk each direction until the edge, a friendly piece (excluded) or an enemy (captured)
    fn slide_moves(&self, directions: &[Coord], moves: &mut Vec<Move>) {
        for &direction in directions {
            let mut current = self.from;
            loop {
                current = current + direction;
                if !self.in_bounds(current) {
                    break;
                }
                match self.occupant(current) {
                    None => moves.push(Move::step(self.id, self.from, current)),
                    Some(occupant) => {
                        if self.is_opponent(occupant) {
                            moves.push(Move::capture(self.id, self.from, current));
                        }
                        break;
                    }
                }
            }
        }
    }

    /// Single fixed-offset jumps; `annotate_quiet` tags plain moves with `capture: false`
    fn leap_moves(&self, offsets: &[Coord], annotate_quiet: bool, moves: &mut Vec<Move>) {
        for &offset in offsets {
            let target = self.from + offset;
            if !self.in_bounds(target) {
                continue;
            }
            match self.occupant(target) {
                None => {
                    let mut mv = Move::step(self.id, self.from, target);
                    if annotate_quiet {
                        mv.metadata = Metadata::capture(false);
                    }
                    moves.push(mv);
                }
                Some(occupant) if self.is_opponent(occupant) => {
                    moves.push(Move::capture(self.id, self.from, target));
                }
                Some(_) => {}
            }
        }
    }

    fn pawn_moves(&self, moves: &mut Vec<Move>) {
        let Some(profile) = self.rules.profile(self.piece.owner) else {
            return;
        };
        let forward = profile.forward();

        let one_step = self.from + forward;
        if self.in_bounds(one_step) && self.board.is_vacant(one_step) {
            moves.push(Move::step(self.id, self.from, one_step));
            if !self.piece.has_moved && profile.is_home(self.from) {
                let two_step = one_step + forward;
                if self.in_bounds(two_step) && self.board.is_vacant(two_step) {
                    moves.push(Move::step(self.id, self.from, two_step));
                }
            }
        }

        // Diagonal-forward captures only; there is no en passant
        for axis in (0..DIMS).filter(|&axis| axis != profile.axis) {
            for side in [-1, 1] {
                let target = self.from + forward.with(axis, side);
                if !self.in_bounds(target) {
                    continue;
                }
                if let Some(occupant) = self.occupant(target) {
                    if self.is_opponent(occupant) {
                        moves.push(Move::capture(self.id, self.from, target));
                    }
                }
            }
        }
    }

    fn cat_moves(&self, moves: &mut Vec<Move>) {
        let mut seen: FxHashSet<Coord> = FxHashSet::default();

        // Axis-swap jumps
        for (i, j) in axis_pairs() {
            let target = self.from.swapped(i, j);
            if target == self.from || !self.in_bounds(target) || !seen.insert(target) {
                continue;
            }
            self.move_or_scratch(target, moves);
        }

        // Anti-correlated slides: +delta on one axis, -delta on another
        let reach = self.rules.board_shape.max_extent() as i32 - 1;
        for axis_from in 0..DIMS {
            for axis_to in (0..DIMS).filter(|&a| a != axis_from) {
                for delta in (-reach..=reach).filter(|&d| d != 0) {
                    let target = self
                        .from
                        .with(axis_from, self.from[axis_from] + delta)
                        .with(axis_to, self.from[axis_to] - delta);
                    if target == self.from || seen.contains(&target) || !self.in_bounds(target) {
                        continue;
                    }
                    seen.insert(target);
                    self.move_or_scratch(target, moves);
                }
            }
        }
    }

    fn move_or_scratch(&self, target: Coord, moves: &mut Vec<Move>) {
        match self.occupant(target) {
            None => moves.push(Move::step(self.id, self.from, target)),
            Some(occupant) if self.is_opponent(occupant) => {
                moves.push(Move::scratch(self.id, self.from, target));
            }
            Some(_) => {}
        }
    }
}
