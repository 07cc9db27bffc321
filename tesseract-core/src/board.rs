//! 4D board: tensor storage plus a two-way position index
//!
//! Pieces live in an arena keyed by [`PieceId`]. The grid maps cells to
//! handles and `positions` maps handles back to cells; both are only ever
//! written through [`Board::put`] and [`Board::clear`] so they cannot drift.

use rustc_hash::FxHashMap;

use crate::coord::{Coord, Shape, DIMS};
use crate::error::{GameError, Result};
use crate::pieces::{Piece, PieceId};
use crate::rules::LayoutOp;
use crate::tensor::Tensor;

#[derive(Clone, Debug)]
pub struct Board {
    shape: Shape,
    grid: Tensor<Option<PieceId>>,
    pieces: FxHashMap<PieceId, Piece>,
    positions: FxHashMap<PieceId, Coord>,
    next_id: u32,
}

impl Board {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            grid: Tensor::filled(&shape.extents(), None),
            pieces: FxHashMap::default(),
            positions: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Clear every piece, keeping the shape
    pub fn reset(&mut self) {
        *self = Self::new(self.shape);
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Occupant handle; out-of-bounds lookups read as empty
    pub fn get(&self, coord: Coord) -> Option<PieceId> {
        let index = coord.to_index()?;
        self.grid.get(&index).copied().flatten()
    }

    pub fn piece_at(&self, coord: Coord) -> Option<&Piece> {
        self.get(coord).and_then(|id| self.pieces.get(&id))
    }

    pub fn is_vacant(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    pub fn piece_mut(&mut self, id: PieceId) -> Option<&mut Piece> {
        self.pieces.get_mut(&id)
    }

    pub fn position_of(&self, id: PieceId) -> Option<Coord> {
        self.positions.get(&id).copied()
    }

    /// Occupied cells in row-major coordinate order
    pub fn iter(&self) -> impl Iterator<Item = (Coord, PieceId)> + '_ {
        self.grid
            .iter_indexed()
            .filter_map(|(index, cell)| cell.map(|id| (Coord::from_index(&index), id)))
    }

    /// Occupied cells with their pieces, row-major
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, PieceId, &Piece)> + '_ {
        self.iter()
            .filter_map(move |(coord, id)| self.pieces.get(&id).map(|piece| (coord, id, piece)))
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    fn checked_index(&self, coord: Coord) -> Result<[usize; DIMS]> {
        coord
            .to_index()
            .filter(|_| self.shape.contains(coord))
            .ok_or(GameError::OutOfBounds {
                coord,
                shape: self.shape,
            })
    }

    /// Write a handle into a cell and the index together
    fn put(&mut self, id: PieceId, coord: Coord, index: &[usize]) {
        self.grid.set(index, Some(id));
        self.positions.insert(id, coord);
    }

    /// Empty a cell and drop its index entry, returning the handle that was there
    fn clear(&mut self, index: &[usize]) -> Option<PieceId> {
        let id = self.grid.set(index, None).flatten()?;
        self.positions.remove(&id);
        Some(id)
    }

    pub fn place(&mut self, piece: Piece, coord: Coord) -> Result<PieceId> {
        let index = self.checked_index(coord)?;
        if !self.is_vacant(coord) {
            return Err(GameError::OccupiedCell(coord));
        }
        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.pieces.insert(id, piece);
        self.put(id, coord, &index);
        Ok(id)
    }

    /// Relocate the piece at `start`, returning any piece captured at `end`.
    ///
    /// Legality is the engine's concern; this only checks the cells exist.
    pub fn move_piece(&mut self, start: Coord, end: Coord) -> Result<Option<Piece>> {
        let id = self.get(start).ok_or(GameError::EmptySource(start))?;
        let start_index = self.checked_index(start)?;
        let end_index = self.checked_index(end)?;
        if start == end {
            return Ok(None);
        }

        let captured = self
            .clear(&end_index)
            .and_then(|victim| self.pieces.remove(&victim));
        self.clear(&start_index);
        self.put(id, end, &end_index);
        Ok(captured)
    }

    pub fn remove(&mut self, coord: Coord) -> Option<Piece> {
        let index = self.checked_index(coord).ok()?;
        let id = self.clear(&index)?;
        self.pieces.remove(&id)
    }

    pub fn remove_piece(&mut self, id: PieceId) -> Option<Piece> {
        let coord = self.position_of(id)?;
        self.remove(coord)
    }

    // ========================================================================
    // LAYOUT
    // ========================================================================

    /// Transform the board geometry while `acting` keeps its coordinate.
    ///
    /// Every other piece goes wherever the transform sends it. The new grid
    /// and index are assembled aside and only committed once the acting
    /// piece's slot is known to be valid and free, so a failure leaves the
    /// board untouched.
    pub fn apply_layout(&mut self, acting: PieceId, op: &LayoutOp) -> Result<()> {
        let anchor = self.position_of(acting).ok_or(GameError::PieceNotOnBoard)?;
        let anchor_index = self.checked_index(anchor)?;

        let mut grid = self.grid.clone();
        grid.set(&anchor_index, None);

        let mut grid = match *op {
            LayoutOp::Transpose { axes } => grid.transpose(&axes)?,
            LayoutOp::SwapAxis { axes: [a, b] } => grid.swap_axes(a, b)?,
            LayoutOp::MoveAxis { source, destination } => grid.move_axis(source, destination)?,
            LayoutOp::ReshapeAxis { axis_pair, new_shape } => {
                validate_reshape(self.shape, axis_pair, new_shape)?;
                grid.reshape(&new_shape)?
            }
        };
        let shape = Shape::from_slice(grid.shape())?;

        if !shape.contains(anchor) {
            return Err(GameError::OutOfBounds { coord: anchor, shape });
        }
        let slot = anchor.to_index().ok_or(GameError::OutOfBounds { coord: anchor, shape })?;
        if let Some(Some(_)) = grid.get(&slot) {
            return Err(GameError::CellConflict(anchor));
        }
        grid.set(&slot, Some(acting));

        let positions: FxHashMap<PieceId, Coord> = grid
            .iter_indexed()
            .filter_map(|(index, cell)| cell.map(|id| (id, Coord::from_index(&index))))
            .collect();

        tracing::debug!("Layout {} applied: {} -> {}", op, self.shape, shape);
        self.grid = grid;
        self.shape = shape;
        self.positions = positions;
        Ok(())
    }
}

/// A reshape may only re-factor the two named axes
fn validate_reshape(shape: Shape, axis_pair: [usize; 2], new_shape: [usize; DIMS]) -> Result<()> {
    let [i, j] = axis_pair;
    if i == j || i >= DIMS || j >= DIMS {
        return Err(GameError::InvalidLayout(format!(
            "reshape_axis needs two distinct axes, got ({}, {})",
            i, j
        )));
    }
    let mismatch = || GameError::ShapeMismatch {
        from: shape.extents().to_vec(),
        to: new_shape.to_vec(),
    };
    let untouched_kept = (0..DIMS)
        .filter(|&axis| axis != i && axis != j)
        .all(|axis| new_shape[axis] == shape[axis]);
    if !untouched_kept || new_shape[i] * new_shape[j] != shape[i] * shape[j] {
        return Err(mismatch());
    }
    Ok(())
}
