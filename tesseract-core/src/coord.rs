//! 4D board geometry: coordinates, shapes and offset sets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Index, Mul};
use std::sync::OnceLock;

use crate::error::{GameError, Result};

/// Number of board axes
pub const DIMS: usize = 4;

/// A position in the 4-axis coordinate space.
///
/// Coordinates carry no bounds of their own; validity is always relative to
/// the current board [`Shape`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coord(pub [i32; DIMS]);

impl Coord {
    /// Placeholder start/end used by layout moves, which have no real square
    pub const SENTINEL: Coord = Coord([-1; DIMS]);

    pub const ORIGIN: Coord = Coord([0; DIMS]);

    pub const fn new(a: i32, b: i32, c: i32, d: i32) -> Self {
        Self([a, b, c, d])
    }

    /// Coordinate with a single non-zero component
    pub fn axis_unit(axis: usize, value: i32) -> Self {
        let mut components = [0; DIMS];
        components[axis] = value;
        Self(components)
    }

    pub fn components(&self) -> [i32; DIMS] {
        self.0
    }

    /// Copy with one component replaced
    pub fn with(mut self, axis: usize, value: i32) -> Self {
        self.0[axis] = value;
        self
    }

    /// Copy with two components exchanged
    pub fn swapped(mut self, a: usize, b: usize) -> Self {
        self.0.swap(a, b);
        self
    }

    /// Unsigned index into a tensor, if every component is non-negative
    pub fn to_index(&self) -> Option<[usize; DIMS]> {
        let mut index = [0usize; DIMS];
        for (slot, &c) in index.iter_mut().zip(self.0.iter()) {
            *slot = usize::try_from(c).ok()?;
        }
        Some(index)
    }

    pub fn from_index(index: &[usize]) -> Self {
        let mut components = [0; DIMS];
        for (slot, &i) in components.iter_mut().zip(index.iter()) {
            *slot = i as i32;
        }
        Self(components)
    }
}

impl Index<usize> for Coord {
    type Output = i32;

    fn index(&self, axis: usize) -> &i32 {
        &self.0[axis]
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, rhs: Coord) -> Coord {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0.iter()) {
            *o += r;
        }
        Coord(out)
    }
}

impl Mul<i32> for Coord {
    type Output = Coord;

    fn mul(self, scalar: i32) -> Coord {
        Coord(self.0.map(|c| c * scalar))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "({}, {}, {}, {})", a, b, c, d)
    }
}

impl From<[i32; DIMS]> for Coord {
    fn from(components: [i32; DIMS]) -> Self {
        Self(components)
    }
}

/// Board extents along each axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape(pub [usize; DIMS]);

impl Shape {
    /// Build a shape, rejecting zero extents
    pub fn new(extents: [usize; DIMS]) -> Result<Self> {
        if extents.iter().any(|&e| e == 0) {
            return Err(GameError::InvalidShape(extents.to_vec()));
        }
        Ok(Self(extents))
    }

    /// Shape from a runtime extent list (as recovered from a tensor)
    pub fn from_slice(extents: &[usize]) -> Result<Self> {
        let fixed: [usize; DIMS] = extents
            .try_into()
            .map_err(|_| GameError::InvalidShape(extents.to_vec()))?;
        Self::new(fixed)
    }

    pub fn extents(&self) -> [usize; DIMS] {
        self.0
    }

    pub fn extent(&self, axis: usize) -> usize {
        self.0[axis]
    }

    /// Total number of cells
    pub fn volume(&self) -> usize {
        self.0.iter().product()
    }

    pub fn max_extent(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// True iff every component lies in `[0, extent)`
    pub fn contains(&self, coord: Coord) -> bool {
        within_bounds(coord, *self)
    }
}

impl Index<usize> for Shape {
    type Output = usize;

    fn index(&self, axis: usize) -> &usize {
        &self.0[axis]
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self([4; DIMS])
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}x{}x{}x{}", a, b, c, d)
    }
}

pub fn within_bounds(coord: Coord, shape: Shape) -> bool {
    coord
        .0
        .iter()
        .zip(shape.0.iter())
        .all(|(&c, &extent)| c >= 0 && (c as usize) < extent)
}

// ============================================================================
// OFFSET SETS
// ============================================================================

/// Every vector with components in {-1, 0, 1}, lexicographic, origin excluded
fn unit_cube() -> impl Iterator<Item = Coord> {
    (0..3i32.pow(DIMS as u32))
        .map(|n| {
            let mut components = [0; DIMS];
            let mut rest = n;
            for axis in (0..DIMS).rev() {
                components[axis] = rest % 3 - 1;
                rest /= 3;
            }
            Coord(components)
        })
        .filter(|c| *c != Coord::ORIGIN)
}

/// The 80 single-step king offsets
pub fn king_offsets() -> &'static [Coord] {
    static OFFSETS: OnceLock<Vec<Coord>> = OnceLock::new();
    OFFSETS.get_or_init(|| unit_cube().collect())
}

/// The 8 axis-aligned unit vectors, `+1` before `-1` on each axis
pub fn rook_directions() -> &'static [Coord] {
    static DIRECTIONS: OnceLock<Vec<Coord>> = OnceLock::new();
    DIRECTIONS.get_or_init(|| {
        (0..DIMS)
            .flat_map(|axis| [Coord::axis_unit(axis, 1), Coord::axis_unit(axis, -1)])
            .collect()
    })
}

/// Diagonals: unit-magnitude vectors moving along at least two axes at once
pub fn bishop_directions() -> &'static [Coord] {
    static DIRECTIONS: OnceLock<Vec<Coord>> = OnceLock::new();
    DIRECTIONS.get_or_init(|| {
        unit_cube()
            .filter(|c| c.0.iter().filter(|&&x| x != 0).count() >= 2)
            .collect()
    })
}

/// Rook directions followed by bishop directions
pub fn queen_directions() -> &'static [Coord] {
    static DIRECTIONS: OnceLock<Vec<Coord>> = OnceLock::new();
    DIRECTIONS.get_or_init(|| {
        rook_directions()
            .iter()
            .chain(bishop_directions().iter())
            .copied()
            .collect()
    })
}

/// Knight leaps: two along one axis and one along another, sorted
pub fn knight_offsets() -> &'static [Coord] {
    static OFFSETS: OnceLock<Vec<Coord>> = OnceLock::new();
    OFFSETS.get_or_init(|| {
        let mut offsets = Vec::with_capacity(48);
        for i in 0..DIMS {
            for j in 0..DIMS {
                if i == j {
                    continue;
                }
                for sign_i in [-1, 1] {
                    for sign_j in [-1, 1] {
                        offsets.push(Coord::axis_unit(i, 2 * sign_i).with(j, sign_j));
                    }
                }
            }
        }
        offsets.sort();
        offsets.dedup();
        offsets
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_bounds() {
        let shape = Shape::default();
        assert!(within_bounds(Coord::new(0, 0, 0, 0), shape));
        assert!(within_bounds(Coord::new(3, 3, 3, 3), shape));
        assert!(!within_bounds(Coord::new(4, 0, 0, 0), shape));
        assert!(!within_bounds(Coord::new(0, -1, 0, 0), shape));
        assert!(!within_bounds(Coord::SENTINEL, shape));

        let narrow = Shape::new([2, 8, 4, 4]).unwrap();
        assert!(narrow.contains(Coord::new(1, 7, 0, 0)));
        assert!(!narrow.contains(Coord::new(2, 0, 0, 0)));
    }

    #[test]
    fn test_offset_counts() {
        assert_eq!(king_offsets().len(), 80);
        assert_eq!(rook_directions().len(), 8);
        // 3^4 - 1 minus the 8 single-axis vectors
        assert_eq!(bishop_directions().len(), 72);
        assert_eq!(queen_directions().len(), 80);
        assert_eq!(knight_offsets().len(), 48);
    }

    #[test]
    fn test_knight_offsets_shape() {
        for offset in knight_offsets() {
            let mut magnitudes: Vec<i32> = offset.0.iter().map(|c| c.abs()).collect();
            magnitudes.sort();
            assert_eq!(magnitudes, vec![0, 0, 1, 2], "bad knight offset {}", offset);
        }
    }

    #[test]
    fn test_rejects_zero_extent() {
        assert!(Shape::new([4, 0, 4, 4]).is_err());
        assert!(Shape::from_slice(&[4, 4, 4]).is_err());
        assert_eq!(Shape::from_slice(&[2, 8, 4, 4]).unwrap().volume(), 256);
    }

    #[test]
    fn test_coord_display() {
        assert_eq!(Coord::new(1, 2, 3, 0).to_string(), "(1, 2, 3, 0)");
        assert_eq!(Shape::default().to_string(), "4x4x4x4");
    }
}
