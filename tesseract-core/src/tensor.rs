//! Dense row-major tensor store
//!
//! Storage is a flat vector plus a stride table recomputed whenever the shape
//! changes, so transpose and reshape are pure index remapping. The rank is a
//! runtime value; the board always uses rank 4.

use crate::error::{GameError, Result};

/// Row-major strides: the first axis varies slowest
fn strides_for(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for axis in (0..shape.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * shape[axis + 1];
    }
    strides
}

/// Check that `axes` is a permutation of `0..rank`
pub fn validate_permutation(axes: &[usize], rank: usize) -> Result<()> {
    let mut seen = vec![false; rank];
    if axes.len() != rank {
        return Err(GameError::InvalidPermutation(axes.to_vec()));
    }
    for &axis in axes {
        match seen.get_mut(axis) {
            Some(slot) if !*slot => *slot = true,
            _ => return Err(GameError::InvalidPermutation(axes.to_vec())),
        }
    }
    Ok(())
}

/// Permutation undoing `axes`
pub fn inverse_permutation(axes: &[usize]) -> Vec<usize> {
    let mut inverse = vec![0; axes.len()];
    for (position, &axis) in axes.iter().enumerate() {
        inverse[axis] = position;
    }
    inverse
}

/// Identity permutation with axes `a` and `b` exchanged
pub fn swap_permutation(rank: usize, a: usize, b: usize) -> Result<Vec<usize>> {
    if a >= rank || b >= rank {
        return Err(GameError::InvalidPermutation(vec![a, b]));
    }
    let mut axes: Vec<usize> = (0..rank).collect();
    axes.swap(a, b);
    Ok(axes)
}

/// Permutation taking axis `source` out of the order and reinserting it at `destination`
pub fn move_axis_permutation(rank: usize, source: usize, destination: usize) -> Result<Vec<usize>> {
    if source >= rank || destination >= rank {
        return Err(GameError::InvalidPermutation(vec![source, destination]));
    }
    let mut axes: Vec<usize> = (0..rank).collect();
    let axis = axes.remove(source);
    axes.insert(destination, axis);
    Ok(axes)
}

/// Dense N-dimensional array
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tensor<T> {
    shape: Vec<usize>,
    strides: Vec<usize>,
    data: Vec<T>,
}

impl<T: Clone> Tensor<T> {
    /// Tensor of the given shape with every cell set to `fill`
    pub fn filled(shape: &[usize], fill: T) -> Self {
        let len = shape.iter().product();
        Self {
            shape: shape.to_vec(),
            strides: strides_for(shape),
            data: vec![fill; len],
        }
    }

    /// Permute axes: output axis `k` is input axis `axes[k]`.
    ///
    /// Every element at index `i` lands at `(i[axes[0]], i[axes[1]], ...)`.
    pub fn transpose(&self, axes: &[usize]) -> Result<Self> {
        validate_permutation(axes, self.rank())?;

        let new_shape: Vec<usize> = axes.iter().map(|&a| self.shape[a]).collect();
        let source_strides: Vec<usize> = axes.iter().map(|&a| self.strides[a]).collect();

        let mut data = Vec::with_capacity(self.data.len());
        let mut counter = vec![0usize; self.rank()];
        for _ in 0..self.data.len() {
            let source: usize = counter
                .iter()
                .zip(&source_strides)
                .map(|(i, s)| i * s)
                .sum();
            data.push(self.data[source].clone());

            for axis in (0..counter.len()).rev() {
                counter[axis] += 1;
                if counter[axis] < new_shape[axis] {
                    break;
                }
                counter[axis] = 0;
            }
        }

        Self::from_flat(data, &new_shape)
    }

    pub fn swap_axes(&self, a: usize, b: usize) -> Result<Self> {
        self.transpose(&swap_permutation(self.rank(), a, b)?)
    }

    pub fn move_axis(&self, source: usize, destination: usize) -> Result<Self> {
        self.transpose(&move_axis_permutation(self.rank(), source, destination)?)
    }
}

impl<T> Tensor<T> {
    /// Rebuild a tensor from row-major data
    pub fn from_flat(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(GameError::ShapeMismatch {
                from: vec![data.len()],
                to: shape.to_vec(),
            });
        }
        Ok(Self {
            shape: shape.to_vec(),
            strides: strides_for(shape),
            data,
        })
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.rank() {
            return None;
        }
        let mut offset = 0;
        for ((&i, &extent), &stride) in index.iter().zip(&self.shape).zip(&self.strides) {
            if i >= extent {
                return None;
            }
            offset += i * stride;
        }
        Some(offset)
    }

    /// Multi-index of a flat offset
    fn unravel(&self, mut offset: usize) -> Vec<usize> {
        self.strides
            .iter()
            .map(|&stride| {
                let i = offset / stride;
                offset %= stride;
                i
            })
            .collect()
    }

    pub fn get(&self, index: &[usize]) -> Option<&T> {
        self.offset(index).map(|o| &self.data[o])
    }

    pub fn get_mut(&mut self, index: &[usize]) -> Option<&mut T> {
        self.offset(index).map(|o| &mut self.data[o])
    }

    /// Replace a cell, returning the previous value, or `None` if the index is out of range
    pub fn set(&mut self, index: &[usize], value: T) -> Option<T> {
        let cell = self.get_mut(index)?;
        Some(std::mem::replace(cell, value))
    }

    /// Row-major contents
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn flatten(self) -> Vec<T> {
        self.data
    }

    /// Same elements in row-major order under a new shape
    pub fn reshape(self, new_shape: &[usize]) -> Result<Self> {
        let from = self.shape.clone();
        Self::from_flat(self.data, new_shape).map_err(|_| GameError::ShapeMismatch {
            from,
            to: new_shape.to_vec(),
        })
    }

    /// All cells with their multi-index, row-major
    pub fn iter_indexed(&self) -> impl Iterator<Item = (Vec<usize>, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(offset, value)| (self.unravel(offset), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn counting(shape: &[usize]) -> Tensor<usize> {
        let len = shape.iter().product();
        Tensor::from_flat((0..len).collect(), shape).unwrap()
    }

    #[test]
    fn test_row_major_layout() {
        let t = counting(&[2, 3, 4, 5]);
        assert_eq!(t.get(&[0, 0, 0, 1]), Some(&1));
        assert_eq!(t.get(&[0, 0, 1, 0]), Some(&5));
        assert_eq!(t.get(&[1, 0, 0, 0]), Some(&60));
        assert_eq!(t.get(&[2, 0, 0, 0]), None);
        assert_eq!(t.get(&[0, 0, 0]), None);
    }

    #[test]
    fn test_set_returns_previous() {
        let mut t = Tensor::filled(&[2, 2, 2, 2], None::<u32>);
        assert_eq!(t.set(&[1, 1, 0, 1], Some(7)), Some(None));
        assert_eq!(t.get(&[1, 1, 0, 1]), Some(&Some(7)));
        assert_eq!(t.set(&[3, 0, 0, 0], Some(1)), None);
    }

    #[test]
    fn test_reshape_size_mismatch() {
        let t = counting(&[4, 4, 4, 4]);
        let err = t.reshape(&[3, 8, 4, 4]).unwrap_err();
        assert!(matches!(err, GameError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_reshape_preserves_order() {
        let t = counting(&[4, 4, 4, 4]).reshape(&[2, 8, 4, 4]).unwrap();
        assert_eq!(t.shape(), &[2, 8, 4, 4]);
        // Flat offset 64 was (1,0,0,0)
        assert_eq!(t.get(&[0, 4, 0, 0]), Some(&64));
    }

    #[test]
    fn test_invalid_permutation() {
        let t = counting(&[2, 2, 2, 2]);
        assert!(matches!(t.transpose(&[0, 0, 1, 2]), Err(GameError::InvalidPermutation(_))));
        assert!(matches!(t.transpose(&[0, 1, 2]), Err(GameError::InvalidPermutation(_))));
        assert!(matches!(t.transpose(&[0, 1, 2, 4]), Err(GameError::InvalidPermutation(_))));
        assert!(t.swap_axes(0, 4).is_err());
    }

    #[test]
    fn test_transpose_moves_elements() {
        let t = counting(&[2, 3, 4, 5]);
        let p = t.transpose(&[2, 0, 3, 1]).unwrap();
        assert_eq!(p.shape(), &[4, 2, 5, 3]);
        for (index, value) in t.iter_indexed() {
            let moved = [index[2], index[0], index[3], index[1]];
            assert_eq!(p.get(&moved), Some(value));
        }
    }

    #[test]
    fn test_swap_axes() {
        let mut t = Tensor::filled(&[3, 3, 3, 3], 0u8);
        t.set(&[1, 0, 0, 0], 9);
        let s = t.swap_axes(0, 1).unwrap();
        assert_eq!(s.get(&[0, 1, 0, 0]), Some(&9));
        assert_eq!(s.get(&[1, 0, 0, 0]), Some(&0));
    }

    #[test]
    fn test_move_axis() {
        assert_eq!(move_axis_permutation(4, 0, 3).unwrap(), vec![1, 2, 3, 0]);
        assert_eq!(move_axis_permutation(4, 3, 1).unwrap(), vec![0, 3, 1, 2]);

        let t = counting(&[2, 3, 4, 5]);
        let m = t.move_axis(0, 3).unwrap();
        assert_eq!(m.shape(), &[3, 4, 5, 2]);
        assert_eq!(m.get(&[0, 0, 0, 1]), t.get(&[1, 0, 0, 0]));
    }

    #[test]
    fn test_transpose_inverse_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let shape: Vec<usize> = (0..4).map(|_| rng.gen_range(1..5)).collect();
            let t = counting(&shape);
            let mut axes: Vec<usize> = (0..4).collect();
            axes.shuffle(&mut rng);

            let back = t
                .transpose(&axes)
                .and_then(|p| p.transpose(&inverse_permutation(&axes)))
                .unwrap();
            assert_eq!(back, t, "axes {:?} on shape {:?}", axes, shape);
        }
    }

    #[test]
    fn test_flatten_reshape_roundtrip() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let shape: Vec<usize> = (0..4).map(|_| rng.gen_range(1..6)).collect();
            let t = counting(&shape);
            let rebuilt = Tensor::from_flat(t.clone().flatten(), t.shape()).unwrap();
            assert_eq!(rebuilt, t);
        }
    }
}
