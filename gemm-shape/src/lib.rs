//! Array shapes with an explicit physical layout.
//!
//! A [`Shape`] is an ordered list of dimension sizes, an element type, and a
//! minor-to-major ordering of dimension indices that describes how the array
//! is laid out in memory. `minor_to_major[0]` is the dimension whose index
//! varies fastest in memory.
//!
//! This crate holds only the shape value type so that IR crates can depend on
//! it without pulling in the GEMM planning code.
//!
//! # Example
//!
//! ```
//! use gemm_shape::{PrimitiveType, Shape};
//!
//! // Row-major [4, 8]: dim 1 is the most minor.
//! let s = Shape::new(PrimitiveType::F32, &[4, 8]);
//! assert_eq!(s.minor_to_major(), &[1, 0]);
//!
//! // Column-major [4, 8]: dim 0 is the most minor.
//! let t = Shape::with_layout(PrimitiveType::F32, &[4, 8], &[0, 1]).unwrap();
//! assert_eq!(t.element_count().unwrap(), 32);
//! ```

pub mod primitive;

pub use primitive::PrimitiveType;

use std::fmt;

/// Errors that can occur while constructing or transforming a [`Shape`].
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    /// The minor-to-major list is not a permutation of `0..rank`.
    #[error("invalid layout {minor_to_major:?} for rank {rank}")]
    InvalidLayout {
        minor_to_major: Vec<usize>,
        rank: usize,
    },

    /// Invalid axis index for the given rank.
    #[error("invalid axis {axis} for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// A dimension permutation is not a permutation of `0..rank`.
    #[error("invalid permutation {0:?}")]
    InvalidPermutation(Vec<usize>),

    /// The product of the dimension sizes does not fit in `usize`.
    #[error("element count of dims {0:?} overflows usize")]
    ElementCountOverflow(Vec<usize>),
}

/// Result type for shape operations.
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Dimension sizes, element type and physical layout of an array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    element_type: PrimitiveType,
    dims: Vec<usize>,
    minor_to_major: Vec<usize>,
}

impl Shape {
    /// Shape with the default row-major layout (last dimension most minor).
    pub fn new(element_type: PrimitiveType, dims: &[usize]) -> Self {
        Self {
            element_type,
            dims: dims.to_vec(),
            minor_to_major: (0..dims.len()).rev().collect(),
        }
    }

    /// Shape with an explicit minor-to-major layout.
    pub fn with_layout(
        element_type: PrimitiveType,
        dims: &[usize],
        minor_to_major: &[usize],
    ) -> Result<Self> {
        if !is_permutation(minor_to_major, dims.len()) {
            return Err(ShapeError::InvalidLayout {
                minor_to_major: minor_to_major.to_vec(),
                rank: dims.len(),
            });
        }
        Ok(Self {
            element_type,
            dims: dims.to_vec(),
            minor_to_major: minor_to_major.to_vec(),
        })
    }

    #[inline]
    pub fn element_type(&self) -> PrimitiveType {
        self.element_type
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Size of dimension `axis`.
    pub fn dim(&self, axis: usize) -> Result<usize> {
        self.dims
            .get(axis)
            .copied()
            .ok_or(ShapeError::InvalidAxis {
                axis,
                rank: self.rank(),
            })
    }

    #[inline]
    pub fn minor_to_major(&self) -> &[usize] {
        &self.minor_to_major
    }

    /// Total number of elements (1 for a rank-0 shape).
    pub fn element_count(&self) -> Result<usize> {
        self.dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| ShapeError::ElementCountOverflow(self.dims.clone()))
    }

    /// Shape of the result of transposing by `perm`: `dims[i] = self.dims[perm[i]]`.
    ///
    /// The result gets the default row-major layout, which is what a
    /// materialized transpose produces.
    pub fn permuted(&self, perm: &[usize]) -> Result<Self> {
        if !is_permutation(perm, self.rank()) {
            return Err(ShapeError::InvalidPermutation(perm.to_vec()));
        }
        let dims: Vec<usize> = perm.iter().map(|&p| self.dims[p]).collect();
        Ok(Self::new(self.element_type, &dims))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}{{", self.element_type, self.dims)?;
        for (i, d) in self.minor_to_major.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", d)?;
        }
        f.write_str("}")
    }
}

fn is_permutation(perm: &[usize], rank: usize) -> bool {
    if perm.len() != rank {
        return false;
    }
    let mut seen = vec![false; rank];
    for &p in perm {
        if p >= rank || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_is_row_major() {
        let s = Shape::new(PrimitiveType::F32, &[2, 3, 4]);
        assert_eq!(s.minor_to_major(), &[2, 1, 0]);
        assert_eq!(s.rank(), 3);
        assert_eq!(s.element_count().unwrap(), 24);
    }

    #[test]
    fn test_scalar_shape() {
        let s = Shape::new(PrimitiveType::F64, &[]);
        assert_eq!(s.rank(), 0);
        assert_eq!(s.element_count().unwrap(), 1);
        assert!(s.minor_to_major().is_empty());
    }

    #[test]
    fn test_with_layout_rejects_non_permutation() {
        assert!(matches!(
            Shape::with_layout(PrimitiveType::F32, &[2, 3], &[0, 0]),
            Err(ShapeError::InvalidLayout { rank: 2, .. })
        ));
        assert!(Shape::with_layout(PrimitiveType::F32, &[2, 3], &[0]).is_err());
        assert!(Shape::with_layout(PrimitiveType::F32, &[2, 3], &[2, 0]).is_err());
    }

    #[test]
    fn test_dim_out_of_range() {
        let s = Shape::new(PrimitiveType::F32, &[2, 3]);
        assert_eq!(s.dim(1).unwrap(), 3);
        assert!(matches!(
            s.dim(2),
            Err(ShapeError::InvalidAxis { axis: 2, rank: 2 })
        ));
    }

    #[test]
    fn test_element_count_overflow() {
        let huge = usize::MAX / 2 + 1;
        let s = Shape::new(PrimitiveType::F32, &[huge, 2]);
        assert!(matches!(
            s.element_count(),
            Err(ShapeError::ElementCountOverflow(dims)) if dims == vec![huge, 2]
        ));
        assert_eq!(Shape::new(PrimitiveType::F32, &[huge, 1]).element_count().unwrap(), huge);
    }

    #[test]
    fn test_permuted() {
        let s = Shape::with_layout(PrimitiveType::F16, &[2, 3, 4], &[0, 1, 2]).unwrap();
        let t = s.permuted(&[2, 0, 1]).unwrap();
        assert_eq!(t.dims(), &[4, 2, 3]);
        assert_eq!(t.minor_to_major(), &[2, 1, 0]);
        assert_eq!(t.element_type(), PrimitiveType::F16);
        assert!(s.permuted(&[0, 1]).is_err());
    }

    #[test]
    fn test_display() {
        let s = Shape::new(PrimitiveType::F32, &[4, 8]);
        assert_eq!(s.to_string(), "f32[4, 8]{1,0}");
    }
}
