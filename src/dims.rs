//! Classification of contraction operand dimensions.

use crate::{GemmError, Result};
use gemm_shape::Shape;

/// Dimensions of `shape` that are neither batch nor contracting, ascending.
///
/// Fails with [`GemmError::InvalidDimensionSet`] if an index is out of range,
/// repeated within a set, or listed as both batch and contracting.
pub fn non_contracting_dims(
    shape: &Shape,
    batch_dims: &[usize],
    contracting_dims: &[usize],
) -> Result<Vec<usize>> {
    let rank = shape.rank();
    let mut is_batch = vec![false; rank];
    let mut is_contracting = vec![false; rank];

    mark(&mut is_batch, batch_dims, "batch")?;
    mark(&mut is_contracting, contracting_dims, "contracting")?;

    let mut non_contracting = Vec::with_capacity(rank);
    for dim in 0..rank {
        if is_batch[dim] && is_contracting[dim] {
            return Err(GemmError::InvalidDimensionSet(format!(
                "dimension {} is both batch and contracting",
                dim
            )));
        }
        if !is_batch[dim] && !is_contracting[dim] {
            non_contracting.push(dim);
        }
    }
    debug_assert_eq!(
        batch_dims.len() + contracting_dims.len() + non_contracting.len(),
        rank
    );
    Ok(non_contracting)
}

/// Set `flags[d]` for every `d` in `dims`, rejecting out-of-range and repeated indices.
pub(crate) fn mark(flags: &mut [bool], dims: &[usize], role: &str) -> Result<()> {
    let rank = flags.len();
    for &d in dims {
        if d >= rank {
            return Err(GemmError::InvalidDimensionSet(format!(
                "{} dimension {} out of range for rank {}",
                role, d, rank
            )));
        }
        if flags[d] {
            return Err(GemmError::InvalidDimensionSet(format!(
                "{} dimension {} listed twice",
                role, d
            )));
        }
        flags[d] = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemm_shape::PrimitiveType;

    fn shape(dims: &[usize]) -> Shape {
        Shape::new(PrimitiveType::F32, dims)
    }

    #[test]
    fn test_matmul() {
        // [m, k] contracting k
        assert_eq!(non_contracting_dims(&shape(&[4, 16]), &[], &[1]).unwrap(), vec![0]);
    }

    #[test]
    fn test_batched() {
        let s = shape(&[2, 4, 16]);
        assert_eq!(non_contracting_dims(&s, &[0], &[2]).unwrap(), vec![1]);
        assert_eq!(non_contracting_dims(&s, &[0], &[1]).unwrap(), vec![2]);
    }

    #[test]
    fn test_unordered_sets_give_ascending_output() {
        let s = shape(&[2, 3, 4, 5, 6]);
        assert_eq!(non_contracting_dims(&s, &[3, 0], &[4]).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_all_contracted() {
        // dot product of two vectors
        assert!(non_contracting_dims(&shape(&[16]), &[], &[0]).unwrap().is_empty());
    }

    #[test]
    fn test_overlap_rejected() {
        let err = non_contracting_dims(&shape(&[2, 4, 16]), &[0], &[0]).unwrap_err();
        assert!(matches!(err, GemmError::InvalidDimensionSet(_)));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = non_contracting_dims(&shape(&[2, 4]), &[], &[2]).unwrap_err();
        assert!(matches!(err, GemmError::InvalidDimensionSet(_)));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = non_contracting_dims(&shape(&[2, 4, 8]), &[1, 1], &[2]).unwrap_err();
        assert!(matches!(err, GemmError::InvalidDimensionSet(_)));
    }
}
