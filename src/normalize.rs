//! Normalization of an operand shape to logical `(batch, rows, cols)`.
//!
//! Each dimension group is collapsed into a single logical dimension. This is
//! only possible without a copy when the group's dimensions are laid out
//! physically one after another, in the same relative order as the group.

use crate::dims::mark;
use crate::{GemmError, Result};
use gemm_shape::Shape;
use log::trace;

/// Logical dimension index of each group in the normalized shape.
const BATCH: usize = 0;
const ROWS: usize = 1;
const COLS: usize = 2;

/// Collapse `shape` to a rank-3 `(batch, rows, cols)` shape.
///
/// `batch_dims`, `row_dims` and `col_dims` must partition the dimensions of
/// `shape`. Each group is listed in logical major-to-minor order; the
/// physical minor-to-major order of `shape` must visit every group as one
/// uninterrupted run, most minor group element first. A group whose
/// dimensions are adjacent but stored in reverse relative order is rejected,
/// since collapsing it would transpose the elements inside the group.
///
/// Empty groups have extent 1 and are placed most major in the result.
///
/// # Errors
///
/// - [`GemmError::InvalidDimensionSet`] if the groups overlap, contain
///   out-of-range or repeated indices, or do not cover every dimension, or
///   if a group's extent overflows `usize`.
/// - [`GemmError::NonContiguousLayout`] if a group is not physically
///   contiguous.
pub fn batch_row_col_shape(
    shape: &Shape,
    batch_dims: &[usize],
    row_dims: &[usize],
    col_dims: &[usize],
) -> Result<Shape> {
    let rank = shape.rank();
    let mut in_group = [vec![false; rank], vec![false; rank], vec![false; rank]];
    mark(&mut in_group[BATCH], batch_dims, "batch")?;
    mark(&mut in_group[ROWS], row_dims, "row")?;
    mark(&mut in_group[COLS], col_dims, "column")?;
    for dim in 0..rank {
        match in_group.iter().filter(|flags| flags[dim]).count() {
            1 => {}
            0 => {
                return Err(GemmError::InvalidDimensionSet(format!(
                    "dimension {} of {} is in no batch/row/column group",
                    dim, shape
                )))
            }
            _ => {
                return Err(GemmError::InvalidDimensionSet(format!(
                    "dimension {} of {} is in more than one batch/row/column group",
                    dim, shape
                )))
            }
        }
    }

    let physical = shape.minor_to_major();
    let mut minor_to_major = Vec::with_capacity(3);
    let mut i = 0;
    while i < physical.len() {
        let dim = physical[i];
        let (logical, group) = if row_dims.last() == Some(&dim) {
            (ROWS, row_dims)
        } else if col_dims.last() == Some(&dim) {
            (COLS, col_dims)
        } else if batch_dims.last() == Some(&dim) {
            (BATCH, batch_dims)
        } else {
            return Err(GemmError::NonContiguousLayout(format!(
                "dimension {} of {} does not start a physically sequential group",
                dim, shape
            )));
        };

        for &expected in group.iter().rev() {
            if physical.get(i) != Some(&expected) {
                return Err(GemmError::NonContiguousLayout(format!(
                    "dimensions {:?} of {} are not physically sequential",
                    group, shape
                )));
            }
            i += 1;
        }
        trace!("group {:?} -> logical dim {}", group, logical);
        minor_to_major.push(logical);
    }

    if col_dims.is_empty() {
        minor_to_major.push(COLS);
    }
    if row_dims.is_empty() {
        minor_to_major.push(ROWS);
    }
    if batch_dims.is_empty() {
        minor_to_major.push(BATCH);
    }

    let extent = |dims: &[usize]| -> Result<usize> {
        dims.iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(shape.dims()[d]))
            .ok_or_else(|| {
                GemmError::InvalidDimensionSet(format!(
                    "extent of dimensions {:?} of {} overflows usize",
                    dims, shape
                ))
            })
    };
    let normalized = Shape::with_layout(
        shape.element_type(),
        &[extent(batch_dims)?, extent(row_dims)?, extent(col_dims)?],
        &minor_to_major,
    )?;
    trace!("normalized {} -> {}", shape, normalized);
    Ok(normalized)
}
