//! Folding a transpose into the matrix layout of a dot operand.
//!
//! A transpose feeding a dot can be dropped when the dot can read the
//! transpose's input directly, with the row and column roles expressed by the
//! operand's [`MatrixLayout`] instead of by a materialized buffer.

use crate::dims::non_contracting_dims;
use crate::layout::MatrixLayout;
use crate::op::{DotInstruction, Operand};
use crate::{GemmError, Result};
use log::debug;

/// Narrowest element type, in bits, that can be addressed in place after a fold.
///
/// Sub-byte types are packed and cannot be strided per element.
pub const FOLD_MIN_ELEMENT_BITS: u32 = 8;

/// Whether the transpose feeding operand `operand_idx` of `dot` can be folded.
///
/// The fold is legal when the transpose input, with the dot's batch,
/// row and column dimensions mapped back through the transpose permutation,
/// still has a valid [`MatrixLayout`], and its element type is at least
/// [`FOLD_MIN_ELEMENT_BITS`] wide. `dot` is never modified.
///
/// # Errors
///
/// - [`GemmError::UnsupportedOperation`] if `operand_idx` is not 0 or 1, or the
///   operand is not a transpose.
/// - [`GemmError::InvalidDimensionSet`] if the dot dimension numbers are
///   invalid for the operand.
pub fn can_fold_transpose_operand_into_dot(
    dot: &DotInstruction,
    operand_idx: usize,
) -> Result<bool> {
    if operand_idx > 1 {
        return Err(GemmError::UnsupportedOperation(format!(
            "dot operand index {} out of range",
            operand_idx
        )));
    }
    let transpose = match dot.operands.get(operand_idx) {
        Some(Operand::Transpose(transpose)) => transpose,
        Some(Operand::Value(_)) => {
            return Err(GemmError::UnsupportedOperation(format!(
                "dot operand {} is not a transpose",
                operand_idx
            )))
        }
        None => {
            return Err(GemmError::UnsupportedOperation(format!(
                "dot has no operand {}",
                operand_idx
            )))
        }
    };

    let dnums = &dot.dot_dimension_numbers;
    let batch_dims = dnums.batch_dims(operand_idx);
    let contracting_dims = dnums.contracting_dims(operand_idx);
    let non_contracting = non_contracting_dims(&transpose.shape()?, batch_dims, contracting_dims)?;

    let element_type = transpose.operand.element_type();
    if element_type.bit_width() < FOLD_MIN_ELEMENT_BITS {
        debug!("not folding transpose of {}: element type too narrow", transpose.operand);
        return Ok(false);
    }

    let transposed = |dims: &[usize]| -> Vec<usize> {
        dims.iter().map(|&d| transpose.permutation[d]).collect()
    };
    let batch = transposed(batch_dims);
    let contracting = transposed(contracting_dims);
    let non_contracting = transposed(&non_contracting);
    let (row_dims, col_dims) = if operand_idx == 0 {
        (&non_contracting, &contracting)
    } else {
        (&contracting, &non_contracting)
    };

    match MatrixLayout::for_dims(&transpose.operand, &batch, row_dims, col_dims) {
        Ok(layout) => {
            debug!(
                "transpose into dot operand {} folds as {:?} layout",
                operand_idx, layout.order
            );
            Ok(true)
        }
        Err(err) => {
            debug!("not folding transpose into dot operand {}: {}", operand_idx, err);
            Ok(false)
        }
    }
}
