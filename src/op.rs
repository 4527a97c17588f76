//! Contraction operations as seen by the GEMM planner.
//!
//! These are the minimal views of compiler IR that the planner reads: operand
//! shapes, dimension numbers and fused scalar coefficients. Two forms exist:
//! [`DotInstruction`] for a high-level dot with its gemm backend config, and
//! [`GemmOperation`] for an already-lowered gemm op.

use crate::Result;
use gemm_shape::Shape;

/// Batch and contracting dimensions of both dot operands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotDimensionNumbers {
    pub lhs_batch_dims: Vec<usize>,
    pub lhs_contracting_dims: Vec<usize>,
    pub rhs_batch_dims: Vec<usize>,
    pub rhs_contracting_dims: Vec<usize>,
}

impl DotDimensionNumbers {
    /// Batch dimensions of operand `operand_idx` (0 = LHS, anything else = RHS).
    pub fn batch_dims(&self, operand_idx: usize) -> &[usize] {
        if operand_idx == 0 {
            &self.lhs_batch_dims
        } else {
            &self.rhs_batch_dims
        }
    }

    /// Contracting dimensions of operand `operand_idx` (0 = LHS, anything else = RHS).
    pub fn contracting_dims(&self, operand_idx: usize) -> &[usize] {
        if operand_idx == 0 {
            &self.lhs_contracting_dims
        } else {
            &self.rhs_contracting_dims
        }
    }
}

/// Scalar coefficients and algorithm choice fused into a gemm.
///
/// The gemm computes `alpha * (lhs @ rhs) + beta * output`.
#[derive(Debug, Clone, PartialEq)]
pub struct GemmBackendConfig {
    pub alpha_real: f64,
    pub alpha_imag: f64,
    /// Must be 0 unless the caller provides an accumulation buffer.
    pub beta: f64,
    /// Backend-specific algorithm; `None` requests automatic selection.
    pub selected_algorithm: Option<i64>,
}

impl Default for GemmBackendConfig {
    fn default() -> Self {
        Self {
            alpha_real: 1.0,
            alpha_imag: 0.0,
            beta: 0.0,
            selected_algorithm: None,
        }
    }
}

/// A transpose producing a dot operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransposeInstruction {
    /// Shape of the transpose input, with its physical layout.
    pub operand: Shape,
    /// Result dimension `i` is input dimension `permutation[i]`.
    pub permutation: Vec<usize>,
}

impl TransposeInstruction {
    /// Shape of the transposed result.
    pub fn shape(&self) -> Result<Shape> {
        Ok(self.operand.permuted(&self.permutation)?)
    }
}

/// An operand of a [`DotInstruction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Value(Shape),
    Transpose(TransposeInstruction),
}

impl Operand {
    pub fn shape(&self) -> Result<Shape> {
        match self {
            Operand::Value(shape) => Ok(shape.clone()),
            Operand::Transpose(transpose) => transpose.shape(),
        }
    }
}

/// A dot (contraction) instruction with its gemm backend configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DotInstruction {
    pub operands: Vec<Operand>,
    /// Output shape.
    pub shape: Shape,
    pub dot_dimension_numbers: DotDimensionNumbers,
    pub backend_config: GemmBackendConfig,
    /// Module-level option selecting the extended gemm backend.
    pub use_extended_backend: bool,
}

impl DotInstruction {
    /// Dot of two plain operands with default backend config.
    pub fn new(
        lhs: Shape,
        rhs: Shape,
        shape: Shape,
        dot_dimension_numbers: DotDimensionNumbers,
    ) -> Self {
        Self {
            operands: vec![Operand::Value(lhs), Operand::Value(rhs)],
            shape,
            dot_dimension_numbers,
            backend_config: GemmBackendConfig::default(),
            use_extended_backend: false,
        }
    }
}

/// Attributes shared by the lowered gemm operations.
#[derive(Debug, Clone, PartialEq)]
pub struct GemmOpAttrs {
    pub lhs: Shape,
    pub rhs: Shape,
    pub output: Shape,
    pub dot_dimension_numbers: DotDimensionNumbers,
    pub alpha_real: f64,
    pub alpha_imag: f64,
    pub algorithm: Option<i64>,
}

/// A lowered operation that may describe a gemm.
#[derive(Debug, Clone, PartialEq)]
pub enum GemmOperation {
    /// Plain gemm; never accumulates into the output.
    Gemm(GemmOpAttrs),
    /// Gemm accumulating into a bias buffer aliased with the output.
    GemmBias { attrs: GemmOpAttrs, beta: f64 },
    /// Any other operation.
    Other { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use gemm_shape::PrimitiveType;

    #[test]
    fn test_operand_dims_by_index() {
        let dnums = DotDimensionNumbers {
            lhs_batch_dims: vec![0],
            lhs_contracting_dims: vec![2],
            rhs_batch_dims: vec![0],
            rhs_contracting_dims: vec![1],
        };
        assert_eq!(dnums.contracting_dims(0), &[2]);
        assert_eq!(dnums.contracting_dims(1), &[1]);
        assert_eq!(dnums.batch_dims(1), &[0]);
    }

    #[test]
    fn test_default_backend_config() {
        let config = GemmBackendConfig::default();
        assert_eq!(config.alpha_real, 1.0);
        assert_eq!(config.alpha_imag, 0.0);
        assert_eq!(config.beta, 0.0);
        assert!(config.selected_algorithm.is_none());
    }

    #[test]
    fn test_transpose_operand_shape() {
        let operand = Operand::Transpose(TransposeInstruction {
            operand: Shape::new(PrimitiveType::F32, &[16, 4]),
            permutation: vec![1, 0],
        });
        assert_eq!(operand.shape().unwrap().dims(), &[4, 16]);
    }

    #[test]
    fn test_bad_permutation() {
        let transpose = TransposeInstruction {
            operand: Shape::new(PrimitiveType::F32, &[16, 4]),
            permutation: vec![1, 1],
        };
        assert!(transpose.shape().is_err());
    }
}
