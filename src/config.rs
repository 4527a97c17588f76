//! Assembly of the complete GEMM invocation descriptor.

use crate::dims::non_contracting_dims;
use crate::layout::MatrixLayout;
use crate::op::{DotInstruction, GemmOpAttrs, GemmOperation};
use crate::{GemmError, Result};
use gemm_shape::{PrimitiveType, Shape};
use log::debug;
use num_complex::Complex64;

/// Operand and output shapes of a contraction with their dimension numbers.
#[derive(Debug, Clone, Copy)]
pub struct GemmShapes<'a> {
    pub lhs_shape: &'a Shape,
    pub lhs_batch_dims: &'a [usize],
    pub lhs_contracting_dims: &'a [usize],
    pub rhs_shape: &'a Shape,
    pub rhs_batch_dims: &'a [usize],
    pub rhs_contracting_dims: &'a [usize],
    pub output_shape: &'a Shape,
}

/// Everything needed to issue one (batched) GEMM:
/// `output = alpha * (lhs @ rhs) + beta * output`.
#[derive(Debug, Clone, PartialEq)]
pub struct GemmConfig {
    pub lhs_layout: MatrixLayout,
    pub rhs_layout: MatrixLayout,
    pub output_layout: MatrixLayout,
    pub alpha: Complex64,
    /// Must be 0 unless the caller provides an accumulation buffer; not checked here.
    pub beta: f64,
    /// Pinned backend algorithm; `None` requests automatic selection.
    pub algorithm: Option<i64>,
    /// Select the extended backend (richer epilogues, fewer element types).
    pub use_extended_backend: bool,
}

impl GemmConfig {
    /// Build a config from explicit shapes, dimension lists and coefficients.
    ///
    /// LHS rows are its non-contracting dims and LHS columns its contracting
    /// dims; for the RHS the roles are reversed. The output layout is derived
    /// positionally (see [`MatrixLayout::for_output`]).
    ///
    /// # Errors
    ///
    /// - [`GemmError::ContractingMismatch`] if the LHS and RHS contracting
    ///   extents differ.
    /// - [`GemmError::InvalidDimensionSet`] if the output extents or batch
    ///   sizes do not match the operands.
    /// - [`GemmError::UnsupportedOperation`] if the output element type has no
    ///   GEMM support.
    /// - Any layout error of the three operands.
    pub fn for_shapes(
        shapes: &GemmShapes<'_>,
        alpha: Complex64,
        beta: f64,
        algorithm: Option<i64>,
        use_extended_backend: bool,
    ) -> Result<Self> {
        let lhs_col_dims = shapes.lhs_contracting_dims;
        let lhs_row_dims =
            non_contracting_dims(shapes.lhs_shape, shapes.lhs_batch_dims, lhs_col_dims)?;
        let lhs_layout = MatrixLayout::for_dims(
            shapes.lhs_shape,
            shapes.lhs_batch_dims,
            &lhs_row_dims,
            lhs_col_dims,
        )?;

        let rhs_row_dims = shapes.rhs_contracting_dims;
        let rhs_col_dims =
            non_contracting_dims(shapes.rhs_shape, shapes.rhs_batch_dims, rhs_row_dims)?;
        let rhs_layout = MatrixLayout::for_dims(
            shapes.rhs_shape,
            shapes.rhs_batch_dims,
            rhs_row_dims,
            &rhs_col_dims,
        )?;

        let output_layout = MatrixLayout::for_output(
            shapes.output_shape,
            shapes.lhs_batch_dims.len(),
            lhs_row_dims.len(),
            shapes.rhs_batch_dims.len(),
            rhs_col_dims.len(),
        )?;

        if lhs_layout.num_cols != rhs_layout.num_rows {
            return Err(GemmError::ContractingMismatch {
                lhs: lhs_layout.num_cols,
                rhs: rhs_layout.num_rows,
            });
        }
        if output_layout.num_rows != lhs_layout.num_rows
            || output_layout.num_cols != rhs_layout.num_cols
        {
            return Err(GemmError::InvalidDimensionSet(format!(
                "output matrix is {}x{}, operands give {}x{}",
                output_layout.num_rows,
                output_layout.num_cols,
                lhs_layout.num_rows,
                rhs_layout.num_cols
            )));
        }
        for (name, layout) in [("lhs", &lhs_layout), ("rhs", &rhs_layout)] {
            if layout.batch_size != output_layout.batch_size && layout.batch_size != 1 {
                return Err(GemmError::InvalidDimensionSet(format!(
                    "{} batch size {} does not match output batch size {}",
                    name, layout.batch_size, output_layout.batch_size
                )));
            }
        }

        match shapes.output_shape.element_type() {
            PrimitiveType::F16
            | PrimitiveType::BF16
            | PrimitiveType::F32
            | PrimitiveType::F64
            | PrimitiveType::C64
            | PrimitiveType::C128 => {}
            other => {
                return Err(GemmError::UnsupportedOperation(format!(
                    "unexpected GEMM element type {}",
                    other
                )))
            }
        }

        let config = GemmConfig {
            lhs_layout,
            rhs_layout,
            output_layout,
            alpha,
            beta,
            algorithm,
            use_extended_backend,
        };
        debug!(
            "gemm config: m={} n={} k={} batch={} alpha={} beta={} algorithm={:?} extended={}",
            output_layout.num_rows,
            output_layout.num_cols,
            lhs_layout.num_cols,
            output_layout.batch_size,
            alpha,
            beta,
            algorithm,
            use_extended_backend
        );
        Ok(config)
    }

    /// Build a config from a dot instruction and its backend config.
    ///
    /// A transpose operand contributes its transposed result shape.
    pub fn for_instruction(dot: &DotInstruction) -> Result<Self> {
        let [lhs, rhs] = dot.operands.as_slice() else {
            return Err(GemmError::UnsupportedOperation(format!(
                "gemm expects 2 operands, got {}",
                dot.operands.len()
            )));
        };
        let lhs_shape = lhs.shape()?;
        let rhs_shape = rhs.shape()?;
        let dnums = &dot.dot_dimension_numbers;
        let config = &dot.backend_config;

        Self::for_shapes(
            &GemmShapes {
                lhs_shape: &lhs_shape,
                lhs_batch_dims: &dnums.lhs_batch_dims,
                lhs_contracting_dims: &dnums.lhs_contracting_dims,
                rhs_shape: &rhs_shape,
                rhs_batch_dims: &dnums.rhs_batch_dims,
                rhs_contracting_dims: &dnums.rhs_contracting_dims,
                output_shape: &dot.shape,
            },
            Complex64::new(config.alpha_real, config.alpha_imag),
            config.beta,
            config.selected_algorithm,
            dot.use_extended_backend,
        )
    }

    /// Build a config from a lowered gemm operation.
    ///
    /// A plain [`GemmOperation::Gemm`] never accumulates, so its beta is 0.
    pub fn for_operation(op: &GemmOperation, use_extended_backend: bool) -> Result<Self> {
        let from_attrs = |attrs: &GemmOpAttrs, beta: f64| {
            let dnums = &attrs.dot_dimension_numbers;
            Self::for_shapes(
                &GemmShapes {
                    lhs_shape: &attrs.lhs,
                    lhs_batch_dims: &dnums.lhs_batch_dims,
                    lhs_contracting_dims: &dnums.lhs_contracting_dims,
                    rhs_shape: &attrs.rhs,
                    rhs_batch_dims: &dnums.rhs_batch_dims,
                    rhs_contracting_dims: &dnums.rhs_contracting_dims,
                    output_shape: &attrs.output,
                },
                Complex64::new(attrs.alpha_real, attrs.alpha_imag),
                beta,
                attrs.algorithm,
                use_extended_backend,
            )
        };

        match op {
            GemmOperation::Gemm(attrs) => from_attrs(attrs, 0.0),
            GemmOperation::GemmBias { attrs, beta } => from_attrs(attrs, *beta),
            GemmOperation::Other { name } => Err(GemmError::UnsupportedOperation(format!(
                "unexpected operation {}",
                name
            ))),
        }
    }
}
