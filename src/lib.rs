//! Layout planning for batched GEMM dispatch.
//!
//! Given a tensor contraction described by operand shapes and their batch and
//! contracting dimensions, this crate derives everything a GEMM backend needs:
//!
//! - [`non_contracting_dims`]: classify the free dimensions of an operand
//! - [`batch_row_col_shape`]: collapse an operand to logical `(batch, rows, cols)`
//! - [`MatrixLayout`]: storage order, leading-dimension stride, batch stride
//! - [`GemmConfig`]: the three layouts plus alpha, beta, algorithm and backend flag
//! - [`can_fold_transpose_operand_into_dot`]: whether a transpose operand can be
//!   absorbed into its layout
//! - [`make_blas_gemm_compatible`]: rewrite a row-major output GEMM into the
//!   column-major form BLAS expects
//!
//! All functions are pure and operate on small metadata values.
//!
//! # Example
//!
//! ```
//! use gemm_plan::{GemmConfig, GemmShapes, PrimitiveType, Shape};
//! use num_complex::Complex64;
//!
//! // [b, m, k] x [b, k, n] -> [b, m, n]
//! let lhs = Shape::new(PrimitiveType::F32, &[2, 4, 16]);
//! let rhs = Shape::new(PrimitiveType::F32, &[2, 16, 8]);
//! let out = Shape::new(PrimitiveType::F32, &[2, 4, 8]);
//!
//! let config = GemmConfig::for_shapes(
//!     &GemmShapes {
//!         lhs_shape: &lhs, lhs_batch_dims: &[0], lhs_contracting_dims: &[2],
//!         rhs_shape: &rhs, rhs_batch_dims: &[0], rhs_contracting_dims: &[1],
//!         output_shape: &out,
//!     },
//!     Complex64::new(1.0, 0.0), 0.0, None, false,
//! ).unwrap();
//!
//! assert_eq!(config.lhs_layout.num_rows, 4);
//! assert_eq!(config.rhs_layout.num_cols, 8);
//! assert_eq!(config.output_layout.batch_stride, 32);
//! ```

/// Backend matrix descriptors and the column-major BLAS rewrite.
pub mod blas;
/// GEMM descriptor assembly.
pub mod config;
/// Batch / contracting / free dimension classification.
pub mod dims;
/// Transpose folding decision.
pub mod fold;
/// Matrix layouts of normalized operands.
pub mod layout;
/// Normalization of shapes to `(batch, rows, cols)`.
pub mod normalize;
/// Contraction operation values read by the planner.
pub mod op;

pub use gemm_shape::{PrimitiveType, Shape, ShapeError};

pub use blas::{make_blas_gemm_compatible, MatrixDescriptor, Transpose};
pub use config::{GemmConfig, GemmShapes};
pub use dims::non_contracting_dims;
pub use fold::{can_fold_transpose_operand_into_dot, FOLD_MIN_ELEMENT_BITS};
pub use layout::{MatrixLayout, Order};
pub use normalize::batch_row_col_shape;
pub use op::{
    DotDimensionNumbers, DotInstruction, GemmBackendConfig, GemmOpAttrs, GemmOperation, Operand,
    TransposeInstruction,
};

/// Errors produced while planning a GEMM.
#[derive(Debug, thiserror::Error)]
pub enum GemmError {
    /// Dimension groups overlap, are out of range, or do not partition a shape.
    #[error("invalid dimension set: {0}")]
    InvalidDimensionSet(String),

    /// A dimension group is not physically contiguous in its shape's layout.
    #[error("unsupported non-contiguous layout: {0}")]
    NonContiguousLayout(String),

    /// A derived row, column or batch extent is zero.
    #[error("degenerate extent: {0}")]
    DegenerateExtent(String),

    /// LHS and RHS contracting extents differ.
    #[error("contracting extent mismatch: lhs {lhs} vs rhs {rhs}")]
    ContractingMismatch { lhs: usize, rhs: usize },

    /// The operation, element type or layout cannot be expressed as a GEMM.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Convenience alias for `Result<T, GemmError>`.
pub type Result<T> = std::result::Result<T, GemmError>;
