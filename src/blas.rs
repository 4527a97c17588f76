//! Backend matrix descriptors and the column-major BLAS rewrite.
//!
//! BLAS `?gemm` computes a column-major output. A row-major output `C` is the
//! column-major matrix `C^T`, so the problem is rewritten with the identity
//! `C^T = (A B)^T = B^T A^T`: swap `m`/`n`, swap the operands, and read every
//! operand as its transpose. No data moves; only descriptors change.

use crate::layout::{MatrixLayout, Order};

/// BLAS operand transpose flag for a column-major GEMM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transpose {
    NoTranspose,
    Transpose,
}

/// A matrix (batch) in device memory as handed to the GEMM backend.
///
/// `D` is the caller's opaque device memory handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixDescriptor<D> {
    pub data: D,
    pub num_rows: usize,
    pub num_cols: usize,
    pub order: Order,
    pub leading_dim_stride: usize,
    pub batch_stride: usize,
}

impl<D> MatrixDescriptor<D> {
    /// Describe the matrices of `layout` stored at `data`.
    pub fn new(layout: &MatrixLayout, data: D) -> Self {
        Self {
            data,
            num_rows: layout.num_rows,
            num_cols: layout.num_cols,
            order: layout.order,
            leading_dim_stride: layout.leading_dim_stride,
            batch_stride: layout.batch_stride,
        }
    }

    /// Reinterpret the same memory as the transposed matrix.
    pub fn transpose(&mut self) {
        std::mem::swap(&mut self.num_rows, &mut self.num_cols);
        self.order = self.order.flip();
    }

    /// Transpose flag for a column-major GEMM call: row-major storage is read
    /// as the transpose of a column-major matrix.
    pub fn blas_transpose(&self) -> Transpose {
        match self.order {
            Order::ColumnMajor => Transpose::NoTranspose,
            Order::RowMajor => Transpose::Transpose,
        }
    }
}

/// Rewrite `output = lhs @ rhs` (`m x n`) so that the output is column-major.
///
/// No-op if `output` is already column-major, so applying it twice is the
/// same as applying it once.
pub fn make_blas_gemm_compatible<D>(
    m: &mut usize,
    n: &mut usize,
    lhs: &mut MatrixDescriptor<D>,
    rhs: &mut MatrixDescriptor<D>,
    output: &mut MatrixDescriptor<D>,
) {
    if output.order == Order::ColumnMajor {
        return;
    }
    std::mem::swap(m, n);
    std::mem::swap(lhs, rhs);
    lhs.transpose();
    rhs.transpose();
    output.transpose();
}
