//! Matrix layouts: storage order and strides of a (batched) GEMM operand.

use crate::normalize::batch_row_col_shape;
use crate::{GemmError, Result};
use gemm_shape::{PrimitiveType, Shape};
use log::debug;

/// Physical storage order of a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Elements in the same row are contiguous in memory.
    RowMajor,
    /// Elements in the same column are contiguous in memory.
    ColumnMajor,
}

impl Order {
    /// The opposite order.
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Order::RowMajor => Order::ColumnMajor,
            Order::ColumnMajor => Order::RowMajor,
        }
    }
}

/// Addressing information for a batch of equally shaped matrices.
///
/// `num_rows` / `num_cols` describe the logical matrix: the contracting
/// dimension has size `num_cols` for the LHS operand and `num_rows` for the
/// RHS operand. Like BLAS, only two strides are available, so either rows or
/// columns must be the most minor physical dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixLayout {
    pub dtype: PrimitiveType,
    pub num_rows: usize,
    pub num_cols: usize,
    pub order: Order,
    /// Elements between consecutive rows (row-major) or columns (column-major).
    pub leading_dim_stride: usize,
    pub batch_size: usize,
    /// Elements between consecutive matrices; `0` when `batch_size == 1`.
    pub batch_stride: usize,
}

impl MatrixLayout {
    /// Layout of a rank-3 shape whose dimensions are logical `(batch, rows, cols)`.
    ///
    /// # Errors
    ///
    /// - [`GemmError::InvalidDimensionSet`] if `shape` is not rank 3, or its
    ///   element count overflows `usize`.
    /// - [`GemmError::DegenerateExtent`] if any of the three extents is 0.
    /// - [`GemmError::UnsupportedOperation`] if the batch dimension is the most
    ///   minor physical dimension.
    pub fn for_shape(shape: &Shape) -> Result<Self> {
        let (&[batch_size, num_rows, num_cols], &[minor, middle, major]) =
            (shape.dims(), shape.minor_to_major())
        else {
            return Err(GemmError::InvalidDimensionSet(format!(
                "expected a (batch, rows, cols) shape, got {}",
                shape
            )));
        };
        if batch_size == 0 || num_rows == 0 || num_cols == 0 {
            return Err(GemmError::DegenerateExtent(format!(
                "matrix shape {} has a zero extent",
                shape
            )));
        }
        // Every stride below is bounded by the total element count.
        let matrix_size = num_rows
            .checked_mul(num_cols)
            .filter(|size| size.checked_mul(batch_size).is_some())
            .ok_or_else(|| {
                GemmError::InvalidDimensionSet(format!(
                    "element count of matrix shape {} overflows usize",
                    shape
                ))
            })?;

        let (order, leading_dim_stride, batch_stride) = match (major, middle, minor) {
            // (B, R, C)
            (0, 1, 2) => (Order::RowMajor, num_cols, matrix_size),
            // (B, C, R)
            (0, 2, 1) => (Order::ColumnMajor, num_rows, matrix_size),
            // (R, B, C)
            (1, 0, 2) => (Order::RowMajor, batch_size * num_cols, num_cols),
            // (C, B, R)
            (2, 0, 1) => (Order::ColumnMajor, batch_size * num_rows, num_rows),
            _ => {
                return Err(GemmError::UnsupportedOperation(format!(
                    "batch in most minor dimension of {}",
                    shape
                )))
            }
        };

        let layout = MatrixLayout {
            dtype: shape.element_type(),
            num_rows,
            num_cols,
            order,
            leading_dim_stride,
            batch_size,
            batch_stride: if batch_size == 1 { 0 } else { batch_stride },
        };
        debug!("matrix layout for {}: {:?}", shape, layout);
        Ok(layout)
    }

    /// Layout of `shape` with explicit batch, row and column dimension groups.
    ///
    /// See [`batch_row_col_shape`] for the requirements on the groups.
    pub fn for_dims(
        shape: &Shape,
        batch_dims: &[usize],
        row_dims: &[usize],
        col_dims: &[usize],
    ) -> Result<Self> {
        let normalized = batch_row_col_shape(shape, batch_dims, row_dims, col_dims)?;
        Self::for_shape(&normalized)
    }

    /// Layout of a GEMM output shape.
    ///
    /// Output dimensions are ordered batch dims, then LHS non-contracting
    /// (row) dims, then RHS non-contracting (column) dims. The number of batch
    /// dims is the larger of the two operands' counts.
    pub fn for_output(
        shape: &Shape,
        lhs_num_batch_dims: usize,
        lhs_num_row_dims: usize,
        rhs_num_batch_dims: usize,
        rhs_num_col_dims: usize,
    ) -> Result<Self> {
        let num_batch_dims = lhs_num_batch_dims.max(rhs_num_batch_dims);
        let expected_rank = num_batch_dims + lhs_num_row_dims + rhs_num_col_dims;
        if shape.rank() != expected_rank {
            return Err(GemmError::InvalidDimensionSet(format!(
                "output {} has rank {}, expected {} batch + {} row + {} column dims",
                shape,
                shape.rank(),
                num_batch_dims,
                lhs_num_row_dims,
                rhs_num_col_dims
            )));
        }

        let dims: Vec<usize> = (0..shape.rank()).collect();
        let (batch_dims, rest) = dims.split_at(num_batch_dims);
        let (row_dims, col_dims) = rest.split_at(lhs_num_row_dims);
        Self::for_dims(shape, batch_dims, row_dims, col_dims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brc(dims: &[usize], minor_to_major: &[usize]) -> Shape {
        Shape::with_layout(PrimitiveType::F32, dims, minor_to_major).unwrap()
    }

    #[test]
    fn test_unbatched_row_major() {
        let layout = MatrixLayout::for_shape(&brc(&[1, 4, 8], &[2, 1, 0])).unwrap();
        assert_eq!(layout.order, Order::RowMajor);
        assert_eq!(layout.num_rows, 4);
        assert_eq!(layout.num_cols, 8);
        assert_eq!(layout.leading_dim_stride, 8);
        assert_eq!(layout.batch_size, 1);
        assert_eq!(layout.batch_stride, 0);
    }

    #[test]
    fn test_batch_outermost() {
        let layout = MatrixLayout::for_shape(&brc(&[3, 4, 8], &[2, 1, 0])).unwrap();
        assert_eq!(layout.batch_size, 3);
        assert_eq!(layout.batch_stride, 32);
        assert_eq!(layout.leading_dim_stride, 8);
    }

    #[test]
    fn test_column_major() {
        let layout = MatrixLayout::for_shape(&brc(&[3, 4, 8], &[1, 2, 0])).unwrap();
        assert_eq!(layout.order, Order::ColumnMajor);
        assert_eq!(layout.leading_dim_stride, 4);
        assert_eq!(layout.batch_stride, 32);
    }

    #[test]
    fn test_batch_between_rows_and_cols() {
        // (R, B, C)
        let layout = MatrixLayout::for_shape(&brc(&[3, 4, 8], &[2, 0, 1])).unwrap();
        assert_eq!(layout.order, Order::RowMajor);
        assert_eq!(layout.leading_dim_stride, 24);
        assert_eq!(layout.batch_stride, 8);

        // (C, B, R)
        let layout = MatrixLayout::for_shape(&brc(&[3, 4, 8], &[1, 0, 2])).unwrap();
        assert_eq!(layout.order, Order::ColumnMajor);
        assert_eq!(layout.leading_dim_stride, 12);
        assert_eq!(layout.batch_stride, 4);
    }

    #[test]
    fn test_unit_batch_zeroes_stride_for_interleaved_batch() {
        let layout = MatrixLayout::for_shape(&brc(&[1, 4, 8], &[2, 0, 1])).unwrap();
        assert_eq!(layout.batch_stride, 0);
        assert_eq!(layout.leading_dim_stride, 8);
    }

    #[test]
    fn test_batch_most_minor_rejected() {
        let err = MatrixLayout::for_shape(&brc(&[3, 4, 8], &[0, 2, 1])).unwrap_err();
        assert!(matches!(err, GemmError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_zero_extent_rejected() {
        let err = MatrixLayout::for_shape(&brc(&[1, 0, 8], &[2, 1, 0])).unwrap_err();
        assert!(matches!(err, GemmError::DegenerateExtent(_)));
    }

    #[test]
    fn test_extent_overflow_rejected() {
        let huge = usize::MAX / 2 + 1;
        let err = MatrixLayout::for_shape(&brc(&[1, huge, 2], &[2, 1, 0])).unwrap_err();
        assert!(matches!(err, GemmError::InvalidDimensionSet(_)));

        // Each matrix fits, but the whole batch does not.
        let err = MatrixLayout::for_shape(&brc(&[2, huge, 1], &[2, 0, 1])).unwrap_err();
        assert!(matches!(err, GemmError::InvalidDimensionSet(_)));

        #[cfg(target_pointer_width = "64")]
        {
            let s = Shape::new(PrimitiveType::F32, &[1 << 33, 1 << 33]);
            let err = MatrixLayout::for_dims(&s, &[], &[0], &[1]).unwrap_err();
            assert!(matches!(err, GemmError::InvalidDimensionSet(_)));
        }
    }

    #[test]
    fn test_wrong_rank_rejected() {
        let err = MatrixLayout::for_shape(&Shape::new(PrimitiveType::F32, &[4, 8])).unwrap_err();
        assert!(matches!(err, GemmError::InvalidDimensionSet(_)));
    }

    #[test]
    fn test_for_dims_transposed_operand() {
        // [k, m] row-major used as LHS with rows = m, cols = k
        let s = Shape::new(PrimitiveType::F32, &[16, 4]);
        let layout = MatrixLayout::for_dims(&s, &[], &[1], &[0]).unwrap();
        assert_eq!(layout.num_rows, 4);
        assert_eq!(layout.num_cols, 16);
        assert_eq!(layout.order, Order::ColumnMajor);
        assert_eq!(layout.leading_dim_stride, 4);
    }

    #[test]
    fn test_for_output_positional_groups() {
        let s = Shape::new(PrimitiveType::F32, &[2, 3, 4, 8]);
        let layout = MatrixLayout::for_output(&s, 1, 2, 1, 1).unwrap();
        assert_eq!(layout.batch_size, 2);
        assert_eq!(layout.num_rows, 12);
        assert_eq!(layout.num_cols, 8);
        assert_eq!(layout.batch_stride, 96);
    }

    #[test]
    fn test_for_output_broadcast_batch() {
        // LHS carries a batch dim, RHS does not
        let s = Shape::new(PrimitiveType::F32, &[2, 4, 8]);
        let layout = MatrixLayout::for_output(&s, 1, 1, 0, 1).unwrap();
        assert_eq!(layout.batch_size, 2);
    }

    #[test]
    fn test_for_output_rank_mismatch() {
        let s = Shape::new(PrimitiveType::F32, &[2, 4, 8]);
        let err = MatrixLayout::for_output(&s, 0, 1, 0, 1).unwrap_err();
        assert!(matches!(err, GemmError::InvalidDimensionSet(_)));
    }

    #[test]
    fn test_order_flip() {
        assert_eq!(Order::RowMajor.flip(), Order::ColumnMajor);
        assert_eq!(Order::ColumnMajor.flip().flip(), Order::ColumnMajor);
    }
}
