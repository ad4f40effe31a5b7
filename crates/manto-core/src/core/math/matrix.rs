use super::svd;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("matrix dimensions {lhs_rows}x{lhs_cols} and {rhs_rows}x{rhs_cols} are incompatible")]
    DimensionMismatch {
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },

    #[error("matrix is singular")]
    Singular,

    #[error("column index {index} out of range for {columns} columns")]
    ColumnOutOfRange { index: usize, columns: usize },

    #[error("operation requires a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },
}

/// A dense row-major matrix of `f64` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Builds a matrix from row slices. All rows must share the length of the
    /// first; shorter or longer rows are a caller bug and will panic.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(rows.len() * n);
        for row in rows {
            assert_eq!(row.len(), n, "ragged row in Matrix::from_rows");
            data.extend_from_slice(row);
        }
        Self {
            rows: rows.len(),
            cols: n,
            data,
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.set(i, i, 1.0);
        }
        m
    }

    /// A single-column matrix from a value slice.
    pub fn column_vector(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set(j, i, self.get(i, j));
            }
        }
        out
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn add_scalar(&self, value: f64) -> Matrix {
        self.map(|a| a + value)
    }

    pub fn sub_scalar(&self, value: f64) -> Matrix {
        self.map(|a| a - value)
    }

    pub fn scale(&self, value: f64) -> Matrix {
        self.map(|a| a * value)
    }

    fn map(&self, f: impl Fn(f64) -> f64) -> Matrix {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|a| f(*a)).collect(),
        }
    }

    fn zip_with(&self, other: &Matrix, f: impl Fn(f64, f64) -> f64) -> Result<Matrix, MatrixError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(self.dimension_mismatch(other));
        }
        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }

    pub fn mul(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        if self.cols != other.rows {
            return Err(self.dimension_mismatch(other));
        }
        let mut out = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                for j in 0..other.cols {
                    let v = out.get(i, j) + a * other.get(k, j);
                    out.set(i, j, v);
                }
            }
        }
        Ok(out)
    }

    fn dimension_mismatch(&self, other: &Matrix) -> MatrixError {
        MatrixError::DimensionMismatch {
            lhs_rows: self.rows,
            lhs_cols: self.cols,
            rhs_rows: other.rows,
            rhs_cols: other.cols,
        }
    }

    /// The main diagonal, `min(rows, cols)` entries long.
    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.rows.min(self.cols))
            .map(|i| self.get(i, i))
            .collect()
    }

    /// A new matrix holding the listed columns, in list order.
    pub fn columns(&self, indices: &[usize]) -> Result<Matrix, MatrixError> {
        for &index in indices {
            if index >= self.cols {
                return Err(MatrixError::ColumnOutOfRange {
                    index,
                    columns: self.cols,
                });
            }
        }
        let mut out = Matrix::zeros(self.rows, indices.len());
        for i in 0..self.rows {
            for (j, &index) in indices.iter().enumerate() {
                out.set(i, j, self.get(i, index));
            }
        }
        Ok(out)
    }

    /// Solves `A x = b` for a square `A` and single-column `b` by Gaussian
    /// elimination with partial pivoting.
    pub fn solve(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        let n = self.rows;
        if self.rows != self.cols {
            return Err(MatrixError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if rhs.rows != n || rhs.cols != 1 {
            return Err(self.dimension_mismatch(rhs));
        }

        let mut a = self.clone();
        let mut b = rhs.clone();

        for i in 0..n {
            let mut pivot = i;
            for j in (i + 1)..n {
                if a.get(j, i).abs() > a.get(pivot, i).abs() {
                    pivot = j;
                }
            }
            a.swap_rows(i, pivot);
            b.swap_rows(i, pivot);

            if a.get(i, i) == 0.0 {
                return Err(MatrixError::Singular);
            }

            for j in (i + 1)..n {
                let factor = a.get(j, i) / a.get(i, i);
                let v = b.get(j, 0) - b.get(i, 0) * factor;
                b.set(j, 0, v);
                for k in (i + 1)..n {
                    let v = a.get(j, k) - a.get(i, k) * factor;
                    a.set(j, k, v);
                }
                a.set(j, i, 0.0);
            }
        }

        let mut x = Matrix::zeros(n, 1);
        for j in (0..n).rev() {
            let mut t = 0.0;
            for k in (j + 1)..n {
                t += a.get(j, k) * x.get(k, 0);
            }
            x.set(j, 0, (b.get(j, 0) - t) / a.get(j, j));
        }
        Ok(x)
    }

    /// Inverts a square matrix by Gauss-Jordan elimination with partial
    /// pivoting. A pivot of exactly zero reports [`MatrixError::Singular`].
    pub fn invert(&self) -> Result<Matrix, MatrixError> {
        let n = self.rows;
        if self.rows != self.cols {
            return Err(MatrixError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let mut a = self.clone();
        let mut inv = Matrix::identity(n);

        for i in 0..n {
            let mut pivot_row = i;
            for j in (i + 1)..n {
                if a.get(j, i).abs() > a.get(pivot_row, i).abs() {
                    pivot_row = j;
                }
            }
            a.swap_rows(i, pivot_row);
            inv.swap_rows(i, pivot_row);

            let pivot = a.get(i, i);
            if pivot == 0.0 {
                return Err(MatrixError::Singular);
            }

            for j in 0..n {
                let v = a.get(i, j) / pivot;
                a.set(i, j, v);
            }
            for j in 0..n {
                let v = inv.get(i, j) / pivot;
                inv.set(i, j, v);
            }

            for j in 0..n {
                if j == i {
                    continue;
                }
                let factor = a.get(j, i);
                if factor == 0.0 {
                    continue;
                }
                for k in 0..n {
                    let v = a.get(j, k) - factor * a.get(i, k);
                    a.set(j, k, v);
                }
                for k in 0..n {
                    let v = inv.get(j, k) - factor * inv.get(i, k);
                    inv.set(j, k, v);
                }
            }
        }
        Ok(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }

    /// Maximum absolute column sum.
    pub fn norm1(&self) -> f64 {
        let mut f: f64 = 0.0;
        for j in 0..self.cols {
            let mut s = 0.0;
            for i in 0..self.rows {
                s += self.get(i, j).abs();
            }
            f = f.max(s);
        }
        f
    }

    /// Maximum absolute row sum.
    pub fn norm_inf(&self) -> f64 {
        let mut f: f64 = 0.0;
        for i in 0..self.rows {
            let s: f64 = self.row(i).iter().map(|v| v.abs()).sum();
            f = f.max(s);
        }
        f
    }

    /// Frobenius norm, accumulated with `hypot` for stability.
    pub fn norm_frobenius(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, v| acc.hypot(*v))
    }

    /// Largest singular value.
    pub fn norm2(&self) -> f64 {
        svd::singular_values(self).first().copied().unwrap_or(0.0)
    }

    /// Numerical rank: the number of singular values above
    /// `max(rows, cols) * sigma_0 * machine_epsilon`.
    pub fn rank(&self) -> usize {
        let s = svd::singular_values(self);
        let Some(&s0) = s.first() else {
            return 0;
        };
        let tolerance = self.rows.max(self.cols) as f64 * s0 * f64::EPSILON;
        s.iter().filter(|v| **v > tolerance).count()
    }

    /// Per-column maximum absolute value, the factor vector consumed by
    /// [`Matrix::normalize`].
    pub fn normalization_factors(&self) -> Vec<f64> {
        (0..self.cols)
            .map(|j| {
                let mut factor: f64 = 0.0;
                for i in 0..self.rows {
                    factor = factor.max(self.get(i, j).abs());
                }
                factor
            })
            .collect()
    }

    /// Divides each column by its factor, skipping columns whose factor is
    /// zero or NaN. `normalize` followed by [`Matrix::denormalize`] with the
    /// same factors is the identity up to floating round-off.
    pub fn normalize(&self, factors: &[f64]) -> Matrix {
        self.scale_columns(factors, |value, factor| value / factor)
    }

    /// Multiplies each column by its factor, skipping zero/NaN factors.
    pub fn denormalize(&self, factors: &[f64]) -> Matrix {
        self.scale_columns(factors, |value, factor| value * factor)
    }

    fn scale_columns(&self, factors: &[f64], f: impl Fn(f64, f64) -> f64) -> Matrix {
        let mut out = self.clone();
        for (j, &factor) in factors.iter().enumerate().take(self.cols) {
            if factor == 0.0 || factor.is_nan() {
                continue;
            }
            for i in 0..self.rows {
                out.set(i, j, f(self.get(i, j), factor));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference_matrix() -> Matrix {
        Matrix::from_rows(&[
            vec![2.0, 0.0, 1.0],
            vec![-1.0, 1.0, 0.0],
            vec![-3.0, 3.0, 0.0],
        ])
    }

    #[test]
    fn transpose_is_an_involution() {
        let m = reference_matrix();
        assert_eq!(m.transpose().transpose(), m);
    }

    #[test]
    fn closed_form_norms_match_hand_computation() {
        let m = reference_matrix();
        assert_relative_eq!(m.norm1(), 6.0);
        assert_relative_eq!(m.norm_inf(), 6.0);
        assert_relative_eq!(m.norm_frobenius(), 5.0);
    }

    #[test]
    fn invert_round_trips_within_tolerance() {
        let m = Matrix::from_rows(&[
            vec![4.0, 7.0, 2.0],
            vec![3.0, 6.0, 1.0],
            vec![2.0, 5.0, 3.0],
        ]);
        let back = m.invert().unwrap().invert().unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(back.get(i, j), m.get(i, j), epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn invert_times_original_is_identity() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
        let prod = m.invert().unwrap().mul(&m).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(prod.get(i, j), expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn singular_matrix_fails_to_invert() {
        let m = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0]]);
        assert_eq!(m.invert().unwrap_err(), MatrixError::Singular);
    }

    #[test]
    fn solve_recovers_known_solution() {
        let a = Matrix::from_rows(&[vec![3.0, 1.0], vec![1.0, 2.0]]);
        let b = Matrix::column_vector(&[9.0, 8.0]);
        let x = a.solve(&b).unwrap();
        assert_relative_eq!(x.get(0, 0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(x.get(1, 0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn columns_extracts_in_list_order() {
        let m = reference_matrix();
        let sub = m.columns(&[2, 0]).unwrap();
        assert_eq!(sub.cols(), 2);
        assert_eq!(sub.get(0, 0), 1.0);
        assert_eq!(sub.get(0, 1), 2.0);
    }

    #[test]
    fn out_of_range_column_is_an_error() {
        let m = reference_matrix();
        assert_eq!(
            m.columns(&[0, 3]).unwrap_err(),
            MatrixError::ColumnOutOfRange {
                index: 3,
                columns: 3
            }
        );
    }

    #[test]
    fn normalize_then_denormalize_is_identity() {
        let m = Matrix::from_rows(&[vec![2.0, -8.0, 1.5], vec![-4.0, 2.0, 0.5]]);
        let factors = m.normalization_factors();
        assert_eq!(factors, vec![4.0, 8.0, 1.5]);
        let back = m.normalize(&factors).denormalize(&factors);
        for i in 0..2 {
            for j in 0..3 {
                assert_relative_eq!(back.get(i, j), m.get(i, j), epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn zero_factor_columns_are_left_untouched() {
        let m = Matrix::from_rows(&[vec![0.0, 2.0], vec![0.0, -4.0]]);
        let factors = m.normalization_factors();
        assert_eq!(factors, vec![0.0, 4.0]);
        let n = m.normalize(&factors);
        assert_eq!(n.get(0, 0), 0.0);
        assert_relative_eq!(n.get(0, 1), 0.5);
    }

    #[test]
    fn rank_counts_independent_columns() {
        let full = Matrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]);
        assert_eq!(full.rank(), 2);

        let deficient = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 6.0]]);
        assert_eq!(deficient.rank(), 1);
    }

    #[test]
    fn norm2_matches_largest_singular_value_of_diagonal() {
        let m = Matrix::from_rows(&[vec![3.0, 0.0], vec![0.0, -2.0]]);
        assert_relative_eq!(m.norm2(), 3.0, epsilon = 1e-10);
    }
}
