//! Sparse matrix utilities for assembly and the explicit solve
//!
//! Global beam matrices couple only neighbouring nodes, so they are stored in
//! CSR form and factorized with a skyline Cholesky that exploits the band.

use std::collections::BTreeSet;

use nalgebra::{DMatrix, DVector, SMatrix};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{FEAError, FEAResult};

/// Entries with magnitude at or below this are dropped after summation
pub const PRUNE_TOLERANCE: f64 = 1e-14;

/// Sparse matrix builder using COO format
/// More efficient for incremental assembly
pub struct SparseMatrixBuilder {
    size: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new sparse matrix builder
    pub fn new(size: usize) -> Self {
        // Two-node elements: 12 columns per DOF row, a little more at joints
        let estimated_nnz = size * 24;
        Self {
            size,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value != 0.0 {
            self.entries.push((row, col, value));
        }
    }

    /// Scatter a small fixed-size matrix at the given global DOFs
    pub fn add_element_matrix<const N: usize>(
        &mut self,
        dofs: &[usize; N],
        k_elem: &SMatrix<f64, N, N>,
    ) {
        for (i, &di) in dofs.iter().enumerate() {
            for (j, &dj) in dofs.iter().enumerate() {
                self.add(di, dj, k_elem[(i, j)]);
            }
        }
    }

    /// Convert to CSR, summing duplicates and pruning near-zero entries
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.size, self.size);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        prune(&CsrMatrix::from(&coo), PRUNE_TOLERANCE)
    }

    /// Convert to dense matrix (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.size, self.size);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Number of triplets pushed so far, duplicates included
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Get sparsity ratio
    pub fn sparsity(&self) -> f64 {
        let total = self.size * self.size;
        if total == 0 {
            return 1.0;
        }
        1.0 - (self.entries.len() as f64 / total as f64)
    }
}

/// Copy of `csr` without entries of magnitude `<= tolerance`
pub fn prune(csr: &CsrMatrix<f64>, tolerance: f64) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(csr.nrows(), csr.ncols());
    for (row, col, &val) in csr.triplet_iter() {
        if val.abs() > tolerance {
            coo.push(row, col, val);
        }
    }
    CsrMatrix::from(&coo)
}

/// `Σ cᵢ·Aᵢ` over square matrices of dimension `size`, pruned
pub fn scaled_sum(size: usize, terms: &[(f64, &CsrMatrix<f64>)]) -> FEAResult<CsrMatrix<f64>> {
    let mut builder = SparseMatrixBuilder::new(size);

    for (coefficient, matrix) in terms {
        if matrix.nrows() != size || matrix.ncols() != size {
            return Err(FEAError::SizeMismatch(format!(
                "expected {}x{} matrix, got {}x{}",
                size,
                size,
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        for (row, col, &val) in matrix.triplet_iter() {
            builder.add(row, col, coefficient * val);
        }
    }

    Ok(builder.to_csr())
}

/// Remove every entry in a constrained row or column and put 1 on its diagonal
pub fn eliminate_dofs(csr: &CsrMatrix<f64>, constrained: &BTreeSet<usize>) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(csr.nrows(), csr.ncols());

    for (row, col, &val) in csr.triplet_iter() {
        if !constrained.contains(&row) && !constrained.contains(&col) {
            coo.push(row, col, val);
        }
    }
    for &dof in constrained {
        coo.push(dof, dof, 1.0);
    }

    CsrMatrix::from(&coo)
}

/// Dense copy of a sparse matrix
pub fn to_dense(csr: &CsrMatrix<f64>) -> DMatrix<f64> {
    let mut mat = DMatrix::zeros(csr.nrows(), csr.ncols());
    for (row, col, &val) in csr.triplet_iter() {
        mat[(row, col)] += val;
    }
    mat
}

/// `A·x` for a CSR matrix
pub fn sparse_matvec(csr: &CsrMatrix<f64>, x: &DVector<f64>) -> DVector<f64> {
    DVector::from_iterator(
        csr.nrows(),
        csr.row_iter().map(|row| {
            row.col_indices()
                .iter()
                .zip(row.values())
                .map(|(&col, &val)| val * x[col])
                .sum::<f64>()
        }),
    )
}

/// Sparse Cholesky factorization for symmetric positive definite matrices
///
/// Skyline storage of the lower triangle: for each row, the entries from the
/// first non-zero up to and including the diagonal. The factor is computed
/// once and reused for every solve with the same matrix.
#[derive(Debug, Clone)]
pub struct SparseCholeskySolver {
    size: usize,
    skyline: Vec<Vec<f64>>,
    // Distance from the diagonal to the first stored column of each row
    heights: Vec<usize>,
}

impl SparseCholeskySolver {
    /// Copy the lower triangle of `csr` into skyline storage and factorize it
    pub fn factorize(csr: &CsrMatrix<f64>) -> FEAResult<Self> {
        if csr.nrows() != csr.ncols() {
            return Err(FEAError::SolveError(format!(
                "cannot factorize non-square {}x{} matrix",
                csr.nrows(),
                csr.ncols()
            )));
        }
        let size = csr.nrows();

        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                heights[row] = heights[row].max(row - col);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();

        for (row, col, &val) in csr.triplet_iter() {
            if col <= row {
                let idx = col - (row - heights[row]);
                skyline[row][idx] += val;
            }
        }

        let mut solver = Self {
            size,
            skyline,
            heights,
        };
        solver.factorize_in_place()?;
        Ok(solver)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Cholesky factorization `A = L·Lᵀ` in skyline storage
    fn factorize_in_place(&mut self) -> FEAResult<()> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;

            for j in start_i..i {
                let hj = self.heights[j];
                let start_j = j - hj;

                let start = start_i.max(start_j);
                let mut sum = 0.0;

                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let diag_j = self.skyline[j][hj];
                if diag_j.abs() < 1e-15 {
                    return Err(FEAError::SolveError(format!(
                        "zero pivot at row {} in Cholesky factorization",
                        j
                    )));
                }

                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / diag_j;
            }

            let mut sum = 0.0;
            for j in start_i..i {
                let val = self.get(i, j);
                sum += val * val;
            }

            let diag = self.skyline[i][hi] - sum;
            if diag <= 0.0 || diag.is_nan() {
                return Err(FEAError::SolveError(format!(
                    "matrix not positive definite at row {}",
                    i
                )));
            }
            self.skyline[i][hi] = diag.sqrt();
        }

        Ok(())
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        if col > row {
            return self.get(col, row);
        }
        let h = self.heights[row];
        let start = row - h;
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Solve `L·Lᵀ·x = b`
    pub fn solve(&self, b: &DVector<f64>) -> FEAResult<DVector<f64>> {
        if b.len() != self.size {
            return Err(FEAError::SizeMismatch(format!(
                "right-hand side has {} entries, factor has {}",
                b.len(),
                self.size
            )));
        }

        let mut x = b.clone();

        // Forward substitution: L * y = b
        for i in 0..self.size {
            let start = i - self.heights[i];

            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }

            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: L^T * x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);

            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        if x.iter().any(|v| !v.is_finite()) {
            return Err(FEAError::SolveError(
                "solution contains non-finite values".to_string(),
            ));
        }

        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tridiagonal() -> CsrMatrix<f64> {
        let mut builder = SparseMatrixBuilder::new(3);
        builder.add(0, 0, 4.0);
        builder.add(0, 1, -1.0);
        builder.add(1, 0, -1.0);
        builder.add(1, 1, 4.0);
        builder.add(1, 2, -1.0);
        builder.add(2, 1, -1.0);
        builder.add(2, 2, 4.0);
        builder.to_csr()
    }

    #[test]
    fn test_sparse_builder_sums_and_prunes() {
        let mut builder = SparseMatrixBuilder::new(4);
        builder.add(0, 0, 4.0);
        builder.add(0, 0, 1.0);
        builder.add(1, 1, 3.0);
        builder.add(2, 3, 1.0);
        builder.add(2, 3, -1.0 + 1e-16);
        builder.add(3, 3, 0.0);

        let dense = builder.to_dense();
        assert_relative_eq!(dense[(0, 0)], 5.0);
        assert_relative_eq!(dense[(1, 1)], 3.0);

        let csr = builder.to_csr();
        assert_eq!(csr.nnz(), 2);
        assert_relative_eq!(to_dense(&csr)[(0, 0)], 5.0);
    }

    #[test]
    fn test_scaled_sum() {
        let a = tridiagonal();
        let sum = scaled_sum(3, &[(1.0, &a), (-1.0, &a)]).unwrap();
        assert_eq!(sum.nnz(), 0);

        let sum = scaled_sum(3, &[(2.0, &a), (0.5, &a)]).unwrap();
        assert_relative_eq!(to_dense(&sum), to_dense(&a) * 2.5);

        let other = CsrMatrix::<f64>::zeros(2, 2);
        assert!(scaled_sum(3, &[(1.0, &other)]).is_err());
    }

    #[test]
    fn test_eliminate_dofs_idempotent() {
        let a = tridiagonal();
        let constrained: BTreeSet<usize> = [1].into_iter().collect();

        let once = eliminate_dofs(&a, &constrained);
        let twice = eliminate_dofs(&once, &constrained);

        let dense = to_dense(&once);
        assert_relative_eq!(dense[(1, 1)], 1.0);
        assert_relative_eq!(dense[(0, 1)], 0.0);
        assert_relative_eq!(dense[(2, 1)], 0.0);
        assert_relative_eq!(dense[(0, 0)], 4.0);
        assert_relative_eq!(to_dense(&twice), dense);
    }

    #[test]
    fn test_cholesky_solve() {
        let csr = tridiagonal();
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);

        let solver = SparseCholeskySolver::factorize(&csr).unwrap();
        let x = solver.solve(&b).unwrap();

        let ax = sparse_matvec(&csr, &x);
        assert_relative_eq!(ax, b, epsilon = 1e-12);

        // Reused factor
        let b2 = DVector::from_vec(vec![-1.0, 0.0, 5.0]);
        let x2 = solver.solve(&b2).unwrap();
        assert_relative_eq!(sparse_matvec(&csr, &x2), b2, epsilon = 1e-12);
    }

    #[test]
    fn test_cholesky_rejects_indefinite() {
        let mut builder = SparseMatrixBuilder::new(2);
        builder.add(0, 0, 1.0);
        builder.add(0, 1, 2.0);
        builder.add(1, 0, 2.0);
        builder.add(1, 1, 1.0);

        let result = SparseCholeskySolver::factorize(&builder.to_csr());
        assert!(matches!(result, Err(FEAError::SolveError(_))));
    }
}
