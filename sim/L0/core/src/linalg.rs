//! Dense linear algebra over any [`Scalar`].
//!
//! The mass matrix is symmetric positive definite for a well-posed model, so
//! the equations of motion are solved with an in-place LDLᵀ factorization.
//! LDLᵀ needs no square roots, which keeps it usable for dual numbers.

use nalgebra::{DMatrix, DVector};
use plant_types::Scalar;
use tracing::warn;

/// Dense LDLᵀ factorization in place.
///
/// On exit the strict lower triangle of `m` holds the unit lower factor `L`
/// and the diagonal holds `D`. The upper triangle is left untouched.
///
/// A non-positive pivot means `m` is not positive definite. It is reported
/// through `tracing` and the factorization proceeds; the returned count is
/// the number of such pivots.
pub(crate) fn ldlt_in_place<T: Scalar>(m: &mut DMatrix<T>) -> usize {
    let n = m.nrows();
    let mut degenerate = 0;

    for j in 0..n {
        // D[j] = M[j,j] - Σ(L[j,k]²·D[k] for k < j)
        let mut d = m[(j, j)];
        for k in 0..j {
            d -= m[(j, k)] * m[(j, k)] * m[(k, k)];
        }
        if d.value() <= 0.0 {
            warn!(
                pivot = j,
                value = d.value(),
                "non-positive pivot in LDLᵀ; mass matrix is not positive definite"
            );
            degenerate += 1;
        }
        m[(j, j)] = d;

        // L[i,j] = (M[i,j] - Σ(L[i,k]·L[j,k]·D[k] for k < j)) / D[j]
        for i in (j + 1)..n {
            let mut sum = m[(i, j)];
            for k in 0..j {
                sum -= m[(i, k)] * m[(j, k)] * m[(k, k)];
            }
            m[(i, j)] = sum / d;
        }
    }
    degenerate
}

/// Solve L·D·Lᵀ·x = b in place, where `ld` holds the output of
/// [`ldlt_in_place`]. On entry `x` contains b; on exit `x` contains the solution.
pub(crate) fn ldlt_solve_in_place<T: Scalar>(ld: &DMatrix<T>, x: &mut DVector<T>) {
    let n = ld.nrows();

    // Forward substitution: L·y = b
    for j in 0..n {
        for k in 0..j {
            let l = ld[(j, k)];
            let xk = x[k];
            x[j] -= l * xk;
        }
    }

    // Diagonal: D·z = y
    for j in 0..n {
        let d = ld[(j, j)];
        x[j] /= d;
    }

    // Back substitution: Lᵀ·x = z
    for j in (0..n).rev() {
        for k in (j + 1)..n {
            let l = ld[(k, j)];
            let xk = x[k];
            x[j] -= l * xk;
        }
    }
}

/// Solve `m · x = b` for a symmetric `m`, consuming `m` as workspace.
pub(crate) fn solve_symmetric<T: Scalar>(mut m: DMatrix<T>, b: &DVector<T>) -> DVector<T> {
    ldlt_in_place(&mut m);
    let mut x = b.clone();
    ldlt_solve_in_place(&m, &mut x);
    x
}
