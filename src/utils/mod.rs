use ndarray::{ArrayView2, Zip};

use crate::error::{NumericError, Result};

/// Frobenius norm, `sqrt(sum(a_ij^2))`.
pub fn frobenius_norm(a: ArrayView2<f64>) -> f64 {
    a.iter().map(|&x| x * x).sum::<f64>().sqrt()
}

/// Frobenius norm of `approx - reference`, relative to the norm of `reference`.
///
/// A zero reference yields the absolute error instead, so an all-zero matrix
/// reconstructed as all zeros has error `0.0` rather than `NaN`.
pub fn relative_error(reference: ArrayView2<f64>, approx: ArrayView2<f64>) -> f64 {
    let diff = Zip::from(&reference)
        .and(&approx)
        .fold(0.0, |acc, &r, &a| acc + (r - a) * (r - a))
        .sqrt();
    let norm = frobenius_norm(reference);
    if norm > 0.0 {
        diff / norm
    } else {
        diff
    }
}

/// Element-wise `|a - b| <= atol + rtol * |b|` over two equally shaped matrices.
pub fn all_close(a: ArrayView2<f64>, b: ArrayView2<f64>, rtol: f64, atol: f64) -> bool {
    a.dim() == b.dim()
        && Zip::from(&a)
            .and(&b)
            .all(|&x, &y| (x - y).abs() <= atol + rtol * y.abs())
}

/// Rejects empty matrices and the first non-finite entry, in row-major order.
pub fn ensure_decomposable(a: ArrayView2<f64>) -> Result<()> {
    let (rows, cols) = a.dim();
    if rows == 0 || cols == 0 {
        return Err(NumericError::Empty { rows, cols }.into());
    }
    if let Some(((row, col), &value)) = a.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(NumericError::NonFinite { row, col, value }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;
    use ndarray::{array, Array2};

    #[test]
    fn test_frobenius_norm() {
        let a = array![[3.0, 0.0], [0.0, 4.0]];
        assert_relative_eq!(frobenius_norm(a.view()), 5.0);
    }

    #[test]
    fn test_relative_error_zero_reference() {
        let zeros = Array2::<f64>::zeros((3, 3));
        assert_eq!(relative_error(zeros.view(), zeros.view()), 0.0);

        let ones = Array2::<f64>::ones((3, 3));
        assert_relative_eq!(relative_error(zeros.view(), ones.view()), 3.0);

        let a = array![[2.0, 0.0], [0.0, 0.0]];
        let b = array![[1.0, 0.0], [0.0, 0.0]];
        assert_relative_eq!(relative_error(a.view(), b.view()), 0.5);
    }

    #[test]
    fn test_all_close() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.0 + 1e-9, 2.0], [3.0, 4.0]];
        let c = array![[1.1, 2.0], [3.0, 4.0]];
        assert!(all_close(a.view(), b.view(), 1e-5, 1e-8));
        assert!(!all_close(a.view(), c.view(), 1e-5, 1e-8));
        assert!(!all_close(a.view(), array![[1.0, 2.0]].view(), 1e-5, 1e-8));
    }

    #[test]
    fn test_ensure_decomposable() {
        assert!(ensure_decomposable(array![[1.0, 2.0]].view()).is_ok());

        let empty = Array2::<f64>::zeros((0, 3));
        assert_eq!(
            ensure_decomposable(empty.view()),
            Err(Error::Numeric(NumericError::Empty { rows: 0, cols: 3 }))
        );

        let bad = array![[1.0, 2.0], [f64::INFINITY, 0.0]];
        match ensure_decomposable(bad.view()) {
            Err(Error::Numeric(NumericError::NonFinite { row, col, .. })) => {
                assert_eq!((row, col), (1, 0));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }
}
