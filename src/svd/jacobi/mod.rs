//! One-sided (Hestenes) Jacobi SVD.
//!
//! Plane rotations are applied to pairs of columns of a working copy of `A`
//! until every pair is numerically orthogonal; the column norms are then the
//! singular values. Inputs with more columns than rows are processed as their
//! transpose.

use log::trace;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::{RawFactors, SvdBackend};
use crate::error::{NumericError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobiSvd {
    tolerance: f64,
    max_sweeps: usize,
}

impl JacobiSvd {
    /// A column pair counts as orthogonal once `|<a_p, a_q>| <= tolerance * |a_p| * |a_q|`,
    /// or once the inner product is at round-off level relative to `|A|^2`.
    pub fn new(tolerance: f64, max_sweeps: usize) -> Self {
        JacobiSvd {
            tolerance,
            max_sweeps,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn max_sweeps(&self) -> usize {
        self.max_sweeps
    }

    fn column_norm(matrix: &Array2<f64>, col: usize) -> f64 {
        matrix.column(col).dot(&matrix.column(col)).sqrt()
    }

    /// Smallest inner product worth rotating away. Columns that have collapsed
    /// to round-off noise never become relatively orthogonal, so rank-deficient
    /// inputs need this absolute floor to converge.
    fn rotation_floor(a: ArrayView2<f64>) -> f64 {
        let squared_norm: f64 = a.iter().map(|x| x * x).sum();
        f64::MIN_POSITIVE.max(2.0 * f64::EPSILON * squared_norm)
    }

    /// Rotation `(c, s)` orthogonalizing columns `p` and `q`, or `None` if they already are.
    fn compute_rotation(
        &self,
        work: &Array2<f64>,
        p: usize,
        q: usize,
        floor: f64,
    ) -> Option<(f64, f64)> {
        let alpha = work.column(p).dot(&work.column(p));
        let beta = work.column(q).dot(&work.column(q));
        let gamma = work.column(p).dot(&work.column(q));

        let threshold = floor.max(self.tolerance * (alpha * beta).sqrt());
        if gamma.abs() <= threshold {
            return None;
        }

        let zeta = (beta - alpha) / (2.0 * gamma);
        let t = zeta.signum() / (zeta.abs() + (1.0 + zeta * zeta).sqrt());
        let c = 1.0 / (1.0 + t * t).sqrt();
        Some((c, c * t))
    }

    fn apply_rotation(matrix: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
        for mut row in matrix.rows_mut() {
            let xp = row[p];
            let xq = row[q];
            row[p] = c * xp - s * xq;
            row[q] = s * xp + c * xq;
        }
    }

    /// Tall case, `m >= n`. Returns `(U, s, V)` with `V` square `n x n`.
    fn orthogonalize(
        &self,
        a: ArrayView2<f64>,
    ) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>)> {
        let n = a.ncols();
        let floor = Self::rotation_floor(a);
        let mut work = a.to_owned();
        let mut v = Array2::<f64>::eye(n);

        let mut sweep = 0;
        loop {
            let mut rotated = 0usize;
            for p in 0..n.saturating_sub(1) {
                for q in p + 1..n {
                    if let Some((c, s)) = self.compute_rotation(&work, p, q, floor) {
                        Self::apply_rotation(&mut work, p, q, c, s);
                        Self::apply_rotation(&mut v, p, q, c, s);
                        rotated += 1;
                    }
                }
            }
            sweep += 1;
            trace!("Jacobi sweep {} applied {} rotations", sweep, rotated);

            if rotated == 0 {
                break;
            }
            if sweep >= self.max_sweeps {
                return Err(NumericError::NoConvergence {
                    iterations: self.max_sweeps,
                }
                .into());
            }
        }

        let s = Array1::from_shape_fn(n, |j| Self::column_norm(&work, j));
        // Columns with a zero singular value stay zero; they never contribute
        // to a reconstruction.
        for (mut col, &sigma) in work.axis_iter_mut(Axis(1)).zip(s.iter()) {
            if sigma > 0.0 {
                col /= sigma;
            }
        }
        Ok((work, s, v))
    }
}

impl Default for JacobiSvd {
    fn default() -> Self {
        Self::new(1e-12, 60)
    }
}

impl SvdBackend for JacobiSvd {
    fn compute(&self, matrix: ArrayView2<f64>) -> Result<RawFactors> {
        let (m, n) = matrix.dim();
        if m >= n {
            let (u, s, v) = self.orthogonalize(matrix)?;
            Ok((u, s, v.reversed_axes()))
        } else {
            // A^T = U' S V'^T  =>  A = V' S U'^T
            let (u_t, s, v_t) = self.orthogonalize(matrix.t())?;
            Ok((v_t, s, u_t.reversed_axes()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_diagonal_needs_no_rotation() {
        let a = array![[3.0, 0.0], [0.0, 5.0], [0.0, 0.0]];
        let (u, s, vt) = JacobiSvd::default().compute(a.view()).unwrap();
        assert_eq!(s, array![3.0, 5.0]);
        assert_eq!(vt, Array2::<f64>::eye(2));
        assert_eq!(u.dim(), (3, 2));
    }

    #[test]
    fn test_wide_input_shapes() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let (u, s, vt) = JacobiSvd::default().compute(a.view()).unwrap();
        assert_eq!(u.dim(), (2, 2));
        assert_eq!(s.len(), 2);
        assert_eq!(vt.dim(), (2, 3));

        let scaled = &u * &s.view().insert_axis(Axis(0));
        let r = scaled.dot(&vt);
        for (x, y) in r.iter().zip(a.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sweep_limit() {
        let a = array![[1.0, 2.0, 0.5], [3.0, 4.0, 1.5], [0.1, -2.0, 7.0]];
        let err = JacobiSvd::new(0.0, 1).compute(a.view()).unwrap_err();
        assert_eq!(err, Error::Numeric(NumericError::NoConvergence { iterations: 1 }));
    }

    #[test]
    fn test_constant_columns_converge() {
        let a = Array2::<f64>::from_elem((64, 48), 3.0);
        let (_, s, _) = JacobiSvd::default().compute(a.view()).unwrap();

        let leading = s.iter().cloned().fold(0.0, f64::max);
        assert_abs_diff_eq!(leading, 3.0 * (64.0f64 * 48.0).sqrt(), epsilon = 1e-9);
        assert_eq!(s.iter().filter(|&&x| x > 1e-9).count(), 1);
    }

    #[test]
    fn test_rotation_floor() {
        let zeros = Array2::<f64>::zeros((3, 3));
        assert_eq!(JacobiSvd::rotation_floor(zeros.view()), f64::MIN_POSITIVE);
        let ones = Array2::<f64>::ones((2, 2));
        assert_eq!(JacobiSvd::rotation_floor(ones.view()), 8.0 * f64::EPSILON);
    }
}
