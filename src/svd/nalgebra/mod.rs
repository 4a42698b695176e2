use ndarray::{Array1, ArrayView2};
use nshare::{IntoNalgebra, IntoNdarray2};

use super::{RawFactors, SvdBackend};
use crate::error::{NumericError, Result};

/// Golub–Kahan bidiagonalization followed by implicit-shift QR, via `nalgebra`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NalgebraSvd {
    eps: f64,
    max_iterations: usize,
}

impl NalgebraSvd {
    /// `max_iterations == 0` lets the QR iteration run until convergence.
    pub fn new(eps: f64, max_iterations: usize) -> Self {
        NalgebraSvd {
            eps,
            max_iterations,
        }
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

impl Default for NalgebraSvd {
    fn default() -> Self {
        Self::new(f64::EPSILON, 0)
    }
}

impl SvdBackend for NalgebraSvd {
    fn compute(&self, matrix: ArrayView2<f64>) -> Result<RawFactors> {
        // nshare only accepts non-negative strides.
        let standard = matrix.as_standard_layout();
        let matrix = standard.view().into_nalgebra().clone_owned();
        let no_convergence = NumericError::NoConvergence {
            iterations: self.max_iterations,
        };

        let svd =
            ::nalgebra::linalg::SVD::try_new(matrix, true, true, self.eps, self.max_iterations)
                .ok_or_else(|| no_convergence.clone())?;

        let (u, vt) = match (svd.u, svd.v_t) {
            (Some(u), Some(vt)) => (u, vt),
            _ => return Err(no_convergence.into()),
        };
        let s = Array1::from(svd.singular_values.as_slice().to_vec());

        Ok((u.into_ndarray2(), s, vt.into_ndarray2()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, s, Array2, Axis};

    #[test]
    fn test_economy_shapes() {
        let wide = array![[1.0, 0.0, 2.0, 1.0], [0.0, 3.0, 1.0, 1.0]];
        let (u, s, vt) = NalgebraSvd::default().compute(wide.view()).unwrap();
        assert_eq!(u.dim(), (2, 2));
        assert_eq!(s.len(), 2);
        assert_eq!(vt.dim(), (2, 4));

        let tall = wide.t().to_owned();
        let (u, s, vt) = NalgebraSvd::default().compute(tall.view()).unwrap();
        assert_eq!(u.dim(), (4, 2));
        assert_eq!(s.len(), 2);
        assert_eq!(vt.dim(), (2, 2));
    }

    #[test]
    fn test_orthonormal_factors() {
        let a = array![[4.0, 1.0, 0.5], [2.0, -3.0, 1.0], [0.0, 1.0, 6.0], [1.0, 1.0, 1.0]];
        let (u, _, vt) = NalgebraSvd::default().compute(a.view()).unwrap();
        let utu = u.t().dot(&u);
        let vvt = vt.dot(&vt.t());
        let eye = Array2::<f64>::eye(3);
        for ((x, y), e) in utu.iter().zip(vvt.iter()).zip(eye.iter()) {
            assert_abs_diff_eq!(*x, *e, epsilon = 1e-10);
            assert_abs_diff_eq!(*y, *e, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_negative_stride_views() {
        let a = array![[4.0, 1.0, 0.5], [2.0, -3.0, 1.0], [0.0, 1.0, 6.0], [1.0, 1.0, 1.0]];
        let sorted = |s: &Array1<f64>| {
            let mut values = s.to_vec();
            values.sort_by(|x, y| y.total_cmp(x));
            values
        };
        let expected = sorted(&NalgebraSvd::default().compute(a.view()).unwrap().1);

        let reversed_rows = a.slice(s![..;-1, ..]);
        let reversed_cols = a.slice(s![.., ..;-1]);
        let reversed_both = a.slice(s![..;-1, ..;-1]);
        for view in [reversed_rows, reversed_cols, reversed_both] {
            let (u, s, vt) = NalgebraSvd::default().compute(view).unwrap();
            for (x, y) in sorted(&s).iter().zip(expected.iter()) {
                assert_abs_diff_eq!(x, y, epsilon = 1e-10);
            }
            let r = (&u * &s.view().insert_axis(Axis(0))).dot(&vt);
            for (x, y) in r.iter().zip(view.iter()) {
                assert_abs_diff_eq!(x, y, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_accessors() {
        let svd = NalgebraSvd::new(1e-12, 500);
        assert_eq!(svd.eps(), 1e-12);
        assert_eq!(svd.max_iterations(), 500);
        assert_eq!(NalgebraSvd::default().max_iterations(), 0);
    }
}
