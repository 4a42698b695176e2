//! # Truncated singular value decomposition
//!
//! Reduced SVD of a dense real matrix, rank-`k` truncation and reconstruction.
//! The factorization algorithm itself is pluggable through [`SvdBackend`]:
//!
//! - [`NalgebraSvd`]: Golub–Kahan bidiagonalization with implicit QR (default)
//! - [`JacobiSvd`]: one-sided Jacobi rotations on the matrix columns
//!
//! Whatever the backend, [`decompose_with`] validates the input and returns the
//! singular triplets sorted by non-increasing singular value.

use log::{debug, trace};
use ndarray::{s, Array1, Array2, ArrayView2, Axis};

use crate::error::{Error, Result};
use crate::utils::ensure_decomposable;

pub mod jacobi;
pub mod nalgebra;

pub use self::jacobi::JacobiSvd;
pub use self::nalgebra::NalgebraSvd;

/// Unsorted `(U, s, Vt)` triple as produced by a backend.
pub type RawFactors = (Array2<f64>, Array1<f64>, Array2<f64>);

/// Algorithm computing the reduced SVD of a finite, non-empty matrix.
///
/// For an `m x n` input with `r = min(m, n)`, implementations return `U` as
/// `m x r`, `r` non-negative singular values and `Vt` as `r x n`, in any order.
pub trait SvdBackend: Send + Sync {
    fn compute(&self, matrix: ArrayView2<f64>) -> Result<RawFactors>;
}

/// Reduced SVD `A = U * diag(s) * Vt`, singular values non-increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct Factorization {
    u: Array2<f64>,
    s: Array1<f64>,
    vt: Array2<f64>,
}

impl Factorization {
    pub fn u(&self) -> &Array2<f64> {
        &self.u
    }

    pub fn s(&self) -> &Array1<f64> {
        &self.s
    }

    pub fn vt(&self) -> &Array2<f64> {
        &self.vt
    }

    /// Right singular vectors as columns, `n x r`.
    pub fn v(&self) -> ArrayView2<f64> {
        self.vt.t()
    }

    /// Singular values as a dense square diagonal matrix.
    pub fn s_matrix(&self) -> Array2<f64> {
        Array2::from_diag(&self.s)
    }

    /// Number of singular triplets held.
    pub fn rank(&self) -> usize {
        self.s.len()
    }

    /// Shape `(m, n)` of the factorized matrix.
    pub fn shape(&self) -> (usize, usize) {
        (self.u.nrows(), self.vt.ncols())
    }

    /// Keeps the `k` leading singular triplets.
    pub fn truncate(&self, k: usize) -> Result<Factorization> {
        let max = self.rank();
        if k == 0 || k > max {
            return Err(Error::InvalidRank { k, max });
        }
        Ok(Factorization {
            u: self.u.slice(s![.., ..k]).to_owned(),
            s: self.s.slice(s![..k]).to_owned(),
            vt: self.vt.slice(s![..k, ..]).to_owned(),
        })
    }

    /// `U * diag(s) * Vt`, an `m x n` matrix.
    pub fn reconstruct(&self) -> Array2<f64> {
        let scaled = &self.u * &self.s.view().insert_axis(Axis(0));
        scaled.dot(&self.vt)
    }

    /// Share of the squared Frobenius norm captured by the first `k` values.
    /// Returns `1.0` for an all-zero spectrum.
    pub fn energy_retained(&self, k: usize) -> f64 {
        let total: f64 = self.s.iter().map(|x| x * x).sum();
        if total == 0.0 {
            return 1.0;
        }
        let kept: f64 = self.s.iter().take(k).map(|x| x * x).sum();
        kept / total
    }

    /// Number of floats needed to store a rank-`k` truncation: `k * (m + n + 1)`.
    pub fn storage_len(&self, k: usize) -> usize {
        let (m, n) = self.shape();
        k * (m + n + 1)
    }

    /// Dense element count over truncated storage, `m * n / (k * (m + n + 1))`.
    pub fn compression_ratio(&self, k: usize) -> f64 {
        let (m, n) = self.shape();
        (m * n) as f64 / self.storage_len(k.max(1)) as f64
    }
}

/// Reduced SVD using the default [`NalgebraSvd`] backend.
pub fn decompose(a: ArrayView2<f64>) -> Result<Factorization> {
    decompose_with(&NalgebraSvd::default(), a)
}

/// Reduced SVD using the given backend.
///
/// Fails with a numeric error on empty input or non-finite entries.
pub fn decompose_with<S: SvdBackend + ?Sized>(
    backend: &S,
    a: ArrayView2<f64>,
) -> Result<Factorization> {
    ensure_decomposable(a)?;
    let (m, n) = a.dim();
    let (u, s, vt) = backend.compute(a)?;
    let factorization = sort_descending(u, s, vt);
    debug_assert_eq!(factorization.shape(), (m, n));
    debug!(
        "Decomposed {}x{} matrix, leading singular value {:.6e}",
        m,
        n,
        factorization.s.get(0).copied().unwrap_or(0.0)
    );
    Ok(factorization)
}

/// Free-function form of [`Factorization::truncate`].
pub fn truncate(factorization: &Factorization, k: usize) -> Result<Factorization> {
    factorization.truncate(k)
}

/// Free-function form of [`Factorization::reconstruct`].
pub fn reconstruct(factorization: &Factorization) -> Array2<f64> {
    factorization.reconstruct()
}

/// Decomposes `a` and returns its best rank-`k` approximation.
pub fn low_rank_approximation<S: SvdBackend + ?Sized>(
    backend: &S,
    a: ArrayView2<f64>,
    k: usize,
) -> Result<Array2<f64>> {
    let factorization = decompose_with(backend, a)?;
    Ok(factorization.truncate(k)?.reconstruct())
}

// Stable, so equal singular values keep the backend's order.
fn sort_descending(u: Array2<f64>, s: Array1<f64>, vt: Array2<f64>) -> Factorization {
    let mut order: Vec<usize> = (0..s.len()).collect();
    order.sort_by(|&a, &b| s[b].total_cmp(&s[a]));

    if order.iter().enumerate().all(|(i, &idx)| i == idx) {
        return Factorization { u, s, vt };
    }
    trace!("Reordering singular triplets: {:?}", order);

    Factorization {
        u: u.select(Axis(1), &order),
        s: s.select(Axis(0), &order),
        vt: vt.select(Axis(0), &order),
    }
}
