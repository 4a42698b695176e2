//! Admissible truncation ranks for an `m x n` matrix.

use crate::error::{Error, Result};

/// Rank chosen when the caller has no preference.
pub const DEFAULT_RANK: usize = 20;

/// Inclusive range `[min, max]` of ranks a matrix can be truncated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankBounds {
    pub min: usize,
    pub max: usize,
}

impl RankBounds {
    pub fn contains(&self, k: usize) -> bool {
        (self.min..=self.max).contains(&k)
    }

    pub fn validate(&self, k: usize) -> Result<usize> {
        if self.contains(k) {
            Ok(k)
        } else {
            Err(Error::InvalidRank { k, max: self.max })
        }
    }
}

/// `[1, min(m, n)]`.
pub fn bounds(m: usize, n: usize) -> RankBounds {
    RankBounds {
        min: 1,
        max: m.min(n),
    }
}

/// `min(20, min(m, n))`.
pub fn default_k(m: usize, n: usize) -> usize {
    DEFAULT_RANK.min(m.min(n))
}

/// Clips any requested rank into `[1, min(m, n)]`.
///
/// Never fails: a degenerate shape with a zero dimension clamps to `1`.
pub fn clamp(k: i64, m: usize, n: usize) -> usize {
    let max = m.min(n).max(1);
    if k < 1 {
        1
    } else {
        usize::try_from(k).map_or(max, |k| k.min(max))
    }
}

/// Ranks of the batch sweep `1..=10, 20, 30, ..., 100`, restricted to valid ranks.
pub fn sweep_ranks(m: usize, n: usize) -> Vec<usize> {
    let b = bounds(m, n);
    (1..=10)
        .chain((20..=100).step_by(10))
        .filter(|&k| b.contains(k))
        .collect()
}
