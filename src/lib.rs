//! Lossy compression of images and numeric tables by truncated singular value
//! decomposition.
//!
//! - [`svd`]: reduced SVD, rank-`k` truncation and reconstruction
//! - [`channels`]: splitting image arrays into channels and merging them back
//! - [`quantize`]: clipping reconstructions into `u8` samples
//! - [`rank`]: admissible, default and clamped ranks
//! - [`compress`]: the three above composed for images and tables
//! - [`export`], [`table`]: factor-matrix sheets and spreadsheet grids

pub mod channels;
pub mod compress;
pub mod error;
pub mod export;
pub mod quantize;
pub mod rank;
pub mod svd;
pub mod table;
mod utils;

pub use compress::{Compressor, CompressorBuilder, ImageCompression, TableCompression};
pub use error::{Error, NumericError, Result};
pub use svd::{decompose, reconstruct, truncate, Factorization, SvdBackend};
pub use utils::{frobenius_norm, relative_error};
