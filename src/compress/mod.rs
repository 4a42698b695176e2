//! # Truncated-SVD compressor
//!
//! Wires the channel adapter, the decomposer and the rank policy together for
//! the two kinds of input the front end hands over: image sample arrays and
//! numeric tables. The compressor is an immutable configuration value and keeps
//! no matrix data between calls.
//!
//! ```ignore
//! use svd_compress::compress::CompressorBuilder;
//!
//! let compressor = CompressorBuilder::default().retain_factors(true).build();
//! let result = compressor.compress_image(image.view().into_dyn(), 20)?;
//! let pixels = result.image();
//! ```

use std::sync::Arc;

use log::{debug, warn};
use ndarray::{Array2, ArrayD, ArrayView2, ArrayViewD};
use num_traits::ToPrimitive;
use rayon::prelude::*;

use crate::channels::{split, ChannelLayout, ChannelSet, GrayscaleDetection};
use crate::error::Result;
use crate::quantize::{quantize, Quantization};
use crate::rank;
use crate::svd::{decompose_with, Factorization, NalgebraSvd, SvdBackend};
use crate::utils::{ensure_decomposable, relative_error};

pub struct CompressorBuilder<S: SvdBackend> {
    backend: Arc<S>,
    grayscale_detection: GrayscaleDetection,
    quantization: Quantization,
    parallel: bool,
    retain_factors: bool,
    clamp_rank: bool,
}

impl<S: SvdBackend> CompressorBuilder<S> {
    pub fn new(backend: S) -> Self {
        CompressorBuilder {
            backend: Arc::new(backend),
            grayscale_detection: GrayscaleDetection::default(),
            quantization: Quantization::default(),
            parallel: true,
            retain_factors: false,
            clamp_rank: false,
        }
    }

    pub fn grayscale_detection(mut self, detection: GrayscaleDetection) -> Self {
        self.grayscale_detection = detection;
        self
    }

    pub fn quantization(mut self, quantization: Quantization) -> Self {
        self.quantization = quantization;
        self
    }

    /// Decompose channels on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Keep the full factorization of every channel in the result, for export.
    pub fn retain_factors(mut self, retain: bool) -> Self {
        self.retain_factors = retain;
        self
    }

    /// Clamp out-of-range ranks into `[1, min(m, n)]` instead of failing.
    pub fn clamp_rank(mut self, clamp: bool) -> Self {
        self.clamp_rank = clamp;
        self
    }

    pub fn build(self) -> Compressor<S> {
        Compressor {
            backend: self.backend,
            grayscale_detection: self.grayscale_detection,
            quantization: self.quantization,
            parallel: self.parallel,
            retain_factors: self.retain_factors,
            clamp_rank: self.clamp_rank,
        }
    }
}

impl Default for CompressorBuilder<NalgebraSvd> {
    fn default() -> Self {
        Self::new(NalgebraSvd::default())
    }
}

#[derive(Clone)]
pub struct Compressor<S: SvdBackend> {
    backend: Arc<S>,
    grayscale_detection: GrayscaleDetection,
    quantization: Quantization,
    parallel: bool,
    retain_factors: bool,
    clamp_rank: bool,
}

/// Quantized reconstruction of an image at one rank.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageCompression {
    image: ArrayD<u8>,
    rank: usize,
    layout: ChannelLayout,
    channel_errors: Vec<f64>,
    factors: Option<Vec<Factorization>>,
}

impl ImageCompression {
    pub fn image(&self) -> &ArrayD<u8> {
        &self.image
    }

    pub fn into_image(self) -> ArrayD<u8> {
        self.image
    }

    /// Rank actually used, after clamping if enabled.
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Relative Frobenius error of each decomposed channel, before quantization.
    pub fn channel_errors(&self) -> &[f64] {
        &self.channel_errors
    }

    /// Full per-channel factorizations, present when retained.
    pub fn factors(&self) -> Option<&[Factorization]> {
        self.factors.as_deref()
    }
}

/// Unclipped reconstruction of a table at one rank.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCompression {
    table: Array2<f64>,
    rank: usize,
    relative_error: f64,
    factors: Option<Factorization>,
}

impl TableCompression {
    pub fn table(&self) -> &Array2<f64> {
        &self.table
    }

    pub fn into_table(self) -> Array2<f64> {
        self.table
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn relative_error(&self) -> f64 {
        self.relative_error
    }

    pub fn factors(&self) -> Option<&Factorization> {
        self.factors.as_ref()
    }
}

impl<S: SvdBackend> Compressor<S> {
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Compresses a `(H, W)` or `(H, W, C)` sample array at rank `k`.
    pub fn compress_image<T>(&self, input: ArrayViewD<T>, k: usize) -> Result<ImageCompression>
    where
        T: ToPrimitive,
    {
        let set = split(input, self.grayscale_detection)?;
        let (h, w) = set.plane_dim();
        let k = self.resolve_rank(k, h, w)?;
        let factors = self.decompose_channels(set.channels())?;
        self.assemble(&set, &factors, k)
    }

    /// Decomposes each channel once and reconstructs the image at every rank in `ranks`.
    pub fn sweep_image<T>(
        &self,
        input: ArrayViewD<T>,
        ranks: &[usize],
    ) -> Result<Vec<ImageCompression>>
    where
        T: ToPrimitive,
    {
        let set = split(input, self.grayscale_detection)?;
        let (h, w) = set.plane_dim();
        let ranks = ranks
            .iter()
            .map(|&k| self.resolve_rank(k, h, w))
            .collect::<Result<Vec<usize>>>()?;
        let factors = self.decompose_channels(set.channels())?;
        ranks
            .into_iter()
            .map(|k| self.assemble(&set, &factors, k))
            .collect()
    }

    /// Compresses a numeric table at rank `k`. Values are not clipped.
    pub fn compress_table(&self, table: ArrayView2<f64>, k: usize) -> Result<TableCompression> {
        let (m, n) = table.dim();
        ensure_decomposable(table)?;
        let k = self.resolve_rank(k, m, n)?;
        let factorization = decompose_with(self.backend.as_ref(), table)?;
        let reconstructed = factorization.truncate(k)?.reconstruct();
        let error = relative_error(table, reconstructed.view());
        debug!(
            "Compressed {}x{} table at rank {}, relative error {:.4e}",
            m, n, k, error
        );
        Ok(TableCompression {
            table: reconstructed,
            rank: k,
            relative_error: error,
            factors: self.retain_factors.then_some(factorization),
        })
    }

    fn resolve_rank(&self, k: usize, m: usize, n: usize) -> Result<usize> {
        let bounds = rank::bounds(m, n);
        if self.clamp_rank {
            let clamped = rank::clamp(i64::try_from(k).unwrap_or(i64::MAX), m, n);
            if clamped != k {
                warn!("Rank {} outside [{}, {}], using {}", k, bounds.min, bounds.max, clamped);
            }
            Ok(clamped)
        } else {
            bounds.validate(k)
        }
    }

    fn decompose_channels(&self, channels: &[Array2<f64>]) -> Result<Vec<Factorization>> {
        let backend = self.backend.as_ref();
        self.map_channels(channels, |channel| decompose_with(backend, channel.view()))
    }

    fn assemble(
        &self,
        set: &ChannelSet,
        factors: &[Factorization],
        k: usize,
    ) -> Result<ImageCompression> {
        let reconstructed =
            self.map_channels(factors, |f| f.truncate(k).map(|t| t.reconstruct()))?;
        let channel_errors: Vec<f64> = set
            .channels()
            .iter()
            .zip(reconstructed.iter())
            .map(|(original, approx)| relative_error(original.view(), approx.view()))
            .collect();

        let merged = set.merge(&reconstructed)?;
        let image = quantize(&merged, self.quantization);
        debug!(
            "Reconstructed {:?} image at rank {}, channel errors {:?}",
            image.shape(),
            k,
            channel_errors
        );

        Ok(ImageCompression {
            image,
            rank: k,
            layout: set.layout(),
            channel_errors,
            factors: self.retain_factors.then(|| factors.to_vec()),
        })
    }

    fn map_channels<A, R, F>(&self, items: &[A], f: F) -> Result<Vec<R>>
    where
        A: Sync,
        R: Send,
        F: Fn(&A) -> Result<R> + Sync + Send,
    {
        if self.parallel && items.len() > 1 {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}
