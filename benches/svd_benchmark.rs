use criterion::measurement::Measurement;
use criterion::{criterion_group, criterion_main, BenchmarkGroup, BenchmarkId, Criterion};
use ndarray::{Array2, Array3};
use rand::distr::{Distribution, Uniform};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;
use svd_compress::svd::{decompose_with, JacobiSvd, NalgebraSvd};
use svd_compress::CompressorBuilder;

#[derive(Clone)]
pub struct SvdBenchConfig {
    seed: u64,
    matrix_sizes: Vec<(usize, usize)>,
    ranks: Vec<usize>,
    measurement_time: u64,
    sample_size: usize,
}

impl Default for SvdBenchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            matrix_sizes: vec![(64, 64), (128, 96), (256, 256)],
            ranks: vec![1, 20],
            measurement_time: 10,
            sample_size: 10,
        }
    }
}

fn create_test_matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::try_from(0.0..255.0).unwrap();
    Array2::from_shape_fn((rows, cols), |_| dist.sample(&mut rng))
}

fn create_test_image(rows: usize, cols: usize, seed: u64) -> Array3<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = Uniform::try_from(0u8..=255).unwrap();
    Array3::from_shape_fn((rows, cols, 3), |_| dist.sample(&mut rng))
}

fn configure_group<'a, M: Measurement>(
    c: &'a mut Criterion<M>,
    name: &str,
    config: &SvdBenchConfig,
) -> BenchmarkGroup<'a, M> {
    let mut group = c.benchmark_group(name);
    group.measurement_time(Duration::from_secs(config.measurement_time));
    group.sample_size(config.sample_size);
    group
}

pub fn bench_decompose(c: &mut Criterion) {
    let config = SvdBenchConfig::default();
    let mut group = configure_group(c, "SVD_Decompose", &config);

    for &(rows, cols) in config.matrix_sizes.iter() {
        let seed = config.seed + (rows * cols) as u64;
        let matrix = create_test_matrix(rows, cols, seed);

        group.bench_with_input(
            BenchmarkId::new("nalgebra", format!("{}x{}", rows, cols)),
            &(rows, cols),
            |b, _| {
                b.iter(|| decompose_with(&NalgebraSvd::default(), matrix.view()).unwrap());
            },
        );

        group.bench_with_input(
            BenchmarkId::new("jacobi", format!("{}x{}", rows, cols)),
            &(rows, cols),
            |b, _| {
                b.iter(|| decompose_with(&JacobiSvd::default(), matrix.view()).unwrap());
            },
        );
    }
    group.finish();
}

pub fn bench_compress_image(c: &mut Criterion) {
    let config = SvdBenchConfig::default();
    let mut group = configure_group(c, "Compress_Image", &config);

    for &(rows, cols) in config.matrix_sizes.iter() {
        let seed = config.seed + (rows * cols) as u64;
        let image = create_test_image(rows, cols, seed);

        for &k in config.ranks.iter() {
            for parallel in [false, true] {
                let compressor = CompressorBuilder::new(NalgebraSvd::default())
                    .parallel(parallel)
                    .build();
                group.bench_with_input(
                    BenchmarkId::new(
                        if parallel { "parallel" } else { "sequential" },
                        format!("{}x{}_k{}", rows, cols, k),
                    ),
                    &(rows, cols, k),
                    |b, _| {
                        b.iter(|| compressor.compress_image(image.view().into_dyn(), k).unwrap());
                    },
                );
            }
        }
    }
    group.finish();
}

criterion_group!(svd_benches, bench_decompose, bench_compress_image);
criterion_main!(svd_benches);
