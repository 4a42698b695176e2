use ndarray::{ArrayBase, ArrayD, Data, Dimension};

/// Lower bound of the storable sample range.
pub const SAMPLE_MIN: f64 = 0.0;
/// Upper bound of the storable sample range.
pub const SAMPLE_MAX: f64 = 255.0;

/// Mapping of a clipped float sample onto `u8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quantization {
    /// Drop the fractional part, `254.9 -> 254`.
    #[default]
    Truncate,
    /// Round half away from zero, `254.5 -> 255`.
    Round,
}

impl Quantization {
    /// Clamps into `[0, 255]` and converts. `NaN` maps to `0`.
    pub fn sample(&self, x: f64) -> u8 {
        if x.is_nan() {
            return 0;
        }
        let clipped = x.clamp(SAMPLE_MIN, SAMPLE_MAX);
        match self {
            Quantization::Truncate => clipped as u8,
            Quantization::Round => clipped.round() as u8,
        }
    }
}

/// Element-wise [`Quantization::sample`] over an array of any dimension.
pub fn quantize<S, D>(values: &ArrayBase<S, D>, mode: Quantization) -> ArrayD<u8>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    values.mapv(|x| mode.sample(x)).into_dyn()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_truncate_after_clip() {
        let q = Quantization::Truncate;
        assert_eq!(q.sample(-12.3), 0);
        assert_eq!(q.sample(0.99), 0);
        assert_eq!(q.sample(127.7), 127);
        assert_eq!(q.sample(254.9), 254);
        assert_eq!(q.sample(255.0), 255);
        assert_eq!(q.sample(1e9), 255);
        assert_eq!(q.sample(f64::NAN), 0);
        assert_eq!(q.sample(f64::NEG_INFINITY), 0);
    }

    #[test]
    fn test_round() {
        let q = Quantization::Round;
        assert_eq!(q.sample(127.5), 128);
        assert_eq!(q.sample(127.49), 127);
        assert_eq!(q.sample(254.9), 255);
        assert_eq!(q.sample(-0.4), 0);
    }

    #[test]
    fn test_quantize_array() {
        let values = array![[-1.0, 10.6], [300.0, 42.0]];
        let out = quantize(&values, Quantization::default());
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out, array![[0u8, 10], [255, 42]].into_dyn());
    }
}
