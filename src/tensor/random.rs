//! Random-fill factories
//!
//! Each factory allocates a zeroed host buffer and fills it from a sampler,
//! converting every sample to the requested dtype.

use super::{Storage, Tensor, size};
use crate::dtype::{DType, HostBuffer};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

/// Truncated normal samples farther than this many standard deviations from
/// the mean are rejected and redrawn
const TRUNCATION_STDEVS: f64 = 2.0;

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn normal(mean: f64, stdev: f64) -> Result<Normal<f64>> {
    if !mean.is_finite() {
        return Err(Error::invalid_argument("mean", format!("{mean} is not finite")));
    }
    if !stdev.is_finite() {
        return Err(Error::invalid_argument("stdev", format!("{stdev} is not finite")));
    }
    Normal::new(mean, stdev).map_err(|e| Error::invalid_argument("stdev", e.to_string()))
}

impl Tensor {
    /// Create a host tensor filled by calling `sampler` once per element
    ///
    /// # Example
    ///
    /// ```
    /// use ndtex::dtype::DType;
    /// use ndtex::tensor::Tensor;
    ///
    /// let mut next = 0.0;
    /// let t = Tensor::rand(&[3], DType::I32, || {
    ///     next += 1.0;
    ///     next
    /// });
    /// assert_eq!(t.to_vec::<i32>().unwrap(), vec![1, 2, 3]);
    /// ```
    pub fn rand(shape: &[usize], dtype: DType, sampler: impl FnMut() -> f64) -> Self {
        let mut values = HostBuffer::zeros(dtype, size(shape));
        values.fill_with(sampler);
        Self::from_parts(shape.into(), dtype, Storage::from_host(values))
    }

    /// Create a tensor of normally distributed samples
    ///
    /// Pass a `seed` for a reproducible stream.
    pub fn rand_normal(
        shape: &[usize],
        mean: f64,
        stdev: f64,
        dtype: DType,
        seed: Option<u64>,
    ) -> Result<Self> {
        let dist = normal(mean, stdev)?;
        let mut rng = seeded_rng(seed);
        Ok(Self::rand(shape, dtype, || dist.sample(&mut rng)))
    }

    /// Create a tensor of normal samples truncated to two standard deviations
    ///
    /// Samples outside `mean ± 2 * stdev` are redrawn.
    pub fn rand_truncated_normal(
        shape: &[usize],
        mean: f64,
        stdev: f64,
        dtype: DType,
        seed: Option<u64>,
    ) -> Result<Self> {
        let dist = normal(mean, stdev)?;
        let bound = TRUNCATION_STDEVS * stdev;
        let mut rng = seeded_rng(seed);
        Ok(Self::rand(shape, dtype, || {
            loop {
                let sample = dist.sample(&mut rng);
                if (sample - mean).abs() <= bound {
                    return sample;
                }
            }
        }))
    }

    /// Create a tensor of samples uniformly distributed in `[a, b)`
    pub fn rand_uniform(shape: &[usize], a: f64, b: f64, dtype: DType) -> Self {
        let mut rng = rand::rng();
        Self::rand(shape, dtype, || a + (b - a) * rng.random::<f64>())
    }
}
