//! Reference reduction drivers.
//!
//! The operators in [`crate::ops`] are meant to be driven by an external
//! reduction runtime that owns partitioning and scheduling. The drivers
//! here play that role on the host, each built only from
//! [`map_value`], a merge operator and [`PartialStats::IDENTITY`]:
//!
//! | Driver | Tree shape |
//! |---|---|
//! | [`reduce_sequential`] | left fold (a chain) |
//! | [`reduce_pairwise`] | balanced, by recursive halving |
//! | [`reduce_padded`] | complete binary tree over leaves padded to 2ᵏ |
//! | [`reduce_parallel`] | whatever `rayon` work-stealing produces |
//!
//! Any of them yields the same count, min and max; sum and `M2` agree up
//! to rounding, which depends mildly on the tree shape.

use log::{debug, trace};
use rayon::prelude::*;

use crate::error::StatsError;
use crate::ops::{map_value, Precision};
use crate::partial::PartialStats;
use crate::summary::Summary;

/// Settings for [`reduce_parallel`] and [`summarize`].
///
/// # Examples
/// ```
/// use u_moments::{Precision, ReduceConfig};
/// let cfg = ReduceConfig::fast().with_min_chunk(4096);
/// assert_eq!(cfg.precision, Precision::Simple);
/// assert_eq!(cfg.min_chunk, 4096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceConfig {
    /// Merge operator used at every internal node.
    pub precision: Precision,
    /// Smallest run of elements a parallel task folds on its own.
    pub min_chunk: usize,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            precision: Precision::Compensated,
            min_chunk: 1024,
        }
    }
}

impl ReduceConfig {
    /// Compensated merge, default chunking.
    pub fn accurate() -> Self {
        Self::default()
    }

    /// Simple merge, default chunking.
    pub fn fast() -> Self {
        Self {
            precision: Precision::Simple,
            ..Self::default()
        }
    }

    /// Sets the merge operator.
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Sets the minimum chunk length; `0` is treated as `1`.
    pub fn with_min_chunk(mut self, min_chunk: usize) -> Self {
        self.min_chunk = min_chunk.max(1);
        self
    }
}

/// Left fold: `((((I ⊕ x₀) ⊕ x₁) ⊕ x₂) ⊕ …)`.
pub fn reduce_sequential(data: &[f32], precision: Precision) -> PartialStats {
    data.iter()
        .map(|&x| map_value(x))
        .fold(PartialStats::IDENTITY, |acc, r| precision.merge(acc, r))
}

/// Balanced tree by recursive halving of the input.
///
/// Recursion depth is `⌈log₂ n⌉`.
pub fn reduce_pairwise(data: &[f32], precision: Precision) -> PartialStats {
    match data.len() {
        0 => PartialStats::IDENTITY,
        1 => map_value(data[0]),
        n => {
            let (left, right) = data.split_at(n / 2);
            precision.merge(
                reduce_pairwise(left, precision),
                reduce_pairwise(right, precision),
            )
        }
    }
}

/// Complete binary tree over leaves padded with [`PartialStats::IDENTITY`]
/// to the next power of two, merged one level at a time.
///
/// This is the shape a fixed-width workgroup reduction produces.
pub fn reduce_padded(data: &[f32], precision: Precision) -> PartialStats {
    let width = data.len().next_power_of_two();
    let mut level: Vec<PartialStats> = data.iter().map(|&x| map_value(x)).collect();
    level.resize(width, PartialStats::IDENTITY);

    let mut depth = 0;
    while level.len() > 1 {
        level = level
            .chunks_exact(2)
            .map(|pair| precision.merge(pair[0], pair[1]))
            .collect();
        depth += 1;
        trace!("reduce_padded: level {depth} has {} nodes", level.len());
    }
    level[0]
}

/// Parallel reduction with `rayon`.
///
/// # Examples
/// ```
/// use u_moments::{reduce_parallel, ReduceConfig};
/// let data: Vec<f32> = (1..=100).map(|i| i as f32).collect();
/// let stats = reduce_parallel(&data, &ReduceConfig::default());
/// assert_eq!(stats.count(), 100.0);
/// assert_eq!(stats.sum(), 5050.0);
/// ```
pub fn reduce_parallel(data: &[f32], config: &ReduceConfig) -> PartialStats {
    debug!(
        "reduce_parallel: {} values, precision={}, min_chunk={}",
        data.len(),
        config.precision,
        config.min_chunk
    );
    let merge = config.precision.operator();
    let stats = data
        .par_iter()
        .with_min_len(config.min_chunk.max(1))
        .map(|&x| map_value(x))
        .reduce(|| PartialStats::IDENTITY, merge);
    debug!("reduce_parallel: {} valid values", stats.count());
    stats
}

/// Reduces `data` in parallel and derives its [`Summary`].
///
/// # Errors
/// [`StatsError::Empty`] if `data` holds no finite values.
///
/// # Examples
/// ```
/// use u_moments::{summarize, ReduceConfig, StatsError};
/// let s = summarize(&[f32::NAN, 1.0, f32::INFINITY, 3.0], &ReduceConfig::default()).unwrap();
/// assert_eq!((s.count, s.mean, s.min, s.max), (2, 2.0, 1.0, 3.0));
/// assert_eq!(summarize(&[], &ReduceConfig::default()), Err(StatsError::Empty));
/// ```
pub fn summarize(data: &[f32], config: &ReduceConfig) -> Result<Summary, StatsError> {
    Summary::try_from(reduce_parallel(data, config))
}

/// Number of NaN or infinite inputs, which [`map_value`] discards.
///
/// Computed beside the reduction rather than inside the record.
pub fn count_non_finite(data: &[f32]) -> usize {
    data.par_iter().filter(|x| !x.is_finite()).count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const BOTH: [Precision; 2] = [Precision::Compensated, Precision::Simple];

    fn drivers(data: &[f32], precision: Precision) -> [PartialStats; 4] {
        let cfg = ReduceConfig::default()
            .with_precision(precision)
            .with_min_chunk(3);
        [
            reduce_sequential(data, precision),
            reduce_pairwise(data, precision),
            reduce_padded(data, precision),
            reduce_parallel(data, &cfg),
        ]
    }

    /// Exact population variance of `f32` inputs in `f64`, two passes.
    fn two_pass(data: &[f32]) -> (f64, f64) {
        let n = data.len() as f64;
        let mean = data.iter().map(|&x| x as f64).sum::<f64>() / n;
        let var = data
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>()
            / n;
        (mean, var)
    }

    // --- config ---

    #[test]
    fn test_config_presets() {
        assert_eq!(ReduceConfig::accurate().precision, Precision::Compensated);
        assert_eq!(ReduceConfig::fast().precision, Precision::Simple);
        assert_eq!(ReduceConfig::default().min_chunk, 1024);
        assert_eq!(ReduceConfig::default().with_min_chunk(0).min_chunk, 1);
        assert_eq!(
            ReduceConfig::fast().with_precision(Precision::Compensated),
            ReduceConfig::accurate()
        );
    }

    // --- scenarios through every driver ---

    #[test]
    fn test_small_integers_all_drivers() {
        for p in BOTH {
            for r in drivers(&[1.0, 2.0, 3.0, 4.0, 5.0], p) {
                let s = Summary::try_from(r).unwrap();
                assert_eq!(s.count, 5);
                assert_eq!(s.sum, 15.0);
                assert_eq!(s.mean, 3.0);
                assert!((s.population_variance - 2.0).abs() < 1e-6, "{p}");
                assert_eq!((s.min, s.max), (1.0, 5.0));
            }
        }
    }

    #[test]
    fn test_non_finite_all_drivers() {
        for p in BOTH {
            for r in drivers(&[f32::NAN, 1.0, f32::INFINITY, 3.0], p) {
                assert_eq!(r.count(), 2.0);
                assert_eq!(r.sum(), 4.0);
                assert_eq!(r.mean(), Some(2.0));
                assert_eq!((r.min, r.max), (1.0, 3.0));
            }
        }
    }

    #[test]
    fn test_empty_all_drivers() {
        for p in BOTH {
            for r in drivers(&[], p) {
                assert_eq!(r, PartialStats::IDENTITY);
                assert_eq!(Summary::try_from(r), Err(StatsError::Empty));
            }
        }
        assert_eq!(
            summarize(&[], &ReduceConfig::default()),
            Err(StatsError::Empty)
        );
    }

    #[test]
    fn test_padded_non_power_of_two() {
        let data: Vec<f32> = (0..37).map(|i| i as f32).collect();
        let r = reduce_padded(&data, Precision::Compensated);
        assert_eq!(r.count(), 37.0);
        assert_eq!(r.sum(), 666.0);
        assert_eq!((r.min, r.max), (0.0, 36.0));
    }

    #[test]
    fn test_count_non_finite() {
        let data = [f32::NAN, 1.0, f32::INFINITY, f32::NEG_INFINITY, 2.0];
        assert_eq!(count_non_finite(&data), 3);
        assert_eq!(count_non_finite(&[]), 0);
        let r = reduce_sequential(&data, Precision::Compensated);
        assert_eq!(r.count() as usize + count_non_finite(&data), data.len());
    }

    // --- precision ---

    #[test]
    fn test_compensated_beats_simple_on_large_offset() {
        // Values 1e6 + k/16 are exact in f32 (ulp at 1e6 is 1/16), so the
        // f64 two-pass reference below is exact.
        let mut rng = SmallRng::seed_from_u64(42);
        let data: Vec<f32> = (0..4096)
            .map(|_| 1.0e6 + rng.random_range(0..16) as f32 * 0.0625)
            .collect();
        let (mean, var) = two_pass(&data);

        let comp = reduce_pairwise(&data, Precision::Compensated);
        let simple = reduce_pairwise(&data, Precision::Simple);

        let comp_err = (comp.population_variance().unwrap() - var).abs();
        let simple_err = (simple.population_variance().unwrap() - var).abs();
        assert!(
            comp_err < simple_err,
            "compensated err {comp_err} should beat simple err {simple_err}"
        );
        assert!(comp_err / var < 1e-9, "compensated relative err {}", comp_err / var);
        assert!((comp.mean().unwrap() - mean).abs() < 1e-9 * mean);
    }

    #[test]
    fn test_compensated_count_exact_past_f32_integers() {
        // f32 cannot count past 2^24 in steps of one.
        let big = PartialStats {
            count: crate::DoubleWord::from_f32(16_777_216.0),
            sum: crate::DoubleWord::from_f32(16_777_216.0),
            ..PartialStats::single(1.0)
        };
        let r = crate::merge_compensated(big, PartialStats::single(1.0));
        assert_eq!(r.count(), 16_777_217.0);
        let r = crate::merge_simple(big, PartialStats::single(1.0));
        assert_eq!(r.count(), 16_777_216.0);
    }

    #[test]
    fn test_large_partitions_far_apart() {
        // Halves of 2^20 zeros and 2^20 copies of 2e7: mean 1e7, variance 1e14.
        let half = 1 << 20;
        let data: Vec<f32> = std::iter::repeat(0.0)
            .take(half)
            .chain(std::iter::repeat(2e7).take(half))
            .collect();
        for p in BOTH {
            let r = reduce_pairwise(&data, p);
            assert!(r.m2().is_finite(), "{p}: {:?}", r.m2);
            let var = r.population_variance().unwrap();
            assert!((var - 1e14).abs() < 1e-6 * 1e14, "{p}: {var}");
        }
        for r in drivers(&data, Precision::Compensated) {
            let var = r.population_variance().unwrap();
            assert!((var - 1e14).abs() < 1e-9 * 1e14, "{var}");
        }
        let s = summarize(&data, &ReduceConfig::accurate()).unwrap();
        assert_eq!(s.count, 2 * half as u64);
        assert_eq!(s.mean, 1e7);
        assert!((s.population_std_dev - 1e7).abs() < 1e-3);
    }

    // --- extrema ---

    #[test]
    fn test_extrema_random() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut data: Vec<f32> = (0..1000).map(|_| rng.random_range(-5.0e3..5.0e3)).collect();
        data[17] = f32::NAN;
        data[500] = f32::NEG_INFINITY;
        let finite = data.iter().copied().filter(|x| x.is_finite());
        let want_min = finite.clone().fold(f32::MAX, f32::min);
        let want_max = finite.fold(-f32::MAX, f32::max);
        for p in BOTH {
            for r in drivers(&data, p) {
                assert_eq!(r.min, want_min);
                assert_eq!(r.max, want_max);
                assert_eq!(r.count(), 998.0);
            }
        }
    }
}
