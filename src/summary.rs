//! Post-processing of a reduced record into descriptive statistics.

use crate::error::StatsError;
use crate::partial::PartialStats;

/// Descriptive statistics derived from a non-empty [`PartialStats`].
///
/// Count, sum and `M2` are reconstructed in `f64` from their double-word
/// slots before dividing, so the compensated variant's extra precision
/// reaches the result.
///
/// # Examples
/// ```
/// use u_moments::{PartialStats, StatsError, Summary};
///
/// let stats: PartialStats = [1.0_f32, 2.0, 3.0, 4.0, 5.0].into_iter().collect();
/// let summary = Summary::try_from(stats).unwrap();
/// assert_eq!(summary.count, 5);
/// assert_eq!(summary.mean, 3.0);
/// assert_eq!(summary.population_variance, 2.0);
/// assert_eq!(summary.sample_variance, Some(2.5));
///
/// assert_eq!(Summary::try_from(PartialStats::IDENTITY), Err(StatsError::Empty));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Number of valid values.
    pub count: u64,
    /// Smallest valid value.
    pub min: f32,
    /// Largest valid value.
    pub max: f32,
    /// Sum of valid values.
    pub sum: f64,
    /// Arithmetic mean, `sum / count`.
    pub mean: f64,
    /// `M2 / count`.
    pub population_variance: f64,
    /// Square root of the population variance.
    pub population_std_dev: f64,
    /// `M2 / (count − 1)`, `None` for a single value.
    pub sample_variance: Option<f64>,
    /// Square root of the sample variance.
    pub sample_std_dev: Option<f64>,
}

impl Summary {
    /// Sample variance, or [`StatsError::InsufficientSamples`] for a single
    /// value.
    pub fn try_sample_variance(&self) -> Result<f64, StatsError> {
        self.sample_variance.ok_or(StatsError::InsufficientSamples {
            statistic: "sample variance",
            required: 2,
            actual: self.count,
        })
    }

    /// Sample standard deviation, or [`StatsError::InsufficientSamples`] for
    /// a single value.
    pub fn try_sample_std_dev(&self) -> Result<f64, StatsError> {
        self.sample_std_dev.ok_or(StatsError::InsufficientSamples {
            statistic: "sample standard deviation",
            required: 2,
            actual: self.count,
        })
    }
}

impl TryFrom<PartialStats> for Summary {
    type Error = StatsError;

    fn try_from(stats: PartialStats) -> Result<Self, Self::Error> {
        let (Some(mean), Some(population_variance)) = (stats.mean(), stats.population_variance())
        else {
            return Err(StatsError::Empty);
        };
        let sample_variance = stats.sample_variance();
        Ok(Summary {
            count: stats.count().round() as u64,
            min: stats.min,
            max: stats.max,
            sum: stats.sum(),
            mean,
            population_variance,
            population_std_dev: population_variance.sqrt(),
            sample_variance,
            sample_std_dev: sample_variance.map(f64::sqrt),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
