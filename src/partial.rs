//! The partial-statistics record carried through a reduction.
//!
//! A [`PartialStats`] summarizes one partition of the input: extrema,
//! valid-element count, sum, and `M2`, the sum of squared deviations from
//! the partition mean. `M2` is what lets two partitions be merged exactly
//! without revisiting their samples.
//!
//! # Layout
//!
//! The record is `#[repr(C)]` with exactly eight `f32` slots:
//!
//! ```text
//! [min, max, count_hi, count_lo, sum_hi, sum_lo, m2_hi, m2_lo]
//! ```
//!
//! It implements [`bytemuck::Pod`], so slices of records can be viewed as
//! flat `f32` buffers (and back) for transport to data-parallel backends.
//!
//! # Identity
//!
//! `count == 0` identifies the neutral element [`PartialStats::IDENTITY`]:
//! `min = f32::MAX`, `max = -f32::MAX`, `sum = m2 = 0`.

use bytemuck::{Pod, Zeroable};

use crate::double_word::DoubleWord;
use crate::ops;

/// Number of `f32` slots in the wire layout of a [`PartialStats`].
pub const SLOTS: usize = 8;

/// Min/max/count/sum/M2 over one partition of the input.
///
/// # Examples
/// ```
/// use u_moments::PartialStats;
/// let stats: PartialStats = [1.0_f32, 2.0, 3.0, 4.0, 5.0].into_iter().collect();
/// assert_eq!(stats.count(), 5.0);
/// assert_eq!(stats.mean(), Some(3.0));
/// assert_eq!(stats.population_variance(), Some(2.0));
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PartialStats {
    /// Smallest valid value, `f32::MAX` when empty.
    pub min: f32,
    /// Largest valid value, `-f32::MAX` when empty.
    pub max: f32,
    /// Number of valid values.
    pub count: DoubleWord,
    /// Sum of valid values.
    pub sum: DoubleWord,
    /// Sum of squared deviations from the partition mean.
    pub m2: DoubleWord,
}

impl PartialStats {
    /// The neutral element: merging it with any record leaves that record
    /// unchanged. Represents "no data".
    pub const IDENTITY: PartialStats = PartialStats {
        min: f32::MAX,
        max: -f32::MAX,
        count: DoubleWord::ZERO,
        sum: DoubleWord::ZERO,
        m2: DoubleWord::ZERO,
    };

    /// Record for a single finite value.
    ///
    /// Does not check finiteness; use [`ops::map_value`] for raw input.
    pub const fn single(value: f32) -> Self {
        Self {
            min: value,
            max: value,
            count: DoubleWord::ONE,
            sum: DoubleWord::from_f32(value),
            m2: DoubleWord::ZERO,
        }
    }

    /// Returns `true` if the record carries no data (`count == 0`).
    pub fn is_identity(&self) -> bool {
        self.count.is_zero()
    }

    // -----------------------------------------------------------------------
    // Wire layout
    // -----------------------------------------------------------------------

    /// Packs the record into its 8-slot wire layout.
    pub fn to_slots(self) -> [f32; SLOTS] {
        bytemuck::cast(self)
    }

    /// Unpacks a record from its 8-slot wire layout.
    pub fn from_slots(slots: [f32; SLOTS]) -> Self {
        bytemuck::cast(slots)
    }

    /// Views a slice of records as a flat `f32` buffer of `8 · len` slots.
    pub fn as_slots(records: &[PartialStats]) -> &[f32] {
        bytemuck::cast_slice(records)
    }

    /// Views a flat `f32` buffer as records.
    ///
    /// Returns `None` if `slots.len()` is not a multiple of [`SLOTS`].
    pub fn from_slots_slice(slots: &[f32]) -> Option<&[PartialStats]> {
        bytemuck::try_cast_slice(slots).ok()
    }

    // -----------------------------------------------------------------------
    // Streaming helpers
    // -----------------------------------------------------------------------

    /// Folds one value into the record with the compensated merge.
    ///
    /// Non-finite values leave the record unchanged.
    pub fn push(&mut self, value: f32) {
        *self = ops::merge_compensated(*self, ops::map_value(value));
    }

    /// Compensated merge of two records, consuming both.
    pub fn merge(self, other: PartialStats) -> PartialStats {
        ops::merge_compensated(self, other)
    }

    // -----------------------------------------------------------------------
    // Derived statistics
    // -----------------------------------------------------------------------

    /// Number of valid values, reconstructed as `f64`.
    pub fn count(&self) -> f64 {
        self.count.to_f64()
    }

    /// Sum of valid values, reconstructed as `f64`.
    pub fn sum(&self) -> f64 {
        self.sum.to_f64()
    }

    /// Sum of squared deviations, reconstructed as `f64`.
    ///
    /// May be slightly negative from round-off.
    pub fn m2(&self) -> f64 {
        self.m2.to_f64()
    }

    /// Smallest valid value, or `None` if the record is empty.
    pub fn min(&self) -> Option<f32> {
        (!self.is_identity()).then_some(self.min)
    }

    /// Largest valid value, or `None` if the record is empty.
    pub fn max(&self) -> Option<f32> {
        (!self.is_identity()).then_some(self.max)
    }

    /// Arithmetic mean, or `None` if the record is empty.
    pub fn mean(&self) -> Option<f64> {
        if self.is_identity() {
            None
        } else {
            Some(self.sum() / self.count())
        }
    }

    /// `M2` with negative round-off drift clamped to zero. NaN and `inf`
    /// pass through.
    fn clamped_m2(&self) -> f64 {
        let m2 = self.m2();
        if m2 < 0.0 {
            0.0
        } else {
            m2
        }
    }

    /// Population variance (`M2 / n`), or `None` if the record is empty.
    ///
    /// Negative round-off drift in `M2` is clamped to zero. A poisoned
    /// `M2` (NaN, or `inf` past the `f32` range) is reported as such.
    pub fn population_variance(&self) -> Option<f64> {
        if self.is_identity() {
            None
        } else {
            Some(self.clamped_m2() / self.count())
        }
    }

    /// Sample variance (`M2 / (n − 1)`), or `None` if fewer than 2 values.
    pub fn sample_variance(&self) -> Option<f64> {
        let n = self.count();
        if n < 2.0 {
            None
        } else {
            Some(self.clamped_m2() / (n - 1.0))
        }
    }

    /// Population standard deviation, or `None` if the record is empty.
    pub fn population_std_dev(&self) -> Option<f64> {
        self.population_variance().map(f64::sqrt)
    }

    /// Sample standard deviation, or `None` if fewer than 2 values.
    pub fn sample_std_dev(&self) -> Option<f64> {
        self.sample_variance().map(f64::sqrt)
    }
}

impl Default for PartialStats {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl FromIterator<f32> for PartialStats {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        let mut acc = Self::IDENTITY;
        acc.extend(iter);
        acc
    }
}

impl Extend<f32> for PartialStats {
    fn extend<I: IntoIterator<Item = f32>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
