//! Map and merge operators of the statistics reduction.
//!
//! A reduction runtime applies [`map_value`] to every element and then
//! combines the results pairwise with a merge operator over any binary tree,
//! in any order. Both merge operators are commutative, associative up to
//! rounding, and have [`PartialStats::IDENTITY`] as their neutral element.
//!
//! # Algorithm
//!
//! Counts and sums add. `M2` combines with the pairwise update of Chan,
//! Golub & LeVeque, written in sums rather than means:
//!
//! ```text
//! d  = n_b·Σ_a − n_a·Σ_b
//! M2 = M2_a + M2_b + d² / (n_a · n_b · (n_a + n_b))
//! ```
//!
//! `d` grows like `n_a·n_b·δ` for a mean gap `δ`, so `d²` leaves the `f32`
//! range long before the correction does. Both variants evaluate the term as
//! `(d / (n_a·n_b)) · (d / (n_a + n_b))`, which keeps every intermediate no
//! larger than the result.
//!
//! Reference: Chan, Golub & LeVeque (1979), "Updating Formulae and a
//! Pairwise Algorithm for Computing Sample Variances", Stanford
//! STAN-CS-79-773.
//!
//! # Variants
//!
//! - [`merge_compensated`]: every operation in double-word arithmetic
//!   ([`crate::double_word`]). Resistant to round-off when many partitions
//!   are merged across a deep tree.
//! - [`merge_simple`]: the same expression in plain `f32`. Fewer
//!   operations, ordinary single-precision error growth.

use crate::double_word::{dw_add, dw_div, dw_mul, dw_sub, DoubleWord};
use crate::partial::PartialStats;

/// Signature of the per-element operator.
pub type MapOp = fn(f32) -> PartialStats;

/// Signature of the pairwise merge operator.
pub type MergeOp = fn(PartialStats, PartialStats) -> PartialStats;

/// Turns one input element into a record.
///
/// Finite values become a single-element record; NaN and ±∞ become
/// [`PartialStats::IDENTITY`] and so drop out of every aggregate.
///
/// # Examples
/// ```
/// use u_moments::{map_value, PartialStats};
/// assert_eq!(map_value(f32::NAN), PartialStats::IDENTITY);
/// assert_eq!(map_value(2.0).count(), 1.0);
/// ```
#[inline]
pub fn map_value(value: f32) -> PartialStats {
    if value.is_finite() {
        PartialStats::single(value)
    } else {
        PartialStats::IDENTITY
    }
}

/// Merges two records using double-word arithmetic for count, sum and `M2`.
///
/// # Examples
/// ```
/// use u_moments::{map_value, merge_compensated};
/// let ab = merge_compensated(map_value(1.0), map_value(3.0));
/// assert_eq!(ab.mean(), Some(2.0));
/// assert_eq!(ab.population_variance(), Some(1.0));
/// ```
pub fn merge_compensated(a: PartialStats, b: PartialStats) -> PartialStats {
    if a.is_identity() {
        return b;
    }
    if b.is_identity() {
        return a;
    }

    let count = dw_add(a.count, b.count);
    let sum = dw_add(a.sum, b.sum);

    // Both counts are ≥ 1 here, so neither divisor is zero.
    let diff = dw_sub(dw_mul(b.count, a.sum), dw_mul(a.count, b.sum));
    let gap = dw_div(diff, dw_mul(a.count, b.count));
    let correction = dw_mul(gap, dw_div(diff, count));
    let m2 = dw_add(dw_add(a.m2, b.m2), correction);

    PartialStats {
        min: a.min.min(b.min),
        max: a.max.max(b.max),
        count,
        sum,
        m2,
    }
}

/// Merges two records in plain `f32`.
///
/// Reads only the `hi` slot of count, sum and `M2`; the `lo` slots of the
/// result are zero.
///
/// # Examples
/// ```
/// use u_moments::{map_value, merge_simple};
/// let ab = merge_simple(map_value(1.0), map_value(3.0));
/// assert_eq!(ab.sum.hi, 4.0);
/// assert_eq!(ab.m2.hi, 2.0);
/// assert_eq!(ab.m2.lo, 0.0);
/// ```
pub fn merge_simple(a: PartialStats, b: PartialStats) -> PartialStats {
    if a.is_identity() {
        return b;
    }
    if b.is_identity() {
        return a;
    }

    let (na, nb) = (a.count.hi, b.count.hi);
    let n = na + nb;
    let diff = nb * a.sum.hi - na * b.sum.hi;
    let gap = diff / (na * nb);
    let m2 = a.m2.hi + b.m2.hi + gap * (diff / n);

    PartialStats {
        min: a.min.min(b.min),
        max: a.max.max(b.max),
        count: DoubleWord::from_f32(n),
        sum: DoubleWord::from_f32(a.sum.hi + b.sum.hi),
        m2: DoubleWord::from_f32(m2),
    }
}

/// Which merge operator a reduction uses.
///
/// Chosen ahead of time; there is no fallback between variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Precision {
    /// [`merge_compensated`].
    #[default]
    Compensated,
    /// [`merge_simple`].
    Simple,
}

impl Precision {
    /// Applies the selected merge operator.
    #[inline]
    pub fn merge(self, a: PartialStats, b: PartialStats) -> PartialStats {
        match self {
            Precision::Compensated => merge_compensated(a, b),
            Precision::Simple => merge_simple(a, b),
        }
    }

    /// The selected merge operator as a plain function pointer.
    pub fn operator(self) -> MergeOp {
        match self {
            Precision::Compensated => merge_compensated,
            Precision::Simple => merge_simple,
        }
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Precision::Compensated => write!(f, "compensated"),
            Precision::Simple => write!(f, "simple"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
