//! # u-moments
//!
//! Single-pass min, max, count, sum and variance as a parallel reduction.
//!
//! The crate provides the algebra a data-parallel runtime needs to reduce an
//! `f32` array to descriptive statistics: a per-element map operator, a
//! pairwise merge operator that is commutative and associative, and an
//! identity element for empty or padding leaves. The runtime is free to pick
//! any partitioning and any merge tree.
//!
//! ## Modules
//!
//! - [`double_word`] — Double-word (`f32` pair) compensated arithmetic
//! - [`partial`] — The 8-slot [`PartialStats`] record
//! - [`ops`] — [`map_value`], [`merge_compensated`], [`merge_simple`]
//! - [`summary`] — Mean, variance and standard deviation of a reduced record
//! - [`runtime`] — Reference drivers (sequential, pairwise, padded, `rayon`)
//!
//! ## Design Philosophy
//!
//! - **Numerical stability first**: the Chan–Golub–LeVeque merge of `M2`,
//!   evaluated in double-word arithmetic, survives deep merge trees
//! - **Branch-free absorption**: NaN and ±∞ map to the identity element, so
//!   invalid inputs never reach the merge arithmetic
//! - **Property-based testing**: algebraic laws verified via proptest
//!
//! ## Example
//!
//! ```
//! use u_moments::{reduce_parallel, ReduceConfig, Summary};
//!
//! let data = [1.0_f32, 2.0, 3.0, 4.0, 5.0];
//! let stats = reduce_parallel(&data, &ReduceConfig::accurate());
//! let summary = Summary::try_from(stats).unwrap();
//! assert_eq!(summary.mean, 3.0);
//! assert_eq!(summary.population_variance, 2.0);
//! ```

pub mod double_word;
pub mod error;
pub mod ops;
pub mod partial;
pub mod runtime;
pub mod summary;

pub use double_word::DoubleWord;
pub use error::StatsError;
pub use ops::{map_value, merge_compensated, merge_simple, MapOp, MergeOp, Precision};
pub use partial::PartialStats;
pub use runtime::{
    count_non_finite, reduce_padded, reduce_pairwise, reduce_parallel, reduce_sequential,
    summarize, ReduceConfig,
};
pub use summary::Summary;
