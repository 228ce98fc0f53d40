//! Double-word (compensated) `f32` arithmetic.
//!
//! A [`DoubleWord`] holds a value as the unevaluated sum `hi + lo` of two
//! `f32`s with `|lo| ≤ ulp(hi) / 2`, giving roughly 48 bits of significand
//! while staying in single-precision registers.
//!
//! # Algorithms
//!
//! All operations are built from error-free transformations:
//!
//! - [`two_sum`]: Knuth's branch-free exact addition, `a + b = s + e`.
//! - [`fast_two_sum`]: Dekker's variant, valid when `|a| ≥ |b|` (or `a = 0`).
//! - [`two_prod`]: exact product via fused multiply-add, `a · b = p + e`.
//!
//! [`dw_add`], [`dw_mul`] and [`dw_div`] are the accurate double-word
//! algorithms of Joldes, Muller & Popescu (2017), "Tight and Rigorous Error
//! Bounds for Basic Building Blocks of Double-Word Arithmetic",
//! *ACM TOMS* 44(2):
//!
//! | Operation | Algorithm | Relative error bound |
//! |---|---|---|
//! | [`dw_add`] | AccurateDWPlusDW (Alg. 6) | 3u² + 13u³ |
//! | [`dw_mul`] | DWTimesDW3 (Alg. 12) | 4u² |
//! | [`dw_div`] | DWDivDW2 (Alg. 17) | 15u² + 56u³ |
//!
//! where `u = 2⁻²⁴` is the unit roundoff of `f32`.

use std::ops::Neg;

use bytemuck::{Pod, Zeroable};

/// An `f32` pair whose exact sum `hi + lo` carries the represented value.
///
/// # Examples
/// ```
/// use u_moments::double_word::{dw_add, DoubleWord};
/// // 2^24 + 1 is not representable in f32, but is as a double word.
/// let big = DoubleWord::from_f32(16_777_216.0);
/// let one = DoubleWord::from_f32(1.0);
/// let sum = dw_add(big, one);
/// assert_eq!(sum.to_f64(), 16_777_217.0);
/// ```
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct DoubleWord {
    /// Leading component, the value rounded to `f32`.
    pub hi: f32,
    /// Residual correction, `value − hi` rounded to `f32`.
    pub lo: f32,
}

impl DoubleWord {
    /// Exact zero.
    pub const ZERO: DoubleWord = DoubleWord { hi: 0.0, lo: 0.0 };

    /// Exact one.
    pub const ONE: DoubleWord = DoubleWord { hi: 1.0, lo: 0.0 };

    /// Creates a double word from raw components without renormalizing.
    ///
    /// The caller guarantees `|lo| ≤ ulp(hi) / 2`; use [`fast_two_sum`] to
    /// normalize an arbitrary pair.
    pub const fn new(hi: f32, lo: f32) -> Self {
        Self { hi, lo }
    }

    /// Wraps a single `f32` with a zero residual.
    pub const fn from_f32(value: f32) -> Self {
        Self { hi: value, lo: 0.0 }
    }

    /// Splits an `f64` into its nearest double-word representation.
    ///
    /// Exact whenever the `f64` significand fits in 48 bits and the
    /// magnitude is within `f32` range.
    pub fn from_f64(value: f64) -> Self {
        let hi = value as f32;
        let lo = (value - hi as f64) as f32;
        Self { hi, lo }
    }

    /// Reconstructs the represented value in `f64`.
    pub fn to_f64(self) -> f64 {
        self.hi as f64 + self.lo as f64
    }

    /// Returns `true` if the represented value is exactly zero.
    pub fn is_zero(self) -> bool {
        self.hi == 0.0 && self.lo == 0.0
    }

    /// Returns `true` if both components are finite.
    pub fn is_finite(self) -> bool {
        self.hi.is_finite() && self.lo.is_finite()
    }
}

impl Neg for DoubleWord {
    type Output = DoubleWord;

    /// Exact.
    fn neg(self) -> Self {
        Self {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl From<f32> for DoubleWord {
    fn from(value: f32) -> Self {
        Self::from_f32(value)
    }
}

// ---------------------------------------------------------------------------
// Error-free transformations
// ---------------------------------------------------------------------------

/// Exact sum of two `f32`s: returns `(s, e)` with `s = fl(a + b)` and
/// `a + b = s + e` exactly.
///
/// Reference: Knuth (1998), *TAOCP* Vol. 2, §4.2.2, Theorem B.
#[inline]
pub fn two_sum(a: f32, b: f32) -> (f32, f32) {
    let s = a + b;
    let b_virtual = s - a;
    let a_virtual = s - b_virtual;
    let b_err = b - b_virtual;
    let a_err = a - a_virtual;
    (s, a_err + b_err)
}

/// Exact sum assuming `|a| ≥ |b|` or `a = 0`.
///
/// Reference: Dekker (1971), "A floating-point technique for extending the
/// available precision", *Numerische Mathematik* 18(3).
#[inline]
pub fn fast_two_sum(a: f32, b: f32) -> (f32, f32) {
    let s = a + b;
    let z = s - a;
    (s, b - z)
}

/// Exact product of two `f32`s: returns `(p, e)` with `p = fl(a · b)` and
/// `a · b = p + e` exactly (barring underflow).
#[inline]
pub fn two_prod(a: f32, b: f32) -> (f32, f32) {
    let p = a * b;
    let e = a.mul_add(b, -p);
    (p, e)
}

// ---------------------------------------------------------------------------
// Double-word operations
// ---------------------------------------------------------------------------

/// Double-word addition (AccurateDWPlusDW).
///
/// Commutative bit-for-bit: [`two_sum`] yields the same exact error for
/// either operand order.
///
/// # Examples
/// ```
/// use u_moments::double_word::{dw_add, DoubleWord};
/// let a = DoubleWord::from_f64(1.0e8 + 0.125);
/// let b = DoubleWord::from_f64(-1.0e8);
/// assert_eq!(dw_add(a, b).to_f64(), 0.125);
/// ```
#[inline]
pub fn dw_add(x: DoubleWord, y: DoubleWord) -> DoubleWord {
    let (sh, sl) = two_sum(x.hi, y.hi);
    let (th, tl) = two_sum(x.lo, y.lo);
    let c = sl + th;
    let (vh, vl) = fast_two_sum(sh, c);
    let w = tl + vl;
    let (zh, zl) = fast_two_sum(vh, w);
    DoubleWord::new(zh, zl)
}

/// Double-word subtraction, `x − y`.
#[inline]
pub fn dw_sub(x: DoubleWord, y: DoubleWord) -> DoubleWord {
    dw_add(x, -y)
}

/// Double-word multiplication (DWTimesDW3).
///
/// # Examples
/// ```
/// use u_moments::double_word::{dw_mul, DoubleWord};
/// // 4097² = 16_785_409 needs 25 bits.
/// let x = DoubleWord::from_f32(4097.0);
/// assert_eq!(dw_mul(x, x).to_f64(), 16_785_409.0);
/// ```
#[inline]
pub fn dw_mul(x: DoubleWord, y: DoubleWord) -> DoubleWord {
    let (ch, cl1) = two_prod(x.hi, y.hi);
    let tl0 = x.lo * y.lo;
    let tl1 = x.hi.mul_add(y.lo, tl0);
    let cl2 = x.lo.mul_add(y.hi, tl1);
    let cl3 = cl1 + cl2;
    let (zh, zl) = fast_two_sum(ch, cl3);
    DoubleWord::new(zh, zl)
}

/// Double-word square, `x · x`.
#[inline]
pub fn dw_square(x: DoubleWord) -> DoubleWord {
    dw_mul(x, x)
}

/// Double word times a single `f32` (DWTimesFP3).
#[inline]
fn dw_mul_f32(x: DoubleWord, y: f32) -> DoubleWord {
    let (ch, cl1) = two_prod(x.hi, y);
    let cl3 = x.lo.mul_add(y, cl1);
    let (zh, zl) = fast_two_sum(ch, cl3);
    DoubleWord::new(zh, zl)
}

/// Double-word division (DWDivDW2).
///
/// The divisor must be non-zero; a zero `y.hi` yields non-finite
/// components exactly as `f32` division would.
///
/// # Examples
/// ```
/// use u_moments::double_word::{dw_div, DoubleWord};
/// let q = dw_div(DoubleWord::ONE, DoubleWord::from_f32(3.0));
/// assert!((q.to_f64() - 1.0 / 3.0).abs() < 1e-14);
/// ```
#[inline]
pub fn dw_div(x: DoubleWord, y: DoubleWord) -> DoubleWord {
    let th = x.hi / y.hi;
    let r = dw_mul_f32(y, th);
    let pi_h = x.hi - r.hi;
    let delta_l = x.lo - r.lo;
    let delta = pi_h + delta_l;
    let tl = delta / y.hi;
    let (zh, zl) = fast_two_sum(th, tl);
    DoubleWord::new(zh, zl)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
