//! The numeric abstraction every dynamics routine is written against.
//!
//! [`Scalar`] is the minimal field-plus-transcendentals contract the plant
//! needs. It is implemented for plain `f64` and for the forward-mode dual
//! number [`Dual`](crate::Dual), so one generic pipeline yields either decimal
//! values or values with exact first derivatives.
//!
//! The trait does not require `nalgebra::RealField`; only the generic
//! matrix operations (`+`, `*`, `dot`, `cross`, `transpose`) are used,
//! and those are available for any `nalgebra::Scalar` with closed arithmetic.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_traits::{One, Zero};

/// Numeric type usable throughout the multibody plant.
pub trait Scalar:
    nalgebra::Scalar
    + Copy
    + Debug
    + PartialOrd
    + Zero
    + One
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Mul<Output = Self>
    + MulAssign
    + Div<Output = Self>
    + DivAssign
    + Neg<Output = Self>
    + Send
    + Sync
{
    /// Whether this type propagates derivatives.
    const DIFFERENTIABLE: bool;

    /// Number of tracked partial derivatives per value (0 for plain types).
    const NUM_DERIVATIVES: usize;

    /// Human-readable type name used in error messages.
    const NAME: &'static str;

    /// Lift a plain value into this type with all derivatives zero.
    fn from_f64(value: f64) -> Self;

    /// The plain decimal value, derivatives dropped.
    fn value(&self) -> f64;

    /// The tracked partial derivatives (empty for plain types).
    fn derivatives(&self) -> &[f64];

    /// Sine.
    #[must_use]
    fn sin(self) -> Self;

    /// Cosine.
    #[must_use]
    fn cos(self) -> Self;

    /// Square root.
    #[must_use]
    fn sqrt(self) -> Self;

    /// Absolute value.
    #[must_use]
    fn abs(self) -> Self;

    /// Square.
    #[must_use]
    fn powi2(self) -> Self {
        self * self
    }
}

impl Scalar for f64 {
    const DIFFERENTIABLE: bool = false;
    const NUM_DERIVATIVES: usize = 0;
    const NAME: &'static str = "f64";

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn value(&self) -> f64 {
        *self
    }

    #[inline]
    fn derivatives(&self) -> &[f64] {
        &[]
    }

    #[inline]
    fn sin(self) -> Self {
        f64::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        f64::cos(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline]
    fn abs(self) -> Self {
        f64::abs(self)
    }
}

/// Convert a plain number into `T` (shorthand for [`Scalar::from_f64`]).
#[inline]
#[must_use]
pub fn lift<T: Scalar>(value: f64) -> T {
    T::from_f64(value)
}
