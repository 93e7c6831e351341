//! Forward-mode dual numbers with a fixed number of partial derivatives.
//!
//! `Dual<N>` carries a value and the gradient of that value with respect to
//! `N` independent variables. Arithmetic and the elementary functions apply
//! the chain rule, so any computation written against [`Scalar`] produces
//! exact first derivatives alongside its result.
//!
//! ```
//! use plant_types::{Dual, Scalar};
//!
//! let x = Dual::<1>::variable(2.0, 0);
//! let y = x * x + x.sin();
//! assert!((y.value - (4.0 + 2.0_f64.sin())).abs() < 1e-15);
//! assert!((y.derivatives[0] - (4.0 + 2.0_f64.cos())).abs() < 1e-15);
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use nalgebra::SVector;
use num_traits::{One, Zero};

use crate::scalar::Scalar;

/// A value together with its partial derivatives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual<const N: usize> {
    /// The decimal value.
    pub value: f64,
    /// Partial derivatives of `value` with respect to each tracked variable.
    pub derivatives: SVector<f64, N>,
}

impl<const N: usize> Dual<N> {
    /// Create a dual number from a value and its gradient.
    #[must_use]
    pub fn new(value: f64, derivatives: SVector<f64, N>) -> Self {
        Self { value, derivatives }
    }

    /// A constant: value with a zero gradient.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            value,
            derivatives: SVector::zeros(),
        }
    }

    /// The `index`-th independent variable, seeded with a unit derivative.
    ///
    /// An out-of-range `index` yields a constant.
    #[must_use]
    pub fn variable(value: f64, index: usize) -> Self {
        let mut derivatives = SVector::zeros();
        if index < N {
            derivatives[index] = 1.0;
        }
        Self { value, derivatives }
    }

    /// Apply a scalar function with known derivative `df` at `self.value`.
    #[inline]
    fn chain(self, f: f64, df: f64) -> Self {
        Self {
            value: f,
            derivatives: self.derivatives * df,
        }
    }
}

impl<const N: usize> Default for Dual<N> {
    fn default() -> Self {
        Self::constant(0.0)
    }
}

impl<const N: usize> From<f64> for Dual<N> {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl<const N: usize> fmt::Display for Dual<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {:?}ε", self.value, self.derivatives.as_slice())
    }
}

// Ordering looks at the value only; derivatives never affect branching.
impl<const N: usize> PartialOrd for Dual<N> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<const N: usize> Add for Dual<N> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
            derivatives: self.derivatives + rhs.derivatives,
        }
    }
}

impl<const N: usize> Sub for Dual<N> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
            derivatives: self.derivatives - rhs.derivatives,
        }
    }
}

impl<const N: usize> Mul for Dual<N> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            value: self.value * rhs.value,
            derivatives: self.derivatives * rhs.value + rhs.derivatives * self.value,
        }
    }
}

impl<const N: usize> Div for Dual<N> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        let inv = 1.0 / rhs.value;
        let value = self.value * inv;
        Self {
            value,
            derivatives: (self.derivatives - rhs.derivatives * value) * inv,
        }
    }
}

impl<const N: usize> Neg for Dual<N> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self {
            value: -self.value,
            derivatives: -self.derivatives,
        }
    }
}

impl<const N: usize> AddAssign for Dual<N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const N: usize> SubAssign for Dual<N> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<const N: usize> MulAssign for Dual<N> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<const N: usize> DivAssign for Dual<N> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl<const N: usize> Zero for Dual<N> {
    fn zero() -> Self {
        Self::constant(0.0)
    }

    fn is_zero(&self) -> bool {
        self.value == 0.0 && self.derivatives.iter().all(|d| *d == 0.0)
    }
}

impl<const N: usize> One for Dual<N> {
    fn one() -> Self {
        Self::constant(1.0)
    }
}

impl<const N: usize> Scalar for Dual<N> {
    const DIFFERENTIABLE: bool = true;
    const NUM_DERIVATIVES: usize = N;
    const NAME: &'static str = "Dual";

    #[inline]
    fn from_f64(value: f64) -> Self {
        Self::constant(value)
    }

    #[inline]
    fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    fn derivatives(&self) -> &[f64] {
        self.derivatives.as_slice()
    }

    #[inline]
    fn sin(self) -> Self {
        self.chain(self.value.sin(), self.value.cos())
    }

    #[inline]
    fn cos(self) -> Self {
        self.chain(self.value.cos(), -self.value.sin())
    }

    #[inline]
    fn sqrt(self) -> Self {
        let root = self.value.sqrt();
        // d/dx sqrt(x) is unbounded at 0; keep the gradient finite there.
        let d = if root > 0.0 { 0.5 / root } else { 0.0 };
        self.chain(root, d)
    }

    #[inline]
    fn abs(self) -> Self {
        if self.value < 0.0 { -self } else { self }
    }
}
