//! Conversions between plain matrices and matrices of dual numbers.
//!
//! - [`autodiff_to_value_matrix`] / [`autodiff_to_gradient_matrix`] split a
//!   vector of differentiable values into its values and its Jacobian.
//! - [`initialize_autodiff`] seeds a vector of independent variables.
//! - [`DiscardGradient`] strips derivative information, either
//!   unconditionally or only when every derivative is (near) zero.

use nalgebra::{DMatrix, DVector, Matrix3, SVector, Vector3};

use crate::dual::Dual;
use crate::error::PlantError;
use crate::scalar::Scalar;
use crate::transform::RigidTransform;

/// Values of a vector of scalars.
#[must_use]
pub fn autodiff_to_value_matrix<T: Scalar>(v: &DVector<T>) -> DVector<f64> {
    v.map(|x| x.value())
}

/// Jacobian of a vector of scalars: one row per element, one column per
/// tracked derivative. Plain scalars produce zero columns.
#[must_use]
pub fn autodiff_to_gradient_matrix<T: Scalar>(v: &DVector<T>) -> DMatrix<f64> {
    DMatrix::from_fn(v.len(), T::NUM_DERIVATIVES, |row, col| {
        v[row].derivatives()[col]
    })
}

/// Seed `values` as independent variables: element `i` gets a unit
/// derivative in slot `i`.
///
/// Fails if the number of values differs from `N`.
pub fn initialize_autodiff<const N: usize>(values: &DVector<f64>) -> crate::Result<DVector<Dual<N>>> {
    if values.len() != N {
        return Err(PlantError::invalid_argument(format!(
            "cannot seed {} variables into dual numbers tracking {N} derivatives",
            values.len()
        )));
    }
    Ok(DVector::from_fn(values.len(), |i, _| Dual::variable(values[i], i)))
}

/// Build dual numbers from explicit values and a gradient matrix
/// (`values.len()` rows, `N` columns).
pub fn initialize_autodiff_given_gradient_matrix<const N: usize>(
    values: &DVector<f64>,
    gradient: &DMatrix<f64>,
) -> crate::Result<DVector<Dual<N>>> {
    if gradient.nrows() != values.len() || gradient.ncols() != N {
        return Err(PlantError::invalid_argument(format!(
            "gradient matrix is {}x{}, expected {}x{N}",
            gradient.nrows(),
            gradient.ncols(),
            values.len()
        )));
    }
    Ok(DVector::from_fn(values.len(), |i, _| {
        Dual::new(
            values[i],
            SVector::<f64, N>::from_fn(|j, _| gradient[(i, j)]),
        )
    }))
}

/// Cast a plain vector into any scalar type. Derivatives start at zero.
#[must_use]
pub fn cast_vector<T: Scalar>(v: &DVector<f64>) -> DVector<T> {
    v.map(T::from_f64)
}

/// Largest absolute derivative carried by `x`.
fn max_abs_derivative<T: Scalar>(x: &T) -> f64 {
    x.derivatives().iter().fold(0.0, |acc, d| acc.max(d.abs()))
}

fn check_zero_gradient<'a, T: Scalar + 'a>(
    values: impl IntoIterator<Item = &'a T>,
    tolerance: f64,
) -> crate::Result<()> {
    let max_abs = values
        .into_iter()
        .map(max_abs_derivative)
        .fold(0.0, f64::max);
    if max_abs > tolerance {
        return Err(PlantError::NonZeroGradient { max_abs, tolerance });
    }
    Ok(())
}

/// Strip derivative information, yielding the plain-decimal counterpart.
pub trait DiscardGradient {
    /// The plain-decimal counterpart of `Self`.
    type Output;

    /// Drop all derivatives. For plain types this is the identity.
    fn discard_gradient(&self) -> Self::Output;

    /// Drop derivatives, but only if every one of them is within
    /// `tolerance` of zero. Otherwise returns
    /// [`PlantError::NonZeroGradient`].
    fn discard_zero_gradient_with_tolerance(&self, tolerance: f64) -> crate::Result<Self::Output>;

    /// [`discard_zero_gradient_with_tolerance`](Self::discard_zero_gradient_with_tolerance)
    /// with an exact-zero tolerance.
    fn discard_zero_gradient(&self) -> crate::Result<Self::Output> {
        self.discard_zero_gradient_with_tolerance(0.0)
    }
}

impl<const N: usize> DiscardGradient for Dual<N> {
    type Output = f64;

    fn discard_gradient(&self) -> f64 {
        self.value
    }

    fn discard_zero_gradient_with_tolerance(&self, tolerance: f64) -> crate::Result<f64> {
        check_zero_gradient(std::iter::once(self), tolerance)?;
        Ok(self.value)
    }
}

impl DiscardGradient for f64 {
    type Output = f64;

    fn discard_gradient(&self) -> f64 {
        *self
    }

    fn discard_zero_gradient_with_tolerance(&self, _tolerance: f64) -> crate::Result<f64> {
        Ok(*self)
    }
}

impl<T: Scalar> DiscardGradient for DVector<T> {
    type Output = DVector<f64>;

    fn discard_gradient(&self) -> DVector<f64> {
        self.map(|x| x.value())
    }

    fn discard_zero_gradient_with_tolerance(&self, tolerance: f64) -> crate::Result<DVector<f64>> {
        check_zero_gradient(self.iter(), tolerance)?;
        Ok(self.discard_gradient())
    }
}

impl<T: Scalar> DiscardGradient for DMatrix<T> {
    type Output = DMatrix<f64>;

    fn discard_gradient(&self) -> DMatrix<f64> {
        self.map(|x| x.value())
    }

    fn discard_zero_gradient_with_tolerance(&self, tolerance: f64) -> crate::Result<DMatrix<f64>> {
        check_zero_gradient(self.iter(), tolerance)?;
        Ok(self.discard_gradient())
    }
}

impl<T: Scalar> DiscardGradient for Vector3<T> {
    type Output = Vector3<f64>;

    fn discard_gradient(&self) -> Vector3<f64> {
        self.map(|x| x.value())
    }

    fn discard_zero_gradient_with_tolerance(&self, tolerance: f64) -> crate::Result<Vector3<f64>> {
        check_zero_gradient(self.iter(), tolerance)?;
        Ok(self.discard_gradient())
    }
}

impl<T: Scalar> DiscardGradient for Matrix3<T> {
    type Output = Matrix3<f64>;

    fn discard_gradient(&self) -> Matrix3<f64> {
        self.map(|x| x.value())
    }

    fn discard_zero_gradient_with_tolerance(&self, tolerance: f64) -> crate::Result<Matrix3<f64>> {
        check_zero_gradient(self.iter(), tolerance)?;
        Ok(self.discard_gradient())
    }
}

impl<T: Scalar> DiscardGradient for RigidTransform<T> {
    type Output = RigidTransform<f64>;

    fn discard_gradient(&self) -> RigidTransform<f64> {
        RigidTransform::new(
            self.rotation.discard_gradient(),
            self.translation.discard_gradient(),
        )
    }

    fn discard_zero_gradient_with_tolerance(
        &self,
        tolerance: f64,
    ) -> crate::Result<RigidTransform<f64>> {
        check_zero_gradient(self.rotation.iter().chain(self.translation.iter()), tolerance)?;
        Ok(self.discard_gradient())
    }
}
