//! Rigid transforms over any [`Scalar`].
//!
//! `nalgebra::Isometry3` needs a `RealField` scalar, which dual numbers do
//! not implement. [`RigidTransform`] stores the rotation as a plain 3x3
//! matrix so composition and point mapping only need ring arithmetic.

use std::ops::Mul;

use nalgebra::{Matrix3, Vector3};

use crate::scalar::Scalar;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pose of frame `B` in frame `A`, written `X_AB` in the rest of the crate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidTransform<T: Scalar> {
    /// Orientation `R_AB`.
    pub rotation: Matrix3<T>,
    /// Position of `B`'s origin measured in `A`, `p_AoBo_A`.
    pub translation: Vector3<T>,
}

impl<T: Scalar> Default for RigidTransform<T> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<T: Scalar> RigidTransform<T> {
    /// Create a transform from its parts.
    #[must_use]
    pub fn new(rotation: Matrix3<T>, translation: Vector3<T>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// The identity transform.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// A pure translation.
    #[must_use]
    pub fn from_translation(translation: Vector3<T>) -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation,
        }
    }

    /// A pure rotation.
    #[must_use]
    pub fn from_rotation(rotation: Matrix3<T>) -> Self {
        Self {
            rotation,
            translation: Vector3::zeros(),
        }
    }

    /// Map a point expressed in `B` into `A`.
    #[must_use]
    pub fn transform_point(&self, p_b: &Vector3<T>) -> Vector3<T> {
        self.rotation * p_b + self.translation
    }

    /// Re-express a free vector from `B` into `A`.
    #[must_use]
    pub fn transform_vector(&self, v_b: &Vector3<T>) -> Vector3<T> {
        self.rotation * v_b
    }

    /// `X_BA` from `X_AB`. Assumes `rotation` is orthonormal.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let rt = self.rotation.transpose();
        Self {
            translation: -(rt * self.translation),
            rotation: rt,
        }
    }
}

impl RigidTransform<f64> {
    /// Convert a plain transform into any scalar type with zero derivatives.
    #[must_use]
    pub fn cast<T: Scalar>(&self) -> RigidTransform<T> {
        RigidTransform {
            rotation: self.rotation.map(T::from_f64),
            translation: self.translation.map(T::from_f64),
        }
    }
}

impl<T: Scalar> Mul for RigidTransform<T> {
    type Output = Self;

    /// `X_AC = X_AB * X_BC`.
    fn mul(self, rhs: Self) -> Self {
        Self {
            rotation: self.rotation * rhs.rotation,
            translation: self.rotation * rhs.translation + self.translation,
        }
    }
}

/// Cross-product matrix `[v]×` such that `[v]× w = v × w`.
#[must_use]
pub fn skew<T: Scalar>(v: &Vector3<T>) -> Matrix3<T> {
    let z = T::zero();
    Matrix3::new(z, -v.z, v.y, v.z, z, -v.x, -v.y, v.x, z)
}

/// Rotation by `angle` about the unit `axis` (Rodrigues' formula).
#[must_use]
pub fn rotation_about_axis<T: Scalar>(axis: &Vector3<f64>, angle: T) -> Matrix3<T> {
    let k = skew(&axis.map(T::from_f64));
    let (s, c) = (angle.sin(), angle.cos());
    Matrix3::identity() + k * s + k * k * (T::one() - c)
}

/// Rotation matrix of the quaternion `(w, x, y, z)`.
///
/// The quaternion need not be unit length; it is normalized through its
/// squared norm so no square root enters the derivative chain.
#[must_use]
pub fn rotation_from_quaternion<T: Scalar>(w: T, x: T, y: T, z: T) -> Matrix3<T> {
    let one = T::one();
    let two = one + one;
    let s = two / (w * w + x * x + y * y + z * z);
    Matrix3::new(
        one - s * (y * y + z * z),
        s * (x * y - z * w),
        s * (x * z + y * w),
        s * (x * y + z * w),
        one - s * (x * x + z * z),
        s * (y * z - x * w),
        s * (x * z - y * w),
        s * (y * z + x * w),
        one - s * (x * x + y * y),
    )
}
