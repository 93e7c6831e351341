//! Spatial velocities and forces.
//!
//! Both are a rotational and a translational 3-vector measured at some
//! reference point and expressed in world. Shifting the reference point
//! changes the translational part of a velocity and the rotational part of a
//! force; the other half is point-independent.

use std::ops::{Add, AddAssign, Neg, Sub};

use nalgebra::{Vector3, Vector6};

use crate::scalar::Scalar;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Spatial velocity `V_WB = [ω_WB; v_WBo]` of a frame measured at its origin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialVelocity<T: Scalar> {
    /// Angular velocity.
    pub rotational: Vector3<T>,
    /// Translational velocity of the reference point.
    pub translational: Vector3<T>,
}

/// Spatial force `F = [τ; f]`: a torque about the reference point and a
/// force applied there.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialForce<T: Scalar> {
    /// Torque about the reference point.
    pub rotational: Vector3<T>,
    /// Force.
    pub translational: Vector3<T>,
}

impl<T: Scalar> SpatialVelocity<T> {
    /// Build from its parts.
    #[must_use]
    pub fn new(rotational: Vector3<T>, translational: Vector3<T>) -> Self {
        Self {
            rotational,
            translational,
        }
    }

    /// Zero velocity.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// Velocity of the rigidly attached point displaced by `p_pq` from the
    /// current reference point: `v_q = v_p + ω × p_pq`.
    #[must_use]
    pub fn shift(&self, p_pq: &Vector3<T>) -> Self {
        Self {
            rotational: self.rotational,
            translational: self.translational + self.rotational.cross(p_pq),
        }
    }

    /// Stack as `[ω; v]`.
    #[must_use]
    pub fn to_vector(&self) -> Vector6<T> {
        let w = &self.rotational;
        let v = &self.translational;
        Vector6::new(w.x, w.y, w.z, v.x, v.y, v.z)
    }
}

impl<T: Scalar> SpatialForce<T> {
    /// Build from its parts.
    #[must_use]
    pub fn new(rotational: Vector3<T>, translational: Vector3<T>) -> Self {
        Self {
            rotational,
            translational,
        }
    }

    /// Zero force.
    #[must_use]
    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    /// The same force system referred to a point displaced by `p_pq` from
    /// the current reference point: `τ_q = τ_p − p_pq × f`.
    #[must_use]
    pub fn shift(&self, p_pq: &Vector3<T>) -> Self {
        Self {
            rotational: self.rotational - p_pq.cross(&self.translational),
            translational: self.translational,
        }
    }

    /// Stack as `[τ; f]`.
    #[must_use]
    pub fn to_vector(&self) -> Vector6<T> {
        let t = &self.rotational;
        let f = &self.translational;
        Vector6::new(t.x, t.y, t.z, f.x, f.y, f.z)
    }
}

impl<T: Scalar> Default for SpatialForce<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Scalar> Default for SpatialVelocity<T> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<T: Scalar> Add for SpatialForce<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.rotational + rhs.rotational,
            self.translational + rhs.translational,
        )
    }
}

impl<T: Scalar> AddAssign for SpatialForce<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.rotational += rhs.rotational;
        self.translational += rhs.translational;
    }
}

impl<T: Scalar> Sub for SpatialForce<T> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.rotational - rhs.rotational,
            self.translational - rhs.translational,
        )
    }
}

impl<T: Scalar> Neg for SpatialForce<T> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.rotational, -self.translational)
    }
}

impl<T: Scalar> Add for SpatialVelocity<T> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.rotational + rhs.rotational,
            self.translational + rhs.translational,
        )
    }
}
