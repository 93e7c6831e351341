//! Applied forces on a multibody system.

use nalgebra::DVector;
use plant_types::{SpatialForce, Scalar};

/// Forces applied to a multibody system.
///
/// `body_forces[b]` is the spatial force on body `b`, measured at its origin
/// and expressed in world. `generalized` holds forces applied directly on
/// the generalized coordinates (actuation).
#[derive(Debug, Clone, PartialEq)]
pub struct MultibodyForces<T: Scalar> {
    /// Per-body spatial forces, indexed by `BodyIndex`.
    pub body_forces: Vec<SpatialForce<T>>,
    /// Generalized forces, one per velocity coordinate.
    pub generalized: DVector<T>,
}

impl<T: Scalar> MultibodyForces<T> {
    /// All-zero forces for `num_bodies` bodies and `nv` velocities.
    #[must_use]
    pub fn zeros(num_bodies: usize, nv: usize) -> Self {
        Self {
            body_forces: vec![SpatialForce::zero(); num_bodies],
            generalized: DVector::zeros(nv),
        }
    }

    /// Reset every entry to zero without reallocating.
    pub fn set_zero(&mut self) {
        self.body_forces.fill(SpatialForce::zero());
        self.generalized.fill(T::zero());
    }

    /// Number of bodies these forces are sized for.
    #[must_use]
    pub fn num_bodies(&self) -> usize {
        self.body_forces.len()
    }

    /// Number of generalized forces.
    #[must_use]
    pub fn num_velocities(&self) -> usize {
        self.generalized.len()
    }
}
