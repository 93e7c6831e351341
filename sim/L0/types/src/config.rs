//! Configuration types for the plant.
//!
//! [`PlantConfig`] collects the knobs that shape how a plant is finalized and
//! evaluated: the penetration allowance that seeds the penalty contact
//! parameters, the gravity magnitude assumed when no gravity field is
//! present, and which algorithm assembles the mass matrix.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Standard gravitational acceleration magnitude (m/s²).
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Default penetration allowance (m).
pub const DEFAULT_PENETRATION_ALLOWANCE: f64 = 1.0e-3;

/// Main configuration for a multibody plant.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlantConfig {
    /// Penetration depth (m) the penalty contact model should settle at under
    /// the weight of the heaviest body.
    pub penetration_allowance: f64,
    /// Gravity magnitude (m/s²) assumed when estimating contact parameters
    /// for a plant with no gravity field.
    pub standard_gravity: f64,
    /// How the generalized mass matrix is assembled.
    pub mass_matrix: MassMatrixAlgorithm,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            penetration_allowance: DEFAULT_PENETRATION_ALLOWANCE,
            standard_gravity: STANDARD_GRAVITY,
            mass_matrix: MassMatrixAlgorithm::InverseDynamics,
        }
    }
}

impl PlantConfig {
    /// Set the penetration allowance.
    #[must_use]
    pub fn penetration_allowance(mut self, allowance: f64) -> Self {
        self.penetration_allowance = allowance;
        self
    }

    /// Set the fallback gravity magnitude.
    #[must_use]
    pub fn standard_gravity(mut self, g: f64) -> Self {
        self.standard_gravity = g;
        self
    }

    /// Set the mass matrix algorithm.
    #[must_use]
    pub fn mass_matrix(mut self, algorithm: MassMatrixAlgorithm) -> Self {
        self.mass_matrix = algorithm;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.penetration_allowance.is_finite() || self.penetration_allowance <= 0.0 {
            return Err(crate::PlantError::invalid_config(format!(
                "penetration_allowance must be positive and finite, got {}",
                self.penetration_allowance
            )));
        }

        if !self.standard_gravity.is_finite() || self.standard_gravity < 0.0 {
            return Err(crate::PlantError::invalid_config(
                "standard_gravity must be non-negative and finite",
            ));
        }

        Ok(())
    }
}

/// Algorithm used to assemble the generalized mass matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MassMatrixAlgorithm {
    /// One inverse-dynamics pass per column with unit accelerations.
    #[default]
    InverseDynamics,
    /// Composite rigid body algorithm.
    CompositeRigidBody,
}

/// Gravity configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Gravity {
    /// Acceleration due to gravity (m/s²).
    pub acceleration: Vector3<f64>,
}

impl Default for Gravity {
    fn default() -> Self {
        Self::earth()
    }
}

impl Gravity {
    /// Standard Earth gravity (9.81 m/s² in -Z direction).
    #[must_use]
    pub fn earth() -> Self {
        Self {
            acceleration: Vector3::new(0.0, 0.0, -STANDARD_GRAVITY),
        }
    }

    /// Zero gravity.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            acceleration: Vector3::zeros(),
        }
    }

    /// Custom gravity vector.
    #[must_use]
    pub fn custom(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    /// Magnitude of the acceleration.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.acceleration.norm()
    }

    /// Weight of a body of the given mass.
    #[must_use]
    pub fn force_on_mass(&self, mass: f64) -> Vector3<f64> {
        self.acceleration * mass
    }
}
