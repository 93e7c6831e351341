//! Rigid bodies and their mass properties.

use nalgebra::{Matrix3, Vector3};
use plant_types::{BodyIndex, PlantError, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mass properties of a rigid body.
///
/// Contains mass, center of mass offset, and inertia tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MassProperties {
    /// Total mass in kg.
    pub mass: f64,
    /// Center of mass offset from body origin in body coordinates.
    pub center_of_mass: Vector3<f64>,
    /// Inertia tensor about the center of mass in body coordinates (kg·m²).
    pub inertia: Matrix3<f64>,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self::point_mass(0.0)
    }
}

impl MassProperties {
    /// Create mass properties with given values.
    ///
    /// # Arguments
    ///
    /// * `mass` - Total mass
    /// * `center_of_mass` - COM offset from body origin
    /// * `inertia` - Inertia tensor about COM
    #[must_use]
    pub const fn new(mass: f64, center_of_mass: Vector3<f64>, inertia: Matrix3<f64>) -> Self {
        Self {
            mass,
            center_of_mass,
            inertia,
        }
    }

    /// Create mass properties for a point mass at the body origin.
    #[must_use]
    pub fn point_mass(mass: f64) -> Self {
        Self {
            mass,
            center_of_mass: Vector3::zeros(),
            inertia: Matrix3::zeros(),
        }
    }

    /// Create mass properties for a uniform solid sphere centered on the
    /// body origin.
    ///
    /// Inertia of a solid sphere: I = (2/5) * m * r²
    #[must_use]
    pub fn sphere(mass: f64, radius: f64) -> Self {
        let i = 0.4 * mass * radius * radius;
        Self {
            mass,
            center_of_mass: Vector3::zeros(),
            inertia: Matrix3::from_diagonal(&Vector3::new(i, i, i)),
        }
    }

    /// Create mass properties for a uniform box centered on the body origin.
    ///
    /// - Ixx = (1/12) * m * (y² + z²)
    /// - Iyy = (1/12) * m * (x² + z²)
    /// - Izz = (1/12) * m * (x² + y²)
    #[must_use]
    pub fn box_shape(mass: f64, half_extents: Vector3<f64>) -> Self {
        let x2 = 4.0 * half_extents.x * half_extents.x;
        let y2 = 4.0 * half_extents.y * half_extents.y;
        let z2 = 4.0 * half_extents.z * half_extents.z;

        Self {
            mass,
            center_of_mass: Vector3::zeros(),
            inertia: Matrix3::from_diagonal(&Vector3::new(
                mass * (y2 + z2) / 12.0,
                mass * (x2 + z2) / 12.0,
                mass * (x2 + y2) / 12.0,
            )),
        }
    }

    /// Move the center of mass to `center_of_mass`, keeping the inertia
    /// about it unchanged.
    #[must_use]
    pub fn with_center_of_mass(mut self, center_of_mass: Vector3<f64>) -> Self {
        self.center_of_mass = center_of_mass;
        self
    }

    /// Validate that the mass properties are physically meaningful.
    pub fn validate(&self) -> Result<()> {
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(PlantError::invalid_argument(format!(
                "mass must be finite and non-negative, got {}",
                self.mass
            )));
        }
        if !self.center_of_mass.iter().all(|x| x.is_finite()) {
            return Err(PlantError::invalid_argument(
                "center of mass must be finite",
            ));
        }
        if !self.inertia.iter().all(|x| x.is_finite()) {
            return Err(PlantError::invalid_argument("inertia must be finite"));
        }
        if (self.inertia - self.inertia.transpose()).amax() > 1e-9 * (1.0 + self.inertia.amax()) {
            return Err(PlantError::invalid_argument("inertia must be symmetric"));
        }
        // Positive semi-definite: eigenvalues non-negative.
        if self
            .inertia
            .symmetric_eigenvalues()
            .iter()
            .any(|&e| e < -1e-10)
        {
            return Err(PlantError::invalid_argument(
                "inertia tensor must be positive semi-definite",
            ));
        }
        Ok(())
    }
}

/// A rigid body of the mechanism.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidBody {
    index: BodyIndex,
    name: String,
    default_mass_properties: MassProperties,
}

impl RigidBody {
    pub(crate) fn new(index: BodyIndex, name: String, mass_properties: MassProperties) -> Self {
        Self {
            index,
            name,
            default_mass_properties: mass_properties,
        }
    }

    /// The world body. It is massless and never moves.
    pub(crate) fn world() -> Self {
        Self::new(BodyIndex::WORLD, "world".to_string(), MassProperties::default())
    }

    /// Index of this body.
    #[must_use]
    pub fn index(&self) -> BodyIndex {
        self.index
    }

    /// Name of this body.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mass properties used by every context of the plant.
    #[must_use]
    pub fn default_mass_properties(&self) -> &MassProperties {
        &self.default_mass_properties
    }

    /// Shorthand for the default mass.
    #[must_use]
    pub fn default_mass(&self) -> f64 {
        self.default_mass_properties.mass
    }
}
