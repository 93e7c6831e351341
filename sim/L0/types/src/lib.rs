//! Shared numeric layer and data types for the multibody plant.
//!
//! Everything above this crate is written against the [`Scalar`] trait, so
//! one implementation of kinematics and dynamics serves two purposes:
//!
//! - with `f64` it produces decimal results;
//! - with [`Dual<N>`] it produces the same results together with their exact
//!   first derivatives with respect to `N` chosen inputs.
//!
//! The crate also defines the plant-wide error type, configuration, typed
//! indices, and the scalar-generic rigid transform and spatial vector types.
//!
//! # Example
//!
//! ```
//! use nalgebra::DVector;
//! use plant_types::{autodiff_to_gradient_matrix, initialize_autodiff};
//!
//! let x = initialize_autodiff::<2>(&DVector::from_vec(vec![7.0, 9.0])).unwrap();
//! let f = DVector::from_vec(vec![x[0] * x[0] + x[1]]);
//! let jac = autodiff_to_gradient_matrix(&f);
//! assert_eq!(jac[(0, 0)], 14.0);
//! assert_eq!(jac[(0, 1)], 1.0);
//! ```
//!
//! # Layer 0
//!
//! This is a Layer 0 crate: math and error handling only, no rendering or
//! engine dependencies.

#![doc(html_root_url = "https://docs.rs/plant-types/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::many_single_char_names,    // Quaternion and dynamics formulas
)]

mod autodiff;
mod config;
mod dual;
mod error;
mod ids;
mod scalar;
mod spatial;
mod transform;

pub use autodiff::{
    DiscardGradient, autodiff_to_gradient_matrix, autodiff_to_value_matrix, cast_vector,
    initialize_autodiff, initialize_autodiff_given_gradient_matrix,
};
pub use config::{
    DEFAULT_PENETRATION_ALLOWANCE, Gravity, MassMatrixAlgorithm, PlantConfig, STANDARD_GRAVITY,
};
pub use dual::Dual;
pub use error::{Phase, PlantError};
pub use ids::{ActuatorIndex, BodyIndex, EngineId, FrameId, GeometryId, JointIndex, SourceId};
pub use scalar::{Scalar, lift};
pub use spatial::{SpatialForce, SpatialVelocity};
pub use transform::{RigidTransform, rotation_about_axis, rotation_from_quaternion, skew};

// Re-export math types for convenience
pub use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

/// Result type for plant operations.
pub type Result<T> = std::result::Result<T, PlantError>;
