//! Penalty-method contact forces for the multibody plant.
//!
//! Contact between rigid geometries is modeled as a stiff spring-damper
//! acting along the contact normal, so overlapping bodies are pushed apart by
//! a force that grows with penetration depth:
//!
//! ```text
//! fₙ = k · x · (1 + d · ẋ)
//! ```
//!
//! Where:
//! - `x` = penetration depth (positive when overlapping)
//! - `ẋ` = penetration rate (positive when approaching)
//! - `k` = stiffness (N/m)
//! - `d` = dissipation (s/m)
//!
//! There is no friction; the force is purely normal. `k` and `d` are
//! estimated from a penetration allowance, see [`PenaltyParameters`].
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector3;
//! use plant_contact::{BodyKinematics, PenaltyContactModel, PenaltyParameters, PenetrationPair};
//! use plant_types::{GeometryId, SpatialVelocity};
//!
//! let params = PenaltyParameters::from_penetration_allowance(1.0, 9.81, 1e-3).unwrap();
//! let model = PenaltyContactModel::new(params);
//!
//! // A sphere (A) sunk 1 mm into the ground (B).
//! let pair = PenetrationPair {
//!     id_a: GeometryId::new(1),
//!     id_b: GeometryId::new(2),
//!     p_wca: Vector3::new(0.0, 0.0, -0.001),
//!     p_wcb: Vector3::zeros(),
//!     nhat_ba_w: Vector3::z(),
//!     depth: 0.001,
//! };
//! let ball = BodyKinematics::new(Vector3::new(0.0, 0.0, 0.099), SpatialVelocity::zero());
//! let ground = BodyKinematics::new(Vector3::zeros(), SpatialVelocity::zero());
//!
//! let force = model.compute_pair_force(&pair, &ball, &ground).unwrap();
//! // At the allowance the spring exactly carries the weight.
//! assert!((force.normal_force - 9.81).abs() < 1e-9);
//! ```
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate: math and error handling only, no rendering or
//! engine dependencies.

#![doc(html_root_url = "https://docs.rs/plant-contact/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod model;
mod params;
mod penetration;

pub use model::{BodyKinematics, PairContactForce, PenaltyContactModel};
pub use params::{CRITICAL_DAMPING_RATIO, PenaltyParameters};
pub use penetration::PenetrationPair;
