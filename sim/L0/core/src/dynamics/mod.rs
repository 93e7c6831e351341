//! Dynamics computations: spatial algebra, inverse dynamics, CRBA.
//!
//! This module groups the core dynamics algorithms that operate on the
//! articulated rigid body tree, all generic over [`plant_types::Scalar`].

pub(crate) mod crba;
pub(crate) mod inverse;
pub(crate) mod spatial;

pub use spatial::SpatialVector;
pub(crate) use spatial::{spatial_cross_motion, velocity_about_origin};
