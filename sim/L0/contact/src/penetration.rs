//! Penetration data reported by a geometry engine.

use nalgebra::Vector3;
use plant_types::GeometryId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One pair of overlapping geometries.
///
/// The normal points from `B` into `A`; moving `A` along it by `depth`
/// separates the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PenetrationPair {
    /// First geometry.
    pub id_a: GeometryId,
    /// Second geometry.
    pub id_b: GeometryId,
    /// Witness point on `A`'s surface deepest inside `B`, in world.
    pub p_wca: Vector3<f64>,
    /// Witness point on `B`'s surface deepest inside `A`, in world.
    pub p_wcb: Vector3<f64>,
    /// Unit contact normal from `B` toward `A`, in world.
    pub nhat_ba_w: Vector3<f64>,
    /// Penetration depth, positive while overlapping.
    pub depth: f64,
}

impl PenetrationPair {
    /// The contact point: midpoint of the two witness points.
    #[must_use]
    pub fn contact_point(&self) -> Vector3<f64> {
        (self.p_wca + self.p_wcb) * 0.5
    }
}
