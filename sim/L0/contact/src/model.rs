//! The penalty normal-force law.
//!
//! For a pair with depth `x`, normal `n̂` (from `B` toward `A`) and contact
//! point `C`:
//!
//! ```text
//! vₙ = (v_WBc − v_WAc) · n̂        penetration rate ẋ, > 0 while approaching
//! fₙ = k · x · (1 + d · vₙ)
//! F_AC = [0; fₙ n̂]                applied on A at C, −F_AC on B
//! ```
//!
//! A non-positive `fₙ` means the bodies separate fast enough that the
//! damping term would pull them together; no force is applied then.

use nalgebra::Vector3;
use plant_types::{SpatialForce, SpatialVelocity};
use tracing::trace;

use crate::params::PenaltyParameters;
use crate::penetration::PenetrationPair;

/// World-frame pose origin and spatial velocity of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyKinematics {
    /// Position of the body origin `p_WBo`.
    pub p_wo: Vector3<f64>,
    /// Spatial velocity of the body measured at its origin.
    pub velocity: SpatialVelocity<f64>,
}

impl BodyKinematics {
    /// A body at `p_wo` with velocity `velocity`.
    #[must_use]
    pub fn new(p_wo: Vector3<f64>, velocity: SpatialVelocity<f64>) -> Self {
        Self { p_wo, velocity }
    }

    /// Velocity of the material point of this body at `p_wq`.
    #[must_use]
    pub fn point_velocity(&self, p_wq: &Vector3<f64>) -> Vector3<f64> {
        self.velocity.shift(&(p_wq - self.p_wo)).translational
    }
}

/// Contact force produced by one penetration pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairContactForce {
    /// Contact point `C` in world.
    pub p_wc: Vector3<f64>,
    /// Normal force magnitude.
    pub normal_force: f64,
    /// Penetration rate `vₙ` used in the damping term.
    pub penetration_rate: f64,
    /// Spatial force on `A` applied at `C`.
    pub f_ac_w: SpatialForce<f64>,
}

impl PairContactForce {
    /// The force on body `A`, referred to its origin `p_wao`.
    #[must_use]
    pub fn on_body_a(&self, p_wao: &Vector3<f64>) -> SpatialForce<f64> {
        self.f_ac_w.shift(&(p_wao - self.p_wc))
    }

    /// The reaction on body `B`, referred to its origin `p_wbo`.
    #[must_use]
    pub fn on_body_b(&self, p_wbo: &Vector3<f64>) -> SpatialForce<f64> {
        (-self.f_ac_w).shift(&(p_wbo - self.p_wc))
    }
}

/// Penalty contact model with fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyContactModel {
    params: PenaltyParameters,
}

impl PenaltyContactModel {
    /// Create a model with the given parameters.
    #[must_use]
    pub fn new(params: PenaltyParameters) -> Self {
        Self { params }
    }

    /// The parameters in use.
    #[must_use]
    pub fn params(&self) -> &PenaltyParameters {
        &self.params
    }

    /// Normal force for a pair, or `None` when the law yields no push.
    #[must_use]
    pub fn compute_pair_force(
        &self,
        pair: &PenetrationPair,
        body_a: &BodyKinematics,
        body_b: &BodyKinematics,
    ) -> Option<PairContactForce> {
        let x = pair.depth;
        let nhat = pair.nhat_ba_w;
        let p_wc = pair.contact_point();

        let v_wac = body_a.point_velocity(&p_wc);
        let v_wbc = body_b.point_velocity(&p_wc);
        let vn = (v_wbc - v_wac).dot(&nhat);

        let k = self.params.stiffness;
        let d = self.params.damping;
        let fn_ = k * x * (1.0 + d * vn);
        if fn_ <= 0.0 {
            trace!(
                id_a = %pair.id_a,
                id_b = %pair.id_b,
                vn,
                "penalty force non-positive, pair skipped"
            );
            return None;
        }

        trace!(id_a = %pair.id_a, id_b = %pair.id_b, fn_, x, vn, "penalty contact force");
        Some(PairContactForce {
            p_wc,
            normal_force: fn_,
            penetration_rate: vn,
            f_ac_w: SpatialForce::new(Vector3::zeros(), nhat * fn_),
        })
    }
}
