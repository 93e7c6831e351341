//! Penalty contact parameters.
//!
//! The normal force between two penetrating bodies follows
//!
//! ```text
//! f_n = k · x · (1 + d · ẋ)
//! ```
//!
//! which is a spring-mass-damper `m ẍ + (k d x) ẋ + k x = m g`. The
//! parameters are estimated from a single length, the *penetration
//! allowance*: the depth the heaviest body should settle at under its own
//! weight, with critical damping.

use plant_types::PlantError;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Damping ratio used by [`PenaltyParameters::from_penetration_allowance`].
pub const CRITICAL_DAMPING_RATIO: f64 = 1.0;

/// Stiffness and dissipation of the penalty contact law.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PenaltyParameters {
    /// Penalty stiffness `k` (N/m).
    pub stiffness: f64,
    /// Dissipation `d` (s/m). Multiplies the penetration rate.
    pub damping: f64,
    /// Natural time scale of the contact oscillator (s).
    pub time_scale: f64,
}

impl PenaltyParameters {
    /// Estimate parameters from a penetration allowance.
    ///
    /// `mass` is the reference mass (the plant uses its heaviest body),
    /// `gravity` the gravity magnitude and `allowance` the target static
    /// penetration depth.
    ///
    /// ```text
    /// k = m g / a,  ω = sqrt(k / m),  t = 1 / ω,  d = ζ t / a
    /// ```
    pub fn from_penetration_allowance(
        mass: f64,
        gravity: f64,
        allowance: f64,
    ) -> plant_types::Result<Self> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(PlantError::invalid_argument(format!(
                "penalty parameters need a positive reference mass, got {mass}"
            )));
        }
        if !(allowance > 0.0 && allowance.is_finite()) {
            return Err(PlantError::invalid_argument(format!(
                "penetration allowance must be positive, got {allowance}"
            )));
        }
        // TODO: estimate from free bodies only and account for expected
        // impact velocities instead of the heaviest body at rest.
        let stiffness = mass * gravity / allowance;
        let omega = (stiffness / mass).sqrt();
        let time_scale = 1.0 / omega;
        let damping = CRITICAL_DAMPING_RATIO * time_scale / allowance;

        debug!(
            stiffness,
            damping, time_scale, mass, gravity, allowance, "derived penalty contact parameters"
        );

        Ok(Self {
            stiffness,
            damping,
            time_scale,
        })
    }

    /// Explicit stiffness and damping. The time scale is derived from the
    /// reference mass when it is positive, and left infinite otherwise.
    pub fn explicit(stiffness: f64, damping: f64, mass: f64) -> plant_types::Result<Self> {
        if !(stiffness > 0.0 && stiffness.is_finite()) {
            return Err(PlantError::invalid_argument(format!(
                "penalty stiffness must be positive, got {stiffness}"
            )));
        }
        if !(damping >= 0.0 && damping.is_finite()) {
            return Err(PlantError::invalid_argument(format!(
                "penalty damping cannot be negative, got {damping}"
            )));
        }
        let time_scale = if mass > 0.0 {
            (mass / stiffness).sqrt()
        } else {
            f64::INFINITY
        };
        Ok(Self {
            stiffness,
            damping,
            time_scale,
        })
    }
}
