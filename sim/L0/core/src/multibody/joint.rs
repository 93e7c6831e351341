//! Joints, their generalized coordinates, and joint actuators.
//!
//! A joint connects a parent body `P` to a child body `B` through two frames:
//! the fixed frame `F` (posed in `P` by `X_PF`) and the moving frame `M`,
//! which coincides with the child body frame. The joint's coordinates only
//! determine `X_FM(q)`:
//!
//! | Type      | nq | nv | `X_FM(q)`                              |
//! |-----------|----|----|----------------------------------------|
//! | Fixed     | 0  | 0  | identity                               |
//! | Revolute  | 1  | 1  | rotation by `q` about `axis`           |
//! | Prismatic | 1  | 1  | translation by `q · axis`              |
//! | Free      | 7  | 6  | quaternion `[qw qx qy qz]`, position `p` |
//!
//! Free-joint velocities are `[ω; v]`, the angular velocity of `M` and the
//! translational velocity of its origin. A free joint hangs off the world
//! and its `X_PF` may only translate, so `F` is aligned with `W` and both
//! are world-frame quantities `[ω_W; v_W]`.

use nalgebra::Vector3;
use plant_types::{
    ActuatorIndex, BodyIndex, JointIndex, PlantError, Result, RigidTransform, Scalar,
    rotation_about_axis, rotation_from_quaternion,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Type of joint and its type-specific parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointType {
    /// Weld: no relative motion.
    Fixed,
    /// Rotation about a unit axis expressed in `F` (and `M`).
    Revolute {
        /// Unit rotation axis.
        axis: Vector3<f64>,
    },
    /// Translation along a unit axis expressed in `F`.
    Prismatic {
        /// Unit translation axis.
        axis: Vector3<f64>,
    },
    /// Six degree-of-freedom floating base. Parent must be the world and
    /// `X_PF` a pure translation.
    Free,
}

impl JointType {
    /// Revolute joint about `axis` (normalized when the joint is added).
    #[must_use]
    pub fn revolute(axis: Vector3<f64>) -> Self {
        Self::Revolute { axis }
    }

    /// Prismatic joint along `axis` (normalized when the joint is added).
    #[must_use]
    pub fn prismatic(axis: Vector3<f64>) -> Self {
        Self::Prismatic { axis }
    }

    /// Number of position coordinates.
    #[must_use]
    pub const fn nq(&self) -> usize {
        match self {
            Self::Fixed => 0,
            Self::Revolute { .. } | Self::Prismatic { .. } => 1,
            Self::Free => 7,
        }
    }

    /// Number of velocity coordinates.
    #[must_use]
    pub const fn nv(&self) -> usize {
        match self {
            Self::Fixed => 0,
            Self::Revolute { .. } | Self::Prismatic { .. } => 1,
            Self::Free => 6,
        }
    }

    /// Check the axis and return the type with a unit axis.
    pub(crate) fn normalized(self) -> Result<Self> {
        let unit = |axis: Vector3<f64>| {
            let norm = axis.norm();
            if norm.is_finite() && norm > 1e-12 {
                Ok(axis / norm)
            } else {
                Err(PlantError::invalid_argument(format!(
                    "joint axis must be a non-zero finite vector, got {axis:?}"
                )))
            }
        };
        Ok(match self {
            Self::Revolute { axis } => Self::Revolute { axis: unit(axis)? },
            Self::Prismatic { axis } => Self::Prismatic { axis: unit(axis)? },
            other => other,
        })
    }
}

impl std::fmt::Display for JointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Revolute { .. } => write!(f, "revolute"),
            Self::Prismatic { .. } => write!(f, "prismatic"),
            Self::Free => write!(f, "free"),
        }
    }
}

/// A joint between a parent and a child body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Joint {
    index: JointIndex,
    name: String,
    joint_type: JointType,
    parent: BodyIndex,
    child: BodyIndex,
    x_pf: RigidTransform<f64>,
    q_start: usize,
    v_start: usize,
}

impl Joint {
    pub(crate) fn new(
        index: JointIndex,
        name: String,
        joint_type: JointType,
        parent: BodyIndex,
        x_pf: RigidTransform<f64>,
        child: BodyIndex,
    ) -> Self {
        Self {
            index,
            name,
            joint_type,
            parent,
            child,
            x_pf,
            q_start: 0,
            v_start: 0,
        }
    }

    pub(crate) fn set_offsets(&mut self, q_start: usize, v_start: usize) {
        self.q_start = q_start;
        self.v_start = v_start;
    }

    /// Index of this joint.
    #[must_use]
    pub fn index(&self) -> JointIndex {
        self.index
    }

    /// Name of this joint.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Joint type.
    #[must_use]
    pub fn joint_type(&self) -> &JointType {
        &self.joint_type
    }

    /// Inboard body.
    #[must_use]
    pub fn parent(&self) -> BodyIndex {
        self.parent
    }

    /// Outboard body.
    #[must_use]
    pub fn child(&self) -> BodyIndex {
        self.child
    }

    /// Pose of the joint's fixed frame in the parent body frame.
    #[must_use]
    pub fn x_pf(&self) -> &RigidTransform<f64> {
        &self.x_pf
    }

    /// Offset of this joint's coordinates in `q`. Valid after finalize.
    #[must_use]
    pub fn q_start(&self) -> usize {
        self.q_start
    }

    /// Offset of this joint's coordinates in `v`. Valid after finalize.
    #[must_use]
    pub fn v_start(&self) -> usize {
        self.v_start
    }

    /// Number of position coordinates.
    #[must_use]
    pub fn nq(&self) -> usize {
        self.joint_type.nq()
    }

    /// Number of velocity coordinates.
    #[must_use]
    pub fn nv(&self) -> usize {
        self.joint_type.nv()
    }

    /// This joint's slice of the full position vector.
    pub(crate) fn positions<'a, T: Scalar>(&self, q: &'a [T]) -> &'a [T] {
        &q[self.q_start..self.q_start + self.nq()]
    }

    /// This joint's slice of the full velocity vector.
    pub(crate) fn velocities<'a, T: Scalar>(&self, v: &'a [T]) -> &'a [T] {
        &v[self.v_start..self.v_start + self.nv()]
    }

    /// Default coordinates: zero, and the identity quaternion for free joints.
    pub(crate) fn write_default_positions(&self, q: &mut [f64]) {
        let q = &mut q[self.q_start..self.q_start + self.nq()];
        q.fill(0.0);
        if matches!(self.joint_type, JointType::Free) {
            q[0] = 1.0;
        }
    }

    /// `X_FM(q)` for this joint's coordinates `q`.
    pub(crate) fn x_fm<T: Scalar>(&self, q: &[T]) -> RigidTransform<T> {
        match &self.joint_type {
            JointType::Fixed => RigidTransform::identity(),
            JointType::Revolute { axis } => {
                RigidTransform::from_rotation(rotation_about_axis(axis, q[0]))
            }
            JointType::Prismatic { axis } => {
                RigidTransform::from_translation(axis.map(T::from_f64) * q[0])
            }
            JointType::Free => RigidTransform::new(
                rotation_from_quaternion(q[0], q[1], q[2], q[3]),
                Vector3::new(q[4], q[5], q[6]),
            ),
        }
    }

    /// `q̇` from `v` for this joint; `q`, `v` and `qdot` are the joint's own slices.
    pub(crate) fn map_velocity_to_qdot<T: Scalar>(&self, q: &[T], v: &[T], qdot: &mut [T]) {
        match self.joint_type {
            JointType::Fixed => {}
            JointType::Revolute { .. } | JointType::Prismatic { .. } => qdot[0] = v[0],
            JointType::Free => {
                // q̇_quat = ½ [0, ω] ⊗ quat
                let half = T::from_f64(0.5);
                let w = q[0];
                let qv = Vector3::new(q[1], q[2], q[3]);
                let omega = Vector3::new(v[0], v[1], v[2]);
                let dw = -omega.dot(&qv) * half;
                let dv = (omega * w + omega.cross(&qv)) * half;
                qdot[0] = dw;
                qdot[1] = dv.x;
                qdot[2] = dv.y;
                qdot[3] = dv.z;
                qdot[4..7].copy_from_slice(&v[3..6]);
            }
        }
    }

    /// Inverse of [`map_velocity_to_qdot`](Self::map_velocity_to_qdot) for
    /// unit quaternions.
    pub(crate) fn map_qdot_to_velocity<T: Scalar>(&self, q: &[T], qdot: &[T], v: &mut [T]) {
        match self.joint_type {
            JointType::Fixed => {}
            JointType::Revolute { .. } | JointType::Prismatic { .. } => v[0] = qdot[0],
            JointType::Free => {
                // ω = 2 · vec(q̇_quat ⊗ conj(quat))
                let two = T::from_f64(2.0);
                let w = q[0];
                let qv = Vector3::new(q[1], q[2], q[3]);
                let dw = qdot[0];
                let dqv = Vector3::new(qdot[1], qdot[2], qdot[3]);
                let omega = (dqv * w - qv * dw - dqv.cross(&qv)) * two;
                v[0] = omega.x;
                v[1] = omega.y;
                v[2] = omega.z;
                v[3..6].copy_from_slice(&qdot[4..7]);
            }
        }
    }
}

/// An actuator applying a generalized force to a single-dof joint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointActuator {
    index: ActuatorIndex,
    name: String,
    joint: JointIndex,
}

impl JointActuator {
    pub(crate) fn new(index: ActuatorIndex, name: String, joint: JointIndex) -> Self {
        Self { index, name, joint }
    }

    /// Index of this actuator; also its slot in the actuation input.
    #[must_use]
    pub fn index(&self) -> ActuatorIndex {
        self.index
    }

    /// Name of this actuator.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The actuated joint.
    #[must_use]
    pub fn joint(&self) -> JointIndex {
        self.joint
    }
}
