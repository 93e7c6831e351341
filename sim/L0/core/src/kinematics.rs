//! Position and velocity kinematics caches.
//!
//! The caches are plain values owned by the caller. A cache is only
//! meaningful for the state that produced it; the plant recomputes both in
//! full on every evaluation.

use nalgebra::{Matrix3, SMatrix, Vector3};
use plant_types::{BodyIndex, RigidTransform, Scalar, SpatialVelocity};

use crate::dynamics::{SpatialVector, velocity_about_origin};
use crate::multibody::{Joint, JointType, MultibodyTree};

/// Pose `X_WB` of every body, indexed by [`BodyIndex`].
#[derive(Debug, Clone, PartialEq)]
pub struct PositionKinematicsCache<T: Scalar> {
    x_wb: Vec<RigidTransform<T>>,
}

impl<T: Scalar> PositionKinematicsCache<T> {
    /// A cache for `num_bodies` bodies with every pose at identity.
    #[must_use]
    pub fn new(num_bodies: usize) -> Self {
        Self {
            x_wb: vec![RigidTransform::identity(); num_bodies],
        }
    }

    /// Pose of `body` in world.
    ///
    /// # Panics
    ///
    /// Panics if `body` is out of range for this cache.
    #[must_use]
    pub fn get_x_wb(&self, body: BodyIndex) -> &RigidTransform<T> {
        &self.x_wb[body.index()]
    }

    /// Position of `body`'s origin in world.
    #[must_use]
    pub fn get_p_wbo(&self, body: BodyIndex) -> &Vector3<T> {
        &self.x_wb[body.index()].translation
    }

    /// All poses.
    #[must_use]
    pub fn x_wb(&self) -> &[RigidTransform<T>] {
        &self.x_wb
    }

    /// Number of bodies.
    #[must_use]
    pub fn num_bodies(&self) -> usize {
        self.x_wb.len()
    }
}

/// Spatial velocity `V_WB` of every body, measured at the body origin and
/// expressed in world.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityKinematicsCache<T: Scalar> {
    v_wb: Vec<SpatialVelocity<T>>,
}

impl<T: Scalar> VelocityKinematicsCache<T> {
    /// A cache for `num_bodies` bodies at rest.
    #[must_use]
    pub fn new(num_bodies: usize) -> Self {
        Self {
            v_wb: vec![SpatialVelocity::zero(); num_bodies],
        }
    }

    /// Velocity of `body`.
    ///
    /// # Panics
    ///
    /// Panics if `body` is out of range for this cache.
    #[must_use]
    pub fn get_v_wb(&self, body: BodyIndex) -> &SpatialVelocity<T> {
        &self.v_wb[body.index()]
    }

    /// All velocities.
    #[must_use]
    pub fn v_wb(&self) -> &[SpatialVelocity<T>] {
        &self.v_wb
    }

    /// Number of bodies.
    #[must_use]
    pub fn num_bodies(&self) -> usize {
        self.v_wb.len()
    }
}

/// Orientation of a joint's fixed frame in world, `R_WF = R_WP · R_PF`.
fn r_wf<T: Scalar>(joint: &Joint, pc: &PositionKinematicsCache<T>) -> Matrix3<T> {
    pc.get_x_wb(joint.parent()).rotation * joint.x_pf().rotation.map(T::from_f64)
}

/// Recompute every body pose from `q`: `X_WB = X_WP · X_PF · X_FM(q)`.
pub(crate) fn calc_position_kinematics<T: Scalar>(
    tree: &MultibodyTree,
    q: &[T],
    pc: &mut PositionKinematicsCache<T>,
) {
    pc.x_wb.clear();
    pc.x_wb
        .resize(tree.num_bodies(), RigidTransform::identity());

    for &body in tree.topological_order().iter().skip(1) {
        let Some(joint) = tree.inboard_joint(body) else {
            continue;
        };
        let x_wp = pc.x_wb[joint.parent().index()];
        let x_fm = joint.x_fm(joint.positions(q));
        pc.x_wb[body.index()] = x_wp * joint.x_pf().cast::<T>() * x_fm;
    }
}

/// Recompute every body velocity from `v`, parents first:
/// `V_WB = V_WP` shifted to `Bo`, plus the joint's own contribution.
pub(crate) fn calc_velocity_kinematics<T: Scalar>(
    tree: &MultibodyTree,
    v: &[T],
    pc: &PositionKinematicsCache<T>,
    vc: &mut VelocityKinematicsCache<T>,
) {
    vc.v_wb.clear();
    vc.v_wb.resize(tree.num_bodies(), SpatialVelocity::zero());

    for &body in tree.topological_order().iter().skip(1) {
        let Some(joint) = tree.inboard_joint(body) else {
            continue;
        };
        let parent = joint.parent();
        let p_pobo_w = pc.get_p_wbo(body) - pc.get_p_wbo(parent);
        let v_wpb = vc.v_wb[parent.index()].shift(&p_pobo_w);
        let v_fm = joint_velocity_in_world(joint, pc, joint.velocities(v));
        vc.v_wb[body.index()] = v_wpb + v_fm;
    }
}

/// Velocity of the moving frame relative to the fixed frame, `V_FM`, at
/// the child origin and expressed in world.
fn joint_velocity_in_world<T: Scalar>(
    joint: &Joint,
    pc: &PositionKinematicsCache<T>,
    v: &[T],
) -> SpatialVelocity<T> {
    match joint.joint_type() {
        JointType::Fixed => SpatialVelocity::zero(),
        // The rotation axis passes through the child origin, so the origin
        // itself does not move.
        JointType::Revolute { axis } => {
            let a_w = r_wf(joint, pc) * axis.map(T::from_f64);
            SpatialVelocity::new(a_w * v[0], Vector3::zeros())
        }
        JointType::Prismatic { axis } => {
            let a_w = r_wf(joint, pc) * axis.map(T::from_f64);
            SpatialVelocity::new(Vector3::zeros(), a_w * v[0])
        }
        JointType::Free => {
            let r = r_wf(joint, pc);
            SpatialVelocity::new(
                r * Vector3::new(v[0], v[1], v[2]),
                r * Vector3::new(v[3], v[4], v[5]),
            )
        }
    }
}

/// Compute the joint motion subspace matrix S (6 x nv), about the world
/// origin and expressed in world.
///
/// S maps joint velocity to the change it makes in the child's spatial
/// velocity: `ΔV = S * v_joint`. Only the first `nv` columns are meaningful.
///
/// Format: rows 0-2 = angular velocity, rows 3-5 = linear velocity
pub(crate) fn joint_motion_subspace<T: Scalar>(
    joint: &Joint,
    pc: &PositionKinematicsCache<T>,
) -> SMatrix<T, 6, 6> {
    let mut s = SMatrix::<T, 6, 6>::zeros();
    let p = pc.get_p_wbo(joint.child());

    let mut set = |col: usize, ang: Vector3<T>, lin: Vector3<T>| {
        for i in 0..3 {
            s[(i, col)] = ang[i];
            s[(3 + i, col)] = lin[i];
        }
    };

    match joint.joint_type() {
        JointType::Fixed => {}
        JointType::Revolute { axis } => {
            // S = [a; p × a] with the axis through the child origin p
            let a_w = r_wf(joint, pc) * axis.map(T::from_f64);
            set(0, a_w, p.cross(&a_w));
        }
        JointType::Prismatic { axis } => {
            // S = [0; a]
            let a_w = r_wf(joint, pc) * axis.map(T::from_f64);
            set(0, Vector3::zeros(), a_w);
        }
        JointType::Free => {
            let r = r_wf(joint, pc);
            for k in 0..3 {
                let e = r.column(k).into_owned();
                set(k, e, p.cross(&e));
                set(3 + k, Vector3::zeros(), e);
            }
        }
    }
    s
}

/// Velocity-product acceleration term `Ṡ v_joint` about the world origin.
///
/// `v_o` is the child's velocity about the origin and `s_v` is `S v_joint`.
pub(crate) fn joint_bias_acceleration<T: Scalar>(
    joint: &Joint,
    v_wb: &SpatialVelocity<T>,
    v_o: &SpatialVector<T>,
    s_v: &SpatialVector<T>,
) -> SpatialVector<T> {
    match joint.joint_type() {
        JointType::Fixed => SpatialVector::zeros(),
        // S is rigidly attached to the child: Ṡ = V × S.
        JointType::Revolute { .. } | JointType::Prismatic { .. } => {
            crate::dynamics::spatial_cross_motion(v_o, s_v)
        }
        // The free joint's S is fixed in the world except for its p × e
        // columns, whose rate gives [0; v_Bo × ω].
        JointType::Free => {
            let lin = v_wb.translational.cross(&v_wb.rotational);
            SpatialVector::new(T::zero(), T::zero(), T::zero(), lin.x, lin.y, lin.z)
        }
    }
}

/// Velocity of every body about the world origin.
pub(crate) fn velocities_about_origin<T: Scalar>(
    pc: &PositionKinematicsCache<T>,
    vc: &VelocityKinematicsCache<T>,
) -> Vec<SpatialVector<T>> {
    vc.v_wb
        .iter()
        .zip(&pc.x_wb)
        .map(|(v, x)| velocity_about_origin(v, &x.translation))
        .collect()
}
