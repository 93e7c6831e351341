//! Recursive Newton-Euler inverse dynamics.
//!
//! Computes the generalized forces `τ` that realize a given generalized
//! acceleration `v̇`:
//!
//! ```text
//! τ = M(q) v̇ + C(q, v) v − τ_app − Σ J_WBᵀ F_app
//! ```
//!
//! All spatial quantities are about the world origin and expressed in world,
//! so the forward pass adds parent accelerations directly and the backward
//! pass sums child forces directly.
//!
//! Reference: Featherstone, "Rigid Body Dynamics Algorithms", Chapter 5

use nalgebra::{DVector, Matrix6};
use plant_types::Scalar;

use super::spatial::{
    SpatialVector, compute_body_spatial_inertia, force_about_origin, spatial_cross_force,
};
use crate::kinematics::{
    PositionKinematicsCache, VelocityKinematicsCache, joint_bias_acceleration,
    joint_motion_subspace, velocities_about_origin,
};
use crate::multibody::{MultibodyForces, MultibodyTree};

/// Spatial inertia of every body about the world origin, indexed by body.
pub(crate) fn body_spatial_inertias<T: Scalar>(
    tree: &MultibodyTree,
    pc: &PositionKinematicsCache<T>,
) -> Vec<Matrix6<T>> {
    tree.bodies()
        .iter()
        .zip(pc.x_wb())
        .map(|(body, x_wb)| {
            let props = body.default_mass_properties();
            let r = &x_wb.rotation;
            let i_com = r * props.inertia.map(T::from_f64) * r.transpose();
            let com_w = x_wb.transform_point(&props.center_of_mass.map(T::from_f64));
            compute_body_spatial_inertia(T::from_f64(props.mass), &i_com, &com_w)
        })
        .collect()
}

/// Inverse dynamics.
///
/// `vc = None` evaluates with all velocities zero; `forces = None` applies
/// no external forces. `vdot` must have one entry per velocity coordinate.
#[allow(clippy::many_single_char_names)]
pub(crate) fn inverse_dynamics<T: Scalar>(
    tree: &MultibodyTree,
    pc: &PositionKinematicsCache<T>,
    vc: Option<&VelocityKinematicsCache<T>>,
    vdot: &[T],
    forces: Option<&MultibodyForces<T>>,
) -> DVector<T> {
    let nb = tree.num_bodies();
    let inertias = body_spatial_inertias(tree, pc);
    let vel: Vec<SpatialVector<T>> = match vc {
        Some(vc) => velocities_about_origin(pc, vc),
        None => vec![SpatialVector::zeros(); nb],
    };

    let mut acc = vec![SpatialVector::<T>::zeros(); nb];
    let mut f = vec![SpatialVector::<T>::zeros(); nb];

    // Forward pass: a_i = a_parent + S q̈ + Ṡ q̇, then
    // f_i = I a_i + v ×* (I v) − F_app.
    for &body in tree.topological_order().iter().skip(1) {
        let Some(joint) = tree.inboard_joint(body) else {
            continue;
        };
        let b = body.index();
        let parent = joint.parent().index();
        let s = joint_motion_subspace(joint, pc);

        let mut a = acc[parent];
        for (k, &qdd) in joint.velocities(vdot).iter().enumerate() {
            a += s.column(k) * qdd;
        }
        if let Some(vc) = vc {
            let s_v = vel[b] - vel[parent];
            a += joint_bias_acceleration(joint, vc.get_v_wb(body), &vel[b], &s_v);
        }
        acc[b] = a;

        let inertia = &inertias[b];
        let mut fb = inertia * a + spatial_cross_force(&vel[b], &(inertia * vel[b]));
        if let Some(forces) = forces {
            fb -= force_about_origin(&forces.body_forces[b], pc.get_p_wbo(body));
        }
        f[b] = fb;
    }

    // Backward pass: project onto the joint, then accumulate into the parent.
    let mut tau = DVector::zeros(tree.num_velocities());
    for &body in tree.topological_order().iter().skip(1).rev() {
        let Some(joint) = tree.inboard_joint(body) else {
            continue;
        };
        let b = body.index();
        let s = joint_motion_subspace(joint, pc);
        for k in 0..joint.nv() {
            let dof = joint.v_start() + k;
            let mut tau_k = s.column(k).dot(&f[b]);
            if let Some(forces) = forces {
                tau_k -= forces.generalized[dof];
            }
            tau[dof] = tau_k;
        }
        let fb = f[b];
        f[joint.parent().index()] += fb;
    }
    tau
}
