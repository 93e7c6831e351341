//! Composite Rigid Body Algorithm for mass matrix computation.
//!
//! Implements CRBA (Featherstone Chapter 6) to build the joint-space mass
//! matrix from body spatial inertias. With every inertia taken about the
//! world origin, a composite inertia is a plain sum over the subtree and
//! `M_ij = S_iᵀ Ic_i S_j` for `j` on the path from `i` to the world.

use nalgebra::DMatrix;
use plant_types::Scalar;

use super::inverse::body_spatial_inertias;
use crate::kinematics::{PositionKinematicsCache, joint_motion_subspace};
use crate::multibody::MultibodyTree;

/// Composite Rigid Body Algorithm: build joint-space mass matrix from body inertias.
///
/// ## Algorithm Overview
///
/// 1. Initialize composite inertias from body spatial inertias
/// 2. Backward pass: Ic[parent] += Ic[child]
/// 3. For each joint, fill its rows of M from Ic and the motion subspaces
///    of every joint on the path to the world
///
/// Reference: Featherstone, "Rigid Body Dynamics Algorithms", Chapter 6
#[allow(clippy::many_single_char_names)]
pub(crate) fn composite_rigid_body_mass_matrix<T: Scalar>(
    tree: &MultibodyTree,
    pc: &PositionKinematicsCache<T>,
) -> DMatrix<T> {
    let nv = tree.num_velocities();
    let mut m = DMatrix::zeros(nv, nv);

    let mut composite = body_spatial_inertias(tree, pc);
    for &body in tree.topological_order().iter().skip(1).rev() {
        if let Some(joint) = tree.inboard_joint(body) {
            let ic = composite[body.index()];
            composite[joint.parent().index()] += ic;
        }
    }

    for &body in tree.topological_order().iter().skip(1) {
        let Some(joint_i) = tree.inboard_joint(body) else {
            continue;
        };
        let s_i = joint_motion_subspace(joint_i, pc);
        let ic = &composite[body.index()];

        for k in 0..joint_i.nv() {
            let row = joint_i.v_start() + k;
            let f = ic * s_i.column(k);

            // Diagonal block and everything towards the root.
            let mut current = Some(joint_i);
            while let Some(joint_j) = current {
                let s_j = joint_motion_subspace(joint_j, pc);
                for l in 0..joint_j.nv() {
                    let col = joint_j.v_start() + l;
                    let value = s_j.column(l).dot(&f);
                    m[(row, col)] = value;
                    m[(col, row)] = value;
                }
                current = tree.inboard_joint(joint_j.parent());
            }
        }
    }
    m
}
