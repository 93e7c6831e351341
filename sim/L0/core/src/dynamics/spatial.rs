//! Spatial algebra utilities for 6D motion and force vectors.
//!
//! Implements Featherstone's spatial vector algebra used by the inverse
//! dynamics and composite-body routines. Every vector here is expressed in
//! world and measured about the world origin `O`, so quantities of different
//! bodies add directly without shifting. Functions here are pure math and
//! generic over [`Scalar`].

use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};
use plant_types::{Scalar, SpatialForce, SpatialVelocity};

/// 6D spatial vector: [angular (3), linear (3)].
///
/// Following Featherstone's convention:
/// - Motion vectors: [ω, v] (angular velocity, linear velocity)
/// - Force vectors: [τ, f] (torque, force)
pub type SpatialVector<T> = Vector6<T>;

#[inline]
fn angular<T: Scalar>(v: &SpatialVector<T>) -> Vector3<T> {
    Vector3::new(v[0], v[1], v[2])
}

#[inline]
fn linear<T: Scalar>(v: &SpatialVector<T>) -> Vector3<T> {
    Vector3::new(v[3], v[4], v[5])
}

#[inline]
fn stack<T: Scalar>(ang: &Vector3<T>, lin: &Vector3<T>) -> SpatialVector<T> {
    SpatialVector::new(ang.x, ang.y, ang.z, lin.x, lin.y, lin.z)
}

/// Spatial cross product for motion vectors: v × s.
#[inline]
#[must_use]
pub fn spatial_cross_motion<T: Scalar>(v: &SpatialVector<T>, s: &SpatialVector<T>) -> SpatialVector<T> {
    let w = angular(v);
    let v_lin = linear(v);
    let s_ang = angular(s);
    let s_lin = linear(s);

    stack(
        &w.cross(&s_ang),
        &(w.cross(&s_lin) + v_lin.cross(&s_ang)),
    )
}

/// Spatial cross product for force vectors: v ×* f.
#[inline]
#[must_use]
pub fn spatial_cross_force<T: Scalar>(v: &SpatialVector<T>, f: &SpatialVector<T>) -> SpatialVector<T> {
    let w = angular(v);
    let v_lin = linear(v);
    let f_ang = angular(f);
    let f_lin = linear(f);

    stack(
        &(w.cross(&f_ang) + v_lin.cross(&f_lin)),
        &w.cross(&f_lin),
    )
}

/// Body velocity measured at the world origin.
///
/// `V_WB` is measured at the body origin `Bo`; the velocity of the body-fixed
/// point instantaneously at `O` is `v_Bo + ω × (O − Bo) = v_Bo + p_WBo × ω`.
#[must_use]
pub fn velocity_about_origin<T: Scalar>(
    v_wb: &SpatialVelocity<T>,
    p_wbo: &Vector3<T>,
) -> SpatialVector<T> {
    let w = &v_wb.rotational;
    stack(w, &(v_wb.translational + p_wbo.cross(w)))
}

/// A spatial force measured at the body origin, referred to the world origin.
#[must_use]
pub fn force_about_origin<T: Scalar>(f_bo: &SpatialForce<T>, p_wbo: &Vector3<T>) -> SpatialVector<T> {
    f_bo.shift(&-p_wbo).to_vector()
}

/// Compute body spatial inertia about the world origin.
///
/// This builds the 6×6 spatial inertia matrix from:
/// - `mass`: body mass
/// - `i_com`: rotational inertia about the COM, expressed in world
/// - `h`: COM position measured from the world origin
///
/// The spatial inertia has the form:
/// ```text
/// I = [I_com + m*(h·h*I - h⊗h),  m*[h]×  ]
///     [m*[h]×ᵀ,                  m*I_3×3 ]
/// ```
#[must_use]
pub fn compute_body_spatial_inertia<T: Scalar>(
    mass: T,
    i_com: &Matrix3<T>,
    h: &Vector3<T>,
) -> Matrix6<T> {
    let mut crb = Matrix6::zeros();

    // Upper-left 3x3: rotational inertia about the origin (parallel axis theorem)
    let h_dot_h = h.dot(h);
    for row in 0..3 {
        for col in 0..3 {
            let mut parallel = -(h[row] * h[col]);
            if row == col {
                parallel += h_dot_h;
            }
            crb[(row, col)] = i_com[(row, col)] + mass * parallel;
        }
    }

    // Lower-right 3x3: translational inertia (diagonal mass matrix)
    crb[(3, 3)] = mass;
    crb[(4, 4)] = mass;
    crb[(5, 5)] = mass;

    // Off-diagonal: coupling (skew-symmetric of m*h)
    let mh_x = mass * h.x;
    let mh_y = mass * h.y;
    let mh_z = mass * h.z;
    crb[(0, 4)] = -mh_z;
    crb[(0, 5)] = mh_y;
    crb[(1, 3)] = mh_z;
    crb[(1, 5)] = -mh_x;
    crb[(2, 3)] = -mh_y;
    crb[(2, 4)] = mh_x;
    // Transpose for lower-left
    crb[(4, 0)] = -mh_z;
    crb[(5, 0)] = mh_y;
    crb[(3, 1)] = mh_z;
    crb[(5, 1)] = -mh_x;
    crb[(3, 2)] = -mh_y;
    crb[(4, 2)] = mh_x;

    crb
}
