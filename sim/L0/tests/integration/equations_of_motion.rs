//! Equations of motion against closed-form mechanics.
//!
//! The two-link arm is a planar double pendulum with point masses, so its
//! mass matrix, Coriolis terms and gravity torques are known exactly.

use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector, Vector3};
use plant_conformance_tests::{ArmParams, free_body, two_link_arm, two_link_arm_with_config};
use plant_core::{MultibodyForces, PositionKinematicsCache, VelocityKinematicsCache};
use plant_types::{Gravity, MassMatrixAlgorithm, PlantConfig, STANDARD_GRAVITY};

// ============================================================================
// Closed forms
// ============================================================================

fn arm_mass_matrix(p: &ArmParams, q: &[f64; 2]) -> DMatrix<f64> {
    let c2 = q[1].cos();
    let m11 = p.m1 * p.l1 * p.l1 + p.m2 * (p.l1 * p.l1 + p.l2 * p.l2 + 2.0 * p.l1 * p.l2 * c2);
    let m12 = p.m2 * (p.l2 * p.l2 + p.l1 * p.l2 * c2);
    let m22 = p.m2 * p.l2 * p.l2;
    DMatrix::from_row_slice(2, 2, &[m11, m12, m12, m22])
}

/// `C(q, v) v`.
fn arm_velocity_terms(p: &ArmParams, q: &[f64; 2], v: &[f64; 2]) -> DVector<f64> {
    let h = p.m2 * p.l1 * p.l2 * q[1].sin();
    DVector::from_vec(vec![
        -h * (2.0 * v[0] * v[1] + v[1] * v[1]),
        h * v[0] * v[0],
    ])
}

/// `∂V/∂q` with both links hanging along -z at `q = 0`.
fn arm_gravity_gradient(p: &ArmParams, q: &[f64; 2]) -> DVector<f64> {
    let g = STANDARD_GRAVITY;
    let (s1, s12) = (q[0].sin(), (q[0] + q[1]).sin());
    DVector::from_vec(vec![
        g * (p.m1 * p.l1 * s1 + p.m2 * (p.l1 * s1 + p.l2 * s12)),
        g * p.m2 * p.l2 * s12,
    ])
}

const STATES: [([f64; 2], [f64; 2]); 4] = [
    ([0.0, 0.0], [0.0, 0.0]),
    ([0.4, -0.9], [0.0, 0.0]),
    ([1.2, 0.5], [0.8, -1.5]),
    ([-2.1, 2.7], [-3.0, 0.4]),
];

// ============================================================================
// Mass matrix
// ============================================================================

/// Test: both mass matrix algorithms match the closed form and each other.
#[test]
fn mass_matrix_algorithms_agree() {
    let p = ArmParams::default();
    let config = |algorithm| PlantConfig::default().mass_matrix(algorithm);
    let by_id = two_link_arm_with_config(p, config(MassMatrixAlgorithm::InverseDynamics)).unwrap();
    let by_crba = two_link_arm_with_config(p, config(MassMatrixAlgorithm::CompositeRigidBody)).unwrap();

    for (q, _) in STATES {
        let mut ctx = by_id.create_default_context().unwrap();
        ctx.set_positions(&q).unwrap();
        let m_id = by_id.calc_mass_matrix(&ctx).unwrap();
        let m_crba = by_crba.calc_mass_matrix(&ctx).unwrap();

        assert_relative_eq!(m_id, arm_mass_matrix(&p, &q), epsilon = 1e-12);
        assert_relative_eq!(m_crba, m_id, epsilon = 1e-12);
        assert_relative_eq!(m_id.clone(), m_id.transpose(), epsilon = 1e-14);
        assert!(m_id.cholesky().is_some(), "mass matrix not positive definite at {q:?}");
    }
}

// ============================================================================
// Inverse dynamics
// ============================================================================

/// Test: with no applied forces, inverse dynamics is `M v̇ + C v`.
#[test]
fn inverse_dynamics_matches_closed_form() {
    let p = ArmParams::default();
    let plant = two_link_arm(p).unwrap();
    let nb = plant.num_bodies();
    let vdot = DVector::from_vec(vec![0.7, -1.9]);

    for (q, v) in STATES {
        let mut ctx = plant.create_default_context().unwrap();
        ctx.set_positions(&q).unwrap();
        ctx.set_velocities(&v).unwrap();
        let mut pc = PositionKinematicsCache::new(nb);
        let mut vc = VelocityKinematicsCache::new(nb);
        plant.eval_position_kinematics(&ctx, &mut pc).unwrap();
        plant.eval_velocity_kinematics(&ctx, &pc, &mut vc).unwrap();

        let forces = MultibodyForces::zeros(nb, 2);
        let tau = plant.calc_inverse_dynamics(&ctx, &pc, &vc, &vdot, &forces).unwrap();
        let expected = arm_mass_matrix(&p, &q) * &vdot + arm_velocity_terms(&p, &q, &v);
        assert_relative_eq!(tau, expected, epsilon = 1e-10);

        // Generalized forces are subtracted one for one.
        let mut applied = MultibodyForces::zeros(nb, 2);
        applied.generalized = DVector::from_vec(vec![1.5, -0.25]);
        let tau_applied = plant.calc_inverse_dynamics(&ctx, &pc, &vc, &vdot, &applied).unwrap();
        assert_relative_eq!(tau_applied, expected - &applied.generalized, epsilon = 1e-10);
    }
}

// ============================================================================
// Forward dynamics
// ============================================================================

/// Test: `M v̇ + C v + ∂V/∂q = Bu` for the arm, end to end through the
/// actuation input and gravity field.
#[test]
fn arm_time_derivatives_satisfy_equations_of_motion() {
    let p = ArmParams::default();
    let plant = two_link_arm(p).unwrap();

    for (q, v) in STATES {
        for u in [0.0, 3.5] {
            let mut ctx = plant.create_default_context().unwrap();
            ctx.set_positions(&q).unwrap();
            ctx.set_velocities(&v).unwrap();
            ctx.fix_actuation_input(DVector::from_vec(vec![u]));

            let xdot = plant.calc_time_derivatives(&ctx).unwrap();
            assert_eq!(xdot.len(), 4);
            // Revolute joints: q̇ = v.
            assert_relative_eq!(xdot[0], v[0]);
            assert_relative_eq!(xdot[1], v[1]);

            let vdot = xdot.rows(2, 2).into_owned();
            let lhs = arm_mass_matrix(&p, &q) * vdot
                + arm_velocity_terms(&p, &q, &v)
                + arm_gravity_gradient(&p, &q);
            assert_relative_eq!(lhs, DVector::from_vec(vec![u, 0.0]), epsilon = 1e-9);
        }
    }
}

/// Test: a hanging arm at rest stays at rest; holding it level takes the
/// full gravity torque at the shoulder.
#[test]
fn arm_equilibria() {
    let p = ArmParams::default();
    let plant = two_link_arm(p).unwrap();
    let mut ctx = plant.create_default_context().unwrap();
    ctx.fix_actuation_input(DVector::from_vec(vec![0.0]));
    let xdot = plant.calc_time_derivatives(&ctx).unwrap();
    assert_relative_eq!(xdot, DVector::zeros(4), epsilon = 1e-14);

    // Level along -x the shoulder torque carries the whole arm; the elbow
    // is unsupported and still falls.
    let q = [std::f64::consts::FRAC_PI_2, 0.0];
    ctx.set_positions(&q).unwrap();
    let hold = STANDARD_GRAVITY * (p.m1 * p.l1 + p.m2 * (p.l1 + p.l2));
    ctx.fix_actuation_input(DVector::from_vec(vec![hold]));
    let xdot = plant.calc_time_derivatives(&ctx).unwrap();
    let lhs = arm_mass_matrix(&p, &q) * xdot.rows(2, 2).into_owned() + arm_gravity_gradient(&p, &q);
    assert_relative_eq!(lhs, DVector::from_vec(vec![hold, 0.0]), epsilon = 1e-9);
}

/// Test: a free sphere falls at `g` whatever its spin, and its quaternion
/// rate follows the angular velocity.
#[test]
fn free_fall() {
    let plant = free_body(1.5, 0.2, Gravity::earth()).unwrap();
    assert_eq!((plant.num_positions(), plant.num_velocities()), (7, 6));

    let mut ctx = plant.create_default_context().unwrap();
    let omega = Vector3::new(0.3, -2.0, 1.1);
    let lin = Vector3::new(1.0, 0.0, 4.0);
    ctx.set_positions(&[1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0]).unwrap();
    ctx.set_velocities(&[omega.x, omega.y, omega.z, lin.x, lin.y, lin.z]).unwrap();

    let xdot = plant.calc_time_derivatives(&ctx).unwrap();
    let qdot = xdot.rows(0, 7).into_owned();
    let expected_qdot = DVector::from_vec(vec![
        0.0,
        0.5 * omega.x,
        0.5 * omega.y,
        0.5 * omega.z,
        lin.x,
        lin.y,
        lin.z,
    ]);
    assert_relative_eq!(qdot, expected_qdot, epsilon = 1e-14);

    let vdot = xdot.rows(7, 6).into_owned();
    let expected_vdot = DVector::from_vec(vec![0.0, 0.0, 0.0, 0.0, 0.0, -STANDARD_GRAVITY]);
    assert_relative_eq!(vdot, expected_vdot, epsilon = 1e-12);
}

/// Test: without gravity a free body moves at constant velocity.
#[test]
fn zero_gravity_is_inertial() {
    let plant = free_body(1.0, 0.1, Gravity::zero()).unwrap();
    let mut ctx = plant.create_default_context().unwrap();
    ctx.set_velocities(&[0.0, 0.0, 0.0, 0.5, -0.5, 2.0]).unwrap();
    let xdot = plant.calc_time_derivatives(&ctx).unwrap();
    assert_relative_eq!(xdot.rows(7, 6).into_owned(), DVector::zeros(6), epsilon = 1e-14);
}

/// Test: `q̇ = N(q) v` and its left inverse round-trip at a rotated pose.
#[test]
fn velocity_qdot_round_trip() {
    let plant = free_body(1.0, 0.1, Gravity::earth()).unwrap();
    let mut ctx = plant.create_default_context().unwrap();
    let half = 0.35_f64;
    let axis = Vector3::new(1.0, 2.0, -2.0).normalize() * half.sin();
    ctx.set_positions(&[half.cos(), axis.x, axis.y, axis.z, 0.1, 0.2, 0.3]).unwrap();

    let v = DVector::from_vec(vec![0.4, -1.0, 2.5, 3.0, -0.2, 0.7]);
    let qdot = plant.map_velocity_to_qdot(&ctx, &v).unwrap();
    assert_eq!(qdot.len(), 7);
    let back = plant.map_qdot_to_velocity(&ctx, &qdot).unwrap();
    assert_relative_eq!(back, v, epsilon = 1e-12);

    // The quaternion rate is tangent to the unit sphere.
    let q = ctx.positions();
    let radial: f64 = (0..4).map(|i| q[i] * qdot[i]).sum();
    assert_relative_eq!(radial, 0.0, epsilon = 1e-14);

    assert!(plant.map_velocity_to_qdot(&ctx, &DVector::zeros(7)).unwrap_err().is_invalid_argument());
    assert!(plant.map_qdot_to_velocity(&ctx, &DVector::zeros(6)).unwrap_err().is_invalid_argument());
}
