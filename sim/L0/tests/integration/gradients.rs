//! Exact derivatives of the dynamics through the dual-number plant.

use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector};
use plant_conformance_tests::{ArmParams, ball_on_ground, two_link_arm};
use plant_core::{MultibodyPlant, SceneGraph};
use plant_types::{DiscardGradient, Dual, autodiff_to_gradient_matrix, cast_vector};

const Q: [f64; 2] = [0.6, -1.1];
const V: [f64; 2] = [0.9, -0.4];
const U: f64 = 1.25;

/// `v̇` of the plain plant at `(q, V, U)`.
fn vdot_f64(plant: &MultibodyPlant, q: &[f64; 2]) -> DVector<f64> {
    let mut ctx = plant.create_default_context().unwrap();
    ctx.set_positions(q).unwrap();
    ctx.set_velocities(&V).unwrap();
    ctx.fix_actuation_input(DVector::from_vec(vec![U]));
    plant.calc_time_derivatives(&ctx).unwrap().rows(2, 2).into_owned()
}

/// Test: `∂v̇/∂q` from dual numbers matches central differences of the
/// plain plant.
#[test]
fn acceleration_jacobian_matches_finite_differences() {
    let plant = two_link_arm(ArmParams::default()).unwrap();
    let dual = plant.to_scalar_type::<Dual<2>>().unwrap();

    let mut ctx = dual.create_default_context().unwrap();
    let q = [Dual::variable(Q[0], 0), Dual::variable(Q[1], 1)];
    ctx.set_positions(&q).unwrap();
    ctx.set_velocities(&V.map(Dual::constant)).unwrap();
    ctx.fix_actuation_input(cast_vector(&DVector::from_vec(vec![U])));

    let xdot = dual.calc_time_derivatives(&ctx).unwrap();
    let vdot = xdot.rows(2, 2).into_owned();
    let jac = autodiff_to_gradient_matrix(&vdot);
    assert_eq!(jac.shape(), (2, 2));

    // Values agree with the plain plant exactly.
    assert_relative_eq!(vdot.discard_gradient(), vdot_f64(&plant, &Q), epsilon = 1e-12);

    let h = 1e-6;
    let mut fd = DMatrix::zeros(2, 2);
    for j in 0..2 {
        let (mut plus, mut minus) = (Q, Q);
        plus[j] += h;
        minus[j] -= h;
        let column = (vdot_f64(&plant, &plus) - vdot_f64(&plant, &minus)) / (2.0 * h);
        fd.set_column(j, &column);
    }
    assert_relative_eq!(jac, fd, epsilon = 1e-6);

    // q̇ = v does not depend on q.
    let qdot_jac = autodiff_to_gradient_matrix(&xdot.rows(0, 2).into_owned());
    assert!(qdot_jac.iter().all(|&g| g == 0.0));
}

/// Test: the mass matrix derivative with respect to the elbow angle is
/// `-m2 l1 l2 sin(q2) [[2, 1], [1, 0]]` and zero for the shoulder.
#[test]
fn mass_matrix_derivative() {
    let p = ArmParams::default();
    let dual = two_link_arm(p).unwrap().to_scalar_type::<Dual<2>>().unwrap();
    let mut ctx = dual.create_default_context().unwrap();
    ctx.set_positions(&[Dual::variable(Q[0], 0), Dual::variable(Q[1], 1)]).unwrap();

    let m = dual.calc_mass_matrix(&ctx).unwrap();
    let k = -p.m2 * p.l1 * p.l2 * Q[1].sin();
    let expected = [[2.0 * k, k], [k, 0.0]];
    for i in 0..2 {
        for j in 0..2 {
            let d = m[(i, j)].derivatives;
            assert_relative_eq!(d[0], 0.0, epsilon = 1e-12);
            assert_relative_eq!(d[1], expected[i][j], epsilon = 1e-12);
        }
    }
}

/// Test: contact cannot be differentiated; the dual plant refuses rather
/// than returning zero gradients.
#[test]
fn contact_is_f64_only() {
    let mut sg = SceneGraph::new();
    let scene = ball_on_ground(&mut sg, 1.0, 0.1).unwrap();
    let dual = scene.plant.to_scalar_type::<Dual<1>>().unwrap();
    let ctx = dual.create_default_context().unwrap();

    let err = dual.calc_time_derivatives(&ctx).unwrap_err();
    assert!(err.is_unsupported());
    assert_eq!(err.operation(), Some("calc_and_add_contact_forces_by_penalty_method"));
    assert!(err.to_string().contains("Dual"));

    // Contact-free evaluations still work on the converted plant.
    assert!(dual.calc_mass_matrix(&ctx).is_ok());
}
