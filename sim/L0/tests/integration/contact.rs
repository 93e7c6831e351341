//! Penalty contact: force sign and magnitude, damping cutoff, resting
//! contact, reactions between moving bodies and pair filtering.

use approx::assert_relative_eq;
use nalgebra::{DVector, Vector3};
use plant_conformance_tests::{ball_on_ground, free_positions, two_balls, update_geometry_query};
use plant_core::{
    MultibodyForces, MultibodyPlant, PositionKinematicsCache, QueryObject, SceneGraph,
    VelocityKinematicsCache,
};
use plant_contact::PenetrationPair;
use plant_types::DEFAULT_PENETRATION_ALLOWANCE;

const MASS: f64 = 2.0;
const RADIUS: f64 = 0.1;

/// Contact forces for the state `(q, v)`, with the geometry query taken
/// from `sg`.
fn contact_forces(plant: &MultibodyPlant, sg: &SceneGraph, q: &[f64], v: &[f64]) -> MultibodyForces<f64> {
    let mut ctx = plant.create_default_context().unwrap();
    ctx.set_positions(q).unwrap();
    ctx.set_velocities(v).unwrap();
    update_geometry_query(plant, sg, &mut ctx).unwrap();

    let mut pc = PositionKinematicsCache::new(plant.num_bodies());
    let mut vc = VelocityKinematicsCache::new(plant.num_bodies());
    plant.eval_position_kinematics(&ctx, &mut pc).unwrap();
    plant.eval_velocity_kinematics(&ctx, &pc, &mut vc).unwrap();
    let mut forces = MultibodyForces::zeros(plant.num_bodies(), plant.num_velocities());
    plant
        .calc_and_add_contact_forces_by_penalty_method(&ctx, &pc, &vc, &mut forces)
        .unwrap();
    forces
}

/// Contact forces on the ball for the given free-joint state.
fn ball_contact_force(q: [f64; 7], v: [f64; 6]) -> (MultibodyForces<f64>, f64, f64) {
    let mut sg = SceneGraph::new();
    let scene = ball_on_ground(&mut sg, MASS, RADIUS).unwrap();
    let params = *scene.plant.penalty_parameters().unwrap().unwrap();
    let forces = contact_forces(&scene.plant, &sg, &q, &v);
    (forces, params.stiffness, params.damping)
}

/// Test: at zero relative velocity the force is exactly `k x` along the
/// normal, applied through the ball center.
#[test]
fn force_is_k_times_depth_at_rest() {
    let depth = 0.004;
    let q = free_positions(Vector3::new(0.2, -0.1, RADIUS - depth));
    let (forces, k, _) = ball_contact_force(q, [0.0; 6]);
    let f = forces.body_forces[1];
    assert_relative_eq!(f.translational.z, k * depth, max_relative = 1e-12);
    assert_relative_eq!(f.translational.x, 0.0);
    assert_relative_eq!(f.translational.y, 0.0);
    assert_relative_eq!(f.rotational, Vector3::zeros(), epsilon = 1e-9);
    // The anchored ground takes no force.
    assert_eq!(forces.body_forces[0].translational, Vector3::zeros());
}

/// Test: approaching adds damping, separating removes it, and separating
/// fast enough removes the force entirely.
#[test]
fn damping_follows_penetration_rate() {
    let depth = 0.002;
    let q = free_positions(Vector3::new(0.0, 0.0, RADIUS - depth));

    let (forces, k, d) = ball_contact_force(q, [0.0, 0.0, 0.0, 0.0, 0.0, -0.1]);
    assert_relative_eq!(
        forces.body_forces[1].translational.z,
        k * depth * (1.0 + d * 0.1),
        max_relative = 1e-12
    );

    let (forces, ..) = ball_contact_force(q, [0.0, 0.0, 0.0, 0.0, 0.0, 0.1]);
    let fz = forces.body_forces[1].translational.z;
    assert!(fz > 0.0 && fz < k * depth, "separation should weaken the force, got {fz}");

    // 1 + d vn <= 0 once the ball leaves faster than 1/d.
    let fast = 2.0 / d;
    let (forces, ..) = ball_contact_force(q, [0.0, 0.0, 0.0, 0.0, 0.0, fast]);
    assert_eq!(forces.body_forces[1].translational, Vector3::zeros());
    assert_eq!(forces.body_forces[1].rotational, Vector3::zeros());
}

/// Test: with derived parameters a ball resting at the penetration
/// allowance is in equilibrium.
#[test]
fn ball_rests_at_penetration_allowance() {
    let mut sg = SceneGraph::new();
    let scene = ball_on_ground(&mut sg, MASS, RADIUS).unwrap();
    let plant = &scene.plant;

    let mut ctx = plant.create_default_context().unwrap();
    let z = RADIUS - DEFAULT_PENETRATION_ALLOWANCE;
    ctx.set_positions(&free_positions(Vector3::new(0.0, 0.0, z))).unwrap();
    update_geometry_query(plant, &sg, &mut ctx).unwrap();

    let xdot = plant.calc_time_derivatives(&ctx).unwrap();
    let vdot = xdot.rows(7, 6);
    assert_relative_eq!(vdot.into_owned(), DVector::zeros(6), epsilon = 1e-9);

    // Above the ground it falls freely.
    ctx.set_positions(&free_positions(Vector3::new(0.0, 0.0, 1.0))).unwrap();
    update_geometry_query(plant, &sg, &mut ctx).unwrap();
    let xdot = plant.calc_time_derivatives(&ctx).unwrap();
    assert_relative_eq!(xdot[12], -9.81, epsilon = 1e-12);
}

/// Test: two free balls push each other apart with equal and opposite
/// forces, and either ball's closing velocity feeds the damping term.
#[test]
fn body_pair_forces_balance() {
    let mut sg = SceneGraph::new();
    let pair = two_balls(&mut sg, MASS, RADIUS).unwrap();
    let plant = &pair.plant;
    let params = *plant.penalty_parameters().unwrap().unwrap();
    let (k, d) = (params.stiffness, params.damping);

    // Side by side along x, above where any ground would be.
    let depth = 0.003;
    let p_a = Vector3::new(0.0, 0.0, 1.0);
    let p_b = Vector3::new(2.0 * RADIUS - depth, 0.0, 1.0);
    let q = [free_positions(p_a), free_positions(p_b)].concat();

    let check = |v: &[f64], fx: f64| {
        let forces = contact_forces(plant, &sg, &q, v);
        let (on_a, on_b) = (forces.body_forces[1], forces.body_forces[2]);
        assert_relative_eq!(on_a.translational, Vector3::new(-fx, 0.0, 0.0), epsilon = 1e-9, max_relative = 1e-12);
        assert_relative_eq!(on_b.translational, -on_a.translational);
        assert_relative_eq!(on_a.rotational, Vector3::zeros(), epsilon = 1e-9);
        assert_relative_eq!(on_b.rotational, Vector3::zeros(), epsilon = 1e-9);

        // No net moment about the world origin either.
        let moment = on_a.rotational + p_a.cross(&on_a.translational)
            + on_b.rotational
            + p_b.cross(&on_b.translational);
        assert_relative_eq!(moment, Vector3::zeros(), epsilon = 1e-9);
    };

    check(&[0.0; 12], k * depth);

    // Only b moves, toward a; then only a moves, toward b.
    let mut v = [0.0; 12];
    v[9] = -0.1;
    check(&v, k * depth * (1.0 + d * 0.1));
    let mut v = [0.0; 12];
    v[3] = 0.1;
    check(&v, k * depth * (1.0 + d * 0.1));

    // Moving together there is no closing rate.
    let mut v = [0.0; 12];
    v[3] = 0.4;
    v[9] = 0.4;
    check(&v, k * depth);
}

/// Test: pairs involving geometry the plant does not own, or only the
/// world, produce nothing.
#[test]
fn foreign_and_world_pairs_are_ignored() {
    let mut sg = SceneGraph::new();
    let scene = ball_on_ground(&mut sg, MASS, RADIUS).unwrap();
    let plant = &scene.plant;
    let mut ctx = plant.create_default_context().unwrap();
    ctx.set_positions(&free_positions(Vector3::new(0.0, 0.0, 1.0))).unwrap();

    let pair = |id_a, id_b| PenetrationPair {
        id_a,
        id_b,
        p_wca: Vector3::zeros(),
        p_wcb: Vector3::zeros(),
        nhat_ba_w: Vector3::z(),
        depth: 0.01,
    };
    ctx.fix_geometry_query(QueryObject::new(vec![
        pair(scene.ground, scene.ground),
        pair(plant_types::GeometryId::new(u64::MAX), scene.ball),
    ]));

    let mut pc = PositionKinematicsCache::new(plant.num_bodies());
    let mut vc = VelocityKinematicsCache::new(plant.num_bodies());
    plant.eval_position_kinematics(&ctx, &mut pc).unwrap();
    plant.eval_velocity_kinematics(&ctx, &pc, &mut vc).unwrap();
    let mut forces = MultibodyForces::zeros(plant.num_bodies(), plant.num_velocities());
    plant
        .calc_and_add_contact_forces_by_penalty_method(&ctx, &pc, &vc, &mut forces)
        .unwrap();
    assert!(forces.body_forces.iter().all(|f| f.translational == Vector3::zeros()));
}

/// Test: a missing geometry query is a precondition failure.
#[test]
fn missing_query_is_reported() {
    let mut sg = SceneGraph::new();
    let scene = ball_on_ground(&mut sg, MASS, RADIUS).unwrap();
    let ctx = scene.plant.create_default_context().unwrap();
    let err = scene.plant.calc_time_derivatives(&ctx).unwrap_err();
    assert!(err.is_precondition());
    assert!(err.to_string().contains("geometry query"));
}
