//! Lifecycle gating: every structural operation before finalize, every
//! evaluation after it, and never the other way around.

use nalgebra::{DVector, Vector3};
use plant_core::{
    JointType, LifecycleState, MassProperties, MultibodyForces, MultibodyPlant, PlantContext,
    PositionKinematicsCache, SceneGraph, Shape, VelocityKinematicsCache,
};
use plant_types::{BodyIndex, Dual, Gravity, JointIndex, PlantError, Result, RigidTransform};

/// A one-body plant registered with `sg`, not yet finalized.
fn building_plant(sg: &mut SceneGraph) -> MultibodyPlant {
    let mut plant = MultibodyPlant::new();
    plant.register_as_source_for_geometry_system(sg).unwrap();
    let body = plant.add_rigid_body("body", MassProperties::sphere(1.0, 0.1)).unwrap();
    let joint = plant
        .add_joint("slider", JointType::prismatic(Vector3::z()), BodyIndex::WORLD, RigidTransform::identity(), body)
        .unwrap();
    plant.add_joint_actuator("motor", joint).unwrap();
    plant
        .register_collision_geometry(body, RigidTransform::identity(), Shape::Sphere { radius: 0.1 }, "ball", sg)
        .unwrap();
    plant
}

/// Every pre-finalize-only operation, with its name.
fn structural_operations(plant: &mut MultibodyPlant, sg: &mut SceneGraph) -> Vec<(&'static str, Result<()>)> {
    let body = BodyIndex::new(1);
    vec![
        ("add_rigid_body", plant.add_rigid_body("extra", MassProperties::point_mass(1.0)).map(drop)),
        (
            "add_joint",
            plant
                .add_joint("extra_joint", JointType::Fixed, BodyIndex::WORLD, RigidTransform::identity(), body)
                .map(drop),
        ),
        ("add_joint_actuator", plant.add_joint_actuator("extra_motor", JointIndex::new(0)).map(drop)),
        ("add_uniform_gravity_field", plant.add_uniform_gravity_field(Gravity::earth())),
        ("register_as_source_for_geometry_system", plant.register_as_source_for_geometry_system(sg).map(drop)),
        (
            "register_visual_geometry",
            plant
                .register_visual_geometry(body, RigidTransform::identity(), Shape::HalfSpace, "v", sg)
                .map(drop),
        ),
        (
            "register_collision_geometry",
            plant
                .register_collision_geometry(body, RigidTransform::identity(), Shape::HalfSpace, "c", sg)
                .map(drop),
        ),
        ("set_penetration_allowance", plant.set_penetration_allowance(2e-3)),
        ("set_penalty_parameters", plant.set_penalty_parameters(1e4, 0.1)),
    ]
}

/// Every post-finalize-only operation, with its name. `ctx` is only read
/// after the lifecycle check, so any context will do.
fn evaluation_operations(plant: &MultibodyPlant, ctx: &PlantContext<f64>) -> Vec<(&'static str, Result<()>)> {
    let nb = plant.num_bodies();
    let nv = plant.num_velocities();
    let mut pc = PositionKinematicsCache::new(nb);
    let mut vc = VelocityKinematicsCache::new(nb);
    let mut forces = MultibodyForces::zeros(nb, nv);
    vec![
        ("create_default_context", plant.create_default_context().map(drop)),
        ("actuation_input_port", plant.actuation_input_port().map(drop)),
        ("geometry_query_input_port", plant.geometry_query_input_port().map(drop)),
        ("geometry_ids_output_port", plant.geometry_ids_output_port().map(drop)),
        ("geometry_poses_output_port", plant.geometry_poses_output_port().map(drop)),
        ("continuous_state_output_port", plant.continuous_state_output_port().map(drop)),
        ("eval_position_kinematics", plant.eval_position_kinematics(ctx, &mut pc)),
        ("eval_velocity_kinematics", plant.eval_velocity_kinematics(ctx, &pc, &mut vc)),
        ("calc_mass_matrix", plant.calc_mass_matrix(ctx).map(drop)),
        (
            "calc_inverse_dynamics",
            plant
                .calc_inverse_dynamics(ctx, &pc, &vc, &DVector::zeros(nv), &forces)
                .map(drop),
        ),
        (
            "calc_and_add_contact_forces_by_penalty_method",
            plant.calc_and_add_contact_forces_by_penalty_method(ctx, &pc, &vc, &mut forces),
        ),
        ("calc_time_derivatives", plant.calc_time_derivatives(ctx).map(drop)),
        ("map_velocity_to_qdot", plant.map_velocity_to_qdot(ctx, &DVector::zeros(nv)).map(drop)),
        ("map_qdot_to_velocity", plant.map_qdot_to_velocity(ctx, &DVector::zeros(nv)).map(drop)),
        ("calc_frame_pose_output", plant.calc_frame_pose_output(ctx).map(drop)),
        ("geometry_frame_ids", plant.geometry_frame_ids().map(drop)),
        ("calc_continuous_state_output", plant.calc_continuous_state_output(ctx).map(drop)),
        ("penalty_parameters", plant.penalty_parameters().map(drop)),
        ("to_scalar_type", plant.to_scalar_type::<Dual<1>>().map(drop)),
    ]
}

fn assert_lifecycle_violation(name: &str, result: &Result<()>, pre: bool) {
    match result {
        Err(err @ PlantError::LifecycleViolation { operation, .. }) => {
            assert_eq!(operation, name);
            let prefix = if pre { "Pre-finalize calls to" } else { "Post-finalize calls to" };
            assert!(
                err.to_string().starts_with(&format!("{prefix} '{name}()'")),
                "unexpected message for {name}: {err}"
            );
        }
        other => panic!("{name} should be a lifecycle violation, got {other:?}"),
    }
}

/// Test: evaluations fail before finalize, structure fails after it, and
/// finalize itself runs once.
#[test]
fn lifecycle_is_monotonic() {
    let mut sg = SceneGraph::new();
    let mut plant = building_plant(&mut sg);
    assert_eq!(plant.lifecycle_state(), LifecycleState::Building);

    // Before finalize the state is not sized yet; an empty context suffices.
    let early = {
        let mut bare = MultibodyPlant::<f64>::new();
        bare.finalize().unwrap();
        bare.create_default_context().unwrap()
    };
    for (name, result) in evaluation_operations(&plant, &early) {
        assert_lifecycle_violation(name, &result, true);
    }

    plant.finalize().unwrap();
    assert_eq!(plant.lifecycle_state(), LifecycleState::Finalized);

    for (name, result) in structural_operations(&mut plant, &mut sg) {
        assert_lifecycle_violation(name, &result, false);
    }
    let err = plant.finalize().unwrap_err();
    assert_eq!(err.operation(), Some("finalize"));
    assert!(plant.is_finalized());
}

/// Test: after finalize no evaluation reports a lifecycle violation.
#[test]
fn evaluations_pass_the_gate_after_finalize() {
    let mut sg = SceneGraph::new();
    let mut plant = building_plant(&mut sg);
    plant.finalize().unwrap();
    let mut ctx = plant.create_default_context().unwrap();
    ctx.fix_actuation_input(DVector::from_vec(vec![0.0]));
    plant_conformance_tests::update_geometry_query(&plant, &sg, &mut ctx).unwrap();

    for (name, result) in evaluation_operations(&plant, &ctx) {
        if let Err(err) = result {
            assert!(!err.is_lifecycle_violation(), "{name} rejected after finalize: {err}");
        }
    }
}

/// Test: the engine is released at finalize; registering afterwards is a
/// lifecycle error even with the original engine.
#[test]
fn geometry_engine_released_at_finalize() {
    let mut sg = SceneGraph::new();
    let mut plant = building_plant(&mut sg);
    let source = plant.source_id().unwrap();
    plant.finalize().unwrap();
    assert_eq!(plant.source_id(), Some(source));
    let err = plant
        .register_visual_geometry(BodyIndex::new(1), RigidTransform::identity(), Shape::HalfSpace, "late", &mut sg)
        .unwrap_err();
    assert!(err.is_lifecycle_violation());
}

/// Test: a scene whose only collision geometry is anchored to the world
/// finalizes and evaluates; there is no mass to derive contact from.
#[test]
fn static_scene_finalizes() {
    let mut sg = SceneGraph::new();
    let mut plant = MultibodyPlant::new();
    plant.register_as_source_for_geometry_system(&mut sg).unwrap();
    plant
        .register_collision_geometry(BodyIndex::WORLD, RigidTransform::identity(), Shape::HalfSpace, "floor", &mut sg)
        .unwrap();
    plant.add_uniform_gravity_field(Gravity::earth()).unwrap();
    plant.finalize().unwrap();

    assert_eq!(plant.lifecycle_state(), LifecycleState::Finalized);
    assert!(plant.penalty_parameters().unwrap().is_none());
    assert!(plant.geometry_frame_ids().unwrap().is_empty());

    let mut ctx = plant.create_default_context().unwrap();
    plant_conformance_tests::update_geometry_query(&plant, &sg, &mut ctx).unwrap();
    assert_eq!(plant.calc_time_derivatives(&ctx).unwrap().len(), 0);
}

/// Test: a massless body carrying collision geometry finalizes, and its
/// penetration produces no force.
#[test]
fn massless_collision_body_finalizes() {
    let mut sg = SceneGraph::new();
    let mut plant = MultibodyPlant::new();
    plant.register_as_source_for_geometry_system(&mut sg).unwrap();
    let body = plant.add_rigid_body("stylus", MassProperties::point_mass(0.0)).unwrap();
    plant
        .add_joint("slider", JointType::prismatic(Vector3::z()), BodyIndex::WORLD, RigidTransform::identity(), body)
        .unwrap();
    plant
        .register_collision_geometry(body, RigidTransform::identity(), Shape::Sphere { radius: 0.1 }, "tip", &mut sg)
        .unwrap();
    plant
        .register_collision_geometry(BodyIndex::WORLD, RigidTransform::identity(), Shape::HalfSpace, "floor", &mut sg)
        .unwrap();
    plant.finalize().unwrap();
    assert!(plant.is_finalized());
    assert!(plant.penalty_parameters().unwrap().is_none());

    // q = 0 buries the sphere's lower half in the floor.
    let mut ctx = plant.create_default_context().unwrap();
    plant_conformance_tests::update_geometry_query(&plant, &sg, &mut ctx).unwrap();
    assert_eq!(ctx.geometry_query().unwrap().penetrations().len(), 1);

    let nb = plant.num_bodies();
    let mut pc = PositionKinematicsCache::new(nb);
    let mut vc = VelocityKinematicsCache::new(nb);
    plant.eval_position_kinematics(&ctx, &mut pc).unwrap();
    plant.eval_velocity_kinematics(&ctx, &pc, &mut vc).unwrap();
    let mut forces = MultibodyForces::zeros(nb, plant.num_velocities());
    plant
        .calc_and_add_contact_forces_by_penalty_method(&ctx, &pc, &vc, &mut forces)
        .unwrap();
    assert!(forces.body_forces.iter().all(|f| f.translational == Vector3::zeros()));
}
