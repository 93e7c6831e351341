//! Geometry outputs: frame ids and frame poses line up body for body.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use plant_core::{
    JointType, MassProperties, MultibodyPlant, PositionKinematicsCache, SceneGraph, Shape,
};
use plant_types::{BodyIndex, Gravity, RigidTransform};

/// Three-link chain where only the first and last links carry geometry,
/// registered out of body order.
fn chain_with_geometry(sg: &mut SceneGraph) -> MultibodyPlant {
    let mut plant = MultibodyPlant::new();
    plant.register_as_source_for_geometry_system(sg).unwrap();

    let mut parent = BodyIndex::WORLD;
    let mut links = Vec::new();
    for (i, axis) in [Vector3::y(), Vector3::x(), Vector3::z()].into_iter().enumerate() {
        let link = plant
            .add_rigid_body(
                &format!("link{i}"),
                MassProperties::box_shape(1.0, Vector3::new(0.05, 0.05, 0.2)),
            )
            .unwrap();
        let x_pf = if parent.is_world() {
            RigidTransform::identity()
        } else {
            RigidTransform::from_translation(Vector3::new(0.0, 0.1, -0.4))
        };
        plant
            .add_joint(&format!("joint{i}"), JointType::revolute(axis), parent, x_pf, link)
            .unwrap();
        links.push(link);
        parent = link;
    }

    let ball = Shape::Sphere { radius: 0.05 };
    plant
        .register_collision_geometry(links[2], RigidTransform::identity(), ball, "tip", sg)
        .unwrap();
    plant
        .register_visual_geometry(
            links[0],
            RigidTransform::from_translation(Vector3::new(0.0, 0.0, -0.2)),
            ball,
            "shoulder",
            sg,
        )
        .unwrap();
    plant
        .register_collision_geometry(BodyIndex::WORLD, RigidTransform::identity(), Shape::HalfSpace, "floor", sg)
        .unwrap();
    plant.add_uniform_gravity_field(Gravity::earth()).unwrap();
    plant.finalize().unwrap();
    plant
}

/// Test: `poses[i]` is the pose of the body whose frame is `ids[i]`, for
/// every state.
#[test]
fn poses_follow_frame_ids() {
    let mut sg = SceneGraph::new();
    let plant = chain_with_geometry(&mut sg);
    let ids = plant.geometry_frame_ids().unwrap().to_vec();

    // Bodies with geometry get a frame; the world and bare links do not.
    assert_eq!(ids.len(), 2);
    assert!(plant.frame_id_for_body(BodyIndex::WORLD).is_none());
    assert!(plant.frame_id_for_body(BodyIndex::new(2)).is_none());

    let mut ctx = plant.create_default_context().unwrap();
    for q in [[0.0, 0.0, 0.0], [0.3, -1.1, 2.0], [-2.5, 0.7, -0.4]] {
        ctx.set_positions(&q).unwrap();
        let poses = plant.calc_frame_pose_output(&ctx).unwrap();
        assert_eq!(poses.len(), ids.len());

        let mut pc = PositionKinematicsCache::new(plant.num_bodies());
        plant.eval_position_kinematics(&ctx, &mut pc).unwrap();
        for (id, pose) in ids.iter().zip(&poses) {
            let body = (1..plant.num_bodies())
                .map(BodyIndex::new)
                .find(|&b| plant.frame_id_for_body(b) == Some(*id))
                .unwrap();
            let x_wb = pc.get_x_wb(body);
            assert_relative_eq!(pose.rotation, x_wb.rotation, epsilon = 1e-14);
            assert_relative_eq!(pose.translation, x_wb.translation, epsilon = 1e-14);
        }
    }
}

/// Test: the frame ids are fixed at finalize and stable across calls.
#[test]
fn frame_ids_are_stable() {
    let mut sg = SceneGraph::new();
    let plant = chain_with_geometry(&mut sg);
    let first = plant.geometry_frame_ids().unwrap().to_vec();
    let second = plant.geometry_frame_ids().unwrap().to_vec();
    assert_eq!(first, second);
    assert_eq!(plant.geometry_ids_output_port().unwrap().size(), None);
    assert_eq!(plant.num_collision_geometries(), 2);
    assert_eq!(plant.num_visual_geometries(), 1);
}

/// Test: the geometry outputs need a registered source.
#[test]
fn outputs_require_a_source() {
    let plant = plant_conformance_tests::two_link_arm(plant_conformance_tests::ArmParams::default()).unwrap();
    let ctx = plant.create_default_context().unwrap();
    assert!(plant.geometry_frame_ids().unwrap_err().is_precondition());
    assert!(plant.calc_frame_pose_output(&ctx).unwrap_err().is_precondition());
    assert!(plant.geometry_poses_output_port().unwrap_err().is_precondition());
}
