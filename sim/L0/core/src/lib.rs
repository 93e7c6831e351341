//! Finalize-gated multibody plant.
//!
//! This crate evaluates the continuous-time dynamics of an articulated
//! rigid-body mechanism: body poses and velocities, penalty contact forces
//! and the time derivatives of state. A [`MultibodyPlant`] is assembled,
//! finalized once, and then evaluated any number of times against
//! caller-owned [`PlantContext`]s:
//!
//! - the plant is static after [`MultibodyPlant::finalize`] (topology,
//!   ports, contact parameters)
//! - the context is dynamic (`q` and `v` are the source of truth)
//! - kinematics caches are plain values owned by whoever evaluates
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    MultibodyPlant<T>                        │
//! │  Building: bodies, joints, actuators, gravity, geometry     │
//! │  finalize(): order, offsets, ports, penalty parameters      │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │ &self
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PlantContext<T>                          │
//! │  [q; v] → X_WB → V_WB → contact, M, ID → [q̇; v̇]            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every evaluation is generic over [`plant_types::Scalar`]: `f64` for
//! values, [`plant_types::Dual`] for values with exact derivatives.
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with no rendering or engine dependencies. It can
//! be used in:
//!
//! - Headless training loops
//! - Trajectory optimization (through `Dual` gradients)
//! - Analysis tools
//!
//! # Quick Start
//!
//! ```
//! use nalgebra::Vector3;
//! use plant_core::{JointType, MassProperties, MultibodyPlant};
//! use plant_types::{BodyIndex, Gravity, RigidTransform};
//!
//! let mut plant = MultibodyPlant::<f64>::new();
//! let bob = plant
//!     .add_rigid_body(
//!         "bob",
//!         MassProperties::point_mass(1.0).with_center_of_mass(Vector3::new(0.0, 0.0, -1.0)),
//!     )
//!     .unwrap();
//! plant
//!     .add_joint("pin", JointType::revolute(Vector3::y()), BodyIndex::WORLD, RigidTransform::identity(), bob)
//!     .unwrap();
//! plant.add_uniform_gravity_field(Gravity::earth()).unwrap();
//! plant.finalize().unwrap();
//!
//! let mut ctx = plant.create_default_context().unwrap();
//! ctx.set_positions(&[0.1]).unwrap();
//! let xdot = plant.calc_time_derivatives(&ctx).unwrap();
//! assert!((xdot[1] + 9.81 * 0.1_f64.sin()).abs() < 1e-12);
//! ```

#![doc(html_root_url = "https://docs.rs/plant-core/0.1.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,       // Many methods can't be const due to nalgebra
    clippy::suboptimal_flops,           // mul_add style changes aren't always clearer
    clippy::neg_cmp_op_on_partial_ord,  // !(x > 0.0) is intentional for NaN rejection
    clippy::option_if_let_else,         // if-let is often more readable than map_or_else
    clippy::too_many_lines,             // Physics functions naturally have many steps
    clippy::doc_markdown,               // Not all technical terms need backticks
    clippy::missing_errors_doc,         // Every public operation returns the crate error
    clippy::many_single_char_names,     // Dynamics formulas
)]

// Topology: bodies, joints, actuators, applied forces
mod multibody;

// Spatial algebra, inverse dynamics, CRBA
mod dynamics;

// Dense LDLᵀ for the mass matrix solve
mod linalg;

// Position and velocity kinematics caches
mod kinematics;

// Geometry engine interface and reference scene graph
mod geometry;

// Build/finalize state machine
mod lifecycle;

// Caller-owned evaluation state
mod context;

// Port declarations
mod ports;

// The plant itself
mod plant;

pub use context::PlantContext;
pub use dynamics::SpatialVector;
pub use geometry::{
    GeometryEngine, GeometryFrame, GeometryInstance, GeometryRole, QueryObject, SceneGraph, Shape,
};
pub use kinematics::{PositionKinematicsCache, VelocityKinematicsCache};
pub use lifecycle::LifecycleState;
pub use multibody::{
    Joint, JointActuator, JointType, MassProperties, MultibodyForces, MultibodyTree, RigidBody,
};
pub use plant::MultibodyPlant;
pub use ports::{PortDescriptor, PortDirection, PortKind};

// Re-export contact data for convenience
pub use plant_contact::{PenaltyParameters, PenetrationPair};
