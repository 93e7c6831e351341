//! Topology model: bodies, joints, actuators and applied forces.

mod body;
mod forces;
mod joint;
mod tree;

pub use body::{MassProperties, RigidBody};
pub use forces::MultibodyForces;
pub use joint::{Joint, JointActuator, JointType};
pub use tree::MultibodyTree;
