//! Arena-indexed topology of bodies, joints and actuators.
//!
//! Bodies and joints live in `Vec`s addressed by [`BodyIndex`] and
//! [`JointIndex`]. The tree is built incrementally and frozen by
//! [`MultibodyTree::finalize`], which computes a parents-before-children
//! body order and the coordinate offsets of every joint.

use std::collections::VecDeque;

use nalgebra::Matrix3;
use plant_types::{
    ActuatorIndex, BodyIndex, Gravity, JointIndex, PlantError, Result, RigidTransform,
};
use tracing::debug;

use super::{Joint, JointActuator, JointType, MassProperties, RigidBody};

/// Bodies, joints, actuators and force elements of a mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct MultibodyTree {
    bodies: Vec<RigidBody>,
    joints: Vec<Joint>,
    actuators: Vec<JointActuator>,
    gravity: Option<Gravity>,
    /// Inboard joint of each body; `None` for the world.
    inboard_joint: Vec<Option<JointIndex>>,
    /// Bodies in parents-before-children order, world first. Set at finalize.
    order: Vec<BodyIndex>,
    nq: usize,
    nv: usize,
}

impl Default for MultibodyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MultibodyTree {
    /// A tree holding only the world body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bodies: vec![RigidBody::world()],
            joints: Vec::new(),
            actuators: Vec::new(),
            gravity: None,
            inboard_joint: vec![None],
            order: Vec::new(),
            nq: 0,
            nv: 0,
        }
    }

    pub(crate) fn add_body(
        &mut self,
        name: &str,
        mass_properties: MassProperties,
    ) -> Result<BodyIndex> {
        mass_properties.validate()?;
        if self.bodies.iter().any(|b| b.name() == name) {
            return Err(PlantError::invalid_argument(format!(
                "a body named '{name}' already exists"
            )));
        }
        let index = BodyIndex::new(self.bodies.len());
        self.bodies
            .push(RigidBody::new(index, name.to_string(), mass_properties));
        self.inboard_joint.push(None);
        Ok(index)
    }

    pub(crate) fn add_joint(
        &mut self,
        name: &str,
        joint_type: JointType,
        parent: BodyIndex,
        x_pf: RigidTransform<f64>,
        child: BodyIndex,
    ) -> Result<JointIndex> {
        let joint_type = joint_type.normalized()?;
        self.check_body(parent)?;
        self.check_body(child)?;
        if child.is_world() {
            return Err(PlantError::invalid_argument(
                "the world body cannot be the child of a joint",
            ));
        }
        if parent == child {
            return Err(PlantError::invalid_argument(format!(
                "joint '{name}' connects {child} to itself"
            )));
        }
        if let Some(existing) = self.inboard_joint[child.index()] {
            return Err(PlantError::invalid_argument(format!(
                "{child} already has inboard joint '{}'",
                self.joints[existing.index()].name()
            )));
        }
        if matches!(joint_type, JointType::Free) && !parent.is_world() {
            return Err(PlantError::invalid_argument(format!(
                "free joint '{name}' must have the world as its parent"
            )));
        }
        if matches!(joint_type, JointType::Free)
            && (x_pf.rotation - Matrix3::identity()).amax() > 0.0
        {
            return Err(PlantError::invalid_argument(format!(
                "free joint '{name}' cannot rotate its fixed frame; X_PF may only translate"
            )));
        }
        if self.joints.iter().any(|j| j.name() == name) {
            return Err(PlantError::invalid_argument(format!(
                "a joint named '{name}' already exists"
            )));
        }

        let index = JointIndex::new(self.joints.len());
        self.joints.push(Joint::new(
            index,
            name.to_string(),
            joint_type,
            parent,
            x_pf,
            child,
        ));
        self.inboard_joint[child.index()] = Some(index);
        Ok(index)
    }

    pub(crate) fn add_actuator(&mut self, name: &str, joint: JointIndex) -> Result<ActuatorIndex> {
        if joint.index() >= self.joints.len() {
            return Err(PlantError::invalid_argument(format!("unknown {joint}")));
        }
        let index = ActuatorIndex::new(self.actuators.len());
        self.actuators
            .push(JointActuator::new(index, name.to_string(), joint));
        Ok(index)
    }

    pub(crate) fn set_gravity(&mut self, gravity: Gravity) -> Result<()> {
        if self.gravity.is_some() {
            return Err(PlantError::invalid_argument(
                "a uniform gravity field has already been added",
            ));
        }
        if !gravity.acceleration.iter().all(|a| a.is_finite()) {
            return Err(PlantError::invalid_argument("gravity must be finite"));
        }
        self.gravity = Some(gravity);
        Ok(())
    }

    /// Freeze the topology: body order, joint offsets, `nq` and `nv`.
    pub(crate) fn finalize(&mut self) -> Result<()> {
        for (b, inboard) in self.inboard_joint.iter().enumerate().skip(1) {
            if inboard.is_none() {
                return Err(PlantError::precondition(format!(
                    "body '{}' has no inboard joint",
                    self.bodies[b].name()
                )));
            }
        }

        // Breadth-first from the world. Each body has exactly one inboard
        // joint, so any body not reached here sits on a cycle.
        let mut children: Vec<Vec<JointIndex>> = vec![Vec::new(); self.bodies.len()];
        for joint in &self.joints {
            children[joint.parent().index()].push(joint.index());
        }
        let mut order = Vec::with_capacity(self.bodies.len());
        let mut queue = VecDeque::from([BodyIndex::WORLD]);
        while let Some(body) = queue.pop_front() {
            order.push(body);
            for &j in &children[body.index()] {
                queue.push_back(self.joints[j.index()].child());
            }
        }
        if order.len() != self.bodies.len() {
            let unreachable = self
                .bodies
                .iter()
                .find(|b| !order.contains(&b.index()))
                .map_or("?", RigidBody::name);
            return Err(PlantError::precondition(format!(
                "body '{unreachable}' is not connected to the world"
            )));
        }

        // Coordinates are laid out in body order.
        let (mut nq, mut nv) = (0, 0);
        for body in order.iter().skip(1) {
            if let Some(j) = self.inboard_joint[body.index()] {
                let joint = &mut self.joints[j.index()];
                joint.set_offsets(nq, nv);
                nq += joint.nq();
                nv += joint.nv();
            }
        }

        self.order = order;
        self.nq = nq;
        self.nv = nv;
        debug!(
            bodies = self.bodies.len(),
            joints = self.joints.len(),
            nq,
            nv,
            "topology finalized"
        );
        Ok(())
    }

    fn check_body(&self, body: BodyIndex) -> Result<()> {
        if body.index() < self.bodies.len() {
            Ok(())
        } else {
            Err(PlantError::invalid_argument(format!("unknown {body}")))
        }
    }

    /// All bodies, indexed by [`BodyIndex`].
    #[must_use]
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// All joints, indexed by [`JointIndex`].
    #[must_use]
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// All actuators, indexed by [`ActuatorIndex`].
    #[must_use]
    pub fn actuators(&self) -> &[JointActuator] {
        &self.actuators
    }

    /// The uniform gravity field, if one was added.
    #[must_use]
    pub fn gravity(&self) -> Option<&Gravity> {
        self.gravity.as_ref()
    }

    /// Look up a body.
    pub fn body(&self, body: BodyIndex) -> Result<&RigidBody> {
        self.bodies
            .get(body.index())
            .ok_or_else(|| PlantError::invalid_argument(format!("unknown {body}")))
    }

    /// Look up a joint.
    pub fn joint(&self, joint: JointIndex) -> Result<&Joint> {
        self.joints
            .get(joint.index())
            .ok_or_else(|| PlantError::invalid_argument(format!("unknown {joint}")))
    }

    /// Find a body by name.
    #[must_use]
    pub fn body_by_name(&self, name: &str) -> Option<&RigidBody> {
        self.bodies.iter().find(|b| b.name() == name)
    }

    /// Inboard joint of a body (`None` for the world).
    #[must_use]
    pub fn inboard_joint(&self, body: BodyIndex) -> Option<&Joint> {
        self.inboard_joint
            .get(body.index())
            .copied()
            .flatten()
            .map(|j| &self.joints[j.index()])
    }

    /// Bodies in parents-before-children order, world first.
    #[must_use]
    pub fn topological_order(&self) -> &[BodyIndex] {
        &self.order
    }

    /// Number of bodies, world included.
    #[must_use]
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Number of joints.
    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    /// Number of actuators.
    #[must_use]
    pub fn num_actuators(&self) -> usize {
        self.actuators.len()
    }

    /// Total degrees of freedom driven by actuators.
    #[must_use]
    pub fn num_actuated_dofs(&self) -> usize {
        self.actuators
            .iter()
            .map(|a| self.joints[a.joint().index()].nv())
            .sum()
    }

    /// Size of `q`.
    #[must_use]
    pub fn num_positions(&self) -> usize {
        self.nq
    }

    /// Size of `v`.
    #[must_use]
    pub fn num_velocities(&self) -> usize {
        self.nv
    }

    /// Largest default mass over all bodies.
    #[must_use]
    pub fn max_body_mass(&self) -> f64 {
        self.bodies
            .iter()
            .map(RigidBody::default_mass)
            .fold(0.0, f64::max)
    }

    /// Default positions: zeros, identity quaternions for free joints.
    #[must_use]
    pub fn default_positions(&self) -> Vec<f64> {
        let mut q = vec![0.0; self.nq];
        for joint in &self.joints {
            joint.write_default_positions(&mut q);
        }
        q
    }
}
