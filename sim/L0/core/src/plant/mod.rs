//! The multibody plant.
//!
//! [`MultibodyPlant`] is assembled in two phases. While building, bodies,
//! joints, actuators, a gravity field and geometry are added. [`finalize`]
//! then freezes the topology, declares ports and derives contact
//! parameters. From then on the plant is immutable and every evaluation
//! reads its state from a caller-owned [`PlantContext`].
//!
//! [`finalize`]: MultibodyPlant::finalize

mod dynamics;
mod geometry;

use std::marker::PhantomData;

use plant_contact::PenaltyParameters;
use plant_types::{
    ActuatorIndex, BodyIndex, FrameId, Gravity, JointIndex, PlantConfig, PlantError, Result,
    RigidTransform, Scalar,
};
use tracing::debug;

use crate::context::PlantContext;
use crate::geometry::GeometryCoupling;
use crate::lifecycle::{LifecycleGate, LifecycleState};
use crate::multibody::{JointType, MassProperties, MultibodyTree};
use crate::ports::{PlantPorts, PortDescriptor};

/// A rigid multibody system with penalty contact.
///
/// `T` is the scalar every evaluation is carried out in: `f64` for plain
/// values or [`Dual`](plant_types::Dual) for values with derivatives. Model
/// parameters are always stored as `f64`; see
/// [`to_scalar_type`](Self::to_scalar_type).
#[derive(Debug, Clone)]
pub struct MultibodyPlant<T: Scalar = f64> {
    config: PlantConfig,
    tree: MultibodyTree,
    lifecycle: LifecycleGate,
    geometry: GeometryCoupling,
    explicit_penalty: Option<(f64, f64)>,
    penalty: Option<PenaltyParameters>,
    ports: Option<PlantPorts>,
    frame_ids: Vec<FrameId>,
    _scalar: PhantomData<T>,
}

impl<T: Scalar> Default for MultibodyPlant<T> {
    fn default() -> Self {
        Self::from_parts(PlantConfig::default())
    }
}

impl<T: Scalar> MultibodyPlant<T> {
    /// An empty plant holding only the world body, with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty plant with the given configuration.
    pub fn with_config(config: PlantConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config))
    }

    fn from_parts(config: PlantConfig) -> Self {
        Self {
            config,
            tree: MultibodyTree::new(),
            lifecycle: LifecycleGate::default(),
            geometry: GeometryCoupling::default(),
            explicit_penalty: None,
            penalty: None,
            ports: None,
            frame_ids: Vec::new(),
            _scalar: PhantomData,
        }
    }

    // ==================== Building ====================

    /// Add a rigid body. It must later be connected by exactly one joint.
    pub fn add_rigid_body(&mut self, name: &str, mass_properties: MassProperties) -> Result<BodyIndex> {
        self.lifecycle.require_building("add_rigid_body")?;
        self.tree.add_body(name, mass_properties)
    }

    /// Add a joint making `child` move relative to `parent`.
    ///
    /// `x_pf` places the joint's fixed frame in the parent body frame; the
    /// child body frame coincides with the joint's moving frame.
    pub fn add_joint(
        &mut self,
        name: &str,
        joint_type: JointType,
        parent: BodyIndex,
        x_pf: RigidTransform<f64>,
        child: BodyIndex,
    ) -> Result<JointIndex> {
        self.lifecycle.require_building("add_joint")?;
        self.tree.add_joint(name, joint_type, parent, x_pf, child)
    }

    /// Add an actuator driving `joint`.
    pub fn add_joint_actuator(&mut self, name: &str, joint: JointIndex) -> Result<ActuatorIndex> {
        self.lifecycle.require_building("add_joint_actuator")?;
        self.tree.add_actuator(name, joint)
    }

    /// Add the plant's uniform gravity field. At most one may be added.
    pub fn add_uniform_gravity_field(&mut self, gravity: Gravity) -> Result<()> {
        self.lifecycle.require_building("add_uniform_gravity_field")?;
        self.tree.set_gravity(gravity)
    }

    /// Set the penetration allowance the contact parameters are derived from.
    pub fn set_penetration_allowance(&mut self, allowance: f64) -> Result<()> {
        self.lifecycle.require_building("set_penetration_allowance")?;
        if !(allowance > 0.0 && allowance.is_finite()) {
            return Err(PlantError::invalid_argument(format!(
                "penetration allowance must be positive, got {allowance}"
            )));
        }
        self.config.penetration_allowance = allowance;
        Ok(())
    }

    /// Use explicit penalty stiffness and damping instead of deriving them.
    pub fn set_penalty_parameters(&mut self, stiffness: f64, damping: f64) -> Result<()> {
        self.lifecycle.require_building("set_penalty_parameters")?;
        // Validate now, the reference mass is only known at finalize.
        PenaltyParameters::explicit(stiffness, damping, 0.0)?;
        self.explicit_penalty = Some((stiffness, damping));
        Ok(())
    }

    /// Freeze the plant.
    ///
    /// Computes the body order and coordinate offsets, declares the state
    /// and ports, fixes the geometry frame list, derives penalty parameters
    /// and releases the geometry engine. Can only be called once.
    pub fn finalize(&mut self) -> Result<()> {
        self.lifecycle.require_building("finalize")?;

        self.tree.finalize()?;

        let nx = self.tree.num_positions() + self.tree.num_velocities();
        let actuation = (self.tree.num_actuators() > 0).then(|| self.tree.num_actuated_dofs());
        let source = self.geometry.source().is_some();
        let ports = PlantPorts::declare(actuation, source, nx);
        debug!(num_states = nx, ?actuation, geometry_ports = source, "declared state and ports");

        if source {
            self.frame_ids = self.geometry.body_frames().map(|(_, frame)| frame).collect();
            debug!(num_frames = self.frame_ids.len(), "fixed geometry frame ids");
        }

        self.penalty = self.finalize_penalty_parameters()?;
        self.ports = Some(ports);
        self.geometry.finalize();
        debug!("released geometry engine");

        self.lifecycle.finalize()
    }

    fn finalize_penalty_parameters(&self) -> Result<Option<PenaltyParameters>> {
        let mass = self.tree.max_body_mass();
        if let Some((stiffness, damping)) = self.explicit_penalty {
            let params = PenaltyParameters::explicit(stiffness, damping, mass)?;
            debug!(stiffness, damping, time_scale = params.time_scale, "using explicit penalty parameters");
            return Ok(Some(params));
        }
        if self.geometry.num_collision_geometries() == 0 {
            return Ok(None);
        }
        // Standard gravity only stands in for a missing field; a zero field
        // is taken at its word.
        let gravity = self
            .tree
            .gravity()
            .map_or(self.config.standard_gravity, |g| g.magnitude());
        if !(mass > 0.0 && gravity > 0.0) {
            debug!(mass, gravity, "no reference weight, penalty contact disabled");
            return Ok(None);
        }
        PenaltyParameters::from_penetration_allowance(mass, gravity, self.config.penetration_allowance)
            .map(Some)
    }

    // ==================== Queries ====================

    /// Lifecycle state.
    #[must_use]
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Whether [`finalize`](Self::finalize) has been called.
    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.lifecycle.is_finalized()
    }

    /// Configuration in effect.
    #[must_use]
    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    /// The body/joint topology.
    #[must_use]
    pub fn tree(&self) -> &MultibodyTree {
        &self.tree
    }

    /// Number of bodies, world included.
    #[must_use]
    pub fn num_bodies(&self) -> usize {
        self.tree.num_bodies()
    }

    /// Number of joints.
    #[must_use]
    pub fn num_joints(&self) -> usize {
        self.tree.num_joints()
    }

    /// Number of actuators.
    #[must_use]
    pub fn num_actuators(&self) -> usize {
        self.tree.num_actuators()
    }

    /// Number of actuated degrees of freedom.
    #[must_use]
    pub fn num_actuated_dofs(&self) -> usize {
        self.tree.num_actuated_dofs()
    }

    /// Size of `q`. Zero until finalized.
    #[must_use]
    pub fn num_positions(&self) -> usize {
        self.tree.num_positions()
    }

    /// Size of `v`. Zero until finalized.
    #[must_use]
    pub fn num_velocities(&self) -> usize {
        self.tree.num_velocities()
    }

    /// Size of the continuous state `[q; v]`.
    #[must_use]
    pub fn num_multibody_states(&self) -> usize {
        self.num_positions() + self.num_velocities()
    }

    /// Contact parameters fixed at finalize.
    ///
    /// `None` unless set explicitly or derivable: the plant needs collision
    /// geometry, a body with positive mass and a non-zero gravity field (or
    /// none, in which case standard gravity is used). Without parameters
    /// penetrating pairs produce no force.
    pub fn penalty_parameters(&self) -> Result<Option<&PenaltyParameters>> {
        self.lifecycle.require_finalized("penalty_parameters")?;
        Ok(self.penalty.as_ref())
    }

    // ==================== Ports and contexts ====================

    fn ports(&self, operation: &str) -> Result<&PlantPorts> {
        self.lifecycle.require_finalized(operation)?;
        self.ports
            .as_ref()
            .ok_or_else(|| PlantError::precondition("ports have not been declared"))
    }

    /// The actuation input port. Only declared when the plant has actuators.
    pub fn actuation_input_port(&self) -> Result<&PortDescriptor> {
        self.ports("actuation_input_port")?
            .actuation
            .as_ref()
            .ok_or_else(|| PlantError::precondition("the plant has no actuators, so no actuation input port"))
    }

    /// The geometry query input port. Only declared for a geometry source.
    pub fn geometry_query_input_port(&self) -> Result<&PortDescriptor> {
        self.ports("geometry_query_input_port")?
            .geometry_query
            .as_ref()
            .ok_or_else(not_a_geometry_source)
    }

    /// The geometry frame-id output port. Only declared for a geometry source.
    pub fn geometry_ids_output_port(&self) -> Result<&PortDescriptor> {
        self.ports("geometry_ids_output_port")?
            .geometry_ids
            .as_ref()
            .ok_or_else(not_a_geometry_source)
    }

    /// The geometry frame-pose output port. Only declared for a geometry source.
    pub fn geometry_poses_output_port(&self) -> Result<&PortDescriptor> {
        self.ports("geometry_poses_output_port")?
            .geometry_poses
            .as_ref()
            .ok_or_else(not_a_geometry_source)
    }

    /// The continuous state output port.
    pub fn continuous_state_output_port(&self) -> Result<&PortDescriptor> {
        Ok(&self.ports("continuous_state_output_port")?.continuous_state)
    }

    /// A context holding the default state: zero coordinates with identity
    /// quaternions, zero velocities and no inputs fixed.
    pub fn create_default_context(&self) -> Result<PlantContext<T>> {
        self.lifecycle.require_finalized("create_default_context")?;
        Ok(PlantContext::new(&self.tree.default_positions(), self.tree.num_velocities()))
    }

    /// The same finalized plant evaluated in scalar type `U`.
    ///
    /// Parameters are stored in `f64` and lifted per evaluation, so the
    /// converted plant is a structural copy.
    pub fn to_scalar_type<U: Scalar>(&self) -> Result<MultibodyPlant<U>> {
        self.lifecycle.require_finalized("to_scalar_type")?;
        debug!(from = T::NAME, to = U::NAME, "converting plant scalar type");
        Ok(MultibodyPlant {
            config: self.config.clone(),
            tree: self.tree.clone(),
            lifecycle: self.lifecycle,
            geometry: self.geometry.clone(),
            explicit_penalty: self.explicit_penalty,
            penalty: self.penalty,
            ports: self.ports.clone(),
            frame_ids: self.frame_ids.clone(),
            _scalar: PhantomData,
        })
    }

    /// Fail unless `ctx` was sized for this plant.
    fn check_context(&self, ctx: &PlantContext<T>) -> Result<()> {
        let (nq, nv) = (self.num_positions(), self.num_velocities());
        if ctx.num_positions() != nq || ctx.num_velocities() != nv {
            return Err(PlantError::invalid_argument(format!(
                "context has {} positions and {} velocities, the plant has {nq} and {nv}",
                ctx.num_positions(),
                ctx.num_velocities()
            )));
        }
        Ok(())
    }
}

fn not_a_geometry_source() -> PlantError {
    PlantError::precondition(
        "the plant is not registered as a geometry source; \
         call register_as_source_for_geometry_system() before finalize",
    )
}
