//! Geometry registration and the geometry output ports.

use plant_types::{BodyIndex, FrameId, GeometryId, Result, RigidTransform, Scalar, SourceId};

use super::{MultibodyPlant, not_a_geometry_source};
use crate::context::PlantContext;
use crate::geometry::{GeometryEngine, GeometryRequest, GeometryRole, Shape};
use crate::kinematics::{PositionKinematicsCache, calc_position_kinematics};

impl<T: Scalar> MultibodyPlant<T> {
    /// Register this plant as a source of geometry with `engine`.
    ///
    /// Every later registration must pass the same engine instance.
    pub fn register_as_source_for_geometry_system(
        &mut self,
        engine: &mut dyn GeometryEngine,
    ) -> Result<SourceId> {
        self.lifecycle
            .require_building("register_as_source_for_geometry_system")?;
        self.geometry.register_source(engine, "MultibodyPlant")
    }

    /// Attach visual geometry to `body` at pose `x_bg` in the body frame.
    pub fn register_visual_geometry(
        &mut self,
        body: BodyIndex,
        x_bg: RigidTransform<f64>,
        shape: Shape,
        name: &str,
        engine: &mut dyn GeometryEngine,
    ) -> Result<GeometryId> {
        self.lifecycle.require_building("register_visual_geometry")?;
        self.register_geometry(body, x_bg, shape, name, GeometryRole::Visual, engine)
    }

    /// Attach collision geometry to `body` at pose `x_bg` in the body frame.
    ///
    /// Geometry on the world body is registered as anchored.
    pub fn register_collision_geometry(
        &mut self,
        body: BodyIndex,
        x_bg: RigidTransform<f64>,
        shape: Shape,
        name: &str,
        engine: &mut dyn GeometryEngine,
    ) -> Result<GeometryId> {
        self.lifecycle.require_building("register_collision_geometry")?;
        self.register_geometry(body, x_bg, shape, name, GeometryRole::Collision, engine)
    }

    fn register_geometry(
        &mut self,
        body: BodyIndex,
        x_bg: RigidTransform<f64>,
        shape: Shape,
        name: &str,
        role: GeometryRole,
        engine: &mut dyn GeometryEngine,
    ) -> Result<GeometryId> {
        let body_name = self.tree.body(body)?.name();
        self.geometry.register_geometry(
            engine,
            GeometryRequest {
                body,
                body_name,
                x_bg,
                shape,
                name,
                role,
            },
        )
    }

    /// Number of registered visual geometries.
    #[must_use]
    pub fn num_visual_geometries(&self) -> usize {
        self.geometry.num_visual_geometries()
    }

    /// Number of registered collision geometries.
    #[must_use]
    pub fn num_collision_geometries(&self) -> usize {
        self.geometry.num_collision_geometries()
    }

    /// Whether `id` was registered by this plant as collision geometry.
    #[must_use]
    pub fn is_collision_geometry(&self, id: GeometryId) -> bool {
        self.geometry.is_collision_geometry(id)
    }

    /// Body a geometry is attached to.
    #[must_use]
    pub fn body_for_geometry(&self, id: GeometryId) -> Option<BodyIndex> {
        self.geometry.body_for_geometry(id)
    }

    /// Engine frame registered for `body`, if it carries geometry.
    #[must_use]
    pub fn frame_id_for_body(&self, body: BodyIndex) -> Option<FrameId> {
        self.geometry.frame_for_body(body)
    }

    /// Source id assigned by the engine.
    #[must_use]
    pub fn source_id(&self) -> Option<SourceId> {
        self.geometry.source()
    }

    /// Whether the plant registered as a geometry source.
    #[must_use]
    pub fn geometry_source_is_registered(&self) -> bool {
        self.geometry.source().is_some()
    }

    /// Frame ids in the order of [`calc_frame_pose_output`](Self::calc_frame_pose_output).
    pub fn geometry_frame_ids(&self) -> Result<&[FrameId]> {
        self.lifecycle.require_finalized("geometry_frame_ids")?;
        if !self.geometry_source_is_registered() {
            return Err(not_a_geometry_source());
        }
        Ok(&self.frame_ids)
    }

    /// `X_WB` of every body carrying geometry, in the order of
    /// [`geometry_frame_ids`](Self::geometry_frame_ids).
    pub fn calc_frame_pose_output(&self, ctx: &PlantContext<T>) -> Result<Vec<RigidTransform<T>>> {
        self.lifecycle.require_finalized("calc_frame_pose_output")?;
        if !self.geometry_source_is_registered() {
            return Err(not_a_geometry_source());
        }
        self.check_context(ctx)?;

        let mut pc = PositionKinematicsCache::new(self.num_bodies());
        calc_position_kinematics(&self.tree, ctx.positions(), &mut pc);
        Ok(self
            .geometry
            .body_frames()
            .map(|(body, _)| *pc.get_x_wb(body))
            .collect())
    }
}
