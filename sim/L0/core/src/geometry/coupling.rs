//! Bookkeeping between the plant's bodies and a geometry engine's ids.

use std::collections::BTreeMap;

use plant_types::{BodyIndex, EngineId, FrameId, GeometryId, PlantError, Result, RigidTransform, SourceId};
use tracing::debug;

use super::{GeometryEngine, GeometryFrame, GeometryInstance, GeometryRole, Shape};

/// Geometry registration state of a plant.
///
/// `engine` remembers which engine instance the source was registered with
/// until finalize; every later registration must present the same engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct GeometryCoupling {
    engine: Option<EngineId>,
    source: Option<SourceId>,
    geometry_to_body: BTreeMap<GeometryId, BodyIndex>,
    body_to_frame: BTreeMap<BodyIndex, FrameId>,
    collision_index: BTreeMap<GeometryId, usize>,
    visual_index: BTreeMap<GeometryId, usize>,
}

/// What to register and where, bundled for [`GeometryCoupling::register_geometry`].
pub(crate) struct GeometryRequest<'a> {
    pub body: BodyIndex,
    pub body_name: &'a str,
    pub x_bg: RigidTransform<f64>,
    pub shape: Shape,
    pub name: &'a str,
    pub role: GeometryRole,
}

impl GeometryCoupling {
    pub(crate) fn register_source(
        &mut self,
        engine: &mut dyn GeometryEngine,
        name: &str,
    ) -> Result<SourceId> {
        if let Some(source) = self.source {
            return Err(PlantError::invalid_argument(format!(
                "this plant is already registered as {source}"
            )));
        }
        let source = engine.register_source(name);
        self.source = Some(source);
        self.engine = Some(engine.engine_id());
        debug!(%source, engine = %engine.engine_id(), "registered as geometry source");
        Ok(source)
    }

    pub(crate) fn register_geometry(
        &mut self,
        engine: &mut dyn GeometryEngine,
        request: GeometryRequest<'_>,
    ) -> Result<GeometryId> {
        let Some(source) = self.source else {
            return Err(PlantError::precondition(
                "geometry registration requires a prior call to \
                 register_as_source_for_geometry_system()",
            ));
        };
        if self.engine != Some(engine.engine_id()) {
            return Err(PlantError::invalid_argument(
                "Geometry registration calls must be performed on the SAME instance of \
                 GeometrySystem used on the first call to RegisterAsSourceForGeometrySystem()",
            ));
        }

        let instance = GeometryInstance::new(request.x_bg, request.shape, request.name, request.role);
        let id = if request.body.is_world() {
            engine.register_anchored_geometry(source, instance)?
        } else {
            let frame = match self.body_to_frame.get(&request.body) {
                Some(&frame) => frame,
                None => {
                    let frame =
                        engine.register_frame(source, GeometryFrame::new(request.body_name))?;
                    self.body_to_frame.insert(request.body, frame);
                    frame
                }
            };
            engine.register_geometry(source, frame, instance)?
        };

        self.geometry_to_body.insert(id, request.body);
        let index = match request.role {
            GeometryRole::Collision => &mut self.collision_index,
            GeometryRole::Visual => &mut self.visual_index,
        };
        let next = index.len();
        index.insert(id, next);
        debug!(geometry = %id, body = %request.body, role = ?request.role, "registered geometry");
        Ok(id)
    }

    /// Drop the engine token. Registration is closed from here on.
    pub(crate) fn finalize(&mut self) {
        self.engine = None;
    }

    pub(crate) fn source(&self) -> Option<SourceId> {
        self.source
    }

    pub(crate) fn engine(&self) -> Option<EngineId> {
        self.engine
    }

    pub(crate) fn num_collision_geometries(&self) -> usize {
        self.collision_index.len()
    }

    pub(crate) fn num_visual_geometries(&self) -> usize {
        self.visual_index.len()
    }

    pub(crate) fn is_collision_geometry(&self, id: GeometryId) -> bool {
        self.collision_index.contains_key(&id)
    }

    pub(crate) fn collision_index(&self, id: GeometryId) -> Option<usize> {
        self.collision_index.get(&id).copied()
    }

    pub(crate) fn body_for_geometry(&self, id: GeometryId) -> Option<BodyIndex> {
        self.geometry_to_body.get(&id).copied()
    }

    pub(crate) fn frame_for_body(&self, body: BodyIndex) -> Option<FrameId> {
        self.body_to_frame.get(&body).copied()
    }

    /// Bodies with a registered frame, with their frame ids, in body order.
    pub(crate) fn body_frames(&self) -> impl Iterator<Item = (BodyIndex, FrameId)> + '_ {
        self.body_to_frame.iter().map(|(&b, &f)| (b, f))
    }
}
