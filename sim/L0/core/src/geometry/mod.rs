//! Geometry engine interface and shared geometry types.
//!
//! The plant does not own collision detection. It registers its bodies'
//! geometry with a [`GeometryEngine`] before finalize and afterwards
//! consumes a [`QueryObject`] of penetration pairs computed by that engine
//! from the frame poses the plant reports.

mod coupling;
mod scene_graph;

pub(crate) use coupling::{GeometryCoupling, GeometryRequest};
pub use scene_graph::SceneGraph;

use plant_contact::PenetrationPair;
use plant_types::{EngineId, FrameId, GeometryId, Result, RigidTransform, SourceId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometric shape of a registered geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Shape {
    /// Sphere centered on the geometry frame origin.
    Sphere {
        /// Radius (m).
        radius: f64,
    },
    /// The half-space `z <= 0` of the geometry frame. Its outward normal is
    /// the frame's +z axis.
    HalfSpace,
}

/// What a geometry is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GeometryRole {
    /// Participates in contact.
    Collision,
    /// Drawn only.
    Visual,
}

/// A frame to be registered with an engine, one per moving body.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryFrame {
    /// Frame name; the plant uses the body name.
    pub name: String,
}

impl GeometryFrame {
    /// Create a frame description.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A geometry to be registered with an engine.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeometryInstance {
    /// Pose of the geometry in its frame (in world for anchored geometry).
    pub pose: RigidTransform<f64>,
    /// Shape.
    pub shape: Shape,
    /// Name, for diagnostics.
    pub name: String,
    /// Collision or visual.
    pub role: GeometryRole,
}

impl GeometryInstance {
    /// Create a geometry description.
    #[must_use]
    pub fn new(
        pose: RigidTransform<f64>,
        shape: Shape,
        name: impl Into<String>,
        role: GeometryRole,
    ) -> Self {
        Self {
            pose,
            shape,
            name: name.into(),
            role,
        }
    }
}

/// Result of a geometry query: the penetrating pairs of collision geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryObject {
    penetrations: Vec<PenetrationPair>,
}

impl QueryObject {
    /// Wrap a list of penetration pairs.
    #[must_use]
    pub fn new(penetrations: Vec<PenetrationPair>) -> Self {
        Self { penetrations }
    }

    /// Penetrating pairs.
    #[must_use]
    pub fn penetrations(&self) -> &[PenetrationPair] {
        &self.penetrations
    }

    /// Whether no pair penetrates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.penetrations.is_empty()
    }
}

/// A geometry registry and collision engine the plant can register with.
///
/// Every call takes the engine by `&mut`; the plant never stores it, only
/// its [`EngineId`], which it compares on every registration.
pub trait GeometryEngine {
    /// Identity of this engine instance.
    fn engine_id(&self) -> EngineId;

    /// Register a new source of geometry.
    fn register_source(&mut self, name: &str) -> SourceId;

    /// Register a moving frame owned by `source`.
    fn register_frame(&mut self, source: SourceId, frame: GeometryFrame) -> Result<FrameId>;

    /// Register a geometry attached to `frame`.
    fn register_geometry(
        &mut self,
        source: SourceId,
        frame: FrameId,
        geometry: GeometryInstance,
    ) -> Result<GeometryId>;

    /// Register a geometry fixed in the world.
    fn register_anchored_geometry(
        &mut self,
        source: SourceId,
        geometry: GeometryInstance,
    ) -> Result<GeometryId>;
}
