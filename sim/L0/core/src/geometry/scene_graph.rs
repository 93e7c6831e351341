//! A small in-process geometry engine.
//!
//! [`SceneGraph`] keeps the registered sources, frames and geometries and
//! answers penetration queries for spheres and half-spaces. It exists so
//! that the plant's geometry coupling can be exercised end to end; it is not
//! a general collision library.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use nalgebra::Vector3;
use plant_contact::PenetrationPair;
use plant_types::{
    EngineId, FrameId, GeometryId, PlantError, Result, RigidTransform, SourceId,
};

use super::{GeometryEngine, GeometryFrame, GeometryInstance, GeometryRole, QueryObject, Shape};

/// Distances below this are treated as coincident centers.
const GEOM_EPSILON: f64 = 1e-12;

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone)]
struct SourceData {
    name: String,
}

#[derive(Debug, Clone)]
struct FrameData {
    source: SourceId,
    name: String,
}

#[derive(Debug, Clone)]
struct GeometryData {
    source: SourceId,
    /// `None` for anchored geometry.
    frame: Option<FrameId>,
    instance: GeometryInstance,
}

/// Reference geometry engine supporting spheres and half-spaces.
#[derive(Debug)]
pub struct SceneGraph {
    id: EngineId,
    next_id: u64,
    sources: BTreeMap<SourceId, SourceData>,
    frames: BTreeMap<FrameId, FrameData>,
    geometries: BTreeMap<GeometryId, GeometryData>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create an empty engine with a process-unique [`EngineId`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: EngineId::new(NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed)),
            next_id: 1,
            sources: BTreeMap::new(),
            frames: BTreeMap::new(),
            geometries: BTreeMap::new(),
        }
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_source(&self, source: SourceId) -> Result<()> {
        if self.sources.contains_key(&source) {
            Ok(())
        } else {
            Err(PlantError::invalid_argument(format!(
                "{source} is not registered with this geometry engine"
            )))
        }
    }

    /// Name of a registered source.
    #[must_use]
    pub fn source_name(&self, source: SourceId) -> Option<&str> {
        self.sources.get(&source).map(|s| s.name.as_str())
    }

    /// Name of a registered frame.
    #[must_use]
    pub fn frame_name(&self, frame: FrameId) -> Option<&str> {
        self.frames.get(&frame).map(|f| f.name.as_str())
    }

    /// A registered geometry.
    #[must_use]
    pub fn geometry(&self, geometry: GeometryId) -> Option<&GeometryInstance> {
        self.geometries.get(&geometry).map(|g| &g.instance)
    }

    /// Frame a geometry is attached to; `None` for anchored or unknown ids.
    #[must_use]
    pub fn frame_of(&self, geometry: GeometryId) -> Option<FrameId> {
        self.geometries.get(&geometry).and_then(|g| g.frame)
    }

    /// Number of registered frames.
    #[must_use]
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of registered geometries.
    #[must_use]
    pub fn num_geometries(&self) -> usize {
        self.geometries.len()
    }

    /// Compute all penetrating pairs of collision geometry.
    ///
    /// `frame_ids` and `poses` are the source's frame-pose report: `poses[i]`
    /// is `X_WF` of `frame_ids[i]`. Every frame of `source` must be posed.
    /// Geometry fixed to the same frame, or anchored together, never collides.
    pub fn query_object(
        &self,
        source: SourceId,
        frame_ids: &[FrameId],
        poses: &[RigidTransform<f64>],
    ) -> Result<QueryObject> {
        self.check_source(source)?;
        if frame_ids.len() != poses.len() {
            return Err(PlantError::invalid_argument(format!(
                "{} frame ids but {} poses",
                frame_ids.len(),
                poses.len()
            )));
        }
        let mut x_wf = BTreeMap::new();
        for (id, pose) in frame_ids.iter().zip(poses) {
            match self.frames.get(id) {
                Some(frame) if frame.source == source => {
                    x_wf.insert(*id, *pose);
                }
                _ => {
                    return Err(PlantError::invalid_argument(format!(
                        "{id} does not belong to {source}"
                    )));
                }
            }
        }

        let mut posed = Vec::new();
        for (&id, data) in &self.geometries {
            if data.instance.role != GeometryRole::Collision || data.source != source {
                continue;
            }
            let x_wg = match data.frame {
                None => data.instance.pose,
                Some(frame) => {
                    let x = x_wf.get(&frame).ok_or_else(|| {
                        PlantError::invalid_argument(format!("no pose reported for {frame}"))
                    })?;
                    *x * data.instance.pose
                }
            };
            posed.push((id, data.frame, x_wg, data.instance.shape));
        }

        let mut penetrations = Vec::new();
        for (i, a) in posed.iter().enumerate() {
            for b in &posed[i + 1..] {
                if a.1 == b.1 {
                    continue;
                }
                let pair = match (a.3, b.3) {
                    (Shape::Sphere { radius: ra }, Shape::Sphere { radius: rb }) => {
                        sphere_sphere(a.0, &a.2.translation, ra, b.0, &b.2.translation, rb)
                    }
                    (Shape::Sphere { radius }, Shape::HalfSpace) => {
                        sphere_half_space(a.0, &a.2.translation, radius, b.0, &b.2)
                    }
                    (Shape::HalfSpace, Shape::Sphere { radius }) => {
                        sphere_half_space(b.0, &b.2.translation, radius, a.0, &a.2)
                    }
                    (Shape::HalfSpace, Shape::HalfSpace) => None,
                };
                penetrations.extend(pair);
            }
        }
        Ok(QueryObject::new(penetrations))
    }
}

/// Sphere `A` against sphere `B`. The normal points from `B`'s center toward
/// `A`'s; for coincident centers it is +Z.
fn sphere_sphere(
    id_a: GeometryId,
    center_a: &Vector3<f64>,
    radius_a: f64,
    id_b: GeometryId,
    center_b: &Vector3<f64>,
    radius_b: f64,
) -> Option<PenetrationPair> {
    let diff = center_a - center_b;
    let dist = diff.norm();
    let depth = radius_a + radius_b - dist;
    if depth <= 0.0 {
        return None;
    }
    let nhat_ba_w = if dist > GEOM_EPSILON {
        diff / dist
    } else {
        Vector3::z()
    };
    Some(PenetrationPair {
        id_a,
        id_b,
        p_wca: center_a - nhat_ba_w * radius_a,
        p_wcb: center_b + nhat_ba_w * radius_b,
        nhat_ba_w,
        depth,
    })
}

/// Sphere `A` against the half-space `B` posed by `x_wh`.
fn sphere_half_space(
    id_a: GeometryId,
    center: &Vector3<f64>,
    radius: f64,
    id_b: GeometryId,
    x_wh: &RigidTransform<f64>,
) -> Option<PenetrationPair> {
    let normal: Vector3<f64> = x_wh.rotation.column(2).into_owned();
    let center_dist = normal.dot(&(center - x_wh.translation));
    let depth = radius - center_dist;
    if depth <= 0.0 {
        return None;
    }
    Some(PenetrationPair {
        id_a,
        id_b,
        p_wca: center - normal * radius,
        p_wcb: center - normal * center_dist,
        nhat_ba_w: normal,
        depth,
    })
}

impl GeometryEngine for SceneGraph {
    fn engine_id(&self) -> EngineId {
        self.id
    }

    fn register_source(&mut self, name: &str) -> SourceId {
        let id = SourceId::new(self.allocate());
        self.sources.insert(
            id,
            SourceData {
                name: name.to_string(),
            },
        );
        id
    }

    fn register_frame(&mut self, source: SourceId, frame: GeometryFrame) -> Result<FrameId> {
        self.check_source(source)?;
        let id = FrameId::new(self.allocate());
        self.frames.insert(
            id,
            FrameData {
                source,
                name: frame.name,
            },
        );
        Ok(id)
    }

    fn register_geometry(
        &mut self,
        source: SourceId,
        frame: FrameId,
        geometry: GeometryInstance,
    ) -> Result<GeometryId> {
        self.check_source(source)?;
        match self.frames.get(&frame) {
            Some(data) if data.source == source => {}
            _ => {
                return Err(PlantError::invalid_argument(format!(
                    "{frame} does not belong to {source}"
                )));
            }
        }
        check_shape(&geometry.shape)?;
        let id = GeometryId::new(self.allocate());
        self.geometries.insert(
            id,
            GeometryData {
                source,
                frame: Some(frame),
                instance: geometry,
            },
        );
        Ok(id)
    }

    fn register_anchored_geometry(
        &mut self,
        source: SourceId,
        geometry: GeometryInstance,
    ) -> Result<GeometryId> {
        self.check_source(source)?;
        check_shape(&geometry.shape)?;
        let id = GeometryId::new(self.allocate());
        self.geometries.insert(
            id,
            GeometryData {
                source,
                frame: None,
                instance: geometry,
            },
        );
        Ok(id)
    }
}

fn check_shape(shape: &Shape) -> Result<()> {
    match shape {
        Shape::Sphere { radius } if !(radius.is_finite() && *radius > 0.0) => Err(
            PlantError::invalid_argument(format!("sphere radius must be positive, got {radius}")),
        ),
        _ => Ok(()),
    }
}
