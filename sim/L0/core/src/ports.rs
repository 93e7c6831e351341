//! Port declarations of a finalized plant.
//!
//! Ports describe the plant's inputs and outputs to the surrounding system.
//! They are declared at finalize, sized from the frozen topology.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Direction of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PortDirection {
    /// Value supplied to the plant.
    Input,
    /// Value computed by the plant.
    Output,
}

/// Kind of value a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PortKind {
    /// A numeric vector of fixed size.
    Vector {
        /// Number of elements.
        size: usize,
    },
    /// A structured value (a query object, a list of ids or poses).
    Abstract,
}

/// Description of one port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PortDescriptor {
    /// Port name.
    pub name: &'static str,
    /// Input or output.
    pub direction: PortDirection,
    /// Value kind and size.
    pub kind: PortKind,
}

impl PortDescriptor {
    fn input(name: &'static str, kind: PortKind) -> Self {
        Self {
            name,
            direction: PortDirection::Input,
            kind,
        }
    }

    fn output(name: &'static str, kind: PortKind) -> Self {
        Self {
            name,
            direction: PortDirection::Output,
            kind,
        }
    }

    /// Vector size, or `None` for abstract ports.
    #[must_use]
    pub fn size(&self) -> Option<usize> {
        match self.kind {
            PortKind::Vector { size } => Some(size),
            PortKind::Abstract => None,
        }
    }
}

/// The ports a plant declares at finalize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlantPorts {
    pub actuation: Option<PortDescriptor>,
    pub geometry_query: Option<PortDescriptor>,
    pub geometry_ids: Option<PortDescriptor>,
    pub geometry_poses: Option<PortDescriptor>,
    pub continuous_state: PortDescriptor,
}

impl PlantPorts {
    /// Declare ports for a plant with `num_actuated_dofs` actuated dofs and
    /// `num_states` continuous states. Geometry ports exist only when the
    /// plant is a registered geometry source.
    pub(crate) fn declare(num_actuated_dofs: Option<usize>, geometry_source: bool, num_states: usize) -> Self {
        let (geometry_query, geometry_ids, geometry_poses) = if geometry_source {
            (
                Some(PortDescriptor::input("geometry_query", PortKind::Abstract)),
                Some(PortDescriptor::output("geometry_ids", PortKind::Abstract)),
                Some(PortDescriptor::output("geometry_poses", PortKind::Abstract)),
            )
        } else {
            (None, None, None)
        };
        Self {
            actuation: num_actuated_dofs
                .map(|size| PortDescriptor::input("actuation", PortKind::Vector { size })),
            geometry_query,
            geometry_ids,
            geometry_poses,
            continuous_state: PortDescriptor::output(
                "continuous_state",
                PortKind::Vector { size: num_states },
            ),
        }
    }
}
