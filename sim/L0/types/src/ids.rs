//! Typed indices and identifiers.
//!
//! Indices (`BodyIndex`, `JointIndex`, `ActuatorIndex`) address the plant's
//! own arenas. Identifiers (`SourceId`, `FrameId`, `GeometryId`, `EngineId`)
//! are handed out by a geometry engine and are opaque to the plant.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(pub usize);

        impl $name {
            /// Create from a raw index.
            #[must_use]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// The raw index.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(pub u64);

        impl $name {
            /// Create from a raw value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// The raw value.
            #[must_use]
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

index_type!(
    /// Index of a body. `BodyIndex(0)` is always the world body.
    BodyIndex,
    "Body"
);
index_type!(
    /// Index of a joint.
    JointIndex,
    "Joint"
);
index_type!(
    /// Index of a joint actuator.
    ActuatorIndex,
    "Actuator"
);

id_type!(
    /// Identifies one geometry engine instance.
    EngineId,
    "Engine"
);
id_type!(
    /// A registered source of geometry within an engine.
    SourceId,
    "Source"
);
id_type!(
    /// A frame registered with a geometry engine.
    FrameId,
    "Frame"
);
id_type!(
    /// A geometry registered with a geometry engine.
    GeometryId,
    "Geometry"
);

impl BodyIndex {
    /// The distinguished world body.
    pub const WORLD: Self = Self(0);

    /// Whether this is the world body.
    #[must_use]
    pub const fn is_world(self) -> bool {
        self.0 == 0
    }
}
