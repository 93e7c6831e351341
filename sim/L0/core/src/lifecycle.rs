//! The build/finalize lifecycle of a plant.
//!
//! A plant starts in [`LifecycleState::Building`], where its structure can be
//! extended, and moves once and for all to [`LifecycleState::Finalized`],
//! where it can be evaluated. Each public operation asks the gate before
//! doing anything else.

use plant_types::{PlantError, Result};
use tracing::debug;

/// Lifecycle state of a plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Structure may still be added.
    #[default]
    Building,
    /// Structure is frozen; the plant can be evaluated.
    Finalized,
}

/// Guards operations by lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct LifecycleGate {
    state: LifecycleState,
}

impl LifecycleGate {
    pub(crate) fn state(self) -> LifecycleState {
        self.state
    }

    pub(crate) fn is_finalized(self) -> bool {
        self.state == LifecycleState::Finalized
    }

    /// Fail unless still building.
    pub(crate) fn require_building(self, operation: &str) -> Result<()> {
        match self.state {
            LifecycleState::Building => Ok(()),
            LifecycleState::Finalized => Err(PlantError::post_finalize_call(operation)),
        }
    }

    /// Fail unless finalized.
    pub(crate) fn require_finalized(self, operation: &str) -> Result<()> {
        match self.state {
            LifecycleState::Finalized => Ok(()),
            LifecycleState::Building => Err(PlantError::pre_finalize_call(operation)),
        }
    }

    /// The one transition. A second call is a lifecycle violation.
    pub(crate) fn finalize(&mut self) -> Result<()> {
        self.require_building("finalize")?;
        self.state = LifecycleState::Finalized;
        debug!("plant finalized");
        Ok(())
    }
}
