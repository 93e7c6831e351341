//! Per-evaluation state owned by the caller.

use nalgebra::DVector;
use plant_types::{PlantError, Result, Scalar};

use crate::geometry::QueryObject;

/// State and input values for evaluating a plant.
///
/// Holds the continuous state `x = [q; v]` and the values fixed on the
/// plant's input ports. Created by
/// [`MultibodyPlant::create_default_context`](crate::MultibodyPlant::create_default_context).
#[derive(Debug, Clone, PartialEq)]
pub struct PlantContext<T: Scalar> {
    nq: usize,
    state: DVector<T>,
    actuation: Option<DVector<T>>,
    geometry_query: Option<QueryObject>,
}

impl<T: Scalar> PlantContext<T> {
    pub(crate) fn new(q0: &[f64], nv: usize) -> Self {
        let mut state = DVector::zeros(q0.len() + nv);
        for (x, &q) in state.iter_mut().zip(q0) {
            *x = T::from_f64(q);
        }
        Self {
            nq: q0.len(),
            state,
            actuation: None,
            geometry_query: None,
        }
    }

    /// Size of `q`.
    #[must_use]
    pub fn num_positions(&self) -> usize {
        self.nq
    }

    /// Size of `v`.
    #[must_use]
    pub fn num_velocities(&self) -> usize {
        self.state.len() - self.nq
    }

    /// The full state `[q; v]`.
    #[must_use]
    pub fn state(&self) -> &DVector<T> {
        &self.state
    }

    /// Generalized positions.
    #[must_use]
    pub fn positions(&self) -> &[T] {
        &self.state.as_slice()[..self.nq]
    }

    /// Generalized velocities.
    #[must_use]
    pub fn velocities(&self) -> &[T] {
        &self.state.as_slice()[self.nq..]
    }

    /// Replace the full state.
    pub fn set_state(&mut self, state: &DVector<T>) -> Result<()> {
        check_size("state", state.len(), self.state.len())?;
        self.state.copy_from(state);
        Ok(())
    }

    /// Replace the generalized positions.
    pub fn set_positions(&mut self, q: &[T]) -> Result<()> {
        check_size("positions", q.len(), self.nq)?;
        self.state.as_mut_slice()[..self.nq].copy_from_slice(q);
        Ok(())
    }

    /// Replace the generalized velocities.
    pub fn set_velocities(&mut self, v: &[T]) -> Result<()> {
        let nq = self.nq;
        check_size("velocities", v.len(), self.num_velocities())?;
        self.state.as_mut_slice()[nq..].copy_from_slice(v);
        Ok(())
    }

    /// Fix the value of the actuation input port. Its size is checked when
    /// the value is consumed.
    pub fn fix_actuation_input(&mut self, u: DVector<T>) {
        self.actuation = Some(u);
    }

    /// Fix the value of the geometry query input port.
    pub fn fix_geometry_query(&mut self, query: QueryObject) {
        self.geometry_query = Some(query);
    }

    /// The actuation input, if fixed.
    #[must_use]
    pub fn actuation_input(&self) -> Option<&DVector<T>> {
        self.actuation.as_ref()
    }

    /// The geometry query input, if fixed.
    #[must_use]
    pub fn geometry_query(&self) -> Option<&QueryObject> {
        self.geometry_query.as_ref()
    }
}

fn check_size(what: &str, got: usize, expected: usize) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(PlantError::invalid_argument(format!(
            "{what} must have size {expected}, got {got}"
        )))
    }
}
