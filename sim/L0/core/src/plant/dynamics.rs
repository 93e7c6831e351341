//! Kinematics evaluation, contact forces and the equations of motion.
//!
//! ```text
//! M(q) v̇ + C(q, v) v = τ_app + Σ J_WBᵀ F_app
//! q̇ = N(q) v
//! ```
//!
//! The right-hand side collects gravity, actuation and penalty contact.
//! `M` comes from inverse dynamics (one column per unit acceleration) or
//! CRBA, and the bias `C v − τ_app − Σ Jᵀ F` from a single inverse-dynamics
//! pass at zero acceleration.

use nalgebra::{DMatrix, DVector, Vector3};
use plant_contact::{BodyKinematics, PenaltyContactModel};
use plant_types::{
    BodyIndex, MassMatrixAlgorithm, PlantError, Result, Scalar, SpatialForce, SpatialVelocity,
};
use tracing::trace;

use super::MultibodyPlant;
use crate::context::PlantContext;
use crate::dynamics::crba::composite_rigid_body_mass_matrix;
use crate::dynamics::inverse::inverse_dynamics;
use crate::kinematics::{
    PositionKinematicsCache, VelocityKinematicsCache, calc_position_kinematics,
    calc_velocity_kinematics,
};
use crate::linalg::solve_symmetric;
use crate::multibody::MultibodyForces;

impl<T: Scalar> MultibodyPlant<T> {
    /// Compute `X_WB` of every body from the context's positions.
    pub fn eval_position_kinematics(
        &self,
        ctx: &PlantContext<T>,
        pc: &mut PositionKinematicsCache<T>,
    ) -> Result<()> {
        self.lifecycle.require_finalized("eval_position_kinematics")?;
        self.check_context(ctx)?;
        calc_position_kinematics(&self.tree, ctx.positions(), pc);
        Ok(())
    }

    /// Compute `V_WB` of every body from the context's velocities. `pc`
    /// must hold the poses for the same context.
    pub fn eval_velocity_kinematics(
        &self,
        ctx: &PlantContext<T>,
        pc: &PositionKinematicsCache<T>,
        vc: &mut VelocityKinematicsCache<T>,
    ) -> Result<()> {
        self.lifecycle.require_finalized("eval_velocity_kinematics")?;
        self.check_context(ctx)?;
        self.check_bodies("position cache", pc.num_bodies())?;
        calc_velocity_kinematics(&self.tree, ctx.velocities(), pc, vc);
        Ok(())
    }

    /// The generalized mass matrix `M(q)`.
    pub fn calc_mass_matrix(&self, ctx: &PlantContext<T>) -> Result<DMatrix<T>> {
        self.lifecycle.require_finalized("calc_mass_matrix")?;
        self.check_context(ctx)?;
        let mut pc = PositionKinematicsCache::new(self.num_bodies());
        calc_position_kinematics(&self.tree, ctx.positions(), &mut pc);
        Ok(self.mass_matrix(&pc))
    }

    fn mass_matrix(&self, pc: &PositionKinematicsCache<T>) -> DMatrix<T> {
        match self.config.mass_matrix {
            MassMatrixAlgorithm::CompositeRigidBody => {
                composite_rigid_body_mass_matrix(&self.tree, pc)
            }
            MassMatrixAlgorithm::InverseDynamics => {
                // Column j is the generalized force for v̇ = e_j at rest.
                let nv = self.num_velocities();
                let mut m = DMatrix::zeros(nv, nv);
                let mut vdot = vec![T::zero(); nv];
                for j in 0..nv {
                    vdot[j] = T::one();
                    let column = inverse_dynamics(&self.tree, pc, None, &vdot, None);
                    m.set_column(j, &column);
                    vdot[j] = T::zero();
                }
                m
            }
        }
    }

    /// Inverse dynamics: the generalized forces
    /// `τ = M(q) v̇ + C(q, v) v − τ_app − Σ J_WBᵀ F_app`
    /// realizing `vdot` under the applied `forces`.
    pub fn calc_inverse_dynamics(
        &self,
        ctx: &PlantContext<T>,
        pc: &PositionKinematicsCache<T>,
        vc: &VelocityKinematicsCache<T>,
        vdot: &DVector<T>,
        forces: &MultibodyForces<T>,
    ) -> Result<DVector<T>> {
        self.lifecycle.require_finalized("calc_inverse_dynamics")?;
        self.check_context(ctx)?;
        self.check_bodies("position cache", pc.num_bodies())?;
        self.check_bodies("velocity cache", vc.num_bodies())?;
        self.check_forces(forces)?;
        let nv = self.num_velocities();
        if vdot.len() != nv {
            return Err(PlantError::invalid_argument(format!(
                "vdot must have size {nv}, got {}",
                vdot.len()
            )));
        }
        Ok(inverse_dynamics(&self.tree, pc, Some(vc), vdot.as_slice(), Some(forces)))
    }

    /// Add the penalty contact forces of every penetrating collision pair
    /// in the context's geometry query to `forces`.
    ///
    /// Only available for plain `f64` evaluation.
    pub fn calc_and_add_contact_forces_by_penalty_method(
        &self,
        ctx: &PlantContext<T>,
        pc: &PositionKinematicsCache<T>,
        vc: &VelocityKinematicsCache<T>,
        forces: &mut MultibodyForces<T>,
    ) -> Result<()> {
        const OPERATION: &str = "calc_and_add_contact_forces_by_penalty_method";
        self.lifecycle.require_finalized(OPERATION)?;
        if T::DIFFERENTIABLE {
            return Err(PlantError::unsupported(OPERATION, T::NAME));
        }
        self.check_context(ctx)?;
        self.check_bodies("position cache", pc.num_bodies())?;
        self.check_bodies("velocity cache", vc.num_bodies())?;
        self.check_forces(forces)?;
        if self.num_collision_geometries() == 0 {
            return Ok(());
        }

        let query = ctx.geometry_query().ok_or_else(|| {
            PlantError::precondition("the geometry query input port is not connected")
        })?;
        let Some(params) = self.penalty else {
            return Ok(());
        };
        let model = PenaltyContactModel::new(params);

        for pair in query.penetrations() {
            if !(self.is_collision_geometry(pair.id_a) && self.is_collision_geometry(pair.id_b)) {
                continue;
            }
            let (Some(body_a), Some(body_b)) = (
                self.body_for_geometry(pair.id_a),
                self.body_for_geometry(pair.id_b),
            ) else {
                continue;
            };
            if body_a.is_world() && body_b.is_world() {
                continue;
            }

            let kin_a = body_kinematics(pc, vc, body_a);
            let kin_b = body_kinematics(pc, vc, body_b);
            let Some(contact) = model.compute_pair_force(pair, &kin_a, &kin_b) else {
                continue;
            };
            trace!(%body_a, %body_b, fn_ = contact.normal_force, "applying contact force");

            if !body_a.is_world() {
                forces.body_forces[body_a.index()] += lift_force(&contact.on_body_a(&kin_a.p_wo));
            }
            if !body_b.is_world() {
                forces.body_forces[body_b.index()] += lift_force(&contact.on_body_b(&kin_b.p_wo));
            }
        }
        Ok(())
    }

    /// Time derivatives of the continuous state, `[q̇; v̇]`.
    pub fn calc_time_derivatives(&self, ctx: &PlantContext<T>) -> Result<DVector<T>> {
        self.lifecycle.require_finalized("calc_time_derivatives")?;
        self.check_context(ctx)?;
        let (nq, nv, nb) = (self.num_positions(), self.num_velocities(), self.num_bodies());

        let mut pc = PositionKinematicsCache::new(nb);
        let mut vc = VelocityKinematicsCache::new(nb);
        calc_position_kinematics(&self.tree, ctx.positions(), &mut pc);
        calc_velocity_kinematics(&self.tree, ctx.velocities(), &pc, &mut vc);

        let mut forces = MultibodyForces::zeros(nb, nv);
        self.add_gravity_forces(&pc, &mut forces);
        self.add_actuation(ctx, &mut forces)?;

        let m = self.mass_matrix(&pc);

        if self.num_collision_geometries() > 0 {
            self.calc_and_add_contact_forces_by_penalty_method(ctx, &pc, &vc, &mut forces)?;
        }

        let zero = vec![T::zero(); nv];
        let tau = inverse_dynamics(&self.tree, &pc, Some(&vc), &zero, Some(&forces));
        let vdot = solve_symmetric(m, &(-tau));

        let mut xdot = DVector::zeros(nq + nv);
        let qdot = self.velocity_to_qdot(ctx.positions(), ctx.velocities());
        xdot.rows_mut(0, nq).copy_from(&qdot);
        xdot.rows_mut(nq, nv).copy_from(&vdot);
        Ok(xdot)
    }

    /// `q̇ = N(q) v` at the context's positions.
    pub fn map_velocity_to_qdot(&self, ctx: &PlantContext<T>, v: &DVector<T>) -> Result<DVector<T>> {
        self.lifecycle.require_finalized("map_velocity_to_qdot")?;
        self.check_context(ctx)?;
        let nv = self.num_velocities();
        if v.len() != nv {
            return Err(PlantError::invalid_argument(format!(
                "v must have size {nv}, got {}",
                v.len()
            )));
        }
        Ok(self.velocity_to_qdot(ctx.positions(), v.as_slice()))
    }

    /// `v = N⁺(q) q̇` at the context's positions, the inverse of
    /// [`map_velocity_to_qdot`](Self::map_velocity_to_qdot) for unit
    /// quaternions.
    pub fn map_qdot_to_velocity(&self, ctx: &PlantContext<T>, qdot: &DVector<T>) -> Result<DVector<T>> {
        self.lifecycle.require_finalized("map_qdot_to_velocity")?;
        self.check_context(ctx)?;
        let nq = self.num_positions();
        if qdot.len() != nq {
            return Err(PlantError::invalid_argument(format!(
                "qdot must have size {nq}, got {}",
                qdot.len()
            )));
        }
        let q = ctx.positions();
        let mut v = DVector::zeros(self.num_velocities());
        for joint in self.tree.joints() {
            let vs = joint.v_start();
            joint.map_qdot_to_velocity(
                joint.positions(q),
                joint.positions(qdot.as_slice()),
                &mut v.as_mut_slice()[vs..vs + joint.nv()],
            );
        }
        Ok(v)
    }

    /// The continuous state `[q; v]` as the state output port reports it.
    pub fn calc_continuous_state_output(&self, ctx: &PlantContext<T>) -> Result<DVector<T>> {
        self.lifecycle.require_finalized("calc_continuous_state_output")?;
        self.check_context(ctx)?;
        Ok(ctx.state().clone())
    }

    fn velocity_to_qdot(&self, q: &[T], v: &[T]) -> DVector<T> {
        let mut qdot = DVector::zeros(self.num_positions());
        for joint in self.tree.joints() {
            let qs = joint.q_start();
            joint.map_velocity_to_qdot(
                joint.positions(q),
                joint.velocities(v),
                &mut qdot.as_mut_slice()[qs..qs + joint.nq()],
            );
        }
        qdot
    }

    /// Weight `m g` of every body, applied at its COM and referred to its origin.
    fn add_gravity_forces(&self, pc: &PositionKinematicsCache<T>, forces: &mut MultibodyForces<T>) {
        let Some(gravity) = self.tree.gravity() else {
            return;
        };
        for body in self.tree.bodies().iter().skip(1) {
            let props = body.default_mass_properties();
            let x_wb = pc.get_x_wb(body.index());
            let p_wcm = x_wb.transform_point(&props.center_of_mass.map(T::from_f64));
            let weight = gravity.force_on_mass(props.mass).map(T::from_f64);
            forces.body_forces[body.index().index()] +=
                SpatialForce::new(Vector3::zeros(), weight).shift(&(x_wb.translation - p_wcm));
        }
    }

    fn add_actuation(&self, ctx: &PlantContext<T>, forces: &mut MultibodyForces<T>) -> Result<()> {
        if self.num_actuators() == 0 {
            return Ok(());
        }
        let u = ctx.actuation_input().ok_or_else(|| {
            PlantError::precondition("the actuation input port is not connected")
        })?;
        let nu = self.num_actuated_dofs();
        if u.len() != nu {
            return Err(PlantError::invalid_argument(format!(
                "actuation input must have size {nu}, got {}",
                u.len()
            )));
        }
        for (i, actuator) in self.tree.actuators().iter().enumerate() {
            let joint = self.tree.joint(actuator.joint())?;
            if joint.nv() != 1 {
                return Err(PlantError::precondition(format!(
                    "actuator '{}' drives {} joint '{}'; only single-dof joints can be actuated",
                    actuator.name(),
                    joint.joint_type(),
                    joint.name()
                )));
            }
            forces.generalized[joint.v_start()] += u[i];
        }
        Ok(())
    }

    fn check_bodies(&self, what: &str, got: usize) -> Result<()> {
        let nb = self.num_bodies();
        if got != nb {
            return Err(PlantError::invalid_argument(format!(
                "{what} holds {got} bodies, the plant has {nb}"
            )));
        }
        Ok(())
    }

    fn check_forces(&self, forces: &MultibodyForces<T>) -> Result<()> {
        let (nb, nv) = (self.num_bodies(), self.num_velocities());
        if forces.num_bodies() != nb || forces.num_velocities() != nv {
            return Err(PlantError::invalid_argument(format!(
                "forces are sized for {} bodies and {} velocities, the plant has {nb} and {nv}",
                forces.num_bodies(),
                forces.num_velocities()
            )));
        }
        Ok(())
    }
}

/// Plain-valued pose origin and velocity of `body`.
fn body_kinematics<T: Scalar>(
    pc: &PositionKinematicsCache<T>,
    vc: &VelocityKinematicsCache<T>,
    body: BodyIndex,
) -> BodyKinematics {
    let v = vc.get_v_wb(body);
    BodyKinematics::new(
        pc.get_p_wbo(body).map(|x| x.value()),
        SpatialVelocity::new(
            v.rotational.map(|x| x.value()),
            v.translational.map(|x| x.value()),
        ),
    )
}

fn lift_force<T: Scalar>(f: &SpatialForce<f64>) -> SpatialForce<T> {
    SpatialForce::new(f.rotational.map(T::from_f64), f.translational.map(T::from_f64))
}
