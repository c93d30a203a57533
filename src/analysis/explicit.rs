//! Newmark-β time integration of `M·a + C·v + K·u = F`
//!
//! Each step solves for the new accelerations with the effective matrix
//! `M + γ·dt·C + β·dt²·K`. The factorization is cached and rebuilt only
//! when the step size changes.

use log::debug;
use nalgebra_sparse::CsrMatrix;

use super::ExplicitOptions;
use crate::elements::NUM_DOFS;
use crate::error::{FEAError, FEAResult};
use crate::loads::{BcKind, Force};
use crate::math::{self, sparse_matvec, SparseCholeskySolver, ValueCompare, Vec as FEVec};
use crate::mesh::Mesh;
use crate::results::{node_block, NodeDisplacement, NodeForces};

/// Factorized effective matrix for one step size
#[derive(Debug, Clone)]
struct EffectiveMatrix {
    dt: f64,
    factor: SparseCholeskySolver,
}

/// Explicit dynamics engine over an assembled mesh
#[derive(Debug, Clone)]
pub struct ExplicitSystem {
    mesh: Mesh,
    forces: Vec<Force>,
    options: ExplicitOptions,
    compare: ValueCompare<f64>,
    damping: CsrMatrix<f64>,
    effective: Option<EffectiveMatrix>,
    factorizations: usize,
    displacements: FEVec,
    velocities: FEVec,
    accelerations: FEVec,
    force_vector: FEVec,
    rhs: FEVec,
    time: f64,
    time_step: Option<f64>,
}

impl ExplicitSystem {
    /// Set up the integrator at time `t0` with initial displacements and
    /// velocities
    ///
    /// Accelerations start at zero. Boundary conditions are applied to the
    /// initial state immediately.
    pub fn new(
        mesh: Mesh,
        forces: Vec<Force>,
        displacements: FEVec,
        velocities: FEVec,
        t0: f64,
        options: ExplicitOptions,
    ) -> FEAResult<Self> {
        let n = mesh.num_dofs();

        if displacements.len() != n {
            return Err(FEAError::SizeMismatch(format!(
                "initial displacements have {} entries, mesh has {} DOFs",
                displacements.len(),
                n
            )));
        }
        if velocities.len() != n {
            return Err(FEAError::SizeMismatch(format!(
                "initial velocities have {} entries, mesh has {} DOFs",
                velocities.len(),
                n
            )));
        }
        for force in &forces {
            if force.global_index() >= n {
                return Err(FEAError::InvalidInput(format!(
                    "force on node {} but mesh has {} nodes",
                    force.node(),
                    n / NUM_DOFS
                )));
            }
        }

        let damping = math::scaled_sum(
            n,
            &[
                (options.damping_alpha, mesh.mass()),
                (options.damping_beta, mesh.stiffness()),
            ],
        )?;

        let mut system = Self {
            mesh,
            forces,
            options,
            compare: ValueCompare::new(),
            damping,
            effective: None,
            factorizations: 0,
            displacements,
            velocities,
            accelerations: FEVec::zeros(n),
            force_vector: FEVec::zeros(n),
            rhs: FEVec::zeros(n),
            time: t0,
            time_step: None,
        };
        system.apply_bcs(t0);

        Ok(system)
    }

    /// Advance the state by `dt`
    pub fn update(&mut self, dt: f64) -> FEAResult<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(FEAError::InvalidTimeStep(dt));
        }

        let stale = match &self.effective {
            Some(effective) => !self.compare.equal(effective.dt, dt),
            None => true,
        };
        if stale {
            self.effective = Some(self.factorize_effective(dt)?);
        }

        let t1 = self.time + dt;
        let ExplicitOptions { beta, gamma, .. } = self.options;

        for force in &self.forces {
            self.force_vector[force.global_index()] = force.value_at(t1);
        }

        let velocity_predictor = &self.velocities + &self.accelerations * ((1.0 - gamma) * dt);
        let displacement_predictor = &self.displacements
            + &self.velocities * dt
            + &self.accelerations * ((0.5 - beta) * dt * dt);

        self.rhs = &self.force_vector
            - sparse_matvec(&self.damping, &velocity_predictor)
            - sparse_matvec(self.mesh.stiffness(), &displacement_predictor);

        self.apply_bcs(t1);

        let effective = self
            .effective
            .as_ref()
            .ok_or_else(|| FEAError::SolveError("effective matrix not factorized".to_string()))?;
        let next_accelerations = effective.factor.solve(&self.rhs)?;

        let next_velocities = &self.velocities
            + &self.accelerations * ((1.0 - gamma) * dt)
            + &next_accelerations * (gamma * dt);
        let next_displacements = &self.displacements
            + &self.velocities * dt
            + &self.accelerations * (dt * dt * (0.5 - beta))
            + &next_accelerations * (dt * dt * beta);

        self.displacements = next_displacements;
        self.velocities = next_velocities;
        self.accelerations = next_accelerations;
        self.time = t1;
        self.time_step = Some(dt);

        Ok(())
    }

    fn factorize_effective(&mut self, dt: f64) -> FEAResult<EffectiveMatrix> {
        let ExplicitOptions { beta, gamma, .. } = self.options;

        let lhs = math::scaled_sum(
            self.mesh.num_dofs(),
            &[
                (1.0, self.mesh.mass()),
                (gamma * dt, &self.damping),
                (beta * dt * dt, self.mesh.stiffness()),
            ],
        )?;
        let factor = SparseCholeskySolver::factorize(&lhs)?;

        self.factorizations += 1;
        debug!(
            "Factorized effective matrix for dt = {:e} ({} non-zeros)",
            dt,
            lhs.nnz()
        );

        Ok(EffectiveMatrix { dt, factor })
    }

    /// Enforce boundary conditions at time `t` on the current state
    fn apply_bcs(&mut self, t: f64) {
        for bc in self.mesh.boundary_conditions() {
            let i = bc.global_index();
            self.rhs[i] = 0.0;
            match bc.kind {
                BcKind::Displacement => {
                    self.displacements[i] = bc.value_at(t);
                    self.velocities[i] = 0.0;
                }
                BcKind::Velocity => {
                    self.velocities[i] = bc.value_at(t);
                }
            }
        }
    }

    pub fn displacements(&self) -> &FEVec {
        &self.displacements
    }

    pub fn velocities(&self) -> &FEVec {
        &self.velocities
    }

    pub fn accelerations(&self) -> &FEVec {
        &self.accelerations
    }

    /// Current simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Step size of the last update, `None` before the first
    pub fn time_step(&self) -> Option<f64> {
        self.time_step
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn options(&self) -> &ExplicitOptions {
        &self.options
    }

    /// Rayleigh damping matrix `α·M + β·K`
    pub fn damping(&self) -> &CsrMatrix<f64> {
        &self.damping
    }

    /// Number of times the effective matrix has been factorized
    pub fn factorizations(&self) -> usize {
        self.factorizations
    }

    /// Nodal forces `K·u + M·a` of the current state
    pub fn forces(&self) -> FEVec {
        sparse_matvec(self.mesh.stiffness(), &self.displacements)
            + sparse_matvec(self.mesh.mass(), &self.accelerations)
    }

    pub fn node_displacement(&self, node: usize) -> FEAResult<NodeDisplacement> {
        self.block(&self.displacements, node)
            .map(NodeDisplacement::from_array)
    }

    /// Translational and rotational velocities of a node
    pub fn node_velocity(&self, node: usize) -> FEAResult<NodeDisplacement> {
        self.block(&self.velocities, node)
            .map(NodeDisplacement::from_array)
    }

    pub fn node_forces(&self, node: usize) -> FEAResult<NodeForces> {
        self.block(&self.forces(), node).map(NodeForces::from_array)
    }

    fn block(&self, vector: &FEVec, node: usize) -> FEAResult<[f64; NUM_DOFS]> {
        node_block(vector, node).ok_or_else(|| {
            FEAError::InvalidInput(format!(
                "node {} out of range ({} nodes)",
                node,
                self.mesh.num_nodes()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{BeamElement, Dof, Node, Props};
    use crate::loads::BoundaryCondition;
    use approx::assert_relative_eq;

    fn cantilever(bcs: Vec<BoundaryCondition>) -> Mesh {
        let nodes = vec![Node::new(0.0, 0.0, 0.0), Node::new(1.0, 0.0, 0.0)];
        let props = Props::new(10.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0, [0.0, 1.0, 0.0]);
        Mesh::new(&nodes, &[BeamElement::euler_bernoulli(0, 1, props)], bcs).unwrap()
    }

    #[test]
    fn test_size_mismatch() {
        let mesh = cantilever(Vec::new());
        let result = ExplicitSystem::new(
            mesh,
            Vec::new(),
            FEVec::zeros(11),
            FEVec::zeros(12),
            0.0,
            ExplicitOptions::default(),
        );
        assert!(matches!(result, Err(FEAError::SizeMismatch(_))));
    }

    #[test]
    fn test_force_out_of_range() {
        let mesh = cantilever(Vec::new());
        let result = ExplicitSystem::new(
            mesh,
            vec![Force::constant(2, Dof::DisplacementX, 1.0)],
            FEVec::zeros(12),
            FEVec::zeros(12),
            0.0,
            ExplicitOptions::default(),
        );
        assert!(matches!(result, Err(FEAError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_bad_time_step() {
        let mesh = cantilever(BoundaryCondition::fixed(0).to_vec());
        let mut system = ExplicitSystem::new(
            mesh,
            Vec::new(),
            FEVec::zeros(12),
            FEVec::zeros(12),
            0.0,
            ExplicitOptions::default(),
        )
        .unwrap();

        assert!(matches!(system.update(0.0), Err(FEAError::InvalidTimeStep(_))));
        assert!(matches!(system.update(-1e-3), Err(FEAError::InvalidTimeStep(_))));
        assert!(matches!(system.update(f64::NAN), Err(FEAError::InvalidTimeStep(_))));
        assert_eq!(system.time_step(), None);
        assert_eq!(system.time(), 0.0);
    }

    #[test]
    fn test_singular_effective_matrix() {
        // Node 2 is not connected to any element, so it has no mass or stiffness
        let nodes = vec![
            Node::new(0.0, 0.0, 0.0),
            Node::new(1.0, 0.0, 0.0),
            Node::new(2.0, 0.0, 0.0),
        ];
        let props = Props::new(10.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0, [0.0, 1.0, 0.0]);
        let mesh = Mesh::new(&nodes, &[BeamElement::timoshenko(0, 1, props)], Vec::new()).unwrap();

        let mut system = ExplicitSystem::new(
            mesh,
            Vec::new(),
            FEVec::zeros(18),
            FEVec::zeros(18),
            0.0,
            ExplicitOptions::default(),
        )
        .unwrap();

        match system.update(1e-3) {
            Err(FEAError::SolveError(message)) => {
                assert!(message.contains("row 12"), "{}", message)
            }
            other => panic!("expected a solve error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(system.factorizations(), 0);
        assert_eq!(system.time(), 0.0);
        assert_eq!(system.time_step(), None);

        // No cached factorization is kept after the failure
        assert!(matches!(system.update(1e-3), Err(FEAError::SolveError(_))));
    }

    #[test]
    fn test_initial_bcs_applied() {
        let bcs = vec![
            BoundaryCondition::displacement(0, Dof::DisplacementY, 0.5),
            BoundaryCondition::velocity(1, Dof::DisplacementX, 2.0),
        ];
        let mut v0 = FEVec::zeros(12);
        v0[1] = 7.0;
        let system = ExplicitSystem::new(
            cantilever(bcs),
            Vec::new(),
            FEVec::zeros(12),
            v0,
            0.0,
            ExplicitOptions::default(),
        )
        .unwrap();

        assert_eq!(system.displacements()[1], 0.5);
        assert_eq!(system.velocities()[1], 0.0);
        assert_eq!(system.velocities()[6], 2.0);
        assert_eq!(system.accelerations().norm(), 0.0);
    }

    #[test]
    fn test_refactorizes_only_on_step_change() {
        let mesh = cantilever(BoundaryCondition::fixed(0).to_vec());
        let mut system = ExplicitSystem::new(
            mesh,
            vec![Force::constant(1, Dof::DisplacementY, 1.0)],
            FEVec::zeros(12),
            FEVec::zeros(12),
            0.0,
            ExplicitOptions::default(),
        )
        .unwrap();

        system.update(1e-3).unwrap();
        system.update(1e-3).unwrap();
        assert_eq!(system.factorizations(), 1);

        // Within relative tolerance of the cached step
        system.update(1e-3 * (1.0 + 1e-15)).unwrap();
        assert_eq!(system.factorizations(), 1);

        system.update(2e-3).unwrap();
        assert_eq!(system.factorizations(), 2);
        system.update(1e-3).unwrap();
        assert_eq!(system.factorizations(), 3);

        assert_relative_eq!(system.time(), 6e-3, epsilon = 1e-15);
        assert_eq!(system.time_step(), Some(1e-3));
    }

    #[test]
    fn test_node_views() {
        let mesh = cantilever(BoundaryCondition::fixed(0).to_vec());
        let mut system = ExplicitSystem::new(
            mesh,
            vec![Force::constant(1, Dof::DisplacementY, 1.0)],
            FEVec::zeros(12),
            FEVec::zeros(12),
            0.0,
            ExplicitOptions::default(),
        )
        .unwrap();
        system.update(1e-2).unwrap();

        let tip = system.node_displacement(1).unwrap();
        assert_eq!(tip.dy, system.displacements()[7]);
        assert!(tip.dy > 0.0);

        let forces = system.node_forces(1).unwrap();
        assert_relative_eq!(forces.fy, system.forces()[7]);
        assert!(system.node_velocity(2).is_err());
    }
}
