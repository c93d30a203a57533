//! Global assembly of beam meshes
//!
//! A [`Mesh`] owns the global stiffness, consistent mass and inverse mass
//! matrices of a set of beam elements, plus the boundary conditions that
//! constrain them. Boundary conditions are eliminated from the inverse mass
//! only; stiffness and mass are kept unconstrained.

use std::collections::BTreeSet;

use log::{debug, warn};
use nalgebra_sparse::CsrMatrix;

use crate::elements::{BeamElement, Node, NUM_DOFS};
use crate::error::{FEAError, FEAResult};
use crate::loads::BoundaryCondition;
use crate::math::{self, SparseMatrixBuilder};

/// Assembled global matrices of a beam mesh
#[derive(Debug, Clone)]
pub struct Mesh {
    num_nodes: usize,
    bcs: Vec<BoundaryCondition>,
    stiffness: CsrMatrix<f64>,
    mass: CsrMatrix<f64>,
    inverse_mass: CsrMatrix<f64>,
}

impl Mesh {
    /// Assemble the global matrices of `elements` over `nodes`
    ///
    /// Fails on element node indices out of range, zero-length elements,
    /// boundary conditions on missing nodes, and element mass blocks that
    /// cannot be inverted.
    pub fn new(
        nodes: &[Node],
        elements: &[BeamElement],
        bcs: Vec<BoundaryCondition>,
    ) -> FEAResult<Self> {
        let num_nodes = nodes.len();
        let size = NUM_DOFS * num_nodes;

        for bc in &bcs {
            if bc.node() >= num_nodes {
                return Err(FEAError::InvalidInput(format!(
                    "boundary condition on node {} but mesh has {} nodes",
                    bc.node(),
                    num_nodes
                )));
            }
        }

        let mut k_builder = SparseMatrixBuilder::new(size);
        let mut m_builder = SparseMatrixBuilder::new(size);
        let mut minv_builder = SparseMatrixBuilder::new(size);

        for (index, element) in elements.iter().enumerate() {
            check_element(index, element, nodes)?;

            let k = element.stiffness(nodes)?;
            let minv = element.inverse_mass(nodes)?;
            let m = minv.try_inverse().ok_or_else(|| {
                FEAError::SingularMatrix(format!("inverse mass of element {}", index))
            })?;

            let dofs = element.global_dofs();
            k_builder.add_element_matrix(&dofs, &k);
            m_builder.add_element_matrix(&dofs, &m);
            minv_builder.add_element_matrix(&dofs, &minv);
        }

        debug!(
            "Assembled {} elements over {} nodes ({} DOFs, stiffness sparsity {:.1}%)",
            elements.len(),
            num_nodes,
            size,
            k_builder.sparsity() * 100.0
        );

        let mut mesh = Self {
            num_nodes,
            bcs,
            stiffness: k_builder.to_csr(),
            mass: m_builder.to_csr(),
            inverse_mass: minv_builder.to_csr(),
        };
        mesh.apply_bcs();

        Ok(mesh)
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Size of the global matrices, `NUM_DOFS * num_nodes`
    pub fn num_dofs(&self) -> usize {
        NUM_DOFS * self.num_nodes
    }

    pub fn boundary_conditions(&self) -> &[BoundaryCondition] {
        &self.bcs
    }

    /// Global stiffness matrix
    pub fn stiffness(&self) -> &CsrMatrix<f64> {
        &self.stiffness
    }

    /// Global consistent mass matrix
    pub fn mass(&self) -> &CsrMatrix<f64> {
        &self.mass
    }

    /// Global inverse mass matrix with boundary conditions eliminated
    pub fn inverse_mass(&self) -> &CsrMatrix<f64> {
        &self.inverse_mass
    }

    /// Global indices named by at least one boundary condition
    pub fn constrained_dofs(&self) -> BTreeSet<usize> {
        self.bcs.iter().map(|bc| bc.global_index()).collect()
    }

    fn apply_bcs(&mut self) {
        if self.bcs.is_empty() {
            return;
        }
        self.inverse_mass = math::eliminate_dofs(&self.inverse_mass, &self.constrained_dofs());
    }
}

fn check_element(index: usize, element: &BeamElement, nodes: &[Node]) -> FEAResult<()> {
    let [n1, n2] = element.nodes();
    if n1 >= nodes.len() || n2 >= nodes.len() {
        return Err(FEAError::InvalidGeometry(format!(
            "element {} references node {} but mesh has {} nodes",
            index,
            n1.max(n2),
            nodes.len()
        )));
    }

    let length = nodes[n1].distance_to(&nodes[n2]);
    if length < 1e-10 || length.is_nan() {
        return Err(FEAError::InvalidGeometry(format!(
            "element {} has zero length: nodes {} and {}",
            index, n1, n2
        )));
    }

    let axis = nodes[n2].to_vector() - nodes[n1].to_vector();
    let normal = element.props.normal_vector();
    if axis.cross(&normal).norm() <= 1e-12 * length * normal.norm() {
        warn!(
            "element {} orientation vector {:?} is parallel to its axis",
            index, element.props.normal
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Dof, Props};
    use approx::assert_relative_eq;

    fn props() -> Props {
        Props::new(10.0, 10.0, 1.0, 1.0, 1.0, 1.0, 1.0, [0.0, 1.0, 0.0])
    }

    fn two_nodes() -> Vec<Node> {
        vec![Node::new(0.0, 0.0, 0.0), Node::new(1.0, 0.0, 0.0)]
    }

    #[test]
    fn test_single_element_matches_local() {
        let nodes = two_nodes();
        let elem = BeamElement::euler_bernoulli(0, 1, props());
        let mesh = Mesh::new(&nodes, &[elem], Vec::new()).unwrap();

        assert_eq!(mesh.num_dofs(), 12);
        let k = math::to_dense(mesh.stiffness());
        let local = elem.local_stiffness(1.0);
        for i in 0..12 {
            for j in 0..12 {
                assert_relative_eq!(k[(i, j)], local[(i, j)], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_mass_times_inverse_is_identity() {
        let nodes = two_nodes();
        let elem = BeamElement::timoshenko(0, 1, props());
        let mesh = Mesh::new(&nodes, &[elem], Vec::new()).unwrap();

        let m = math::to_dense(mesh.mass());
        let minv = math::to_dense(mesh.inverse_mass());
        let product = m * minv;
        for i in 0..12 {
            for j in 0..12 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(product[(i, j)], expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn test_apply_bcs_idempotent() {
        let nodes = two_nodes();
        let elem = BeamElement::timoshenko(0, 1, props());
        let bcs = vec![
            BoundaryCondition::displacement(0, Dof::DisplacementX, 0.0),
            BoundaryCondition::velocity(1, Dof::RotationZ, 1.0),
        ];
        let mut mesh = Mesh::new(&nodes, &[elem], bcs).unwrap();
        let once = math::to_dense(mesh.inverse_mass());

        mesh.apply_bcs();
        let twice = math::to_dense(mesh.inverse_mass());
        assert_relative_eq!(once, twice);

        for i in 0..12 {
            for &c in &[0usize, 11] {
                let expected = if i == c { 1.0 } else { 0.0 };
                assert_eq!(twice[(i, c)], expected);
                assert_eq!(twice[(c, i)], expected);
            }
        }
        // Stiffness and mass stay unconstrained
        assert!(math::to_dense(mesh.stiffness())[(0, 0)] > 1.0);
    }

    #[test]
    fn test_rejects_zero_length() {
        let nodes = vec![Node::new(1.0, 1.0, 1.0), Node::new(1.0, 1.0, 1.0)];
        let elem = BeamElement::timoshenko(0, 1, props());
        let result = Mesh::new(&nodes, &[elem], Vec::new());
        assert!(matches!(result, Err(FEAError::InvalidGeometry(_))));
    }

    #[test]
    fn test_rejects_bad_indices() {
        let nodes = two_nodes();
        let elem = BeamElement::timoshenko(0, 2, props());
        assert!(matches!(
            Mesh::new(&nodes, &[elem], Vec::new()),
            Err(FEAError::InvalidGeometry(_))
        ));

        let elem = BeamElement::timoshenko(0, 1, props());
        let bcs = vec![BoundaryCondition::displacement(5, Dof::DisplacementX, 0.0)];
        assert!(matches!(
            Mesh::new(&nodes, &[elem], bcs),
            Err(FEAError::InvalidInput(_))
        ));
    }
}
