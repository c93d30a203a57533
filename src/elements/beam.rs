//! Two-node 3D beam element

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Node, Props, NUM_DOFS};
use crate::error::{FEAError, FEAResult};
use crate::math::{self, Mat12};

/// Beam theory used to formulate an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeamTheory {
    /// Slender beam, no shear deformation
    EulerBernoulli,
    /// Shear-deformable beam
    #[default]
    Timoshenko,
}

impl fmt::Display for BeamTheory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeamTheory::EulerBernoulli => f.write_str("Euler-Bernoulli"),
            BeamTheory::Timoshenko => f.write_str("Timoshenko"),
        }
    }
}

/// A beam between two nodes of the mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamElement {
    /// Indices of the start and end node
    nodes: [usize; 2],
    /// Material and section properties
    pub props: Props,
    /// Formulation
    pub theory: BeamTheory,
}

impl BeamElement {
    /// Create a new element between `n1` and `n2`
    pub fn new(n1: usize, n2: usize, props: Props, theory: BeamTheory) -> Self {
        Self {
            nodes: [n1, n2],
            props,
            theory,
        }
    }

    pub fn euler_bernoulli(n1: usize, n2: usize, props: Props) -> Self {
        Self::new(n1, n2, props, BeamTheory::EulerBernoulli)
    }

    pub fn timoshenko(n1: usize, n2: usize, props: Props) -> Self {
        Self::new(n1, n2, props, BeamTheory::Timoshenko)
    }

    /// Node indices `[start, end]`
    pub fn nodes(&self) -> [usize; 2] {
        self.nodes
    }

    /// Global DOF indices of the element, start node block first
    pub fn global_dofs(&self) -> [usize; 2 * NUM_DOFS] {
        let mut dofs = [0; 2 * NUM_DOFS];
        for (block, &node) in self.nodes.iter().enumerate() {
            for dof in 0..NUM_DOFS {
                dofs[block * NUM_DOFS + dof] = NUM_DOFS * node + dof;
            }
        }
        dofs
    }

    fn endpoints<'a>(&self, nodes: &'a [Node]) -> FEAResult<(&'a Node, &'a Node)> {
        let lookup = |index: usize| {
            nodes.get(index).ok_or_else(|| {
                FEAError::InvalidGeometry(format!(
                    "element node {} out of range ({} nodes)",
                    index,
                    nodes.len()
                ))
            })
        };
        Ok((lookup(self.nodes[0])?, lookup(self.nodes[1])?))
    }

    /// Distance between the two end nodes
    pub fn length(&self, nodes: &[Node]) -> FEAResult<f64> {
        let (n1, n2) = self.endpoints(nodes)?;
        Ok(n1.distance_to(n2))
    }

    /// Stiffness in local coordinates
    pub fn local_stiffness(&self, length: f64) -> Mat12 {
        match self.theory {
            BeamTheory::EulerBernoulli => math::beam::euler_bernoulli_stiffness(&self.props, length),
            BeamTheory::Timoshenko => math::beam::timoshenko_stiffness(&self.props, length),
        }
    }

    /// Inverse consistent mass in local coordinates
    pub fn local_inverse_mass(&self, length: f64) -> Mat12 {
        match self.theory {
            BeamTheory::EulerBernoulli => {
                math::beam::euler_bernoulli_inverse_mass(&self.props, length)
            }
            BeamTheory::Timoshenko => math::beam::timoshenko_inverse_mass(&self.props, length),
        }
    }

    /// Stiffness in global coordinates
    pub fn stiffness(&self, nodes: &[Node]) -> FEAResult<Mat12> {
        let length = self.length(nodes)?;
        let (r, rt) = self.rotation(nodes)?;
        Ok(math::rotate_to_global(&self.local_stiffness(length), &r, &rt))
    }

    /// Inverse consistent mass in global coordinates
    pub fn inverse_mass(&self, nodes: &[Node]) -> FEAResult<Mat12> {
        let length = self.length(nodes)?;
        let (r, rt) = self.rotation(nodes)?;
        Ok(math::rotate_to_global(&self.local_inverse_mass(length), &r, &rt))
    }

    fn rotation(&self, nodes: &[Node]) -> FEAResult<(Mat12, Mat12)> {
        let (n1, n2) = self.endpoints(nodes)?;
        Ok(math::member_rotation_matrices(
            &n1.to_vector(),
            &n2.to_vector(),
            &self.props.normal_vector(),
        ))
    }
}
