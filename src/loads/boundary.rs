//! Boundary conditions - prescribed displacements and velocities

use serde::{Deserialize, Serialize};

use super::{PrescribedValue, TimeFunction};
use crate::elements::Dof;

/// Which kinematic quantity a boundary condition prescribes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BcKind {
    /// Prescribed displacement (velocity held at zero)
    Displacement,
    /// Prescribed velocity
    Velocity,
}

impl BcKind {
    /// Decode the tabular type code: 0 = displacement, 1 = velocity
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(BcKind::Displacement),
            1 => Some(BcKind::Velocity),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            BcKind::Displacement => 0,
            BcKind::Velocity => 1,
        }
    }
}

/// A boundary condition at one nodal DOF
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub kind: BcKind,
    #[serde(flatten)]
    target: PrescribedValue,
}

impl BoundaryCondition {
    pub fn new(node: usize, dof: Dof, kind: BcKind, function: TimeFunction) -> Self {
        Self {
            kind,
            target: PrescribedValue::new(node, dof, function),
        }
    }

    /// Constant prescribed displacement
    pub fn displacement(node: usize, dof: Dof, value: f64) -> Self {
        Self::new(node, dof, BcKind::Displacement, TimeFunction::Constant(value))
    }

    /// Constant prescribed velocity
    pub fn velocity(node: usize, dof: Dof, value: f64) -> Self {
        Self::new(node, dof, BcKind::Velocity, TimeFunction::Constant(value))
    }

    /// All six DOFs of `node` held at zero displacement
    pub fn fixed(node: usize) -> [Self; 6] {
        Dof::ALL.map(|dof| Self::displacement(node, dof, 0.0))
    }

    pub fn node(&self) -> usize {
        self.target.node()
    }

    pub fn dof(&self) -> Dof {
        self.target.dof()
    }

    pub fn global_index(&self) -> usize {
        self.target.global_index()
    }

    pub fn value_at(&self, t: f64) -> f64 {
        self.target.value_at(t)
    }
}
