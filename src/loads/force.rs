//! Nodal forces and moments

use serde::{Deserialize, Serialize};

use super::{PrescribedValue, TimeFunction};
use crate::elements::Dof;

/// An external force (translational DOF) or moment (rotational DOF)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Force {
    #[serde(flatten)]
    target: PrescribedValue,
}

impl Force {
    pub fn new(node: usize, dof: Dof, function: TimeFunction) -> Self {
        Self {
            target: PrescribedValue::new(node, dof, function),
        }
    }

    /// Load that does not vary in time
    pub fn constant(node: usize, dof: Dof, value: f64) -> Self {
        Self::new(node, dof, TimeFunction::Constant(value))
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
