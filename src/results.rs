//! Result types for explicit dynamic analysis

use serde::{Deserialize, Serialize};

use crate::elements::NUM_DOFS;
use crate::math::Vec as FEVec;

/// Copy the six DOF values of `node` out of a global vector
pub(crate) fn node_block(vector: &FEVec, node: usize) -> Option<[f64; NUM_DOFS]> {
    let start = NUM_DOFS * node;
    if start + NUM_DOFS > vector.len() {
        return None;
    }
    let mut block = [0.0; NUM_DOFS];
    block.copy_from_slice(&vector.as_slice()[start..start + NUM_DOFS]);
    Some(block)
}

/// Displacement (or velocity) of a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDisplacement {
    /// Displacement in X direction
    pub dx: f64,
    /// Displacement in Y direction
    pub dy: f64,
    /// Displacement in Z direction
    pub dz: f64,
    /// Rotation about X axis
    pub rx: f64,
    /// Rotation about Y axis
    pub ry: f64,
    /// Rotation about Z axis
    pub rz: f64,
}

impl NodeDisplacement {
    /// Create from array [DX, DY, DZ, RX, RY, RZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            dx: arr[0],
            dy: arr[1],
            dz: arr[2],
            rx: arr[3],
            ry: arr[4],
            rz: arr[5],
        }
    }

    /// Get translation magnitude
    pub fn translation_magnitude(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2) + self.dz.powi(2)).sqrt()
    }
}

/// Nodal forces and moments
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeForces {
    /// Force in X direction
    pub fx: f64,
    /// Force in Y direction
    pub fy: f64,
    /// Force in Z direction
    pub fz: f64,
    /// Moment about X axis
    pub mx: f64,
    /// Moment about Y axis
    pub my: f64,
    /// Moment about Z axis
    pub mz: f64,
}

impl NodeForces {
    /// Create from array [FX, FY, FZ, MX, MY, MZ]
    pub fn from_array(arr: [f64; 6]) -> Self {
        Self {
            fx: arr[0],
            fy: arr[1],
            fz: arr[2],
            mx: arr[3],
            my: arr[4],
            mz: arr[5],
        }
    }

    /// Resultant of the three force components
    pub fn force_magnitude(&self) -> f64 {
        (self.fx.powi(2) + self.fy.powi(2) + self.fz.powi(2)).sqrt()
    }
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total iterations taken, including any before a restart
    pub iterations: usize,
    /// Simulation time at the end of the run
    pub final_time: f64,
    /// Time step used
    pub time_step: f64,
    /// Largest nodal translation magnitude
    pub max_displacement: f64,
    /// Node with the largest translation
    pub max_disp_node: usize,
    /// Largest resultant nodal force `|K·u + M·a|`
    pub max_force: f64,
    /// Node carrying the largest force
    pub max_force_node: usize,
    /// Number of state dumps written
    pub dumps_written: usize,
}

impl RunSummary {
    /// Locate the largest nodal translation in a displacement vector
    pub fn with_max_displacement(mut self, displacements: &FEVec) -> Self {
        let num_nodes = displacements.len() / NUM_DOFS;
        for node in 0..num_nodes {
            if let Some(block) = node_block(displacements, node) {
                let magnitude = NodeDisplacement::from_array(block).translation_magnitude();
                if magnitude > self.max_displacement {
                    self.max_displacement = magnitude;
                    self.max_disp_node = node;
                }
            }
        }
        self
    }

    /// Locate the largest resultant force in a nodal force vector
    pub fn with_max_force(mut self, forces: &FEVec) -> Self {
        for node in 0..forces.len() / NUM_DOFS {
            if let Some(block) = node_block(forces, node) {
                let magnitude = NodeForces::from_array(block).force_magnitude();
                if magnitude > self.max_force {
                    self.max_force = magnitude;
                    self.max_force_node = node;
                }
            }
        }
        self
    }
}
