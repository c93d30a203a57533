//! Nodal degrees of freedom and global indexing

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of degrees of freedom carried by every node
pub const NUM_DOFS: usize = 6;

/// Degrees of freedom of a node, in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dof {
    DisplacementX = 0,
    DisplacementY = 1,
    DisplacementZ = 2,
    RotationX = 3,
    RotationY = 4,
    RotationZ = 5,
}

impl Dof {
    /// All DOFs in storage order
    pub const ALL: [Dof; NUM_DOFS] = [
        Dof::DisplacementX,
        Dof::DisplacementY,
        Dof::DisplacementZ,
        Dof::RotationX,
        Dof::RotationY,
        Dof::RotationZ,
    ];

    /// Position of this DOF within a node's block
    pub fn index(self) -> usize {
        self as usize
    }

    /// DOF from its position within a node's block
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Dof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dof::DisplacementX => "DX",
            Dof::DisplacementY => "DY",
            Dof::DisplacementZ => "DZ",
            Dof::RotationX => "RX",
            Dof::RotationY => "RY",
            Dof::RotationZ => "RZ",
        };
        f.write_str(name)
    }
}

/// Linear index of `dof` at `node` across the whole mesh
#[inline]
pub fn global_index(node: usize, dof: Dof) -> usize {
    NUM_DOFS * node + dof.index()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_index() {
        assert_eq!(global_index(0, Dof::DisplacementX), 0);
        assert_eq!(global_index(1, Dof::DisplacementX), 6);
        assert_eq!(global_index(3, Dof::RotationZ), 23);
    }

    #[test]
    fn test_dof_round_trip() {
        for (i, dof) in Dof::ALL.iter().enumerate() {
            assert_eq!(Dof::from_index(i), Some(*dof));
        }
        assert_eq!(Dof::from_index(NUM_DOFS), None);
    }
}
