//! Mesh nodes

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Position of a mesh node; nodes are referred to by their index
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Node {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Position as a column vector
    pub fn to_vector(&self) -> Vec3 {
        Vec3::from(self.coords())
    }

    /// Euclidean distance between two nodes
    pub fn distance_to(&self, other: &Node) -> f64 {
        (other.to_vector() - self.to_vector()).norm()
    }
}

impl From<[f64; 3]> for Node {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}
