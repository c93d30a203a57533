//! FEA Dynamics - explicit transient analysis of 3D beam frames
//!
//! This library integrates the semi-discrete equations of motion of frame
//! structures with the Newmark-β method, supporting:
//! - Euler-Bernoulli and Timoshenko beam elements
//! - Sparse global assembly with boundary-condition elimination
//! - Rayleigh (mass + stiffness proportional) damping
//! - Prescribed displacement and velocity boundary conditions
//! - JSON/CSV run configurations with restartable state dumps
//!
//! ## Example
//! ```rust
//! use fea_dynamics::prelude::*;
//!
//! let nodes = vec![Node::new(0.0, 0.0, 0.0), Node::new(1.0, 0.0, 0.0)];
//! let props = Props::circular(200e9, 80e9, 0.2, 7800.0, [0.0, 1.0, 0.0]);
//! let elements = vec![BeamElement::timoshenko(0, 1, props)];
//!
//! // Clamp node 0, pull node 1 along X at constant speed
//! let mut bcs = BoundaryCondition::fixed(0).to_vec();
//! bcs.push(BoundaryCondition::velocity(1, Dof::DisplacementX, 0.001));
//!
//! let dt = estimate_stable_timestep(&nodes, &elements).unwrap();
//! let mesh = Mesh::new(&nodes, &elements, bcs).unwrap();
//! let n = mesh.num_dofs();
//!
//! let mut system = ExplicitSystem::new(
//!     mesh,
//!     Vec::new(),
//!     DVector::zeros(n),
//!     DVector::zeros(n),
//!     0.0,
//!     ExplicitOptions::default(),
//! )
//! .unwrap();
//!
//! for _ in 0..10 {
//!     system.update(dt).unwrap();
//! }
//!
//! let tip = system.node_displacement(1).unwrap();
//! assert!((tip.dx - 10.0 * dt * 0.001).abs() < 1e-15);
//! ```

pub mod analysis;
pub mod config;
pub mod elements;
pub mod error;
pub mod loads;
pub mod manager;
pub mod math;
pub mod mesh;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{estimate_stable_timestep, ExplicitOptions, ExplicitSystem};
    pub use crate::config::Config;
    pub use crate::elements::{BeamElement, BeamTheory, Dof, Node, Props, NUM_DOFS};
    pub use crate::error::{FEAError, FEAResult};
    pub use crate::loads::{BcKind, BoundaryCondition, Force, TimeFunction};
    pub use crate::manager::{ManagerOptions, SimulationManager};
    pub use crate::math::ValueCompare;
    pub use crate::mesh::Mesh;
    pub use crate::results::{NodeDisplacement, NodeForces, RunSummary};
    pub use nalgebra::DVector;
}
