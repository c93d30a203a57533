//! Prescribed values: boundary conditions and external loads

mod boundary;
mod force;
mod prescribed;

pub use boundary::{BcKind, BoundaryCondition};
pub use force::Force;
pub use prescribed::{PrescribedValue, TimeFunction};
