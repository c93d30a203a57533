//! Structural elements module

mod beam;
mod dof;
mod node;
mod props;

pub use beam::{BeamElement, BeamTheory};
pub use dof::{global_index, Dof, NUM_DOFS};
pub use node::Node;
pub use props::{Props, PROPS_ROW_LEN};
