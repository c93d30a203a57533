//! Mathematical utilities for FEA calculations

pub mod beam;
pub mod compare;
pub mod sparse;

use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, Vector3};

// Re-export sparse utilities
pub use sparse::{
    eliminate_dofs, prune, scaled_sum, sparse_matvec, to_dense, SparseCholeskySolver,
    SparseMatrixBuilder, PRUNE_TOLERANCE,
};

pub use compare::ValueCompare;

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for element stiffness/mass (6 DOFs x 2 nodes)
pub type Mat12 = SMatrix<f64, 12, 12>;

/// Direction cosines of an element's local axes
///
/// Rows are the local x, y and z axes expressed in global coordinates.
///
/// # Arguments
/// * `i_node` - Start node coordinates
/// * `j_node` - End node coordinates
/// * `normal` - Orientation of the local y-axis
///
/// The orientation vector must not be parallel to the element axis; the
/// result is NaN-filled when it is.
pub fn direction_cosines(i_node: &Vec3, j_node: &Vec3, normal: &Vec3) -> Mat3 {
    // Local x-axis along the member
    let x = (j_node - i_node).normalize();

    // Local y-axis given by the element orientation
    let y = normal.normalize();

    // Local z-axis completes the frame
    let z = x.cross(&y).normalize();

    #[rustfmt::skip]
    let r = Mat3::new(
        x[0], x[1], x[2],
        y[0], y[1], y[2],
        z[0], z[1], z[2],
    );
    r
}

/// Compute the rotation matrices for a 3D beam element
///
/// # Returns
/// `(R, Rᵀ)` where `R` maps global to local coordinates. Local matrices
/// are brought into the global frame as `Rᵀ · K_local · R`.
pub fn member_rotation_matrices(i_node: &Vec3, j_node: &Vec3, normal: &Vec3) -> (Mat12, Mat12) {
    let r = direction_cosines(i_node, j_node, normal);

    // Build 12x12 rotation matrix
    let mut t = Mat12::zeros();

    // Fill diagonal 3x3 blocks: i translation, i rotation, j translation, j rotation
    for i in 0..4 {
        let offset = i * 3;
        t.fixed_view_mut::<3, 3>(offset, offset).copy_from(&r);
    }

    let t_transposed = t.transpose();
    (t, t_transposed)
}

/// Rotate a local element matrix into global coordinates
#[inline]
pub fn rotate_to_global(local: &Mat12, rotation: &Mat12, rotation_transposed: &Mat12) -> Mat12 {
    rotation_transposed * local * rotation
}
