//! Local stiffness and inverse consistent mass matrices for 3D beam elements
//!
//! DOF order at each end: `[u, v, w, θx, θy, θz]`, first end in rows 0-5,
//! second end in rows 6-11. Bending in the local x-y plane is governed by
//! `Iz`, bending in the local x-z plane by `Iy`.

use super::Mat12;
use crate::elements::Props;

/// Stiffness coefficients for bending in one plane
#[derive(Debug, Clone, Copy)]
struct BendingStiffness {
    /// Transverse-transverse term (12EI/L³ for Euler-Bernoulli)
    k12: f64,
    /// Transverse-rotation coupling (6EI/L²)
    k6: f64,
    /// Rotation diagonal (4EI/L)
    k4: f64,
    /// Rotation off-diagonal (2EI/L)
    k2: f64,
}

/// Inverse mass coefficients for bending in one plane
#[derive(Debug, Clone, Copy)]
struct BendingInverseMass {
    translation_diag: f64,
    translation_off: f64,
    coupling_near: f64,
    coupling_far: f64,
    rotation_diag: f64,
    rotation_off: f64,
}

/// Shear deformation parameter `12EI / (GA L²)`
#[inline]
pub fn shear_parameter(props: &Props, inertia: f64, length: f64) -> f64 {
    12.0 * props.e * inertia / (props.g * props.a * length.powi(2))
}

#[rustfmt::skip]
fn assemble_stiffness(ea_l: f64, gj_l: f64, z: BendingStiffness, y: BendingStiffness) -> Mat12 {
    let data = [
        // Row 0
        ea_l, 0.0, 0.0, 0.0, 0.0, 0.0, -ea_l, 0.0, 0.0, 0.0, 0.0, 0.0,
        // Row 1
        0.0, z.k12, 0.0, 0.0, 0.0, z.k6, 0.0, -z.k12, 0.0, 0.0, 0.0, z.k6,
        // Row 2
        0.0, 0.0, y.k12, 0.0, -y.k6, 0.0, 0.0, 0.0, -y.k12, 0.0, -y.k6, 0.0,
        // Row 3
        0.0, 0.0, 0.0, gj_l, 0.0, 0.0, 0.0, 0.0, 0.0, -gj_l, 0.0, 0.0,
        // Row 4
        0.0, 0.0, -y.k6, 0.0, y.k4, 0.0, 0.0, 0.0, y.k6, 0.0, y.k2, 0.0,
        // Row 5
        0.0, z.k6, 0.0, 0.0, 0.0, z.k4, 0.0, -z.k6, 0.0, 0.0, 0.0, z.k2,
        // Row 6
        -ea_l, 0.0, 0.0, 0.0, 0.0, 0.0, ea_l, 0.0, 0.0, 0.0, 0.0, 0.0,
        // Row 7
        0.0, -z.k12, 0.0, 0.0, 0.0, -z.k6, 0.0, z.k12, 0.0, 0.0, 0.0, -z.k6,
        // Row 8
        0.0, 0.0, -y.k12, 0.0, y.k6, 0.0, 0.0, 0.0, y.k12, 0.0, y.k6, 0.0,
        // Row 9
        0.0, 0.0, 0.0, -gj_l, 0.0, 0.0, 0.0, 0.0, 0.0, gj_l, 0.0, 0.0,
        // Row 10
        0.0, 0.0, -y.k6, 0.0, y.k2, 0.0, 0.0, 0.0, y.k6, 0.0, y.k4, 0.0,
        // Row 11
        0.0, z.k6, 0.0, 0.0, 0.0, z.k2, 0.0, -z.k6, 0.0, 0.0, 0.0, z.k4,
    ];

    Mat12::from_row_slice(&data)
}

#[rustfmt::skip]
fn assemble_inverse_mass(diag: f64, off: f64, z: BendingInverseMass, y: BendingInverseMass) -> Mat12 {
    let (za, zb, zp, zq, zr, zs) = (
        z.translation_diag, z.translation_off, z.coupling_near,
        z.coupling_far, z.rotation_diag, z.rotation_off,
    );
    let (ya, yb, yp, yq, yr, ys) = (
        y.translation_diag, y.translation_off, y.coupling_near,
        y.coupling_far, y.rotation_diag, y.rotation_off,
    );

    let data = [
        // Row 0
        diag, 0.0, 0.0, 0.0, 0.0, 0.0, -off, 0.0, 0.0, 0.0, 0.0, 0.0,
        // Row 1
        0.0, za, 0.0, 0.0, 0.0, -zp, 0.0, -zb, 0.0, 0.0, 0.0, -zq,
        // Row 2
        0.0, 0.0, ya, 0.0, -yp, 0.0, 0.0, 0.0, -yb, 0.0, -yq, 0.0,
        // Row 3
        0.0, 0.0, 0.0, diag, 0.0, 0.0, 0.0, 0.0, 0.0, -off, 0.0, 0.0,
        // Row 4
        0.0, 0.0, -yp, 0.0, yr, 0.0, 0.0, 0.0, yq, 0.0, ys, 0.0,
        // Row 5
        0.0, -zp, 0.0, 0.0, 0.0, zr, 0.0, zq, 0.0, 0.0, 0.0, zs,
        // Row 6
        -off, 0.0, 0.0, 0.0, 0.0, 0.0, diag, 0.0, 0.0, 0.0, 0.0, 0.0,
        // Row 7
        0.0, -zb, 0.0, 0.0, 0.0, zq, 0.0, za, 0.0, 0.0, 0.0, zp,
        // Row 8
        0.0, 0.0, -yb, 0.0, yq, 0.0, 0.0, 0.0, ya, 0.0, yp, 0.0,
        // Row 9
        0.0, 0.0, 0.0, -off, 0.0, 0.0, 0.0, 0.0, 0.0, diag, 0.0, 0.0,
        // Row 10
        0.0, 0.0, -yq, 0.0, ys, 0.0, 0.0, 0.0, yp, 0.0, yr, 0.0,
        // Row 11
        0.0, -zq, 0.0, 0.0, 0.0, zs, 0.0, zp, 0.0, 0.0, 0.0, zr,
    ];

    Mat12::from_row_slice(&data)
}

/// Local stiffness of an Euler-Bernoulli beam
pub fn euler_bernoulli_stiffness(props: &Props, length: f64) -> Mat12 {
    let l = length;
    let bending = |ei: f64| BendingStiffness {
        k12: 12.0 * ei / l.powi(3),
        k6: 6.0 * ei / l.powi(2),
        k4: 4.0 * ei / l,
        k2: 2.0 * ei / l,
    };

    assemble_stiffness(
        props.e * props.a / l,
        props.g * props.j / l,
        bending(props.e * props.iz),
        bending(props.e * props.iy),
    )
}

/// Local stiffness of a Timoshenko beam (shear-deformable)
pub fn timoshenko_stiffness(props: &Props, length: f64) -> Mat12 {
    let l = length;
    let bending = |ei: f64, phi: f64| {
        let denom = 1.0 + phi;
        BendingStiffness {
            k12: 12.0 * ei / (l.powi(3) * denom),
            k6: 6.0 * ei / (l.powi(2) * denom),
            k4: ei * (4.0 + phi) / (l * denom),
            k2: ei * (2.0 - phi) / (l * denom),
        }
    };

    let phi_z = shear_parameter(props, props.iz, l);
    let phi_y = shear_parameter(props, props.iy, l);

    assemble_stiffness(
        props.e * props.a / l,
        props.g * props.j / l,
        bending(props.e * props.iz, phi_z),
        bending(props.e * props.iy, phi_y),
    )
}

/// Inverse of the consistent mass matrix of an Euler-Bernoulli beam
pub fn euler_bernoulli_inverse_mass(props: &Props, length: f64) -> Mat12 {
    let l = length;
    let m = props.rho * l * props.a;

    let bending = BendingInverseMass {
        translation_diag: 16.0 / m,
        translation_off: 4.0 / m,
        coupling_near: 120.0 / (m * l),
        coupling_far: 60.0 / (m * l),
        rotation_diag: 1200.0 / (m * l * l),
        rotation_off: 840.0 / (m * l * l),
    };

    assemble_inverse_mass(4.0 / m, 2.0 / m, bending, bending)
}

/// Inverse of the consistent mass matrix of a Timoshenko beam
pub fn timoshenko_inverse_mass(props: &Props, length: f64) -> Mat12 {
    let l = length;
    let m = props.rho * l * props.a;

    let bending = |phi: f64| {
        let p1 = 6.0 + phi * (12.0 + phi);
        let p2 = 2.0 + phi * (4.0 + 3.0 * phi);
        let d1 = m * p1 * p2;
        let inv_d2 = 1.0 / (l * l * m * (1.0 + phi).powi(2) * p1 * p2);

        BendingInverseMass {
            translation_diag: 192.0 * (1.0 + phi).powi(2) / d1,
            translation_off: 24.0 * (2.0 + phi * (4.0 + 7.0 * phi)) / d1,
            coupling_near: 60.0 * (24.0 + phi * (62.0 + 7.0 * phi * (8.0 + 3.0 * phi))) / (l * d1),
            coupling_far: 60.0 * (12.0 + phi * (38.0 + 3.0 * phi * (18.0 + 7.0 * phi))) / (l * d1),
            rotation_diag: 30.0
                * (480.0
                    + phi * (2592.0
                        + phi * (5928.0
                            + phi * (7428.0 + phi * (5350.0 + 21.0 * phi * (98.0 + 15.0 * phi))))))
                * inv_d2,
            rotation_off: 30.0
                * (336.0
                    + phi * (2016.0
                        + phi * (5172.0
                            + phi * (7068.0 + phi * (5324.0 + 21.0 * phi * (98.0 + 15.0 * phi))))))
                * inv_d2,
        }
    };

    let phi_z = shear_parameter(props, props.iz, l);
    let phi_y = shear_parameter(props, props.iy, l);

    assemble_inverse_mass(4.0 / m, 2.0 / m, bending(phi_z), bending(phi_y))
}
