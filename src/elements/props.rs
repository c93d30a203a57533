//! Material and cross-section properties of a beam element

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Number of values in a tabular property row:
/// `[E, G, A, Iz, Iy, J, density, nx, ny, nz]`
pub const PROPS_ROW_LEN: usize = 10;

/// Property bundle carried by every beam element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Props {
    /// Modulus of elasticity (Young's modulus)
    pub e: f64,
    /// Shear modulus
    pub g: f64,
    /// Cross-sectional area
    pub a: f64,
    /// Second moment of area about the local z-axis
    pub iz: f64,
    /// Second moment of area about the local y-axis
    pub iy: f64,
    /// Torsional constant
    pub j: f64,
    /// Mass density
    pub rho: f64,
    /// Orientation of the local y-axis, need not be unit length
    pub normal: [f64; 3],
}

impl Props {
    /// Create a new property bundle
    #[allow(clippy::too_many_arguments)]
    pub fn new(e: f64, g: f64, a: f64, iz: f64, iy: f64, j: f64, rho: f64, normal: [f64; 3]) -> Self {
        Self {
            e,
            g,
            a,
            iz,
            iy,
            j,
            rho,
            normal,
        }
    }

    /// Build from a tabular row `[E, G, A, Iz, Iy, J, density, nx, ny, nz]`
    pub fn from_row(row: &[f64]) -> Option<Self> {
        if row.len() != PROPS_ROW_LEN {
            return None;
        }
        Some(Self::new(
            row[0],
            row[1],
            row[2],
            row[3],
            row[4],
            row[5],
            row[6],
            [row[7], row[8], row[9]],
        ))
    }

    /// Solid circular section
    pub fn circular(e: f64, g: f64, diameter: f64, rho: f64, normal: [f64; 3]) -> Self {
        let r = diameter / 2.0;
        let a = std::f64::consts::PI * r.powi(2);
        let i = std::f64::consts::PI * r.powi(4) / 4.0;
        Self::new(e, g, a, i, i, 2.0 * i, rho, normal)
    }

    /// Solid rectangular section, `depth` measured along the local y-axis
    pub fn rectangular(e: f64, g: f64, width: f64, depth: f64, rho: f64, normal: [f64; 3]) -> Self {
        let a = width * depth;
        let iz = width * depth.powi(3) / 12.0;
        let iy = depth * width.powi(3) / 12.0;

        // Torsional constant for rectangle (approximate)
        let (long, short) = if width > depth { (width, depth) } else { (depth, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self::new(e, g, a, iz, iy, j, rho, normal)
    }

    /// Orientation vector as a column vector
    pub fn normal_vector(&self) -> Vec3 {
        Vec3::new(self.normal[0], self.normal[1], self.normal[2])
    }

    /// Axial (bar) wave speed `sqrt(E / rho)`
    pub fn wave_speed(&self) -> f64 {
        (self.e / self.rho).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_row_order() {
        let row = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let props = Props::from_row(&row).unwrap();
        assert_eq!(props.e, 1.0);
        assert_eq!(props.iz, 4.0);
        assert_eq!(props.iy, 5.0);
        assert_eq!(props.rho, 7.0);
        assert_eq!(props.normal, [8.0, 9.0, 10.0]);
        assert!(Props::from_row(&row[..9]).is_none());
    }

    #[test]
    fn test_circular_section() {
        let props = Props::circular(200e9, 80e9, 0.2, 7800.0, [0.0, 1.0, 0.0]);
        assert_relative_eq!(props.a, 0.0314159265358979, epsilon = 1e-12);
        assert_relative_eq!(props.iy, 7.85398e-5, max_relative = 1e-5);
        assert_relative_eq!(props.j, 2.0 * props.iz);
    }

    #[test]
    fn test_wave_speed() {
        let props = Props::new(400.0, 1.0, 1.0, 1.0, 1.0, 1.0, 4.0, [0.0, 1.0, 0.0]);
        assert_relative_eq!(props.wave_speed(), 10.0);
    }
}
