//! JSON run configuration
//!
//! Tables (`nodes`, `elems`, `props`, `bcs`, `forces`) and initial state
//! vectors may be written inline or point to delimited text files resolved
//! against the configuration file's directory.

mod table;

pub use table::{parse_delimited, resolve, ColumnSource, Table};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::ExplicitOptions;
use crate::elements::{BeamElement, BeamTheory, Dof, Node, Props, NUM_DOFS, PROPS_ROW_LEN};
use crate::error::{FEAError, FEAResult};
use crate::loads::{BcKind, BoundaryCondition, Force, TimeFunction};
use crate::manager::ManagerOptions;
use crate::math::Vec as FEVec;

/// Options block of a configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOptions {
    /// Newmark and damping parameters
    #[serde(flatten)]
    pub explicit: ExplicitOptions,
    /// Beam formulation used for every element
    pub element_type: BeamTheory,
    /// Fixed step size; the stable estimate is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_step: Option<f64>,
    /// Output and progress settings
    #[serde(flatten)]
    pub manager: ManagerOptions,
}

/// A complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub nodes: Table,
    pub elems: Table,
    pub props: Table,
    pub bcs: Table,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forces: Option<Table>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodal_displacements: Option<ColumnSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodal_velocities: Option<ColumnSource>,
    pub start_time: f64,
    pub end_time: f64,
    #[serde(default)]
    pub iteration_number: usize,
    #[serde(default)]
    pub options: ConfigOptions,
}

/// Integral, non-negative table entry as an index
fn index_value(value: f64, key: &str, row: usize, column: &str) -> FEAResult<usize> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 {
        Ok(value as usize)
    } else {
        Err(FEAError::Config(format!(
            "row {} in {}: {} must be a non-negative integer, got {}",
            row, key, column, value
        )))
    }
}

fn dof_value(value: f64, key: &str, row: usize) -> FEAResult<Dof> {
    let index = index_value(value, key, row, "DOF")?;
    Dof::from_index(index).ok_or_else(|| {
        FEAError::Config(format!(
            "row {} in {}: DOF {} out of range (0..{})",
            row, key, index, NUM_DOFS
        ))
    })
}

fn check_width(row: &[f64], width: usize, key: &str, index: usize, layout: &str) -> FEAResult<()> {
    if row.len() != width {
        return Err(FEAError::Config(format!(
            "row {} in {} does not specify {}",
            index, key, layout
        )));
    }
    Ok(())
}

impl Config {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> FEAResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> FEAResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            FEAError::Config(format!("cannot open configuration file {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> FEAResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> FEAResult<()> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(FEAError::Config(
                "start_time and end_time must be finite".to_string(),
            ));
        }
        if let Some(dt) = self.options.time_step {
            if !dt.is_finite() || dt <= 0.0 {
                return Err(FEAError::InvalidTimeStep(dt));
            }
        }
        Ok(())
    }

    /// Copy with every file path resolved against `base_dir`
    pub fn resolved(&self, base_dir: &Path) -> Self {
        Self {
            nodes: self.nodes.resolved(base_dir),
            elems: self.elems.resolved(base_dir),
            props: self.props.resolved(base_dir),
            bcs: self.bcs.resolved(base_dir),
            forces: self.forces.as_ref().map(|t| t.resolved(base_dir)),
            nodal_displacements: self.nodal_displacements.as_ref().map(|c| c.resolved(base_dir)),
            nodal_velocities: self.nodal_velocities.as_ref().map(|c| c.resolved(base_dir)),
            ..self.clone()
        }
    }

    /// Node coordinates, one `[x, y, z]` row per node
    pub fn load_nodes(&self, base_dir: &Path) -> FEAResult<Vec<Node>> {
        self.nodes
            .rows(base_dir, "nodes")?
            .iter()
            .enumerate()
            .map(|(i, row)| {
                check_width(row, 3, "nodes", i, "x, y and z coordinates")?;
                Ok(Node::new(row[0], row[1], row[2]))
            })
            .collect()
    }

    /// Elements from matching `elems` and `props` rows
    pub fn load_elements(&self, base_dir: &Path) -> FEAResult<Vec<BeamElement>> {
        let elems = self.elems.rows(base_dir, "elems")?;
        let props = self.props.rows(base_dir, "props")?;

        if elems.len() != props.len() {
            return Err(FEAError::Config(format!(
                "the number of rows in elems ({}) does not match props ({})",
                elems.len(),
                props.len()
            )));
        }

        let theory = self.options.element_type;
        elems
            .iter()
            .zip(props.iter())
            .enumerate()
            .map(|(i, (elem, prop))| {
                check_width(elem, 2, "elems", i, "2 nodal indices [nn1, nn2]")?;
                check_width(
                    prop,
                    PROPS_ROW_LEN,
                    "props",
                    i,
                    "the 10 property values [E, G, A, Iz, Iy, J, density, nx, ny, nz]",
                )?;
                let n1 = index_value(elem[0], "elems", i, "node")?;
                let n2 = index_value(elem[1], "elems", i, "node")?;
                let props = Props::from_row(prop).ok_or_else(|| {
                    FEAError::Config(format!("row {} in props is malformed", i))
                })?;
                Ok(BeamElement::new(n1, n2, props, theory))
            })
            .collect()
    }

    /// Boundary conditions from `[node, dof, value, type]` rows
    pub fn load_boundary_conditions(&self, base_dir: &Path) -> FEAResult<Vec<BoundaryCondition>> {
        self.bcs
            .rows(base_dir, "bcs")?
            .iter()
            .enumerate()
            .map(|(i, row)| {
                check_width(row, 4, "bcs", i, "[node number, DOF, value, type]")?;
                let node = index_value(row[0], "bcs", i, "node")?;
                let dof = dof_value(row[1], "bcs", i)?;
                let code = index_value(row[3], "bcs", i, "type")?;
                let kind = BcKind::from_code(code as i64).ok_or_else(|| {
                    FEAError::Config(format!(
                        "row {} in bcs: type {} is neither 0 (displacement) nor 1 (velocity)",
                        i, code
                    ))
                })?;
                Ok(BoundaryCondition::new(node, dof, kind, TimeFunction::Constant(row[2])))
            })
            .collect()
    }

    /// External forces from `[node, dof, value]` rows, empty when absent
    pub fn load_forces(&self, base_dir: &Path) -> FEAResult<Vec<Force>> {
        let Some(table) = &self.forces else {
            return Ok(Vec::new());
        };

        table
            .rows(base_dir, "forces")?
            .iter()
            .enumerate()
            .map(|(i, row)| {
                check_width(row, 3, "forces", i, "[node number, DOF, value]")?;
                let node = index_value(row[0], "forces", i, "node")?;
                let dof = dof_value(row[1], "forces", i)?;
                Ok(Force::constant(node, dof, row[2]))
            })
            .collect()
    }

    /// Initial displacements, zero when absent
    pub fn load_initial_displacements(&self, base_dir: &Path, size: usize) -> FEAResult<FEVec> {
        load_column(self.nodal_displacements.as_ref(), base_dir, "nodal_displacements", size)
    }

    /// Initial velocities, zero when absent
    pub fn load_initial_velocities(&self, base_dir: &Path, size: usize) -> FEAResult<FEVec> {
        load_column(self.nodal_velocities.as_ref(), base_dir, "nodal_velocities", size)
    }
}

fn load_column(
    source: Option<&ColumnSource>,
    base_dir: &Path,
    key: &str,
    size: usize,
) -> FEAResult<FEVec> {
    let Some(source) = source else {
        return Ok(FEVec::zeros(size));
    };

    let values = source.values(base_dir, key)?;
    if values.len() != size {
        return Err(FEAError::Config(format!(
            "'{}' does not have the required {} values, {} entries were parsed",
            key,
            size,
            values.len()
        )));
    }
    Ok(FEVec::from_vec(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const INLINE: &str = r#"{
        "nodes": [[0, 0, 0], [1, 0, 0]],
        "elems": [[0, 1]],
        "props": [[200e9, 80e9, 0.0314, 7.85e-5, 7.85e-5, 1.57e-4, 7800, 0, 1, 0]],
        "bcs": [[0, 0, 0, 0], [1, 0, 0.001, 1]],
        "forces": [[1, 2, -5.0]],
        "start_time": 0.0,
        "end_time": 0.1,
        "options": {"gamma": 0.6, "element_type": "euler_bernoulli", "save_frequency": 10}
    }"#;

    #[test]
    fn test_inline_config() {
        let config = Config::from_json_str(INLINE).unwrap();
        let base = Path::new(".");

        assert_eq!(config.options.explicit.gamma, 0.6);
        assert_eq!(config.options.explicit.beta, 0.25);
        assert_eq!(config.options.element_type, BeamTheory::EulerBernoulli);
        assert_eq!(config.options.manager.save_frequency, 10);
        assert_eq!(config.options.time_step, None);
        assert_eq!(config.iteration_number, 0);

        let nodes = config.load_nodes(base).unwrap();
        assert_eq!(nodes[1], Node::new(1.0, 0.0, 0.0));

        let elements = config.load_elements(base).unwrap();
        assert_eq!(elements[0].nodes(), [0, 1]);
        assert_eq!(elements[0].theory, BeamTheory::EulerBernoulli);
        assert_eq!(elements[0].props.rho, 7800.0);

        let bcs = config.load_boundary_conditions(base).unwrap();
        assert_eq!(bcs[1].kind, BcKind::Velocity);
        assert_eq!(bcs[1].global_index(), 6);
        assert_eq!(bcs[1].value_at(0.0), 0.001);

        let forces = config.load_forces(base).unwrap();
        assert_eq!(forces[0].global_index(), 8);

        let u0 = config.load_initial_displacements(base, 12).unwrap();
        assert_eq!(u0, FEVec::zeros(12));
    }

    #[test]
    fn test_default_element_type() {
        let json = INLINE.replace(r#""element_type": "euler_bernoulli","#, "");
        let config = Config::from_json_str(&json).unwrap();
        assert_eq!(config.options.element_type, BeamTheory::Timoshenko);
    }

    #[test]
    fn test_row_validation() {
        let mut config = Config::from_json_str(INLINE).unwrap();
        let base = Path::new(".");

        config.bcs = Table::Inline(vec![vec![0.0, 0.0, 0.0, 2.0]]);
        assert!(matches!(config.load_boundary_conditions(base), Err(FEAError::Config(_))));

        config.bcs = Table::Inline(vec![vec![0.0, 6.0, 0.0, 0.0]]);
        assert!(matches!(config.load_boundary_conditions(base), Err(FEAError::Config(_))));

        config.elems = Table::Inline(vec![vec![0.0, 1.0], vec![1.0, 2.0]]);
        let err = config.load_elements(base).unwrap_err().to_string();
        assert!(err.contains("does not match props"), "{}", err);

        config.elems = Table::Inline(vec![vec![0.0, 1.5]]);
        assert!(matches!(config.load_elements(base), Err(FEAError::Config(_))));

        config.nodes = Table::Inline(vec![vec![0.0, 0.0]]);
        let err = config.load_nodes(base).unwrap_err().to_string();
        assert!(err.contains("row 0 in nodes"), "{}", err);

        config.nodal_velocities = Some(ColumnSource::Inline(vec![0.0; 5]));
        assert!(matches!(
            config.load_initial_velocities(base, 12),
            Err(FEAError::Config(_))
        ));
    }

    #[test]
    fn test_missing_required_key() {
        let json = INLINE.replace(r#""start_time": 0.0,"#, "");
        assert!(matches!(
            Config::from_json_str(&json),
            Err(FEAError::SerializationError(_))
        ));
    }

    #[test]
    fn test_resolved_paths() {
        let mut config = Config::from_json_str(INLINE).unwrap();
        config.nodes = Table::File(PathBuf::from("nodes.csv"));
        config.nodal_displacements = Some(ColumnSource::File(PathBuf::from("/abs/u.txt")));

        let resolved = config.resolved(Path::new("/data/run"));
        assert_eq!(resolved.nodes, Table::File(PathBuf::from("/data/run/nodes.csv")));
        assert_eq!(
            resolved.nodal_displacements,
            Some(ColumnSource::File(PathBuf::from("/abs/u.txt")))
        );
        assert_eq!(resolved.elems, config.elems);
    }

    #[test]
    fn test_round_trip_json() {
        let config = Config::from_json_str(INLINE).unwrap();
        let json = config.to_json_pretty().unwrap();
        let again = Config::from_json_str(&json).unwrap();
        assert_eq!(again, config);
    }
}
