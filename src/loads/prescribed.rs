//! Values prescribed at a single nodal DOF

use serde::{Deserialize, Serialize};

use crate::elements::{global_index, Dof};

/// Mapping from time to a prescribed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFunction {
    /// Same value at every time
    Constant(f64),
}

impl TimeFunction {
    /// Value at time `t`
    pub fn value_at(&self, _t: f64) -> f64 {
        match self {
            TimeFunction::Constant(value) => *value,
        }
    }
}

impl From<f64> for TimeFunction {
    fn from(value: f64) -> Self {
        TimeFunction::Constant(value)
    }
}

/// A time-dependent value attached to one DOF of one node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "PrescribedRecord")]
pub struct PrescribedValue {
    node: usize,
    dof: Dof,
    global_index: usize,
    function: TimeFunction,
}

// Serialized form without the derived global index
#[derive(Deserialize)]
struct PrescribedRecord {
    node: usize,
    dof: Dof,
    function: TimeFunction,
}

impl From<PrescribedRecord> for PrescribedValue {
    fn from(record: PrescribedRecord) -> Self {
        Self::new(record.node, record.dof, record.function)
    }
}

impl PrescribedValue {
    pub fn new(node: usize, dof: Dof, function: TimeFunction) -> Self {
        Self {
            node,
            dof,
            global_index: global_index(node, dof),
            function,
        }
    }

    pub fn node(&self) -> usize {
        self.node
    }

    pub fn dof(&self) -> Dof {
        self.dof
    }

    /// Index into mesh-wide DOF vectors
    pub fn global_index(&self) -> usize {
        self.global_index
    }

    pub fn function(&self) -> &TimeFunction {
        &self.function
    }

    /// Prescribed value at time `t`
    pub fn value_at(&self, t: f64) -> f64 {
        self.function.value_at(t)
    }
}
