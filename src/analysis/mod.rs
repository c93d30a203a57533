//! Explicit dynamic analysis: options, time-step estimate and the integrator

mod explicit;

pub use explicit::ExplicitSystem;

use serde::{Deserialize, Serialize};

use crate::elements::{BeamElement, Node};

/// Newmark and Rayleigh damping parameters of the explicit integrator
///
/// The effective matrix `M + γ·dt·C + β·dt²·K` is factorized with a
/// Cholesky decomposition, so it must be positive definite. With the
/// assembled mass and stiffness this holds for non-negative `beta`,
/// `gamma`, `damping_alpha` and `damping_beta`; other values may make
/// [`ExplicitSystem::update`] fail with a solve error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplicitOptions {
    /// Newmark β parameter (controls displacement update)
    pub beta: f64,
    /// Newmark γ parameter (controls velocity update)
    pub gamma: f64,
    /// Rayleigh damping α (mass-proportional)
    pub damping_alpha: f64,
    /// Rayleigh damping β (stiffness-proportional)
    pub damping_beta: f64,
}

impl Default for ExplicitOptions {
    fn default() -> Self {
        Self {
            beta: 0.25,
            gamma: 0.5,
            damping_alpha: 0.01,
            damping_beta: 0.01,
        }
    }
}

impl ExplicitOptions {
    /// Set Newmark parameters
    pub fn with_newmark(mut self, beta: f64, gamma: f64) -> Self {
        self.beta = beta;
        self.gamma = gamma;
        self
    }

    /// Set Rayleigh damping parameters
    ///
    /// C = α*M + β*K
    pub fn with_rayleigh_damping(mut self, alpha: f64, beta: f64) -> Self {
        self.damping_alpha = alpha;
        self.damping_beta = beta;
        self
    }
}

/// Conservative time step for the explicit integrator
///
/// Smallest element transit time `L / sqrt(E / density)` over all elements,
/// divided by 10. Elements whose nodes are missing are skipped. Returns
/// `None` when no element contributes.
pub fn estimate_stable_timestep(nodes: &[Node], elements: &[BeamElement]) -> Option<f64> {
    elements
        .iter()
        .filter_map(|element| {
            let length = element.length(nodes).ok()?;
            Some(length / element.props.wave_speed())
        })
        .reduce(f64::min)
        .map(|dt| dt / 10.0)
}
