use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

/// Error type for failed parsing of an optimization method name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown optimization method '{0}'")]
pub struct ParseMethodError(pub String);

/// The geometry optimization algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Steepest descent with a backtracking line search.
    SteepestDescent,
    /// Limited-memory BFGS (the default).
    #[default]
    Lbfgs,
}

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steepest_descent" => Ok(Self::SteepestDescent),
            "lbfgs" => Ok(Self::Lbfgs),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}

/// Settings for a geometry optimization run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// The minimization algorithm.
    pub method: Method,
    /// Maximum number of outer iterations.
    pub max_iterations: usize,
    /// Convergence threshold on the per-atom RMS gradient (kcal/mol/Å).
    pub grad_tolerance: f64,
    /// Convergence threshold on the energy change between reported
    /// iterations (kcal/mol).
    pub energy_tolerance: f64,
    /// When false, progress records omit the positions snapshot.
    pub store_trajectory: bool,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            method: Method::default(),
            max_iterations: 500,
            grad_tolerance: 1e-4,
            energy_tolerance: 1e-8,
            store_trajectory: true,
        }
    }
}
