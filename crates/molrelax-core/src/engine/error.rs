use crate::core::forcefield::energy::SetupError;
use thiserror::Error;

/// Errors surfaced by the optimization engine.
///
/// Solver failures (an exhausted line search) are not errors: they are
/// reported through `OptimizationResult::converged == false` with the
/// molecule left at the last accepted step.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Force field setup failed: {source}")]
    Setup {
        #[from]
        source: SetupError,
    },
}
