use crate::core::forcefield::energy::UffForceField;
use crate::core::models::molecule::Molecule;
use crate::engine::config::OptimizationConfig;
use crate::engine::error::EngineError;
use crate::engine::minimize::{optimize_geometry, OptimizationResult};
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument};

/// Relaxes a molecule's geometry under the UFF force field.
///
/// Assigns atom types, prepares the evaluator for the molecule's current
/// connectivity, and runs the configured minimizer. The molecule's positions
/// are updated in place; the reporter receives one record per reported
/// iteration.
///
/// # Errors
///
/// Fails if any atom cannot be assigned a UFF type; the molecule is left
/// unchanged in that case. Solver failures are not errors and are reported
/// through the result's `converged` flag.
#[instrument(skip_all, name = "relaxation_workflow")]
pub fn run(
    molecule: &mut Molecule,
    config: &OptimizationConfig,
    reporter: &ProgressReporter,
) -> Result<OptimizationResult, EngineError> {
    info!(
        atoms = molecule.num_atoms(),
        bonds = molecule.num_bonds(),
        "Setting up the UFF force field."
    );
    let mut forcefield = UffForceField::new();
    forcefield.setup(molecule)?;

    let initial_energy = forcefield.energy(molecule);
    info!(
        initial_energy,
        method = ?config.method,
        "Starting geometry optimization."
    );

    let result = optimize_geometry(molecule, &forcefield, config, reporter);

    info!(
        converged = result.converged,
        iterations = result.iterations,
        final_energy = result.final_energy,
        final_grad_norm = result.final_grad_norm,
        "Optimization finished."
    );
    Ok(result)
}
