use super::config::{Method, OptimizationConfig};
use super::progress::{OptProgress, ProgressReporter};
use crate::core::forcefield::energy::UffForceField;
use crate::core::models::molecule::Molecule;
use nalgebra::DVector;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::debug;

/// Outcome of a geometry optimization run.
///
/// A failed line search is reported here as `converged == false` rather than
/// as an error; the molecule is left at the last accepted step and the final
/// energy and gradient norm are consistent with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationResult {
    pub converged: bool,
    pub iterations: usize,
    /// Final total energy (kcal/mol).
    pub final_energy: f64,
    /// Per-atom RMS gradient norm at the final positions (kcal/mol/Å).
    pub final_grad_norm: f64,
    /// One record per reported iteration, in emission order.
    pub trajectory: Vec<OptProgress>,
}

/// Drives the molecule's coordinates downhill with the configured method.
///
/// The evaluator must already be [set up](UffForceField::setup) for this
/// molecule's connectivity. The molecule is mutated in place; the reporter
/// is invoked synchronously for every reported iteration.
pub fn optimize_geometry(
    mol: &mut Molecule,
    ff: &UffForceField,
    config: &OptimizationConfig,
    reporter: &ProgressReporter,
) -> OptimizationResult {
    if mol.num_atoms() == 0 {
        return OptimizationResult {
            converged: true,
            iterations: 0,
            final_energy: 0.0,
            final_grad_norm: 0.0,
            trajectory: Vec::new(),
        };
    }
    match config.method {
        Method::SteepestDescent => steepest_descent(mol, ff, config, reporter),
        Method::Lbfgs => lbfgs(mol, ff, config, reporter),
    }
}

/// Per-atom RMS of a flat gradient vector: `|g| / sqrt(N)`.
fn per_atom_rms(grad: &[f64], n_atoms: usize) -> f64 {
    let norm_sq: f64 = grad.iter().map(|g| g * g).sum();
    norm_sq.sqrt() / (n_atoms as f64).sqrt()
}

fn apply_positions(mol: &mut Molecule, positions: &[f64]) {
    mol.set_positions(positions)
        .expect("optimizer position vector length matches the molecule");
}

// ---------------------------------------------------------------------------
// Steepest descent with backtracking
// ---------------------------------------------------------------------------

const SD_INITIAL_STEP: f64 = 0.01;
const SD_MAX_STEP: f64 = 0.5;
const SD_MAX_BACKTRACKS: usize = 20;

fn steepest_descent(
    mol: &mut Molecule,
    ff: &UffForceField,
    config: &OptimizationConfig,
    reporter: &ProgressReporter,
) -> OptimizationResult {
    let n_atoms = mol.num_atoms();
    let mut trajectory = Vec::new();
    let mut step_size = SD_INITIAL_STEP;
    let mut prev_energy = ff.energy(mol);

    for iteration in 0..config.max_iterations {
        let grad = ff.gradient(mol);
        let grad_norm = per_atom_rms(&grad, n_atoms);

        let record = OptProgress {
            iteration,
            energy: prev_energy,
            grad_rms: grad_norm,
            positions: config.store_trajectory.then(|| mol.positions()),
        };
        reporter.report(&record);
        trajectory.push(record);

        if grad_norm < config.grad_tolerance {
            debug!(iteration, grad_norm, "steepest descent converged on gradient");
            return OptimizationResult {
                converged: true,
                iterations: iteration,
                final_energy: prev_energy,
                final_grad_norm: grad_norm,
                trajectory,
            };
        }

        // Normalized descent direction; alpha carries the step length.
        let norm: f64 = grad.iter().map(|g| g * g).sum::<f64>().sqrt();
        let direction: Vec<f64> = grad.iter().map(|g| -g / norm).collect();

        let energy_at_report = prev_energy;
        let positions = mol.positions();
        let mut alpha = step_size;

        for attempt in 0..SD_MAX_BACKTRACKS {
            let trial: Vec<f64> = positions
                .iter()
                .zip(&direction)
                .map(|(p, d)| p + alpha * d)
                .collect();
            apply_positions(mol, &trial);
            let trial_energy = ff.energy(mol);

            if trial_energy < prev_energy {
                prev_energy = trial_energy;
                step_size = (alpha * 1.2).min(SD_MAX_STEP);
                break;
            }

            alpha *= 0.5;
            if attempt == SD_MAX_BACKTRACKS - 1 {
                // Exhausted line search: take a tiny unnormalized gradient
                // step and accept whatever energy results.
                let tiny: Vec<f64> = positions
                    .iter()
                    .zip(&grad)
                    .map(|(p, g)| p - 1e-4 * g)
                    .collect();
                apply_positions(mol, &tiny);
                prev_energy = ff.energy(mol);
                step_size = 0.001;
            }
        }

        if iteration > 0 && (prev_energy - energy_at_report).abs() < config.energy_tolerance {
            debug!(iteration, "steepest descent converged on energy change");
            return OptimizationResult {
                converged: true,
                iterations: iteration,
                final_energy: prev_energy,
                final_grad_norm: per_atom_rms(&ff.gradient(mol), n_atoms),
                trajectory,
            };
        }
    }

    OptimizationResult {
        converged: false,
        iterations: config.max_iterations,
        final_energy: prev_energy,
        final_grad_norm: per_atom_rms(&ff.gradient(mol), n_atoms),
        trajectory,
    }
}

// ---------------------------------------------------------------------------
// Limited-memory BFGS
// ---------------------------------------------------------------------------

const LBFGS_HISTORY: usize = 8;
const MAX_LINESEARCH: usize = 40;
const ARMIJO_C1: f64 = 1e-4;

/// Objective wrapper: every evaluation writes the candidate positions into
/// the molecule, computes energy and gradient once, and emits one progress
/// record. Line-search trial points are therefore part of the trajectory;
/// iteration numbers are monotone but not contiguous with outer iterations.
struct Objective<'a, 'b> {
    mol: &'a mut Molecule,
    ff: &'a UffForceField,
    store_positions: bool,
    reporter: &'a ProgressReporter<'b>,
    evaluations: usize,
    trajectory: Vec<OptProgress>,
}

impl Objective<'_, '_> {
    fn evaluate(&mut self, x: &DVector<f64>) -> (f64, DVector<f64>) {
        apply_positions(self.mol, x.as_slice());
        let energy = self.ff.energy(self.mol);
        let grad = DVector::from_vec(self.ff.gradient(self.mol));

        let record = OptProgress {
            iteration: self.evaluations,
            energy,
            grad_rms: grad.norm() / (self.mol.num_atoms() as f64).sqrt(),
            positions: self.store_positions.then(|| x.as_slice().to_vec()),
        };
        self.reporter.report(&record);
        self.trajectory.push(record);
        self.evaluations += 1;

        (energy, grad)
    }
}

/// Two-loop recursion: applies the inverse-Hessian approximation implied by
/// the (s, y) history to the gradient and returns the descent direction.
fn lbfgs_direction(
    grad: &DVector<f64>,
    history: &VecDeque<(DVector<f64>, DVector<f64>, f64)>,
) -> DVector<f64> {
    let mut q = grad.clone();
    let mut alphas = Vec::with_capacity(history.len());
    for (s, y, rho) in history.iter().rev() {
        let alpha = rho * s.dot(&q);
        q.axpy(-alpha, y, 1.0);
        alphas.push(alpha);
    }
    if let Some((s, y, _)) = history.back() {
        let yy = y.dot(y);
        if yy > 0.0 {
            q *= s.dot(y) / yy;
        }
    }
    for ((s, y, rho), &alpha) in history.iter().zip(alphas.iter().rev()) {
        let beta = rho * y.dot(&q);
        q.axpy(alpha - beta, s, 1.0);
    }
    -q
}

fn lbfgs(
    mol: &mut Molecule,
    ff: &UffForceField,
    config: &OptimizationConfig,
    reporter: &ProgressReporter,
) -> OptimizationResult {
    let n_atoms = mol.num_atoms();
    let sqrt_n = (n_atoms as f64).sqrt();

    let mut objective = Objective {
        mol,
        ff,
        store_positions: config.store_trajectory,
        reporter,
        evaluations: 0,
        trajectory: Vec::new(),
    };

    let mut x = DVector::from_vec(objective.mol.positions());
    let (mut fx, mut grad) = objective.evaluate(&x);

    let mut history: VecDeque<(DVector<f64>, DVector<f64>, f64)> =
        VecDeque::with_capacity(LBFGS_HISTORY);
    let mut converged = false;
    let mut line_search_failed = false;
    let mut outer_iterations = 0;

    for iteration in 1..=config.max_iterations {
        outer_iterations = iteration;

        if grad.norm() / sqrt_n < config.grad_tolerance {
            converged = true;
            outer_iterations = iteration - 1;
            break;
        }

        let mut direction = lbfgs_direction(&grad, &history);
        let mut dg = grad.dot(&direction);
        if dg >= 0.0 {
            // The curvature history produced an ascent direction; restart
            // from plain steepest descent.
            direction = -&grad;
            dg = -grad.norm_squared();
            history.clear();
        }

        // Unit trial step, except a conservative first move.
        let mut step = if history.is_empty() {
            (1.0 / grad.norm()).min(1.0)
        } else {
            1.0
        };

        let mut accepted = None;
        for _ in 0..MAX_LINESEARCH {
            let x_trial = &x + &direction * step;
            let (fx_trial, grad_trial) = objective.evaluate(&x_trial);

            if fx_trial <= fx + ARMIJO_C1 * step * dg {
                accepted = Some((x_trial, fx_trial, grad_trial));
                break;
            }
            step *= 0.5;
        }

        let Some((x_new, fx_new, grad_new)) = accepted else {
            debug!(iteration, "L-BFGS line search exhausted");
            line_search_failed = true;
            break;
        };

        let s = &x_new - &x;
        let y = &grad_new - &grad;
        let sy = s.dot(&y);
        // Skip updates that would break positive definiteness.
        if sy > 1e-10 {
            if history.len() == LBFGS_HISTORY {
                history.pop_front();
            }
            history.push_back((s, y, 1.0 / sy));
        }

        let fx_prev = fx;
        x = x_new;
        fx = fx_new;
        grad = grad_new;

        // past = 1 relative energy-change termination.
        let scale = fx.abs().max(fx_prev.abs()).max(1.0);
        if (fx_prev - fx).abs() < config.energy_tolerance * scale {
            converged = true;
            break;
        }
    }

    // Positions may hold a rejected trial point; restore the accepted state.
    apply_positions(objective.mol, x.as_slice());
    let trajectory = objective.trajectory;
    let iterations = if line_search_failed {
        trajectory.len()
    } else {
        outer_iterations
    };

    OptimizationResult {
        converged,
        iterations,
        final_energy: fx,
        final_grad_norm: grad.norm() / sqrt_n,
        trajectory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::molecule::DEFAULT_BOND_TOLERANCE;
    use nalgebra::{Point3, Vector3};

    fn water() -> Molecule {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(8, "O", Point3::new(0.0, 0.0, 0.1173)));
        mol.add_atom(Atom::new(1, "H", Point3::new(0.0, 0.7572, -0.4692)));
        mol.add_atom(Atom::new(1, "H", Point3::new(0.0, -0.7572, -0.4692)));
        mol.perceive_bonds(DEFAULT_BOND_TOLERANCE).unwrap();
        mol
    }

    fn methane() -> Molecule {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(6, "C", Point3::origin()));
        for (x, y, z) in [
            (0.629, 0.629, 0.629),
            (-0.629, -0.629, 0.629),
            (-0.629, 0.629, -0.629),
            (0.629, -0.629, -0.629),
        ] {
            mol.add_atom(Atom::new(1, "H", Point3::new(x, y, z)));
        }
        mol.perceive_bonds(DEFAULT_BOND_TOLERANCE).unwrap();
        mol
    }

    fn prepared(mol: &Molecule) -> UffForceField {
        let mut ff = UffForceField::new();
        ff.setup(mol).unwrap();
        ff
    }

    #[test]
    fn steepest_descent_lowers_energy_of_distorted_water() {
        let mut mol = water();
        mol.atom_mut(1).unwrap().position += Vector3::new(0.1, 0.1, 0.0);
        mol.atom_mut(2).unwrap().position -= Vector3::new(0.05, 0.1, 0.0);
        let ff = prepared(&mol);
        let initial_energy = ff.energy(&mol);

        let config = OptimizationConfig {
            method: Method::SteepestDescent,
            max_iterations: 200,
            grad_tolerance: 1e-3,
            ..Default::default()
        };
        let result = optimize_geometry(&mut mol, &ff, &config, &ProgressReporter::new());

        assert!(result.final_energy < initial_energy);
        assert!(!result.trajectory.is_empty());
    }

    #[test]
    fn steepest_descent_reported_energies_are_monotone() {
        let mut mol = water();
        mol.atom_mut(1).unwrap().position += Vector3::new(0.1, 0.0, 0.0);
        let ff = prepared(&mol);

        let config = OptimizationConfig {
            method: Method::SteepestDescent,
            max_iterations: 50,
            ..Default::default()
        };
        let result = optimize_geometry(&mut mol, &ff, &config, &ProgressReporter::new());

        for pair in result.trajectory.windows(2) {
            assert!(
                pair[1].energy <= pair[0].energy,
                "energy rose from {} to {}",
                pair[0].energy,
                pair[1].energy
            );
        }
    }

    #[test]
    fn lbfgs_converges_on_distorted_water() {
        let mut mol = water();
        mol.atom_mut(1).unwrap().position += Vector3::new(0.15, 0.05, 0.0);
        let ff = prepared(&mol);
        let initial_energy = ff.energy(&mol);

        let config = OptimizationConfig {
            max_iterations: 200,
            ..Default::default()
        };
        let result = optimize_geometry(&mut mol, &ff, &config, &ProgressReporter::new());

        assert!(result.converged);
        assert!(result.final_energy < initial_energy);
    }

    #[test]
    fn lbfgs_restores_tetrahedral_methane() {
        let mut mol = methane();
        mol.atom_mut(1).unwrap().position += Vector3::new(0.2, 0.0, 0.0);
        mol.atom_mut(2).unwrap().position -= Vector3::new(0.0, 0.15, 0.0);
        let ff = prepared(&mol);
        let initial_energy = ff.energy(&mol);

        let config = OptimizationConfig {
            max_iterations: 500,
            ..Default::default()
        };
        let result = optimize_geometry(&mut mol, &ff, &config, &ProgressReporter::new());

        assert!(result.final_energy < initial_energy);
        let carbon = mol.atom(0).unwrap().position;
        for h in 1..5 {
            let dist = (mol.atom(h).unwrap().position - carbon).norm();
            assert!(
                (dist - 1.09).abs() < 0.15,
                "C-H distance {dist} out of range"
            );
        }
    }

    #[test]
    fn convergence_implies_a_satisfied_criterion() {
        let mut mol = water();
        mol.atom_mut(1).unwrap().position += Vector3::new(0.1, 0.0, 0.0);
        let ff = prepared(&mol);

        let config = OptimizationConfig::default();
        let result = optimize_geometry(&mut mol, &ff, &config, &ProgressReporter::new());
        assert!(result.converged);

        // A converged run satisfied the gradient criterion, or its closing
        // evaluations differ by less than the energy tolerance.
        let tail: Vec<f64> = result
            .trajectory
            .iter()
            .rev()
            .take(3)
            .map(|p| p.energy)
            .collect();
        let energy_criterion = tail.windows(2).any(|pair| {
            (pair[0] - pair[1]).abs()
                < config.energy_tolerance * pair[0].abs().max(pair[1].abs()).max(1.0)
        });
        let gradient_criterion = result.final_grad_norm < config.grad_tolerance;
        assert!(gradient_criterion || energy_criterion);
    }

    #[test]
    fn callback_receives_every_reported_record() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let mut mol = water();
        mol.atom_mut(1).unwrap().position += Vector3::new(0.1, 0.0, 0.0);
        let ff = prepared(&mol);

        let count = AtomicUsize::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|record: &OptProgress| {
            assert!(record.energy.is_finite());
            count.fetch_add(1, Ordering::Relaxed);
        }));

        let config = OptimizationConfig {
            method: Method::SteepestDescent,
            max_iterations: 10,
            ..Default::default()
        };
        let result = optimize_geometry(&mut mol, &ff, &config, &reporter);

        assert_eq!(count.load(Ordering::Relaxed), result.trajectory.len());
        assert!(count.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn trajectory_iterations_are_monotone_non_decreasing() {
        let mut mol = water();
        mol.atom_mut(1).unwrap().position += Vector3::new(0.12, 0.0, 0.0);
        let ff = prepared(&mol);

        let result =
            optimize_geometry(&mut mol, &ff, &OptimizationConfig::default(), &ProgressReporter::new());
        for pair in result.trajectory.windows(2) {
            assert!(pair[1].iteration >= pair[0].iteration);
        }
    }

    #[test]
    fn disabling_trajectory_storage_omits_positions() {
        let mut mol = water();
        mol.atom_mut(1).unwrap().position += Vector3::new(0.1, 0.0, 0.0);
        let ff = prepared(&mol);

        let config = OptimizationConfig {
            store_trajectory: false,
            max_iterations: 20,
            ..Default::default()
        };
        let result = optimize_geometry(&mut mol, &ff, &config, &ProgressReporter::new());

        assert!(!result.trajectory.is_empty());
        assert!(result.trajectory.iter().all(|p| p.positions.is_none()));
    }

    #[test]
    fn empty_molecule_converges_trivially() {
        let mut mol = Molecule::new();
        let ff = UffForceField::new();
        let result =
            optimize_geometry(&mut mol, &ff, &OptimizationConfig::default(), &ProgressReporter::new());
        assert!(result.converged);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.final_energy, 0.0);
    }
}
