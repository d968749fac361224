use super::params::{self, ParamsError, UffParams};
use super::potentials;
use super::typer::{assign_types, TyperError};
use crate::core::models::molecule::Molecule;
use nalgebra::Vector3;
use std::collections::HashSet;
use thiserror::Error;

/// Per-term energy breakdown, in kcal/mol.
///
/// `total` is assigned as the exact sum of the four components.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct EnergyComponents {
    pub bond_stretch: f64,
    pub angle_bend: f64,
    pub torsion: f64,
    pub vdw: f64,
    pub total: f64,
}

/// Errors raised while preparing the evaluator for a molecule.
#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error(transparent)]
    Typing(#[from] TyperError),
    #[error(transparent)]
    Params(#[from] ParamsError),
}

// Precomputed interaction terms. Indices refer to the molecule the evaluator
// was set up with; everything position-independent (rest lengths, force
// constants, Fourier coefficients, barriers) is resolved at setup time.

#[derive(Debug, Clone, Copy)]
struct BondTerm {
    i: usize,
    j: usize,
    rest_length: f64,
    force_constant: f64,
}

#[derive(Debug, Clone, Copy)]
struct AngleTerm {
    i: usize,
    j: usize,
    k: usize,
    force_constant: f64,
    /// Natural angle of the central atom within 0.01 rad of straight.
    linear: bool,
    c0: f64,
    c1: f64,
    c2: f64,
}

#[derive(Debug, Clone, Copy)]
struct TorsionTerm {
    i: usize,
    j: usize,
    k: usize,
    l: usize,
    periodicity: f64,
    cos_n_phi0: f64,
    barrier: f64,
}

#[derive(Debug, Clone, Copy)]
struct VdwTerm {
    i: usize,
    j: usize,
    x_ij: f64,
    d_ij: f64,
}

/// The UFF energy and gradient evaluator.
///
/// [`setup`](UffForceField::setup) types the molecule and materializes the
/// bonded and nonbonded interaction lists; it must be re-run whenever the
/// molecule's connectivity changes. Position changes need no re-setup: every
/// evaluation reads positions fresh from the molecule.
#[derive(Debug, Default)]
pub struct UffForceField {
    atom_types: Vec<String>,
    bonds: Vec<BondTerm>,
    angles: Vec<AngleTerm>,
    torsions: Vec<TorsionTerm>,
    nonbonded: Vec<VdwTerm>,
}

const DEGENERACY_EPS: f64 = 1e-10;

impl UffForceField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last-assigned UFF type labels, one per atom.
    pub fn atom_types(&self) -> &[String] {
        &self.atom_types
    }

    /// Types the molecule and rebuilds all interaction lists.
    ///
    /// Idempotent for unchanged connectivity. On failure the evaluator is
    /// left empty and must be set up again before use.
    pub fn setup(&mut self, mol: &Molecule) -> Result<(), SetupError> {
        *self = Self::default();

        let types = assign_types(mol)?;
        let mut atom_params: Vec<&'static UffParams> = Vec::with_capacity(types.len());
        for label in &types {
            atom_params.push(params::get(label)?);
        }

        let adjacency = mol.adjacency_list();

        // Bond stretch terms: one per bond, with rest length and force
        // constant resolved from the typed endpoints.
        for bond in mol.bonds() {
            let (pi, pj) = (atom_params[bond.i], atom_params[bond.j]);
            let rest_length = potentials::natural_bond_length(pi, pj, bond.order.value());
            let force_constant = potentials::bond_force_constant(pi, pj, rest_length);
            self.bonds.push(BondTerm {
                i: bond.i,
                j: bond.j,
                rest_length,
                force_constant,
            });
        }

        // Angle triples: every neighbor pair around every center. The raw
        // triples also define the 1-3 exclusions, so they are collected
        // before terms with negligible force constants are filtered out.
        let mut angle_triples: Vec<(usize, usize, usize)> = Vec::new();
        for (j, neighbors) in adjacency.iter().enumerate() {
            for a in 0..neighbors.len() {
                for b in (a + 1)..neighbors.len() {
                    angle_triples.push((neighbors[a], j, neighbors[b]));
                }
            }
        }
        for &(i, j, k) in &angle_triples {
            if let Some(term) = build_angle_term(i, j, k, &atom_params) {
                self.angles.push(term);
            }
        }

        // Torsion terms: i-j-k-l around every bond j-k.
        for bond in mol.bonds() {
            let (j, k) = (bond.i, bond.j);
            for &i in &adjacency[j] {
                if i == k {
                    continue;
                }
                for &l in &adjacency[k] {
                    if l == j || l == i {
                        continue;
                    }
                    if let Some(term) = build_torsion_term(i, j, k, l, &atom_params) {
                        self.torsions.push(term);
                    }
                }
            }
        }

        // Nonbonded pairs: everything except 1-2 (bonded) and 1-3 (angle).
        let mut excluded: HashSet<(usize, usize)> = HashSet::new();
        for bond in mol.bonds() {
            excluded.insert((bond.i.min(bond.j), bond.i.max(bond.j)));
        }
        for &(i, _, k) in &angle_triples {
            excluded.insert((i.min(k), i.max(k)));
        }
        for i in 0..mol.num_atoms() {
            for j in (i + 1)..mol.num_atoms() {
                if !excluded.contains(&(i, j)) {
                    let (pi, pj) = (atom_params[i], atom_params[j]);
                    self.nonbonded.push(VdwTerm {
                        i,
                        j,
                        x_ij: (pi.x1 * pj.x1).sqrt(),
                        d_ij: (pi.d1 * pj.d1).sqrt(),
                    });
                }
            }
        }

        self.atom_types = types;
        Ok(())
    }

    /// Total potential energy in kcal/mol.
    pub fn energy(&self, mol: &Molecule) -> f64 {
        self.energy_components(mol).total
    }

    /// Per-term energies; `total` is the exact sum of the four components.
    pub fn energy_components(&self, mol: &Molecule) -> EnergyComponents {
        let mut components = EnergyComponents {
            bond_stretch: self.bond_stretch_energy(mol),
            angle_bend: self.angle_bend_energy(mol),
            torsion: self.torsion_energy(mol),
            vdw: self.vdw_energy(mol),
            total: 0.0,
        };
        components.total =
            components.bond_stretch + components.angle_bend + components.torsion + components.vdw;
        components
    }

    /// Analytic gradient dE/dx as a flat `3N` vector (kcal/mol/Å).
    ///
    /// Terms with degenerate geometry (coincident atoms, collinear torsion
    /// frames) contribute zero rather than NaN.
    pub fn gradient(&self, mol: &Molecule) -> Vec<f64> {
        let mut grad = vec![0.0; 3 * mol.num_atoms()];
        self.bond_stretch_gradient(mol, &mut grad);
        self.angle_bend_gradient(mol, &mut grad);
        self.torsion_gradient(mol, &mut grad);
        self.vdw_gradient(mol, &mut grad);
        grad
    }

    fn bond_stretch_energy(&self, mol: &Molecule) -> f64 {
        let atoms = mol.atoms();
        let mut energy = 0.0;
        for term in &self.bonds {
            let r = (atoms[term.i].position - atoms[term.j].position).norm();
            let dr = r - term.rest_length;
            energy += 0.5 * term.force_constant * dr * dr;
        }
        energy
    }

    fn bond_stretch_gradient(&self, mol: &Molecule, grad: &mut [f64]) {
        let atoms = mol.atoms();
        for term in &self.bonds {
            let rij = atoms[term.i].position - atoms[term.j].position;
            let r = rij.norm();
            if r < DEGENERACY_EPS {
                continue;
            }
            let de = rij * (term.force_constant * (r - term.rest_length) / r);
            accumulate(grad, term.i, &de);
            accumulate_neg(grad, term.j, &de);
        }
    }

    fn angle_bend_energy(&self, mol: &Molecule) -> f64 {
        let atoms = mol.atoms();
        let mut energy = 0.0;
        for term in &self.angles {
            let rji = atoms[term.i].position - atoms[term.j].position;
            let rjk = atoms[term.k].position - atoms[term.j].position;
            let dji = rji.norm();
            let djk = rjk.norm();
            if dji < DEGENERACY_EPS || djk < DEGENERACY_EPS {
                continue;
            }
            let cos_theta = (rji.dot(&rjk) / (dji * djk)).clamp(-1.0, 1.0);

            if term.linear {
                energy += term.force_constant * (1.0 + cos_theta);
            } else {
                let theta = cos_theta.acos();
                energy += term.force_constant
                    * (term.c0 + term.c1 * cos_theta + term.c2 * (2.0 * theta).cos());
            }
        }
        energy
    }

    fn angle_bend_gradient(&self, mol: &Molecule, grad: &mut [f64]) {
        let atoms = mol.atoms();
        for term in &self.angles {
            let rji = atoms[term.i].position - atoms[term.j].position;
            let rjk = atoms[term.k].position - atoms[term.j].position;
            let dji = rji.norm();
            let djk = rjk.norm();
            if dji < DEGENERACY_EPS || djk < DEGENERACY_EPS {
                continue;
            }
            let cos_theta = (rji.dot(&rjk) / (dji * djk)).clamp(-1.0, 1.0);
            let theta = cos_theta.acos();
            let sin_theta = theta.sin().max(DEGENERACY_EPS);

            let de_dtheta = if term.linear {
                -term.force_constant * sin_theta
            } else {
                term.force_constant
                    * (-term.c1 * sin_theta - 2.0 * term.c2 * (2.0 * theta).sin())
            };

            // d(theta)/d(r_i) = -(u_jk - cos(theta) u_ji) / (|r_ji| sin(theta)),
            // symmetric for k; the center picks up the balancing contribution.
            let uji = rji / dji;
            let ujk = rjk / djk;
            let dtheta_di = -(ujk - uji * cos_theta) / (dji * sin_theta);
            let dtheta_dk = -(uji - ujk * cos_theta) / (djk * sin_theta);
            let dtheta_dj = -dtheta_di - dtheta_dk;

            accumulate(grad, term.i, &(dtheta_di * de_dtheta));
            accumulate(grad, term.j, &(dtheta_dj * de_dtheta));
            accumulate(grad, term.k, &(dtheta_dk * de_dtheta));
        }
    }

    fn torsion_energy(&self, mol: &Molecule) -> f64 {
        let atoms = mol.atoms();
        let mut energy = 0.0;
        for term in &self.torsions {
            let phi = potentials::signed_dihedral(
                &atoms[term.i].position,
                &atoms[term.j].position,
                &atoms[term.k].position,
                &atoms[term.l].position,
            );
            energy += 0.5
                * term.barrier
                * (1.0 - term.cos_n_phi0 * (term.periodicity * phi).cos());
        }
        energy
    }

    fn torsion_gradient(&self, mol: &Molecule, grad: &mut [f64]) {
        let atoms = mol.atoms();
        for term in &self.torsions {
            let p1 = &atoms[term.i].position;
            let p2 = &atoms[term.j].position;
            let p3 = &atoms[term.k].position;
            let p4 = &atoms[term.l].position;

            let b1 = p2 - p1;
            let b2 = p3 - p2;
            let b3 = p4 - p3;

            let n1 = b1.cross(&b2);
            let n2 = b2.cross(&b3);
            let n1_sq = n1.norm_squared();
            let n2_sq = n2.norm_squared();
            if n1_sq < DEGENERACY_EPS * DEGENERACY_EPS || n2_sq < DEGENERACY_EPS * DEGENERACY_EPS {
                continue;
            }
            let b2_norm = b2.norm();
            if b2_norm < DEGENERACY_EPS {
                continue;
            }

            let phi = potentials::signed_dihedral(p1, p2, p3, p4);
            let de_dphi = 0.5
                * term.barrier
                * term.periodicity
                * term.cos_n_phi0
                * (term.periodicity * phi).sin();

            // Canonical dihedral derivatives: the outer atoms move along the
            // plane normals, the inner atoms take the balancing combination.
            let dphi_dp1 = n1 * (-b2_norm / n1_sq);
            let dphi_dp4 = n2 * (b2_norm / n2_sq);

            let dot_b1_b2 = b1.dot(&b2) / (b2_norm * b2_norm);
            let dot_b3_b2 = b3.dot(&b2) / (b2_norm * b2_norm);

            let dphi_dp2 = dphi_dp1 * (dot_b1_b2 - 1.0) - dphi_dp4 * dot_b3_b2;
            let dphi_dp3 = dphi_dp4 * (dot_b3_b2 - 1.0) - dphi_dp1 * dot_b1_b2;

            accumulate(grad, term.i, &(dphi_dp1 * de_dphi));
            accumulate(grad, term.j, &(dphi_dp2 * de_dphi));
            accumulate(grad, term.k, &(dphi_dp3 * de_dphi));
            accumulate(grad, term.l, &(dphi_dp4 * de_dphi));
        }
    }

    fn vdw_energy(&self, mol: &Molecule) -> f64 {
        let atoms = mol.atoms();
        let mut energy = 0.0;
        for term in &self.nonbonded {
            let r = (atoms[term.i].position - atoms[term.j].position).norm();
            if r < DEGENERACY_EPS {
                continue;
            }
            energy += potentials::lennard_jones_12_6(r, term.x_ij, term.d_ij);
        }
        energy
    }

    fn vdw_gradient(&self, mol: &Molecule, grad: &mut [f64]) {
        let atoms = mol.atoms();
        for term in &self.nonbonded {
            let rij = atoms[term.i].position - atoms[term.j].position;
            let r = rij.norm();
            if r < DEGENERACY_EPS {
                continue;
            }
            let de_dr = potentials::lennard_jones_12_6_deriv(r, term.x_ij, term.d_ij);
            let de = rij * (de_dr / r);
            accumulate(grad, term.i, &de);
            accumulate_neg(grad, term.j, &de);
        }
    }
}

fn build_angle_term(
    i: usize,
    j: usize,
    k: usize,
    atom_params: &[&'static UffParams],
) -> Option<AngleTerm> {
    let (pi, pj, pk) = (atom_params[i], atom_params[j], atom_params[k]);
    let theta0 = pj.theta0.to_radians();
    let force_constant = potentials::angle_force_constant(pi, pj, pk, theta0);
    if force_constant.abs() < DEGENERACY_EPS {
        return None;
    }

    let linear = (theta0 - std::f64::consts::PI).abs() < 0.01;
    let (c0, c1, c2) = if linear {
        (0.0, 0.0, 0.0)
    } else {
        let cos_theta0 = theta0.cos();
        let sin_theta0 = theta0.sin();
        let c2 = 1.0 / (4.0 * sin_theta0 * sin_theta0);
        let c1 = -4.0 * c2 * cos_theta0;
        let c0 = c2 * (2.0 * cos_theta0 * cos_theta0 + 1.0);
        (c0, c1, c2)
    };

    Some(AngleTerm {
        i,
        j,
        k,
        force_constant,
        linear,
        c0,
        c1,
        c2,
    })
}

fn build_torsion_term(
    i: usize,
    j: usize,
    k: usize,
    l: usize,
    atom_params: &[&'static UffParams],
) -> Option<TorsionTerm> {
    let (pj, pk) = (atom_params[j], atom_params[k]);

    let sp3 = |p: &UffParams| (p.theta0 - 109.47).abs() < 5.0;
    let sp2 = |p: &UffParams| (p.theta0 - 120.0).abs() < 5.0 || (p.theta0 - 111.2).abs() < 5.0;

    let (n, phi0, barrier) = if sp3(pj) && sp3(pk) {
        (3.0, std::f64::consts::PI, (pj.v1 * pk.v1).abs().sqrt())
    } else if sp2(pj) && sp2(pk) {
        (2.0, std::f64::consts::PI, 5.0 * (pj.u1 * pk.u1).abs().sqrt())
    } else if (sp3(pj) && sp2(pk)) || (sp2(pj) && sp3(pk)) {
        (6.0, 0.0, 1.0)
    } else {
        (3.0, std::f64::consts::PI, 0.5)
    };

    if barrier < DEGENERACY_EPS {
        return None;
    }

    Some(TorsionTerm {
        i,
        j,
        k,
        l,
        periodicity: n,
        cos_n_phi0: (n * phi0).cos(),
        barrier,
    })
}

#[inline]
fn accumulate(grad: &mut [f64], atom: usize, contribution: &Vector3<f64>) {
    grad[3 * atom] += contribution.x;
    grad[3 * atom + 1] += contribution.y;
    grad[3 * atom + 2] += contribution.z;
}

#[inline]
fn accumulate_neg(grad: &mut [f64], atom: usize, contribution: &Vector3<f64>) {
    grad[3 * atom] -= contribution.x;
    grad[3 * atom + 1] -= contribution.y;
    grad[3 * atom + 2] -= contribution.z;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::molecule::DEFAULT_BOND_TOLERANCE;
    use crate::core::models::topology::BondOrder;
    use nalgebra::Point3;

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

    fn ethane() -> Molecule {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(6, "C", Point3::new(0.0, 0.0, 0.0)));
        mol.add_atom(Atom::new(6, "C", Point3::new(1.54, 0.0, 0.0)));
        mol.add_atom(Atom::new(1, "H", Point3::new(-0.36, 1.03, 0.0)));
        mol.add_atom(Atom::new(1, "H", Point3::new(-0.36, -0.51, -0.89)));
        mol.add_atom(Atom::new(1, "H", Point3::new(-0.36, -0.51, 0.89)));
        mol.add_atom(Atom::new(1, "H", Point3::new(1.90, 1.03, 0.0)));
        mol.add_atom(Atom::new(1, "H", Point3::new(1.90, -0.51, -0.89)));
        mol.add_atom(Atom::new(1, "H", Point3::new(1.90, -0.51, 0.89)));
        for h in 2..5 {
            mol.add_bond(0, h, BondOrder::Single);
        }
        for h in 5..8 {
            mol.add_bond(1, h, BondOrder::Single);
        }
        mol.add_bond(0, 1, BondOrder::Single);
        mol
    }

    fn benzene() -> Molecule {
        let mut mol = Molecule::new();
        for i in 0..6 {
            let angle = (i as f64) * std::f64::consts::PI / 3.0;
            mol.add_atom(Atom::new(
                6,
                "C",
                Point3::new(1.397 * angle.cos(), 1.397 * angle.sin(), 0.0),
            ));
        }
        for i in 0..6 {
            let angle = (i as f64) * std::f64::consts::PI / 3.0;
            mol.add_atom(Atom::new(
                1,
                "H",
                Point3::new(2.481 * angle.cos(), 2.481 * angle.sin(), 0.0),
            ));
        }
        for i in 0..6 {
            mol.add_bond(i, (i + 1) % 6, BondOrder::Aromatic);
            mol.add_bond(i, i + 6, BondOrder::Single);
        }
        mol
    }

    fn finite_difference_gradient(ff: &UffForceField, mol: &mut Molecule) -> Vec<f64> {
        let h = 1e-5;
        let base = mol.positions();
        let mut fd = vec![0.0; base.len()];
        for index in 0..base.len() {
            let mut plus = base.clone();
            plus[index] += h;
            mol.set_positions(&plus).unwrap();
            let e_plus = ff.energy(mol);

            let mut minus = base.clone();
            minus[index] -= h;
            mol.set_positions(&minus).unwrap();
            let e_minus = ff.energy(mol);

            fd[index] = (e_plus - e_minus) / (2.0 * h);
        }
        mol.set_positions(&base).unwrap();
        fd
    }

    fn assert_gradient_matches_finite_difference(mol: &mut Molecule) {
        let mut ff = UffForceField::new();
        ff.setup(mol).unwrap();
        let analytic = ff.gradient(mol);
        let fd = finite_difference_gradient(&ff, mol);

        for (index, (a, f)) in analytic.iter().zip(fd.iter()).enumerate() {
            let abs_err = (a - f).abs();
            let tolerance = f64::max(1e-3, 0.05 * a.abs());
            assert!(
                abs_err < tolerance,
                "gradient mismatch at coordinate {index}: analytic = {a}, fd = {f}"
            );
        }
    }

    #[test]
    fn water_energy_is_finite_and_small() {
        let mol = water();
        let mut ff = UffForceField::new();
        ff.setup(&mol).unwrap();

        let energy = ff.energy(&mol);
        assert!(energy.is_finite());
        assert!(energy.abs() < 100.0);
        assert_eq!(ff.atom_types(), &["O_3", "H_", "H_"]);
    }

    #[test]
    fn component_total_equals_sum_exactly() {
        let mol = methane();
        let mut ff = UffForceField::new();
        ff.setup(&mol).unwrap();

        let c = ff.energy_components(&mol);
        assert_eq!(c.total, c.bond_stretch + c.angle_bend + c.torsion + c.vdw);
        assert_eq!(c.total, ff.energy(&mol));
        assert!(c.bond_stretch >= 0.0);
    }

    #[test]
    fn interaction_lists_for_ethane() {
        let mol = ethane();
        let mut ff = UffForceField::new();
        ff.setup(&mol).unwrap();

        // Each carbon centers C(3 H + 1 C choose 2) = 6 angles.
        assert_eq!(ff.angles.len(), 12);
        // One central bond with 3 x 3 H combinations.
        assert_eq!(ff.torsions.len(), 9);
        // 28 pairs total, 7 bonds, 12 angle (1-3) pairs.
        assert_eq!(ff.nonbonded.len(), 9);
    }

    #[test]
    fn nonbonded_list_excludes_bonded_and_angle_pairs() {
        let mol = ethane();
        let mut ff = UffForceField::new();
        ff.setup(&mol).unwrap();

        let bonded: HashSet<(usize, usize)> = mol
            .bonds()
            .iter()
            .map(|b| (b.i.min(b.j), b.i.max(b.j)))
            .collect();
        let one_three: HashSet<(usize, usize)> = ff
            .angles
            .iter()
            .map(|a| (a.i.min(a.k), a.i.max(a.k)))
            .collect();

        for term in &ff.nonbonded {
            let pair = (term.i.min(term.j), term.i.max(term.j));
            assert!(!bonded.contains(&pair), "1-2 pair {pair:?} in vdw list");
            assert!(!one_three.contains(&pair), "1-3 pair {pair:?} in vdw list");
        }
    }

    #[test]
    fn water_has_no_nonbonded_pairs() {
        let mol = water();
        let mut ff = UffForceField::new();
        ff.setup(&mol).unwrap();

        assert_eq!(ff.nonbonded.len(), 0);
        assert_eq!(ff.angles.len(), 1);
        assert_eq!(ff.torsions.len(), 0);
    }

    #[test]
    fn gradient_matches_finite_difference_for_water() {
        assert_gradient_matches_finite_difference(&mut water());
    }

    #[test]
    fn gradient_matches_finite_difference_for_methane() {
        assert_gradient_matches_finite_difference(&mut methane());
    }

    #[test]
    fn gradient_matches_finite_difference_for_ethane() {
        assert_gradient_matches_finite_difference(&mut ethane());
    }

    #[test]
    fn benzene_energy_and_gradient_are_finite() {
        let mol = benzene();
        let mut ff = UffForceField::new();
        ff.setup(&mol).unwrap();

        assert_eq!(
            ff.atom_types().iter().filter(|t| *t == "C_R").count(),
            6
        );
        assert!(ff.energy(&mol).is_finite());
        for entry in ff.gradient(&mol) {
            assert!(entry.is_finite());
        }
    }

    #[test]
    fn overlapping_atoms_do_not_produce_nan_gradient() {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(6, "C", Point3::origin()));
        mol.add_atom(Atom::new(6, "C", Point3::origin()));
        mol.add_bond(0, 1, BondOrder::Single);

        let mut ff = UffForceField::new();
        ff.setup(&mol).unwrap();
        for entry in ff.gradient(&mol) {
            assert!(entry.is_finite());
        }
    }

    #[test]
    fn setup_is_idempotent() {
        let mol = ethane();
        let mut ff = UffForceField::new();
        ff.setup(&mol).unwrap();
        let first = ff.energy(&mol);

        ff.setup(&mol).unwrap();
        assert_eq!(ff.energy(&mol), first);
        assert_eq!(ff.torsions.len(), 9);
    }

    #[test]
    fn setup_fails_on_untypeable_atom() {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(32, "Ge", Point3::origin()));

        let mut ff = UffForceField::new();
        assert!(matches!(
            ff.setup(&mol),
            Err(SetupError::Typing(TyperError::UnknownType { .. }))
        ));
    }
}
