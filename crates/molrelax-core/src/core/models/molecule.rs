use super::atom::Atom;
use super::element::{element_by_number, ElementError};
use super::topology::{Bond, BondOrder};
use itertools::Itertools;
use thiserror::Error;

/// Default distance tolerance for bond perception (Angstroms).
pub const DEFAULT_BOND_TOLERANCE: f64 = 0.45;

/// Pairs closer than this are considered overlapping, not bonded (Angstroms).
const MIN_BOND_DISTANCE: f64 = 0.4;

/// Errors raised by molecule mutation operations.
#[derive(Debug, Error, PartialEq)]
pub enum MoleculeError {
    #[error("Position vector has length {actual}, expected {expected} (3 per atom)")]
    PositionLengthMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Element(#[from] ElementError),
}

/// A molecule: an ordered list of atoms plus a bond list.
///
/// Atom indices are stable for the life of the molecule (atoms are never
/// removed), so bonds and all force-field bookkeeping refer to atoms by
/// `usize` index. Connectivity queries are derived from the bond list;
/// consumers that query repeatedly should build an [`adjacency
/// list`](Molecule::adjacency_list) once instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    /// Molecule name (e.g., from the SDF title line).
    pub name: String,
    /// Free-form comment (e.g., the XYZ comment line).
    pub comment: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl Molecule {
    /// Creates a new, empty molecule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of atoms.
    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Number of bonds.
    pub fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    /// All atoms, in insertion order.
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Retrieves an atom by index.
    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Retrieves a mutable reference to an atom by index.
    pub fn atom_mut(&mut self, index: usize) -> Option<&mut Atom> {
        self.atoms.get_mut(index)
    }

    /// All bonds.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Appends an atom and returns its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Appends a bond between two existing atoms.
    ///
    /// Callers must not insert a second bond for the same unordered pair;
    /// the evaluator's behavior on duplicate bonds is unspecified.
    pub fn add_bond(&mut self, i: usize, j: usize, order: BondOrder) {
        debug_assert!(i != j, "self-bond");
        debug_assert!(i < self.atoms.len() && j < self.atoms.len());
        self.bonds.push(Bond::new(i, j, order));
    }

    /// Infers single bonds from interatomic distances.
    ///
    /// Clears the existing bond list, then for every atom pair `i < j`
    /// inserts a single bond iff the distance lies within
    /// `[0.4, r_i + r_j + tolerance]`, where the `r` are covalent radii.
    /// O(N^2) over atom pairs.
    ///
    /// # Errors
    ///
    /// Fails if any atom's atomic number is missing from the element table;
    /// the bond list is left cleared in that case.
    pub fn perceive_bonds(&mut self, tolerance: f64) -> Result<(), MoleculeError> {
        self.bonds.clear();
        for (i, j) in (0..self.atoms.len()).tuple_combinations() {
            let dist = (self.atoms[i].position - self.atoms[j].position).norm();
            let r_i = element_by_number(self.atoms[i].atomic_number)?.covalent_radius;
            let r_j = element_by_number(self.atoms[j].atomic_number)?.covalent_radius;
            if dist >= MIN_BOND_DISTANCE && dist <= r_i + r_j + tolerance {
                self.bonds.push(Bond::new(i, j, BondOrder::Single));
            }
        }
        Ok(())
    }

    /// Flattens atom positions into a `3N` vector (atom-major, xyz-minor).
    pub fn positions(&self) -> Vec<f64> {
        let mut flat = Vec::with_capacity(3 * self.atoms.len());
        for atom in &self.atoms {
            flat.extend_from_slice(&[atom.position.x, atom.position.y, atom.position.z]);
        }
        flat
    }

    /// Overwrites all atom positions from a flat `3N` vector.
    ///
    /// # Errors
    ///
    /// Fails without modifying the molecule if the input length is not `3N`.
    pub fn set_positions(&mut self, positions: &[f64]) -> Result<(), MoleculeError> {
        if positions.len() != 3 * self.atoms.len() {
            return Err(MoleculeError::PositionLengthMismatch {
                expected: 3 * self.atoms.len(),
                actual: positions.len(),
            });
        }
        for (atom, chunk) in self.atoms.iter_mut().zip(positions.chunks_exact(3)) {
            atom.position.x = chunk[0];
            atom.position.y = chunk[1];
            atom.position.z = chunk[2];
        }
        Ok(())
    }

    /// Builds a per-atom neighbor list from the bond list.
    pub fn adjacency_list(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.atoms.len()];
        for bond in &self.bonds {
            adjacency[bond.i].push(bond.j);
            adjacency[bond.j].push(bond.i);
        }
        adjacency
    }

    /// Number of bonds involving the given atom.
    pub fn degree(&self, index: usize) -> usize {
        self.bonds.iter().filter(|b| b.contains(index)).count()
    }

    /// Indices of atoms directly bonded to the given atom.
    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        self.bonds
            .iter()
            .filter_map(|b| b.partner(index))
            .collect()
    }

    /// The order of the bond between two atoms, if one exists.
    pub fn bond_order_between(&self, i: usize, j: usize) -> Option<BondOrder> {
        let probe = (i.min(j), i.max(j));
        self.bonds
            .iter()
            .find(|b| (b.i, b.j) == probe)
            .map(|b| b.order)
    }
}
