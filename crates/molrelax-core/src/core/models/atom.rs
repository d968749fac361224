use nalgebra::Point3;

/// Represents a single atom in a molecule.
///
/// The element symbol is stored redundantly alongside the atomic number so
/// that the spelling from the source file survives a read/write round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atomic number (Z >= 1).
    pub atomic_number: usize,
    /// Element symbol as parsed from the source (e.g., "C", "Cl").
    pub symbol: String,
    /// Position in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new atom at the given position.
    pub fn new(atomic_number: usize, symbol: impl Into<String>, position: Point3<f64>) -> Self {
        Self {
            atomic_number,
            symbol: symbol.into(),
            position,
        }
    }
}
