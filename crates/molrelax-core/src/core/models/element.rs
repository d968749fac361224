use phf::phf_map;
use thiserror::Error;

/// Static per-element data: mass and radii are the values consumed by bond
/// perception and the force field; the name is kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementData {
    /// Atomic number (Z).
    pub atomic_number: usize,
    /// Element symbol (e.g., "C", "Cl").
    pub symbol: &'static str,
    /// Full element name.
    pub name: &'static str,
    /// Standard atomic mass (amu).
    pub mass: f64,
    /// Covalent radius (Angstroms).
    pub covalent_radius: f64,
    /// van der Waals radius (Angstroms).
    pub vdw_radius: f64,
}

/// Errors raised by element table lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ElementError {
    #[error("Atomic number {0} is outside the supported range (1-{max})", max = ELEMENTS.len())]
    NumberOutOfRange(usize),
    #[error("Unknown element symbol '{0}'")]
    UnknownSymbol(String),
}

const fn el(
    atomic_number: usize,
    symbol: &'static str,
    name: &'static str,
    mass: f64,
    covalent_radius: f64,
    vdw_radius: f64,
) -> ElementData {
    ElementData {
        atomic_number,
        symbol,
        name,
        mass,
        covalent_radius,
        vdw_radius,
    }
}

/// Periodic table rows H through Xe, indexed by Z - 1.
static ELEMENTS: &[ElementData] = &[
    el(1, "H", "Hydrogen", 1.008, 0.31, 1.20),
    el(2, "He", "Helium", 4.003, 0.28, 1.40),
    el(3, "Li", "Lithium", 6.941, 1.28, 1.82),
    el(4, "Be", "Beryllium", 9.012, 0.96, 1.53),
    el(5, "B", "Boron", 10.811, 0.84, 1.92),
    el(6, "C", "Carbon", 12.011, 0.76, 1.70),
    el(7, "N", "Nitrogen", 14.007, 0.71, 1.55),
    el(8, "O", "Oxygen", 15.999, 0.66, 1.52),
    el(9, "F", "Fluorine", 18.998, 0.57, 1.47),
    el(10, "Ne", "Neon", 20.180, 0.58, 1.54),
    el(11, "Na", "Sodium", 22.990, 1.66, 2.27),
    el(12, "Mg", "Magnesium", 24.305, 1.41, 1.73),
    el(13, "Al", "Aluminum", 26.982, 1.21, 1.84),
    el(14, "Si", "Silicon", 28.086, 1.11, 2.10),
    el(15, "P", "Phosphorus", 30.974, 1.07, 1.80),
    el(16, "S", "Sulfur", 32.065, 1.05, 1.80),
    el(17, "Cl", "Chlorine", 35.453, 1.02, 1.75),
    el(18, "Ar", "Argon", 39.948, 1.06, 1.88),
    el(19, "K", "Potassium", 39.098, 2.03, 2.75),
    el(20, "Ca", "Calcium", 40.078, 1.76, 2.31),
    el(21, "Sc", "Scandium", 44.956, 1.70, 2.11),
    el(22, "Ti", "Titanium", 47.867, 1.60, 1.87),
    el(23, "V", "Vanadium", 50.942, 1.53, 1.79),
    el(24, "Cr", "Chromium", 51.996, 1.39, 1.89),
    el(25, "Mn", "Manganese", 54.938, 1.39, 1.97),
    el(26, "Fe", "Iron", 55.845, 1.32, 1.94),
    el(27, "Co", "Cobalt", 58.933, 1.26, 1.92),
    el(28, "Ni", "Nickel", 58.693, 1.24, 1.63),
    el(29, "Cu", "Copper", 63.546, 1.32, 1.40),
    el(30, "Zn", "Zinc", 65.380, 1.22, 1.39),
    el(31, "Ga", "Gallium", 69.723, 1.22, 1.87),
    el(32, "Ge", "Germanium", 72.640, 1.20, 2.11),
    el(33, "As", "Arsenic", 74.922, 1.19, 1.85),
    el(34, "Se", "Selenium", 78.960, 1.20, 1.90),
    el(35, "Br", "Bromine", 79.904, 1.20, 1.85),
    el(36, "Kr", "Krypton", 83.798, 1.16, 2.02),
    el(37, "Rb", "Rubidium", 85.468, 2.20, 3.03),
    el(38, "Sr", "Strontium", 87.620, 1.95, 2.49),
    el(39, "Y", "Yttrium", 88.906, 1.90, 2.19),
    el(40, "Zr", "Zirconium", 91.224, 1.75, 1.86),
    el(41, "Nb", "Niobium", 92.906, 1.64, 2.07),
    el(42, "Mo", "Molybdenum", 95.960, 1.54, 2.09),
    el(43, "Tc", "Technetium", 98.000, 1.47, 2.09),
    el(44, "Ru", "Ruthenium", 101.070, 1.46, 2.07),
    el(45, "Rh", "Rhodium", 102.906, 1.42, 1.95),
    el(46, "Pd", "Palladium", 106.420, 1.39, 2.02),
    el(47, "Ag", "Silver", 107.868, 1.45, 1.72),
    el(48, "Cd", "Cadmium", 112.411, 1.44, 1.58),
    el(49, "In", "Indium", 114.818, 1.42, 1.93),
    el(50, "Sn", "Tin", 118.710, 1.39, 2.17),
    el(51, "Sb", "Antimony", 121.760, 1.39, 2.06),
    el(52, "Te", "Tellurium", 127.600, 1.38, 2.06),
    el(53, "I", "Iodine", 126.905, 1.39, 1.98),
    el(54, "Xe", "Xenon", 131.293, 1.40, 2.16),
];

/// Symbol lookup table, mapping to atomic number.
static SYMBOL_TO_NUMBER: phf::Map<&'static str, usize> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6,
    "N" => 7, "O" => 8, "F" => 9, "Ne" => 10, "Na" => 11, "Mg" => 12,
    "Al" => 13, "Si" => 14, "P" => 15, "S" => 16, "Cl" => 17, "Ar" => 18,
    "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22, "V" => 23, "Cr" => 24,
    "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29, "Zn" => 30,
    "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36,
    "Rb" => 37, "Sr" => 38, "Y" => 39, "Zr" => 40, "Nb" => 41, "Mo" => 42,
    "Tc" => 43, "Ru" => 44, "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48,
    "In" => 49, "Sn" => 50, "Sb" => 51, "Te" => 52, "I" => 53, "Xe" => 54,
};

/// Looks up element data by atomic number.
///
/// # Errors
///
/// Returns [`ElementError::NumberOutOfRange`] for Z outside the supported set.
pub fn element_by_number(atomic_number: usize) -> Result<&'static ElementData, ElementError> {
    if atomic_number == 0 || atomic_number > ELEMENTS.len() {
        return Err(ElementError::NumberOutOfRange(atomic_number));
    }
    Ok(&ELEMENTS[atomic_number - 1])
}

/// Looks up element data by symbol (case-sensitive, e.g. "Cl").
///
/// # Errors
///
/// Returns [`ElementError::UnknownSymbol`] if the symbol is not in the table.
pub fn element_by_symbol(symbol: &str) -> Result<&'static ElementData, ElementError> {
    SYMBOL_TO_NUMBER
        .get(symbol)
        .map(|&z| &ELEMENTS[z - 1])
        .ok_or_else(|| ElementError::UnknownSymbol(symbol.to_string()))
}
