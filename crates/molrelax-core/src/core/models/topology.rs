use std::fmt;
use thiserror::Error;

/// Represents the order of a chemical bond between atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BondOrder {
    /// Single bond.
    Single,
    /// Double bond.
    Double,
    /// Triple bond.
    Triple,
    /// Aromatic bond (order 4 in SDF convention).
    Aromatic,
}

impl Default for BondOrder {
    fn default() -> Self {
        BondOrder::Single
    }
}

/// Error type for failed conversion of a numeric bond order.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid bond order value: {0}")]
pub struct InvalidBondOrder(pub u8);

impl BondOrder {
    /// Numeric order as used in SDF files and the UFF bond-order correction.
    ///
    /// Aromatic maps to 4 per the SDF convention.
    #[inline]
    pub fn value(self) -> f64 {
        match self {
            Self::Single => 1.0,
            Self::Double => 2.0,
            Self::Triple => 3.0,
            Self::Aromatic => 4.0,
        }
    }

    /// Converts a numeric order (1-4) into a `BondOrder`.
    pub fn from_value(value: u8) -> Result<Self, InvalidBondOrder> {
        match value {
            1 => Ok(Self::Single),
            2 => Ok(Self::Double),
            3 => Ok(Self::Triple),
            4 => Ok(Self::Aromatic),
            other => Err(InvalidBondOrder(other)),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// Represents a chemical bond between two atoms, identified by index.
///
/// The pair is unordered; construction normalizes it so `i <= j`, giving a
/// canonical representation for equality and hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    /// Index of the first atom.
    pub i: usize,
    /// Index of the second atom.
    pub j: usize,
    /// The order of the bond.
    pub order: BondOrder,
}

impl Bond {
    /// Creates a new bond between two atom indices.
    pub fn new(i: usize, j: usize, order: BondOrder) -> Self {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        Self { i, j, order }
    }

    /// Returns `true` if the bond involves the given atom index.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.i == index || self.j == index
    }

    /// Returns the other endpoint of the bond, if `index` is one of them.
    pub fn partner(&self, index: usize) -> Option<usize> {
        if self.i == index {
            Some(self.j)
        } else if self.j == index {
            Some(self.i)
        } else {
            None
        }
    }
}
