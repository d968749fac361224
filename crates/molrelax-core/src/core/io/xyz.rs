use super::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::{element_by_symbol, ElementError};
use crate::core::models::molecule::{Molecule, MoleculeError, DEFAULT_BOND_TOLERANCE};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Errors raised while reading or writing XYZ files.
#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Empty input: missing atom count line")]
    EmptyInput,
    #[error("Invalid atom count '{0}'")]
    InvalidAtomCount(String),
    #[error("Negative atom count {0}")]
    NegativeAtomCount(i64),
    #[error("Missing comment line")]
    MissingComment,
    #[error("Expected {expected} atom lines, found {found}")]
    TruncatedBody { expected: usize, found: usize },
    #[error("Malformed atom line {line}: '{content}'")]
    MalformedAtomLine { line: usize, content: String },
    #[error("Unresolved element symbol on line {line}: {source}")]
    UnknownElement {
        line: usize,
        #[source]
        source: ElementError,
    },
    #[error("Bond perception failed: {0}")]
    BondPerception(#[from] MoleculeError),
}

/// The XYZ file format.
///
/// Layout: line 1 holds the atom count, line 2 a free-form comment (kept as
/// the molecule comment), then one `symbol x y z` line per atom. Reading
/// finishes with distance-based bond perception at the default tolerance.
pub struct XyzFile;

impl MolecularFile for XyzFile {
    type Error = XyzError;

    fn read_from(reader: &mut impl BufRead) -> Result<Molecule, XyzError> {
        let mut lines = reader.lines();

        let count_line = lines.next().ok_or(XyzError::EmptyInput)??;
        let count: i64 = count_line
            .trim()
            .parse()
            .map_err(|_| XyzError::InvalidAtomCount(count_line.trim().to_string()))?;
        if count < 0 {
            return Err(XyzError::NegativeAtomCount(count));
        }
        let count = count as usize;

        let comment = lines.next().ok_or(XyzError::MissingComment)??;

        let mut molecule = Molecule::new();
        molecule.comment = comment;

        for index in 0..count {
            let line_number = index + 3;
            let line = lines.next().ok_or(XyzError::TruncatedBody {
                expected: count,
                found: index,
            })??;

            let mut tokens = line.split_whitespace();
            let symbol = tokens.next().ok_or_else(|| XyzError::MalformedAtomLine {
                line: line_number,
                content: line.clone(),
            })?;
            let mut coordinate = || -> Result<f64, XyzError> {
                tokens
                    .next()
                    .and_then(|t| t.parse().ok())
                    .ok_or_else(|| XyzError::MalformedAtomLine {
                        line: line_number,
                        content: line.clone(),
                    })
            };
            let x = coordinate()?;
            let y = coordinate()?;
            let z = coordinate()?;

            let element = element_by_symbol(symbol).map_err(|source| XyzError::UnknownElement {
                line: line_number,
                source,
            })?;
            molecule.add_atom(Atom::new(
                element.atomic_number,
                symbol,
                Point3::new(x, y, z),
            ));
        }

        molecule.perceive_bonds(DEFAULT_BOND_TOLERANCE)?;
        Ok(molecule)
    }

    fn write_to(molecule: &Molecule, writer: &mut impl Write) -> Result<(), XyzError> {
        writeln!(writer, "{}", molecule.num_atoms())?;
        writeln!(writer, "{}", molecule.comment)?;
        for atom in molecule.atoms() {
            writeln!(
                writer,
                "{} {} {} {}",
                atom.symbol, atom.position.x, atom.position.y, atom.position.z
            )?;
        }
        Ok(())
    }
}
