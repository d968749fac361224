use super::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::{element_by_symbol, ElementError};
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Errors raised while reading or writing SDF/MOL files.
#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Empty input: missing title line")]
    EmptyInput,
    #[error("Missing counts line")]
    MissingCountsLine,
    #[error("Counts line too short: '{0}'")]
    CountsLineTooShort(String),
    #[error("Invalid counts line: '{0}'")]
    InvalidCounts(String),
    #[error("Expected {expected} atom lines, found {found}")]
    TruncatedAtomBlock { expected: usize, found: usize },
    #[error("Atom line {line} too short")]
    AtomLineTooShort { line: usize },
    #[error("Invalid coordinate field on line {line}")]
    InvalidCoordinate { line: usize },
    #[error("Unresolved element symbol on line {line}: {source}")]
    UnknownElement {
        line: usize,
        #[source]
        source: ElementError,
    },
    #[error("Expected {expected} bond lines, found {found}")]
    TruncatedBondBlock { expected: usize, found: usize },
    #[error("Bond line {line} too short")]
    BondLineTooShort { line: usize },
    #[error("Invalid bond field on line {line}")]
    InvalidBondField { line: usize },
    #[error("Bond on line {line} references atom {index} outside 1..={count}")]
    BondIndexOutOfRange {
        line: usize,
        index: usize,
        count: usize,
    },
    #[error("Unsupported bond order {value} on line {line}")]
    UnsupportedBondOrder { line: usize, value: i32 },
}

/// The SDF/MOL V2000 format (subset).
///
/// Reads the header (title, program, comment), the counts line, and the
/// fixed-field atom and bond blocks. Bond connectivity comes from the bond
/// block; no distance-based perception is performed. Property blocks and
/// anything after `M  END` are ignored.
pub struct SdfFile;

impl MolecularFile for SdfFile {
    type Error = SdfError;

    fn read_from(reader: &mut impl BufRead) -> Result<Molecule, SdfError> {
        let mut lines = reader.lines();

        let name = lines.next().ok_or(SdfError::EmptyInput)??;

        let mut molecule = Molecule::new();
        molecule.name = name;

        // Lines 2-3: program stamp and comment; tolerate their absence.
        let _program = lines.next().transpose()?;
        if let Some(comment) = lines.next().transpose()? {
            molecule.comment = comment;
        }

        let counts_line = lines.next().ok_or(SdfError::MissingCountsLine)??;
        if counts_line.len() < 6 {
            return Err(SdfError::CountsLineTooShort(counts_line));
        }
        let num_atoms: usize = counts_line[0..3]
            .trim()
            .parse()
            .map_err(|_| SdfError::InvalidCounts(counts_line.clone()))?;
        let num_bonds: usize = counts_line[3..6]
            .trim()
            .parse()
            .map_err(|_| SdfError::InvalidCounts(counts_line.clone()))?;

        for index in 0..num_atoms {
            let line_number = index + 5;
            let line = lines.next().ok_or(SdfError::TruncatedAtomBlock {
                expected: num_atoms,
                found: index,
            })??;
            if line.len() < 34 {
                return Err(SdfError::AtomLineTooShort { line: line_number });
            }

            let field = |range: std::ops::Range<usize>| -> Result<f64, SdfError> {
                line[range]
                    .trim()
                    .parse()
                    .map_err(|_| SdfError::InvalidCoordinate { line: line_number })
            };
            let x = field(0..10)?;
            let y = field(10..20)?;
            let z = field(20..30)?;
            let symbol = line[31..34].trim();

            let element = element_by_symbol(symbol).map_err(|source| SdfError::UnknownElement {
                line: line_number,
                source,
            })?;
            molecule.add_atom(Atom::new(
                element.atomic_number,
                symbol,
                Point3::new(x, y, z),
            ));
        }

        for index in 0..num_bonds {
            let line_number = index + num_atoms + 5;
            let line = lines.next().ok_or(SdfError::TruncatedBondBlock {
                expected: num_bonds,
                found: index,
            })??;
            if line.len() < 9 {
                return Err(SdfError::BondLineTooShort { line: line_number });
            }

            let field = |range: std::ops::Range<usize>| -> Result<i32, SdfError> {
                line[range]
                    .trim()
                    .parse()
                    .map_err(|_| SdfError::InvalidBondField { line: line_number })
            };
            let a1 = field(0..3)?;
            let a2 = field(3..6)?;
            let order_value = field(6..9)?;

            // Atom references are 1-indexed in the file.
            for reference in [a1, a2] {
                if reference < 1 || reference as usize > num_atoms {
                    return Err(SdfError::BondIndexOutOfRange {
                        line: line_number,
                        index: reference.max(0) as usize,
                        count: num_atoms,
                    });
                }
            }
            let order = u8::try_from(order_value)
                .ok()
                .and_then(|v| BondOrder::from_value(v).ok())
                .ok_or(SdfError::UnsupportedBondOrder {
                    line: line_number,
                    value: order_value,
                })?;

            molecule.add_bond(a1 as usize - 1, a2 as usize - 1, order);
        }

        Ok(molecule)
    }

    fn write_to(molecule: &Molecule, writer: &mut impl Write) -> Result<(), SdfError> {
        writeln!(writer, "{}", molecule.name)?;
        writeln!(writer, "  molrelax")?;
        writeln!(writer, "{}", molecule.comment)?;
        writeln!(
            writer,
            "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
            molecule.num_atoms(),
            molecule.num_bonds()
        )?;
        for atom in molecule.atoms() {
            writeln!(
                writer,
                "{:>10.4}{:>10.4}{:>10.4} {:<3} 0  0  0  0  0  0  0  0  0  0  0  0",
                atom.position.x, atom.position.y, atom.position.z, atom.symbol
            )?;
        }
        for bond in molecule.bonds() {
            writeln!(
                writer,
                "{:>3}{:>3}{:>3}  0  0  0  0",
                bond.i + 1,
                bond.j + 1,
                bond.order.value() as u8
            )?;
        }
        writeln!(writer, "M  END")?;
        Ok(())
    }
}
