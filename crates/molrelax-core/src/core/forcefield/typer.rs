//! UFF atom type assignment from element and connectivity.
//!
//! Maps (atomic number, bond graph) to a UFF type label per atom. Positions
//! are never inspected. Hybridization is inferred from the bonding degree,
//! with a lightweight aromaticity heuristic: a degree-3 atom bonded to a
//! degree-3 carbon is treated as part of a resonant system.

use super::params;
use crate::core::models::molecule::Molecule;
use thiserror::Error;

/// Errors raised by atom type assignment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TyperError {
    #[error("No UFF type for element {symbol} (Z={atomic_number})")]
    UnknownType {
        symbol: String,
        atomic_number: usize,
    },
}

/// Assigns one UFF type label to every atom of the molecule.
///
/// # Errors
///
/// Fails with [`TyperError::UnknownType`] if an atom's element has no fixed
/// rule and none of the fallback labels exists in the parameter table.
pub fn assign_types(mol: &Molecule) -> Result<Vec<String>, TyperError> {
    let adjacency = mol.adjacency_list();
    let degrees: Vec<usize> = adjacency.iter().map(|n| n.len()).collect();

    // True if any neighbor is a three-coordinate carbon (resonant heuristic).
    let near_resonant_carbon = |index: usize| -> bool {
        adjacency[index]
            .iter()
            .any(|&n| mol.atoms()[n].atomic_number == 6 && degrees[n] == 3)
    };

    let mut types = Vec::with_capacity(mol.num_atoms());
    for (i, atom) in mol.atoms().iter().enumerate() {
        let deg = degrees[i];
        let label: String = match atom.atomic_number {
            1 => "H_".into(),
            2 => "He4+4".into(),
            3 => "Li".into(),
            4 => "Be3+2".into(),
            5 => {
                if deg <= 2 {
                    "B_2".into()
                } else {
                    "B_3".into()
                }
            }
            6 => match deg {
                0 | 1 => "C_1".into(),
                2 => "C_2".into(),
                3 => {
                    if near_resonant_carbon(i) {
                        "C_R".into()
                    } else {
                        "C_2".into()
                    }
                }
                _ => "C_3".into(),
            },
            7 => match deg {
                0 | 1 => "N_1".into(),
                2 => "N_2".into(),
                3 => {
                    if near_resonant_carbon(i) {
                        "N_R".into()
                    } else {
                        "N_3".into()
                    }
                }
                _ => "N_3".into(),
            },
            8 => match deg {
                0 | 1 => "O_2".into(),
                2 => {
                    if near_resonant_carbon(i) {
                        "O_R".into()
                    } else {
                        "O_3".into()
                    }
                }
                _ => "O_3".into(),
            },
            9 => "F_".into(),
            10 => "Ne4+4".into(),
            11 => "Na".into(),
            12 => "Mg3+2".into(),
            13 => "Al3".into(),
            14 => "Si3".into(),
            15 => {
                if deg <= 3 {
                    "P_3+3".into()
                } else {
                    "P_3+5".into()
                }
            }
            16 => {
                if deg <= 2 {
                    "S_3+2".into()
                } else if deg <= 4 {
                    "S_3+4".into()
                } else {
                    "S_3+6".into()
                }
            }
            17 => "Cl".into(),
            18 => "Ar4+4".into(),
            19 => "K_".into(),
            20 => "Ca6+2".into(),
            26 => "Fe3+2".into(),
            27 => "Co6+3".into(),
            28 => "Ni4+2".into(),
            29 => "Cu3+1".into(),
            30 => "Zn3+2".into(),
            35 => "Br".into(),
            53 => "I_".into(),
            _ => fallback_label(&atom.symbol).ok_or_else(|| TyperError::UnknownType {
                symbol: atom.symbol.clone(),
                atomic_number: atom.atomic_number,
            })?,
        };
        types.push(label);
    }

    Ok(types)
}

/// Probes the parameter table for `<Sym>_3`, `<Sym>_`, then `<Sym>`;
/// the first label present wins.
fn fallback_label(symbol: &str) -> Option<String> {
    for candidate in [format!("{symbol}_3"), format!("{symbol}_"), symbol.to_string()] {
        if params::has(&candidate) {
            return Some(candidate);
        }
    }
    None
}
