//! # Core Module
//!
//! Fundamental building blocks for UFF molecular mechanics: molecular data
//! models, force field parameters and energy evaluation, and file I/O.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds, the molecule
//!   container, and the static element table
//! - **Energy Calculations** ([`forcefield`]) - UFF parameters, atom typing,
//!   and the energy/gradient evaluator
//! - **File I/O** ([`io`]) - Reading and writing XYZ and SDF/MOL files

pub mod forcefield;
pub mod io;
pub mod models;
