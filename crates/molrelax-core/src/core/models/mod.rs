//! Core data models for molecular structures.
//!
//! This module contains the fundamental data structures used to represent
//! molecules: atoms, bonds, the molecule container with its connectivity
//! queries, and the static periodic-table element data.

pub mod atom;
pub mod element;
pub mod molecule;
pub mod topology;
