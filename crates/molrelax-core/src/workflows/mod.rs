//! # Workflows Module
//!
//! High-level entry points tying the force field and the optimization engine
//! together.
//!
//! - **Relaxation Workflow** ([`relax`]) - Types a molecule, prepares the UFF
//!   evaluator, and drives the geometry to a local minimum.

pub mod relax;
