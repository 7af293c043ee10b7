//! Common types and utilities for the buzz compiler front end.
//!
//! This crate provides foundational types used across all buzz crates:
//! - String interning (`Atom`, `Interner`)
//! - Compiler limits and thresholds
//! - Diagnostics (`Diagnostic`, `DiagnosticReporter`)

// String interning for identifiers, literals, and canonical type strings
pub mod interner;
pub use interner::{Atom, Interner};

// Centralized limits and thresholds
pub mod limits;

// Diagnostics - error collection and rendering
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticReporter};
