//! Domain models for typelift.
//!
//! Canonical definitions for the core entities:
//! - `Diagnostic`: One structured issue from a type-checker report
//! - `TypeliftError`: Error taxonomy shared across the crate

pub mod diagnostic;
pub mod error;

// Re-export main types and errors
pub use diagnostic::Diagnostic;
pub use error::{Result, TypeliftError};
