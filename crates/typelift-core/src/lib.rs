//! Typelift Core Library
//!
//! Re-exports the sigil bump workflow for programmatic access: report
//! parsing, sigil rewriting, checker invocation, and the orchestration
//! that ties them together.

pub mod bump;
pub mod checker;
pub mod domain;
pub mod report;
pub mod sigils;
pub mod telemetry;

pub use bump::{run_bump, BumpConfig, BumpOutcome};

pub use checker::{CheckOutput, CheckerConfig, CommandTypechecker, Typechecker};

pub use domain::{Diagnostic, Result, TypeliftError};

pub use sigils::{
    change_sigil_in_file, change_sigil_in_files, file_strictness, files_with_strictness,
    update_sigil, RewriteSummary, VALID_STRICTNESS,
};

pub use telemetry::init_tracing;

/// Typelift version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
