//! The bump workflow: raise sigils, verify, revert regressions.
//!
//! One run moves every file at `from` to `to`, runs the type checker once
//! over the project, and puts `from` back on exactly the selected files the
//! report flags. Nothing persists between runs: selection always reads live
//! disk state, so an interrupted run is resumed safely by running again and
//! two consecutive runs converge to a fixed point.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::checker::Typechecker;
use crate::domain::{Diagnostic, Result, TypeliftError};
use crate::report;
use crate::sigils;

/// Configuration for one bump run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BumpConfig {
    /// Project root to scan and check.
    pub root: PathBuf,

    /// Strictness level files must currently have to be selected.
    pub from: String,

    /// Strictness level selected files are promoted to.
    pub to: String,

    /// File extension to scan.
    pub extension: String,
}

impl BumpConfig {
    /// Configuration for the default `"false"` to `"true"` transition over
    /// `.rb` files.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            from: "false".to_string(),
            to: "true".to_string(),
            extension: ".rb".to_string(),
        }
    }

    /// Override the source and target levels.
    pub fn with_levels(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from = from.into();
        self.to = to.into();
        self
    }

    /// Override the scanned file extension.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

/// Result of one bump run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BumpOutcome {
    /// Identifier for this run, threaded through the log events.
    pub run_id: Uuid,

    /// Files durably promoted to the target level.
    pub promoted: Vec<PathBuf>,

    /// Files put back to the source level because the verification report
    /// flagged them.
    pub reverted: Vec<PathBuf>,

    /// Files that could not be rewritten (no sigil line, or a revert that
    /// failed); the next run picks them up again.
    pub skipped: Vec<PathBuf>,

    /// Every diagnostic from the verification run, including those for
    /// files outside the selection.
    pub diagnostics: Vec<Diagnostic>,

    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl BumpOutcome {
    /// Whether every selected file was promoted.
    pub fn is_clean(&self) -> bool {
        self.reverted.is_empty() && self.skipped.is_empty()
    }
}

/// Run the bump workflow: select files at `from`, promote them to `to`,
/// verify with one checker run, and revert the selected files the report
/// flags. Files outside the selection never get touched, even when the
/// report flags them.
///
/// Fails before touching any file when either level is unrecognized. When
/// the checker itself cannot run there is no diagnostic evidence to
/// reconcile against, so every promoted file is put back and the invocation
/// error is returned.
pub async fn run_bump(config: &BumpConfig, checker: &dyn Typechecker) -> Result<BumpOutcome> {
    let start = Instant::now();

    for level in [&config.from, &config.to] {
        if !sigils::VALID_STRICTNESS.contains(&level.as_str()) {
            return Err(TypeliftError::InvalidLevel {
                level: level.clone(),
            });
        }
    }

    let run_id = Uuid::new_v4();

    // Select: recomputed from live disk state on every run.
    let selected = sigils::files_with_strictness(&config.root, &config.from, &config.extension)?;
    info!(
        run_id = %run_id,
        root = %config.root.display(),
        from = %config.from,
        to = %config.to,
        selected = selected.len(),
        "Bump selection complete"
    );

    if selected.is_empty() {
        return Ok(BumpOutcome {
            run_id,
            promoted: Vec::new(),
            reverted: Vec::new(),
            skipped: Vec::new(),
            diagnostics: Vec::new(),
            duration_ms: start.elapsed().as_millis() as u64,
        });
    }

    // Apply: file by file. An IO error here aborts the run; files already
    // rewritten keep the target level and the next selection pass picks up
    // whatever state survives.
    let rewrite = sigils::change_sigil_in_files(&selected, &config.to)?;
    let applied = rewrite.changed;
    let mut skipped = rewrite.skipped;
    info!(run_id = %run_id, applied = applied.len(), skipped = skipped.len(), "Sigils promoted");

    // Verify: one full check over the project root.
    let check = match checker.check(&config.root).await {
        Ok(check) => check,
        Err(e) => {
            warn!(run_id = %run_id, error = %e, "Checker invocation failed, rolling back");
            for path in &applied {
                if let Err(revert_err) = sigils::change_sigil_in_file(path, &config.from) {
                    warn!(
                        run_id = %run_id,
                        file = %path.display(),
                        error = %revert_err,
                        "Rollback failed"
                    );
                }
            }
            return Err(e);
        }
    };
    info!(
        run_id = %run_id,
        success = check.success,
        duration_ms = check.duration_ms,
        "Checker run finished"
    );

    // Reconcile: revert exactly the selected files the report flags.
    let diagnostics = report::parse(&check.output);
    let flagged = flagged_files(&config.root, &diagnostics);

    let mut promoted = Vec::new();
    let mut reverted = Vec::new();
    for path in applied {
        if !flagged.contains(&path) {
            promoted.push(path);
            continue;
        }
        match sigils::change_sigil_in_file(&path, &config.from) {
            Ok(()) => reverted.push(path),
            Err(e) => {
                // Best effort: record the file and keep reconciling.
                warn!(run_id = %run_id, file = %path.display(), error = %e, "Revert failed");
                skipped.push(path);
            }
        }
    }

    info!(
        run_id = %run_id,
        promoted = promoted.len(),
        reverted = reverted.len(),
        skipped = skipped.len(),
        diagnostics = diagnostics.len(),
        "Bump reconciled"
    );

    Ok(BumpOutcome {
        run_id,
        promoted,
        reverted,
        skipped,
        diagnostics,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Resolve report paths against the project root. Reports normally carry
/// root-relative paths; absolute paths pass through `join` unchanged.
fn flagged_files(root: &Path, diagnostics: &[Diagnostic]) -> HashSet<PathBuf> {
    diagnostics
        .iter()
        .filter_map(|d| d.file.as_deref())
        .map(|file| root.join(file))
        .collect()
}
