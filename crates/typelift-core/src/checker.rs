//! Type-checker invocation.
//!
//! The bump workflow is agnostic to how the checker runs; this module
//! defines the [`Typechecker`] seam plus a default implementation that
//! shells out to `bundle exec srb tc` in the project root. Output is fully
//! buffered before parsing: diagnostic boundaries are only known once later
//! header lines are visible, so there is nothing to stream.

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::domain::{Result, TypeliftError};

// ---------------------------------------------------------------------------
// Checker trait
// ---------------------------------------------------------------------------

/// Trait for type-checker backends.
#[async_trait]
pub trait Typechecker: Send + Sync {
    /// Run one full check over the project at `root` and capture its output.
    ///
    /// A run that reports type errors is still `Ok`: only a process that
    /// could not run at all (spawn failure, timeout, signal kill) is an
    /// error.
    async fn check(&self, root: &Path) -> Result<CheckOutput>;
}

/// Captured result of one checker run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckOutput {
    /// Combined stdout and stderr text.
    pub output: String,

    /// Whether the process exited successfully.
    pub success: bool,

    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,

    /// When the check finished.
    pub checked_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Command-backed checker
// ---------------------------------------------------------------------------

/// Configuration for the command-backed checker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckerConfig {
    /// Command to execute (first element is the executable).
    pub command: Vec<String>,

    /// Extra arguments appended after the command.
    pub extra_args: Vec<String>,

    /// Timeout in seconds; 0 means no timeout.
    pub timeout_secs: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "bundle".to_string(),
                "exec".to_string(),
                "srb".to_string(),
                "tc".to_string(),
            ],
            extra_args: Vec::new(),
            timeout_secs: 0,
        }
    }
}

/// Checker that spawns an external command in the project root with piped
/// stdio and waits for it to finish.
#[derive(Debug, Clone, Default)]
pub struct CommandTypechecker {
    config: CheckerConfig,
}

impl CommandTypechecker {
    /// Create a checker from a configuration.
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Typechecker for CommandTypechecker {
    async fn check(&self, root: &Path) -> Result<CheckOutput> {
        let start = Instant::now();

        if self.config.command.is_empty() {
            return Err(TypeliftError::CheckerInvocation {
                reason: "empty checker command".to_string(),
            });
        }

        let exe = &self.config.command[0];
        let args = &self.config.command[1..];

        let child = Command::new(exe)
            .args(args)
            .args(&self.config.extra_args)
            .current_dir(root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TypeliftError::CheckerInvocation {
                reason: format!("failed to spawn {exe}: {e}"),
            })?;

        let output = if self.config.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.config.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| TypeliftError::CheckerInvocation {
                reason: format!("{exe} timed out after {} seconds", self.config.timeout_secs),
            })?
            .map_err(|e| TypeliftError::CheckerInvocation {
                reason: format!("failed to wait for {exe}: {e}"),
            })?
        } else {
            child
                .wait_with_output()
                .await
                .map_err(|e| TypeliftError::CheckerInvocation {
                    reason: format!("failed to wait for {exe}: {e}"),
                })?
        };

        // A signal kill leaves no usable report behind; that is an infra
        // failure, not a failed check.
        if output.status.code().is_none() {
            return Err(TypeliftError::CheckerInvocation {
                reason: format!("{exe} terminated by signal"),
            });
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CheckOutput {
            output: combined,
            success: output.status.success(),
            duration_ms: start.elapsed().as_millis() as u64,
            checked_at: Utc::now(),
        })
    }
}
