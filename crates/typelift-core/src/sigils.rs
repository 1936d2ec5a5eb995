//! Strictness sigil handling for Ruby source files.
//!
//! A sigil is a `# typed: <level>` comment near the top of a file. Only the
//! first sigil line in a file is authoritative; later sigil-looking lines
//! are inert and preserved verbatim on rewrite.
//!
//! File rewrites happen one file at a time with no cross-file transaction.
//! A run that stops mid-rewrite leaves a mixed set on disk; the next
//! selection pass recomputes from whatever survives, so callers never need
//! a saved plan to recover.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::domain::{Result, TypeliftError};

/// The closed vocabulary of recognized strictness levels, in ascending
/// order of enforcement.
pub const VALID_STRICTNESS: [&str; 5] = ["ignore", "false", "true", "strict", "strong"];

/// Matches a sigil line and captures the raw value token. Anchored per line
/// so the first match in a file is the first sigil line.
const SIGIL_PATTERN: &str = r"(?m)^#[ \t]*typed[ \t]*:[ \t]*(\S*)";

fn sigil_regex() -> Option<&'static Regex> {
    static SIGIL: OnceLock<Option<Regex>> = OnceLock::new();
    SIGIL.get_or_init(|| Regex::new(SIGIL_PATTERN).ok()).as_ref()
}

/// Build the canonical sigil line for a strictness value. The empty string
/// yields a bare `# typed: ` marker, used as a building block.
pub fn sigil_string(strictness: &str) -> String {
    format!("# typed: {strictness}")
}

/// Return the raw value of the first sigil line in `content`, or `None`
/// when no sigil line exists. The value is surfaced even when it is not a
/// recognized level; validity is a separate question.
pub fn strictness(content: &str) -> Option<&str> {
    let re = sigil_regex()?;
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether the first sigil value of `content` is a recognized level.
pub fn valid_strictness(content: &str) -> bool {
    strictness(content).is_some_and(|value| VALID_STRICTNESS.contains(&value))
}

/// Replace the value of the first sigil line, leaving every other line,
/// including any later sigil-looking lines, untouched.
///
/// Returns `None` when `content` has no sigil line; the caller decides
/// whether that is an error. No vocabulary check is applied here: rewriting
/// to an unrecognized value is allowed at this layer.
pub fn update_sigil(content: &str, new_strictness: &str) -> Option<String> {
    let re = sigil_regex()?;
    let found = re.find(content)?;

    let mut updated = String::with_capacity(content.len() + new_strictness.len());
    updated.push_str(&content[..found.start()]);
    updated.push_str(&sigil_string(new_strictness));
    updated.push_str(&content[found.end()..]);
    Some(updated)
}

// ---------------------------------------------------------------------------
// File-scoped helpers
// ---------------------------------------------------------------------------

/// Outcome of a bulk sigil rewrite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewriteSummary {
    /// Files whose sigil was rewritten.
    pub changed: Vec<PathBuf>,

    /// Files left untouched because they have no sigil line.
    pub skipped: Vec<PathBuf>,
}

/// Read the file at `path` and return its raw sigil value, if any.
pub fn file_strictness(path: &Path) -> Result<Option<String>> {
    let content = fs::read_to_string(path)?;
    Ok(strictness(&content).map(str::to_string))
}

/// Rewrite the first sigil of the file at `path` to `new_strictness`.
///
/// Fails with [`TypeliftError::SigilNotFound`] when the file has no sigil
/// line; the file is left untouched in that case.
pub fn change_sigil_in_file(path: &Path, new_strictness: &str) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let updated =
        update_sigil(&content, new_strictness).ok_or_else(|| TypeliftError::SigilNotFound {
            path: path.to_path_buf(),
        })?;
    fs::write(path, updated)?;
    Ok(())
}

/// Rewrite sigils across `paths`, one file at a time.
///
/// Files without a sigil are recorded as skipped and left untouched. IO
/// errors abort immediately: files rewritten before the failure keep their
/// new sigil, and the next selection pass recomputes from disk state.
pub fn change_sigil_in_files(paths: &[PathBuf], new_strictness: &str) -> Result<RewriteSummary> {
    let mut summary = RewriteSummary::default();
    for path in paths {
        match change_sigil_in_file(path, new_strictness) {
            Ok(()) => summary.changed.push(path.clone()),
            Err(TypeliftError::SigilNotFound { .. }) => {
                warn!(file = %path.display(), "No sigil line, skipping rewrite");
                summary.skipped.push(path.clone());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(summary)
}

/// List every file under `root` whose name ends in `extension` and whose
/// first sigil value equals `strictness_value`.
///
/// Unreadable or non-utf8 files are skipped with a warning rather than
/// aborting the selection.
pub fn files_with_strictness(
    root: &Path,
    strictness_value: &str,
    extension: &str,
) -> Result<Vec<PathBuf>> {
    let mut selected = Vec::new();
    for path in walk_files(root, extension)? {
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Unreadable file, skipping");
                continue;
            }
        };
        if strictness(&content) == Some(strictness_value) {
            selected.push(path);
        }
    }
    Ok(selected)
}

/// Recursively collect files whose name ends in `extension` under `root`.
/// Dot entries are never descended into or listed, and each directory is
/// visited in name order so the result is stable across platforms.
fn walk_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(root)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut files = Vec::new();
    for entry in entries {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            files.extend(walk_files(&path, extension)?);
        } else if name.to_string_lossy().ends_with(extension) {
            files.push(path);
        }
    }
    Ok(files)
}
