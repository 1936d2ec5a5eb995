//! Parser for type-checker report text.
//!
//! Turns the free-text diagnostic stream emitted by `srb tc` into structured
//! [`Diagnostic`] records. The format is line-oriented with no escaping:
//! header lines carry a location and a trailing help reference, and every
//! other line belongs to the diagnostic opened by the most recent header.
//! Blank lines never close a record on their own, which keeps multi-group
//! autocorrect blocks attached to the diagnostic they explain.

use regex::Regex;

use crate::domain::Diagnostic;

/// Sentinel printed on a clean run. Terminates the scan.
const NO_ERRORS_SENTINEL: &str = "No errors! Great job.";

/// First lines of the usage dumps printed when the checker cannot run at all
/// (no project directory, no input path). Both terminate the scan: nothing
/// that follows is a diagnostic.
const USAGE_SENTINELS: [&str; 2] = [
    "No sorbet/ directory found. Maybe you want to run 'srb init'?",
    "You must pass either `-e` or at least one folder or ruby file.",
];

/// Dev-build banner lines. Skipped wherever they appear; diagnostics may
/// still follow them.
const DEV_BANNER: [&str; 5] = [
    "👋 Hey there! Heads up that this is not a release build of sorbet.",
    "Release builds are faster and more well-supported by the Sorbet team.",
    "Check out the README to learn how to build Sorbet in release mode.",
    "To forcibly silence this error, either pass --silence-dev-message,",
    "or set SORBET_SILENCE_DEV_MESSAGE=1 in your shell environment.",
];

/// Header line shape: `<location>:<line>: <message> <help-url>/<code>`.
///
/// The location is matched greedily up to the last `:<digits>:` delimiter
/// that still leaves a help reference at the end of the line, so locations
/// containing colons, spaces or backslashes are captured whole. The trailing
/// help reference is the only valid header signature: secondary
/// `file:line: message` references inside a diagnostic lack it and stay
/// attached as context.
const HEADER_PATTERN: &str = r"^(\S.*):(\d+): (.*) https?://\S+/(\d+)$";

/// Parse a raw report into diagnostics, in order of appearance.
///
/// Lines are trailing-trimmed before matching, so carriage returns and
/// stray trailing spaces never hide a header. Total function: malformed
/// input degrades to fewer or emptier records, never an error.
pub fn parse(text: &str) -> Vec<Diagnostic> {
    let header = match Regex::new(HEADER_PATTERN) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end();
        if line.starts_with(NO_ERRORS_SENTINEL) {
            break;
        }
        if USAGE_SENTINELS.iter().any(|s| line.starts_with(s)) {
            break;
        }
        if DEV_BANNER.contains(&line) {
            continue;
        }

        if let Some(diag) = match_header(&header, line) {
            diagnostics.push(diag);
            continue;
        }

        // Not a header: context for the open diagnostic, or noise before the
        // first header.
        if let Some(current) = diagnostics.last_mut() {
            current.context.push(line.to_string());
        }
    }

    diagnostics
}

fn match_header(header: &Regex, line: &str) -> Option<Diagnostic> {
    let caps = header.captures(line)?;
    let line_number = caps[2].parse::<u32>().ok()?;
    let code = caps[4].parse::<u32>().ok()?;
    Some(Diagnostic::new(&caps[1], line_number, caps[3].trim(), code))
}
