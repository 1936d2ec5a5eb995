//! Typelift - Sorbet Sigil Tooling
//!
//! The `typelift` command drives a Sorbet type checker over a Ruby project.
//!
//! ## Commands
//!
//! - `tc`: run the type checker and render its diagnostics
//! - `bump`: promote sigils one level and revert the files that regress

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::Level;

use typelift_core::{
    run_bump, BumpConfig, CheckerConfig, CommandTypechecker, Diagnostic, Typechecker,
};

#[derive(Parser)]
#[command(name = "typelift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gradual strictness tooling for Sorbet projects", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the type checker and render its diagnostics
    Tc {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Maximum number of diagnostics to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only show diagnostics with this code
        #[arg(short, long)]
        code: Option<u32>,

        /// Sort order: "code" groups diagnostics by code
        #[arg(short, long)]
        sort: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Promote sigils one level and revert the files that regress
    Bump {
        /// Project root (default: current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Strictness level to select files at
        #[arg(long, default_value = "false")]
        from: String,

        /// Strictness level to promote files to
        #[arg(long, default_value = "true")]
        to: String,

        /// File extension to scan
        #[arg(long, default_value = ".rb")]
        extension: String,

        /// Print the outcome as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Override the checker command (whitespace-separated)
        #[arg(long, env = "TYPELIFT_CHECKER")]
        checker: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    typelift_core::init_tracing(cli.log_json, level);

    let exit_code = match cli.command {
        Commands::Tc {
            path,
            limit,
            code,
            sort,
            no_color,
        } => cmd_tc(&path, limit, code, sort.as_deref(), !no_color).await?,
        Commands::Bump {
            path,
            from,
            to,
            extension,
            json,
            checker,
        } => cmd_bump(&path, &from, &to, &extension, json, checker.as_deref()).await?,
    };

    std::process::exit(exit_code);
}

/// Run the type checker over the project and render the report.
async fn cmd_tc(
    path: &Path,
    limit: Option<usize>,
    code_filter: Option<u32>,
    sort: Option<&str>,
    colors: bool,
) -> Result<i32> {
    ensure_sorbet_project(path)?;

    let checker = CommandTypechecker::new(CheckerConfig::default());
    let check = checker
        .check(path)
        .await
        .context("failed to run the type checker")?;

    // Without filters the raw report passes straight through.
    if limit.is_none() && code_filter.is_none() && sort.is_none() {
        eprint!("{}", check.output);
        return Ok(if check.success { 0 } else { 1 });
    }
    if check.success {
        eprint!("{}", check.output);
        return Ok(0);
    }

    let mut diagnostics = typelift_core::report::parse(&check.output);
    let total = diagnostics.len();

    sort_diagnostics(&mut diagnostics, sort);
    if let Some(code) = code_filter {
        diagnostics.retain(|d| d.code == Some(code));
    }
    if let Some(limit) = limit {
        diagnostics.truncate(limit);
    }

    for diag in &diagnostics {
        eprintln!("{}", render_diagnostic(diag, colors));
    }

    if diagnostics.len() == total {
        eprintln!("Errors: {total}");
    } else {
        eprintln!("Errors: {} shown, {} total", diagnostics.len(), total);
    }

    Ok(1)
}

/// Promote sigils from one level to the next and keep only what verifies.
async fn cmd_bump(
    path: &Path,
    from: &str,
    to: &str,
    extension: &str,
    json: bool,
    checker_override: Option<&str>,
) -> Result<i32> {
    ensure_sorbet_project(path)?;

    let mut checker_config = CheckerConfig::default();
    if let Some(command) = checker_override {
        checker_config.command = command.split_whitespace().map(str::to_string).collect();
    }
    let checker = CommandTypechecker::new(checker_config);

    let config = BumpConfig::new(path)
        .with_levels(from, to)
        .with_extension(extension);
    let outcome = run_bump(&config, &checker)
        .await
        .context("bump run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(0);
    }

    if outcome.promoted.is_empty() && outcome.reverted.is_empty() && outcome.skipped.is_empty() {
        println!("No files found at `# typed: {from}`");
        return Ok(0);
    }

    if !outcome.promoted.is_empty() {
        println!(
            "Promoted {} file(s) to `# typed: {to}`:",
            outcome.promoted.len()
        );
        for file in &outcome.promoted {
            println!("  + {}", display_path(file, path));
        }
    }
    if !outcome.reverted.is_empty() {
        println!(
            "Reverted {} file(s) to `# typed: {from}`:",
            outcome.reverted.len()
        );
        for file in &outcome.reverted {
            println!("  - {}", display_path(file, path));
        }
    }
    if !outcome.skipped.is_empty() {
        println!("Skipped {} file(s) without a sigil:", outcome.skipped.len());
        for file in &outcome.skipped {
            println!("  ? {}", display_path(file, path));
        }
    }

    // The diagnostics behind the reverts go to stderr, same shape as `tc`.
    if !outcome.diagnostics.is_empty() {
        for diag in &outcome.diagnostics {
            eprintln!("{}", render_diagnostic(diag, true));
        }
        eprintln!("Errors: {}", outcome.diagnostics.len());
    }
    println!("Done in {}ms", outcome.duration_ms);

    Ok(0)
}

/// Fail when the project has no Sorbet configuration.
fn ensure_sorbet_project(path: &Path) -> Result<()> {
    if path.join("sorbet").join("config").is_file() {
        return Ok(());
    }
    anyhow::bail!(
        "not in a Sorbet project (no sorbet/config found under {})",
        path.display()
    )
}

/// Show paths relative to the project root where possible.
fn display_path(file: &Path, root: &Path) -> String {
    file.strip_prefix(root).unwrap_or(file).display().to_string()
}

fn sort_diagnostics(diagnostics: &mut [Diagnostic], sort: Option<&str>) {
    if sort == Some("code") {
        diagnostics.sort_by(Diagnostic::by_code);
    } else {
        diagnostics.sort();
    }
}

/// Render one diagnostic as `code - file:line: message`.
fn render_diagnostic(diag: &Diagnostic, colors: bool) -> String {
    let code = diag.code.map(|c| c.to_string()).unwrap_or_default();
    let code = if colors { code.dimmed().to_string() } else { code };
    let message = if colors {
        colorize_message(&diag.message)
    } else {
        diag.message.clone()
    };
    format!(
        "{} - {}:{}: {}",
        code,
        diag.file.as_deref().unwrap_or(""),
        diag.line.unwrap_or(0),
        message
    )
}

/// Backtick-quoted code references come out cyan, everything else red.
/// The backticks themselves are dropped.
fn colorize_message(message: &str) -> String {
    let mut out = String::new();
    let mut quoted = false;
    for chunk in message.split('`') {
        if !chunk.is_empty() {
            let painted = if quoted { chunk.cyan() } else { chunk.red() };
            out.push_str(&painted.to_string());
        }
        quoted = !quoted;
    }
    out
}
