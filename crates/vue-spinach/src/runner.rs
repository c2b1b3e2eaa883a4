//! Finds components, transforms them in parallel and writes the results.

use crate::cli::Args;
use crate::config::{ConfigError, SpinachConfig};
use crate::output::{Formatter, RunSummary};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use source_map::Span;
use spinach_transformer::{transform_sfc, TransformOptions};
use std::fs;
use thiserror::Error;
use walkdir::WalkDir;

/// Errors that stop the whole run.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum RunError {
    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An input path does not exist.
    #[error("no such file or directory: {0}")]
    MissingInput(Utf8PathBuf),

    /// `--out` was given without exactly one input file.
    #[error("--out needs exactly one input file")]
    OutNeedsSingleFile,

    #[error("failed to determine the current directory")]
    CurrentDir,
}

/// What happened to one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// Nothing to transform.
    Unchanged,
    /// Rewritten (written to disk unless printing or checking).
    Transformed,
    /// Would be rewritten; only reported with `--check`.
    WouldChange,
    /// The file could not be read, transformed or written.
    Failed(FileFailure),
}

/// A per-file failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub message: String,
    /// Location in the component, when the error has one.
    pub span: Option<Span>,
    /// The component source, when it was read.
    pub source: Option<String>,
}

/// The outcome for one component.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: Utf8PathBuf,
    pub status: FileStatus,
    /// The transformed component, kept for `--stdout`.
    pub output: Option<String>,
}

/// How results are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Write,
    Stdout,
    Check,
}

impl Mode {
    fn from_args(args: &Args) -> Self {
        if args.stdout {
            Mode::Stdout
        } else if args.check {
            Mode::Check
        } else {
            Mode::Write
        }
    }
}

/// Runs the transformation on every input and prints the results.
pub fn run(args: &Args) -> Result<RunSummary, RunError> {
    let cwd = std::env::current_dir()
        .ok()
        .and_then(|p| Utf8PathBuf::try_from(p).ok())
        .ok_or(RunError::CurrentDir)?;

    let reports = process(args, &cwd)?;

    let summary = RunSummary::from_reports(&reports, args.check);
    let formatter = Formatter::new(args.output);
    if args.stdout {
        for report in &reports {
            if let Some(code) = &report.output {
                print!("{code}");
            }
        }
    }
    let text = formatter.format(&reports, &summary);
    if !text.is_empty() {
        // Keep stdout clean for the transformed code.
        if args.stdout {
            eprint!("{text}");
        } else {
            print!("{text}");
        }
    }

    Ok(summary)
}

/// Transforms all inputs relative to `cwd` and returns one report per component.
pub fn process(args: &Args, cwd: &Utf8Path) -> Result<Vec<FileReport>, RunError> {
    let config = SpinachConfig::load(args.config.as_deref(), cwd)?;
    let options = config.transform_options(args);
    tracing::debug!(?options, "resolved options");

    let ignore_set = build_ignore_set(&args.ignore)?;
    let files = collect_files(args, cwd, &ignore_set)?;
    tracing::info!("found {} component(s)", files.len());

    if args.out.is_some() && (files.len() != 1 || !cwd.join(&args.inputs[0]).is_file()) {
        return Err(RunError::OutNeedsSingleFile);
    }

    let mode = Mode::from_args(args);
    let out = args.out.as_ref().map(|out| cwd.join(out));

    Ok(files
        .par_iter()
        .map(|path| {
            let report = process_file(path, &options, mode, out.as_deref());
            tracing::debug!(status = ?report.status, "{path}");
            FileReport {
                path: path.strip_prefix(cwd).unwrap_or(path).to_path_buf(),
                ..report
            }
        })
        .collect())
}

fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, RunError> {
    let mut ignore_builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| RunError::InvalidGlob(e.to_string()))?;
        ignore_builder.add(glob);
    }
    ignore_builder
        .build()
        .map_err(|e| RunError::InvalidGlob(e.to_string()))
}

/// Expands the inputs into a sorted, deduplicated list of `.vue` files.
///
/// Files named explicitly are always kept; directories are walked, skipping
/// `node_modules` and ignored paths.
fn collect_files(
    args: &Args,
    cwd: &Utf8Path,
    ignore_set: &GlobSet,
) -> Result<Vec<Utf8PathBuf>, RunError> {
    let mut files = Vec::new();

    for input in &args.inputs {
        let root = cwd.join(input);
        if root.is_file() {
            files.push(root);
            continue;
        }
        if !root.is_dir() {
            return Err(RunError::MissingInput(input.clone()));
        }

        let found = WalkDir::new(&root)
            .into_iter()
            .filter_entry(|e| e.file_name() != "node_modules")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| Utf8PathBuf::try_from(e.into_path()).ok())
            .filter(|p| p.extension() == Some("vue"))
            .filter(|p| {
                let relative = p.strip_prefix(&root).unwrap_or(p);
                !ignore_set.is_match(relative.as_str())
            });
        files.extend(found);
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn process_file(
    path: &Utf8Path,
    options: &TransformOptions,
    mode: Mode,
    out: Option<&Utf8Path>,
) -> FileReport {
    let report = |status, output| FileReport {
        path: path.to_path_buf(),
        status,
        output,
    };
    let failed = |message: String, span: Option<Span>, source: Option<String>| {
        report(
            FileStatus::Failed(FileFailure {
                message,
                span,
                source,
            }),
            None,
        )
    };

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => return failed(format!("failed to read file: {e}"), None, None),
    };

    let transformed = match transform_sfc(&source, options) {
        Ok(transformed) => transformed,
        Err(e) => return failed(e.to_string(), e.span(), Some(source)),
    };

    let changed = transformed != source;
    match mode {
        Mode::Stdout => report(
            if changed {
                FileStatus::Transformed
            } else {
                FileStatus::Unchanged
            },
            Some(transformed),
        ),
        Mode::Check if changed => report(FileStatus::WouldChange, None),
        Mode::Write if changed || out.is_some() => {
            let target = out.unwrap_or(path);
            match fs::write(target, &transformed) {
                Ok(()) if changed => report(FileStatus::Transformed, None),
                Ok(()) => report(FileStatus::Unchanged, None),
                Err(e) => failed(format!("failed to write {target}: {e}"), None, None),
            }
        }
        Mode::Check | Mode::Write => report(FileStatus::Unchanged, None),
    }
}
