//! Output formatting.

use crate::cli::OutputFormat;
use crate::runner::{FileFailure, FileReport, FileStatus};
use camino::Utf8Path;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, SourceSpan};
use serde::Serialize;
use source_map::{LineCol, LineIndex};
use thiserror::Error;

/// A failed component, rendered with its source by miette.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(vue_spinach::transform))]
struct FailureReport {
    message: String,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: Option<SourceSpan>,
}

/// A formatted file report for JSON output.
#[derive(Debug, Serialize)]
pub struct FormattedReport {
    /// The file path.
    pub filename: String,
    /// `transformed`, `unchanged`, `would-change` or `failed`.
    pub status: &'static str,
    /// The failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The start of the failing code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Position>,
    /// The end of the failing code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Position>,
}

/// A position in the source.
#[derive(Debug, Serialize)]
pub struct Position {
    /// 1-indexed line number.
    pub line: u32,
    /// 1-indexed column number.
    pub column: u32,
    /// Byte offset.
    pub offset: u32,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    files: Vec<FormattedReport>,
    summary: &'a RunSummary,
}

/// Formats run results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the per-file reports and the summary.
    pub fn format(&self, reports: &[FileReport], summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Human => Self::format_human(reports, summary),
            OutputFormat::Json => Self::format_json(reports, summary),
        }
    }

    /// Formats as human-readable output. Unchanged files are not listed.
    fn format_human(reports: &[FileReport], summary: &RunSummary) -> String {
        let mut output = String::new();

        for report in reports {
            match &report.status {
                FileStatus::Unchanged => {}
                FileStatus::Transformed => {
                    output.push_str(&format!("transformed {}\n", report.path));
                }
                FileStatus::WouldChange => {
                    output.push_str(&format!("would change {}\n", report.path));
                }
                FileStatus::Failed(failure) => {
                    output.push_str(&Self::render_failure(&report.path, failure));
                    output.push('\n');
                }
            }
        }

        output.push_str(&summary.format());
        output.push('\n');
        output
    }

    fn render_failure(path: &Utf8Path, failure: &FileFailure) -> String {
        let report = FailureReport {
            message: format!("{path}: {}", failure.message),
            src: NamedSource::new(path.as_str(), failure.source.clone().unwrap_or_default()),
            span: failure
                .source
                .as_ref()
                .and(failure.span)
                .map(|span| SourceSpan::from(span.range())),
        };

        let mut rendered = String::new();
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
        if handler.render_report(&mut rendered, &report).is_err() {
            rendered = format!("error: {}\n", report.message);
        }
        rendered
    }

    /// Formats as JSON output.
    fn format_json(reports: &[FileReport], summary: &RunSummary) -> String {
        let output = JsonOutput {
            files: reports.iter().map(Self::format_json_report).collect(),
            summary,
        };
        let mut json = serde_json::to_string_pretty(&output).unwrap_or_default();
        json.push('\n');
        json
    }

    /// Formats one report into a JSON-ready struct.
    pub fn format_json_report(report: &FileReport) -> FormattedReport {
        let mut formatted = FormattedReport {
            filename: report.path.to_string(),
            status: match report.status {
                FileStatus::Unchanged => "unchanged",
                FileStatus::Transformed => "transformed",
                FileStatus::WouldChange => "would-change",
                FileStatus::Failed(_) => "failed",
            },
            message: None,
            start: None,
            end: None,
        };

        if let FileStatus::Failed(failure) = &report.status {
            formatted.message = Some(failure.message.clone());
            if let (Some(span), Some(source)) = (failure.span, &failure.source) {
                let line_index = LineIndex::new(source);
                let position = |offset| {
                    let LineCol { line, col } =
                        line_index.line_col(offset).unwrap_or(LineCol::new(0, 0));
                    Position {
                        line: line + 1,
                        column: col + 1,
                        offset: u32::from(offset),
                    }
                };
                formatted.start = Some(position(span.start));
                formatted.end = Some(position(span.end));
            }
        }

        formatted
    }
}

/// Summary of a run.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Number of components looked at.
    pub file_count: usize,
    /// Number of components rewritten, or that would be with `--check`.
    pub changed_count: usize,
    /// Number of components that failed.
    pub failed_count: usize,
    /// Whether this was a `--check` run.
    pub check: bool,
}

impl RunSummary {
    pub fn from_reports(reports: &[FileReport], check: bool) -> Self {
        let mut summary = Self {
            file_count: reports.len(),
            check,
            ..Default::default()
        };
        for report in reports {
            match report.status {
                FileStatus::Transformed | FileStatus::WouldChange => summary.changed_count += 1,
                FileStatus::Failed(_) => summary.failed_count += 1,
                FileStatus::Unchanged => {}
            }
        }
        summary
    }

    /// Whether the process should exit with an error.
    pub fn is_failure(&self) -> bool {
        self.failed_count > 0 || (self.check && self.changed_count > 0)
    }

    /// Formats the summary line.
    pub fn format(&self) -> String {
        let file_word = if self.file_count == 1 {
            "file"
        } else {
            "files"
        };
        let changed = if self.check {
            "would change"
        } else {
            "transformed"
        };

        format!(
            "vue-spinach checked {} {}: {} {}, {} failed",
            self.file_count, file_word, self.changed_count, changed, self.failed_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use source_map::Span;

    fn report(path: &str, status: FileStatus) -> FileReport {
        FileReport {
            path: Utf8PathBuf::from(path),
            status,
            output: None,
        }
    }

    fn failure() -> FileStatus {
        FileStatus::Failed(FileFailure {
            message: "the default export must be an object literal".to_string(),
            span: Some(Span::new(24u32, 26u32)),
            source: Some("<script>\nexport default 42\n</script>\n".to_string()),
        })
    }

    #[test]
    fn test_format_human() {
        let reports = [
            report("src/A.vue", FileStatus::Transformed),
            report("src/B.vue", FileStatus::Unchanged),
            report("src/C.vue", failure()),
        ];
        let summary = RunSummary::from_reports(&reports, false);
        let output = Formatter::new(OutputFormat::Human).format(&reports, &summary);

        assert!(output.starts_with("transformed src/A.vue\n"));
        assert!(!output.contains("src/B.vue"));
        assert!(output.contains("src/C.vue: the default export must be an object literal"));
        assert!(output.contains("export default 42"));
        assert!(output.ends_with("vue-spinach checked 3 files: 1 transformed, 1 failed\n"));
    }

    #[test]
    fn test_format_json() {
        let reports = [
            report("A.vue", FileStatus::WouldChange),
            report("C.vue", failure()),
        ];
        let summary = RunSummary::from_reports(&reports, true);
        let output = Formatter::new(OutputFormat::Json).format(&reports, &summary);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        insta::assert_json_snapshot!(value, @r###"
        {
          "files": [
            {
              "filename": "A.vue",
              "status": "would-change"
            },
            {
              "end": {
                "column": 18,
                "line": 2,
                "offset": 26
              },
              "filename": "C.vue",
              "message": "the default export must be an object literal",
              "start": {
                "column": 16,
                "line": 2,
                "offset": 24
              },
              "status": "failed"
            }
          ],
          "summary": {
            "changedCount": 1,
            "check": true,
            "failedCount": 1,
            "fileCount": 2
          }
        }
        "###);
    }

    #[test]
    fn test_summary() {
        let summary = RunSummary {
            file_count: 1,
            changed_count: 1,
            failed_count: 0,
            check: true,
        };
        assert_eq!(
            summary.format(),
            "vue-spinach checked 1 file: 1 would change, 0 failed"
        );
        assert!(summary.is_failure());
        assert!(!RunSummary::default().is_failure());
    }
}
