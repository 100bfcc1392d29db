use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use chrono::DateTime;
use chrono::Local;
use clap::ValueEnum;
use thiserror::Error;

use crate::runner::CaseReport;
use crate::runner::Outcome;

pub mod html;
pub mod junit;
pub mod summary;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Self-contained HTML report with every check
    Html,
    /// JUnit XML for CI
    Junit,
    /// Styled HTML summary
    Summary,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [ReportKind::Html, ReportKind::Junit, ReportKind::Summary];

    pub fn name(self) -> &'static str {
        match self {
            ReportKind::Html => "html",
            ReportKind::Junit => "junit",
            ReportKind::Summary => "summary",
        }
    }

    fn file_stem(self) -> &'static str {
        match self {
            ReportKind::Html => "report",
            ReportKind::Junit => "test_results",
            ReportKind::Summary => "api_test_report",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ReportKind::Junit => "xml",
            ReportKind::Html | ReportKind::Summary => "html",
        }
    }

    pub fn render(self, report: &SuiteReport) -> String {
        match self {
            ReportKind::Html => html::render(report),
            ReportKind::Junit => junit::render(report),
            ReportKind::Summary => summary::render(report),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to create reports directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write report {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Everything the report writers need about one run.
#[derive(Debug, Clone)]
pub struct SuiteReport {
    pub suite: &'static str,
    pub base_url: String,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
    pub registered: Vec<&'static str>,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    fn count(&self, outcome: Outcome) -> usize {
        self.cases
            .iter()
            .filter(|case| case.outcome == outcome)
            .count()
    }

    pub fn passed(&self) -> usize {
        self.count(Outcome::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::Failed)
    }

    pub fn errored(&self) -> usize {
        self.count(Outcome::Errored)
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.cases.len()
    }
}

/// Writes one file per kind into `dir` and returns their paths.
pub fn write_reports(
    report: &SuiteReport,
    dir: &Path,
    kinds: &[ReportKind],
) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let stamp = report.started_at.format(TIMESTAMP_FORMAT).to_string();

    kinds
        .iter()
        .map(|kind| {
            let stem = format!("{}_{stamp}", kind.file_stem());
            write_new(dir, &stem, kind.extension(), &kind.render(report))
        })
        .collect()
}

/// Never overwrites: a taken name gets a `-1`, `-2`, ... suffix.
fn write_new(
    dir: &Path,
    stem: &str,
    extension: &str,
    contents: &str,
) -> Result<PathBuf, ReportError> {
    let mut attempt = 0;
    loop {
        let file_name = if attempt == 0 {
            format!("{stem}.{extension}")
        } else {
            format!("{stem}-{attempt}.{extension}")
        };
        let path = dir.join(file_name);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())
                    .map_err(|source| ReportError::Write {
                        path: path.clone(),
                        source,
                    })?;
                return Ok(path);
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => return Err(ReportError::Write { path, source }),
        }
    }
}

/// Escapes text for HTML and XML bodies and attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub fn seconds(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64())
}
