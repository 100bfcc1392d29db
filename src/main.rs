#![allow(clippy::result_large_err)]

use std::process::ExitCode;
use std::time::Instant;

use chrono::Local;
use clap::Parser;
use console::style;
use miette::Diagnostic;
use miette::Result;
use thiserror::Error;
use tracing::info;

use crate::cli::Cli;
use crate::client::ApiClient;
use crate::client::ClientError;
use crate::outputter::OutPutter;
use crate::parser::PostQuest;
use crate::report::ReportError;
use crate::report::SuiteReport;
use crate::report::write_reports;
use crate::runner::CaseReport;
use crate::runner::RunnerError;
use crate::runner::run_suite;
use crate::suite::Suite;
use crate::validator::RunSetup;
use crate::validator::ValidationError;
use crate::validator::Validator;

mod asserter;
mod cli;
mod client;
mod outputter;
mod parser;
mod post;
mod report;
mod runner;
mod suite;
mod telemetry;
mod validator;

#[derive(Error, Debug, Diagnostic)]
pub enum PostQuestError {
    #[error("Failed to read toml file")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse toml file: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ValidationError(#[from] ValidationError),

    #[error("Failed to set up the HTTP client")]
    Client(#[from] ClientError),

    #[error("Failed while running the suite")]
    Runner(#[from] RunnerError),

    #[error("Failed to write reports")]
    Report(#[from] ReportError),
}

/// Merges the optional TOML config with the CLI and validates the result
/// against the registered cases.
///
/// # Errors
/// Returns a `PostQuestError` if:
/// - The config file cannot be read,
/// - The TOML fails to parse,
/// - Or a value fails validation.
fn load_and_validate_config(cli: &Cli, suite: &Suite) -> Result<RunSetup, PostQuestError> {
    let Some(path) = &cli.config else {
        return Ok(Validator::without_config(suite).validate(cli)?);
    };

    let contents = std::fs::read_to_string(path).map_err(PostQuestError::FileError)?;
    let config: PostQuest = toml::from_str(&contents).map_err(PostQuestError::TomlParsing)?;

    let file_name = path.display().to_string();
    let setup = Validator::new(&config, &contents, &file_name, suite)
        .validate(cli)
        .map_err(PostQuestError::ValidationError)?;

    Ok(setup)
}

fn list_cases(suite: &Suite) {
    println!(
        "{}",
        style(format!("{} registered tests in `{}`:", suite.len(), suite.name()))
            .bold()
            .cyan()
    );
    for case in suite.cases() {
        println!(
            "  {} {}",
            style(format!("{:<38}", case.name)).bold(),
            style(case.description).dim()
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    telemetry::init_tracing(cli.verbose);

    let registered = Suite::posts();

    if cli.list {
        list_cases(&registered);
        return Ok(ExitCode::SUCCESS);
    }

    // CLI values win over the config file, which wins over the defaults.
    let setup = load_and_validate_config(&cli, &registered)?;
    info!(?setup, "validated run setup");

    let suite = registered.select(&setup.only);
    let n_tests = suite.len();
    let suite_name = suite.name();

    let client = ApiClient::new(&setup.base_url).map_err(PostQuestError::Client)?;

    let started_at = Local::now();
    let started = Instant::now();

    // The runner and the outputter share this one thread. The runner drops
    // its sender when the last case is done, which ends the outputter.
    let (tx, rx) = flume::unbounded::<CaseReport>();
    let (run_result, cases) = futures::join!(
        run_suite(suite, &client, tx),
        OutPutter::start(rx, client.base_url(), n_tests, cli.verbose)
    );
    run_result.map_err(PostQuestError::Runner)?;

    let report = SuiteReport {
        suite: suite_name,
        base_url: setup.base_url.clone(),
        started_at,
        duration: started.elapsed(),
        registered: registered.names(),
        cases,
    };

    if !setup.report_kinds.is_empty() {
        let paths = write_reports(&report, &setup.reports_dir, &setup.report_kinds)
            .map_err(PostQuestError::Report)?;

        println!();
        for path in paths {
            println!(
                "{} {}",
                style("[REPORT]").cyan().bold(),
                path.display()
            );
        }
    }

    if report.all_passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
