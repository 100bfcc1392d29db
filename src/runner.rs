use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use flume::SendError;
use flume::Sender;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

use crate::asserter::AssertResult;
use crate::asserter::CaseError;
use crate::asserter::Checks;
use crate::asserter::TestResult;
use crate::client::ApiClient;
use crate::suite::Suite;
use crate::suite::TestCase;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("channel error")]
    ChannelError(#[from] SendError<CaseReport>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// An assertion did not hold.
    Failed,
    /// The request never produced a response.
    Errored,
}

#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: &'static str,
    pub description: &'static str,
    pub endpoint: &'static str,
    pub checks: &'static str,
    pub outcome: Outcome,
    pub results: Arc<[AssertResult]>,
    pub duration: Duration,
}

impl CaseReport {
    pub fn failures(&self) -> impl Iterator<Item = &AssertResult> {
        self.results
            .iter()
            .filter(|result| result.status == TestResult::Fail)
    }
}

/// Runs every case of the suite one after another and hands each report to
/// the outputter as soon as the case is done.
pub async fn run_suite(
    suite: Suite,
    client: &ApiClient,
    tx: Sender<CaseReport>,
) -> Result<(), RunnerError> {
    for case in suite.cases() {
        let report = run_case(case, client).await;
        tx.send_async(report).await?;
    }

    Ok(())
}

pub async fn run_case(case: &TestCase, client: &ApiClient) -> CaseReport {
    let started = Instant::now();
    let mut checks = Checks::new();

    let result = (case.run)(client, &mut checks).await;

    let outcome = match result {
        Ok(()) => Outcome::Passed,
        Err(CaseError::AssertionFailed(message)) => {
            debug!(case = case.name, %message, "assertion failed");
            Outcome::Failed
        }
        Err(CaseError::Client(error)) => {
            warn!(case = case.name, %error, "request failed");
            checks.request_failed(&error);
            Outcome::Errored
        }
    };

    CaseReport {
        name: case.name,
        description: case.description,
        endpoint: case.endpoint,
        checks: case.checks,
        outcome,
        results: Arc::from(checks.into_results()),
        duration: started.elapsed(),
    }
}
