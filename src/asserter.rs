use core::fmt;
use std::fmt::Display;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::client::ApiResponse;
use crate::client::ClientError;
use crate::client::Payload;
use crate::post::Post;
use crate::post::PostField;

/// Expected status code. `OneOf` is used where the remote service is free
/// to pick among several reasonable answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusExpectation {
    Exact(u16),
    OneOf(Vec<u16>),
}

impl StatusExpectation {
    pub fn one_of(codes: &[u16]) -> Self {
        StatusExpectation::OneOf(codes.to_vec())
    }

    pub fn matches(&self, status: StatusCode) -> bool {
        match self {
            StatusExpectation::Exact(code) => status.as_u16() == *code,
            StatusExpectation::OneOf(codes) => codes.contains(&status.as_u16()),
        }
    }
}

impl Display for StatusExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusExpectation::Exact(code) => write!(f, "{code}"),
            StatusExpectation::OneOf(codes) => {
                let codes: Vec<String> = codes.iter().map(u16::to_string).collect();
                write!(f, "one of [{}]", codes.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TestResult {
    Pass,
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Assertion {
    Status(StatusExpectation),
    Decodes(&'static str),
    NonEmpty(&'static str),
    HasFields(Vec<PostField>),
    EveryHasFields(Vec<PostField>),
    Field { field: String, expected: Value },
    Unchanged { field: String, baseline: Option<Value> },
    Every { field: String, expected: Value },
    RequestSucceeds,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Actual {
    Status(StatusCode),
    Decoded,
    DecodeFailed(String),
    Count(usize),
    MissingFields(Vec<PostField>),
    Field(Option<Value>),
    Mismatches(Vec<String>),
    RequestFailed(String),
}

#[derive(Debug, Clone)]
pub struct AssertResult {
    pub status: TestResult,
    pub expected: Assertion,
    pub actual: Actual,
}

impl AssertResult {
    /// Plain one-line description, free of terminal styling.
    pub fn message(&self) -> String {
        match self.status {
            TestResult::Pass => format!("{}: {}", self.expected, self.actual),
            TestResult::Fail => format!("expected {}, {}", self.expected.describe(), self.actual),
        }
    }
}

impl Display for AssertResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.status, &self.actual) {
            (TestResult::Pass, actual) => {
                write!(
                    f,
                    "{} {} {}",
                    console::style("✔").green().bold(),
                    console::style("PASS!").green().bold(),
                    actual
                )
            }

            (TestResult::Fail, Actual::RequestFailed(err)) => {
                writeln!(
                    f,
                    "{} {}",
                    console::style("✘").red().bold(),
                    console::style("FAIL!").red().bold(),
                )?;
                write!(
                    f,
                    "  {} {}",
                    console::style("Request failed with error:").red(),
                    console::style(err).red().bold()
                )
            }

            (TestResult::Fail, Actual::Mismatches(mismatches)) => {
                writeln!(
                    f,
                    "{} {} {}",
                    console::style("✘").red().bold(),
                    console::style("FAIL!").red().bold(),
                    self.expected,
                )?;
                writeln!(
                    f,
                    "  Expected: {}",
                    console::style(self.expected.describe()).green()
                )?;
                write!(f, "  {}", console::style("Offending items:").red())?;
                for mismatch in mismatches {
                    write!(f, "\n    {}", console::style(mismatch).red())?;
                }
                Ok(())
            }

            (TestResult::Fail, actual) => {
                write!(
                    f,
                    "{} {} {}\n  Expected: {}\n  Actual:   {}",
                    console::style("✘").red().bold(),
                    console::style("FAIL!").red().bold(),
                    self.expected,
                    console::style(self.expected.describe()).green(),
                    console::style(actual).red(),
                )
            }
        }
    }
}

impl Assertion {
    /// What the assertion expects, phrased to follow "expected".
    pub fn describe(&self) -> String {
        match self {
            Assertion::Status(expectation) => format!("status {expectation}"),
            Assertion::Decodes(shape) => format!("body to decode as {shape}"),
            Assertion::NonEmpty(what) => format!("at least one {what}"),
            Assertion::HasFields(fields) | Assertion::EveryHasFields(fields) => {
                format!("fields {}", join_fields(fields))
            }
            Assertion::Field { field, expected } => format!("`{field}` to be {expected}"),
            Assertion::Unchanged { field, baseline } => match baseline {
                Some(value) => format!("`{field}` to stay {value}"),
                None => format!("`{field}` to stay absent"),
            },
            Assertion::Every { field, expected } => {
                format!("every item to have `{field}` = {expected}")
            }
            Assertion::RequestSucceeds => "the request to reach the server".into(),
        }
    }
}

impl Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assertion::Status(_) => write!(f, "Status test"),
            Assertion::Decodes(_) => write!(f, "Shape test"),
            Assertion::NonEmpty(_) => write!(f, "Non-empty test"),
            Assertion::HasFields(_) | Assertion::EveryHasFields(_) => write!(f, "Fields test"),
            Assertion::Field { field, .. } => write!(f, "Field `{field}` test"),
            Assertion::Unchanged { field, .. } => write!(f, "Unchanged `{field}` test"),
            Assertion::Every { field, .. } => write!(f, "Filter `{field}` test"),
            Assertion::RequestSucceeds => write!(f, "Request test"),
        }
    }
}

impl Display for Actual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actual::Status(status_code) => write!(f, "got status {}", status_code),
            Actual::Decoded => write!(f, "body decoded"),
            Actual::DecodeFailed(err) => write!(f, "got undecodable body: {err}"),
            Actual::Count(n) => write!(f, "got {n} items"),
            Actual::MissingFields(missing) if missing.is_empty() => {
                write!(f, "all fields present")
            }
            Actual::MissingFields(missing) => write!(f, "missing {}", join_fields(missing)),
            Actual::Field(Some(value)) => write!(f, "got {value}"),
            Actual::Field(None) => write!(f, "got no value"),
            Actual::Mismatches(mismatches) if mismatches.is_empty() => write!(f, "no mismatches"),
            Actual::Mismatches(mismatches) => {
                write!(f, "got {} mismatches: {}", mismatches.len(), mismatches.join("; "))
            }
            Actual::RequestFailed(err) => write!(f, "request failed: {err}"),
        }
    }
}

fn join_fields(fields: &[PostField]) -> String {
    fields
        .iter()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Error, Debug)]
pub enum CaseError {
    /// The failing result is already recorded in [`Checks`].
    #[error("{0}")]
    AssertionFailed(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Collects the assertion results of one test case.
///
/// Every check records its result, pass or fail. A failing check also
/// returns `Err` so the case stops there: later checks usually depend on
/// the earlier ones having held.
#[derive(Debug, Default)]
pub struct Checks {
    results: Vec<AssertResult>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn results(&self) -> &[AssertResult] {
        &self.results
    }

    pub fn into_results(self) -> Vec<AssertResult> {
        self.results
    }

    fn record(
        &mut self,
        expected: Assertion,
        actual: Actual,
        passed: bool,
    ) -> Result<(), CaseError> {
        let result = AssertResult {
            status: if passed {
                TestResult::Pass
            } else {
                TestResult::Fail
            },
            expected,
            actual,
        };

        if passed {
            self.results.push(result);
            return Ok(());
        }

        let message = result.message();
        self.results.push(result);
        Err(CaseError::AssertionFailed(message))
    }

    /// Records a transport failure for the case that was running.
    pub fn request_failed(&mut self, error: &ClientError) {
        self.results.push(AssertResult {
            status: TestResult::Fail,
            expected: Assertion::RequestSucceeds,
            actual: Actual::RequestFailed(error.to_string()),
        });
    }

    pub fn status(&mut self, response: &ApiResponse, code: u16) -> Result<(), CaseError> {
        self.status_matches(response, StatusExpectation::Exact(code))
    }

    /// Acceptable-set check: any of `codes` passes.
    pub fn status_in(&mut self, response: &ApiResponse, codes: &[u16]) -> Result<(), CaseError> {
        self.status_matches(response, StatusExpectation::one_of(codes))
    }

    fn status_matches(
        &mut self,
        response: &ApiResponse,
        expected: StatusExpectation,
    ) -> Result<(), CaseError> {
        let passed = expected.matches(response.status);

        self.record(
            Assertion::Status(expected),
            Actual::Status(response.status),
            passed,
        )
    }

    /// Decodes the body, recording a failed shape check when it does not fit.
    pub fn decode<T: DeserializeOwned>(
        &mut self,
        response: &ApiResponse,
        shape: &'static str,
    ) -> Result<T, CaseError> {
        let decoded = response.decode::<T>();
        let actual = match &decoded {
            Ok(_) => Actual::Decoded,
            Err(err) => Actual::DecodeFailed(err.to_string()),
        };
        let passed = decoded.is_ok();

        self.record(Assertion::Decodes(shape), actual, passed)?;
        decoded.map_err(|err| CaseError::AssertionFailed(err.to_string()))
    }

    pub fn non_empty<T>(&mut self, what: &'static str, items: &[T]) -> Result<(), CaseError> {
        self.record(
            Assertion::NonEmpty(what),
            Actual::Count(items.len()),
            !items.is_empty(),
        )
    }

    pub fn has_fields(&mut self, post: &Post, fields: &[PostField]) -> Result<(), CaseError> {
        let missing = post.missing_fields(fields);
        let passed = missing.is_empty();

        self.record(
            Assertion::HasFields(fields.to_vec()),
            Actual::MissingFields(missing),
            passed,
        )
    }

    pub fn every_has_fields(
        &mut self,
        posts: &[Post],
        fields: &[PostField],
    ) -> Result<(), CaseError> {
        let mismatches: Vec<String> = posts
            .iter()
            .enumerate()
            .filter_map(|(index, post)| {
                let missing = post.missing_fields(fields);
                (!missing.is_empty())
                    .then(|| format!("item {index} is missing {}", join_fields(&missing)))
            })
            .collect();
        let passed = mismatches.is_empty();

        self.record(
            Assertion::EveryHasFields(fields.to_vec()),
            Actual::Mismatches(mismatches),
            passed,
        )
    }

    pub fn field_eq(
        &mut self,
        post: &Post,
        field: &str,
        expected: impl Into<Value>,
    ) -> Result<(), CaseError> {
        let expected = expected.into();
        let actual = post.get(field);
        let passed = actual.as_ref() == Some(&expected);

        self.record(
            Assertion::Field {
                field: field.to_owned(),
                expected,
            },
            Actual::Field(actual),
            passed,
        )
    }

    pub fn unchanged(
        &mut self,
        baseline: &Post,
        updated: &Post,
        field: &str,
    ) -> Result<(), CaseError> {
        let before = baseline.get(field);
        let after = updated.get(field);
        let passed = before == after;

        self.record(
            Assertion::Unchanged {
                field: field.to_owned(),
                baseline: before,
            },
            Actual::Field(after),
            passed,
        )
    }

    /// Every field of the payload came back with the value that was sent.
    pub fn echoes(&mut self, payload: &Payload, post: &Post) -> Result<(), CaseError> {
        for (field, value) in payload {
            self.field_eq(post, field, value.clone())?;
        }
        Ok(())
    }

    /// Fields sent in the payload took the new value, every other post field
    /// kept its baseline value.
    pub fn partial_update(
        &mut self,
        payload: &Payload,
        baseline: &Post,
        updated: &Post,
    ) -> Result<(), CaseError> {
        self.echoes(payload, updated)?;

        for field in PostField::ALL {
            if !payload.contains_key(field.name()) {
                self.unchanged(baseline, updated, field.name())?;
            }
        }
        Ok(())
    }

    pub fn every(
        &mut self,
        posts: &[Post],
        field: &str,
        expected: impl Into<Value>,
    ) -> Result<(), CaseError> {
        let expected = expected.into();
        let mismatches: Vec<String> = posts
            .iter()
            .enumerate()
            .filter_map(|(index, post)| match post.get(field) {
                Some(value) if value == expected => None,
                Some(value) => Some(format!("item {index} has `{field}` = {value}")),
                None => Some(format!("item {index} has no `{field}`")),
            })
            .collect();
        let passed = mismatches.is_empty();

        self.record(
            Assertion::Every {
                field: field.to_owned(),
                expected,
            },
            Actual::Mismatches(mismatches),
            passed,
        )
    }
}
