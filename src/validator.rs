use std::path::PathBuf;

use clap::ValueEnum;
use miette::Diagnostic;
use miette::NamedSource;
use miette::SourceSpan;
use thiserror::Error;
use url::Url;

use crate::cli::Cli;
use crate::client::DEFAULT_BASE_URL;
use crate::parser::PostQuest;
use crate::report::ReportKind;
use crate::suite::Suite;

const DEFAULT_REPORTS_DIR: &str = "reports";

// Error messages for the base URL
const BASE_URL_ENDS_WITH: &str =
    "The base URL can’t end with a /, every request path starts with one";
const BASE_URL_SCHEME: &str = "The base URL must use http or https";

/// Settings for one run after merging the CLI over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSetup {
    pub base_url: String,
    pub reports_dir: PathBuf,
    pub report_kinds: Vec<ReportKind>,
    pub only: Vec<String>,
}

pub struct Validator<'a> {
    config: PostQuest,
    toml_src: String,
    file_name: String,
    suite: &'a Suite,
}

#[derive(Debug, Error, Diagnostic)]
#[error("Invalid field `{field}`: {message}")]
pub struct ValidationError {
    field: String,
    message: String,
    #[source_code]
    src: Option<NamedSource<String>>,
    #[label("invalid value here")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<String>,
}

macro_rules! validation_err {
    ($field:expr, $msg:expr) => {
        ValidationError {
            field: $field.to_string(),
            message: $msg.to_string(),
            src: None,
            span: None,
            help: None,
        }
    };
    ($field:expr, $msg:expr, $self:expr, $snippet:expr) => {
        ValidationError {
            field: $field.to_string(),
            message: $msg.to_string(),
            src: Some(NamedSource::new(
                $self.file_name.clone(),
                $self.toml_src.clone(),
            )),
            span: find_span($snippet, &$self.toml_src),
            help: None,
        }
    };
}

impl<'a> Validator<'a> {
    pub fn new(config: &PostQuest, toml_src: &str, file_name: &str, suite: &'a Suite) -> Self {
        Self {
            config: config.clone(),
            toml_src: toml_src.into(),
            file_name: file_name.into(),
            suite,
        }
    }

    /// Validator for a run with no config file, only CLI values.
    pub fn without_config(suite: &'a Suite) -> Self {
        Self::new(&PostQuest::default(), "", "", suite)
    }

    pub fn validate(&self, cli: &Cli) -> Result<RunSetup, ValidationError> {
        Ok(RunSetup {
            base_url: self.validate_base_url(cli)?,
            reports_dir: self.validate_reports_dir(cli)?,
            report_kinds: self.validate_report_kinds(cli)?,
            only: self.validate_only(cli)?,
        })
    }

    fn validate_base_url(&self, cli: &Cli) -> Result<String, ValidationError> {
        if let Some(base_url) = &cli.base_url {
            check_base_url(base_url).map_err(|e| validation_err!("--base-url", e))?;
            return Ok(base_url.clone());
        }

        let configured = self
            .config
            .target
            .as_ref()
            .and_then(|target| target.base_url.as_ref());

        match configured {
            Some(base_url) => {
                check_base_url(base_url)
                    .map_err(|e| validation_err!("target.base_url", e, self, base_url))?;
                Ok(base_url.clone())
            }
            None => Ok(DEFAULT_BASE_URL.into()),
        }
    }

    fn validate_reports_dir(&self, cli: &Cli) -> Result<PathBuf, ValidationError> {
        if let Some(dir) = &cli.reports_dir {
            return Ok(dir.clone());
        }

        match self.config.reports.as_ref().and_then(|r| r.dir.as_ref()) {
            Some(dir) if dir.trim().is_empty() => Err(validation_err!(
                "reports.dir",
                "The reports directory can’t be empty",
                self,
                dir
            )),
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Ok(PathBuf::from(DEFAULT_REPORTS_DIR)),
        }
    }

    fn validate_report_kinds(&self, cli: &Cli) -> Result<Vec<ReportKind>, ValidationError> {
        if cli.no_reports {
            return Ok(vec![]);
        }
        if !cli.reports.is_empty() {
            return Ok(dedup(cli.reports.iter().copied()));
        }

        let Some(kinds) = self.config.reports.as_ref().and_then(|r| r.kinds.as_ref()) else {
            return Ok(ReportKind::ALL.to_vec());
        };

        let kinds = kinds
            .iter()
            .map(|kind| {
                ReportKind::from_str(kind, true).map_err(|_| {
                    let known: Vec<_> = ReportKind::ALL.iter().map(|k| k.name()).collect();
                    ValidationError {
                        help: Some(format!("known report kinds: {}", known.join(", "))),
                        ..validation_err!(
                            "reports.kinds",
                            format!("Unknown report kind `{kind}`"),
                            self,
                            kind
                        )
                    }
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        Ok(dedup(kinds))
    }

    fn validate_only(&self, cli: &Cli) -> Result<Vec<String>, ValidationError> {
        if !cli.only.is_empty() {
            for name in &cli.only {
                if !self.suite.contains(name) {
                    return Err(ValidationError {
                        help: Some(self.registered_help()),
                        ..validation_err!("--only", format!("No registered test named `{name}`"))
                    });
                }
            }
            return Ok(cli.only.clone());
        }

        let Some(only) = self.config.run.as_ref().and_then(|run| run.only.as_ref()) else {
            return Ok(vec![]);
        };

        for name in only {
            if !self.suite.contains(name) {
                return Err(ValidationError {
                    help: Some(self.registered_help()),
                    ..validation_err!(
                        "run.only",
                        format!("No registered test named `{name}`"),
                        self,
                        name
                    )
                });
            }
        }

        Ok(only.clone())
    }

    fn registered_help(&self) -> String {
        format!("registered tests: {}", self.suite.names().join(", "))
    }
}

fn check_base_url(base_url: &str) -> Result<(), String> {
    let url = Url::parse(base_url).map_err(|e| e.to_string())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(BASE_URL_SCHEME.into());
    }

    if base_url.ends_with('/') {
        return Err(BASE_URL_ENDS_WITH.into());
    }

    Ok(())
}

fn dedup(kinds: impl IntoIterator<Item = ReportKind>) -> Vec<ReportKind> {
    let mut unique = Vec::new();
    for kind in kinds {
        if !unique.contains(&kind) {
            unique.push(kind);
        }
    }
    unique
}

fn find_span(needle: &str, toml_src: &str) -> Option<SourceSpan> {
    let pattern = format!("\"{}\"", needle);
    toml_src
        .find(&pattern)
        .map(|start| SourceSpan::new((start + 1).into(), needle.len()))
}

#[cfg(test)]
mod test {
    use clap::Parser;

    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("post_quest").chain(args.iter().copied())).unwrap()
    }

    fn validate(toml_src: &str, args: &[&str]) -> Result<RunSetup, ValidationError> {
        let suite = Suite::posts();
        let config: PostQuest = toml::from_str(toml_src).unwrap();
        Validator::new(&config, toml_src, "post_quest.toml", &suite).validate(&cli(args))
    }

    #[test]
    fn defaults_without_config() {
        let suite = Suite::posts();
        let setup = Validator::without_config(&suite).validate(&cli(&[])).unwrap();

        assert_eq!(
            setup,
            RunSetup {
                base_url: DEFAULT_BASE_URL.into(),
                reports_dir: PathBuf::from("reports"),
                report_kinds: ReportKind::ALL.to_vec(),
                only: vec![],
            }
        );
    }

    #[test]
    fn cli_wins_over_config() {
        let src = r#"
[target]
base_url = "http://localhost:3000"

[reports]
dir = "from-config"
kinds = ["html"]
"#;

        let setup = validate(
            src,
            &["-b", "http://127.0.0.1:8080", "--reports-dir", "cli", "-r", "junit"],
        )
        .unwrap();

        assert_eq!(setup.base_url, "http://127.0.0.1:8080");
        assert_eq!(setup.reports_dir, PathBuf::from("cli"));
        assert_eq!(setup.report_kinds, vec![ReportKind::Junit]);
    }

    #[test]
    fn config_fills_what_the_cli_leaves_out() {
        let src = r#"
[target]
base_url = "http://localhost:3000"

[reports]
kinds = ["summary", "JUnit", "summary"]

[run]
only = ["create_post"]
"#;

        let setup = validate(src, &[]).unwrap();

        assert_eq!(setup.base_url, "http://localhost:3000");
        assert_eq!(
            setup.report_kinds,
            vec![ReportKind::Summary, ReportKind::Junit]
        );
        assert_eq!(setup.only, vec!["create_post"]);
    }

    #[test]
    fn no_reports_clears_kinds() {
        let setup = validate("", &["--no-reports"]).unwrap();

        assert!(setup.report_kinds.is_empty());
    }

    #[test]
    fn base_url_with_trailing_slash_points_at_the_value() {
        let src = "[target]\nbase_url = \"http://localhost:3000/\"\n";

        let err = validate(src, &[]).unwrap_err();

        assert_eq!(err.field, "target.base_url");
        assert_eq!(err.message, BASE_URL_ENDS_WITH);
        assert_eq!(err.span, Some(SourceSpan::new(21usize.into(), 22)));
    }

    #[test]
    fn rejects_non_http_schemes_and_garbage() {
        let err = validate("", &["-b", "ftp://localhost"]).unwrap_err();
        assert_eq!(err.message, BASE_URL_SCHEME);
        assert!(err.src.is_none());

        let err = validate("", &["-b", "not a url"]).unwrap_err();
        assert_eq!(err.field, "--base-url");
    }

    #[test]
    fn rejects_unknown_report_kind() {
        let src = "[reports]\nkinds = [\"html\", \"pdf\"]\n";

        let err = validate(src, &[]).unwrap_err();

        assert_eq!(err.message, "Unknown report kind `pdf`");
        assert_eq!(
            err.help.as_deref(),
            Some("known report kinds: html, junit, summary")
        );
        assert!(err.span.is_some());
    }

    #[test]
    fn rejects_unregistered_test_names() {
        let err = validate("", &["--only", "get_all_post"]).unwrap_err();
        assert_eq!(err.message, "No registered test named `get_all_post`");
        assert!(err.help.unwrap().contains("get_all_posts"));

        let err = validate("[run]\nonly = [\"nope\"]\n", &[]).unwrap_err();
        assert_eq!(err.field, "run.only");
        assert!(err.span.is_some());
    }

    #[test]
    fn rejects_empty_reports_dir() {
        let err = validate("[reports]\ndir = \"\"\n", &[]).unwrap_err();

        assert_eq!(err.field, "reports.dir");
    }
}
