use std::path::PathBuf;

use clap::Parser;

use crate::report::ReportKind;

/// Runs the posts API regression suite and writes test reports
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Optional TOML config with [target], [reports] and [run] tables
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the API under test, without a trailing /
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Directory the report files are written to [default: reports]
    #[arg(long)]
    pub reports_dir: Option<PathBuf>,

    /// Report to write, can be repeated [default: all]
    #[arg(short, long = "report", value_enum)]
    pub reports: Vec<ReportKind>,

    /// Run the suite without writing any report files
    #[arg(long, conflicts_with = "reports")]
    pub no_reports: bool,

    /// Run only the named test, can be repeated
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,

    /// Print the registered tests and exit
    #[arg(long)]
    pub list: bool,

    /// Print every check result and enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn repeatable_flags_collect() {
        let cli = Cli::try_parse_from([
            "post_quest",
            "-r",
            "junit",
            "--report",
            "summary",
            "--only",
            "get_all_posts",
            "--only",
            "delete_post",
        ])
        .unwrap();

        assert_eq!(cli.reports, vec![ReportKind::Junit, ReportKind::Summary]);
        assert_eq!(cli.only, vec!["get_all_posts", "delete_post"]);
        assert!(cli.config.is_none());
    }

    #[test]
    fn unknown_report_kind_is_rejected() {
        assert!(Cli::try_parse_from(["post_quest", "--report", "pdf"]).is_err());
    }

    #[test]
    fn no_reports_conflicts_with_report() {
        assert!(Cli::try_parse_from(["post_quest", "--no-reports", "-r", "html"]).is_err());
    }
}
