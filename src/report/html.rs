//! Self-contained HTML report: inline styles, no external assets.

use std::fmt::Write;

use crate::asserter::TestResult;
use crate::report::DISPLAY_TIMESTAMP_FORMAT;
use crate::report::SuiteReport;
use crate::report::escape;
use crate::report::seconds;
use crate::runner::Outcome;

const STYLE: &str = r#"
body { font-family: Helvetica, Arial, sans-serif; font-size: 12px; color: #222; margin: 20px; }
h1 { font-size: 24px; }
h2 { font-size: 16px; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #e6e6e6; padding: 5px 8px; text-align: left; vertical-align: top; }
th { background: #f2f2f2; }
#environment td:first-child { font-weight: bold; width: 160px; }
.passed { color: #2e7d32; }
.failed, .error { color: #c62828; }
.checks { list-style: none; margin: 0; padding: 0; font-family: monospace; white-space: pre-wrap; }
.checks li.fail { color: #c62828; }
"#;

pub fn render(report: &SuiteReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n<title>Test Report</title>\n");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    html.push_str("</head>\n<body>\n<h1>Test Report</h1>\n");

    html.push_str("<h2>Environment</h2>\n<table id=\"environment\">\n");
    row(&mut html, "Suite", report.suite);
    row(&mut html, "Base URL", &report.base_url);
    row(
        &mut html,
        "Started",
        &report.started_at.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
    );
    row(&mut html, "Registered tests", &report.registered.len().to_string());
    html.push_str("</table>\n");

    html.push_str("<h2>Summary</h2>\n");
    let _ = writeln!(
        html,
        "<p>{} tests ran in {} seconds.</p>",
        report.cases.len(),
        seconds(report.duration)
    );
    let _ = writeln!(
        html,
        "<p><span class=\"passed\">{} passed</span>, <span class=\"failed\">{} failed</span>, <span class=\"error\">{} errors</span></p>",
        report.passed(),
        report.failed(),
        report.errored()
    );

    html.push_str("<h2>Results</h2>\n<table id=\"results-table\">\n");
    html.push_str(
        "<thead><tr><th>Result</th><th>Test</th><th>Endpoint</th><th>Duration (s)</th><th>Checks</th></tr></thead>\n<tbody>\n",
    );

    for case in &report.cases {
        let (class, label) = match case.outcome {
            Outcome::Passed => ("passed", "Passed"),
            Outcome::Failed => ("failed", "Failed"),
            Outcome::Errored => ("error", "Error"),
        };

        let _ = write!(
            html,
            "<tr class=\"{class}\"><td class=\"{class}\">{label}</td><td>{}</td><td>{}</td><td>{}</td><td><ul class=\"checks\">",
            escape(case.name),
            escape(case.endpoint),
            seconds(case.duration)
        );
        for result in case.results.iter() {
            let (item_class, mark) = match result.status {
                TestResult::Pass => ("pass", "✔"),
                TestResult::Fail => ("fail", "✘"),
            };
            let _ = write!(
                html,
                "<li class=\"{item_class}\">{mark} {}</li>",
                escape(&result.message())
            );
        }
        html.push_str("</ul></td></tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

fn row(html: &mut String, key: &str, value: &str) {
    let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape(key), escape(value));
}
