//! The styled one-page summary meant for people rather than CI.

use std::fmt::Write;

use crate::report::DISPLAY_TIMESTAMP_FORMAT;
use crate::report::SuiteReport;
use crate::report::escape;
use crate::runner::Outcome;

const PROJECT: &str = "Posts API Test Automation";

const STYLE: &str = r#"
body { font-family: Arial, sans-serif; margin: 20px; background-color: #f5f5f5; }
.container { max-width: 1200px; margin: 0 auto; background: white; padding: 20px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
.header { text-align: center; padding: 20px; background: #2c3e50; color: white; border-radius: 8px; margin-bottom: 20px; }
.summary { background: #ecf0f1; padding: 15px; border-radius: 8px; margin-bottom: 20px; }
.test-case { border: 1px solid #bdc3c7; margin: 10px 0; padding: 15px; border-radius: 8px; }
.passed { border-left: 5px solid #27ae60; background: #d5f4e6; }
.failed { border-left: 5px solid #e74c3c; background: #fadbd8; }
.test-name { font-weight: bold; font-size: 16px; margin-bottom: 10px; }
.test-description { color: #7f8c8d; margin-bottom: 10px; }
.test-details { background: white; padding: 10px; border-radius: 4px; }
.failure { font-family: monospace; white-space: pre-wrap; color: #c0392b; }
.timestamp { text-align: right; color: #7f8c8d; font-size: 12px; }
"#;

pub fn render(report: &SuiteReport) -> String {
    let date = report.started_at.format(DISPLAY_TIMESTAMP_FORMAT).to_string();
    let base_url = escape(&report.base_url);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str("<title>API Test Report</title>\n");
    let _ = writeln!(html, "<style>{STYLE}</style>");
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");

    html.push_str("<div class=\"header\">\n<h1>📊 API Test Report</h1>\n");
    html.push_str("<p>Posts API Automated Tests</p>\n</div>\n");

    html.push_str("<div class=\"summary\">\n<h2>📈 Summary</h2>\n");
    let _ = writeln!(html, "<p><strong>Project:</strong> {PROJECT}</p>");
    let _ = writeln!(html, "<p><strong>Base URL:</strong> {base_url}</p>");
    let _ = writeln!(html, "<p><strong>Test Date:</strong> {date}</p>");
    let _ = writeln!(
        html,
        "<p><strong>Total Tests:</strong> {}</p>",
        report.registered.len()
    );
    let _ = writeln!(
        html,
        "<p><strong>Executed:</strong> {} ({} passed, {} failed, {} errors)</p>",
        report.cases.len(),
        report.passed(),
        report.failed(),
        report.errored()
    );
    let _ = writeln!(
        html,
        "<p><strong>Test Scope:</strong> CRUD operations for /{} endpoint</p>",
        escape(report.suite)
    );
    html.push_str("</div>\n");

    html.push_str("<div class=\"test-results\">\n<h2>🧪 Test Results</h2>\n");
    for case in &report.cases {
        let (class, mark, verdict) = match case.outcome {
            Outcome::Passed => ("passed", "✅", "PASSED"),
            Outcome::Failed => ("failed", "❌", "FAILED"),
            Outcome::Errored => ("failed", "❌", "ERROR"),
        };

        let _ = writeln!(html, "<div class=\"test-case {class}\">");
        let _ = writeln!(
            html,
            "<div class=\"test-name\">{mark} {}</div>",
            escape(case.name)
        );
        let _ = writeln!(
            html,
            "<div class=\"test-description\">{}</div>",
            escape(case.description)
        );
        html.push_str("<div class=\"test-details\">\n");
        let _ = writeln!(
            html,
            "<p><strong>Endpoint:</strong> {}</p>",
            escape(case.endpoint)
        );
        let _ = writeln!(
            html,
            "<p><strong>Checks:</strong> {}</p>",
            escape(case.checks)
        );
        let _ = writeln!(html, "<p><strong>Result:</strong> {verdict}</p>");
        for failure in case.failures() {
            let _ = writeln!(
                html,
                "<p class=\"failure\">{}</p>",
                escape(&failure.message())
            );
        }
        html.push_str("</div>\n</div>\n");
    }
    html.push_str("</div>\n");

    let not_passed = report.cases.len() - report.passed();
    html.push_str("<div class=\"summary\">\n<h2>📋 Conclusions</h2>\n");
    if report.all_passed() {
        html.push_str("<p><strong>Overall Status:</strong> ✅ ALL TESTS PASSED</p>\n");
        html.push_str("<p><strong>API Status:</strong> ✅ Working correctly</p>\n");
    } else {
        let _ = writeln!(
            html,
            "<p><strong>Overall Status:</strong> ❌ {not_passed} OF {} TESTS DID NOT PASS</p>",
            report.cases.len()
        );
        let api_status = if report.errored() > 0 {
            "❌ Unreachable for some requests"
        } else {
            "⚠️ Responding, but not as expected"
        };
        let _ = writeln!(html, "<p><strong>API Status:</strong> {api_status}</p>");
    }
    html.push_str("</div>\n");

    let _ = writeln!(
        html,
        "<div class=\"timestamp\">Report generated on: {date}</div>"
    );
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::report::test::sample_report;

    #[test]
    fn reports_registered_total_and_real_outcome() {
        let html = render(&sample_report());

        assert!(html.contains("<p><strong>Project:</strong> Posts API Test Automation</p>"));
        assert!(html.contains("<p><strong>Total Tests:</strong> 3</p>"));
        assert!(html.contains("❌ 2 OF 3 TESTS DID NOT PASS"));
        assert!(html.contains("Unreachable for some requests"));
        assert!(!html.contains("ALL TESTS PASSED"));
    }

    #[test]
    fn one_block_per_case_with_its_verdict() {
        let html = render(&sample_report());

        assert_eq!(html.matches("<div class=\"test-case ").count(), 3);
        assert!(html.contains("<div class=\"test-name\">✅ get_all_posts</div>"));
        assert!(html.contains("<p><strong>Result:</strong> ERROR</p>"));
        assert!(html.contains("<p class=\"failure\">expected `title` to be &quot;"));
    }

    #[test]
    fn all_passed_conclusion() {
        let mut report = sample_report();
        report.cases.truncate(1);

        let html = render(&report);

        assert!(html.contains("✅ ALL TESTS PASSED"));
        assert!(html.contains("✅ Working correctly"));
    }
}
