//! JUnit XML, the format CI servers ingest.

use std::fmt::Write;

use crate::report::SuiteReport;
use crate::report::escape;
use crate::report::seconds;
use crate::runner::Outcome;

pub fn render(report: &SuiteReport) -> String {
    let tests = report.cases.len();
    let failures = report.failed();
    let errors = report.errored();
    let time = seconds(report.duration);
    let suite = escape(report.suite);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<testsuites name=\"post_quest\" tests=\"{tests}\" failures=\"{failures}\" errors=\"{errors}\" time=\"{time}\">"
    );
    let _ = writeln!(
        xml,
        "  <testsuite name=\"{suite}\" tests=\"{tests}\" failures=\"{failures}\" errors=\"{errors}\" skipped=\"0\" time=\"{time}\" timestamp=\"{}\">",
        report.started_at.format("%Y-%m-%dT%H:%M:%S")
    );
    xml.push_str("    <properties>\n");
    let _ = writeln!(
        xml,
        "      <property name=\"base_url\" value=\"{}\"/>",
        escape(&report.base_url)
    );
    xml.push_str("    </properties>\n");

    for case in &report.cases {
        let open = format!(
            "    <testcase classname=\"{suite}\" name=\"{}\" time=\"{}\"",
            escape(case.name),
            seconds(case.duration)
        );

        let tag = match case.outcome {
            Outcome::Passed => {
                let _ = writeln!(xml, "{open}/>");
                continue;
            }
            Outcome::Failed => "failure",
            Outcome::Errored => "error",
        };

        let messages: Vec<String> = case.failures().map(|result| result.message()).collect();
        let first = messages.first().cloned().unwrap_or_default();
        let kind = if tag == "failure" {
            "AssertionError"
        } else {
            "RequestError"
        };

        let _ = writeln!(xml, "{open}>");
        let _ = writeln!(
            xml,
            "      <{tag} message=\"{}\" type=\"{kind}\">{}: {}</{tag}>",
            escape(&first),
            escape(case.endpoint),
            escape(&messages.join("\n"))
        );
        xml.push_str("    </testcase>\n");
    }

    xml.push_str("  </testsuite>\n");
    xml.push_str("</testsuites>\n");
    xml
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::report::test::sample_report;

    #[test]
    fn counts_failures_and_errors_separately() {
        let xml = render(&sample_report());

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<testsuite name=\"posts\" tests=\"3\" failures=\"1\" errors=\"1\" skipped=\"0\" time=\"0.203\" timestamp=\"2026-10-19T09:30:05\">"
        ));
        assert!(xml.contains(
            "<testcase classname=\"posts\" name=\"get_all_posts\" time=\"0.120\"/>"
        ));
        assert!(xml.contains("<error message=\"expected the request to reach the server"));
    }

    #[test]
    fn failure_messages_are_escaped() {
        let xml = render(&sample_report());

        assert!(xml.contains("type=\"AssertionError\""));
        assert!(xml.contains("&lt;b&gt;New &amp; improved&lt;/b&gt;"));
        assert!(!xml.contains("<b>New"));
    }
}
