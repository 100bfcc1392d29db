use console::Style;
use flume::Receiver;

use crate::runner::CaseReport;
use crate::runner::Outcome;

pub struct OutPutter;

impl OutPutter {
    /// Prints each case as it arrives, then a summary of the failures.
    /// Returns every report received, in arrival order.
    pub async fn start(
        rx: Receiver<CaseReport>,
        base_url: &str,
        n_tests: usize,
        verbose: bool,
    ) -> Vec<CaseReport> {
        let style = Style::new().bold().cyan();
        let open_text = &format!("Running against: {base_url} Found {n_tests} tests: Running...");
        let open_text = style.apply_to(open_text);

        println!("{open_text}");
        let mut i = 1;
        let mut reports: Vec<CaseReport> = vec![];
        while let Ok(report) = rx.recv_async().await {
            println!("{}", progress_line(i, n_tests, &report));

            if verbose {
                for result in report.results.iter() {
                    println!("      {result}");
                }
            }

            reports.push(report);
            i += 1;
        }

        let failed: Vec<&CaseReport> = reports
            .iter()
            .filter(|report| report.outcome != Outcome::Passed)
            .collect();

        println!();
        if !failed.is_empty() {
            println!(
                "{}",
                console::style("Summary of Failed Tests:").bold().red()
            );
            for (idx, report) in failed.iter().enumerate() {
                for result in report.failures() {
                    println!("\n{} {} ({}). {}", idx + 1, report.name, report.endpoint, result);
                }
            }
            println!();
            println!(
                "{}",
                console::style(format!(
                    "{} passed, {} failed",
                    reports.len() - failed.len(),
                    failed.len()
                ))
                .bold()
                .red()
            );
        } else {
            println!("{}", console::style("All tests passed! 🎉").bold().green());
        }

        reports
    }
}

fn progress_line(i: usize, n_tests: usize, report: &CaseReport) -> String {
    let (marker, verdict) = match report.outcome {
        Outcome::Passed => (
            console::style("✔").green().bold(),
            console::style("PASS!").green().bold(),
        ),
        Outcome::Failed => (
            console::style("╳").red().bold(),
            console::style("FAILED!").red().bold(),
        ),
        Outcome::Errored => (
            console::style("╳").red().bold(),
            console::style("ERROR!").red().bold(),
        ),
    };

    format!(
        "[{i}/{n_tests}] {marker}  {}: {} {verdict} {}",
        report.name,
        console::style(report.endpoint).dim(),
        console::style(format!("({} ms)", report.duration.as_millis())).dim(),
    )
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn report(name: &'static str, outcome: Outcome) -> CaseReport {
        CaseReport {
            name,
            description: "",
            endpoint: "GET /posts",
            checks: "",
            outcome,
            results: Arc::from(vec![]),
            duration: Duration::from_millis(12),
        }
    }

    #[test]
    fn progress_line_shows_position_and_verdict() {
        let line = progress_line(2, 13, &report("get_all_posts", Outcome::Failed));
        let line = console::strip_ansi_codes(&line);

        assert_eq!(line, "[2/13] ╳  get_all_posts: GET /posts FAILED! (12 ms)");
    }

    #[tokio::test]
    async fn collects_reports_in_arrival_order() {
        let (tx, rx) = flume::unbounded::<CaseReport>();

        tx.send_async(report("first", Outcome::Passed)).await.unwrap();
        tx.send_async(report("second", Outcome::Errored)).await.unwrap();
        drop(tx);

        let reports = OutPutter::start(rx, "http://localhost", 2, false).await;

        let names: Vec<_> = reports.iter().map(|report| report.name).collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
