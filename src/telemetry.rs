use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Diagnostic logs go to stderr so they never mix with the test output.
/// `RUST_LOG` wins over the level picked from `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "post_quest=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    // A subscriber may already be installed, e.g. by a test harness.
    let _ = subscriber.try_init();
}
