use tracing_subscriber::EnvFilter;

/// Default filter used when RUST_LOG is not set.
const DEFAULT_FILTER: &str = "warn";

/// Initializes tracing for general application use.
/// Configures the log level via the RUST_LOG environment variable
/// (e.g., RUST_LOG=minischeme=trace). Output goes to stderr so that
/// program output on stdout stays clean.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes tracing specifically for tests.
#[cfg(test)]
pub fn init_test_logging() {
    // Only the first caller installs the subscriber; output is captured by the test runner.
    static TRACING_INIT: std::sync::Once = std::sync::Once::new();
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("trace")
            .with_test_writer()
            .try_init()
            .ok();
    });
}
