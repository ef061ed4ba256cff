use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "solvix=info";

/// Installs the global `tracing` subscriber.
///
/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// replaces the default `solvix=info` filter when set.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
