//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

use crate::LogOutput;

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialize tracing/logging for the process.
///
/// Filtering comes from `RUST_LOG`, falling back to `info` (with sqlx
/// statement logging kept at `warn`). Safe to call multiple times.
pub fn init(output: LogOutput) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = match output {
        LogOutput::Json => builder.json().with_target(false).try_init(),
        LogOutput::Pretty => builder.pretty().try_init(),
    };
}
