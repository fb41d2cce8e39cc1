// ==========================================
// Logging setup
// ==========================================
// tracing + tracing-subscriber, level from RUST_LOG
// LOG_FORMAT=json switches to one JSON object per line
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber.
///
/// # Environment
/// - RUST_LOG: filter directive (default: info)
///   e.g. RUST_LOG=debug or RUST_LOG=competition_scheduler=trace
/// - LOG_FORMAT: `json` for structured output, anything else for text
///
/// # Example
/// ```no_run
/// use competition_scheduler::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_requested() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Verbose subscriber for tests; safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn json_requested() -> bool {
    std::env::var("LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
