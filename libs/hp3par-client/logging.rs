//! Logging initialization

use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// Target of the request/response traffic emitted by sessions with debug
/// logging turned on
pub const HTTP_LOG_TARGET: &str = "hp3par_client::http";

/// Build the filter used by [`init_tracing`]
///
/// `RUST_LOG` takes precedence over `level` when set. With `http_debug` the
/// [`HTTP_LOG_TARGET`] target is enabled at DEBUG on top of either.
pub fn env_filter(level: &str, http_debug: bool) -> EnvFilter {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    if !http_debug {
        return filter;
    }

    match format!("{}=debug", HTTP_LOG_TARGET).parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    }
}

/// Initialize tracing with standard configuration
///
/// Pass the session's `debug_logging` flag as `http_debug` so its traffic is
/// not filtered out at the configured level.
pub fn init_tracing(level: &str, http_debug: bool) {
    // A subscriber may already be installed (tests, embedding applications)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level, http_debug))
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .try_init();
}
