//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,interview=debug,resume=debug,interview_backend=debug,tower_http=info,axum=info").
//! - LOG_FORMAT selects "full" (default), "compact", "pretty" or "json" structured logs.
//!
//! Notes:
//! - Targets: `interview_backend` (infrastructure), `interview` (session
//!   transitions and countdown), `resume` (document parsing and extraction).
//! - Tower HTTP TraceLayer still adds per-request spans; this complements it.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
        EnvFilter::new("info,interview=debug,resume=debug,interview_backend=debug,tower_http=info,axum=info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Each format is a different subscriber type, so init in every arm.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().flatten_event(true).init();
        }
        Ok("compact") => {
            builder.compact().init();
        }
        Ok("pretty") => {
            builder.pretty().init();
        }
        _ => {
            builder.init();
        }
    }
}
