//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - LOG_LEVEL controls the filter (e.g. "debug" or detailed directives like
//!   "info,problem=debug,session=info,mathmizer=debug").
//! - LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! Logs are written to stderr; stdout belongs to the console front end.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn,mathmizer=info,problem=info,session=info";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
