use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset. JSON output is meant for log
/// pipelines, so dispatch decisions are kept at debug there.
fn default_directives(json: bool) -> &'static str {
    if json {
        "info,tower_http=info,axum=info,service::dispatch=debug"
    } else {
        "info,tower_http=info,axum=info"
    }
}

/// Initialize the tracing subscriber on stdout.
/// - `format` is `json` (case-insensitive) or anything else for compact
/// - Respects `RUST_LOG` if set, e.g. `RUST_LOG=info,service::dispatch=trace`
/// - A second call is a no-op
pub fn init_logging(format: &str) {
    let json = format.eq_ignore_ascii_case("json");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(json)));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stdout);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
