// src/infra/logger.rs — Structured logging with tracing

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Output goes to stderr; stdout is reserved
/// for the serialized session state.
///
/// `AEROFORGE_LOG` takes precedence over `RUST_LOG`; `level` is the fallback.
pub fn init_logging(level: &str) {
    let filter = std::env::var("AEROFORGE_LOG")
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
