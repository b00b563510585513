use tracing_subscriber::{fmt, EnvFilter};

/// Dependency crates whose debug chatter drowns out reconciliation logs.
const QUIET_DEPS: &str = "hyper_util=warn,reqwest=info,rustls=warn";

fn default_directives(default_level: &str) -> String {
    format!("{default_level},{QUIET_DEPS}")
}

/// `RUST_LOG` wins when set; otherwise `default_level` for our crates with
/// noisy dependencies capped.
fn filter_for(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(default_level)))
}

/// Initialize human-readable logging.
///
/// Safe to call multiple times (e.g. in tests) -- subsequent calls are no-ops.
pub fn init_logging(service_name: &str, default_level: &str) {
    fmt()
        .with_env_filter(filter_for(default_level))
        .with_target(true)
        .try_init()
        .ok();

    tracing::info!(service = service_name, "logging initialised");
}

/// Initialize JSON logging for log shippers.
///
/// Safe to call multiple times -- subsequent calls are no-ops.
pub fn init_logging_json(service_name: &str, default_level: &str) {
    fmt()
        .json()
        .with_env_filter(filter_for(default_level))
        .with_target(true)
        .try_init()
        .ok();

    tracing::info!(service = service_name, "logging initialised (json)");
}
