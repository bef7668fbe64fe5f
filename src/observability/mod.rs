pub mod metrics;

use tracing_subscriber::EnvFilter;

/// Called once by the embedding host; library code only emits events.
pub fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_string()))
        .with_target(false)
        .compact()
        .init();
}
