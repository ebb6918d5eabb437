use tracing_subscriber::EnvFilter;

/// Installs the process-wide JSON subscriber. Later calls are no-ops so the
/// CLI can run several commands in one process without panicking.
pub fn init(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = service_name, "logging initialized");
    }
}
