//! Logging bootstrap.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured minimum level
/// applies. Console output can be disabled entirely from the config.
pub fn init_logging() {
    let config = voxconfig::get_config();

    let min_level = config
        .get_log_min_level()
        .unwrap_or_else(|_| "INFO".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.to_lowercase()));

    let enable_console = config.get_log_enable_console().unwrap_or(true);
    if enable_console {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .init();
    }
}
