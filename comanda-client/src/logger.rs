//! Logging setup

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor `LOG_LEVEL` is set
const DEFAULT_FILTER: &str = "info";

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `level` (or `LOG_LEVEL`) sets the
/// filter for every target.
pub fn init_logger(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level
            .map(str::to_string)
            .or_else(|| std::env::var("LOG_LEVEL").ok())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        build_filter(&level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .init();
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level.trim()).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
