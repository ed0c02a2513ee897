use super::config::LogLevel;
use std::sync::Once;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Install the global tracing subscriber once. Subsequent calls (e.g. from
/// multiple tests in one process) are no-ops rather than errors.
///
/// `RUST_LOG` takes precedence over the configured level so noisy modules can
/// be silenced per-run without touching configuration.
pub fn setup(level: LogLevel) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .compact(),
        );

        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("tracing subscriber already installed, keeping the existing one");
        }
    });
}
