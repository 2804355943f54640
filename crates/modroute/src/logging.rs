use modroute_common::config::LoggingSection;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber
///
/// `RUST_LOG` overrides the configured level. Logs always go to stderr, and
/// additionally to a daily rolling file when a log directory is configured.
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_logging(config: &LoggingSection) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false);

    let Some(dir) = &config.dir else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .init();
        return None;
    };

    let _ = std::fs::create_dir_all(dir);
    // Creates files like modroute.log.2026-01-21
    let file_appender = tracing_appender::rolling::daily(dir, "modroute.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Some(guard)
}
