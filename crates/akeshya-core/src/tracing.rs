use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize structured stdout tracing. Call once at service startup.
/// Uses JSON format with env-filter (`RUST_LOG` env var, default `info`).
///
/// Safe to call multiple times; later calls are ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().json().with_filter(env_filter()))
        .try_init();
}

/// Like [`init_tracing`], plus a daily-rolling JSON log file under `dir`.
///
/// Keep the returned guard alive for the lifetime of the process; dropping it
/// flushes and stops the background writer.
pub fn init_tracing_with_file(dir: impl AsRef<Path>, file_prefix: &str) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(dir, file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(non_blocking)
        .with_filter(env_filter());

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().json().with_filter(env_filter()))
        .with(file_layer)
        .try_init();
    guard
}
