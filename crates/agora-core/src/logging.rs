//! File logging setup.
//!
//! Logs go to `<base>/logs/agora.log` so they never mix with command
//! output. The filter is read from `AGORA_LOG` (same syntax as `RUST_LOG`).

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::paths;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "AGORA_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber writing to the default log directory.
///
/// Returns the writer guard; keep it alive until exit so buffered lines are
/// flushed. Returns `None` when the log file cannot be opened or a
/// subscriber is already installed; logging is then silently off.
pub fn init() -> Option<WorkerGuard> {
    init_in(&paths::logs_dir())
}

pub fn init_in(dir: &Path) -> Option<WorkerGuard> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("agora")
        .filename_suffix("log")
        .build(dir)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init()
        .ok()?;

    Some(guard)
}
