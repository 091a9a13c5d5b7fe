//! Logging initialization with file output support

use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::paths;

/// Initialize logging with optional file output.
///
/// Returns a guard that must be kept alive while the file layer is in use.
/// Installing a subscriber when one is already set is a no-op, so library
/// consumers that configure `tracing` themselves can still call this.
pub fn init_logging(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false);

    match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(&dir, "simplyssh.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);

            let installed = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .with(file_layer)
                .try_init();

            if installed.is_err() {
                tracing::debug!("Global subscriber already set; file logging disabled");
                return None;
            }

            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init();
            None
        }
    }
}

/// Initialize logging into the standard log directory.
///
/// Falls back to console-only logging when the directory cannot be created.
pub fn init_default_logging() -> Option<WorkerGuard> {
    let Some(dir) = paths::log_dir() else {
        return init_logging(None);
    };
    match create_log_dir(&dir) {
        Ok(()) => init_logging(Some(dir)),
        Err(e) => {
            let guard = init_logging(None);
            tracing::warn!("File logging disabled, cannot create {}: {}", dir.display(), e);
            guard
        }
    }
}

/// Create the log directory, owner-only on Unix
fn create_log_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}
