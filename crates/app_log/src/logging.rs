//! Structured logging setup with tracing

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging options
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Directory for rolling JSON log files
    pub directory: PathBuf,
    /// File name prefix for the rolling appender
    pub file_prefix: String,
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
    /// Mirror events to stderr
    pub console: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            directory: super::log_dir(),
            file_prefix: "context_shell.log".to_string(),
            default_filter: "info".to_string(),
            console: cfg!(debug_assertions),
        }
    }
}

/// Keeps the non-blocking file writer alive
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Initialize the logging system
pub fn init_logging(options: &LogOptions) -> anyhow::Result<LogGuard> {
    std::fs::create_dir_all(&options.directory)?;

    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, &options.directory, &options.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));

    // Development gets pretty console output on top of the JSON file
    let console = options
        .console
        .then(|| fmt::layer().pretty().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(fmt::layer().json().with_writer(non_blocking))
        .try_init()?;

    tracing::info!(dir = %options.directory.display(), "Logging initialized");
    Ok(LogGuard { _file: guard })
}

/// Clean up log files in `dir` older than specified days
pub fn cleanup_old_logs(dir: &Path, days: u32) -> anyhow::Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let threshold = SystemTime::now() - Duration::from_secs(u64::from(days) * 24 * 60 * 60);
    let mut deleted = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !is_log_file(&path) {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };

        if modified < threshold && std::fs::remove_file(&path).is_ok() {
            deleted += 1;
            tracing::debug!("Deleted old log: {:?}", path);
        }
    }

    tracing::info!("Cleaned up {} old log files", deleted);
    Ok(deleted)
}

/// Rolling appender names look like `context_shell.log.2024-01-01`
fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.contains(".log"))
}
