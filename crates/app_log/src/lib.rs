//! ContextShell logging & crash reporting
//!
//! Structured logging for the menu engine and its action thunks, a panic
//! hook that writes crash reports, and (debug builds) deadlock detection
//! for the storage locks.

mod logging;
mod panic_hook;

pub use logging::{cleanup_old_logs, init_logging, LogGuard, LogOptions};
pub use panic_hook::{crash_report, init_panic_hook};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application log directory
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("com", "ContextShell", "ContextShell")
        .map(|dirs| dirs.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

/// Initialize all observability features with default options.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the lifetime of the process.
pub fn init() -> anyhow::Result<LogGuard> {
    let guard = init_logging(&LogOptions::default())?;
    init_panic_hook();

    #[cfg(debug_assertions)]
    init_deadlock_detector();

    Ok(guard)
}

#[cfg(debug_assertions)]
fn init_deadlock_detector() {
    use std::thread;
    use std::time::Duration;

    thread::Builder::new()
        .name("deadlock-detector".into())
        .spawn(|| loop {
            thread::sleep(Duration::from_secs(10));
            let deadlocks = parking_lot::deadlock::check_deadlock();
            if deadlocks.is_empty() {
                continue;
            }
            tracing::error!(count = deadlocks.len(), "Deadlock detected");
            for (i, threads) in deadlocks.iter().enumerate() {
                for t in threads {
                    tracing::error!(
                        cycle = i,
                        thread_id = ?t.thread_id(),
                        "{:#?}",
                        t.backtrace()
                    );
                }
            }
        })
        .map(|_| ())
        .unwrap_or_else(|e| tracing::warn!("Failed to start deadlock detector: {}", e));
}
