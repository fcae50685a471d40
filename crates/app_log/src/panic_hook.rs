//! Crash reports on panic

use backtrace::Backtrace;
use chrono::Local;
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

/// Install the crash-reporting panic hook
pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(panic_handler));
    tracing::debug!("Panic hook initialized");
}

/// Text of a crash report
pub fn crash_report(thread_name: &str, location: &str, payload: &str, backtrace: &str) -> String {
    format!(
        "=== ContextShell crash ({}) ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {}\n\
         Payload: {}\n\n\
         Stack Trace:\n{}",
        env!("CARGO_PKG_VERSION"),
        Local::now().to_rfc3339(),
        thread_name,
        location,
        payload,
        backtrace
    )
}

/// Write `report` into `<dir>/crashes`, returning the dump path
pub fn write_crash_dump(dir: &Path, report: &str) -> std::io::Result<PathBuf> {
    let crashes = dir.join("crashes");
    std::fs::create_dir_all(&crashes)?;
    let path = crashes.join(format!(
        "context_shell_crash_{}.txt",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    std::fs::write(&path, report)?;
    Ok(path)
}

fn panic_payload(info: &PanicHookInfo) -> String {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<unknown>".to_string())
}

fn panic_handler(info: &PanicHookInfo) {
    let backtrace = Backtrace::new();
    let thread = std::thread::current();
    let location = info
        .location()
        .map(|l| format!("{}:{}", l.file(), l.line()))
        .unwrap_or_else(|| "<unknown>".to_string());

    let report = crash_report(
        thread.name().unwrap_or("<unnamed>"),
        &location,
        &panic_payload(info),
        &format!("{:?}", backtrace),
    );

    eprintln!("{}", report);
    // lost if the subscriber is already torn down
    tracing::error!("{}", report);

    let dump = write_crash_dump(&super::log_dir(), &report)
        .or_else(|_| write_crash_dump(&std::env::temp_dir(), &report));
    match dump {
        Ok(path) => eprintln!("Crash report written to {}", path.display()),
        Err(e) => eprintln!("Failed to write crash dump: {}", e),
    }
}
