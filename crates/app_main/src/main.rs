//! ContextShell - context menu engine for desktop file entries
//!
//! Builds the menu of one entry over a seeded in-memory storage, prints it
//! and optionally activates one of its entries.

mod cli;

use anyhow::{bail, Context, Result};
use app_core::{
    find_path, render, snapshot, AppConfig, FileReference, MenuRequest, RecordingShell,
    SequentialTransfer, StaticCapabilities,
};
use app_fs::{MemoryStorage, MountKind, Storage};
use cli::{CliInvocation, MenuArgs};
use std::sync::Arc;

fn main() -> Result<()> {
    let _guard = app_log::init()?;

    match app_log::cleanup_old_logs(&app_log::log_dir(), 7) {
        Ok(0) => {}
        Ok(removed) => tracing::debug!(removed, "Old logs removed"),
        Err(e) => tracing::warn!("Failed to cleanup old logs: {}", e),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let menu_args = match cli::parse_invocation(&args) {
        Ok(CliInvocation::PrintHelp) => {
            println!("{}", cli::USAGE);
            return Ok(());
        }
        Ok(CliInvocation::PrintVersion) => {
            println!("context_shell {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Ok(CliInvocation::Menu(menu_args)) => menu_args,
        Err(e) => {
            eprintln!("{}", cli::USAGE);
            return Err(e.into());
        }
    };

    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(run(menu_args, config))
}

/// Demo tree around the configured desktop
fn demo_storage(config: &AppConfig) -> MemoryStorage {
    let desktop = config.desktop.path.as_str();
    MemoryStorage::new()
        .with_file(&format!("{}/photo.png", desktop), b"\x89PNG\r\n\x1a\n".to_vec())
        .with_file(&format!("{}/notes.txt", desktop), "Meeting notes")
        .with_file(&config.root_shortcut_path(), "[InternetShortcut]\nURL=/\n")
        .with_file("/Users/Music/song.wav", b"RIFF".to_vec())
        .with_file(
            "/Users/Music/mix.pls",
            "[playlist]\nFile1=/Users/Music/song.wav\nTitle1=Song\nLength1=180\nNumberOfEntries=1\n",
        )
        .with_file("/Users/Documents/budget.csv", "month,total\njan,10\n")
        .with_file("/Users/Downloads/archive.zip", b"PK".to_vec())
        .with_mount("/Drive", MountKind::FileSystemAccess)
}

async fn run(args: MenuArgs, config: AppConfig) -> Result<()> {
    let storage = Arc::new(demo_storage(&config));
    let shell = Arc::new(RecordingShell::new().with_ai(args.ai || config.ai.enabled));
    let transfer = Arc::new(SequentialTransfer::new());
    let builder = app_core::assemble(
        config,
        storage.clone(),
        shell.clone(),
        Arc::new(StaticCapabilities::all()),
        transfer.clone(),
    );

    let url = args.url.clone().unwrap_or_else(|| args.path.clone());
    let mut request = MenuRequest::new(FileReference::new(&args.path, url, &args.pid))
        .focused(args.focused.iter().cloned())
        .read_only(args.read_only);
    match storage.stat(&args.path).await {
        Ok(stat) => request = request.stat(stat),
        Err(e) => tracing::debug!(path = %args.path, "stat failed: {}", e),
    }
    if let Some(id) = &args.file_manager {
        request = request.file_manager(id);
    }

    let menu = builder.build(&request);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot(&menu))?);
    } else {
        print!("{}", render(&menu));
    }

    let Some(path) = &args.invoke else {
        return Ok(());
    };
    let labels: Vec<&str> = path.iter().map(String::as_str).collect();
    let Some(action) = find_path(&menu, &labels).and_then(|entry| entry.action()) else {
        bail!("no menu entry at {}", path.join("/"));
    };

    tracing::info!(entry = %path.join("/"), "Activating menu entry");
    action.invoke().await;

    if let Some(job) = transfer.handle(&args.path) {
        let progress = job.finished().await;
        println!(
            "{} {}/{} ({:?})",
            progress.operation, progress.completed, progress.total, progress.state
        );
    }

    for call in shell.calls() {
        println!("{}", serde_json::to_string(&call)?);
    }
    for event in storage.journal() {
        println!("{:?}", event);
    }

    Ok(())
}
