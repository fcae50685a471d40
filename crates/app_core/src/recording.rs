//! Recording shell
//!
//! Implements the process manager, session, file actions and assistant
//! contracts by writing every call to a log. Used by the command line
//! front end and by tests.

use crate::file_actions::FileActions;
use crate::process::{process_id, ProcessArgs, ProcessManager, ProcessState};
use crate::session::{AiAssistant, Session, WallpaperFit};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;

/// One call made into the shell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum ShellCall {
    Open {
        process: String,
        args: ProcessArgs,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    Close { id: String },
    Minimize { id: String },
    SetForeground { id: String },
    ChangeUrl { id: String, url: String },
    SetCursor { url: String },
    SetWallpaper { url: String, fit: Option<WallpaperFit> },
    SaveUnpositionedIcons,
    UpdateRecentFiles { url: String, process: String },
    ArchiveFiles { paths: Vec<String> },
    DownloadFiles { paths: Vec<String> },
    ExtractFiles { url: String },
    NewShortcut { path: String, process: String },
    BeginRename { name: String },
    NewTopic { prompt: String },
    OpenAssistant { prompt: String },
}

/// In-process shell that records instead of acting
#[derive(Debug, Default)]
pub struct RecordingShell {
    calls: Mutex<Vec<ShellCall>>,
    windows: Mutex<HashMap<String, ProcessState>>,
    ai_enabled: bool,
    assistant_open: bool,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ai(mut self, enabled: bool) -> Self {
        self.ai_enabled = enabled;
        self
    }

    /// Pretend the assistant already has a session open
    pub fn with_assistant_session(mut self) -> Self {
        self.assistant_open = true;
        self
    }

    /// Pretend the window `id` is running
    pub fn with_window(self, id: impl Into<String>, state: ProcessState) -> Self {
        self.windows.lock().insert(id.into(), state);
        self
    }

    pub fn calls(&self) -> Vec<ShellCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: ShellCall) {
        tracing::debug!(?call, "shell");
        self.calls.lock().push(call);
    }
}

impl ProcessManager for RecordingShell {
    fn open(&self, process: &str, args: ProcessArgs, id: Option<&str>) {
        let window = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => process_id(process, args.url.as_deref().unwrap_or_default()),
        };
        self.windows.lock().entry(window).or_default();
        self.record(ShellCall::Open {
            process: process.to_string(),
            args,
            id: id.map(str::to_string),
        });
    }

    fn close(&self, id: &str) {
        self.windows.lock().remove(id);
        self.record(ShellCall::Close { id: id.to_string() });
    }

    fn minimize(&self, id: &str) {
        if let Some(state) = self.windows.lock().get_mut(id) {
            state.minimized = !state.minimized;
        }
        self.record(ShellCall::Minimize { id: id.to_string() });
    }

    fn set_foreground(&self, id: &str) {
        self.record(ShellCall::SetForeground { id: id.to_string() });
    }

    fn change_url(&self, id: &str, url: &str) {
        self.record(ShellCall::ChangeUrl {
            id: id.to_string(),
            url: url.to_string(),
        });
    }

    fn get(&self, id: &str) -> Option<ProcessState> {
        self.windows.lock().get(id).copied()
    }
}

impl Session for RecordingShell {
    fn ai_enabled(&self) -> bool {
        self.ai_enabled
    }

    fn set_cursor(&self, url: &str) {
        self.record(ShellCall::SetCursor { url: url.to_string() });
    }

    fn set_wallpaper(&self, url: &str, fit: Option<WallpaperFit>) {
        self.record(ShellCall::SetWallpaper {
            url: url.to_string(),
            fit,
        });
    }

    fn save_unpositioned_desktop_icons(&self) {
        self.record(ShellCall::SaveUnpositionedIcons);
    }

    fn update_recent_files(&self, url: &str, process: &str) {
        self.record(ShellCall::UpdateRecentFiles {
            url: url.to_string(),
            process: process.to_string(),
        });
    }
}

#[async_trait]
impl FileActions for RecordingShell {
    async fn archive_files(&self, paths: Vec<String>) {
        self.record(ShellCall::ArchiveFiles { paths });
    }

    async fn download_files(&self, paths: Vec<String>) {
        self.record(ShellCall::DownloadFiles { paths });
    }

    async fn extract_files(&self, url: &str) {
        self.record(ShellCall::ExtractFiles { url: url.to_string() });
    }

    async fn new_shortcut(&self, path: &str, process: &str) {
        self.record(ShellCall::NewShortcut {
            path: path.to_string(),
            process: process.to_string(),
        });
    }

    fn begin_rename(&self, name: &str) {
        self.record(ShellCall::BeginRename { name: name.to_string() });
    }
}

impl AiAssistant for RecordingShell {
    fn has_open_session(&self) -> bool {
        self.assistant_open
    }

    fn start_new_topic(&self, prompt: &str) {
        self.record(ShellCall::NewTopic { prompt: prompt.to_string() });
    }

    fn open_with_prompt(&self, prompt: &str) {
        self.record(ShellCall::OpenAssistant { prompt: prompt.to_string() });
    }
}
