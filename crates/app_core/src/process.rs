//! Process/window manager contract

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Joins a process name and its url into a process id
pub const PROCESS_DELIMITER: &str = "__";

pub const FILE_EXPLORER: &str = "FileExplorer";
pub const PAINT: &str = "Paint";
pub const PROPERTIES: &str = "Properties";
pub const OPEN_WITH: &str = "OpenWith";
pub const TRANSFER: &str = "Transfer";

/// Id of the instance of `process` bound to `url`
pub fn process_id(process: &str, url: &str) -> String {
    format!("{}{}{}", process, PROCESS_DELIMITER, url)
}

/// Arguments passed to a newly opened process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut_path: Option<String>,
}

impl ProcessArgs {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            shortcut_path: None,
        }
    }
}

/// Window state of a running process
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessState {
    pub minimized: bool,
}

/// Window manager operations the menu actions use
pub trait ProcessManager: Send + Sync {
    /// Open `process`; `id` overrides the generated instance id
    fn open(&self, process: &str, args: ProcessArgs, id: Option<&str>);

    fn close(&self, id: &str);

    /// Toggle the minimized state
    fn minimize(&self, id: &str);

    fn set_foreground(&self, id: &str);

    /// Point an existing window at another url
    fn change_url(&self, id: &str, url: &str);

    fn get(&self, id: &str) -> Option<ProcessState>;
}

/// Display metadata of a process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub title: String,
    pub icon: String,
}

/// Registry of known processes
#[derive(Debug, Clone)]
pub struct ProcessDirectory {
    entries: HashMap<String, ProcessInfo>,
}

impl ProcessDirectory {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, title: impl Into<String>, icon: impl Into<String>) {
        self.entries.insert(
            id.into(),
            ProcessInfo {
                title: title.into(),
                icon: icon.into(),
            },
        );
    }

    pub fn get(&self, id: &str) -> Option<&ProcessInfo> {
        self.entries.get(id)
    }

    pub fn icon(&self, id: &str) -> Option<String> {
        self.get(id).map(|info| info.icon.clone())
    }

    /// Title for menus, the id when the process is unknown
    pub fn title<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map_or(id, |info| info.title.as_str())
    }
}

impl Default for ProcessDirectory {
    fn default() -> Self {
        let mut directory = Self::empty();
        for (id, title, icon) in [
            ("Browser", "Browser", "/System/Icons/chromium.webp"),
            (FILE_EXPLORER, "File Explorer", "/System/Icons/explorer.webp"),
            ("JSDOS", "DOS", "/System/Icons/jsdos.webp"),
            ("Marked", "Marked", "/System/Icons/marked.webp"),
            ("MonacoEditor", "Monaco Editor", "/System/Icons/monaco.webp"),
            (OPEN_WITH, "Open With", "/System/Icons/unknown.webp"),
            (PAINT, "Paint", "/System/Icons/paint.webp"),
            ("PDF", "PDF", "/System/Icons/pdf.webp"),
            ("Photos", "Photos", "/System/Icons/photo.webp"),
            (PROPERTIES, "Properties", "/System/Icons/info.webp"),
            ("Spreadsheet", "Spreadsheet", "/System/Icons/spreadsheet.webp"),
            (TRANSFER, "Transfer", "/System/Icons/copying.webp"),
            ("VideoPlayer", "Video Player", "/System/Icons/vlc.webp"),
            ("Vim", "Vim", "/System/Icons/vim.webp"),
            ("Webamp", "Webamp", "/System/Icons/webamp.webp"),
        ] {
            directory.insert(id, title, icon);
        }
        directory
    }
}
