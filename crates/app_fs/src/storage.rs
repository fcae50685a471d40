//! Storage collaborator contract

use crate::{MountRegistry, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of a file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

/// Result of `stat` / `lstat`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    pub kind: EntryKind,
    pub size: u64,
}

impl FileStat {
    pub fn file(size: u64) -> Self {
        Self { kind: EntryKind::File, size }
    }

    pub fn directory() -> Self {
        Self { kind: EntryKind::Directory, size: 0 }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Clipboard operation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipboardMode {
    Copy,
    Cut,
}

/// Handle to an external directory about to be mounted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryHandle {
    pub name: String,
}

impl DirectoryHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// File system operations the menu engine delegates to.
///
/// Implementations must give read-after-write consistency for their own
/// writes; nothing here is transactional.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stat following links
    async fn stat(&self, path: &str) -> Result<FileStat>;

    /// Stat without following links
    async fn lstat(&self, path: &str) -> Result<FileStat>;

    /// Read a whole file
    async fn read_file(&self, path: &str) -> Result<Vec<u8>>;

    /// Create `name` inside `directory`, returning the name actually used
    /// (a free name is picked when `name` already exists)
    async fn create_path(&self, name: &str, directory: &str, data: Vec<u8>) -> Result<String>;

    /// Notify views of `directory` that `added` appeared (or refresh all)
    fn update_folder(&self, directory: &str, added: Option<&str>);

    /// Put entries on the clipboard for copying
    fn copy_entries(&self, paths: &[String]);

    /// Put entries on the clipboard for moving
    fn move_entries(&self, paths: &[String]);

    /// Delete a file or directory tree
    async fn delete_local_path(&self, path: &str) -> Result<()>;

    /// Mount an external directory under `root`, returning the mounted folder name
    async fn map_directory(&self, root: &str, handle: Option<DirectoryHandle>) -> Result<String>;

    /// Remove a mount; contents are kept in local storage when `preserve_contents`
    async fn unmount(&self, path: &str, preserve_contents: bool) -> Result<()>;

    /// Snapshot of the active mounts
    fn mounts(&self) -> MountRegistry;
}
