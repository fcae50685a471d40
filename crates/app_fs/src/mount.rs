//! Mount registry

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Backend of a mount point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MountKind {
    /// Native directory picked through the file-system access API
    #[serde(rename = "FileSystemAccess")]
    FileSystemAccess,
    /// Browser database backed folder (origin-private storage included)
    #[serde(rename = "IndexedDB")]
    IndexedDb,
    /// Read-only archive or disc image
    #[serde(rename = "Archive")]
    Archive,
    /// Remote listing fetched over HTTP
    #[serde(rename = "HTTPRequest")]
    Http,
}

impl MountKind {
    pub fn name(self) -> &'static str {
        match self {
            MountKind::FileSystemAccess => "FileSystemAccess",
            MountKind::IndexedDb => "IndexedDB",
            MountKind::Archive => "Archive",
            MountKind::Http => "HTTPRequest",
        }
    }

    /// Folder-like mounts the user can disconnect
    pub fn is_mounted_folder(self) -> bool {
        matches!(self, MountKind::FileSystemAccess | MountKind::IndexedDb)
    }
}

/// Active mounts keyed by mount path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRegistry {
    mounts: BTreeMap<String, MountKind>,
}

impl MountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mount(mut self, path: impl Into<String>, kind: MountKind) -> Self {
        self.insert(path, kind);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, kind: MountKind) {
        self.mounts.insert(path.into(), kind);
    }

    pub fn remove(&mut self, path: &str) -> Option<MountKind> {
        self.mounts.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<MountKind> {
        self.mounts.get(path).copied()
    }

    /// Mount paths in registry order
    pub fn mount_list(&self) -> impl Iterator<Item = &str> {
        self.mounts.keys().map(String::as_str)
    }

    /// `path` is itself the root of a folder mount
    pub fn is_remote_mount(&self, path: &str) -> bool {
        self.get(path).map_or(false, MountKind::is_mounted_folder)
    }

    /// `path` lives inside some mount other than `/`
    pub fn is_under_mount(&self, path: &str) -> bool {
        self.mount_list()
            .any(|mount| mount != "/" && crate::vpath::is_within(path, mount))
    }
}
