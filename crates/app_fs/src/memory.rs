//! In-memory storage implementation
//!
//! Backs the demo binary and every test that needs a `Storage`. Besides the
//! tree itself it keeps a journal of mutating calls so tests can assert on
//! what an action did.

use crate::{
    vpath, ClipboardMode, DirectoryHandle, EntryKind, FileStat, FsError, MountKind,
    MountRegistry, Result, Storage,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Node {
    Directory,
    File(Vec<u8>),
}

/// Mutating call recorded by `MemoryStorage`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    Created { path: String },
    FolderUpdated { directory: String, added: Option<String> },
    Clipboard { mode: ClipboardMode, paths: Vec<String> },
    Deleted { path: String },
    Mapped { root: String, folder: String },
    Unmounted { path: String, preserve_contents: bool },
}

/// In-memory implementation of `Storage`
pub struct MemoryStorage {
    nodes: RwLock<BTreeMap<String, Node>>,
    mounts: RwLock<MountRegistry>,
    journal: RwLock<Vec<StorageEvent>>,
}

impl MemoryStorage {
    /// Create a storage containing only `/`
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Directory);

        Self {
            nodes: RwLock::new(nodes),
            mounts: RwLock::new(MountRegistry::new()),
            journal: RwLock::new(Vec::new()),
        }
    }

    /// Add a file, creating parent directories as needed
    pub fn with_file(self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.insert_file(path, data.into());
        self
    }

    /// Add a directory, creating parents as needed
    pub fn with_dir(self, path: &str) -> Self {
        self.insert_dir(path);
        self
    }

    /// Register a mount point (the directory is created too)
    pub fn with_mount(self, path: &str, kind: MountKind) -> Self {
        self.insert_dir(path);
        self.mounts.write().insert(path, kind);
        self
    }

    pub fn insert_file(&self, path: &str, data: Vec<u8>) {
        let path = vpath::normalize(path);
        self.insert_dir(vpath::dirname(&path));
        self.nodes.write().insert(path, Node::File(data));
    }

    pub fn insert_dir(&self, path: &str) {
        let path = vpath::normalize(path);
        let mut nodes = self.nodes.write();
        let mut current = path.as_str();
        loop {
            nodes.entry(current.to_string()).or_insert(Node::Directory);
            if current == "/" || current == "." {
                break;
            }
            current = vpath::dirname(current);
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.nodes.read().contains_key(&vpath::normalize(path))
    }

    /// Contents of a file, if present
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        match self.nodes.read().get(&vpath::normalize(path)) {
            Some(Node::File(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Every mutating call so far, oldest first
    pub fn journal(&self) -> Vec<StorageEvent> {
        self.journal.read().clone()
    }

    fn record(&self, event: StorageEvent) {
        tracing::trace!(?event, "storage");
        self.journal.write().push(event);
    }

    fn stat_node(&self, path: &str) -> Result<FileStat> {
        match self.nodes.read().get(&vpath::normalize(path)) {
            Some(Node::Directory) => Ok(FileStat::directory()),
            Some(Node::File(data)) => Ok(FileStat::file(data.len() as u64)),
            None => Err(FsError::NotFound(path.to_string())),
        }
    }
}

/// `name`, or `stem (n).ext` for the first name free in `directory`
fn free_name(nodes: &BTreeMap<String, Node>, name: &str, directory: &str) -> String {
    if !nodes.contains_key(&vpath::join(directory, name)) {
        return name.to_string();
    }

    let stem = vpath::stem(name);
    let ext = vpath::extname(name);
    (2..)
        .map(|n| format!("{} ({}){}", stem, n, ext))
        .find(|candidate| !nodes.contains_key(&vpath::join(directory, candidate)))
        .unwrap_or_else(|| name.to_string())
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn stat(&self, path: &str) -> Result<FileStat> {
        self.stat_node(path)
    }

    async fn lstat(&self, path: &str) -> Result<FileStat> {
        self.stat_node(path)
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        match self.nodes.read().get(&vpath::normalize(path)) {
            Some(Node::File(data)) => Ok(data.clone()),
            Some(Node::Directory) => Err(FsError::InvalidPath(format!("{} is a directory", path))),
            None => Err(FsError::NotFound(path.to_string())),
        }
    }

    async fn create_path(&self, name: &str, directory: &str, data: Vec<u8>) -> Result<String> {
        let (name, path) = {
            let mut nodes = self.nodes.write();
            match nodes.get(&vpath::normalize(directory)) {
                Some(Node::Directory) => {}
                Some(Node::File(_)) => {
                    return Err(FsError::InvalidPath(format!("{} is not a directory", directory)))
                }
                None => return Err(FsError::NotFound(directory.to_string())),
            }

            // lookup and insert under the same lock
            let name = free_name(&nodes, name, directory);
            let path = vpath::join(directory, &name);
            nodes.insert(path.clone(), Node::File(data));
            (name, path)
        };
        tracing::debug!("Created {}", path);
        self.record(StorageEvent::Created { path });

        Ok(name)
    }

    fn update_folder(&self, directory: &str, added: Option<&str>) {
        self.record(StorageEvent::FolderUpdated {
            directory: directory.to_string(),
            added: added.map(str::to_string),
        });
    }

    fn copy_entries(&self, paths: &[String]) {
        self.record(StorageEvent::Clipboard {
            mode: ClipboardMode::Copy,
            paths: paths.to_vec(),
        });
    }

    fn move_entries(&self, paths: &[String]) {
        self.record(StorageEvent::Clipboard {
            mode: ClipboardMode::Cut,
            paths: paths.to_vec(),
        });
    }

    async fn delete_local_path(&self, path: &str) -> Result<()> {
        let path = vpath::normalize(path);
        {
            let mut nodes = self.nodes.write();
            if nodes.remove(&path).is_none() {
                return Err(FsError::NotFound(path));
            }
            nodes.retain(|key, _| !vpath::is_within(key, &path));
        }
        tracing::info!("Deleted: {}", path);
        self.record(StorageEvent::Deleted { path });
        Ok(())
    }

    async fn map_directory(&self, root: &str, handle: Option<DirectoryHandle>) -> Result<String> {
        let handle = handle
            .ok_or_else(|| FsError::HandleUnavailable("no directory was picked".to_string()))?;
        let kind = if root == "/" {
            MountKind::FileSystemAccess
        } else {
            MountKind::IndexedDb
        };
        let folder = if root == "/" {
            handle.name.clone()
        } else {
            vpath::basename(root).to_string()
        };
        let mount_path = vpath::join("/", &folder);

        if self.mounts.read().get(&mount_path).is_some() {
            return Err(FsError::AlreadyExists(mount_path));
        }

        self.insert_dir(&mount_path);
        self.mounts.write().insert(mount_path.clone(), kind);
        tracing::info!(kind = kind.name(), "Mapped {}", mount_path);
        self.record(StorageEvent::Mapped {
            root: root.to_string(),
            folder: folder.clone(),
        });

        Ok(folder)
    }

    async fn unmount(&self, path: &str, preserve_contents: bool) -> Result<()> {
        if self.mounts.write().remove(path).is_none() {
            return Err(FsError::NotMounted(path.to_string()));
        }
        if !preserve_contents {
            let mut nodes = self.nodes.write();
            nodes.remove(path);
            nodes.retain(|key, _| !vpath::is_within(key, path));
        }
        tracing::info!(preserve_contents, "Unmounted {}", path);
        self.record(StorageEvent::Unmounted {
            path: path.to_string(),
            preserve_contents,
        });
        Ok(())
    }

    fn mounts(&self) -> MountRegistry {
        self.mounts.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_path_picks_free_name() {
        let storage = MemoryStorage::new().with_file("/music/song.mp3", b"a".to_vec());

        let name = storage
            .create_path("song.mp3", "/music", b"b".to_vec())
            .await
            .unwrap();

        assert_eq!(name, "song (2).mp3");
        assert_eq!(storage.contents("/music/song (2).mp3"), Some(b"b".to_vec()));
        assert_eq!(storage.contents("/music/song.mp3"), Some(b"a".to_vec()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_get_distinct_names() {
        let storage = std::sync::Arc::new(MemoryStorage::new().with_dir("/music"));

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage
                        .create_path("song.mp3", "/music", vec![i as u8])
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut names = Vec::new();
        for writer in writers {
            names.push(writer.await.unwrap());
        }
        names.sort();
        names.dedup();

        assert_eq!(names.len(), 16);
        assert!(names.contains(&"song.mp3".to_string()));
        assert!(names.contains(&"song (16).mp3".to_string()));
    }

    #[tokio::test]
    async fn test_delete_removes_subtree() {
        let storage = MemoryStorage::new()
            .with_file("/docs/a/one.txt", b"1".to_vec())
            .with_file("/docs/b.txt", b"2".to_vec());

        storage.delete_local_path("/docs/a").await.unwrap();

        assert!(!storage.exists("/docs/a"));
        assert!(!storage.exists("/docs/a/one.txt"));
        assert!(storage.exists("/docs/b.txt"));
        assert!(storage.delete_local_path("/docs/a").await.is_err());
    }

    #[tokio::test]
    async fn test_stat_kinds() {
        let storage = MemoryStorage::new().with_file("/a/b.txt", b"abc".to_vec());

        assert_eq!(storage.stat("/a/b.txt").await.unwrap(), FileStat::file(3));
        assert!(storage.stat("/a").await.unwrap().is_directory());
        assert!(matches!(storage.stat("/zzz").await, Err(FsError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_map_and_unmount() {
        let storage = MemoryStorage::new();

        let folder = storage
            .map_directory("/", Some(DirectoryHandle::new("Projects")))
            .await
            .unwrap();
        assert_eq!(folder, "Projects");
        assert!(storage.mounts().is_remote_mount("/Projects"));

        storage.unmount("/Projects", false).await.unwrap();
        assert!(!storage.exists("/Projects"));
        assert!(storage.unmount("/Projects", false).await.is_err());
    }
}
