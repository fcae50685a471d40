//! ContextShell File System Abstraction Layer
//!
//! The menu engine never touches storage directly. This crate defines the
//! surface it consumes:
//! - `vpath`: POSIX-style virtual path helpers (basename, dirname, extension)
//! - `Storage`: async read/write/copy/move/delete/mount operations
//! - `MountRegistry`: which paths are backed by an external mount
//! - `MemoryStorage`: in-memory implementation for tests and the demo binary

pub mod vpath;
mod storage;
mod mount;
mod memory;

pub use storage::{ClipboardMode, DirectoryHandle, EntryKind, FileStat, Storage};
pub use mount::{MountKind, MountRegistry};
pub use memory::{MemoryStorage, StorageEvent};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Path already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not a mount point: {0}")]
    NotMounted(String),

    #[error("Directory handle unavailable: {0}")]
    HandleUnavailable(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
