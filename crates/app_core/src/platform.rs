//! Platform capability probes
//!
//! Every probe may fail. The menu treats a failed probe exactly like an
//! absent capability, see [`probe`].

use crate::error::{AppError, Result};
use app_fs::DirectoryHandle;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Payload handed to the native share sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// Host platform features the menu depends on
#[async_trait]
pub trait PlatformCapabilities: Send + Sync {
    /// Native share accepts `data`
    fn can_share(&self, data: &ShareData) -> Result<bool>;

    async fn share(&self, data: ShareData) -> Result<()>;

    /// External directory handles can be mounted at all
    fn has_file_system_handle(&self) -> Result<bool>;

    fn has_directory_picker(&self) -> Result<bool>;

    /// Ask the user for a directory
    async fn pick_directory(&self) -> Result<DirectoryHandle>;

    fn has_origin_private_storage(&self) -> Result<bool>;

    async fn origin_private_directory(&self) -> Result<DirectoryHandle>;

    /// Browser with partial origin-private storage support
    fn is_restrictive_browser(&self) -> Result<bool>;

    fn has_local_summarizer(&self) -> Result<bool>;
}

/// Collapse a probe result to presence, logging failures
pub fn probe(name: &str, result: Result<bool>) -> bool {
    match result {
        Ok(present) => present,
        Err(e) => {
            tracing::debug!(probe = name, error = %e, "Capability probe failed, treating as absent");
            false
        }
    }
}

/// Scripted outcome of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Present,
    Absent,
    Fails,
}

impl ProbeOutcome {
    fn result(self, name: &str) -> Result<bool> {
        match self {
            ProbeOutcome::Present => Ok(true),
            ProbeOutcome::Absent => Ok(false),
            ProbeOutcome::Fails => Err(AppError::Probe(format!("{} threw", name))),
        }
    }
}

impl From<bool> for ProbeOutcome {
    fn from(present: bool) -> Self {
        if present {
            ProbeOutcome::Present
        } else {
            ProbeOutcome::Absent
        }
    }
}

/// Fixed capability set, used headless and as a test double
#[derive(Debug)]
pub struct StaticCapabilities {
    pub share: ProbeOutcome,
    pub file_system_handle: ProbeOutcome,
    pub directory_picker: ProbeOutcome,
    pub origin_private_storage: ProbeOutcome,
    pub restrictive_browser: ProbeOutcome,
    pub local_summarizer: ProbeOutcome,
    /// Name of the directory `pick_directory` returns, `None` = user cancelled
    pub picked_directory: Option<String>,
    /// Fail `share` after `can_share` accepted
    pub share_fails: bool,
    shared: Mutex<Vec<ShareData>>,
}

impl StaticCapabilities {
    /// Nothing available
    pub fn none() -> Self {
        Self {
            share: ProbeOutcome::Absent,
            file_system_handle: ProbeOutcome::Absent,
            directory_picker: ProbeOutcome::Absent,
            origin_private_storage: ProbeOutcome::Absent,
            restrictive_browser: ProbeOutcome::Absent,
            local_summarizer: ProbeOutcome::Absent,
            picked_directory: None,
            share_fails: false,
            shared: Mutex::new(Vec::new()),
        }
    }

    /// Everything available on a permissive browser
    pub fn all() -> Self {
        Self {
            share: ProbeOutcome::Present,
            file_system_handle: ProbeOutcome::Present,
            directory_picker: ProbeOutcome::Present,
            origin_private_storage: ProbeOutcome::Present,
            local_summarizer: ProbeOutcome::Present,
            picked_directory: Some("Picked".to_string()),
            ..Self::none()
        }
    }

    pub fn with_share(mut self, outcome: ProbeOutcome) -> Self {
        self.share = outcome;
        self
    }

    pub fn with_directory_picker(mut self, outcome: ProbeOutcome) -> Self {
        self.directory_picker = outcome;
        self
    }

    pub fn with_restrictive_browser(mut self, outcome: ProbeOutcome) -> Self {
        self.restrictive_browser = outcome;
        self
    }

    pub fn with_local_summarizer(mut self, outcome: ProbeOutcome) -> Self {
        self.local_summarizer = outcome;
        self
    }

    /// Payloads passed to `share` so far
    pub fn shared(&self) -> Vec<ShareData> {
        self.shared.lock().clone()
    }
}

impl Default for StaticCapabilities {
    fn default() -> Self {
        Self::none()
    }
}

#[async_trait]
impl PlatformCapabilities for StaticCapabilities {
    fn can_share(&self, _data: &ShareData) -> Result<bool> {
        self.share.result("canShare")
    }

    async fn share(&self, data: ShareData) -> Result<()> {
        if self.share_fails {
            return Err(AppError::Share("share sheet dismissed".to_string()));
        }
        self.shared.lock().push(data);
        Ok(())
    }

    fn has_file_system_handle(&self) -> Result<bool> {
        self.file_system_handle.result("FileSystemHandle")
    }

    fn has_directory_picker(&self) -> Result<bool> {
        self.directory_picker.result("showDirectoryPicker")
    }

    async fn pick_directory(&self) -> Result<DirectoryHandle> {
        self.picked_directory
            .as_ref()
            .map(DirectoryHandle::new)
            .ok_or_else(|| AppError::Probe("directory picker cancelled".to_string()))
    }

    fn has_origin_private_storage(&self) -> Result<bool> {
        self.origin_private_storage.result("storage.getDirectory")
    }

    async fn origin_private_directory(&self) -> Result<DirectoryHandle> {
        if probe("storage.getDirectory", self.has_origin_private_storage()) {
            Ok(DirectoryHandle::new("OPFS"))
        } else {
            Err(AppError::Probe("origin-private storage unavailable".to_string()))
        }
    }

    fn is_restrictive_browser(&self) -> Result<bool> {
        self.restrictive_browser.result("restrictive browser check")
    }

    fn has_local_summarizer(&self) -> Result<bool> {
        self.local_summarizer.result("ai.summarizer")
    }
}
