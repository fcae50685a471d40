//! Menu builder
//!
//! Resolves the request into a `RuleContext` once, then runs the rule
//! pipeline through a `MenuAssembler`. Building is synchronous and never
//! fails; every side effect is deferred into the returned actions.

use crate::capability::{AiAvailability, CapabilityClassifier};
use crate::config::AppConfig;
use crate::conversion::ConversionGateway;
use crate::file_actions::FileActions;
use crate::formats::FormatTables;
use crate::menu::MenuEntry;
use crate::pipeline::MenuAssembler;
use crate::platform::{probe, PlatformCapabilities};
use crate::process::{ProcessDirectory, ProcessManager, FILE_EXPLORER};
use crate::rules::{RuleContext, PIPELINE};
use crate::selection::SelectionSet;
use crate::session::{AiAssistant, Session};
use app_fs::{FileStat, Storage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// External collaborators the menu actions call into
#[derive(Clone)]
pub struct Services {
    pub storage: Arc<dyn Storage>,
    pub processes: Arc<dyn ProcessManager>,
    pub session: Arc<dyn Session>,
    pub file_actions: Arc<dyn FileActions>,
    pub platform: Arc<dyn PlatformCapabilities>,
    pub assistant: Arc<dyn AiAssistant>,
    pub conversions: Arc<ConversionGateway>,
}

impl Services {
    /// Session flag or local summarizer
    pub fn ai_availability(&self) -> AiAvailability {
        AiAvailability {
            enabled: self.session.ai_enabled(),
            local_summarizer: probe("summarizer", self.platform.has_local_summarizer()),
        }
    }
}

/// The entry the menu is opened on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Absolute path of the entry; may be empty
    pub path: String,
    /// Target url, differs from `path` for shortcuts
    pub url: String,
    /// Process that opens the entry, empty when none
    pub pid: String,
}

impl FileReference {
    pub fn new(path: impl Into<String>, url: impl Into<String>, pid: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            url: url.into(),
            pid: pid.into(),
        }
    }

    /// Regular entry whose url is its path
    pub fn entry(path: impl Into<String>, pid: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            url: path.clone(),
            path,
            pid: pid.into(),
        }
    }

    pub fn opens_in_file_explorer(&self) -> bool {
        self.pid == FILE_EXPLORER
    }
}

/// Everything the menu depends on at open time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuRequest {
    pub file: FileReference,
    /// Base names focused in the containing view
    pub focused_entries: Vec<String>,
    /// Stat of `file.path` taken by the view, `None` if it failed
    pub stat: Option<FileStat>,
    /// Id of the file manager window hosting the entry
    pub file_manager_id: Option<String>,
    pub read_only: bool,
}

impl MenuRequest {
    pub fn new(file: FileReference) -> Self {
        Self {
            file,
            ..Self::default()
        }
    }

    pub fn focused<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focused_entries = entries.into_iter().map(Into::into).collect();
        self
    }

    pub fn stat(mut self, stat: FileStat) -> Self {
        self.stat = Some(stat);
        self
    }

    pub fn file_manager(mut self, id: impl Into<String>) -> Self {
        self.file_manager_id = Some(id.into());
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// Builds context menus for file entries
pub struct MenuBuilder {
    services: Arc<Services>,
    config: Arc<AppConfig>,
    tables: FormatTables,
    directory: ProcessDirectory,
}

impl MenuBuilder {
    pub fn new(services: Arc<Services>, config: Arc<AppConfig>) -> Self {
        Self {
            services,
            config,
            tables: FormatTables::default(),
            directory: ProcessDirectory::default(),
        }
    }

    pub fn with_tables(mut self, tables: FormatTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_directory(mut self, directory: ProcessDirectory) -> Self {
        self.directory = directory;
        self
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the menu for `request`
    pub fn build(&self, request: &MenuRequest) -> Vec<MenuEntry> {
        let context = self.context(request);
        let mut assembler = MenuAssembler::new();

        for rule in PIPELINE {
            let Some(contribution) = (rule.contribute)(&context) else {
                continue;
            };
            if contribution.is_empty() {
                continue;
            }
            tracing::trace!(rule = rule.name, entries = contribution.entries.len(), "Rule contributed");
            assembler.apply(contribution);
        }

        let menu = assembler.finish();
        tracing::debug!(
            path = %request.file.path,
            pid = %request.file.pid,
            entries = menu.len(),
            "Context menu built"
        );
        menu
    }

    fn context<'a>(&'a self, request: &'a MenuRequest) -> RuleContext<'a> {
        let file = &request.file;
        let mounts = self.services.storage.mounts();
        let flags = CapabilityClassifier::new(&self.tables).classify(
            &file.url,
            &file.path,
            &mounts,
            self.services.ai_availability(),
        );
        let selection = SelectionSet::new(request.focused_entries.iter().cloned());
        let single_selection = selection.is_single_selection(&file.path);
        let operands = Arc::new(selection.resolve(&file.path));
        let default_process = self.tables.default_process(&flags.url_extension);

        RuleContext {
            services: &self.services,
            config: &self.config,
            tables: &self.tables,
            directory: &self.directory,
            request,
            file,
            mounts,
            single_selection,
            operands,
            default_process,
            flags,
        }
    }
}
