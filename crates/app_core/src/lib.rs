//! ContextShell Core Decision Logic
//!
//! This crate contains:
//! - Format tables and capability classification
//! - Selection resolution
//! - Menu model, rule pipeline and assembler
//! - Conversion gateway and transfer jobs
//! - Collaborator contracts (processes, session, assistant, platform)
//! - Configuration
//! - Error types

pub mod builder;
pub mod capability;
pub mod config;
pub mod conversion;
pub mod error;
pub mod file_actions;
pub mod formats;
pub mod image_convert;
pub mod menu;
pub mod pipeline;
pub mod platform;
pub mod playlist;
pub mod process;
pub mod recording;
pub mod rules;
pub mod selection;
pub mod session;
pub mod transfer;

pub use builder::{FileReference, MenuBuilder, MenuRequest, Services};
pub use capability::{AiAvailability, BackgroundKind, CapabilityClassifier, CapabilityFlags};
pub use config::{AiConfig, AppConfig, DesktopConfig, GeneralConfig, MenuConfig};
pub use conversion::{
    ConversionFamily, ConversionGateway, ConversionJob, NamedFile, StrategyRegistry, Transcoder,
};
pub use error::AppError;
pub use file_actions::FileActions;
pub use formats::{FormatTables, MediaKind};
pub use menu::{find_path, labels, render, snapshot, Action, MenuEntry, MenuSnapshot};
pub use pipeline::{Contribution, Insertion, MenuAssembler};
pub use platform::{PlatformCapabilities, ProbeOutcome, ShareData, StaticCapabilities};
pub use process::{ProcessArgs, ProcessDirectory, ProcessManager, ProcessState};
pub use recording::{RecordingShell, ShellCall};
pub use selection::SelectionSet;
pub use session::{AiAssistant, Session, WallpaperFit};
pub use transfer::{
    ObjectReader, Operation, SequentialTransfer, TransferDialog, TransferHandle, TransferProgress,
    TransferState,
};

use app_fs::Storage;
use std::sync::Arc;

/// Wire a menu builder over `storage` with a single shell standing in for
/// every window-side collaborator
pub fn assemble(
    config: AppConfig,
    storage: Arc<dyn Storage>,
    shell: Arc<RecordingShell>,
    platform: Arc<dyn PlatformCapabilities>,
    transfer: Arc<SequentialTransfer>,
) -> MenuBuilder {
    let conversions = ConversionGateway::new(
        StrategyRegistry::with_builtin(),
        storage.clone(),
        transfer,
    );
    let services = Services {
        storage,
        processes: shell.clone(),
        session: shell.clone(),
        file_actions: shell.clone(),
        platform,
        assistant: shell,
        conversions: Arc::new(conversions),
    };
    MenuBuilder::new(Arc::new(services), Arc::new(config))
}
