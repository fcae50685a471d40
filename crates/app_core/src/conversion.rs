//! Conversion gateway
//!
//! Strategies are registered per media family and instantiated the first
//! time a job needs them. A job reads every operand from storage, hands it
//! to the strategy and commits the result next to the source.

use crate::error::{AppError, Result};
use crate::image_convert::ImageTranscoder;
use crate::playlist::PlaylistTranscoder;
use crate::transfer::{ObjectReader, Operation, TransferDialog};
use app_fs::{vpath, Storage};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Family of formats handled by one strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionFamily {
    AudioVideo,
    Image,
    Spreadsheet,
    Playlist,
}

impl fmt::Display for ConversionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConversionFamily::AudioVideo => "audio/video",
            ConversionFamily::Image => "image",
            ConversionFamily::Spreadsheet => "spreadsheet",
            ConversionFamily::Playlist => "playlist",
        };
        f.write_str(name)
    }
}

/// Named file contents passed to and returned by a strategy
pub type NamedFile = (String, Vec<u8>);

/// One conversion strategy
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Convert every file to `extension` (no leading dot). Output names only
    /// matter for their base name.
    async fn convert(&self, files: Vec<NamedFile>, extension: &str) -> Result<Vec<NamedFile>>;
}

type StrategyFactory = Box<dyn Fn() -> Result<Arc<dyn Transcoder>> + Send + Sync>;

struct Strategy {
    factory: StrategyFactory,
    instance: OnceCell<Arc<dyn Transcoder>>,
}

/// Strategies keyed by family, loaded on first use
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: HashMap<ConversionFamily, Strategy>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the strategies this crate implements itself
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_factory(ConversionFamily::Image, || {
            Ok(Arc::new(ImageTranscoder::new()) as Arc<dyn Transcoder>)
        });
        registry.register_factory(ConversionFamily::Playlist, || {
            Ok(Arc::new(PlaylistTranscoder) as Arc<dyn Transcoder>)
        });
        registry
    }

    /// Register a lazily built strategy, replacing any previous one
    pub fn register_factory<F>(&mut self, family: ConversionFamily, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Transcoder>> + Send + Sync + 'static,
    {
        self.strategies.insert(
            family,
            Strategy {
                factory: Box::new(factory),
                instance: OnceCell::new(),
            },
        );
    }

    pub fn register(&mut self, family: ConversionFamily, transcoder: Arc<dyn Transcoder>) {
        self.register_factory(family, move || Ok(transcoder.clone()));
    }

    pub fn contains(&self, family: ConversionFamily) -> bool {
        self.strategies.contains_key(&family)
    }

    /// Strategy for `family`, building it on first call
    pub fn resolve(&self, family: ConversionFamily) -> Result<Arc<dyn Transcoder>> {
        let strategy = self.strategies.get(&family).ok_or_else(|| {
            AppError::ConversionSetup(format!("no {} converter registered", family))
        })?;

        strategy
            .instance
            .get_or_try_init(|| {
                tracing::debug!(%family, "Loading converter");
                (strategy.factory)()
            })
            .cloned()
    }
}

/// A "Convert to" activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub id: Uuid,
    /// File the menu was opened on; names the transfer dialog
    pub source_path: String,
    /// Target extension without the dot
    pub target_extension: String,
    pub operation: Operation,
}

impl ConversionJob {
    pub fn new(source_path: impl Into<String>, target_extension: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_path: source_path.into(),
            target_extension: target_extension.into(),
            operation: Operation::Converting,
        }
    }

    /// Directory every output is written to
    pub fn directory(&self) -> &str {
        vpath::dirname(&self.source_path)
    }
}

/// Runs conversion jobs through the transfer dialog
pub struct ConversionGateway {
    registry: StrategyRegistry,
    storage: Arc<dyn Storage>,
    transfer: Arc<dyn TransferDialog>,
}

impl ConversionGateway {
    pub fn new(
        registry: StrategyRegistry,
        storage: Arc<dyn Storage>,
        transfer: Arc<dyn TransferDialog>,
    ) -> Self {
        Self {
            registry,
            storage,
            transfer,
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Open the transfer dialog for `job` and queue one reader per operand.
    ///
    /// Never fails: a strategy that cannot be loaded closes the dialog and
    /// is logged, a failing operand is skipped.
    pub fn start(&self, job: &ConversionJob, operands: &[String], family: ConversionFamily) {
        self.transfer.open(&job.source_path, job.operation, None);

        let strategy = match self.registry.resolve(family) {
            Ok(strategy) => strategy,
            Err(e) => {
                self.transfer.close(&job.source_path);
                tracing::error!(job = %job.id, path = %job.source_path, "{}", e);
                return;
            }
        };

        let directory = job.directory().to_string();
        let readers = operands
            .iter()
            .map(|operand| self.reader(job, operand, &directory, strategy.clone()))
            .collect::<Vec<_>>();

        tracing::info!(
            job = %job.id,
            %family,
            target = %job.target_extension,
            operands = readers.len(),
            "Conversion queued"
        );
        self.transfer.open(&job.source_path, job.operation, Some(readers));
    }

    fn reader(
        &self,
        job: &ConversionJob,
        operand: &str,
        directory: &str,
        strategy: Arc<dyn Transcoder>,
    ) -> ObjectReader {
        let storage = self.storage.clone();
        let operand = operand.to_string();
        let target = directory.to_string();
        let extension = job.target_extension.clone();
        let name = vpath::basename(&operand).to_string();

        ObjectReader::new(name, directory, job.operation, move || {
            let storage = storage.clone();
            let strategy = strategy.clone();
            let operand = operand.clone();
            let target = target.clone();
            let extension = extension.clone();
            async move {
                let result =
                    convert_operand(storage.as_ref(), strategy.as_ref(), &operand, &target, &extension)
                        .await;
                if let Err(e) = result {
                    tracing::debug!(path = %operand, error = %e, "Conversion failed, skipping");
                }
            }
        })
    }
}

/// Convert one file and commit the first output into `directory`
pub async fn convert_operand(
    storage: &dyn Storage,
    strategy: &dyn Transcoder,
    path: &str,
    directory: &str,
    extension: &str,
) -> Result<String> {
    let data = storage.read_file(path).await?;
    let (name, bytes) = strategy
        .convert(vec![(path.to_string(), data)], extension)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Conversion {
            path: path.to_string(),
            message: "converter produced no output".to_string(),
        })?;

    let created = storage
        .create_path(vpath::basename(&name), directory, bytes)
        .await?;
    storage.update_folder(directory, Some(&created));
    tracing::debug!(from = path, to = %created, "Converted");
    Ok(created)
}

/// Output name `<stem>.<extension>` for a source path
pub fn output_name(path: &str, extension: &str) -> String {
    format!("{}.{}", vpath::stem(path), extension)
}
