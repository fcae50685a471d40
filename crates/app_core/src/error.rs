//! Application error types
//!
//! None of these escape menu construction. Probe and share failures only
//! suppress an entry, conversion failures only end one operand or one job.

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] app_fs::FsError),

    #[error("Capability probe failed: {0}")]
    Probe(String),

    #[error("Conversion of {path} failed: {message}")]
    Conversion { path: String, message: String },

    #[error("Conversion setup failed: {0}")]
    ConversionSetup(String),

    #[error("Share failed: {0}")]
    Share(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image codec error: {0}")]
    ImageCodec(String),

    #[error("Playlist error: {0}")]
    Playlist(String),

    // ===== Fatal Errors (startup only) =====
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AppError::Config(_) | AppError::Init(_))
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Failure that should only hide a menu entry
    pub fn suppresses_entry(&self) -> bool {
        matches!(self, AppError::Probe(_) | AppError::Share(_))
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Storage(app_fs::FsError::NotFound(path)) => format!("File not found: {}", path),
            AppError::Conversion { path, .. } => format!("Could not convert {}", path),
            AppError::ConversionSetup(_) => "The converter could not be loaded".to_string(),
            AppError::UnsupportedFormat(ext) => format!("Unsupported format: {}", ext),
            _ => self.to_string(),
        }
    }
}

impl From<image::ImageError> for AppError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Unsupported(inner) => AppError::UnsupportedFormat(inner.to_string()),
            other => AppError::ImageCodec(other.to_string()),
        }
    }
}
