//! Actions owned by the containing file view

use async_trait::async_trait;

/// Operations the hosting folder view performs on behalf of the menu
#[async_trait]
pub trait FileActions: Send + Sync {
    async fn archive_files(&self, paths: Vec<String>);

    async fn download_files(&self, paths: Vec<String>);

    async fn extract_files(&self, url: &str);

    /// Create a `.url` shortcut to `path` opened by `process`
    async fn new_shortcut(&self, path: &str, process: &str);

    /// Put the entry named `name` into rename mode
    fn begin_rename(&self, name: &str);
}
