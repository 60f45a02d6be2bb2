use crate::{FileAnalysis, FileStatus, Language, Result, SemanticElement};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

/// AST extraction facade: turns raw content into named semantic elements.
/// One implementation is registered per language behind a registry; the
/// rest of the system never branches on language beyond detection.
#[async_trait]
pub trait ElementExtractor: Send + Sync {
    async fn parse_content(
        &self,
        content: &str,
        language: &Language,
    ) -> Result<Vec<SemanticElement>>;

    async fn analyze_file(&self, file_path: &str, language: &Language) -> Result<FileAnalysis>;
}

/// Version-control capability consumed by the diff detector. A failure
/// here is not recovered locally; it aborts the whole detection run.
pub trait RevisionSource: Send + Sync {
    fn changed_files(
        &self,
        base: &str,
        target: &str,
        include_untracked: bool,
    ) -> Result<Vec<String>>;

    fn file_status_map(&self, base: &str, target: &str) -> Result<HashMap<String, FileStatus>>;

    /// Content of `path` at `revision`, or `None` when the file does not
    /// exist there.
    fn file_at_revision(&self, path: &str, revision: &str) -> Result<Option<String>>;

    /// Content of `path` in the working tree, or `None` when absent.
    fn current_file_content(&self, path: &str) -> Result<Option<String>>;

    /// Filesystem root that repository-relative paths resolve against,
    /// when the source is backed by an on-disk checkout.
    fn workdir(&self) -> Option<PathBuf> {
        None
    }
}

/// Optional embedding-backed text segmentation used by semantic chunking.
#[async_trait]
pub trait TextSegmenter: Send + Sync {
    async fn split_text(&self, text: &str) -> Result<Vec<String>>;
}
