//! Git revision access for CodeSift using libgit2: changed-file listing,
//! per-file status, and content retrieval at arbitrary revisions.

pub mod errors;
pub mod repo;

pub use errors::{GitIntegrationError, Result};
pub use repo::GitRepository;

use codesift_core::{CodeSiftError, FileStatus, RevisionSource};
use std::collections::HashMap;
use std::path::PathBuf;

fn to_core(e: GitIntegrationError) -> CodeSiftError {
    CodeSiftError::Vcs(e.to_string())
}

impl RevisionSource for GitRepository {
    fn changed_files(
        &self,
        base: &str,
        target: &str,
        include_untracked: bool,
    ) -> codesift_core::Result<Vec<String>> {
        GitRepository::changed_files(self, base, target, include_untracked).map_err(to_core)
    }

    fn file_status_map(
        &self,
        base: &str,
        target: &str,
    ) -> codesift_core::Result<HashMap<String, FileStatus>> {
        GitRepository::file_status_map(self, base, target).map_err(to_core)
    }

    fn file_at_revision(&self, path: &str, revision: &str) -> codesift_core::Result<Option<String>> {
        GitRepository::file_at_revision(self, path, revision).map_err(to_core)
    }

    fn current_file_content(&self, path: &str) -> codesift_core::Result<Option<String>> {
        GitRepository::current_file_content(self, path).map_err(to_core)
    }

    fn workdir(&self) -> Option<PathBuf> {
        GitRepository::workdir(self)
    }
}
