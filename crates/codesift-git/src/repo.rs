use crate::errors::*;
use codesift_core::FileStatus;
use git2::{Delta, DiffOptions, Repository, RepositoryOpenFlags, StatusOptions, Tree};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Thread-shareable handle on one repository.
///
/// libgit2 repository handles are not safe for concurrent use, so the
/// handle sits behind a mutex and every operation holds the lock for its
/// full duration.
pub struct GitRepository {
    path: PathBuf,
    repo: Mutex<Repository>,
}

impl GitRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let repo = Repository::open_ext(
            path_ref,
            RepositoryOpenFlags::empty(),
            &[] as &[&std::ffi::OsStr],
        )
        .map_err(|_| GitIntegrationError::RepoNotFound(path_ref.display().to_string()))?;
        Ok(Self {
            path: path_ref.to_path_buf(),
            repo: Mutex::new(repo),
        })
    }

    pub fn workdir(&self) -> Option<PathBuf> {
        self.repo.lock().workdir().map(Path::to_path_buf)
    }

    /// Paths touched between two revisions, in diff order, optionally
    /// extended with untracked working-tree files.
    pub fn changed_files(
        &self,
        base: &str,
        target: &str,
        include_untracked: bool,
    ) -> Result<Vec<String>> {
        let repo = self.repo.lock();
        let base_tree = revision_tree(&repo, base)?;
        let target_tree = revision_tree(&repo, target)?;
        let mut opts = DiffOptions::new();
        let diff = repo.diff_tree_to_tree(Some(&base_tree), Some(&target_tree), Some(&mut opts))?;

        let mut files = Vec::new();
        for delta in diff.deltas() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .ok_or(GitIntegrationError::InvalidUtf8)?;
            let path = path.to_str().ok_or(GitIntegrationError::InvalidUtf8)?;
            if !files.iter().any(|f| f == path) {
                files.push(path.to_string());
            }
        }

        if include_untracked {
            if repo.is_bare() {
                return Err(GitIntegrationError::BareRepository);
            }
            let mut status_opts = StatusOptions::new();
            status_opts
                .include_untracked(true)
                .recurse_untracked_dirs(true)
                .include_ignored(false);
            let statuses = repo.statuses(Some(&mut status_opts))?;
            for entry in statuses.iter() {
                if entry.status().is_wt_new() {
                    if let Some(path) = entry.path() {
                        if !files.iter().any(|f| f == path) {
                            files.push(path.to_string());
                        }
                    }
                }
            }
        }

        debug!(
            "{} changed files between {} and {}",
            files.len(),
            base,
            target
        );
        Ok(files)
    }

    /// Per-file status between two revisions. Untracked files surface as
    /// `Added` when present in the working tree statuses.
    pub fn file_status_map(&self, base: &str, target: &str) -> Result<HashMap<String, FileStatus>> {
        let repo = self.repo.lock();
        let base_tree = revision_tree(&repo, base)?;
        let target_tree = revision_tree(&repo, target)?;
        let mut opts = DiffOptions::new();
        let diff = repo.diff_tree_to_tree(Some(&base_tree), Some(&target_tree), Some(&mut opts))?;

        let mut map = HashMap::new();
        for delta in diff.deltas() {
            let Some(path) = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .and_then(|p| p.to_str())
            else {
                continue;
            };
            let status = match delta.status() {
                Delta::Added => FileStatus::Added,
                Delta::Deleted => FileStatus::Deleted,
                Delta::Modified | Delta::Renamed | Delta::Copied => FileStatus::Modified,
                _ => FileStatus::Unknown,
            };
            map.insert(path.to_string(), status);
        }
        Ok(map)
    }

    /// Blob content of `path` at `revision`; `None` when the file does not
    /// exist in that tree or is not valid text.
    pub fn file_at_revision(&self, path: &str, revision: &str) -> Result<Option<String>> {
        let repo = self.repo.lock();
        let tree = revision_tree(&repo, revision)?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let object = entry.to_object(&repo)?;
        let Some(blob) = object.as_blob() else {
            return Ok(None);
        };
        Ok(Some(String::from_utf8_lossy(blob.content()).into_owned()))
    }

    /// Working-tree content of `path`; `None` when the file is absent.
    pub fn current_file_content(&self, path: &str) -> Result<Option<String>> {
        let workdir = self.workdir().ok_or(GitIntegrationError::BareRepository)?;
        let full_path = workdir.join(path);
        match std::fs::read(&full_path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn revision_tree<'r>(repo: &'r Repository, revision: &str) -> Result<Tree<'r>> {
    let object = repo
        .revparse_single(revision)
        .map_err(|_| GitIntegrationError::RevisionNotFound(revision.to_string()))?;
    let commit = object.peel_to_commit()?;
    Ok(commit.tree()?)
}
