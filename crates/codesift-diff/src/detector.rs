use crate::impact::impact_score;
use crate::summary::{change_summary, ChangeSummary};
use codesift_core::{
    ChangeType, DiffConfig, ElementExtractor, FileStatus, Language, Result, RevisionSource,
    SemanticChange, SemanticElement,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache tag for content read from the working tree rather than a commit.
const WORKTREE_TAG: &str = "@worktree";

/// Transient pairing of one element across two revisions of a file.
/// Created and discarded within a single detection run.
#[derive(Debug, Clone)]
pub struct ElementComparison {
    pub old: Option<SemanticElement>,
    pub new: Option<SemanticElement>,
    pub change_type: ChangeType,
    pub similarity: f64,
    pub dependencies: HashSet<String>,
}

/// Detects semantic changes between two revisions by matching extracted
/// elements on their signatures.
///
/// Each instance owns a parse cache keyed by `(path, revision)`; the cache
/// is never shared across instances and can be cleared explicitly.
pub struct SemanticDiffDetector {
    vcs: Arc<dyn RevisionSource>,
    extractor: Arc<dyn ElementExtractor>,
    config: DiffConfig,
    cache: Mutex<HashMap<(String, String), Arc<Vec<SemanticElement>>>>,
}

impl SemanticDiffDetector {
    pub fn new(vcs: Arc<dyn RevisionSource>, extractor: Arc<dyn ElementExtractor>) -> Self {
        Self::with_config(vcs, extractor, DiffConfig::default())
    }

    pub fn with_config(
        vcs: Arc<dyn RevisionSource>,
        extractor: Arc<dyn ElementExtractor>,
        config: DiffConfig,
    ) -> Self {
        Self {
            vcs,
            extractor,
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Drop every cached parse. Returns the number of entries released,
    /// so the call can double as a memory-tracker reclaim hook.
    pub fn clear_cache(&self) -> usize {
        let mut cache = self.cache.lock();
        let released = cache.len();
        cache.clear();
        released
    }

    pub fn cached_parses(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn change_summary(&self, changes: &[SemanticChange]) -> ChangeSummary {
        change_summary(changes)
    }

    /// Compare two revisions and return one record per added, removed, or
    /// modified element. Unchanged elements are computed but not returned.
    ///
    /// A VCS failure aborts the run; a parse failure on one side of one
    /// file degrades that side to an empty element list.
    pub async fn detect_changes(
        &self,
        base: &str,
        target: &str,
        include_untracked: bool,
    ) -> Result<Vec<SemanticChange>> {
        let mut files = self.vcs.changed_files(base, target, include_untracked)?;
        files.sort();
        let statuses = self.vcs.file_status_map(base, target)?;

        info!(
            "Detecting changes across {} files ({} -> {})",
            files.len(),
            base,
            target
        );

        let mut changes = Vec::new();
        for path in &files {
            let Some(language) = Language::detect(path) else {
                debug!("Skipping {}: no language mapping", path);
                continue;
            };
            if !self.config.supports(&language) {
                debug!("Skipping {}: {} not in supported set", path, language);
                continue;
            }

            let status = statuses
                .get(path)
                .copied()
                .unwrap_or(FileStatus::Unknown);

            // Status-aware retrieval: one-sided changes fetch one side only.
            let old_content = match status {
                FileStatus::Added => None,
                _ => self.vcs.file_at_revision(path, base)?,
            };
            let new_side = match status {
                FileStatus::Deleted => None,
                _ => match self.vcs.file_at_revision(path, target)? {
                    Some(content) => Some((content, target.to_string())),
                    None => self
                        .vcs
                        .current_file_content(path)?
                        .map(|content| (content, WORKTREE_TAG.to_string())),
                },
            };

            match (old_content, new_side) {
                (None, None) => continue,
                (None, Some((content, tag))) => {
                    self.whole_file_changes(
                        path,
                        &language,
                        &tag,
                        &content,
                        ChangeType::Added,
                        self.config.added_file_impact,
                        &mut changes,
                    )
                    .await?;
                }
                (Some(content), None) => {
                    self.whole_file_changes(
                        path,
                        &language,
                        base,
                        &content,
                        ChangeType::Removed,
                        self.config.removed_file_impact,
                        &mut changes,
                    )
                    .await?;
                }
                (Some(old), Some((new, new_tag))) => {
                    self.compare_revisions(path, &language, base, &old, &new_tag, &new, &mut changes)
                        .await?;
                }
            }
        }

        changes.sort_by(|a, b| {
            (&a.file_path, &a.element_name, a.change_type.to_string()).cmp(&(
                &b.file_path,
                &b.element_name,
                b.change_type.to_string(),
            ))
        });
        info!("Detected {} semantic changes", changes.len());
        Ok(changes)
    }

    /// Every element of a one-sided file becomes a change with a fixed
    /// score, bypassing signature matching.
    #[allow(clippy::too_many_arguments)]
    async fn whole_file_changes(
        &self,
        path: &str,
        language: &Language,
        revision_tag: &str,
        content: &str,
        change_type: ChangeType,
        fixed_impact: f64,
        changes: &mut Vec<SemanticChange>,
    ) -> Result<()> {
        let elements = self.parse_side(path, revision_tag, content, language).await;

        // Added files still exist on disk, so the facade's file-level
        // analysis can supply their import list. Repository-relative paths
        // resolve against the source's checkout root, not the process cwd.
        let dependencies = if change_type == ChangeType::Added {
            let on_disk = match self.vcs.workdir() {
                Some(root) => root.join(path).to_string_lossy().into_owned(),
                None => path.to_string(),
            };
            match self.extractor.analyze_file(&on_disk, language).await {
                Ok(analysis) => analysis.dependencies,
                Err(e) => {
                    debug!("No file analysis for {}: {}", on_disk, e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        for element in elements.iter() {
            changes.push(
                SemanticChange::new(
                    path,
                    change_type,
                    &element.name,
                    element.element_type.clone(),
                    fixed_impact,
                )?
                .with_dependencies(dependencies.clone()),
            );
        }
        Ok(())
    }

    async fn compare_revisions(
        &self,
        path: &str,
        language: &Language,
        base_tag: &str,
        old_content: &str,
        new_tag: &str,
        new_content: &str,
        changes: &mut Vec<SemanticChange>,
    ) -> Result<()> {
        let old_elements = self.parse_side(path, base_tag, old_content, language).await;
        let new_elements = self.parse_side(path, new_tag, new_content, language).await;

        let old_map = signature_map(&old_elements);
        let new_map = signature_map(&new_elements);

        let mut comparisons = Vec::new();
        for (signature, old_el) in &old_map {
            match new_map.get(signature) {
                Some(new_el) => {
                    let similarity = line_set_similarity(&old_el.content, &new_el.content);
                    let change_type = if similarity < self.config.modified_threshold {
                        ChangeType::Modified
                    } else {
                        ChangeType::Unchanged
                    };
                    comparisons.push(ElementComparison {
                        old: Some((*old_el).clone()),
                        new: Some((*new_el).clone()),
                        change_type,
                        similarity,
                        dependencies: HashSet::new(),
                    });
                }
                None => comparisons.push(ElementComparison {
                    old: Some((*old_el).clone()),
                    new: None,
                    change_type: ChangeType::Removed,
                    similarity: 0.0,
                    dependencies: HashSet::new(),
                }),
            }
        }
        for (signature, new_el) in &new_map {
            if !old_map.contains_key(signature) {
                comparisons.push(ElementComparison {
                    old: None,
                    new: Some((*new_el).clone()),
                    change_type: ChangeType::Added,
                    similarity: 0.0,
                    dependencies: HashSet::new(),
                });
            }
        }

        for comparison in comparisons {
            if comparison.change_type == ChangeType::Unchanged {
                continue;
            }
            // Modified and added changes score against the new element,
            // removals against the old one.
            let Some(element) = comparison.new.as_ref().or(comparison.old.as_ref()) else {
                continue;
            };
            let score = impact_score(
                &self.config.impact,
                element,
                comparison.change_type,
                comparison.similarity,
            );
            changes.push(
                SemanticChange::new(
                    path,
                    comparison.change_type,
                    &element.name,
                    element.element_type.clone(),
                    score,
                )?
                .with_dependencies(comparison.dependencies.into_iter().collect()),
            );
        }
        Ok(())
    }

    /// Parse one side of one file, caching by `(path, revision)` so
    /// identical content is never parsed twice within a run. A parse
    /// failure degrades to an empty element list for that side only.
    async fn parse_side(
        &self,
        path: &str,
        revision_tag: &str,
        content: &str,
        language: &Language,
    ) -> Arc<Vec<SemanticElement>> {
        let key = (path.to_string(), revision_tag.to_string());
        if let Some(cached) = self.cache.lock().get(&key) {
            return Arc::clone(cached);
        }

        let elements = match self.extractor.parse_content(content, language).await {
            Ok(elements) => elements,
            Err(e) => {
                warn!("Parse failed for {} at {}: {}", path, revision_tag, e);
                Vec::new()
            }
        };
        let elements = Arc::new(elements);
        self.cache.lock().insert(key, Arc::clone(&elements));
        elements
    }
}

/// Signature map for one side of a file. Insertion order follows element
/// order, so a duplicate signature keeps the last-seen element.
fn signature_map(elements: &[SemanticElement]) -> HashMap<String, &SemanticElement> {
    let mut map = HashMap::new();
    for element in elements {
        map.insert(element.signature(), element);
    }
    map
}

/// Jaccard ratio of the two contents' distinct line sets; 1.0 when both
/// are empty.
fn line_set_similarity(old: &str, new: &str) -> f64 {
    let old_lines: HashSet<&str> = old.lines().collect();
    let new_lines: HashSet<&str> = new.lines().collect();
    if old_lines.is_empty() && new_lines.is_empty() {
        return 1.0;
    }
    let intersection = old_lines.intersection(&new_lines).count();
    let union = old_lines.union(&new_lines).count();
    intersection as f64 / union as f64
}
