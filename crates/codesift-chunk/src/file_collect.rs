use codesift_core::{CodeSiftError, Language, ProcessorConfig, Result};
use ignore::{overrides::OverrideBuilder, WalkBuilder};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Directories that are never source, regardless of configuration.
const DEFAULT_EXCLUDES: [&str; 8] = [
    "**/target/**",
    "**/.git/**",
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/coverage/**",
    "**/__pycache__/**",
    "**/.venv/**",
];

/// Walk `root` and return every file whose extension maps to a supported
/// language, with its size. Results are sorted by path so repeated runs
/// visit files in the same order.
pub fn collect_files(root: &Path, config: &ProcessorConfig) -> Result<Vec<(PathBuf, u64)>> {
    info!("Collecting source files from {:?}", root);

    let mut ovr = OverrideBuilder::new(root);
    for pattern in DEFAULT_EXCLUDES {
        ovr.add(&format!("!{}", pattern))
            .map_err(|e| CodeSiftError::InvalidOperation(e.to_string()))?;
    }
    for pattern in &config.exclude_patterns {
        let negated = if let Some(stripped) = pattern.strip_prefix('!') {
            stripped.to_string()
        } else {
            format!("!{}", pattern)
        };
        ovr.add(&negated)
            .map_err(|e| CodeSiftError::InvalidOperation(e.to_string()))?;
        debug!("Added exclude pattern: {}", negated);
    }
    let overrides = ovr
        .build()
        .map_err(|e| CodeSiftError::InvalidOperation(e.to_string()))?;

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .ignore(true)
        .overrides(overrides)
        .build();

    let extensions = supported_extensions(&config.supported_languages);
    debug!("Supported extensions: {:?}", extensions);

    let mut paths = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Walker error: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !extensions.contains(ext) {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        paths.push((path.to_path_buf(), size));
    }

    paths.sort();
    info!("File collection complete: {} files", paths.len());
    Ok(paths)
}

fn supported_extensions(languages: &[Language]) -> HashSet<&'static str> {
    languages
        .iter()
        .flat_map(|language| language.file_extensions())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn collects_only_supported_extensions() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "main.rs", "fn main() {}");
        touch(dir.path(), "util.py", "x = 1");
        touch(dir.path(), "notes.txt", "not code");
        touch(dir.path(), "data.json", "{}");

        let files = collect_files(dir.path(), &ProcessorConfig::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["main.rs", "util.py"]);
    }

    #[test]
    fn default_excludes_skip_dependency_dirs() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/lib.rs", "");
        touch(dir.path(), "target/debug/gen.rs", "");
        touch(dir.path(), "node_modules/pkg/index.js", "");
        touch(dir.path(), "__pycache__/mod.py", "");

        let files = collect_files(dir.path(), &ProcessorConfig::default()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].0.ends_with("src/lib.rs"));
    }

    #[test]
    fn configured_excludes_apply() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/lib.rs", "");
        touch(dir.path(), "generated/schema.rs", "");

        let config = ProcessorConfig {
            exclude_patterns: vec!["**/generated/**".to_string()],
            ..Default::default()
        };
        let files = collect_files(dir.path(), &config).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].0.ends_with("src/lib.rs"));
    }

    #[test]
    fn results_are_sorted() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.py", "");
        touch(dir.path(), "a.py", "");
        touch(dir.path(), "c.py", "");

        let files = collect_files(dir.path(), &ProcessorConfig::default()).unwrap();
        let mut sorted = files.clone();
        sorted.sort();
        assert_eq!(files, sorted);
    }
}
