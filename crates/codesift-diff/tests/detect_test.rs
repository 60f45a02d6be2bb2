//! End-to-end detection over a real git repository using the tree-sitter
//! extractor, covering the modified / added / deleted paths together.

use codesift_diff::SemanticDiffDetector;
use codesift_core::ChangeType;
use codesift_git::GitRepository;
use codesift_parser::TreeSitterExtractor;
use git2::{IndexAddOption, Oid, Repository, Signature};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn commit_all(repo: &Repository, message: &str) -> Oid {
    let mut index = repo.index().unwrap();
    index
        .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
        .unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("Test", "test@example.com").unwrap();
    let parent = repo
        .head()
        .ok()
        .and_then(|h| h.target())
        .and_then(|oid| repo.find_commit(oid).ok());
    let parents: Vec<_> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

#[tokio::test]
async fn detects_changes_across_two_commits() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    // Base: one function that survives unchanged, one whose body changes,
    // and one file that will be deleted.
    fs::write(
        dir.path().join("calc.py"),
        "def stable():\n    return 1\n\ndef evolving(x):\n    return x\n",
    )
    .unwrap();
    fs::write(dir.path().join("legacy.py"), "def retired():\n    pass\n").unwrap();
    let base = commit_all(&repo, "initial");

    // Target: evolving() gets a new body (same signature), legacy.py is
    // deleted, and fresh.py arrives.
    fs::write(
        dir.path().join("calc.py"),
        "def stable():\n    return 1\n\ndef evolving(x):\n    y = x * 2\n    return y + 1\n",
    )
    .unwrap();
    fs::remove_file(dir.path().join("legacy.py")).unwrap();
    fs::write(
        dir.path().join("fresh.py"),
        "import os\n\ndef arrived():\n    return os.getcwd()\n",
    )
    .unwrap();
    let target = commit_all(&repo, "second");

    let vcs = Arc::new(GitRepository::open(dir.path()).unwrap());
    let extractor = Arc::new(TreeSitterExtractor::new());
    let detector = SemanticDiffDetector::new(vcs, extractor);

    let changes = detector
        .detect_changes(&base.to_string(), &target.to_string(), false)
        .await
        .unwrap();

    // stable() is unchanged and must not appear.
    assert!(!changes.iter().any(|c| c.element_name == "stable"));

    let evolving = changes
        .iter()
        .find(|c| c.element_name == "evolving")
        .expect("body change detected");
    assert_eq!(evolving.change_type, ChangeType::Modified);
    assert!(evolving.impact_score > 2.0 && evolving.impact_score <= 4.0);

    let retired = changes
        .iter()
        .find(|c| c.element_name == "retired")
        .expect("deleted file element detected");
    assert_eq!(retired.change_type, ChangeType::Removed);
    assert!((retired.impact_score - 5.0).abs() < f64::EPSILON);

    let arrived = changes
        .iter()
        .find(|c| c.element_name == "arrived")
        .expect("added file element detected");
    assert_eq!(arrived.change_type, ChangeType::Added);
    assert!((arrived.impact_score - 2.0).abs() < f64::EPSILON);
    // The import list resolves through the checkout root, so it populates
    // regardless of the process working directory.
    assert_eq!(arrived.dependencies, vec!["import os"]);

    let summary = detector.change_summary(&changes);
    assert_eq!(summary.total_changes, changes.len());
    assert!(summary.max_impact >= 5.0);
}
