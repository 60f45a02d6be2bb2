use crate::MemoryTracker;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Running counters for one processing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub lines_processed: usize,
    pub chunks_created: usize,
    pub elapsed_ms: u64,
    pub peak_memory_mb: f64,
    pub errors: Vec<String>,
}

/// Per-run mutable aggregate shared by every task in a batch. Owned by
/// exactly one processing run and discarded at its end.
///
/// Batch tasks run on preemptive tokio workers, so the mutable pieces sit
/// behind locks rather than relying on cooperative scheduling.
pub struct ProcessingContext {
    started_at: Instant,
    stats: Mutex<ProcessingStats>,
    processed_files: Mutex<HashSet<String>>,
    failed_files: Mutex<HashSet<String>>,
    memory: Arc<MemoryTracker>,
}

impl ProcessingContext {
    pub fn new(memory: Arc<MemoryTracker>) -> Self {
        Self {
            started_at: Instant::now(),
            stats: Mutex::new(ProcessingStats::default()),
            processed_files: Mutex::new(HashSet::new()),
            failed_files: Mutex::new(HashSet::new()),
            memory,
        }
    }

    pub fn memory(&self) -> &MemoryTracker {
        &self.memory
    }

    pub fn record_file(&self, path: &str, lines: usize, chunks: usize) {
        let mut stats = self.stats.lock();
        stats.files_processed += 1;
        stats.lines_processed += lines;
        stats.chunks_created += chunks;
        drop(stats);
        self.processed_files.lock().insert(path.to_string());
    }

    pub fn record_failure(&self, path: &str, error: impl std::fmt::Display) {
        self.stats.lock().errors.push(format!("{}: {}", path, error));
        self.failed_files.lock().insert(path.to_string());
    }

    pub fn processed_files(&self) -> HashSet<String> {
        self.processed_files.lock().clone()
    }

    pub fn failed_files(&self) -> HashSet<String> {
        self.failed_files.lock().clone()
    }

    /// Counters with elapsed time and peak memory filled in.
    pub fn snapshot(&self) -> ProcessingStats {
        let mut stats = self.stats.lock().clone();
        stats.elapsed_ms = self.started_at.elapsed().as_millis() as u64;
        stats.peak_memory_mb = self.memory.peak_usage_mb();
        stats
    }
}
