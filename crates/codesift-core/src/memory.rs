use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sysinfo::{get_current_pid, Pid, ProcessesToUpdate, System};
use tracing::{debug, warn};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Outcome of one forced collection pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GcReport {
    pub usage_before_mb: f64,
    pub usage_after_mb: f64,
    pub memory_freed_mb: f64,
    pub objects_collected: usize,
}

/// Hook invoked during a collection pass. Returns the number of entries it
/// released so the pass can be reported.
pub type ReclaimHook = Box<dyn Fn() -> usize + Send + Sync>;

/// Samples process resident memory and signals when the configured ceiling
/// is approached. Advisory only: it never blocks or denies an allocation.
pub struct MemoryTracker {
    max_memory_mb: u64,
    gc_threshold: f64,
    pid: Option<Pid>,
    system: Mutex<System>,
    peak_mb: Mutex<f64>,
    reclaim_hooks: Mutex<Vec<ReclaimHook>>,
}

impl MemoryTracker {
    pub fn new(max_memory_mb: u64) -> Self {
        Self::with_threshold(max_memory_mb, 0.8)
    }

    pub fn with_threshold(max_memory_mb: u64, gc_threshold: f64) -> Self {
        let pid = match get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!("Cannot resolve current pid, memory sampling disabled: {}", e);
                None
            }
        };
        Self {
            max_memory_mb,
            gc_threshold,
            pid,
            system: Mutex::new(System::new()),
            peak_mb: Mutex::new(0.0),
            reclaim_hooks: Mutex::new(Vec::new()),
        }
    }

    pub fn max_memory_mb(&self) -> u64 {
        self.max_memory_mb
    }

    /// Current resident set size in megabytes. Also advances the peak
    /// high-water mark.
    pub fn current_usage_mb(&self) -> f64 {
        let Some(pid) = self.pid else {
            return 0.0;
        };
        let mut system = self.system.lock();
        system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let usage_mb = system
            .process(pid)
            .map(|p| p.memory() as f64 / BYTES_PER_MB)
            .unwrap_or(0.0);
        drop(system);

        let mut peak = self.peak_mb.lock();
        if usage_mb > *peak {
            *peak = usage_mb;
        }
        usage_mb
    }

    pub fn peak_usage_mb(&self) -> f64 {
        *self.peak_mb.lock()
    }

    /// True iff current usage strictly exceeds `gc_threshold * max_memory_mb`.
    pub fn should_trigger_gc(&self) -> bool {
        exceeds_threshold(self.current_usage_mb(), self.max_memory_mb, self.gc_threshold)
    }

    /// Register a closure that releases reclaimable state (a cache clear,
    /// a buffer drop). Hooks run during [`MemoryTracker::trigger_gc`].
    pub fn register_reclaim_hook(&self, hook: ReclaimHook) {
        self.reclaim_hooks.lock().push(hook);
    }

    /// Force a collection pass: run every reclaim hook and report deltas.
    pub fn trigger_gc(&self) -> GcReport {
        let usage_before_mb = self.current_usage_mb();
        let objects_collected: usize = {
            let hooks = self.reclaim_hooks.lock();
            hooks.iter().map(|hook| hook()).sum()
        };
        let usage_after_mb = self.current_usage_mb();
        let report = GcReport {
            usage_before_mb,
            usage_after_mb,
            memory_freed_mb: (usage_before_mb - usage_after_mb).max(0.0),
            objects_collected,
        };
        debug!(
            "Collection pass: {:.1}MB -> {:.1}MB, {} objects released",
            report.usage_before_mb, report.usage_after_mb, report.objects_collected
        );
        report
    }
}

/// Threshold test kept free of sampling so the boundary is unit-testable:
/// strictly greater than `threshold * max`, not at it.
pub(crate) fn exceeds_threshold(current_mb: f64, max_memory_mb: u64, threshold: f64) -> bool {
    current_mb > threshold * max_memory_mb as f64
}
