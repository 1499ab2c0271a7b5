//! Lightweight pruning counters, exposed for the agent orchestrator's
//! stats surface rather than any external metrics backend (§C.3).

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PrunerMetrics {
    nodes_scanned: AtomicU64,
    nodes_pruned: AtomicU64,
    runs: AtomicU64,
}

impl PrunerMetrics {
    pub fn record_run(&self, scanned: usize, pruned: usize) {
        self.nodes_scanned.fetch_add(scanned as u64, Ordering::Relaxed);
        self.nodes_pruned.fetch_add(pruned as u64, Ordering::Relaxed);
        self.runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PrunerMetricsSnapshot {
        PrunerMetricsSnapshot {
            nodes_scanned: self.nodes_scanned.load(Ordering::Relaxed),
            nodes_pruned: self.nodes_pruned.load(Ordering::Relaxed),
            runs: self.runs.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrunerMetricsSnapshot {
    pub nodes_scanned: u64,
    pub nodes_pruned: u64,
    pub runs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_across_runs() {
        let metrics = PrunerMetrics::default();
        metrics.record_run(10, 7);
        metrics.record_run(5, 2);
        let snap = metrics.snapshot();
        assert_eq!(snap.nodes_scanned, 15);
        assert_eq!(snap.nodes_pruned, 9);
        assert_eq!(snap.runs, 2);
    }
}
