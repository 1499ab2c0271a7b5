//! DOM Pruner (§4.1).
//!
//! Scores a live DOM snapshot for interactivity and returns a small, ranked
//! set of actionable elements instead of the full tree, so downstream
//! context assembly and the ReAct loop stay within token budget. This crate
//! is pure and synchronous: `browser-context` is responsible for walking
//! CDP's DOM/CSS data into a [`RawDomNode`] tree before calling [`DomPruner`].

pub mod errors;
pub mod metrics;
pub mod model;
pub mod prune;
pub mod scoring;
pub mod selectors;

pub use errors::{PruneError, PruneResult};
pub use metrics::{PrunerMetrics, PrunerMetricsSnapshot};
pub use model::{ComputedStyle, RawAttributes, RawDomNode, RawRect};
pub use prune::{PruneOptions, PruneOutcome, PruneStats};

/// Stateful entry point holding run metrics across calls.
#[derive(Default)]
pub struct DomPruner {
    metrics: PrunerMetrics,
}

impl DomPruner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prune(&self, root: &RawDomNode, options: PruneOptions) -> PruneOutcome {
        let outcome = prune::prune(root, options);
        self.metrics.record_run(outcome.stats.total, outcome.stats.pruned);
        outcome
    }

    pub fn metrics(&self) -> PrunerMetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{RawAttributes, RawRect};

    #[test]
    fn pruner_tracks_metrics_across_calls() {
        let pruner = DomPruner::new();
        let leaf = RawDomNode::element("button")
            .with_attributes(RawAttributes {
                id: Some("go".into()),
                role: Some("button".into()),
                has_onclick: true,
                ..Default::default()
            })
            .with_rect(RawRect {
                x: 0.0,
                y: 0.0,
                width: 40.0,
                height: 20.0,
            });
        let root = RawDomNode::element("body").with_children(vec![leaf]);

        pruner.prune(&root, PruneOptions::default());
        pruner.prune(&root, PruneOptions::default());

        let snap = pruner.metrics();
        assert_eq!(snap.runs, 2);
        assert!(snap.nodes_scanned >= 4);
    }
}
