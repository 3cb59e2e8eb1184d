use crate::classifiers::plastic_tree::nodes::NodeId;
use crate::classifiers::plastic_tree::plastic_tree::PlasticTree;
use log::{debug, info, trace};

/// `2 * exp(-2 * m * diff^2)` with `m` the harmonic combination of both
/// window widths. Small values mean the two error rates differ.
pub(crate) fn switch_significance(
    foreground_width: usize,
    foreground_error: f64,
    background_width: usize,
    background_error: f64,
) -> f64 {
    if foreground_width == 0 || background_width == 0 {
        return 1.0;
    }
    let w1 = foreground_width as f64;
    let w2 = background_width as f64;
    let m = (w1 * w2) / (w1 + w2);
    let diff = foreground_error - background_error;
    2.0 * (-2.0 * m * diff * diff).exp()
}

impl PlasticTree {
    /// Drift handling of an internal node: starts a background subtree on a
    /// change signal and later promotes or discards it.
    pub(crate) fn hat_grow(&mut self, id: NodeId, change: bool) {
        let node = &self.arena[id];
        let Some(background) = node.background else {
            if change {
                let mut learner = self.new_node(node.depth, vec![0.0; node.observed_class_distribution.len()]);
                learner.used_nominal_attributes = node.used_nominal_attributes.clone();
                learner.blocked_attribute = node.blocked_attribute;
                let learner = self.arena.insert(learner);
                self.arena[id].background = Some(learner);
                trace!("started background learner {learner:?} for {id:?}");
            }
            return;
        };

        let (Some(foreground_detector), Some(background_detector)) = (
            node.change_detector.as_ref(),
            self.arena[background].change_detector.as_ref(),
        ) else {
            return;
        };
        let minimum_width = self.options.reevaluation_period;
        if foreground_detector.width() < minimum_width
            || background_detector.width() < minimum_width
        {
            return;
        }

        let foreground_error = foreground_detector.estimation();
        let background_error = background_detector.estimation();
        let significance = switch_significance(
            foreground_detector.width(),
            foreground_error,
            background_detector.width(),
            background_error,
        );
        let confidence = self.current_confidence(node);
        if significance >= confidence {
            return;
        }

        if background_error < foreground_error {
            info!(
                "promoting background learner of {id:?} (error {background_error:.4} < {foreground_error:.4})"
            );
            self.promote_background(id);
        } else if background_error > foreground_error {
            debug!(
                "discarding background learner of {id:?} (error {background_error:.4} > {foreground_error:.4})"
            );
            self.discard_background(id);
        }
    }

    /// Moves the background subtree into the slot of `id`. The node keeps its
    /// position in the tree; its former successors are freed.
    pub(crate) fn promote_background(&mut self, id: NodeId) {
        let Some(background) = self.arena[id].background.take() else {
            return;
        };
        let Some(mut promoted) = self.arena.remove(background) else {
            return;
        };

        let foreground = &self.arena[id];
        promoted.depth = foreground.depth;
        promoted.blocked_attribute = foreground.blocked_attribute;
        promoted.used_nominal_attributes = foreground.used_nominal_attributes.clone();

        let replaced = std::mem::replace(&mut self.arena[id], promoted);
        for child in replaced.children() {
            self.arena.remove_subtree(child);
        }
        self.clear_backgrounds_below(id);

        self.promotion_count += 1;
        self.last_promotion = Some(id);
        self.performed_tree_revision = true;
    }

    pub(crate) fn discard_background(&mut self, id: NodeId) {
        if let Some(background) = self.arena[id].background.take() {
            self.arena.remove_subtree(background);
        }
    }

    /// Frees every background subtree below `id` and restarts the error
    /// monitors there.
    pub(crate) fn clear_backgrounds_below(&mut self, id: NodeId) {
        for node_id in self.subtree_nodes(id) {
            if let Some(background) = self.arena[node_id].clear_drift_state() {
                self.arena.remove_subtree(background);
            }
        }
    }
}
