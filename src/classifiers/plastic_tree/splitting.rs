use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::plastic_tree::instance_conditional_test::{
    InstanceConditionalTest, NumericAttributeBinaryTest,
};
use crate::classifiers::plastic_tree::nodes::{Node, NodeId};
use crate::classifiers::plastic_tree::options::ReevaluationPolicy;
use crate::classifiers::plastic_tree::plastic_tree::PlasticTree;
use crate::classifiers::plastic_tree::restructuring::{RestructureOutcome, Restructurer};
use crate::classifiers::plastic_tree::successors::{SuccessorIdentifier, Successors};
use log::debug;

/// Merits below this are treated as "no information".
const MIN_MERIT: f64 = 1e-10;

/// Extends a distribution with zero weights up to `len` classes.
pub(crate) fn padded(mut dist: Vec<f64>, len: usize) -> Vec<f64> {
    if dist.len() < len {
        dist.resize(len, 0.0);
    }
    dist
}

/// Class distribution a split sends down the branch `key`.
pub(crate) fn distribution_for_key(
    suggestion: &AttributeSplitSuggestion,
    key: &SuccessorIdentifier,
    num_classes: usize,
) -> Vec<f64> {
    let index = if key.is_numeric() {
        if key.is_lower() { 0 } else { 1 }
    } else if suggestion
        .split_test()
        .is_some_and(|t| t.is_binary())
    {
        if key.is_default() { 1 } else { 0 }
    } else {
        key.selector_value() as usize
    };
    padded(
        suggestion.resulting_class_distribution_from_split(index),
        num_classes,
    )
}

/// Keys and class distributions of the branches created by `suggestion`.
/// Multiway nominal splits only get branches for values that were seen.
pub(crate) fn branches_of(
    suggestion: &AttributeSplitSuggestion,
    num_classes: usize,
) -> Option<(Successors, Vec<(SuccessorIdentifier, Vec<f64>)>)> {
    let test = suggestion.split_test()?;
    let dists = suggestion.resulting_class_distributions();
    let dist = |i: usize| padded(suggestion.resulting_class_distribution_from_split(i), num_classes);

    if test.is_numeric() {
        let threshold = test.split_value()?;
        Some((
            Successors::new(true, true, Some(threshold)),
            vec![
                (SuccessorIdentifier::numeric(threshold, true), dist(0)),
                (SuccessorIdentifier::numeric(threshold, false), dist(1)),
            ],
        ))
    } else if test.is_binary() {
        let value = test.split_value()?;
        Some((
            Successors::new(true, false, Some(value)),
            vec![
                (SuccessorIdentifier::nominal(value), dist(0)),
                (SuccessorIdentifier::nominal_default(value), dist(1)),
            ],
        ))
    } else {
        let branches = dists
            .iter()
            .enumerate()
            .filter(|(_, d)| d.iter().sum::<f64>() > 0.0)
            .map(|(v, _)| (SuccessorIdentifier::nominal(v as f64), dist(v)))
            .collect();
        Some((Successors::new(false, false, None), branches))
    }
}

impl PlasticTree {
    /// Candidate splits of a node sorted by ascending merit, the null split
    /// included unless pre-pruning is off.
    pub(crate) fn best_split_suggestions(&self, id: NodeId) -> Vec<AttributeSplitSuggestion> {
        let node = &self.arena[id];
        let criterion = self.split_criterion.as_ref();
        let pre_split_dist = node.observed_class_distribution();
        let mut suggestions = Vec::new();

        if !self.options.no_pre_prune {
            let merit = criterion.get_merit_of_split(pre_split_dist, &[pre_split_dist.to_vec()]);
            suggestions.push(AttributeSplitSuggestion::null_split(merit));
        }
        for (index, observer) in node.attribute_observers.iter().enumerate() {
            let Some(observer) = observer else { continue };
            if let Some(suggestion) = observer.get_best_evaluated_split_suggestion(
                criterion,
                pre_split_dist,
                index,
                self.options.binary_splits,
            ) {
                if !suggestion.merit().is_nan() {
                    suggestions.push(suggestion);
                }
            }
        }
        suggestions.sort();
        suggestions
    }

    /// The best suggestion, or the runner-up when the best one splits on the
    /// attribute this node is blocked from. A blocked best suggestion without
    /// a runner-up is kept.
    pub(crate) fn choose_best<'a>(
        &self,
        suggestions: &'a [AttributeSplitSuggestion],
        blocked_attribute: Option<usize>,
    ) -> Option<&'a AttributeSplitSuggestion> {
        let best = suggestions.last()?;
        if self.options.block_parent_attribute
            && blocked_attribute.is_some()
            && best.attribute_index() == blocked_attribute
        {
            return Some(
                suggestions
                    .len()
                    .checked_sub(2)
                    .map_or(best, |i| &suggestions[i]),
            );
        }
        Some(best)
    }

    pub(crate) fn attempt_split(&mut self, id: NodeId) {
        let node = &self.arena[id];
        if node.depth >= self.options.max_depth || node.observed_class_distribution_is_pure() {
            return;
        }
        self.arena[id].num_split_attempts += 1;

        let suggestions = self.best_split_suggestions(id);
        let node = &self.arena[id];
        let Some(best) = self.choose_best(&suggestions, node.blocked_attribute) else {
            return;
        };
        let Some(attribute) = best.attribute_index() else {
            return;
        };

        let range = self
            .split_criterion
            .get_range_of_merit(node.observed_class_distribution());
        let hoeffding_bound =
            self.compute_hoeffding_bound(range, self.current_confidence(node), node.seen_weight);

        let merit = best.merit();
        if (merit > hoeffding_bound || hoeffding_bound < self.options.tie_threshold)
            && merit >= MIN_MERIT
            && !node.used_nominal_attributes.contains(&attribute)
        {
            let best = best.clone();
            if self.make_split(id, &best) {
                debug!(
                    "split {id:?} on attribute {attribute} (merit {merit:.4}, bound {hoeffding_bound:.4})"
                );
            }
        }
    }

    /// Installs `suggestion` at a node with freshly created successors. Any
    /// previous successors are freed. Returns `false` if no branch could be
    /// created, leaving the node untouched.
    pub(crate) fn make_split(&mut self, id: NodeId, suggestion: &AttributeSplitSuggestion) -> bool {
        let Some(test) = suggestion.split_test() else {
            return false;
        };
        let node = &self.arena[id];
        let num_classes = node.observed_class_distribution.len();
        let Some((mut successors, branches)) = branches_of(suggestion, num_classes) else {
            return false;
        };

        let mut children = Vec::with_capacity(branches.len());
        for (_, dist) in &branches {
            let mut child = node.new_child(test, self.options.block_parent_attribute, dist.clone());
            child.change_detector = self.options.new_change_detector();
            children.push(child);
        }
        for ((key, _), child) in branches.into_iter().zip(children) {
            let child = self.arena.insert(child);
            if !successors.add_branch(key, child).is_added() {
                self.arena.remove(child);
            }
        }
        if successors.is_empty() {
            return false;
        }

        let node = &mut self.arena[id];
        node.split_test = Some(test.clone_box());
        node.class_distribution_at_creation = node.observed_class_distribution.clone();
        let previous = node.successors.replace(successors);
        for child in previous.iter().flat_map(Successors::nodes) {
            self.arena.remove_subtree(child);
        }
        self.performed_tree_revision = true;
        true
    }

    /// Turns an internal node back into a leaf, keeping its statistics.
    /// Returns `false` if the node already was a leaf.
    pub(crate) fn kill_subtree(&mut self, id: NodeId) -> bool {
        let Some(previous) = self.arena[id].set_leaf() else {
            return false;
        };
        for child in previous.nodes() {
            self.arena.remove_subtree(child);
        }
        self.performed_tree_revision = true;
        debug!("pruned {id:?} back to a leaf");
        true
    }

    fn update_infogain_sum(&mut self, id: NodeId, suggestions: &[AttributeSplitSuggestion]) {
        let node = &mut self.arena[id];
        for suggestion in suggestions {
            let mut merit = if suggestion.merit().is_finite() {
                suggestion.merit()
            } else {
                0.0
            };
            if suggestion.is_null_split() {
                merit = merit.max(0.0);
            }
            *node
                .infogain_sum
                .entry(suggestion.attribute_index())
                .or_insert(0.0) += merit;
        }
    }

    /// Merit of the split currently installed at `id`, recomputed from the
    /// node's observer of that attribute.
    fn current_split_merit(&self, id: NodeId) -> f64 {
        let node = &self.arena[id];
        let Some(test) = node.split_test() else {
            return 0.0;
        };
        let split_value = if test.is_binary() {
            test.split_value()
        } else {
            None
        };
        node.attribute_observers
            .get(test.attribute_index())
            .and_then(Option::as_ref)
            .and_then(|observer| {
                observer.force_split(
                    self.split_criterion.as_ref(),
                    node.observed_class_distribution(),
                    test.attribute_index(),
                    split_value,
                )
            })
            .map(|s| s.merit())
            .filter(|m| m.is_finite())
            .unwrap_or(0.0)
    }

    pub(crate) fn reevaluate_split(&mut self, id: NodeId) {
        if self.arena[id].is_leaf() {
            return;
        }
        self.arena[id].num_split_attempts += 1;
        let suggestions = self.best_split_suggestions(id);
        let restructures = self.options.restructures();
        if restructures {
            self.update_infogain_sum(id, &suggestions);
        }

        let node = &self.arena[id];
        let Some(best) = self.choose_best(&suggestions, node.blocked_attribute) else {
            return;
        };
        let best_merit = if restructures {
            let attempts = node.num_split_attempts.max(1) as f64;
            node.infogain_sum
                .get(&best.attribute_index())
                .copied()
                .unwrap_or(0.0)
                / attempts
        } else if best.is_null_split() {
            0.0
        } else {
            best.merit()
        };
        let current_merit = self.current_split_merit(id);
        let delta_g = best_merit - current_merit;

        let range = self
            .split_criterion
            .get_range_of_merit(node.observed_class_distribution());
        let hoeffding_bound =
            self.compute_hoeffding_bound(range, self.current_confidence(node), node.seen_weight);
        let tau = self.options.reevaluation_tie_threshold;
        if !(delta_g > hoeffding_bound
            || (hoeffding_bound < tau && delta_g > tau * self.options.relative_min_delta_g))
        {
            return;
        }

        let best = best.clone();
        let changed = if best.is_null_split() {
            self.kill_subtree(id)
        } else if self.threshold_only_change(id, &best) {
            self.move_threshold(id, &best)
        } else if let Some(changed) = self.restructure(id, &best) {
            changed
        } else {
            let split = self.make_split(id, &best);
            if split {
                debug!(
                    "resplit {id:?} on attribute {:?} (gain {delta_g:.4}, bound {hoeffding_bound:.4})",
                    best.attribute_index()
                );
            }
            split
        };

        if changed {
            let node = &mut self.arena[id];
            node.node_time = 0;
            node.seen_weight = 0.0;
        }
    }

    /// A new threshold on the installed numeric attribute that leaves the
    /// majority class of every existing branch as it is.
    fn threshold_only_change(&self, id: NodeId, suggestion: &AttributeSplitSuggestion) -> bool {
        let node = &self.arena[id];
        let (Some(current), Some(candidate)) = (node.split_test(), suggestion.split_test()) else {
            return false;
        };
        if !current.is_numeric()
            || !candidate.is_numeric()
            || current.attribute_index() != candidate.attribute_index()
        {
            return false;
        }
        let Some(successors) = node.successors() else {
            return false;
        };
        let num_classes = node.observed_class_distribution.len();
        successors.entries().iter().all(|(key, child)| {
            let new_dist = distribution_for_key(suggestion, key, num_classes);
            Node::majority_class(&new_dist)
                == Node::majority_class(self.arena[*child].observed_class_distribution())
        })
    }

    fn move_threshold(&mut self, id: NodeId, suggestion: &AttributeSplitSuggestion) -> bool {
        let Some(test) = suggestion.split_test() else {
            return false;
        };
        let Some(threshold) = test.split_value() else {
            return false;
        };
        let node = &mut self.arena[id];
        let moved = node
            .successors
            .as_mut()
            .is_some_and(|s| s.adjust_threshold(threshold));
        if moved {
            node.split_test = Some(Box::new(NumericAttributeBinaryTest::new(
                test.attribute_index(),
                threshold,
            )));
            self.performed_tree_revision = true;
            debug!("moved threshold of {id:?} to {threshold}");
        }
        moved
    }

    /// Reorders the subtree below `id` so that `suggestion` becomes its split.
    /// Returns whether the tree changed, or `None` when restructuring is off
    /// or not applicable.
    fn restructure(&mut self, id: NodeId, suggestion: &AttributeSplitSuggestion) -> Option<bool> {
        let ReevaluationPolicy::Restructure {
            max_branch_length,
            accepted_deviation,
        } = self.options.reevaluation
        else {
            return None;
        };
        if max_branch_length <= 1 {
            return None;
        }

        let mut restructurer = Restructurer::new(
            &mut self.arena,
            self.split_criterion.as_ref(),
            &self.options,
            max_branch_length,
            accepted_deviation,
        );
        let outcome = restructurer.restructure(id, suggestion)?;
        let changed = outcome == RestructureOutcome::Restructured;
        if changed {
            self.performed_tree_revision = true;
            debug!(
                "restructured {id:?} around attribute {:?}",
                suggestion.attribute_index()
            );
        }
        Some(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::Classifier;
    use crate::classifiers::plastic_tree::instance_conditional_test::{
        NominalAttributeBinaryTest, NominalAttributeMultiwayTest,
    };
    use crate::classifiers::plastic_tree::options::{PlasticTreeOptions, TreeVariant};
    use crate::classifiers::plastic_tree::split_criteria::InfoGainSplitCriterion;
    use crate::testing::{header_nominal, nominal_instance};

    fn tree(variant: TreeVariant) -> PlasticTree {
        PlasticTree::new(
            PlasticTreeOptions::for_variant(variant),
            Box::new(InfoGainSplitCriterion::default()),
        )
    }

    fn suggestion(test: Box<dyn InstanceConditionalTest>, dists: Vec<Vec<f64>>) -> AttributeSplitSuggestion {
        AttributeSplitSuggestion::new(Some(test), dists, 0.5)
    }

    #[test]
    fn test_null_split_is_never_chosen_for_splitting() {
        let mut tree = tree(TreeVariant::HoeffdingTree);
        let header = header_nominal(&[2]);
        for i in 0..400 {
            // the attribute carries no information about the class
            let inst = nominal_instance(&header, &[i % 2], (i / 2) % 2);
            tree.train_on_instance(&inst);
        }
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_choose_best_skips_blocked_attribute() {
        let tree = tree(TreeVariant::Plastic);
        let suggestions = vec![
            AttributeSplitSuggestion::null_split(0.0),
            suggestion(Box::new(NominalAttributeMultiwayTest::new(1)), vec![]),
            AttributeSplitSuggestion::new(
                Some(Box::new(NominalAttributeMultiwayTest::new(0))),
                vec![],
                0.9,
            ),
        ];
        let best = tree.choose_best(&suggestions, Some(0));
        assert_eq!(best.and_then(|s| s.attribute_index()), Some(1));
        let best = tree.choose_best(&suggestions, None);
        assert_eq!(best.and_then(|s| s.attribute_index()), Some(0));
        let only = tree.choose_best(&suggestions[2..], Some(0));
        assert_eq!(only.and_then(|s| s.attribute_index()), Some(0));
        assert!(tree.choose_best(&[], Some(0)).is_none());
    }

    #[test]
    fn test_make_split_creates_seeded_children() {
        let mut tree = tree(TreeVariant::Efdt);
        let root = tree.arena.insert(tree.new_node(0, vec![3.0, 3.0]));
        let split = suggestion(
            Box::new(NominalAttributeBinaryTest::new(0, 2)),
            vec![vec![3.0, 0.0], vec![0.0, 3.0]],
        );
        assert!(tree.make_split(root, &split));

        let node = &tree.arena[root];
        let successors = node.successors().expect("split installed");
        let matching = successors
            .get_successor_node(&SuccessorIdentifier::nominal(2.0))
            .expect("match branch");
        let default = successors
            .get_successor_node(&SuccessorIdentifier::nominal_default(2.0))
            .expect("default branch");
        assert_eq!(tree.arena[matching].observed_class_distribution(), &[3.0, 0.0]);
        assert_eq!(tree.arena[default].observed_class_distribution(), &[0.0, 3.0]);
        assert_eq!(tree.arena[matching].depth(), 1);
        assert!(tree.arena[matching].used_nominal_attributes.contains(&0));
        assert!(tree.did_perform_tree_revision());
    }

    #[test]
    fn test_multiway_split_skips_unseen_values() {
        let split = suggestion(
            Box::new(NominalAttributeMultiwayTest::new(0)),
            vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, 2.0]],
        );
        let (_, branches) = branches_of(&split, 2).expect("split test present");
        let selectors: Vec<f64> = branches.iter().map(|(k, _)| k.selector_value()).collect();
        assert_eq!(selectors, vec![0.0, 2.0]);
    }

    #[test]
    fn test_resplit_frees_previous_children() {
        let mut tree = tree(TreeVariant::Efdt);
        let root = tree.arena.insert(tree.new_node(0, vec![3.0, 3.0]));
        let first = suggestion(
            Box::new(NumericAttributeBinaryTest::new(0, 0.5)),
            vec![vec![3.0, 0.0], vec![0.0, 3.0]],
        );
        let second = suggestion(
            Box::new(NumericAttributeBinaryTest::new(1, 2.0)),
            vec![vec![2.0, 1.0], vec![1.0, 2.0]],
        );
        assert!(tree.make_split(root, &first));
        assert!(tree.make_split(root, &second));
        assert_eq!(tree.arena.len(), 3);
        assert_eq!(tree.arena[root].split_attribute(), Some(1));
    }

    #[test]
    fn test_kill_subtree_keeps_distribution() {
        let mut tree = tree(TreeVariant::Efdt);
        let root = tree.arena.insert(tree.new_node(0, vec![3.0, 3.0]));
        let split = suggestion(
            Box::new(NumericAttributeBinaryTest::new(0, 0.5)),
            vec![vec![3.0, 0.0], vec![0.0, 3.0]],
        );
        assert!(tree.make_split(root, &split));
        assert!(tree.kill_subtree(root));
        assert!(!tree.kill_subtree(root));
        assert!(tree.arena[root].is_leaf());
        assert!(tree.arena[root].split_test().is_none());
        assert_eq!(tree.arena[root].observed_class_distribution(), &[3.0, 3.0]);
        assert_eq!(tree.arena.len(), 1);
    }

    #[test]
    fn test_threshold_move_keeps_children() {
        let mut tree = tree(TreeVariant::Efdt);
        let root = tree.arena.insert(tree.new_node(0, vec![3.0, 3.0]));
        let split = suggestion(
            Box::new(NumericAttributeBinaryTest::new(0, 0.5)),
            vec![vec![3.0, 0.0], vec![0.0, 3.0]],
        );
        assert!(tree.make_split(root, &split));
        let children: Vec<_> = tree.arena[root].children().collect();

        let moved = suggestion(
            Box::new(NumericAttributeBinaryTest::new(0, 0.6)),
            vec![vec![3.0, 0.5], vec![0.0, 2.5]],
        );
        assert!(tree.threshold_only_change(root, &moved));
        assert!(tree.move_threshold(root, &moved));
        assert_eq!(tree.arena[root].children().collect::<Vec<_>>(), children);
        assert_eq!(tree.arena[root].split_test().and_then(|t| t.split_value()), Some(0.6));

        let flipped = suggestion(
            Box::new(NumericAttributeBinaryTest::new(0, 0.9)),
            vec![vec![1.0, 3.0], vec![2.0, 0.0]],
        );
        assert!(!tree.threshold_only_change(root, &flipped));
    }

    #[test]
    fn test_restructuring_onto_the_installed_split_is_not_a_revision() {
        let mut tree = tree(TreeVariant::Plastic);
        let root = tree.arena.insert(tree.new_node(0, vec![3.0, 3.0]));
        let multiway = suggestion(
            Box::new(NominalAttributeMultiwayTest::new(0)),
            vec![vec![3.0, 0.0], vec![0.0, 3.0]],
        );
        assert!(tree.make_split(root, &multiway));
        let children: Vec<_> = tree.arena[root].children().collect();
        tree.performed_tree_revision = false;

        assert_eq!(tree.restructure(root, &multiway), Some(false));
        assert!(!tree.did_perform_tree_revision());
        assert_eq!(tree.arena[root].children().collect::<Vec<_>>(), children);

        let numeric = suggestion(
            Box::new(NumericAttributeBinaryTest::new(1, 0.5)),
            vec![vec![3.0, 0.0], vec![0.0, 3.0]],
        );
        assert!(tree.make_split(root, &numeric));
        tree.performed_tree_revision = false;
        assert_eq!(tree.restructure(root, &numeric), Some(false));
        assert!(!tree.did_perform_tree_revision());

        let moved = suggestion(
            Box::new(NumericAttributeBinaryTest::new(1, 0.7)),
            vec![vec![3.0, 0.0], vec![0.0, 3.0]],
        );
        assert_eq!(tree.restructure(root, &moved), Some(true));
        assert!(tree.did_perform_tree_revision());
    }

    #[test]
    fn test_single_node_branches_fall_back_to_a_fresh_split() {
        let options = PlasticTreeOptions::for_variant(TreeVariant::Plastic)
            .with_restructuring_limits(1, 0.05);
        let mut tree = PlasticTree::new(options, Box::new(InfoGainSplitCriterion::default()));
        let root = tree.arena.insert(tree.new_node(0, vec![50.0, 50.0]));
        let first = suggestion(
            Box::new(NumericAttributeBinaryTest::new(0, 0.5)),
            vec![vec![30.0, 20.0], vec![20.0, 30.0]],
        );
        assert!(tree.make_split(root, &first));
        let child = tree.arena[root].children().next().expect("successor");
        let deeper = suggestion(
            Box::new(NumericAttributeBinaryTest::new(0, 0.25)),
            vec![vec![20.0, 10.0], vec![10.0, 10.0]],
        );
        assert!(tree.make_split(child, &deeper));
        assert_eq!(tree.arena.len(), 5);

        // attribute 1 separates the classes, the installed attribute 0 has no observer
        let mut observer = tree.options.new_observer(true);
        for i in 0..50 {
            observer.observe_attribute_class(0.3 * i as f64 / 50.0, 0, 1.0);
            observer.observe_attribute_class(0.7 + 0.3 * i as f64 / 50.0, 1, 1.0);
        }
        let node = &mut tree.arena[root];
        node.attribute_observers = vec![None, Some(observer)];
        node.seen_weight = 10_000.0;
        node.node_time = 400;
        tree.performed_tree_revision = false;

        tree.reevaluate_split(root);

        let node = &tree.arena[root];
        assert_eq!(node.split_attribute(), Some(1));
        assert_eq!(node.node_time, 0);
        assert_eq!(node.seen_weight, 0.0);
        assert!(node.children().all(|c| tree.arena[c].is_leaf()));
        assert_eq!(tree.arena.len(), 3);
        assert!(tree.did_perform_tree_revision());
    }

    #[test]
    fn test_hoeffding_bound_shrinks_with_more_weight() {
        let tree = tree(TreeVariant::HoeffdingTree);
        let few = tree.compute_hoeffding_bound(1.0, 0.001, 100.0);
        let many = tree.compute_hoeffding_bound(1.0, 0.001, 1000.0);
        let tighter = tree.compute_hoeffding_bound(1.0, 0.0001, 100.0);
        assert!(many < few);
        assert!(tighter > few);
        assert_eq!(
            tree.compute_hoeffding_bound(1.0, 0.0, 100.0),
            tree.compute_hoeffding_bound(1.0, 0.0000001, 100.0)
        );
    }

    #[test]
    fn test_adaptive_confidence_tightens_with_attempts() {
        let mut options = PlasticTreeOptions::for_variant(TreeVariant::Efdt);
        options.adaptive_confidence = Some(0.2);
        let tree = PlasticTree::new(options, Box::new(InfoGainSplitCriterion::default()));
        let mut node = Node::new_leaf(0, vec![1.0, 1.0]);
        assert_eq!(tree.current_confidence(&node), 0.2);
        node.num_split_attempts = 2;
        assert!((tree.current_confidence(&node) - 0.2 * (-2.0f64).exp()).abs() < 1e-12);
    }
}
