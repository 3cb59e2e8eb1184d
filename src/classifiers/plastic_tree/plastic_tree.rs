use crate::classifiers::Classifier;
use crate::classifiers::plastic_tree::nodes::{Node, NodeArena, NodeId};
use crate::classifiers::plastic_tree::options::{PlasticTreeOptions, ReevaluationPolicy};
use crate::classifiers::plastic_tree::split_criteria::SplitCriterion;
use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::evaluation::Measurement;
use crate::utils::math::hoeffding_bound;
use log::trace;
use std::fmt;
use std::mem::size_of;
use std::sync::Arc;

/// Incremental decision tree that keeps re-evaluating its splits.
///
/// Depending on [`PlasticTreeOptions`] it behaves as a plain Hoeffding tree,
/// as EFDT (destructive resplits), as PLASTIC (resplits by restructuring the
/// subtree in place) and optionally grows background subtrees that replace
/// parts of the tree after concept drift.
pub struct PlasticTree {
    pub(crate) arena: NodeArena,
    pub(crate) root: Option<NodeId>,
    header: Option<Arc<InstanceHeader>>,
    pub(crate) options: PlasticTreeOptions,
    pub(crate) split_criterion: Box<dyn SplitCriterion>,
    training_weight_seen_by_model: f64,
    pub(crate) performed_tree_revision: bool,
    pub(crate) promotion_count: usize,
    pub(crate) last_promotion: Option<NodeId>,
}

impl PlasticTree {
    pub fn new(options: PlasticTreeOptions, split_criterion: Box<dyn SplitCriterion>) -> Self {
        Self {
            arena: NodeArena::new(),
            root: None,
            header: None,
            options,
            split_criterion,
            training_weight_seen_by_model: 0.0,
            performed_tree_revision: false,
            promotion_count: 0,
            last_promotion: None,
        }
    }

    pub fn options(&self) -> &PlasticTreeOptions {
        &self.options
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn training_weight_seen_by_model(&self) -> f64 {
        self.training_weight_seen_by_model
    }

    /// Whether the last call to `train_on_instance` changed the structure.
    pub fn did_perform_tree_revision(&self) -> bool {
        self.performed_tree_revision
    }

    pub fn promotion_count(&self) -> usize {
        self.promotion_count
    }

    /// Slot of the node most recently replaced by its background subtree.
    pub fn last_promotion(&self) -> Option<NodeId> {
        self.last_promotion
    }

    /// A zero confidence is read as `1e-7`.
    pub fn compute_hoeffding_bound(&self, range: f64, confidence: f64, n: f64) -> f64 {
        let confidence = if confidence == 0.0 { 0.0000001 } else { confidence };
        hoeffding_bound(range, confidence, n)
    }

    /// Split confidence of a node, tightened by its number of attempts when
    /// adaptive confidence is on.
    pub(crate) fn current_confidence(&self, node: &Node) -> f64 {
        match self.options.adaptive_confidence {
            Some(c) => c * (-(node.num_split_attempts as f64)).exp(),
            None => self.options.split_confidence,
        }
    }

    pub(crate) fn new_node(&self, depth: usize, class_distribution: Vec<f64>) -> Node {
        let mut node = Node::new_leaf(depth, class_distribution);
        node.change_detector = self.options.new_change_detector();
        node
    }

    fn learn_subtree(&mut self, id: NodeId, instance: &dyn Instance, class: usize) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            current = self.learn_at(node_id, instance, class);
        }
    }

    /// Updates one node and returns the successor the instance continues to.
    fn learn_at(&mut self, id: NodeId, instance: &dyn Instance, class: usize) -> Option<NodeId> {
        self.update_statistics(id, instance, class);

        let change = self.update_change_detector(id, class);
        if let Some(background) = self.arena[id].background {
            self.learn_subtree(background, instance, class);
        }

        let node = &self.arena[id];
        if node.is_leaf() {
            if node.node_time % self.options.grace_period.max(1) as u64 == 0 {
                self.attempt_split(id);
            }
        } else {
            let due = node.node_time % self.options.reevaluation_period.max(1) as u64 == 0;
            // A background is started on the change signal, but only compared
            // against the foreground on the re-evaluation cadence.
            let drift_check = match node.background {
                Some(_) => due,
                None => change,
            };
            if self.options.tracks_drift() && drift_check {
                self.hat_grow(id, change);
            }
            if due
                && self.options.reevaluation != ReevaluationPolicy::Off
                && !self.arena[id].is_leaf()
            {
                self.reevaluate_split(id);
            }
        }

        if self.arena[id].is_leaf() {
            return None;
        }
        self.successor_or_new_leaf(id, instance)
    }

    fn update_statistics(&mut self, id: NodeId, instance: &dyn Instance, class: usize) {
        let weight = instance.weight();
        let header = instance.header();
        let num_model_attributes = header.number_of_attributes().saturating_sub(1);
        let options = &self.options;
        let node = &mut self.arena[id];

        node.seen_weight += weight;
        node.node_time += 1;
        if class >= node.observed_class_distribution.len() {
            node.observed_class_distribution.resize(class + 1, 0.0);
        }
        node.observed_class_distribution[class] += weight;

        if node.attribute_observers.len() < num_model_attributes {
            node.attribute_observers
                .resize_with(num_model_attributes, || None);
        }
        for model_index in 0..num_model_attributes {
            let index = header.model_to_instance_index(model_index);
            let observer = node.attribute_observers[model_index].get_or_insert_with(|| {
                let numeric = header
                    .attribute_at_index(index)
                    .is_some_and(|a| a.is_numeric());
                options.new_observer(numeric)
            });
            let value = instance.value_at_index(index).unwrap_or(f64::NAN);
            observer.observe_attribute_class(value, class, weight);
        }
    }

    /// Feeds the outcome of the oldest pending prediction to the node's error
    /// monitor. Returns the monitor's change signal.
    fn update_change_detector(&mut self, id: NodeId, class: usize) -> bool {
        let node = &mut self.arena[id];
        let Some(predicted) = node.take_pending_prediction() else {
            return false;
        };
        let Some(detector) = node.change_detector.as_mut() else {
            return false;
        };
        detector.input(if predicted == class { 0.0 } else { 1.0 });
        let change = detector.take_change();
        if change {
            trace!(
                "change detected at {id:?} (error estimate {:.4}, width {})",
                detector.estimation(),
                detector.width()
            );
        }
        change
    }

    fn successor_or_new_leaf(&mut self, id: NodeId, instance: &dyn Instance) -> Option<NodeId> {
        let node = &self.arena[id];
        let key = node.successor_key(instance)?;
        let successors = node.successors.as_ref()?;
        if let Some(child) = successors.get_successor_node(&key) {
            return Some(child);
        }

        let test = node.split_test.as_deref()?;
        let num_classes = node.observed_class_distribution.len();
        let mut child = node.new_child(
            test,
            self.options.block_parent_attribute,
            vec![0.0; num_classes],
        );
        child.change_detector = self.options.new_change_detector();
        let child = self.arena.insert(child);

        let added = self.arena[id]
            .successors
            .as_mut()
            .is_some_and(|s| s.add_branch(key, child).is_added());
        if added {
            Some(child)
        } else {
            self.arena.remove(child);
            None
        }
    }

    /// Class votes of the subtree below `id`. Nodes with an error monitor
    /// remember what they predicted, and so do their background subtrees.
    fn votes_from(&self, id: NodeId, instance: &dyn Instance) -> Vec<f64> {
        let node = &self.arena[id];
        let votes = match node.successor_for_instance(instance) {
            Some(child) => self.votes_from(child, instance),
            None => node.observed_class_distribution.clone(),
        };

        if node.change_detector.is_some() {
            if let Some(class) = Node::majority_class(&votes) {
                node.record_prediction(class);
            }
            if let Some(background) = node.background {
                self.votes_from(background, instance);
            }
        }
        votes
    }

    pub(crate) fn subtree_nodes(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.arena.get(current) {
                found.push(current);
                pending.extend(node.children());
            }
        }
        found
    }

    /// Number of nodes in the tree, background subtrees excluded.
    pub fn node_count(&self) -> usize {
        self.root.map_or(0, |r| self.subtree_nodes(r).len())
    }

    pub fn leaf_count(&self) -> usize {
        self.root.map_or(0, |r| {
            self.subtree_nodes(r)
                .into_iter()
                .filter(|&id| self.arena[id].is_leaf())
                .count()
        })
    }

    /// Depth of the deepest node, the root being at depth 0.
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |r| {
            self.subtree_nodes(r)
                .into_iter()
                .map(|id| self.arena[id].depth)
                .max()
                .unwrap_or(0)
        })
    }

    /// Background subtrees hanging anywhere below `id`, nested ones included.
    pub fn background_learner_count_below(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.arena.get(current) else {
                continue;
            };
            pending.extend(node.children());
            if let Some(background) = node.background {
                count += 1;
                pending.push(background);
            }
        }
        count
    }

    pub fn background_learner_count(&self) -> usize {
        self.root
            .map_or(0, |r| self.background_learner_count_below(r))
    }

    fn describe_subtree(&self, f: &mut fmt::Formatter<'_>, id: NodeId, indent: usize) -> fmt::Result {
        let node = &self.arena[id];
        let pad = "  ".repeat(indent);
        match (node.split_test(), node.successors()) {
            (Some(test), Some(successors)) if !node.is_leaf() => {
                writeln!(
                    f,
                    "{pad}{id:?} split on attribute {} ({} successors)",
                    test.attribute_index(),
                    successors.len()
                )?;
                for (key, child) in successors.entries() {
                    writeln!(f, "{pad}  if {key}:")?;
                    self.describe_subtree(f, *child, indent + 2)?;
                }
            }
            _ => {
                let class = Node::majority_class(&node.observed_class_distribution);
                writeln!(
                    f,
                    "{pad}{id:?} leaf class={class:?} dist={:?}",
                    node.observed_class_distribution
                )?;
            }
        }
        if let Some(background) = node.background {
            writeln!(f, "{pad}  background:")?;
            self.describe_subtree(f, background, indent + 2)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlasticTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => self.describe_subtree(f, root, 0),
            None => writeln!(f, "(empty tree)"),
        }
    }
}

impl Classifier for PlasticTree {
    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Vec<f64> {
        match self.root {
            Some(root) => self.votes_from(root, instance),
            None => vec![0.0; instance.number_of_classes()],
        }
    }

    fn set_model_context(&mut self, header: Arc<InstanceHeader>) {
        self.header = Some(header);
    }

    fn train_on_instance(&mut self, instance: &dyn Instance) {
        self.performed_tree_revision = false;
        let Some(class) = instance
            .class_value()
            .filter(|c| c.is_finite() && *c >= 0.0)
            .map(|c| c as usize)
        else {
            return;
        };

        let root = match self.root {
            Some(root) => root,
            None => {
                let num_classes = instance.number_of_classes().max(class + 1);
                let root = self.arena.insert(self.new_node(0, vec![0.0; num_classes]));
                self.root = Some(root);
                root
            }
        };

        self.training_weight_seen_by_model += instance.weight();
        self.learn_subtree(root, instance, class);
    }

    fn calc_memory_size(&self) -> usize {
        let mut total = size_of::<Self>() + self.arena.calc_memory_size();
        if let Some(header) = &self.header {
            total += header.calc_memory_size();
        }
        total
    }

    fn model_measurements(&self) -> Vec<Measurement> {
        let mut measurements = vec![
            Measurement::new("tree_nodes", self.node_count() as f64),
            Measurement::new("tree_leaves", self.leaf_count() as f64),
            Measurement::new("tree_depth", self.depth() as f64),
        ];
        if self.options.tracks_drift() {
            measurements.push(Measurement::new(
                "background_learners",
                self.background_learner_count() as f64,
            ));
            measurements.push(Measurement::new("promotions", self.promotion_count as f64));
        }
        measurements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::plastic_tree::options::TreeVariant;
    use crate::classifiers::plastic_tree::split_criteria::InfoGainSplitCriterion;
    use crate::testing::{header_nominal, header_numeric, nominal_instance, numeric_instance};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tree_with(options: PlasticTreeOptions) -> PlasticTree {
        PlasticTree::new(options, Box::new(InfoGainSplitCriterion::default()))
    }

    /// `x0` is 0 or 1 and decides the class, `x1` is noise.
    fn informative_instance(header: &Arc<InstanceHeader>, rng: &mut StdRng) -> impl Instance {
        let class = rng.random_range(0..2usize);
        numeric_instance(header, &[class as f64, rng.random()], class)
    }

    fn assert_leaf_invariant(tree: &PlasticTree) {
        let Some(root) = tree.root() else { return };
        for id in tree.subtree_nodes(root) {
            let node = &tree.arena[id];
            let has_successors = node.successors().is_some_and(|s| !s.is_empty());
            assert_eq!(node.is_leaf(), !has_successors);
            if !node.is_leaf() {
                assert!(node.split_test().is_some());
            }
        }
    }

    #[test]
    fn test_empty_tree_votes_nothing() {
        let header = header_numeric(1);
        let tree = tree_with(PlasticTreeOptions::default());
        let votes = tree.get_votes_for_instance(&numeric_instance(&header, &[0.3], 1));
        assert_eq!(votes, vec![0.0, 0.0]);
        assert_eq!(tree.node_count(), 0);
        assert_eq!(tree.to_string(), "(empty tree)\n");
    }

    #[test]
    fn test_unlabelled_instances_are_ignored() {
        let header = header_numeric(1);
        let mut tree = tree_with(PlasticTreeOptions::default());
        let mut inst = numeric_instance(&header, &[0.3], 1);
        inst.set_class_value(f64::NAN).unwrap();
        tree.train_on_instance(&inst);
        assert!(tree.root().is_none());
        assert_eq!(tree.training_weight_seen_by_model(), 0.0);
    }

    #[test]
    fn test_informative_attribute_splits_early_and_generalizes() {
        let header = header_numeric(2);
        let mut rng = StdRng::seed_from_u64(11);
        let mut tree = tree_with(PlasticTreeOptions::for_variant(TreeVariant::Plastic));
        let mut first_split = None;

        for i in 1..=1000 {
            let inst = informative_instance(&header, &mut rng);
            tree.train_on_instance(&inst);
            if first_split.is_none() && tree.did_perform_tree_revision() {
                first_split = Some(i);
            }
        }
        assert!(first_split.is_some_and(|i| i <= 400), "first split at {first_split:?}");
        assert_leaf_invariant(&tree);

        let correct = (0..1000)
            .filter(|_| {
                let inst = informative_instance(&header, &mut rng);
                let votes = tree.get_votes_for_instance(&inst);
                Node::majority_class(&votes) == inst.class_value().map(|c| c as usize)
            })
            .count();
        assert!(correct > 950, "accuracy {correct}/1000");

        let root = tree.root().unwrap();
        assert_eq!(tree.arena[root].split_attribute(), Some(0));
    }

    #[test]
    fn test_repeated_prediction_is_stable() {
        let header = header_numeric(2);
        let mut rng = StdRng::seed_from_u64(5);
        for variant in [TreeVariant::Plastic, TreeVariant::AdaptivePlastic] {
            let mut tree = tree_with(PlasticTreeOptions::for_variant(variant));
            for _ in 0..500 {
                let inst = informative_instance(&header, &mut rng);
                tree.get_votes_for_instance(&inst);
                tree.train_on_instance(&inst);
            }
            let query = numeric_instance(&header, &[1.0, 0.25], 1);
            let first = tree.get_votes_for_instance(&query);
            let second = tree.get_votes_for_instance(&query);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_pure_stream_never_splits() {
        let header = header_numeric(2);
        let mut rng = StdRng::seed_from_u64(9);
        let mut tree = tree_with(PlasticTreeOptions::for_variant(TreeVariant::Plastic));
        for _ in 0..2000 {
            let inst = numeric_instance(&header, &[rng.random(), rng.random()], 1);
            tree.train_on_instance(&inst);
            assert!(!tree.did_perform_tree_revision());
        }
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_revision_flag_only_covers_the_last_instance() {
        let header = header_numeric(2);
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = tree_with(PlasticTreeOptions::for_variant(TreeVariant::HoeffdingTree));
        let mut revisions = 0;
        for _ in 0..600 {
            tree.train_on_instance(&informative_instance(&header, &mut rng));
            if tree.did_perform_tree_revision() {
                revisions += 1;
            }
        }
        assert_eq!(revisions, 1);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.training_weight_seen_by_model(), 600.0);
    }

    #[test]
    fn test_max_depth_is_never_exceeded() {
        let header = header_nominal(&[5, 5, 5]);
        for variant in [
            TreeVariant::HoeffdingTree,
            TreeVariant::Efdt,
            TreeVariant::Plastic,
            TreeVariant::AdaptivePlastic,
        ] {
            let mut options = PlasticTreeOptions::for_variant(variant);
            options.max_depth = 1;
            options.grace_period = 50;
            options.reevaluation_period = 50;
            let mut tree = tree_with(options);
            let mut rng = StdRng::seed_from_u64(5);

            for _ in 0..6000 {
                let values = [
                    rng.random_range(0..5usize),
                    rng.random_range(0..5usize),
                    rng.random_range(0..5usize),
                ];
                // needs a second level below the root split
                let class = usize::from(values[0] >= 2 && values[1] < 3);
                tree.train_on_instance(&nominal_instance(&header, &values, class));
                assert!(tree.depth() <= 1, "{variant} grew to depth {}", tree.depth());
            }
            assert_eq!(tree.depth(), 1, "{variant} never split");
            assert_leaf_invariant(&tree);
        }
    }

    #[test]
    fn test_dump_and_model_measurements_describe_the_tree() {
        let header = header_numeric(2);
        let mut rng = StdRng::seed_from_u64(1);
        let mut tree = tree_with(PlasticTreeOptions::for_variant(TreeVariant::HoeffdingTree));
        for _ in 0..400 {
            tree.train_on_instance(&informative_instance(&header, &mut rng));
        }

        let dump = tree.to_string();
        assert!(dump.contains("split on attribute 0 (2 successors)"), "{dump}");
        assert_eq!(dump.matches(" leaf class=").count(), 2);

        let measurements = tree.model_measurements();
        let value = |name: &str| {
            measurements
                .iter()
                .find(|m| m.name == name)
                .map(|m| m.value)
        };
        assert_eq!(value("tree_nodes"), Some(3.0));
        assert_eq!(value("tree_leaves"), Some(2.0));
        assert_eq!(value("promotions"), None);
        assert!(tree.calc_memory_size() > size_of::<PlasticTree>());
    }

    #[test]
    fn test_binary_nominal_split_keeps_a_default_branch() {
        let header = header_nominal(&[4, 2]);
        let mut rng = StdRng::seed_from_u64(21);
        let mut options = PlasticTreeOptions::for_variant(TreeVariant::HoeffdingTree);
        options.binary_splits = true;
        let mut tree = tree_with(options);
        for _ in 0..1000 {
            let a0 = rng.random_range(0..4usize);
            let a1 = rng.random_range(0..2usize);
            tree.train_on_instance(&nominal_instance(&header, &[a0, a1], (a0 == 2) as usize));
        }
        assert_leaf_invariant(&tree);

        let root = &tree.arena[tree.root().unwrap()];
        assert_eq!(root.split_attribute(), Some(0));
        let successors = root.successors().unwrap();
        assert!(successors.is_binary() && !successors.is_numeric());
        assert_eq!(successors.len(), 2);
        assert!(successors.keys().any(|k| k.is_default()));
        assert!(successors.keys().any(|k| k.selector_value() == 2.0));

        for (a0, class) in [(0, 0), (1, 0), (2, 1), (3, 0)] {
            let votes = tree.get_votes_for_instance(&nominal_instance(&header, &[a0, 0], class));
            assert_eq!(Node::majority_class(&votes), Some(class), "value {a0}");
        }
    }
}
