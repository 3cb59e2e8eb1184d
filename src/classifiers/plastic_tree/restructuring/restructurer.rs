use crate::classifiers::conditional_tests::AttributeSplitSuggestion;
use crate::classifiers::plastic_tree::instance_conditional_test::{
    InstanceConditionalTest, NumericAttributeBinaryTest,
};
use crate::classifiers::plastic_tree::nodes::{Node, NodeArena, NodeId};
use crate::classifiers::plastic_tree::options::PlasticTreeOptions;
use crate::classifiers::plastic_tree::restructuring::branch::{
    Branch, DecoupledBranch, TreeElement,
};
use crate::classifiers::plastic_tree::split_criteria::SplitCriterion;
use crate::classifiers::plastic_tree::splitting::{branches_of, distribution_for_key};
use crate::classifiers::plastic_tree::successors::{SuccessorIdentifier, Successors};
use log::debug;
use std::collections::{BTreeSet, VecDeque};

/// Empty successor table with the layout a split test produces.
fn layout_of(test: &dyn InstanceConditionalTest) -> Successors {
    if test.is_numeric() {
        Successors::new(true, true, test.split_value())
    } else if test.is_binary() {
        Successors::new(true, false, test.split_value())
    } else {
        Successors::new(false, false, None)
    }
}

/// Key of the placeholder branch used when a forced split yields nothing.
fn placeholder_key(test: &dyn InstanceConditionalTest) -> SuccessorIdentifier {
    match (test.is_numeric(), test.is_binary(), test.split_value()) {
        (true, _, Some(threshold)) => SuccessorIdentifier::numeric(threshold, true),
        (false, true, Some(value)) => SuccessorIdentifier::nominal(value),
        _ => SuccessorIdentifier::nominal(0.0),
    }
}

/// What [`Restructurer::restructure`] did to the subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestructureOutcome {
    /// The suggestion describes the split already installed.
    Unchanged,
    /// The subtree now splits on the suggestion.
    Restructured,
}

/// Reorders a subtree so that a new split attribute ends up at its top while
/// the routing below stays as it was.
///
/// The subtree is cut into branches that end at a leaf, at a node already
/// splitting on the new attribute, or after `max_branch_length` nodes. Every
/// tail is made to split on the new attribute, the tail split is moved to the
/// front of each branch and the branches are merged again. Copied interior
/// nodes lose their statistics; untouched subtrees keep theirs.
pub struct Restructurer<'a> {
    arena: &'a mut NodeArena,
    criterion: &'a dyn SplitCriterion,
    options: &'a PlasticTreeOptions,
    max_branch_length: usize,
    accepted_deviation: f64,
    created: Vec<NodeId>,
}

impl<'a> Restructurer<'a> {
    pub fn new(
        arena: &'a mut NodeArena,
        criterion: &'a dyn SplitCriterion,
        options: &'a PlasticTreeOptions,
        max_branch_length: usize,
        accepted_deviation: f64,
    ) -> Self {
        Self {
            arena,
            criterion,
            options,
            max_branch_length: max_branch_length.max(1),
            accepted_deviation,
            created: Vec::new(),
        }
    }

    /// Installs `suggestion` at `root` by reordering its subtree. Returns
    /// `None`, without touching the tree, when `root` is a leaf or when the
    /// suggestion re-splits the installed nominal attribute differently.
    pub fn restructure(
        &mut self,
        root: NodeId,
        suggestion: &AttributeSplitSuggestion,
    ) -> Option<RestructureOutcome> {
        let node = self.arena.get(root)?;
        if node.is_leaf() {
            return None;
        }
        let candidate = suggestion.split_test()?;
        let current = node.split_test()?;
        if current.attribute_index() == candidate.attribute_index() {
            return self.resplit_same_attribute(root, candidate);
        }

        let before = self.reachable_from(root);
        let template = self.copy_of(root);
        let branches = self.collect_branches(root, candidate.attribute_index());

        let mut decoupled = Vec::new();
        for branch in &branches {
            let Some(tail) = branch.tail() else {
                continue;
            };
            self.expand_tail(tail, candidate);
            decoupled.extend(self.decouple(branch));
        }

        self.reassemble(root, template, candidate, &decoupled);
        let depth = self.arena[root].depth;
        self.renumber_depths(root, depth);
        self.refresh_split_context(root);
        self.reset_restructured(root);
        self.seed_successors(root, suggestion);
        self.final_prune(root);
        self.free_unreachable(root, before);
        Some(RestructureOutcome::Restructured)
    }

    fn resplit_same_attribute(
        &mut self,
        root: NodeId,
        candidate: &dyn InstanceConditionalTest,
    ) -> Option<RestructureOutcome> {
        let current = self.arena[root].split_test()?;
        if current.is_numeric() && candidate.is_numeric() {
            let threshold = candidate.split_value()?;
            if current.split_value() == Some(threshold) {
                return Some(RestructureOutcome::Unchanged);
            }
            self.update_threshold(root, threshold, true);
            self.reset_restructured(root);
            return Some(RestructureOutcome::Restructured);
        }
        let same_layout = !current.is_numeric()
            && !candidate.is_numeric()
            && current.is_binary() == candidate.is_binary()
            && current.split_value() == candidate.split_value();
        same_layout.then_some(RestructureOutcome::Unchanged)
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = self.arena.insert(node);
        self.created.push(id);
        id
    }

    fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let copy = self.arena.clone_subtree(id)?;
        let copied = self.subtree(copy);
        self.created.extend(copied);
        Some(copy)
    }

    /// The node without successors, background or history, flagged so its
    /// statistics get reset once the new layout is in place.
    fn copy_of(&self, id: NodeId) -> Node {
        let mut copy = self.arena[id].clone();
        copy.successors = copy.successors.as_ref().map(Successors::empty_like);
        copy.background = None;
        copy.is_artificial = false;
        copy.restructured = true;
        copy
    }

    fn new_artificial_leaf(
        &self,
        parent: NodeId,
        test: &dyn InstanceConditionalTest,
        class_distribution: Vec<f64>,
    ) -> Node {
        let mut leaf = self.arena[parent].new_child(
            test,
            self.options.block_parent_attribute,
            class_distribution,
        );
        leaf.change_detector = self.options.new_change_detector();
        leaf.is_artificial = true;
        leaf
    }

    fn subtree(&self, id: NodeId) -> Vec<NodeId> {
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

    /// Nodes below `id`, background subtrees included.
    fn reachable_from(&self, id: NodeId) -> BTreeSet<NodeId> {
        let mut found = BTreeSet::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let Some(node) = self.arena.get(current) else {
                continue;
            };
            if found.insert(current) {
                pending.extend(node.children());
                pending.extend(node.background);
            }
        }
        found
    }

    fn collect_branches(&self, root: NodeId, attribute: usize) -> Vec<Branch> {
        let mut queue: VecDeque<Branch> = self.arena[root]
            .successors()
            .map(|s| {
                s.keys()
                    .map(|key| Branch::new(TreeElement::new(root, key)))
                    .collect()
            })
            .unwrap_or_default();

        let mut finished = Vec::new();
        while let Some(branch) = queue.pop_front() {
            let Some(&TreeElement {
                node,
                key: Some(key),
            }) = branch.last()
            else {
                continue;
            };
            let Some(child) = self.arena[node]
                .successors()
                .and_then(|s| s.get_successor_node(&key))
            else {
                continue;
            };

            let child_node = &self.arena[child];
            if child_node.is_leaf()
                || child_node.split_attribute() == Some(attribute)
                || branch.len() + 1 >= self.max_branch_length
            {
                finished.push(branch.extended(TreeElement::tail(child)));
            } else if let Some(successors) = child_node.successors() {
                for key in successors.keys() {
                    queue.push_back(branch.extended(TreeElement::new(child, key)));
                }
            }
        }
        finished
    }

    /// Makes a branch tail split on `candidate`.
    fn expand_tail(&mut self, tail: NodeId, candidate: &dyn InstanceConditionalTest) {
        let same_attribute = self.arena[tail].split_attribute() == Some(candidate.attribute_index());
        if !same_attribute {
            self.force_split(tail, candidate);
        } else if candidate.is_numeric() {
            self.expand_numeric_tail(tail, candidate);
        } else {
            self.expand_nominal_tail(tail, candidate);
        }
    }

    /// Class distributions `candidate` would produce at `id`, per branch.
    fn forced_branches(
        &self,
        id: NodeId,
        candidate: &dyn InstanceConditionalTest,
    ) -> Vec<(SuccessorIdentifier, Vec<f64>)> {
        let node = &self.arena[id];
        let attribute = candidate.attribute_index();
        let split_value = if candidate.is_binary() {
            candidate.split_value()
        } else {
            None
        };
        let fresh;
        let observer = match node.attribute_observers.get(attribute).and_then(Option::as_ref) {
            Some(observer) => observer,
            None => {
                fresh = self.options.new_observer(candidate.is_numeric());
                &fresh
            }
        };
        observer
            .force_split(
                self.criterion,
                node.observed_class_distribution(),
                attribute,
                split_value,
            )
            .and_then(|forced| branches_of(&forced, node.observed_class_distribution.len()))
            .map(|(_, branches)| branches)
            .unwrap_or_default()
    }

    /// Splits a leaf, or a node cut off by the branch length, on `candidate`.
    /// Internal nodes get a copy of their former subtree below every branch.
    fn force_split(&mut self, id: NodeId, candidate: &dyn InstanceConditionalTest) {
        let mut branches = self.forced_branches(id, candidate);
        let mut placeholder = false;
        if branches.is_empty() {
            let num_classes = self.arena[id].observed_class_distribution.len();
            branches.push((placeholder_key(candidate), vec![0.0; num_classes]));
            placeholder = true;
        }

        let was_internal = !self.arena[id].is_leaf();
        let mut successors = layout_of(candidate);
        for (key, dist) in branches {
            let child = if was_internal {
                match self.clone_subtree(id) {
                    Some(child) => child,
                    None => continue,
                }
            } else {
                let leaf = self.new_artificial_leaf(id, candidate, dist);
                self.insert(leaf)
            };
            let child_node = &mut self.arena[child];
            child_node.is_artificial = true;
            child_node.is_dummy = placeholder;
            successors.force_successor_for_key(key, child);
        }

        let node = &mut self.arena[id];
        node.split_test = Some(candidate.clone_box());
        node.successors = Some(successors);
    }

    fn expand_numeric_tail(&mut self, id: NodeId, candidate: &dyn InstanceConditionalTest) {
        let Some(threshold) = candidate.split_value() else {
            return;
        };
        let Some(successors) = self.arena[id].successors() else {
            return;
        };
        if successors.reference_value() == Some(threshold) {
            return;
        }
        if successors.len() == 2 {
            self.update_threshold(id, threshold, false);
            return;
        }
        let Some(&(kept_key, kept)) = successors.entries().first() else {
            return;
        };

        let kept_key = kept_key.with_threshold(threshold);
        let missing_key = kept_key.other();
        let dist = self
            .forced_branches(id, candidate)
            .into_iter()
            .find(|(key, _)| *key == missing_key)
            .map(|(_, dist)| dist)
            .unwrap_or_else(|| vec![0.0; self.arena[id].observed_class_distribution.len()]);
        let leaf = self.new_artificial_leaf(id, candidate, dist);
        let leaf = self.insert(leaf);

        let mut table = layout_of(candidate);
        table.force_successor_for_key(kept_key, kept);
        table.force_successor_for_key(missing_key, leaf);
        let node = &mut self.arena[id];
        node.split_test = Some(candidate.clone_box());
        node.successors = Some(table);
    }

    /// Holder for a tail's previous nominal split, placed below the tail.
    fn holder_of(&self, id: NodeId, previous: Successors) -> Node {
        let mut holder = self.copy_of(id);
        holder.successors = Some(previous);
        holder.is_artificial = true;
        holder
    }

    fn expand_nominal_tail(&mut self, id: NodeId, candidate: &dyn InstanceConditionalTest) {
        let Some(current) = self.arena[id].split_test() else {
            return;
        };
        let current_value = current.split_value();
        match (current.is_binary(), candidate.is_binary()) {
            (false, false) => {}
            (true, true) if current_value == candidate.split_value() => {}
            (true, true) => {
                let (Some(value), Some(previous_value)) = (candidate.split_value(), current_value)
                else {
                    return;
                };
                // `value` used to be routed to the default branch
                let previous_default = self.arena[id].successors().and_then(|s| {
                    s.get_successor_node(&SuccessorIdentifier::nominal_default(previous_value))
                });
                let matching = match previous_default.and_then(|d| self.clone_subtree(d)) {
                    Some(copy) => copy,
                    None => {
                        let num_classes = self.arena[id].observed_class_distribution.len();
                        let leaf = self.new_artificial_leaf(id, candidate, vec![0.0; num_classes]);
                        self.insert(leaf)
                    }
                };
                let Some(previous) = self.arena[id].successors.take() else {
                    return;
                };
                let holder = self.holder_of(id, previous);
                let holder = self.insert(holder);
                self.install_binary(id, candidate, value, matching, holder);
            }
            (false, true) => {
                let Some(value) = candidate.split_value() else {
                    return;
                };
                let Some(mut previous) = self.arena[id].successors.take() else {
                    return;
                };
                let matching = match previous.remove_successor(&SuccessorIdentifier::nominal(value)) {
                    Some(child) => child,
                    None => {
                        let num_classes = self.arena[id].observed_class_distribution.len();
                        let leaf = self.new_artificial_leaf(id, candidate, vec![0.0; num_classes]);
                        self.insert(leaf)
                    }
                };
                let holder = self.holder_of(id, previous);
                let holder = self.insert(holder);
                self.install_binary(id, candidate, value, matching, holder);
            }
            (true, false) => {
                let Some(previous_value) = current_value else {
                    return;
                };
                let Some(successors) = self.arena[id].successors() else {
                    return;
                };
                let previous_match =
                    successors.get_successor_node(&SuccessorIdentifier::nominal(previous_value));
                let previous_default = successors
                    .get_successor_node(&SuccessorIdentifier::nominal_default(previous_value));

                let mut table = layout_of(candidate);
                if let Some(child) = previous_match {
                    table.force_successor_for_key(SuccessorIdentifier::nominal(previous_value), child);
                }
                if let Some(default) = previous_default {
                    for (key, _) in self.forced_branches(id, candidate) {
                        if key.selector_value() == previous_value {
                            continue;
                        }
                        if let Some(copy) = self.clone_subtree(default) {
                            table.force_successor_for_key(key, copy);
                        }
                    }
                }
                if table.is_empty() {
                    let num_classes = self.arena[id].observed_class_distribution.len();
                    let mut leaf = self.new_artificial_leaf(id, candidate, vec![0.0; num_classes]);
                    leaf.is_dummy = true;
                    let leaf = self.insert(leaf);
                    table.force_successor_for_key(placeholder_key(candidate), leaf);
                }
                let node = &mut self.arena[id];
                node.split_test = Some(candidate.clone_box());
                node.successors = Some(table);
            }
        }
    }

    fn install_binary(
        &mut self,
        id: NodeId,
        candidate: &dyn InstanceConditionalTest,
        value: f64,
        matching: NodeId,
        default: NodeId,
    ) {
        let mut table = layout_of(candidate);
        table.force_successor_for_key(SuccessorIdentifier::nominal(value), matching);
        table.force_successor_for_key(SuccessorIdentifier::nominal_default(value), default);
        let node = &mut self.arena[id];
        node.split_test = Some(candidate.clone_box());
        node.successors = Some(table);
    }

    fn decouple(&self, branch: &Branch) -> Vec<DecoupledBranch> {
        let Some(tail) = branch.tail() else {
            return Vec::new();
        };
        let Some(successors) = self.arena[tail].successors() else {
            return Vec::new();
        };
        successors
            .entries()
            .iter()
            .map(|&(root_key, terminal)| DecoupledBranch {
                root_key,
                path: branch.interior().to_vec(),
                terminal,
            })
            .collect()
    }

    /// Rebuilds the subtree below `root` from decoupled branches, reusing
    /// copies where branches share a prefix.
    fn reassemble(
        &mut self,
        root: NodeId,
        template: Node,
        candidate: &dyn InstanceConditionalTest,
        decoupled: &[DecoupledBranch],
    ) {
        let node = &mut self.arena[root];
        node.split_test = Some(candidate.clone_box());
        node.successors = Some(layout_of(candidate));

        for branch in decoupled {
            let mut current = root;
            let mut key = branch.root_key;
            for element in &branch.path {
                let Some(element_key) = element.key else {
                    continue;
                };
                let existing = self.arena[current]
                    .successors()
                    .and_then(|s| s.get_successor_node(&key));
                let next = match existing {
                    Some(next) => next,
                    None => {
                        let copy = if element.node == root {
                            template.clone()
                        } else {
                            self.copy_of(element.node)
                        };
                        let copy = self.insert(copy);
                        if let Some(successors) = self.arena[current].successors.as_mut() {
                            successors.force_successor_for_key(key, copy);
                        }
                        copy
                    }
                };
                current = next;
                key = element_key;
            }
            if let Some(successors) = self.arena[current].successors.as_mut() {
                successors.force_successor_for_key(key, branch.terminal);
            }
        }
    }

    fn renumber_depths(&mut self, id: NodeId, depth: usize) {
        let node = &mut self.arena[id];
        node.depth = depth;
        let background = node.background;
        let children: Vec<NodeId> = node.children().collect();
        if let Some(background) = background {
            self.renumber_depths(background, depth);
        }
        for child in children {
            self.renumber_depths(child, depth + 1);
        }
    }

    /// Recomputes the attributes each node inherits from its ancestors.
    fn refresh_split_context(&mut self, id: NodeId) {
        let node = &self.arena[id];
        let background = node.background;
        let inherited = (node.used_nominal_attributes.clone(), node.blocked_attribute);
        let context = node
            .split_test()
            .map(|test| node.context_for_children(test, self.options.block_parent_attribute));
        let children: Vec<NodeId> = node.children().collect();

        if let Some(background) = background {
            let background = &mut self.arena[background];
            background.used_nominal_attributes = inherited.0;
            background.blocked_attribute = inherited.1;
        }
        let Some((used, blocked)) = context else {
            return;
        };
        for child in children {
            let child_node = &mut self.arena[child];
            child_node.used_nominal_attributes = used.clone();
            child_node.blocked_attribute = blocked;
            self.refresh_split_context(child);
        }
    }

    /// Forgets the statistics of every node flagged as restructured. Leaves
    /// keep their class distribution.
    fn reset_restructured(&mut self, id: NodeId) {
        for node_id in self.subtree(id) {
            let node = &mut self.arena[node_id];
            if !node.restructured {
                continue;
            }
            let kept = node
                .is_leaf()
                .then(|| node.observed_class_distribution.clone());
            node.reset_statistics();
            if let Some(kept) = kept {
                node.observed_class_distribution = kept;
            }
            node.restructured = false;
            if let Some(background) = node.clear_drift_state() {
                self.arena.remove_subtree(background);
            }
        }
    }

    fn seed_successors(&mut self, root: NodeId, suggestion: &AttributeSplitSuggestion) {
        let node = &self.arena[root];
        let num_classes = node.observed_class_distribution.len();
        let entries: Vec<_> = node
            .successors()
            .map(|s| s.entries().to_vec())
            .unwrap_or_default();
        for (key, child) in entries {
            let dist = distribution_for_key(suggestion, &key, num_classes);
            let child = &mut self.arena[child];
            child.class_distribution_at_creation = dist.clone();
            child.observed_class_distribution = dist;
        }
    }

    fn leaf_distribution_sum(&self, id: NodeId) -> Vec<f64> {
        let mut sum = vec![0.0; self.arena[id].observed_class_distribution.len()];
        for node_id in self.subtree(id) {
            let node = &self.arena[node_id];
            if !node.is_leaf() {
                continue;
            }
            if node.observed_class_distribution.len() > sum.len() {
                sum.resize(node.observed_class_distribution.len(), 0.0);
            }
            for (total, w) in sum.iter_mut().zip(&node.observed_class_distribution) {
                *total += w;
            }
        }
        sum
    }

    fn collapse(&mut self, id: NodeId) {
        let sum = self.leaf_distribution_sum(id);
        let node = &mut self.arena[id];
        node.observed_class_distribution = sum;
        if let Some(previous) = node.set_leaf() {
            for child in previous.nodes() {
                self.arena.remove_subtree(child);
            }
        }
    }

    /// Every successor is a pure leaf and they all predict the same class.
    fn successors_agree(&self, id: NodeId) -> bool {
        let mut majority = None;
        for child in self.arena[id].children() {
            let child = &self.arena[child];
            if !child.is_leaf() || !child.observed_class_distribution_is_pure() {
                return false;
            }
            let class = Node::majority_class(child.observed_class_distribution());
            if majority.is_some_and(|m| m != class) {
                return false;
            }
            majority = Some(class);
        }
        majority.is_some()
    }

    fn final_prune(&mut self, id: NodeId) {
        let node = &mut self.arena[id];
        node.is_artificial = false;

        let children: Vec<_> = node
            .successors()
            .map(|s| s.entries().to_vec())
            .unwrap_or_default();
        for (key, child) in children {
            if self.arena[child].is_dummy {
                if let Some(successors) = self.arena[id].successors.as_mut() {
                    successors.remove_successor(&key);
                }
                self.arena.remove_subtree(child);
            }
        }

        let node = &mut self.arena[id];
        if node.is_leaf() {
            node.set_leaf();
            return;
        }
        if node.depth >= self.options.max_depth || self.successors_agree(id) {
            self.collapse(id);
            return;
        }
        let children: Vec<NodeId> = self.arena[id].children().collect();
        for child in children {
            self.final_prune(child);
        }
    }

    fn free_unreachable(&mut self, root: NodeId, before: BTreeSet<NodeId>) {
        let after = self.reachable_from(root);
        let candidates: BTreeSet<NodeId> = before
            .into_iter()
            .chain(self.created.drain(..))
            .collect();
        for id in candidates {
            if after.contains(&id) {
                continue;
            }
            if let Some(node) = self.arena.remove(id) {
                if let Some(background) = node.background.filter(|b| !after.contains(b)) {
                    self.arena.remove_subtree(background);
                }
            }
        }
    }

    /// Moves the threshold of a numeric split and drops the branches below it
    /// that can no longer be reached. With `flag` set, a move larger than the
    /// accepted deviation marks the internal nodes below for a reset.
    pub fn update_threshold(&mut self, id: NodeId, threshold: f64, flag: bool) {
        let node = &mut self.arena[id];
        let Some(test) = node.split_test() else {
            return;
        };
        if !test.is_numeric() {
            return;
        }
        let attribute = test.attribute_index();
        let previous = test.split_value().unwrap_or(threshold);
        let moved = node
            .successors
            .as_mut()
            .is_some_and(|s| s.adjust_threshold(threshold));
        if !moved {
            return;
        }
        node.split_test = Some(Box::new(NumericAttributeBinaryTest::new(
            attribute, threshold,
        )));

        let entries: Vec<_> = node
            .successors()
            .map(|s| s.entries().to_vec())
            .unwrap_or_default();
        for (key, child) in entries {
            self.remove_unreachable(child, attribute, threshold, key.is_lower());
        }

        if flag && (threshold - previous).abs() > self.accepted_deviation {
            for node_id in self.subtree(id) {
                let node = &mut self.arena[node_id];
                if node_id != id && !node.is_leaf() {
                    node.restructured = true;
                }
            }
        }
        debug!("moved threshold of {id:?} from {previous} to {threshold}");
    }

    /// Drops successors that a value on the `lower_side` of `threshold` on
    /// `attribute` can never reach.
    fn remove_unreachable(&mut self, id: NodeId, attribute: usize, threshold: f64, lower_side: bool) {
        let node = &mut self.arena[id];
        if node.is_leaf() {
            return;
        }
        let reference = node
            .split_test()
            .filter(|t| t.is_numeric() && t.attribute_index() == attribute)
            .and_then(|t| t.split_value());
        if let Some(reference) = reference {
            let unreachable = if lower_side && reference >= threshold {
                Some(SuccessorIdentifier::numeric(reference, false))
            } else if !lower_side && reference <= threshold {
                Some(SuccessorIdentifier::numeric(reference, true))
            } else {
                None
            };
            let removed = unreachable.and_then(|key| {
                node.successors
                    .as_mut()
                    .and_then(|s| s.remove_successor(&key))
            });
            if node.is_leaf() {
                node.set_leaf();
            }
            if let Some(removed) = removed {
                self.arena.remove_subtree(removed);
            }
        }

        let children: Vec<NodeId> = self.arena[id].children().collect();
        for child in children {
            self.remove_unreachable(child, attribute, threshold, lower_side);
        }
    }
}
