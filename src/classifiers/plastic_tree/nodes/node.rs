use crate::classifiers::attribute_class_observers::AttributeClassObserver;
use crate::classifiers::plastic_tree::drift::ChangeDetector;
use crate::classifiers::plastic_tree::instance_conditional_test::{
    InstanceConditionalTest, tested_value,
};
use crate::classifiers::plastic_tree::nodes::NodeId;
use crate::classifiers::plastic_tree::successors::{SuccessorIdentifier, Successors};
use crate::core::instances::Instance;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Predictions older than this are dropped when nothing consumes them.
const MAX_PENDING_PREDICTIONS: usize = 1024;

/// One tree node. Leaves have no split test and no successors; internal
/// nodes keep learning statistics so their split can be re-evaluated.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) depth: usize,
    pub(crate) seen_weight: f64,
    pub(crate) node_time: u64,
    pub(crate) observed_class_distribution: Vec<f64>,
    pub(crate) class_distribution_at_creation: Vec<f64>,
    /// Indexed by model attribute index.
    pub(crate) attribute_observers: Vec<Option<Box<dyn AttributeClassObserver>>>,
    pub(crate) split_test: Option<Box<dyn InstanceConditionalTest>>,
    pub(crate) successors: Option<Successors>,
    pub(crate) used_nominal_attributes: BTreeSet<usize>,
    pub(crate) blocked_attribute: Option<usize>,
    pub(crate) num_split_attempts: u64,
    /// Accumulated merit per attribute; `None` is the null split.
    pub(crate) infogain_sum: BTreeMap<Option<usize>, f64>,

    pub(crate) is_artificial: bool,
    pub(crate) is_dummy: bool,
    pub(crate) restructured: bool,

    pub(crate) change_detector: Option<Box<dyn ChangeDetector>>,
    pub(crate) pending_predictions: RefCell<VecDeque<usize>>,
    pub(crate) background: Option<NodeId>,
}

impl Node {
    pub fn new_leaf(depth: usize, class_distribution: Vec<f64>) -> Self {
        let seen_weight = 0.0;
        let mut infogain_sum = BTreeMap::new();
        infogain_sum.insert(None, 0.0);
        Self {
            depth,
            seen_weight,
            node_time: 0,
            class_distribution_at_creation: class_distribution.clone(),
            observed_class_distribution: class_distribution,
            attribute_observers: Vec::new(),
            split_test: None,
            successors: None,
            used_nominal_attributes: BTreeSet::new(),
            blocked_attribute: None,
            num_split_attempts: 0,
            infogain_sum,
            is_artificial: false,
            is_dummy: false,
            restructured: false,
            change_detector: None,
            pending_predictions: RefCell::new(VecDeque::new()),
            background: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.successors.as_ref().is_none_or(Successors::is_empty)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn observed_class_distribution(&self) -> &[f64] {
        &self.observed_class_distribution
    }

    pub fn split_test(&self) -> Option<&dyn InstanceConditionalTest> {
        self.split_test.as_deref()
    }

    pub fn successors(&self) -> Option<&Successors> {
        self.successors.as_ref()
    }

    pub fn background(&self) -> Option<NodeId> {
        self.background
    }

    pub fn split_attribute(&self) -> Option<usize> {
        self.split_test().map(|t| t.attribute_index())
    }

    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.successors.iter().flat_map(Successors::nodes)
    }

    pub fn num_non_zero_entries(dist: &[f64]) -> usize {
        dist.iter().filter(|&&x| x != 0.0).count()
    }

    pub fn observed_class_distribution_is_pure(&self) -> bool {
        Self::num_non_zero_entries(&self.observed_class_distribution) < 2
    }

    /// Index of the largest class weight, the lowest index on ties.
    pub fn majority_class(dist: &[f64]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &w) in dist.iter().enumerate() {
            if best.is_none_or(|(_, b)| w > b) {
                best = Some((i, w));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Key of the branch an instance takes, `None` when the tested value is
    /// missing or the node is a leaf.
    pub fn successor_key(&self, instance: &dyn Instance) -> Option<SuccessorIdentifier> {
        let test = self.split_test.as_ref()?;
        let value = tested_value(instance, test.attribute_index())?;
        match self.successors.as_ref()?.key_for_value(value) {
            Some(key) => Some(key),
            None => Self::key_for_unseen_value(self.successors.as_ref()?, value),
        }
    }

    /// Key under which a missing branch for `value` would be created.
    fn key_for_unseen_value(successors: &Successors, value: f64) -> Option<SuccessorIdentifier> {
        let reference = successors.reference_value();
        if successors.is_numeric() {
            let threshold = reference?;
            Some(SuccessorIdentifier::numeric(threshold, value < threshold))
        } else if successors.is_binary() {
            let reference = reference?;
            if value == reference {
                Some(SuccessorIdentifier::nominal(value))
            } else {
                Some(SuccessorIdentifier::nominal_default(reference))
            }
        } else {
            Some(SuccessorIdentifier::nominal(value))
        }
    }

    /// Nominal attributes used above the children of a split on `test`, and
    /// the attribute the children are kept from splitting on.
    pub(crate) fn context_for_children(
        &self,
        test: &dyn InstanceConditionalTest,
        block_parent_attribute: bool,
    ) -> (BTreeSet<usize>, Option<usize>) {
        let mut used = self.used_nominal_attributes.clone();
        if !test.is_numeric() {
            used.insert(test.attribute_index());
        }
        (used, block_parent_attribute.then(|| test.attribute_index()))
    }

    /// A leaf one level below this node, as created by a split on `test`.
    pub(crate) fn new_child(
        &self,
        test: &dyn InstanceConditionalTest,
        block_parent_attribute: bool,
        class_distribution: Vec<f64>,
    ) -> Node {
        let mut child = Node::new_leaf(self.depth + 1, class_distribution);
        let (used, blocked) = self.context_for_children(test, block_parent_attribute);
        child.used_nominal_attributes = used;
        child.blocked_attribute = blocked;
        child
    }

    pub fn successor_for_instance(&self, instance: &dyn Instance) -> Option<NodeId> {
        let test = self.split_test.as_ref()?;
        let value = tested_value(instance, test.attribute_index())?;
        self.successors.as_ref()?.get_successor_node_for_value(value)
    }

    /// Turns the node into a leaf without touching its statistics. The
    /// caller is responsible for freeing the former successors.
    pub fn set_leaf(&mut self) -> Option<Successors> {
        self.split_test = None;
        self.successors.take()
    }

    pub fn record_prediction(&self, class: usize) {
        let mut pending = self.pending_predictions.borrow_mut();
        if pending.len() == MAX_PENDING_PREDICTIONS {
            pending.pop_front();
        }
        pending.push_back(class);
    }

    pub fn take_pending_prediction(&self) -> Option<usize> {
        self.pending_predictions.borrow_mut().pop_front()
    }

    /// Forgets everything learned, keeping position, layout and flags.
    pub fn reset_statistics(&mut self) {
        self.observed_class_distribution.iter_mut().for_each(|w| *w = 0.0);
        for observer in self.attribute_observers.iter_mut().flatten() {
            *observer = observer.new_empty();
        }
        self.seen_weight = 0.0;
        self.node_time = 0;
        self.num_split_attempts = 0;
        self.reset_infogain_tracking();
    }

    pub fn reset_infogain_tracking(&mut self) {
        self.infogain_sum.values_mut().for_each(|v| *v = 0.0);
        self.num_split_attempts = 0;
    }

    /// Drops the background reference and restarts the error monitor.
    /// Returns the dropped background so the caller can free it.
    pub fn clear_drift_state(&mut self) -> Option<NodeId> {
        if let Some(detector) = self.change_detector.as_mut() {
            *detector = detector.new_empty();
        }
        self.pending_predictions.borrow_mut().clear();
        self.background.take()
    }

    pub fn calc_memory_size(&self) -> usize {
        let mut total = size_of::<Self>();
        total += self.observed_class_distribution.capacity() * size_of::<f64>();
        total += self.class_distribution_at_creation.capacity() * size_of::<f64>();
        total += self.attribute_observers.capacity()
            * size_of::<Option<Box<dyn AttributeClassObserver>>>();
        total += self
            .attribute_observers
            .iter()
            .flatten()
            .map(|o| o.calc_memory_size())
            .sum::<usize>();
        if let Some(test) = &self.split_test {
            total += test.calc_memory_size();
        }
        if let Some(successors) = &self.successors {
            total += successors.len() * size_of::<(SuccessorIdentifier, NodeId)>();
        }
        total += self.used_nominal_attributes.len() * size_of::<usize>();
        total += self.infogain_sum.len() * size_of::<(Option<usize>, f64)>();
        if let Some(detector) = &self.change_detector {
            total += detector.calc_memory_size();
        }
        total += self.pending_predictions.borrow().capacity() * size_of::<usize>();
        total
    }
}
