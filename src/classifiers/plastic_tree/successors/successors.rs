use crate::classifiers::plastic_tree::nodes::NodeId;
use crate::classifiers::plastic_tree::successors::successor_identifier::{
    DEFAULT_NOMINAL_VALUE, SuccessorIdentifier,
};

/// Outcome of inserting into a [`Successors`] table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuccessorAddResult {
    Added,
    ModeMismatch,
    CardinalityExceeded,
    ReferenceMismatch,
    DuplicateKey,
}

impl SuccessorAddResult {
    pub fn is_added(self) -> bool {
        self == SuccessorAddResult::Added
    }
}

/// Branching table of an internal node.
///
/// Binary tables (numeric lower/upper, nominal value/default) hold at most
/// two entries sharing one reference value; multiway nominal tables hold one
/// entry per observed value. Entries keep insertion order.
#[derive(Clone, Debug)]
pub struct Successors {
    is_binary: bool,
    is_numeric: bool,
    reference_value: Option<f64>,
    entries: Vec<(SuccessorIdentifier, NodeId)>,
}

impl Successors {
    pub fn new(is_binary: bool, is_numeric: bool, reference_value: Option<f64>) -> Self {
        Self {
            is_binary: is_binary || is_numeric,
            is_numeric,
            reference_value,
            entries: Vec::new(),
        }
    }

    /// Same layout and reference value, no entries.
    pub fn empty_like(&self) -> Self {
        Self::new(self.is_binary, self.is_numeric, self.reference_value)
    }

    pub fn is_binary(&self) -> bool {
        self.is_binary
    }

    pub fn is_numeric(&self) -> bool {
        self.is_numeric
    }

    pub fn reference_value(&self) -> Option<f64> {
        self.reference_value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &SuccessorIdentifier) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = SuccessorIdentifier> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.iter().map(|(_, n)| *n)
    }

    pub fn entries(&self) -> &[(SuccessorIdentifier, NodeId)] {
        &self.entries
    }

    /// Generic insertion used when rebuilding tables from existing keys.
    pub fn add_successor(&mut self, node: NodeId, key: SuccessorIdentifier) -> SuccessorAddResult {
        if key.is_numeric() != self.is_numeric {
            return SuccessorAddResult::ModeMismatch;
        }
        if self.is_binary && self.entries.len() >= 2 {
            return SuccessorAddResult::CardinalityExceeded;
        }
        if self.is_binary
            && self
                .reference_value
                .is_some_and(|r| r != key.reference_value())
        {
            return SuccessorAddResult::ReferenceMismatch;
        }
        if self.contains(&key) {
            return SuccessorAddResult::DuplicateKey;
        }
        if self.is_binary {
            self.reference_value = Some(key.reference_value());
        }
        self.entries.push((key, node));
        SuccessorAddResult::Added
    }

    pub fn add_successor_numeric(
        &mut self,
        threshold: f64,
        node: NodeId,
        is_lower: bool,
    ) -> SuccessorAddResult {
        if !self.is_numeric {
            return SuccessorAddResult::ModeMismatch;
        }
        self.add_successor(node, SuccessorIdentifier::numeric(threshold, is_lower))
    }

    /// Adds the branch for `value` of a nominal binary split. Once only the
    /// default branch exists, `value` must equal the split's reference.
    pub fn add_successor_nominal_binary(&mut self, value: f64, node: NodeId) -> SuccessorAddResult {
        if self.is_numeric || !self.is_binary {
            return SuccessorAddResult::ModeMismatch;
        }
        if self.entries.len() == 1
            && self.entries[0].0.is_default()
            && self.reference_value != Some(value)
        {
            return SuccessorAddResult::ReferenceMismatch;
        }
        self.add_successor(node, SuccessorIdentifier::nominal(value))
    }

    pub fn add_default_successor_nominal_binary(&mut self, node: NodeId) -> SuccessorAddResult {
        if self.is_numeric || !self.is_binary {
            return SuccessorAddResult::ModeMismatch;
        }
        let reference = self.reference_value.unwrap_or(DEFAULT_NOMINAL_VALUE);
        self.add_successor(node, SuccessorIdentifier::nominal_default(reference))
    }

    pub fn add_successor_nominal_multiway(&mut self, value: f64, node: NodeId) -> SuccessorAddResult {
        if self.is_numeric || self.is_binary {
            return SuccessorAddResult::ModeMismatch;
        }
        self.add_successor(node, SuccessorIdentifier::nominal(value))
    }

    /// Inserts `node` under `key` through the insertion rule of this table's
    /// layout.
    pub fn add_branch(&mut self, key: SuccessorIdentifier, node: NodeId) -> SuccessorAddResult {
        if key.is_numeric() {
            self.add_successor_numeric(key.reference_value(), node, key.is_lower())
        } else if !self.is_binary {
            self.add_successor_nominal_multiway(key.selector_value(), node)
        } else if key.is_default() {
            if self.reference_value.is_some_and(|r| r != key.reference_value()) {
                return SuccessorAddResult::ReferenceMismatch;
            }
            self.add_default_successor_nominal_binary(node)
        } else {
            self.add_successor_nominal_binary(key.selector_value(), node)
        }
    }

    pub fn get_successor_node(&self, key: &SuccessorIdentifier) -> Option<NodeId> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, n)| *n)
    }

    /// Key whose branch an attribute value is routed to, falling back to the
    /// nominal default branch.
    pub fn key_for_value(&self, value: f64) -> Option<SuccessorIdentifier> {
        if value.is_nan() {
            return None;
        }
        self.entries
            .iter()
            .find(|(k, _)| k.matches(value))
            .or_else(|| self.entries.iter().find(|(k, _)| k.is_default()))
            .map(|(k, _)| *k)
    }

    pub fn get_successor_node_for_value(&self, value: f64) -> Option<NodeId> {
        self.key_for_value(value)
            .and_then(|k| self.get_successor_node(&k))
    }

    /// Moves every numeric key to `new_threshold`. Returns `false` (and
    /// changes nothing) if the table is nominal or already at that threshold.
    pub fn adjust_threshold(&mut self, new_threshold: f64) -> bool {
        if !self.is_numeric || self.reference_value == Some(new_threshold) {
            return false;
        }
        for (key, _) in self.entries.iter_mut() {
            *key = key.with_threshold(new_threshold);
        }
        self.reference_value = Some(new_threshold);
        true
    }

    /// Inserts or replaces the entry for `key` without layout checks.
    pub fn force_successor_for_key(&mut self, key: SuccessorIdentifier, node: NodeId) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = node,
            None => self.entries.push((key, node)),
        }
    }

    pub fn remove_successor(&mut self, key: &SuccessorIdentifier) -> Option<NodeId> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }
}
