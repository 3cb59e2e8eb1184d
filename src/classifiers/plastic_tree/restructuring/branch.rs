use crate::classifiers::plastic_tree::nodes::NodeId;
use crate::classifiers::plastic_tree::successors::SuccessorIdentifier;

/// One step of a branch: a node and the key the branch leaves it through.
/// The tail of a branch has no key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeElement {
    pub node: NodeId,
    pub key: Option<SuccessorIdentifier>,
}

impl TreeElement {
    pub fn new(node: NodeId, key: SuccessorIdentifier) -> Self {
        Self {
            node,
            key: Some(key),
        }
    }

    pub fn tail(node: NodeId) -> Self {
        Self { node, key: None }
    }

    pub fn is_tail(&self) -> bool {
        self.key.is_none()
    }
}

/// Path from the node being restructured down to a terminal node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Branch {
    elements: Vec<TreeElement>,
}

impl Branch {
    pub fn new(first: TreeElement) -> Self {
        Self {
            elements: vec![first],
        }
    }

    /// This branch followed by one more element.
    pub fn extended(&self, element: TreeElement) -> Self {
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.extend_from_slice(&self.elements);
        elements.push(element);
        Self { elements }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[TreeElement] {
        &self.elements
    }

    pub fn last(&self) -> Option<&TreeElement> {
        self.elements.last()
    }

    /// The terminal node, once the branch is finished.
    pub fn tail(&self) -> Option<NodeId> {
        self.last().filter(|e| e.is_tail()).map(|e| e.node)
    }

    /// Every element but the tail.
    pub fn interior(&self) -> &[TreeElement] {
        match self.elements.split_last() {
            Some((last, rest)) if last.is_tail() => rest,
            _ => &self.elements,
        }
    }
}

/// A finished branch cut below its tail: the key the new split at the top
/// routes through, the nodes to copy underneath it and the subtree the path
/// ends in.
#[derive(Clone, Debug, PartialEq)]
pub struct DecoupledBranch {
    pub root_key: SuccessorIdentifier,
    pub path: Vec<TreeElement>,
    pub terminal: NodeId,
}
