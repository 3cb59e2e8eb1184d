use crate::classifiers::plastic_tree::nodes::node::Node;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Stable handle of a node inside a [`NodeArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn from_index(index: usize) -> Self {
        NodeId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Slot storage for every node of a tree, background subtrees included.
/// Freed slots are reused by later insertions.
#[derive(Default)]
pub struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Removes a single node, leaving its successors in place.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        let node = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        Some(node)
    }

    /// Frees a node, its successors and their background subtrees.
    pub fn remove_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(node) = self.remove(current) {
                pending.extend(node.children());
                pending.extend(node.background);
            }
        }
    }

    /// Deep copy of the subtree below `id` with fresh slots. Background
    /// subtrees are not copied.
    pub fn clone_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let mut copy = self.get(id)?.clone();
        copy.background = None;
        if let Some(successors) = copy.successors.as_mut() {
            let entries: Vec<_> = successors.entries().to_vec();
            for (key, child) in entries {
                match self.clone_subtree(child) {
                    Some(child_copy) => successors.force_successor_for_key(key, child_copy),
                    None => {
                        successors.remove_successor(&key);
                    }
                }
            }
        }
        Some(self.insert(copy))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calc_memory_size(&self) -> usize {
        size_of::<Self>()
            + self.slots.capacity() * size_of::<Option<Node>>()
            + self.free.capacity() * size_of::<usize>()
            + self
                .slots
                .iter()
                .flatten()
                .map(Node::calc_memory_size)
                .sum::<usize>()
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not live"),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not live"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::plastic_tree::successors::Successors;

    fn leaf() -> Node {
        Node::new_leaf(0, vec![1.0, 0.0])
    }

    fn split(arena: &mut NodeArena) -> NodeId {
        let lower = arena.insert(leaf());
        let upper = arena.insert(leaf());
        let mut successors = Successors::new(true, true, Some(0.5));
        successors.add_successor_numeric(0.5, lower, true);
        successors.add_successor_numeric(0.5, upper, false);
        let mut root = leaf();
        root.successors = Some(successors);
        arena.insert(root)
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut arena = NodeArena::new();
        let a = arena.insert(leaf());
        let b = arena.insert(leaf());
        assert!(arena.remove(a).is_some());
        assert!(arena.get(a).is_none());
        let c = arena.insert(leaf());
        assert_eq!(c, a);
        assert_eq!(arena.len(), 2);
        assert!(arena.get(b).is_some());
    }

    #[test]
    fn test_remove_subtree_frees_descendants() {
        let mut arena = NodeArena::new();
        let root = split(&mut arena);
        assert_eq!(arena.len(), 3);
        arena.remove_subtree(root);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_clone_subtree_uses_new_slots() {
        let mut arena = NodeArena::new();
        let root = split(&mut arena);
        let copy = arena.clone_subtree(root).expect("root is live");
        assert_ne!(copy, root);
        assert_eq!(arena.len(), 6);

        let original: Vec<_> = arena[root].children().collect();
        let copied: Vec<_> = arena[copy].children().collect();
        assert_eq!(copied.len(), 2);
        assert!(copied.iter().all(|c| !original.contains(c)));
    }
}
