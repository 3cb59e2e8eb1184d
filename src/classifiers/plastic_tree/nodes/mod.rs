mod arena;
mod node;

pub use arena::{NodeArena, NodeId};
pub use node::Node;
