mod node;
mod traversal;

pub use node::{Node, NodeIter, NodeKind};
pub use traversal::{BranchWarning, Traversal, TraversalReport};
