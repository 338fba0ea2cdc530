//! Node identifier type.

use std::fmt;

/// Identifies a node in an index's node arena.
///
/// Using `usize` because:
/// 1. Nodes are stored in `Vec<Node<R>>`
/// 2. Direct indexing without casting: `nodes[node_id.0]`
/// 3. Ids are handed out in insertion order and never reused
///
/// # Example
/// ```
/// use keyindex::NodeId;
///
/// let node_id = NodeId::new(5);
/// assert_eq!(node_id.to_string(), "Node(5)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Create a new NodeId.
    #[inline]
    pub fn new(id: usize) -> Self {
        NodeId(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}
