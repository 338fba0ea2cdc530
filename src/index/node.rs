//! A single slot in the index's node arena.

use crate::common::NodeId;

/// One tree node: a record and its two child links.
///
/// Children are referenced by [`NodeId`] into the owning index's arena.
/// Every node is linked from exactly one parent (or from the root link),
/// so the arena still describes a tree of exclusively owned nodes.
///
/// The record slot is only ever empty in a hand-corrupted arena; nodes
/// created by insertion always hold a record.
#[derive(Debug, Clone)]
pub(crate) struct Node<R> {
    pub(crate) record: Option<R>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
}

impl<R> Node<R> {
    /// Create a leaf holding `record`.
    pub(crate) fn new(record: R) -> Self {
        Self {
            record: Some(record),
            left: None,
            right: None,
        }
    }

    /// Create a node with an empty record slot.
    #[cfg(test)]
    pub(crate) fn vacant() -> Self {
        Self {
            record: None,
            left: None,
            right: None,
        }
    }

    #[inline]
    pub(crate) fn record(&self) -> Option<&R> {
        self.record.as_ref()
    }
}
