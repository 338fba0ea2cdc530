//! Index - the sorted record store.
//!
//! The [`Index`] provides:
//! - Insertion that rejects duplicate and key-less records
//! - Bulk insertion from an iterator or from another index
//! - Range-bounded traversal in pre-, in- or post-order

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;

use crate::common::config::IndexConfig;
use crate::common::NodeId;
use crate::index::node::Node;
use crate::index::{IndexStats, Traversal};

/// A sorted index of records under a caller-chosen key.
///
/// # Ordering
/// Records are ordered by the key `key_of` projects out of them. Records
/// whose keys are equal are ordered by the record's own [`Ord`], so every
/// stored record has a unique position even when the key is not unique.
/// Two records that compare equal under [`Ord`] are duplicates; only the
/// first is kept.
///
/// # Layout
/// ```text
/// ┌──────────────────────────────────────────────────────┐
/// │                        Index                         │
/// │  root ──▶ [Node0]                                    │
/// │          ╱       ╲        nodes: Vec<Node<R>>        │
/// │     [Node1]     [Node3]   (append-only arena,        │
/// │      ╱               ╲     NodeId = slot number)     │
/// │  [Node2]            [Node4]                          │
/// └──────────────────────────────────────────────────────┘
/// ```
///
/// The tree is never rebalanced, so its shape is fixed by insertion order.
/// Insertion and traversal walk the tree without recursion; a degenerate
/// tree built from sorted input costs time, not stack.
///
/// # Usage
/// ```
/// use keyindex::{Index, Traversal};
///
/// let mut by_mass = Index::new(|p: &(&str, Option<u32>)| p.1);
/// by_mass.add_all([("b", Some(4)), ("a", Some(2)), ("c", None), ("d", Some(6))]);
/// assert_eq!(by_mass.len(), 3);
///
/// let mut names = Vec::new();
/// by_mass.do_all(|p| names.push(p.0), Some(&3), None, Traversal::InOrder);
/// assert_eq!(names, ["b", "d"]);
/// ```
pub struct Index<R, K, F> {
    /// Every node ever created, in creation order.
    pub(super) nodes: Vec<Node<R>>,

    /// Root of the tree (None = empty).
    pub(super) root: Option<NodeId>,

    /// Number of records in the tree.
    ///
    /// The checker compares this with the number of nodes reachable from
    /// `root`.
    pub(super) size: usize,

    /// Projects a record onto its key.
    pub(super) key_of: F,

    config: IndexConfig,
    stats: IndexStats,
    _key: PhantomData<fn() -> K>,
}

impl<R, K, F> Index<R, K, F>
where
    R: Ord,
    K: Ord,
    F: Fn(&R) -> Option<K>,
{
    /// Create an empty index with the default configuration.
    ///
    /// `key_of` must be pure: the same record must always project to the
    /// same key. A record projecting to `None` is never stored.
    pub fn new(key_of: F) -> Self {
        Self::with_config(key_of, IndexConfig::default())
    }

    /// Create an empty index with an explicit configuration.
    pub fn with_config(key_of: F, config: IndexConfig) -> Self {
        let index = Self {
            nodes: Vec::new(),
            root: None,
            size: 0,
            key_of,
            config,
            stats: IndexStats::new(),
            _key: PhantomData,
        };
        index.self_check("new");
        index
    }

    /// Number of records in the index.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of records in the index.
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The configuration this index was built with.
    pub fn config(&self) -> IndexConfig {
        self.config
    }

    /// Counters for every record offered so far.
    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    /// Root node of the tree, for use with the checker primitives.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    // ========================================================================
    // Public API: Insertion
    // ========================================================================

    /// Add a record, returning whether it was stored.
    ///
    /// Returns `false` without touching the tree when the record's key is
    /// `None`, or when an equal record is already stored.
    pub fn add(&mut self, record: R) -> bool {
        let Some(key) = (self.key_of)(&record) else {
            self.stats.missing_key_rejected += 1;
            return false;
        };

        // Walk down to the empty link where the record belongs.
        let mut parent: Option<(NodeId, Ordering)> = None;
        let mut link = self.root;
        while let Some(id) = link {
            let node = &self.nodes[id.0];
            let ord = match node.record() {
                Some(here) => match (self.key_of)(here) {
                    Some(here_key) => key.cmp(&here_key).then_with(|| record.cmp(here)),
                    None => Ordering::Greater,
                },
                // Only a corrupted arena has record-less nodes; step past them.
                None => Ordering::Greater,
            };

            link = match ord {
                Ordering::Equal => {
                    self.stats.duplicates_rejected += 1;
                    return false;
                }
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
            parent = Some((id, ord));
        }

        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::new(record));
        match parent {
            None => self.root = Some(id),
            Some((parent_id, Ordering::Less)) => self.nodes[parent_id.0].left = Some(id),
            Some((parent_id, _)) => self.nodes[parent_id.0].right = Some(id),
        }
        self.size += 1;
        self.stats.inserted += 1;

        self.self_check("add");
        true
    }

    /// Add every record in `records`, in iteration order.
    ///
    /// Duplicates and key-less records are skipped. Returns how many
    /// records were stored.
    pub fn add_all<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = R>,
    {
        let mut added = 0;
        for record in records {
            if self.add(record) {
                added += 1;
            }
        }
        added
    }

    /// Copy every record of `other` into this index.
    ///
    /// `other` may be keyed differently. Its records are added in the
    /// order of an unbounded pre-order traversal of `other`, which makes
    /// the resulting tree shape reproducible. Returns how many records
    /// were stored.
    pub fn add_all_from<K2, F2>(&mut self, other: &Index<R, K2, F2>) -> usize
    where
        R: Clone,
        K2: Ord,
        F2: Fn(&R) -> Option<K2>,
    {
        let mut added = 0;
        other.do_all(
            |record| {
                if self.add(record.clone()) {
                    added += 1;
                }
            },
            None,
            None,
            Traversal::PreOrder,
        );

        tracing::debug!(
            offered = other.len(),
            added,
            size = self.size,
            "copied records from another index"
        );
        added
    }

    // ========================================================================
    // Public API: Traversal
    // ========================================================================

    /// Call `visitor` on every record whose key lies in `[lower, upper]`.
    ///
    /// A `None` bound leaves that side open. `order` decides when a node is
    /// visited relative to its children; only [`Traversal::InOrder`]
    /// produces records in sorted order.
    pub fn do_all<'a, V>(
        &'a self,
        mut visitor: V,
        lower: Option<&K>,
        upper: Option<&K>,
        order: Traversal,
    ) where
        V: FnMut(&'a R),
    {
        let result: Result<(), Infallible> = self.try_do_all(
            |record| {
                visitor(record);
                Ok(())
            },
            lower,
            upper,
            order,
        );
        match result {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Like [`Index::do_all`], but stops at the first visitor error.
    ///
    /// The error is returned unchanged. Whatever the visitor did before
    /// failing is not undone.
    pub fn try_do_all<'a, V, E>(
        &'a self,
        mut visitor: V,
        lower: Option<&K>,
        upper: Option<&K>,
        order: Traversal,
    ) -> Result<(), E>
    where
        V: FnMut(&'a R) -> Result<(), E>,
    {
        enum Step<'a, R> {
            Descend(NodeId),
            Visit(&'a R),
        }

        let mut stack: Vec<Step<'a, R>> = Vec::new();
        stack.extend(self.root.map(Step::Descend));

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Visit(record) => {
                    visitor(record)?;
                    continue;
                }
                Step::Descend(id) => id,
            };

            let node = &self.nodes[id.0];
            let Some(record) = node.record() else {
                continue;
            };
            let Some(key) = (self.key_of)(record) else {
                continue;
            };

            // A node above the upper bound may still have in-range nodes
            // on its left, and one below the lower bound on its right.
            let in_left = match lower {
                Some(lo) => *lo <= key,
                None => true,
            };
            let in_right = match upper {
                Some(hi) => *hi >= key,
                None => true,
            };

            let left = node.left.filter(|_| in_left).map(Step::Descend);
            let right = node.right.filter(|_| in_right).map(Step::Descend);
            let visit = (in_left && in_right).then_some(Step::Visit(record));

            // Pushed in reverse of the order they should run.
            let plan = match order {
                Traversal::PreOrder => [right, left, visit],
                Traversal::InOrder => [right, visit, left],
                Traversal::PostOrder => [visit, right, left],
            };
            stack.extend(plan.into_iter().flatten());
        }

        Ok(())
    }

    /// Gather the records `do_all` would visit, in visiting order.
    pub fn collect(&self, lower: Option<&K>, upper: Option<&K>, order: Traversal) -> Vec<&R> {
        let mut out = Vec::new();
        self.do_all(|record| out.push(record), lower, upper, order);
        out
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Run the configured post-mutation check.
    fn self_check(&self, operation: &str) {
        if !self.config.self_check {
            return;
        }

        let ok = self.well_formed();
        if !ok {
            tracing::error!(operation, size = self.size, "index failed its self-check");
        }
        debug_assert!(ok, "index badly formed at end of {operation}");
    }
}

impl<R, K, F> Extend<R> for Index<R, K, F>
where
    R: Ord,
    K: Ord,
    F: Fn(&R) -> Option<K>,
{
    fn extend<I: IntoIterator<Item = R>>(&mut self, iter: I) {
        self.add_all(iter);
    }
}

impl<R, K, F> fmt::Debug for Index<R, K, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("size", &self.size)
            .field("root", &self.root)
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixtures::{body, mass, massless, Body};

    fn mass_index() -> Index<Body, u32, impl Fn(&Body) -> Option<u32>> {
        Index::with_config(mass, IndexConfig::checked())
    }

    fn masses(records: Vec<&Body>) -> Vec<u32> {
        records.into_iter().filter_map(|b| b.mass).collect()
    }

    #[test]
    fn test_new_index_is_empty() {
        let index = mass_index();
        assert_eq!(index.size(), 0);
        assert!(index.is_empty());
        assert!(index.root().is_none());
        assert!(index.collect(None, None, Traversal::InOrder).is_empty());
    }

    #[test]
    fn test_traversal_orders() {
        let mut index = mass_index();
        for m in [4, 2, 1, 3, 6] {
            assert!(index.add(body("A", m)));
        }

        assert_eq!(masses(index.collect(None, None, Traversal::InOrder)), [1, 2, 3, 4, 6]);
        assert_eq!(masses(index.collect(None, None, Traversal::PreOrder)), [4, 2, 1, 3, 6]);
        assert_eq!(masses(index.collect(None, None, Traversal::PostOrder)), [1, 3, 2, 6, 4]);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut index = mass_index();
        assert!(index.add(body("A", 2)));
        assert!(!index.add(body("A", 2)));

        assert_eq!(index.size(), 1);
        assert_eq!(index.stats().duplicates_rejected, 1);
    }

    #[test]
    fn test_missing_key_rejected() {
        let mut index = mass_index();
        assert!(!index.add(massless("A")));

        assert_eq!(index.size(), 0);
        assert_eq!(index.stats().missing_key_rejected, 1);
    }

    #[test]
    fn test_equal_keys_ordered_by_record() {
        let mut index = mass_index();
        index.add(body("B", 5));
        index.add(body("C", 5));
        index.add(body("A", 5));
        index.add(body("Z", 1));

        let names: Vec<_> = index
            .collect(None, None, Traversal::InOrder)
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, ["Z", "A", "B", "C"]);
        assert!(index.well_formed());
    }

    #[test]
    fn test_range_descends_past_out_of_range_nodes() {
        let mut index = mass_index();
        // 10 is above the range but its left subtree is not.
        for m in [10, 2, 8, 5, 1, 20] {
            index.add(body("A", m));
        }

        assert_eq!(masses(index.collect(Some(&3), Some(&8), Traversal::InOrder)), [5, 8]);
        assert_eq!(masses(index.collect(Some(&3), Some(&8), Traversal::PreOrder)), [8, 5]);
        assert_eq!(masses(index.collect(Some(&8), Some(&8), Traversal::InOrder)), [8]);
        assert!(index.collect(Some(&9), Some(&9), Traversal::InOrder).is_empty());
        assert!(index.collect(Some(&8), Some(&3), Traversal::InOrder).is_empty());
    }

    #[test]
    fn test_try_do_all_stops_at_first_error() {
        let mut index = mass_index();
        index.add_all([1, 2, 3, 4, 5].map(|m| body("A", m)));

        let mut seen = Vec::new();
        let result = index.try_do_all(
            |b| {
                if b.mass == Some(3) {
                    return Err("stop");
                }
                seen.push(b.mass);
                Ok(())
            },
            None,
            None,
            Traversal::InOrder,
        );

        assert_eq!(result, Err("stop"));
        assert_eq!(seen, [Some(1), Some(2)]);
    }

    #[test]
    fn test_add_all_from_copies_in_pre_order() {
        let mut source = mass_index();
        source.add_all([4, 2, 1, 3, 6].map(|m| body("A", m)));

        let mut copy = mass_index();
        assert_eq!(copy.add_all_from(&source), 5);

        assert_eq!(
            masses(copy.collect(None, None, Traversal::PreOrder)),
            masses(source.collect(None, None, Traversal::PreOrder))
        );
        assert_eq!(
            masses(copy.collect(None, None, Traversal::PostOrder)),
            masses(source.collect(None, None, Traversal::PostOrder))
        );

        // Copying again adds nothing.
        assert_eq!(copy.add_all_from(&source), 0);
        assert_eq!(copy.size(), 5);
    }

    #[test]
    fn test_add_all_from_rekeys() {
        let mut by_mass = mass_index();
        by_mass.add_all([body("C", 1), body("A", 3), body("B", 2)]);

        let mut by_name = Index::new(|b: &Body| Some(b.name));
        by_name.add_all_from(&by_mass);

        let names: Vec<_> = by_name
            .collect(None, None, Traversal::InOrder)
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_extend() {
        let mut index = mass_index();
        index.extend([body("A", 2), body("A", 1), body("A", 2)]);
        assert_eq!(index.size(), 2);
    }

    #[test]
    fn test_degenerate_tree_does_not_overflow() {
        let mut index = Index::with_config(|n: &u32| Some(*n), IndexConfig::unchecked());
        let n = 10_000;
        index.add_all(0..n);

        assert_eq!(index.size(), n as usize);
        let mut count = 0u32;
        index.do_all(
            |&v| {
                assert_eq!(v, count);
                count += 1;
            },
            None,
            None,
            Traversal::InOrder,
        );
        assert_eq!(count, n);
        assert_eq!(index.collect(Some(&(n - 2)), None, Traversal::PostOrder), [&(n - 1), &(n - 2)]);
    }

    #[test]
    fn test_debug_omits_records() {
        let mut index = mass_index();
        index.add(body("A", 1));
        let debug = format!("{:?}", index);
        assert!(debug.contains("size: 1"));
        assert!(!debug.contains("Body"));
    }
}
