//! Structural invariant checker.
//!
//! The checker never trusts the tree it is given. It is built from two
//! independent passes:
//! - [`Index::count_nodes`] - counts reachable nodes, giving up as soon as
//!   a path grows deeper than the recorded size (which catches cycles
//!   without a visited set)
//! - [`Index::ok_tree`] - verifies key order and same-key record order
//!   against bounds inherited from ancestors
//!
//! Every failure is described by a [`Violation`] and handed to a
//! [`ViolationSink`]. [`Index::well_formed`] logs violations through
//! `tracing`; pass [`Mute`] to [`Index::well_formed_with`] to test the
//! checker against deliberately broken trees without the noise.

use std::cmp::Ordering;

use thiserror::Error;

use crate::common::{NodeId, Result};
use crate::index::Index;

/// A broken structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    /// A child link names a slot outside the node arena.
    #[error("link to {node} points outside the node arena")]
    DanglingLink { node: NodeId },

    #[error("found {node} without a record")]
    MissingRecord { node: NodeId },

    #[error("record at {node} projects no key")]
    MissingKey { node: NodeId },

    /// The node's key is smaller than an ancestor it sits to the right of.
    #[error("key at {node} is below its inherited lower bound")]
    KeyBelowLowerBound { node: NodeId },

    /// The node's key is larger than an ancestor it sits to the left of.
    #[error("key at {node} is above its inherited upper bound")]
    KeyAboveUpperBound { node: NodeId },

    /// A same-key ancestor to the left does not order strictly before it.
    #[error("record at {node} does not follow the same-key record bounding it from below")]
    RecordNotAfterLowerBound { node: NodeId },

    /// A same-key ancestor to the right does not order strictly after it.
    #[error("record at {node} does not precede the same-key record bounding it from above")]
    RecordNotBeforeUpperBound { node: NodeId },

    /// Some path is at least `size` nodes long (a cycle, or more nodes
    /// than recorded), or the node count ran into a dangling link.
    #[error("tree is deeper than its recorded size {size}")]
    TooDeep { size: usize },

    #[error("recorded size {recorded} but counted {counted} nodes")]
    SizeMismatch { recorded: usize, counted: usize },
}

/// Receives the violations the checker finds.
pub trait ViolationSink {
    fn report(&mut self, violation: &Violation);
}

/// Logs each violation as a `tracing` warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ViolationSink for LogSink {
    fn report(&mut self, violation: &Violation) {
        tracing::warn!(%violation, "invariant error");
    }
}

/// Discards every violation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mute;

impl ViolationSink for Mute {
    fn report(&mut self, _violation: &Violation) {}
}

impl<F> ViolationSink for F
where
    F: FnMut(&Violation),
{
    fn report(&mut self, violation: &Violation) {
        self(violation)
    }
}

fn report<S: ViolationSink + ?Sized>(sink: &mut S, violation: Violation) -> bool {
    sink.report(&violation);
    false
}

/// A key bound: either given directly, or the key of an ancestor record.
enum KeyLimit<'a, K, R> {
    Key(&'a K),
    Of(&'a R),
}

impl<K, R> Clone for KeyLimit<'_, K, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, R> Copy for KeyLimit<'_, K, R> {}

impl<'a, K: Ord, R> KeyLimit<'a, K, R> {
    /// Compare the bound to `key`; `None` if an ancestor lost its key.
    fn cmp_to<F>(self, key: &K, key_of: &F) -> Option<Ordering>
    where
        F: Fn(&R) -> Option<K>,
    {
        match self {
            KeyLimit::Key(bound) => Some(bound.cmp(key)),
            KeyLimit::Of(record) => key_of(record).map(|bound| bound.cmp(key)),
        }
    }
}

/// A subtree waiting to be checked, with the bounds it inherits.
struct Pending<'a, K, R> {
    link: Option<NodeId>,
    key_lo: Option<KeyLimit<'a, K, R>>,
    key_hi: Option<KeyLimit<'a, K, R>>,
    record_lo: Option<&'a R>,
    record_hi: Option<&'a R>,
}

impl<R, K, F> Index<R, K, F>
where
    R: Ord,
    K: Ord,
    F: Fn(&R) -> Option<K>,
{
    /// Count the nodes reachable from `node`, which sits at `depth`.
    ///
    /// Returns `None` as soon as any node is found at a depth of `size()`
    /// or more, or a link leaves the arena. Every path in a well-formed
    /// tree is shorter than its size, so `None` means a cycle or a
    /// miscounted size, and the walk is bounded even when the links loop.
    pub fn count_nodes(&self, node: Option<NodeId>, depth: usize) -> Option<usize> {
        let mut count = 0;
        let mut stack = vec![(node, depth)];
        while let Some((link, depth)) = stack.pop() {
            let Some(id) = link else {
                continue;
            };
            if depth >= self.size {
                return None;
            }
            let node = self.nodes.get(id.0)?;
            count += 1;
            stack.push((node.right, depth + 1));
            stack.push((node.left, depth + 1));
        }
        Some(count)
    }

    /// Check that the subtree at `node` is ordered within the given bounds.
    ///
    /// `key_lo`/`key_hi` are inclusive key bounds. `record_lo`/`record_hi`
    /// are exclusive record bounds that only apply to records sharing
    /// their key. `None` means unbounded. The first violation found is
    /// reported to `sink`.
    ///
    /// Walks the subtree without a depth limit; run [`Index::count_nodes`]
    /// first on a tree that may contain a cycle.
    pub fn ok_tree<'a, S>(
        &'a self,
        node: Option<NodeId>,
        key_lo: Option<&'a K>,
        key_hi: Option<&'a K>,
        record_lo: Option<&'a R>,
        record_hi: Option<&'a R>,
        sink: &mut S,
    ) -> bool
    where
        S: ViolationSink + ?Sized,
    {
        let key_of = &self.key_of;
        let mut pending = vec![Pending {
            link: node,
            key_lo: key_lo.map(KeyLimit::Key),
            key_hi: key_hi.map(KeyLimit::Key),
            record_lo,
            record_hi,
        }];

        while let Some(Pending {
            link,
            key_lo,
            key_hi,
            record_lo,
            record_hi,
        }) = pending.pop()
        {
            let Some(id) = link else {
                continue;
            };
            let Some(node) = self.nodes.get(id.0) else {
                return report(sink, Violation::DanglingLink { node: id });
            };
            let Some(record) = node.record() else {
                return report(sink, Violation::MissingRecord { node: id });
            };
            let Some(key) = key_of(record) else {
                return report(sink, Violation::MissingKey { node: id });
            };

            if key_lo.and_then(|lo| lo.cmp_to(&key, key_of)) == Some(Ordering::Greater) {
                return report(sink, Violation::KeyBelowLowerBound { node: id });
            }
            if key_hi.and_then(|hi| hi.cmp_to(&key, key_of)) == Some(Ordering::Less) {
                return report(sink, Violation::KeyAboveUpperBound { node: id });
            }
            if let Some(lo) = record_lo {
                if key_of(lo).as_ref() == Some(&key) && lo >= record {
                    return report(sink, Violation::RecordNotAfterLowerBound { node: id });
                }
            }
            if let Some(hi) = record_hi {
                if key_of(hi).as_ref() == Some(&key) && hi <= record {
                    return report(sink, Violation::RecordNotBeforeUpperBound { node: id });
                }
            }

            pending.push(Pending {
                link: node.right,
                key_lo: Some(KeyLimit::Of(record)),
                key_hi,
                record_lo: Some(record),
                record_hi,
            });
            pending.push(Pending {
                link: node.left,
                key_lo,
                key_hi: Some(KeyLimit::Of(record)),
                record_lo,
                record_hi: Some(record),
            });
        }

        true
    }

    /// Check every invariant, logging any violation through `tracing`.
    pub fn well_formed(&self) -> bool {
        self.well_formed_with(&mut LogSink)
    }

    /// Check every invariant, reporting any violation to `sink`.
    ///
    /// The node count runs first, so the order pass only ever walks an
    /// acyclic tree.
    pub fn well_formed_with<S>(&self, sink: &mut S) -> bool
    where
        S: ViolationSink + ?Sized,
    {
        match self.count_nodes(self.root, 0) {
            None => return report(sink, Violation::TooDeep { size: self.size }),
            Some(counted) if counted != self.size => {
                return report(
                    sink,
                    Violation::SizeMismatch {
                        recorded: self.size,
                        counted,
                    },
                );
            }
            Some(_) => {}
        }

        self.ok_tree(self.root, None, None, None, None, sink)
    }

    /// Check every invariant, returning the first violation.
    pub fn check(&self) -> std::result::Result<(), Violation> {
        let mut first = None;
        let ok = self.well_formed_with(&mut |violation: &Violation| {
            first.get_or_insert_with(|| violation.clone());
        });
        match first {
            Some(violation) => Err(violation),
            None => {
                debug_assert!(ok);
                Ok(())
            }
        }
    }

    /// Like [`Index::check`], as a crate [`Error`](crate::Error).
    pub fn validate(&self) -> Result<()> {
        Ok(self.check()?)
    }
}
