//! Sorted record index.
//!
//! The index keeps records in an unbalanced binary search tree ordered by
//! a projected key, with the record's own ordering breaking key ties.
//!
//! # Components
//! - [`Index`] - The index itself: insertion and bounded traversal
//! - [`Traversal`] - PRE/IN/POST-order visiting disciplines
//! - [`IndexStats`] - Insertion counters
//! - [`checker`] - Structural invariant verification

pub mod checker;
#[cfg(test)]
mod fixtures;
mod node;
mod record_index;
mod stats;
mod traversal;

pub use record_index::Index;
pub use stats::IndexStats;
pub use traversal::Traversal;
