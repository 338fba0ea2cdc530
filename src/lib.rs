//! keyindex - A sorted record index with a pluggable key.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            Index                                │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────┐   ┌────────────────────────────────────┐  │
//! │  │  key extractor   │   │        nodes: Vec<Node<R>>         │  │
//! │  │ Fn(&R)->Option<K>│   │  [Node0] [Node1] [Node2] ...       │  │
//! │  └──────────────────┘   └────────────────────────────────────┘  │
//! │           ↓                       ↑ root: Option<NodeId>        │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │   add / add_all / add_all_from     (insertion)            │   │
//! │  │   do_all / try_do_all / collect    (bounded traversal)    │   │
//! │  │   well_formed / check / validate   (invariant checker)    │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are ordered first by the key the extractor projects out of them,
//! then by the record's own [`Ord`] when two keys collide. The tree is an
//! unbalanced binary search tree, so its shape (and the PRE/POST-order
//! output) follows insertion order.
//!
//! # Modules
//! - [`common`] - Shared primitives (NodeId, Error, config)
//! - [`index`] - The index, its traversal orders, statistics and checker
//!
//! # Quick Start
//! ```
//! use keyindex::{Index, Traversal};
//!
//! let mut index = Index::new(|p: &(&str, u32)| Some(p.1));
//! index.add(("io", 4));
//! index.add(("europa", 2));
//! index.add(("ganymede", 6));
//!
//! let light: Vec<_> = index
//!     .collect(None, Some(&4), Traversal::InOrder)
//!     .into_iter()
//!     .map(|p| p.0)
//!     .collect();
//! assert_eq!(light, ["europa", "io"]);
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::IndexConfig;
pub use common::{Error, NodeId, Result};

pub use index::checker::{LogSink, Mute, Violation, ViolationSink};
pub use index::{Index, IndexStats, Traversal};
