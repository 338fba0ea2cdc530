//! Traversal disciplines for bounded enumeration.

use std::fmt;
use std::str::FromStr;

use crate::common::{Error, Result};

/// When a node is visited relative to the descent into its children.
///
/// Only [`Traversal::InOrder`] yields records in sorted order. The other
/// two follow the tree's shape, which depends on insertion history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Traversal {
    /// Visit a node before either child.
    PreOrder,
    /// Visit a node between its left and right child.
    InOrder,
    /// Visit a node after both children.
    PostOrder,
}

impl Traversal {
    /// All traversal orders.
    pub const ALL: [Traversal; 3] = [Traversal::PreOrder, Traversal::InOrder, Traversal::PostOrder];
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Traversal::PreOrder => "pre-order",
            Traversal::InOrder => "in-order",
            Traversal::PostOrder => "post-order",
        };
        f.write_str(name)
    }
}

impl FromStr for Traversal {
    type Err = Error;

    /// Accepts `pre`, `pre-order`, `pre_order` and `preorder` (and the same
    /// for `in`/`post`), in any case.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.strip_suffix("order").unwrap_or(&normalized) {
            "pre" => Ok(Traversal::PreOrder),
            "in" => Ok(Traversal::InOrder),
            "post" => Ok(Traversal::PostOrder),
            _ => Err(Error::UnknownTraversal(s.to_string())),
        }
    }
}
