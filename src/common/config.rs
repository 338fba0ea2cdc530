//! Configuration for keyindex.

/// Per-index configuration.
///
/// # Self-checking
/// With `self_check` on, every mutation is followed by a full
/// `well_formed()` pass and a `debug_assert!` on its result. The pass is
/// O(n), which turns bulk insertion quadratic, so it defaults to on only
/// in debug builds.
///
/// # Example
/// ```
/// use keyindex::{Index, IndexConfig};
///
/// let index = Index::with_config(|n: &u32| Some(*n), IndexConfig::unchecked());
/// assert!(!index.config().self_check);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Verify the tree after every mutation.
    pub self_check: bool,
}

impl IndexConfig {
    /// Configuration that verifies the tree after every mutation.
    pub const fn checked() -> Self {
        Self { self_check: true }
    }

    /// Configuration that never verifies the tree on its own.
    pub const fn unchecked() -> Self {
        Self { self_check: false }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            self_check: cfg!(debug_assertions),
        }
    }
}
