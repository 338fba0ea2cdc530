//! Insertion statistics.

use std::fmt;

/// Counters describing what happened to every record offered to an index.
///
/// The index is single-threaded and mutated through `&mut self`, so the
/// counters are plain integers rather than atomics. `Index::stats()` hands
/// out a copy that can be printed or compared freely.
///
/// # Example
/// ```
/// use keyindex::Index;
///
/// let mut index = Index::new(|n: &u32| (*n != 0).then_some(*n));
/// index.add(3);
/// index.add(3);
/// index.add(0);
///
/// let stats = index.stats();
/// assert_eq!(stats.inserted, 1);
/// assert_eq!(stats.duplicates_rejected, 1);
/// assert_eq!(stats.missing_key_rejected, 1);
/// println!("{}", stats);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// Records that were stored.
    pub inserted: u64,

    /// Records turned away because an equal record was already stored.
    pub duplicates_rejected: u64,

    /// Records turned away because their key projected to nothing.
    pub missing_key_rejected: u64,
}

impl IndexStats {
    /// Create a stats record with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records offered to `add`.
    pub fn attempts(&self) -> u64 {
        self.inserted + self.duplicates_rejected + self.missing_key_rejected
    }

    /// Fraction of offered records that were not stored (0.0 to 1.0).
    pub fn rejection_rate(&self) -> f64 {
        let total = self.attempts();
        if total == 0 {
            0.0
        } else {
            (total - self.inserted) as f64 / total as f64
        }
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ inserted: {}, duplicates: {}, missing_key: {}, rejected: {:.2}% }}",
            self.inserted,
            self.duplicates_rejected,
            self.missing_key_rejected,
            self.rejection_rate() * 100.0
        )
    }
}
