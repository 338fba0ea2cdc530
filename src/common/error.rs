//! Error types for keyindex.

use thiserror::Error;

use crate::index::checker::Violation;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in keyindex.
///
/// Rejected insertions (duplicates, records without a key) are not errors;
/// `Index::add` reports them by returning `false`.
#[derive(Debug, Error)]
pub enum Error {
    /// The index failed its structural self-check.
    ///
    /// This indicates a bug, or a tree corrupted behind the public API.
    #[error("invariant violated: {0}")]
    Invariant(#[from] Violation),

    /// A traversal name could not be parsed.
    #[error("unknown traversal order: {0:?}")]
    UnknownTraversal(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::NodeId;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownTraversal("sideways".to_string());
        assert_eq!(format!("{}", err), "unknown traversal order: \"sideways\"");

        let err = Error::Invariant(Violation::MissingRecord { node: NodeId::new(3) });
        assert_eq!(
            format!("{}", err),
            "invariant violated: found Node(3) without a record"
        );
    }

    #[test]
    fn test_violation_conversion() {
        let err: Error = Violation::SizeMismatch {
            recorded: 4,
            counted: 3,
        }
        .into();

        match err {
            Error::Invariant(Violation::SizeMismatch { recorded, counted }) => {
                assert_eq!((recorded, counted), (4, 3));
            }
            _ => panic!("Expected Invariant error"),
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }
}
