use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SortTreeError {
    /// Navigation from a key that is not in the tree.
    #[error("KEY_NOT_FOUND")]
    KeyNotFound,
    /// The resolver has no value for the key being updated.
    #[error("VALUE_NOT_RESOLVED")]
    Unresolved,
}
