//! Route registration errors.

use thiserror::Error;

/// A route could not be registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The pattern already has a target.
    #[error("route `{0}` is already registered")]
    Duplicate(String),

    /// The pattern names a different parameter where one already exists.
    #[error("route `{pattern}` declares `{{{new}}}` where `{existing}` is registered")]
    ConflictingParam {
        /// The rejected pattern.
        pattern: String,
        /// The parameter segment already in the trie.
        existing: String,
        /// The parameter name in the rejected pattern.
        new: String,
    },

    /// The pattern contains a malformed parameter segment.
    #[error("invalid route pattern `{0}`")]
    InvalidPattern(String),
}
