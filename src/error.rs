use thiserror::Error;

/// Errors returned by [`LazyTree`][crate::lazy::LazyTree] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// No node in the tree, live or deleted, holds the requested element.
    #[error("no node holds the requested element")]
    NotFound,
    /// The tree has no live elements.
    #[error("tree has no live elements")]
    EmptyTree,
}

/// Shorthand for results carrying an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
