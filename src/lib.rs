//! This crate exposes a Binary Search Tree (BST) with lazy deletion.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! ## Lazy deletion
//!
//! Removing a value from a [`LazyTree`][lazy::LazyTree] doesn't unlink its `Node`. The `Node`
//! is only flagged as deleted. Lookups and "soft" traversals skip flagged `Node`s while the shape
//! of the tree stays exactly as it was, so inserting the same value again just clears the flag
//! instead of allocating a new `Node`.
//!
//! Because of this the tree tracks two sizes: the number of live values
//! ([`size`][lazy::LazyTree::size]) and the number of `Node`s, live or not
//! ([`size_hard`][lazy::LazyTree::size_hard]).
//!
//! The tree does not rebalance itself. Inserting values in sorted order degrades it into a chain
//! with a height of `O(N)`.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod error;
pub mod lazy;


pub use error::{Error, Result};
