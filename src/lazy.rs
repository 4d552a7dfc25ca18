//! A BST with lazy deletion. Removing an element only flags its node as deleted, so the shape of
//! the tree never changes after an insert. Inserting a deleted element again clears the flag on
//! the node that is already there.
//!
//! # Examples
//!
//! ```
//! use lazy_bst::lazy::LazyTree;
//! use lazy_bst::Error;
//!
//! let mut tree = LazyTree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.find(&1), None);
//! assert_eq!(tree.find_min(), Err(Error::EmptyTree));
//!
//! assert!(tree.insert(1));
//! assert!(tree.insert(2));
//! assert_eq!(tree.find(&1), Some(&1));
//!
//! // Removing flags the node but keeps it in the tree.
//! assert_eq!(tree.remove(&1), Ok(true));
//! assert_eq!(tree.find(&1), None);
//! assert_eq!(tree.size(), 1);
//! assert_eq!(tree.size_hard(), 2);
//!
//! // Inserting it again brings the old node back to life.
//! assert!(tree.insert(1));
//! assert_eq!(tree.size(), 2);
//! assert_eq!(tree.size_hard(), 2);
//!
//! // Removing something that was never inserted is an error.
//! assert_eq!(tree.remove(&42), Err(Error::NotFound));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::{Error, Result};

/// An unbalanced Binary Search Tree with lazy deletion. This can be used for inserting, finding,
/// and removing elements. Removed elements stay in the tree as deleted nodes until the whole tree
/// is cleared.
pub struct LazyTree<T> {
    root: Link<T>,
    /// Number of live elements.
    size: usize,
    /// Number of nodes flagged as deleted.
    deleted: usize,
}

impl<T> Default for LazyTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for LazyTree<T> {
    fn drop(&mut self) {
        self.free_nodes();
    }
}

impl<T> Clone for LazyTree<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        Self {
            root: self.clone_nodes(),
            size: self.size,
            deleted: self.deleted,
        }
    }
}

impl<T> fmt::Debug for LazyTree<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyTree")
            .field("size", &self.size)
            .field("size_hard", &self.size_hard())
            .field("elements", &LiveElements(self))
            .finish()
    }
}

/// Formats the live elements of a tree as a set.
struct LiveElements<'a, T>(&'a LazyTree<T>);

impl<T> fmt::Debug for LiveElements<'_, T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.iter()).finish()
    }
}

impl<T> LazyTree<T> {
    /// Generate a new, empty `LazyTree`.
    pub fn new() -> Self {
        Self {
            root: None,
            size: 0,
            deleted: 0,
        }
    }

    /// The number of live elements in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The number of nodes in the tree, whether they are deleted or not.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::LazyTree;
    ///
    /// let mut tree: LazyTree<_> = (1..=3).collect();
    /// tree.remove(&2).unwrap();
    ///
    /// assert_eq!(tree.size(), 2);
    /// assert_eq!(tree.size_hard(), 3);
    /// ```
    pub fn size_hard(&self) -> usize {
        self.size + self.deleted
    }

    /// The number of nodes that are flagged as deleted.
    pub fn deleted_count(&self) -> usize {
        self.deleted
    }

    /// Returns `true` if the tree has no live elements. Deleted nodes may still be present.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Inserts the element into the tree. Returns `true` if the tree gained a live element.
    ///
    /// If an equal element was previously removed, its node is flagged as live again and no new
    /// node is allocated. The element already stored in the tree is kept in that case. If an
    /// equal element is already live, nothing happens and `false` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::LazyTree;
    ///
    /// let mut tree = LazyTree::new();
    ///
    /// assert!(tree.insert(1));
    /// assert!(!tree.insert(1));
    ///
    /// tree.remove(&1).unwrap();
    /// assert!(tree.insert(1));
    /// assert_eq!(tree.size_hard(), 1);
    /// ```
    pub fn insert(&mut self, element: T) -> bool
    where
        T: Ord,
    {
        let mut node = match self.root.as_deref_mut() {
            Some(root) => root,
            None => {
                self.root = Some(Box::new(Node::new(element)));
                self.size += 1;
                trace!(size = self.size, "inserted root node");
                self.check_counts();
                return true;
            }
        };
        loop {
            let go_left = match element.cmp(&node.element) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal if node.deleted => {
                    node.deleted = false;
                    self.deleted -= 1;
                    self.size += 1;
                    trace!(
                        size = self.size,
                        size_hard = self.size + self.deleted,
                        "resurrected deleted node"
                    );
                    self.check_counts();
                    return true;
                }
                Ordering::Equal => {
                    trace!(size = self.size, "element already live");
                    return false;
                }
            };
            let child_is_none = if go_left {
                node.left.is_none()
            } else {
                node.right.is_none()
            };
            match child_is_none {
                false => {
                    let next = if go_left {
                        &mut node.left
                    } else {
                        &mut node.right
                    };
                    node = next.as_deref_mut().unwrap();
                }
                true => {
                    let child = if go_left {
                        &mut node.left
                    } else {
                        &mut node.right
                    };
                    *child = Some(Box::new(Node::new(element)));
                    if cfg!(debug_assertions) {
                        if let Some(left) = node.left.as_deref() {
                            assert!(node.element > left.element);
                        }
                        if let Some(right) = node.right.as_deref() {
                            assert!(node.element < right.element);
                        }
                    }
                    break;
                }
            }
        }

        self.size += 1;
        trace!(
            size = self.size,
            size_hard = self.size + self.deleted,
            "inserted new node"
        );
        self.check_counts();
        true
    }

    /// Flags the node holding the given element as deleted. Returns `true` if a live element was
    /// removed and `false` if the node was already deleted.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if no node, live or deleted, holds the element.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::LazyTree;
    /// use lazy_bst::Error;
    ///
    /// let mut tree = LazyTree::new();
    /// tree.insert(1);
    ///
    /// assert_eq!(tree.remove(&1), Ok(true));
    /// assert_eq!(tree.remove(&1), Ok(false));
    /// assert_eq!(tree.remove(&2), Err(Error::NotFound));
    /// ```
    pub fn remove(&mut self, element: &T) -> Result<bool>
    where
        T: Ord,
    {
        let mut link = &mut self.root;
        while let Some(node) = link {
            match element.cmp(&node.element) {
                Ordering::Less => link = &mut node.left,
                Ordering::Greater => link = &mut node.right,
                Ordering::Equal if node.deleted => {
                    trace!(size = self.size, "element already deleted");
                    return Ok(false);
                }
                Ordering::Equal => {
                    node.deleted = true;
                    self.size -= 1;
                    self.deleted += 1;
                    trace!(
                        size = self.size,
                        deleted = self.deleted,
                        "flagged node as deleted"
                    );
                    self.check_counts();
                    return Ok(true);
                }
            }
        }

        Err(Error::NotFound)
    }

    /// Potentially finds the live element equal to the given one. Deleted elements are reported
    /// the same way as elements that were never inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::LazyTree;
    ///
    /// let mut tree = LazyTree::new();
    /// tree.insert(1);
    ///
    /// assert_eq!(tree.find(&1), Some(&1));
    /// assert_eq!(tree.find(&42), None);
    ///
    /// tree.remove(&1).unwrap();
    /// assert_eq!(tree.find(&1), None);
    /// ```
    pub fn find(&self, element: &T) -> Option<&T>
    where
        T: Ord,
    {
        self.find_node(element)
            .filter(|node| !node.deleted)
            .map(|node| &node.element)
    }

    /// Returns `true` if a live element equal to the given one is in the tree.
    pub fn contains(&self, element: &T) -> bool
    where
        T: Ord,
    {
        self.find(element).is_some()
    }

    /// Returns the smallest live element. Deleted nodes are skipped even when they sit at the
    /// far left of the tree.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the tree has no live elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::LazyTree;
    ///
    /// let mut tree: LazyTree<_> = [5, 3, 8].into_iter().collect();
    /// tree.remove(&3).unwrap();
    ///
    /// assert_eq!(tree.find_min(), Ok(&5));
    /// ```
    pub fn find_min(&self) -> Result<&T> {
        self.iter().next().ok_or(Error::EmptyTree)
    }

    /// Returns the largest live element. Deleted nodes are skipped even when they sit at the
    /// far right of the tree.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyTree`] if the tree has no live elements.
    pub fn find_max(&self) -> Result<&T> {
        self.iter().next_back().ok_or(Error::EmptyTree)
    }

    /// Gets the height of the tree counting every node, deleted or not. An empty tree has a
    /// height of `-1` and a tree with a single node has a height of `0`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::LazyTree;
    ///
    /// let mut tree = LazyTree::new();
    /// assert_eq!(tree.height(), -1);
    ///
    /// tree.insert(1);
    /// tree.insert(2);
    /// assert_eq!(tree.height(), 1);
    ///
    /// // Deleted nodes still count.
    /// tree.remove(&2).unwrap();
    /// assert_eq!(tree.height(), 1);
    /// ```
    pub fn height(&self) -> isize {
        let mut height = -1;
        let mut stack: Vec<_> = self.root.as_deref().map(|root| (root, 0)).into_iter().collect();
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(node.left.as_deref().map(|left| (left, depth + 1)));
            stack.extend(node.right.as_deref().map(|right| (right, depth + 1)));
        }

        height
    }

    /// Calls `visit` on every live element in ascending order.
    pub fn traverse_soft<F>(&self, visit: F)
    where
        F: FnMut(&T),
    {
        self.iter().for_each(visit);
    }

    /// Calls `visit` on every element in ascending order, including deleted ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_bst::lazy::LazyTree;
    ///
    /// let mut tree: LazyTree<_> = [2, 1, 3].into_iter().collect();
    /// tree.remove(&2).unwrap();
    ///
    /// let mut soft = Vec::new();
    /// tree.traverse_soft(|x| soft.push(*x));
    /// assert_eq!(soft, [1, 3]);
    ///
    /// let mut hard = Vec::new();
    /// tree.traverse_hard(|x| hard.push(*x));
    /// assert_eq!(hard, [1, 2, 3]);
    /// ```
    pub fn traverse_hard<F>(&self, visit: F)
    where
        F: FnMut(&T),
    {
        self.iter_hard().for_each(visit);
    }

    /// An iterator over the live elements in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: self.iter_hard(),
            remaining: self.size,
        }
    }

    /// An iterator over every element in ascending order, including deleted ones.
    pub fn iter_hard(&self) -> HardIter<'_, T> {
        HardIter::new(self.root.as_deref(), self.size_hard())
    }

    /// Drops every node, live or deleted, leaving an empty tree.
    pub fn clear(&mut self) {
        let freed = self.free_nodes();
        debug!(freed, "cleared tree");
        self.check_counts();
    }

    /// Copies every node with an explicit stack so a degenerate tree can't overflow the call
    /// stack. Nodes are built in post-order: both children of a node are on `built` by the time
    /// the node itself is copied.
    fn clone_nodes(&self) -> Link<T>
    where
        T: Clone,
    {
        enum Step<'a, T> {
            Visit(Option<&'a Node<T>>),
            Copy(&'a Node<T>),
        }

        let mut steps = vec![Step::Visit(self.root.as_deref())];
        let mut built: Vec<Link<T>> = Vec::new();
        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(None) => built.push(None),
                Step::Visit(Some(node)) => {
                    steps.push(Step::Copy(node));
                    steps.push(Step::Visit(node.right.as_deref()));
                    steps.push(Step::Visit(node.left.as_deref()));
                }
                Step::Copy(node) => {
                    let right = built.pop().flatten();
                    let left = built.pop().flatten();
                    built.push(Some(Box::new(Node {
                        element: node.element.clone(),
                        deleted: node.deleted,
                        left,
                        right,
                    })));
                }
            }
        }

        built.pop().flatten()
    }

    /// In debug builds, counts the live and deleted nodes and asserts they match the counters.
    fn check_counts(&self) {
        if cfg!(debug_assertions) {
            let mut live = 0;
            let mut deleted = 0;
            let mut stack: Vec<_> = self.root.as_deref().into_iter().collect();
            while let Some(node) = stack.pop() {
                if node.deleted {
                    deleted += 1;
                } else {
                    live += 1;
                }
                stack.extend(node.left.as_deref());
                stack.extend(node.right.as_deref());
            }
            assert_eq!(
                (live, deleted),
                (self.size, self.deleted),
                "counters out of sync with node flags"
            );
        }
    }

    /// Drops every node with an explicit stack so a degenerate tree can't overflow the call
    /// stack. Returns how many nodes were dropped.
    fn free_nodes(&mut self) -> usize {
        let mut freed = 0;
        let mut stack: Vec<_> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
            freed += 1;
        }
        self.size = 0;
        self.deleted = 0;

        freed
    }

    /// Finds the node equal to `element` whether it is deleted or not.
    fn find_node(&self, element: &T) -> Option<&Node<T>>
    where
        T: Ord,
    {
        let mut link = self.root.as_deref();
        while let Some(node) = link {
            match element.cmp(&node.element) {
                Ordering::Less => link = node.left.as_deref(),
                Ordering::Equal => return Some(node),
                Ordering::Greater => link = node.right.as_deref(),
            }
        }

        None
    }
}

impl<T> FromIterator<T> for LazyTree<T>
where
    T: Ord,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T> Extend<T> for LazyTree<T>
where
    T: Ord,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.insert(element);
        }
    }
}

impl<'a, T> IntoIterator for &'a LazyTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

type Link<T> = Option<Box<Node<T>>>;

struct Node<T> {
    element: T,
    deleted: bool,
    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    fn new(element: T) -> Self {
        Self {
            element,
            deleted: false,
            left: None,
            right: None,
        }
    }
}

/// An in-order iterator over every node of a [`LazyTree`], deleted or not. Created by
/// [`LazyTree::iter_hard`].
///
/// The front and back of the iteration each keep a stack of the nodes whose left (or right)
/// subtree has been visited, so memory use is bounded by the height of the tree.
pub struct HardIter<'a, T> {
    front: Vec<&'a Node<T>>,
    back: Vec<&'a Node<T>>,
    /// Nodes not yet yielded from either end. The two stacks walk the whole tree independently
    /// so this is what keeps them from crossing.
    remaining: usize,
}

impl<T> Clone for HardIter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T> HardIter<'a, T> {
    fn new(root: Option<&'a Node<T>>, len: usize) -> Self {
        let mut iter = Self {
            front: Vec::new(),
            back: Vec::new(),
            remaining: len,
        };
        iter.push_left_path(root);
        iter.push_right_path(root);
        iter
    }

    fn push_left_path(&mut self, mut link: Option<&'a Node<T>>) {
        while let Some(node) = link {
            self.front.push(node);
            link = node.left.as_deref();
        }
    }

    fn push_right_path(&mut self, mut link: Option<&'a Node<T>>) {
        while let Some(node) = link {
            self.back.push(node);
            link = node.right.as_deref();
        }
    }

    fn next_node(&mut self) -> Option<&'a Node<T>> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.front.pop()?;
        self.remaining -= 1;
        self.push_left_path(node.right.as_deref());
        Some(node)
    }

    fn next_node_back(&mut self) -> Option<&'a Node<T>> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.back.pop()?;
        self.remaining -= 1;
        self.push_right_path(node.left.as_deref());
        Some(node)
    }
}

impl<'a, T> Iterator for HardIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_node().map(|node| &node.element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for HardIter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.next_node_back().map(|node| &node.element)
    }
}

impl<T> ExactSizeIterator for HardIter<'_, T> {}

impl<T> FusedIterator for HardIter<'_, T> {}

/// An in-order iterator over the live elements of a [`LazyTree`]. Created by [`LazyTree::iter`].
pub struct Iter<'a, T> {
    nodes: HardIter<'a, T>,
    /// Live elements not yet yielded from either end.
    remaining: usize,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while let Some(node) = self.nodes.next_node() {
            if !node.deleted {
                self.remaining -= 1;
                return Some(&node.element);
            }
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        while let Some(node) = self.nodes.next_node_back() {
            if !node.deleted {
                self.remaining -= 1;
                return Some(&node.element);
            }
        }

        None
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
