//! The contract between a fork tree and the units of work it carries.
//!
//! A unit of work is owned by whoever holds it: the tree while the unit sits in a leaf, the engine after the unit has been retired. The only thing the tree needs from a unit is a place to write down the index of the leaf currently holding it, which the engine can then read to find the unit's position in the tree without maintaining a separate map. That back-reference is *not* ownership: the tree never reads it and does not clear it when the unit leaves the tree.

use alloc::{boxed::Box, rc::Rc};
use core::{
    cell::RefCell,
    ops::{Deref, DerefMut},
};
use crate::NodeIndex;

/// Units of work which can be carried by the leaves of a fork tree.
///
/// # Example
/// ```rust
/// use kindling::{ForkTree, NodeIndex, Unit};
///
/// #[derive(Debug)]
/// struct ExecutionState {
///     program_counter: usize,
///     node: Option<NodeIndex>,
/// }
/// impl Unit for ExecutionState {
///     fn tree_index(&self) -> Option<NodeIndex> {
///         self.node
///     }
///     fn set_tree_index(&mut self, index: NodeIndex) {
///         self.node = Some(index);
///     }
/// }
///
/// let tree = ForkTree::new(ExecutionState { program_counter: 0, node: None });
/// assert_eq!(tree.root().unit().and_then(Unit::tree_index), Some(NodeIndex::ROOT));
/// ```
pub trait Unit {
    /// Returns the index of the leaf which was last recorded as holding this unit, or `None` if the unit has never been placed into a tree.
    ///
    /// After the unit has been retired, this keeps returning the index of its last leaf, which may already have been reused.
    fn tree_index(&self) -> Option<NodeIndex>;
    /// Records the index of the leaf which holds this unit. Called by the tree whenever the unit is placed into a leaf.
    fn set_tree_index(&mut self, index: NodeIndex);
}

impl<U: Unit + ?Sized> Unit for Box<U> {
    #[inline]
    fn tree_index(&self) -> Option<NodeIndex> {
        (**self).tree_index()
    }
    #[inline]
    fn set_tree_index(&mut self, index: NodeIndex) {
        (**self).set_tree_index(index)
    }
}

/// Lets the engine keep its own handle to a unit while the tree holds another one.
///
/// # Panics
/// Both methods borrow the cell and will panic if it's already mutably borrowed elsewhere.
impl<U: Unit + ?Sized> Unit for Rc<RefCell<U>> {
    #[inline]
    fn tree_index(&self) -> Option<NodeIndex> {
        self.borrow().tree_index()
    }
    #[inline]
    fn set_tree_index(&mut self, index: NodeIndex) {
        self.borrow_mut().set_tree_index(index)
    }
}

/// A value paired with the index of the leaf holding it, for values which don't have a place for the back-reference on their own.
///
/// # Example
/// ```rust
/// use kindling::{ForkTree, NodeIndex, Tracked, Unit};
///
/// let mut tree = ForkTree::new(Tracked::new(0_u32));
/// let forked = tree.fork(NodeIndex::ROOT, Tracked::new(1), Tracked::new(2));
/// let right = tree.unit(forked.right).unwrap();
/// assert_eq!(**right, 2);
/// assert_eq!(right.tree_index(), Some(forked.right));
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tracked<T> {
    value: T,
    index: Option<NodeIndex>,
}
impl<T> Tracked<T> {
    /// Wraps a value which has not been placed into a tree yet.
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self { value, index: None }
    }
    /// Returns a reference to the wrapped value.
    #[inline(always)]
    pub const fn value(&self) -> &T {
        &self.value
    }
    /// Returns a *mutable* reference to the wrapped value.
    #[inline(always)]
    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }
    /// Consumes the wrapper and returns the wrapped value, discarding the back-reference.
    #[inline(always)]
    #[allow(clippy::missing_const_for_fn)] // const fn cannot evaluate drop
    pub fn into_inner(self) -> T {
        self.value
    }
}
impl<T> Unit for Tracked<T> {
    #[inline(always)]
    fn tree_index(&self) -> Option<NodeIndex> {
        self.index
    }
    #[inline(always)]
    fn set_tree_index(&mut self, index: NodeIndex) {
        self.index = Some(index);
    }
}
impl<T> From<T> for Tracked<T> {
    #[inline(always)]
    fn from(value: T) -> Self {
        Self::new(value)
    }
}
impl<T> Deref for Tracked<T> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        &self.value
    }
}
impl<T> DerefMut for Tracked<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}
