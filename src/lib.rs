//! Implements an index-addressed fork tree for tracking the branching history of search processes.
//!
//! # Overview
//! A search process (a symbolic executor, a model checker, a solver exploring a decision tree) repeatedly forks a unit of work into two successors and later retires units which finished or were discarded. Kindling records that history as a binary tree in which every leaf carries a live unit and every branch node is a fork point, which lets the engine walk from any live unit up to the root to see which decisions led to it, or down from any fork point to the units it produced.
//!
//! The tree is stored using the ["arena-allocated trees"][arena tree blog post] technique: nodes live in a flat, growable array of fixed-size records and refer to each other by 32-bit index instead of by pointer. A bitset records which slots are occupied. Forking allocates the children in vacant slots close to their parent, and retiring a leaf eagerly prunes every ancestor which no longer leads to a live unit. Slots are reused rather than deallocated, so millions of fork/retire events cost no allocations beyond the occasional growth of the array.
//!
//! # Units of work
//! The tree does not know anything about the units it carries except for one thing: each unit records the index of the leaf currently holding it, so that the engine can find a unit's position without keeping a separate map. This is expressed by the [`Unit`] trait. [`Tracked`] is a ready-made implementation, and `Box` and `Rc<RefCell<_>>` forward to the unit they hold.
//!
//! # Example
//! ```rust
//! use kindling::{ForkTree, NodeIndex, Tracked, Unit};
//!
//! let mut tree = ForkTree::new(Tracked::new("initial state"));
//! assert_eq!(tree.root().unit().map(Tracked::value), Some(&"initial state"));
//!
//! // The engine hits a branch and forks the state into two successors:
//! let (then_branch, else_branch) = tree.fork_with(NodeIndex::ROOT, |state| {
//!     (state, Tracked::new("else branch"))
//! });
//! assert_eq!(tree.unit(then_branch).and_then(Unit::tree_index), Some(then_branch));
//!
//! // The else branch runs to completion:
//! let finished = tree.retire(else_branch);
//! assert_eq!(*finished.value(), "else branch");
//!
//! // The surviving state can be traced back to the root:
//! let lineage: Vec<NodeIndex> = tree.ancestors(then_branch).collect();
//! assert_eq!(lineage, [then_branch, NodeIndex::ROOT]);
//! ```
//!
//! # Feature flags
//! - `std` (**enabled by default**): enables the full standard library, disabling `no_std` for the crate. Currently, this only adds [`Error`] trait implementations for the error types. *The crate always requires a global allocator.*
//! - `unwind_safety` (**enabled by default**): if the tree detects that its own bookkeeping got corrupted, or if engine code called in the middle of a fork (the `fork_with` closure, `Unit::set_tree_index`) panics, the process exits with code 101 instead of unwinding, to prevent unwinders from observing a half-updated tree. Requires `std`.
//! - `tracing`: emits allocation, pruning and growth events through the [`tracing`] crate. Without it, logging compiles to nothing.
//!
//! # Public dependencies
//! - `arrayvec` (**required**): `^0.5`
//!
//! [`Unit`]: unit/trait.Unit.html " "
//! [`Tracked`]: unit/struct.Tracked.html " "
//! [`Error`]: https://doc.rust-lang.org/std/error/trait.Error.html " "
//! [`tracing`]: https://docs.rs/tracing " "
//! [arena tree blog post]: https://dev.to/deciduously/no-more-tears-no-more-knots-arena-allocated-trees-in-rust-44k6 " "

#![warn(
    rust_2018_idioms,
    clippy::cargo,
    clippy::nursery,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    variant_size_differences,
    clippy::cast_lossless,
    clippy::checked_conversions,
    clippy::explicit_iter_loop,
    clippy::explicit_into_iter_loop,
    clippy::map_unwrap_or,
    clippy::implicit_saturating_sub,
    clippy::inefficient_to_string,
    clippy::items_after_statements,
    clippy::match_same_arms,
    clippy::match_wildcard_for_single_variants,
    clippy::mut_mut,
    clippy::needless_continue,
    clippy::needless_pass_by_value,
    clippy::redundant_closure_for_method_calls,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::too_many_lines,
    clippy::trivially_copy_pass_by_ref,
    clippy::unnested_or_patterns,
    clippy::unused_self,
    clippy::used_underscore_binding,
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::get_unwrap,
    clippy::unwrap_used, // Only .expect() allowed
    clippy::use_debug,
)]
#![deny(
    anonymous_parameters,
    bare_trait_objects,
)]
#![allow(clippy::use_self)]
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]

extern crate alloc;

mod tracing_helpers;

pub mod storage;
#[doc(no_inline)]
pub use storage::{SlotStorage, StorageConfig};

pub mod unit;
pub use unit::{Unit, Tracked};

pub mod fork_tree;
pub use fork_tree::{ForkTree, Forked, Node, NodeRef};

pub mod traversal;
pub use traversal::{Ancestors, Descendants};

/// A prelude for using Kindling, containing the most used types for glob-importing.
pub mod prelude {
    #[doc(no_inline)]
    pub use crate::{
        fork_tree::{ForkTree, Forked, NodeRef as ForkTreeNodeRef},
        storage::StorageConfig as ForkTreeStorageConfig,
        unit::{Unit, Tracked},
        NodeIndex,
        LeafError,
        TryForkError,
    };
}

pub(crate) mod util;

#[cfg(test)]
mod proptests;

use core::{
    convert::TryFrom,
    fmt::{self, Formatter, Display},
    num::NonZeroU32,
};
use arrayvec::ArrayVec;

/// The index of a node of a fork tree.
///
/// Indices are never 0, since slot 0 of the tree's storage is a permanent "no node" sentinel. Thanks to that, `Option<NodeIndex>` takes up 4 bytes, with `None` playing the role of the sentinel.
///
/// An index only stays meaningful while the node it names is live: once that node is retired, its slot gets reused for nodes created later on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NodeIndex(NonZeroU32);
impl NodeIndex {
    /// The index of the root node, which is the same for every tree.
    pub const ROOT: Self = Self(unsafe {
        // SAFETY: 1 is not 0
        NonZeroU32::new_unchecked(1)
    });

    /// Creates an index from its raw value, or returns `None` if the value is the sentinel value 0.
    #[inline]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(x) => Some(Self(x)),
            None => None,
        }
    }
    /// Returns the raw value of the index.
    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
    /// Returns `true` if this is the index of the root node.
    #[inline(always)]
    pub const fn is_root(self) -> bool {
        self.0.get() == Self::ROOT.0.get()
    }
    #[inline(always)]
    pub(crate) const fn slot(self) -> usize {
        self.0.get() as usize
    }
    /// Converts a slot of the storage into an index.
    ///
    /// The storage never hands out the sentinel slot or slots past the 32-bit range, so failing here means its bookkeeping is broken.
    #[inline]
    pub(crate) fn from_slot(slot: usize) -> Self {
        u32::try_from(slot)
            .ok()
            .and_then(Self::new)
            .unwrap_or_else(|| util::corrupted(format_args!("slot {} cannot be named by a node index", slot)))
    }
}
impl Display for NodeIndex {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
impl From<NodeIndex> for u32 {
    #[inline(always)]
    fn from(index: NodeIndex) -> Self {
        index.get()
    }
}

/// The error type returned by methods on fork trees which expect a leaf node, i.e. a live node carrying a unit of work.
///
/// When one of those is returned, the tree has not been modified.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum LeafError {
    /// There is no live node at the index. It was either never allocated or already retired.
    Vacant(NodeIndex),
    /// The node was a branch node, which does not carry a unit of work.
    WasInternalNode(NodeIndex),
    /// The node was the root of an exhausted tree, i.e. one in which every unit of work has been retired.
    WasExhausted,
}
impl LeafError {
    /// Returns the index which the operation was attempted on.
    #[inline]
    pub const fn index(&self) -> NodeIndex {
        match self {
            Self::Vacant(index) | Self::WasInternalNode(index) => *index,
            Self::WasExhausted => NodeIndex::ROOT,
        }
    }
}
impl Display for LeafError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vacant(index) => write!(f, "there is no live node at index {}", index),
            Self::WasInternalNode(index) => write!(
                f,
                "expected a leaf node at index {}, found a branch node",
                index,
            ),
            Self::WasExhausted => f.pad("the tree is exhausted, its root does not carry a unit of work"),
        }
    }
}
#[cfg(feature = "std")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "std")))]
impl std::error::Error for LeafError {}

/// The error type returned by [`ForkTree::try_fork`], which occurs when the node to fork is not a leaf.
///
/// [`ForkTree::try_fork`]: fork_tree/struct.ForkTree.html#method.try_fork " "
#[derive(Clone, Debug)]
pub struct TryForkError<P> {
    /// The reason why the node could not be forked.
    pub cause: LeafError,
    /// The successor units which were passed to the function and were deemed useless because the call failed, provided here so that they don't get dropped if they could instead be reused in the event of a failure. The left successor comes first.
    pub packed_units: ArrayVec<[P; 2]>,
}
impl<P> TryForkError<P> {
    #[inline]
    pub(crate) fn new(cause: LeafError, left: P, right: P) -> Self {
        Self {
            cause,
            packed_units: ArrayVec::from([left, right]),
        }
    }
    /// Extracts the successor units which were passed to the failed call, as a `(left, right)` pair.
    pub fn into_units(self) -> (P, P) {
        let mut units = self.packed_units.into_iter();
        match (units.next(), units.next()) {
            (Some(left), Some(right)) => (left, right),
            _ => util::corrupted("a fork error always packs both successor units"),
        }
    }
}
impl<P> Display for TryForkError<P> {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "cannot fork: {}", self.cause)
    }
}
#[cfg(feature = "std")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "std")))]
impl<P: fmt::Debug> std::error::Error for TryForkError<P> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}
