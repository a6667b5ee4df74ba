//! Binary trees recording how units of work were forked and which of them are still live.
//!
//! Every leaf of a fork tree carries a live unit of work. Forking a leaf turns it into a branch node with two fresh leaves, one per successor unit, and retiring a leaf removes it along with every ancestor which no longer leads to a live unit. As a result, the tree only ever contains the ancestry of the live units: the path from any leaf to the root lists the fork points which produced it.
//!
//! Nodes are addressed by [`NodeIndex`]. The root always lives at [`NodeIndex::ROOT`] and is never removed; once every unit has been retired, the root stays behind without children and without a unit, and the tree reports itself as [exhausted].
//!
//! # Example
//! ```rust
//! use kindling::fork_tree::ForkTree;
//! use kindling::{NodeIndex, Tracked};
//!
//! // Create the tree. The only thing we need for that is the unit of work for the root node.
//! let mut tree = ForkTree::new(Tracked::new("start"));
//!
//! // Fork the root. The unit it carried is handed back, along with the new leaves.
//! let forked = tree.fork(NodeIndex::ROOT, Tracked::new("x < 0"), Tracked::new("x >= 0"));
//! assert_eq!(*forked.unit, "start");
//!
//! // Let's look at the tree now.
//! let root = tree.root();
//! assert!(root.is_branch());
//! let (left, right) = root.children().unwrap();
//! assert_eq!(left.unit().map(|x| **x), Some("x < 0"));
//! assert_eq!(right.unit().map(|x| **x), Some("x >= 0"));
//!
//! // Retire both leaves. The root stays, but the tree is exhausted.
//! tree.retire(forked.left);
//! tree.retire(forked.right);
//! assert!(tree.is_exhausted());
//! assert_eq!(tree.len(), 1);
//! ```
//!
//! [`NodeIndex`]: ../struct.NodeIndex.html " "
//! [`NodeIndex::ROOT`]: ../struct.NodeIndex.html#associatedconstant.ROOT " "
//! [exhausted]: struct.ForkTree.html#method.is_exhausted " "

mod base;
mod node;
mod node_ref;

pub use base::ForkTree;
pub use node::Node;
pub use node_ref::NodeRef;

use crate::NodeIndex;

/// The outcome of forking a leaf with [`ForkTree::fork`]/[`ForkTree::try_fork`].
///
/// [`ForkTree::fork`]: struct.ForkTree.html#method.fork " "
/// [`ForkTree::try_fork`]: struct.ForkTree.html#method.try_fork " "
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Forked<P> {
    /// The unit of work which the forked leaf carried.
    pub unit: P,
    /// The index of the leaf carrying the left successor.
    pub left: NodeIndex,
    /// The index of the leaf carrying the right successor.
    pub right: NodeIndex,
}
