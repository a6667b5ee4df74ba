use core::fmt::{self, Debug, Formatter};
use arrayvec::ArrayVec;
use crate::{
    traversal::{Ancestors, Descendants},
    util::corrupted,
    NodeIndex,
};
use super::{ForkTree, Node};

/// A reference to a node in a fork tree.
///
/// Since this type does not point to the node directly, but rather the tree the node is in and the index of the node in the storage, it can be used to traverse the tree.
pub struct NodeRef<'a, P> {
    tree: &'a ForkTree<P>,
    index: NodeIndex,
    node: &'a Node<P>,
}
impl<'a, P> NodeRef<'a, P> {
    /// Creates a new `NodeRef` pointing to the specified index in the tree, or `None` if there is no live node there.
    #[inline]
    pub fn new(tree: &'a ForkTree<P>, index: NodeIndex) -> Option<Self> {
        tree.node(index).map(|node| Self { tree, index, node })
    }
    /// Creates a reference to a node which another live node links to.
    #[inline]
    fn linked(&self, index: NodeIndex) -> Self {
        Self::new(self.tree, index)
            .unwrap_or_else(|| corrupted(format_args!("node {} links to vacant node {}", self.index, index)))
    }

    /// Returns the index of the node.
    #[inline(always)]
    pub fn index(&self) -> NodeIndex {
        self.index
    }
    /// Returns the raw node record.
    #[inline(always)]
    pub fn node(&self) -> &'a Node<P> {
        self.node
    }
    /// Returns the tree the node belongs to.
    #[inline(always)]
    pub fn tree(&self) -> &'a ForkTree<P> {
        self.tree
    }
    /// Returns a reference to the parent node of the pointee, or `None` if it's the root node.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.node.parent.map(|x| self.linked(x))
    }
    /// Returns `true` if the node is the root node, `false` otherwise.
    #[inline(always)]
    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }
    /// Returns `true` if the node is a *leaf*, i.e. carries a unit of work; `false` otherwise.
    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }
    /// Returns `true` if the node is a *branch*, i.e. has one or two child nodes; `false` otherwise.
    #[inline(always)]
    pub fn is_branch(&self) -> bool {
        self.node.is_branch()
    }
    /// Returns `true` if the node is a *full branch*, i.e. has exactly two child nodes; `false` otherwise.
    #[inline(always)]
    pub fn is_full_branch(&self) -> bool {
        self.node.left.is_some() && self.node.right.is_some()
    }
    /// Returns `true` if the node has no children, which is the case for leaves and for the root of an exhausted tree.
    #[inline(always)]
    pub fn is_childless(&self) -> bool {
        !self.node.has_children()
    }
    /// Returns a reference to the unit of work carried by the node, or `None` if it is not a leaf.
    #[inline(always)]
    pub fn unit(&self) -> Option<&'a P> {
        self.node.unit()
    }
    /// Returns a reference to the left child, or `None` if there is none.
    #[inline]
    pub fn left_child(&self) -> Option<Self> {
        self.node.left.map(|x| self.linked(x))
    }
    /// Returns a reference to the right child, or `None` if there is none.
    #[inline]
    pub fn right_child(&self) -> Option<Self> {
        self.node.right.map(|x| self.linked(x))
    }
    /// Returns references to the children, or `None` if the node is not a full branch. To retrieve the remaining child of a branch whose other child has been pruned, see [`child_refs`].
    ///
    /// [`child_refs`]: #method.child_refs " "
    pub fn children(&self) -> Option<(Self, Self)> {
        match (self.left_child(), self.right_child()) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }
    /// Returns references to the children which are present, left first.
    pub fn child_refs(&self) -> ArrayVec<[Self; 2]> {
        self.left_child()
            .into_iter()
            .chain(self.right_child())
            .collect()
    }
    /// Returns `true` if the node is the left child of its parent, `false` if it's the right one and `None` if it's the root node.
    #[inline]
    pub fn is_left_child(&self) -> Option<bool> {
        let parent = self.parent()?;
        Some(parent.node.left == Some(self.index))
    }
    /// Returns `true` if the node is the right child of its parent, `false` if it's the left one and `None` if it's the root node.
    #[inline]
    pub fn is_right_child(&self) -> Option<bool> {
        let parent = self.parent()?;
        Some(parent.node.right == Some(self.index))
    }
    /// Returns the number of fork points between the node and the root, i.e. 0 for the root.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }
    /// Returns an iterator over the indices of the node and its ancestors, starting with the node itself and ending with the root.
    ///
    /// # Example
    /// ```rust
    /// # use kindling::{ForkTree, NodeIndex, Tracked};
    /// let mut tree = ForkTree::new(Tracked::new(0));
    /// let first = tree.fork(NodeIndex::ROOT, Tracked::new(1), Tracked::new(2));
    /// let second = tree.fork(first.right, Tracked::new(3), Tracked::new(4));
    ///
    /// let provenance: Vec<NodeIndex> = tree.node_ref(second.left).unwrap().ancestors().collect();
    /// assert_eq!(provenance, [second.left, first.right, NodeIndex::ROOT]);
    /// ```
    #[inline]
    pub fn ancestors(&self) -> Ancestors<'a, P> {
        Ancestors::new(self.tree, self.index)
    }
    /// Returns an iterator over the indices of the node and all of its descendants, in pre-order, visiting left children before right ones.
    #[inline]
    pub fn descendants(&self) -> Descendants<'a, P> {
        Descendants::new(self.tree, self.index)
    }
    /// Returns an iterator over the indices of the leaves among the node and its descendants, i.e. the live units of work which descend from the node.
    ///
    /// # Example
    /// ```rust
    /// # use kindling::{ForkTree, NodeIndex, Tracked};
    /// let mut tree = ForkTree::new(Tracked::new(0));
    /// let first = tree.fork(NodeIndex::ROOT, Tracked::new(1), Tracked::new(2));
    /// let second = tree.fork(first.left, Tracked::new(3), Tracked::new(4));
    ///
    /// let live_units: Vec<i32> = tree
    ///     .root()
    ///     .leaves()
    ///     .filter_map(|index| tree.unit(index))
    ///     .map(|unit| **unit)
    ///     .collect();
    /// assert_eq!(live_units, [3, 4, 2]);
    /// ```
    pub fn leaves(&self) -> impl Iterator<Item = NodeIndex> + 'a {
        let tree = self.tree;
        self.descendants()
            .filter(move |&index| tree.unit(index).is_some())
    }
}
impl<'a, P> Copy for NodeRef<'a, P> {}
impl<'a, P> Clone for NodeRef<'a, P> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, P: Debug> Debug for NodeRef<'a, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("index", &self.index)
            .field("node", self.node)
            .finish()
    }
}
