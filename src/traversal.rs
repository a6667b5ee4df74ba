//! Walks over the ancestry and the descendants of a node.
//!
//! The module is home to the following items:
//! - [`Ancestors`], walking from a node up to the root, which answers "which fork points led to this unit of work"
//! - [`Descendants`], walking a subtree in pre-order, which answers "which units of work did this fork point produce"
//!
//! Both are built purely on top of single-node lookups and borrow the tree immutably, so the tree cannot be forked or retired from while a walk is in progress.
//!
//! [`Ancestors`]: struct.Ancestors.html " "
//! [`Descendants`]: struct.Descendants.html " "

use alloc::vec::Vec;
use core::{
    fmt::{self, Debug, Formatter},
    iter::FusedIterator,
};
use crate::{fork_tree::ForkTree, NodeIndex};

/// An iterator over the indices of a node and its ancestors, from the node up to the root.
///
/// Created by [`ForkTree::ancestors`] and [`NodeRef::ancestors`].
///
/// [`ForkTree::ancestors`]: ../fork_tree/struct.ForkTree.html#method.ancestors " "
/// [`NodeRef::ancestors`]: ../fork_tree/struct.NodeRef.html#method.ancestors " "
pub struct Ancestors<'a, P> {
    tree: &'a ForkTree<P>,
    next: Option<NodeIndex>,
}
impl<'a, P> Ancestors<'a, P> {
    /// Starts a walk at `index`. The walk is empty if there is no live node there.
    #[inline]
    pub fn new(tree: &'a ForkTree<P>, index: NodeIndex) -> Self {
        let next = Some(index).filter(|&x| tree.contains(x));
        Self { tree, next }
    }
}
impl<'a, P> Iterator for Ancestors<'a, P> {
    type Item = NodeIndex;

    #[inline]
    fn next(&mut self) -> Option<NodeIndex> {
        let current = self.next?;
        self.next = self.tree.node(current).and_then(|node| node.parent());
        Some(current)
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        // At most every live node lies on the path.
        match self.next {
            Some(..) => (1, Some(self.tree.len())),
            None => (0, Some(0)),
        }
    }
}
impl<'a, P> FusedIterator for Ancestors<'a, P> {}
impl<'a, P> Clone for Ancestors<'a, P> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            next: self.next,
        }
    }
}
impl<'a, P> Debug for Ancestors<'a, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ancestors")
            .field("next", &self.next)
            .finish()
    }
}

/// An iterator over the indices of a node and all of its descendants, in pre-order, visiting left children before right ones.
///
/// The walk keeps an explicit stack instead of recursing, so its depth is not limited by the call stack.
///
/// Created by [`ForkTree::descendants`] and [`NodeRef::descendants`].
///
/// [`ForkTree::descendants`]: ../fork_tree/struct.ForkTree.html#method.descendants " "
/// [`NodeRef::descendants`]: ../fork_tree/struct.NodeRef.html#method.descendants " "
pub struct Descendants<'a, P> {
    tree: &'a ForkTree<P>,
    stack: Vec<NodeIndex>,
}
impl<'a, P> Descendants<'a, P> {
    /// Starts a walk at `index`. The walk is empty if there is no live node there.
    #[inline]
    pub fn new(tree: &'a ForkTree<P>, index: NodeIndex) -> Self {
        let mut stack = Vec::new();
        if tree.contains(index) {
            stack.push(index);
        }
        Self { tree, stack }
    }
}
impl<'a, P> Iterator for Descendants<'a, P> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        let current = self.stack.pop()?;
        if let Some(node) = self.tree.node(current) {
            // Right goes first so that left gets popped first
            self.stack.extend(node.right());
            self.stack.extend(node.left());
        }
        Some(current)
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.stack.len(), Some(self.tree.len()))
    }
}
impl<'a, P> FusedIterator for Descendants<'a, P> {}
impl<'a, P> Clone for Descendants<'a, P> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
        }
    }
}
impl<'a, P> Debug for Descendants<'a, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descendants")
            .field("stack", &self.stack)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use crate::Tracked;

    #[test]
    fn walks_of_vacant_indices_are_empty() {
        let tree = ForkTree::new(Tracked::new(()));
        let vacant = NodeIndex::new(5).expect("5 is not the sentinel");
        assert_eq!(tree.ancestors(vacant).next(), None);
        assert_eq!(tree.descendants(vacant).next(), None);
    }

    #[test]
    fn descendants_visit_left_before_right() {
        let mut tree = ForkTree::new(Tracked::new(0));
        let top = tree.fork(NodeIndex::ROOT, Tracked::new(1), Tracked::new(2));
        let right = tree.fork(top.right, Tracked::new(3), Tracked::new(4));
        let left = tree.fork(top.left, Tracked::new(5), Tracked::new(6));

        let order: Vec<NodeIndex> = tree.descendants(NodeIndex::ROOT).collect();
        assert_eq!(
            order,
            vec![
                NodeIndex::ROOT,
                top.left, left.left, left.right,
                top.right, right.left, right.right,
            ],
        );
        let subtree: Vec<NodeIndex> = tree.descendants(top.right).collect();
        assert_eq!(subtree, vec![top.right, right.left, right.right]);
    }

    #[test]
    fn ancestors_end_at_the_root() {
        let mut tree = ForkTree::new(Tracked::new(0));
        let mut leaf = NodeIndex::ROOT;
        let mut path = vec![leaf];
        for i in 0..10 {
            leaf = tree.fork(leaf, Tracked::new(i), Tracked::new(-i)).left;
            path.push(leaf);
        }
        path.reverse();
        let walked: Vec<NodeIndex> = tree.ancestors(leaf).collect();
        assert_eq!(walked, path);
        assert_eq!(tree.node_ref(leaf).map(|x| x.depth()), Some(10));
    }
}
