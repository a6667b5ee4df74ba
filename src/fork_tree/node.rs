use crate::NodeIndex;

/// A node of a fork tree.
///
/// Nodes are fixed-size records which refer to their relatives by index. A live node is either a *leaf*, which carries a unit of work and has no children, or a *branch*, which marks a fork point, has at least one child and carries no unit. The root of an exhausted tree is the only live node which is neither.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Node<P> {
    pub(super) left: Option<NodeIndex>,
    pub(super) right: Option<NodeIndex>,
    pub(super) parent: Option<NodeIndex>,
    pub(super) unit: Option<P>,
}
impl<P> Node<P> {
    #[inline(always)]
    pub(super) const fn leaf(unit: P, parent: Option<NodeIndex>) -> Self {
        Self {
            left: None,
            right: None,
            parent,
            unit: Some(unit),
        }
    }

    /// Returns the index of the left child, or `None` if there is none.
    #[inline(always)]
    pub const fn left(&self) -> Option<NodeIndex> {
        self.left
    }
    /// Returns the index of the right child, or `None` if there is none.
    #[inline(always)]
    pub const fn right(&self) -> Option<NodeIndex> {
        self.right
    }
    /// Returns the index of the parent, or `None` for the root node.
    #[inline(always)]
    pub const fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }
    /// Returns the unit of work carried by the node, or `None` if the node is not a leaf.
    #[inline(always)]
    pub const fn unit(&self) -> Option<&P> {
        self.unit.as_ref()
    }
    /// Returns `true` if the node has at least one child.
    #[inline(always)]
    pub const fn has_children(&self) -> bool {
        self.left.is_some() || self.right.is_some()
    }
    /// Returns `true` if the node is a *leaf*, i.e. carries a unit of work.
    #[inline(always)]
    pub const fn is_leaf(&self) -> bool {
        self.unit.is_some()
    }
    /// Returns `true` if the node is a *branch*, i.e. has one or two children.
    #[inline(always)]
    pub const fn is_branch(&self) -> bool {
        self.has_children()
    }

    /// Clears whichever child link points at `child`, returning `false` if neither does.
    pub(super) fn detach_child(&mut self, child: NodeIndex) -> bool {
        if self.left == Some(child) {
            self.left = None;
        } else if self.right == Some(child) {
            self.right = None;
        } else {
            return false;
        }
        true
    }
}
// Vacant slots hold this; a manual impl because `P` need not be `Default`
impl<P> Default for Node<P> {
    #[inline(always)]
    fn default() -> Self {
        Self {
            left: None,
            right: None,
            parent: None,
            unit: None,
        }
    }
}
