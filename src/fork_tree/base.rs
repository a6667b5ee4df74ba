use crate::{
    storage::{SlotStorage, StorageConfig},
    tracing_helpers::{debug_log, trace_log},
    traversal::{Ancestors, Descendants},
    util::{abort_on_panic, contract_violation, corrupted},
    LeafError,
    NodeIndex,
    TryForkError,
    Unit,
};
use super::{Forked, Node, NodeRef};

/// The first slot which can be handed out to a child node. Slot 0 is the sentinel and slot 1 always holds the root.
const FIRST_CHILD_SLOT: usize = 2;

/// A fork tree.
///
/// See the [module-level documentation] for more.
///
/// [module-level documentation]: index.html " "
#[derive(Clone, Debug)]
pub struct ForkTree<P> {
    storage: SlotStorage<Node<P>>,
}
impl<P: Unit> ForkTree<P> {
    /// The index of the root node.
    pub const ROOT: NodeIndex = NodeIndex::ROOT;

    /// Creates a fork tree with the specified unit of work at the root, using the default storage configuration.
    ///
    /// # Example
    /// ```rust
    /// # use kindling::{ForkTree, NodeIndex, Tracked, Unit};
    /// let tree = ForkTree::new(Tracked::new("main"));
    ///
    /// let root = tree.node(NodeIndex::ROOT).unwrap();
    /// assert_eq!(root.parent(), None);
    /// assert_eq!(root.left(), None);
    /// assert_eq!(root.right(), None);
    /// assert_eq!(root.unit().and_then(Unit::tree_index), Some(NodeIndex::ROOT));
    /// ```
    #[inline]
    pub fn new(root: P) -> Self {
        Self::with_config(StorageConfig::default(), root)
    }
    /// Creates a fork tree with the specified unit of work at the root and the specified storage configuration.
    ///
    /// # Example
    /// ```rust
    /// # use kindling::{ForkTree, StorageConfig, Tracked};
    /// // Preallocate room for more nodes up front, and grow in larger steps:
    /// let config = StorageConfig::new()
    ///     .with_initial_capacity(1 << 16)
    ///     .with_growth_increment(1 << 14);
    /// let tree = ForkTree::with_config(config, Tracked::new(()));
    /// assert_eq!(tree.capacity(), 1 << 16);
    /// assert_eq!(tree.len(), 1);
    /// ```
    pub fn with_config(config: StorageConfig, mut root: P) -> Self {
        let mut storage = SlotStorage::with_config(config, FIRST_CHILD_SLOT);
        root.set_tree_index(Self::ROOT);
        storage.place(Self::ROOT.slot(), Node::leaf(root, None));
        Self { storage }
    }

    /// Forks the leaf at `index` into two leaves carrying the specified successor units, returning the unit the leaf carried before along with the indices of the new leaves.
    ///
    /// The successors' back-references are pointed at their new leaves, and the forked node becomes a branch node.
    ///
    /// # Errors
    /// Will fail if there is no leaf at `index`: the index may be vacant, point at a branch node, or point at the root of an exhausted tree. In such a case, the tree is left untouched and the successor units are returned back to the caller.
    ///
    /// # Example
    /// ```rust
    /// # use kindling::{ForkTree, LeafError, NodeIndex, Tracked};
    /// let mut tree = ForkTree::new(Tracked::new('r'));
    /// let forked = tree.try_fork(NodeIndex::ROOT, Tracked::new('a'), Tracked::new('b')).unwrap();
    /// assert_eq!(*forked.unit, 'r');
    ///
    /// // The root is a branch node now and cannot be forked again:
    /// let error = tree.try_fork(NodeIndex::ROOT, Tracked::new('c'), Tracked::new('d')).unwrap_err();
    /// assert_eq!(error.cause, LeafError::WasInternalNode(NodeIndex::ROOT));
    /// let (c, d) = error.into_units();
    /// assert_eq!((*c, *d), ('c', 'd'));
    /// ```
    pub fn try_fork(&mut self, index: NodeIndex, left: P, right: P) -> Result<Forked<P>, TryForkError<P>> {
        let unit = match self.take_leaf_unit(index) {
            Ok(unit) => unit,
            Err(cause) => return Err(TryForkError::new(cause, left, right)),
        };
        let (left, right) = self.attach(index, left, right);
        Ok(Forked { unit, left, right })
    }
    /// Forks the leaf at `index` into two leaves, using the provided closure to turn the unit the leaf carried into the two successor units. Returns the indices of the left and right leaves.
    ///
    /// This is the usual way of forking when one of the successors is the forked unit itself.
    ///
    /// # Panics
    /// The closure runs while the leaf is already emptied, so a panic inside it cannot be unwound from safely. With the `unwind_safety` feature enabled, it exits the process instead.
    ///
    /// # Errors
    /// Will fail if there is no leaf at `index`, in which case the closure is not called and the tree is left untouched.
    pub fn try_fork_with(
        &mut self,
        index: NodeIndex,
        f: impl FnOnce(P) -> (P, P),
    ) -> Result<(NodeIndex, NodeIndex), LeafError> {
        let unit = self.take_leaf_unit(index)?;
        let (left, right) = abort_on_panic(|| f(unit));
        Ok(self.attach(index, left, right))
    }
    /// Forks the leaf at `index` into two leaves carrying the specified successor units.
    ///
    /// See [`try_fork`] for details.
    ///
    /// # Panics
    /// Panics if there is no leaf at `index`. Passing an index which the tree did not hand out, or one whose leaf was already forked or retired, is a logic error of the caller.
    ///
    /// [`try_fork`]: #method.try_fork " "
    #[track_caller]
    pub fn fork(&mut self, index: NodeIndex, left: P, right: P) -> Forked<P> {
        self.try_fork(index, left, right)
            .unwrap_or_else(|e| contract_violation(e))
    }
    /// Forks the leaf at `index` into two leaves using the provided closure.
    ///
    /// See [`try_fork_with`] for details.
    ///
    /// # Panics
    /// Panics if there is no leaf at `index`.
    ///
    /// [`try_fork_with`]: #method.try_fork_with " "
    #[track_caller]
    pub fn fork_with(&mut self, index: NodeIndex, f: impl FnOnce(P) -> (P, P)) -> (NodeIndex, NodeIndex) {
        self.try_fork_with(index, f)
            .unwrap_or_else(|e| contract_violation(e))
    }

    /// Retires the leaf at `index`, returning the unit it carried.
    ///
    /// Every ancestor which is left without children as a result is retired as well, up to the first ancestor which still has a child. The root is never retired: if the last leaf goes away, the root stays in the tree without children and without a unit, which is how an exhausted tree looks like.
    ///
    /// The unit's back-reference is left as-is.
    ///
    /// # Errors
    /// Will fail if there is no leaf at `index`, in which case the tree is left untouched.
    ///
    /// # Example
    /// ```rust
    /// # use kindling::{ForkTree, NodeIndex, Tracked};
    /// let mut tree = ForkTree::new(Tracked::new(0));
    /// let top = tree.fork(NodeIndex::ROOT, Tracked::new(1), Tracked::new(2));
    /// let bottom = tree.fork(top.left, Tracked::new(3), Tracked::new(4));
    ///
    /// tree.try_retire(bottom.left).unwrap();
    /// // The fork point still leads to a live unit:
    /// assert!(tree.contains(top.left));
    ///
    /// tree.try_retire(bottom.right).unwrap();
    /// // Now it does not, and is pruned along with the leaf:
    /// assert!(!tree.contains(top.left));
    /// assert!(tree.root().left_child().is_none());
    /// assert_eq!(tree.root().right_child().map(|x| x.index()), Some(top.right));
    /// ```
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn try_retire(&mut self, index: NodeIndex) -> Result<P, LeafError> {
        let unit = self.take_leaf_unit(index)?;
        let pruned = self.prune_upwards(index);
        debug_log!(
            index = index.get(),
            pruned,
            live = self.storage.len(),
            "retired leaf"
        );
        Ok(unit)
    }
    /// Retires the leaf at `index`, returning the unit it carried.
    ///
    /// See [`try_retire`] for details.
    ///
    /// # Panics
    /// Panics if there is no leaf at `index`.
    ///
    /// [`try_retire`]: #method.try_retire " "
    #[track_caller]
    pub fn retire(&mut self, index: NodeIndex) -> P {
        self.try_retire(index)
            .unwrap_or_else(|e| contract_violation(e))
    }

    /// Takes the unit out of the leaf at `index`, leaving the node without a unit, or fails without touching anything.
    fn take_leaf_unit(&mut self, index: NodeIndex) -> Result<P, LeafError> {
        let node = self
            .storage
            .get_mut(index.slot())
            .ok_or(LeafError::Vacant(index))?;
        if node.has_children() {
            return Err(LeafError::WasInternalNode(index));
        }
        node.unit.take().ok_or(LeafError::WasExhausted)
    }
    /// Allocates two leaves for the successors under the node at `index`, which must have just had its unit taken.
    fn attach(&mut self, index: NodeIndex, left: P, right: P) -> (NodeIndex, NodeIndex) {
        let left = self.insert(index, left);
        let right = self.insert(index, right);
        let node = self.node_mut_or_corrupted(index);
        node.left = Some(left);
        node.right = Some(right);
        (left, right)
    }
    /// Places `unit` into a fresh leaf under `parent`, preferring slots close to the parent's one.
    fn insert(&mut self, parent: NodeIndex, mut unit: P) -> NodeIndex {
        let slot = self.storage.insert_near_with(parent.slot(), |slot| {
            // Runs with the forked leaf already emptied
            abort_on_panic(|| unit.set_tree_index(NodeIndex::from_slot(slot)));
            Node::leaf(unit, Some(parent))
        });
        trace_log!(index = slot, parent = parent.get(), "allocated leaf");
        NodeIndex::from_slot(slot)
    }
    /// Walks upwards from the node at `index`, which must have no children and no unit, retiring it and every ancestor left without children, and returns how many nodes were retired.
    ///
    /// The walk stops at the first ancestor which still has a child, or at the root, which is never retired.
    fn prune_upwards(&mut self, index: NodeIndex) -> usize {
        let mut pruned = 0;
        let mut current = index;
        loop {
            let parent = match self.node_or_corrupted(current).parent {
                Some(parent) => parent,
                None => break,
            };
            let parent_node = self.node_mut_or_corrupted(parent);
            if !parent_node.detach_child(current) {
                corrupted(format_args!(
                    "node {} is not a child of its parent {}",
                    current, parent,
                ));
            }
            let parent_still_branches = parent_node.has_children();
            self.storage.vacate(current.slot());
            trace_log!(index = current.get(), parent = parent.get(), "released slot");
            pruned += 1;
            if parent_still_branches {
                break;
            }
            current = parent;
        }
        pruned
    }

    #[inline]
    fn node_or_corrupted(&self, index: NodeIndex) -> &Node<P> {
        self.storage
            .get(index.slot())
            .unwrap_or_else(|| corrupted(format_args!("node {} is linked but vacant", index)))
    }
    #[inline]
    fn node_mut_or_corrupted(&mut self, index: NodeIndex) -> &mut Node<P> {
        self.storage
            .get_mut(index.slot())
            .unwrap_or_else(|| corrupted(format_args!("node {} is linked but vacant", index)))
    }
}
impl<P> ForkTree<P> {
    /// Returns the node at `index`, or `None` if there is no live node there.
    #[inline]
    pub fn node(&self, index: NodeIndex) -> Option<&Node<P>> {
        self.storage.get(index.slot())
    }
    /// Returns a reference to the node at `index` which can be used to navigate the tree, or `None` if there is no live node there.
    #[inline]
    pub fn node_ref(&self, index: NodeIndex) -> Option<NodeRef<'_, P>> {
        NodeRef::new(self, index)
    }
    /// Returns a reference to the root node.
    ///
    /// The root is live for as long as the tree exists, even after every unit of work has been retired.
    #[inline]
    pub fn root(&self) -> NodeRef<'_, P> {
        NodeRef::new(self, NodeIndex::ROOT)
            .unwrap_or_else(|| corrupted("the root slot is vacant"))
    }
    /// Returns `true` if there is a live node at `index`.
    #[inline]
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.storage.contains(index.slot())
    }
    /// Returns the unit of work carried by the leaf at `index`, or `None` if there is no leaf there.
    #[inline]
    pub fn unit(&self, index: NodeIndex) -> Option<&P> {
        self.node(index).and_then(Node::unit)
    }
    /// Returns a *mutable* reference to the unit of work carried by the leaf at `index`, or `None` if there is no leaf there.
    #[inline]
    pub fn unit_mut(&mut self, index: NodeIndex) -> Option<&mut P> {
        self.storage
            .get_mut(index.slot())
            .and_then(|node| node.unit.as_mut())
    }
    /// Returns the number of live nodes, leaves and branch nodes alike. Always at least 1, since the root is never retired.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.storage.len()
    }
    /// Always returns `false`, since the root is never retired. Provided for consistency with `len`.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
    /// Returns the number of slots in the backing storage, including vacant ones and the sentinel.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }
    /// Returns `true` if every unit of work has been retired, leaving the root as the only node, without children and without a unit.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        let root = self.root();
        root.is_childless() && root.unit().is_none()
    }
    /// Returns an iterator over the indices of the node at `index` and its ancestors, starting with the node itself and ending with the root.
    ///
    /// The iterator is empty if there is no live node at `index`.
    #[inline]
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_, P> {
        Ancestors::new(self, index)
    }
    /// Returns an iterator over the indices of the node at `index` and all of its descendants, in pre-order, visiting left children before right ones.
    ///
    /// The iterator is empty if there is no live node at `index`.
    #[inline]
    pub fn descendants(&self, index: NodeIndex) -> Descendants<'_, P> {
        Descendants::new(self, index)
    }
    /// Returns an iterator over the indices of the live nodes, in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.storage.occupied_indices().map(NodeIndex::from_slot)
    }
    /// Returns the storage which backs the tree, for inspecting its occupancy.
    #[inline(always)]
    pub fn storage(&self) -> &SlotStorage<Node<P>> {
        &self.storage
    }
}
