//! Node representation.
//!
//! Nodes live in a `Vec`-backed arena owned by the tree and refer to each
//! other through [`NodeId`] indices. Slot `0` of every arena is the shared
//! terminal node [`BOTTOM`]: all absent links point at it, its own links point
//! at itself, and its key list is always empty.

/// Index of a node in the tree arena.
pub type NodeId = u32;

/// The sentinel standing in for every absent link.
pub const BOTTOM: NodeId = 0;

/// Parent/left/right links of an arena node.
pub trait Node {
    fn p(&self) -> NodeId;
    fn l(&self) -> NodeId;
    fn r(&self) -> NodeId;
    fn set_p(&mut self, v: NodeId);
    fn set_l(&mut self, v: NodeId);
    fn set_r(&mut self, v: NodeId);
}

/// A tree position holding every key that currently resolves to one value.
///
/// `keys[0]` is the representative key: comparisons against this node resolve
/// it. Order within `keys` is insertion order, except that removal swaps the
/// last key into the vacated slot.
#[derive(Clone, Debug)]
pub struct SortTreeNode<K> {
    pub p: NodeId,
    pub l: NodeId,
    pub r: NodeId,
    pub keys: Vec<K>,
}

impl<K> SortTreeNode<K> {
    pub fn new(keys: Vec<K>) -> Self {
        Self {
            p: BOTTOM,
            l: BOTTOM,
            r: BOTTOM,
            keys,
        }
    }

    /// The sentinel node stored in arena slot [`BOTTOM`].
    pub fn bottom() -> Self {
        Self::new(Vec::new())
    }

    /// Removes `key` by swapping the last key into its slot.
    ///
    /// Returns `false` if the node does not hold `key`.
    pub fn swap_remove_key(&mut self, key: &K) -> bool
    where
        K: PartialEq,
    {
        match self.position_of(key) {
            Some(i) => {
                self.keys.swap_remove(i);
                true
            }
            None => false,
        }
    }

    /// Position of `key` in the key list.
    pub fn position_of(&self, key: &K) -> Option<usize>
    where
        K: PartialEq,
    {
        self.keys.iter().rposition(|k| k == key)
    }
}

impl<K> Node for SortTreeNode<K> {
    fn p(&self) -> NodeId {
        self.p
    }

    fn l(&self) -> NodeId {
        self.l
    }

    fn r(&self) -> NodeId {
        self.r
    }

    fn set_p(&mut self, v: NodeId) {
        self.p = v;
    }

    fn set_l(&mut self, v: NodeId) {
        self.l = v;
    }

    fn set_r(&mut self, v: NodeId) {
        self.r = v;
    }
}
