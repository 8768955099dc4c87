//! Lazy in-order traversal.
//!
//! A [`Cursor`] is a detached position: a node, a slot within that node's key
//! list, and a direction. [`Keys`] pairs a cursor with a borrow of the tree
//! and is the normal way to iterate. Both end for good once they step onto
//! [`BOTTOM`].

use std::iter::FusedIterator;

use crate::sort_tree::SortTree;
use crate::types::{NodeId, SortTreeNode, BOTTOM};
use crate::util::{next, prev};

/// A resumable position in the key order.
///
/// Unlike [`Keys`], a cursor does not borrow the tree, so the tree can be
/// mutated between two [`step`](Cursor::step) calls. The result is only
/// meaningful if every such mutation touched keys strictly ahead of the
/// cursor in its direction of travel; moving or removing the key the cursor
/// rests on, or anything behind it, leaves the cursor pointing at an
/// arbitrary position. This is not checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    node: NodeId,
    /// Forward: slot of the next key. Reverse: one past the slot of the next key.
    pos: usize,
    reverse: bool,
}

impl Cursor {
    pub(crate) fn new(node: NodeId, pos: usize, reverse: bool) -> Self {
        Self { node, pos, reverse }
    }

    /// A cursor that yields nothing.
    pub fn done() -> Self {
        Self::new(BOTTOM, 0, false)
    }

    /// Node the next key is read from, [`BOTTOM`] once exhausted.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn is_done(&self) -> bool {
        self.node == BOTTOM
    }

    pub fn is_reversed(&self) -> bool {
        self.reverse
    }

    /// Yields the key under the cursor and moves past it.
    pub fn step<'t, K, V, R, C>(&mut self, tree: &'t SortTree<K, V, R, C>) -> Option<&'t K> {
        self.step_in(&tree.arena)
    }

    pub(crate) fn step_in<'t, K>(&mut self, arena: &'t [SortTreeNode<K>]) -> Option<&'t K> {
        if self.node == BOTTOM {
            return None;
        }
        let keys = &arena[self.node as usize].keys;

        if self.reverse {
            if self.pos == 0 || self.pos > keys.len() {
                self.node = BOTTOM;
                return None;
            }
            self.pos -= 1;
            let key = &keys[self.pos];
            if self.pos == 0 {
                self.node = prev(arena, self.node);
                self.pos = arena[self.node as usize].keys.len();
            }
            Some(key)
        } else {
            let Some(key) = keys.get(self.pos) else {
                self.node = BOTTOM;
                return None;
            };
            self.pos += 1;
            if self.pos == keys.len() {
                self.node = next(arena, self.node);
                self.pos = 0;
            }
            Some(key)
        }
    }
}

/// Lazy sequence of keys in tree order (or reverse tree order).
///
/// Holds a shared borrow of the tree, so the tree cannot change underneath it.
#[derive(Clone, Debug)]
pub struct Keys<'a, K> {
    arena: &'a [SortTreeNode<K>],
    cursor: Cursor,
}

impl<'a, K> Keys<'a, K> {
    pub(crate) fn new(arena: &'a [SortTreeNode<K>], cursor: Cursor) -> Self {
        Self { arena, cursor }
    }

    /// Detaches the current position, e.g. to resume after a mutation.
    pub fn into_cursor(self) -> Cursor {
        self.cursor
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.cursor.step_in(self.arena)
    }
}

impl<K> FusedIterator for Keys<'_, K> {}
