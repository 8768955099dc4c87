use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;

use indexmap::IndexMap;

use crate::error::SortTreeError;
use crate::iter::{Cursor, Keys};
use crate::resolve::{Identity, MapLookup, Resolve, SeqLookup};
use crate::tracing_helpers::{debug_log, trace_log};
use crate::types::{NodeId, SortTreeNode, BOTTOM};
use crate::util::{self, first, get_l, get_p, get_r, last, next, prev, set_l, set_p, set_r};

/// Keys ordered by their own value.
pub type SetSortTree<V, C> = SortTree<V, V, Identity, C>;

/// Keys ordered by the value a map holds for them.
pub type MapSortTree<K, V, C> = SortTree<K, V, MapLookup<K, V>, C>;

/// Sequence positions ordered by the value stored at them.
pub type SeqSortTree<V, C> = SortTree<usize, V, SeqLookup<V>, C>;

/// Unbalanced binary search tree of keys, ordered by resolved values.
///
/// Keys whose values compare equal share one node. The comparator's sign
/// decides placement: `cmp(a, b) > 0` puts `a` before `b`, so `|a, b| b - a`
/// yields ascending numbers.
///
/// The tree never re-resolves on its own. After changing a key's value in the
/// backing store, call [`update`](Self::update) (or
/// [`update_all`](Self::update_all)) so the key moves to its new place.
///
/// There is no rebalancing: sorted input produces a chain and O(n)
/// operations. Not synchronized; wrap it in a lock to share it across threads.
pub struct SortTree<K, V, R, C> {
    pub(crate) root: NodeId,
    pub(crate) first: NodeId,
    pub(crate) last: NodeId,
    pub(crate) arena: Vec<SortTreeNode<K>>,
    free: Vec<NodeId>,
    index: IndexMap<K, NodeId>,
    resolver: R,
    comparator: C,
    _value: PhantomData<fn() -> V>,
}

impl<V, C> SortTree<V, V, Identity, C>
where
    V: Hash + Eq + Clone,
    C: Fn(&V, &V) -> i32,
{
    pub fn new(comparator: C) -> Self {
        Self::with_resolver(Identity, comparator)
    }
}

impl<K, V, C> SortTree<K, V, MapLookup<K, V>, C>
where
    K: Hash + Eq + Clone,
    C: Fn(&V, &V) -> i32,
{
    pub fn new(map: HashMap<K, V>, comparator: C) -> Self {
        Self::with_resolver(MapLookup::new(map), comparator)
    }

    pub fn map(&self) -> &HashMap<K, V> {
        &self.resolver.map
    }

    /// Changes made here take effect in the order once the key is updated.
    pub fn map_mut(&mut self) -> &mut HashMap<K, V> {
        &mut self.resolver.map
    }
}

impl<V, C> SortTree<usize, V, SeqLookup<V>, C>
where
    C: Fn(&V, &V) -> i32,
{
    pub fn new(items: Vec<V>, comparator: C) -> Self {
        Self::with_resolver(SeqLookup::new(items), comparator)
    }

    pub fn items(&self) -> &[V] {
        &self.resolver.items
    }

    /// Changes made here take effect in the order once the index is updated.
    pub fn items_mut(&mut self) -> &mut Vec<V> {
        &mut self.resolver.items
    }
}

impl<K, V, R, C> SortTree<K, V, R, C> {
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Height of the tree in edges; `0` for a single node or an empty tree.
    pub fn depth(&self) -> usize {
        util::depth(&self.arena, self.root)
    }

    /// First key of the first node.
    pub fn first_key(&self) -> Option<&K> {
        self.arena[self.first as usize].keys.first()
    }

    /// Last key of the last node.
    pub fn last_key(&self) -> Option<&K> {
        self.arena[self.last as usize].keys.last()
    }

    pub fn keys(&self) -> Keys<'_, K> {
        Keys::new(&self.arena, self.cursor())
    }

    pub fn keys_reversed(&self) -> Keys<'_, K> {
        Keys::new(&self.arena, self.cursor_reversed())
    }

    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.first, 0, false)
    }

    pub fn cursor_reversed(&self) -> Cursor {
        Cursor::new(self.last, self.arena[self.last as usize].keys.len(), true)
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Changes made through the resolver take effect once affected keys are
    /// updated.
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// Drops every key. The resolver and its backing store are kept.
    pub fn clear(&mut self) {
        self.arena.truncate(1);
        self.free.clear();
        self.index.clear();
        self.root = BOTTOM;
        self.first = BOTTOM;
        self.last = BOTTOM;
    }
}

impl<K, V, R, C> SortTree<K, V, R, C>
where
    K: Hash + Eq + Clone,
    R: Resolve<K, V>,
    C: Fn(&V, &V) -> i32,
{
    pub fn with_resolver(resolver: R, comparator: C) -> Self {
        Self::with_capacity(resolver, comparator, 0)
    }

    /// Pre-sizes the node arena and the key index for `capacity` keys.
    pub fn with_capacity(resolver: R, comparator: C, capacity: usize) -> Self {
        let mut arena = Vec::with_capacity(capacity + 1);
        arena.push(SortTreeNode::bottom());
        Self {
            root: BOTTOM,
            first: BOTTOM,
            last: BOTTOM,
            arena,
            free: Vec::new(),
            index: IndexMap::with_capacity(capacity),
            resolver,
            comparator,
            _value: PhantomData,
        }
    }

    #[inline]
    fn compare(&self, a: &V, b: &V) -> i32 {
        (self.comparator)(a, b)
    }

    fn resolved<'a>(&'a self, key: &'a K) -> &'a V {
        match self.resolver.resolve(key) {
            Some(v) => v,
            None => panic!("sort-tree: a key in the tree no longer resolves to a value"),
        }
    }

    /// Representative value of a node.
    fn value_of(&self, node: NodeId) -> &V {
        self.resolved(&self.arena[node as usize].keys[0])
    }

    /// Current value of `key`, whether or not it is in the tree.
    pub fn get<'a>(&'a self, key: &'a K) -> Option<&'a V> {
        self.resolver.resolve(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Places `key` according to its current value.
    ///
    /// Inserts the key if it is absent, otherwise moves it. Fails without
    /// touching the tree if the resolver has no value for `key`.
    pub fn update(&mut self, key: K) -> Result<(), SortTreeError> {
        if self.resolver.resolve(&key).is_none() {
            debug_log!("update rejected: key has no value");
            return Err(SortTreeError::Unresolved);
        }

        let mut reuse = BOTTOM;
        if let Some(&node) = self.index.get(&key) {
            if self.arena[node as usize].keys.len() == 1 {
                reuse = self.unlink(node);
            } else {
                self.arena[node as usize].swap_remove_key(&key);
            }
        }
        self.insert_node(key, reuse);
        Ok(())
    }

    /// Removes `key`. Returns `false` if it was not in the tree.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(node) = self.index.swap_remove(key) else {
            return false;
        };
        if self.arena[node as usize].keys.len() == 1 {
            let detached = self.unlink(node);
            self.release(detached);
        } else {
            self.arena[node as usize].swap_remove_key(key);
        }
        true
    }

    /// Re-sorts every key currently in the tree, each exactly once.
    ///
    /// Unlike a series of [`update`](Self::update) calls, this stays correct
    /// when many values changed at once: the keys are snapshotted, the tree
    /// is emptied, and the snapshot is inserted again. Fails without touching
    /// the tree if any key no longer resolves.
    pub fn update_all(&mut self) -> Result<(), SortTreeError> {
        let keys: Vec<K> = self.index.keys().cloned().collect();
        if keys.iter().any(|k| self.resolver.resolve(k).is_none()) {
            debug_log!("update_all rejected: a key has no value");
            return Err(SortTreeError::Unresolved);
        }
        debug_log!(count = keys.len(), "update_all");
        self.clear();
        for key in keys {
            self.insert_node(key, BOTTOM);
        }
        debug_log!(nodes = self.arena.len() - 1 - self.free.len(), "update_all done");
        Ok(())
    }

    /// Keys of the node whose value compares equal to `value`.
    pub fn keys_at_value(&self, value: &V) -> &[K] {
        let mut node = self.root;
        while node != BOTTOM {
            let side = self.compare(self.value_of(node), value);
            if side == 0 {
                break;
            }
            node = if side < 0 {
                get_l(&self.arena, node)
            } else {
                get_r(&self.arena, node)
            };
        }
        &self.arena[node as usize].keys
    }

    /// Iterates from `key` towards the end, starting at `key` when
    /// `inclusive`, right after it otherwise.
    pub fn keys_from_key(&self, key: &K, inclusive: bool) -> Result<Keys<'_, K>, SortTreeError> {
        Ok(Keys::new(&self.arena, self.cursor_from_key(key, inclusive)?))
    }

    /// Iterates from `key` towards the start.
    pub fn keys_reversed_from_key(
        &self,
        key: &K,
        inclusive: bool,
    ) -> Result<Keys<'_, K>, SortTreeError> {
        Ok(Keys::new(
            &self.arena,
            self.cursor_reversed_from_key(key, inclusive)?,
        ))
    }

    /// Iterates from the first node placed after `value` (or equal to it when
    /// `inclusive`) towards the end.
    pub fn keys_from_value(&self, value: &V, inclusive: bool) -> Keys<'_, K> {
        Keys::new(&self.arena, self.cursor_from_value(value, inclusive))
    }

    /// Iterates from the last node placed before `value` (or equal to it when
    /// `inclusive`) towards the start.
    pub fn keys_reversed_from_value(&self, value: &V, inclusive: bool) -> Keys<'_, K> {
        Keys::new(&self.arena, self.cursor_reversed_from_value(value, inclusive))
    }

    fn locate(&self, key: &K) -> Result<(NodeId, usize), SortTreeError> {
        let node = self.index.get(key).copied().ok_or_else(|| {
            debug_log!("navigation from a key that is not in the tree");
            SortTreeError::KeyNotFound
        })?;
        let pos = self.arena[node as usize]
            .position_of(key)
            .ok_or(SortTreeError::KeyNotFound)?;
        Ok((node, pos))
    }

    pub fn cursor_from_key(&self, key: &K, inclusive: bool) -> Result<Cursor, SortTreeError> {
        let (mut node, mut pos) = self.locate(key)?;
        if !inclusive {
            pos += 1;
            if pos == self.arena[node as usize].keys.len() {
                node = next(&self.arena, node);
                pos = 0;
            }
        }
        Ok(Cursor::new(node, pos, false))
    }

    pub fn cursor_reversed_from_key(
        &self,
        key: &K,
        inclusive: bool,
    ) -> Result<Cursor, SortTreeError> {
        let (mut node, mut pos) = self.locate(key)?;
        if inclusive {
            pos += 1;
        } else if pos == 0 {
            node = prev(&self.arena, node);
            pos = self.arena[node as usize].keys.len();
        }
        Ok(Cursor::new(node, pos, true))
    }

    pub fn cursor_from_value(&self, value: &V, inclusive: bool) -> Cursor {
        Cursor::new(self.find_after(value, inclusive), 0, false)
    }

    pub fn cursor_reversed_from_value(&self, value: &V, inclusive: bool) -> Cursor {
        let node = self.find_before(value, inclusive);
        Cursor::new(node, self.arena[node as usize].keys.len(), true)
    }

    /// First node placed after `value`, or the node equal to it if `equal`.
    fn find_after(&self, value: &V, equal: bool) -> NodeId {
        let mut parent = self.root;
        let mut smallest = BOTTOM;
        while parent != BOTTOM {
            let side = self.compare(self.value_of(parent), value);
            if equal && side == 0 {
                return parent;
            }
            if side < 0 {
                let l = get_l(&self.arena, parent);
                if l == BOTTOM {
                    return parent;
                }
                smallest = parent;
                parent = l;
            } else {
                parent = get_r(&self.arena, parent);
            }
        }
        smallest
    }

    /// Last node placed before `value`, or the node equal to it if `equal`.
    fn find_before(&self, value: &V, equal: bool) -> NodeId {
        let mut parent = self.root;
        let mut greatest = BOTTOM;
        while parent != BOTTOM {
            let side = self.compare(self.value_of(parent), value);
            if equal && side == 0 {
                return parent;
            }
            if side > 0 {
                let r = get_r(&self.arena, parent);
                if r == BOTTOM {
                    return parent;
                }
                greatest = parent;
                parent = r;
            } else {
                parent = get_l(&self.arena, parent);
            }
        }
        greatest
    }

    /// Node to attach a value under, and the comparison that got there.
    ///
    /// A zero comparison means the returned node already holds the value.
    fn find_leaf(&self, key: &K) -> (NodeId, i32) {
        let value = self.resolved(key);
        let mut parent = self.root;
        loop {
            let side = self.compare(self.value_of(parent), value);
            let child = if side < 0 {
                get_l(&self.arena, parent)
            } else if side > 0 {
                get_r(&self.arena, parent)
            } else {
                BOTTOM
            };
            if child == BOTTOM {
                return (parent, side);
            }
            parent = child;
        }
    }

    /// Inserts `key`, placing it in `reuse` if a new node is needed and
    /// `reuse` is a detached node.
    fn insert_node(&mut self, key: K, reuse: NodeId) {
        if self.root == BOTTOM {
            let node = self.fill(key.clone(), reuse);
            self.root = node;
            self.first = node;
            self.last = node;
            self.index.insert(key, node);
            return;
        }

        let (parent, side) = self.find_leaf(&key);

        if side == 0 {
            self.arena[parent as usize].keys.push(key.clone());
            if reuse != BOTTOM {
                trace_log!(reuse, parent, "merged into equal node");
                self.release(reuse);
            }
            self.index.insert(key, parent);
            return;
        }

        let node = self.fill(key.clone(), reuse);
        if side < 0 {
            self.attach_left(parent, node);
        } else {
            self.attach_right(parent, node);
        }
        self.index.insert(key, node);
    }

    fn attach_left(&mut self, parent: NodeId, node: NodeId) {
        set_l(&mut self.arena, parent, node);
        set_p(&mut self.arena, node, parent);
        if parent == self.first {
            self.first = first(&self.arena, node);
        }
    }

    fn attach_right(&mut self, parent: NodeId, node: NodeId) {
        set_r(&mut self.arena, parent, node);
        set_p(&mut self.arena, node, parent);
        if parent == self.last {
            self.last = last(&self.arena, node);
        }
    }

    fn fill(&mut self, key: K, reuse: NodeId) -> NodeId {
        if reuse != BOTTOM {
            trace_log!(reuse, "reattaching detached node");
            let keys = &mut self.arena[reuse as usize].keys;
            keys.clear();
            keys.push(key);
            return reuse;
        }
        if let Some(node) = self.free.pop() {
            self.arena[node as usize].keys.push(key);
            return node;
        }
        self.arena.push(SortTreeNode::new(vec![key]));
        (self.arena.len() - 1) as NodeId
    }

    fn release(&mut self, node: NodeId) {
        let n = &mut self.arena[node as usize];
        n.keys.clear();
        n.p = BOTTOM;
        n.l = BOTTOM;
        n.r = BOTTOM;
        self.free.push(node);
    }

    fn replace_in_parent(&mut self, node: NodeId, replace: NodeId) {
        let parent = get_p(&self.arena, node);
        if parent != BOTTOM {
            if get_l(&self.arena, parent) == node {
                set_l(&mut self.arena, parent, replace);
            } else {
                set_r(&mut self.arena, parent, replace);
            }
        } else {
            self.root = replace;
        }
        if replace != BOTTOM {
            set_p(&mut self.arena, replace, parent);
        }
    }

    /// Detaches a node from the tree and returns the detached node.
    ///
    /// With two children the node keeps its position and takes over the keys
    /// of its in-order successor; the successor's node is detached instead,
    /// carrying the keys being unlinked. The index follows the moved keys, except
    /// for the keys of the returned node, which callers re-place or drop.
    fn unlink(&mut self, mut node: NodeId) -> NodeId {
        let mut left = get_l(&self.arena, node);
        let mut right = get_r(&self.arena, node);

        if left != BOTTOM && right != BOTTOM {
            let succ = first(&self.arena, right);
            let moved = std::mem::take(&mut self.arena[succ as usize].keys);
            let kept = std::mem::replace(&mut self.arena[node as usize].keys, moved);
            self.arena[succ as usize].keys = kept;
            for k in &self.arena[node as usize].keys {
                if let Some(slot) = self.index.get_mut(k) {
                    *slot = node;
                }
            }
            node = succ;
            left = BOTTOM;
            right = get_r(&self.arena, succ);
        }

        let child = if left != BOTTOM { left } else { right };
        self.replace_in_parent(node, child);

        if self.first == node {
            self.first = next(&self.arena, node);
        }
        if self.last == node {
            self.last = prev(&self.arena, node);
        }

        set_l(&mut self.arena, node, BOTTOM);
        set_r(&mut self.arena, node, BOTTOM);
        set_p(&mut self.arena, node, BOTTOM);
        trace_log!(node, "unlinked");
        node
    }

    /// Checks links, ordering, the key index, and the cached extremes.
    pub fn assert_valid(&self) -> Result<(), String> {
        let bottom = &self.arena[BOTTOM as usize];
        if !bottom.keys.is_empty() || bottom.p != BOTTOM || bottom.l != BOTTOM || bottom.r != BOTTOM
        {
            return Err("Sentinel was modified".to_string());
        }

        if self.root == BOTTOM {
            if self.first != BOTTOM || self.last != BOTTOM {
                return Err("Empty tree has first/last".to_string());
            }
            if !self.index.is_empty() {
                return Err("Empty tree has indexed keys".to_string());
            }
            return Ok(());
        }

        if get_p(&self.arena, self.root) != BOTTOM {
            return Err("Root has parent".to_string());
        }

        let mut stack = vec![self.root];
        let mut nodes = 0usize;
        let mut keys = 0usize;
        while let Some(node) = stack.pop() {
            nodes += 1;
            if nodes >= self.arena.len() {
                return Err("Cycle in child links".to_string());
            }
            let n = &self.arena[node as usize];
            if n.keys.is_empty() {
                return Err(format!("Node {node} has no keys"));
            }
            let rep = self.value_of(node);
            for k in &n.keys {
                keys += 1;
                if self.index.get(k) != Some(&node) {
                    return Err(format!("Index does not point at node {node}"));
                }
                if self.compare(rep, self.resolved(k)) != 0 {
                    return Err(format!("Node {node} groups unequal values"));
                }
            }
            for child in [n.l, n.r] {
                if child == BOTTOM {
                    continue;
                }
                if get_p(&self.arena, child) != node {
                    return Err(format!("Broken parent link under node {node}"));
                }
                stack.push(child);
            }
        }
        if keys != self.index.len() {
            return Err(format!(
                "Index holds {} keys, tree holds {keys}",
                self.index.len()
            ));
        }

        if self.first != first(&self.arena, self.root) {
            return Err("Cached first is not the leftmost node".to_string());
        }
        if self.last != last(&self.arena, self.root) {
            return Err("Cached last is not the rightmost node".to_string());
        }

        let mut prev_node = BOTTOM;
        let mut curr = self.first;
        while curr != BOTTOM {
            if prev_node != BOTTOM
                && self.compare(self.value_of(prev_node), self.value_of(curr)) <= 0
            {
                return Err(format!("Node order violated at node {curr}"));
            }
            prev_node = curr;
            curr = next(&self.arena, curr);
        }

        Ok(())
    }
}

impl<'a, K, V, R, C> IntoIterator for &'a SortTree<K, V, R, C> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K>;

    fn into_iter(self) -> Keys<'a, K> {
        self.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asc(a: &i32, b: &i32) -> i32 {
        b.cmp(a) as i32
    }

    fn collect<K: Clone, V, R, C>(tree: &SortTree<K, V, R, C>) -> Vec<K> {
        tree.keys().cloned().collect()
    }

    #[test]
    fn empty_tree_reports_nothing() {
        let tree = SetSortTree::new(asc);
        assert_eq!(tree.first_key(), None);
        assert_eq!(tree.last_key(), None);
        assert_eq!(tree.keys().next(), None);
        assert_eq!(tree.keys_reversed().next(), None);
        assert_eq!(tree.keys_from_value(&3, true).next(), None);
        assert_eq!(tree.keys_reversed_from_value(&3, true).next(), None);
        assert!(tree.keys_at_value(&3).is_empty());
        assert_eq!(tree.depth(), 0);
        assert!(tree.is_empty());
        tree.assert_valid().unwrap();
    }

    #[test]
    fn unlink_leaf_one_child_two_children() {
        let mut tree = SetSortTree::new(asc);
        for k in [50, 30, 70, 20, 40, 60, 80, 35] {
            tree.update(k).unwrap();
        }
        tree.assert_valid().unwrap();

        // leaf
        assert!(tree.remove(&20));
        tree.assert_valid().unwrap();
        // one child (40 -> 35)
        assert!(tree.remove(&40));
        tree.assert_valid().unwrap();
        // two children at the root
        assert!(tree.remove(&50));
        tree.assert_valid().unwrap();
        assert_eq!(collect(&tree), vec![30, 35, 60, 70, 80]);
        assert_eq!(tree.first_key(), Some(&30));
        assert_eq!(tree.last_key(), Some(&80));
    }

    #[test]
    fn two_children_successor_is_last() {
        let mut tree = SetSortTree::new(asc);
        for k in [2, 1, 3] {
            tree.update(k).unwrap();
        }
        assert!(tree.remove(&2));
        tree.assert_valid().unwrap();
        assert_eq!(tree.last_key(), Some(&3));
        assert_eq!(collect(&tree), vec![1, 3]);
    }

    #[test]
    fn removed_nodes_are_recycled() {
        let mut tree = SetSortTree::new(asc);
        for k in 0..10 {
            tree.update(k).unwrap();
        }
        let slots = tree.arena.len();
        for k in 0..10 {
            tree.remove(&k);
        }
        assert!(tree.is_empty());
        tree.assert_valid().unwrap();
        for k in 10..20 {
            tree.update(k).unwrap();
        }
        assert_eq!(tree.arena.len(), slots);
        tree.assert_valid().unwrap();
    }

    #[test]
    fn update_reuses_sole_node() {
        let mut tree = SeqSortTree::new(vec![5, 1, 9], asc);
        for i in 0..3 {
            tree.update(i).unwrap();
        }
        let slots = tree.arena.len();
        tree.items_mut()[0] = 20;
        tree.update(0).unwrap();
        assert_eq!(tree.arena.len(), slots);
        assert!(tree.free.is_empty());
        assert_eq!(tree.last_key(), Some(&0));
        assert_eq!(collect(&tree), vec![1, 2, 0]);
        tree.assert_valid().unwrap();
    }

    #[test]
    fn update_into_equal_value_frees_node() {
        let mut tree = SeqSortTree::new(vec![5, 1, 9], asc);
        for i in 0..3 {
            tree.update(i).unwrap();
        }
        tree.items_mut()[2] = 5;
        tree.update(2).unwrap();
        assert_eq!(tree.free.len(), 1);
        assert_eq!(tree.keys_at_value(&5), &[0, 2]);
        tree.assert_valid().unwrap();
    }

    #[test]
    fn clear_keeps_resolver() {
        let mut tree = SeqSortTree::new(vec![3, 2, 1], asc);
        tree.update_all().unwrap();
        for i in 0..3 {
            tree.update(i).unwrap();
        }
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.items(), &[3, 2, 1]);
        tree.assert_valid().unwrap();
    }
}
