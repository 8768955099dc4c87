//! Arena walks shared by every [`Node`] layout.
//!
//! All functions treat [`BOTTOM`] as "no node": passing it in is allowed and
//! yields `BOTTOM` (or `0` for the counting helpers).

use crate::types::{Node, NodeId, BOTTOM};

#[inline]
pub(crate) fn get_p<N: Node>(arena: &[N], idx: NodeId) -> NodeId {
    arena[idx as usize].p()
}

#[inline]
pub(crate) fn get_l<N: Node>(arena: &[N], idx: NodeId) -> NodeId {
    arena[idx as usize].l()
}

#[inline]
pub(crate) fn get_r<N: Node>(arena: &[N], idx: NodeId) -> NodeId {
    arena[idx as usize].r()
}

#[inline]
pub(crate) fn set_p<N: Node>(arena: &mut [N], idx: NodeId, v: NodeId) {
    debug_assert_ne!(idx, BOTTOM, "sentinel is immutable");
    arena[idx as usize].set_p(v);
}

#[inline]
pub(crate) fn set_l<N: Node>(arena: &mut [N], idx: NodeId, v: NodeId) {
    debug_assert_ne!(idx, BOTTOM, "sentinel is immutable");
    arena[idx as usize].set_l(v);
}

#[inline]
pub(crate) fn set_r<N: Node>(arena: &mut [N], idx: NodeId, v: NodeId) {
    debug_assert_ne!(idx, BOTTOM, "sentinel is immutable");
    arena[idx as usize].set_r(v);
}

/// Leftmost node of the subtree rooted at `node`.
pub fn first<N: Node>(arena: &[N], mut node: NodeId) -> NodeId {
    if node == BOTTOM {
        return BOTTOM;
    }
    while get_l(arena, node) != BOTTOM {
        node = get_l(arena, node);
    }
    node
}

/// Rightmost node of the subtree rooted at `node`.
pub fn last<N: Node>(arena: &[N], mut node: NodeId) -> NodeId {
    if node == BOTTOM {
        return BOTTOM;
    }
    while get_r(arena, node) != BOTTOM {
        node = get_r(arena, node);
    }
    node
}

/// In-order successor, or [`BOTTOM`] past the end.
pub fn next<N: Node>(arena: &[N], mut curr: NodeId) -> NodeId {
    let r = get_r(arena, curr);
    if r != BOTTOM {
        return first(arena, r);
    }
    let mut p = get_p(arena, curr);
    while p != BOTTOM && get_r(arena, p) == curr {
        curr = p;
        p = get_p(arena, p);
    }
    p
}

/// In-order predecessor, or [`BOTTOM`] before the start.
pub fn prev<N: Node>(arena: &[N], mut curr: NodeId) -> NodeId {
    let l = get_l(arena, curr);
    if l != BOTTOM {
        return last(arena, l);
    }
    let mut p = get_p(arena, curr);
    while p != BOTTOM && get_l(arena, p) == curr {
        curr = p;
        p = get_p(arena, p);
    }
    p
}

/// Height of the subtree rooted at `root`, counted in edges.
///
/// A lone node and an empty tree both have depth `0`. Iterative, so a
/// degenerate tree cannot exhaust the call stack.
pub fn depth<N: Node>(arena: &[N], root: NodeId) -> usize {
    if root == BOTTOM {
        return 0;
    }
    let mut max = 0;
    let mut stack = vec![(root, 0usize)];
    while let Some((node, d)) = stack.pop() {
        max = max.max(d);
        let l = get_l(arena, node);
        let r = get_r(arena, node);
        if l != BOTTOM {
            stack.push((l, d + 1));
        }
        if r != BOTTOM {
            stack.push((r, d + 1));
        }
    }
    max
}

/// Number of nodes under `root`.
pub fn size<N: Node>(arena: &[N], root: NodeId) -> usize {
    let mut count = 0;
    let mut curr = first(arena, root);
    while curr != BOTTOM {
        count += 1;
        curr = next(arena, curr);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SortTreeNode;

    fn link(arena: &mut [SortTreeNode<i32>], parent: NodeId, child: NodeId, left: bool) {
        if left {
            set_l(arena, parent, child);
        } else {
            set_r(arena, parent, child);
        }
        set_p(arena, child, parent);
    }

    fn fixture() -> (Vec<SortTreeNode<i32>>, NodeId) {
        //        10(1)
        //      /      \
        //    5(2)     20(3)
        //      \      /   \
        //     7(4) 15(5) 30(6)
        let mut arena = vec![SortTreeNode::bottom()];
        for k in [10, 5, 20, 7, 15, 30] {
            arena.push(SortTreeNode::new(vec![k]));
        }
        link(&mut arena, 1, 2, true);
        link(&mut arena, 1, 3, false);
        link(&mut arena, 2, 4, false);
        link(&mut arena, 3, 5, true);
        link(&mut arena, 3, 6, false);
        (arena, 1)
    }

    fn walk(arena: &[SortTreeNode<i32>], root: NodeId, reverse: bool) -> Vec<i32> {
        let mut out = Vec::new();
        let mut curr = if reverse {
            last(arena, root)
        } else {
            first(arena, root)
        };
        while curr != BOTTOM {
            out.push(arena[curr as usize].keys[0]);
            curr = if reverse {
                prev(arena, curr)
            } else {
                next(arena, curr)
            };
        }
        out
    }

    #[test]
    fn next_and_prev_walk_in_order() {
        let (arena, root) = fixture();
        assert_eq!(walk(&arena, root, false), vec![5, 7, 10, 15, 20, 30]);
        assert_eq!(walk(&arena, root, true), vec![30, 20, 15, 10, 7, 5]);
    }

    #[test]
    fn extremes_and_counts() {
        let (arena, root) = fixture();
        assert_eq!(first(&arena, root), 2);
        assert_eq!(last(&arena, root), 6);
        assert_eq!(depth(&arena, root), 2);
        assert_eq!(size(&arena, root), 6);
        assert_eq!(first(&arena, BOTTOM), BOTTOM);
        assert_eq!(depth(&arena, BOTTOM), 0);
        assert_eq!(size(&arena, BOTTOM), 0);
    }

    #[test]
    fn degenerate_chain_depth() {
        let mut arena = vec![SortTreeNode::bottom()];
        for k in 0..1000 {
            arena.push(SortTreeNode::new(vec![k]));
        }
        for i in 1..1000u32 {
            link(&mut arena, i, i + 1, false);
        }
        assert_eq!(depth(&arena, 1), 999);
        assert_eq!(next(&arena, 1000), BOTTOM);
        assert_eq!(prev(&arena, 1), BOTTOM);
    }
}
