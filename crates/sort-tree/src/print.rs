//! Box-drawing dump of a tree, for debugging.

use std::fmt::Debug;

use crate::sort_tree::SortTree;
use crate::types::{NodeId, BOTTOM};

/// Renders one child subtree given the indentation prefix for its lines.
pub type PrintChild<'a> = dyn Fn(&str) -> String + 'a;

/// Joins rendered children under a parent line.
///
/// `None` entries are skipped; the last present child gets the closing
/// branch glyph.
pub fn print_tree(tab: &str, children: &[Option<&PrintChild<'_>>]) -> String {
    let mut out = String::new();

    let Some(last) = children.iter().rposition(Option::is_some) else {
        return out;
    };

    for (i, child_opt) in children.iter().enumerate().take(last + 1) {
        let Some(child_fn) = *child_opt else {
            continue;
        };

        let is_last = i == last;
        let child_tab = format!("{tab}{}  ", if is_last { " " } else { "│" });
        let child = child_fn(&child_tab);
        let branch = if child.is_empty() {
            "│"
        } else if is_last {
            "└─"
        } else {
            "├─"
        };

        out.push('\n');
        out.push_str(tab);
        out.push_str(branch);
        if !child.is_empty() {
            out.push(' ');
            out.push_str(&child);
        }
    }

    out
}

impl<K: Debug, V, R, C> SortTree<K, V, R, C> {
    fn print_node(&self, node: NodeId, tab: &str) -> String {
        let n = &self.arena[node as usize];
        let left = |tab: &str| self.print_node(n.l, tab);
        let right = |tab: &str| self.print_node(n.r, tab);
        let children: [Option<&PrintChild<'_>>; 2] = [
            (n.l != BOTTOM).then_some(&left as &PrintChild<'_>),
            (n.r != BOTTOM).then_some(&right as &PrintChild<'_>),
        ];
        format!("{:?}{}", n.keys, print_tree(tab, &children))
    }

    /// One line per node, left child listed before the right one.
    pub fn print(&self, tab: &str) -> String {
        if self.root == BOTTOM {
            return "SortTree ∅".to_string();
        }
        format!("SortTree\n{tab}└─ {}", self.print_node(self.root, &format!("{tab}   ")))
    }
}
