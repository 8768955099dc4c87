//! Arena-based binary search tree that keeps a set of keys ordered by a value
//! resolved through an indirection.
//!
//! A key's value is looked up on every comparison: the key itself
//! ([`SetSortTree`]), a map entry ([`MapSortTree`]) or a sequence slot
//! ([`SeqSortTree`]). When a value changes in the backing store,
//! | [`SortTree::update`] moves the key to its new position. Keys with equal
//! values share one tree node.
//!
//! Instead of pointers, nodes refer to each other by `u32` indices into an
//! arena owned by the tree. Index `0` is the shared [`BOTTOM`] node that
//! stands in for every absent link.
//!
//! ```rust
//! use sort_tree::SetSortTree;
//!
//! let mut tree = SetSortTree::new(|a: &i32, b: &i32| b - a);
//! for k in [3, 1, 2] {
//!     tree.update(k).unwrap();
//! }
//! assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
//! assert_eq!(tree.keys_from_value(&1, false).next(), Some(&2));
//! ```
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`types`] | [`NodeId`], [`BOTTOM`], [`Node`] trait, [`SortTreeNode`] |
//! | [`util`] | `first`, `last`, `next`, `prev`, `depth`, `size` over an arena |
//! | [`resolve`] | [`Resolve`] and the [`Identity`] / [`MapLookup`] / [`SeqLookup`] strategies |
//! | [`sort_tree`] | [`SortTree`]: insert, update, remove, unlink, search |
//! | [`iter`] | [`Cursor`] and the [`Keys`] iterator |
//! | [`print`] | debug dump |

pub mod error;
pub mod iter;
pub mod print;
pub mod resolve;
pub mod sort_tree;
mod tracing_helpers;
pub mod types;
pub mod util;

pub use error::SortTreeError;
pub use iter::{Cursor, Keys};
pub use resolve::{Identity, MapLookup, Resolve, SeqLookup};
pub use sort_tree::{MapSortTree, SeqSortTree, SetSortTree, SortTree};
pub use types::{Node, NodeId, SortTreeNode, BOTTOM};
pub use util::{first, last, next, prev};
