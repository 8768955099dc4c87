//! Key → value resolution strategies.
//!
//! A tree never stores values. Every comparison asks its [`Resolve`]
//! implementation for the current value of a key, so the three strategies
//! below keep no cache: changing a value in the backing store is visible
//! immediately, and [`SortTree::update`](crate::SortTree::update) moves the key
//! to where that value belongs.

use std::collections::HashMap;
use std::hash::Hash;

/// Resolves a key to the value it is currently sorted by.
pub trait Resolve<K, V> {
    /// Returns `None` when the backing store has no value for `key`.
    fn resolve<'a>(&'a self, key: &'a K) -> Option<&'a V>;
}

/// The key is its own value: a sorted set.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl<K> Resolve<K, K> for Identity {
    #[inline]
    fn resolve<'a>(&'a self, key: &'a K) -> Option<&'a K> {
        Some(key)
    }
}

/// Values are looked up by key in a map.
#[derive(Clone, Debug)]
pub struct MapLookup<K, V> {
    pub map: HashMap<K, V>,
}

impl<K, V> MapLookup<K, V> {
    pub fn new(map: HashMap<K, V>) -> Self {
        Self { map }
    }
}

impl<K, V> Default for MapLookup<K, V> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq, V> Resolve<K, V> for MapLookup<K, V> {
    #[inline]
    fn resolve<'a>(&'a self, key: &'a K) -> Option<&'a V> {
        self.map.get(key)
    }
}

/// Keys are positions in a sequence of values.
#[derive(Clone, Debug)]
pub struct SeqLookup<V> {
    pub items: Vec<V>,
}

impl<V> SeqLookup<V> {
    pub fn new(items: Vec<V>) -> Self {
        Self { items }
    }
}

impl<V> Default for SeqLookup<V> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<V> Resolve<usize, V> for SeqLookup<V> {
    #[inline]
    fn resolve<'a>(&'a self, key: &'a usize) -> Option<&'a V> {
        self.items.get(*key)
    }
}
