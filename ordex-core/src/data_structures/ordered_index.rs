//! The operation surface shared by every index.
//!
//! Two traits, one per ownership model:
//!
//! ```text
//! OrderedIndex<K>      insert(&mut self)   AvlTree, SkipList
//! ConcurrentIndex<K>   insert(&self)       ConcurrentAvlTree, ConcurrentSkipList
//! ```
//!
//! `search` takes `&self` in both and is total over the key domain: a key
//! that was never inserted is simply not found.

use crate::error::InvariantError;

// ============================================================================
// OrderedIndex - single owner
// ============================================================================

/// An ordered index driven by a single owner.
///
pub trait OrderedIndex<K: Ord> {
    /// Insert a key.
    ///
    /// Returns `true` if a node was added, `false` if the structure rejected
    /// the key as a duplicate and was left unchanged.
    ///
    fn insert(&mut self, key: K) -> bool;

    /// Check whether `key` is present.
    ///
    fn search(&self, key: &K) -> bool;

    /// Number of nodes in the index.
    ///
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All keys in ascending order.
    ///
    fn to_vec(&self) -> Vec<K>
    where
        K: Clone;

    /// Walk the whole structure and check its invariants.
    ///
    fn validate(&self) -> Result<(), InvariantError>;
}

// ============================================================================
// ConcurrentIndex - shared between threads
// ============================================================================

/// An ordered index shared between threads.
///
/// Inserts are serialized by the structure's insert lock. Searches run
/// without it and observe every insertion either not at all or completely.
///
pub trait ConcurrentIndex<K: Ord>: Send + Sync {
    /// Insert a key under the insert lock.
    ///
    /// Same return contract as [`OrderedIndex::insert`].
    ///
    fn insert(&self, key: K) -> bool;

    /// Check whether `key` is present, without taking the insert lock.
    ///
    fn search(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_vec(&self) -> Vec<K>
    where
        K: Clone;

    fn validate(&self) -> Result<(), InvariantError>;
}
