use crate::data_structures::OrderedIndex;
use crate::data_structures::internal::{SearchTrace, SkipCore};
use crate::error::InvariantError;

use super::{LevelGenerator, SkipListConfig};

/// A probabilistic multi-level linked list.
///
/// Duplicate keys are rejected: inserting a key that is already present
/// leaves the list, including its current level, unchanged.
///
/// # Example
///
/// ```
/// use ordex_core::{SkipList, SkipListConfig};
///
/// let mut list = SkipList::with_config(SkipListConfig::default().with_seed(1));
/// assert!(list.insert(20));
/// assert!(list.insert(10));
/// assert!(!list.insert(20));
///
/// assert!(list.search(&10));
/// assert_eq!(list.to_vec(), vec![10, 20]);
/// ```
///
pub struct SkipList<K> {
    core: SkipCore<K>,
    levels: LevelGenerator,
}

impl<K> SkipList<K> {
    /// Creates an empty list with 16 levels above level 0 and `p = 0.5`.
    pub fn new() -> Self {
        Self::with_config(SkipListConfig::default())
    }

    pub fn with_config(config: SkipListConfig) -> Self {
        SkipList {
            core: SkipCore::new(config.max_level()),
            levels: LevelGenerator::new(&config),
        }
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Highest level holding at least one node.
    pub fn current_level(&self) -> usize {
        self.core.current_level()
    }

    pub fn max_level(&self) -> usize {
        self.core.max_level()
    }

    /// Number of nodes linked at `level`.
    pub fn level_len(&self, level: usize) -> usize {
        self.core.level_nodes(level).count()
    }

    /// Node count by top level: entry `k` counts nodes whose tower ends at `k`.
    pub fn level_histogram(&self) -> Vec<usize> {
        let mut histogram = vec![0; self.max_level() + 1];
        for node in self.core.level_nodes(0) {
            histogram[node.level()] += 1;
        }
        histogram
    }
}

impl<K: Ord> SkipList<K> {
    /// Insert with a randomly drawn level.
    ///
    /// Returns `false`, without drawing a level, when the key is present.
    ///
    pub fn insert(&mut self, key: K) -> bool {
        let levels = &mut self.levels;
        self.core.insert_exclusive(key, || levels.random_level())
    }

    /// Insert with a fixed top level, clamped to `max_level`.
    ///
    /// Builds deterministic layouts; regular inserts should use [`insert`](Self::insert).
    ///
    pub fn insert_with_level(&mut self, key: K, level: usize) -> bool {
        self.core.insert_exclusive(key, || level)
    }

    /// Check whether `key` is present.
    ///
    /// Expected `O(log n)`; `O(n)` when every node sits on level 0.
    ///
    pub fn search(&self, key: &K) -> bool {
        self.core.contains(key)
    }

    pub fn validate(&self) -> Result<(), InvariantError> {
        self.core.validate()
    }
}

impl<K: Ord + Clone> SkipList<K> {
    /// Keys linked at `level`, ascending.
    pub fn level_keys(&self, level: usize) -> Vec<K> {
        self.core
            .level_nodes(level)
            .map(|node| node.key().clone())
            .collect()
    }

    pub fn to_vec(&self) -> Vec<K> {
        self.level_keys(0)
    }

    /// Run a search and record the path it took.
    pub fn trace(&self, key: &K) -> SearchTrace<K> {
        self.core.trace(key)
    }
}

impl<K> Default for SkipList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord> OrderedIndex<K> for SkipList<K> {
    fn insert(&mut self, key: K) -> bool {
        SkipList::insert(self, key)
    }

    fn search(&self, key: &K) -> bool {
        SkipList::search(self, key)
    }

    fn len(&self) -> usize {
        SkipList::len(self)
    }

    fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        SkipList::to_vec(self)
    }

    fn validate(&self) -> Result<(), InvariantError> {
        SkipList::validate(self)
    }
}
