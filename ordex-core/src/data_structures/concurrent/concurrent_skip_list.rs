use crate::data_structures::internal::{SearchTrace, SkipCore};
use crate::data_structures::{ConcurrentIndex, LevelGenerator, SkipListConfig};
use crate::error::InvariantError;
use crate::guard::ConcurrentGuard;

/// A skip list that many threads can insert into and search concurrently.
///
/// The level generator lives inside the insert guard, so levels are drawn
/// only by the thread holding the insert lock. Searches walk the atomic
/// forward links without locking.
///
pub struct ConcurrentSkipList<K> {
    core: SkipCore<K>,
    guard: ConcurrentGuard<LevelGenerator>,
}

impl<K> ConcurrentSkipList<K> {
    pub fn new() -> Self {
        Self::with_config(SkipListConfig::default())
    }

    pub fn with_config(config: SkipListConfig) -> Self {
        ConcurrentSkipList {
            core: SkipCore::new(config.max_level()),
            guard: ConcurrentGuard::new(LevelGenerator::new(&config)),
        }
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn current_level(&self) -> usize {
        self.core.current_level()
    }

    pub fn max_level(&self) -> usize {
        self.core.max_level()
    }

    pub fn level_len(&self, level: usize) -> usize {
        self.core.level_nodes(level).count()
    }
}

impl<K: Ord> ConcurrentSkipList<K> {
    /// Insert under the insert lock.
    ///
    /// Returns `false` when the key is already present; the lock is released
    /// either way.
    ///
    pub fn insert(&self, key: K) -> bool {
        self.guard.exclusive(|levels| {
            self.core.insert_exclusive(key, || levels.random_level())
        })
    }

    pub fn search(&self, key: &K) -> bool {
        self.core.contains(key)
    }

    /// Checks the structure as seen at the moment of the call. Run it when no
    /// insert is in flight to get a stable answer.
    pub fn validate(&self) -> Result<(), InvariantError> {
        self.core.validate()
    }
}

impl<K: Ord + Clone> ConcurrentSkipList<K> {
    pub fn level_keys(&self, level: usize) -> Vec<K> {
        self.core
            .level_nodes(level)
            .map(|node| node.key().clone())
            .collect()
    }

    pub fn to_vec(&self) -> Vec<K> {
        self.level_keys(0)
    }

    pub fn trace(&self, key: &K) -> SearchTrace<K> {
        self.core.trace(key)
    }
}

impl<K> Default for ConcurrentSkipList<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Send + Sync> ConcurrentIndex<K> for ConcurrentSkipList<K> {
    fn insert(&self, key: K) -> bool {
        ConcurrentSkipList::insert(self, key)
    }

    fn search(&self, key: &K) -> bool {
        ConcurrentSkipList::search(self, key)
    }

    fn len(&self) -> usize {
        ConcurrentSkipList::len(self)
    }

    fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        ConcurrentSkipList::to_vec(self)
    }

    fn validate(&self) -> Result<(), InvariantError> {
        ConcurrentSkipList::validate(self)
    }
}
