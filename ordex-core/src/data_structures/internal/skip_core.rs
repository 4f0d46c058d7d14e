use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use log::debug;

use crate::error::InvariantError;

// =============================================================================
// SKIP LIST LINK STRUCTURE
// =============================================================================
//
// Level 3:  HEAD ─────────────────────────────────────► 30 ─────────────────► NULL
// Level 2:  HEAD ──────────► 10 ─────────────────────► 30 ─────────────────► NULL
// Level 1:  HEAD ──────────► 10 ──────────► 20 ──────► 30 ─────────────────► NULL
// Level 0:  HEAD ──────────► 10 ──────────► 20 ──────► 30 ──────────► 40 ──► NULL
//
// INVARIANTS:
// 1. Keys strictly increase along every level; duplicates are rejected
// 2. A node with top level L is linked at every level 0..=L and no higher
// 3. current_level <= max_level, and no level above current_level is linked
// 4. HEAD has max_level + 1 links and no key
// 5. Nodes are never unlinked; they are freed only when the list drops
//
// WRITERS AND READERS:
// There is exactly one writer at a time (SkipList owns it through &mut,
// ConcurrentSkipList through its insert lock). Readers run concurrently with
// that writer and take no lock.
//
// A new node is built completely (key and every forward link) before the
// first Release store makes it reachable. Levels are spliced from 0 upward,
// so a reader that reaches the node at level L finds its links below L
// already set. Readers load links with Acquire.
//
// INSERT:
//   1. Descend from HEAD at current_level, recording the last node before
//      each drop (the predecessor array)
//   2. Level-0 successor equal to the key - duplicate, return unchanged
//   3. Draw the node level; levels above current_level use HEAD as
//      predecessor
//   4. Splice level 0..=new_level: node.next = pred.next, then pred.next = node
//   5. Raise current_level if the node is taller than every other node
//
// =============================================================================

type Link<K> = AtomicPtr<SkipNode<K>>;

pub(crate) struct SkipNode<K> {
    key: K,
    // One link per level the node takes part in, sized once at creation.
    forward: Box<[Link<K>]>,
}

impl<K> SkipNode<K> {
    fn new(key: K, level: usize) -> Self {
        SkipNode {
            key,
            forward: empty_links(level + 1),
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    /// Top level of this node.
    #[inline]
    pub(crate) fn level(&self) -> usize {
        self.forward.len() - 1
    }
}

fn empty_links<K>(count: usize) -> Box<[Link<K>]> {
    (0..count)
        .map(|_| AtomicPtr::new(ptr::null_mut()))
        .collect()
}

/// Where a descent currently stands: a node, or HEAD when `node` is None.
struct Cursor<'a, K> {
    node: Option<&'a SkipNode<K>>,
    links: &'a [Link<K>],
}

// Manual impls to avoid requiring K: Clone/Copy
impl<K> Clone for Cursor<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Cursor<'_, K> {}

// ============================================================================
// Search traces
// ============================================================================

/// What a search did on one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep<K> {
    pub level: usize,
    /// Key of the node the search dropped down from; None means HEAD.
    pub predecessor: Option<K>,
    /// Forward moves made on this level.
    pub advanced: usize,
}

/// The full top-down path of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTrace<K> {
    pub steps: Vec<TraceStep<K>>,
    /// Level-0 successor the target was compared against.
    pub successor: Option<K>,
    pub found: bool,
}

impl<K> SearchTrace<K> {
    /// Total forward moves across all levels.
    pub fn horizontal_moves(&self) -> usize {
        self.steps.iter().map(|step| step.advanced).sum()
    }

    /// Level drops, HEAD entry at the top level excluded.
    pub fn vertical_moves(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }
}

// ============================================================================
// SkipCore
// ============================================================================

pub(crate) struct SkipCore<K> {
    head: Box<[Link<K>]>,
    max_level: usize,
    current_level: AtomicUsize,
    len: AtomicUsize,
    _owns: PhantomData<Box<SkipNode<K>>>,
}

impl<K> SkipCore<K> {
    pub(crate) fn new(max_level: usize) -> Self {
        SkipCore {
            head: empty_links(max_level + 1),
            max_level,
            current_level: AtomicUsize::new(0),
            len: AtomicUsize::new(0),
            _owns: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn max_level(&self) -> usize {
        self.max_level
    }

    #[inline]
    pub(crate) fn current_level(&self) -> usize {
        self.current_level.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    #[inline]
    fn node_at(&self, node: *mut SkipNode<K>) -> Option<&SkipNode<K>> {
        // SAFETY: non-null links always point at nodes created by insert, and
        // nodes are freed only in Drop, which cannot run while &self is live.
        unsafe { node.as_ref() }
    }

    fn head_cursor(&self) -> Cursor<'_, K> {
        Cursor {
            node: None,
            links: &self.head,
        }
    }

    /// Nodes linked at `level`, in key order.
    pub(crate) fn level_nodes(&self, level: usize) -> impl Iterator<Item = &SkipNode<K>> {
        let first = self
            .head
            .get(level)
            .and_then(|link| self.node_at(link.load(Ordering::Acquire)));

        std::iter::successors(first, move |node| {
            self.node_at(node.forward[level].load(Ordering::Acquire))
        })
    }
}

impl<K: Ord> SkipCore<K> {
    /// Move right along `level` while the next key is below `key`.
    /// Returns the number of moves.
    #[inline]
    fn advance<'a>(&'a self, cursor: &mut Cursor<'a, K>, level: usize, key: &K) -> usize {
        let mut moves = 0;
        while let Some(next) = self.node_at(cursor.links[level].load(Ordering::Acquire)) {
            if next.key >= *key {
                break;
            }
            cursor.node = Some(next);
            cursor.links = &next.forward;
            moves += 1;
        }
        moves
    }

    /// Top-down descent from HEAD at the current level to level 0.
    ///
    /// `on_level` sees the cursor each level ends on, before dropping down.
    fn descend<'a, F>(&'a self, key: &K, mut on_level: F) -> Cursor<'a, K>
    where
        F: FnMut(usize, Cursor<'a, K>, usize),
    {
        let mut cursor = self.head_cursor();
        let top = self.current_level();

        for level in (0..=top).rev() {
            let moves = self.advance(&mut cursor, level, key);
            on_level(level, cursor, moves);
        }

        cursor
    }

    #[inline]
    fn successor<'a>(&'a self, cursor: &Cursor<'a, K>) -> Option<&'a SkipNode<K>> {
        self.node_at(cursor.links[0].load(Ordering::Acquire))
    }

    pub(crate) fn contains(&self, key: &K) -> bool {
        let cursor = self.descend(key, |_, _, _| {});
        self.successor(&cursor).is_some_and(|node| node.key == *key)
    }

    /// Insert `key` unless it is already present.
    ///
    /// The caller must be the only writer for the duration of the call.
    /// Concurrent `contains` calls are fine. `draw_level` runs only when the
    /// key is new.
    ///
    pub(crate) fn insert_exclusive<F>(&self, key: K, draw_level: F) -> bool
    where
        F: FnOnce() -> usize,
    {
        let current = self.current_level.load(Ordering::Relaxed);

        // Levels above `current` keep HEAD as their predecessor.
        let mut update: Vec<&[Link<K>]> = vec![&self.head[..]; self.max_level + 1];
        let cursor = self.descend(&key, |level, cursor, _| update[level] = cursor.links);

        if self.successor(&cursor).is_some_and(|node| node.key == key) {
            return false;
        }

        let new_level = draw_level().min(self.max_level);
        let node = Box::into_raw(Box::new(SkipNode::new(key, new_level)));

        // SAFETY: `node` came from Box::into_raw above and stays allocated
        // until the list drops.
        let tower = unsafe { &(*node).forward };

        for (level, pred) in update.iter().enumerate().take(new_level + 1) {
            tower[level].store(pred[level].load(Ordering::Relaxed), Ordering::Relaxed);
            pred[level].store(node, Ordering::Release);
        }

        if new_level > current {
            debug!("skip list level raised from {} to {}", current, new_level);
            self.current_level.store(new_level, Ordering::Release);
        }

        self.len.fetch_add(1, Ordering::Release);
        true
    }

    pub(crate) fn validate(&self) -> Result<(), InvariantError> {
        let current = self.current_level();
        if current > self.max_level {
            return Err(InvariantError::LevelOverflow {
                current,
                max: self.max_level,
            });
        }

        // Nothing may be linked above the current level.
        if let Some(level) = (current + 1..=self.max_level)
            .find(|&level| !self.head[level].load(Ordering::Acquire).is_null())
        {
            return Err(InvariantError::LevelOverflow {
                current: level,
                max: current,
            });
        }

        for level in 0..=current {
            let mut previous: Option<&K> = None;
            for (position, node) in self.level_nodes(level).enumerate() {
                if previous.is_some_and(|prev| node.key <= *prev) {
                    return Err(InvariantError::Unordered { position });
                }
                previous = Some(&node.key);
            }
        }

        // Every node on a level must also be on the level below it.
        for level in 1..=current {
            let mut below = self.level_nodes(level - 1);
            for node in self.level_nodes(level) {
                if !below.any(|candidate| ptr::eq(candidate, node)) {
                    return Err(InvariantError::BrokenTower {
                        level,
                        below: level - 1,
                    });
                }
            }
        }

        let counted = self.level_nodes(0).count();
        let reported = self.len();
        if counted != reported {
            return Err(InvariantError::LengthMismatch { reported, counted });
        }

        Ok(())
    }
}

impl<K: Ord + Clone> SkipCore<K> {
    pub(crate) fn trace(&self, key: &K) -> SearchTrace<K> {
        let mut steps = Vec::new();
        let cursor = self.descend(key, |level, cursor, advanced| {
            steps.push(TraceStep {
                level,
                predecessor: cursor.node.map(|node| node.key.clone()),
                advanced,
            });
        });

        let successor = self.successor(&cursor).map(|node| node.key.clone());
        let found = successor.as_ref() == Some(key);

        SearchTrace {
            steps,
            successor,
            found,
        }
    }
}

impl<K> Drop for SkipCore<K> {
    fn drop(&mut self) {
        let mut current = self.head[0].load(Ordering::Relaxed);

        while !current.is_null() {
            // SAFETY: every node was created by Box::into_raw in insert and
            // is linked exactly once at level 0.
            let node = unsafe { Box::from_raw(current) };
            current = node.forward[0].load(Ordering::Relaxed);
        }
    }
}

// Safety: keys move in from the inserting thread and are dropped with the
// list; shared access only hands out &K.
unsafe impl<K: Send> Send for SkipCore<K> {}
unsafe impl<K: Send + Sync> Sync for SkipCore<K> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn core_with(keys_and_levels: &[(i32, usize)], max_level: usize) -> SkipCore<i32> {
        let core = SkipCore::new(max_level);
        for &(key, level) in keys_and_levels {
            assert!(core.insert_exclusive(key, || level));
        }
        core
    }

    fn keys_at(core: &SkipCore<i32>, level: usize) -> Vec<i32> {
        core.level_nodes(level).map(|node| *node.key()).collect()
    }

    #[test]
    fn test_splice_at_every_level() {
        let core = core_with(&[(30, 3), (10, 2), (20, 1), (40, 0)], 4);

        assert_eq!(keys_at(&core, 0), vec![10, 20, 30, 40]);
        assert_eq!(keys_at(&core, 1), vec![10, 20, 30]);
        assert_eq!(keys_at(&core, 2), vec![10, 30]);
        assert_eq!(keys_at(&core, 3), vec![30]);
        assert_eq!(keys_at(&core, 4), Vec::<i32>::new());
        assert_eq!(core.current_level(), 3);
        core.validate().unwrap();
    }

    #[test]
    fn test_duplicate_skips_level_draw() {
        let core = core_with(&[(5, 2)], 4);

        let mut drawn = false;
        assert!(!core.insert_exclusive(5, || {
            drawn = true;
            4
        }));
        assert!(!drawn);
        assert_eq!(core.current_level(), 2);
        assert_eq!(core.len(), 1);
    }

    #[test]
    fn test_level_clamped_to_max() {
        let core = core_with(&[(1, 99)], 3);
        assert_eq!(core.current_level(), 3);
        assert_eq!(core.level_nodes(0).next().map(|node| node.level()), Some(3));
        core.validate().unwrap();
    }

    #[test]
    fn test_trace_records_predecessors() {
        let core = core_with(&[(10, 1), (20, 0), (30, 1), (40, 0)], 2);

        let trace = core.trace(&40);
        assert!(trace.found);
        assert_eq!(trace.successor, Some(40));
        assert_eq!(
            trace.steps,
            vec![
                TraceStep {
                    level: 1,
                    predecessor: Some(30),
                    advanced: 2
                },
                TraceStep {
                    level: 0,
                    predecessor: Some(30),
                    advanced: 0
                },
            ]
        );
        assert_eq!(trace.horizontal_moves(), 2);
        assert_eq!(trace.vertical_moves(), 1);

        let miss = core.trace(&5);
        assert!(!miss.found);
        assert_eq!(miss.successor, Some(10));
        assert!(miss.steps.iter().all(|step| step.predecessor.is_none()));
    }

    #[test]
    fn test_validate_detects_unordered_level() {
        let core = core_with(&[(10, 0), (20, 0)], 2);

        // Swap the keys' order by relinking HEAD past the first node.
        let first = core.head[0].load(Ordering::Relaxed);
        let second = unsafe { (*first).forward[0].load(Ordering::Relaxed) };
        unsafe {
            (*first).forward[0].store(ptr::null_mut(), Ordering::Relaxed);
            (*second).forward[0].store(first, Ordering::Relaxed);
        }
        core.head[0].store(second, Ordering::Relaxed);

        assert_eq!(
            core.validate(),
            Err(InvariantError::Unordered { position: 1 })
        );
    }
}
