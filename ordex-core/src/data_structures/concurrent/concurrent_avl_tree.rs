use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Owned};

use crate::data_structures::{AvlTree, ConcurrentIndex};
use crate::error::InvariantError;
use crate::guard::ConcurrentGuard;

// =============================================================================
// PUBLICATION PROTOCOL
// =============================================================================
//
// `published` always points at a complete, balanced AvlTree version.
//
// insert (under the insert lock):
//   1. Load the published version
//   2. Clone it - O(1), the clone shares every node
//   3. Insert into the clone. make_mut copies the nodes on the insert path,
//      rotations run on those copies only
//   4. Swap the clone in (AcqRel) and retire the old version to the epoch
//      collector
//
//            published v1                 published v2
//                 │                            │
//                 A                            A'        (copied path)
//                / \                          / \
//               B   C  ◄──── shared ─────────┘   C'
//                    \                            \
//                     D                            D'
//                                                   \
//                                                    E   (new node)
//
// search (no lock): pin, load the published version, descend. The version a
// search loaded stays alive until the search unpins, so a reader sees the
// tree before or after an insert, never a rotation in progress.
//
// =============================================================================

/// An AVL tree that many threads can insert into and search concurrently.
///
/// Inserts are serialized by the tree's [`ConcurrentGuard`]; searches are
/// lock-free reads of the latest published version.
///
/// Inserting requires `K: Send + Sync + 'static`. A replaced version is handed
/// to the epoch collector and may be dropped after this tree, on whichever
/// thread next collects garbage, so its keys must not borrow from anything.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::thread;
///
/// use ordex_core::ConcurrentAvlTree;
///
/// let tree = Arc::new(ConcurrentAvlTree::new());
/// let handles: Vec<_> = (0..4)
///     .map(|worker| {
///         let tree = Arc::clone(&tree);
///         thread::spawn(move || {
///             for key in worker * 100..(worker + 1) * 100 {
///                 tree.insert(key);
///             }
///         })
///     })
///     .collect();
///
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(tree.len(), 400);
/// assert!(tree.search(&399));
/// ```
///
pub struct ConcurrentAvlTree<K> {
    published: Atomic<AvlTree<K>>,
    guard: ConcurrentGuard<()>,
}

impl<K> ConcurrentAvlTree<K> {
    pub fn new() -> Self {
        ConcurrentAvlTree {
            published: Atomic::new(AvlTree::new()),
            guard: ConcurrentGuard::new(()),
        }
    }

    /// Run `f` against the currently published version.
    fn with_published<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AvlTree<K>) -> R,
    {
        let guard = epoch::pin();
        let current = self.published.load(Ordering::Acquire, &guard);
        // SAFETY: `published` is never null, and a retired version is only
        // destroyed once every thread pinned at its retirement has unpinned.
        f(unsafe { current.deref() })
    }

    pub fn len(&self) -> usize {
        self.with_published(AvlTree::len)
    }

    pub fn is_empty(&self) -> bool {
        self.with_published(AvlTree::is_empty)
    }

    pub fn height(&self) -> usize {
        self.with_published(AvlTree::height)
    }

    /// A consistent view of the tree as of the last completed insert.
    ///
    /// The snapshot shares nodes with the live tree and is unaffected by
    /// later inserts.
    ///
    pub fn snapshot(&self) -> AvlTree<K> {
        self.with_published(AvlTree::clone)
    }
}

impl<K: Ord> ConcurrentAvlTree<K> {
    /// Check whether `key` is present, without taking the insert lock.
    pub fn search(&self, key: &K) -> bool {
        self.with_published(|tree| tree.search(key))
    }

    pub fn validate(&self) -> Result<(), InvariantError> {
        self.with_published(AvlTree::validate)
    }
}

impl<K: Ord + Clone> ConcurrentAvlTree<K> {
    pub fn to_vec(&self) -> Vec<K> {
        self.snapshot().to_vec()
    }
}

impl<K: Ord + Clone + Send + Sync + 'static> ConcurrentAvlTree<K> {
    /// Insert a key and publish the rebalanced tree.
    pub fn insert(&self, key: K) {
        self.guard.exclusive(|_| {
            let guard = epoch::pin();
            let current = self.published.load(Ordering::Acquire, &guard);

            // SAFETY: see `with_published`. Only the lock holder swaps.
            let mut next = unsafe { current.deref() }.clone();
            next.insert(key);

            let retired = self
                .published
                .swap(Owned::new(next), Ordering::AcqRel, &guard);

            // SAFETY: `retired` is no longer reachable from `published`;
            // readers that loaded it are protected by their own pins. The
            // deferred drop may outlive `self` and run on another thread,
            // which `K: Send + Sync + 'static` allows.
            unsafe { guard.defer_destroy(retired) };
        });
    }
}

impl<K> Default for ConcurrentAvlTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for ConcurrentAvlTree<K> {
    fn drop(&mut self) {
        // SAFETY: &mut self rules out concurrent readers; retired versions
        // own their nodes independently of the published one.
        unsafe {
            let guard = epoch::unprotected();
            let current = self.published.load(Ordering::Relaxed, guard);
            if !current.is_null() {
                drop(current.into_owned());
            }
        }
    }
}

impl<K: Ord + Clone + Send + Sync + 'static> ConcurrentIndex<K> for ConcurrentAvlTree<K> {
    fn insert(&self, key: K) -> bool {
        ConcurrentAvlTree::insert(self, key);
        true
    }

    fn search(&self, key: &K) -> bool {
        ConcurrentAvlTree::search(self, key)
    }

    fn len(&self) -> usize {
        ConcurrentAvlTree::len(self)
    }

    fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        ConcurrentAvlTree::to_vec(self)
    }

    fn validate(&self) -> Result<(), InvariantError> {
        ConcurrentAvlTree::validate(self)
    }
}
