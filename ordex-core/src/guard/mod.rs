//! Insert-side mutual exclusion shared by the concurrent indexes.
//!
//! Each concurrent structure owns one `ConcurrentGuard`. It wraps the state
//! only a writer may touch (the skip list's level generator, nothing for the
//! AVL tree) and runs one insert at a time against it:
//!
//! ```text
//! insert(k) ──► guard.exclusive(|state| { traverse, rebalance/splice, publish })
//! search(k) ──► reads the published structure directly, never locks
//! ```
//!
//! The lock is scoped to the closure, so it is released on every exit path,
//! including an insert that turns out to be a duplicate.

use parking_lot::Mutex;

/// Serializes the mutating operation of one structure instance.
///
/// # Example
///
/// ```
/// use ordex_core::ConcurrentGuard;
///
/// let guard = ConcurrentGuard::new(0u64);
/// let inserted = guard.exclusive(|count| {
///     *count += 1;
///     *count
/// });
/// assert_eq!(inserted, 1);
/// ```
///
#[derive(Default)]
pub struct ConcurrentGuard<W> {
    writer: Mutex<W>,
}

impl<W> ConcurrentGuard<W> {
    pub fn new(writer: W) -> Self {
        ConcurrentGuard {
            writer: Mutex::new(writer),
        }
    }

    /// Run `f` with exclusive access to the writer state.
    ///
    /// Blocks while another thread is inside `exclusive` on the same guard.
    ///
    pub fn exclusive<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut W) -> R,
    {
        let mut writer = self.writer.lock();
        f(&mut writer)
    }

    /// Whether a writer currently holds the guard.
    pub fn is_held(&self) -> bool {
        self.writer.is_locked()
    }
}
