//! Ordered indexes shared between threads.
//!
//! Both follow the same discipline: one [`ConcurrentGuard`](crate::guard::ConcurrentGuard)
//! per instance serializes inserts, and searches never take it.
//!
//! - `ConcurrentSkipList` splices nodes in place. A node is fully built
//!   before the Release store that links it, and is never freed while the
//!   list lives.
//! - `ConcurrentAvlTree` cannot rotate in place under lock-free readers, so
//!   it copies the insert path and publishes the new root with one atomic
//!   swap through crossbeam-epoch.

pub mod concurrent_avl_tree;
pub mod concurrent_skip_list;

pub use concurrent_avl_tree::ConcurrentAvlTree;
pub use concurrent_skip_list::ConcurrentSkipList;
