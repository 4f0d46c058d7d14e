//! Ordered in-memory indexes: an AVL tree and a skip list, each with a
//! single-owner form and a form that many threads can insert into and
//! search concurrently.
//!
//! ```text
//! AvlTree<K>            SkipList<K>             (single owner, &mut insert)
//! ConcurrentAvlTree<K>  ConcurrentSkipList<K>   (shared, &self insert)
//!         │                     │
//!         └──── ConcurrentGuard ┘   one insert lock per instance,
//!                                   searches never take it
//! ```

pub mod common_tests;
pub mod data_structures;
pub mod error;
pub mod guard;

pub use data_structures::{
    AvlTree, ConcurrentAvlTree, ConcurrentIndex, ConcurrentSkipList, LevelGenerator, OrderedIndex,
    SearchTrace, SkipList, SkipListConfig, TraceStep,
};
pub use error::{ConfigError, InvariantError};
pub use guard::ConcurrentGuard;
