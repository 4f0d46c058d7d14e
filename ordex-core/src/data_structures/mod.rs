//! Ordered index structures.
//!
//! # Organization
//!
//! - [`sorted`] - Single-owner indexes (AvlTree, SkipList) and level generation
//! - [`concurrent`] - Shared indexes guarded by one insert lock per instance
//! - [`internal`] - Link structure shared by both skip list forms (pub(crate))

pub mod concurrent;
pub(crate) mod internal;
pub mod ordered_index;
pub mod sorted;

pub use concurrent::{ConcurrentAvlTree, ConcurrentSkipList};
pub use ordered_index::{ConcurrentIndex, OrderedIndex};
pub use sorted::{
    AvlTree, AvlIter, LevelGenerator, SearchTrace, SkipList, SkipListConfig, TraceStep,
};
