//! Single-owner ordered indexes.
//!
//! Both take `&mut self` to insert. Their concurrent counterparts live in
//! [`crate::data_structures::concurrent`] and reuse the same node code.

pub mod avl_tree;
pub mod level_generator;
pub mod skip_list;
pub mod skip_list_config;

pub use avl_tree::{AvlIter, AvlTree};
pub use level_generator::{LevelGenerator, level_from};
pub use skip_list::SkipList;
pub use skip_list_config::{
    DEFAULT_MAX_LEVEL, DEFAULT_PROBABILITY, MAX_SUPPORTED_LEVEL, SkipListConfig,
};

pub use crate::data_structures::internal::{SearchTrace, TraceStep};
