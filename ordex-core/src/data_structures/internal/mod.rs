//! Internal implementation details.
//!
//! These are pub(crate) and not intended for external use.

pub mod skip_core;

pub(crate) use skip_core::SkipCore;
pub use skip_core::{SearchTrace, TraceStep};
