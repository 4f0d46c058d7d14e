//! Workloads and drivers for the ordex indexes.
//!
//! ```text
//! workload     timed sequential and multi-threaded insert/search runs
//! interactive  build an index, then answer membership queries from a reader
//! explain      a fixed five-level skip list over 1..=1000 with traced searches
//! ```

pub mod error;
pub mod explain;
pub mod interactive;
pub mod workload;

pub use error::{Error, InputError, Result};
pub use explain::Explainer;
pub use interactive::{Query, SessionSummary, parse_query, run_session};
pub use workload::{
    Comparison, ConcurrentReport, ReportTotals, SequentialReport, WorkerReport, WorkloadConfig,
    compare_concurrent, compare_sequential, fill, partition, run_concurrent, run_sequential,
};
