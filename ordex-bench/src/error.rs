use std::io;

use ordex_core::{ConfigError, InvariantError};
use thiserror::Error;

/// A line of interactive input that cannot be searched for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid input {0:?}: enter an integer or 'exit'")]
    NotAnInteger(String),

    #[error("{value} is out of range: use a number between {min} and {max}")]
    OutOfRange { value: i64, min: i64, max: i64 },
}

/// Error type for the harness and the drivers.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid skip list configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("index failed validation: {0}")]
    Invariant(#[from] InvariantError),

    #[error("a concurrent workload needs at least one worker")]
    NoWorkers,

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),

    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Result type for the harness and the drivers.
pub type Result<T> = std::result::Result<T, Error>;
