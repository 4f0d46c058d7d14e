use thiserror::Error;

/// Rejected skip list configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Level-continuation probability outside `[0, 1]` or not finite.
    #[error("level probability must be within [0, 1], got {0}")]
    Probability(f64),
    /// More levels than a node tower can address.
    #[error("max level {requested} exceeds the supported maximum of {supported}")]
    MaxLevel { requested: usize, supported: usize },
}

/// A structural invariant that `validate()` found broken.
///
/// Index operations never produce these; they exist so tests and callers can
/// check a structure after the fact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("keys out of order at position {position}")]
    Unordered { position: usize },
    #[error("node at depth {depth} is unbalanced (left height {left}, right height {right})")]
    Unbalanced {
        depth: usize,
        left: usize,
        right: usize,
    },
    #[error("node at depth {depth} caches height {cached}, actual height is {actual}")]
    StaleHeight {
        depth: usize,
        cached: usize,
        actual: usize,
    },
    #[error("level {level} holds a key missing from level {below}")]
    BrokenTower { level: usize, below: usize },
    #[error("current level {current} exceeds max level {max}")]
    LevelOverflow { current: usize, max: usize },
    #[error("structure reports {reported} keys but holds {counted}")]
    LengthMismatch { reported: usize, counted: usize },
}
