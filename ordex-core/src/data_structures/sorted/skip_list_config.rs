use crate::error::ConfigError;

/// Default number of levels above level 0.
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// Default level-continuation probability.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

/// Largest `max_level` a skip list accepts.
pub const MAX_SUPPORTED_LEVEL: usize = 63;

/// Construction parameters for a skip list.
///
/// Levels are numbered `0..=max_level`. A node is promoted one level with
/// probability `probability`, so about `n * p^k * (1 - p)` nodes top out at
/// level `k`.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkipListConfig {
    max_level: usize,
    probability: f64,
    seed: Option<u64>,
}

impl SkipListConfig {
    pub fn new(max_level: usize, probability: f64) -> Result<Self, ConfigError> {
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::Probability(probability));
        }
        if max_level > MAX_SUPPORTED_LEVEL {
            return Err(ConfigError::MaxLevel {
                requested: max_level,
                supported: MAX_SUPPORTED_LEVEL,
            });
        }

        Ok(SkipListConfig {
            max_level,
            probability,
            seed: None,
        })
    }

    /// Default probability with `max_level = ceil(log2(capacity))`.
    ///
    pub fn for_capacity(capacity: usize) -> Self {
        let max_level = match capacity {
            0 | 1 => 0,
            n => (usize::BITS - (n - 1).leading_zeros()) as usize,
        };

        SkipListConfig {
            max_level: max_level.min(MAX_SUPPORTED_LEVEL),
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }

    /// Fix the random source so level assignment is reproducible.
    ///
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for SkipListConfig {
    fn default() -> Self {
        SkipListConfig {
            max_level: DEFAULT_MAX_LEVEL,
            probability: DEFAULT_PROBABILITY,
            seed: None,
        }
    }
}
