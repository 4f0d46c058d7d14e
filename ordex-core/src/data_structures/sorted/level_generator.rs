use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::SkipListConfig;

/// Draw a node level from `rng`.
///
/// Flips a coin that comes up "continue" with probability `probability`
/// and counts consecutive continues, stopping at `max_level`. The result is
/// `k` with probability `p^k * (1 - p)` for `k < max_level`.
///
pub fn level_from<R: Rng + ?Sized>(rng: &mut R, max_level: usize, probability: f64) -> usize {
    let mut level = 0;
    while level < max_level && rng.random::<f64>() < probability {
        level += 1;
    }
    level
}

/// Seedable source of node levels for one skip list.
///
pub struct LevelGenerator {
    rng: SmallRng,
    max_level: usize,
    probability: f64,
}

impl LevelGenerator {
    pub fn new(config: &SkipListConfig) -> Self {
        let rng = match config.seed() {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        LevelGenerator {
            rng,
            max_level: config.max_level(),
            probability: config.probability(),
        }
    }

    #[inline]
    pub fn random_level(&mut self) -> usize {
        level_from(&mut self.rng, self.max_level, self.probability)
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }
}
