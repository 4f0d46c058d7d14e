//! Step-by-step search walkthrough on a fixed skip list.
//!
//! The list holds exactly `1..=1000` with a deterministic tower layout:
//!
//! ```text
//! level 4   multiples of 200          5 nodes
//! level 3   multiples of 100         10 nodes
//! level 2   multiples of 20          50 nodes
//! level 1   multiples of 5          200 nodes
//! level 0   every key              1000 nodes
//! ```
//!
//! A search starts at HEAD on level 4. On every level the walkthrough shows
//! the level's nodes around the search position, the forward moves taken and
//! whether the target itself is linked on that level.

use std::io::{self, BufRead, Write};

use ordex_core::{SearchTrace, SkipList, SkipListConfig};

use crate::error::{InputError, Result};
use crate::interactive::query_loop;

pub const DEMO_MIN: i64 = 1;
pub const DEMO_MAX: i64 = 1000;
pub const DEMO_TOP_LEVEL: usize = 4;

// Key spacing per level, index = level.
const LEVEL_STEPS: [i64; DEMO_TOP_LEVEL + 1] = [1, 5, 20, 100, 200];

const NEIGHBORHOOD_RADIUS: usize = 10;
const COMPACT_LIMIT: usize = 12;

/// Top level of `key` in the demo layout.
pub fn demo_level(key: i64) -> usize {
    LEVEL_STEPS
        .iter()
        .rposition(|&step| key % step == 0)
        .unwrap_or(0)
}

pub struct Explainer {
    list: SkipList<i64>,
    levels: Vec<Vec<i64>>,
}

impl Explainer {
    pub fn new() -> Result<Self> {
        let mut list = SkipList::with_config(SkipListConfig::new(DEMO_TOP_LEVEL, 0.5)?);
        for key in DEMO_MIN..=DEMO_MAX {
            list.insert_with_level(key, demo_level(key));
        }

        let levels = (0..=DEMO_TOP_LEVEL)
            .map(|level| list.level_keys(level))
            .collect();

        Ok(Explainer { list, levels })
    }

    pub fn list(&self) -> &SkipList<i64> {
        &self.list
    }

    /// Keys linked at `level`, ascending.
    pub fn level(&self, level: usize) -> &[i64] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Levels on which `target` is linked, top down.
    pub fn appearances(&self, target: i64) -> Vec<usize> {
        (0..=DEMO_TOP_LEVEL)
            .rev()
            .filter(|&level| self.level(level).binary_search(&target).is_ok())
            .collect()
    }

    /// Print the walkthrough of a search for `target`.
    pub fn explain<W: Write>(&self, target: i64, out: &mut W) -> Result<SearchTrace<i64>> {
        if !(DEMO_MIN..=DEMO_MAX).contains(&target) {
            return Err(InputError::OutOfRange {
                value: target,
                min: DEMO_MIN,
                max: DEMO_MAX,
            }
            .into());
        }

        let trace = self.list.trace(&target);
        self.write_trace(&trace, target, out)?;
        Ok(trace)
    }

    fn write_trace<W: Write>(
        &self,
        trace: &SearchTrace<i64>,
        target: i64,
        out: &mut W,
    ) -> io::Result<()> {
        writeln!(
            out,
            "searching for {} from HEAD at level {}\n",
            target, DEMO_TOP_LEVEL
        )?;

        for step in &trace.steps {
            let keys = self.level(step.level);
            writeln!(out, "=== level {} ===", step.level)?;

            let stop = step
                .predecessor
                .and_then(|pred| keys.binary_search(&pred).ok());
            let view = if step.level >= 2 {
                compact_view(keys, stop)
            } else {
                neighborhood_view(keys, target)
            };
            writeln!(out, "{}", view)?;

            match step.predecessor {
                Some(pred) => writeln!(
                    out,
                    "moved {} step(s) forward, stopped at {} (next key >= {})",
                    step.advanced, pred, target
                )?,
                None => writeln!(out, "stayed at HEAD, the first key is already >= {}", target)?,
            }

            if keys.binary_search(&target).is_ok() {
                writeln!(out, "{} is linked on this level", target)?;
            }
            if step.level > 0 {
                writeln!(out, "down to level {}\n", step.level - 1)?;
            }
        }

        writeln!(out, "\n--- result ---")?;
        if trace.found {
            writeln!(out, "{} found (confirmed on level 0)", target)?;
        } else {
            writeln!(out, "{} not found", target)?;
        }
        writeln!(out, "linked on levels {:?}", self.appearances(target))?;
        writeln!(
            out,
            "horizontal moves: {}, vertical moves: {}",
            trace.horizontal_moves(),
            trace.vertical_moves()
        )?;
        Ok(())
    }

    /// Describe the layout, then explain every key read from `input`.
    pub fn run<R, W>(&self, input: R, out: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(out, "skip list over {}..={}", DEMO_MIN, DEMO_MAX)?;
        for level in (0..=DEMO_TOP_LEVEL).rev() {
            let step = LEVEL_STEPS[level];
            if step == 1 {
                writeln!(out, "  level {}: every key", level)?;
            } else {
                writeln!(out, "  level {}: multiples of {}", level, step)?;
            }
        }

        query_loop(input, out, DEMO_MIN, DEMO_MAX, |key, out| {
            let trace = self.list.trace(&key);
            self.write_trace(&trace, key, out)?;
            Ok(trace.found)
        })?;
        Ok(())
    }
}

/// Whole level when short, otherwise the ends plus the nodes around `mark`.
fn compact_view(keys: &[i64], mark: Option<usize>) -> String {
    let cell = |i: usize| {
        if Some(i) == mark {
            format!(">[{}]<", keys[i])
        } else {
            format!("[{}]", keys[i])
        }
    };

    let n = keys.len();
    if n <= COMPACT_LIMIT {
        return (0..n).map(cell).collect::<Vec<_>>().join(" ");
    }

    let mut parts: Vec<String> = (0..3).map(cell).collect();
    if let Some(i) = mark.filter(|&i| i >= 3 && i < n - 3) {
        let left = i.saturating_sub(1).max(3);
        let right = (i + 2).min(n - 3);
        parts.push("...".to_string());
        parts.extend((left..right).map(cell));
    }
    parts.push("...".to_string());
    parts.extend((n - 3..n).map(cell));
    parts.join(" ")
}

/// Up to `NEIGHBORHOOD_RADIUS` keys on each side of where `target` sorts.
fn neighborhood_view(keys: &[i64], target: i64) -> String {
    let at = keys.partition_point(|&key| key < target);
    let start = at.saturating_sub(NEIGHBORHOOD_RADIUS);
    let end = (at + NEIGHBORHOOD_RADIUS + 1).min(keys.len());

    keys[start..end]
        .iter()
        .map(|&key| {
            if key == target {
                format!(">[{}]<", key)
            } else {
                format!("[{}]", key)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_levels() {
        assert_eq!(demo_level(1), 0);
        assert_eq!(demo_level(15), 1);
        assert_eq!(demo_level(40), 2);
        assert_eq!(demo_level(300), 3);
        assert_eq!(demo_level(1000), 4);
    }

    #[test]
    fn test_compact_view_short_level() {
        assert_eq!(
            compact_view(&[200, 400, 600], Some(1)),
            "[200] >[400]< [600]"
        );
        assert_eq!(compact_view(&[200, 400], None), "[200] [400]");
    }

    #[test]
    fn test_compact_view_long_level() {
        let keys: Vec<i64> = (1..=50).map(|k| k * 20).collect();
        assert_eq!(
            compact_view(&keys, Some(10)),
            "[20] [40] [60] ... [200] >[220]< [240] ... [960] [980] [1000]"
        );
        assert_eq!(
            compact_view(&keys, None),
            "[20] [40] [60] ... [960] [980] [1000]"
        );
    }

    #[test]
    fn test_neighborhood_view_clips_at_edges() {
        let keys: Vec<i64> = (1..=30).collect();
        let view = neighborhood_view(&keys, 3);
        assert!(view.starts_with("[1] [2] >[3]<"));
        assert!(view.ends_with("[13]"));
    }
}
