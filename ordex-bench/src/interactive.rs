//! Line-oriented query loop shared by the interactive driver and the
//! explain driver.
//!
//! Each line is one query: `exit` / `quit` (any case) ends the session, an
//! integer inside the populated range is handed to the caller, anything else
//! is reported and the loop keeps reading.

use std::io::{self, BufRead, Write};
use std::time::Instant;

use log::debug;
use ordex_core::OrderedIndex;

use crate::error::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Exit,
    Key(i64),
}

/// Parse one line of input against the populated range `min..=max`.
pub fn parse_query(line: &str, min: i64, max: i64) -> Result<Query, InputError> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Ok(Query::Exit);
    }

    let value: i64 = line
        .parse()
        .map_err(|_| InputError::NotAnInteger(line.to_string()))?;

    if !(min..=max).contains(&value) {
        return Err(InputError::OutOfRange { value, min, max });
    }
    Ok(Query::Key(value))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub queries: usize,
    pub hits: usize,
    pub rejected: usize,
}

/// Read queries from `input` until `exit`, `quit` or end of input, calling
/// `on_key` for every accepted key.
///
/// `on_key` returns whether the key was found.
///
pub fn query_loop<R, W, F>(
    input: R,
    output: &mut W,
    min: i64,
    max: i64,
    mut on_key: F,
) -> io::Result<SessionSummary>
where
    R: BufRead,
    W: Write,
    F: FnMut(i64, &mut W) -> io::Result<bool>,
{
    let mut summary = SessionSummary::default();
    let mut lines = input.lines();

    loop {
        write!(output, "\nkey to search ({}..={}) or 'exit': ", min, max)?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line?;

        match parse_query(&line, min, max) {
            Ok(Query::Exit) => break,
            Ok(Query::Key(key)) => {
                summary.queries += 1;
                if on_key(key, output)? {
                    summary.hits += 1;
                }
            }
            Err(e) => {
                debug!("rejected input {:?}: {}", line, e);
                summary.rejected += 1;
                writeln!(output, "{}", e)?;
            }
        }
    }

    writeln!(output, "leaving session")?;
    Ok(summary)
}

/// Answer membership queries for keys `1..=max` against a built index,
/// timing every search.
pub fn run_session<I, R, W>(
    index: &I,
    max: i64,
    input: R,
    output: &mut W,
) -> io::Result<SessionSummary>
where
    I: OrderedIndex<i64>,
    R: BufRead,
    W: Write,
{
    query_loop(input, output, 1, max, |key, output| {
        let start = Instant::now();
        let found = index.search(&key);
        let elapsed = start.elapsed();

        writeln!(output, "found: {}", found)?;
        writeln!(
            output,
            "search time: {:.9}s ({:.1}µs)",
            elapsed.as_secs_f64(),
            elapsed.as_secs_f64() * 1e6
        )?;
        Ok(found)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exit_words() {
        for word in ["exit", "quit", "  EXIT ", "Quit\n"] {
            assert_eq!(parse_query(word, 1, 10), Ok(Query::Exit));
        }
    }

    #[test]
    fn test_parse_rejects_non_integers() {
        assert_eq!(
            parse_query(" 4.5 ", 1, 10),
            Err(InputError::NotAnInteger("4.5".to_string()))
        );
        assert!(matches!(parse_query("", 1, 10), Err(InputError::NotAnInteger(_))));
    }

    #[test]
    fn test_parse_range_bounds() {
        assert_eq!(parse_query("1", 1, 10), Ok(Query::Key(1)));
        assert_eq!(parse_query("10", 1, 10), Ok(Query::Key(10)));
        assert_eq!(
            parse_query("0", 1, 10),
            Err(InputError::OutOfRange {
                value: 0,
                min: 1,
                max: 10
            })
        );
        assert!(parse_query("-3", 1, 10).is_err());
    }
}
