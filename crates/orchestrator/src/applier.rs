//! Composition of line-range edits into new file content.
//!
//! Content is treated as a sequence of lines separated by `\n`, so a trailing
//! newline shows up as a final empty line and is preserved by the join.
//! Every range is expressed against the original content; edits are applied
//! back to front so no edit shifts the lines another one refers to.

use thiserror::Error;
use updater_core::Modification;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("modification #{index}: line numbers are 1-based, got start line {start_line}")]
    ZeroStart { index: usize, start_line: usize },

    #[error("modification #{index}: end line {end_line} is before start line {start_line}")]
    InvalidRange {
        index: usize,
        start_line: usize,
        end_line: usize,
    },

    #[error(
        "modification #{index}: range [{start_line}, {end_line}) is outside a file of {line_count} lines"
    )]
    OutOfBounds {
        index: usize,
        start_line: usize,
        end_line: usize,
        line_count: usize,
    },

    #[error("modifications #{first} and #{second} overlap")]
    Overlap { first: usize, second: usize },
}

/// Check the shape of a modification set without looking at any file.
///
/// Returns the input indices ordered by `(start_line, end_line)`. Insertions
/// sharing a line keep their input order.
pub fn validate_ranges(modifications: &[Modification]) -> Result<Vec<usize>, ApplyError> {
    for (index, m) in modifications.iter().enumerate() {
        if m.start_line == 0 {
            return Err(ApplyError::ZeroStart {
                index,
                start_line: m.start_line,
            });
        }
        if m.end_line < m.start_line {
            return Err(ApplyError::InvalidRange {
                index,
                start_line: m.start_line,
                end_line: m.end_line,
            });
        }
    }

    let mut order: Vec<usize> = (0..modifications.len()).collect();
    order.sort_by_key(|&i| (modifications[i].start_line, modifications[i].end_line));

    for pair in order.windows(2) {
        let (prev, cur) = (&modifications[pair[0]], &modifications[pair[1]]);
        if cur.start_line < prev.end_line {
            return Err(ApplyError::Overlap {
                first: pair[0].min(pair[1]),
                second: pair[0].max(pair[1]),
            });
        }
    }

    Ok(order)
}

/// Full validation against a file of `line_count` lines.
///
/// Out-of-range ends are rejected rather than clamped.
pub fn validate_modifications(
    modifications: &[Modification],
    line_count: usize,
) -> Result<Vec<usize>, ApplyError> {
    let order = validate_ranges(modifications)?;

    for (index, m) in modifications.iter().enumerate() {
        if m.end_line > line_count + 1 {
            return Err(ApplyError::OutOfBounds {
                index,
                start_line: m.start_line,
                end_line: m.end_line,
                line_count,
            });
        }
    }

    Ok(order)
}

/// Apply `modifications` to `content`.
///
/// Nothing is applied unless the whole set validates. An empty replacement
/// text removes the range without inserting a line.
pub fn apply_modifications(
    content: &[u8],
    modifications: &[Modification],
) -> Result<Vec<u8>, ApplyError> {
    if modifications.is_empty() {
        return Ok(content.to_vec());
    }

    let mut lines: Vec<&[u8]> = split_lines(content);
    let order = validate_modifications(modifications, lines.len())?;

    for &index in order.iter().rev() {
        let m = &modifications[index];
        let replacement = if m.new_content.is_empty() {
            Vec::new()
        } else {
            split_lines(m.new_content.as_bytes())
        };
        lines.splice(m.start_line - 1..m.end_line - 1, replacement);
    }

    Ok(lines.join(&b'\n'))
}

fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    content.split(|b| *b == b'\n').collect()
}

/// Number of lines `apply_modifications` sees in `content`.
pub fn line_count(content: &[u8]) -> usize {
    content.iter().filter(|b| **b == b'\n').count() + 1
}
