//! Header location and per-row column-span resolution.
//!
//! This is the riskiest piece of tabular extraction, kept separate so it
//! can be tested on its own. A header occurrence pins one span per
//! column (the union of the fragment spans across stacked header rows).
//! Data-row values are then derived per row from that row's own
//! whitespace runs: with as many tokens as columns the assignment is
//! positional (which absorbs left/right justification drift entirely);
//! otherwise each token joins the not-yet-passed column it overlaps
//! best, so one long value cannot shift every column after it.

use regex::Regex;

/// Half-open character-column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Span {
    fn union(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Positive overlap size, or the negative gap distance when disjoint.
    fn score(self, other: Span) -> i64 {
        self.end.min(other.end) as i64 - self.start.max(other.start) as i64
    }
}

#[derive(Debug, Clone)]
struct Token {
    span: Span,
    text: String,
}

/// Whitespace-bounded token spans of one line, in character columns.
fn token_spans(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current: Option<(usize, String)> = None;
    let mut col = 0;
    for ch in line.chars() {
        if ch.is_whitespace() {
            if let Some((start, text)) = current.take() {
                tokens.push(Token {
                    span: Span { start, end: col },
                    text,
                });
            }
        } else {
            current.get_or_insert_with(|| (col, String::new())).1.push(ch);
        }
        col += 1;
    }
    if let Some((start, text)) = current {
        tokens.push(Token {
            span: Span { start, end: col },
            text,
        });
    }
    tokens
}

fn char_col(line: &str, byte_offset: usize) -> usize {
    line[..byte_offset].chars().count()
}

/// Finds each fragment of one header row left-to-right, returning their
/// spans, or `None` when the line is not this header row.
fn fragment_spans(line: &str, fragments: &[Regex]) -> Option<Vec<Span>> {
    let mut spans = Vec::with_capacity(fragments.len());
    let mut pos = 0;
    for fragment in fragments {
        let found = fragment.find_at(line, pos)?;
        spans.push(Span {
            start: char_col(line, found.start()),
            end: char_col(line, found.end()),
        });
        pos = found.end();
    }
    Some(spans)
}

/// Matches the stacked header rows starting at `lines[at]`. On success
/// returns the per-column spans, each the union of that column's
/// fragment spans across the stacked rows.
pub(crate) fn match_header_at(lines: &[&str], at: usize, rows: &[Vec<Regex>]) -> Option<Vec<Span>> {
    let mut columns = fragment_spans(lines.get(at)?, &rows[0])?;
    for (offset, row) in rows.iter().enumerate().skip(1) {
        let spans = fragment_spans(lines.get(at + offset)?, row)?;
        for (column, span) in columns.iter_mut().zip(spans) {
            *column = column.union(span);
        }
    }
    Some(columns)
}

/// Splits one data row into per-column cell text using the header spans,
/// re-deriving boundaries from this row's own whitespace runs.
pub(crate) fn assign_row(line: &str, spans: &[Span]) -> Vec<String> {
    let columns = spans.len();
    let tokens = token_spans(line);

    // One token per column: positional assignment, immune to
    // justification drift.
    if tokens.len() == columns {
        return tokens.into_iter().map(|t| t.text).collect();
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); columns];
    let mut column = 0;
    for token in tokens {
        let mut best = column;
        let mut best_score = i64::MIN;
        for (candidate, span) in spans.iter().enumerate().take(columns).skip(column) {
            let score = token.span.score(*span);
            if score > best_score {
                best_score = score;
                best = candidate;
            }
        }
        cells[best].push(token.text);
        column = best;
    }

    cells.into_iter().map(|parts| parts.join(" ")).collect()
}
