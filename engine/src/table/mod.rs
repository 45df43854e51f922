//! Tabular extraction: header-aligned row records from show output.
//!
//! Given a [`TableSpec`], the engine locates the stacked header lines,
//! pins one span per column, and walks the data rows that follow. Row
//! values come from an explicit delimiter when the spec declares one,
//! otherwise from per-row alignment inference (see [`columns`]). Each
//! row is cleaned per column and filed under the table title (when the
//! spec declares a title pattern) and then under the index value(s),
//! preserving first-seen order.
//!
//! A terminal pattern or a new title closes the current sub-table;
//! scanning continues, since one command's output may carry several
//! titled tables under the same header layout. Output with no matching
//! header yields empty entries, not an error.
//!
//! The tabular engine never consults the pattern registry; everything it
//! needs is in the spec.

mod columns;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use showparse_core::table::{RowRecord, TableEntries, TableSpec, TableSpecError};

use crate::context::{CachedParse, ParseContext};
use crate::device::{Device, DeviceError};

use self::columns::Span;

/// Errors from a tabular extraction call.
#[derive(Debug, Error)]
pub enum TableError {
    /// The spec violates a structural invariant.
    #[error(transparent)]
    Spec(#[from] TableSpecError),
    /// A header fragment failed to compile.
    #[error("header fragment `{fragment}` failed to compile: {source}")]
    BadFragment {
        fragment: String,
        #[source]
        source: regex::Error,
    },
    /// A title or terminal pattern failed to compile.
    #[error("table pattern `{pattern}` failed to compile: {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// The injected device failed to execute the command.
    #[error("device execution failed for `{command}`: {error}")]
    Device {
        command: String,
        error: DeviceError,
    },
}

/// A tabular extraction request.
///
/// # Examples
///
/// ```
/// use showparse_core::table::TableSpec;
/// use showparse_engine::context::ParseContext;
/// use showparse_engine::table::TableRequest;
///
/// let output = "\
/// Neighbor        AS MsgRcvd
/// 50.1.0.2       100      63
/// ";
/// let spec = TableSpec::new(["Neighbor", "AS", "MsgRcvd"]).with_index(&[0, 1]);
/// let mut ctx = ParseContext::new();
/// let entries = TableRequest::new("router1")
///     .run_on_text(&mut ctx, &spec, output)
///     .unwrap();
///
/// let row = entries.row(&["50.1.0.2", "100"]).unwrap();
/// assert_eq!(row.get("msg_rcvd").map(String::as_str), Some("63"));
/// ```
#[derive(Debug, Clone)]
pub struct TableRequest {
    parse_key: String,
    refresh: bool,
}

struct CompiledSpec {
    header_rows: Vec<Vec<Regex>>,
    title: Option<Regex>,
    terminal: Option<Regex>,
}

impl TableRequest {
    /// Creates a request cached under `parse_key`.
    pub fn new(parse_key: impl Into<String>) -> Self {
        Self {
            parse_key: parse_key.into(),
            refresh: false,
        }
    }

    /// Forces device re-execution even when the cache holds output for
    /// an unchanged parse key and command.
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Runs against directly supplied text, bypassing device interaction.
    pub fn run_on_text(
        self,
        ctx: &mut ParseContext,
        spec: &TableSpec,
        text: &str,
    ) -> Result<TableEntries, TableError> {
        let entries = extract(spec, text)?;
        ctx.cache.insert(
            self.parse_key,
            CachedParse::Table {
                command: None,
                raw_output: text.to_string(),
                entries: entries.clone(),
            },
        );
        Ok(entries)
    }

    /// Obtains output by executing `command` on the device (or from the
    /// cache, for an unchanged parse key and command without `refresh`)
    /// and runs the extraction.
    pub fn run(
        self,
        ctx: &mut ParseContext,
        spec: &TableSpec,
        device: &mut dyn Device,
        command: &str,
    ) -> Result<TableEntries, TableError> {
        let cached = if self.refresh {
            None
        } else {
            ctx.cache
                .cached_output(&self.parse_key, command)
                .map(str::to_string)
        };
        let text = match cached {
            Some(text) => {
                debug!(parse_key = %self.parse_key, command, "reusing cached output");
                text
            }
            None => device
                .execute(command)
                .map_err(|error| TableError::Device {
                    command: command.to_string(),
                    error,
                })?,
        };

        let entries = extract(spec, &text)?;
        ctx.cache.insert(
            self.parse_key,
            CachedParse::Table {
                command: Some(command.to_string()),
                raw_output: text,
                entries: entries.clone(),
            },
        );
        Ok(entries)
    }
}

fn compile_spec(spec: &TableSpec) -> Result<CompiledSpec, TableError> {
    let header_rows = spec
        .header_rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|fragment| {
                    Regex::new(fragment).map_err(|source| TableError::BadFragment {
                        fragment: fragment.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let compile_pattern = |pattern: &str| {
        Regex::new(pattern).map_err(|source| TableError::BadPattern {
            pattern: pattern.to_string(),
            source,
        })
    };
    let title = spec.title_pattern().map(compile_pattern).transpose()?;
    let terminal = spec.terminal_pattern().map(compile_pattern).transpose()?;

    Ok(CompiledSpec {
        header_rows,
        title,
        terminal,
    })
}

/// Runs the extraction over `text` per `spec`.
fn extract(spec: &TableSpec, text: &str) -> Result<TableEntries, TableError> {
    spec.validate()?;
    let compiled = compile_spec(spec)?;
    let labels = spec.labels();
    let column_count = spec.column_count();

    let lines: Vec<&str> = text.lines().collect();
    let mut entries = TableEntries::default();
    let mut title: Option<String> = None;
    let mut header: Option<Vec<Span>> = None;
    let mut rows_filed = 0usize;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if let Some(terminal) = &compiled.terminal {
            if terminal.is_match(line) {
                header = None;
                title = None;
                i += 1;
                continue;
            }
        }
        if let Some(title_re) = &compiled.title {
            if let Some(caps) = title_re.captures(line) {
                let matched = caps
                    .get(1)
                    .or_else(|| caps.get(0))
                    .expect("group 0 always participates");
                title = Some(matched.as_str().trim().to_string());
                header = None;
                i += 1;
                continue;
            }
        }

        // A header occurrence (re)derives the column spans. When one is
        // already active this also absorbs repeated headers in paginated
        // output.
        if let Some(spans) = columns::match_header_at(&lines, i, &compiled.header_rows) {
            debug!(line = i, columns = spans.len(), "located table header");
            header = Some(spans);
            i += compiled.header_rows.len();
            continue;
        }

        let Some(spans) = &header else {
            i += 1;
            continue;
        };
        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        let cells = match spec.delimiter() {
            Some(delimiter) => split_delimited(line, delimiter, column_count),
            None => columns::assign_row(line, spans),
        };
        if cells.iter().all(|cell| cell.trim().is_empty()) {
            i += 1;
            continue;
        }

        let cleaned: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(column, raw)| match spec.cleaner(column) {
                Some(cleaner) => cleaner.as_ref()(raw),
                None => raw.trim().to_string(),
            })
            .collect();

        // Rows whose index cells are empty are continuation noise, not
        // records.
        let index_values: Vec<String> = spec
            .index()
            .iter()
            .map(|&column| cleaned[column].clone())
            .collect();
        if index_values.iter().any(String::is_empty) {
            i += 1;
            continue;
        }

        let mut row = RowRecord::new();
        for (label, value) in labels.iter().zip(&cleaned) {
            row.insert(label.clone(), value.clone());
        }

        let mut path: Vec<String> = Vec::with_capacity(3);
        if let Some(title) = &title {
            path.push(title.clone());
        }
        path.extend(index_values);
        entries.insert_row(&path, row);
        rows_filed += 1;
        i += 1;
    }

    debug!(rows = rows_filed, "tabular extraction complete");
    Ok(entries)
}

/// Splits a delimited row into exactly `columns` cells, padding short
/// rows with empty cells.
fn split_delimited(line: &str, delimiter: &str, columns: usize) -> Vec<String> {
    let mut cells: Vec<String> = line
        .splitn(columns, delimiter)
        .map(str::to_string)
        .collect();
    cells.resize(columns, String::new());
    cells
}
