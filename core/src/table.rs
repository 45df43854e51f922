//! Table specifications and extracted table entries.
//!
//! A [`TableSpec`] declares how a tabular section of show-command output
//! is shaped: one or more stacked header rows of per-column regex
//! fragments, optional column labels, a one- or two-column index, a
//! delimiter policy, and optional title/terminal patterns segmenting the
//! output into named sub-tables. Per-column cleanup hooks are registered
//! at declaration time.
//!
//! Extraction produces [`TableEntries`]: rows filed under the table title
//! (when titled) and then under the index value(s), preserving first-seen
//! order at every level.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

/// Structural errors in a table specification.
///
/// These are declaration errors: fatal, synchronous, and raised before
/// any of the output text is scanned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableSpecError {
    /// The header definition has no columns.
    #[error("header definition must contain at least one column")]
    EmptyHeader,
    /// Stacked header rows disagree on column count.
    #[error("stacked header rows must have equal column counts (row 0 has {expected}, row {row} has {found})")]
    UnevenHeaderRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The index must name one or two columns.
    #[error("table index must reference 1 or 2 columns, got {0}")]
    InvalidIndexArity(usize),
    /// An index column is outside the header's column range.
    #[error("index column {column} out of range for {columns} columns")]
    IndexOutOfRange { column: usize, columns: usize },
    /// Explicit labels disagree with the column count.
    #[error("label count {labels} does not match column count {columns}")]
    LabelCountMismatch { labels: usize, columns: usize },
}

/// Per-column cleanup/conversion hook applied to each raw cell value.
pub type ColumnCleaner = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The default cleaner: trims surrounding whitespace.
pub fn trim_cleaner() -> ColumnCleaner {
    Arc::new(|raw| raw.trim().to_string())
}

/// Cleaner converting hex cells (with or without `0x`) to decimal text.
/// Non-hex cells fall back to a plain trim.
pub fn hex_to_decimal_cleaner() -> ColumnCleaner {
    Arc::new(|raw| {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        match u64::from_str_radix(digits, 16) {
            Ok(n) => n.to_string(),
            Err(_) => trimmed.to_string(),
        }
    })
}

/// Cleaner trimming whitespace and then stripping trailing marker
/// characters (e.g. the `*` and `>` annotations some tables append).
pub fn strip_trailing_cleaner(markers: &str) -> ColumnCleaner {
    let markers: Vec<char> = markers.chars().collect();
    Arc::new(move |raw| raw.trim().trim_end_matches(markers.as_slice()).to_string())
}

/// Declaration of one tabular section.
///
/// # Examples
///
/// ```
/// use showparse_core::table::TableSpec;
///
/// let spec = TableSpec::new(["Neighbor", "AS", "MsgRcvd"]).with_index(&[0, 1]);
/// spec.validate().unwrap();
/// assert_eq!(spec.labels(), ["neighbor", "as", "msg_rcvd"]);
/// ```
#[derive(Clone)]
pub struct TableSpec {
    header_rows: Vec<Vec<String>>,
    labels: Option<Vec<String>>,
    index: Vec<usize>,
    delimiter: Option<String>,
    title_pattern: Option<String>,
    terminal_pattern: Option<String>,
    cleaners: BTreeMap<usize, ColumnCleaner>,
}

impl fmt::Debug for TableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSpec")
            .field("header_rows", &self.header_rows)
            .field("labels", &self.labels)
            .field("index", &self.index)
            .field("delimiter", &self.delimiter)
            .field("title_pattern", &self.title_pattern)
            .field("terminal_pattern", &self.terminal_pattern)
            .field("cleaners", &self.cleaners.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl TableSpec {
    /// Declares a table with a single header row.
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::stacked(vec![header.into_iter().map(Into::into).collect()])
    }

    /// Declares a table with stacked header rows.
    pub fn stacked(header_rows: Vec<Vec<String>>) -> Self {
        Self {
            header_rows,
            labels: None,
            index: vec![0],
            delimiter: None,
            title_pattern: None,
            terminal_pattern: None,
            cleaners: BTreeMap::new(),
        }
    }

    /// Overrides the derived column labels.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the index columns (one or two). Defaults to column 0.
    pub fn with_index(mut self, index: &[usize]) -> Self {
        self.index = index.to_vec();
        self
    }

    /// Splits rows on an explicit delimiter instead of inferring column
    /// boundaries from header alignment.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    /// Pattern opening a new named sub-table; the title is capture group 1
    /// (or the whole match without a group).
    pub fn with_title_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.title_pattern = Some(pattern.into());
        self
    }

    /// Pattern closing the current sub-table.
    pub fn with_terminal_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.terminal_pattern = Some(pattern.into());
        self
    }

    /// Registers a cleanup/conversion hook for a column.
    pub fn with_cleaner(mut self, column: usize, cleaner: ColumnCleaner) -> Self {
        self.cleaners.insert(column, cleaner);
        self
    }

    /// Validates structural invariants: non-empty equal-width header rows,
    /// index arity and range, label count.
    pub fn validate(&self) -> Result<(), TableSpecError> {
        let expected = self
            .header_rows
            .first()
            .map(Vec::len)
            .filter(|n| *n > 0)
            .ok_or(TableSpecError::EmptyHeader)?;
        for (row, fragments) in self.header_rows.iter().enumerate().skip(1) {
            if fragments.len() != expected {
                return Err(TableSpecError::UnevenHeaderRows {
                    row,
                    expected,
                    found: fragments.len(),
                });
            }
        }
        if self.index.is_empty() || self.index.len() > 2 {
            return Err(TableSpecError::InvalidIndexArity(self.index.len()));
        }
        for &column in &self.index {
            if column >= expected {
                return Err(TableSpecError::IndexOutOfRange {
                    column,
                    columns: expected,
                });
            }
        }
        if let Some(labels) = &self.labels {
            if labels.len() != expected {
                return Err(TableSpecError::LabelCountMismatch {
                    labels: labels.len(),
                    columns: expected,
                });
            }
        }
        Ok(())
    }

    /// Number of columns declared by the first header row.
    pub fn column_count(&self) -> usize {
        self.header_rows.first().map_or(0, Vec::len)
    }

    /// The stacked header rows.
    pub fn header_rows(&self) -> &[Vec<String>] {
        &self.header_rows
    }

    /// The index columns.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// The explicit delimiter, if any.
    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref()
    }

    /// The sub-table title pattern, if any.
    pub fn title_pattern(&self) -> Option<&str> {
        self.title_pattern.as_deref()
    }

    /// The sub-table terminal pattern, if any.
    pub fn terminal_pattern(&self) -> Option<&str> {
        self.terminal_pattern.as_deref()
    }

    /// The cleaner registered for a column, if any.
    pub fn cleaner(&self, column: usize) -> Option<&ColumnCleaner> {
        self.cleaners.get(&column)
    }

    /// Effective column labels: the explicit labels when set, otherwise
    /// labels derived from the header fragments (stacked fragments joined,
    /// lower-cased, camel humps and separators turned into `_`).
    pub fn labels(&self) -> Vec<String> {
        if let Some(labels) = &self.labels {
            return labels.clone();
        }
        (0..self.column_count())
            .map(|col| {
                let stacked: Vec<&str> = self
                    .header_rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(String::as_str)
                    .collect();
                derive_label(&stacked)
            })
            .collect()
    }
}

/// Derives a column label from its stacked header fragments.
///
/// Fragments are joined with a space, regex escapes dropped, then
/// normalized: camel humps and non-alphanumeric separators become `_`,
/// everything lower-cased. `"MsgRcvd"` → `"msg_rcvd"`, `"St/PfxRcd"` →
/// `"st_pfx_rcd"`.
pub fn derive_label(fragments: &[&str]) -> String {
    let joined = fragments.join(" ").replace('\\', "");
    let chars: Vec<char> = joined.chars().collect();
    let mut out = String::with_capacity(joined.len());
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_alphanumeric() {
            let hump = ch.is_uppercase()
                && i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_numeric()
                    || (chars[i - 1].is_uppercase()
                        && chars.get(i + 1).is_some_and(|c| c.is_lowercase())));
            if hump && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

/// A map preserving first-seen key order.
///
/// Re-inserting an existing key replaces the value but keeps the key's
/// original position. Serializes as a map in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a key.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Inserts or replaces; first-seen position is kept on replacement.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(slot) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value for `key`, inserting `default()` first if absent.
    pub fn get_or_insert_with(&mut self, key: &str, default: impl FnOnce() -> V) -> &mut V {
        if let Some(pos) = self.entries.iter().position(|(k, _)| k == key) {
            return &mut self.entries[pos].1;
        }
        self.entries.push((key.to_string(), default()));
        &mut self.entries.last_mut().expect("just pushed").1
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One extracted row: label → cleaned value, in column order.
pub type RowRecord = OrderedMap<String>;

/// A node in the extracted entries tree: either a row, or a group keyed
/// by title or index values.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum TableNode {
    /// A leaf row.
    Row(RowRecord),
    /// An intermediate grouping level.
    Group(OrderedMap<TableNode>),
}

impl TableNode {
    /// The row at this node, if it is a leaf.
    pub fn as_row(&self) -> Option<&RowRecord> {
        match self {
            TableNode::Row(row) => Some(row),
            TableNode::Group(_) => None,
        }
    }

    /// The group at this node, if it is one.
    pub fn as_group(&self) -> Option<&OrderedMap<TableNode>> {
        match self {
            TableNode::Group(group) => Some(group),
            TableNode::Row(_) => None,
        }
    }
}

/// The extracted entries of one tabular parse.
///
/// Rows are filed under the table title (for titled tables) and then
/// under the index value(s). A single-column index with no titles yields
/// a flat key → row mapping with no extra nesting.
///
/// # Examples
///
/// ```
/// use showparse_core::table::{RowRecord, TableEntries};
///
/// let mut entries = TableEntries::default();
/// let mut row = RowRecord::new();
/// row.insert("neighbor", "50.1.0.2".to_string());
/// row.insert("as", "100".to_string());
/// entries.insert_row(&["50.1.0.2".to_string(), "100".to_string()], row);
///
/// let row = entries.row(&["50.1.0.2", "100"]).unwrap();
/// assert_eq!(row.get("as").map(String::as_str), Some("100"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct TableEntries {
    root: OrderedMap<TableNode>,
}

impl TableEntries {
    /// Returns `true` when no rows were extracted.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Number of top-level keys (titles, or index values when untitled).
    pub fn len(&self) -> usize {
        self.root.len()
    }

    /// Top-level keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.root.keys()
    }

    /// The node at a key path.
    pub fn get(&self, path: &[&str]) -> Option<&TableNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.root.get(first)?;
        for key in rest {
            node = node.as_group()?.get(key)?;
        }
        Some(node)
    }

    /// The row at a key path, if the path leads to a leaf.
    pub fn row(&self, path: &[&str]) -> Option<&RowRecord> {
        self.get(path)?.as_row()
    }

    /// Files a row under a key path, creating grouping levels as needed.
    /// A duplicate path keeps its first-seen position and replaces the
    /// row payload.
    pub fn insert_row(&mut self, path: &[String], row: RowRecord) {
        let Some((last, groups)) = path.split_last() else {
            return;
        };
        let mut node = &mut self.root;
        for key in groups {
            let next = node.get_or_insert_with(key, || TableNode::Group(OrderedMap::new()));
            if !matches!(next, TableNode::Group(_)) {
                *next = TableNode::Group(OrderedMap::new());
            }
            let TableNode::Group(group) = next else {
                unreachable!("group ensured above");
            };
            node = group;
        }
        node.insert(last.clone(), TableNode::Row(row));
    }

    /// Renders the entries as pretty JSON (insertion order preserved).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
