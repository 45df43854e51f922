//! Parse context and result cache.
//!
//! The original design this engine replaces kept its registry and its
//! latest-results dictionary as process globals. Here both live in an
//! explicit [`ParseContext`] constructed and shared by the caller —
//! typically one per test run — which preserves the isolation semantics
//! without global state. `&mut` threading makes the "registration
//! completes before concurrent extraction" precondition a compile-time
//! property rather than a convention.

use std::collections::HashMap;

use showparse_core::table::TableEntries;
use showparse_core::types::ExtractionRecord;

use crate::registry::PatternRegistry;

/// The latest extraction stored under one parse key.
///
/// Both engines overwrite the entry for their parse key on every call.
/// The raw output and the command that produced it are kept so a
/// repeated call with an unchanged key can skip re-executing the device
/// command.
#[derive(Debug, Clone)]
pub enum CachedParse {
    /// Result of a non-tabular parse.
    Attributes {
        /// Command that produced the output, when a device was used.
        command: Option<String>,
        /// The raw output text that was scanned.
        raw_output: String,
        /// Resolved tag→value pairs.
        record: ExtractionRecord,
    },
    /// Result of a tabular parse.
    Table {
        /// Command that produced the output, when a device was used.
        command: Option<String>,
        /// The raw output text that was scanned.
        raw_output: String,
        /// Extracted entries.
        entries: TableEntries,
    },
}

impl CachedParse {
    /// The command that produced the cached output, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            CachedParse::Attributes { command, .. } | CachedParse::Table { command, .. } => {
                command.as_deref()
            }
        }
    }

    /// The raw output the parse scanned.
    pub fn raw_output(&self) -> &str {
        match self {
            CachedParse::Attributes { raw_output, .. } | CachedParse::Table { raw_output, .. } => {
                raw_output
            }
        }
    }

    /// The non-tabular record, when this entry is one.
    pub fn record(&self) -> Option<&ExtractionRecord> {
        match self {
            CachedParse::Attributes { record, .. } => Some(record),
            CachedParse::Table { .. } => None,
        }
    }

    /// The tabular entries, when this entry is one.
    pub fn entries(&self) -> Option<&TableEntries> {
        match self {
            CachedParse::Table { entries, .. } => Some(entries),
            CachedParse::Attributes { .. } => None,
        }
    }
}

/// Mapping from caller-chosen parse keys to the latest extraction.
#[derive(Debug, Clone, Default)]
pub struct ResultCache {
    entries: HashMap<String, CachedParse>,
}

impl ResultCache {
    /// The cached parse for a key.
    pub fn get(&self, parse_key: &str) -> Option<&CachedParse> {
        self.entries.get(parse_key)
    }

    /// Stores a parse, replacing any previous entry for the key.
    pub fn insert(&mut self, parse_key: impl Into<String>, parse: CachedParse) {
        self.entries.insert(parse_key.into(), parse);
    }

    /// Removes a key's entry.
    pub fn remove(&mut self, parse_key: &str) -> Option<CachedParse> {
        self.entries.remove(parse_key)
    }

    /// The cached raw output for a key, provided it was produced by the
    /// same command.
    pub fn cached_output(&self, parse_key: &str, command: &str) -> Option<&str> {
        let entry = self.entries.get(parse_key)?;
        (entry.command() == Some(command)).then(|| entry.raw_output())
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears the cache (test isolation).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Registry plus result cache, passed by handle to every extraction.
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    /// The pattern registry consulted by non-tabular extraction.
    pub registry: PatternRegistry,
    /// The latest extraction per parse key.
    pub cache: ResultCache,
}

impl ParseContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context around an already-populated registry.
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            registry,
            cache: ResultCache::default(),
        }
    }

    /// Clears both registry and cache (test isolation).
    pub fn reset(&mut self) {
        self.registry.clear();
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_overwrites_per_key() {
        let mut cache = ResultCache::default();
        let mut record = ExtractionRecord::default();
        record.insert("a.b", "1");
        cache.insert(
            "router1",
            CachedParse::Attributes {
                command: Some("show a".to_string()),
                raw_output: "first".to_string(),
                record,
            },
        );

        let mut record = ExtractionRecord::default();
        record.insert("a.b", "2");
        cache.insert(
            "router1",
            CachedParse::Attributes {
                command: Some("show b".to_string()),
                raw_output: "second".to_string(),
                record,
            },
        );

        assert_eq!(cache.len(), 1);
        let entry = cache.get("router1").unwrap();
        assert_eq!(entry.record().unwrap().get("a.b"), Some("2"));
    }

    #[test]
    fn test_cached_output_requires_same_command() {
        let mut cache = ResultCache::default();
        cache.insert(
            "router1",
            CachedParse::Attributes {
                command: Some("show version".to_string()),
                raw_output: "out".to_string(),
                record: ExtractionRecord::default(),
            },
        );
        assert_eq!(cache.cached_output("router1", "show version"), Some("out"));
        assert_eq!(cache.cached_output("router1", "show clock"), None);
        assert_eq!(cache.cached_output("router2", "show version"), None);
    }

    #[test]
    fn test_distinct_keys_are_disjoint() {
        let mut cache = ResultCache::default();
        for key in ["r1", "r2"] {
            cache.insert(
                key,
                CachedParse::Table {
                    command: None,
                    raw_output: String::new(),
                    entries: TableEntries::default(),
                },
            );
        }
        assert_eq!(cache.len(), 2);
        cache.remove("r1");
        assert!(cache.get("r1").is_none());
        assert!(cache.get("r2").is_some());
    }
}
