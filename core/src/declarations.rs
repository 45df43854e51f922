//! Generated pattern and show-command declarations.
//!
//! The markup compiler produces a [`Declarations`] value: a show-command
//! map (OS → key → template string) and a regex map (OS → tag → pattern,
//! or an ordered pattern list when a tag is declared more than once for
//! multi-release support), plus a per-OS tag manifest in first-appearance
//! order. Declarations round-trip through YAML, which is the declarative
//! text format fed to a pattern registry's extend operation.
//!
//! Declarations compiled without an OS live in the single no-OS namespace
//! ([`NO_OS`]); a document holding only that namespace serializes without
//! the OS nesting level.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace key used for declarations compiled without an `OS:` header.
pub const NO_OS: &str = "";

/// Errors from reading or writing declarative text.
#[derive(Debug, Error)]
pub enum DeclarationsError {
    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// One or more candidate patterns for a tag, tried in declaration order.
///
/// A tag declared once holds a single pattern; re-declaring the same tag
/// appends further candidates (typically a strict pattern followed by a
/// looser one covering older releases).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternEntry {
    /// A single candidate pattern.
    One(String),
    /// An ordered list of candidate patterns.
    Many(Vec<String>),
}

impl PatternEntry {
    /// The candidate patterns in declaration order.
    pub fn patterns(&self) -> &[String] {
        match self {
            PatternEntry::One(p) => std::slice::from_ref(p),
            PatternEntry::Many(ps) => ps,
        }
    }

    /// Returns `true` if `raw` is already a candidate.
    pub fn contains(&self, raw: &str) -> bool {
        self.patterns().iter().any(|p| p == raw)
    }

    /// Appends an additional candidate pattern.
    pub fn push(&mut self, pattern: String) {
        match self {
            PatternEntry::One(first) => {
                *self = PatternEntry::Many(vec![std::mem::take(first), pattern]);
            }
            PatternEntry::Many(ps) => ps.push(pattern),
        }
    }
}

/// OS → command key → show-command template string.
pub type CommandMap = BTreeMap<String, BTreeMap<String, String>>;

/// OS → tag → candidate pattern(s).
pub type RegexMap = BTreeMap<String, BTreeMap<String, PatternEntry>>;

/// OS → tags in first-appearance order.
pub type TagOrder = BTreeMap<String, Vec<String>>;

/// Generated declarative output of the markup compiler.
///
/// # Examples
///
/// ```
/// use showparse_core::declarations::Declarations;
///
/// let mut decls = Declarations::default();
/// decls.add_command(Some("iosxr"), "show_bgp_summary", "show bgp summary");
/// decls.add_pattern(Some("iosxr"), "bgp.router-id", r"Router ID: (\S+)");
/// decls.add_pattern(Some("iosxr"), "bgp.router-id", r"BGP Router identifier (\S+)");
///
/// let yaml = decls.to_yaml().unwrap();
/// let parsed = Declarations::from_yaml(&yaml).unwrap();
/// assert_eq!(parsed, decls);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declarations {
    /// Show-command templates per OS namespace.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub show_commands: CommandMap,
    /// Tag patterns per OS namespace.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub regex: RegexMap,
    /// Tag manifest per OS namespace, first-appearance order.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tag_order: TagOrder,
}

/// Declarations without the OS nesting level (no-OS mode documents).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FlatDeclarations {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    show_commands: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    regex: BTreeMap<String, PatternEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tag_order: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DeclarationsDoc {
    Nested(Declarations),
    Flat(FlatDeclarations),
}

impl Declarations {
    /// Returns `true` when nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.show_commands.is_empty() && self.regex.is_empty()
    }

    /// All namespaces appearing in either map.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .show_commands
            .keys()
            .chain(self.regex.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Registers a show-command template, replacing any previous entry for
    /// the same key.
    pub fn add_command(
        &mut self,
        os: Option<&str>,
        key: impl Into<String>,
        template: impl Into<String>,
    ) {
        self.show_commands
            .entry(os.unwrap_or(NO_OS).to_string())
            .or_default()
            .insert(key.into(), template.into());
    }

    /// Registers a tag pattern. A tag seen for the first time records its
    /// manifest position; re-declaring a tag appends an additional
    /// candidate unless the exact pattern is already present.
    pub fn add_pattern(&mut self, os: Option<&str>, tag: &str, pattern: impl Into<String>) {
        let os = os.unwrap_or(NO_OS);
        let pattern = pattern.into();
        let tags = self.regex.entry(os.to_string()).or_default();
        match tags.get_mut(tag) {
            Some(entry) => {
                if !entry.contains(&pattern) {
                    entry.push(pattern);
                }
            }
            None => {
                tags.insert(tag.to_string(), PatternEntry::One(pattern));
                self.tag_order
                    .entry(os.to_string())
                    .or_default()
                    .push(tag.to_string());
            }
        }
    }

    /// Merges another set of declarations into this one: commands replace
    /// by key, patterns append by tag, manifests extend with unseen tags.
    pub fn merge(&mut self, other: &Declarations) {
        for (os, commands) in &other.show_commands {
            for (key, template) in commands {
                self.add_command(Some(os.as_str()), key.clone(), template.clone());
            }
        }
        for (os, tags) in &other.regex {
            for (tag, entry) in tags {
                for pattern in entry.patterns() {
                    self.add_pattern(Some(os.as_str()), tag, pattern.clone());
                }
            }
        }
    }

    /// Candidate patterns for a tag, if declared.
    pub fn patterns(&self, os: Option<&str>, tag: &str) -> Option<&PatternEntry> {
        self.regex.get(os.unwrap_or(NO_OS))?.get(tag)
    }

    /// Tag manifest for a namespace, first-appearance order.
    pub fn tags(&self, os: Option<&str>) -> &[String] {
        self.tag_order
            .get(os.unwrap_or(NO_OS))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Serializes to declarative YAML text. A document holding only the
    /// no-OS namespace is rendered flat, without the OS nesting level.
    pub fn to_yaml(&self) -> Result<String, DeclarationsError> {
        if self.namespaces() == [NO_OS] {
            let flat = FlatDeclarations {
                show_commands: self.show_commands.get(NO_OS).cloned().unwrap_or_default(),
                regex: self.regex.get(NO_OS).cloned().unwrap_or_default(),
                tag_order: self.tag_order.get(NO_OS).cloned().unwrap_or_default(),
            };
            return Ok(serde_yaml::to_string(&flat)?);
        }
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parses declarative YAML text, accepting both the namespaced and the
    /// flat no-OS renderings.
    pub fn from_yaml(text: &str) -> Result<Self, DeclarationsError> {
        match serde_yaml::from_str::<DeclarationsDoc>(text)? {
            DeclarationsDoc::Nested(decls) => Ok(decls),
            DeclarationsDoc::Flat(flat) => {
                let mut decls = Declarations::default();
                if !flat.show_commands.is_empty() {
                    decls.show_commands.insert(NO_OS.to_string(), flat.show_commands);
                }
                if !flat.regex.is_empty() {
                    decls.regex.insert(NO_OS.to_string(), flat.regex);
                }
                if !flat.tag_order.is_empty() {
                    decls.tag_order.insert(NO_OS.to_string(), flat.tag_order);
                }
                Ok(decls)
            }
        }
    }
}
