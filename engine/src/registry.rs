//! Pattern registry: OS-namespaced tag patterns and show-command
//! templates.
//!
//! The registry is the runtime store behind non-tabular extraction. It
//! is populated from [`Declarations`] — typically the markup compiler's
//! generated output — via [`extend`](PatternRegistry::extend) or
//! [`extend_from_yaml`](PatternRegistry::extend_from_yaml), or authored
//! directly with [`add_pattern`](PatternRegistry::add_pattern) /
//! [`add_command`](PatternRegistry::add_command).
//!
//! Re-extending an existing tag appends an additional candidate pattern
//! rather than overwriting, so one tag can carry an ordered list of
//! patterns covering output variance across releases. Regexes compile
//! eagerly at registration; a pattern that does not compile is a
//! declaration error, not a runtime one.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use thiserror::Error;

use showparse_core::declarations::{Declarations, DeclarationsError, NO_OS};
use showparse_core::template::{CommandArgs, ShowCommandTemplate, TemplateError};

/// Errors from registry registration and lookups.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Command key never registered for the namespace.
    #[error("unknown show command `{key}` in namespace `{os}`")]
    UnknownCommand { os: String, key: String },
    /// Tag never registered for the namespace.
    #[error("unknown regex tag `{tag}` in namespace `{os}`")]
    UnknownTag { os: String, tag: String },
    /// A numeric command key used outside the pre-seeded legacy table.
    #[error("numeric command keys are only valid against the pre-seeded legacy table")]
    LegacyKeyType,
    /// A registered pattern failed to compile.
    #[error("pattern for tag `{tag}` failed to compile: {source}")]
    BadPattern {
        tag: String,
        #[source]
        source: regex::Error,
    },
    /// An empty pattern was registered for a tag.
    #[error("empty pattern registered for tag `{tag}`")]
    EmptyPattern { tag: String },
    /// A show-command template failed to parse at registration.
    #[error("show command template `{key}`: {source}")]
    BadTemplate {
        key: String,
        #[source]
        source: TemplateError,
    },
    /// Template resolution failed (missing argument without default).
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// Declarative text failed to parse.
    #[error(transparent)]
    Declarations(#[from] DeclarationsError),
}

/// Key identifying a show command at resolution time.
///
/// Textual keys are the normal path. Numeric keys exist for the legacy
/// pre-seeded table only; using one against a registry with no seeded
/// legacy table is a type error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKey {
    /// A textual command key, e.g. `show_bgp_summary`.
    Text(String),
    /// A legacy numeric key.
    Legacy(u32),
}

impl CommandKey {
    /// Convenience constructor for textual keys.
    pub fn text(key: impl Into<String>) -> Self {
        CommandKey::Text(key.into())
    }
}

impl From<&str> for CommandKey {
    fn from(key: &str) -> Self {
        CommandKey::Text(key.to_string())
    }
}

impl From<u32> for CommandKey {
    fn from(key: u32) -> Self {
        CommandKey::Legacy(key)
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKey::Text(key) => f.write_str(key),
            CommandKey::Legacy(key) => write!(f, "{key}"),
        }
    }
}

/// One compiled candidate pattern for a tag.
#[derive(Debug, Clone)]
pub struct CandidatePattern {
    raw: String,
    regex: Regex,
}

impl CandidatePattern {
    /// The raw pattern text as registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The compiled regex.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Process-scoped store of tag patterns and show-command templates,
/// partitioned by OS namespace.
///
/// # Examples
///
/// ```
/// use showparse_core::template::CommandArgs;
/// use showparse_engine::registry::{CommandKey, PatternRegistry};
///
/// let mut registry = PatternRegistry::default();
/// registry
///     .add_command(Some("iosxr"), "show_bgp_summary", "show bgp {vrf=default} summary")
///     .unwrap();
/// registry
///     .add_pattern(Some("iosxr"), "bgp.router-id", r"Router ID: (\S+)")
///     .unwrap();
///
/// let command = registry
///     .resolve_command(Some("iosxr"), &CommandKey::text("show_bgp_summary"), &CommandArgs::new())
///     .unwrap();
/// assert_eq!(command, "show bgp default summary");
/// assert_eq!(registry.resolve_patterns(Some("iosxr"), "bgp.router-id").unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatternRegistry {
    commands: BTreeMap<String, BTreeMap<String, ShowCommandTemplate>>,
    legacy_commands: BTreeMap<u32, ShowCommandTemplate>,
    patterns: BTreeMap<String, BTreeMap<String, Vec<CandidatePattern>>>,
    tag_order: BTreeMap<String, Vec<String>>,
}

fn ns(os: Option<&str>) -> &str {
    os.unwrap_or(NO_OS)
}

fn display_ns(os: &str) -> String {
    if os.is_empty() {
        "<no-os>".to_string()
    } else {
        os.to_string()
    }
}

impl PatternRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges generated declarations into the registry: commands replace
    /// by key, tag patterns append in declaration order.
    pub fn extend(&mut self, decls: &Declarations) -> Result<(), RegistryError> {
        for (os, commands) in &decls.show_commands {
            for (key, template) in commands {
                self.add_command(Some(os.as_str()), key, template)?;
            }
        }
        for (os, tags) in &decls.regex {
            for (tag, entry) in tags {
                for pattern in entry.patterns() {
                    self.add_pattern(Some(os.as_str()), tag, pattern)?;
                }
            }
        }
        Ok(())
    }

    /// Parses declarative YAML text and extends the registry with it.
    pub fn extend_from_yaml(&mut self, text: &str) -> Result<(), RegistryError> {
        let decls = Declarations::from_yaml(text)?;
        self.extend(&decls)
    }

    /// Registers a show-command template, replacing any previous entry.
    pub fn add_command(
        &mut self,
        os: Option<&str>,
        key: &str,
        template: &str,
    ) -> Result<(), RegistryError> {
        let parsed = ShowCommandTemplate::parse(template).map_err(|source| {
            RegistryError::BadTemplate {
                key: key.to_string(),
                source,
            }
        })?;
        self.commands
            .entry(ns(os).to_string())
            .or_default()
            .insert(key.to_string(), parsed);
        Ok(())
    }

    /// Registers a candidate pattern for a tag. A first registration
    /// creates the tag; later registrations append unless the exact
    /// pattern is already present, keeping repeated catalog loads
    /// idempotent.
    pub fn add_pattern(
        &mut self,
        os: Option<&str>,
        tag: &str,
        pattern: &str,
    ) -> Result<(), RegistryError> {
        if pattern.is_empty() {
            return Err(RegistryError::EmptyPattern {
                tag: tag.to_string(),
            });
        }
        let candidates = self
            .patterns
            .entry(ns(os).to_string())
            .or_default()
            .entry(tag.to_string())
            .or_default();
        if candidates.iter().any(|c| c.raw == pattern) {
            return Ok(());
        }
        let regex = Regex::new(pattern).map_err(|source| RegistryError::BadPattern {
            tag: tag.to_string(),
            source,
        })?;
        if candidates.is_empty() {
            self.tag_order
                .entry(ns(os).to_string())
                .or_default()
                .push(tag.to_string());
        }
        candidates.push(CandidatePattern {
            raw: pattern.to_string(),
            regex,
        });
        Ok(())
    }

    /// Seeds the legacy numeric-key command table.
    pub fn seed_legacy_commands<'a, I>(&mut self, entries: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = (u32, &'a str)>,
    {
        for (key, template) in entries {
            let parsed = ShowCommandTemplate::parse(template).map_err(|source| {
                RegistryError::BadTemplate {
                    key: key.to_string(),
                    source,
                }
            })?;
            self.legacy_commands.insert(key, parsed);
        }
        Ok(())
    }

    /// Resolves a show command to exactly one formatted command string,
    /// applying supplied arguments over declared defaults.
    pub fn resolve_command(
        &self,
        os: Option<&str>,
        key: &CommandKey,
        args: &CommandArgs,
    ) -> Result<String, RegistryError> {
        match key {
            CommandKey::Text(key) => {
                let template = self
                    .commands
                    .get(ns(os))
                    .and_then(|commands| commands.get(key))
                    .ok_or_else(|| RegistryError::UnknownCommand {
                        os: display_ns(ns(os)),
                        key: key.clone(),
                    })?;
                Ok(template.resolve(args)?)
            }
            CommandKey::Legacy(key) => {
                if self.legacy_commands.is_empty() {
                    return Err(RegistryError::LegacyKeyType);
                }
                let template = self.legacy_commands.get(key).ok_or_else(|| {
                    RegistryError::UnknownCommand {
                        os: display_ns(ns(os)),
                        key: key.to_string(),
                    }
                })?;
                Ok(template.resolve(args)?)
            }
        }
    }

    /// The ordered candidate patterns for a tag.
    pub fn resolve_patterns(
        &self,
        os: Option<&str>,
        tag: &str,
    ) -> Result<&[CandidatePattern], RegistryError> {
        self.patterns
            .get(ns(os))
            .and_then(|tags| tags.get(tag))
            .map(Vec::as_slice)
            .ok_or_else(|| RegistryError::UnknownTag {
                os: display_ns(ns(os)),
                tag: tag.to_string(),
            })
    }

    /// Returns `true` if the tag is registered in the namespace.
    pub fn contains_tag(&self, os: Option<&str>, tag: &str) -> bool {
        self.patterns
            .get(ns(os))
            .is_some_and(|tags| tags.contains_key(tag))
    }

    /// Tags registered for a namespace, first-registration order.
    pub fn tag_order(&self, os: Option<&str>) -> &[String] {
        self.tag_order
            .get(ns(os))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All namespaces with registered patterns or commands.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .commands
            .keys()
            .chain(self.patterns.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.patterns.is_empty() && self.legacy_commands.is_empty()
    }

    /// Clears all registrations (test isolation).
    pub fn clear(&mut self) {
        self.commands.clear();
        self.legacy_commands.clear();
        self.patterns.clear();
        self.tag_order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PatternRegistry {
        let mut registry = PatternRegistry::new();
        registry
            .add_command(Some("iosxr"), "show_bgp_summary", "show bgp summary")
            .unwrap();
        registry
            .add_pattern(Some("iosxr"), "bgp.as", r"local AS number (\d+)")
            .unwrap();
        registry
    }

    #[test]
    fn test_unknown_lookups_fail() {
        let registry = registry();
        assert!(matches!(
            registry.resolve_command(
                Some("iosxr"),
                &CommandKey::text("nonexistent"),
                &CommandArgs::new()
            ),
            Err(RegistryError::UnknownCommand { .. })
        ));
        assert!(matches!(
            registry.resolve_patterns(Some("iosxr"), "bgp.bogus"),
            Err(RegistryError::UnknownTag { .. })
        ));
        // Same key, wrong namespace.
        assert!(matches!(
            registry.resolve_patterns(Some("nxos"), "bgp.as"),
            Err(RegistryError::UnknownTag { .. })
        ));
    }

    #[test]
    fn test_re_extend_appends_candidates() {
        let mut registry = registry();
        registry
            .add_pattern(Some("iosxr"), "bgp.as", r"autonomous-system (\d+)")
            .unwrap();
        // Exact duplicate is a no-op.
        registry
            .add_pattern(Some("iosxr"), "bgp.as", r"local AS number (\d+)")
            .unwrap();

        let candidates = registry.resolve_patterns(Some("iosxr"), "bgp.as").unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].raw(), r"local AS number (\d+)");
    }

    #[test]
    fn test_bad_pattern_is_a_declaration_error() {
        let mut registry = PatternRegistry::new();
        assert!(matches!(
            registry.add_pattern(None, "x.y", r"([unclosed"),
            Err(RegistryError::BadPattern { .. })
        ));
        assert!(matches!(
            registry.add_pattern(None, "x.y", ""),
            Err(RegistryError::EmptyPattern { .. })
        ));
    }

    #[test]
    fn test_legacy_keys_require_seeding() {
        let mut registry = registry();
        assert!(matches!(
            registry.resolve_command(None, &CommandKey::Legacy(3), &CommandArgs::new()),
            Err(RegistryError::LegacyKeyType)
        ));

        registry
            .seed_legacy_commands([(3, "show ip route"), (4, "show arp")])
            .unwrap();
        assert_eq!(
            registry
                .resolve_command(None, &CommandKey::Legacy(3), &CommandArgs::new())
                .unwrap(),
            "show ip route"
        );
        assert!(matches!(
            registry.resolve_command(None, &CommandKey::Legacy(9), &CommandArgs::new()),
            Err(RegistryError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn test_command_arguments_over_defaults() {
        let mut registry = PatternRegistry::new();
        registry
            .add_command(Some("iosxr"), "show_bgp", "show bgp {vrf=default} {afi=ipv4} summary")
            .unwrap();

        let resolved = registry
            .resolve_command(
                Some("iosxr"),
                &CommandKey::text("show_bgp"),
                &CommandArgs::new().named("vrf", "CORE"),
            )
            .unwrap();
        assert_eq!(resolved, "show bgp CORE ipv4 summary");
    }

    #[test]
    fn test_extend_from_yaml_round_trip() {
        let mut decls = Declarations::default();
        decls.add_command(Some("nxos"), "show_version", "show version");
        decls.add_pattern(Some("nxos"), "ver.kernel", r"Kernel uptime is (.+)");
        let yaml = decls.to_yaml().unwrap();

        let mut registry = PatternRegistry::new();
        registry.extend_from_yaml(&yaml).unwrap();
        assert!(registry.contains_tag(Some("nxos"), "ver.kernel"));
        assert_eq!(registry.tag_order(Some("nxos")), ["ver.kernel"]);
    }

    #[test]
    fn test_clear_resets_for_isolation() {
        let mut registry = registry();
        assert!(!registry.is_empty());
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.tag_order(Some("iosxr")).is_empty());
    }
}
