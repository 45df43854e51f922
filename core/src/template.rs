//! Show-command template parsing and resolution.
//!
//! A show command is registered as a template string with optional
//! placeholders, resolved to a single concrete command line just before
//! execution:
//!
//! - `{}` — positional placeholder, filled from [`CommandArgs`] in order
//! - `{name}` — named placeholder, filled by keyword
//! - `{name=default}` / `{=default}` — placeholder with a fallback value
//! - `{{` and `}}` — literal braces
//!
//! # Examples
//!
//! ```
//! use showparse_core::template::{CommandArgs, ShowCommandTemplate};
//!
//! let template = ShowCommandTemplate::parse("show bgp {address_family=all} summary").unwrap();
//! assert_eq!(template.resolve(&CommandArgs::new()).unwrap(), "show bgp all summary");
//!
//! let args = CommandArgs::new().named("address_family", "ipv4 unicast");
//! assert_eq!(template.resolve(&args).unwrap(), "show bgp ipv4 unicast summary");
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors from template parsing or resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// An opening `{` with no matching `}` (or a bare `}`).
    #[error("unbalanced brace at byte {0}")]
    UnbalancedBrace(usize),
    /// A named placeholder with no supplied argument and no default.
    #[error("no value supplied for placeholder `{{{name}}}`")]
    MissingNamed { name: String },
    /// A positional placeholder with no supplied argument and no default.
    #[error("no value supplied for positional placeholder {index}")]
    MissingPositional { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder {
        name: Option<String>,
        default: Option<String>,
    },
}

/// A parsed show-command template.
///
/// Parsing happens once at registration time; [`resolve`](Self::resolve)
/// produces exactly one formatted command string per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowCommandTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl ShowCommandTemplate {
    /// Parses a template string.
    ///
    /// # Examples
    ///
    /// ```
    /// use showparse_core::template::ShowCommandTemplate;
    ///
    /// assert!(ShowCommandTemplate::parse("show version").is_ok());
    /// assert!(ShowCommandTemplate::parse("show {oops").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let bytes = raw.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    literal.push('{');
                    i += 2;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    literal.push('}');
                    i += 2;
                }
                b'{' => {
                    let close = raw[i..]
                        .find('}')
                        .map(|p| i + p)
                        .ok_or(TemplateError::UnbalancedBrace(i))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let inner = &raw[i + 1..close];
                    let (name, default) = match inner.split_once('=') {
                        Some((n, d)) => (n, Some(d.to_string())),
                        None => (inner, None),
                    };
                    let name = name.trim();
                    segments.push(Segment::Placeholder {
                        name: (!name.is_empty()).then(|| name.to_string()),
                        default,
                    });
                    i = close + 1;
                }
                b'}' => return Err(TemplateError::UnbalancedBrace(i)),
                _ => {
                    let ch = raw[i..].chars().next().expect("index on char boundary");
                    literal.push(ch);
                    i += ch.len_utf8();
                }
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The original template string.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if the template contains any placeholders.
    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder { .. }))
    }

    /// Resolves the template against the supplied arguments, falling back
    /// to declared defaults. Positional arguments fill `{}` placeholders in
    /// order; named arguments fill `{name}` placeholders.
    pub fn resolve(&self, args: &CommandArgs) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.raw.len());
        let mut positional = 0usize;

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder { name, default } => {
                    let value = match name {
                        Some(name) => args
                            .named
                            .get(name)
                            .map(String::as_str)
                            .or(default.as_deref())
                            .ok_or_else(|| TemplateError::MissingNamed { name: name.clone() })?,
                        None => {
                            let index = positional;
                            positional += 1;
                            args.positional
                                .get(index)
                                .map(String::as_str)
                                .or(default.as_deref())
                                .ok_or(TemplateError::MissingPositional { index })?
                        }
                    };
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Positional and keyword arguments for template resolution.
///
/// # Examples
///
/// ```
/// use showparse_core::template::{CommandArgs, ShowCommandTemplate};
///
/// let template = ShowCommandTemplate::parse("show interface {}").unwrap();
/// let args = CommandArgs::new().arg("GigabitEthernet0/0/0/0");
/// assert_eq!(template.resolve(&args).unwrap(), "show interface GigabitEthernet0/0/0/0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    positional: Vec<String>,
    named: BTreeMap<String, String>,
}

impl CommandArgs {
    /// Creates an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Adds a keyword argument.
    pub fn named(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Returns `true` when no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_template_resolves_verbatim() {
        let template = ShowCommandTemplate::parse("show version").unwrap();
        assert!(!template.has_placeholders());
        assert_eq!(template.resolve(&CommandArgs::new()).unwrap(), "show version");
    }

    #[test]
    fn test_positional_and_named_placeholders() {
        let template = ShowCommandTemplate::parse("show {proto} neighbor {}").unwrap();
        let args = CommandArgs::new().arg("10.0.0.1").named("proto", "bgp");
        assert_eq!(template.resolve(&args).unwrap(), "show bgp neighbor 10.0.0.1");
    }

    #[test]
    fn test_defaults_apply_when_argument_absent() {
        let template = ShowCommandTemplate::parse("show bgp {vrf=default} summary").unwrap();
        assert_eq!(
            template.resolve(&CommandArgs::new()).unwrap(),
            "show bgp default summary"
        );
        let args = CommandArgs::new().named("vrf", "CUSTOMER-A");
        assert_eq!(
            template.resolve(&args).unwrap(),
            "show bgp CUSTOMER-A summary"
        );
    }

    #[test]
    fn test_positional_default() {
        let template = ShowCommandTemplate::parse("show clock {=detail}").unwrap();
        assert_eq!(template.resolve(&CommandArgs::new()).unwrap(), "show clock detail");
        let args = CommandArgs::new().arg("brief");
        assert_eq!(template.resolve(&args).unwrap(), "show clock brief");
    }

    #[test]
    fn test_missing_argument_errors() {
        let template = ShowCommandTemplate::parse("show interface {name}").unwrap();
        assert_eq!(
            template.resolve(&CommandArgs::new()),
            Err(TemplateError::MissingNamed {
                name: "name".to_string()
            })
        );

        let template = ShowCommandTemplate::parse("ping {}").unwrap();
        assert_eq!(
            template.resolve(&CommandArgs::new()),
            Err(TemplateError::MissingPositional { index: 0 })
        );
    }

    #[test]
    fn test_escaped_braces() {
        let template = ShowCommandTemplate::parse("run {{raw}} {}").unwrap();
        let args = CommandArgs::new().arg("now");
        assert_eq!(template.resolve(&args).unwrap(), "run {raw} now");
    }

    #[test]
    fn test_unbalanced_braces_rejected() {
        assert_eq!(
            ShowCommandTemplate::parse("show {vrf"),
            Err(TemplateError::UnbalancedBrace(5))
        );
        assert_eq!(
            ShowCommandTemplate::parse("show } oops"),
            Err(TemplateError::UnbalancedBrace(5))
        );
    }
}
