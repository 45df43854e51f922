//! Non-tabular extraction: ordered attribute lists over free text.
//!
//! A [`NonTabularRequest`] names a parse key, an optional OS namespace,
//! and an ordered list of attributes. Each attribute is a registered tag
//! plus an [`Expectation`]: `Fill` captures whatever the tag's pattern
//! yields; anything else validates the capture. Candidates registered
//! for a tag are tried in declaration order against the text from the
//! current scan position; a match moves the position to the start of the
//! matched line, so several tags annotated on one output line all
//! resolve while scanning stays monotonically forward.
//!
//! Match failures are normal outcomes reported through the returned
//! [`ExtractionOutcome`]. Two conditions are hard errors instead: a
//! reference to a tag that was never registered, and a fill-mode call
//! whose first attribute — the anchor locating the interesting region of
//! output — fails to match at all.

use thiserror::Error;
use tracing::debug;

use showparse_core::template::CommandArgs;
use showparse_core::types::{Expectation, ExtractionOutcome, TagOutcome};

use crate::context::{CachedParse, ParseContext};
use crate::device::{Device, DeviceError};
use crate::registry::{CommandKey, RegistryError};

/// Hard errors from a non-tabular extraction call.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Registry lookup or command resolution failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Fill-mode anchor precondition: the first attribute must match.
    #[error("anchor tag `{tag}` did not match the output")]
    AnchorUnmatched { tag: String },
    /// The injected device failed to execute the command.
    #[error("device execution failed for `{command}`: {error}")]
    Device {
        command: String,
        error: DeviceError,
    },
}

/// One attribute of a request: a tag and what is expected of it.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Registered tag, e.g. `bgp.router-id`.
    pub tag: String,
    /// Fill or validate expectation.
    pub expect: Expectation,
}

/// A non-tabular extraction request.
///
/// # Examples
///
/// ```
/// use showparse_core::types::Expectation;
/// use showparse_engine::context::ParseContext;
/// use showparse_engine::extract::NonTabularRequest;
///
/// let mut ctx = ParseContext::new();
/// ctx.registry
///     .add_pattern(Some("iosxr"), "bgp.router-id", r"Router ID: (\S+)")
///     .unwrap();
///
/// let outcome = NonTabularRequest::new("router1")
///     .os("iosxr")
///     .fill("bgp.router-id")
///     .run_on_text(&mut ctx, "Router ID: 10.1.1.1\n")
///     .unwrap();
/// assert!(outcome.success);
/// assert_eq!(outcome.record().get("bgp.router-id"), Some("10.1.1.1"));
/// ```
#[derive(Debug, Clone)]
pub struct NonTabularRequest {
    parse_key: String,
    os: Option<String>,
    attributes: Vec<Attribute>,
    skip_missing: bool,
    refresh: bool,
}

impl NonTabularRequest {
    /// Creates a request cached under `parse_key`.
    pub fn new(parse_key: impl Into<String>) -> Self {
        Self {
            parse_key: parse_key.into(),
            os: None,
            attributes: Vec::new(),
            skip_missing: false,
            refresh: false,
        }
    }

    /// Sets the OS namespace for tag and command lookups.
    pub fn os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }

    /// Appends a fill-mode attribute.
    pub fn fill(mut self, tag: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            tag: tag.into(),
            expect: Expectation::Fill,
        });
        self
    }

    /// Appends a validate-mode attribute.
    pub fn expect(mut self, tag: impl Into<String>, expect: Expectation) -> Self {
        self.attributes.push(Attribute {
            tag: tag.into(),
            expect,
        });
        self
    }

    /// Records non-matching attributes as cleanly skipped instead of
    /// stopping the scan.
    pub fn skip_missing(mut self, skip: bool) -> Self {
        self.skip_missing = skip;
        self
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
        text: &str,
    ) -> Result<ExtractionOutcome, ExtractError> {
        self.scan(ctx, text, None)
    }

    /// Resolves the show command through the registry, obtains output
    /// from the device (or the cache, for an unchanged parse key and
    /// command without `refresh`), and runs the scan.
    pub fn run(
        self,
        ctx: &mut ParseContext,
        device: &mut dyn Device,
        key: &CommandKey,
        args: &CommandArgs,
    ) -> Result<ExtractionOutcome, ExtractError> {
        let command = ctx.registry.resolve_command(self.os.as_deref(), key, args)?;
        let text = if !self.refresh {
            ctx.cache
                .cached_output(&self.parse_key, &command)
                .map(str::to_string)
        } else {
            None
        };
        let text = match text {
            Some(cached) => {
                debug!(parse_key = %self.parse_key, command = %command, "reusing cached output");
                cached
            }
            None => device
                .execute(&command)
                .map_err(|error| ExtractError::Device {
                    command: command.clone(),
                    error,
                })?,
        };
        self.scan(ctx, &text, Some(command))
    }

    fn scan(
        self,
        ctx: &mut ParseContext,
        text: &str,
        command: Option<String>,
    ) -> Result<ExtractionOutcome, ExtractError> {
        let os = self.os.as_deref();
        let fill_call = self
            .attributes
            .first()
            .is_some_and(|attr| attr.expect.is_fill());

        let mut per_tag: Vec<(String, TagOutcome)> = Vec::with_capacity(self.attributes.len());
        let mut cursor = 0usize;

        for (position, attr) in self.attributes.iter().enumerate() {
            // Unknown tags abort the whole parse, unlike a mere no-match.
            let candidates = ctx.registry.resolve_patterns(os, &attr.tag)?;

            let remaining = &text[cursor..];
            let mut resolved: Option<(usize, String)> = None;
            for (rank, candidate) in candidates.iter().enumerate() {
                if let Some(caps) = candidate.regex().captures(remaining) {
                    let whole = caps.get(0).expect("group 0 always participates");
                    let value = caps
                        .iter()
                        .skip(1)
                        .flatten()
                        .next()
                        .map_or(whole.as_str(), |m| m.as_str())
                        .trim()
                        .to_string();
                    if rank > 0 {
                        debug!(tag = %attr.tag, rank, "matched via fallback candidate");
                    }
                    let match_start = cursor + whole.start();
                    let line_start = text[..match_start]
                        .rfind('\n')
                        .map_or(0, |newline| newline + 1);
                    resolved = Some((line_start, value));
                    break;
                }
            }

            match resolved {
                Some((line_start, value)) => {
                    cursor = line_start;
                    let outcome = if attr.expect.is_fill() {
                        TagOutcome::Filled(value)
                    } else if attr.expect.matches(&value) {
                        TagOutcome::Verified(value)
                    } else {
                        TagOutcome::Mismatch {
                            expected: attr.expect.describe(),
                            actual: value,
                        }
                    };
                    per_tag.push((attr.tag.clone(), outcome));
                }
                None => {
                    if position == 0 && fill_call {
                        return Err(ExtractError::AnchorUnmatched {
                            tag: attr.tag.clone(),
                        });
                    }
                    if self.skip_missing {
                        per_tag.push((attr.tag.clone(), TagOutcome::Skipped));
                        continue;
                    }
                    per_tag.push((attr.tag.clone(), TagOutcome::Unmatched));
                    break;
                }
            }
        }

        let outcome = ExtractionOutcome::from_outcomes(per_tag);
        ctx.cache.insert(
            self.parse_key,
            CachedParse::Attributes {
                command,
                raw_output: text.to_string(),
                record: outcome.record(),
            },
        );
        Ok(outcome)
    }
}
