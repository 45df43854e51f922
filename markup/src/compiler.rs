//! Markup compiler: annotated example output → generated declarations.
//!
//! The compiler consumes one text blob containing repeatable sections:
//!
//! ```text
//! OS: iosxr
//! CMD: show_bgp_summary
//! SHOWCMD: show bgp {vrf=default} summary
//! PREFIX: bgp
//! ACTUAL:
//! Router ID: 10.1.1.1
//! MARKUP:
//! Router ID: XA<router-id>X
//! ```
//!
//! `OS:` and `PREFIX:` are sticky — they carry into following
//! declarations until changed. `CMD:`, `SHOWCMD:`, `ACTUAL:` and
//! `MARKUP:` belong to one declaration. Any of the single-line headers
//! appearing after markup lines finalizes the current declaration and
//! opens the next, so sections may arrive in any order.
//!
//! Each marked line yields one regex per marker on it: literal text is
//! escaped (whitespace runs relaxed to `\s+`), the target marker's
//! fragment captures, and sibling markers' fragments are made
//! non-capturing. Declarations missing a command key, prefix, or OS at
//! finalization are reported and skipped without aborting the rest of
//! the compile.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use showparse_core::declarations::Declarations;
use showparse_core::template::ShowCommandTemplate;

use crate::token::{MarkupToken, derive_tag, scan_markers};

/// Options controlling a compile run.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// When `false`, declarations compile into the no-OS namespace and an
    /// `OS:` header is not required (nor used).
    pub namespaced: bool,
    /// Join character for tags derived from preceding words.
    pub word_join: char,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            namespaced: true,
            word_join: '_',
        }
    }
}

/// Reasons a declaration fails to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// No `CMD:` header by the time the declaration ended.
    #[error("declaration has no CMD: header")]
    MissingCommand,
    /// No `PREFIX:` header in effect.
    #[error("declaration has no PREFIX: header")]
    MissingPrefix,
    /// Namespaced compile with no `OS:` header in effect.
    #[error("declaration has no OS: header")]
    MissingOs,
    /// An untagged marker with no preceding words to derive a tag from.
    #[error("line {line}: marker has neither an explicit tag nor preceding words to derive one")]
    UnderivableTag { line: usize },
    /// The `SHOWCMD:` template failed to parse.
    #[error("SHOWCMD template: {0}")]
    BadTemplate(String),
}

/// A declaration the compiler had to skip, with its reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedDeclaration {
    /// Line where the declaration started.
    pub line: usize,
    /// The declaration's `CMD:` value, when present.
    pub cmd: Option<String>,
    /// Why it was skipped.
    pub reason: String,
}

/// Metadata for one successfully compiled declaration, retained so
/// callers can verify generated patterns against the declaration's own
/// example output.
#[derive(Debug, Clone)]
pub struct CompiledDeclaration {
    /// OS namespace (`None` in no-OS mode).
    pub os: Option<String>,
    /// Command key.
    pub cmd: String,
    /// Show-command template, when declared.
    pub show_cmd: Option<String>,
    /// Tag prefix.
    pub prefix: String,
    /// The `ACTUAL:` example text.
    pub actual: String,
    /// Fully qualified tags in appearance order.
    pub tags: Vec<String>,
}

/// Output of one compile run.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
    /// Generated declarations, ready for a registry extend operation.
    pub declarations: Declarations,
    /// Per-declaration metadata in input order.
    pub compiled: Vec<CompiledDeclaration>,
    /// Declarations that failed to compile.
    pub skipped: Vec<SkippedDeclaration>,
}

impl CompileOutput {
    /// Returns `true` when every declaration compiled.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Compiler for annotated markup blobs.
pub struct MarkupCompiler {
    options: CompileOptions,
}

#[derive(Debug, Default)]
struct DeclState {
    start_line: usize,
    cmd: Option<String>,
    show_cmd: Option<String>,
    actual: Vec<String>,
    markup: Vec<(usize, String)>,
}

impl DeclState {
    fn has_content(&self) -> bool {
        self.cmd.is_some() || self.show_cmd.is_some() || !self.markup.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Actual,
    Markup,
}

impl MarkupCompiler {
    /// Creates a compiler with the given options.
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Compiles one annotated blob.
    pub fn compile(&self, source: &str) -> CompileOutput {
        let mut output = CompileOutput::default();
        let mut sticky_os: Option<String> = None;
        let mut sticky_prefix: Option<String> = None;
        let mut decl = DeclState::default();
        let mut block = Block::None;

        for (index, raw_line) in source.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = raw_line.trim();

            if let Some((header, value)) = split_header(trimmed) {
                match header {
                    "OS" | "CMD" | "SHOWCMD" | "PREFIX" => {
                        // A header after markup lines closes the current
                        // declaration, whichever header it is.
                        if !decl.markup.is_empty() {
                            self.finalize(&mut output, &mut decl, &sticky_os, &sticky_prefix);
                            decl.start_line = line_no;
                        }
                        block = Block::None;
                        match header {
                            "OS" => sticky_os = Some(value.to_string()),
                            "CMD" => decl.cmd = Some(value.to_string()),
                            "SHOWCMD" => decl.show_cmd = Some(value.to_string()),
                            "PREFIX" => sticky_prefix = Some(value.to_string()),
                            _ => unreachable!(),
                        }
                        if decl.start_line == 0 {
                            decl.start_line = line_no;
                        }
                    }
                    "ACTUAL" => block = Block::Actual,
                    "MARKUP" => block = Block::Markup,
                    _ => unreachable!("split_header only yields known headers"),
                }
                continue;
            }

            match block {
                Block::Actual => decl.actual.push(raw_line.to_string()),
                Block::Markup => decl.markup.push((line_no, raw_line.to_string())),
                Block::None => {}
            }
        }

        if decl.has_content() {
            self.finalize(&mut output, &mut decl, &sticky_os, &sticky_prefix);
        }
        output
    }

    fn finalize(
        &self,
        output: &mut CompileOutput,
        decl: &mut DeclState,
        sticky_os: &Option<String>,
        sticky_prefix: &Option<String>,
    ) {
        let state = std::mem::take(decl);
        match self.build(state, sticky_os, sticky_prefix, output) {
            Ok(compiled) => {
                debug!(
                    cmd = %compiled.cmd,
                    tags = compiled.tags.len(),
                    "compiled declaration"
                );
                output.compiled.push(compiled);
            }
            Err((start_line, cmd, error)) => {
                warn!(line = start_line, error = %error, "skipping declaration");
                output.skipped.push(SkippedDeclaration {
                    line: start_line,
                    cmd,
                    reason: error.to_string(),
                });
            }
        }
    }

    /// Builds one declaration, writing its patterns and command into the
    /// output declarations on success. Failure reports the declaration
    /// and leaves the output untouched by it.
    fn build(
        &self,
        state: DeclState,
        sticky_os: &Option<String>,
        sticky_prefix: &Option<String>,
        output: &mut CompileOutput,
    ) -> Result<CompiledDeclaration, (usize, Option<String>, CompileError)> {
        let fail = |e: CompileError, cmd: &Option<String>| (state.start_line, cmd.clone(), e);

        let cmd = state
            .cmd
            .clone()
            .ok_or_else(|| fail(CompileError::MissingCommand, &None))?;
        let prefix = sticky_prefix
            .clone()
            .ok_or_else(|| fail(CompileError::MissingPrefix, &state.cmd))?;
        let os = if self.options.namespaced {
            Some(
                sticky_os
                    .clone()
                    .ok_or_else(|| fail(CompileError::MissingOs, &state.cmd))?,
            )
        } else {
            None
        };

        if let Some(template) = &state.show_cmd {
            ShowCommandTemplate::parse(template)
                .map_err(|e| fail(CompileError::BadTemplate(e.to_string()), &state.cmd))?;
        }

        // Collect (tag, pattern) pairs before touching the output so a
        // failing line aborts this declaration only.
        let mut generated: Vec<(String, String)> = Vec::new();
        let mut tags: Vec<String> = Vec::new();
        for (line_no, raw_line) in &state.markup {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            let tokens = scan_markers(line);
            for (i, token) in tokens.iter().enumerate() {
                let previous_end = if i == 0 { 0 } else { tokens[i - 1].end };
                let name = match &token.tag {
                    Some(tag) => tag.clone(),
                    None => derive_tag(line, previous_end, token.start, self.options.word_join)
                        .ok_or_else(|| {
                            fail(CompileError::UnderivableTag { line: *line_no }, &state.cmd)
                        })?,
                };
                let tag = format!("{prefix}.{name}");
                generated.push((tag.clone(), line_regex(line, &tokens, i)));
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }

        let os_ref = os.as_deref();
        if let Some(template) = &state.show_cmd {
            output.declarations.add_command(os_ref, cmd.clone(), template.clone());
        }
        for (tag, pattern) in generated {
            output.declarations.add_pattern(os_ref, &tag, pattern);
        }

        Ok(CompiledDeclaration {
            os,
            cmd,
            show_cmd: state.show_cmd,
            prefix,
            actual: state.actual.join("\n"),
            tags,
        })
    }
}

/// Splits a recognized section header line into `(header, value)`.
fn split_header(line: &str) -> Option<(&str, &str)> {
    for header in ["OS", "CMD", "SHOWCMD", "PREFIX", "ACTUAL", "MARKUP"] {
        if let Some(rest) = line.strip_prefix(header) {
            if let Some(value) = rest.strip_prefix(':') {
                return Some((header, value.trim()));
            }
        }
    }
    None
}

/// Builds the line regex reporting marker `target`: literals escaped with
/// whitespace runs relaxed to `\s+`, the target fragment capturing, and
/// sibling fragments non-capturing.
fn line_regex(line: &str, tokens: &[MarkupToken], target: usize) -> String {
    let mut out = String::new();
    let mut pos = 0;
    for (i, token) in tokens.iter().enumerate() {
        out.push_str(&escape_literal(&line[pos..token.start]));
        if i == target {
            out.push_str(&token.capturing_fragment());
        } else {
            out.push_str(&token.silent_fragment());
        }
        pos = token.end;
    }
    out.push_str(&escape_literal(&line[pos..]));
    out
}

/// Regex-escapes literal text, collapsing each whitespace run to `\s+`
/// so generated patterns tolerate column-width drift between releases.
fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chunk = String::new();
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push_str(&regex::escape(&chunk));
                chunk.clear();
                out.push_str(r"\s+");
                in_space = true;
            }
        } else {
            in_space = false;
            chunk.push(ch);
        }
    }
    out.push_str(&regex::escape(&chunk));
    out
}
