//! Markup compiler for show-command output extraction patterns.
//!
//! This crate turns one annotated example of command output into
//! reusable extraction declarations. The input blob carries repeatable
//! `OS:`, `CMD:`, `SHOWCMD:`, `PREFIX:`, `ACTUAL:` and `MARKUP:`
//! sections; the `MARKUP:` block is the example output re-typed with
//! inline markers over each extractable value (see [`token`]). The
//! output is a [`Declarations`] value — a show-command map and a regex
//! map — ready to be fed to a pattern registry's extend operation,
//! directly or through its YAML rendering.
//!
//! # Example
//!
//! ```
//! let blob = "\
//! OS: iosxr
//! CMD: show_bgp_summary
//! SHOWCMD: show bgp summary
//! PREFIX: bgp
//! ACTUAL:
//! Router ID: 10.1.1.1
//! MARKUP:
//! Router ID: XA<router-id>X
//! ";
//!
//! let output = showparse_markup::compile(blob);
//! assert!(output.is_clean());
//! assert!(output.declarations.patterns(Some("iosxr"), "bgp.router-id").is_some());
//! ```
//!
//! [`Declarations`]: showparse_core::declarations::Declarations

pub mod compiler;
pub mod token;

pub use compiler::{
    CompileError, CompileOptions, CompileOutput, CompiledDeclaration, MarkupCompiler,
    SkippedDeclaration,
};
pub use token::{MarkupToken, TokenKind};

use showparse_core::declarations::DeclarationsError;

/// Compiles an annotated blob with default options.
pub fn compile(source: &str) -> CompileOutput {
    MarkupCompiler::new(CompileOptions::default()).compile(source)
}

/// Compiles an annotated blob with explicit options.
pub fn compile_with(source: &str, options: CompileOptions) -> CompileOutput {
    MarkupCompiler::new(options).compile(source)
}

/// Compiles an annotated blob and renders the generated declarations as
/// declarative YAML text.
pub fn compile_to_yaml(source: &str) -> Result<String, DeclarationsError> {
    compile(source).declarations.to_yaml()
}
