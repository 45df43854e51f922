//! Core data model for show-command output extraction.
//!
//! This crate defines the shared types used by the markup compiler and
//! the extraction engines:
//!
//! - [`ShowCommandTemplate`] / [`CommandArgs`] — parameterized command
//!   strings resolved to one concrete command line at call time.
//! - [`Declarations`] — generated pattern and show-command declarations
//!   (the markup compiler's output, a pattern registry's input), with a
//!   YAML declarative-text rendering.
//! - [`TableSpec`] / [`TableEntries`] — tabular section declarations and
//!   the first-seen-ordered entry trees extracted from them.
//! - [`Expectation`] / [`ExtractionOutcome`] — fill/validate attribute
//!   expectations and per-call extraction results.
//!
//! # Example
//!
//! ```
//! use showparse_core::*;
//!
//! let mut decls = Declarations::default();
//! decls.add_command(Some("iosxr"), "show_bgp_summary", "show bgp {vrf=default} summary");
//! decls.add_pattern(Some("iosxr"), "bgp.router-id", r"Router ID: (\S+)");
//!
//! assert_eq!(decls.tags(Some("iosxr")), ["bgp.router-id"]);
//! let yaml = decls.to_yaml().unwrap();
//! assert_eq!(Declarations::from_yaml(&yaml).unwrap(), decls);
//! ```

pub mod declarations;
pub mod table;
pub mod template;
pub mod types;

pub use declarations::{CommandMap, Declarations, DeclarationsError, NO_OS, PatternEntry, RegexMap, TagOrder};
pub use table::{
    ColumnCleaner, OrderedMap, RowRecord, TableEntries, TableNode, TableSpec, TableSpecError,
};
pub use template::{CommandArgs, ShowCommandTemplate, TemplateError};
pub use types::{ExpectedValue, Expectation, ExtractionOutcome, ExtractionRecord, TagOutcome};
