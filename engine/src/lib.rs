//! Runtime extraction engines for show-command output.
//!
//! This crate hosts the runtime half of showparse:
//!
//! - [`PatternRegistry`] — OS-namespaced store of tag patterns (ordered
//!   candidate lists) and show-command templates, populated from the
//!   markup compiler's generated declarations.
//! - [`ParseContext`] — registry plus [`ResultCache`], the explicit
//!   context handle every extraction call threads through.
//! - [`NonTabularRequest`] — ordered attribute lists over free text, in
//!   fill (capture) or validate (compare) mode.
//! - [`TableRequest`] — header-aligned tabular extraction with per-row
//!   column inference.
//! - [`Device`] — the injected capability that executes one command and
//!   returns its output; raw text can be supplied directly instead.
//!
//! Calls are synchronous and single-threaded; sharing a context across
//! threads is the caller's concern, and `&mut` threading keeps
//! registration and extraction from interleaving.
//!
//! # Example
//!
//! ```
//! use showparse_core::types::Expectation;
//! use showparse_engine::{NonTabularRequest, ParseContext};
//!
//! let mut ctx = ParseContext::new();
//! ctx.registry
//!     .add_pattern(Some("iosxr"), "bgp.as", r"local AS number (\d+)")
//!     .unwrap();
//!
//! let outcome = NonTabularRequest::new("router1")
//!     .os("iosxr")
//!     .expect("bgp.as", Expectation::eq(100))
//!     .run_on_text(&mut ctx, "BGP router identifier 10.1.1.1, local AS number 100\n")
//!     .unwrap();
//! assert!(outcome.success);
//! assert!(outcome.diff.is_empty());
//! ```

pub mod context;
pub mod device;
pub mod extract;
pub mod registry;
pub mod table;

pub use context::{CachedParse, ParseContext, ResultCache};
pub use device::{Device, DeviceError};
pub use extract::{Attribute, ExtractError, NonTabularRequest};
pub use registry::{CandidatePattern, CommandKey, PatternRegistry, RegistryError};
pub use table::{TableError, TableRequest};
