//! Query templates with `{name}` and `{name:default}` placeholders
//!
//! A template is plain text mixed with placeholder tokens. A token is a
//! `{`, a non-empty name without `{`, `}` or `:`, an optional `:default`
//! without braces, and a closing `}`. Anything that does not fit this
//! grammar stays literal text; nothing here ever fails.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use ask_e9y::template::{extract_placeholders, fill_template};
//!
//! let template = "Show members from {org} limit {count:10}";
//! let names: Vec<_> = extract_placeholders(template)
//!     .into_iter()
//!     .map(|p| p.name)
//!     .collect();
//! assert_eq!(names, ["org", "count"]);
//!
//! let values = HashMap::from([("org".to_string(), "Acme".to_string())]);
//! assert_eq!(fill_template(template, &values), "Show members from Acme limit 10");
//! ```

mod execution;
mod placeholder;
mod report;
mod scanner;

pub use execution::TemplateExecution;
pub use placeholder::{
    extract_placeholders, fill_template, initial_values, Placeholder, PlaceholderType,
};
pub use report::placeholder_report;
pub use scanner::{scan, Scanner, Segment, Span};
