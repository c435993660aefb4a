//! CSS selector queries over a [`marten_dom::DomTree`].
//!
//! [Selectors Level 3](https://www.w3.org/TR/selectors-3/)
//!
//! ```ignore
//! let items = marten_select::query("ul#menu > li:not(.hidden)", &tree, NodeId::ROOT)?;
//!
//! let svg = QueryContext::new().with_namespace("svg", SVG_NAMESPACE)?;
//! let rects = svg.query("svg|rect[fill]", &tree, NodeId::ROOT)?;
//! ```
//!
//! Supported syntax: descendant, child (`>`), next-sibling (`+`) and
//! subsequent-sibling (`~`) combinators; universal, type (with optional
//! namespace prefix), id and class selectors; attribute selectors with the
//! operators `= != ^= $= *= ~= |=`; one level of `:not()`; and the
//! pseudo-classes `first-child`, `last-child`, `only-child`,
//! `nth-child()`, `empty`, `enabled`, `disabled`, `checked` and `selected`.

/// Errors.
pub mod error;
/// Namespace prefix registry.
pub mod namespace;
/// Evaluation against a tree.
pub mod query;
/// Syntax tree and parser.
pub mod selector;

pub use error::SelectorError;
pub use namespace::{ANY_NAMESPACE, NamespaceRegistry};
pub use query::{QueryContext, query};
pub use selector::{SelectorList, parse_selector_list};
