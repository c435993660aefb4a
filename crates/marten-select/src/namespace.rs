//! Namespace prefix registry.
//!
//! [§ 6.1.1 Type selectors and namespaces](https://www.w3.org/TR/selectors-3/#typenmsp)
//!
//! "The namespace component may be left empty (no prefix before the
//! namespace separator) to indicate that the selector is only to represent
//! elements with no namespace... If a namespace prefix is used that has not
//! been previously declared, the selector is invalid."

use std::collections::HashMap;
use std::rc::Rc;

use marten_dom::{XML_NAMESPACE, XMLNS_NAMESPACE};

use crate::SelectorError;

/// The wildcard "namespace": matches every namespace, including none.
pub const ANY_NAMESPACE: &str = "*";

/// Prefixes bound from the start that may never point anywhere else.
const RESERVED: [(&str, &str); 3] = [
    (ANY_NAMESPACE, ANY_NAMESPACE),
    ("xml", XML_NAMESPACE),
    ("xmlns", XMLNS_NAMESPACE),
];

/// An immutable prefix -> URI map.
///
/// Deriving a registry with [`NamespaceRegistry::with`] shares storage with
/// the parent until the first write, which copies. The parent is never
/// changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceRegistry {
    prefixes: Rc<HashMap<String, String>>,
}

impl NamespaceRegistry {
    /// A registry holding only the reserved prefixes.
    #[must_use]
    pub fn new() -> Self {
        let prefixes = RESERVED
            .iter()
            .map(|&(prefix, uri)| (prefix.to_string(), uri.to_string()))
            .collect();
        Self {
            prefixes: Rc::new(prefixes),
        }
    }

    /// Derive a registry with `prefix` bound to `uri`.
    ///
    /// Rebinding a reserved prefix to its own URI is allowed and changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// [`SelectorError::InvalidArgument`] if `prefix` is reserved and `uri`
    /// differs from its fixed value, or if `prefix` is empty.
    pub fn with(&self, prefix: &str, uri: &str) -> Result<Self, SelectorError> {
        if prefix.is_empty() {
            return Err(SelectorError::InvalidArgument(
                "namespace prefix must not be empty".to_string(),
            ));
        }
        if let Some(&(_, fixed)) = RESERVED.iter().find(|(reserved, _)| *reserved == prefix) {
            if fixed != uri {
                return Err(SelectorError::InvalidArgument(format!(
                    "prefix {prefix:?} is reserved for {fixed:?}"
                )));
            }
            return Ok(self.clone());
        }

        let mut derived = self.clone();
        let _ = Rc::make_mut(&mut derived.prefixes).insert(prefix.to_string(), uri.to_string());
        Ok(derived)
    }

    /// The URI bound to `prefix`, if any.
    #[must_use]
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Number of bound prefixes, reserved ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    /// Always false: the reserved prefixes are present in every registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
