//! Inline `style` attribute declarations.
//!
//! [CSSOM § 6.7.1 The ElementCSSInlineStyle mixin](https://drafts.csswg.org/cssom/#the-elementcssinlinestyle-mixin)
//!
//! The tree keeps no separate style object: the `style` attribute is the
//! single source of truth, parsed on read and re-serialized on write, the
//! same way `element.style.foo = bar` updates the attribute in a browser.

/// Parse `name: value; name: value` into ordered declarations.
///
/// Property names are lowercased. Empty or malformed declarations (no
/// colon) are skipped.
#[must_use]
pub fn parse_declarations(text: &str) -> Vec<(String, String)> {
    text.split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim();
            let value = value.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}

/// Serialize declarations back into attribute text.
#[must_use]
pub fn serialize_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up `property` in attribute text. The last declaration wins.
#[must_use]
pub fn find_declaration(text: &str, property: &str) -> Option<String> {
    let property = property.to_ascii_lowercase();
    parse_declarations(text)
        .into_iter()
        .rev()
        .find(|(name, _)| *name == property)
        .map(|(_, value)| value)
}

/// Return attribute text with `property` set to `value`.
///
/// An existing declaration is updated in place (duplicates collapse into
/// it); otherwise the declaration is appended.
#[must_use]
pub fn with_declaration(text: &str, property: &str, value: &str) -> String {
    let property = property.to_ascii_lowercase();
    let mut declarations = parse_declarations(text);
    let mut replaced = false;
    declarations.retain_mut(|(name, existing)| {
        if *name != property {
            return true;
        }
        if replaced {
            return false;
        }
        value.clone_into(existing);
        replaced = true;
        true
    });
    if !replaced {
        declarations.push((property, value.to_string()));
    }
    serialize_declarations(&declarations)
}
