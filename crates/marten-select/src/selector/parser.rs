//! Selector expression parser.
//!
//! [§ 10 The grammar of Selectors](https://www.w3.org/TR/selectors-3/#w3cselgrammar)
//!
//! A hand-written, single-pass parser over the expression text. It does not
//! try to recover: the first character no rule accepts produces
//! [`SelectorError::Parse`] with its byte offset.

use super::{
    AttributeOperator, AttributeSelector, Combinator, Compound, Filter, NamespaceConstraint,
    NthExpr, PseudoClass, SelectorList, Sequence, Step, TypeSelector,
};
use crate::SelectorError;

/// Parse a comma-separated selector list.
///
/// # Errors
///
/// - [`SelectorError::Parse`] for malformed syntax (including empty groups)
/// - [`SelectorError::InvalidNegation`] for `:not()` inside `:not()`
/// - [`SelectorError::Unsupported`] for pseudo-classes outside the registry
/// - [`SelectorError::InvalidArgument`] for malformed `nth-child` arguments
pub fn parse_selector_list(expression: &str) -> Result<SelectorList, SelectorError> {
    let mut parser = Parser::new(expression);
    let list = parser.parse_list()?;
    tracing::trace!(expression, groups = list.groups.len(), "parsed selector");
    Ok(list)
}

/// Check if a character can start an identifier.
/// [§ 4.3.10 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
/// [§ 4.3.9 ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

struct Parser<'a> {
    /// The whole expression; error offsets are relative to it.
    input: &'a str,
    pos: usize,
    /// Exclusive bound of the region being parsed (`:not()` arguments are
    /// parsed in place by a bounded sub-parser).
    end: usize,
    in_negation: bool,
}

impl<'a> Parser<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            end: input.len(),
            in_negation: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..self.end]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            let _ = self.bump();
            true
        } else {
            false
        }
    }

    /// Skip whitespace, returning whether any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            let _ = self.bump();
        }
        self.pos != start
    }

    fn error_at(&self, position: usize) -> SelectorError {
        SelectorError::Parse {
            expression: self.input.to_string(),
            position,
        }
    }

    fn error(&self) -> SelectorError {
        self.error_at(self.pos)
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut groups = Vec::new();
        loop {
            groups.push(self.parse_sequence()?);
            match self.peek() {
                None => break,
                Some(',') => {
                    let _ = self.bump();
                }
                Some(_) => return Err(self.error()),
            }
        }
        Ok(SelectorList { groups })
    }

    fn parse_explicit_combinator(&mut self) -> Option<Combinator> {
        let combinator = match self.peek()? {
            '>' => Combinator::Child,
            '+' => Combinator::NextSibling,
            '~' => Combinator::SubsequentSibling,
            _ => return None,
        };
        let _ = self.bump();
        let _ = self.skip_whitespace();
        Some(combinator)
    }

    /// One comma-separated group. Stops before `,` or at the end.
    fn parse_sequence(&mut self) -> Result<Sequence, SelectorError> {
        let _ = self.skip_whitespace();
        let mut combinator = self
            .parse_explicit_combinator()
            .unwrap_or(Combinator::Descendant);
        let mut steps = Vec::new();

        loop {
            let compound = self.parse_compound()?;
            steps.push(Step {
                combinator,
                compound,
            });

            let had_whitespace = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>' | '+' | '~') => {
                    combinator = self
                        .parse_explicit_combinator()
                        .ok_or_else(|| self.error())?;
                }
                Some(_) if had_whitespace => combinator = Combinator::Descendant,
                Some(_) => return Err(self.error()),
            }
        }

        Ok(Sequence { steps })
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        if !self.at_ident_start() {
            return Err(self.error());
        }
        while self.peek().is_some_and(is_ident_char) {
            let _ = self.bump();
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn at_ident_start(&self) -> bool {
        self.peek().is_some_and(|c| {
            is_ident_start_char(c) || (c == '-' && self.peek_second().is_some_and(is_ident_char))
        })
    }

    /// `*` or an identifier after a namespace bar.
    fn parse_local_name(&mut self) -> Result<Option<String>, SelectorError> {
        if self.eat('*') {
            Ok(None)
        } else {
            self.parse_ident().map(Some)
        }
    }

    /// [§ 6.1.1 Type selectors and namespaces](https://www.w3.org/TR/selectors-3/#typenmsp)
    ///
    /// `ns|E`, `*|E`, `|E`, `E` (and the same with `*` for `E`).
    fn parse_type_selector(&mut self) -> Result<Option<TypeSelector>, SelectorError> {
        match self.peek() {
            Some('*') => {
                let _ = self.bump();
                if self.eat('|') {
                    let local_name = self.parse_local_name()?;
                    return Ok(Some(TypeSelector {
                        namespace: NamespaceConstraint::Any,
                        local_name,
                    }));
                }
                Ok(Some(TypeSelector::universal()))
            }
            Some('|') => {
                let _ = self.bump();
                let local_name = self.parse_local_name()?;
                Ok(Some(TypeSelector {
                    namespace: NamespaceConstraint::NoNamespace,
                    local_name,
                }))
            }
            _ if self.at_ident_start() => {
                let ident = self.parse_ident()?;
                if self.eat('|') {
                    let local_name = self.parse_local_name()?;
                    return Ok(Some(TypeSelector {
                        namespace: NamespaceConstraint::Prefix(ident),
                        local_name,
                    }));
                }
                Ok(Some(TypeSelector {
                    namespace: NamespaceConstraint::Default,
                    local_name: Some(ident),
                }))
            }
            _ => Ok(None),
        }
    }

    /// A type selector followed by any mix of `#id`, `.class`, `[attr]`
    /// and `:pseudo`. At least one component is required.
    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let name = self.parse_type_selector()?;
        let mut any = name.is_some();
        let mut compound = Compound {
            name: name.unwrap_or_else(TypeSelector::universal),
            ..Compound::universal()
        };

        loop {
            match self.peek() {
                // [§ 6.5 ID selectors](https://www.w3.org/TR/selectors-3/#id-selectors)
                Some('#') => {
                    let _ = self.bump();
                    compound.ids.push(self.parse_ident()?);
                }
                // [§ 6.4 Class selectors](https://www.w3.org/TR/selectors-3/#class-html)
                Some('.') => {
                    let _ = self.bump();
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    let _ = self.bump();
                    let attribute = self.parse_attribute()?;
                    compound.filters.push(Filter::Attribute(attribute));
                }
                Some(':') => {
                    let filter = self.parse_pseudo()?;
                    compound.filters.push(filter);
                }
                _ => break,
            }
            any = true;
        }

        if !any {
            return Err(self.error_at(start));
        }
        Ok(compound)
    }

    /// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
    ///
    /// Called with the opening `[` already consumed.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        let _ = self.skip_whitespace();

        // [§ 6.3.3 Attribute selectors and namespaces](https://www.w3.org/TR/selectors-3/#attrnmsp)
        let (namespace, name) = match self.peek() {
            Some('*') if self.peek_second() == Some('|') => {
                let _ = self.bump();
                let _ = self.bump();
                (NamespaceConstraint::Any, self.parse_ident()?)
            }
            Some('|') if self.peek_second() != Some('=') => {
                let _ = self.bump();
                (NamespaceConstraint::NoNamespace, self.parse_ident()?)
            }
            _ => {
                let ident = self.parse_ident()?;
                if self.peek() == Some('|') && self.peek_second() != Some('=') {
                    let _ = self.bump();
                    (NamespaceConstraint::Prefix(ident), self.parse_ident()?)
                } else {
                    (NamespaceConstraint::Default, ident)
                }
            }
        };

        let _ = self.skip_whitespace();
        if self.eat(']') {
            return Ok(AttributeSelector {
                namespace,
                name,
                operator: AttributeOperator::Exists,
            });
        }

        let operator_start = self.pos;
        let op = match self.bump() {
            Some('=') => '=',
            Some(op @ ('!' | '^' | '$' | '*' | '~' | '|')) if self.eat('=') => op,
            _ => return Err(self.error_at(operator_start)),
        };

        let _ = self.skip_whitespace();
        let value = self.parse_attribute_value()?;
        let _ = self.skip_whitespace();
        if !self.eat(']') {
            return Err(self.error());
        }

        let operator = match op {
            '=' => AttributeOperator::Equals(value),
            '!' => AttributeOperator::NotEqual(value),
            '^' => AttributeOperator::Prefix(value),
            '$' => AttributeOperator::Suffix(value),
            '*' => AttributeOperator::Substring(value),
            '~' => AttributeOperator::Includes(value),
            _ => AttributeOperator::DashMatch(value),
        };
        Ok(AttributeSelector {
            namespace,
            name,
            operator,
        })
    }

    /// A quoted string (`"..."`, `'...'`, backslash escapes the next
    /// character) or a bare run of characters up to whitespace or `]`.
    fn parse_attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let start = self.pos;
                let _ = self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => return Ok(value),
                        Some('\\') => match self.bump() {
                            Some(escaped) => value.push(escaped),
                            None => return Err(self.error_at(start)),
                        },
                        Some(c) => value.push(c),
                        None => return Err(self.error_at(start)),
                    }
                }
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|c| !c.is_whitespace() && c != ']')
                {
                    let _ = self.bump();
                }
                if self.pos == start {
                    return Err(self.error());
                }
                Ok(self.input[start..self.pos].to_string())
            }
        }
    }

    /// Consume `( ... )` with balanced nesting, returning the inner range.
    fn parse_arguments(&mut self) -> Result<(usize, usize), SelectorError> {
        let open = self.pos;
        let _ = self.bump();
        let inner_start = self.pos;
        let mut depth = 1u32;
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok((inner_start, self.pos - 1));
                    }
                }
                _ => {}
            }
        }
        Err(self.error_at(open))
    }

    /// [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes)
    fn parse_pseudo(&mut self) -> Result<Filter, SelectorError> {
        let _ = self.bump(); // ':'

        // [§ 7 Pseudo-elements](https://www.w3.org/TR/selectors-3/#pseudo-elements)
        if self.eat(':') {
            let name = self.parse_ident()?;
            return Err(SelectorError::Unsupported(format!(":{name}")));
        }

        let name_start = self.pos;
        let name = self.parse_ident()?.to_ascii_lowercase();

        if name == "not" && self.in_negation {
            return Err(SelectorError::InvalidNegation);
        }

        if self.peek() != Some('(') {
            return match PseudoClass::from_name(&name) {
                Some(pseudo) => Ok(Filter::Pseudo(pseudo)),
                None if name == "not" || name == "nth-child" => Err(self.error()),
                None => Err(SelectorError::Unsupported(name)),
            };
        }

        let (inner_start, inner_end) = self.parse_arguments()?;
        match name.as_str() {
            "nth-child" => {
                let expr = NthExpr::parse(&self.input[inner_start..inner_end])?;
                Ok(Filter::Pseudo(PseudoClass::NthChild(expr)))
            }
            "not" => {
                let mut inner = Parser {
                    input: self.input,
                    pos: inner_start,
                    end: inner_end,
                    in_negation: true,
                };
                let _ = inner.skip_whitespace();
                let compound = inner.parse_compound()?;
                let _ = inner.skip_whitespace();
                if inner.pos != inner.end {
                    return Err(inner.error());
                }
                Ok(Filter::Not(Box::new(compound)))
            }
            _ if PseudoClass::from_name(&name).is_some() => Err(self.error_at(name_start)),
            _ => Err(SelectorError::Unsupported(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_compound(expression: &str) -> Compound {
        let mut list = parse_selector_list(expression).unwrap();
        assert_eq!(list.groups.len(), 1);
        let mut steps = list.groups.remove(0).steps;
        assert_eq!(steps.len(), 1);
        steps.remove(0).compound
    }

    #[test]
    fn test_parse_type_id_class() {
        let compound = single_compound("p#intro.lead.big");
        assert_eq!(compound.name.local_name.as_deref(), Some("p"));
        assert_eq!(compound.ids, vec!["intro"]);
        assert_eq!(compound.classes, vec!["lead", "big"]);
        assert!(compound.filters.is_empty());
    }

    #[test]
    fn test_filters_imply_universal() {
        let compound = single_compound(":first-child");
        assert_eq!(compound.name, TypeSelector::universal());
        assert_eq!(compound.filters, vec![Filter::Pseudo(PseudoClass::FirstChild)]);
    }

    #[test]
    fn test_parse_combinators() {
        let list = parse_selector_list("div > ul li + a ~ span").unwrap();
        let combinators: Vec<Combinator> = list.groups[0]
            .steps
            .iter()
            .map(|step| step.combinator)
            .collect();
        assert_eq!(
            combinators,
            vec![
                Combinator::Descendant,
                Combinator::Child,
                Combinator::Descendant,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
            ]
        );
    }

    #[test]
    fn test_leading_combinator() {
        let list = parse_selector_list("> li").unwrap();
        assert_eq!(list.groups[0].steps[0].combinator, Combinator::Child);
    }

    #[test]
    fn test_parse_groups() {
        let list = parse_selector_list("a , b,c").unwrap();
        assert_eq!(list.groups.len(), 3);
    }

    #[test]
    fn test_parse_namespaces() {
        let compound = single_compound("svg|rect");
        assert_eq!(
            compound.name.namespace,
            NamespaceConstraint::Prefix("svg".to_string())
        );
        assert_eq!(single_compound("*|a").name.namespace, NamespaceConstraint::Any);
        assert_eq!(single_compound("|a").name.namespace, NamespaceConstraint::NoNamespace);
        assert_eq!(single_compound("svg|*").name.local_name, None);
    }

    #[test]
    fn test_parse_attribute_operators() {
        let cases = [
            ("[href]", AttributeOperator::Exists),
            ("[type=text]", AttributeOperator::Equals("text".into())),
            ("[type!=text]", AttributeOperator::NotEqual("text".into())),
            ("[href^='https']", AttributeOperator::Prefix("https".into())),
            ("[src$=\".png\"]", AttributeOperator::Suffix(".png".into())),
            ("[title*=dark]", AttributeOperator::Substring("dark".into())),
            ("[class ~= a]", AttributeOperator::Includes("a".into())),
            ("[lang|=en]", AttributeOperator::DashMatch("en".into())),
        ];
        for (source, operator) in cases {
            let compound = single_compound(source);
            match &compound.filters[0] {
                Filter::Attribute(attr) => assert_eq!(attr.operator, operator, "{source}"),
                other => panic!("expected attribute filter for {source}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_namespaced_attribute() {
        let compound = single_compound("[xlink|href]");
        match &compound.filters[0] {
            Filter::Attribute(attr) => {
                assert_eq!(attr.namespace, NamespaceConstraint::Prefix("xlink".into()));
                assert_eq!(attr.name, "href");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_negation_and_nth() {
        let compound = single_compound("li:not(.done):nth-child(2n+1)");
        assert_eq!(compound.filters.len(), 2);
        assert!(matches!(&compound.filters[0], Filter::Not(inner) if inner.classes == vec!["done"]));
        assert_eq!(
            compound.filters[1],
            Filter::Pseudo(PseudoClass::NthChild(NthExpr::new(2, 1)))
        );
    }

    #[test]
    fn test_nested_negation_rejected() {
        assert_eq!(
            parse_selector_list("p:not(:not(.a))"),
            Err(SelectorError::InvalidNegation)
        );
    }

    #[test]
    fn test_unsupported_pseudo() {
        assert_eq!(
            parse_selector_list("a:hover"),
            Err(SelectorError::Unsupported("hover".to_string()))
        );
        assert_eq!(
            parse_selector_list("p::before"),
            Err(SelectorError::Unsupported(":before".to_string()))
        );
    }

    #[test]
    fn test_parse_errors_report_offset() {
        let cases = [("", 0), ("a,", 2), ("a >", 3), ("div $", 4), ("[href", 5), ("a:not(", 5)];
        for (source, position) in cases {
            assert_eq!(
                parse_selector_list(source),
                Err(SelectorError::Parse {
                    expression: source.to_string(),
                    position,
                }),
                "{source:?}"
            );
        }
    }
}
