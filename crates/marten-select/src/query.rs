//! Selector evaluation.
//!
//! A query walks each comma-separated group left to right. The *working set*
//! starts as the context node; every step replaces it with the elements its
//! combinator reaches from the current members that also satisfy the step's
//! compound. Group results are merged into one ordered, duplicate-free list
//! and the context node is dropped from it.

use std::collections::HashSet;

use marten_common::warning::warn_once;
use marten_dom::{DomTree, ElementData, NodeId, NodeType};

use crate::namespace::{ANY_NAMESPACE, NamespaceRegistry};
use crate::selector::{
    AttributeOperator, AttributeSelector, Combinator, Compound, Filter, NamespaceConstraint,
    PseudoClass, SelectorList, Sequence, TypeSelector, parse_selector_list,
};
use crate::SelectorError;

/// Namespace bindings a query resolves type and attribute names against.
///
/// Contexts are immutable values. Every `with_*` method returns a derived
/// context and leaves `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryContext {
    namespaces: NamespaceRegistry,
    /// URI unprefixed type selectors must be in. `None` is the wildcard.
    default_namespace: Option<String>,
}

impl QueryContext {
    /// A context with only the reserved prefixes and a wildcard default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context with `prefix` bound to `uri`.
    ///
    /// # Errors
    ///
    /// [`SelectorError::InvalidArgument`] when `prefix` is reserved (`*`,
    /// `xml`, `xmlns`) and `uri` is not its fixed value.
    pub fn with_namespace(&self, prefix: &str, uri: &str) -> Result<Self, SelectorError> {
        Ok(Self {
            namespaces: self.namespaces.with(prefix, uri)?,
            default_namespace: self.default_namespace.clone(),
        })
    }

    /// Derive a context with several bindings at once.
    ///
    /// # Errors
    ///
    /// Fails like [`QueryContext::with_namespace`] on the first bad pair.
    pub fn with_namespaces<'a, I>(&self, bindings: I) -> Result<Self, SelectorError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        bindings
            .into_iter()
            .try_fold(self.clone(), |context, (prefix, uri)| {
                context.with_namespace(prefix, uri)
            })
    }

    /// Derive a context whose unprefixed type selectors only match elements
    /// in `uri`. `"*"` restores the wildcard.
    #[must_use]
    pub fn with_default_namespace(&self, uri: &str) -> Self {
        Self {
            namespaces: self.namespaces.clone(),
            default_namespace: (uri != ANY_NAMESPACE).then(|| uri.to_string()),
        }
    }

    /// The URI bound to `prefix`.
    #[must_use]
    pub fn namespace_uri(&self, prefix: &str) -> Option<&str> {
        self.namespaces.resolve(prefix)
    }

    /// The default namespace, `"*"` when unset.
    #[must_use]
    pub fn default_namespace(&self) -> &str {
        self.default_namespace.as_deref().unwrap_or(ANY_NAMESPACE)
    }

    /// Select every node matched by `expression`, relative to `context`.
    ///
    /// Results are in first-encountered order with no duplicates and never
    /// include `context` itself.
    ///
    /// # Errors
    ///
    /// Any parse error, [`SelectorError::UnregisteredPrefix`] when a
    /// `prefix|name` uses an unbound prefix. Nothing is returned on error.
    pub fn query(
        &self,
        expression: &str,
        tree: &DomTree,
        context: NodeId,
    ) -> Result<Vec<NodeId>, SelectorError> {
        let list = parse_selector_list(expression)?;
        self.check_prefixes(&list)?;

        let mut result = WorkingSet::default();
        for group in &list.groups {
            for id in self.evaluate_group(group, tree, context) {
                result.insert(id);
            }
        }
        let _ = result.remove(context);

        tracing::debug!(expression, context = context.0, matches = result.len(), "query");
        Ok(result.into_vec())
    }

    /// Fail early on unbound prefixes so evaluation itself cannot fail.
    fn check_prefixes(&self, list: &SelectorList) -> Result<(), SelectorError> {
        fn compound_prefixes(compound: &Compound, out: &mut Vec<String>) {
            if let NamespaceConstraint::Prefix(prefix) = &compound.name.namespace {
                out.push(prefix.clone());
            }
            for filter in &compound.filters {
                match filter {
                    Filter::Attribute(AttributeSelector {
                        namespace: NamespaceConstraint::Prefix(prefix),
                        ..
                    }) => out.push(prefix.clone()),
                    Filter::Not(inner) => compound_prefixes(inner, out),
                    _ => {}
                }
            }
        }

        let mut prefixes = Vec::new();
        for step in list.groups.iter().flat_map(|group| &group.steps) {
            compound_prefixes(&step.compound, &mut prefixes);
        }
        match prefixes
            .into_iter()
            .find(|prefix| self.namespaces.resolve(prefix).is_none())
        {
            Some(prefix) => Err(SelectorError::UnregisteredPrefix(prefix)),
            None => Ok(()),
        }
    }

    fn evaluate_group(&self, group: &Sequence, tree: &DomTree, context: NodeId) -> Vec<NodeId> {
        let mut working = WorkingSet::default();
        working.insert(context);

        for step in &group.steps {
            let mut next = WorkingSet::default();
            // Sibling scans that reach an already visited node stop there:
            // every later sibling was covered by the earlier scan.
            let mut scanned = HashSet::new();

            for &node in working.iter() {
                match step.combinator {
                    Combinator::Descendant => {
                        for candidate in descendant_candidates(tree, node, &step.compound) {
                            if self.compound_matches(tree, candidate, &step.compound) {
                                next.insert(candidate);
                            }
                        }
                    }
                    Combinator::Child => {
                        for &child in tree.children(node) {
                            if self.compound_matches(tree, child, &step.compound) {
                                next.insert(child);
                            }
                        }
                    }
                    Combinator::NextSibling => {
                        let sibling = tree
                            .following_siblings(node)
                            .find(|&sibling| tree.is_element(sibling));
                        if let Some(sibling) = sibling {
                            if self.compound_matches(tree, sibling, &step.compound) {
                                next.insert(sibling);
                            }
                        }
                    }
                    Combinator::SubsequentSibling => {
                        for sibling in tree.following_siblings(node) {
                            if !scanned.insert(sibling) {
                                break;
                            }
                            if self.compound_matches(tree, sibling, &step.compound) {
                                next.insert(sibling);
                            }
                        }
                    }
                }
            }

            tracing::trace!(combinator = ?step.combinator, matched = next.len(), "selector step");
            working = next;
            if working.is_empty() {
                break;
            }
        }

        working.into_vec()
    }

    /// Whether `node` is an element satisfying every part of `compound`.
    fn compound_matches(&self, tree: &DomTree, node: NodeId, compound: &Compound) -> bool {
        let Some(element) = tree.as_element(node) else {
            return false;
        };
        self.type_matches(element, &compound.name)
            && compound.ids.iter().all(|id| element.id() == Some(id.as_str()))
            && compound.classes.iter().all(|class| element.has_class(class))
            && compound
                .filters
                .iter()
                .all(|filter| self.filter_matches(tree, node, element, filter))
    }

    fn type_matches(&self, element: &ElementData, selector: &TypeSelector) -> bool {
        let name_ok = selector
            .local_name
            .as_deref()
            .is_none_or(|name| element.tag_name.eq_ignore_ascii_case(name));
        if !name_ok {
            return false;
        }

        let element_ns = element.namespace.as_deref();
        match &selector.namespace {
            NamespaceConstraint::Default => self
                .default_namespace
                .as_deref()
                .is_none_or(|uri| element_ns == Some(uri)),
            NamespaceConstraint::Any => true,
            NamespaceConstraint::NoNamespace => element_ns.is_none(),
            NamespaceConstraint::Prefix(prefix) => match self.namespaces.resolve(prefix) {
                Some(ANY_NAMESPACE) => true,
                Some(uri) => element_ns == Some(uri),
                None => false,
            },
        }
    }

    fn filter_matches(
        &self,
        tree: &DomTree,
        node: NodeId,
        element: &ElementData,
        filter: &Filter,
    ) -> bool {
        match filter {
            Filter::Attribute(selector) => self.attribute_matches(element, selector),
            Filter::Pseudo(pseudo) => pseudo_class_matches(pseudo, tree, node, element),
            // [§ 6.6.7 The negation pseudo-class](https://www.w3.org/TR/selectors-3/#negation)
            // "The negation pseudo-class, :not(X), is a functional notation taking
            // a simple selector (excluding the negation pseudo-class itself) as an
            // argument. It represents an element that is not represented by its
            // argument."
            Filter::Not(inner) => !self.compound_matches(tree, node, inner),
        }
    }

    /// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
    fn attribute_matches(&self, element: &ElementData, selector: &AttributeSelector) -> bool {
        // [§ 6.3.3](https://www.w3.org/TR/selectors-3/#attrnmsp)
        // "the default namespace does not apply to attributes"
        let value = match &selector.namespace {
            NamespaceConstraint::Default | NamespaceConstraint::NoNamespace => {
                element.attribute(&selector.name)
            }
            NamespaceConstraint::Any => element.attrs.get_any_ns(&selector.name),
            NamespaceConstraint::Prefix(prefix) => match self.namespaces.resolve(prefix) {
                Some(ANY_NAMESPACE) => element.attrs.get_any_ns(&selector.name),
                Some(uri) => element.attribute_ns(Some(uri), &selector.name),
                None => None,
            },
        };
        attribute_value_matches(value, &selector.operator)
    }
}

/// Query with a default context: wildcard default namespace, reserved
/// prefixes only.
///
/// # Errors
///
/// See [`QueryContext::query`].
pub fn query(expression: &str, tree: &DomTree, context: NodeId) -> Result<Vec<NodeId>, SelectorError> {
    QueryContext::default().query(expression, tree, context)
}

/// Candidates for a descendant step below `node`.
///
/// A step naming an id looks the id up first (the usual fast path); any
/// other step scans every descendant element.
fn descendant_candidates<'a>(
    tree: &'a DomTree,
    node: NodeId,
    compound: &'a Compound,
) -> Box<dyn Iterator<Item = NodeId> + 'a> {
    match compound.ids.first() {
        Some(id) => Box::new(tree.descendants(node).filter(move |&candidate| {
            tree.as_element(candidate)
                .is_some_and(|element| element.id() == Some(id.as_str()))
        })),
        None => Box::new(tree.descendants(node).filter(|&candidate| tree.is_element(candidate))),
    }
}

fn attribute_value_matches(value: Option<&str>, operator: &AttributeOperator) -> bool {
    let Some(value) = value else {
        return matches!(operator, AttributeOperator::NotEqual(_));
    };
    match operator {
        AttributeOperator::Exists => true,
        AttributeOperator::Equals(expected) => value == expected,
        AttributeOperator::NotEqual(expected) => value != expected,
        // "If "val" is the empty string then the selector does not represent
        // anything."
        AttributeOperator::Prefix(expected) => !expected.is_empty() && value.starts_with(expected.as_str()),
        AttributeOperator::Suffix(expected) => !expected.is_empty() && value.ends_with(expected.as_str()),
        AttributeOperator::Substring(expected) => !expected.is_empty() && value.contains(expected.as_str()),
        AttributeOperator::Includes(expected) => {
            !expected.is_empty() && value.split_whitespace().any(|word| word == expected)
        }
        AttributeOperator::DashMatch(expected) => {
            value == expected
                || value
                    .strip_prefix(expected.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        }
    }
}

/// 1-based position of `node` among its element siblings.
fn element_position(tree: &DomTree, node: NodeId) -> i64 {
    let before = tree
        .preceding_siblings(node)
        .filter(|&sibling| tree.is_element(sibling))
        .count();
    i64::try_from(before).map_or(i64::MAX, |before| before + 1)
}

/// [§ 6.6 Pseudo-classes](https://www.w3.org/TR/selectors-3/#pseudo-classes)
fn pseudo_class_matches(
    pseudo: &PseudoClass,
    tree: &DomTree,
    node: NodeId,
    element: &ElementData,
) -> bool {
    match pseudo {
        // [§ 6.6.5.6 :first-child](https://www.w3.org/TR/selectors-3/#first-child-pseudo)
        // "Same as :nth-child(1). The :first-child pseudo-class represents an
        // element that is the first child of some other element."
        PseudoClass::FirstChild => !tree
            .preceding_siblings(node)
            .any(|sibling| tree.is_element(sibling)),

        // [§ 6.6.5.7 :last-child](https://www.w3.org/TR/selectors-3/#last-child-pseudo)
        PseudoClass::LastChild => !tree
            .following_siblings(node)
            .any(|sibling| tree.is_element(sibling)),

        // [§ 6.6.5.10 :only-child](https://www.w3.org/TR/selectors-3/#only-child-pseudo)
        // "Represents an element that has a parent element and whose parent
        // element has no other element children."
        PseudoClass::OnlyChild => {
            !tree.preceding_siblings(node).any(|s| tree.is_element(s))
                && !tree.following_siblings(node).any(|s| tree.is_element(s))
        }

        PseudoClass::NthChild(expr) => {
            if expr.step < 0 {
                warn_once(
                    "select",
                    "nth-child with a negative step counts down from its offset",
                );
            }
            expr.matches(element_position(tree, node))
        }

        // [§ 6.6.5.12 :empty](https://www.w3.org/TR/selectors-3/#empty-pseudo)
        // "The :empty pseudo-class represents an element that has no children
        // at all." Comments and whitespace-only text do not count.
        PseudoClass::Empty => tree
            .children(node)
            .iter()
            .all(|&child| match tree.get(child).map(|n| &n.node_type) {
                Some(NodeType::Text(text)) => text.trim().is_empty(),
                Some(NodeType::Comment(_)) => true,
                _ => false,
            }),

        // :disabled - element has the disabled attribute
        PseudoClass::Disabled => element.attrs.contains("disabled"),

        // :enabled - element does not have the disabled attribute
        PseudoClass::Enabled => !element.attrs.contains("disabled"),

        PseudoClass::Checked => element.attrs.contains("checked"),
        PseudoClass::Selected => element.attrs.contains("selected"),
    }
}

/// Ordered, duplicate-free set of nodes.
#[derive(Debug, Default)]
struct WorkingSet {
    order: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

impl WorkingSet {
    fn insert(&mut self, id: NodeId) {
        if self.seen.insert(id) {
            self.order.push(id);
        }
    }

    fn remove(&mut self, id: NodeId) -> bool {
        if self.seen.remove(&id) {
            self.order.retain(|&member| member != id);
            true
        } else {
            false
        }
    }

    fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.order.iter()
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn into_vec(self) -> Vec<NodeId> {
        self.order
    }
}
