//! Selector syntax tree.
//!
//! This module implements the subset of
//! [Selectors Level 3](https://www.w3.org/TR/selectors-3/) understood by the
//! query engine. An expression is parsed once into a [`SelectorList`] and
//! then evaluated left to right against a context node.

/// `an+b` expressions for `:nth-child()`.
pub mod nth;
/// Expression parser.
pub mod parser;

pub use nth::NthExpr;
pub use parser::parse_selector_list;

/// [§ 5 Groups of selectors](https://www.w3.org/TR/selectors-3/#grouping)
///
/// "A comma-separated list of selectors represents the union of all elements
/// selected by each of the individual selectors in the list."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    /// One sequence per comma-separated group, in source order.
    pub groups: Vec<Sequence>,
}

/// [§ 3 Selector syntax](https://www.w3.org/TR/selectors-3/#selector-syntax)
///
/// "A selector is a chain of one or more sequences of simple selectors
/// separated by combinators."
///
/// Stored left to right: evaluation starts at the context node and applies
/// each step in turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Steps in source order.
    pub steps: Vec<Step>,
}

/// One combinator followed by the compound it leads to.
///
/// The first step of a group usually carries [`Combinator::Descendant`];
/// a group may also open with an explicit combinator (`> li`), which is
/// then applied relative to the context node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// How this step's elements relate to the previous working set.
    pub combinator: Combinator,
    /// Conditions every element reached by this step must satisfy.
    pub compound: Compound,
}

/// [§ 8 Combinators](https://www.w3.org/TR/selectors-3/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// [§ 8.1 Descendant combinator](https://www.w3.org/TR/selectors-3/#descendant-combinators)
    /// "A descendant combinator is white space that separates two sequences
    /// of simple selectors."
    Descendant,

    /// [§ 8.2 Child combinators](https://www.w3.org/TR/selectors-3/#child-combinators)
    /// "A child combinator describes a childhood relationship between two
    /// elements. A child combinator is made of the 'greater-than sign' (U+003E, >)."
    Child,

    /// [§ 8.3.1 Next-sibling combinator](https://www.w3.org/TR/selectors-3/#adjacent-sibling-combinators)
    /// "The elements represented by the two sequences share the same parent
    /// in the document tree and the element represented by the first sequence
    /// immediately precedes the element represented by the second one."
    NextSibling,

    /// [§ 8.3.2 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-3/#general-sibling-combinators)
    /// "...the element represented by the first sequence precedes (not
    /// necessarily immediately) the element represented by the second one."
    SubsequentSibling,
}

/// [§ 4 Selector syntax](https://www.w3.org/TR/selectors-3/#simple-selectors-dfn)
///
/// "A sequence of simple selectors is a chain of simple selectors that are
/// not separated by a combinator. It always begins with a type selector or a
/// universal selector."
///
/// When the source omits the type selector, [`TypeSelector::universal`] is
/// implied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    /// Type or universal selector.
    pub name: TypeSelector,
    /// `#id` selectors. More than one can only match if they are equal.
    pub ids: Vec<String>,
    /// `.class` selectors; all must be present.
    pub classes: Vec<String>,
    /// Attribute, negation and pseudo-class filters, in source order.
    pub filters: Vec<Filter>,
}

impl Compound {
    /// A compound matching every element.
    #[must_use]
    pub fn universal() -> Self {
        Self {
            name: TypeSelector::universal(),
            ids: Vec::new(),
            classes: Vec::new(),
            filters: Vec::new(),
        }
    }
}

/// [§ 6.1 Type selector](https://www.w3.org/TR/selectors-3/#type-selectors)
/// [§ 6.2 Universal selector](https://www.w3.org/TR/selectors-3/#universal-selector)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSelector {
    /// Namespace component.
    pub namespace: NamespaceConstraint,
    /// Local name, or `None` for `*`.
    pub local_name: Option<String>,
}

impl TypeSelector {
    /// `*` in the context's default namespace.
    #[must_use]
    pub const fn universal() -> Self {
        Self {
            namespace: NamespaceConstraint::Default,
            local_name: None,
        }
    }
}

/// [§ 6.1.1 Type selectors and namespaces](https://www.w3.org/TR/selectors-3/#typenmsp)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceConstraint {
    /// No `|` at all: "elements with name E in the default namespace (if no
    /// default namespace has been declared... any namespace)".
    Default,
    /// `*|E`: "elements with name E in any namespace, including those
    /// without a namespace".
    Any,
    /// `|E`: "elements with name E without a namespace".
    NoNamespace,
    /// `ns|E`: "elements with name E in namespace ns".
    Prefix(String),
}

/// A filter that narrows a compound's candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `[attr]`, `[attr=value]`, ...
    Attribute(AttributeSelector),
    /// `:first-child`, `:nth-child(2n+1)`, ...
    Pseudo(PseudoClass),
    /// [§ 6.6.7 The negation pseudo-class](https://www.w3.org/TR/selectors-3/#negation)
    /// `:not(X)`. The argument never contains another negation.
    Not(Box<Compound>),
}

/// [§ 6.3 Attribute selectors](https://www.w3.org/TR/selectors-3/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Namespace of the attribute. [`NamespaceConstraint::Default`] means the
    /// null namespace: "the default namespace does not apply to attributes".
    pub namespace: NamespaceConstraint,
    /// Attribute local name.
    pub name: String,
    /// Test applied to the attribute value.
    pub operator: AttributeOperator,
}

/// Value test of an attribute selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[attr]`: the attribute is present.
    Exists,
    /// `[attr=val]`: exactly `val`.
    Equals(String),
    /// `[attr!=val]`: absent, or present with any other value.
    NotEqual(String),
    /// `[attr^=val]`: starts with `val`.
    Prefix(String),
    /// `[attr$=val]`: ends with `val`.
    Suffix(String),
    /// `[attr*=val]`: contains `val`.
    Substring(String),
    /// `[attr~=val]`: whitespace-separated list containing `val`.
    Includes(String),
    /// `[attr|=val]`: `val` or starting with `val-`.
    DashMatch(String),
}

/// Pseudo-classes in the fixed registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:only-child`
    OnlyChild,
    /// `:nth-child(an+b)`
    NthChild(NthExpr),
    /// `:empty`
    Empty,
    /// `:enabled`
    Enabled,
    /// `:disabled`
    Disabled,
    /// `:checked`
    Checked,
    /// `:selected`
    Selected,
}

impl PseudoClass {
    /// Look up an argument-less pseudo-class by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first-child" => Some(Self::FirstChild),
            "last-child" => Some(Self::LastChild),
            "only-child" => Some(Self::OnlyChild),
            "empty" => Some(Self::Empty),
            "enabled" => Some(Self::Enabled),
            "disabled" => Some(Self::Disabled),
            "checked" => Some(Self::Checked),
            "selected" => Some(Self::Selected),
            _ => None,
        }
    }
}
