//! Integration tests for selector queries: combinators, filters,
//! pseudo-classes, grouping and error reporting.

use marten_common::warning;
use marten_dom::{DomTree, ElementData, NodeId};
use marten_select::{SelectorError, query};

/// Helper to append an element built from `tag` and `attrs` under `parent`.
fn el(tree: &mut DomTree, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
    let data = attrs
        .iter()
        .fold(ElementData::new(tag), |data, (name, value)| data.attr(name, value));
    tree.append_element(parent, data)
}

/// `<div id="x"><p class="a"/><p class="b"/></div>`
fn two_paragraphs() -> (DomTree, NodeId, NodeId, NodeId) {
    let mut tree = DomTree::new();
    let div = el(&mut tree, NodeId::ROOT, "div", &[("id", "x")]);
    let a = el(&mut tree, div, "p", &[("class", "a")]);
    let b = el(&mut tree, div, "p", &[("class", "b")]);
    (tree, div, a, b)
}

/// `<ul>` with three `<li>` children separated by text and a comment.
fn list_of_three() -> (DomTree, NodeId, [NodeId; 3]) {
    let mut tree = DomTree::new();
    let ul = el(&mut tree, NodeId::ROOT, "ul", &[]);
    let one = el(&mut tree, ul, "li", &[("class", "first")]);
    let _ = tree.append_text(ul, "\n  ");
    let two = el(&mut tree, ul, "li", &[]);
    let comment = tree.alloc(marten_dom::NodeType::Comment("c".to_string()));
    tree.append_child(ul, comment);
    let three = el(&mut tree, ul, "li", &[("class", "last")]);
    (tree, ul, [one, two, three])
}

// ========== simple selectors ==========

#[test]
fn test_class_narrows_type() {
    let (tree, div, a, _) = two_paragraphs();
    assert_eq!(query("p.a", &tree, div).unwrap(), vec![a]);
}

#[test]
fn test_type_returns_document_order() {
    let (tree, div, a, b) = two_paragraphs();
    assert_eq!(query("p", &tree, div).unwrap(), vec![a, b]);
}

#[test]
fn test_type_is_case_insensitive() {
    let (tree, div, a, b) = two_paragraphs();
    assert_eq!(query("P", &tree, div).unwrap(), vec![a, b]);
}

#[test]
fn test_id_selector() {
    let (tree, div, _, _) = two_paragraphs();
    assert_eq!(query("#x", &tree, NodeId::ROOT).unwrap(), vec![div]);
    assert_eq!(query("div#x", &tree, NodeId::ROOT).unwrap(), vec![div]);
    assert!(query("p#x", &tree, NodeId::ROOT).unwrap().is_empty());
}

#[test]
fn test_universal_excludes_context() {
    let (tree, div, a, b) = two_paragraphs();
    assert_eq!(query("*", &tree, div).unwrap(), vec![a, b]);
}

#[test]
fn test_chained_classes() {
    let mut tree = DomTree::new();
    let both = el(&mut tree, NodeId::ROOT, "span", &[("class", "x y")]);
    let _only_x = el(&mut tree, NodeId::ROOT, "span", &[("class", "x")]);
    assert_eq!(query(".x.y", &tree, NodeId::ROOT).unwrap(), vec![both]);
}

// ========== combinators ==========

#[test]
fn test_child_vs_descendant() {
    let mut tree = DomTree::new();
    let div = el(&mut tree, NodeId::ROOT, "div", &[]);
    let direct = el(&mut tree, div, "span", &[]);
    let section = el(&mut tree, div, "section", &[]);
    let nested = el(&mut tree, section, "span", &[]);

    assert_eq!(query("div > span", &tree, NodeId::ROOT).unwrap(), vec![direct]);
    assert_eq!(query("div span", &tree, NodeId::ROOT).unwrap(), vec![direct, nested]);
}

#[test]
fn test_leading_child_combinator() {
    let (tree, ul, items) = list_of_three();
    assert_eq!(query("> li", &tree, ul).unwrap(), items.to_vec());
    assert!(query("> li", &tree, NodeId::ROOT).unwrap().is_empty());
}

#[test]
fn test_next_sibling_skips_text_and_comments() {
    let (tree, ul, [one, two, three]) = list_of_three();
    assert_eq!(query("li.first + li", &tree, ul).unwrap(), vec![two]);
    assert_eq!(query("li + li", &tree, ul).unwrap(), vec![two, three]);
    assert!(query("li.last + li", &tree, ul).unwrap().is_empty());
    let _ = one;
}

#[test]
fn test_subsequent_sibling() {
    let (tree, ul, [_, two, three]) = list_of_three();
    assert_eq!(query("li.first ~ li", &tree, ul).unwrap(), vec![two, three]);
    assert_eq!(query("li ~ li", &tree, ul).unwrap(), vec![two, three]);
    assert_eq!(query("li ~ .last", &tree, ul).unwrap(), vec![three]);
}

// ========== attribute selectors ==========

#[test]
fn test_attribute_operators() {
    let mut tree = DomTree::new();
    let link = el(
        &mut tree,
        NodeId::ROOT,
        "a",
        &[("href", "https://example.com/x.png"), ("lang", "en-US"), ("rel", "nofollow noopener")],
    );
    let plain = el(&mut tree, NodeId::ROOT, "a", &[]);

    let root = NodeId::ROOT;
    assert_eq!(query("[href]", &tree, root).unwrap(), vec![link]);
    assert_eq!(query("a[href^='https:']", &tree, root).unwrap(), vec![link]);
    assert_eq!(query("a[href$=\".png\"]", &tree, root).unwrap(), vec![link]);
    assert_eq!(query("a[href*=example]", &tree, root).unwrap(), vec![link]);
    assert_eq!(query("a[rel~=noopener]", &tree, root).unwrap(), vec![link]);
    assert_eq!(query("a[lang|=en]", &tree, root).unwrap(), vec![link]);
    assert!(query("a[lang|=e]", &tree, root).unwrap().is_empty());
    assert!(query("a[href^='']", &tree, root).unwrap().is_empty());
    assert_eq!(query("a[lang=fr]", &tree, root).unwrap(), Vec::<NodeId>::new());
}

#[test]
fn test_not_equal_includes_absent() {
    let mut tree = DomTree::new();
    let text = el(&mut tree, NodeId::ROOT, "input", &[("type", "text")]);
    let check = el(&mut tree, NodeId::ROOT, "input", &[("type", "checkbox")]);
    let bare = el(&mut tree, NodeId::ROOT, "input", &[]);
    assert_eq!(query("input[type!=text]", &tree, NodeId::ROOT).unwrap(), vec![check, bare]);
    let _ = text;
}

// ========== pseudo-classes ==========

#[test]
fn test_first_last_only_child() {
    let (tree, ul, [one, _, three]) = list_of_three();
    assert_eq!(query("li:first-child", &tree, ul).unwrap(), vec![one]);
    assert_eq!(query("li:last-child", &tree, ul).unwrap(), vec![three]);
    assert!(query("li:only-child", &tree, ul).unwrap().is_empty());
    assert_eq!(query("ul:only-child", &tree, NodeId::ROOT).unwrap(), vec![ul]);
}

#[test]
fn test_filter_only_compound_implies_universal() {
    let (tree, ul, [one, _, _]) = list_of_three();
    assert_eq!(query(":first-child", &tree, ul).unwrap(), vec![one]);
    assert_eq!(query(".first", &tree, ul).unwrap(), vec![one]);
}

#[test]
fn test_nth_child_integer() {
    let (tree, ul, [_, two, _]) = list_of_three();
    assert_eq!(query("li:nth-child(2)", &tree, ul).unwrap(), vec![two]);
    assert!(query("li:nth-child(4)", &tree, ul).unwrap().is_empty());
}

#[test]
fn test_nth_child_odd_matches_2n_plus_1() {
    let (tree, ul, [one, _, three]) = list_of_three();
    let odd = query("li:nth-child(odd)", &tree, ul).unwrap();
    assert_eq!(odd, vec![one, three]);
    assert_eq!(query("li:nth-child( 2n + 1 )", &tree, ul).unwrap(), odd);
}

#[test]
fn test_nth_child_negative_step() {
    let (tree, ul, [one, two, _]) = list_of_three();
    assert_eq!(query("li:nth-child(-n+2)", &tree, ul).unwrap(), vec![one, two]);
    assert!(warning::was_warned(
        "select",
        "nth-child with a negative step counts down from its offset"
    ));
}

#[test]
fn test_nth_child_huge_offset_does_not_overflow() {
    let (tree, ul, items) = list_of_three();
    assert_eq!(
        query("li:nth-child(n-9223372036854775808)", &tree, ul).unwrap(),
        items.to_vec()
    );
    assert_eq!(query("li:nth-child(-n+9223372036854775807)", &tree, ul).unwrap(), items.to_vec());
    assert!(query("li:nth-child(9223372036854775807)", &tree, ul).unwrap().is_empty());
}

#[test]
fn test_empty_ignores_comments_and_whitespace() {
    let mut tree = DomTree::new();
    let blank = el(&mut tree, NodeId::ROOT, "p", &[]);
    let _ = tree.append_text(blank, "   ");
    let full = el(&mut tree, NodeId::ROOT, "p", &[]);
    let _ = tree.append_text(full, "hello");
    let nested = el(&mut tree, NodeId::ROOT, "p", &[]);
    let _ = el(&mut tree, nested, "b", &[]);

    assert_eq!(query("p:empty", &tree, NodeId::ROOT).unwrap(), vec![blank]);
}

#[test]
fn test_form_state_pseudo_classes() {
    let mut tree = DomTree::new();
    let on = el(&mut tree, NodeId::ROOT, "input", &[("checked", "")]);
    let off = el(&mut tree, NodeId::ROOT, "input", &[("disabled", "disabled")]);
    let option = el(&mut tree, NodeId::ROOT, "option", &[("selected", "")]);

    let root = NodeId::ROOT;
    assert_eq!(query("input:checked", &tree, root).unwrap(), vec![on]);
    assert_eq!(query("input:disabled", &tree, root).unwrap(), vec![off]);
    assert_eq!(query("input:enabled", &tree, root).unwrap(), vec![on]);
    assert_eq!(query(":selected", &tree, root).unwrap(), vec![option]);
}

#[test]
fn test_negation_is_complement() {
    let (tree, div, a, b) = two_paragraphs();
    let all = query("p", &tree, div).unwrap();
    let not_a = query("p:not(.a)", &tree, div).unwrap();
    assert_eq!(not_a, vec![b]);
    assert!(all.contains(&a) && !not_a.contains(&a));
}

// ========== groups ==========

#[test]
fn test_duplicate_groups_return_each_node_once() {
    let (tree, div, a, b) = two_paragraphs();
    assert_eq!(query("p, p", &tree, div).unwrap(), vec![a, b]);
    assert_eq!(query(".b, p", &tree, div).unwrap(), vec![b, a]);
}

#[test]
fn test_groups_share_context() {
    let (tree, div, a, _) = two_paragraphs();
    assert_eq!(query("div, p.a", &tree, NodeId::ROOT).unwrap(), vec![div, a]);
}

// ========== errors ==========

#[test]
fn test_parse_error_returns_no_results() {
    let (tree, div, _, _) = two_paragraphs();
    assert!(matches!(
        query("p, $", &tree, div),
        Err(SelectorError::Parse { position: 3, .. })
    ));
}

#[test]
fn test_error_variants() {
    let (tree, div, _, _) = two_paragraphs();
    assert_eq!(query("p:not(:not(p))", &tree, div), Err(SelectorError::InvalidNegation));
    assert_eq!(
        query("p:visited", &tree, div),
        Err(SelectorError::Unsupported("visited".to_string()))
    );
    assert!(matches!(
        query("p:nth-child(foo)", &tree, div),
        Err(SelectorError::InvalidArgument(_))
    ));
    assert_eq!(
        query("svg|rect", &tree, div),
        Err(SelectorError::UnregisteredPrefix("svg".to_string()))
    );
}
