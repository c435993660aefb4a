//! Integration tests for namespace-aware query contexts.

use marten_dom::{DomTree, ElementData, HTML_NAMESPACE, NodeId, SVG_NAMESPACE, XML_NAMESPACE};
use marten_select::{QueryContext, SelectorError};

const XLINK: &str = "http://www.w3.org/1999/xlink";

struct Fixture {
    tree: DomTree,
    html_div: NodeId,
    svg_root: NodeId,
    svg_rect: NodeId,
    bare_rect: NodeId,
}

/// An HTML `<div>` holding an SVG `<svg><rect/></svg>` and a `<rect>`
/// with no namespace.
fn mixed_document() -> Fixture {
    let mut tree = DomTree::new();
    let html_div = tree.append_element(NodeId::ROOT, ElementData::with_namespace("div", HTML_NAMESPACE));
    let svg_root = tree.append_element(html_div, ElementData::with_namespace("svg", SVG_NAMESPACE));
    let svg_rect = tree.append_element(svg_root, ElementData::with_namespace("rect", SVG_NAMESPACE));
    let _ = tree.set_attribute_ns(svg_rect, Some(XLINK), "href", "#target");
    let bare_rect = tree.append_element(html_div, ElementData::new("rect").attr("href", "#plain"));
    Fixture {
        tree,
        html_div,
        svg_root,
        svg_rect,
        bare_rect,
    }
}

#[test]
fn test_unprefixed_matches_any_namespace_by_default() {
    let f = mixed_document();
    let context = QueryContext::new();
    assert_eq!(context.default_namespace(), "*");
    assert_eq!(
        context.query("rect", &f.tree, NodeId::ROOT).unwrap(),
        vec![f.svg_rect, f.bare_rect]
    );
}

#[test]
fn test_prefixed_type_selector() {
    let f = mixed_document();
    let context = QueryContext::new().with_namespace("svg", SVG_NAMESPACE).unwrap();
    assert_eq!(
        context.query("svg|rect", &f.tree, NodeId::ROOT).unwrap(),
        vec![f.svg_rect]
    );
    assert_eq!(
        context.query("svg|*", &f.tree, NodeId::ROOT).unwrap(),
        vec![f.svg_root, f.svg_rect]
    );
}

#[test]
fn test_any_and_no_namespace() {
    let f = mixed_document();
    let context = QueryContext::new();
    assert_eq!(
        context.query("*|rect", &f.tree, NodeId::ROOT).unwrap(),
        vec![f.svg_rect, f.bare_rect]
    );
    assert_eq!(
        context.query("|rect", &f.tree, NodeId::ROOT).unwrap(),
        vec![f.bare_rect]
    );
}

#[test]
fn test_default_namespace_restricts_unprefixed() {
    let f = mixed_document();
    let context = QueryContext::new().with_default_namespace(SVG_NAMESPACE);
    assert_eq!(context.query("rect", &f.tree, NodeId::ROOT).unwrap(), vec![f.svg_rect]);
    assert!(context.query("div", &f.tree, NodeId::ROOT).unwrap().is_empty());

    let reset = context.with_default_namespace("*");
    assert_eq!(reset.query("div", &f.tree, NodeId::ROOT).unwrap(), vec![f.html_div]);
}

#[test]
fn test_namespaced_attribute_selector() {
    let f = mixed_document();
    let context = QueryContext::new().with_namespace("xlink", XLINK).unwrap();
    assert_eq!(
        context.query("[xlink|href]", &f.tree, NodeId::ROOT).unwrap(),
        vec![f.svg_rect]
    );
    // The default namespace never applies to attributes.
    assert_eq!(
        context.query("[href]", &f.tree, NodeId::ROOT).unwrap(),
        vec![f.bare_rect]
    );
    assert_eq!(
        context.query("[*|href]", &f.tree, NodeId::ROOT).unwrap(),
        vec![f.svg_rect, f.bare_rect]
    );
}

#[test]
fn test_unregistered_prefix() {
    let f = mixed_document();
    assert_eq!(
        QueryContext::new().query("math|mi", &f.tree, NodeId::ROOT),
        Err(SelectorError::UnregisteredPrefix("math".to_string()))
    );
}

#[test]
fn test_derivation_leaves_parent_unchanged() {
    let parent = QueryContext::new();
    let child = parent
        .with_namespaces([("svg", SVG_NAMESPACE), ("xlink", XLINK)])
        .unwrap();
    assert_eq!(child.namespace_uri("svg"), Some(SVG_NAMESPACE));
    assert_eq!(child.namespace_uri("xlink"), Some(XLINK));
    assert_eq!(parent.namespace_uri("svg"), None);
    assert_eq!(parent.namespace_uri("xml"), Some(XML_NAMESPACE));
}

#[test]
fn test_reserved_prefix_cannot_be_rebound() {
    let context = QueryContext::new();
    assert!(context.with_namespace("xml", XML_NAMESPACE).is_ok());
    assert!(matches!(
        context.with_namespace("xmlns", "urn:example"),
        Err(SelectorError::InvalidArgument(_))
    ));
    assert!(matches!(
        context.with_namespaces([("svg", SVG_NAMESPACE), ("*", "urn:x")]),
        Err(SelectorError::InvalidArgument(_))
    ));
}
