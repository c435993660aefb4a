//! Tests for DOM traversal, attributes, inline styles and snapshots.

use marten_dom::{DomSnapshot, DomTree, ElementData, NodeId, NodeType, SVG_NAMESPACE};

/// Helper to create an element node under `parent` and return its `NodeId`.
fn append(tree: &mut DomTree, parent: NodeId, tag: &str) -> NodeId {
    tree.append_element(parent, ElementData::new(tag))
}

// ========== traversal ==========

#[test]
fn test_sibling_links() {
    let mut tree = DomTree::new();
    let ul = append(&mut tree, NodeId::ROOT, "ul");
    let a = append(&mut tree, ul, "li");
    let b = append(&mut tree, ul, "li");
    let c = append(&mut tree, ul, "li");

    assert_eq!(tree.children(ul), &[a, b, c]);
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.first_child(ul), Some(a));
    assert_eq!(tree.last_child(ul), Some(c));
}

#[test]
fn test_following_and_preceding_siblings() {
    let mut tree = DomTree::new();
    let ul = append(&mut tree, NodeId::ROOT, "ul");
    let a = append(&mut tree, ul, "li");
    let b = append(&mut tree, ul, "li");
    let c = append(&mut tree, ul, "li");

    assert_eq!(tree.following_siblings(a).collect::<Vec<_>>(), vec![b, c]);
    assert_eq!(tree.preceding_siblings(c).collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(tree.following_siblings(c).count(), 0);
}

#[test]
fn test_descendants_in_tree_order() {
    let mut tree = DomTree::new();
    let div = append(&mut tree, NodeId::ROOT, "div");
    let p1 = append(&mut tree, div, "p");
    let span = append(&mut tree, p1, "span");
    let text = tree.append_text(span, "hi");
    let p2 = append(&mut tree, div, "p");

    let order: Vec<NodeId> = tree.descendants(div).collect();
    assert_eq!(order, vec![p1, span, text, p2]);
    assert!(tree.is_descendant_of(text, div));
    assert!(!tree.is_descendant_of(div, text));
    assert_eq!(tree.ancestors(text).collect::<Vec<_>>(), vec![span, p1, div, NodeId::ROOT]);
}

#[test]
fn test_document_element_skips_comments() {
    let mut tree = DomTree::new();
    let comment = tree.alloc(NodeType::Comment("x".to_string()));
    tree.append_child(NodeId::ROOT, comment);
    let html = append(&mut tree, NodeId::ROOT, "html");
    assert_eq!(tree.document_element(), Some(html));
}

// ========== attributes ==========

#[test]
fn test_namespaced_attributes_are_separate() {
    let mut tree = DomTree::new();
    let svg = tree.append_element(NodeId::ROOT, ElementData::with_namespace("svg", SVG_NAMESPACE));
    let xlink = "http://www.w3.org/1999/xlink";

    assert!(tree.set_attribute(svg, "href", "plain"));
    assert!(tree.set_attribute_ns(svg, Some(xlink), "href", "linked"));

    let element = tree.as_element(svg).unwrap();
    assert_eq!(element.attribute("href"), Some("plain"));
    assert_eq!(element.attribute_ns(Some(xlink), "href"), Some("linked"));
    assert_eq!(element.attrs.len(), 2);
    assert_eq!(element.namespace.as_deref(), Some(SVG_NAMESPACE));
}

#[test]
fn test_set_attribute_on_text_fails() {
    let mut tree = DomTree::new();
    let text = tree.append_text(NodeId::ROOT, "t");
    assert!(!tree.set_attribute(text, "id", "x"));
}

#[test]
fn test_classes() {
    let el = ElementData::new("p").attr("class", "a  b\tc");
    assert!(el.has_class("b"));
    assert!(!el.has_class("d"));
    assert_eq!(el.classes().len(), 3);
}

// ========== inline style ==========

#[test]
fn test_style_property_round_trip() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, ElementData::new("div").attr("style", "width: 10px"));

    assert_eq!(tree.style_property(div, "width").as_deref(), Some("10px"));
    assert!(tree.set_style_property(div, "left", "5px"));
    assert!(tree.set_style_property(div, "width", "20px"));

    assert_eq!(tree.style_property(div, "width").as_deref(), Some("20px"));
    assert_eq!(tree.style_property(div, "left").as_deref(), Some("5px"));
    assert_eq!(tree.style_property(div, "top"), None);
    assert_eq!(
        tree.as_element(div).unwrap().attribute("style"),
        Some("width: 20px; left: 5px;")
    );
}

// ========== snapshots ==========

#[test]
fn test_snapshot_from_json() {
    let json = r##"{
        "tag": "ul",
        "attrs": { "id": "menu" },
        "children": [
            { "tag": "li", "attrs": { "class": "first" }, "children": [ { "text": "One" } ] },
            { "comment": "gap" },
            { "tag": "li" }
        ]
    }"##;
    let snapshot: DomSnapshot = serde_json::from_str(json).unwrap();
    let tree = DomTree::from_snapshot(&snapshot);

    let ul = tree.document_element().unwrap();
    assert_eq!(tree.describe(ul), "<ul#menu>");
    let kids = tree.children(ul);
    assert_eq!(kids.len(), 3);
    assert_eq!(tree.describe(kids[0]), "<li.first>");
    assert_eq!(tree.describe(kids[1]), "<!--gap-->");
    assert_eq!(tree.as_text(tree.first_child(kids[0]).unwrap()), Some("One"));

    assert_eq!(tree.snapshot(ul), Some(snapshot));
}
