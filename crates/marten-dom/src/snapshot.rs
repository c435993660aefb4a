//! JSON snapshots of a DOM tree.
//!
//! A snapshot is a nested description of a document fragment:
//!
//! ```json
//! { "tag": "ul", "attrs": { "id": "menu" }, "children": [
//!     { "tag": "li", "children": [ { "text": "One" } ] },
//!     { "comment": "separator" }
//! ] }
//! ```
//!
//! Elements may carry a `namespace` URI and `ns_attrs` entries of the form
//! `{ "namespace": "...", "name": "...", "value": "..." }`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DomTree, ElementData, NodeId, NodeType};

/// One node of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomSnapshot {
    /// An element with attributes and children.
    Element {
        /// Local name.
        tag: String,
        /// Namespace URI, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        namespace: Option<String>,
        /// Null-namespace attributes.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        /// Namespaced attributes.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ns_attrs: Vec<NamespacedAttribute>,
        /// Child nodes in order.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<DomSnapshot>,
    },
    /// A text node.
    Text {
        /// Character data.
        text: String,
    },
    /// A comment node.
    Comment {
        /// Comment data.
        comment: String,
    },
}

/// A namespaced attribute inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespacedAttribute {
    /// Namespace URI.
    pub namespace: String,
    /// Local name.
    pub name: String,
    /// Value.
    pub value: String,
}

impl DomTree {
    /// Build a tree whose document node has `roots` as its children.
    #[must_use]
    pub fn from_snapshots(roots: &[DomSnapshot]) -> Self {
        let mut tree = Self::new();
        for root in roots {
            let _ = tree.append_snapshot(NodeId::ROOT, root);
        }
        tree
    }

    /// Build a tree with a single root element (or text/comment).
    #[must_use]
    pub fn from_snapshot(root: &DomSnapshot) -> Self {
        Self::from_snapshots(std::slice::from_ref(root))
    }

    /// Append the snapshot `node` (recursively) under `parent`.
    pub fn append_snapshot(&mut self, parent: NodeId, node: &DomSnapshot) -> NodeId {
        match node {
            DomSnapshot::Element {
                tag,
                namespace,
                attrs,
                ns_attrs,
                children,
            } => {
                let mut data = ElementData::new(tag);
                data.namespace.clone_from(namespace);
                for (name, value) in attrs {
                    data.attrs.set(name, value);
                }
                for attr in ns_attrs {
                    data.attrs
                        .set_ns(Some(&attr.namespace), &attr.name, &attr.value);
                }
                let id = self.append_element(parent, data);
                for child in children {
                    let _ = self.append_snapshot(id, child);
                }
                id
            }
            DomSnapshot::Text { text } => self.append_text(parent, text),
            DomSnapshot::Comment { comment } => {
                let id = self.alloc(NodeType::Comment(comment.clone()));
                self.append_child(parent, id);
                id
            }
        }
    }

    /// Capture the subtree rooted at `id` as a snapshot.
    ///
    /// Returns `None` for the document node and invalid ids.
    #[must_use]
    pub fn snapshot(&self, id: NodeId) -> Option<DomSnapshot> {
        match &self.get(id)?.node_type {
            NodeType::Document => None,
            NodeType::Text(text) => Some(DomSnapshot::Text { text: text.clone() }),
            NodeType::Comment(comment) => Some(DomSnapshot::Comment {
                comment: comment.clone(),
            }),
            NodeType::Element(data) => {
                let mut attrs = BTreeMap::new();
                let mut ns_attrs = Vec::new();
                for attr in data.attrs.iter() {
                    match &attr.namespace {
                        None => {
                            let _ = attrs.insert(attr.name.clone(), attr.value.clone());
                        }
                        Some(namespace) => ns_attrs.push(NamespacedAttribute {
                            namespace: namespace.clone(),
                            name: attr.name.clone(),
                            value: attr.value.clone(),
                        }),
                    }
                }
                Some(DomSnapshot::Element {
                    tag: data.tag_name.clone(),
                    namespace: data.namespace.clone(),
                    attrs,
                    ns_attrs,
                    children: self
                        .children(id)
                        .iter()
                        .filter_map(|&child| self.snapshot(child))
                        .collect(),
                })
            }
        }
    }
}
