/*!
 * HTML serialization of document subtrees through html5ever's serializer.
 */

use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope, serialize};
use html5ever::QualName;
use log::warn;
use std::io;

use super::node::{ElementData, NodeData};
use super::parser::{attribute_name, html_name};
use super::{Document, NodeId};

/// A document subtree as html5ever sees it
struct SerializableNode<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl Serialize for SerializableNode<'_> {
    fn serialize<S: Serializer>(&self, serializer: &mut S, traversal_scope: TraversalScope) -> io::Result<()> {
        match traversal_scope {
            TraversalScope::IncludeNode => write_node(self.doc, self.id, serializer),
            TraversalScope::ChildrenOnly(_) => {
                for child in self.doc.children(self.id) {
                    write_node(self.doc, *child, serializer)?;
                }
                Ok(())
            }
        }
    }
}

fn write_node<S: Serializer>(doc: &Document, id: NodeId, serializer: &mut S) -> io::Result<()> {
    let Some(node) = doc.node(id) else {
        return Ok(());
    };
    match &node.data {
        NodeData::Text(text) => serializer.write_text(text),
        NodeData::Comment(text) => serializer.write_comment(text),
        NodeData::Element(element) => {
            let name = html_name(&element.tag_name);
            write_start(serializer, name.clone(), element)?;
            for child in &node.children {
                write_node(doc, *child, serializer)?;
            }
            serializer.end_elem(name)
        }
    }
}

fn write_start<S: Serializer>(serializer: &mut S, name: QualName, element: &ElementData) -> io::Result<()> {
    let attributes: Vec<(QualName, &str)> = element
        .attributes
        .iter()
        .map(|attr| (attribute_name(&attr.name), attr.value.as_str()))
        .collect();
    serializer.start_elem(name, attributes.iter().map(|(name, value)| (name, *value)))
}

/// Serialize anything html5ever can walk into a string
pub(crate) fn to_html<T: Serialize>(node: &T, traversal_scope: TraversalScope) -> String {
    let mut out = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..Default::default()
    };
    if let Err(e) = serialize(&mut out, node, opts) {
        warn!("Serialization stopped early: {}", e);
    }
    String::from_utf8_lossy(&out).into_owned()
}

pub fn outer_html(doc: &Document, id: NodeId) -> String {
    to_html(&SerializableNode { doc, id }, TraversalScope::IncludeNode)
}

pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let parent = doc.tag_name(id).map(html_name);
    to_html(&SerializableNode { doc, id }, TraversalScope::ChildrenOnly(parent))
}
