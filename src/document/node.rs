/*!
 * Node types for the in-process document tree.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node in a [`Document`](super::Document) arena.
///
/// Arena slots are reused once a node is discarded; the generation tells a
/// stale handle apart from the node now living in its slot, so a handle to a
/// discarded node simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId {
    index: usize,
    generation: u64,
}

impl NodeId {
    pub(crate) fn new(index: usize, generation: u64) -> Self {
        Self { index, generation }
    }

    /// Slot of the node in the arena
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u64 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

/// A single element attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Lower-cased attribute name
    pub name: String,
    /// Attribute value, entity-decoded
    pub value: String,
}

/// Element payload: tag name plus ordered attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementData {
    /// Upper-cased tag name, as reported by `nodeName` for HTML elements
    pub tag_name: String,
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
}

impl ElementData {
    /// Create element data for the given tag; the name is upper-cased
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_uppercase(),
            attributes: Vec::new(),
        }
    }

    /// Look up an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
            .map(|attr| attr.value.as_str())
    }

    /// Set or overwrite an attribute
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name,
                value: value.to_string(),
            }),
        }
    }

    /// Whitespace-separated class list
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or("").split_whitespace()
    }

    /// Whether the class list contains `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// What a node holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeData {
    /// An element with children
    Element(ElementData),
    /// A text node
    Text(String),
    /// A comment, kept so pages serialize back unchanged
    Comment(String),
}

/// A node in the arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// This node's id
    pub id: NodeId,
    /// Parent, `None` when detached or for the root
    pub parent: Option<NodeId>,
    /// Children in document order
    pub children: Vec<NodeId>,
    /// Payload
    pub data: NodeData,
}

impl Node {
    pub(crate) fn new(id: NodeId, data: NodeData) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.data, NodeData::Comment(_))
    }

    pub fn element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Upper-cased tag name for elements
    pub fn tag_name(&self) -> Option<&str> {
        self.element().map(|element| element.tag_name.as_str())
    }

    /// Text data for text nodes
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Case-insensitive tag comparison
    pub fn has_tag(&self, tag_name: &str) -> bool {
        self.tag_name()
            .is_some_and(|tag| tag.eq_ignore_ascii_case(tag_name))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.element().is_some_and(|element| element.has_class(class))
    }
}
