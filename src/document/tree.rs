/*!
 * The document arena and its mutation operations.
 *
 * Every structural, content or attribute change goes through a method here so
 * that an attached observer sees it as a [`MutationRecord`].
 */

use log::{debug, trace};
use parking_lot::Mutex;
use slab::Slab;
use std::sync::Arc;
use tokio::sync::Notify;

use super::mutation::{MutationRecord, Observer, WatcherConfig};
use super::node::{ElementData, Node, NodeData, NodeId};
use super::selector::SelectorList;
use super::{parser, serializer};
use crate::errors::MarkupError;

/// Document shared between the engine and outside actors.
///
/// The lock is never held across an await point.
pub type SharedDocument = Arc<Mutex<Document>>;

/// An arena-backed element/text tree with an `html > (head, body)` skeleton.
#[derive(Debug)]
pub struct Document {
    nodes: Slab<Node>,
    next_generation: u64,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    observer: Option<Observer>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty `html > (head, body)` document
    pub fn new() -> Self {
        let placeholder = NodeId::new(0, 0);
        let mut doc = Self {
            nodes: Slab::new(),
            next_generation: 1,
            root: placeholder,
            head: placeholder,
            body: placeholder,
            observer: None,
        };
        let root = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(root, head);
        doc.append_child(root, body);
        doc.root = root;
        doc.head = head;
        doc.body = body;
        doc
    }

    /// Create a document whose body holds `markup`, parsed the way a browser
    /// parses `body.innerHTML`
    pub fn from_body_markup(markup: &str) -> Self {
        let mut doc = Self::new();
        let body = doc.body;
        let parsed = parser::parse_fragment(&mut doc, markup);
        if !parsed.errors.is_empty() {
            debug!("Recovered from {} markup errors in body content", parsed.errors.len());
        }
        for node in parsed.nodes {
            doc.append_child(body, node);
        }
        doc
    }

    /// Create a document from a complete HTML page
    pub fn from_html(markup: &str) -> Self {
        let mut doc = Self::new();
        let parsed = parser::parse_document(&mut doc, markup);
        if !parsed.errors.is_empty() {
            debug!("Recovered from {} markup errors in page", parsed.errors.len());
        }

        let html = parsed
            .nodes
            .iter()
            .copied()
            .find(|id| doc.node(*id).is_some_and(|node| node.has_tag("html")));
        let child_with_tag = |doc: &Document, tag: &str| {
            html.and_then(|html| {
                doc.children(html)
                    .iter()
                    .copied()
                    .find(|id| doc.node(*id).is_some_and(|node| node.has_tag(tag)))
            })
        };
        let head = child_with_tag(&doc, "head");
        let body = child_with_tag(&doc, "body");

        if let (Some(html), Some(head), Some(body)) = (html, head, body) {
            let skeleton = doc.root;
            doc.root = html;
            doc.head = head;
            doc.body = body;
            doc.discard(skeleton);
        }
        for node in parsed.nodes {
            if node != doc.root {
                doc.discard(node);
            }
        }
        doc
    }

    /// Wrap the document for sharing with the engine
    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).filter(|node| node.id == id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).filter(|node| node.id == id)
    }

    fn insert_node(&mut self, data: NodeData) -> NodeId {
        let entry = self.nodes.vacant_entry();
        let id = NodeId::new(entry.key(), self.next_generation);
        self.next_generation += 1;
        entry.insert(Node::new(id, data));
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.insert_node(NodeData::Element(ElementData::new(tag_name)))
    }

    /// Create a detached element with a class attribute
    pub fn create_element_with_class(&mut self, tag_name: &str, class: &str) -> NodeId {
        let mut element = ElementData::new(tag_name);
        element.set_attribute("class", class);
        self.insert_node(NodeData::Element(element))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.insert_node(NodeData::Text(text.to_string()))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.insert_node(NodeData::Comment(text.to_string()))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Sibling immediately before `id`
    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|sibling| *sibling == id)?;
        index.checked_sub(1).map(|previous| siblings[previous])
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::tag_name)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::text)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .and_then(Node::element)
            .and_then(|element| element.attribute(name))
    }

    /// Whether the node can be reached from the document root
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return self.node(node_id).is_some();
            }
            current = self.parent(node_id);
        }
        false
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.parent(id);
        while let Some(node_id) = current {
            ancestors.push(node_id);
            current = self.parent(node_id);
        }
        ancestors
    }

    /// Pre-order traversal of `root` and everything below it
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.node(root).is_none() {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of every text node under `id`
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|node_id| self.text(node_id))
            .collect()
    }

    /// First element matching `selector`, searching from the root inclusive
    pub fn query_selector(&self, selector: &str) -> Option<NodeId> {
        let selectors = SelectorList::parse(selector)?;
        self.descendants(self.root)
            .into_iter()
            .find(|id| self.node(*id).is_some_and(|node| selectors.matches(node)))
    }

    /// Every element strictly below `scope` matching `selector`, in document order
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selectors) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        self.descendants(scope)
            .into_iter()
            .skip(1)
            .filter(|id| self.node(*id).is_some_and(|node| selectors.matches(node)))
            .collect()
    }

    fn detach_silently(&mut self, child: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(child)?;
        let index = self.children(parent).iter().position(|id| *id == child)?;
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.remove(index);
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = None;
        }
        Some((parent, index))
    }

    /// Remove `child` from its current parent, if any
    pub fn remove(&mut self, child: NodeId) -> bool {
        match self.detach_silently(child) {
            Some((parent, _)) => {
                self.record(MutationRecord::child_list(parent, Vec::new(), vec![child]));
                true
            }
            None => false,
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference` (or at the end when `None`)
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) -> bool {
        if parent == child
            || self.node(child).is_none()
            || !self.node(parent).is_some_and(Node::is_element)
            || self.is_inclusive_ancestor(child, parent)
        {
            return false;
        }
        self.remove(child);
        let index = match reference {
            Some(reference) => match self.children(parent).iter().position(|id| *id == reference) {
                Some(index) => index,
                None => return false,
            },
            None => self.children(parent).len(),
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.insert(index, child);
        }
        if let Some(child_node) = self.node_mut(child) {
            child_node.parent = Some(parent);
        }
        self.record(MutationRecord::child_list(parent, vec![child], Vec::new()));
        true
    }

    /// Replace `node` with `replacements`, in order, as a single child-list change
    pub fn replace_with(&mut self, node: NodeId, replacements: Vec<NodeId>) -> bool {
        let Some(parent) = self.parent(node) else {
            return false;
        };
        let replacements: Vec<NodeId> = replacements
            .into_iter()
            .filter(|id| *id != node && self.node(*id).is_some() && !self.is_inclusive_ancestor(*id, parent))
            .collect();
        for id in &replacements {
            self.remove(*id);
        }
        let Some((parent, index)) = self.detach_silently(node) else {
            return false;
        };
        for id in &replacements {
            if let Some(child) = self.node_mut(*id) {
                child.parent = Some(parent);
            }
        }
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node
                .children
                .splice(index..index, replacements.iter().copied());
        }
        self.record(MutationRecord::child_list(parent, replacements, vec![node]));
        true
    }

    /// Change the data of a text node
    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.node_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Text(data)) => {
                *data = text.to_string();
                self.record(MutationRecord::character_data(id));
                true
            }
            _ => false,
        }
    }

    /// Append `text` to an existing text node; `false` when `id` is not one
    pub fn append_text(&mut self, id: NodeId, text: &str) -> bool {
        match self.text(id) {
            Some(existing) => {
                let merged = format!("{}{}", existing, text);
                self.set_text(id, &merged)
            }
            None => false,
        }
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        match self.node_mut(id).and_then(Node::element_mut) {
            Some(element) => {
                element.set_attribute(name, value);
                self.record(MutationRecord::attributes(id, name));
                true
            }
            None => false,
        }
    }

    /// Merge adjacent text nodes and drop empty ones below `root`
    pub fn normalize(&mut self, root: NodeId) {
        let elements: Vec<NodeId> = self
            .descendants(root)
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(Node::is_element))
            .collect();

        for element in elements {
            let children = self.children(element).to_vec();
            let mut survivor: Option<(NodeId, String)> = None;
            let mut dropped = Vec::new();

            for child in children {
                match self.text(child).map(str::to_string) {
                    Some(text) if text.is_empty() => dropped.push(child),
                    Some(text) => match survivor.as_mut() {
                        Some((_, merged)) => {
                            merged.push_str(&text);
                            dropped.push(child);
                        }
                        None => survivor = Some((child, text)),
                    },
                    None => {
                        self.flush_merged(survivor.take());
                    }
                }
            }
            self.flush_merged(survivor.take());
            for child in dropped {
                self.remove(child);
                self.discard(child);
            }
        }
    }

    fn flush_merged(&mut self, survivor: Option<(NodeId, String)>) {
        if let Some((id, merged)) = survivor {
            if self.text(id) != Some(merged.as_str()) {
                self.set_text(id, &merged);
            }
        }
    }

    /// Free the storage of a detached subtree; its ids stop resolving
    pub fn discard(&mut self, id: NodeId) {
        if self.parent(id).is_some() || id == self.root {
            return;
        }
        for node_id in self.descendants(id) {
            if self.node(node_id).is_some() {
                self.nodes.try_remove(node_id.index());
            }
        }
    }

    /// Number of nodes currently stored
    pub fn live_node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Slots the arena has allocated, live or free
    pub fn allocated_slots(&self) -> usize {
        self.nodes.capacity()
    }

    /// Parse conversion output into detached nodes owned by this document.
    ///
    /// Markup the parser had to repair is rejected and nothing is kept.
    pub fn parse_fragment(&mut self, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        let parsed = parser::parse_fragment(self, markup);
        match parsed.errors.first() {
            None => Ok(parsed.nodes),
            Some(first) => {
                let error = MarkupError::Rejected {
                    errors: parsed.errors.len(),
                    first: first.to_string(),
                };
                for node in parsed.nodes {
                    self.discard(node);
                }
                Err(error)
            }
        }
    }

    /// Serialize `id` including its own tag
    pub fn outer_html(&self, id: NodeId) -> String {
        serializer::outer_html(self, id)
    }

    /// Serialize the children of `id`
    pub fn inner_html(&self, id: NodeId) -> String {
        serializer::inner_html(self, id)
    }

    /// Start recording mutations under `target`, replacing any earlier registration
    pub fn observe(&mut self, target: NodeId, config: WatcherConfig, waker: Option<Arc<Notify>>) {
        trace!("Observing {} with {:?}", target, config);
        self.observer = Some(Observer::new(target, config, waker));
    }

    /// Stop recording; pending records are dropped
    pub fn disconnect(&mut self) {
        self.observer = None;
    }

    /// Currently observed target, if any
    pub fn observed_target(&self) -> Option<NodeId> {
        self.observer.as_ref().map(|observer| observer.target)
    }

    /// Drain the records collected so far
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        self.observer
            .as_mut()
            .map(|observer| std::mem::take(&mut observer.records))
            .unwrap_or_default()
    }

    /// Run `f` with mutation recording suspended.
    ///
    /// All engine-originated mutations go through here so the watcher never
    /// sees its own output.
    pub fn unobserved<R>(&mut self, f: impl FnOnce(&mut Document) -> R) -> R {
        let observer = self.observer.take();
        let result = f(self);
        if self.observer.is_none() {
            self.observer = observer;
        }
        result
    }

    fn record(&mut self, record: MutationRecord) {
        let Some(observer) = self.observer.as_ref() else {
            return;
        };
        if !observer.config.accepts(&record.kind) {
            return;
        }
        let in_scope = record.target == observer.target
            || (observer.config.subtree && self.is_inclusive_ancestor(observer.target, record.target));
        if in_scope {
            if let Some(observer) = self.observer.as_mut() {
                observer.push(record);
            }
        }
    }
}
