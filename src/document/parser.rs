/*!
 * Markup parsing through html5ever's tree builder.
 *
 * `ArenaSink` implements html5ever's `TreeSink` directly over the document
 * arena, using plain [`NodeId`]s as handles. Everything the tree builder creates
 * starts out detached; whatever is left over once the parse finishes (the
 * scratch document node, the fragment context element) is discarded again.
 */

use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::{ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute as HtmlAttribute, LocalName, Namespace, ParseOpts, QualName};
use log::trace;
use once_cell::sync::Lazy;
use std::borrow::Cow;
use std::cell::{Ref, RefCell};
use std::collections::HashMap;

use super::{Document, NodeId};

pub(crate) const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Tag of the scratch node standing in for the html5ever document
const SCRATCH_TAG: &str = "#document";

static UNKNOWN_ELEMENT: Lazy<QualName> = Lazy::new(|| html_name("unknown"));

/// Qualified name of an HTML element
pub(crate) fn html_name(local: &str) -> QualName {
    QualName::new(
        None,
        Namespace::from(HTML_NAMESPACE),
        LocalName::from(local.to_ascii_lowercase()),
    )
}

/// Qualified name of an attribute stored as `prefix:local` or `local`
pub(crate) fn attribute_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name))
}

fn stored_attribute_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{}:{}", prefix, name.local),
        None => name.local.to_string(),
    }
}

/// What a parse produced: detached top-level nodes plus the errors the tree
/// builder recovered from
#[derive(Debug, Default)]
pub struct ParsedMarkup {
    pub nodes: Vec<NodeId>,
    pub errors: Vec<Cow<'static, str>>,
}

struct ArenaSink<'doc> {
    doc: RefCell<&'doc mut Document>,
    document: NodeId,
    created: RefCell<Vec<NodeId>>,
    names: RefCell<HashMap<NodeId, QualName>>,
    errors: RefCell<Vec<Cow<'static, str>>>,
}

impl<'doc> ArenaSink<'doc> {
    fn new(doc: &'doc mut Document) -> Self {
        let document = doc.create_element(SCRATCH_TAG);
        Self {
            doc: RefCell::new(doc),
            document,
            created: RefCell::new(Vec::new()),
            names: RefCell::new(HashMap::new()),
            errors: RefCell::new(Vec::new()),
        }
    }

    fn track(&self, id: NodeId) -> NodeId {
        self.created.borrow_mut().push(id);
        id
    }
}

impl TreeSink for ArenaSink<'_> {
    type Handle = NodeId;
    type Output = ParsedMarkup;

    type ElemName<'a>
        = Ref<'a, QualName>
    where
        Self: 'a;

    fn finish(self) -> ParsedMarkup {
        let doc = self.doc.into_inner();
        let nodes = doc.children(self.document).to_vec();
        for node in &nodes {
            doc.remove(*node);
        }
        doc.discard(self.document);
        for id in self.created.into_inner() {
            if doc.parent(id).is_none() && !nodes.contains(&id) {
                doc.discard(id);
            }
        }
        ParsedMarkup {
            nodes,
            errors: self.errors.into_inner(),
        }
    }

    fn parse_error(&self, msg: Cow<'static, str>) {
        trace!("Markup parse error: {}", msg);
        self.errors.borrow_mut().push(msg);
    }

    fn get_document(&self) -> NodeId {
        self.document
    }

    fn elem_name<'a>(&'a self, target: &'a NodeId) -> Ref<'a, QualName> {
        Ref::map(self.names.borrow(), |names| {
            names.get(target).unwrap_or(&*UNKNOWN_ELEMENT)
        })
    }

    fn create_element(&self, name: QualName, attrs: Vec<HtmlAttribute>, _flags: ElementFlags) -> NodeId {
        let id = {
            let mut doc = self.doc.borrow_mut();
            let id = doc.create_element(&name.local);
            for attr in attrs {
                doc.set_attribute(id, &stored_attribute_name(&attr.name), &attr.value);
            }
            id
        };
        self.names.borrow_mut().insert(id, name);
        self.track(id)
    }

    fn create_comment(&self, text: StrTendril) -> NodeId {
        let id = self.doc.borrow_mut().create_comment(&text);
        self.track(id)
    }

    fn create_pi(&self, _target: StrTendril, data: StrTendril) -> NodeId {
        let id = self.doc.borrow_mut().create_comment(&data);
        self.track(id)
    }

    fn append(&self, parent: &NodeId, child: NodeOrText<NodeId>) {
        let mut doc = self.doc.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => {
                doc.append_child(*parent, node);
            }
            NodeOrText::AppendText(text) => {
                let last = doc.children(*parent).last().copied();
                if !last.is_some_and(|id| doc.append_text(id, &text)) {
                    let node = doc.create_text(&text);
                    doc.append_child(*parent, node);
                }
            }
        }
    }

    fn append_before_sibling(&self, sibling: &NodeId, new_node: NodeOrText<NodeId>) {
        let mut doc = self.doc.borrow_mut();
        let Some(parent) = doc.parent(*sibling) else {
            return;
        };
        match new_node {
            NodeOrText::AppendNode(node) => {
                doc.insert_before(parent, node, Some(*sibling));
            }
            NodeOrText::AppendText(text) => {
                let previous = doc.previous_sibling(*sibling);
                if !previous.is_some_and(|id| doc.append_text(id, &text)) {
                    let node = doc.create_text(&text);
                    doc.insert_before(parent, node, Some(*sibling));
                }
            }
        }
    }

    fn append_based_on_parent_node(&self, element: &NodeId, prev_element: &NodeId, child: NodeOrText<NodeId>) {
        let has_parent = self.doc.borrow().parent(*element).is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(&self, _name: StrTendril, _public_id: StrTendril, _system_id: StrTendril) {}

    fn get_template_contents(&self, target: &NodeId) -> NodeId {
        *target
    }

    fn same_node(&self, x: &NodeId, y: &NodeId) -> bool {
        x == y
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn add_attrs_if_missing(&self, target: &NodeId, attrs: Vec<HtmlAttribute>) {
        let mut doc = self.doc.borrow_mut();
        for attr in attrs {
            let name = stored_attribute_name(&attr.name);
            if doc.attribute(*target, &name).is_none() {
                doc.set_attribute(*target, &name, &attr.value);
            }
        }
    }

    fn remove_from_parent(&self, target: &NodeId) {
        self.doc.borrow_mut().remove(*target);
    }

    fn reparent_children(&self, node: &NodeId, new_parent: &NodeId) {
        let mut doc = self.doc.borrow_mut();
        for child in doc.children(*node).to_vec() {
            doc.append_child(*new_parent, child);
        }
    }
}

/// Parse `markup` as the content of a `<body>` into detached nodes owned by `doc`.
///
/// Returns the top-level nodes in source order.
pub fn parse_fragment(doc: &mut Document, markup: &str) -> ParsedMarkup {
    let parsed = html5ever::parse_fragment(ArenaSink::new(doc), ParseOpts::default(), html_name("body"), Vec::new())
        .one(markup);

    // Fragment content hangs off a synthetic <html> root
    let mut nodes = Vec::new();
    for root in &parsed.nodes {
        nodes.extend_from_slice(doc.children(*root));
    }
    for node in &nodes {
        doc.remove(*node);
    }
    for root in parsed.nodes {
        doc.discard(root);
    }
    ParsedMarkup {
        nodes,
        errors: parsed.errors,
    }
}

/// Parse a complete HTML document into detached nodes owned by `doc`.
///
/// The result holds the `<html>` element plus any top-level comments.
pub fn parse_document(doc: &mut Document, markup: &str) -> ParsedMarkup {
    html5ever::parse_document(ArenaSink::new(doc), ParseOpts::default()).one(markup)
}
