/*!
 * Text discovery.
 *
 * Finds the text nodes under a root that still need annotating, in document
 * order. Subtrees rooted at an ignored tag are skipped entirely, and the sentinel
 * tag is always ignored, so engine output is never picked up again.
 */

use std::collections::HashSet;

use super::markup::{TAG_NAME, contains_qualifying};
use crate::document::{Document, NodeId};

/// Built-in ignored tags, used when the configured list is empty
pub const DEFAULT_IGNORED_TAGS: &[&str] = &[
    "PYA", "RP", "RT", "RUBY", "SCRIPT", "STYLE", "CODE", "PRE", "KBD", "INPUT", "TEXTAREA",
];

/// The effective set of ignored tag names (upper-case)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredTags(HashSet<String>);

impl Default for IgnoredTags {
    fn default() -> Self {
        Self::from_configured(&[])
    }
}

impl IgnoredTags {
    /// Configured tags plus the sentinel, or the default list when nothing is configured
    pub fn from_configured(configured: &[String]) -> Self {
        let mut tags: HashSet<String> = if configured.is_empty() {
            DEFAULT_IGNORED_TAGS.iter().map(|tag| tag.to_string()).collect()
        } else {
            configured.iter().map(|tag| tag.trim().to_ascii_uppercase()).collect()
        };
        tags.insert(TAG_NAME.to_ascii_uppercase());
        Self(tags)
    }

    pub fn contains(&self, tag_name: &str) -> bool {
        self.0.contains(&tag_name.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn is_ignored_node(&self, doc: &Document, id: NodeId) -> bool {
        doc.tag_name(id).is_some_and(|tag| self.contains(tag))
    }
}

/// Pre-order scanner for qualifying text nodes
#[derive(Debug, Clone, Default)]
pub struct TextScanner {
    ignored: IgnoredTags,
}

impl TextScanner {
    pub fn new(ignored: IgnoredTags) -> Self {
        Self { ignored }
    }

    pub fn ignored(&self) -> &IgnoredTags {
        &self.ignored
    }

    /// Snapshot of the qualifying text nodes under `root`, in document order.
    ///
    /// `root` itself may be a text node. Nothing is returned when `root` is
    /// missing or sits inside an ignored subtree.
    pub fn scan(&self, doc: &Document, root: Option<NodeId>) -> Vec<NodeId> {
        let Some(root) = root.filter(|id| doc.node(*id).is_some()) else {
            return Vec::new();
        };
        if self.is_ignored_node_or_ancestor(doc, root) {
            return Vec::new();
        }

        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(text) = doc.text(id) {
                if contains_qualifying(text) {
                    found.push(id);
                }
                continue;
            }
            if id != root && self.ignored.is_ignored_node(doc, id) {
                continue;
            }
            stack.extend(doc.children(id).iter().rev().copied());
        }
        found
    }

    fn is_ignored_node_or_ancestor(&self, doc: &Document, id: NodeId) -> bool {
        self.ignored.is_ignored_node(doc, id)
            || doc
                .ancestors(id)
                .into_iter()
                .any(|ancestor| self.ignored.is_ignored_node(doc, ancestor))
    }
}
