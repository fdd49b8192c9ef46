/*!
 * Applying and clearing annotations.
 *
 * Apply converts one text node at a time, in document order, awaiting each
 * conversion before issuing the next, so at most one request is in flight and
 * the resulting tree keeps the original left-to-right order. The document lock
 * is only taken between awaits. Every tree change made here runs through
 * `Document::unobserved`.
 */

use log::{debug, warn};
use std::sync::Arc;

use super::markup::{self, TAG_NAME};
use super::scanner::TextScanner;
use crate::document::{Document, NodeId, SharedDocument};
use crate::providers::{ConversionOptions, ConversionRequest, ConversionService};

/// Outcome counters for one Apply pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Text nodes found by the scan
    pub scanned: usize,
    /// Nodes replaced by annotated markup
    pub converted: usize,
    /// Nodes detached or changed before their response arrived
    pub skipped: usize,
    /// Nodes whose conversion or markup failed
    pub failed: usize,
}

impl ApplyReport {
    pub fn merge(&mut self, other: ApplyReport) {
        self.scanned += other.scanned;
        self.converted += other.converted;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Converts text nodes through a conversion service and splices in the result
#[derive(Debug, Clone)]
pub struct Applier {
    converter: Arc<dyn ConversionService>,
    wrap_output: bool,
}

impl Applier {
    /// `wrap_output` keeps each node's converted fragment inside one extra sentinel element
    pub fn new(converter: Arc<dyn ConversionService>, wrap_output: bool) -> Self {
        Self {
            converter,
            wrap_output,
        }
    }

    /// Annotate every qualifying text node under `root`.
    ///
    /// Nodes that are detached (or whose text changed) before their response
    /// lands are skipped silently; a failed conversion only affects its own node.
    ///
    /// The watcher is disconnected for the whole Annotate pass, so a node whose
    /// text changes mid-pass is not re-queued. It stays plain until the next
    /// Annotate.
    pub async fn apply(
        &self,
        doc: &SharedDocument,
        scanner: &TextScanner,
        root: Option<NodeId>,
        options: &ConversionOptions,
    ) -> ApplyReport {
        let nodes = scanner.scan(&doc.lock(), root);
        let mut report = ApplyReport {
            scanned: nodes.len(),
            ..Default::default()
        };

        for node in nodes {
            let text = {
                let doc = doc.lock();
                if !doc.is_connected(node) {
                    report.skipped += 1;
                    continue;
                }
                match doc.text(node) {
                    Some(text) => text.to_string(),
                    None => {
                        report.skipped += 1;
                        continue;
                    }
                }
            };

            let response = match self.converter.convert(ConversionRequest::new(&text, options)).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Conversion failed for text node {}: {}", node, e);
                    report.failed += 1;
                    continue;
                }
            };

            let mut doc = doc.lock();
            if !doc.is_connected(node) || doc.text(node) != Some(text.as_str()) {
                debug!("Text node {} changed before its conversion landed, skipping", node);
                report.skipped += 1;
                continue;
            }

            let wrap = self.wrap_output;
            let spliced = doc.unobserved(|doc| {
                let fragment = doc.parse_fragment(&response.markup)?;
                splice(doc, node, fragment, wrap);
                Ok::<_, crate::errors::MarkupError>(())
            });
            match spliced {
                Ok(()) => report.converted += 1,
                Err(e) => {
                    warn!("Discarding unusable markup for text node {}: {}", node, e);
                    report.failed += 1;
                }
            }
        }

        debug!(
            "Apply pass done: {} scanned, {} converted, {} skipped, {} failed",
            report.scanned, report.converted, report.skipped, report.failed
        );
        report
    }
}

/// Replace `node` with the fragment's top-level nodes, or one sentinel wrapper around them
fn splice(doc: &mut Document, node: NodeId, fragment: Vec<NodeId>, wrap: bool) {
    let replacements = if wrap {
        let wrapper = doc.create_element(TAG_NAME);
        for child in fragment {
            doc.append_child(wrapper, child);
        }
        vec![wrapper]
    } else {
        fragment
    };
    if doc.replace_with(node, replacements) {
        doc.discard(node);
    }
}

/// Remove every annotation under `root`, restoring the original text exactly.
///
/// Returns the number of generated elements removed.
pub fn clear(doc: &mut Document, root: NodeId) -> usize {
    doc.unobserved(|doc| {
        let mut removed = 0;

        for result in doc.query_selector_all(root, &markup::result_selector()) {
            if !doc.is_inclusive_ancestor(root, result) {
                continue;
            }
            let text = markup::original_text(doc, result);
            if replace_with_text(doc, result, &text) {
                removed += 1;
            }
        }

        for plain in doc.query_selector_all(root, &markup::plain_selector()) {
            if !doc.is_inclusive_ancestor(root, plain) {
                continue;
            }
            let text = doc.text_content(plain);
            if replace_with_text(doc, plain, &text) {
                removed += 1;
            }
        }

        // Bare wrappers left by wrapped output
        for wrapper in doc.query_selector_all(root, TAG_NAME) {
            let Some(parent) = doc.parent(wrapper) else {
                continue;
            };
            if !doc.is_inclusive_ancestor(root, wrapper) {
                continue;
            }
            let children = doc.children(wrapper).to_vec();
            if doc.replace_with(wrapper, children) {
                doc.discard(wrapper);
                doc.normalize(parent);
                removed += 1;
            }
        }

        removed
    })
}

fn replace_with_text(doc: &mut Document, element: NodeId, text: &str) -> bool {
    let Some(parent) = doc.parent(element) else {
        return false;
    };
    let replacement = doc.create_text(text);
    if !doc.replace_with(element, vec![replacement]) {
        doc.discard(replacement);
        return false;
    }
    doc.discard(element);
    doc.normalize(parent);
    true
}

/// Whether any sentinel element exists under `root`
pub fn is_annotated(doc: &Document, root: NodeId) -> bool {
    !doc.query_selector_all(root, TAG_NAME).is_empty()
}
