/*!
 * Style elements the engine owns in the document head.
 */

use crate::document::{Document, NodeId};
use crate::preferences::ReadingPosition;

/// The single style element controlling where readings are drawn
#[derive(Debug, Clone, Default)]
pub struct StyleDirective {
    node: Option<NodeId>,
}

impl StyleDirective {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn css_for(position: ReadingPosition) -> String {
        format!("ruby {{ ruby-position: {}; }}", position.as_css())
    }

    /// Create the style element on first use, then rewrite its text
    pub fn apply(&mut self, doc: &mut Document, position: ReadingPosition) {
        let css = Self::css_for(position);
        doc.unobserved(|doc| {
            let text = match self.node.filter(|id| doc.is_connected(*id)) {
                Some(style) => doc.children(style).first().copied(),
                None => {
                    let style = inject_style(doc, "");
                    self.node = Some(style);
                    doc.children(style).first().copied()
                }
            };
            if let Some(text) = text {
                doc.set_text(text, &css);
            }
        });
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }
}

/// Append a `<style>` element holding `css` to the head
pub fn inject_style(doc: &mut Document, css: &str) -> NodeId {
    doc.unobserved(|doc| {
        let style = doc.create_element("style");
        let text = doc.create_text(css);
        doc.append_child(style, text);
        let head = doc.head();
        doc.append_child(head, style);
        style
    })
}
