/*!
 * The annotated markup contract.
 *
 * A phonetic unit renders as
 *
 * ```text
 * <pya class="py-result-item" data-pya-is-annotated="true"><ruby><pya class="py-chinese-item">漢</pya><rp>(</rp><rt class="py-pinyin-item">hàn</rt><rp>)</rp></ruby></pya>
 * ```
 *
 * and a plain unit as `<pya class="py-non-chinese-item">A</pya>`. Markup is
 * written by the document serializer, so text is escaped and clearing restores
 * exactly the characters that were annotated.
 */

use html5ever::serialize::{Serialize, Serializer, TraversalScope};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;

use crate::document::parser::{attribute_name, html_name};
use crate::document::serializer::to_html;
use crate::document::{Document, NodeId};
use crate::preferences::dictionary::build_dictionary_link;

/// Sentinel tag reserved for engine output (lower-case, as written in markup)
pub const TAG_NAME: &str = "pya";
pub const RESULT_CLASS: &str = "py-result-item";
pub const CHINESE_CLASS: &str = "py-chinese-item";
pub const PINYIN_CLASS: &str = "py-pinyin-item";
pub const NON_CHINESE_CLASS: &str = "py-non-chinese-item";
pub const IS_ANNOTATED_ATTR: &str = "data-pya-is-annotated";

static QUALIFYING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{4e00}-\u{9fff}]").expect("static pattern"));

/// Whether `text` holds at least one CJK unified ideograph
pub fn contains_qualifying(text: &str) -> bool {
    QUALIFYING.is_match(text)
}

pub fn is_qualifying_char(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Selector for result elements
pub fn result_selector() -> String {
    format!("{}.{}", TAG_NAME, RESULT_CLASS)
}

/// Selector for plain elements
pub fn plain_selector() -> String {
    format!("{}.{}", TAG_NAME, NON_CHINESE_CLASS)
}

/// A run of original text, as rendered or read back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextUnit {
    /// One qualifying character with its reading
    Phonetic { character: char, reading: String },
    /// Text that carries no reading
    Plain { text: String },
}

impl TextUnit {
    pub fn phonetic(character: char, reading: &str) -> Self {
        Self::Phonetic {
            character,
            reading: reading.to_string(),
        }
    }

    pub fn plain(text: &str) -> Self {
        Self::Plain {
            text: text.to_string(),
        }
    }

    /// The original characters this unit stands for
    pub fn visible_text(&self) -> String {
        match self {
            Self::Phonetic { character, .. } => character.to_string(),
            Self::Plain { text } => text.clone(),
        }
    }
}

/// Render units into contract markup; plain units stay bare text unless `wrap_plain`
pub fn render_units(units: &[TextUnit], wrap_plain: bool) -> String {
    render_units_linked(units, wrap_plain, None)
}

/// Like [`render_units`], with each annotated character linked to a dictionary page
/// built from `link_template` when one is given.
pub fn render_units_linked(units: &[TextUnit], wrap_plain: bool, link_template: Option<&str>) -> String {
    let rendered = RenderedUnits {
        units,
        wrap_plain,
        link_template,
    };
    to_html(&rendered, TraversalScope::ChildrenOnly(None))
}

struct RenderedUnits<'a> {
    units: &'a [TextUnit],
    wrap_plain: bool,
    link_template: Option<&'a str>,
}

impl Serialize for RenderedUnits<'_> {
    fn serialize<S: Serializer>(&self, serializer: &mut S, _traversal_scope: TraversalScope) -> io::Result<()> {
        for unit in self.units {
            match unit {
                TextUnit::Phonetic { character, reading } => {
                    let character = character.to_string();
                    let link = self
                        .link_template
                        .map(|template| build_dictionary_link(template, &character));

                    start(serializer, TAG_NAME, &[("class", RESULT_CLASS), (IS_ANNOTATED_ATTR, "true")])?;
                    start(serializer, "ruby", &[])?;
                    start(serializer, TAG_NAME, &[("class", CHINESE_CLASS)])?;
                    match &link {
                        Some(href) => {
                            start(serializer, "a", &[("href", href.as_str()), ("target", "_blank")])?;
                            serializer.write_text(&character)?;
                            serializer.end_elem(html_name("a"))?;
                        }
                        None => serializer.write_text(&character)?,
                    }
                    serializer.end_elem(html_name(TAG_NAME))?;
                    text_element(serializer, "rp", &[], "(")?;
                    text_element(serializer, "rt", &[("class", PINYIN_CLASS)], reading)?;
                    text_element(serializer, "rp", &[], ")")?;
                    serializer.end_elem(html_name("ruby"))?;
                    serializer.end_elem(html_name(TAG_NAME))?;
                }
                TextUnit::Plain { text } if self.wrap_plain => {
                    text_element(serializer, TAG_NAME, &[("class", NON_CHINESE_CLASS)], text)?;
                }
                TextUnit::Plain { text } => serializer.write_text(text)?,
            }
        }
        Ok(())
    }
}

fn start<S: Serializer>(serializer: &mut S, tag: &str, attributes: &[(&str, &str)]) -> io::Result<()> {
    let names: Vec<_> = attributes.iter().map(|(name, _)| attribute_name(name)).collect();
    serializer.start_elem(
        html_name(tag),
        names.iter().zip(attributes).map(|(name, (_, value))| (name, *value)),
    )
}

fn text_element<S: Serializer>(
    serializer: &mut S,
    tag: &str,
    attributes: &[(&str, &str)],
    text: &str,
) -> io::Result<()> {
    start(serializer, tag, attributes)?;
    serializer.write_text(text)?;
    serializer.end_elem(html_name(tag))
}

/// Concatenate the visible text of `units`
pub fn visible_text(units: &[TextUnit]) -> String {
    units.iter().map(TextUnit::visible_text).collect()
}

/// Read the generated units under `root` back out of the tree, in tree order.
///
/// Bare text between generated elements is reported as plain units.
pub fn collect_units(doc: &Document, root: NodeId) -> Vec<TextUnit> {
    let mut units = Vec::new();
    let mut stack: Vec<NodeId> = doc.children(root).iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        let Some(node) = doc.node(id) else {
            continue;
        };
        if let Some(text) = node.text() {
            if !text.is_empty() {
                units.push(TextUnit::plain(text));
            }
            continue;
        }
        if node.has_tag(TAG_NAME) && node.has_class(RESULT_CLASS) {
            let character = original_text(doc, id);
            let reading = doc
                .query_selector_all(id, "rt")
                .first()
                .map(|rt| doc.text_content(*rt))
                .unwrap_or_default();
            let mut chars = character.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => units.push(TextUnit::Phonetic {
                    character: c,
                    reading,
                }),
                _ => units.push(TextUnit::plain(&character)),
            }
            continue;
        }
        if node.has_tag(TAG_NAME) && node.has_class(NON_CHINESE_CLASS) {
            units.push(TextUnit::plain(&doc.text_content(id)));
            continue;
        }
        stack.extend(doc.children(id).iter().rev().copied());
    }

    units
}

/// The original characters a result element replaced.
///
/// Prefers the character element; falls back to the element's text without the
/// reading and its fallback parentheses.
pub fn original_text(doc: &Document, result: NodeId) -> String {
    let chinese = format!("{}.{}", TAG_NAME, CHINESE_CLASS);
    if let Some(id) = doc.query_selector_all(result, &chinese).first() {
        return doc.text_content(*id);
    }
    doc.descendants(result)
        .into_iter()
        .filter(|id| {
            !doc.ancestors(*id)
                .iter()
                .take_while(|ancestor| **ancestor != result)
                .any(|ancestor| {
                    doc.tag_name(*ancestor)
                        .is_some_and(|tag| tag.eq_ignore_ascii_case("rt") || tag.eq_ignore_ascii_case("rp"))
                })
        })
        .filter_map(|id| doc.text(id))
        .collect()
}
