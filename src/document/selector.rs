/*!
 * Simple selectors: `tag`, `.class`, `#id`, compounds such as `pya.py-result-item`,
 * and comma-separated lists of those. Combinators are not supported.
 */

use super::node::Node;

/// One compound selector such as `pya.py-result-item`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl CompoundSelector {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return None;
        }

        let mut selector = Self::default();
        let mut rest = input;
        let tag_end = rest.find(['.', '#']).unwrap_or(rest.len());
        let tag = &rest[..tag_end];
        if !tag.is_empty() && tag != "*" {
            selector.tag = Some(tag.to_ascii_uppercase());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['.', '#']).unwrap_or(body.len());
            let name = &body[..end];
            if name.is_empty() {
                return None;
            }
            match marker {
                '.' => selector.classes.push(name.to_string()),
                '#' => selector.id = Some(name.to_string()),
                _ => return None,
            }
            rest = &body[end..];
        }
        Some(selector)
    }

    pub fn matches(&self, node: &Node) -> bool {
        let Some(element) = node.element() else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|class| element.has_class(class))
    }
}

/// A comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<CompoundSelector>);

impl SelectorList {
    /// Parse a selector list; `None` when any part is unsupported
    pub fn parse(input: &str) -> Option<Self> {
        let selectors = input
            .split(',')
            .map(CompoundSelector::parse)
            .collect::<Option<Vec<_>>>()?;
        if selectors.is_empty() {
            None
        } else {
            Some(Self(selectors))
        }
    }

    pub fn matches(&self, node: &Node) -> bool {
        self.0.iter().any(|selector| selector.matches(node))
    }
}
