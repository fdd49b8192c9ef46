/*!
 * Conversion service backed by a character to reading table.
 *
 * The table is supplied by the caller (typically exported from a pinyin
 * library); this converter only segments the text and renders the markup.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::trace;
use std::collections::HashMap;
use std::path::Path;

use super::tone::render_reading;
use super::{ConversionRequest, ConversionResponse, ConversionService};
use crate::annotation::markup::{TextUnit, is_qualifying_char, render_units_linked};
use crate::errors::ConversionError;
use crate::preferences::ToneType;

/// Renders contract markup from tone-marked readings
#[derive(Debug, Clone, Default)]
pub struct ReadingTableConverter {
    readings: HashMap<char, String>,
}

impl ReadingTableConverter {
    pub fn new(readings: HashMap<char, String>) -> Self {
        Self { readings }
    }

    /// Build from `(character, reading)` pairs
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (char, &'a str)>) -> Self {
        Self {
            readings: pairs
                .into_iter()
                .map(|(c, reading)| (c, reading.to_string()))
                .collect(),
        }
    }

    /// Load a JSON object mapping single characters to readings
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read readings file: {:?}", path))?;
        Self::from_json_str(&content)
            .with_context(|| format!("Failed to parse readings file: {:?}", path))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: HashMap<String, String> = serde_json::from_str(content)?;
        let mut readings = HashMap::with_capacity(raw.len());
        for (key, reading) in raw {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => {
                    readings.insert(c, reading);
                }
                _ => anyhow::bail!("Reading keys must be single characters, got '{}'", key),
            }
        }
        Ok(Self { readings })
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Segment `text` into one unit per character
    pub fn segment(&self, text: &str, tone: ToneType) -> Vec<TextUnit> {
        text.chars()
            .map(|c| match self.readings.get(&c) {
                Some(reading) if is_qualifying_char(c) => {
                    TextUnit::phonetic(c, &render_reading(reading, tone))
                }
                _ => TextUnit::plain(&c.to_string()),
            })
            .collect()
    }
}

#[async_trait]
impl ConversionService for ReadingTableConverter {
    async fn convert(&self, request: ConversionRequest) -> Result<ConversionResponse, ConversionError> {
        let tone = request.options.tone_type.unwrap_or_default();
        let wrap = request.options.wrap_non_qualifying.unwrap_or(true);
        let units = self.segment(&request.text, tone);
        trace!("Converted {} characters into {} units", request.text.chars().count(), units.len());
        Ok(ConversionResponse {
            markup: render_units_linked(&units, wrap, request.options.dictionary_link_template.as_deref()),
        })
    }
}
