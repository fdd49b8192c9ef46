/*!
 * Conversion service implementations.
 *
 * A conversion service turns raw text plus formatting options into ready-to-insert
 * annotated markup following the contract in `annotation::markup`:
 * - `reading_table`: renders the markup from a character to reading table
 * - `mock`: scripted behaviors for tests
 * - `tone`: tone representation helpers shared by the implementations
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::errors::ConversionError;
use crate::preferences::ToneType;

pub mod mock;
pub mod reading_table;
pub mod tone;

pub use reading_table::ReadingTableConverter;

/// Formatting options sent with each conversion request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Wrap non-qualifying characters in plain elements (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrap_non_qualifying: Option<bool>,

    #[serde(rename = "toneRepresentation", skip_serializing_if = "Option::is_none")]
    pub tone_type: Option<ToneType>,

    /// Dictionary URL template with a `{word}` placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary_link_template: Option<String>,
}

/// One conversion request: the full text of a single text node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub text: String,
    pub options: ConversionOptions,
}

impl ConversionRequest {
    pub fn new(text: &str, options: &ConversionOptions) -> Self {
        Self {
            text: text.to_string(),
            options: options.clone(),
        }
    }
}

/// Markup fragment returned by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub markup: String,
}

/// Common trait for conversion services
///
/// Implementations must be usable behind `Arc<dyn ConversionService>` so the
/// engine can swap them without knowing the concrete type.
#[async_trait]
pub trait ConversionService: Send + Sync + Debug {
    /// Convert a text run to annotated markup
    ///
    /// # Arguments
    /// * `request` - The text and formatting options
    ///
    /// # Returns
    /// * `Result<ConversionResponse, ConversionError>` - The markup or a transport/service error
    async fn convert(&self, request: ConversionRequest) -> Result<ConversionResponse, ConversionError>;
}
