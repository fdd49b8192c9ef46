/*!
 * Common test utilities for the pinyin-annotator test suite
 */

use std::sync::Arc;

use pinyin_annotator::annotation::AnnotationContext;
use pinyin_annotator::app_config::EngineConfig;
use pinyin_annotator::document::{Document, NodeId, SharedDocument};
use pinyin_annotator::preferences::{MemoryPreferenceStore, PreferenceStore};
use pinyin_annotator::providers::ConversionService;
use pinyin_annotator::providers::mock::MockConverter;
use pinyin_annotator::ReadingTableConverter;

// Re-export the mock stores module
pub mod mock_stores;

/// Route library logs to the test output when RUST_LOG is set
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Readings for every character used in the tests
pub fn reading_table() -> ReadingTableConverter {
    ReadingTableConverter::from_pairs([
        ('漢', "hàn"),
        ('汉', "hàn"),
        ('字', "zì"),
        ('中', "zhōng"),
        ('文', "wén"),
        ('你', "nǐ"),
        ('好', "hǎo"),
        ('的', "de"),
        ('绿', "lǜ"),
    ])
}

pub fn working_converter() -> MockConverter {
    MockConverter::working(reading_table())
}

/// A shared document whose body holds `markup`
pub fn shared_document(markup: &str) -> SharedDocument {
    Document::from_body_markup(markup)
        .into_shared()
}

/// Engine context over `doc` with default configuration and a memory store
pub fn context_for(doc: &SharedDocument, converter: &MockConverter) -> AnnotationContext {
    context_with_store(doc, converter, Arc::new(MemoryPreferenceStore::new()))
}

pub fn context_with_store(
    doc: &SharedDocument,
    converter: &MockConverter,
    store: Arc<dyn PreferenceStore>,
) -> AnnotationContext {
    let converter: Arc<dyn ConversionService> = Arc::new(converter.clone());
    AnnotationContext::new(doc.clone(), converter, store, &EngineConfig::default())
}

/// Text content of the body
pub fn body_text(doc: &SharedDocument) -> String {
    let doc = doc.lock();
    doc.text_content(doc.body())
}

pub fn body_html(doc: &SharedDocument) -> String {
    let doc = doc.lock();
    doc.inner_html(doc.body())
}

/// First element matching `selector`
pub fn select(doc: &SharedDocument, selector: &str) -> NodeId {
    doc.lock()
        .query_selector(selector)
        .unwrap_or_else(|| panic!("nothing matches {}", selector))
}

/// Number of qualifying characters in `text`
pub fn qualifying_count(text: &str) -> usize {
    text.chars()
        .filter(|c| pinyin_annotator::annotation::markup::is_qualifying_char(*c))
        .count()
}
