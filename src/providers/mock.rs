/*!
 * Mock conversion service for testing.
 *
 * This module provides a mock converter that simulates different behaviors:
 * - `MockConverter::working(..)` - Always succeeds using a reading table
 * - `MockConverter::failing()` - Always fails with an error
 * - `MockConverter::malformed()` - Returns markup that cannot be parsed
 *
 * Every request is counted and recorded, and an optional hook runs before the
 * response is produced so tests can mutate the document mid-flight.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ConversionRequest, ConversionResponse, ConversionService, ReadingTableConverter};
use crate::errors::ConversionError;

/// Behavior mode for the mock converter
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with contract markup
    Working,
    /// Fails for requests whose text contains the given character
    FailOn(char),
    /// Always fails
    Failing,
    /// Returns markup with an unterminated tag
    Malformed,
    /// Succeeds after a delay
    Slow { delay_ms: u64 },
}

type RequestHook = Arc<dyn Fn(&ConversionRequest) + Send + Sync>;

/// Mock converter for testing engine behavior
#[derive(Clone)]
pub struct MockConverter {
    behavior: MockBehavior,
    table: ReadingTableConverter,
    call_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ConversionRequest>>>,
    before_respond: Option<RequestHook>,
}

impl fmt::Debug for MockConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockConverter")
            .field("behavior", &self.behavior)
            .field("call_count", &self.call_count())
            .field("has_hook", &self.before_respond.is_some())
            .finish()
    }
}

impl MockConverter {
    pub fn new(behavior: MockBehavior, table: ReadingTableConverter) -> Self {
        Self {
            behavior,
            table,
            call_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            before_respond: None,
        }
    }

    /// A converter that always succeeds using `table`
    pub fn working(table: ReadingTableConverter) -> Self {
        Self::new(MockBehavior::Working, table)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing, ReadingTableConverter::default())
    }

    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed, ReadingTableConverter::default())
    }

    /// Run `hook` after a request is received and before it is answered
    pub fn with_hook(mut self, hook: impl Fn(&ConversionRequest) + Send + Sync + 'static) -> Self {
        self.before_respond = Some(Arc::new(hook));
        self
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts of all requests, in arrival order
    pub fn requested_texts(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.text.clone()).collect()
    }
}

#[async_trait]
impl ConversionService for MockConverter {
    async fn convert(&self, request: ConversionRequest) -> Result<ConversionResponse, ConversionError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(hook) = &self.before_respond {
            hook(&request);
        }

        match &self.behavior {
            MockBehavior::Working => self.table.convert(request).await,
            MockBehavior::FailOn(c) if request.text.contains(*c) => Err(
                ConversionError::RequestFailed(format!("Simulated failure for text containing '{}'", c)),
            ),
            MockBehavior::FailOn(_) => self.table.convert(request).await,
            MockBehavior::Failing => Err(ConversionError::RequestFailed(
                "Simulated conversion failure".to_string(),
            )),
            MockBehavior::Malformed => Ok(ConversionResponse {
                markup: "<pya class=\"py-result-item\"".to_string(),
            }),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                self.table.convert(request).await
            }
        }
    }
}
