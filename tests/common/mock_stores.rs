/*!
 * Mock preference stores for testing
 *
 * These stores simulate a storage backend that is unavailable, so tests can
 * check that preference failures never escape an action.
 */

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pinyin_annotator::errors::PreferenceError;
use pinyin_annotator::preferences::PreferenceStore;

/// Fails every read and write, counting the attempts
#[derive(Debug, Default, Clone)]
pub struct FailingPreferenceStore {
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl FailingPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PreferenceStore for FailingPreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, PreferenceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Err(PreferenceError::Backend(format!("store offline while reading {}", key)))
    }

    async fn set(&self, key: &str, _value: Value) -> Result<(), PreferenceError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Err(PreferenceError::Backend(format!("store offline while writing {}", key)))
    }
}
