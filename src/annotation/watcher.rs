/*!
 * Mutation watcher.
 *
 * Wraps the document's observer registration with an explicit state machine and
 * a bounded queue of mutation batches. The processing loop drains the queue one
 * batch at a time and turns records into Apply scopes.
 */

use log::{debug, trace, warn};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

use super::scanner::IgnoredTags;
use crate::document::{Document, MutationKind, MutationRecord, NodeId, WatcherConfig};

/// Records delivered together
pub type MutationBatch = Vec<MutationRecord>;

/// Whether the watcher is observing anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Disabled,
    Observing { target: NodeId },
}

/// Observes one target at a time and queues what it sees
#[derive(Debug)]
pub struct MutationWatcher {
    state: WatcherState,
    config: WatcherConfig,
    queue: VecDeque<MutationBatch>,
    capacity: usize,
    waker: Arc<Notify>,
}

impl MutationWatcher {
    pub fn new(config: WatcherConfig, capacity: usize) -> Self {
        Self {
            state: WatcherState::Disabled,
            config,
            queue: VecDeque::new(),
            capacity: capacity.max(1),
            waker: Arc::new(Notify::new()),
        }
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.state, WatcherState::Observing { .. })
    }

    pub fn config(&self) -> WatcherConfig {
        self.config
    }

    /// Signalled whenever the document records something for this watcher
    pub fn waker(&self) -> Arc<Notify> {
        Arc::clone(&self.waker)
    }

    /// Start observing `target`, disconnecting any earlier observation first.
    ///
    /// Callers run a full Apply pass over `target` before enabling, otherwise
    /// content that was already there is never seen.
    pub fn enable(&mut self, doc: &mut Document, target: NodeId) {
        if self.is_enabled() {
            self.disable(doc);
        }
        doc.observe(target, self.config, Some(self.waker()));
        self.state = WatcherState::Observing { target };
        debug!("Mutation watcher observing {}", target);
    }

    /// Stop observing and drop anything not yet processed
    pub fn disable(&mut self, doc: &mut Document) {
        if !self.is_enabled() {
            return;
        }
        doc.disconnect();
        self.queue.clear();
        self.state = WatcherState::Disabled;
        debug!("Mutation watcher disabled");
    }

    /// Adopt `config`; re-observes the same target when enabled. No-op for an equal config.
    pub fn reconfigure(&mut self, doc: &mut Document, config: WatcherConfig) {
        if config == self.config {
            return;
        }
        let previous = self.state;
        self.disable(doc);
        self.config = config;
        if let WatcherState::Observing { target } = previous {
            self.enable(doc, target);
        }
    }

    /// Move pending document records into the queue as one batch.
    ///
    /// When the queue is full the batch is merged into the newest one so the
    /// number of queued batches stays bounded without losing records.
    pub fn collect(&mut self, doc: &mut Document) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let records = doc.take_records();
        if records.is_empty() {
            return false;
        }
        trace!("Collected {} mutation records", records.len());
        if self.queue.len() >= self.capacity {
            warn!("Mutation queue full ({} batches), coalescing", self.capacity);
            if let Some(newest) = self.queue.back_mut() {
                newest.extend(records);
                return true;
            }
        }
        self.queue.push_back(records);
        true
    }

    /// Oldest unprocessed batch
    pub fn next_batch(&mut self) -> Option<MutationBatch> {
        self.queue.pop_front()
    }

    pub fn queued_batches(&self) -> usize {
        self.queue.len()
    }
}

/// Turn a batch into the roots that need an Apply pass, in record order, without duplicates.
///
/// - added nodes: each one that is still connected and not an ignored element
/// - text changed in place: the text node's parent element
/// - attribute changed: the element itself
pub fn scopes_for_batch(doc: &Document, batch: &[MutationRecord], ignored: &IgnoredTags) -> Vec<NodeId> {
    let mut scopes: Vec<NodeId> = Vec::new();
    let mut push = |id: NodeId| {
        if doc.is_connected(id) && !scopes.contains(&id) {
            scopes.push(id);
        }
    };

    for record in batch {
        match &record.kind {
            MutationKind::ChildList { added, .. } => {
                for node in added {
                    if doc.tag_name(*node).is_some_and(|tag| ignored.contains(tag)) {
                        continue;
                    }
                    push(*node);
                }
            }
            MutationKind::CharacterData => {
                if let Some(parent) = doc.parent(record.target) {
                    push(parent);
                }
            }
            MutationKind::Attributes { .. } => push(record.target),
        }
    }

    scopes
}
