/*!
 * Mutation records and observer registration.
 *
 * A document carries at most one observer. Mutations inside the observed scope
 * are appended to the observer's pending list and the processing loop is woken
 * through a tokio `Notify`, which keeps a permit when nobody is waiting yet.
 */

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Notify;

use super::NodeId;

/// Which kinds of changes an observer wants to see.
///
/// Equality is field-by-field, so reconfiguring with an identical value is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatcherConfig {
    /// Children added or removed
    #[serde(default = "default_true")]
    pub child_list: bool,

    /// Text changed in place
    #[serde(default = "default_true")]
    pub character_data: bool,

    /// Attribute values changed
    #[serde(default)]
    pub attributes: bool,

    /// Watch the whole subtree rather than the target alone
    #[serde(default = "default_true")]
    pub subtree: bool,
}

fn default_true() -> bool {
    true
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            child_list: true,
            character_data: true,
            attributes: false,
            subtree: true,
        }
    }
}

impl WatcherConfig {
    /// A config with every flag off would never deliver anything
    pub fn observes_anything(&self) -> bool {
        self.child_list || self.character_data || self.attributes
    }

    pub(crate) fn accepts(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::ChildList { .. } => self.child_list,
            MutationKind::CharacterData => self.character_data,
            MutationKind::Attributes { .. } => self.attributes,
        }
    }
}

/// The kind of change a record describes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children of `target` were added and/or removed
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    /// The text of `target` changed
    CharacterData,
    /// An attribute of `target` changed
    Attributes { name: String },
}

/// One observed change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Parent for child-list changes, the changed node otherwise
    pub target: NodeId,
    pub kind: MutationKind,
}

impl MutationRecord {
    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            target,
            kind: MutationKind::ChildList { added, removed },
        }
    }

    pub fn character_data(target: NodeId) -> Self {
        Self {
            target,
            kind: MutationKind::CharacterData,
        }
    }

    pub fn attributes(target: NodeId, name: &str) -> Self {
        Self {
            target,
            kind: MutationKind::Attributes {
                name: name.to_string(),
            },
        }
    }
}

/// Observer registration held by the document
#[derive(Debug)]
pub(crate) struct Observer {
    pub target: NodeId,
    pub config: WatcherConfig,
    pub records: Vec<MutationRecord>,
    pub waker: Option<Arc<Notify>>,
}

impl Observer {
    pub fn new(target: NodeId, config: WatcherConfig, waker: Option<Arc<Notify>>) -> Self {
        Self {
            target,
            config,
            records: Vec::new(),
            waker,
        }
    }

    pub fn push(&mut self, record: MutationRecord) {
        self.records.push(record);
        if let Some(waker) = &self.waker {
            waker.notify_one();
        }
    }
}
