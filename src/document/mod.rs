/*!
 * In-process document tree the annotation engine works on.
 *
 * - `node`: node ids and payloads
 * - `tree`: the arena, its mutation operations and observer hook
 * - `mutation`: mutation records and watcher configuration
 * - `parser` / `serializer`: markup in and out
 * - `selector`: simple selector matching
 */

pub mod mutation;
pub mod node;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod tree;

pub use mutation::{MutationKind, MutationRecord, WatcherConfig};
pub use node::{Attribute, ElementData, Node, NodeData, NodeId};
pub use selector::SelectorList;
pub use tree::{Document, SharedDocument};
