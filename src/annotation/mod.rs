/*!
 * The annotation engine.
 *
 * - `markup`: the generated markup contract and text units
 * - `scanner`: finds text nodes that need annotating
 * - `applier`: converts text nodes and removes annotations again
 * - `watcher`: observes the target and queues mutation batches
 * - `context`: per-document engine state
 * - `dispatcher`: maps user actions onto the pieces above
 * - `messages`: inbound `{action, data}` and outbound `{status}`
 */

pub mod applier;
pub mod context;
pub mod dispatcher;
pub mod markup;
pub mod messages;
pub mod scanner;
pub mod style;
pub mod watcher;

pub use applier::{ApplyReport, Applier};
pub use context::AnnotationContext;
pub use dispatcher::{AnnotationStatus, UserAction, dispatch};
pub use messages::{ActionKind, ActionMessage, StatusResponse};
pub use scanner::{IgnoredTags, TextScanner};
pub use watcher::{MutationWatcher, WatcherState};
