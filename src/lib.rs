/*!
 * # pinyin-annotator
 *
 * A Rust library that annotates Chinese text in a live document with pinyin
 * readings, keeps the annotation current while the document changes, and
 * removes it again on demand.
 *
 * ## Features
 *
 * - Ruby-style reading annotations following a fixed markup contract
 * - Exact restoration of the original text on Clear
 * - Incremental re-annotation of added or changed content through a mutation watcher
 * - Tone marks, tone numbers, or no tones
 * - Optional dictionary links for every annotated character
 * - Persistent user preferences (memory or JSON file)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `document`: in-process document tree, markup parser/serializer, mutation recording
 * - `annotation`: the engine:
 *   - `annotation::scanner`: text discovery
 *   - `annotation::applier`: Apply and Clear
 *   - `annotation::watcher`: mutation watcher and batch queue
 *   - `annotation::dispatcher`: user actions
 * - `providers`: conversion services (reading table, mock)
 * - `preferences`: user preferences, dictionary table, preference stores
 * - `app_controller`: one orchestrator per document
 * - `app_config`: configuration and site profiles
 * - `errors`: custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod annotation;
pub mod app_config;
pub mod app_controller;
pub mod document;
pub mod errors;
pub mod preferences;
pub mod providers;

// Re-export main types for easier usage
pub use annotation::{ActionKind, ActionMessage, AnnotationContext, AnnotationStatus, StatusResponse, UserAction};
pub use app_config::{Config, EngineConfig};
pub use app_controller::{Controller, ControllerHandle};
pub use document::{Document, NodeId, SharedDocument};
pub use errors::{AppError, ConversionError, MarkupError, PreferenceError};
pub use preferences::{PartialPreferences, UserPreferences};
pub use providers::{ConversionService, ReadingTableConverter};
