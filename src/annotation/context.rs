/*!
 * Per-document engine state.
 *
 * One `AnnotationContext` exists per loaded document. It owns the watcher, the
 * cached preferences and the reading-position style element, and is passed by
 * reference to every action handler.
 */

use log::{debug, info, warn};
use std::sync::Arc;

use super::applier::{self, ApplyReport, Applier};
use super::scanner::{IgnoredTags, TextScanner};
use super::style::{StyleDirective, inject_style};
use super::watcher::{MutationWatcher, scopes_for_batch};
use crate::app_config::EngineConfig;
use crate::document::{NodeId, SharedDocument, WatcherConfig};
use crate::preferences::{PartialPreferences, PreferenceStore, UserPreferences};
use crate::providers::{ConversionOptions, ConversionService};

/// Everything the engine knows about one document
#[derive(Debug)]
pub struct AnnotationContext {
    doc: SharedDocument,
    store: Arc<dyn PreferenceStore>,
    applier: Applier,
    watcher: MutationWatcher,
    preferences: UserPreferences,
    target_selector: String,
    style: StyleDirective,
}

impl AnnotationContext {
    pub fn new(
        doc: SharedDocument,
        converter: Arc<dyn ConversionService>,
        store: Arc<dyn PreferenceStore>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            doc,
            store,
            applier: Applier::new(converter, config.wrap_output),
            watcher: MutationWatcher::new(config.watcher, config.batch_queue_capacity),
            preferences: UserPreferences::default(),
            target_selector: config.observation_selector.clone(),
            style: StyleDirective::new(),
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.doc
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn watcher(&self) -> &MutationWatcher {
        &self.watcher
    }

    pub fn style_node(&self) -> Option<NodeId> {
        self.style.node()
    }

    /// The ObservationTarget, if the selector matches anything right now
    pub fn target(&self) -> Option<NodeId> {
        self.doc.lock().query_selector(&self.target_selector)
    }

    pub fn set_target_selector(&mut self, selector: &str) {
        self.target_selector = selector.to_string();
    }

    /// Options sent with every conversion request
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            wrap_non_qualifying: Some(true),
            tone_type: Some(self.preferences.tone_type),
            dictionary_link_template: self.preferences.dictionary_link_template(),
        }
    }

    pub fn scanner(&self) -> TextScanner {
        TextScanner::new(IgnoredTags::from_configured(&self.preferences.ignored_tag_names))
    }

    /// Re-read every preference from the store
    pub async fn reconcile_preferences(&mut self) {
        self.preferences = UserPreferences::load(self.store.as_ref()).await;
        debug!("Preferences reconciled: {:?}", self.preferences);
    }

    /// Persist the present fields and update the cache, field by field
    pub async fn update_preferences(&mut self, partial: &PartialPreferences) {
        for (key, value) in partial.entries() {
            if let Err(e) = self.store.set(key.as_str(), value).await {
                warn!("Failed to persist preference '{}': {}", key.as_str(), e);
            }
        }
        partial.apply_to(&mut self.preferences);

        if partial.reading_position.is_some() {
            self.apply_reading_position();
        }
        if partial.monitor_enabled == Some(false) {
            self.disable_watcher();
        }
    }

    /// Write the cached reading position into the style directive
    pub fn apply_reading_position(&mut self) {
        let mut doc = self.doc.lock();
        self.style.apply(&mut doc, self.preferences.reading_position);
    }

    /// Inject site-profile style sheets
    pub fn inject_styles(&self, styles: &[String]) {
        let mut doc = self.doc.lock();
        for css in styles {
            inject_style(&mut doc, css);
        }
    }

    /// Whether anything under the target carries the sentinel tag
    pub fn is_annotated(&self) -> bool {
        let doc = self.doc.lock();
        let Some(target) = doc.query_selector(&self.target_selector) else {
            return false;
        };
        applier::is_annotated(&doc, target)
    }

    pub async fn apply(&self, root: NodeId) -> ApplyReport {
        let scanner = self.scanner();
        let options = self.conversion_options();
        self.applier.apply(&self.doc, &scanner, Some(root), &options).await
    }

    pub fn clear(&self, root: NodeId) -> usize {
        applier::clear(&mut self.doc.lock(), root)
    }

    pub fn enable_watcher(&mut self, target: NodeId) {
        let mut doc = self.doc.lock();
        self.watcher.enable(&mut doc, target);
    }

    pub fn disable_watcher(&mut self) {
        let mut doc = self.doc.lock();
        self.watcher.disable(&mut doc);
    }

    pub fn reconfigure_watcher(&mut self, config: WatcherConfig) {
        let mut doc = self.doc.lock();
        self.watcher.reconfigure(&mut doc, config);
    }

    /// Drain recorded mutations, running a scoped Apply for each affected subtree.
    ///
    /// Batches are handled one at a time in arrival order. Engine output is
    /// never recorded, so this terminates once outside changes stop.
    pub async fn process_pending_mutations(&mut self) -> ApplyReport {
        let mut report = ApplyReport::default();
        let scanner = self.scanner();
        let options = self.conversion_options();

        loop {
            let batch = {
                let mut doc = self.doc.lock();
                self.watcher.collect(&mut doc);
                self.watcher.next_batch()
            };
            let Some(batch) = batch else {
                break;
            };

            let scopes = scopes_for_batch(&self.doc.lock(), &batch, scanner.ignored());
            debug!("Mutation batch of {} records gave {} scopes", batch.len(), scopes.len());
            for scope in scopes {
                if !self.watcher.is_enabled() {
                    break;
                }
                report.merge(self.applier.apply(&self.doc, &scanner, Some(scope), &options).await);
            }
        }

        if report.scanned > 0 {
            info!(
                "Incremental annotation: {} converted, {} skipped, {} failed",
                report.converted, report.skipped, report.failed
            );
        }
        report
    }
}
