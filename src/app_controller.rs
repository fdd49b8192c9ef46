use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::annotation::dispatcher::{self, AnnotationStatus};
use crate::annotation::{ActionMessage, AnnotationContext, StatusResponse};
use crate::app_config::Config;
use crate::document::SharedDocument;
use crate::errors::AppError;
use crate::preferences::PreferenceStore;
use crate::providers::ConversionService;

// @module: Orchestrator for one document lifetime

type Envelope = (ActionMessage, oneshot::Sender<StatusResponse>);

/// Inbox capacity for pending action messages
const INBOX_CAPACITY: usize = 32;

/// Owns the annotation context and serializes everything that touches it
#[derive(Debug)]
pub struct Controller {
    // @field: Per-document engine state
    context: AnnotationContext,
    // @field: App configuration
    config: Config,
    // @field: Inbound action messages
    inbox: mpsc::Receiver<Envelope>,
}

/// Cloneable sender side of a [`Controller`]
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<Envelope>,
}

impl ControllerHandle {
    /// Send a message and wait for its `{status}` response
    pub async fn send(&self, message: ActionMessage) -> Result<StatusResponse, AppError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send((message, reply))
            .await
            .map_err(|e| AppError::Channel(format!("Controller is not running: {}", e)))?;
        response
            .await
            .map_err(|e| AppError::Channel(format!("Controller dropped the response: {}", e)))
    }
}

impl Controller {
    // @method: Create a controller and the handle used to talk to it
    pub fn new(
        doc: SharedDocument,
        converter: Arc<dyn ConversionService>,
        store: Arc<dyn PreferenceStore>,
        config: Config,
    ) -> (Self, ControllerHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let context = AnnotationContext::new(doc, converter, store, &config.engine);
        let controller = Self {
            context,
            config,
            inbox,
        };
        (controller, ControllerHandle { sender })
    }

    pub fn context(&self) -> &AnnotationContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut AnnotationContext {
        &mut self.context
    }

    /// Reconcile preferences, install styles, and annotate when auto-annotate is on
    pub async fn initialize(&mut self) -> AnnotationStatus {
        self.context.reconcile_preferences().await;
        self.context.inject_styles(&self.config.engine.extra_styles);
        self.context.apply_reading_position();

        if self.context.preferences().auto_annotate_on_load {
            info!("Auto-annotate is enabled, annotating on load");
            return dispatcher::dispatch(&mut self.context, dispatcher::UserAction::Annotate).await;
        }
        AnnotationStatus::from_flag(self.context.is_annotated())
    }

    /// Handle one message; unknown actions only report the current status
    pub async fn handle_message(&mut self, message: ActionMessage) -> StatusResponse {
        let kind = message.action;
        let status = match message.into_action() {
            Some(action) => dispatcher::dispatch(&mut self.context, action).await,
            None => {
                warn!("Ignoring unknown action {:?}", kind);
                AnnotationStatus::from_flag(self.context.is_annotated())
            }
        };
        debug!("Action {:?} finished with status {}", kind, status);
        StatusResponse::from(status)
    }

    /// Initialize, then serve messages and mutation batches until every handle is dropped
    pub async fn run(mut self) {
        let status = self.initialize().await;
        debug!("Controller initialized with status {}", status);

        let waker = self.context.watcher().waker();
        loop {
            tokio::select! {
                envelope = self.inbox.recv() => {
                    let Some((message, reply)) = envelope else {
                        debug!("All controller handles dropped, stopping");
                        break;
                    };
                    let response = self.handle_message(message).await;
                    if reply.send(response).is_err() {
                        warn!("Caller went away before its response was sent");
                    }
                }
                _ = waker.notified() => {
                    self.context.process_pending_mutations().await;
                }
            }
        }
    }

    /// Process any mutations recorded so far, outside the run loop
    pub async fn flush_mutations(&mut self) {
        self.context.process_pending_mutations().await;
    }
}
