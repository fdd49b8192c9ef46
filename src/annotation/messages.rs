/*!
 * Wire format of inbound action messages and their responses.
 *
 * ```json
 * { "action": "update_options", "data": { "toneType": "num" } }
 * { "status": "annotated" }
 * ```
 */

use serde::{Deserialize, Serialize};

use super::dispatcher::{AnnotationStatus, UserAction};
use crate::preferences::PartialPreferences;

/// Keyboard command bound to Toggle
pub const TOGGLE_COMMAND: &str = "toggle-annotation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Annotate,
    Clear,
    Check,
    UpdateOptions,
    Toggle,
    /// Anything else; handled as a no-op
    #[serde(other)]
    Unknown,
}

/// `{action, data}` as sent by a settings surface or keyboard command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionMessage {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PartialPreferences>,
}

impl ActionMessage {
    pub fn new(action: ActionKind) -> Self {
        Self { action, data: None }
    }

    pub fn update_options(data: PartialPreferences) -> Self {
        Self {
            action: ActionKind::UpdateOptions,
            data: Some(data),
        }
    }

    /// Message for a named keyboard command
    pub fn from_command(command: &str) -> Option<Self> {
        (command == TOGGLE_COMMAND).then(|| Self::new(ActionKind::Toggle))
    }

    /// The action to dispatch; `None` for unknown actions
    pub fn into_action(self) -> Option<UserAction> {
        match self.action {
            ActionKind::Annotate => Some(UserAction::Annotate),
            ActionKind::Clear => Some(UserAction::Clear),
            ActionKind::Check => Some(UserAction::Check),
            ActionKind::UpdateOptions => Some(UserAction::UpdateOptions(self.data.unwrap_or_default())),
            ActionKind::Toggle => Some(UserAction::Toggle),
            ActionKind::Unknown => None,
        }
    }
}

/// `{status}` response, sent for every message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: AnnotationStatus,
}

impl From<AnnotationStatus> for StatusResponse {
    fn from(status: AnnotationStatus) -> Self {
        Self { status }
    }
}
