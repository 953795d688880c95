//! Event log entries and player notifications emitted by story events.
//!
//! Text is carried as untranslated keys; rendering and localization are the
//! host's job.

use serde::{Deserialize, Serialize};

use crate::structure::TileId;

/// Handle returned by the log store for an appended entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogHandle(pub u64);

/// Icon shown next to log entries and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconId {
    ConstructionFailure,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// Untranslated text: an i18n key plus positional arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub key: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl LocalizedText {
    #[must_use]
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Persistent record in the host's story log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// Id of the story event that produced the entry.
    pub event_id: String,
    pub ticks: u64,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub icon: IconId,
    /// Structure the entry is about.
    pub subject: TileId,
}

/// What clicking a notification's icon does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "handle", rename_all = "snake_case")]
pub enum NotificationAction {
    /// Open the detail view of a log entry.
    ShowLogDetails(LogHandle),
}

/// Transient player-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventNotification {
    pub created_at: u64,
    pub source: TileId,
    pub icon: IconId,
    pub title: LocalizedText,
    pub priority: Priority,
    /// Stays on screen until the player dismisses it.
    pub sticky: bool,
    pub on_icon_click: NotificationAction,
}

impl EventNotification {
    /// Log entry the notification links to.
    #[must_use]
    pub const fn log_entry(&self) -> LogHandle {
        match self.on_icon_click {
            NotificationAction::ShowLogDetails(handle) => handle,
        }
    }
}
