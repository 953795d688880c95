//! Story events: narrative rules the host starts, stops, saves and feeds signals to.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::host::{SignalBus, StoryContext, Topic};
use crate::structure::Structure;

pub mod construction_disaster;
pub mod entry;
pub mod outcome;

pub use construction_disaster::{DisasterRule, explode_chance};
pub use entry::{
    EventLogEntry, EventNotification, IconId, LocalizedText, LogHandle, NotificationAction,
    Priority,
};
pub use outcome::{DisasterEffect, Resolution, ResolutionOutcome};

/// Registration metadata the host keeps per story event type.
#[derive(Clone, Copy)]
pub struct StoryEventMeta {
    pub id: &'static str,
    /// Whether the host ends the event on its own once its duration elapses.
    pub auto_end: bool,
    pub skip_duration_warning: bool,
    pub create: fn() -> Box<dyn StoryEvent>,
}

impl fmt::Debug for StoryEventMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoryEventMeta")
            .field("id", &self.id)
            .field("auto_end", &self.auto_end)
            .field("skip_duration_warning", &self.skip_duration_warning)
            .finish_non_exhaustive()
    }
}

/// Persisted state of a story event, handed to the host's save system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEventSave {
    pub id: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_log_entry: Option<entry::LogHandle>,
    #[serde(default)]
    pub resolutions: u32,
}

/// A host signal routed to subscribed story events.
pub enum Signal<'s> {
    ConstructionCompleted(&'s mut dyn Structure),
}

impl Signal<'_> {
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::ConstructionCompleted(_) => Topic::ConstructionCompleted,
        }
    }
}

/// Lifecycle the host drives every story event through.
pub trait StoryEvent {
    fn meta(&self) -> &'static StoryEventMeta;

    /// Start listening. Calling it while active must not register twice.
    fn activate(&mut self, ticks: u64, bus: &mut dyn SignalBus);

    /// Stop listening. No-op when inactive.
    fn deactivate(&mut self, ticks: u64, bus: &mut dyn SignalBus);

    fn on_tick(&mut self, _ticks: u64) {}

    /// Resume after a load.
    fn restore(&mut self, saved: &StoryEventSave, bus: &mut dyn SignalBus);

    fn snapshot(&self) -> StoryEventSave;

    /// Handle a routed signal. `None` means the signal was not for this event.
    fn on_signal(
        &mut self,
        ctx: &mut StoryContext<'_>,
        signal: Signal<'_>,
    ) -> Option<outcome::Resolution>;

    fn is_subscribed(&self) -> bool;

    /// Whether the event has reported its one-shot work as done.
    fn is_ended(&self) -> bool;

    /// Most recent log entry, for "show details" callbacks.
    fn log_entry(&self) -> Option<entry::LogHandle>;
}
