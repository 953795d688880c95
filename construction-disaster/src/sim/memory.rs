//! In-memory implementations of the host seams.

use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::error::HostError;
use crate::host::{
    Command, CommandQueue, EventLogStore, NotificationSink, Pref, Preferences, SignalBus,
    SubscriptionHandle, Topic,
};
use crate::story::entry::{EventLogEntry, EventNotification, LogHandle};

#[derive(Debug, Default)]
pub struct MemoryBus {
    next: u64,
    subscriptions: BTreeMap<SubscriptionHandle, (Topic, &'static str)>,
}

impl MemoryBus {
    /// Listener ids for `topic`, in subscription order.
    #[must_use]
    pub fn listeners(&self, topic: Topic) -> Vec<&'static str> {
        self.subscriptions
            .values()
            .filter(|(t, _)| *t == topic)
            .map(|(_, listener)| *listener)
            .collect()
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_listening(&self, topic: Topic, listener: &str) -> bool {
        self.subscriptions
            .values()
            .any(|(t, l)| *t == topic && *l == listener)
    }
}

impl SignalBus for MemoryBus {
    fn subscribe(&mut self, topic: Topic, listener: &'static str) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next);
        self.next = self.next.saturating_add(1);
        self.subscriptions.insert(handle, (topic, listener));
        handle
    }

    fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.subscriptions.remove(&handle).is_some()
    }
}

#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Vec<EventLogEntry>,
}

impl MemoryLog {
    #[must_use]
    pub fn entries(&self) -> &[EventLogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, handle: LogHandle) -> Option<&EventLogEntry> {
        usize::try_from(handle.0)
            .ok()
            .and_then(|index| self.entries.get(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EventLogStore for MemoryLog {
    fn append(&mut self, entry: EventLogEntry) -> LogHandle {
        let handle = LogHandle(self.entries.len() as u64);
        self.entries.push(entry);
        handle
    }
}

#[derive(Debug, Default)]
pub struct MemoryNotifications {
    posted: Vec<EventNotification>,
}

impl MemoryNotifications {
    #[must_use]
    pub fn posted(&self) -> &[EventNotification] {
        &self.posted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.posted.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posted.is_empty()
    }
}

impl NotificationSink for MemoryNotifications {
    fn post(&mut self, notification: EventNotification) {
        self.posted.push(notification);
    }
}

#[derive(Debug, Default)]
pub struct MemoryCommandQueue {
    pending: VecDeque<Command>,
    /// Fault injection: reject every command with this reason.
    reject: Option<String>,
}

impl MemoryCommandQueue {
    pub fn reject_with(&mut self, reason: impl Into<String>) {
        self.reject = Some(reason.into());
    }

    pub fn accept_all(&mut self) {
        self.reject = None;
    }

    #[must_use]
    pub fn pending(&self) -> &VecDeque<Command> {
        &self.pending
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Hand every queued command to the caller in enqueue order.
    pub fn drain(&mut self) -> Vec<Command> {
        self.pending.drain(..).collect()
    }
}

impl CommandQueue for MemoryCommandQueue {
    fn enqueue(&mut self, command: Command) -> Result<(), HostError> {
        if let Some(reason) = &self.reject {
            return Err(HostError::Rejected(reason.clone()));
        }
        self.pending.push_back(command);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: HashMap<Pref, bool>,
}

impl MemoryPrefs {
    pub fn set(&mut self, pref: Pref, value: bool) {
        self.values.insert(pref, value);
    }
}

impl Preferences for MemoryPrefs {
    fn get_bool(&self, pref: Pref, default: bool) -> bool {
        self.values.get(&pref).copied().unwrap_or(default)
    }
}
