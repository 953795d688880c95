//! Seams to the host simulation.
//!
//! Story events never reach for globals: the signal bus is handed to the
//! lifecycle hooks and everything else arrives through [`StoryContext`].

use serde::{Deserialize, Serialize};

use crate::config::Difficulty;
use crate::error::HostError;
use crate::rng::{ForkedRng, RngSource};
use crate::story::entry::{EventLogEntry, EventNotification, LogHandle};
use crate::structure::{Position, TileId};

/// Signal topics story events can listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    ConstructionCompleted,
}

/// Receipt for a bus subscription; needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionHandle(pub u64);

/// Observer registry the host routes signals through.
pub trait SignalBus {
    /// Register `listener` (a story event id) for `topic`.
    fn subscribe(&mut self, topic: Topic, listener: &'static str) -> SubscriptionHandle;

    /// Remove a subscription, returning whether it existed.
    fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool;
}

/// Persistent story log.
pub trait EventLogStore {
    fn append(&mut self, entry: EventLogEntry) -> LogHandle;
}

/// UI notification feed.
pub trait NotificationSink {
    fn post(&mut self, notification: EventNotification);
}

/// Player preferences consulted by story events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pref {
    /// Suppress explosions and other destructive outcomes.
    NoHeavyDisasters,
}

pub trait Preferences {
    fn get_bool(&self, pref: Pref, default: bool) -> bool;
}

/// Explosion request; processed later by the host with the carried stream.
#[derive(Debug, Clone)]
pub struct ExplosionCommand {
    pub source: TileId,
    pub position: Position,
    pub radius: f32,
    pub strength: f32,
    pub rng: ForkedRng,
}

/// Deferred work handed to the host command queue.
#[derive(Debug, Clone)]
pub enum Command {
    CreateExplosion(ExplosionCommand),
}

/// FIFO queue of deferred host commands.
pub trait CommandQueue {
    /// Queue a command for later processing.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses the command.
    fn enqueue(&mut self, command: Command) -> Result<(), HostError>;
}

/// Everything a story event may touch while handling a signal.
pub struct StoryContext<'a> {
    pub ticks: u64,
    pub difficulty: Difficulty,
    pub prefs: &'a dyn Preferences,
    pub rng: &'a RngSource,
    pub log: &'a mut dyn EventLogStore,
    pub notifications: &'a mut dyn NotificationSink,
    pub commands: &'a mut dyn CommandQueue,
}
