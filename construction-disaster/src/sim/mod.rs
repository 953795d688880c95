//! In-memory reference host.
//!
//! `SimWorld` wires the host seams together the way a game would: it owns
//! the tiles, the story events and the signal bus, routes completed
//! constructions to subscribed events and applies the end policy.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::{Difficulty, DisasterConfig, EndPolicy};
use crate::host::{Command, Pref, StoryContext, Topic};
use crate::rng::RngSource;
use crate::story::outcome::Resolution;
use crate::story::{DisasterRule, Signal, StoryEvent, StoryEventMeta, StoryEventSave};
use crate::structure::TileId;

pub mod memory;
pub mod tile;

pub use memory::{MemoryBus, MemoryCommandQueue, MemoryLog, MemoryNotifications, MemoryPrefs};
pub use tile::{DamageRecord, FireState, Health, Tile};

/// Misuse of the reference host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("no tile {0} has been placed")]
    UnknownTile(TileId),
    #[error("no story event registered as {0}")]
    UnknownEvent(String),
    #[error("story event {0} is already registered")]
    DuplicateEvent(String),
}

pub struct SimWorld {
    ticks: u64,
    difficulty: Difficulty,
    end_policy: EndPolicy,
    rng: RngSource,
    bus: MemoryBus,
    log: MemoryLog,
    notifications: MemoryNotifications,
    commands: MemoryCommandQueue,
    prefs: MemoryPrefs,
    tiles: BTreeMap<TileId, Tile>,
    events: Vec<Box<dyn StoryEvent>>,
}

impl SimWorld {
    #[must_use]
    pub fn new(seed: u64, difficulty: Difficulty) -> Self {
        Self {
            ticks: 0,
            difficulty,
            end_policy: EndPolicy::default(),
            rng: RngSource::from_user_seed(seed),
            bus: MemoryBus::default(),
            log: MemoryLog::default(),
            notifications: MemoryNotifications::default(),
            commands: MemoryCommandQueue::default(),
            prefs: MemoryPrefs::default(),
            tiles: BTreeMap::new(),
            events: Vec::new(),
        }
    }

    /// World with a registered construction disaster tuned by `config`.
    #[must_use]
    pub fn with_disaster(seed: u64, difficulty: Difficulty, config: DisasterConfig) -> Self {
        let mut world = Self::new(seed, difficulty).with_end_policy(config.end_policy);
        world.events.push(Box::new(DisasterRule::new(config)));
        world
    }

    #[must_use]
    pub const fn with_end_policy(mut self, policy: EndPolicy) -> Self {
        self.end_policy = policy;
        self
    }

    /// Register a story event instance.
    ///
    /// # Errors
    ///
    /// Returns an error if an event with the same id is already registered.
    pub fn register(&mut self, event: Box<dyn StoryEvent>) -> Result<(), SimError> {
        let id = event.meta().id;
        if self.events.iter().any(|existing| existing.meta().id == id) {
            return Err(SimError::DuplicateEvent(id.to_string()));
        }
        self.events.push(event);
        Ok(())
    }

    /// Register a story event through its metadata constructor.
    ///
    /// # Errors
    ///
    /// Returns an error if an event with the same id is already registered.
    pub fn register_meta(&mut self, meta: &StoryEventMeta) -> Result<(), SimError> {
        self.register((meta.create)())
    }

    /// Activate a registered event.
    ///
    /// # Errors
    ///
    /// Returns an error if no event with `id` is registered.
    pub fn start_event(&mut self, id: &str) -> Result<(), SimError> {
        let event = find_event(&mut self.events, id)?;
        event.activate(self.ticks, &mut self.bus);
        Ok(())
    }

    /// Deactivate a registered event.
    ///
    /// # Errors
    ///
    /// Returns an error if no event with `id` is registered.
    pub fn end_event(&mut self, id: &str) -> Result<(), SimError> {
        let event = find_event(&mut self.events, id)?;
        event.deactivate(self.ticks, &mut self.bus);
        Ok(())
    }

    /// Advance the clock by one tick and let every event observe it.
    pub fn advance_tick(&mut self) -> u64 {
        self.ticks = self.ticks.saturating_add(1);
        for event in &mut self.events {
            event.on_tick(self.ticks);
        }
        self.ticks
    }

    pub fn place(&mut self, tile: Tile) {
        self.tiles.insert(tile.id, tile);
    }

    /// Announce that `id` finished construction and collect every listener's resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if the tile was never placed.
    pub fn complete_construction(&mut self, id: TileId) -> Result<Vec<Resolution>, SimError> {
        let listeners = self.bus.listeners(Topic::ConstructionCompleted);
        let tile = self.tiles.get_mut(&id).ok_or(SimError::UnknownTile(id))?;
        let mut resolutions = Vec::new();

        for listener in listeners {
            let Some(event) = self
                .events
                .iter_mut()
                .find(|event| event.meta().id == listener)
            else {
                log::warn!("signal listener {listener} has no registered story event");
                continue;
            };

            let mut ctx = StoryContext {
                ticks: self.ticks,
                difficulty: self.difficulty,
                prefs: &self.prefs,
                rng: &self.rng,
                log: &mut self.log,
                notifications: &mut self.notifications,
                commands: &mut self.commands,
            };
            if let Some(resolution) =
                event.on_signal(&mut ctx, Signal::ConstructionCompleted(&mut *tile))
            {
                resolutions.push(resolution);
            }

            if self.end_policy == EndPolicy::Deactivate && event.is_ended() {
                event.deactivate(self.ticks, &mut self.bus);
            }
        }

        Ok(resolutions)
    }

    /// Hand queued commands to the caller in enqueue order.
    pub fn drain_commands(&mut self) -> Vec<Command> {
        self.commands.drain()
    }

    /// Snapshot every registered event for a save file.
    #[must_use]
    pub fn save_events(&self) -> Vec<StoryEventSave> {
        self.events.iter().map(|event| event.snapshot()).collect()
    }

    /// Restore events that were active when `saves` were taken.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot names an unregistered event.
    pub fn load_events(&mut self, saves: &[StoryEventSave]) -> Result<(), SimError> {
        for save in saves.iter().filter(|save| save.active) {
            let event = find_event(&mut self.events, &save.id)?;
            event.restore(save, &mut self.bus);
        }
        Ok(())
    }

    #[must_use]
    pub fn event(&self, id: &str) -> Option<&dyn StoryEvent> {
        self.events
            .iter()
            .find(|event| event.meta().id == id)
            .map(|event| event.as_ref())
    }

    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub const fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn set_pref(&mut self, pref: Pref, value: bool) {
        self.prefs.set(pref, value);
    }

    #[must_use]
    pub const fn rng(&self) -> &RngSource {
        &self.rng
    }

    #[must_use]
    pub const fn bus(&self) -> &MemoryBus {
        &self.bus
    }

    #[must_use]
    pub const fn log(&self) -> &MemoryLog {
        &self.log
    }

    #[must_use]
    pub const fn notifications(&self) -> &MemoryNotifications {
        &self.notifications
    }

    #[must_use]
    pub const fn commands(&self) -> &MemoryCommandQueue {
        &self.commands
    }

    pub const fn commands_mut(&mut self) -> &mut MemoryCommandQueue {
        &mut self.commands
    }
}

fn find_event<'e>(
    events: &'e mut [Box<dyn StoryEvent>],
    id: &str,
) -> Result<&'e mut Box<dyn StoryEvent>, SimError> {
    events
        .iter_mut()
        .find(|event| event.meta().id == id)
        .ok_or_else(|| SimError::UnknownEvent(id.to_string()))
}
