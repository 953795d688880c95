//! Construction Disaster
//!
//! A story event for a host simulation game: when a structure that is part
//! of the power grid finishes construction, an electrical fault damages it
//! and either sets it on fire or blows it up. The rule only talks to the
//! host through the traits in [`host`] and [`structure`]; [`sim`] provides
//! an in-memory host for tests and tooling.

pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod numbers;
pub mod rng;
pub mod sim;
pub mod story;
pub mod structure;

// Re-export commonly used types
pub use config::{
    Difficulty, DifficultyPreset, DisasterConfig, DisasterConfigError, EndPolicy, SampleRange,
};
pub use error::{HostError, ResolutionError, ResolutionStage};
pub use host::{
    Command, CommandQueue, EventLogStore, ExplosionCommand, NotificationSink, Pref, Preferences,
    SignalBus, StoryContext, SubscriptionHandle, Topic,
};
pub use rng::{CountingRng, ForkedRng, RngSource};
pub use sim::{SimError, SimWorld, Tile};
pub use story::construction_disaster::META as CONSTRUCTION_DISASTER_META;
pub use story::{
    DisasterEffect, DisasterRule, EventLogEntry, EventNotification, IconId, LocalizedText,
    LogHandle, NotificationAction, Priority, Resolution, ResolutionOutcome, Signal, StoryEvent,
    StoryEventMeta, StoryEventSave, explode_chance,
};
pub use structure::{Capability, DamageType, Damageable, Flammable, Position, Structure, TileId};
