//! Electrical fault on freshly built power structures.
//!
//! While active, the rule listens for completed constructions. A structure
//! with an energy node takes a share of its max health as electrical damage
//! and then either catches fire or explodes. The failure is written to the
//! story log and announced to the player before any damage is dealt, so the
//! log stays truthful when a later host call fails.

use rand::Rng;

use crate::config::{Difficulty, DisasterConfig};
use crate::constants::{
    CONSTRUCTION_DISASTER_ID, EXPLODE_DIFFICULTY_SCALE, LOG_CONSTRUCT_FAIL_DESC,
    LOG_CONSTRUCT_FAIL_TITLE, RNG_FORK_DOMAIN,
};
use crate::error::{ResolutionError, ResolutionStage};
use crate::host::{
    Command, ExplosionCommand, Pref, SignalBus, StoryContext, SubscriptionHandle, Topic,
};
use crate::numbers::lerp_clamped;
use crate::rng::ForkedRng;
use crate::story::entry::{
    EventLogEntry, EventNotification, IconId, LocalizedText, LogHandle, NotificationAction,
    Priority,
};
use crate::story::outcome::{DisasterEffect, Resolution, ResolutionOutcome};
use crate::story::{Signal, StoryEvent, StoryEventMeta, StoryEventSave};
use crate::structure::{Capability, DamageType, Structure};

/// Registration metadata for the construction disaster.
pub static META: StoryEventMeta = StoryEventMeta {
    id: CONSTRUCTION_DISASTER_ID,
    auto_end: false,
    skip_duration_warning: true,
    create: DisasterRule::create,
};

/// Chance that a resolution explodes instead of catching fire.
///
/// The difficulty is halved and used as the interpolation parameter, clamped
/// to `[0, 1]`: zero at 0.0, half the ceiling at 1.0, the ceiling from 2.0 up.
#[must_use]
pub fn explode_chance(config: &DisasterConfig, difficulty: Difficulty) -> f32 {
    lerp_clamped(
        0.0,
        config.max_explode_chance,
        difficulty.multiplier() * EXPLODE_DIFFICULTY_SCALE,
    )
}

/// The construction disaster story event.
#[derive(Debug, Clone)]
pub struct DisasterRule {
    config: DisasterConfig,
    subscription: Option<SubscriptionHandle>,
    last_log_entry: Option<LogHandle>,
    ended: bool,
    resolutions: u32,
}

impl Default for DisasterRule {
    fn default() -> Self {
        Self::new(DisasterConfig::default())
    }
}

impl DisasterRule {
    pub const ID: &'static str = CONSTRUCTION_DISASTER_ID;

    #[must_use]
    pub const fn new(config: DisasterConfig) -> Self {
        Self {
            config,
            subscription: None,
            last_log_entry: None,
            ended: false,
            resolutions: 0,
        }
    }

    fn create() -> Box<dyn StoryEvent> {
        Box::new(Self::default())
    }

    #[must_use]
    pub const fn config(&self) -> &DisasterConfig {
        &self.config
    }

    /// Completed resolutions, successful or aborted.
    #[must_use]
    pub const fn resolutions(&self) -> u32 {
        self.resolutions
    }

    #[must_use]
    pub const fn subscription(&self) -> Option<SubscriptionHandle> {
        self.subscription
    }

    fn start_listening(&mut self, bus: &mut dyn SignalBus) {
        if self.subscription.is_some() {
            return;
        }
        let handle = bus.subscribe(Topic::ConstructionCompleted, Self::ID);
        log::debug!("{} listening for completed constructions ({handle:?})", Self::ID);
        self.subscription = Some(handle);
    }

    /// Resolve one completed construction.
    ///
    /// Structures without an energy node are skipped silently. Failures of
    /// host calls are logged and reported as [`Resolution::Aborted`]; they
    /// never propagate, and the event ends either way.
    pub fn on_construction_completed(
        &mut self,
        ctx: &mut StoryContext<'_>,
        structure: &mut dyn Structure,
    ) -> Resolution {
        let tile = structure.id();
        if !structure.has_energy_node() {
            return Resolution::Skipped { tile };
        }

        let mut rng = ctx.rng.fork(RNG_FORK_DOMAIN);
        let damage_fraction =
            self.config.damage_fraction.sample(&mut rng) * ctx.difficulty.multiplier();
        let log_entry = self.notify_failure(ctx, structure);

        let resolution = match self.strike(ctx, structure, rng, damage_fraction) {
            Ok((damage, effect)) => {
                log::info!(
                    "{} on {tile} ({}): {:.1}% damage, {effect:?}",
                    Self::ID,
                    structure.display_name(),
                    damage_fraction * 100.0
                );
                Resolution::Resolved(ResolutionOutcome {
                    tile,
                    damage_fraction,
                    damage,
                    effect,
                    log_entry,
                })
            }
            Err(error) => {
                log::error!(
                    "Failed to execute {} on {tile} ({}): {error}",
                    Self::ID,
                    structure.display_name()
                );
                Resolution::Aborted {
                    damage_fraction,
                    log_entry,
                    error,
                }
            }
        };
        self.end_event();
        resolution
    }

    fn notify_failure(
        &mut self,
        ctx: &mut StoryContext<'_>,
        structure: &dyn Structure,
    ) -> LogHandle {
        let title = LocalizedText::key(LOG_CONSTRUCT_FAIL_TITLE);
        let entry = EventLogEntry {
            event_id: Self::ID.to_string(),
            ticks: ctx.ticks,
            title: title.clone(),
            description: LocalizedText::key(LOG_CONSTRUCT_FAIL_DESC)
                .with_arg(structure.display_name()),
            icon: IconId::ConstructionFailure,
            subject: structure.id(),
        };
        let handle = ctx.log.append(entry);
        self.last_log_entry = Some(handle);
        ctx.notifications.post(EventNotification {
            created_at: ctx.ticks,
            source: structure.id(),
            icon: IconId::ConstructionFailure,
            title,
            priority: Priority::Normal,
            sticky: true,
            on_icon_click: NotificationAction::ShowLogDetails(handle),
        });
        handle
    }

    fn strike(
        &self,
        ctx: &mut StoryContext<'_>,
        structure: &mut dyn Structure,
        mut rng: ForkedRng,
        damage_fraction: f32,
    ) -> Result<(f32, DisasterEffect), ResolutionError> {
        let tile = structure.id();
        let difficulty = ctx.difficulty.multiplier();

        let damageable = structure
            .damageable()
            .ok_or(ResolutionError::MissingCapability {
                tile,
                capability: Capability::Damageable,
            })?;
        let damage = damageable.max_health() * damage_fraction;
        damageable
            .take_damage(damage, DamageType::Electricity)
            .map_err(|source| ResolutionError::Host {
                tile,
                stage: ResolutionStage::Damage,
                source,
            })?;

        let can_explode = !ctx.prefs.get_bool(Pref::NoHeavyDisasters, false);
        let chance = explode_chance(&self.config, ctx.difficulty);
        if can_explode && rng.r#gen::<f32>() < chance {
            let radius = self.config.explosion_radius.sample(&mut rng) * difficulty;
            let strength = self.config.explosion_strength.sample(&mut rng) * difficulty;
            let command = ExplosionCommand {
                source: tile,
                position: structure.position(),
                radius,
                strength,
                rng,
            };
            ctx.commands
                .enqueue(Command::CreateExplosion(command))
                .map_err(|source| ResolutionError::Host {
                    tile,
                    stage: ResolutionStage::Explosion,
                    source,
                })?;
            return Ok((damage, DisasterEffect::Explosion { radius, strength }));
        }

        structure
            .flammable()
            .ok_or(ResolutionError::MissingCapability {
                tile,
                capability: Capability::Flammable,
            })?
            .set_on_fire()
            .map_err(|source| ResolutionError::Host {
                tile,
                stage: ResolutionStage::Ignite,
                source,
            })?;
        Ok((damage, DisasterEffect::Fire))
    }

    fn end_event(&mut self) {
        self.ended = true;
        self.resolutions = self.resolutions.saturating_add(1);
    }
}

impl StoryEvent for DisasterRule {
    fn meta(&self) -> &'static StoryEventMeta {
        &META
    }

    fn activate(&mut self, _ticks: u64, bus: &mut dyn SignalBus) {
        self.ended = false;
        self.start_listening(bus);
    }

    fn deactivate(&mut self, _ticks: u64, bus: &mut dyn SignalBus) {
        if let Some(handle) = self.subscription.take() {
            bus.unsubscribe(handle);
            log::debug!("{} stopped listening ({handle:?})", Self::ID);
        }
    }

    fn restore(&mut self, saved: &StoryEventSave, bus: &mut dyn SignalBus) {
        if saved.id != Self::ID {
            log::warn!("{} restoring from a snapshot of {}", Self::ID, saved.id);
        }
        self.last_log_entry = saved.last_log_entry;
        self.resolutions = saved.resolutions;
        self.start_listening(bus);
    }

    fn snapshot(&self) -> StoryEventSave {
        StoryEventSave {
            id: Self::ID.to_string(),
            active: self.subscription.is_some(),
            last_log_entry: self.last_log_entry,
            resolutions: self.resolutions,
        }
    }

    fn on_signal(&mut self, ctx: &mut StoryContext<'_>, signal: Signal<'_>) -> Option<Resolution> {
        if self.subscription.is_none() {
            log::warn!("{} received {:?} while inactive", Self::ID, signal.topic());
            return None;
        }
        match signal {
            Signal::ConstructionCompleted(structure) => {
                Some(self.on_construction_completed(ctx, structure))
            }
        }
    }

    fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    fn is_ended(&self) -> bool {
        self.ended
    }

    fn log_entry(&self) -> Option<LogHandle> {
        self.last_log_entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyPreset;
    use crate::sim::MemoryBus;

    #[test]
    fn meta_matches_registration_flags() {
        assert_eq!(META.id, "ConstructionDisaster");
        assert!(!META.auto_end);
        assert!(META.skip_duration_warning);
        let created = (META.create)();
        assert_eq!(created.meta().id, DisasterRule::ID);
        assert!(!created.is_subscribed());
    }

    #[test]
    fn explode_chance_follows_clamped_lerp() {
        let cfg = DisasterConfig::default();
        let at = |m: f32| explode_chance(&cfg, Difficulty::new(m).unwrap());
        assert!((at(1.0) - 0.2).abs() < 1e-6);
        assert!((at(DifficultyPreset::Relaxing.multiplier()) - 0.1).abs() < 1e-6);
        assert!((at(2.0) - 0.4).abs() < 1e-6);
        assert!((at(5.0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn activation_is_idempotent() {
        let mut bus = MemoryBus::default();
        let mut rule = DisasterRule::default();
        rule.activate(0, &mut bus);
        let first = rule.subscription();
        rule.activate(1, &mut bus);
        assert_eq!(rule.subscription(), first);
        assert_eq!(bus.subscription_count(), 1);

        rule.deactivate(2, &mut bus);
        rule.deactivate(3, &mut bus);
        assert!(!rule.is_subscribed());
        assert_eq!(bus.subscription_count(), 0);
    }

    #[test]
    fn restore_resubscribes_and_keeps_history() {
        let mut bus = MemoryBus::default();
        let mut rule = DisasterRule::default();
        let saved = StoryEventSave {
            id: DisasterRule::ID.to_string(),
            active: false,
            last_log_entry: Some(LogHandle(9)),
            resolutions: 2,
        };
        rule.restore(&saved, &mut bus);
        rule.restore(&saved, &mut bus);
        assert!(rule.is_subscribed());
        assert_eq!(bus.subscription_count(), 1);
        assert_eq!(rule.log_entry(), Some(LogHandle(9)));
        assert_eq!(rule.resolutions(), 2);

        let snapshot = rule.snapshot();
        assert!(snapshot.active);
        assert_eq!(snapshot.resolutions, 2);
    }
}
